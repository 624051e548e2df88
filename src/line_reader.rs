use anyhow::Result;
use std::io::BufRead;

/// Reads a line-based file one significant line at a time, keeping track of line numbers.
/// Blank lines and lines starting with `#` are not significant.
pub struct LineReader<'a> {
    reader: &'a mut dyn BufRead,
    line_no: usize,
    line: String,
}

impl<'a> LineReader<'a> {
    pub fn new(reader: &'a mut (dyn BufRead + 'a)) -> Self {
        LineReader::<'a> {
            reader: reader,
            line_no: 0,
            line: String::new(),
        }
    }

    pub fn get_last_line_number(&self) -> usize {
        self.line_no
    }

    pub fn get_last_line(&self) -> &str {
        &self.line
    }

    /// Returns false at the end of the file.
    pub fn next_line_raw(&mut self) -> Result<bool> {
        self.line.clear();

        match self.reader.read_line(&mut self.line) {
            Ok(0) => Ok(false),
            Ok(_n) => {
                if self.line.ends_with('\n') {
                    self.line.pop();
                    if self.line.ends_with('\r') {
                        self.line.pop();
                    }
                }
                self.line_no += 1;
                Ok(true)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Returns false at the end of the file.
    pub fn next_line(&mut self) -> Result<bool> {
        while self.next_line_raw()? {
            let trimmed = self.get_last_line().trim_start();
            if !trimmed.is_empty() && !trimmed.starts_with('#') {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::LineReader;

    #[test]
    fn skips_comments_and_blank_lines() {
        let mut reader = Cursor::new("# header\nT1 a\n\n   \nT2 b\r\n# trailing\n");
        let mut lreader = LineReader::new(&mut reader);

        assert!(lreader.next_line().unwrap());
        assert_eq!(lreader.get_last_line(), "T1 a");
        assert_eq!(lreader.get_last_line_number(), 2);

        assert!(lreader.next_line().unwrap());
        assert_eq!(lreader.get_last_line(), "T2 b");
        assert_eq!(lreader.get_last_line_number(), 5);

        assert!(!lreader.next_line().unwrap());
        assert!(!lreader.next_line().unwrap());
    }

    #[test]
    fn empty_input() {
        let mut reader = Cursor::new("");
        let mut lreader = LineReader::new(&mut reader);
        assert!(!lreader.next_line().unwrap());
        assert_eq!(lreader.get_last_line_number(), 0);
    }
}
