use anyhow::Result;
use std::io::BufRead;
use strum_macros::Display;

use crate::{eval_framework::evaluation_error::EvaluationError, line_reader::LineReader};

pub const FITTING_TAG: &str = "FITTING";

/// The two kinds of alignment files.
/// An output line reads `id alignment fitness time`, a gold line reads `id alignment`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum RecordFormat {
    #[strum(serialize = "output")]
    Output,
    #[strum(serialize = "gold")]
    Gold,
}

impl RecordFormat {
    pub fn number_of_fields(&self) -> usize {
        match self {
            RecordFormat::Output => 4,
            RecordFormat::Gold => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TraceRecord {
    pub id: String,
    pub alignment: String,
    pub is_fitting: bool,
    pub elapsed_time: f64,
}

impl TraceRecord {
    /// Parses one line. Gold records are never fitting and took no time.
    pub fn parse(
        format: RecordFormat,
        line: &str,
        line_number: usize,
    ) -> Result<Self, EvaluationError> {
        let malformed = |reason: String| EvaluationError::MalformedLine {
            format,
            line_number,
            reason,
            line: line.to_string(),
        };

        let fields = line.split_whitespace().collect::<Vec<_>>();
        if fields.len() != format.number_of_fields() {
            return Err(malformed(format!(
                "expected {} fields, found {}",
                format.number_of_fields(),
                fields.len()
            )));
        }

        match format {
            RecordFormat::Gold => Ok(Self {
                id: fields[0].to_string(),
                alignment: fields[1].to_string(),
                is_fitting: false,
                elapsed_time: 0.0,
            }),
            RecordFormat::Output => {
                let elapsed_time = fields[3]
                    .parse::<f64>()
                    .map_err(|e| malformed(format!("elapsed time `{}`: {}", fields[3], e)))?;
                if !elapsed_time.is_finite() || elapsed_time < 0.0 {
                    return Err(malformed(format!(
                        "elapsed time `{}` is not a non-negative number",
                        fields[3]
                    )));
                }

                Ok(Self {
                    id: fields[0].to_string(),
                    alignment: fields[1].to_string(),
                    is_fitting: fields[2] == FITTING_TAG,
                    elapsed_time: elapsed_time,
                })
            }
        }
    }
}

pub struct RecordReader<'a> {
    lreader: LineReader<'a>,
    format: RecordFormat,
}

impl<'a> RecordReader<'a> {
    pub fn new(reader: &'a mut (dyn BufRead + 'a), format: RecordFormat) -> Self {
        Self {
            lreader: LineReader::new(reader),
            format: format,
        }
    }

    pub fn get_format(&self) -> RecordFormat {
        self.format
    }

    /// Returns None at the end of the file.
    pub fn next_record(&mut self) -> Result<Option<TraceRecord>> {
        if !self.lreader.next_line()? {
            return Ok(None);
        }
        Ok(Some(TraceRecord::parse(
            self.format,
            self.lreader.get_last_line(),
            self.lreader.get_last_line_number(),
        )?))
    }
}
