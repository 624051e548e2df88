use std::path::PathBuf;

pub const DEFAULT_OUTPUT_SUFFIX: &str = ".out";
pub const DEFAULT_GOLD_SUFFIX: &str = ".gold";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct EvaluationConfig {
    pub gold_dir: PathBuf,
    pub out_dir: PathBuf,
    pub output_suffix: String,
    pub gold_suffix: String,
    pub report_format: ReportFormat,
    pub parallel: bool,
}

impl EvaluationConfig {
    pub fn new(gold_dir: impl Into<PathBuf>, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            gold_dir: gold_dir.into(),
            out_dir: out_dir.into(),
            output_suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
            gold_suffix: DEFAULT_GOLD_SUFFIX.to_string(),
            report_format: ReportFormat::Text,
            parallel: false,
        }
    }

    /// The name of the gold file that belongs to an output file.
    pub fn gold_file_name(&self, output_file_name: &str) -> String {
        match output_file_name.strip_suffix(&self.output_suffix) {
            Some(stem) => format!("{}{}", stem, self.gold_suffix),
            None => output_file_name.to_string(),
        }
    }
}
