use anyhow::{Context, Error, Result};
use rayon::prelude::*;
use std::{fs::File, io::BufReader, path::Path};

use crate::{
    eval_framework::{evaluation_error::EvaluationError, file_pairs::FilePair},
    eval_objects::{stat_vector::StatVector, trace_record::RecordFormat},
    techniques::stream_synchronizer::{FileEvaluation, synchronize_into},
};

#[derive(Debug)]
pub enum FileOutcome {
    Evaluated(FileEvaluation),
    /// The file was abandoned; its statistics do not count.
    /// `unsolved` lists the unsolved instances found before the abort.
    Failed { error: Error, unsolved: Vec<String> },
    /// One of the two files could not be opened.
    Skipped(EvaluationError),
}

#[derive(Debug)]
pub struct FileReport {
    pub name: String,
    pub outcome: FileOutcome,
}

/// Running totals over all files. Only files that were evaluated without error contribute.
#[derive(Debug, Default)]
pub struct Aggregator {
    total: StatVector,
    files: Vec<FileReport>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fold(&mut self, report: FileReport) {
        if let FileOutcome::Evaluated(evaluation) = &report.outcome {
            self.total += &evaluation.stats;
        }
        self.files.push(report);
    }

    pub fn get_total(&self) -> &StatVector {
        &self.total
    }

    pub fn get_files(&self) -> &[FileReport] {
        &self.files
    }

    pub fn number_of_evaluated_files(&self) -> usize {
        self.count(|outcome| matches!(outcome, FileOutcome::Evaluated(_)))
    }

    pub fn number_of_failed_files(&self) -> usize {
        self.count(|outcome| matches!(outcome, FileOutcome::Failed { .. }))
    }

    pub fn number_of_skipped_files(&self) -> usize {
        self.count(|outcome| matches!(outcome, FileOutcome::Skipped(_)))
    }

    fn count(&self, f: impl Fn(&FileOutcome) -> bool) -> usize {
        self.files.iter().filter(|report| f(&report.outcome)).count()
    }
}

fn open(format: RecordFormat, path: &Path) -> Result<BufReader<File>, EvaluationError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| EvaluationError::FileOpenFailure {
            format,
            path: path.to_path_buf(),
            source,
        })
}

pub fn evaluate_file_pair(pair: &FilePair) -> FileReport {
    log::info!("evaluate {}", pair.name);

    let outcome = match (
        open(RecordFormat::Output, &pair.output_path),
        open(RecordFormat::Gold, &pair.gold_path),
    ) {
        (Ok(mut output), Ok(mut gold)) => {
            let mut evaluation = FileEvaluation::default();
            match synchronize_into(&mut output, &mut gold, &mut evaluation)
                .with_context(|| format!("evaluating {}", pair.name))
            {
                Ok(()) => FileOutcome::Evaluated(evaluation),
                Err(e) => {
                    log::error!("{:#}", e);
                    FileOutcome::Failed {
                        error: e,
                        unsolved: evaluation.unsolved,
                    }
                }
            }
        }
        (Err(e), _) | (_, Err(e)) => {
            log::warn!("skipping {}: {}", pair.name, e);
            FileOutcome::Skipped(e)
        }
    };

    FileReport {
        name: pair.name.clone(),
        outcome: outcome,
    }
}

/**
 * Evaluates all file pairs and folds them into an aggregator in the given order.
 * In parallel mode, the pairs are evaluated concurrently, but folded in the same order, so the result does not depend on completion order.
 */
pub fn evaluate_file_pairs(pairs: &[FilePair], parallel: bool) -> Aggregator {
    let reports = if parallel {
        pairs.par_iter().map(evaluate_file_pair).collect::<Vec<_>>()
    } else {
        pairs.iter().map(evaluate_file_pair).collect::<Vec<_>>()
    };

    let mut aggregator = Aggregator::new();
    for report in reports {
        aggregator.fold(report);
    }
    aggregator
}
