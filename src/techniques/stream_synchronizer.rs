use anyhow::{Context, Result};
use std::{cmp::Ordering, io::BufRead};

use crate::{
    eval_framework::evaluation_error::EvaluationError,
    eval_objects::{
        stat_vector::StatVector,
        trace_record::{RecordFormat, RecordReader, TraceRecord},
    },
    techniques::trace_comparator::{compare_traces, trace_without_gold},
};

/// The statistics of one file pair, together with the gold instances for which no output was found.
#[derive(Debug, Clone, Default)]
pub struct FileEvaluation {
    pub stats: StatVector,
    pub unsolved: Vec<String>,
}

/// A record stream that rejects identifiers that are not strictly ascending.
struct SortedStream<'a> {
    records: RecordReader<'a>,
    previous_id: Option<String>,
}

impl<'a> SortedStream<'a> {
    fn new(reader: &'a mut (dyn BufRead + 'a), format: RecordFormat) -> Self {
        Self {
            records: RecordReader::new(reader, format),
            previous_id: None,
        }
    }

    fn next(&mut self) -> Result<Option<TraceRecord>> {
        let record = match self.records.next_record()? {
            Some(record) => record,
            None => return Ok(None),
        };

        if let Some(previous) = &self.previous_id {
            if record.id.as_str() <= previous.as_str() {
                return Err(EvaluationError::UnorderedInput {
                    format: self.records.get_format(),
                    previous: previous.clone(),
                    current: record.id,
                }
                .into());
            }
        }
        self.previous_id = Some(record.id.clone());

        Ok(Some(record))
    }
}

/**
 * Merge-joins an output file and a gold file, both sorted by trace identifier.
 *
 * Matched identifiers are compared; output records without gold go to the no-gold buckets;
 * gold records without output are unsolved instances and do not count.
 * When one side runs out, the rest of the other side follows the same rules.
 */
pub fn synchronize(output: &mut dyn BufRead, gold: &mut dyn BufRead) -> Result<FileEvaluation> {
    let mut result = FileEvaluation::default();
    synchronize_into(output, gold, &mut result)?;
    Ok(result)
}

/// As `synchronize`, but fills `result` in place.
/// After an error, `result.unsolved` still lists the unsolved instances found before the abort.
pub fn synchronize_into(
    output: &mut dyn BufRead,
    gold: &mut dyn BufRead,
    result: &mut FileEvaluation,
) -> Result<()> {
    let mut outputs = SortedStream::new(output, RecordFormat::Output);
    let mut golds = SortedStream::new(gold, RecordFormat::Gold);

    let mut next_output = outputs.next()?;
    let mut next_gold = golds.next()?;
    loop {
        match (next_output.take(), next_gold.take()) {
            (Some(output), Some(gold)) => match gold.id.cmp(&output.id) {
                Ordering::Less => {
                    result.add_unsolved(gold);
                    next_output = Some(output);
                    next_gold = golds.next()?;
                }
                Ordering::Greater => {
                    result.add_without_gold(&output);
                    next_output = outputs.next()?;
                    next_gold = Some(gold);
                }
                Ordering::Equal => {
                    let delta = compare_traces(&output, &gold)
                        .with_context(|| format!("comparing trace {}", output.id))?;
                    result.stats.add_trace(true, output.is_fitting, &delta);
                    next_output = outputs.next()?;
                    next_gold = golds.next()?;
                }
            },
            (Some(output), None) => {
                result.add_without_gold(&output);
                next_output = outputs.next()?;
            }
            (None, Some(gold)) => {
                result.add_unsolved(gold);
                next_gold = golds.next()?;
            }
            (None, None) => break,
        }
    }

    Ok(())
}

impl FileEvaluation {
    fn add_unsolved(&mut self, gold: TraceRecord) {
        log::warn!("unsolved instance {}", gold.id);
        self.unsolved.push(gold.id);
    }

    fn add_without_gold(&mut self, output: &TraceRecord) {
        log::debug!("trace {} has no gold alignment", output.id);
        self.stats
            .add_trace(false, output.is_fitting, &trace_without_gold(output));
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, io::Cursor};

    use crate::{
        eval_framework::evaluation_error::EvaluationError,
        eval_objects::{stat_vector::StatCategory, trace_record::RecordFormat},
        techniques::stream_synchronizer::{FileEvaluation, synchronize, synchronize_into},
    };

    fn run(output: &str, gold: &str) -> anyhow::Result<FileEvaluation> {
        let _ = env_logger::builder().is_test(true).try_init();
        synchronize(&mut Cursor::new(output), &mut Cursor::new(gold))
    }

    #[test]
    fn matched_trace() {
        let result = run("T1 [L/M]A|[L/M]B FITTING 0.5\n", "T1 [L/M]A|[L/M]B\n").unwrap();

        for category in [StatCategory::GoldAll, StatCategory::GoldFitting] {
            let counters = result.stats.get(category);
            assert_eq!(counters.traces, 1);
            assert_eq!(counters.identical_traces, 1);
            assert_eq!(counters.events, 2);
            assert_eq!(counters.correct_synchronous, 2);
        }
        assert!(result.stats.is_empty(StatCategory::NoGoldAll));
        assert!(result.unsolved.is_empty());
    }

    #[test]
    fn output_without_gold_between_gold_entries() {
        let result = run(
            "T1 [L/M]A FITTING 0.1\nT2 [L]A NONFIT 0.2\nT3 [L/M]B FITTING 0.3\n",
            "T1 [L/M]A\nT3 [L/M]B\n",
        )
        .unwrap();

        let no_gold = result.stats.get(StatCategory::NoGoldAll);
        assert_eq!(no_gold.traces, 1);
        assert_eq!(no_gold.result_cost, 1);
        assert_eq!(no_gold.elapsed_time, 0.2);
        assert_eq!(no_gold.events, 0);
        assert!(result.stats.is_empty(StatCategory::NoGoldFitting));

        assert_eq!(result.stats.get(StatCategory::GoldAll).traces, 2);
        assert_eq!(result.stats.get(StatCategory::GoldFitting).traces, 2);
        assert!(result.unsolved.is_empty());
    }

    #[test]
    fn unsolved_gold_instance() {
        let result = run(
            "T4 [L/M]A FITTING 0.1\nT6 [L/M]C FITTING 0.1\n",
            "T4 [L/M]A\nT5 [L/M]B\nT6 [L/M]C\n",
        )
        .unwrap();

        assert_eq!(result.unsolved, vec!["T5".to_string()]);
        assert_eq!(result.stats.get(StatCategory::GoldAll).traces, 2);
        assert_eq!(result.stats.get(StatCategory::GoldAll).events, 2);
        assert!(result.stats.is_empty(StatCategory::NoGoldAll));
    }

    #[test]
    fn tail_of_output_has_no_gold() {
        let result = run(
            "T1 [L/M]A FITTING 0.1\nT2 [L]A|[M-REAL]B FITTING 0.2\nT3 [L]A NONFIT 0.3\n",
            "T1 [L/M]A\n",
        )
        .unwrap();

        assert_eq!(result.stats.get(StatCategory::GoldAll).traces, 1);
        assert_eq!(result.stats.get(StatCategory::NoGoldAll).traces, 2);
        assert_eq!(result.stats.get(StatCategory::NoGoldAll).result_cost, 3);
        assert_eq!(result.stats.get(StatCategory::NoGoldFitting).traces, 1);
        assert_eq!(result.stats.get(StatCategory::NoGoldFitting).result_cost, 2);
    }

    #[test]
    fn tail_of_gold_is_unsolved() {
        let result = run("T1 [L/M]A FITTING 0.1\n", "T1 [L/M]A\nT2 [L/M]B\nT3 [L]C\n").unwrap();

        assert_eq!(result.unsolved, vec!["T2".to_string(), "T3".to_string()]);
        assert_eq!(result.stats.get(StatCategory::GoldAll).traces, 1);
    }

    #[test]
    fn empty_gold() {
        let result = run("T1 [L/M]A FITTING 0.1\nT2 [L]B FITTING 0.1\n", "").unwrap();
        assert_eq!(result.stats.get(StatCategory::NoGoldAll).traces, 2);
        assert_eq!(result.stats.get(StatCategory::NoGoldFitting).traces, 2);
        assert!(result.stats.is_empty(StatCategory::GoldAll));
    }

    #[test]
    fn task_mismatch_aborts() {
        let err = run("T7 [L/M]A|[L/M]B FITTING 0.1\n", "T7 [L/M]X|[L/M]Y\n").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EvaluationError>(),
            Some(EvaluationError::EventTaskMismatch { .. })
        ));
    }

    #[test]
    fn length_mismatch_aborts() {
        let err = run(
            "T1 [L/M]A FITTING 0.1\nT2 [L/M]A|[L/M]B FITTING 0.1\n",
            "T1 [L/M]A\nT2 [L/M]A\n",
        )
        .unwrap_err();
        match err.downcast_ref::<EvaluationError>() {
            Some(EvaluationError::EventLengthMismatch {
                trace_id,
                output_events,
                gold_events,
                ..
            }) => {
                assert_eq!(trace_id, "T2");
                assert_eq!(*output_events, 2);
                assert_eq!(*gold_events, 1);
            }
            _ => panic!("unexpected error {:#}", err),
        }
        assert!(format!("{:#}", err).starts_with("comparing trace T2"));
    }

    #[test]
    fn unsolved_before_abort_are_kept() {
        let mut result = FileEvaluation::default();
        let err = synchronize_into(
            &mut Cursor::new("T2 [L/M]A FITTING 0.1\nT3 [L/M]A FITTING 0.1\n"),
            &mut Cursor::new("T1 [L/M]B\nT2 [L/M]A\nT3 [L/M]C\n"),
            &mut result,
        );
        assert!(err.is_err());
        assert_eq!(result.unsolved, vec!["T1".to_string()]);
    }

    #[test]
    fn unordered_output() {
        let err = run("T2 [L/M]A FITTING 0.1\nT1 [L/M]A FITTING 0.1\n", "").unwrap_err();
        match err.downcast_ref::<EvaluationError>() {
            Some(EvaluationError::UnorderedInput {
                format,
                previous,
                current,
            }) => {
                assert_eq!(*format, RecordFormat::Output);
                assert_eq!(previous, "T2");
                assert_eq!(current, "T1");
            }
            _ => panic!("unexpected error {:#}", err),
        }
    }

    #[test]
    fn duplicate_gold_id() {
        let err = run("T1 [L/M]A FITTING 0.1\n", "T1 [L/M]A\nT1 [L/M]A\n").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EvaluationError>(),
            Some(EvaluationError::UnorderedInput {
                format: RecordFormat::Gold,
                ..
            })
        ));
    }

    #[test]
    fn malformed_line_aborts() {
        let err = run("T1 [L/M]A FITTING\n", "T1 [L/M]A\n").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EvaluationError>(),
            Some(EvaluationError::MalformedLine { .. })
        ));
    }

    #[test]
    fn ids_compare_lexicographically() {
        let result = run("T10 [L/M]A FITTING 0.1\nT9 [L/M]B FITTING 0.1\n", "T9 [L/M]B\n").unwrap();
        assert_eq!(result.stats.get(StatCategory::NoGoldAll).traces, 1);
        assert_eq!(result.stats.get(StatCategory::GoldAll).traces, 1);
    }

    #[test]
    fn scenario_files() {
        let output = fs::read_to_string("testfiles/scenario.out").unwrap();
        let gold = fs::read_to_string("testfiles/scenario.gold").unwrap();
        let result = run(&output, &gold).unwrap();

        assert_eq!(result.unsolved, vec!["T5".to_string()]);

        let gold_all = result.stats.get(StatCategory::GoldAll);
        assert_eq!(gold_all.traces, 4);
        assert_eq!(gold_all.identical_traces, 2);
        assert_eq!(gold_all.events, 8);
        assert_eq!(gold_all.correct_synchronous, 6);
        assert_eq!(gold_all.correct_log, 1);
        assert_eq!(gold_all.predicted_synchronous, 6);
        assert_eq!(gold_all.expected_synchronous, 7);
        assert_eq!(gold_all.identical_cost, 2);
        assert_eq!(gold_all.result_cost, 3);
        assert_eq!(gold_all.gold_cost, 1);
        assert_eq!(gold_all.elapsed_time, 3.75);

        let gold_fitting = result.stats.get(StatCategory::GoldFitting);
        assert_eq!(gold_fitting.traces, 3);
        assert_eq!(gold_fitting.events, 6);
        assert_eq!(gold_fitting.correct_synchronous, 5);
        assert_eq!(gold_fitting.elapsed_time, 1.75);

        let no_gold = result.stats.get(StatCategory::NoGoldAll);
        assert_eq!(no_gold.traces, 1);
        assert_eq!(no_gold.result_cost, 1);
        assert!(result.stats.is_empty(StatCategory::NoGoldFitting));
        assert!(result.stats.satisfies_subset_invariant());
    }
}
