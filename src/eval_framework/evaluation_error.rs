use std::path::PathBuf;

use thiserror::Error;

use crate::eval_objects::trace_record::RecordFormat;

/// Conditions that stop the evaluation of a file pair.
/// An unopenable file skips the pair; every other variant aborts the file and keeps its statistics out of the total.
#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("cannot open {format} file `{}`", .path.display())]
    FileOpenFailure {
        format: RecordFormat,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed {format} line {line_number} ({reason}): `{line}`")]
    MalformedLine {
        format: RecordFormat,
        line_number: usize,
        reason: String,
        line: String,
    },

    #[error("{format} file is not sorted by trace id: `{current}` follows `{previous}`")]
    UnorderedInput {
        format: RecordFormat,
        previous: String,
        current: String,
    },

    #[error(
        "length mismatch in trace {trace_id}: {output_events} events in output `{output_alignment}`, {gold_events} events in gold `{gold_alignment}`"
    )]
    EventLengthMismatch {
        trace_id: String,
        output_events: usize,
        gold_events: usize,
        output_alignment: String,
        gold_alignment: String,
    },

    #[error(
        "task mismatch in trace {trace_id} at event {position}: `{output_task}` in output, `{gold_task}` in gold"
    )]
    EventTaskMismatch {
        trace_id: String,
        position: usize,
        output_task: String,
        gold_task: String,
    },
}
