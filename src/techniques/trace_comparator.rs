use crate::{
    eval_framework::evaluation_error::EvaluationError,
    eval_objects::{event::DecodedAlignment, stat_vector::Counters, trace_record::TraceRecord},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparatorState {
    Scanning,
    Matched,
    TaskMismatch,
    LengthMismatch,
}

/**
 * Walks an output alignment and a gold alignment side by side, skipping insertions on both, and compares the events at corresponding positions.
 *
 * Positional comparison is only meaningful when both alignments cover the same task sequence once insertions are removed.
 * Therefore, the numbers of non-insertion events are compared up front and any difference ends in LengthMismatch.
 */
pub struct TraceComparator<'a> {
    output: DecodedAlignment<'a>,
    gold: DecodedAlignment<'a>,
    output_cursor: usize,
    gold_cursor: usize,
    position: usize,
    state: ComparatorState,
    events: Counters,
}

impl<'a> TraceComparator<'a> {
    pub fn new(output_alignment: &'a str, gold_alignment: &'a str) -> Self {
        let output = DecodedAlignment::decode(output_alignment);
        let gold = DecodedAlignment::decode(gold_alignment);
        let state = if output.number_of_real_events() == gold.number_of_real_events() {
            ComparatorState::Scanning
        } else {
            ComparatorState::LengthMismatch
        };

        Self {
            output,
            gold,
            output_cursor: 0,
            gold_cursor: 0,
            position: 0,
            state,
            events: Counters::default(),
        }
    }

    pub fn get_state(&self) -> ComparatorState {
        self.state
    }

    /// Event-level counters gathered so far.
    pub fn get_event_counters(&self) -> &Counters {
        &self.events
    }

    pub fn step(&mut self) -> ComparatorState {
        if self.state != ComparatorState::Scanning {
            return self.state;
        }

        self.output_cursor = self.output.skip_insertions(self.output_cursor);
        self.gold_cursor = self.gold.skip_insertions(self.gold_cursor);

        self.state = match (
            self.output.get(self.output_cursor),
            self.gold.get(self.gold_cursor),
        ) {
            (None, None) => ComparatorState::Matched,
            (Some(output_event), Some(gold_event)) => {
                if output_event.task_name != gold_event.task_name {
                    ComparatorState::TaskMismatch
                } else {
                    self.events.events += 1;
                    if output_event.is_synchronous() && gold_event.is_synchronous() {
                        self.events.correct_synchronous += 1;
                    }
                    if output_event.is_log_only() && gold_event.is_log_only() {
                        self.events.correct_log += 1;
                    }
                    if output_event.is_synchronous() {
                        self.events.predicted_synchronous += 1;
                    }
                    if gold_event.is_synchronous() {
                        self.events.expected_synchronous += 1;
                    }

                    self.output_cursor += 1;
                    self.gold_cursor += 1;
                    self.position += 1;
                    ComparatorState::Scanning
                }
            }
            //cannot happen after the up-front length check
            _ => ComparatorState::LengthMismatch,
        };

        self.state
    }

    pub fn run(&mut self) -> ComparatorState {
        while self.step() == ComparatorState::Scanning {}
        self.state
    }

    fn to_error(&self, output: &TraceRecord, gold: &TraceRecord) -> Option<EvaluationError> {
        match self.state {
            ComparatorState::Scanning | ComparatorState::Matched => None,
            ComparatorState::LengthMismatch => Some(EvaluationError::EventLengthMismatch {
                trace_id: output.id.clone(),
                output_events: self.output.number_of_real_events(),
                gold_events: self.gold.number_of_real_events(),
                output_alignment: output.alignment.clone(),
                gold_alignment: gold.alignment.clone(),
            }),
            ComparatorState::TaskMismatch => Some(EvaluationError::EventTaskMismatch {
                trace_id: output.id.clone(),
                position: self.position,
                output_task: self
                    .output
                    .get(self.output_cursor)
                    .map_or_else(String::new, |event| event.task_name.to_string()),
                gold_task: self
                    .gold
                    .get(self.gold_cursor)
                    .map_or_else(String::new, |event| event.task_name.to_string()),
            }),
        }
    }
}

/// Compares an output record with the gold record of the same trace.
/// Returns the contribution of the trace to its buckets.
pub fn compare_traces(output: &TraceRecord, gold: &TraceRecord) -> Result<Counters, EvaluationError> {
    let mut comparator = TraceComparator::new(&output.alignment, &gold.alignment);
    comparator.run();
    if let Some(error) = comparator.to_error(output, gold) {
        return Err(error);
    }

    let result_cost = comparator.output.cost();
    let gold_cost = comparator.gold.cost();

    let mut delta = *comparator.get_event_counters();
    delta.traces = 1;
    if output.alignment == gold.alignment {
        delta.identical_traces = 1;
    }
    if result_cost == gold_cost {
        delta.identical_cost = 1;
    }
    delta.result_cost = result_cost;
    delta.gold_cost = gold_cost;
    delta.elapsed_time = output.elapsed_time;

    log::debug!(
        "trace {} matched: {} events, cost {} vs gold {}",
        output.id,
        delta.events,
        result_cost,
        gold_cost
    );
    Ok(delta)
}

/// The contribution of an output record that has no gold record.
pub fn trace_without_gold(output: &TraceRecord) -> Counters {
    Counters {
        traces: 1,
        result_cost: DecodedAlignment::decode(&output.alignment).cost(),
        elapsed_time: output.elapsed_time,
        ..Default::default()
    }
}
