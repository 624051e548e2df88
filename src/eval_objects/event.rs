pub const EVENT_SEPARATOR: char = '|';
pub const MARKER_INSERTION: &str = "[M-REAL]";
pub const MARKER_SYNCHRONOUS: &str = "[L/M]";
pub const MARKER_LOG: &str = "[L]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveCategory {
    SyncLm,
    LogOnly,
    Other,
}

/// One move of an alignment: a label block followed by a task name, e.g. `[L/M]A`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event<'a> {
    pub is_insertion: bool,
    pub move_category: MoveCategory,
    pub task_name: &'a str,
}

impl<'a> Event<'a> {
    pub fn from_token(token: &'a str) -> Self {
        let (label, task_name) = split_token(token);
        let (is_insertion, move_category) = classify_label(label);
        Self {
            is_insertion,
            move_category,
            task_name,
        }
    }

    /// Insertions and log moves are deviations.
    pub fn is_costly(&self) -> bool {
        self.is_insertion || self.move_category == MoveCategory::LogOnly
    }

    pub fn is_synchronous(&self) -> bool {
        self.move_category == MoveCategory::SyncLm
    }

    pub fn is_log_only(&self) -> bool {
        self.move_category == MoveCategory::LogOnly
    }
}

/**
 * Classifies a label block by the markers it contains, not by exact match, as a block may carry several bracket groups.
 * Returns whether the move is an insertion, and its category.
 */
pub fn classify_label(label: &str) -> (bool, MoveCategory) {
    let is_insertion = label.contains(MARKER_INSERTION);
    let move_category = if label.contains(MARKER_SYNCHRONOUS) {
        MoveCategory::SyncLm
    } else if label.contains(MARKER_LOG) {
        MoveCategory::LogOnly
    } else {
        MoveCategory::Other
    };
    (is_insertion, move_category)
}

/// Splits a token at its last `]` into the label block and the task name.
pub fn split_token(token: &str) -> (&str, &str) {
    match token.rfind(']') {
        Some(x) => token.split_at(x + 1),
        None => ("", token),
    }
}

#[derive(Debug, Clone)]
pub struct DecodedAlignment<'a> {
    events: Vec<Event<'a>>,
}

impl<'a> DecodedAlignment<'a> {
    pub fn decode(alignment: &'a str) -> Self {
        Self {
            events: alignment
                .split(EVENT_SEPARATOR)
                .map(Event::from_token)
                .collect(),
        }
    }

    pub fn get(&self, index: usize) -> Option<&Event<'a>> {
        self.events.get(index)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// The events that take part in positional comparison.
    pub fn real_events(&self) -> impl Iterator<Item = &Event<'a>> {
        self.events.iter().filter(|event| !event.is_insertion)
    }

    pub fn number_of_real_events(&self) -> usize {
        self.real_events().count()
    }

    /// The first position at or after `from` that holds a non-insertion event, or the length if there is none.
    pub fn skip_insertions(&self, from: usize) -> usize {
        let mut index = from;
        while index < self.events.len() && self.events[index].is_insertion {
            index += 1;
        }
        index
    }

    /// Number of insertions plus number of log moves.
    pub fn cost(&self) -> u64 {
        self.events.iter().filter(|event| event.is_costly()).count() as u64
    }
}
