use std::ops::AddAssign;

use serde::{Serialize, ser::SerializeMap};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

/// Two axes: whether the trace has a gold reference, and whether it is fitting.
/// Each fitting bucket is a subset of the corresponding all bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display)]
pub enum StatCategory {
    #[strum(serialize = "gFit")]
    GoldFitting,
    #[strum(serialize = "gAll")]
    GoldAll,
    #[strum(serialize = "ngFit")]
    NoGoldFitting,
    #[strum(serialize = "ngAll")]
    NoGoldAll,
}

impl StatCategory {
    pub fn all(has_gold: bool) -> Self {
        if has_gold {
            Self::GoldAll
        } else {
            Self::NoGoldAll
        }
    }

    pub fn fitting(has_gold: bool) -> Self {
        if has_gold {
            Self::GoldFitting
        } else {
            Self::NoGoldFitting
        }
    }

    pub fn has_gold(&self) -> bool {
        matches!(self, Self::GoldFitting | Self::GoldAll)
    }

    /// The bucket this one is a subset of, if any.
    pub fn parent(&self) -> Option<Self> {
        match self {
            Self::GoldFitting => Some(Self::GoldAll),
            Self::NoGoldFitting => Some(Self::NoGoldAll),
            Self::GoldAll | Self::NoGoldAll => None,
        }
    }

    fn index(&self) -> usize {
        match self {
            Self::GoldFitting => 0,
            Self::GoldAll => 1,
            Self::NoGoldFitting => 2,
            Self::NoGoldAll => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Counters {
    pub traces: u64,
    pub identical_traces: u64,
    pub events: u64,
    pub correct_synchronous: u64,
    pub correct_log: u64,
    pub predicted_synchronous: u64,
    pub expected_synchronous: u64,
    pub identical_cost: u64,
    pub gold_cost: u64,
    pub result_cost: u64,
    pub elapsed_time: f64,
}

impl Counters {
    /// Whether every counter is at most the corresponding counter of `other`.
    pub fn is_bounded_by(&self, other: &Counters) -> bool {
        self.traces <= other.traces
            && self.identical_traces <= other.identical_traces
            && self.events <= other.events
            && self.correct_synchronous <= other.correct_synchronous
            && self.correct_log <= other.correct_log
            && self.predicted_synchronous <= other.predicted_synchronous
            && self.expected_synchronous <= other.expected_synchronous
            && self.identical_cost <= other.identical_cost
            && self.gold_cost <= other.gold_cost
            && self.result_cost <= other.result_cost
            && self.elapsed_time <= other.elapsed_time
    }
}

impl AddAssign<&Counters> for Counters {
    fn add_assign(&mut self, rhs: &Counters) {
        self.traces += rhs.traces;
        self.identical_traces += rhs.identical_traces;
        self.events += rhs.events;
        self.correct_synchronous += rhs.correct_synchronous;
        self.correct_log += rhs.correct_log;
        self.predicted_synchronous += rhs.predicted_synchronous;
        self.expected_synchronous += rhs.expected_synchronous;
        self.identical_cost += rhs.identical_cost;
        self.gold_cost += rhs.gold_cost;
        self.result_cost += rhs.result_cost;
        self.elapsed_time += rhs.elapsed_time;
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatVector {
    counters: [Counters; 4],
}

impl StatVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, category: StatCategory) -> &Counters {
        &self.counters[category.index()]
    }

    pub fn is_empty(&self, category: StatCategory) -> bool {
        self.get(category).traces == 0
    }

    /// Adds the contribution of one trace: always to the all bucket of its gold axis, and for fitting traces also to the fitting bucket.
    pub fn add_trace(&mut self, has_gold: bool, is_fitting: bool, delta: &Counters) {
        self.counters[StatCategory::all(has_gold).index()] += delta;
        if is_fitting {
            self.counters[StatCategory::fitting(has_gold).index()] += delta;
        }
    }

    pub fn satisfies_subset_invariant(&self) -> bool {
        StatCategory::iter().all(|category| match category.parent() {
            Some(parent) => self.get(category).is_bounded_by(self.get(parent)),
            None => true,
        })
    }
}

impl AddAssign<&StatVector> for StatVector {
    fn add_assign(&mut self, rhs: &StatVector) {
        for category in StatCategory::iter() {
            self.counters[category.index()] += rhs.get(category);
        }
    }
}

impl Serialize for StatVector {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.counters.len()))?;
        for category in StatCategory::iter() {
            map.serialize_entry(&category.to_string(), self.get(category))?;
        }
        map.end()
    }
}
