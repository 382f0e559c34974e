//! Captures what a streaming unit run produced: emitted lines, counters and log messages,
//! separately for each phase.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

/// Category used for counters incremented without an explicit category.
pub const DEFAULT_COUNTER_CATEGORY: &str = "Custom";

/// Flat counter collection keyed by `category|name`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CounterCollection {
    counters: BTreeMap<String, i64>,
}

impl CounterCollection {
    pub fn new() -> CounterCollection {
        CounterCollection::default()
    }

    pub fn counter_key(category: &str, name: &str) -> String {
        format!("{}|{}", category, name)
    }

    pub fn increment(&mut self, category: &str, name: &str, by: i64) {
        *self
            .counters
            .entry(CounterCollection::counter_key(category, name))
            .or_insert(0) += by;
    }

    /// Value of a counter; counters that were never incremented are 0.
    pub fn get(&self, category: &str, name: &str) -> i64 {
        self.counters
            .get(&CounterCollection::counter_key(category, name))
            .cloned()
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, i64> {
        self.counters.iter()
    }
}

/// Result bucket of one phase.
#[derive(Clone, Debug)]
pub struct PhaseOutput {
    pub result: Vec<String>,
    pub log: Vec<String>,
    pub counters: CounterCollection,
    pub elapsed: time::Duration,
}

impl Default for PhaseOutput {
    fn default() -> PhaseOutput {
        PhaseOutput {
            result: Vec::new(),
            log: Vec::new(),
            counters: CounterCollection::new(),
            elapsed: time::Duration::ZERO,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Map,
    Combine,
    Reduce,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Phase::Map => write!(f, "map"),
            Phase::Combine => write!(f, "combine"),
            Phase::Reduce => write!(f, "reduce"),
        }
    }
}

/// Output of a complete run.
#[derive(Clone, Debug)]
pub struct StreamingOutput {
    pub mapper: PhaseOutput,
    pub combiner: PhaseOutput,
    pub reducer: PhaseOutput,
    final_phase: Phase,
}

impl Default for StreamingOutput {
    fn default() -> StreamingOutput {
        StreamingOutput {
            mapper: PhaseOutput::default(),
            combiner: PhaseOutput::default(),
            reducer: PhaseOutput::default(),
            final_phase: Phase::Map,
        }
    }
}

impl StreamingOutput {
    pub fn new() -> StreamingOutput {
        StreamingOutput::default()
    }

    /// The last phase that ran.
    pub fn final_phase(&self) -> Phase {
        self.final_phase
    }

    pub(crate) fn set_final_phase(&mut self, phase: Phase) {
        self.final_phase = phase;
    }

    pub fn phase(&self, phase: Phase) -> &PhaseOutput {
        match phase {
            Phase::Map => &self.mapper,
            Phase::Combine => &self.combiner,
            Phase::Reduce => &self.reducer,
        }
    }

    pub(crate) fn phase_mut(&mut self, phase: Phase) -> &mut PhaseOutput {
        match phase {
            Phase::Map => &mut self.mapper,
            Phase::Combine => &mut self.combiner,
            Phase::Reduce => &mut self.reducer,
        }
    }

    /// Lines emitted by the last phase that ran: the reducer's if there was a reduce phase,
    /// else the combiner's, else the mapper's.
    pub fn result(&self) -> &[String] {
        &self.phase(self.final_phase).result
    }

    pub fn into_result(self) -> Vec<String> {
        let StreamingOutput { mapper, combiner, reducer, final_phase } = self;
        match final_phase {
            Phase::Map => mapper.result,
            Phase::Combine => combiner.result,
            Phase::Reduce => reducer.result,
        }
    }
}
