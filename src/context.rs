//! Contexts handed to mappers, combiners and reducers. They collect emitted lines, counters and
//! log messages into the output bucket of the running phase.

use crate::output::{PhaseOutput, DEFAULT_COUNTER_CATEGORY};

/// Name reported as input file when running in-process.
pub const IN_PROCESS_FILENAME: &str = "inproc";

/// Operations available to user code in every phase.
pub trait Context {
    /// Emits a raw text line.
    fn emit_line(&mut self, line: &str);

    /// Emits a key/value pair as `key\tvalue`.
    fn emit_key_value(&mut self, key: &str, value: &str) {
        self.emit_line(&format!("{}\t{}", key, value));
    }

    fn increment_category_counter(&mut self, category: &str, name: &str, by: i64);

    /// Increments a counter in the default category by one.
    fn increment_counter(&mut self, name: &str) {
        self.increment_category_counter(DEFAULT_COUNTER_CATEGORY, name, 1);
    }

    fn increment_counter_by(&mut self, name: &str, by: i64) {
        self.increment_category_counter(DEFAULT_COUNTER_CATEGORY, name, by);
    }

    /// Writes a message to the task log of the running phase.
    fn log(&mut self, message: &str);
}

pub struct MapperContext<'o> {
    out: &'o mut PhaseOutput,
    input_partition_id: &'o str,
}

impl<'o> MapperContext<'o> {
    pub(crate) fn new(out: &'o mut PhaseOutput, input_partition_id: &'o str) -> MapperContext<'o> {
        MapperContext { out, input_partition_id }
    }

    pub fn input_filename(&self) -> &str {
        IN_PROCESS_FILENAME
    }

    /// Differentiates pieces of one input; useful for naming external entities uniquely.
    pub fn input_partition_id(&self) -> &str {
        self.input_partition_id
    }
}

impl<'o> Context for MapperContext<'o> {
    fn emit_line(&mut self, line: &str) {
        self.out.result.push(line.to_string());
    }

    fn increment_category_counter(&mut self, category: &str, name: &str, by: i64) {
        self.out.counters.increment(category, name, by);
    }

    fn log(&mut self, message: &str) {
        self.out.log.push(message.to_string());
    }
}

pub struct ReducerCombinerContext<'o> {
    out: &'o mut PhaseOutput,
    is_combiner: bool,
}

impl<'o> ReducerCombinerContext<'o> {
    pub(crate) fn new(out: &'o mut PhaseOutput, is_combiner: bool) -> ReducerCombinerContext<'o> {
        ReducerCombinerContext { out, is_combiner }
    }

    pub fn is_combiner(&self) -> bool {
        self.is_combiner
    }
}

impl<'o> Context for ReducerCombinerContext<'o> {
    fn emit_line(&mut self, line: &str) {
        self.out.result.push(line.to_string());
    }

    fn increment_category_counter(&mut self, category: &str, name: &str, by: i64) {
        self.out.counters.increment(category, name, by);
    }

    fn log(&mut self, message: &str) {
        self.out.log.push(message.to_string());
    }
}
