//! Runs hadoop streaming style mappers, combiners and reducers in memory,
//! without a cluster; useful for unit tests and local development.
//!

pub mod closure_mr;
pub mod context;
pub mod error;
pub mod grouper;
pub mod json;
pub mod mapreducer;
pub mod mru_cache;
pub mod output;
pub mod parameters;
pub mod record_types;
pub mod sort;
pub mod streaming_unit;

pub use closure_mr::{MapperFn, ReducerFn};
pub use context::{Context, MapperContext, ReducerCombinerContext};
pub use error::{Result, StreamingError};
pub use grouper::{Group, Grouper, Values};
pub use json::{
    JsonInMapper, JsonInReducer, JsonMapperContext, JsonReducerCombinerContext, JsonValues,
};
pub use mapreducer::{Mapper, NullReducerCombiner, ReducerCombiner};
pub use mru_cache::{CacheLookup, MostRecentlyUsedCache};
pub use output::{CounterCollection, Phase, PhaseOutput, StreamingOutput};
pub use parameters::StreamingParameters;
pub use streaming_unit::{
    execute, execute_with_combiner_and_reducer, execute_with_reducer, StreamingUnit,
};
