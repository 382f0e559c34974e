//! The Mapper and ReducerCombiner traits implemented by user code.

use crate::context::{MapperContext, ReducerCombinerContext};
use crate::error::Result;
use crate::grouper::Group;

pub trait Mapper {
    /// Called once before the first line.
    fn initialize(&mut self, _ctx: &mut MapperContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Takes one input line; results are emitted through the context.
    ///
    /// Note that this method takes a &mut self; you can use this to keep state between lines.
    fn map(&mut self, line: &str, ctx: &mut MapperContext<'_>) -> Result<()>;

    /// Called once after the last line.
    fn cleanup(&mut self, _ctx: &mut MapperContext<'_>) -> Result<()> {
        Ok(())
    }
}

/// Used both as combiner and as reducer; `ReducerCombinerContext::is_combiner()` tells which.
pub trait ReducerCombiner {
    fn initialize(&mut self, _ctx: &mut ReducerCombinerContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Takes one group of lines sharing a key. `Group::values()` can only be called once per
    /// group; values not read before returning are skipped.
    fn reduce(&mut self, group: Group<'_, '_>, ctx: &mut ReducerCombinerContext<'_>) -> Result<()>;

    fn cleanup(&mut self, _ctx: &mut ReducerCombinerContext<'_>) -> Result<()> {
        Ok(())
    }
}

/// Placeholder for "no combiner"/"no reducer". Never invoked.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullReducerCombiner;

impl ReducerCombiner for NullReducerCombiner {
    fn reduce(
        &mut self,
        _group: Group<'_, '_>,
        _ctx: &mut ReducerCombinerContext<'_>,
    ) -> Result<()> {
        Ok(())
    }
}
