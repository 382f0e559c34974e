//! Mapper and ReducerCombiner implementations that wrap closures.

use crate::context::{MapperContext, ReducerCombinerContext};
use crate::error::Result;
use crate::grouper::Group;
use crate::mapreducer::{Mapper, ReducerCombiner};

/// This type implements the Mapper trait for a closure. If you need the initialize/cleanup
/// hooks, implement Mapper on your own type instead.
pub struct MapperFn<F> {
    f: F,
}

impl<F> MapperFn<F>
where
    F: FnMut(&str, &mut MapperContext<'_>) -> Result<()>,
{
    pub fn new(f: F) -> MapperFn<F> {
        MapperFn { f }
    }
}

impl<F> Mapper for MapperFn<F>
where
    F: FnMut(&str, &mut MapperContext<'_>) -> Result<()>,
{
    fn map(&mut self, line: &str, ctx: &mut MapperContext<'_>) -> Result<()> {
        (self.f)(line, ctx)
    }
}

/// ReducerCombiner counterpart of MapperFn.
pub struct ReducerFn<F> {
    f: F,
}

impl<F> ReducerFn<F>
where
    F: FnMut(Group<'_, '_>, &mut ReducerCombinerContext<'_>) -> Result<()>,
{
    pub fn new(f: F) -> ReducerFn<F> {
        ReducerFn { f }
    }
}

impl<F> ReducerCombiner for ReducerFn<F>
where
    F: FnMut(Group<'_, '_>, &mut ReducerCombinerContext<'_>) -> Result<()>,
{
    fn reduce(&mut self, group: Group<'_, '_>, ctx: &mut ReducerCombinerContext<'_>) -> Result<()> {
        (self.f)(group, ctx)
    }
}
