//! Executes a mapper, an optional combiner and an optional reducer in memory, following the
//! hadoop streaming contract: map every line, combine, sort, then reduce groups of lines
//! sharing a key. Meant for testing streaming jobs without a cluster.

use time::OffsetDateTime;
use tracing::{debug, info};

use crate::context::{MapperContext, ReducerCombinerContext};
use crate::error::Result;
use crate::grouper::Grouper;
use crate::mapreducer::{Mapper, NullReducerCombiner, ReducerCombiner};
use crate::output::{Phase, PhaseOutput, StreamingOutput};
use crate::parameters::StreamingParameters;
use crate::sort::LineComparer;

pub struct StreamingUnit<M, C = NullReducerCombiner, R = NullReducerCombiner> {
    params: StreamingParameters,
    mapper: M,
    combiner: Option<C>,
    reducer: Option<R>,
}

impl<M: Mapper> StreamingUnit<M> {
    /// A unit that only runs the given mapper.
    pub fn new(mapper: M) -> StreamingUnit<M> {
        StreamingUnit {
            params: StreamingParameters::new(),
            mapper,
            combiner: None,
            reducer: None,
        }
    }
}

impl<M: Mapper, C: ReducerCombiner, R: ReducerCombiner> StreamingUnit<M, C, R> {
    pub fn with_parameters(mut self, params: StreamingParameters) -> StreamingUnit<M, C, R> {
        self.params = params;
        self
    }

    pub fn with_combiner<C2: ReducerCombiner>(self, combiner: C2) -> StreamingUnit<M, C2, R> {
        StreamingUnit {
            params: self.params,
            mapper: self.mapper,
            combiner: Some(combiner),
            reducer: self.reducer,
        }
    }

    pub fn with_reducer<R2: ReducerCombiner>(self, reducer: R2) -> StreamingUnit<M, C, R2> {
        StreamingUnit {
            params: self.params,
            mapper: self.mapper,
            combiner: self.combiner,
            reducer: Some(reducer),
        }
    }

    /// Runs all configured phases over `input`. Parameters are validated before the first
    /// line is mapped; any error aborts the run.
    pub fn run<I: IntoIterator<Item = String>>(self, input: I) -> Result<StreamingOutput> {
        let StreamingUnit {
            params,
            mut mapper,
            combiner,
            reducer,
        } = self;
        params.validate()?;

        info!(
            sort_key_columns = params.sort_key_columns,
            shuffle_key_columns = params.shuffle_key_columns,
            combiner = combiner.is_some(),
            reducer = reducer.is_some(),
            "starting streaming unit"
        );

        let mut output = StreamingOutput::new();

        run_map(&mut mapper, input, &params, &mut output.mapper)?;

        // Without sort_before_combine, the combiner only sees contiguous runs of map output,
        // which are frequently a single line long.
        if let Some(mut combiner) = combiner {
            let mut lines = output.mapper.result.clone();
            if params.sort_before_combine {
                LineComparer::new(params.sort_key_columns).sort(&mut lines);
            }
            run_grouped(&mut combiner, lines, &params, Phase::Combine, &mut output)?;
        }

        if let Some(mut reducer) = reducer {
            let mut lines = output.result().to_vec();
            LineComparer::new(params.sort_key_columns).sort(&mut lines);
            run_grouped(&mut reducer, lines, &params, Phase::Reduce, &mut output)?;
        }

        info!(
            final_phase = %output.final_phase(),
            lines = output.result().len(),
            "streaming unit finished"
        );
        Ok(output)
    }
}

fn run_map<M, I>(
    mapper: &mut M,
    input: I,
    params: &StreamingParameters,
    out: &mut PhaseOutput,
) -> Result<()>
where
    M: Mapper,
    I: IntoIterator<Item = String>,
{
    let start = OffsetDateTime::now_utc();
    let mut input_lines = 0usize;
    {
        let mut ctx = MapperContext::new(out, &params.input_partition_id);
        mapper.initialize(&mut ctx)?;
        for line in input {
            mapper.map(&line, &mut ctx)?;
            input_lines += 1;
        }
        mapper.cleanup(&mut ctx)?;
    }
    out.elapsed = OffsetDateTime::now_utc() - start;

    debug!(
        phase = %Phase::Map,
        input_lines,
        output_lines = out.result.len(),
        elapsed = ?out.elapsed,
        "phase finished"
    );
    Ok(())
}

/// Runs a combine or reduce phase: groups `lines` by the shuffle key and hands each group to
/// `task`.
fn run_grouped<R: ReducerCombiner>(
    task: &mut R,
    lines: Vec<String>,
    params: &StreamingParameters,
    phase: Phase,
    output: &mut StreamingOutput,
) -> Result<()> {
    let start = OffsetDateTime::now_utc();
    let input_lines = lines.len();
    let mut groups = 0usize;

    let out = output.phase_mut(phase);
    {
        let mut ctx = ReducerCombinerContext::new(out, phase == Phase::Combine);
        task.initialize(&mut ctx)?;

        let mut grouper = Grouper::with_key_columns(params.shuffle_key_columns, lines);
        while let Some(group) = grouper.next_group()? {
            task.reduce(group, &mut ctx)?;
            groups += 1;
        }
        task.cleanup(&mut ctx)?;
    }
    out.elapsed = OffsetDateTime::now_utc() - start;

    debug!(
        %phase,
        input_lines,
        groups,
        output_lines = out.result.len(),
        elapsed = ?out.elapsed,
        "phase finished"
    );

    output.set_final_phase(phase);
    Ok(())
}

/// Runs `mapper` over `input` with default parameters.
pub fn execute<M, I>(mapper: M, input: I) -> Result<StreamingOutput>
where
    M: Mapper,
    I: IntoIterator<Item = String>,
{
    StreamingUnit::new(mapper).run(input)
}

/// Runs `mapper` and `reducer` over `input` with default parameters.
pub fn execute_with_reducer<M, R, I>(mapper: M, reducer: R, input: I) -> Result<StreamingOutput>
where
    M: Mapper,
    R: ReducerCombiner,
    I: IntoIterator<Item = String>,
{
    StreamingUnit::new(mapper).with_reducer(reducer).run(input)
}

/// Runs `mapper`, `combiner` and `reducer` over `input` with default parameters.
pub fn execute_with_combiner_and_reducer<M, C, R, I>(
    mapper: M,
    combiner: C,
    reducer: R,
    input: I,
) -> Result<StreamingOutput>
where
    M: Mapper,
    C: ReducerCombiner,
    R: ReducerCombiner,
    I: IntoIterator<Item = String>,
{
    StreamingUnit::new(mapper).with_combiner(combiner).with_reducer(reducer).run(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::closure_mr::{MapperFn, ReducerFn};
    use crate::context::Context;
    use crate::error::StreamingError;
    use crate::grouper::Group;
    use std::cell::Cell;
    use std::rc::Rc;

    fn lines(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    struct WordSplitter;

    impl Mapper for WordSplitter {
        fn map(&mut self, line: &str, ctx: &mut MapperContext<'_>) -> Result<()> {
            for w in line.split_whitespace() {
                ctx.emit_key_value(w, "1");
                ctx.increment_counter("words");
            }
            Ok(())
        }
    }

    struct Summer;

    impl ReducerCombiner for Summer {
        fn reduce(
            &mut self,
            mut group: Group<'_, '_>,
            ctx: &mut ReducerCombinerContext<'_>,
        ) -> Result<()> {
            let mut sum = 0i64;
            for v in group.values()? {
                sum += v.parse::<i64>().map_err(|e| StreamingError::task(e.to_string()))?;
            }
            ctx.emit_key_value(group.key(), &sum.to_string());
            ctx.increment_category_counter("Summer", "groups", 1);
            Ok(())
        }
    }

    #[test]
    fn test_map_only() {
        let out = execute(WordSplitter, lines(&["the cat the"])).unwrap();
        assert_eq!(out.final_phase(), Phase::Map);
        assert_eq!(out.result(), ["the\t1", "cat\t1", "the\t1"]);
        assert_eq!(out.mapper.counters.get("Custom", "words"), 3);
        assert!(out.reducer.result.is_empty());
    }

    #[test]
    fn test_word_count() {
        let out = execute_with_reducer(WordSplitter, Summer, lines(&["the cat the"])).unwrap();
        assert_eq!(out.final_phase(), Phase::Reduce);
        assert_eq!(out.result(), ["cat\t1", "the\t2"]);
        // map output is kept as emitted
        assert_eq!(out.mapper.result, vec!["the\t1", "cat\t1", "the\t1"]);
        assert_eq!(out.reducer.counters.get("Summer", "groups"), 2);
        assert_eq!(out.mapper.counters.get("Summer", "groups"), 0);
        assert_eq!(out.into_result(), vec!["cat\t1", "the\t2"]);
    }

    #[test]
    fn test_combiner_sees_contiguous_runs_only() {
        let out =
            execute_with_combiner_and_reducer(WordSplitter, Summer, Summer, lines(&["the cat the"]))
                .unwrap();
        assert_eq!(out.combiner.result, vec!["the\t1", "cat\t1", "the\t1"]);
        assert_eq!(out.combiner.counters.get("Summer", "groups"), 3);
        assert_eq!(out.result(), ["cat\t1", "the\t2"]);
    }

    #[test]
    fn test_sort_before_combine() {
        let out = StreamingUnit::new(WordSplitter)
            .with_combiner(Summer)
            .with_parameters(StreamingParameters::new().set_sort_before_combine(true))
            .run(lines(&["the cat the", "cat"]))
            .unwrap();
        assert_eq!(out.final_phase(), Phase::Combine);
        assert_eq!(out.result(), ["cat\t2", "the\t2"]);
    }

    #[test]
    fn test_closures() {
        let mapper = MapperFn::new(|line: &str, ctx: &mut MapperContext<'_>| {
            ctx.emit_line(&line.to_uppercase());
            Ok(())
        });
        let reducer = ReducerFn::new(|mut group, ctx| {
            let n = group.values()?.count();
            ctx.emit_key_value(group.key(), &n.to_string());
            Ok(())
        });
        let out = StreamingUnit::new(mapper)
            .with_reducer(reducer)
            .run(lines(&["b\tx", "a\ty", "b\tz"]))
            .unwrap();
        assert_eq!(out.result(), ["A\t1", "B\t2"]);
    }

    #[test]
    fn test_secondary_sort() {
        // sort by two columns, group by the first one
        let reducer = ReducerFn::new(|mut group, ctx| {
            let values: Vec<String> = group.values()?.collect();
            ctx.emit_key_value(group.key(), &values.join(","));
            Ok(())
        });
        let mapper = MapperFn::new(|line: &str, ctx: &mut MapperContext<'_>| {
            ctx.emit_line(line);
            Ok(())
        });
        let out = StreamingUnit::new(mapper)
            .with_reducer(reducer)
            .with_parameters(StreamingParameters::new().set_key_columns(2, 1))
            .run(lines(&["k\t2\tb", "j\t1\tz", "k\t1\ta"]))
            .unwrap();
        assert_eq!(out.result(), ["j\t1\tz", "k\t1\ta,2\tb"]);
    }

    struct Lifecycle;

    impl Mapper for Lifecycle {
        fn initialize(&mut self, ctx: &mut MapperContext<'_>) -> Result<()> {
            ctx.log("init");
            Ok(())
        }
        fn map(&mut self, line: &str, ctx: &mut MapperContext<'_>) -> Result<()> {
            let tagged = format!("{}:{}", ctx.input_filename(), ctx.input_partition_id());
            ctx.emit_key_value(line, &tagged);
            Ok(())
        }
        fn cleanup(&mut self, ctx: &mut MapperContext<'_>) -> Result<()> {
            ctx.log("done");
            Ok(())
        }
    }

    impl ReducerCombiner for Lifecycle {
        fn initialize(&mut self, ctx: &mut ReducerCombinerContext<'_>) -> Result<()> {
            ctx.emit_line("begin");
            Ok(())
        }
        fn reduce(
            &mut self,
            group: Group<'_, '_>,
            ctx: &mut ReducerCombinerContext<'_>,
        ) -> Result<()> {
            // values deliberately left unread
            ctx.emit_line(group.key());
            if !ctx.is_combiner() {
                ctx.log(group.key());
            }
            Ok(())
        }
        fn cleanup(&mut self, ctx: &mut ReducerCombinerContext<'_>) -> Result<()> {
            ctx.emit_line("end");
            Ok(())
        }
    }

    #[test]
    fn test_lifecycle_hooks_and_context() {
        let out = StreamingUnit::new(Lifecycle)
            .with_reducer(Lifecycle)
            .with_parameters(StreamingParameters::new().set_input_partition_id("5"))
            .run(lines(&["y", "x", "y"]))
            .unwrap();
        assert_eq!(out.mapper.log, vec!["init", "done"]);
        assert_eq!(out.mapper.result, vec!["y\tinproc:5", "x\tinproc:5", "y\tinproc:5"]);
        assert_eq!(out.result(), ["begin", "x", "y", "end"]);
        assert_eq!(out.reducer.log, vec!["x", "y"]);
    }

    #[test]
    fn test_invalid_parameters_fail_before_mapping() {
        let calls = Rc::new(Cell::new(0));
        let seen = calls.clone();
        let mapper = MapperFn::new(move |_: &str, _: &mut MapperContext<'_>| {
            seen.set(seen.get() + 1);
            Ok(())
        });
        let res = StreamingUnit::new(mapper)
            .with_parameters(StreamingParameters::new().set_key_columns(1, 2))
            .run(lines(&["a", "b"]));
        assert!(matches!(res, Err(StreamingError::Configuration(_))));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_malformed_line_aborts_reduce() {
        let mapper = MapperFn::new(|line: &str, ctx: &mut MapperContext<'_>| {
            ctx.emit_line(line);
            Ok(())
        });
        let res = StreamingUnit::new(mapper)
            .with_reducer(Summer)
            .with_parameters(StreamingParameters::new().set_key_columns(2, 2))
            .run(lines(&["a\t1\t1", "nokey"]));
        match res {
            Err(StreamingError::MalformedLine { expected, line }) => {
                assert_eq!(expected, 2);
                assert_eq!(line, "nokey");
            }
            other => panic!("unexpected result: {:?}", other.map(|o| o.into_result())),
        }
    }

    #[test]
    fn test_reducer_reading_twice_fails() {
        let reducer = ReducerFn::new(|mut group, _ctx| {
            let _: Vec<String> = group.values()?.collect();
            let _: Vec<String> = group.values()?.collect();
            Ok(())
        });
        let res = execute_with_reducer(WordSplitter, reducer, lines(&["a b"]));
        assert!(matches!(res, Err(StreamingError::GroupReenumerated)));
    }

    #[test]
    fn test_user_error_propagates() {
        let mapper = MapperFn::new(|line: &str, _: &mut MapperContext<'_>| {
            if line == "bad" {
                return Err(StreamingError::task("cannot map 'bad'"));
            }
            Ok(())
        });
        let res = execute(mapper, lines(&["ok", "bad", "ok"]));
        assert!(matches!(res, Err(StreamingError::Task(_))));
    }

    #[test]
    fn test_empty_input() {
        let out = execute_with_reducer(WordSplitter, Summer, Vec::new()).unwrap();
        assert!(out.result().is_empty());
        assert_eq!(out.final_phase(), Phase::Reduce);
    }
}
