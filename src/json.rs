//! Adapters for jobs that carry JSON documents as values.
//!
//! `JsonMapperContext` and `JsonReducerCombinerContext` serialize emitted values;
//! `JsonInMapper` decodes every input line and `JsonInReducer` hands out the values of a group
//! as a lazily decoding iterator. Encoding and decoding failures are reported as
//! `StreamingError::Task`.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::context::{Context, MapperContext, ReducerCombinerContext};
use crate::error::{Result, StreamingError};
use crate::grouper::{Group, Values};
use crate::mapreducer::{Mapper, ReducerCombiner};

fn encode<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value)
        .map_err(|e| StreamingError::task(format!("cannot encode value as JSON: {}", e)))
}

fn decode<T: DeserializeOwned>(text: &str) -> Result<T> {
    serde_json::from_str(text)
        .map_err(|e| StreamingError::task(format!("cannot decode JSON value {:?}: {}", text, e)))
}

/// Wraps a `MapperContext`; values passed to `emit_key_value()` are written as JSON.
pub struct JsonMapperContext<'c, 'o, T> {
    core: &'c mut MapperContext<'o>,
    _value: PhantomData<fn(&T)>,
}

impl<'c, 'o, T: Serialize> JsonMapperContext<'c, 'o, T> {
    pub fn new(core: &'c mut MapperContext<'o>) -> JsonMapperContext<'c, 'o, T> {
        JsonMapperContext {
            core,
            _value: PhantomData,
        }
    }

    /// The wrapped context, for counters, logging and raw lines.
    pub fn core(&mut self) -> &mut MapperContext<'o> {
        self.core
    }

    pub fn emit_key_value(&mut self, key: &str, value: &T) -> Result<()> {
        let encoded = encode(value)?;
        self.core.emit_key_value(key, &encoded);
        Ok(())
    }
}

/// Wraps a `ReducerCombinerContext`; values passed to `emit_key_value()` are written as JSON.
pub struct JsonReducerCombinerContext<'c, 'o, T> {
    core: &'c mut ReducerCombinerContext<'o>,
    _value: PhantomData<fn(&T)>,
}

impl<'c, 'o, T: Serialize> JsonReducerCombinerContext<'c, 'o, T> {
    pub fn new(core: &'c mut ReducerCombinerContext<'o>) -> JsonReducerCombinerContext<'c, 'o, T> {
        JsonReducerCombinerContext {
            core,
            _value: PhantomData,
        }
    }

    pub fn core(&mut self) -> &mut ReducerCombinerContext<'o> {
        self.core
    }

    pub fn emit_key_value(&mut self, key: &str, value: &T) -> Result<()> {
        let encoded = encode(value)?;
        self.core.emit_key_value(key, &encoded);
        Ok(())
    }
}

/// Mapper that decodes each input line as a JSON document of type `T` before calling `f`.
pub struct JsonInMapper<T, F> {
    f: F,
    _value: PhantomData<fn() -> T>,
}

impl<T, F> JsonInMapper<T, F>
where
    T: DeserializeOwned,
    F: FnMut(T, &mut MapperContext<'_>) -> Result<()>,
{
    pub fn new(f: F) -> JsonInMapper<T, F> {
        JsonInMapper {
            f,
            _value: PhantomData,
        }
    }
}

impl<T, F> Mapper for JsonInMapper<T, F>
where
    T: DeserializeOwned,
    F: FnMut(T, &mut MapperContext<'_>) -> Result<()>,
{
    fn map(&mut self, line: &str, ctx: &mut MapperContext<'_>) -> Result<()> {
        let value = decode(line)?;
        (self.f)(value, ctx)
    }
}

/// Values of one group, decoded one at a time as they are pulled.
pub struct JsonValues<'v, 'a, T> {
    inner: Values<'v, 'a>,
    _value: PhantomData<fn() -> T>,
}

impl<'v, 'a, T: DeserializeOwned> Iterator for JsonValues<'v, 'a, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Result<T>> {
        self.inner.next().map(|v| decode(&v))
    }
}

/// Reducer/combiner whose group values are JSON documents of type `T`. `f` receives the group
/// key and a `JsonValues` iterator.
pub struct JsonInReducer<T, F> {
    f: F,
    _value: PhantomData<fn() -> T>,
}

impl<T, F> JsonInReducer<T, F>
where
    T: DeserializeOwned,
    F: FnMut(&str, JsonValues<'_, '_, T>, &mut ReducerCombinerContext<'_>) -> Result<()>,
{
    pub fn new(f: F) -> JsonInReducer<T, F> {
        JsonInReducer {
            f,
            _value: PhantomData,
        }
    }
}

impl<T, F> ReducerCombiner for JsonInReducer<T, F>
where
    T: DeserializeOwned,
    F: FnMut(&str, JsonValues<'_, '_, T>, &mut ReducerCombinerContext<'_>) -> Result<()>,
{
    fn reduce(
        &mut self,
        mut group: Group<'_, '_>,
        ctx: &mut ReducerCombinerContext<'_>,
    ) -> Result<()> {
        let key = group.key().to_string();
        let values = JsonValues {
            inner: group.values()?,
            _value: PhantomData,
        };
        (self.f)(&key, values, ctx)
    }
}
