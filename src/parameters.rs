//! Parameters for a streaming unit run.
//!

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, StreamingError};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StreamingParameters {
    pub sort_key_columns: usize,
    pub shuffle_key_columns: usize,

    pub input_partition_id: String,

    pub sort_before_combine: bool,
}

impl Default for StreamingParameters {
    fn default() -> StreamingParameters {
        StreamingParameters::new()
    }
}

impl StreamingParameters {
    pub fn new() -> StreamingParameters {
        StreamingParameters {
            sort_key_columns: 1,
            shuffle_key_columns: 1,
            input_partition_id: String::from("0"),
            sort_before_combine: false,
        }
    }

    /// Reads parameters from a TOML document. Missing keys take their default value.
    pub fn from_toml_str(s: &str) -> Result<StreamingParameters> {
        let params: StreamingParameters = toml::from_str(s)?;
        params.validate()?;
        Ok(params)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<StreamingParameters> {
        let content = fs::read_to_string(path)?;
        StreamingParameters::from_toml_str(&content)
    }

    /// Sets how many leading fields are used for sorting before the reduce phase, and how many
    /// of them are used to group lines into reduce calls. The sort key must include the
    /// shuffle key.
    ///
    /// Default 1/1
    pub fn set_key_columns(mut self, sort: usize, shuffle: usize) -> StreamingParameters {
        self.sort_key_columns = sort;
        self.shuffle_key_columns = shuffle;
        self
    }

    /// Value reported by `MapperContext::input_partition_id()`.
    ///
    /// Default "0"
    pub fn set_input_partition_id<S: Into<String>>(mut self, id: S) -> StreamingParameters {
        self.input_partition_id = id.into();
        self
    }

    /// Hadoop may or may not sort map output before handing it to a combiner. Without sorting,
    /// combiner groups are only the contiguous runs of the map output, which are often a single
    /// line long. Setting this sorts the map output first, so the combiner sees full groups.
    ///
    /// Default: false
    pub fn set_sort_before_combine(mut self, sort: bool) -> StreamingParameters {
        self.sort_before_combine = sort;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.sort_key_columns == 0 || self.shuffle_key_columns == 0 {
            return Err(StreamingError::Configuration(format!(
                "key column counts must be at least 1. sort_key_columns={}, shuffle_key_columns={}",
                self.sort_key_columns, self.shuffle_key_columns
            )));
        }
        if self.sort_key_columns < self.shuffle_key_columns {
            return Err(StreamingError::Configuration(format!(
                "sort_key_columns must be greater than or equal to shuffle_key_columns. \
                 sort_key_columns={}, shuffle_key_columns={}",
                self.sort_key_columns, self.shuffle_key_columns
            )));
        }
        Ok(())
    }
}
