//! Line and record types shared by the grouping and sorting phases.

use std::collections::BTreeSet;

use crate::error::{Result, StreamingError};

/// Separator between the fields of a line.
pub const FIELD_SEPARATOR: char = '\t';

/// The ordered list of zero-based field indexes that make up a line's key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyFields {
    indexes: Vec<usize>,
}

impl KeyFields {
    /// Key made up of the given field indexes, in the given order.
    pub fn new(indexes: Vec<usize>) -> KeyFields {
        KeyFields { indexes }
    }

    /// Key made up of the first `n` fields, like hadoop's `stream.num.map.output.key.fields`.
    pub fn leading(n: usize) -> KeyFields {
        KeyFields { indexes: (0..n).collect() }
    }

    pub fn indexes(&self) -> &[usize] {
        &self.indexes
    }

    /// Minimum number of fields a line needs so that every key index exists.
    pub fn width(&self) -> usize {
        self.indexes.iter().max().map_or(0, |m| m + 1)
    }

    fn split_checked<'l>(&self, line: &'l str) -> Result<Vec<&'l str>> {
        let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
        if fields.len() < self.width() {
            return Err(StreamingError::MalformedLine {
                expected: self.width(),
                line: line.to_string(),
            });
        }
        Ok(fields)
    }

    fn join_key(&self, fields: &[&str]) -> String {
        let parts: Vec<&str> = self.indexes.iter().map(|&i| fields[i]).collect();
        parts.join("\t")
    }
}

/// A line split into its key and the remaining fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub key: String,
    pub value: String,
}

impl Record {
    /// Splits `line` according to `key_fields`. The value holds every field that is not part of
    /// the key, in original order.
    pub fn from_line(line: &str, key_fields: &KeyFields) -> Result<Record> {
        let fields = key_fields.split_checked(line)?;
        let key = key_fields.join_key(&fields);

        let in_key: BTreeSet<usize> = key_fields.indexes().iter().cloned().collect();
        let rest: Vec<&str> = fields
            .iter()
            .enumerate()
            .filter(|(i, _)| !in_key.contains(i))
            .map(|(_, f)| *f)
            .collect();

        Ok(Record {
            key,
            value: rest.join("\t"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_key() {
        let r = Record::from_line("a\tb\tc", &KeyFields::leading(1)).unwrap();
        assert_eq!(r.key, "a");
        assert_eq!(r.value, "b\tc");

        let r = Record::from_line("a\tb\tc", &KeyFields::leading(2)).unwrap();
        assert_eq!(r.key, "a\tb");
        assert_eq!(r.value, "c");
    }

    #[test]
    fn test_selected_key_fields() {
        let kf = KeyFields::new(vec![2, 0]);
        assert_eq!(kf.width(), 3);
        let r = Record::from_line("x\ty\tz\tw", &kf).unwrap();
        assert_eq!(r.key, "z\tx");
        assert_eq!(r.value, "y\tw");
    }

    #[test]
    fn test_key_only_line() {
        let r = Record::from_line("the", &KeyFields::leading(1)).unwrap();
        assert_eq!(r.key, "the");
        assert_eq!(r.value, "");
    }

    #[test]
    fn test_malformed_line() {
        match Record::from_line("a\tb", &KeyFields::leading(3)) {
            Err(StreamingError::MalformedLine { expected, line }) => {
                assert_eq!(expected, 3);
                assert_eq!(line, "a\tb");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
