//! Sorting/comparison functions for the sort phase preceding reduce.

use std::cmp::Ordering;

use crate::record_types::FIELD_SEPARATOR;

/// Returns the part of `line` holding its first `columns` fields, separators included.
/// Lines with fewer fields are returned whole.
#[inline]
pub fn sort_key(line: &str, columns: usize) -> &str {
    if columns == 0 {
        return "";
    }
    match line.match_indices(FIELD_SEPARATOR).nth(columns - 1) {
        Some((ix, _)) => &line[..ix],
        None => line,
    }
}

/// Orders lines by the ordinal value of their first N fields.
#[derive(Clone, Copy, Debug)]
pub struct LineComparer {
    columns: usize,
}

impl LineComparer {
    pub fn new(columns: usize) -> LineComparer {
        LineComparer { columns }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    #[inline]
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        sort_key(a, self.columns).cmp(sort_key(b, self.columns))
    }

    /// Stable sort; lines with equal key prefixes keep their relative order.
    pub fn sort(&self, lines: &mut [String]) {
        lines.sort_by(|a, b| self.compare(a, b));
    }
}
