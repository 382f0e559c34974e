//! Groups a sequential stream of tab-delimited lines into runs that share a key.
//!
//! Only *contiguous* lines with a common key join a group; if the same key shows up again
//! later, it starts a new group. This is what hadoop streaming does when the input has not
//! been shuffled and sorted. Sorting, if required, happens before the lines reach the grouper.
//!
//! The grouper is a small state machine holding one look-ahead record. A [`Group`] is a view
//! that borrows the grouper mutably, so only one group can be alive at any time; reading the
//! values of a group advances the shared cursor.

use tracing::trace;

use crate::error::{Result, StreamingError};
use crate::record_types::{KeyFields, Record};

pub struct Grouper<'a> {
    input: Box<dyn Iterator<Item = String> + 'a>,
    key_fields: KeyFields,

    // The record read from input but not yet handed out.
    lookahead: Option<Record>,
    // Key of the most recently returned group.
    group_key: Option<String>,
    // Error hit while a group's values were being read; reported by the next next_group() call.
    pending_error: Option<StreamingError>,

    started: bool,
    exhausted: bool,
}

impl<'a> Grouper<'a> {
    pub fn new<I>(key_fields: KeyFields, input: I) -> Grouper<'a>
    where
        I: IntoIterator<Item = String>,
        I::IntoIter: 'a,
    {
        Grouper {
            input: Box::new(input.into_iter()),
            key_fields,
            lookahead: None,
            group_key: None,
            pending_error: None,
            started: false,
            exhausted: false,
        }
    }

    /// Groups by the first `n` fields of every line.
    pub fn with_key_columns<I>(n: usize, input: I) -> Grouper<'a>
    where
        I: IntoIterator<Item = String>,
        I::IntoIter: 'a,
    {
        Grouper::new(KeyFields::leading(n), input)
    }

    /// Key of the group returned by the last `next_group()` call, if any.
    pub fn current_group_key(&self) -> Option<&str> {
        self.group_key.as_deref()
    }

    /// Returns the next group, or `None` once the input is exhausted.
    ///
    /// If the previous group was not (fully) read, its remaining lines are skipped.
    pub fn next_group(&mut self) -> Result<Option<Group<'_, 'a>>> {
        if let Some(e) = self.pending_error.take() {
            self.exhausted = true;
            return Err(e);
        }
        if self.exhausted {
            return Ok(None);
        }

        if !self.started {
            self.started = true;
            self.advance_or_fail()?;
        } else if let Some(prev) = self.group_key.take() {
            // fast-forward
            let mut skipped = 0usize;
            while matches!(&self.lookahead, Some(r) if r.key == prev) {
                self.advance_or_fail()?;
                skipped += 1;
            }
            if skipped > 0 {
                trace!(key = %prev, skipped, "skipped unread lines of previous group");
            }
        }

        let key = match &self.lookahead {
            None => {
                self.exhausted = true;
                return Ok(None);
            }
            Some(r) => r.key.clone(),
        };
        self.group_key = Some(key.clone());

        Ok(Some(Group {
            grouper: self,
            key,
            enumerated: false,
        }))
    }

    fn advance(&mut self) -> Result<()> {
        match self.input.next() {
            None => {
                self.lookahead = None;
                Ok(())
            }
            Some(line) => match Record::from_line(&line, &self.key_fields) {
                Ok(r) => {
                    self.lookahead = Some(r);
                    Ok(())
                }
                Err(e) => {
                    self.lookahead = None;
                    Err(e)
                }
            },
        }
    }

    fn advance_or_fail(&mut self) -> Result<()> {
        let r = self.advance();
        if r.is_err() {
            self.exhausted = true;
        }
        r
    }
}

/// A run of contiguous lines sharing one key. The values can be read once.
pub struct Group<'g, 'a> {
    grouper: &'g mut Grouper<'a>,
    key: String,
    enumerated: bool,
}

impl<'g, 'a> Group<'g, 'a> {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns an iterator over the values (the non-key fields) of every line in this group.
    ///
    /// Fails with `GroupReenumerated` if called a second time.
    pub fn values(&mut self) -> Result<Values<'_, 'a>> {
        if self.enumerated {
            return Err(StreamingError::GroupReenumerated);
        }
        self.enumerated = true;
        Ok(Values {
            grouper: &mut *self.grouper,
            key: &self.key,
            finished: false,
        })
    }
}

/// Lazily pulls the values of one group from the grouper's input.
pub struct Values<'v, 'a> {
    grouper: &'v mut Grouper<'a>,
    key: &'v str,
    finished: bool,
}

impl<'v, 'a> Iterator for Values<'v, 'a> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.finished {
            return None;
        }
        let same_key = matches!(&self.grouper.lookahead, Some(r) if r.key == self.key);
        if !same_key {
            self.finished = true;
            return None;
        }

        let record = self.grouper.lookahead.take()?;
        if let Err(e) = self.grouper.advance() {
            self.grouper.pending_error = Some(e);
            self.finished = true;
        }
        Some(record.value)
    }
}
