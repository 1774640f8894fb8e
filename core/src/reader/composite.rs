//! reader/composite.rs
//! One logical stream over the concatenation of several child readers.
//!
//! Design notes:
//! - `start_offsets[i]` is where child `i` begins in the composite stream,
//!   -1 while unknown. Offsets are filled in as boundaries are discovered by
//!   reading or seeking and never change afterwards.
//! - If every child knows its length up front, all offsets (and the composite
//!   length) are computed at construction. The first child of unknown length
//!   leaves every later offset unknown.
//! - Children are visited strictly in order; children before `index` are not
//!   read again until a backward seek rewinds to them.
//! - Children may be owned (`Box<dyn DataReader>`, concrete readers) or
//!   borrowed (`&mut R`), depending on `R`.

use crate::reader::base::{DataReader, ReaderState};
use crate::types::StreamError;

pub struct CompositeDataReader<R: DataReader> {
    state: ReaderState,
    readers: Vec<R>,
    start_offsets: Vec<i64>,
    index: usize,
    seekable: bool,
}

impl<R: DataReader> CompositeDataReader<R> {
    pub fn new(readers: Vec<R>) -> Self {
        let mut state = ReaderState::new();
        let mut start_offsets = Vec::with_capacity(readers.len());
        let mut seekable = true;
        let mut sum: i64 = 0;

        for reader in &readers {
            start_offsets.push(sum);
            if !reader.seekable() {
                seekable = false;
            }
            if sum >= 0 {
                let part_len = reader.total_length_if_known();
                sum = if part_len < 0 { -1 } else { sum + part_len };
            }
        }
        if sum >= 0 {
            state.set_total_length(sum);
        }

        Self { state, readers, start_offsets, index: 0, seekable }
    }

    pub fn len(&self) -> usize {
        self.readers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readers.is_empty()
    }

    /// Known start offset of each child (-1 = not yet discovered).
    pub fn start_offsets(&self) -> &[i64] {
        &self.start_offsets
    }

    pub fn into_readers(self) -> Vec<R> {
        self.readers
    }

    /// Record where child `next` starts, cross-checking an earlier discovery.
    fn record_start(&mut self, next: usize, offset: i64) -> bool {
        let known = self.start_offsets[next];
        if known < 0 {
            self.start_offsets[next] = offset;
            return true;
        }
        if known != offset {
            log::error!(
                "segment {} starts at {} but was recorded at {}",
                next, offset, known
            );
            self.state.fail(StreamError::Internal(format!(
                "segment {next} boundary moved from {known} to {offset}"
            )));
            return false;
        }
        true
    }

    fn seek_ahead(&mut self, position: i64) -> i64 {
        let last = self.readers.len() - 1;

        while self.index < self.readers.len() {
            // Force a seek inside the last child so a position past the end
            // resolves to the final offset.
            let next_start = if self.index < last { self.start_offsets[self.index + 1] } else { -1 };
            if next_start >= 0 && next_start < position {
                self.index += 1;
                continue;
            }

            // The child does not know its base offset, so seek relative to it.
            let base = self.start_offsets[self.index];
            if base < 0 || base > position {
                self.state.fail(StreamError::Internal(format!(
                    "segment {} start unknown while seeking to {}",
                    self.index, position
                )));
                return -1;
            }
            let rel_offset = position - base;
            let child = &mut self.readers[self.index];
            let at = child.set_offset(rel_offset);
            if !child.ok() {
                let status = child.status();
                self.state.set_status(status);
                return -1;
            }
            if at == rel_offset {
                return position;
            }

            // The child ended first; now its end (and the next start) is known.
            if self.index < last && !self.record_start(self.index + 1, base + at) {
                return -1;
            }
            self.index += 1;
        }

        // Past the end: report where the last child stopped.
        self.index = last;
        self.start_offsets[last] + self.readers[last].offset()
    }

    fn seek_back(&mut self, position: i64) -> i64 {
        if self.index >= self.readers.len() {
            self.index = self.readers.len() - 1;
        }

        while self.index > 0 && self.start_offsets[self.index] > position {
            let child = &mut self.readers[self.index];
            child.set_offset(0);
            if !child.ok() {
                let status = child.status();
                self.state.set_status(status);
                return -1;
            }
            self.index -= 1;
        }

        let base = self.start_offsets[self.index];
        if base < 0 {
            self.state.fail(StreamError::Internal(format!(
                "segment {} start unknown while seeking back to {}",
                self.index, position
            )));
            return -1;
        }

        let child = &mut self.readers[self.index];
        let result = child.set_offset(position - base);
        let status = child.status();
        self.state.set_done(false);
        self.state.set_status(status);
        if result < 0 {
            return -1;
        }
        result + base
    }
}

impl<R: DataReader> DataReader for CompositeDataReader<R> {
    fn state(&self) -> &ReaderState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ReaderState {
        &mut self.state
    }

    fn seekable(&self) -> bool {
        self.seekable
    }

    fn do_set_offset(&mut self, position: i64) -> i64 {
        if self.readers.is_empty() {
            self.state.set_done(true);
            return 0;
        }
        if self.index >= self.readers.len() || position < self.start_offsets[self.index] {
            self.seek_back(position)
        } else {
            self.seek_ahead(position)
        }
    }

    fn do_read_to_buffer(&mut self, storage: &mut [u8]) -> usize {
        if self.readers.is_empty() {
            self.state.set_done(true);
            return 0;
        }

        let mut total = 0;
        while self.index < self.readers.len() && total < storage.len() {
            let child = &mut self.readers[self.index];
            total += child.read_to_buffer(&mut storage[total..]);
            if child.error() {
                let status = child.status();
                self.state.set_status(status);
                return total;
            }
            if !child.done() {
                // Partial read; the caller's loop comes back to this child.
                return total;
            }

            if self.index + 1 < self.readers.len() {
                let offset_now = self.state.offset() + total as i64;
                if !self.record_start(self.index + 1, offset_now) {
                    return total;
                }
            }
            self.index += 1;
        }

        if self.index + 1 >= self.readers.len() {
            let last_done = self.readers[self.readers.len() - 1].done();
            self.state.set_done(last_done);
        }
        total
    }
}
