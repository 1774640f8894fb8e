//! reader/memory.rs
//! Reader over an in-memory byte buffer.

use bytes::Bytes;

use crate::reader::base::{DataReader, ReaderState};

/// Seekable reader over a `Bytes` buffer. The total length is always known.
#[derive(Debug, Clone)]
pub struct InMemoryDataReader {
    state: ReaderState,
    data: Bytes,
}

impl InMemoryDataReader {
    pub fn new(data: impl Into<Bytes>) -> Self {
        let data = data.into();
        let mut state = ReaderState::new();
        state.set_total_length(data.len() as i64);
        Self { state, data }
    }

    /// Copy `data` into a reader that does not borrow it.
    pub fn copy_from_slice(data: &[u8]) -> Self {
        Self::new(Bytes::copy_from_slice(data))
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    fn position(&self) -> usize {
        self.state.offset().max(0) as usize
    }
}

impl From<Vec<u8>> for InMemoryDataReader {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl From<&'static str> for InMemoryDataReader {
    fn from(data: &'static str) -> Self {
        Self::new(Bytes::from_static(data.as_bytes()))
    }
}

impl From<String> for InMemoryDataReader {
    fn from(data: String) -> Self {
        Self::new(data)
    }
}

impl DataReader for InMemoryDataReader {
    fn state(&self) -> &ReaderState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ReaderState {
        &mut self.state
    }

    fn seekable(&self) -> bool {
        true
    }

    fn do_set_offset(&mut self, position: i64) -> i64 {
        position.min(self.data.len() as i64)
    }

    fn do_read_to_buffer(&mut self, storage: &mut [u8]) -> usize {
        let start = self.position();
        let remaining = self.data.len().saturating_sub(start);
        if remaining == 0 {
            self.state.set_done(true);
            return 0;
        }

        let read = storage.len().min(remaining);
        storage[..read].copy_from_slice(&self.data[start..start + read]);
        if read == remaining {
            self.state.set_done(true);
        }
        read
    }

    fn do_append_until_pattern_inclusive(&mut self, pattern: &[u8], consumed: &mut Vec<u8>) -> bool {
        if self.done() {
            return pattern.is_empty();
        }

        let start = self.position();
        let rest = &self.data[start..];
        let found = if pattern.is_empty() {
            Some(0)
        } else {
            rest.windows(pattern.len()).position(|w| w == pattern)
        };

        match found {
            Some(at) => {
                consumed.extend_from_slice(&rest[..at + pattern.len()]);
                true
            }
            None => {
                consumed.extend_from_slice(rest);
                self.state.set_done(true);
                false
            }
        }
    }
}
