//! reader/base.rs
//! Pull-based byte stream contract shared by every reader in the crate.
//!
//! Design notes:
//! - `ReaderState` holds the bookkeeping (offset, total length, done, status).
//! - `DataReader` exposes the public API as provided methods and leaves three
//!   hooks to implementors: `do_read_to_buffer`, `do_set_offset` and
//!   `do_append_until_pattern_inclusive`.
//! - Hooks own `done`/`status`; the provided methods only account offsets and
//!   buffer fill.
//! - Ownership of an upstream reader is expressed by the type: a reader that
//!   holds `Box<dyn DataReader>` owns it, one that holds `&mut R` borrows it.

use crate::constants::DEFAULT_READ_BUFFER_SIZE;
use crate::types::{Status, StreamError};

/// Offset/length/done/status bookkeeping embedded in every reader.
#[derive(Debug, Clone)]
pub struct ReaderState {
    offset: i64,
    total_length: i64,
    done: bool,
    status: Status,
}

impl Default for ReaderState {
    fn default() -> Self {
        Self::new()
    }
}

impl ReaderState {
    pub fn new() -> Self {
        Self { offset: 0, total_length: -1, done: false, status: Ok(()) }
    }

    /// Bytes returned to the caller since the last reposition; -1 after a failed seek.
    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// -1 when unknown.
    pub fn total_length(&self) -> i64 {
        self.total_length
    }

    pub fn done(&self) -> bool {
        self.done
    }

    pub fn set_done(&mut self, done: bool) {
        self.done = done;
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }

    /// Record an outcome. A failure forces `done`; success leaves `done` untouched.
    pub fn set_status(&mut self, status: Status) {
        if status.is_err() {
            self.done = true;
        }
        self.status = status;
    }

    pub fn fail(&mut self, error: StreamError) {
        self.set_status(Err(error));
    }

    /// Declare the total length once. Zero marks the reader done immediately.
    pub fn set_total_length(&mut self, length: i64) {
        if self.total_length >= 0 && self.total_length != length {
            log::warn!(
                "ignoring total length {} (already declared {})",
                length, self.total_length
            );
            return;
        }
        self.total_length = length;
        if length == 0 {
            self.done = true;
        }
    }
}

/// A sequential, optionally seekable byte source.
///
/// Not safe for concurrent use of one instance; independent instances own
/// their own buffers and may live on different threads.
pub trait DataReader {
    fn state(&self) -> &ReaderState;
    fn state_mut(&mut self) -> &mut ReaderState;

    fn seekable(&self) -> bool {
        false
    }

    /// Read at most `storage.len()` bytes into `storage`.
    ///
    /// Implementations are solely responsible for marking `done`/`status`.
    /// Returning 0 without becoming done asks the caller to try again.
    fn do_read_to_buffer(&mut self, storage: &mut [u8]) -> usize;

    /// Reposition to `position` (never negative) and return where the reader
    /// landed. A value short of `position` means the end was reached first;
    /// -1 is a hard failure.
    fn do_set_offset(&mut self, position: i64) -> i64 {
        let _ = position;
        self.state_mut()
            .fail(StreamError::Unimplemented("reader cannot seek to offset".into()));
        -1
    }

    /// Append bytes to `consumed` until it ends with `pattern` or the reader is done.
    /// Keeps `offset()` in step with every byte it consumes.
    fn do_append_until_pattern_inclusive(&mut self, pattern: &[u8], consumed: &mut Vec<u8>) -> bool {
        let mut byte = [0u8; 1];
        while !consumed.ends_with(pattern) {
            if self.done() {
                return false;
            }
            if self.do_read_to_buffer(&mut byte) == 1 {
                self.state_mut().offset += 1;
                consumed.push(byte[0]);
            }
        }
        true
    }

    // -------------------------------------------------------------------------
    // Public API
    // -------------------------------------------------------------------------

    fn offset(&self) -> i64 {
        self.state().offset
    }

    fn total_length_if_known(&self) -> i64 {
        self.state().total_length
    }

    fn done(&self) -> bool {
        self.state().done
    }

    fn error(&self) -> bool {
        self.state().status.is_err()
    }

    fn ok(&self) -> bool {
        self.state().status.is_ok()
    }

    fn status(&self) -> Status {
        self.state().status.clone()
    }

    /// Reposition the reader. Returns the new offset, or -1 on failure.
    ///
    /// Moving backward, or recovering from an invalid offset or an error,
    /// clears `done`. Any previous error is cleared before the hook runs.
    fn set_offset(&mut self, position: i64) -> i64 {
        if position < 0 {
            let state = self.state_mut();
            state.fail(StreamError::InvalidArgument(format!("negative offset: {position}")));
            state.offset = -1;
            return -1;
        }

        let state = self.state_mut();
        if position < state.offset || state.offset < 0 || state.status.is_err() {
            state.done = false;
        }
        state.status = Ok(());

        let reached = self.do_set_offset(position);

        let state = self.state_mut();
        state.offset = reached;
        if reached < 0 && state.status.is_ok() {
            state.fail(StreamError::Unknown(format!("could not seek to {position}")));
        }
        reached
    }

    /// Shorthand for `set_offset(0) == 0`.
    fn reset(&mut self) -> bool {
        self.set_offset(0) == 0
    }

    /// Keep reading until `storage` is full or the reader is done.
    fn read_to_buffer(&mut self, storage: &mut [u8]) -> usize {
        let mut total = 0;
        while total < storage.len() && !self.done() {
            let want = storage.len() - total;
            let read = self.do_read_to_buffer(&mut storage[total..]).min(want);
            self.state_mut().offset += read as i64;
            total += read;
        }
        total
    }

    /// Keep reading until `max_bytes` were appended to `append_to` or the reader is done.
    fn read_to_vec(&mut self, max_bytes: usize, append_to: &mut Vec<u8>) -> usize {
        let len = self.total_length_if_known();
        if len >= 0 && self.offset() >= 0 {
            let remaining = (len - self.offset()).max(0) as usize;
            append_to.reserve(remaining.min(max_bytes));
        }

        let mut scratch = vec![0u8; DEFAULT_READ_BUFFER_SIZE.min(max_bytes.max(1))];
        let mut total = 0;
        while total < max_bytes && !self.done() {
            let want = scratch.len().min(max_bytes - total);
            let read = self.do_read_to_buffer(&mut scratch[..want]).min(want);
            self.state_mut().offset += read as i64;
            total += read;
            append_to.extend_from_slice(&scratch[..read]);
        }
        total
    }

    /// Read everything left. Check `error()` to tell a short read from the end.
    fn remainder_to_vec(&mut self) -> Vec<u8> {
        let mut out = Vec::new();
        self.read_to_vec(usize::MAX, &mut out);
        out
    }

    /// `remainder_to_vec` decoded as UTF-8, replacing invalid sequences.
    fn remainder_to_string(&mut self) -> String {
        String::from_utf8_lossy(&self.remainder_to_vec()).into_owned()
    }

    /// Read through the first occurrence of `pattern`.
    ///
    /// `consumed` is cleared, then receives every byte read including the
    /// pattern. Returns false if the reader finished before the pattern was seen.
    fn read_until_pattern_inclusive(&mut self, pattern: &[u8], consumed: &mut Vec<u8>) -> bool {
        consumed.clear();
        let start = self.offset();
        let found = self.do_append_until_pattern_inclusive(pattern, consumed);
        self.state_mut().offset = start + consumed.len() as i64;
        found
    }
}

impl<R: DataReader + ?Sized> DataReader for &mut R {
    fn state(&self) -> &ReaderState {
        (**self).state()
    }

    fn state_mut(&mut self) -> &mut ReaderState {
        (**self).state_mut()
    }

    fn seekable(&self) -> bool {
        (**self).seekable()
    }

    fn do_read_to_buffer(&mut self, storage: &mut [u8]) -> usize {
        (**self).do_read_to_buffer(storage)
    }

    fn do_set_offset(&mut self, position: i64) -> i64 {
        (**self).do_set_offset(position)
    }

    fn do_append_until_pattern_inclusive(&mut self, pattern: &[u8], consumed: &mut Vec<u8>) -> bool {
        (**self).do_append_until_pattern_inclusive(pattern, consumed)
    }
}

impl<R: DataReader + ?Sized> DataReader for Box<R> {
    fn state(&self) -> &ReaderState {
        (**self).state()
    }

    fn state_mut(&mut self) -> &mut ReaderState {
        (**self).state_mut()
    }

    fn seekable(&self) -> bool {
        (**self).seekable()
    }

    fn do_read_to_buffer(&mut self, storage: &mut [u8]) -> usize {
        (**self).do_read_to_buffer(storage)
    }

    fn do_set_offset(&mut self, position: i64) -> i64 {
        (**self).do_set_offset(position)
    }

    fn do_append_until_pattern_inclusive(&mut self, pattern: &[u8], consumed: &mut Vec<u8>) -> bool {
        (**self).do_append_until_pattern_inclusive(pattern, consumed)
    }
}

/// A reader that is permanently failed with a fixed error.
///
/// Returned by factories that cannot build what was asked for, so callers
/// always get a usable reader and only need to check its status.
#[derive(Debug)]
pub struct InvalidDataReader {
    state: ReaderState,
    error: StreamError,
}

impl InvalidDataReader {
    pub fn new(error: StreamError) -> Self {
        let mut state = ReaderState::new();
        state.fail(error.clone());
        Self { state, error }
    }
}

impl DataReader for InvalidDataReader {
    fn state(&self) -> &ReaderState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ReaderState {
        &mut self.state
    }

    fn do_read_to_buffer(&mut self, _storage: &mut [u8]) -> usize {
        0
    }

    fn do_set_offset(&mut self, _position: i64) -> i64 {
        self.state.fail(self.error.clone());
        -1
    }
}

pub fn new_invalid_reader<'a>(error: StreamError) -> Box<dyn DataReader + 'a> {
    Box::new(InvalidDataReader::new(error))
}
