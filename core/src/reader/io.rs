//! reader/io.rs
//! Adapter from any `std::io::Read` (optionally `Seek`) to a `DataReader`.

use std::io::{self, ErrorKind, Read, Seek, SeekFrom};

use crate::reader::base::{DataReader, ReaderState};
use crate::types::StreamError;

type SeekFn<R> = fn(&mut R, i64) -> io::Result<i64>;

/// Seek to `position`, clamped to the end of the stream.
fn seek_clamped<R: Seek>(inner: &mut R, position: i64) -> io::Result<i64> {
    let end = inner.seek(SeekFrom::End(0))? as i64;
    let target = position.min(end);
    Ok(inner.seek(SeekFrom::Start(target as u64))? as i64)
}

/// Generic stream reader.
///
/// Readers built with `new`/`with_length` cannot reposition; the seekable
/// constructors require `Seek` and check that the stream starts at offset 0.
pub struct IoDataReader<R> {
    state: ReaderState,
    inner: R,
    seek: Option<SeekFn<R>>,
}

impl<R: Read> IoDataReader<R> {
    /// Forward-only reader of unknown length.
    pub fn new(inner: R) -> Self {
        Self { state: ReaderState::new(), inner, seek: None }
    }

    /// Forward-only reader whose caller vouches for the total length.
    pub fn with_length(inner: R, length: u64) -> Self {
        let mut reader = Self::new(inner);
        reader.state.set_total_length(length as i64);
        reader
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Seek> IoDataReader<R> {
    pub fn new_seekable(inner: R) -> Self {
        let mut reader = Self { state: ReaderState::new(), inner, seek: Some(seek_clamped::<R>) };
        match reader.inner.stream_position() {
            Ok(0) => {}
            Ok(pos) => reader.state.fail(StreamError::InvalidArgument(format!(
                "stream not at beginning (position {pos})"
            ))),
            Err(e) => reader
                .state
                .fail(StreamError::InvalidArgument(format!("invalid stream: {e}"))),
        }
        reader
    }

    pub fn new_seekable_with_length(inner: R, length: u64) -> Self {
        let mut reader = Self::new_seekable(inner);
        reader.state.set_total_length(length as i64);
        reader
    }
}

impl<R: Read> DataReader for IoDataReader<R> {
    fn state(&self) -> &ReaderState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ReaderState {
        &mut self.state
    }

    fn seekable(&self) -> bool {
        self.seek.is_some()
    }

    fn do_set_offset(&mut self, position: i64) -> i64 {
        let Some(seek) = self.seek else {
            self.state
                .fail(StreamError::Unimplemented("stream cannot seek to offset".into()));
            return -1;
        };
        match seek(&mut self.inner, position) {
            Ok(at) => at,
            Err(e) => {
                self.state.fail(StreamError::Unknown(format!("could not seek stream: {e}")));
                -1
            }
        }
    }

    fn do_read_to_buffer(&mut self, storage: &mut [u8]) -> usize {
        loop {
            match self.inner.read(storage) {
                Ok(0) => {
                    if !storage.is_empty() {
                        self.state.set_done(true);
                    }
                    return 0;
                }
                Ok(read) => return read,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.state.fail(StreamError::Unknown(format!("could not read stream: {e}")));
                    return 0;
                }
            }
        }
    }
}
