//! codec/reader.rs
//! Chunked transform engine: a reader that pulls fixed-size chunks from a
//! source, runs them through a `ChunkTransform` and serves the output.
//!
//! Design notes:
//! - At most one transformed chunk is buffered; it is drained completely
//!   before the next chunk is pulled.
//! - The transform sees `is_final = true` exactly once per pass, on the chunk
//!   that ends the source.
//! - Seeking inside the buffered chunk moves the cursor. Any other backward
//!   seek (or any seek after a failure) rewinds the source to 0, restarts the
//!   transform and replays up to the target; forward seeks transform and
//!   discard the bytes in between. Cost is linear in the distance replayed.

use crate::codec::types::{ChunkTransform, Direction};
use crate::constants::MAX_CHUNK_SIZE;
use crate::reader::base::{DataReader, ReaderState};
use crate::telemetry::TransformCounters;
use crate::types::StreamError;
use crate::utils::check_chunk_size;

/// Transformed bytes waiting to be read: `storage[pos..end]`.
struct OutputBuffer {
    storage: Vec<u8>,
    pos: usize,
    end: usize,
}

impl OutputBuffer {
    fn new(capacity: usize) -> Self {
        Self { storage: vec![0u8; capacity], pos: 0, end: 0 }
    }

    fn remaining(&self) -> usize {
        self.end - self.pos
    }

    fn clear(&mut self) {
        self.pos = 0;
        self.end = 0;
    }
}

pub struct CodecReader<S: DataReader, T: ChunkTransform> {
    state: ReaderState,
    source: S,
    transform: T,
    direction: Direction,
    chunk: Vec<u8>,
    buffer: OutputBuffer,
    read_final: bool,
    needs_replay: bool,
    counters: TransformCounters,
}

impl<S: DataReader, T: ChunkTransform> CodecReader<S, T> {
    /// Summary: wrap `source` with `transform`.
    ///
    /// `chunk_size` raw bytes are pulled per step and `buffer_size` must hold
    /// the transform's output for one full chunk, including its final step.
    ///
    /// Errors:
    /// - `InvalidArgument` for a zero or oversized chunk or buffer.
    /// - Whatever the transform's `init` reports.
    pub fn new(
        source: S,
        mut transform: T,
        direction: Direction,
        chunk_size: usize,
        buffer_size: usize,
    ) -> Result<Self, StreamError> {
        check_chunk_size("chunk size", chunk_size, MAX_CHUNK_SIZE)?;
        check_chunk_size("buffer size", buffer_size, 2 * MAX_CHUNK_SIZE)?;
        transform.init()?;

        Ok(Self {
            state: ReaderState::new(),
            source,
            transform,
            direction,
            chunk: vec![0u8; chunk_size],
            buffer: OutputBuffer::new(buffer_size),
            read_final: false,
            needs_replay: false,
            counters: TransformCounters::default(),
        })
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk.len()
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer.storage.len()
    }

    pub fn counters(&self) -> &TransformCounters {
        &self.counters
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }

    fn fail(&mut self, error: StreamError) {
        self.buffer.clear();
        self.needs_replay = true;
        self.state.fail(error);
    }

    /// Refill the output buffer if it is drained. Returns the bytes available.
    fn maybe_fetch_next_chunk(&mut self) -> usize {
        if self.buffer.pos < self.buffer.end {
            return self.buffer.remaining();
        }

        let read = self.source.read_to_buffer(&mut self.chunk);
        if let Err(e) = self.source.status() {
            self.fail(e);
            return 0;
        }

        if read > 0 || (self.source.done() && !self.read_final) {
            let is_final = self.source.done();
            let produced = match self.transform.transform_chunk(
                self.direction,
                &self.chunk[..read],
                is_final,
                &mut self.buffer.storage,
            ) {
                Ok(n) => n,
                Err(e) => {
                    self.fail(e);
                    return 0;
                }
            };
            self.read_final = is_final;

            if produced > self.buffer.storage.len() {
                self.fail(StreamError::Internal(format!(
                    "transform produced {} bytes into a {} byte buffer",
                    produced,
                    self.buffer.storage.len()
                )));
                return 0;
            }

            self.buffer.pos = 0;
            self.buffer.end = produced;
            self.counters.add_chunk(read, produced);
            log::trace!(
                "{:?} chunk: {} -> {} bytes{}",
                self.direction,
                read,
                produced,
                if is_final { " (final)" } else { "" }
            );
        }

        self.buffer.remaining()
    }

    /// Rewind the source and restart the transform.
    fn replay_from_start(&mut self) -> bool {
        if self.source.set_offset(0) < 0 {
            let status = self.source.status();
            self.state.set_status(status);
            return false;
        }
        if let Err(e) = self.transform.init() {
            self.fail(e);
            return false;
        }
        self.buffer.clear();
        self.read_final = false;
        self.needs_replay = false;
        self.counters.add_replay();
        true
    }
}

impl<S: DataReader, T: ChunkTransform> DataReader for CodecReader<S, T> {
    fn state(&self) -> &ReaderState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ReaderState {
        &mut self.state
    }

    fn seekable(&self) -> bool {
        self.source.seekable()
    }

    fn do_read_to_buffer(&mut self, storage: &mut [u8]) -> usize {
        let have = self.maybe_fetch_next_chunk();
        if !self.state.is_ok() {
            return 0;
        }

        let n = have.min(storage.len());
        let start = self.buffer.pos;
        storage[..n].copy_from_slice(&self.buffer.storage[start..start + n]);
        self.buffer.pos += n;
        if self.buffer.pos == self.buffer.end {
            let finished = self.source.done() && self.read_final;
            self.state.set_done(finished);
        }
        n
    }

    fn do_set_offset(&mut self, position: i64) -> i64 {
        let offset = self.state.offset();
        let rel = position - offset;

        if !self.needs_replay
            && offset >= 0
            && rel >= -(self.buffer.pos as i64)
            && rel <= self.buffer.remaining() as i64
        {
            self.buffer.pos = (self.buffer.pos as i64 + rel) as usize;
            return position;
        }

        let mut at: i64;
        if rel < 0 || offset < 0 || self.needs_replay {
            log::debug!("replaying {:?} stream from 0 to reach {}", self.direction, position);
            if !self.replay_from_start() {
                return -1;
            }
            at = 0;
        } else {
            at = offset + self.buffer.remaining() as i64;
            self.buffer.pos = self.buffer.end;
        }

        while at < position {
            let have = self.maybe_fetch_next_chunk();
            if !self.state.is_ok() {
                return -1;
            }
            if have == 0 {
                if self.read_final {
                    self.state.set_done(true);
                    break;
                }
                continue;
            }
            let delta = (have as i64).min(position - at);
            at += delta;
            self.buffer.pos += delta as usize;
        }

        at
    }
}
