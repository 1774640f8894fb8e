//! writer/base.rs
//! Push-side counterpart of `DataReader`.
//!
//! Design notes:
//! - Lifecycle: fresh -> `begin` -> writable -> `end` -> closed. `clear` goes
//!   back to fresh and discards what was written.
//! - `write` begins implicitly on first use.
//! - A failed writer stays failed: writes short-circuit with the stored error
//!   and `new_reader` hands out an always-erroring reader.

use crate::constants::WRITER_COPY_CHUNK_SIZE;
use crate::reader::base::{DataReader, InvalidDataReader};
use crate::types::{Status, StreamError};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WriterPhase {
    Fresh,
    Writable,
    Closed,
}

/// Size/phase/status bookkeeping embedded in every writer.
#[derive(Debug, Clone)]
pub struct WriterState {
    size: u64,
    phase: WriterPhase,
    status: Status,
}

impl Default for WriterState {
    fn default() -> Self {
        Self::new()
    }
}

impl WriterState {
    pub fn new() -> Self {
        Self { size: 0, phase: WriterPhase::Fresh, status: Ok(()) }
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn phase(&self) -> WriterPhase {
        self.phase
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn set_status(&mut self, status: Status) {
        self.status = status;
    }
}

pub trait DataWriter {
    fn state(&self) -> &WriterState;
    fn state_mut(&mut self) -> &mut WriterState;

    /// Discard everything written so far.
    fn do_clear(&mut self) -> Status {
        Ok(())
    }

    /// Prepare the backing store for a fresh sequence of writes.
    fn do_begin(&mut self) -> Status {
        Ok(())
    }

    fn do_end(&mut self) -> Status {
        Ok(())
    }

    fn do_write(&mut self, data: &[u8]) -> Status;

    /// Reader over exactly the bytes written so far, starting at offset 0.
    fn do_new_reader(&mut self) -> Box<dyn DataReader + 'static>;

    // -------------------------------------------------------------------------
    // Public API
    // -------------------------------------------------------------------------

    /// Bytes written since the last `begin`.
    fn size(&self) -> u64 {
        self.state().size
    }

    fn ok(&self) -> bool {
        self.state().status.is_ok()
    }

    fn status(&self) -> Status {
        self.state().status.clone()
    }

    fn clear(&mut self) -> Status {
        let status = self.do_clear();
        let state = self.state_mut();
        state.size = 0;
        state.phase = WriterPhase::Fresh;
        state.status = status.clone();
        status
    }

    fn begin(&mut self) -> Status {
        let status = self.do_begin();
        let state = self.state_mut();
        state.size = 0;
        state.phase = if status.is_ok() { WriterPhase::Writable } else { WriterPhase::Fresh };
        state.status = status.clone();
        status
    }

    fn end(&mut self) -> Status {
        let status = self.do_end();
        let state = self.state_mut();
        state.phase = WriterPhase::Closed;
        state.status = status.clone();
        status
    }

    fn write(&mut self, data: &[u8]) -> Status {
        if self.state().phase == WriterPhase::Closed {
            return Err(StreamError::FailedPrecondition("write after end".into()));
        }
        if let Err(e) = &self.state().status {
            log::warn!("write to a failed writer: {}", e);
            return Err(e.clone());
        }
        if self.state().phase == WriterPhase::Fresh {
            log::debug!("writer used before begin; beginning implicitly");
            self.begin()?;
        }

        let status = self.do_write(data);
        let state = self.state_mut();
        if status.is_ok() {
            state.size += data.len() as u64;
        }
        state.status = status.clone();
        status
    }

    /// Copy up to `max_bytes` (everything when `None`) from `reader`.
    ///
    /// A reader error becomes the writer's status.
    fn write_reader(&mut self, reader: &mut dyn DataReader, max_bytes: Option<u64>) -> Status {
        self.status()?;

        if !reader.done() {
            let max_bytes = max_bytes.unwrap_or(u64::MAX);
            let known = reader.total_length_if_known();
            let mut remaining = if known >= 0 && reader.offset() >= 0 {
                ((known - reader.offset()).max(0) as u64).min(max_bytes)
            } else {
                max_bytes
            };

            if remaining > 0 {
                let chunk_size = remaining.min(WRITER_COPY_CHUNK_SIZE as u64) as usize;
                let mut buffer = vec![0u8; chunk_size];
                while remaining > 0 && !reader.done() {
                    let want = remaining.min(chunk_size as u64) as usize;
                    let read = reader.read_to_buffer(&mut buffer[..want]);
                    self.write(&buffer[..read])?;
                    remaining -= read as u64;
                }
            }
        }

        if let Err(e) = reader.status() {
            self.state_mut().status = Err(e);
        }
        self.status()
    }

    /// Reader over what was written. A failed writer yields a reader that
    /// carries its error.
    fn new_reader(&mut self) -> Box<dyn DataReader + 'static> {
        if let Err(e) = &self.state().status {
            log::error!("reader requested from a failed writer: {}", e);
            return Box::new(InvalidDataReader::new(e.clone()));
        }
        self.do_new_reader()
    }
}
