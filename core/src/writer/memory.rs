//! writer/memory.rs
//! Writer that accumulates into a growable buffer.

use bytes::Bytes;

use crate::reader::base::DataReader;
use crate::reader::memory::InMemoryDataReader;
use crate::types::Status;
use crate::writer::base::{DataWriter, WriterState};

#[derive(Debug, Default)]
pub struct InMemoryDataWriter {
    state: WriterState,
    buffer: Vec<u8>,
}

impl InMemoryDataWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }
}

impl DataWriter for InMemoryDataWriter {
    fn state(&self) -> &WriterState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut WriterState {
        &mut self.state
    }

    fn do_clear(&mut self) -> Status {
        self.buffer.clear();
        Ok(())
    }

    fn do_begin(&mut self) -> Status {
        self.do_clear()
    }

    fn do_write(&mut self, data: &[u8]) -> Status {
        self.buffer.extend_from_slice(data);
        Ok(())
    }

    /// Snapshot of the buffer; later writes do not show up in the reader.
    fn do_new_reader(&mut self) -> Box<dyn DataReader + 'static> {
        Box::new(InMemoryDataReader::new(Bytes::copy_from_slice(&self.buffer)))
    }
}
