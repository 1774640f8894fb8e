pub mod base;
pub mod file;
pub mod memory;

pub use base::{DataWriter, WriterPhase, WriterState};
pub use file::{FileDataWriter, FileWriteOptions};
pub use memory::InMemoryDataWriter;
