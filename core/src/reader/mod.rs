pub mod base;
pub mod composite;
pub mod file;
pub mod io;
pub mod memory;

pub use base::*;
pub use composite::CompositeDataReader;
pub use file::FileDataReader;
pub use io::IoDataReader;
pub use memory::InMemoryDataReader;
