//! reader/file.rs
//! Seekable reader over a file on disk.

use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::reader::base::{DataReader, ReaderState};
use crate::types::StreamError;

/// Reads a file from the beginning. The total length is taken from the file
/// metadata when it is opened.
///
/// A file that cannot be opened yields a reader already in the error state.
#[derive(Debug)]
pub struct FileDataReader {
    state: ReaderState,
    path: PathBuf,
    file: Option<File>,
}

impl FileDataReader {
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let mut state = ReaderState::new();

        let file = match File::open(&path) {
            Ok(file) => Some(file),
            Err(e) => {
                log::warn!("could not open {}: {}", path.display(), e);
                state.fail(StreamError::InvalidArgument(format!(
                    "could not open {}: {}",
                    path.display(),
                    e
                )));
                None
            }
        };

        if let Some(file) = &file {
            match file.metadata() {
                Ok(meta) => state.set_total_length(meta.len() as i64),
                Err(e) => log::debug!("length of {} unknown: {}", path.display(), e),
            }
        }

        Self { state, path, file }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DataReader for FileDataReader {
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
        let Some(file) = self.file.as_mut() else {
            self.state.fail(StreamError::InvalidArgument("file invalid".into()));
            return -1;
        };

        // The file may have changed since it was opened; never seek past its end.
        let target = match file.metadata() {
            Ok(meta) => position.min(meta.len() as i64),
            Err(e) => {
                self.state.fail(e.into());
                return -1;
            }
        };

        match file.seek(SeekFrom::Start(target as u64)) {
            Ok(at) => at as i64,
            Err(e) => {
                self.state.fail(e.into());
                -1
            }
        }
    }

    fn do_read_to_buffer(&mut self, storage: &mut [u8]) -> usize {
        let Some(file) = self.file.as_mut() else {
            return 0;
        };

        loop {
            match file.read(storage) {
                Ok(0) => {
                    if !storage.is_empty() {
                        self.state.set_done(true);
                    }
                    return 0;
                }
                Ok(read) => return read,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.state.fail(StreamError::Unknown(format!(
                        "could not read {}: {}",
                        self.path.display(),
                        e
                    )));
                    return 0;
                }
            }
        }
    }
}
