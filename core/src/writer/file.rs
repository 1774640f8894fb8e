//! writer/file.rs
//! Writer backed by a file on disk.
//!
//! Design notes:
//! - The file is created (or truncated) by `begin`, flushed and closed by `end`.
//! - New files are owner read/write only unless `FileWriteOptions` says otherwise.
//! - `clear` truncates the file; a writer with nothing written reads back empty.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::reader::base::{DataReader, InvalidDataReader};
use crate::reader::file::FileDataReader;
use crate::reader::memory::InMemoryDataReader;
use crate::types::{Status, StreamError};
use crate::writer::base::{DataWriter, WriterPhase, WriterState};

/// Owner read/write.
pub const DEFAULT_FILE_MODE: u32 = 0o600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileWriteOptions {
    /// Unix permission bits for newly created files. Ignored elsewhere.
    pub mode: u32,
}

impl Default for FileWriteOptions {
    fn default() -> Self {
        Self { mode: DEFAULT_FILE_MODE }
    }
}

#[derive(Debug)]
pub struct FileDataWriter {
    state: WriterState,
    path: PathBuf,
    options: FileWriteOptions,
    file: Option<BufWriter<File>>,
}

impl FileDataWriter {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self::with_options(path, FileWriteOptions::default())
    }

    pub fn with_options(path: impl AsRef<Path>, options: FileWriteOptions) -> Self {
        Self {
            state: WriterState::new(),
            path: path.as_ref().to_path_buf(),
            options,
            file: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open_options(&self) -> OpenOptions {
        let mut opts = OpenOptions::new();
        opts.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            opts.mode(self.options.mode);
        }
        opts
    }

    fn close(&mut self) -> Status {
        let Some(mut file) = self.file.take() else {
            return Ok(());
        };
        file.flush()
            .map_err(|e| StreamError::Unknown(format!("error closing {}: {}", self.path.display(), e)))
    }
}

impl DataWriter for FileDataWriter {
    fn state(&self) -> &WriterState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut WriterState {
        &mut self.state
    }

    fn do_clear(&mut self) -> Status {
        self.file = None;
        if !self.path.exists() {
            return Ok(());
        }
        match self.open_options().open(&self.path) {
            Ok(_) => Ok(()),
            Err(e) => Err(StreamError::Unknown(format!(
                "could not truncate {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    fn do_begin(&mut self) -> Status {
        // Reopening discards whatever an earlier session left half written.
        self.file = None;
        match self.open_options().open(&self.path) {
            Ok(file) => {
                self.file = Some(BufWriter::new(file));
                Ok(())
            }
            Err(e) => {
                let err = StreamError::InvalidArgument(format!(
                    "could not open {}: {}",
                    self.path.display(),
                    e
                ));
                log::warn!("{}", err);
                Err(err)
            }
        }
    }

    fn do_end(&mut self) -> Status {
        self.close()
    }

    fn do_write(&mut self, data: &[u8]) -> Status {
        let Some(file) = self.file.as_mut() else {
            return Err(StreamError::FailedPrecondition("file not open".into()));
        };
        file.write_all(data).map_err(StreamError::from)
    }

    fn do_new_reader(&mut self) -> Box<dyn DataReader + 'static> {
        // Nothing written since the last clear (or ever).
        if self.file.is_none() && self.state.phase() == WriterPhase::Fresh {
            return Box::new(InMemoryDataReader::new(Bytes::new()));
        }
        if let Some(file) = self.file.as_mut() {
            if let Err(e) = file.flush() {
                let err = StreamError::Unknown(format!("could not flush {}: {}", self.path.display(), e));
                log::warn!("{}", err);
                self.state.set_status(Err(err.clone()));
                return Box::new(InvalidDataReader::new(err));
            }
        }
        Box::new(FileDataReader::open(&self.path))
    }
}

impl Drop for FileDataWriter {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::warn!("{}", e);
        }
    }
}
