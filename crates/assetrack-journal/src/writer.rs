//! Journal appends.

use crate::errors::JournalError;
use crate::frame;
use crate::record::JournalRecord;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Options for journal writing.
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Fsync after every append.
    pub sync: bool,
}

/// Appends records to a journal file, creating it on first use.
pub struct JournalWriter {
    file: File,
    sync: bool,
}

impl JournalWriter {
    /// Opens the journal at `path` for appending.
    ///
    /// An empty or missing file gets a fresh header. An existing file must
    /// carry a valid header; the writer is positioned at its end.
    pub fn open<P: AsRef<Path>>(path: P, options: WriteOptions) -> Result<Self, JournalError> {
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(path)?;

        let len = file.metadata()?.len();
        if len == 0 {
            file.write_all(&frame::header())?;
        } else if len < frame::HEADER_LEN as u64 {
            return Err(JournalError::FileNotEmpty);
        } else {
            let mut header = [0u8; frame::HEADER_LEN];
            file.read_exact(&mut header)?;
            frame::check_header(&header)?;
            file.seek(SeekFrom::End(0))?;
        }

        let mut writer = Self {
            file,
            sync: options.sync,
        };
        writer.synced()?;
        Ok(writer)
    }

    fn synced(&mut self) -> Result<(), JournalError> {
        if self.sync {
            self.file.sync_all()?;
        }
        Ok(())
    }

    /// Appends one store mutation.
    ///
    /// The frame goes out in a single write, so an interrupted append leaves
    /// at most one short or torn frame at the end of the file.
    pub fn append_record(&mut self, record: &JournalRecord) -> Result<(), JournalError> {
        let payload = serde_json::to_vec(record)?;
        self.file.write_all(&frame::encode(&payload)?)?;
        self.synced()
    }

    /// Cuts the file to `len` bytes (never into the header) and appends from there.
    pub fn truncate_to(&mut self, len: u64) -> Result<(), JournalError> {
        let len = len.max(frame::HEADER_LEN as u64);
        self.file.set_len(len)?;
        self.file.seek(SeekFrom::Start(len))?;
        self.synced()
    }

    /// Flushes outstanding data to disk and closes the file.
    pub fn finish(mut self) -> Result<(), JournalError> {
        self.file.sync_all()?;
        Ok(())
    }
}
