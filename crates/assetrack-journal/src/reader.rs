//! Journal replay.

use crate::errors::JournalError;
use crate::frame::{self, Decoded};
use crate::record::JournalRecord;
use std::fs;
use std::path::Path;
use tracing::warn;

/// How replay treats a damaged tail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    /// A short or torn last frame is an error.
    Strict,
    /// A short or torn last frame ends the journal.
    Permissive,
}

/// Replays the records of a journal file in append order.
///
/// The file is read whole on open; replay then walks the frames in memory.
/// Only the final frame may be short or fail its checksum, since that is all
/// an interrupted append can leave behind. A bad checksum anywhere else is
/// reported in either mode.
pub struct JournalReader {
    bytes: Vec<u8>,
    mode: ReadMode,
    position: usize,
    done: bool,
}

impl JournalReader {
    /// Reads the journal at `path` and validates its header.
    pub fn open<P: AsRef<Path>>(path: P, mode: ReadMode) -> Result<Self, JournalError> {
        let bytes = fs::read(path)?;
        frame::check_header(&bytes)?;
        Ok(Self {
            bytes,
            mode,
            position: frame::HEADER_LEN,
            done: false,
        })
    }

    /// Byte length of the intact prefix replayed so far.
    pub fn position(&self) -> u64 {
        self.position as u64
    }

    fn damaged_tail(&mut self, error: JournalError) -> Result<Option<JournalRecord>, JournalError> {
        if self.mode == ReadMode::Strict {
            return Err(error);
        }
        warn!(offset = self.position, %error, "ignoring damaged journal tail");
        self.done = true;
        Ok(None)
    }

    /// Returns the next record, or `None` once the journal is exhausted.
    pub fn read_record(&mut self) -> Result<Option<JournalRecord>, JournalError> {
        if self.done || self.position >= self.bytes.len() {
            return Ok(None);
        }

        let offset = self.position as u64;
        let rest = &self.bytes[self.position..];
        let remaining = rest.len();
        let decoded = frame::decode(rest).map_err(|e| match e {
            JournalError::InvalidFrame { reason, .. } => JournalError::InvalidFrame { offset, reason },
            other => other,
        })?;

        match decoded {
            Decoded::Frame { payload, consumed } => {
                let record = serde_json::from_slice(payload)?;
                self.position += consumed;
                Ok(Some(record))
            }
            Decoded::Truncated => self.damaged_tail(JournalError::TruncatedFrame { offset }),
            Decoded::Corrupt { consumed } if consumed == remaining => {
                self.damaged_tail(JournalError::ChecksumMismatch { offset })
            }
            Decoded::Corrupt { .. } => Err(JournalError::ChecksumMismatch { offset }),
        }
    }
}

impl Iterator for JournalReader {
    type Item = Result<JournalRecord, JournalError>;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.read_record();
        if next.is_err() {
            self.done = true;
        }
        next.transpose()
    }
}
