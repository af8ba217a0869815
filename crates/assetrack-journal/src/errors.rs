use thiserror::Error;

/// Errors that can occur during journal operations.
#[derive(Error, Debug)]
pub enum JournalError {
    /// I/O error during read or write.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Missing or foreign file header.
    #[error("invalid journal header: {0}")]
    InvalidHeader(String),
    /// A frame prefix that no writer produces.
    #[error("invalid frame at offset {offset}: {reason}")]
    InvalidFrame {
        /// Byte offset where the frame starts.
        offset: u64,
        /// Reason for invalidity.
        reason: String,
    },
    /// A record too large to frame.
    #[error("payload size {size} exceeds maximum {max}")]
    PayloadTooLarge {
        /// Actual payload size.
        size: usize,
        /// Maximum allowed size.
        max: usize,
    },
    /// A frame whose payload does not match its checksum.
    #[error("checksum mismatch in frame at offset {offset}")]
    ChecksumMismatch {
        /// Byte offset where the frame starts.
        offset: u64,
    },
    /// Record payload is not a valid journal record.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
    /// The file is not empty but too short to hold a header.
    #[error("file is not empty; cannot initialize header")]
    FileNotEmpty,
    /// The file ends inside a frame (strict mode).
    #[error("truncated frame at offset {offset}")]
    TruncatedFrame {
        /// Byte offset where the frame starts.
        offset: u64,
    },
}
