//! On-disk layout.
//!
//! ```text
//! file   = header frame*
//! header = "ATJ1" version:u16le                       (6 bytes)
//! frame  = len:u32le checksum:[u8; 8] payload:[u8; len]
//! ```
//!
//! `checksum` is the first eight bytes of the SHA-256 of `payload`. The
//! payload is a JSON-encoded [`JournalRecord`](crate::JournalRecord); its
//! `op` tag names the mutation, so frames carry no kind byte of their own.

use crate::errors::JournalError;
use sha2::{Digest, Sha256};

/// Journal file magic bytes.
pub const MAGIC: &[u8; 4] = b"ATJ1";

/// Current format version.
pub const VERSION: u16 = 2;

/// Length of the file header.
pub const HEADER_LEN: usize = 6;

/// Length of the per-frame prefix (length + checksum).
pub const PREFIX_LEN: usize = 12;

/// Maximum payload size of a single record: 16 MiB.
pub const MAX_PAYLOAD_SIZE: usize = 16 * 1024 * 1024;

/// Bytes written at the start of every journal.
pub fn header() -> [u8; HEADER_LEN] {
    let mut bytes = [0u8; HEADER_LEN];
    bytes[..4].copy_from_slice(MAGIC);
    bytes[4..].copy_from_slice(&VERSION.to_le_bytes());
    bytes
}

/// Validates a journal header.
pub fn check_header(bytes: &[u8]) -> Result<(), JournalError> {
    if bytes.len() < HEADER_LEN {
        return Err(JournalError::InvalidHeader(format!(
            "header too short: {} bytes",
            bytes.len()
        )));
    }
    if &bytes[..4] != MAGIC {
        return Err(JournalError::InvalidHeader(format!(
            "invalid magic: {:?}",
            &bytes[..4]
        )));
    }
    let version = u16::from_le_bytes([bytes[4], bytes[5]]);
    if version != VERSION {
        return Err(JournalError::InvalidHeader(format!(
            "unsupported version {}, expected {}",
            version, VERSION
        )));
    }
    Ok(())
}

fn checksum(payload: &[u8]) -> [u8; 8] {
    let digest = Sha256::digest(payload);
    let mut out = [0u8; 8];
    out.copy_from_slice(&digest[..8]);
    out
}

/// Encodes `payload` as a complete frame.
pub fn encode(payload: &[u8]) -> Result<Vec<u8>, JournalError> {
    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(JournalError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD_SIZE,
        });
    }
    let mut frame = Vec::with_capacity(PREFIX_LEN + payload.len());
    frame.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    frame.extend_from_slice(&checksum(payload));
    frame.extend_from_slice(payload);
    Ok(frame)
}

/// Outcome of decoding the frame at the start of a buffer.
#[derive(Debug, PartialEq, Eq)]
pub enum Decoded<'a> {
    /// An intact frame and its total encoded length.
    Frame {
        /// Record payload.
        payload: &'a [u8],
        /// Prefix plus payload length.
        consumed: usize,
    },
    /// The buffer ends before the frame does.
    Truncated,
    /// The payload does not match its checksum.
    Corrupt {
        /// Prefix plus payload length.
        consumed: usize,
    },
}

/// Decodes the frame at the start of `bytes`.
///
/// A length over [`MAX_PAYLOAD_SIZE`] is reported as an error with an offset
/// of 0; the reader substitutes the real position.
pub fn decode(bytes: &[u8]) -> Result<Decoded<'_>, JournalError> {
    if bytes.len() < PREFIX_LEN {
        return Ok(Decoded::Truncated);
    }
    let len = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
    if len > MAX_PAYLOAD_SIZE {
        return Err(JournalError::InvalidFrame {
            offset: 0,
            reason: format!("payload size {} exceeds maximum {}", len, MAX_PAYLOAD_SIZE),
        });
    }
    let consumed = PREFIX_LEN + len;
    let Some(payload) = bytes.get(PREFIX_LEN..consumed) else {
        return Ok(Decoded::Truncated);
    };
    if bytes[4..PREFIX_LEN] != checksum(payload) {
        return Ok(Decoded::Corrupt { consumed });
    }
    Ok(Decoded::Frame { payload, consumed })
}
