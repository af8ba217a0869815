//! Append-only operation journal for the Assetrack document store.
//!
//! This crate provides:
//! - Checksummed, append-only frames for store mutations (inserts, updates, index definitions)
//! - A replaying reader that tolerates a torn final frame in permissive mode
//!
//! ## Quick Start
//!
//! ```rust
//! use assetrack_journal::{JournalReader, JournalRecord, JournalWriter, ReadMode, WriteOptions};
//! use serde_json::json;
//!
//! let dir = tempfile::tempdir()?;
//! let path = dir.path().join("store.atj");
//!
//! let mut writer = JournalWriter::open(&path, WriteOptions::default())?;
//! writer.append_record(&JournalRecord::Insert {
//!     collection: "item".to_string(),
//!     document: json!({"_id": "65f0c0de0000000000000001", "name": "Box"})
//!         .as_object()
//!         .cloned()
//!         .unwrap_or_default(),
//! })?;
//! writer.finish()?;
//!
//! for record in JournalReader::open(&path, ReadMode::Strict)? {
//!     println!("replaying {}", record?.collection());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Key Types
//!
//! - [`JournalWriter`] - Append records to journal files
//! - [`JournalReader`] - Replay records from journal files
//! - [`JournalRecord`] - One logged store mutation

#![deny(missing_docs)]

/// Error types for journal operations.
pub mod errors;
/// File header and frame encoding.
pub mod frame;
/// Journal reader implementation.
pub mod reader;
/// Logged store mutations.
pub mod record;
/// Journal writer implementation.
pub mod writer;

pub use errors::JournalError;
pub use reader::{JournalReader, ReadMode};
pub use record::JournalRecord;
pub use writer::{JournalWriter, WriteOptions};
