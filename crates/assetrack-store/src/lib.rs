//! Document store gateway for Assetrack.
//!
//! This crate provides:
//! - The [`DocumentStore`] trait consumed by the entity model
//! - [`Document`] and [`ObjectId`] types
//! - A [`Filter`] predicate language with document-store matching rules
//! - [`OpContext`] deadlines and cancellation checked on every round trip
//! - [`MemoryStore`], an in-memory backend with atomic unique indexes
//! - [`JournalStore`], a `MemoryStore` persisted through `assetrack-journal`

#![deny(missing_docs)]

/// Operation context: deadlines and cancellation.
pub mod context;
/// Documents and store-generated identifiers.
pub mod document;
/// Error types for store operations.
pub mod error;
/// Query predicates.
pub mod filter;
/// Journal-backed storage implementation.
pub mod journal;
/// In-memory storage implementation.
pub mod memory;
/// Store gateway trait.
pub mod traits;
/// Validation helpers for store identifiers.
pub mod validation;

pub use assetrack_journal::ReadMode;
pub use context::OpContext;
pub use document::{Document, ObjectId, ID_FIELD};
pub use error::StoreError;
pub use filter::{Filter, Pattern};
pub use journal::JournalStore;
pub use memory::MemoryStore;
pub use traits::{DocumentStore, UpdateOutcome};
pub use validation::ValidationError;
