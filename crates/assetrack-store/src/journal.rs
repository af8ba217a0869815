//! Journal-backed document store.

use crate::context::OpContext;
use crate::document::{Document, ObjectId};
use crate::error::StoreError;
use crate::filter::Filter;
use crate::memory::MemoryStore;
use crate::traits::{DocumentStore, UpdateOutcome};
use assetrack_journal::{
    JournalError, JournalReader, JournalRecord, JournalWriter, ReadMode, WriteOptions,
};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

/// Document store persisted as an append-only journal of mutations.
///
/// Opening replays the journal into a [`MemoryStore`]; every successful insert,
/// update, and index declaration is appended before it becomes visible, so a
/// failed append leaves both the file and the in-memory state untouched.
pub struct JournalStore {
    memory: MemoryStore,
    writer: Mutex<JournalWriter>,
    path: PathBuf,
}

impl JournalStore {
    /// Opens (or creates) the journal at `path` and replays it.
    ///
    /// In [`ReadMode::Permissive`] a truncated tail left by an interrupted
    /// append is discarded; in [`ReadMode::Strict`] it is an error.
    pub fn open<P: AsRef<Path>>(path: P, mode: ReadMode) -> Result<Self, StoreError> {
        Self::open_with(path, mode, WriteOptions::default())
    }

    /// Like [`JournalStore::open`], with explicit writer options.
    pub fn open_with<P: AsRef<Path>>(
        path: P,
        mode: ReadMode,
        options: WriteOptions,
    ) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let memory = MemoryStore::new();

        let mut replayed = 0u64;
        let mut valid_len = None;
        let has_content = std::fs::metadata(&path).map(|m| m.len() > 0).unwrap_or(false);
        if has_content {
            let mut reader = JournalReader::open(&path, mode)?;
            while let Some(record) = reader.read_record()? {
                memory.replay(record)?;
                replayed += 1;
            }
            valid_len = Some(reader.position());
        }

        let mut writer = JournalWriter::open(&path, options)?;
        if let Some(len) = valid_len {
            let on_disk = std::fs::metadata(&path).map_err(JournalError::from)?.len();
            if on_disk > len {
                writer.truncate_to(len)?;
            }
        }

        info!(path = %path.display(), records = replayed, "opened journal store");
        Ok(Self {
            memory,
            writer: Mutex::new(writer),
            path,
        })
    }

    /// Path of the backing journal file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(
        writer: &Mutex<JournalWriter>,
        record: &JournalRecord,
    ) -> Result<(), StoreError> {
        let mut writer = writer.lock().map_err(|_| StoreError::LockPoisoned)?;
        writer.append_record(record)?;
        debug!(collection = record.collection(), "appended journal record");
        Ok(())
    }
}

impl DocumentStore for JournalStore {
    fn find_one(
        &self,
        ctx: &OpContext,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        self.memory.find_one(ctx, collection, filter)
    }

    fn find_many(
        &self,
        ctx: &OpContext,
        collection: &str,
        filter: &Filter,
    ) -> Result<Vec<Document>, StoreError> {
        self.memory.find_many(ctx, collection, filter)
    }

    fn count(
        &self,
        ctx: &OpContext,
        collection: &str,
        filter: &Filter,
    ) -> Result<u64, StoreError> {
        self.memory.count(ctx, collection, filter)
    }

    fn insert_one(
        &self,
        ctx: &OpContext,
        collection: &str,
        document: Document,
    ) -> Result<ObjectId, StoreError> {
        self.memory.insert_with(ctx, collection, document, |document| {
            let record = JournalRecord::Insert {
                collection: collection.to_string(),
                document: document.clone(),
            };
            Self::append(&self.writer, &record)
        })
    }

    fn update_one(
        &self,
        ctx: &OpContext,
        collection: &str,
        filter: &Filter,
        set: Document,
    ) -> Result<UpdateOutcome, StoreError> {
        self.memory
            .update_with(ctx, collection, filter, set, |id, set| {
                let record = JournalRecord::Update {
                    collection: collection.to_string(),
                    id: id.to_string(),
                    set: set.clone(),
                };
                Self::append(&self.writer, &record)
            })
    }

    fn create_unique_index(
        &self,
        ctx: &OpContext,
        collection: &str,
        field: &str,
        scope: Filter,
    ) -> Result<(), StoreError> {
        self.memory
            .create_index_with(ctx, collection, field, scope, |field, scope| {
                let record = JournalRecord::Index {
                    collection: collection.to_string(),
                    field: field.to_string(),
                    scope: serde_json::to_value(scope)?,
                };
                Self::append(&self.writer, &record)
            })
    }
}
