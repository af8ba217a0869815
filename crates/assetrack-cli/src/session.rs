//! Opened store plus the per-invocation settings every command shares.

use crate::payload;
use assetrack_model::{Entity, EntityKind, UniquenessScope};
use assetrack_store::{JournalStore, OpContext, ReadMode, StoreError};
use clap::ValueEnum;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Record kinds addressable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Kind {
    Item,
    Sensor,
    Event,
}

impl Kind {
    /// Business identifier value for a command-line argument.
    ///
    /// Item and sensor ids are stored as text, so `42` stays `"42"`; event
    /// timestamps are usually numbers and are parsed as JSON scalars.
    pub fn identifier(self, arg: &str) -> Value {
        match self {
            Kind::Item | Kind::Sensor => Value::String(arg.to_string()),
            Kind::Event => payload::parse_scalar(arg),
        }
    }
}

pub struct Session {
    store: JournalStore,
    timeout: Option<Duration>,
    uniqueness: UniquenessScope,
}

impl Session {
    pub fn open(
        path: &Path,
        strict: bool,
        timeout_ms: Option<u64>,
        uniqueness: UniquenessScope,
    ) -> Result<Self, StoreError> {
        let mode = if strict {
            ReadMode::Strict
        } else {
            ReadMode::Permissive
        };
        debug!(path = %path.display(), ?mode, "opening store");
        Ok(Self {
            store: JournalStore::open(path, mode)?,
            timeout: timeout_ms.map(Duration::from_millis),
            uniqueness,
        })
    }

    /// Fresh context for one command; the deadline starts now.
    pub fn ctx(&self) -> OpContext {
        match self.timeout {
            Some(timeout) => OpContext::with_timeout(timeout),
            None => OpContext::background(),
        }
    }

    pub fn store(&self) -> &JournalStore {
        &self.store
    }

    pub fn entity<K: EntityKind>(&self) -> Entity<'_, K, JournalStore> {
        Entity::new(&self.store)
            .with_context(self.ctx())
            .with_uniqueness(self.uniqueness)
    }
}
