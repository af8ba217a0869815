use crate::validation::ValidationError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest as _, Sha256};
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

/// A stored document: a JSON object keyed by field name.
pub type Document = Map<String, Value>;

/// Field holding the store-generated identifier.
pub const ID_FIELD: &str = "_id";

const OBJECT_ID_PATTERN: &str = r"^[0-9a-f]{24}$";

/// Store-generated document identifier.
///
/// Twelve bytes: big-endian unix seconds, a per-process nonce, and a wrapping
/// counter. Rendered and persisted as 24 lowercase hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectId([u8; 12]);

static COUNTER: AtomicU32 = AtomicU32::new(0);

fn process_nonce() -> &'static [u8; 5] {
    static NONCE: OnceLock<[u8; 5]> = OnceLock::new();
    NONCE.get_or_init(|| {
        let mut hasher = Sha256::new();
        hasher.update(std::process::id().to_le_bytes());
        hasher.update(
            chrono::Utc::now()
                .timestamp_nanos_opt()
                .unwrap_or_default()
                .to_le_bytes(),
        );
        let digest = hasher.finalize();
        let mut nonce = [0u8; 5];
        nonce.copy_from_slice(&digest[..5]);
        nonce
    })
}

impl ObjectId {
    /// Generates a fresh identifier.
    pub fn new() -> Self {
        let secs = chrono::Utc::now().timestamp() as u32;
        let count = COUNTER.fetch_add(1, Ordering::Relaxed);

        let mut bytes = [0u8; 12];
        bytes[0..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..9].copy_from_slice(process_nonce());
        bytes[9..12].copy_from_slice(&count.to_be_bytes()[1..4]);
        Self(bytes)
    }

    /// Parses the 24-character hex form.
    pub fn parse(value: impl Into<String>) -> Result<Self, ValidationError> {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        let s = value.into();
        let pattern = PATTERN.get_or_init(|| Regex::new(OBJECT_ID_PATTERN).expect("invalid regex"));
        let mismatch = || ValidationError::PatternMismatch {
            field: "ObjectId",
            value: s.clone(),
        };
        if !pattern.is_match(&s) {
            return Err(mismatch());
        }
        let decoded = hex::decode(&s).map_err(|_| mismatch())?;
        let bytes: [u8; 12] = decoded.try_into().map_err(|_| mismatch())?;
        Ok(Self(bytes))
    }

    /// Unix seconds at which the identifier was generated.
    pub fn timestamp(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    /// Hex form, as stored under `_id`.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for ObjectId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ObjectId> for String {
    fn from(id: ObjectId) -> Self {
        id.to_hex()
    }
}

impl From<ObjectId> for Value {
    fn from(id: ObjectId) -> Self {
        Value::String(id.to_hex())
    }
}
