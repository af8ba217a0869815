//! Parsing of JSON arguments.

use assetrack_store::Document;
use serde_json::Value;
use std::fs;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("failed to read payload file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("payload must be a JSON object")]
    NotObject,
}

/// Parses an inline JSON value, or reads one from `@path`.
pub fn parse_json(arg: &str) -> Result<Value, PayloadError> {
    let text = match arg.strip_prefix('@') {
        Some(path) => fs::read_to_string(path).map_err(|source| PayloadError::Read {
            path: path.to_string(),
            source,
        })?,
        None => arg.to_string(),
    };
    Ok(serde_json::from_str(&text)?)
}

/// Parses a JSON object payload.
pub fn parse_document(arg: &str) -> Result<Document, PayloadError> {
    match parse_json(arg)? {
        Value::Object(document) => Ok(document),
        _ => Err(PayloadError::NotObject),
    }
}

/// Interprets a timestamp-like argument: JSON scalars (`100`, `1.5`) keep
/// their type, anything else is taken as a string.
pub fn parse_scalar(arg: &str) -> Value {
    match serde_json::from_str::<Value>(arg) {
        Ok(value) if !value.is_object() && !value.is_array() && !value.is_null() => value,
        _ => Value::String(arg.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn scalars_keep_their_json_type() {
        assert_eq!(parse_scalar("I1"), json!("I1"));
        assert_eq!(parse_scalar("100"), json!(100));
        assert_eq!(parse_scalar("1.5"), json!(1.5));
        assert_eq!(parse_scalar("\"100\""), json!("100"));
        assert_eq!(parse_scalar("null"), json!("null"));
    }

    #[test]
    fn documents_must_be_objects() {
        assert_eq!(parse_document(r#"{"a": 1}"#).unwrap()["a"], 1);
        assert!(matches!(parse_document("[1]"), Err(PayloadError::NotObject)));
        assert!(matches!(parse_document("{"), Err(PayloadError::Json(_))));
    }

    #[test]
    fn payload_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"name": "Box"}}"#).unwrap();
        let arg = format!("@{}", file.path().display());
        assert_eq!(parse_document(&arg).unwrap()["name"], "Box");

        assert!(matches!(
            parse_document("@/nonexistent/payload.json"),
            Err(PayloadError::Read { .. })
        ));
    }
}
