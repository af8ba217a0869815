//! Output formatting utilities.

use assetrack_store::{Document, ID_FIELD};
use serde_json::Value;

/// Formats a record as pretty JSON.
pub fn format_json(record: &Document) -> String {
    serde_json::to_string_pretty(record).unwrap_or_else(|_| "{}".to_string())
}

/// Formats a record as one JSON line.
pub fn format_json_line(record: &Document) -> String {
    serde_json::to_string(record).unwrap_or_else(|_| "{}".to_string())
}

/// Formats a record as a table row: store id, business id, remaining fields.
pub fn format_table_row(record: &Document, id_field: &str) -> String {
    let store_id = record.get(ID_FIELD).map(render).unwrap_or_else(|| "?".to_string());
    let business_id = record.get(id_field).map(render).unwrap_or_else(|| "?".to_string());
    let rest: Document = record
        .iter()
        .filter(|(k, _)| k.as_str() != ID_FIELD && k.as_str() != id_field)
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    format!(
        "{:<24} {:<20} {}",
        store_id,
        truncate(&business_id, 20),
        truncate(&format_json_line(&rest), 60)
    )
}

/// Prints table header.
#[allow(clippy::print_literal)]
pub fn print_table_header(id_field: &str) {
    println!("{:<24} {:<20} {}", "ID", id_field.to_uppercase(), "FIELDS");
    println!("{}", "-".repeat(106));
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn table_row_leads_with_identifiers() {
        let record = json!({"_id": "65f0c0de0000000000000001", "name": "Gate", "sensor_id": "s1"});
        let row = format_table_row(record.as_object().unwrap(), "sensor_id");
        assert!(row.starts_with("65f0c0de0000000000000001 s1 "));
        assert!(row.ends_with(r#"{"name":"Gate"}"#));
    }

    #[test]
    fn truncate_is_char_safe() {
        assert_eq!(truncate("ééééé", 4), "é...");
        assert_eq!(truncate("abc", 4), "abc");
    }
}
