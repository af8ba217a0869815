//! Update command implementation.

use crate::output;
use crate::payload;
use crate::session::{Kind, Session};
use assetrack_model::{EntityKind, Event, Item, Sensor};
use serde_json::Value;

pub fn run(
    session: &Session,
    kind: Kind,
    id: &str,
    payload: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let id = kind.identifier(id);
    match kind {
        Kind::Item => update::<Item>(session, id, payload),
        Kind::Sensor => update::<Sensor>(session, id, payload),
        Kind::Event => update::<Event>(session, id, payload),
    }
}

fn update<K: EntityKind>(
    session: &Session,
    id: Value,
    payload: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let document = payload::parse_document(payload)?;
    let mut record = session.entity::<K>().lookup(id)?;
    record.update_from_request(&document)?;
    println!("{}", output::format_json(&record.to_document()));
    Ok(())
}
