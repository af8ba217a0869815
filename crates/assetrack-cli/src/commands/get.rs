//! Get command implementation.

use crate::output;
use crate::session::{Kind, Session};
use assetrack_model::{EntityKind, Event, Item, Sensor};
use serde_json::Value;

pub fn run(session: &Session, kind: Kind, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let id = kind.identifier(id);
    match kind {
        Kind::Item => get::<Item>(session, id),
        Kind::Sensor => get::<Sensor>(session, id),
        Kind::Event => get::<Event>(session, id),
    }
}

fn get<K: EntityKind>(session: &Session, id: Value) -> Result<(), Box<dyn std::error::Error>> {
    let record = session.entity::<K>().lookup(id)?;
    println!("{}", output::format_json(&record.to_document()));
    Ok(())
}
