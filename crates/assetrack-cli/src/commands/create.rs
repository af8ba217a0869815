//! Create command implementation.

use crate::output;
use crate::payload;
use crate::session::{Kind, Session};
use assetrack_model::{EntityKind, Event, Item, Sensor};

pub fn run(session: &Session, kind: Kind, payload: &str) -> Result<(), Box<dyn std::error::Error>> {
    match kind {
        Kind::Item => create::<Item>(session, payload),
        Kind::Sensor => create::<Sensor>(session, payload),
        Kind::Event => create::<Event>(session, payload),
    }
}

fn create<K: EntityKind>(session: &Session, payload: &str) -> Result<(), Box<dyn std::error::Error>> {
    let document = payload::parse_document(payload)?;
    let mut record = session.entity::<K>();
    record.create_from_request(&document)?;
    println!("{}", output::format_json(&record.to_document()));
    Ok(())
}
