//! Delete command implementation.

use crate::session::{Kind, Session};
use assetrack_model::{EntityKind, Event, Item, Sensor};
use serde_json::Value;

pub fn run(session: &Session, kind: Kind, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let value = kind.identifier(id);
    let collection = match kind {
        Kind::Item => delete::<Item>(session, value)?,
        Kind::Sensor => delete::<Sensor>(session, value)?,
        Kind::Event => delete::<Event>(session, value)?,
    };
    println!("Deleted {} {}", collection, id);
    Ok(())
}

fn delete<K: EntityKind>(
    session: &Session,
    id: Value,
) -> Result<&'static str, Box<dyn std::error::Error>> {
    let schema = K::schema();
    let mut record = session.entity::<K>();
    record.set(schema.id_field, id)?;
    record.delete()?;
    Ok(schema.collection)
}
