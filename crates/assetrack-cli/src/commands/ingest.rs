//! Ingest command implementation.

use crate::output;
use crate::payload;
use crate::session::Session;
use assetrack_model::{ingest_reading, SensorReading};

pub fn run(
    session: &Session,
    sensor_id: String,
    tag_id: String,
    timestamp: &str,
    details: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let reading = SensorReading {
        sensor_id,
        tag_id,
        event_timestamp: payload::parse_scalar(timestamp),
        event_details: payload::parse_json(details)?,
    };
    let event = ingest_reading(session.store(), &session.ctx(), reading)?;
    println!("{}", output::format_json(&event.to_document()));
    Ok(())
}
