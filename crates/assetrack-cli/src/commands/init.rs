//! Init command implementation.

use crate::session::Session;
use assetrack_model::{Event, Item, Sensor};

pub fn run(session: &Session) -> Result<(), Box<dyn std::error::Error>> {
    session.entity::<Item>().ensure_indexes()?;
    session.entity::<Sensor>().ensure_indexes()?;
    session.entity::<Event>().ensure_indexes()?;
    println!("Unique indexes ready");
    Ok(())
}
