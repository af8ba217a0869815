//! Count command implementation.

use crate::session::{Kind, Session};
use assetrack_model::{event_count, Item, Sensor};

pub fn run(session: &Session, kind: Kind) -> Result<(), Box<dyn std::error::Error>> {
    let count = match kind {
        Kind::Item => session.entity::<Item>().count()?,
        Kind::Sensor => session.entity::<Sensor>().count()?,
        Kind::Event => event_count(session.store(), &session.ctx())?,
    };
    println!("{}", count);
    Ok(())
}
