//! Events command implementation.

use crate::commands::list::print_records;
use crate::payload;
use crate::session::Session;
use assetrack_model::{EntityKind, Event, EventQuery, Selector};

fn selector(mut values: Vec<String>) -> Option<Selector> {
    match values.len() {
        0 => None,
        1 => values.pop().map(|v| Selector::from(v.as_str())),
        _ => Some(Selector::from(values)),
    }
}

pub fn run(
    session: &Session,
    sensors: Vec<String>,
    items: Vec<String>,
    range: Option<(String, String)>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut query = EventQuery::new();
    query.sensor_id = selector(sensors);
    query.item_id = selector(items);
    if let Some((start, end)) = range {
        query = query.between(
            payload::parse_scalar(&start),
            payload::parse_scalar(&end),
        );
    }

    let events = session.entity::<Event>().filter(&query)?;
    print_records(&events, Event::schema().id_field, json);
    Ok(())
}
