//! List and search command implementation.

use crate::output;
use crate::session::{Kind, Session};
use assetrack_model::{EntityKind, Event, Item, Sensor};
use assetrack_store::{Document, Pattern};

pub fn run(
    session: &Session,
    kind: Kind,
    search: Option<(&str, bool)>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    match kind {
        Kind::Item => list::<Item>(session, search, json),
        Kind::Sensor => list::<Sensor>(session, search, json),
        Kind::Event => list::<Event>(session, search, json),
    }
}

fn list<K: EntityKind>(
    session: &Session,
    search: Option<(&str, bool)>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let entity = session.entity::<K>();
    let records = match search {
        Some((text, true)) => entity.search_with(Pattern::literal(text)?)?,
        Some((pattern, false)) => entity.search(pattern)?,
        None => entity.get_all()?,
    };
    print_records(&records, K::schema().id_field, json);
    Ok(())
}

/// Prints records as JSON lines or as a table keyed by `id_field`.
pub fn print_records(records: &[Document], id_field: &str, json: bool) {
    if json {
        for record in records {
            println!("{}", output::format_json_line(record));
        }
        return;
    }

    output::print_table_header(id_field);
    for record in records {
        println!("{}", output::format_table_row(record, id_field));
    }
}
