use serde_json::{Map, Value};
use std::io;

use super::{breakdown_of, format_scalar};

const BATCH_SECTIONS: [&str; 4] = ["growth", "loans", "eligibility", "sip"];

/// Write output as CSV to stdout.
///
/// Calculations with a breakdown print one row per period; otherwise the
/// result is written as field/value pairs. Batch output lists one row per
/// parameter set.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    if let Some(map) = value.as_object() {
        if let Some(Value::Object(result)) = map.get("result") {
            match breakdown_of(result) {
                Some((_, rows)) if !rows.is_empty() => write_rows(&mut wtr, rows),
                _ => write_fields(&mut wtr, result),
            }
        } else if map.contains_key("succeeded") {
            write_batch(&mut wtr, map);
        } else {
            write_fields(&mut wtr, map);
        }
    } else {
        let _ = wtr.write_record([format_scalar(value)]);
    }

    let _ = wtr.flush();
}

fn write_fields<W: io::Write>(wtr: &mut csv::Writer<W>, map: &Map<String, Value>) {
    let _ = wtr.write_record(["field", "value"]);
    for (key, val) in map.iter().filter(|(_, v)| !v.is_array()) {
        let _ = wtr.write_record([key.as_str(), &format_scalar(val)]);
    }
}

fn write_rows<W: io::Write>(wtr: &mut csv::Writer<W>, rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        return;
    };
    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    let _ = wtr.write_record(&headers);

    for row in rows.iter().filter_map(Value::as_object) {
        let record: Vec<String> = headers
            .iter()
            .map(|h| row.get(*h).map(format_scalar).unwrap_or_default())
            .collect();
        let _ = wtr.write_record(&record);
    }
}

fn write_batch<W: io::Write>(wtr: &mut csv::Writer<W>, map: &Map<String, Value>) {
    let _ = wtr.write_record(["kind", "index", "status", "error"]);
    for kind in BATCH_SECTIONS {
        let Some(Value::Array(items)) = map.get(kind) else {
            continue;
        };
        for item in items {
            let index = item.get("index").map(format_scalar).unwrap_or_default();
            let error = item.get("error").map(format_scalar).unwrap_or_default();
            let status = if error.is_empty() { "ok" } else { "failed" };
            let _ = wtr.write_record([kind, index.as_str(), status, error.as_str()]);
        }
    }
}
