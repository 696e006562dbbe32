use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{breakdown_of, format_scalar};

const BATCH_SECTIONS: [&str; 4] = ["growth", "loans", "eligibility", "sip"];

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(Value::Object(result)) = map.get("result") {
                print_result(result, map);
            } else if map.contains_key("succeeded") {
                print_batch(map);
            } else {
                print_fields(map);
            }
        }
        _ => println!("{}", value),
    }
}

fn print_result(result: &Map<String, Value>, envelope: &Map<String, Value>) {
    print_fields(result);

    if let Some((name, rows)) = breakdown_of(result) {
        println!("\n{}:", title(name));
        print_rows(rows);
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

/// Scalar fields as a two-column table; arrays are printed separately.
fn print_fields(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map.iter().filter(|(_, v)| !v.is_array()) {
        builder.push_record([title(key), format_value(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_rows(rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        println!("(empty)");
        return;
    };

    let headers: Vec<&String> = first.keys().collect();
    let mut builder = Builder::default();
    builder.push_record(headers.iter().map(|h| title(h)));

    for row in rows.iter().filter_map(Value::as_object) {
        builder.push_record(
            headers
                .iter()
                .map(|h| row.get(h.as_str()).map(format_value).unwrap_or_default()),
        );
    }
    println!("{}", Table::from(builder));
}

fn print_batch(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Kind", "Index", "Status", "Detail"]);
    for kind in BATCH_SECTIONS {
        let Some(Value::Array(items)) = map.get(kind) else {
            continue;
        };
        for item in items {
            let index = item.get("index").map(format_scalar).unwrap_or_default();
            let (status, detail) = match item.get("error").and_then(Value::as_str) {
                Some(err) => ("failed", err.to_string()),
                None => ("ok", headline(item)),
            };
            builder.push_record([kind.to_string(), index, status.to_string(), detail]);
        }
    }
    println!("{}", Table::from(builder));

    let succeeded = map.get("succeeded").map(format_scalar).unwrap_or_default();
    let failed = map.get("failed").map(format_scalar).unwrap_or_default();
    println!("\n{} succeeded, {} failed", succeeded, failed);
}

fn headline(item: &Value) -> String {
    let Some(Value::Object(result)) = item.get("output").and_then(|o| o.get("result")) else {
        return String::new();
    };
    ["future_value", "monthly_emi", "available_emi", "final_value"]
        .iter()
        .find_map(|key| result.get(*key).map(|v| format!("{}: {}", key, format_value(v))))
        .unwrap_or_default()
}

fn title(key: &str) -> String {
    key.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(c) => c.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Numbers with a fractional part are shown to two decimals.
fn format_value(value: &Value) -> String {
    match value {
        Value::Number(n) if n.is_f64() => n
            .as_f64()
            .map(|f| format!("{:.2}", f))
            .unwrap_or_else(|| n.to_string()),
        other => format_scalar(other),
    }
}
