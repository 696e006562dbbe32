pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;
pub mod yaml;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
        OutputFormat::Yaml => yaml::print_yaml(value),
    }
}

/// The array-of-records field a result carries, if any.
pub(crate) fn breakdown_of(result: &serde_json::Map<String, Value>) -> Option<(&str, &[Value])> {
    ["yearly_breakdown", "amortization_schedule", "scenarios"]
        .iter()
        .find_map(|key| match result.get(*key) {
            Some(Value::Array(rows)) => Some((*key, rows.as_slice())),
            _ => None,
        })
}

pub(crate) fn format_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
