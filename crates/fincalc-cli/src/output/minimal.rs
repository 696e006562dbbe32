use serde_json::Value;

use super::format_scalar;

/// Fields that answer "what is the number" for each calculation, in order.
const HEADLINE_KEYS: [&str; 5] = [
    "future_value",
    "monthly_emi",
    "available_emi",
    "final_value",
    "succeeded",
];

/// Print just the headline value of the calculation.
pub fn print_minimal(value: &Value) {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result {
        if let Some(val) = HEADLINE_KEYS
            .iter()
            .filter_map(|key| map.get(*key))
            .find(|v| !v.is_null())
        {
            println!("{}", format_scalar(val));
            return;
        }

        if let Some((key, val)) = map.iter().find(|(_, v)| !v.is_array()) {
            println!("{}: {}", key, format_scalar(val));
            return;
        }
    }

    println!("{}", format_scalar(result));
}
