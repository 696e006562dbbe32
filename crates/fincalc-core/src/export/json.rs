use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::io::Write;

use crate::types::ComputationOutput;
use crate::FinCalcResult;

/// Flat export document: echoed parameters and result fields side by side.
#[derive(Serialize)]
struct FlatRecord<'a, T: Serialize> {
    #[serde(flatten)]
    parameters: &'a Value,
    #[serde(flatten)]
    result: &'a T,
    warnings: &'a [String],
    calculation_date: DateTime<Utc>,
}

impl<'a, T: Serialize> FlatRecord<'a, T> {
    fn new(output: &'a ComputationOutput<T>) -> Self {
        Self {
            parameters: &output.assumptions,
            result: &output.result,
            warnings: &output.warnings,
            calculation_date: output.metadata.calculated_at,
        }
    }
}

/// Build the flat JSON document for a computation.
pub fn to_json_value<T: Serialize>(output: &ComputationOutput<T>) -> FinCalcResult<Value> {
    Ok(serde_json::to_value(FlatRecord::new(output))?)
}

/// Pretty-print the flat JSON document to `writer`.
pub fn write_json<T: Serialize, W: Write>(
    output: &ComputationOutput<T>,
    mut writer: W,
) -> FinCalcResult<()> {
    serde_json::to_writer_pretty(&mut writer, &FlatRecord::new(output))?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lending::emi::{compute_emi, LoanParameters};
    use rust_decimal_macros::dec;

    #[test]
    fn test_flat_document_shape() {
        let output = compute_emi(&LoanParameters::new(dec!(100_000), dec!(0.12), 5)).unwrap();
        let value = to_json_value(&output).unwrap();
        let map = value.as_object().unwrap();

        // Parameters and results share one level
        assert!(map.contains_key("principal"));
        assert!(map.contains_key("tenure_years"));
        assert!(map.contains_key("monthly_emi"));
        assert!(map.contains_key("calculation_date"));
        assert!(!map.contains_key("result"));

        // Numbers, not strings
        assert!(map["monthly_emi"].is_number());
        assert!(map["principal"].is_number());
        let schedule = map["amortization_schedule"].as_array().unwrap();
        assert_eq!(schedule.len(), 60);
        assert!(schedule[0]["remaining_balance"].is_number());
    }

    #[test]
    fn test_calculation_date_is_iso_8601() {
        let output = compute_emi(&LoanParameters::new(dec!(1000), dec!(0.1), 1)).unwrap();
        let value = to_json_value(&output).unwrap();
        let stamp = value["calculation_date"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(stamp).is_ok());
    }

    #[test]
    fn test_write_json_is_parseable() {
        let output = compute_emi(&LoanParameters::new(dec!(1000), dec!(0.1), 1)).unwrap();
        let mut buf = Vec::new();
        write_json(&output, &mut buf).unwrap();
        let parsed: Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed["total_months"], 12);
    }
}
