//! Report layer: flat JSON documents and breakdown CSV files.

pub mod csv_export;
pub mod json;

pub use csv_export::{write_breakdown_csv, BreakdownCsv, SipMonthlyBreakdown};
pub use json::{to_json_value, write_json};
