pub mod batch;
pub mod eligibility;
pub mod growth;
pub mod loan;
pub mod sip;

use clap::Args;
use colored::Colorize;
use log::info;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;

use fincalc_core::export::{write_breakdown_csv, write_json, BreakdownCsv};
use fincalc_core::ComputationOutput;

/// File export flags shared by every calculation command
#[derive(Args)]
pub struct ExportArgs {
    /// Write the full result as JSON to this path
    #[arg(long, value_name = "PATH")]
    pub export_json: Option<String>,

    /// Write the period breakdown as CSV to this path
    #[arg(long, value_name = "PATH")]
    pub export_csv: Option<String>,
}

impl ExportArgs {
    pub fn write<T>(&self, output: &ComputationOutput<T>) -> Result<(), Box<dyn std::error::Error>>
    where
        T: Serialize + BreakdownCsv,
    {
        self.write_json(output)?;
        self.write_csv(&output.result)
    }

    pub fn write_json<T: Serialize>(
        &self,
        output: &ComputationOutput<T>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(ref path) = self.export_json {
            write_json(output, BufWriter::new(create(path)?))?;
            announce("Results", path);
        }
        Ok(())
    }

    pub fn write_csv<R: BreakdownCsv>(&self, breakdown: &R) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(ref path) = self.export_csv {
            write_breakdown_csv(breakdown, BufWriter::new(create(path)?))?;
            announce("Breakdown", path);
        }
        Ok(())
    }
}

pub fn create(path: &str) -> Result<File, Box<dyn std::error::Error>> {
    File::create(path).map_err(|e| format!("Failed to create '{}': {}", path, e).into())
}

pub fn announce(what: &str, path: &str) {
    info!("{what} exported to {path}");
    eprintln!("{} {} exported to {}", "✓".green(), what, path);
}
