use clap::Args;
use serde_json::Value;
use std::io::Write;

use fincalc_core::batch::{self, BatchRequest};

use super::{announce, create};
use crate::input;

/// Arguments for a batch scenario sweep
#[derive(Args)]
pub struct BatchArgs {
    /// Path to JSON request with `growth`, `loans`, `eligibility` and `sip` arrays
    #[arg(long)]
    pub input: Option<String>,

    /// Also write the batch results to this JSON file
    #[arg(long)]
    pub export_json: Option<String>,
}

pub fn run_batch(args: BatchArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: BatchRequest = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <FILE> or stdin is required for batch".into());
    };

    if request.is_empty() {
        log::warn!("batch request contains no parameter sets");
    }

    let output = batch::run_batch(&request);

    if let Some(ref path) = args.export_json {
        let mut writer = create(path)?;
        serde_json::to_writer_pretty(&mut writer, &output)?;
        writeln!(writer)?;
        writer.flush()?;
        announce("batch results", path);
    }

    Ok(serde_json::to_value(output)?)
}
