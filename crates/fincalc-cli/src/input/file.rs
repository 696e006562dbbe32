use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Read a parameter file and deserialise it into the engine's input type.
pub fn read_json<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let path = locate(path)?;
    let contents = fs::read_to_string(&path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
    let params = serde_json::from_str(&contents)
        .map_err(|e| format!("Invalid parameters in '{}': {}", path.display(), e))?;
    log::debug!("loaded parameters from {}", path.display());
    Ok(params)
}

fn locate(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let full = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    if !full.is_file() {
        return Err(format!("Input file not found: {}", full.display()).into());
    }
    Ok(full)
}
