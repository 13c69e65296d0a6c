//! JSON configuration of the demo binaries.

pub mod gbcd;
pub mod lambert;

use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

fn read_json_config<T: DeserializeOwned>(path: &Path) -> Result<T, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    serde_json::from_str(&data)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}
