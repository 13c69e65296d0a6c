//! I/O helpers for datasets, JSON reports and pole-figure images.
//!
//! - `load_dataset`: read a boundary mesh + feature tables from JSON.
//! - `save_intensity_png`: write a square intensity grid as grayscale PNG.
//! - `write_json_file`: pretty-print a serializable value to disk.
use crate::mesh::GbcdDataset;
use crate::orientation::Orientation;
use image::{GrayImage, Luma};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// On-disk layout of a dataset. Index 0 of the feature and ensemble tables
/// is reserved.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetFile {
    pub face_labels: Vec<[i32; 2]>,
    pub face_normals: Vec<[f64; 3]>,
    pub face_areas: Vec<f64>,
    /// Bunge Euler angles (φ1, Φ, φ2) in radians.
    pub feature_eulers: Vec<[f64; 3]>,
    pub feature_phases: Vec<i32>,
    pub crystal_structures: Vec<u32>,
}

impl DatasetFile {
    pub fn into_dataset(self) -> GbcdDataset {
        GbcdDataset {
            face_labels: self.face_labels.into_iter().flatten().collect(),
            face_normals: self.face_normals.into_iter().flatten().collect(),
            face_areas: self.face_areas,
            feature_orientations: self
                .feature_eulers
                .iter()
                .map(|e| Orientation::from_bunge_euler(e[0], e[1], e[2]))
                .collect(),
            feature_phases: self.feature_phases,
            crystal_structures: self.crystal_structures,
        }
    }
}

/// Parse a dataset from a JSON string.
pub fn parse_dataset(json: &str) -> Result<GbcdDataset, String> {
    let file: DatasetFile =
        serde_json::from_str(json).map_err(|e| format!("Failed to parse dataset: {e}"))?;
    Ok(file.into_dataset())
}

/// Load a dataset JSON file from disk.
pub fn load_dataset(path: &Path) -> Result<GbcdDataset, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read dataset {}: {e}", path.display()))?;
    parse_dataset(&data).map_err(|e| format!("{e} ({})", path.display()))
}

/// Save a row-major `dim × dim` intensity grid as grayscale PNG, scaled so
/// the maximum maps to 255.
pub fn save_intensity_png(intensity: &[f64], dim: usize, path: &Path) -> Result<(), String> {
    if dim == 0 || intensity.len() != dim * dim {
        return Err(format!(
            "Intensity grid has {} values, expected {dim}x{dim}",
            intensity.len()
        ));
    }
    ensure_parent_dir(path)?;
    let max = intensity.iter().copied().fold(0.0, f64::max);
    let scale = if max > 0.0 { 255.0 / max } else { 0.0 };
    let mut out = GrayImage::new(dim as u32, dim as u32);
    for (y, row) in intensity.chunks(dim).enumerate() {
        for (x, &v) in row.iter().enumerate() {
            let px = (v * scale).clamp(0.0, 255.0);
            out.put_pixel(x as u32, y as u32, Luma([px as u8]));
        }
    }
    out.save(path)
        .map_err(|e| format!("Failed to save {}: {e}", path.display()))
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize JSON for {}: {e}", path.display()))?;
    fs::write(path, json).map_err(|e| format!("Failed to write JSON {}: {e}", path.display()))
}

fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}
