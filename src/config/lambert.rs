use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config of the boundary-normal pole figure tool.
#[derive(Debug, Deserialize)]
pub struct LambertToolConfig {
    #[serde(rename = "input")]
    pub input: PathBuf,
    #[serde(default)]
    pub lambert: LambertConfig,
    pub output: LambertOutputConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LambertConfig {
    /// Cells per edge of each hemisphere square.
    pub dimension: usize,
    /// Edge length in pixels of the stereographic image.
    pub image_dimension: usize,
    /// Weight each normal by its triangle area instead of counting it once.
    pub area_weighted: bool,
}

impl Default for LambertConfig {
    fn default() -> Self {
        Self {
            dimension: 72,
            image_dimension: 256,
            area_weighted: false,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LambertOutputConfig {
    #[serde(rename = "image")]
    pub image: PathBuf,
    #[serde(default)]
    pub summary_json: Option<PathBuf>,
}

pub fn load_config(path: &Path) -> Result<LambertToolConfig, String> {
    super::read_json_config(path)
}
