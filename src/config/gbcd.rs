use crate::gbcd::params::DEFAULT_CHUNK_SIZE;
use crate::gbcd::{GbcdParams, MisorientationDomain, ParallelOptions};
use crate::pole_figure::PoleFigureParams;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct GbcdToolConfig {
    #[serde(rename = "input")]
    pub input: PathBuf,
    #[serde(default)]
    pub gbcd: GbcdConfig,
    /// When present, a pole figure at this misorientation is rendered.
    #[serde(default)]
    pub pole_figure: Option<PoleFigureConfig>,
    pub output: GbcdOutputConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GbcdConfig {
    /// Angular bin width in degrees.
    pub resolution_deg: f64,
    pub domain: MisorientationDomain,
    pub chunk_size: usize,
    /// Use Rayon for the chunk fill (ignored without the `parallel` feature).
    pub parallel: bool,
    pub min_triangles_for_parallel: usize,
}

impl Default for GbcdConfig {
    fn default() -> Self {
        let parallel = ParallelOptions::default();
        Self {
            resolution_deg: 9.0,
            domain: MisorientationDomain::Full,
            chunk_size: DEFAULT_CHUNK_SIZE,
            parallel: parallel.enabled(),
            min_triangles_for_parallel: parallel.min_triangles_for_parallel(),
        }
    }
}

impl GbcdConfig {
    pub fn to_params(&self) -> GbcdParams {
        GbcdParams {
            resolution_deg: self.resolution_deg,
            domain: self.domain,
            chunk_size: self.chunk_size,
            parallel: ParallelOptions::new(self.parallel, self.min_triangles_for_parallel),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PoleFigureConfig {
    pub phase: usize,
    #[serde(flatten)]
    pub params: PoleFigureParams,
}

#[derive(Debug, Deserialize)]
pub struct GbcdOutputConfig {
    #[serde(rename = "result_json")]
    pub result_json: PathBuf,
    /// Embed the full histograms in the JSON report.
    #[serde(default)]
    pub include_histogram: bool,
    #[serde(default)]
    pub pole_figure_image: Option<PathBuf>,
}

pub fn load_config(path: &Path) -> Result<GbcdToolConfig, String> {
    super::read_json_config(path)
}
