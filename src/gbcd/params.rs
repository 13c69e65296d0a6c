use super::histogram::MisorientationDomain;
use super::parallel::ParallelOptions;

/// Triangles reduced per scratch chunk unless overridden.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Parameters of a GBCD run.
#[derive(Clone, Debug, PartialEq)]
pub struct GbcdParams {
    /// Angular bin width in degrees; also sets the normal grid size.
    pub resolution_deg: f64,
    pub domain: MisorientationDomain,
    /// Triangles reduced per compute-then-fold chunk.
    pub chunk_size: usize,
    pub parallel: ParallelOptions,
}

impl Default for GbcdParams {
    fn default() -> Self {
        Self {
            resolution_deg: 9.0,
            domain: MisorientationDomain::Full,
            chunk_size: DEFAULT_CHUNK_SIZE,
            parallel: ParallelOptions::default(),
        }
    }
}
