//! GBCD computation: layout, per-triangle reduction, chunked driver.
//!
//! [`GbcdEngine`] is the one-call entry point. [`ReductionDriver`] exposes the
//! individual configure / chunk / finalize steps for callers that want to
//! report progress or interleave other work.

pub mod driver;
pub mod histogram;
pub mod parallel;
pub mod params;
pub mod reducer;

pub use driver::ReductionDriver;
pub use histogram::{GbcdHistogram, GbcdLayout, MisorientationDomain};
pub use parallel::{CancelFlag, ParallelOptions};
pub use params::GbcdParams;
pub use reducer::{MisorientationReducer, SkipReason, TriangleOutcome};

use crate::diagnostics::GbcdDiagnostics;
use crate::error::GbcdError;
use crate::lambert::Hemisphere;
use crate::mesh::GbcdInput;
use crate::symmetry::CrystalFamily;
use log::debug;

/// Normalized histogram of one ensemble entry.
#[derive(Clone, Debug)]
pub struct PhaseGbcd {
    pub phase: usize,
    /// `None` for the reserved entry 0 and for unresolved crystal structures.
    pub family: Option<CrystalFamily>,
    /// Accumulated area per hemisphere before normalization.
    pub hemisphere_area: [f64; 2],
    pub mrd_factor: [f64; 2],
    /// `2·num_bins` values, hemisphere interleaved.
    pub values: Vec<f64>,
}

impl PhaseGbcd {
    #[inline]
    pub fn value(&self, bin: usize, hemisphere: Hemisphere) -> f64 {
        self.values[2 * bin + hemisphere.offset()]
    }

    pub fn max_value(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }

    /// Raw accumulated area of a bin (normalization undone).
    pub fn raw_value(&self, bin: usize, hemisphere: Hemisphere) -> f64 {
        let factor = self.mrd_factor[hemisphere.offset()];
        if factor > 0.0 {
            self.value(bin, hemisphere) / factor
        } else {
            0.0
        }
    }
}

/// Output of a complete run.
#[derive(Clone, Debug)]
pub struct GbcdResult {
    pub layout: GbcdLayout,
    /// One entry per ensemble slot, index 0 included.
    pub phases: Vec<PhaseGbcd>,
    pub diagnostics: GbcdDiagnostics,
}

impl GbcdResult {
    pub fn phase(&self, phase: usize) -> Option<&PhaseGbcd> {
        self.phases.get(phase)
    }

    /// The five bin counts, replicated once per ensemble entry.
    pub fn dimensions(&self) -> Vec<[usize; 5]> {
        vec![self.layout.sizes; self.phases.len()]
    }

    /// All phase histograms back to back (`phase · total_bins + offset`).
    pub fn flat_values(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.phases.len() * self.layout.total_bins());
        for phase in &self.phases {
            out.extend_from_slice(&phase.values);
        }
        out
    }
}

/// GBCD computation with fixed parameters.
#[derive(Clone, Debug, Default)]
pub struct GbcdEngine {
    params: GbcdParams,
}

impl GbcdEngine {
    pub fn new(params: GbcdParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &GbcdParams {
        &self.params
    }

    pub fn set_params(&mut self, params: GbcdParams) {
        self.params = params;
    }

    /// Runs configure, every chunk and finalize.
    pub fn compute(&self, input: GbcdInput<'_>) -> Result<GbcdResult, GbcdError> {
        self.compute_with_cancel(input, &CancelFlag::new())
    }

    /// Like [`GbcdEngine::compute`], but stops with [`GbcdError::Cancelled`]
    /// once `cancel` is raised. No partial histogram is returned.
    pub fn compute_with_cancel(
        &self,
        input: GbcdInput<'_>,
        cancel: &CancelFlag,
    ) -> Result<GbcdResult, GbcdError> {
        debug!(
            "GbcdEngine::compute resolution={}° domain={:?} triangles={}",
            self.params.resolution_deg,
            self.params.domain,
            input.num_triangles()
        );
        let mut driver = ReductionDriver::configure(input, self.params.clone())?;
        driver.run(cancel)?;
        Ok(driver.finalize())
    }
}
