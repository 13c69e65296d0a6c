#![doc = include_str!("../README.md")]

// Core computation.
pub mod gbcd;
pub mod lambert;
pub mod mesh;
pub mod orientation;
pub mod symmetry;

// Results, reporting and tooling.
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod io;
pub mod pole_figure;

// Small numeric helpers.
pub mod angle;

// --- High-level re-exports -------------------------------------------------

pub use crate::error::GbcdError;
pub use crate::gbcd::{
    CancelFlag, GbcdEngine, GbcdLayout, GbcdParams, GbcdResult, MisorientationDomain,
    ParallelOptions, PhaseGbcd, ReductionDriver,
};
pub use crate::mesh::{GbcdDataset, GbcdInput};
pub use crate::orientation::Orientation;
pub use crate::symmetry::{CrystalFamily, SymmetryTable};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use gbcd_engine::prelude::*;
///
/// # fn main() -> Result<(), GbcdError> {
/// let mut mesh = GbcdDataset {
///     feature_orientations: vec![
///         Orientation::identity(),
///         Orientation::from_bunge_euler(0.1, 0.2, 0.3),
///         Orientation::from_bunge_euler(1.0, 0.5, 2.0),
///     ],
///     feature_phases: vec![0, 1, 1],
///     crystal_structures: vec![999, CrystalFamily::CubicHigh.id()],
///     ..Default::default()
/// };
/// mesh.push_triangle([1, 2], [0.0, 0.0, 1.0], 1.0);
///
/// let result = GbcdEngine::new(GbcdParams::default()).compute(mesh.as_input())?;
/// println!("sizes={:?} max_mrd={:.3}", result.layout.sizes, result.phases[1].max_value());
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::{
        CrystalFamily, GbcdDataset, GbcdEngine, GbcdError, GbcdParams, GbcdResult,
        MisorientationDomain, Orientation,
    };
}
