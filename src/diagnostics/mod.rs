//! Serializable run diagnostics and reports.
//!
//! `GbcdDiagnostics` is filled by the reduction driver while it runs;
//! `GbcdReport` bundles it with per-phase summaries for JSON output.

pub mod report;
pub mod run;
pub mod timing;

pub use report::{GbcdReport, PhaseReport};
pub use run::{GbcdDiagnostics, SkipCounts};
pub use timing::{StageTiming, TimingBreakdown};
