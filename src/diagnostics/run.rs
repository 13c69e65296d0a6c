use super::timing::TimingBreakdown;
use crate::gbcd::reducer::{SkipReason, TriangleOutcome};
use serde::Serialize;

/// Per-triangle skip tallies.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipCounts {
    pub sentinel_label: usize,
    pub cross_phase: usize,
    pub invalid_phase: usize,
    pub zero_area: usize,
    pub degenerate_normal: usize,
}

impl SkipCounts {
    pub fn record(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::SentinelLabel => self.sentinel_label += 1,
            SkipReason::CrossPhase => self.cross_phase += 1,
            SkipReason::InvalidPhase => self.invalid_phase += 1,
            SkipReason::ZeroArea => self.zero_area += 1,
            SkipReason::DegenerateNormal => self.degenerate_normal += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.sentinel_label
            + self.cross_phase
            + self.invalid_phase
            + self.zero_area
            + self.degenerate_normal
    }
}

/// Counters and timings collected by the reduction driver.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GbcdDiagnostics {
    pub triangles_total: usize,
    pub triangles_reduced: usize,
    pub skipped: SkipCounts,
    pub candidates_accepted: u64,
    /// Candidates dropped because they fell outside the histogram limits.
    pub candidates_out_of_range: u64,
    pub chunk_size: usize,
    pub chunks: usize,
    pub parallel_chunks: usize,
    pub timings: TimingBreakdown,
}

impl GbcdDiagnostics {
    pub fn record(&mut self, outcome: &TriangleOutcome) {
        match *outcome {
            TriangleOutcome::Pending => {}
            TriangleOutcome::Skipped(reason) => self.skipped.record(reason),
            TriangleOutcome::Reduced {
                accepted, rejected, ..
            } => {
                self.triangles_reduced += 1;
                self.candidates_accepted += u64::from(accepted);
                self.candidates_out_of_range += u64::from(rejected);
            }
        }
    }

    /// Triangles the driver has looked at so far.
    pub fn triangles_seen(&self) -> usize {
        self.triangles_reduced + self.skipped.total()
    }
}
