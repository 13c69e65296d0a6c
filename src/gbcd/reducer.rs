//! Symmetry reduction of one boundary triangle into histogram candidates.
//!
//! For each of the two grain orderings the reducer walks every pair of
//! symmetry operators `(S_j, S_k)`, forms the misorientation
//! `S_j·g1·(S_k·g2)ᵀ` and the crystal-frame normal `S_j·g1·n`, and writes two
//! encoded slots (normal and antipode) per pair. A triangle therefore fills
//! exactly `4·nsym²` slots; the fold step ignores [`EMPTY_SLOT`]s.

use super::histogram::{encode_slot, GbcdLayout, EMPTY_SLOT};
use crate::lambert::LambertProjector;
use crate::mesh::GbcdInput;
use crate::orientation::{misorientation, EulerTriple};
use crate::symmetry::SymmetryTable;
use nalgebra::{Matrix3, Vector3};

/// Normals shorter than this are treated as degenerate.
const MIN_NORMAL_LENGTH: f64 = 1e-12;

/// Why a triangle contributed nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    SentinelLabel,
    CrossPhase,
    InvalidPhase,
    ZeroArea,
    DegenerateNormal,
}

/// Result of reducing one triangle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TriangleOutcome {
    /// Not processed yet (fresh scratch).
    #[default]
    Pending,
    Skipped(SkipReason),
    Reduced {
        phase: usize,
        accepted: u32,
        rejected: u32,
    },
}

/// Slots needed per triangle for a symmetry group of `num_sym_ops` operators.
#[inline]
pub fn slots_per_triangle(num_sym_ops: usize) -> usize {
    4 * num_sym_ops * num_sym_ops
}

/// Stateless per-triangle reducer bound to one histogram layout.
#[derive(Clone, Copy, Debug)]
pub struct MisorientationReducer<'a> {
    layout: &'a GbcdLayout,
    projector: LambertProjector,
}

impl<'a> MisorientationReducer<'a> {
    pub fn new(layout: &'a GbcdLayout) -> Self {
        Self {
            layout,
            projector: LambertProjector::default(),
        }
    }

    #[inline]
    pub fn layout(&self) -> &GbcdLayout {
        self.layout
    }

    /// Reduces triangle `triangle` of a validated input into `slots`.
    ///
    /// `slots` must be pre-filled with [`EMPTY_SLOT`] and hold at least
    /// `slots_per_triangle(nsym)` entries for the triangle's phase.
    pub fn reduce_triangle(
        &self,
        input: &GbcdInput<'_>,
        symmetry: &SymmetryTable,
        triangle: usize,
        slots: &mut [u32],
    ) -> TriangleOutcome {
        let [l1, l2] = input.labels(triangle);
        if l1 <= 0 || l2 <= 0 {
            return TriangleOutcome::Skipped(SkipReason::SentinelLabel);
        }
        let (f1, f2) = (l1 as usize, l2 as usize);
        let phase = input.phase(f1);
        if phase != input.phase(f2) {
            return TriangleOutcome::Skipped(SkipReason::CrossPhase);
        }
        if phase <= 0 {
            return TriangleOutcome::Skipped(SkipReason::InvalidPhase);
        }
        let phase = phase as usize;
        let Some(ops) = symmetry.operators(phase) else {
            return TriangleOutcome::Skipped(SkipReason::InvalidPhase);
        };
        if input.area(triangle) <= 0.0 {
            return TriangleOutcome::Skipped(SkipReason::ZeroArea);
        }
        let normal = input.normal(triangle);
        let length = normal.norm();
        if length < MIN_NORMAL_LENGTH {
            return TriangleOutcome::Skipped(SkipReason::DegenerateNormal);
        }
        let normal = normal / length;

        let (accepted, rejected) = self.reduce_pair(
            input.orientation(f1).matrix(),
            input.orientation(f2).matrix(),
            &normal,
            ops,
            slots,
        );
        TriangleOutcome::Reduced {
            phase,
            accepted,
            rejected,
        }
    }

    /// Writes both passes for a grain pair sharing a unit `normal`.
    ///
    /// Pass 0 uses `(g1, g2, n)`, pass 1 the swapped pair `(g2, g1, −n)`.
    /// Returns `(accepted, rejected)` candidate counts.
    pub fn reduce_pair(
        &self,
        g1: &Matrix3<f64>,
        g2: &Matrix3<f64>,
        normal: &Vector3<f64>,
        ops: &[Matrix3<f64>],
        slots: &mut [u32],
    ) -> (u32, u32) {
        let per_pass = 2 * ops.len() * ops.len();
        let (first, second) = slots[..2 * per_pass].split_at_mut(per_pass);
        let a = self.reduce_pass(g1, g2, normal, ops, first);
        let b = self.reduce_pass(g2, g1, &(-normal), ops, second);
        (a.0 + b.0, a.1 + b.1)
    }

    fn reduce_pass(
        &self,
        g1: &Matrix3<f64>,
        g2: &Matrix3<f64>,
        normal: &Vector3<f64>,
        ops: &[Matrix3<f64>],
        slots: &mut [u32],
    ) -> (u32, u32) {
        let domain = self.layout.domain;
        let mut accepted = 0u32;
        let mut rejected = 0u32;
        let mut cursor = 0usize;
        for sym_j in ops {
            let g1s = sym_j * g1;
            let n1 = g1s * normal;
            let sq = self.projector.square_coord(&n1);
            let candidates = [sq, sq.antipode()];
            for sym_k in ops {
                let g2s = sym_k * g2;
                let euler = EulerTriple::from_matrix(&misorientation(&g1s, &g2s));
                if !domain.accepts(&euler) {
                    slots[cursor] = EMPTY_SLOT;
                    slots[cursor + 1] = EMPTY_SLOT;
                    rejected += 2;
                    cursor += 2;
                    continue;
                }
                let [m0, m1, m2] = euler.to_gbcd_coords();
                for c in &candidates {
                    slots[cursor] = match self.layout.bin_index(&[m0, m1, m2, c.x, c.y]) {
                        Some(bin) => {
                            accepted += 1;
                            encode_slot(bin, c.hemisphere)
                        }
                        None => {
                            rejected += 1;
                            EMPTY_SLOT
                        }
                    };
                    cursor += 1;
                }
            }
        }
        (accepted, rejected)
    }
}
