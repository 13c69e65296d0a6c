//! Crystal orientations and misorientation Euler triples.
//!
//! An [`Orientation`] stores the passive rotation matrix `g` that maps a
//! sample-frame vector into the crystal frame (`v_crystal = g · v_sample`).
//! This is the Bunge convention: `g = Rz(φ2) · Rx(Φ) · Rz(φ1)` with passive
//! elementary rotations.

use crate::angle::{safe_acos, wrap_two_pi};
use nalgebra::{Matrix3, Rotation3, Unit, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// `|g33|` within this of 1 is treated as Φ = 0 or Φ = π.
const GIMBAL_EPS: f64 = 1e-6;

/// Sample → crystal rotation of a single grain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Orientation {
    g: Matrix3<f64>,
}

impl Default for Orientation {
    fn default() -> Self {
        Self::identity()
    }
}

impl Orientation {
    pub fn identity() -> Self {
        Self {
            g: Matrix3::identity(),
        }
    }

    /// Wraps an existing passive rotation matrix. The caller guarantees it is
    /// a proper rotation.
    pub fn from_matrix(g: Matrix3<f64>) -> Self {
        Self { g }
    }

    /// Builds the orientation from Bunge Euler angles (radians).
    pub fn from_bunge_euler(phi1: f64, big_phi: f64, phi2: f64) -> Self {
        let (sp1, cp1) = phi1.sin_cos();
        let (sp, cp) = big_phi.sin_cos();
        let (sp2, cp2) = phi2.sin_cos();
        let g = Matrix3::new(
            cp1 * cp2 - sp1 * sp2 * cp,
            sp1 * cp2 + cp1 * sp2 * cp,
            sp2 * sp,
            -cp1 * sp2 - sp1 * cp2 * cp,
            -sp1 * sp2 + cp1 * cp2 * cp,
            cp2 * sp,
            sp1 * sp,
            -cp1 * sp,
            cp,
        );
        Self { g }
    }

    /// Builds the orientation from the active crystal → sample rotation `q`.
    pub fn from_quaternion(q: &UnitQuaternion<f64>) -> Self {
        Self {
            g: q.to_rotation_matrix().into_inner().transpose(),
        }
    }

    /// Passive rotation of `angle` radians about `axis` (need not be unit).
    /// Returns `None` for a zero axis.
    pub fn from_axis_angle(axis: &Vector3<f64>, angle: f64) -> Option<Self> {
        let axis = Unit::try_new(*axis, 1e-12)?;
        let active = Rotation3::from_axis_angle(&axis, angle);
        Some(Self {
            g: active.into_inner().transpose(),
        })
    }

    #[inline]
    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.g
    }

    /// Bunge Euler angles of this orientation, each in [0, 2π) (Φ in [0, π]).
    pub fn bunge_euler(&self) -> EulerTriple {
        EulerTriple::from_matrix(&self.g)
    }
}

/// Bunge Euler triple (φ1, Φ, φ2) in radians.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EulerTriple {
    pub phi1: f64,
    pub big_phi: f64,
    pub phi2: f64,
}

impl EulerTriple {
    /// Extracts Bunge angles from a passive rotation matrix.
    ///
    /// Near the poles (`|g33| ≈ 1`) only φ1 ± φ2 is defined; the whole
    /// combined angle goes to φ1 and φ2 is 0.
    pub fn from_matrix(g: &Matrix3<f64>) -> Self {
        let g33 = g[(2, 2)];
        if (g33.abs() - 1.0).abs() < GIMBAL_EPS {
            EulerTriple {
                phi1: wrap_two_pi(g[(0, 1)].atan2(g[(0, 0)])),
                big_phi: if g33 > 0.0 { 0.0 } else { std::f64::consts::PI },
                phi2: 0.0,
            }
        } else {
            EulerTriple {
                phi1: wrap_two_pi(g[(2, 0)].atan2(-g[(2, 1)])),
                big_phi: safe_acos(g33),
                phi2: wrap_two_pi(g[(0, 2)].atan2(g[(1, 2)])),
            }
        }
    }

    /// The histogram representation: Φ replaced by cos Φ.
    #[inline]
    pub fn to_gbcd_coords(&self) -> [f64; 3] {
        [self.phi1, self.big_phi.cos(), self.phi2]
    }
}

/// Misorientation `Δg = g1 · g2ᵀ` between two passive orientation matrices.
#[inline]
pub fn misorientation(g1: &Matrix3<f64>, g2: &Matrix3<f64>) -> Matrix3<f64> {
    g1 * g2.transpose()
}
