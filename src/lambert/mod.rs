//! Modified (equal-area, Rosca) Lambert projection.
//!
//! A unit direction is mapped to one of two squares (north / south
//! hemisphere) of edge `sqrt(2πR²)`. The GBCD histogram bins the resulting
//! square coordinates directly; [`squares::LambertSquares`] provides the
//! interpolating grid used for pole-figure style rendering.

pub mod squares;

pub use squares::LambertSquares;

use nalgebra::Vector3;
use serde::Serialize;

/// Distance kept between a clamped coordinate and the square edge.
pub const EDGE_CLAMP: f64 = 1e-4;

/// Hemisphere of a projected direction. North holds `z >= 0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Hemisphere {
    North,
    South,
}

impl Hemisphere {
    /// Offset of this hemisphere inside an interleaved `[north, south]` pair.
    #[inline]
    pub fn offset(self) -> usize {
        match self {
            Hemisphere::North => 0,
            Hemisphere::South => 1,
        }
    }

    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Hemisphere::North => Hemisphere::South,
            Hemisphere::South => Hemisphere::North,
        }
    }
}

/// Projected position of a direction inside its hemisphere square.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SquareCoord {
    pub hemisphere: Hemisphere,
    pub x: f64,
    pub y: f64,
}

impl SquareCoord {
    /// Square coordinate of the antipodal direction: both axes negated, other
    /// hemisphere.
    #[inline]
    pub fn antipode(&self) -> Self {
        SquareCoord {
            hemisphere: self.hemisphere.opposite(),
            x: -self.x,
            y: -self.y,
        }
    }
}

/// Forward Lambert mapping for a sphere of fixed radius.
#[derive(Clone, Copy, Debug)]
pub struct LambertProjector {
    radius: f64,
    max_coord: f64,
}

impl Default for LambertProjector {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl LambertProjector {
    pub fn new(radius: f64) -> Self {
        let half_sphere_area = 2.0 * std::f64::consts::PI * radius * radius;
        Self {
            radius,
            max_coord: half_sphere_area.sqrt() / 2.0,
        }
    }

    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Half edge length of each square (`sqrt(π/2)` on the unit sphere).
    #[inline]
    pub fn max_coord(&self) -> f64 {
        self.max_coord
    }

    /// Maps a direction on the sphere to its hemisphere square.
    ///
    /// The direction must already have length `radius`. Coordinates that
    /// reach the upper edge are pulled back by [`EDGE_CLAMP`]; the lower edge
    /// is inclusive.
    pub fn square_coord(&self, v: &Vector3<f64>) -> SquareCoord {
        let (hemisphere, adjust) = if v.z >= 0.0 {
            (Hemisphere::North, -1.0)
        } else {
            (Hemisphere::South, 1.0)
        };
        if v.x == 0.0 && v.y == 0.0 {
            return SquareCoord {
                hemisphere,
                x: 0.0,
                y: 0.0,
            };
        }

        let r = self.radius;
        let rho = (2.0 * r * (r + v.z * adjust)).max(0.0).sqrt();
        let half_sqrt_pi = 0.5 * std::f64::consts::PI.sqrt();
        let two_over_sqrt_pi = 2.0 / std::f64::consts::PI.sqrt();
        let (mut x, mut y) = if v.x.abs() >= v.y.abs() {
            let s = v.x.signum();
            (
                s * rho * half_sqrt_pi,
                s * rho * two_over_sqrt_pi * (v.y / v.x).atan(),
            )
        } else {
            let s = v.y.signum();
            (
                s * rho * two_over_sqrt_pi * (v.x / v.y).atan(),
                s * rho * half_sqrt_pi,
            )
        };
        if x >= self.max_coord {
            x = self.max_coord - EDGE_CLAMP;
        }
        if y >= self.max_coord {
            y = self.max_coord - EDGE_CLAMP;
        }
        // Equatorial directions can overshoot the lower edge by round-off.
        x = x.max(-self.max_coord);
        y = y.max(-self.max_coord);
        SquareCoord { hemisphere, x, y }
    }
}

/// Lifts a point of the unit stereographic disk back onto the sphere
/// (northern hemisphere for points inside the disk).
#[inline]
pub fn stereographic_to_sphere(x: f64, y: f64) -> Vector3<f64> {
    let r2 = x * x + y * y;
    let z = -(r2 - 1.0) / (r2 + 1.0);
    Vector3::new(x * (1.0 + z), y * (1.0 + z), z)
}
