//! Discretized north/south Lambert squares with bilinear interpolation.
//!
//! The four edges of each square are glued with a 180° rotation: leaving the
//! square across the right edge at height `y` re-enters across the left edge
//! at height `-y` (and likewise for top/bottom). Neighbour lookups therefore
//! remap the crossed axis by one full period and mirror the other axis.

use super::{stereographic_to_sphere, Hemisphere, LambertProjector, SquareCoord};
use crate::error::GbcdError;
use nalgebra::Vector3;

/// Four wrap-corrected cells around a continuous coordinate with their
/// bilinear weights (cell order: base, x-neighbour, y-neighbour, diagonal).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbourhood {
    pub cells: [usize; 4],
    pub weights: [f64; 4],
}

/// Pair of `dim × dim` grids, one per hemisphere, row-major (`y * dim + x`).
#[derive(Clone, Debug)]
pub struct LambertSquares {
    dimension: usize,
    step: f64,
    projector: LambertProjector,
    north: Vec<f64>,
    south: Vec<f64>,
}

impl LambertSquares {
    /// Zeroed grids of `dimension × dimension` cells per hemisphere.
    pub fn new(dimension: usize, radius: f64) -> Result<Self, GbcdError> {
        if dimension == 0 {
            return Err(GbcdError::InvalidImageDimension);
        }
        let projector = LambertProjector::new(radius);
        let edge = 2.0 * projector.max_coord();
        Ok(LambertSquares {
            dimension,
            step: edge / dimension as f64,
            projector,
            north: vec![0.0; dimension * dimension],
            south: vec![0.0; dimension * dimension],
        })
    }

    /// Projects every direction and spreads a unit weight over its
    /// neighbourhood.
    pub fn from_directions(
        directions: &[Vector3<f64>],
        dimension: usize,
        radius: f64,
    ) -> Result<Self, GbcdError> {
        let mut squares = Self::new(dimension, radius)?;
        for dir in directions {
            let sq = squares.projector.square_coord(dir);
            squares.add_interpolated_value(&sq, 1.0);
        }
        Ok(squares)
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[inline]
    pub fn step(&self) -> f64 {
        self.step
    }

    #[inline]
    pub fn projector(&self) -> &LambertProjector {
        &self.projector
    }

    pub fn square(&self, hemisphere: Hemisphere) -> &[f64] {
        match hemisphere {
            Hemisphere::North => &self.north,
            Hemisphere::South => &self.south,
        }
    }

    fn square_mut(&mut self, hemisphere: Hemisphere) -> &mut [f64] {
        match hemisphere {
            Hemisphere::North => &mut self.north,
            Hemisphere::South => &mut self.south,
        }
    }

    /// Flat index of the cell containing `sq`, clamped to the grid.
    pub fn square_index(&self, sq: &SquareCoord) -> usize {
        let max = self.projector.max_coord();
        let last = self.dimension as i64 - 1;
        let x = (((sq.x + max) / self.step).floor() as i64).clamp(0, last);
        let y = (((sq.y + max) / self.step).floor() as i64).clamp(0, last);
        (y * self.dimension as i64 + x) as usize
    }

    pub fn value(&self, hemisphere: Hemisphere, index: usize) -> f64 {
        self.square(hemisphere)[index]
    }

    pub fn set_value(&mut self, hemisphere: Hemisphere, index: usize, value: f64) {
        self.square_mut(hemisphere)[index] = value;
    }

    pub fn add_value(&mut self, hemisphere: Hemisphere, index: usize, value: f64) {
        self.square_mut(hemisphere)[index] += value;
    }

    /// Computes the four cells touched by a bilinear sample at `(x, y)`.
    pub fn neighbourhood(&self, x: f64, y: f64) -> Neighbourhood {
        let max = self.projector.max_coord();
        let mut mod_x = (x + max) / self.step;
        let mut mod_y = (y + max) / self.step;
        let abin = mod_x.floor() as i64;
        let bbin = mod_y.floor() as i64;
        mod_x -= abin as f64 + 0.5;
        mod_y -= bbin as f64 + 0.5;
        let a_sign = if mod_x < 0.0 { -1 } else { 1 };
        let b_sign = if mod_y < 0.0 { -1 } else { 1 };
        let fx = mod_x.abs();
        let fy = mod_y.abs();

        Neighbourhood {
            cells: [
                self.wrap_cell(abin, bbin),
                self.wrap_cell(abin + a_sign, bbin),
                self.wrap_cell(abin, bbin + b_sign),
                self.wrap_cell(abin + a_sign, bbin + b_sign),
            ],
            weights: [
                (1.0 - fx) * (1.0 - fy),
                fx * (1.0 - fy),
                (1.0 - fx) * fy,
                fx * fy,
            ],
        }
    }

    /// Maps a possibly out-of-range cell onto the glued cell inside the grid.
    fn wrap_cell(&self, a: i64, b: i64) -> usize {
        let dim = self.dimension as i64;
        let a_out = a < 0 || a >= dim;
        let b_out = b < 0 || b >= dim;
        let period = |v: i64| if v >= dim { dim } else { -dim };
        let (a, b) = match (a_out, b_out) {
            (false, false) => (a, b),
            (true, false) => (a - period(a), dim - 1 - b),
            (false, true) => (dim - 1 - a, b - period(b)),
            (true, true) => (a - period(a), b - period(b)),
        };
        let a = a.clamp(0, dim - 1);
        let b = b.clamp(0, dim - 1);
        (b * dim + a) as usize
    }

    /// Spreads `value` bilinearly over the four cells around `sq`.
    pub fn add_interpolated_value(&mut self, sq: &SquareCoord, value: f64) {
        let hood = self.neighbourhood(sq.x, sq.y);
        let square = self.square_mut(sq.hemisphere);
        for (&cell, &w) in hood.cells.iter().zip(hood.weights.iter()) {
            square[cell] += value * w;
        }
    }

    /// Bilinearly interpolated grid value at `sq`.
    pub fn interpolated_value(&self, sq: &SquareCoord) -> f64 {
        let hood = self.neighbourhood(sq.x, sq.y);
        let square = self.square(sq.hemisphere);
        hood.cells
            .iter()
            .zip(hood.weights.iter())
            .map(|(&cell, &w)| square[cell] * w)
            .sum()
    }

    /// Divides each hemisphere by its own total so each sums to 1.
    /// Empty hemispheres are left untouched.
    pub fn normalize(&mut self) {
        for square in [&mut self.north, &mut self.south] {
            let total: f64 = square.iter().sum();
            if total > 0.0 {
                let inv = 1.0 / total;
                square.iter_mut().for_each(|v| *v *= inv);
            }
        }
    }

    /// Normalizes and rescales so that a uniform distribution reads 1.0.
    pub fn normalize_to_mrd(&mut self) {
        self.normalize();
        let cells = (self.dimension * self.dimension) as f64;
        for square in [&mut self.north, &mut self.south] {
            square.iter_mut().for_each(|v| *v *= cells);
        }
    }

    /// Renders both hemispheres into a `dim × dim` stereographic image.
    ///
    /// Each pixel inside the unit circle averages the interpolated values of
    /// its sphere direction and the antipode. Pixels outside stay 0.
    pub fn stereographic_projection(&self, dim: usize) -> Vec<f64> {
        let mut intensity = vec![0.0; dim * dim];
        if dim == 0 {
            return intensity;
        }
        let half = (dim / 2) as f64;
        let res = 2.0 / dim as f64;
        for py in 0..dim {
            for px in 0..dim {
                let x = (px as f64 - half) * res + 0.5 * res;
                let y = (py as f64 - half) * res + 0.5 * res;
                if x * x + y * y > 1.0 {
                    continue;
                }
                let xyz = stereographic_to_sphere(x, y) * self.projector.radius();
                let mut sum = 0.0;
                for dir in [xyz, -xyz] {
                    let sq = self.projector.square_coord(&dir);
                    sum += self.interpolated_value(&sq);
                }
                intensity[py * dim + px] = 0.5 * sum;
            }
        }
        intensity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn filled(dim: usize) -> LambertSquares {
        let mut sq = LambertSquares::new(dim, 1.0).unwrap();
        for i in 0..dim * dim {
            sq.set_value(Hemisphere::North, i, ((i * 37) % 101) as f64 + 0.5);
            sq.set_value(Hemisphere::South, i, ((i * 53) % 89) as f64 + 1.5);
        }
        sq
    }

    #[test]
    fn interpolation_weights_sum_to_one() {
        let sq = LambertSquares::new(9, 1.0).unwrap();
        for &(x, y) in &[(0.0, 0.0), (0.31, -0.77), (-1.2, 1.1), (1.25, 0.4)] {
            let hood = sq.neighbourhood(x, y);
            let total: f64 = hood.weights.iter().sum();
            assert!(approx_eq(total, 1.0));
            assert!(hood.cells.iter().all(|&c| c < 81));
        }
    }

    #[test]
    fn cell_centre_hits_single_cell() {
        let sq = filled(8);
        let step = sq.step();
        let max = sq.projector().max_coord();
        let x = -max + 2.5 * step;
        let y = -max + 5.5 * step;
        let hood = sq.neighbourhood(x, y);
        assert_eq!(hood.cells[0], 5 * 8 + 2);
        assert!(approx_eq(hood.weights[0], 1.0));
    }

    #[test]
    fn right_edge_is_glued_to_mirrored_left_edge() {
        let sq = filled(10);
        let max = sq.projector().max_coord();
        for &y in &[0.37, -0.81, 0.05] {
            for hemisphere in [Hemisphere::North, Hemisphere::South] {
                let right = SquareCoord { hemisphere, x: max, y };
                let left = SquareCoord { hemisphere, x: -max, y: -y };
                let a = sq.interpolated_value(&right);
                let b = sq.interpolated_value(&left);
                assert!(approx_eq(a, b), "y={y} right={a} left={b}");
            }
        }
    }

    #[test]
    fn top_edge_is_glued_to_mirrored_bottom_edge() {
        let sq = filled(10);
        let max = sq.projector().max_coord();
        for &x in &[0.37, -0.81] {
            let top = SquareCoord {
                hemisphere: Hemisphere::North,
                x,
                y: max,
            };
            let bottom = SquareCoord {
                hemisphere: Hemisphere::North,
                x: -x,
                y: -max,
            };
            assert!(approx_eq(
                sq.interpolated_value(&top),
                sq.interpolated_value(&bottom)
            ));
        }
    }

    #[test]
    fn corner_wraps_both_axes() {
        let sq = LambertSquares::new(6, 1.0).unwrap();
        let max = sq.projector().max_coord();
        let hood = sq.neighbourhood(-max, -max);
        // base (0,0), x-neighbour (5,5), y-neighbour (5,5), diagonal (5,5)
        assert_eq!(hood.cells[0], 0);
        assert_eq!(hood.cells[1], 5 * 6 + 5);
        assert_eq!(hood.cells[2], 5 * 6 + 5);
        assert_eq!(hood.cells[3], 5 * 6 + 5);
    }

    #[test]
    fn interpolated_mass_is_conserved() {
        let dirs: Vec<Vector3<f64>> = (0..50)
            .map(|i| {
                let t = i as f64 * 0.37;
                Vector3::new(t.cos() * 0.6, t.sin() * 0.6, (i as f64 * 0.11).cos()).normalize()
            })
            .collect();
        let sq = LambertSquares::from_directions(&dirs, 12, 1.0).unwrap();
        let total: f64 = sq.square(Hemisphere::North).iter().sum::<f64>()
            + sq.square(Hemisphere::South).iter().sum::<f64>();
        assert!(approx_eq(total, 50.0));
    }

    #[test]
    fn mrd_of_uniform_grid_is_one() {
        let mut sq = LambertSquares::new(5, 1.0).unwrap();
        for i in 0..25 {
            sq.set_value(Hemisphere::North, i, 3.0);
            sq.set_value(Hemisphere::South, i, 7.0);
        }
        sq.normalize_to_mrd();
        assert!(sq.square(Hemisphere::North).iter().all(|&v| approx_eq(v, 1.0)));
        assert!(sq.square(Hemisphere::South).iter().all(|&v| approx_eq(v, 1.0)));
    }

    #[test]
    fn stereographic_projection_of_uniform_grid() {
        let mut sq = LambertSquares::new(8, 1.0).unwrap();
        for i in 0..64 {
            sq.set_value(Hemisphere::North, i, 2.0);
            sq.set_value(Hemisphere::South, i, 2.0);
        }
        let img = sq.stereographic_projection(20);
        assert_eq!(img.len(), 400);
        // centre pixel lies inside the circle, corner outside
        assert!(approx_eq(img[10 * 20 + 10], 2.0));
        assert_eq!(img[0], 0.0);
    }

    #[test]
    fn add_value_targets_one_hemisphere() {
        let mut sq = LambertSquares::new(3, 1.0).unwrap();
        sq.add_value(Hemisphere::South, 4, 1.5);
        sq.add_value(Hemisphere::South, 4, 0.5);
        assert_eq!(sq.value(Hemisphere::South, 4), 2.0);
        assert!(sq.square(Hemisphere::North).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn zero_dimension_is_an_error() {
        assert_eq!(
            LambertSquares::new(0, 1.0).unwrap_err(),
            GbcdError::InvalidImageDimension
        );
        assert!(LambertSquares::from_directions(&[Vector3::z()], 0, 1.0).is_err());
    }

    #[test]
    fn square_index_clamps() {
        let sq = LambertSquares::new(4, 1.0).unwrap();
        let max = sq.projector().max_coord();
        let far = SquareCoord {
            hemisphere: Hemisphere::North,
            x: 2.0 * max,
            y: -2.0 * max,
        };
        assert_eq!(sq.square_index(&far), 3);
    }
}
