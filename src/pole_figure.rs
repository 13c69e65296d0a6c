//! GBCD pole figure: boundary-plane distribution at one fixed misorientation.
//!
//! Every pixel of a stereographic disk is lifted to a crystal-frame normal.
//! The histogram is then read at all symmetry-equivalent (misorientation,
//! normal) pairs of the fixed misorientation, from both sides of the
//! boundary, and the pixel stores the mean of the lookups that land inside
//! the histogram.

use crate::angle::deg_to_rad;
use crate::error::GbcdError;
use crate::gbcd::{GbcdLayout, GbcdResult, PhaseGbcd};
use crate::lambert::{stereographic_to_sphere, LambertProjector};
use crate::orientation::{EulerTriple, Orientation};
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

/// Misorientation (axis–angle, crystal frame) and image size of a pole figure.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoleFigureParams {
    pub axis: [f64; 3],
    pub angle_deg: f64,
    pub dimension: usize,
}

impl Default for PoleFigureParams {
    fn default() -> Self {
        // Σ3 twin in cubic materials.
        Self {
            axis: [1.0, 1.0, 1.0],
            angle_deg: 60.0,
            dimension: 100,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GbcdPoleFigure {
    pub phase: usize,
    pub axis: [f64; 3],
    pub angle_deg: f64,
    pub dimension: usize,
    /// Row-major `dimension²` intensities in MRD; 0 outside the disk.
    pub intensity: Vec<f64>,
    pub max_intensity: f64,
}

/// Extracts the pole figure of `phase` from a finished run.
pub fn gbcd_pole_figure(
    result: &GbcdResult,
    phase: usize,
    params: &PoleFigureParams,
) -> Result<GbcdPoleFigure, GbcdError> {
    let histogram = result
        .phase(phase)
        .filter(|p| p.family.is_some())
        .ok_or(GbcdError::PhaseNotAvailable { phase })?;
    let intensity = render(&result.layout, histogram, params)?;
    let max_intensity = intensity.iter().copied().fold(0.0, f64::max);
    Ok(GbcdPoleFigure {
        phase,
        axis: params.axis,
        angle_deg: params.angle_deg,
        dimension: params.dimension,
        intensity,
        max_intensity,
    })
}

/// Renders the intensity grid for one phase histogram.
pub fn render(
    layout: &GbcdLayout,
    histogram: &PhaseGbcd,
    params: &PoleFigureParams,
) -> Result<Vec<f64>, GbcdError> {
    let ops = histogram
        .family
        .map(|f| f.operators())
        .ok_or(GbcdError::PhaseNotAvailable {
            phase: histogram.phase,
        })?;
    if params.dimension == 0 {
        return Err(GbcdError::InvalidImageDimension);
    }
    let axis = Vector3::from(params.axis);
    let dg = *Orientation::from_axis_angle(&axis, deg_to_rad(params.angle_deg))
        .ok_or(GbcdError::InvalidMisorientationAxis)?
        .matrix();

    let sampler = Sampler {
        layout,
        histogram,
        ops,
        dg,
        dgt: dg.transpose(),
        projector: LambertProjector::default(),
        dimension: params.dimension,
    };
    let dim = params.dimension;
    let mut intensity = vec![0.0; dim * dim];

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        intensity
            .par_chunks_mut(dim)
            .enumerate()
            .for_each(|(row, out)| sampler.render_row(row, out));
    }
    #[cfg(not(feature = "parallel"))]
    {
        for (row, out) in intensity.chunks_mut(dim).enumerate() {
            sampler.render_row(row, out);
        }
    }
    Ok(intensity)
}

struct Sampler<'a> {
    layout: &'a GbcdLayout,
    histogram: &'a PhaseGbcd,
    ops: &'static [Matrix3<f64>],
    dg: Matrix3<f64>,
    dgt: Matrix3<f64>,
    projector: LambertProjector,
    dimension: usize,
}

impl Sampler<'_> {
    fn render_row(&self, row: usize, out: &mut [f64]) {
        let half = (self.dimension / 2) as f64;
        let res = 2.0 / self.dimension as f64;
        let y = (row as f64 - half) * res + 0.5 * res;
        for (col, px) in out.iter_mut().enumerate() {
            let x = (col as f64 - half) * res + 0.5 * res;
            *px = if x * x + y * y > 1.0 {
                0.0
            } else {
                self.sample(&stereographic_to_sphere(x, y))
            };
        }
    }

    /// Mean histogram value over all equivalent representations of `(dg, normal)`.
    fn sample(&self, normal: &Vector3<f64>) -> f64 {
        let domain = self.layout.domain;
        let other_side = self.dgt * normal;
        let mut sum = 0.0;
        let mut count = 0usize;
        for sym_i in self.ops {
            let near = self.projector.square_coord(&(sym_i * normal));
            let far = self.projector.square_coord(&(sym_i * other_side));
            let sdg = sym_i * self.dg;
            let sdgt = sym_i * self.dgt;
            for sym_j in self.ops {
                let candidates = [(sdg * sym_j.transpose(), near), (sdgt * sym_j, far)];
                for (miso, sq) in candidates {
                    let euler = EulerTriple::from_matrix(&miso);
                    if !domain.accepts(&euler) {
                        continue;
                    }
                    let [m0, m1, m2] = euler.to_gbcd_coords();
                    if let Some(bin) = self.layout.bin_index(&[m0, m1, m2, sq.x, sq.y]) {
                        sum += self.histogram.value(bin, sq.hemisphere);
                        count += 1;
                    }
                }
            }
        }
        if count > 0 {
            sum / count as f64
        } else {
            0.0
        }
    }
}
