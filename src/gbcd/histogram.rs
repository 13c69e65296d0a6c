//! Five-dimensional GBCD histogram: layout, bin indexing and MRD normalization.
//!
//! Dimensions 0..3 hold the misorientation (φ1, cos Φ, φ2), dimensions 3..5
//! the Lambert square coordinates of the boundary normal. Every bin exists
//! twice, once per hemisphere, interleaved as `2·bin + hemisphere`.

use crate::angle::deg_to_rad;
use crate::error::GbcdError;
use crate::lambert::Hemisphere;
use crate::orientation::EulerTriple;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Scratch value marking a candidate that produced no bin.
pub const EMPTY_SLOT: u32 = u32::MAX;

/// Largest interleaved bin count a [`GbcdLayout`] may address through `u32` slots.
pub const MAX_TOTAL_BINS: u128 = EMPTY_SLOT as u128;

/// Region of misorientation space covered by the first three dimensions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MisorientationDomain {
    /// φ1, φ2 over a full turn and cos Φ over [−1, 1].
    #[default]
    Full,
    /// All three Euler angles restricted to [0, π/2) before cos Φ is taken.
    CubicReduced,
}

impl MisorientationDomain {
    fn limits(self) -> ([f64; 3], [f64; 3]) {
        match self {
            MisorientationDomain::Full => ([0.0, -1.0, 0.0], [TAU, 1.0, TAU]),
            MisorientationDomain::CubicReduced => ([0.0, 0.0, 0.0], [FRAC_PI_2, 1.0, FRAC_PI_2]),
        }
    }

    /// Euler-angle prefilter applied before binning.
    #[inline]
    pub fn accepts(self, euler: &EulerTriple) -> bool {
        match self {
            MisorientationDomain::Full => true,
            MisorientationDomain::CubicReduced => {
                euler.phi1 < FRAC_PI_2 && euler.big_phi < FRAC_PI_2 && euler.phi2 < FRAC_PI_2
            }
        }
    }
}

/// Sizes, limits and bin widths of the five histogram dimensions.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GbcdLayout {
    pub resolution_deg: f64,
    pub domain: MisorientationDomain,
    pub sizes: [usize; 5],
    pub lower: [f64; 5],
    pub upper: [f64; 5],
    pub deltas: [f64; 5],
}

impl GbcdLayout {
    /// Derives the layout from a single angular resolution in degrees.
    ///
    /// The normal dimensions start from an (S3, S4) = (1/b2, 2π/b) estimate and
    /// are then squared up to `round(sqrt(S3·S4))` each over `±sqrt(π/2)`.
    pub fn from_resolution(
        resolution_deg: f64,
        domain: MisorientationDomain,
    ) -> Result<Self, GbcdError> {
        if !resolution_deg.is_finite() || resolution_deg <= 0.0 {
            return Err(GbcdError::InvalidResolution { resolution_deg });
        }
        let b = deg_to_rad(resolution_deg);
        let b2 = b * 2.0 / PI;

        let (miso_lo, miso_hi) = domain.limits();
        let miso_deltas = [b, b2, b];
        // Sizes stay in f64 until the total is known to fit; products below
        // 2^53 are exact.
        let mut counts = [0.0f64; 5];
        for d in 0..3 {
            counts[d] = ((miso_hi[d] - miso_lo[d]) / miso_deltas[d]).round();
        }
        let normal_s3 = (1.0 / b2).round();
        let normal_s4 = (TAU / b).round();
        let normal_count = (normal_s3 * normal_s4).sqrt().round();
        counts[3] = normal_count;
        counts[4] = normal_count;

        if let Some(dimension) = counts.iter().position(|&c| c < 1.0) {
            return Err(GbcdError::DegenerateLayout { dimension });
        }
        let bins = counts.iter().product::<f64>() * 2.0;
        if bins > MAX_TOTAL_BINS as f64 {
            // Float to int casts saturate, so huge or infinite totals report u128::MAX.
            return Err(GbcdError::HistogramTooLarge {
                bins: bins as u128,
                maximum: MAX_TOTAL_BINS,
            });
        }
        let sizes = counts.map(|c| c as usize);
        let normal_size = sizes[3];

        let max_coord = FRAC_PI_2.sqrt();
        let normal_delta = 2.0 * max_coord / normal_size as f64;
        Ok(Self {
            resolution_deg,
            domain,
            sizes,
            lower: [miso_lo[0], miso_lo[1], miso_lo[2], -max_coord, -max_coord],
            upper: [miso_hi[0], miso_hi[1], miso_hi[2], max_coord, max_coord],
            deltas: [b, b2, b, normal_delta, normal_delta],
        })
    }

    /// Bins per hemisphere (`S0·S1·S2·S3·S4`).
    #[inline]
    pub fn num_bins(&self) -> usize {
        self.sizes.iter().product()
    }

    /// Interleaved bin count over both hemispheres.
    #[inline]
    pub fn total_bins(&self) -> usize {
        2 * self.num_bins()
    }

    /// Limits in the flat `[lower; 5] ++ [upper; 5]` arrangement.
    pub fn limits(&self) -> [f64; 10] {
        let mut out = [0.0; 10];
        out[..5].copy_from_slice(&self.lower);
        out[5..].copy_from_slice(&self.upper);
        out
    }

    /// Flattened bin of a continuous 5-D coordinate.
    ///
    /// Values below the lower or above the upper limit (or non-finite) are
    /// rejected; values on the upper limit itself land in the last bin.
    pub fn bin_index(&self, coords: &[f64; 5]) -> Option<usize> {
        let mut index = 0usize;
        let mut stride = 1usize;
        for d in 0..5 {
            let v = coords[d];
            if !(v >= self.lower[d] && v <= self.upper[d]) {
                return None;
            }
            let raw = ((v - self.lower[d]) / self.deltas[d]).floor() as usize;
            index += raw.min(self.sizes[d] - 1) * stride;
            stride *= self.sizes[d];
        }
        Some(index)
    }

    /// Per-dimension indices of a flattened bin.
    pub fn unflatten(&self, mut bin: usize) -> [usize; 5] {
        let mut out = [0usize; 5];
        for d in 0..5 {
            out[d] = bin % self.sizes[d];
            bin /= self.sizes[d];
        }
        out
    }

    /// Coordinate of the centre of a flattened bin.
    pub fn bin_center(&self, bin: usize) -> [f64; 5] {
        let idx = self.unflatten(bin);
        let mut out = [0.0; 5];
        for d in 0..5 {
            out[d] = self.lower[d] + (idx[d] as f64 + 0.5) * self.deltas[d];
        }
        out
    }
}

/// Packs a bin and hemisphere into a scratch slot (the interleaved offset).
#[inline]
pub fn encode_slot(bin: usize, hemisphere: Hemisphere) -> u32 {
    (2 * bin + hemisphere.offset()) as u32
}

/// Area-weighted accumulator for one phase.
#[derive(Clone, Debug)]
pub struct GbcdHistogram {
    values: Vec<f64>,
    hemisphere_area: [f64; 2],
}

impl GbcdHistogram {
    pub fn new(layout: &GbcdLayout) -> Self {
        Self {
            values: vec![0.0; layout.total_bins()],
            hemisphere_area: [0.0; 2],
        }
    }

    /// Adds `area` at an encoded scratch slot.
    #[inline]
    pub fn accumulate(&mut self, slot: u32, area: f64) {
        let offset = slot as usize;
        self.values[offset] += area;
        self.hemisphere_area[offset & 1] += area;
    }

    #[inline]
    pub fn add(&mut self, bin: usize, hemisphere: Hemisphere, area: f64) {
        self.accumulate(encode_slot(bin, hemisphere), area);
    }

    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[inline]
    pub fn value(&self, bin: usize, hemisphere: Hemisphere) -> f64 {
        self.values[2 * bin + hemisphere.offset()]
    }

    /// Running area total per hemisphere (`[north, south]`).
    #[inline]
    pub fn hemisphere_area(&self) -> [f64; 2] {
        self.hemisphere_area
    }

    /// Sum of the stored values of one hemisphere.
    pub fn hemisphere_sum(&self, hemisphere: Hemisphere) -> f64 {
        self.values
            .iter()
            .skip(hemisphere.offset())
            .step_by(2)
            .sum()
    }

    /// Rescales every bin to multiples of random distribution.
    ///
    /// Returns the per-hemisphere factors `bins_per_hemisphere / area[h]`, so a
    /// uniform population reads 1.0 in both hemispheres. A hemisphere that
    /// received no area keeps factor 0.
    pub fn normalize_to_mrd(&mut self) -> [f64; 2] {
        let bins_per_hemisphere = (self.values.len() / 2) as f64;
        let mut factors = [0.0; 2];
        for (factor, &area) in factors.iter_mut().zip(self.hemisphere_area.iter()) {
            if area > 0.0 {
                *factor = bins_per_hemisphere / area;
            }
        }
        for (offset, v) in self.values.iter_mut().enumerate() {
            *v *= factors[offset & 1];
        }
        factors
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }
}
