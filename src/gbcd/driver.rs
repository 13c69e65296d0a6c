//! Chunked compute-then-fold loop over the boundary triangles.
//!
//! Each chunk clears a scratch buffer of `chunk × 4·max_nsym²` slots, fills
//! it (in parallel when enabled, one disjoint window per triangle) and then
//! folds the filled slots serially into the histogram of each triangle's
//! phase. Cancellation is polled between chunks.

use super::histogram::{GbcdHistogram, GbcdLayout, EMPTY_SLOT};
use super::parallel::{fill_chunk, CancelFlag};
use super::params::GbcdParams;
use super::reducer::{slots_per_triangle, MisorientationReducer, TriangleOutcome};
use super::{GbcdResult, PhaseGbcd};
use crate::diagnostics::timing::elapsed_ms;
use crate::diagnostics::GbcdDiagnostics;
use crate::error::GbcdError;
use crate::mesh::GbcdInput;
use crate::symmetry::SymmetryTable;
use log::{debug, warn};
use std::ops::Range;
use std::time::Instant;

/// Owns the per-phase histograms and scratch state of one run.
pub struct ReductionDriver<'a> {
    input: GbcdInput<'a>,
    symmetry: SymmetryTable,
    layout: GbcdLayout,
    params: GbcdParams,
    histograms: Vec<GbcdHistogram>,
    stride: usize,
    scratch: Vec<u32>,
    outcomes: Vec<TriangleOutcome>,
    next_triangle: usize,
    diagnostics: GbcdDiagnostics,
    started: Instant,
}

impl<'a> ReductionDriver<'a> {
    /// Validates parameters and input, derives the layout and allocates one
    /// zeroed histogram per ensemble entry plus the chunk scratch.
    pub fn configure(input: GbcdInput<'a>, params: GbcdParams) -> Result<Self, GbcdError> {
        let started = Instant::now();
        if params.chunk_size == 0 {
            return Err(GbcdError::InvalidChunkSize);
        }
        let layout = GbcdLayout::from_resolution(params.resolution_deg, params.domain)?;
        let symmetry = SymmetryTable::from_crystal_structures(input.crystal_structures);
        input.validate(&symmetry)?;

        let num_triangles = input.num_triangles();
        let stride = slots_per_triangle(symmetry.max_sym_ops());
        let chunk_len = params.chunk_size.min(num_triangles);
        let histograms = (0..symmetry.num_phases())
            .map(|_| GbcdHistogram::new(&layout))
            .collect();
        debug!(
            "ReductionDriver::configure triangles={} phases={} sizes={:?} stride={} chunk={}",
            num_triangles,
            symmetry.num_phases(),
            layout.sizes,
            stride,
            params.chunk_size
        );

        let mut diagnostics = GbcdDiagnostics {
            triangles_total: num_triangles,
            chunk_size: params.chunk_size,
            ..Default::default()
        };
        diagnostics.timings.push("configure", elapsed_ms(started));

        Ok(Self {
            input,
            symmetry,
            layout,
            params,
            histograms,
            stride,
            scratch: vec![EMPTY_SLOT; chunk_len * stride],
            outcomes: vec![TriangleOutcome::Pending; chunk_len],
            next_triangle: 0,
            diagnostics,
            started,
        })
    }

    #[inline]
    pub fn layout(&self) -> &GbcdLayout {
        &self.layout
    }

    #[inline]
    pub fn diagnostics(&self) -> &GbcdDiagnostics {
        &self.diagnostics
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.next_triangle >= self.input.num_triangles()
    }

    pub fn chunks_completed(&self) -> usize {
        self.diagnostics.chunks
    }

    /// Reduces and folds the next chunk. Returns the triangle range handled,
    /// or `None` once every triangle has been processed.
    pub fn process_next_chunk(&mut self) -> Option<Range<usize>> {
        let num_triangles = self.input.num_triangles();
        if self.next_triangle >= num_triangles {
            return None;
        }
        let start = self.next_triangle;
        let end = (start + self.params.chunk_size).min(num_triangles);
        let len = end - start;
        let stride = self.stride;

        let fill_start = Instant::now();
        let slots = &mut self.scratch[..len * stride];
        slots.fill(EMPTY_SLOT);
        let outcomes = &mut self.outcomes[..len];
        let reducer = MisorientationReducer::new(&self.layout);
        let input = self.input;
        let symmetry = &self.symmetry;
        let parallel = fill_chunk(self.params.parallel, slots, stride, outcomes, |i, window| {
            reducer.reduce_triangle(&input, symmetry, start + i, window)
        });
        let fill_ms = elapsed_ms(fill_start);

        let fold_start = Instant::now();
        let filled = self.scratch[..len * stride].chunks(stride);
        for (i, (window, outcome)) in filled.zip(&self.outcomes[..len]).enumerate() {
            self.diagnostics.record(outcome);
            if let TriangleOutcome::Reduced { phase, .. } = *outcome {
                let area = self.input.area(start + i);
                let histogram = &mut self.histograms[phase];
                for &slot in window.iter().filter(|&&s| s != EMPTY_SLOT) {
                    histogram.accumulate(slot, area);
                }
            }
        }
        let fold_ms = elapsed_ms(fold_start);

        self.diagnostics.chunks += 1;
        if parallel {
            self.diagnostics.parallel_chunks += 1;
        }
        self.diagnostics.timings.accumulate("fill", fill_ms);
        self.diagnostics.timings.accumulate("fold", fold_ms);
        debug!(
            "ReductionDriver chunk {} triangles {}..{} parallel={} fill_ms={:.3} fold_ms={:.3}",
            self.diagnostics.chunks, start, end, parallel, fill_ms, fold_ms
        );

        self.next_triangle = end;
        Some(start..end)
    }

    /// Processes every remaining chunk, checking `cancel` before each one.
    pub fn run(&mut self, cancel: &CancelFlag) -> Result<(), GbcdError> {
        while !self.is_done() {
            if cancel.is_cancelled() {
                debug!(
                    "ReductionDriver cancelled after {} chunks",
                    self.diagnostics.chunks
                );
                return Err(GbcdError::Cancelled {
                    chunks_completed: self.diagnostics.chunks,
                });
            }
            self.process_next_chunk();
        }
        Ok(())
    }

    /// Normalizes every phase histogram to MRD and hands the results back.
    pub fn finalize(self) -> GbcdResult {
        let normalize_start = Instant::now();
        let ReductionDriver {
            symmetry,
            layout,
            histograms,
            mut diagnostics,
            started,
            next_triangle,
            input,
            ..
        } = self;
        if next_triangle < input.num_triangles() {
            warn!(
                "ReductionDriver::finalize with {} of {} triangles processed",
                next_triangle,
                input.num_triangles()
            );
        }

        let phases = histograms
            .into_iter()
            .enumerate()
            .map(|(phase, mut histogram)| {
                let family = symmetry.family(phase);
                let hemisphere_area = histogram.hemisphere_area();
                let mrd_factor = histogram.normalize_to_mrd();
                if family.is_some() && hemisphere_area.iter().any(|&a| a == 0.0) {
                    warn!(
                        "phase {} has a hemisphere without boundary area (north={:.4}, south={:.4}); its MRD factor is 0",
                        phase, hemisphere_area[0], hemisphere_area[1]
                    );
                }
                PhaseGbcd {
                    phase,
                    family,
                    hemisphere_area,
                    mrd_factor,
                    values: histogram.into_values(),
                }
            })
            .collect();

        diagnostics
            .timings
            .push("normalize", elapsed_ms(normalize_start));
        diagnostics.timings.total_ms = elapsed_ms(started);
        debug!(
            "ReductionDriver::finalize reduced={} skipped={} out_of_range={} total_ms={:.3}",
            diagnostics.triangles_reduced,
            diagnostics.skipped.total(),
            diagnostics.candidates_out_of_range,
            diagnostics.timings.total_ms
        );

        GbcdResult {
            layout,
            phases,
            diagnostics,
        }
    }
}
