//! Chunk fill executor: Rayon across triangles, or a plain loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Controls whether the per-chunk fill runs sequentially or with Rayon.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParallelOptions {
    enabled: bool,
    min_triangles_for_parallel: usize,
}

impl ParallelOptions {
    /// Construct explicit options.
    pub fn new(enabled: bool, min_triangles_for_parallel: usize) -> Self {
        Self {
            enabled,
            min_triangles_for_parallel: min_triangles_for_parallel.max(1),
        }
    }

    /// Disable parallel fill regardless of chunk size.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            min_triangles_for_parallel: usize::MAX,
        }
    }

    /// Returns true when a chunk of `triangle_count` triangles should use Rayon.
    pub fn should_parallelize(&self, triangle_count: usize) -> bool {
        cfg!(feature = "parallel")
            && self.enabled
            && triangle_count >= self.min_triangles_for_parallel
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn min_triangles_for_parallel(&self) -> usize {
        self.min_triangles_for_parallel
    }
}

impl Default for ParallelOptions {
    fn default() -> Self {
        Self {
            enabled: cfg!(feature = "parallel"),
            min_triangles_for_parallel: 64,
        }
    }
}

/// Shared cancellation request, polled by the driver between chunks.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Runs `work(i, slots_i)` for every item of a chunk, storing its outcome.
///
/// `slots` is split into `outcomes.len()` disjoint windows of `stride`
/// entries; item `i` only ever sees its own window. Returns true when the
/// chunk ran on the Rayon pool.
pub fn fill_chunk<O, F>(
    options: ParallelOptions,
    slots: &mut [u32],
    stride: usize,
    outcomes: &mut [O],
    work: F,
) -> bool
where
    O: Send,
    F: Fn(usize, &mut [u32]) -> O + Sync + Send,
{
    debug_assert!(stride > 0);
    debug_assert!(slots.len() >= stride * outcomes.len());
    let slots = &mut slots[..stride * outcomes.len()];

    if options.should_parallelize(outcomes.len()) {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            slots
                .par_chunks_mut(stride)
                .zip(outcomes.par_iter_mut())
                .enumerate()
                .for_each(|(i, (window, outcome))| *outcome = work(i, window));
            return true;
        }
    }

    for (i, (window, outcome)) in slots
        .chunks_mut(stride)
        .zip(outcomes.iter_mut())
        .enumerate()
    {
        *outcome = work(i, window);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(options: ParallelOptions) -> (Vec<u32>, Vec<usize>) {
        let mut slots = vec![0u32; 3 * 200];
        let mut outcomes = vec![0usize; 200];
        fill_chunk(options, &mut slots, 3, &mut outcomes, |i, window| {
            for (k, s) in window.iter_mut().enumerate() {
                *s = (i * 10 + k) as u32;
            }
            i * 2
        });
        (slots, outcomes)
    }

    #[test]
    fn threshold_gates_parallel_path() {
        let opts = ParallelOptions::new(true, 100);
        assert_eq!(opts.should_parallelize(99), false);
        assert_eq!(opts.should_parallelize(100), cfg!(feature = "parallel"));
        assert!(!ParallelOptions::disabled().should_parallelize(usize::MAX));
        assert_eq!(ParallelOptions::new(true, 0).min_triangles_for_parallel(), 1);
    }

    #[test]
    fn sequential_and_parallel_fill_agree() {
        let seq = fill(ParallelOptions::disabled());
        let par = fill(ParallelOptions::new(true, 1));
        assert_eq!(seq, par);
        assert_eq!(seq.0[3 * 7 + 2], 72);
        assert_eq!(seq.1[150], 300);
    }

    #[test]
    fn cancel_flag_is_shared_between_clones() {
        let flag = CancelFlag::new();
        let other = flag.clone();
        assert!(!other.is_cancelled());
        flag.cancel();
        assert!(other.is_cancelled());
    }
}
