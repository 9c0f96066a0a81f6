// ─────────────────────────────────────────────────────────────────────
// SCPN Orbit Maps — Accelerator
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use ndarray::Array1;

/// Interval-lookup cache shared across splines built on the same abscissa.
///
/// A lookup first confirms the cached interval in O(1); only on a miss does
/// it fall back to binary search. The accelerator is owned by the caller
/// (one per worker, per axis) and passed explicitly to every evaluation, so
/// parallel particles never contend on it.
#[derive(Debug, Clone, Default)]
pub struct Accelerator {
    cached: usize,
    hits: u64,
    misses: u64,
}

impl Accelerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the interval index `i` with `xa[i] <= x < xa[i+1]`, clamped to
    /// `[0, len-2]` for out-of-range queries.
    pub fn locate(&mut self, xa: &Array1<f64>, x: f64) -> usize {
        let n = xa.len();
        debug_assert!(n >= 2);
        let last = n - 2;

        let i = self.cached.min(last);
        if xa[i] <= x && (x < xa[i + 1] || i == last) {
            self.hits += 1;
            return i;
        }

        self.misses += 1;
        let mut lo = 0usize;
        let mut hi = last;
        while lo < hi {
            let mid = (lo + hi + 1) / 2;
            if xa[mid] <= x {
                lo = mid;
            } else {
                hi = mid - 1;
            }
        }
        self.cached = lo;
        lo
    }

    /// Number of cache hits since construction or the last reset.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Number of binary searches performed. This is the instrumentation hook
    /// for verifying that co-evaluated splines share one interval lookup.
    pub fn searches(&self) -> u64 {
        self.misses
    }

    /// Clears the cache and the hit/miss statistics.
    pub fn reset(&mut self) {
        self.cached = 0;
        self.hits = 0;
        self.misses = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis() -> Array1<f64> {
        Array1::linspace(0.0, 10.0, 11)
    }

    #[test]
    fn test_locate_exact_intervals() {
        let xa = axis();
        let mut acc = Accelerator::new();
        assert_eq!(acc.locate(&xa, 0.0), 0);
        assert_eq!(acc.locate(&xa, 3.5), 3);
        assert_eq!(acc.locate(&xa, 9.999), 9);
        // The last knot belongs to the last interval.
        assert_eq!(acc.locate(&xa, 10.0), 9);
    }

    #[test]
    fn test_locate_clamps_out_of_range() {
        let xa = axis();
        let mut acc = Accelerator::new();
        assert_eq!(acc.locate(&xa, -5.0), 0);
        assert_eq!(acc.locate(&xa, 25.0), 9);
    }

    #[test]
    fn test_repeated_queries_hit_cache() {
        let xa = axis();
        let mut acc = Accelerator::new();
        acc.locate(&xa, 4.2);
        let searches_after_first = acc.searches();
        acc.locate(&xa, 4.3);
        acc.locate(&xa, 4.9);
        acc.locate(&xa, 4.0);
        assert_eq!(acc.searches(), searches_after_first);
        assert_eq!(acc.hits(), 3);
    }

    #[test]
    fn test_moving_query_misses_once() {
        let xa = axis();
        let mut acc = Accelerator::new();
        acc.locate(&xa, 1.5);
        acc.locate(&xa, 7.5);
        assert_eq!(acc.searches(), 2);
        acc.locate(&xa, 7.6);
        assert_eq!(acc.searches(), 2);
    }

    #[test]
    fn test_reset_clears_stats() {
        let xa = axis();
        let mut acc = Accelerator::new();
        acc.locate(&xa, 6.0);
        acc.locate(&xa, 6.1);
        acc.reset();
        assert_eq!(acc.hits(), 0);
        assert_eq!(acc.searches(), 0);
    }
}
