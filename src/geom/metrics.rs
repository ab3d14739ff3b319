//! Opt-in timing hooks for the sampling pipeline.
//!
//! Timing is only collected with the `mesh_engine_metrics` feature on non-wasm targets
//! (`std::time::Instant` is unavailable on `wasm32`). Otherwise every call is a pass-through
//! and [`GeomMetrics::end`] returns `None`.
//!
//! ```ignore
//! let mut metrics = GeomMetrics::default();
//! metrics.begin();
//! let sampled = metrics.time(TimingBucket::Sampling, || sample_complex(&complex, &corners, &grid))?;
//! if let Some(report) = metrics.end() {
//!     println!("sampling: {} ns", report.sampling_ns);
//! }
//! ```

/// Pipeline phases that accumulate time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimingBucket {
    /// Positional encoding of model inputs.
    Encoding,
    /// Bilinear sampling of complexes.
    Sampling,
    /// Triangle and quad index generation.
    Topology,
    /// Face and vertex normal estimation.
    Normals,
    /// Reference surface generation.
    Generation,
    /// Model forward passes.
    Prediction,
    /// Error statistics, PSNR and report records.
    Evaluation,
    /// Mesh diagnostics passes.
    Diagnostics,
}

/// Cumulative nanoseconds per bucket.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GeomTimingReport {
    pub encoding_ns: u64,
    pub sampling_ns: u64,
    pub topology_ns: u64,
    pub normals_ns: u64,
    pub generation_ns: u64,
    pub prediction_ns: u64,
    pub evaluation_ns: u64,
    pub diagnostics_ns: u64,
}

impl GeomTimingReport {
    #[must_use]
    pub fn total_ns(&self) -> u64 {
        self.encoding_ns
            .saturating_add(self.sampling_ns)
            .saturating_add(self.topology_ns)
            .saturating_add(self.normals_ns)
            .saturating_add(self.generation_ns)
            .saturating_add(self.prediction_ns)
            .saturating_add(self.evaluation_ns)
            .saturating_add(self.diagnostics_ns)
    }

    #[must_use]
    pub fn total_ms(&self) -> f64 {
        self.total_ns() as f64 / 1_000_000.0
    }

    fn slot_mut(&mut self, bucket: TimingBucket) -> &mut u64 {
        match bucket {
            TimingBucket::Encoding => &mut self.encoding_ns,
            TimingBucket::Sampling => &mut self.sampling_ns,
            TimingBucket::Topology => &mut self.topology_ns,
            TimingBucket::Normals => &mut self.normals_ns,
            TimingBucket::Generation => &mut self.generation_ns,
            TimingBucket::Prediction => &mut self.prediction_ns,
            TimingBucket::Evaluation => &mut self.evaluation_ns,
            TimingBucket::Diagnostics => &mut self.diagnostics_ns,
        }
    }

    /// Adds `nanos` to `bucket`, saturating at `u64::MAX`.
    pub fn add(&mut self, bucket: TimingBucket, nanos: u64) {
        let slot = self.slot_mut(bucket);
        *slot = slot.saturating_add(nanos);
    }
}

/// Accumulator: [`begin`](Self::begin), wrap work in [`time`](Self::time), read with
/// [`end`](Self::end).
#[derive(Debug, Default)]
pub struct GeomMetrics {
    #[cfg(all(feature = "mesh_engine_metrics", not(target_arch = "wasm32")))]
    report: GeomTimingReport,
}

impl GeomMetrics {
    pub fn begin(&mut self) {
        #[cfg(all(feature = "mesh_engine_metrics", not(target_arch = "wasm32")))]
        {
            self.report = GeomTimingReport::default();
        }
    }

    #[must_use]
    pub fn end(&self) -> Option<GeomTimingReport> {
        #[cfg(all(feature = "mesh_engine_metrics", not(target_arch = "wasm32")))]
        {
            Some(self.report.clone())
        }
        #[cfg(not(all(feature = "mesh_engine_metrics", not(target_arch = "wasm32"))))]
        {
            None
        }
    }

    pub fn time<R>(&mut self, bucket: TimingBucket, f: impl FnOnce() -> R) -> R {
        #[cfg(all(feature = "mesh_engine_metrics", not(target_arch = "wasm32")))]
        {
            let start = std::time::Instant::now();
            let result = f();
            let nanos = start.elapsed().as_nanos().min(u128::from(u64::MAX)) as u64;
            self.report.add(bucket, nanos);
            result
        }

        #[cfg(not(all(feature = "mesh_engine_metrics", not(target_arch = "wasm32"))))]
        {
            let _ = bucket;
            f()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_add_saturates() {
        let mut report = GeomTimingReport::default();
        report.add(TimingBucket::Normals, u64::MAX);
        report.add(TimingBucket::Normals, 10);
        assert_eq!(report.normals_ns, u64::MAX);
        assert_eq!(report.total_ns(), u64::MAX);
    }

    #[test]
    fn time_returns_closure_result() {
        let mut metrics = GeomMetrics::default();
        metrics.begin();
        let value = metrics.time(TimingBucket::Sampling, || 42);
        assert_eq!(value, 42);

        #[cfg(not(all(feature = "mesh_engine_metrics", not(target_arch = "wasm32"))))]
        assert!(metrics.end().is_none());
        #[cfg(all(feature = "mesh_engine_metrics", not(target_arch = "wasm32")))]
        assert!(metrics.end().is_some());
    }
}
