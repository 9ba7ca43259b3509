//! Observed statistics
//!
//! Streaming min/max/mean/standard deviation over generated cell values. Each
//! accumulator is single-threaded; parallel scans give every worker its own
//! accumulator and combine them with [`ObservedStatistics::merge`].
//!
//! # Example
//!
//! ```
//! use random_raster::stats::ObservedStatistics;
//!
//! let mut left = ObservedStatistics::new();
//! left.record(1.0);
//! left.record(3.0);
//!
//! let mut right = ObservedStatistics::new();
//! right.record(5.0);
//!
//! left.merge(&right);
//! assert_eq!(left.count(), 3);
//! assert_eq!(left.mean(), Some(3.0));
//! ```

use crate::distribution::Statistics;

/// Running moments using Welford's update and Chan's merge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservedStatistics {
    count: u64,
    min: f64,
    max: f64,
    mean: f64,
    /// Sum of squared deviations from the running mean
    m2: f64,
}

impl ObservedStatistics {
    pub fn new() -> Self {
        Self {
            count: 0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            mean: 0.0,
            m2: 0.0,
        }
    }

    /// Record one value; NaN is ignored
    #[inline]
    pub fn record(&mut self, value: f64) {
        if value.is_nan() {
            return;
        }
        self.count += 1;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    /// Combine with another accumulator
    pub fn merge(&mut self, other: &ObservedStatistics) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = *other;
            return;
        }
        let count = self.count + other.count;
        let delta = other.mean - self.mean;
        let weight = other.count as f64 / count as f64;
        self.mean += delta * weight;
        self.m2 += other.m2 + delta * delta * self.count as f64 * weight;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.count = count;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn min(&self) -> Option<f64> {
        (!self.is_empty()).then_some(self.min)
    }

    pub fn max(&self) -> Option<f64> {
        (!self.is_empty()).then_some(self.max)
    }

    pub fn mean(&self) -> Option<f64> {
        (!self.is_empty()).then_some(self.mean)
    }

    /// Population standard deviation
    pub fn std_dev(&self) -> Option<f64> {
        (!self.is_empty()).then(|| (self.m2 / self.count as f64).sqrt())
    }

    /// Snapshot in the same shape as theoretical statistics
    pub fn to_statistics(&self) -> Option<Statistics> {
        Some(Statistics::new(
            self.min()?,
            self.max()?,
            self.mean()?,
            self.std_dev()?,
        ))
    }
}

impl Default for ObservedStatistics {
    fn default() -> Self {
        Self::new()
    }
}
