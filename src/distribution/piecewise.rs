//! Piecewise densities
//!
//! Both distributions are defined by a strictly increasing sequence of interval
//! boundaries. A piecewise constant density holds one value per interval; a
//! piecewise linear density holds one value per boundary and interpolates in
//! between. Densities need not be normalized.
//!
//! Sampling first picks an interval by its probability mass, then inverts the
//! within-interval CDF. All arithmetic happens in f64 and the result is
//! converted to the storage type.

use super::{Fitted, Sampler, Statistics};
use crate::config::params::{get_array, Constraint, Params};
use crate::element::RealElement;
use crate::error::ParameterError;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

/// Read an array in `F`, so values the storage type cannot hold are rejected
fn read_in<F: RealElement>(params: &Params, key: &str) -> Result<Vec<f64>, ParameterError> {
    let values: Vec<F> = get_array(params, key)?;
    Ok(values.into_iter().map(F::to_f64_lossy).collect())
}

fn boundaries<F: RealElement>(params: &Params) -> Result<Vec<f64>, ParameterError> {
    let intervals = read_in::<F>(params, "intervals")?;
    if intervals.len() < 2 {
        return Err(ParameterError::invalid(
            "intervals",
            format!("needs at least 2 boundaries, got {}", intervals.len()),
        ));
    }
    if let Some(i) = intervals.windows(2).position(|w| !(w[0] < w[1])) {
        return Err(ParameterError::invalid(
            "intervals",
            format!(
                "must be strictly increasing, but intervals[{}] = {} is followed by {}",
                i,
                intervals[i],
                intervals[i + 1]
            ),
        ));
    }
    if !(intervals[intervals.len() - 1] - intervals[0]).is_finite() {
        return Err(ParameterError::invalid("intervals", "span is not finite"));
    }
    Ok(intervals)
}

fn densities<F: RealElement>(
    params: &Params,
    expected_len: usize,
) -> Result<Vec<f64>, ParameterError> {
    let densities = read_in::<F>(params, "densities")?;
    if densities.len() != expected_len {
        return Err(ParameterError::invalid(
            "densities",
            format!("expected {} values, got {}", expected_len, densities.len()),
        ));
    }
    if let Some(i) = densities.iter().position(|&d| d < 0.0) {
        return Err(ParameterError::OutOfRange {
            key: format!("densities[{}]", i),
            value: densities[i].to_string(),
            constraint: Constraint::at_least(0.0).to_string(),
        });
    }
    Ok(densities)
}

fn interval_picker(masses: &[f64]) -> Result<WeightedIndex<f64>, ParameterError> {
    let total: f64 = masses.iter().sum();
    if !(total > 0.0 && total.is_finite()) {
        return Err(ParameterError::invalid(
            "densities",
            "total probability mass must be positive and finite",
        ));
    }
    WeightedIndex::new(masses).map_err(|e| ParameterError::invalid("densities", e.to_string()))
}

fn moments_to_statistics(lo: f64, hi: f64, total: f64, m1: f64, m2: f64) -> Statistics {
    let mean = m1 / total;
    let variance = (m2 / total - mean * mean).max(0.0);
    Statistics::new(lo, hi, mean, variance.sqrt())
}

/// Constant density on each interval
#[derive(Debug, Clone)]
pub struct PiecewiseConstant {
    intervals: Vec<f64>,
    picker: WeightedIndex<f64>,
    statistics: Statistics,
}

impl PiecewiseConstant {
    pub fn from_params(params: &Params) -> Result<Self, ParameterError> {
        Self::from_params_in::<f64>(params)
    }

    /// Resolve with boundaries and densities read in the storage type `F`
    pub fn from_params_in<F: RealElement>(params: &Params) -> Result<Self, ParameterError> {
        let intervals = boundaries::<F>(params)?;
        let densities = densities::<F>(params, intervals.len() - 1)?;

        let masses: Vec<f64> = intervals
            .windows(2)
            .zip(&densities)
            .map(|(w, d)| d * (w[1] - w[0]))
            .collect();
        let picker = interval_picker(&masses)?;

        let total: f64 = masses.iter().sum();
        let (m1, m2) = intervals
            .windows(2)
            .zip(&masses)
            .fold((0.0, 0.0), |(m1, m2), (w, p)| {
                let (x0, x1) = (w[0], w[1]);
                (
                    m1 + p * (x0 + x1) / 2.0,
                    m2 + p * (x0 * x0 + x0 * x1 + x1 * x1) / 3.0,
                )
            });
        let statistics = moments_to_statistics(
            intervals[0],
            intervals[intervals.len() - 1],
            total,
            m1,
            m2,
        );

        Ok(Self {
            intervals,
            picker,
            statistics,
        })
    }

    pub fn statistics(&self) -> Statistics {
        self.statistics
    }
}

impl Distribution<f64> for PiecewiseConstant {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let i = self.picker.sample(rng);
        let (x0, x1) = (self.intervals[i], self.intervals[i + 1]);
        x0 + rng.gen::<f64>() * (x1 - x0)
    }
}

/// Density interpolated linearly between boundary values
#[derive(Debug, Clone)]
pub struct PiecewiseLinear {
    intervals: Vec<f64>,
    densities: Vec<f64>,
    picker: WeightedIndex<f64>,
    statistics: Statistics,
}

impl PiecewiseLinear {
    pub fn from_params(params: &Params) -> Result<Self, ParameterError> {
        Self::from_params_in::<f64>(params)
    }

    /// Resolve with boundaries and densities read in the storage type `F`
    pub fn from_params_in<F: RealElement>(params: &Params) -> Result<Self, ParameterError> {
        let intervals = boundaries::<F>(params)?;
        let densities = densities::<F>(params, intervals.len())?;

        let masses: Vec<f64> = intervals
            .windows(2)
            .zip(densities.windows(2))
            .map(|(x, r)| (x[1] - x[0]) * (r[0] + r[1]) / 2.0)
            .collect();
        let picker = interval_picker(&masses)?;

        let total: f64 = masses.iter().sum();
        let (m1, m2) = intervals.windows(2).zip(densities.windows(2)).fold(
            (0.0, 0.0),
            |(m1, m2), (x, r)| {
                let (x0, x1, r0, r1) = (x[0], x[1], r[0], r[1]);
                let h = x1 - x0;
                let first = h / 6.0 * (r0 * (2.0 * x0 + x1) + r1 * (x0 + 2.0 * x1));
                let second = h / 12.0
                    * (r0 * (3.0 * x0 * x0 + 2.0 * x0 * x1 + x1 * x1)
                        + r1 * (x0 * x0 + 2.0 * x0 * x1 + 3.0 * x1 * x1));
                (m1 + first, m2 + second)
            },
        );
        let statistics = moments_to_statistics(
            intervals[0],
            intervals[intervals.len() - 1],
            total,
            m1,
            m2,
        );

        Ok(Self {
            intervals,
            densities,
            picker,
            statistics,
        })
    }

    pub fn statistics(&self) -> Statistics {
        self.statistics
    }
}

impl Distribution<f64> for PiecewiseLinear {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let i = self.picker.sample(rng);
        let (x0, x1) = (self.intervals[i], self.intervals[i + 1]);
        let (r0, r1) = (self.densities[i], self.densities[i + 1]);

        // Invert F(t) = (r0 t + (r1 - r0) t^2 / 2) / ((r0 + r1) / 2) on [0, 1]
        let u: f64 = rng.gen();
        let denom = r0 + (r0 * r0 + u * (r1 * r1 - r0 * r0)).sqrt();
        let t = if denom > 0.0 {
            (u * (r0 + r1) / denom).min(1.0)
        } else {
            0.0
        };
        x0 + t * (x1 - x0)
    }
}

pub fn piecewise_constant<F: RealElement>(
    params: &Params,
) -> Result<impl Sampler<Value = F>, ParameterError> {
    let dist = PiecewiseConstant::from_params_in::<F>(params)?;
    let stats = dist.statistics();
    let dist = Distribution::<f64>::map(dist, |x: f64| F::saturating_from(x));
    Ok(Fitted::<_, F>::new(dist, stats))
}

pub fn piecewise_linear<F: RealElement>(
    params: &Params,
) -> Result<impl Sampler<Value = F>, ParameterError> {
    let dist = PiecewiseLinear::from_params_in::<F>(params)?;
    let stats = dist.statistics();
    let dist = Distribution::<f64>::map(dist, |x: f64| F::saturating_from(x));
    Ok(Fitted::<_, F>::new(dist, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;
    use serde_json::{json, Value};

    fn params(value: Value) -> Params {
        value.as_object().cloned().unwrap()
    }

    fn draw<D: Distribution<f64>>(dist: &D, n: usize) -> Vec<f64> {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(314);
        (0..n).map(|_| dist.sample(&mut rng)).collect()
    }

    fn mean(values: &[f64]) -> f64 {
        values.iter().sum::<f64>() / values.len() as f64
    }

    #[test]
    fn test_constant_unit_interval_is_uniform() {
        let dist =
            PiecewiseConstant::from_params(&params(json!({"intervals": [0, 1], "densities": [7]})))
                .unwrap();
        let stats = dist.statistics();
        assert_relative_eq!(stats.mean, 0.5);
        assert_relative_eq!(stats.std_dev, 1.0 / 12f64.sqrt());
        assert_eq!((stats.min, stats.max), (0.0, 1.0));
    }

    #[test]
    fn test_constant_skips_zero_density_intervals() {
        let dist = PiecewiseConstant::from_params(&params(json!({
            "intervals": [0, 1, 2, 3],
            "densities": [1, 0, 1]
        })))
        .unwrap();
        let values = draw(&dist, 20_000);
        assert!(values.iter().all(|&x| (0.0..=1.0).contains(&x) || (2.0..=3.0).contains(&x)));
        assert_relative_eq!(dist.statistics().mean, 1.5);
        assert_relative_eq!(mean(&values), 1.5, epsilon = 0.03);
    }

    #[test]
    fn test_linear_ramp() {
        // Density proportional to x on [0, 1]: mean 2/3, variance 1/18
        let dist =
            PiecewiseLinear::from_params(&params(json!({"intervals": [0, 1], "densities": [0, 2]})))
                .unwrap();
        let stats = dist.statistics();
        assert_relative_eq!(stats.mean, 2.0 / 3.0, max_relative = 1e-12);
        assert_relative_eq!(stats.std_dev, (1.0f64 / 18.0).sqrt(), max_relative = 1e-12);

        let values = draw(&dist, 50_000);
        assert!(values.iter().all(|&x| (0.0..=1.0).contains(&x)));
        assert_relative_eq!(mean(&values), 2.0 / 3.0, epsilon = 0.01);
    }

    #[test]
    fn test_linear_flat_matches_uniform() {
        let dist = PiecewiseLinear::from_params(&params(json!({
            "intervals": [-1.0, 0.0, 3.0],
            "densities": [1.0, 1.0, 1.0]
        })))
        .unwrap();
        let expected = Statistics::uniform(-1.0, 3.0);
        assert_relative_eq!(dist.statistics().mean, expected.mean, max_relative = 1e-12);
        assert_relative_eq!(dist.statistics().std_dev, expected.std_dev, max_relative = 1e-12);
    }

    #[test]
    fn test_shape_rejections() {
        let err =
            PiecewiseConstant::from_params(&params(json!({"intervals": [0], "densities": []})))
                .unwrap_err();
        assert_eq!(err.key(), "intervals");

        let err = PiecewiseConstant::from_params(&params(json!({
            "intervals": [0, 2, 1],
            "densities": [1, 1]
        })))
        .unwrap_err();
        assert!(err.to_string().contains("strictly increasing"));

        let err =
            PiecewiseLinear::from_params(&params(json!({"intervals": [0, 1], "densities": [1]})))
                .unwrap_err();
        assert_eq!(err.key(), "densities");

        let err = PiecewiseConstant::from_params(&params(json!({
            "intervals": [0, 1, 2],
            "densities": [1, -1]
        })))
        .unwrap_err();
        assert_eq!(err.key(), "densities[1]");

        let err =
            PiecewiseLinear::from_params(&params(json!({"intervals": [0, 1], "densities": [0, 0]})))
                .unwrap_err();
        assert!(err.to_string().contains("mass"));

        let err = PiecewiseLinear::from_params(&params(json!({"densities": [1, 1]}))).unwrap_err();
        assert!(matches!(err, ParameterError::Missing { .. }));
    }

    #[test]
    fn test_boundaries_are_read_in_storage_type() {
        let wide = params(json!({"intervals": [0.0, 1e300], "densities": [1.0]}));
        let err = piecewise_constant::<f32>(&wide).err().unwrap();
        assert!(matches!(err, ParameterError::WrongType { ref key, .. } if key == "intervals[1]"));
        let err = piecewise_linear::<f32>(&params(json!({
            "intervals": [0.0, 1.0],
            "densities": [1.0, 1e300]
        })))
        .err()
        .unwrap();
        assert_eq!(err.key(), "densities[1]");

        let dist = piecewise_constant::<f64>(&wide).unwrap();
        assert_eq!(dist.statistics().max, 1e300);
    }

    #[test]
    fn test_storage_conversion() {
        let dist = piecewise_constant::<f32>(&params(json!({
            "intervals": [10, 20],
            "densities": [1]
        })))
        .unwrap();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(8);
        for _ in 0..1_000 {
            let x: f32 = dist.sample(&mut rng);
            assert!((10.0..=20.0).contains(&x));
        }
        assert_relative_eq!(dist.statistics().mean, 15.0);
    }
}
