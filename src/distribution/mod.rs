//! Statistical distributions
//!
//! This module provides the distribution families a random raster can be drawn
//! from. Each family is resolved from its JSON parameters into an immutable
//! [`Sampler`]: a pure sampling function plus the distribution's theoretical
//! summary statistics.
//!
//! # Families
//!
//! - **Discrete-valued** ([`integer`]): uniform_integer, bernoulli, binomial,
//!   negative_binomial, geometric, poisson, discrete
//! - **Continuous-valued** ([`real`]): uniform_real, normal, lognormal, gamma,
//!   exponential, weibull, extreme_value, cauchy, fisher_f, student_t,
//!   chi_squared, piecewise_constant, piecewise_linear
//!
//! # Thread Safety
//!
//! Samplers hold no random state. The random bit source is passed in on every
//! call, so one sampler can be shared by any number of threads, each driving
//! its own generator.
//!
//! # Example
//!
//! ```
//! use random_raster::distribution::{integer, Sampler};
//! use rand::SeedableRng;
//! use rand_xoshiro::Xoshiro256PlusPlus;
//! use serde_json::json;
//!
//! let params = json!({"a": 1, "b": 6}).as_object().cloned().unwrap();
//! let die = integer::uniform_integer::<u8>(&params).unwrap();
//! let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
//!
//! let roll = die.sample(&mut rng);
//! assert!((1..=6).contains(&roll));
//! assert_eq!(die.statistics().mean, 3.5);
//! ```

use crate::element::Element;
use rand::distributions::uniform::UniformSampler;
use rand::distributions::Distribution;
use rand::Rng;
use std::marker::PhantomData;

pub mod integer;
pub mod kind;
pub mod piecewise;
pub mod real;

pub use kind::{DistributionKind, Family, ParameterSpec};

/// Theoretical summary statistics of a distribution
///
/// Unbounded supports are reported as ±infinity (continuous families) or the
/// sampling type's limits (discrete families). Moments that do not exist are
/// reported as 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl Statistics {
    pub fn new(min: f64, max: f64, mean: f64, std_dev: f64) -> Self {
        Self {
            min,
            max,
            mean,
            std_dev,
        }
    }

    /// Statistics of a uniform-like distribution on `[min, max]`
    ///
    /// Mean is the midpoint, standard deviation is `(max - min) / sqrt(12)`.
    pub fn uniform(min: f64, max: f64) -> Self {
        Self::new(min, max, (min + max) / 2.0, (max - min) / 12f64.sqrt())
    }

    /// Clamp the support to `[lo, hi]`, leaving the moments untouched
    pub fn clamp_support(self, lo: f64, hi: f64) -> Self {
        Self {
            min: self.min.max(lo).min(hi),
            max: self.max.min(hi).max(lo),
            ..self
        }
    }
}

/// Distribution instance bound to a sampling type
///
/// This trait defines the interface the block generator draws from. Sampling
/// must be a pure function of the random bit source; statistics are computed
/// once when the instance is built.
pub trait Sampler: Send + Sync {
    /// Type the distribution natively produces values in
    type Value: Element;

    /// Draw one value
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Self::Value;

    /// Theoretical statistics (no sampling)
    fn statistics(&self) -> Statistics;
}

/// A `rand` distribution paired with its theoretical statistics
///
/// `V` is the value type the wrapped distribution produces. It is fixed here
/// because several `rand_distr` types implement `Distribution` for more than
/// one output type.
pub struct Fitted<D, V> {
    inner: D,
    statistics: Statistics,
    _value: PhantomData<fn() -> V>,
}

impl<D, V> Fitted<D, V>
where
    D: Distribution<V>,
{
    pub fn new(inner: D, statistics: Statistics) -> Self {
        Self {
            inner,
            statistics,
            _value: PhantomData,
        }
    }
}

impl<D, V> Sampler for Fitted<D, V>
where
    D: Distribution<V> + Send + Sync,
    V: Element,
{
    type Value = V;

    #[inline(always)]
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> V {
        self.inner.sample(rng)
    }

    fn statistics(&self) -> Statistics {
        self.statistics
    }
}

/// Uniform over `[low, high]`
///
/// The caller guarantees `low <= high` and, for floats, that the range does
/// not overflow; construction panics otherwise.
pub(crate) struct UniformInclusive<V: Element> {
    inner: V::Uniform,
}

impl<V: Element> UniformInclusive<V> {
    pub(crate) fn new(low: V, high: V) -> Self {
        debug_assert!(low <= high);
        Self {
            inner: <V::Uniform as UniformSampler>::new_inclusive(low, high),
        }
    }
}

impl<V: Element> Distribution<V> for UniformInclusive<V> {
    #[inline(always)]
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> V {
        self.inner.sample(rng)
    }
}
