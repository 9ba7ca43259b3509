//! Discrete-valued distributions
//!
//! Every builder is generic over the storage type `T` and produces values in
//! `T::Sample`, the type integer distributions sample in for that storage type.
//! Parameters that describe values or counts are read in the storage type, so a
//! bound the raster could never hold is rejected up front.

use super::{Fitted, Sampler, Statistics, UniformInclusive};
use crate::config::params::{check_order, get_array, optional, Constraint, Params};
use crate::element::Element;
use crate::error::ParameterError;
use num_traits::{Bounded, NumCast};
use rand::distributions::{Bernoulli, Distribution, WeightedIndex};
use rand::Rng;
use rand_distr::{Binomial, Gamma, Geometric, Poisson};
use std::marker::PhantomData;

type Sample<T> = <T as Element>::Sample;

fn probability(params: &Params, key: &str) -> Result<f64, ParameterError> {
    optional(params, key, 0.5, Constraint::at_least(0.0).at_most(1.0))
}

fn success_probability(params: &Params) -> Result<f64, ParameterError> {
    optional(params, "p", 0.5, Constraint::greater_than(0.0).at_most(1.0))
}

fn unbounded_max<T: Element>() -> f64 {
    <Sample<T> as Bounded>::max_value().to_f64_lossy()
}

/// Uniform over the closed integer range `[a, b]`
///
/// `a` and `b` default to the storage type's limits.
pub fn uniform_integer<T: Element>(
    params: &Params,
) -> Result<impl Sampler<Value = Sample<T>>, ParameterError> {
    let a: T = optional(params, "a", T::min_value(), Constraint::any())?;
    let b: T = optional(params, "b", T::max_value(), Constraint::any())?;
    check_order("a", a, "b", b)?;

    let low = <Sample<T> as Element>::saturating_from(a);
    let high = <Sample<T> as Element>::saturating_from(b);
    let stats = Statistics::uniform(a.to_f64_lossy(), b.to_f64_lossy());
    Ok(Fitted::<_, Sample<T>>::new(UniformInclusive::new(low, high), stats))
}

pub fn bernoulli<T: Element>(
    params: &Params,
) -> Result<impl Sampler<Value = Sample<T>>, ParameterError> {
    let p = probability(params, "p")?;
    let dist = Bernoulli::new(p).map_err(|e| ParameterError::invalid("p", e.to_string()))?;

    let stats = Statistics::new(0.0, 1.0, p, (p * (1.0 - p)).sqrt());
    let dist = Distribution::<bool>::map(dist, |hit: bool| {
        <Sample<T> as Element>::saturating_from(hit as u8)
    });
    Ok(Fitted::<_, Sample<T>>::new(dist, stats))
}

/// Number of successes in `t` trials
pub fn binomial<T: Element>(
    params: &Params,
) -> Result<impl Sampler<Value = Sample<T>>, ParameterError> {
    let t: T = optional(params, "t", T::one(), Constraint::at_least(T::zero()))?;
    let p = probability(params, "p")?;
    let trials = t
        .to_u64()
        .ok_or_else(|| ParameterError::invalid("t", format!("{} is not a trial count", t)))?;
    let dist =
        Binomial::new(trials, p).map_err(|e| ParameterError::invalid("p", e.to_string()))?;

    let n = trials as f64;
    let stats = Statistics::new(0.0, n, n * p, (n * p * (1.0 - p)).sqrt());
    let dist =
        Distribution::<u64>::map(dist, |k: u64| <Sample<T> as Element>::saturating_from(k));
    Ok(Fitted::<_, Sample<T>>::new(dist, stats))
}

/// Failures before the `k`-th success, drawn as a gamma-Poisson mixture
struct NegativeBinomial<S> {
    /// `None` when `p == 1`, where every draw is zero
    mixing: Option<Gamma<f64>>,
    _value: PhantomData<fn() -> S>,
}

impl<S: Element> Distribution<S> for NegativeBinomial<S> {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> S {
        let Some(mixing) = &self.mixing else {
            return S::zero();
        };
        let lambda: f64 = mixing.sample(rng);
        if !lambda.is_finite() {
            return S::max_value();
        }
        match Poisson::new(lambda) {
            Ok(poisson) => S::saturating_from::<f64>(poisson.sample(rng)),
            // lambda underflowed to zero
            Err(_) => S::zero(),
        }
    }
}

pub fn negative_binomial<T: Element>(
    params: &Params,
) -> Result<impl Sampler<Value = Sample<T>>, ParameterError> {
    let k: T = optional(params, "k", T::one(), Constraint::greater_than(T::zero()))?;
    let p = success_probability(params)?;

    let shape = k.to_f64_lossy();
    let mixing = if p < 1.0 {
        let scale = (1.0 - p) / p;
        Some(Gamma::new(shape, scale).map_err(|e| ParameterError::invalid("p", e.to_string()))?)
    } else {
        None
    };

    let stats = Statistics::new(
        0.0,
        unbounded_max::<T>(),
        shape * (1.0 - p) / p,
        (shape * (1.0 - p)).sqrt() / p,
    );
    let dist = NegativeBinomial::<Sample<T>> {
        mixing,
        _value: PhantomData,
    };
    Ok(Fitted::<_, Sample<T>>::new(dist, stats))
}

/// Failures before the first success
pub fn geometric<T: Element>(
    params: &Params,
) -> Result<impl Sampler<Value = Sample<T>>, ParameterError> {
    let p = success_probability(params)?;
    let dist = Geometric::new(p).map_err(|e| ParameterError::invalid("p", e.to_string()))?;

    let stats = Statistics::new(0.0, unbounded_max::<T>(), (1.0 - p) / p, (1.0 - p).sqrt() / p);
    let dist =
        Distribution::<u64>::map(dist, |k: u64| <Sample<T> as Element>::saturating_from(k));
    Ok(Fitted::<_, Sample<T>>::new(dist, stats))
}

pub fn poisson<T: Element>(
    params: &Params,
) -> Result<impl Sampler<Value = Sample<T>>, ParameterError> {
    let mean: f64 = optional(params, "mean", 1.0, Constraint::greater_than(0.0))?;
    let dist = Poisson::new(mean).map_err(|e| ParameterError::invalid("mean", e.to_string()))?;

    let stats = Statistics::new(0.0, unbounded_max::<T>(), mean, mean.sqrt());
    let dist =
        Distribution::<f64>::map(dist, |k: f64| <Sample<T> as Element>::saturating_from(k));
    Ok(Fitted::<_, Sample<T>>::new(dist, stats))
}

/// Index `i` with probability `weights[i] / sum(weights)`
pub fn discrete<T: Element>(
    params: &Params,
) -> Result<impl Sampler<Value = Sample<T>>, ParameterError> {
    let weights: Vec<f64> = get_array(params, "weights")?;
    if weights.is_empty() {
        return Err(ParameterError::invalid("weights", "must not be empty"));
    }
    for (i, &w) in weights.iter().enumerate() {
        if w < 0.0 {
            return Err(ParameterError::OutOfRange {
                key: format!("weights[{}]", i),
                value: w.to_string(),
                constraint: Constraint::at_least(0.0).to_string(),
            });
        }
    }
    let last = weights.len() - 1;
    if <T as NumCast>::from(last).is_none() {
        return Err(ParameterError::invalid(
            "weights",
            format!("{} outcomes do not fit in {}", weights.len(), T::TYPE),
        ));
    }
    let total: f64 = weights.iter().sum();
    if !(total > 0.0 && total.is_finite()) {
        return Err(ParameterError::invalid("weights", "must have a positive, finite sum"));
    }
    let dist = WeightedIndex::new(&weights)
        .map_err(|e| ParameterError::invalid("weights", e.to_string()))?;

    let (first_moment, second_moment) = weights
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(m1, m2), (i, &w)| {
            let x = i as f64;
            (m1 + x * w, m2 + x * x * w)
        });
    let mean = first_moment / total;
    let variance = (second_moment / total - mean * mean).max(0.0);
    let stats = Statistics::new(0.0, last as f64, mean, variance.sqrt());

    let dist =
        Distribution::<usize>::map(dist, |i: usize| <Sample<T> as Element>::saturating_from(i));
    Ok(Fitted::<_, Sample<T>>::new(dist, stats))
}
