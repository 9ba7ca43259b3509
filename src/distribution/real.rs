//! Continuous-valued distributions
//!
//! Builders are generic over the floating-point storage type `F`, which is also
//! the sampling type. Parameters are read in `F`; statistics are computed in
//! f64 from the resolved values.

use super::{Fitted, Sampler, Statistics, UniformInclusive};
use crate::config::params::{check_order, optional, required, Constraint, Params};
use crate::element::RealElement;
use crate::error::ParameterError;
use crate::util::special::{gamma as gamma_fn, EULER_GAMMA};
use rand::distributions::{Distribution, Standard};
use rand_distr::{
    Cauchy, ChiSquared, Exp, Exp1, FisherF, Gamma, Gumbel, LogNormal, Normal, Open01,
    OpenClosed01, StandardNormal, StudentT, Weibull,
};

fn positive<F: RealElement>() -> Constraint<F> {
    Constraint::greater_than(F::zero())
}

fn non_negative<F: RealElement>() -> Constraint<F> {
    Constraint::at_least(F::zero())
}

fn rejected(key: &str, err: impl std::fmt::Display) -> ParameterError {
    ParameterError::invalid(key, err.to_string())
}

/// Moments that overflow or do not exist are reported as 0
fn moment(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

fn half_line(mean: f64, std_dev: f64) -> Statistics {
    Statistics::new(0.0, f64::INFINITY, moment(mean), moment(std_dev))
}

fn real_line(mean: f64, std_dev: f64) -> Statistics {
    Statistics::new(f64::NEG_INFINITY, f64::INFINITY, moment(mean), moment(std_dev))
}

/// Uniform over `[a, b]`
pub fn uniform_real<F: RealElement>(
    params: &Params,
) -> Result<impl Sampler<Value = F>, ParameterError> {
    let a: F = optional(params, "a", F::zero(), Constraint::any())?;
    let b: F = optional(params, "b", F::one(), Constraint::any())?;
    check_order("a", a, "b", b)?;
    // The uniform sampler scales the range by 1 / (1 - epsilon)
    if !((b - a) / (F::one() - F::epsilon())).is_finite() {
        return Err(ParameterError::invalid(
            "b",
            format!("range [{}, {}] is too wide for {}", a, b, F::TYPE),
        ));
    }

    let stats = Statistics::uniform(a.to_f64_lossy(), b.to_f64_lossy());
    Ok(Fitted::<_, F>::new(UniformInclusive::new(a, b), stats))
}

pub fn normal<F: RealElement>(params: &Params) -> Result<impl Sampler<Value = F>, ParameterError>
where
    StandardNormal: Distribution<F>,
{
    let mean: F = optional(params, "mean", F::zero(), Constraint::any())?;
    let stddev: F = optional(params, "stddev", F::one(), non_negative())?;
    let dist = Normal::new(mean, stddev).map_err(|e| rejected("stddev", e))?;

    let stats = real_line(mean.to_f64_lossy(), stddev.to_f64_lossy());
    Ok(Fitted::<_, F>::new(dist, stats))
}

/// `exp(X)` for `X ~ Normal(m, s)`
pub fn lognormal<F: RealElement>(
    params: &Params,
) -> Result<impl Sampler<Value = F>, ParameterError>
where
    StandardNormal: Distribution<F>,
{
    let m: F = optional(params, "m", F::zero(), Constraint::any())?;
    let s: F = optional(params, "s", F::one(), non_negative())?;
    let dist = LogNormal::new(m, s).map_err(|e| rejected("s", e))?;

    let (m, s2) = (m.to_f64_lossy(), s.to_f64_lossy().powi(2));
    let mean = (m + s2 / 2.0).exp();
    let std_dev = ((s2.exp() - 1.0) * (2.0 * m + s2).exp()).sqrt();
    Ok(Fitted::<_, F>::new(dist, half_line(mean, std_dev)))
}

/// Gamma with shape `alpha` and scale `beta`
pub fn gamma<F: RealElement>(params: &Params) -> Result<impl Sampler<Value = F>, ParameterError>
where
    StandardNormal: Distribution<F>,
    Exp1: Distribution<F>,
    Open01: Distribution<F>,
{
    let alpha: F = required(params, "alpha", positive())?;
    let beta: F = optional(params, "beta", F::one(), positive())?;
    let dist = Gamma::new(alpha, beta).map_err(|e| rejected("beta", e))?;

    let (alpha, beta) = (alpha.to_f64_lossy(), beta.to_f64_lossy());
    let stats = half_line(alpha * beta, alpha.sqrt() * beta);
    Ok(Fitted::<_, F>::new(dist, stats))
}

/// Exponential with rate `lambda`
pub fn exponential<F: RealElement>(
    params: &Params,
) -> Result<impl Sampler<Value = F>, ParameterError>
where
    Exp1: Distribution<F>,
{
    let lambda: F = optional(params, "lambda", F::one(), positive())?;
    let dist = Exp::new(lambda).map_err(|e| rejected("lambda", e))?;

    let scale = 1.0 / lambda.to_f64_lossy();
    Ok(Fitted::<_, F>::new(dist, half_line(scale, scale)))
}

/// Weibull with shape `a` and scale `b`
pub fn weibull<F: RealElement>(params: &Params) -> Result<impl Sampler<Value = F>, ParameterError>
where
    OpenClosed01: Distribution<F>,
{
    let a: F = optional(params, "a", F::one(), positive())?;
    let b: F = optional(params, "b", F::one(), positive())?;
    let dist = Weibull::new(b, a).map_err(|e| rejected("a", e))?;

    let (a, b) = (a.to_f64_lossy(), b.to_f64_lossy());
    let g1 = gamma_fn(1.0 + 1.0 / a);
    let g2 = gamma_fn(1.0 + 2.0 / a);
    let stats = half_line(b * g1, b * (g2 - g1 * g1).max(0.0).sqrt());
    Ok(Fitted::<_, F>::new(dist, stats))
}

/// Type I extreme value (Gumbel) with location `a` and scale `b`
pub fn extreme_value<F: RealElement>(
    params: &Params,
) -> Result<impl Sampler<Value = F>, ParameterError>
where
    OpenClosed01: Distribution<F>,
{
    let a: F = optional(params, "a", F::zero(), Constraint::any())?;
    let b: F = optional(params, "b", F::one(), positive())?;
    let dist = Gumbel::new(a, b).map_err(|e| rejected("b", e))?;

    let (a, b) = (a.to_f64_lossy(), b.to_f64_lossy());
    let stats = real_line(a + b * EULER_GAMMA, b * std::f64::consts::PI / 6f64.sqrt());
    Ok(Fitted::<_, F>::new(dist, stats))
}

/// Cauchy with location `a` and scale `b`; mean and variance do not exist
pub fn cauchy<F: RealElement>(params: &Params) -> Result<impl Sampler<Value = F>, ParameterError>
where
    Standard: Distribution<F>,
{
    let a: F = optional(params, "a", F::zero(), Constraint::any())?;
    let b: F = optional(params, "b", F::one(), positive())?;
    let dist = Cauchy::new(a, b).map_err(|e| rejected("b", e))?;

    Ok(Fitted::<_, F>::new(dist, real_line(0.0, 0.0)))
}

/// Fisher's F with `m` numerator and `n` denominator degrees of freedom
pub fn fisher_f<F: RealElement>(
    params: &Params,
) -> Result<impl Sampler<Value = F>, ParameterError>
where
    StandardNormal: Distribution<F>,
    Exp1: Distribution<F>,
    Open01: Distribution<F>,
{
    let m: F = required(params, "m", positive())?;
    let n: F = required(params, "n", positive())?;
    let dist = FisherF::new(m, n).map_err(|e| rejected("m", e))?;

    let (m, n) = (m.to_f64_lossy(), n.to_f64_lossy());
    let mean = if n > 2.0 { n / (n - 2.0) } else { 0.0 };
    let std_dev = if n > 4.0 {
        (2.0 * n * n * (m + n - 2.0) / (m * (n - 2.0).powi(2) * (n - 4.0))).sqrt()
    } else {
        0.0
    };
    Ok(Fitted::<_, F>::new(dist, half_line(mean, std_dev)))
}

pub fn student_t<F: RealElement>(
    params: &Params,
) -> Result<impl Sampler<Value = F>, ParameterError>
where
    StandardNormal: Distribution<F>,
    Exp1: Distribution<F>,
    Open01: Distribution<F>,
{
    let n: F = required(params, "n", positive())?;
    let dist = StudentT::new(n).map_err(|e| rejected("n", e))?;

    let n = n.to_f64_lossy();
    let std_dev = if n > 2.0 { (n / (n - 2.0)).sqrt() } else { 0.0 };
    Ok(Fitted::<_, F>::new(dist, real_line(0.0, std_dev)))
}

pub fn chi_squared<F: RealElement>(
    params: &Params,
) -> Result<impl Sampler<Value = F>, ParameterError>
where
    StandardNormal: Distribution<F>,
    Exp1: Distribution<F>,
    Open01: Distribution<F>,
{
    let n: F = required(params, "n", positive())?;
    let dist = ChiSquared::new(n).map_err(|e| rejected("n", e))?;

    let n = n.to_f64_lossy();
    Ok(Fitted::<_, F>::new(dist, half_line(n, (2.0 * n).sqrt())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;
    use serde_json::{json, Value};

    fn params(value: Value) -> Params {
        value.as_object().cloned().unwrap()
    }

    /// Empirical (mean, std_dev) over `n` draws
    fn moments<S: Sampler>(sampler: &S, n: usize) -> (f64, f64) {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(2024);
        let values: Vec<f64> = (0..n).map(|_| sampler.sample(&mut rng).to_f64_lossy()).collect();
        let mean = values.iter().sum::<f64>() / n as f64;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
        (mean, var.sqrt())
    }

    #[test]
    fn test_uniform_real_statistics_are_exact() {
        let dist = uniform_real::<f64>(&params(json!({"a": 0.0, "b": 1.0}))).unwrap();
        let stats = dist.statistics();
        assert_eq!(stats.mean, 0.5);
        assert_eq!(stats.std_dev, 1.0 / 12f64.sqrt());
        assert_eq!((stats.min, stats.max), (0.0, 1.0));

        // Defaults are the unit interval too
        let defaults = uniform_real::<f32>(&params(json!({}))).unwrap();
        assert_eq!(defaults.statistics(), stats);
    }

    #[test]
    fn test_uniform_real_samples_in_range() {
        let dist = uniform_real::<f32>(&params(json!({"a": -2.0, "b": 3.0}))).unwrap();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        for _ in 0..10_000 {
            let x = dist.sample(&mut rng);
            assert!((-2.0..=3.0).contains(&x));
        }
    }

    #[test]
    fn test_uniform_real_rejections() {
        let err = uniform_real::<f64>(&params(json!({"a": 2.0, "b": 1.0}))).err().unwrap();
        assert!(matches!(err, ParameterError::Misordered { .. }));

        let err = uniform_real::<f64>(&params(json!({"a": -1e308, "b": 1e308}))).err().unwrap();
        assert_eq!(err.key(), "b");

        let err = uniform_real::<f32>(&params(json!({"b": 1e39}))).err().unwrap();
        assert!(matches!(err, ParameterError::WrongType { .. }));
    }

    #[test]
    fn test_uniform_real_range_up_to_type_max_is_rejected() {
        let err = uniform_real::<f64>(&params(json!({"a": 0.0, "b": f64::MAX}))).err().unwrap();
        assert!(matches!(err, ParameterError::Invalid { ref key, .. } if key == "b"));

        let err = uniform_real::<f32>(&params(json!({"a": 0.0, "b": f32::MAX}))).err().unwrap();
        assert_eq!(err.key(), "b");
    }

    #[test]
    fn test_uniform_real_wide_range_samples() {
        let dist = uniform_real::<f64>(&params(json!({"a": -1e307, "b": 1e307}))).unwrap();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(8);
        for _ in 0..1000 {
            let x = dist.sample(&mut rng);
            assert!(x.is_finite() && (-1e307..=1e307).contains(&x));
        }

        let point = uniform_real::<f32>(&params(json!({"a": 2.5, "b": 2.5}))).unwrap();
        assert_eq!(point.sample(&mut rng), 2.5);
    }

    #[test]
    fn test_normal() {
        let dist = normal::<f64>(&params(json!({"mean": 10.0, "stddev": 2.0}))).unwrap();
        let (mean, std_dev) = moments(&dist, 50_000);
        assert_relative_eq!(mean, 10.0, epsilon = 0.05);
        assert_relative_eq!(std_dev, 2.0, epsilon = 0.05);
        assert_eq!(dist.statistics().min, f64::NEG_INFINITY);

        // Zero spread is a point mass
        let point = normal::<f32>(&params(json!({"mean": 3.0, "stddev": 0.0}))).unwrap();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
        assert_eq!(point.sample(&mut rng), 3.0);

        assert!(normal::<f64>(&params(json!({"stddev": -1.0}))).is_err());
    }

    #[test]
    fn test_lognormal() {
        let dist = lognormal::<f64>(&params(json!({"m": 0.0, "s": 0.5}))).unwrap();
        let expected = (0.125f64).exp();
        assert_relative_eq!(dist.statistics().mean, expected);
        let (mean, _) = moments(&dist, 50_000);
        assert_relative_eq!(mean, expected, epsilon = 0.02);
    }

    #[test]
    fn test_gamma_requires_alpha() {
        let err = gamma::<f64>(&params(json!({"beta": 2.0}))).err().unwrap();
        assert_eq!(err, ParameterError::Missing { key: "alpha".into() });

        let dist = gamma::<f64>(&params(json!({"alpha": 2.0, "beta": 3.0}))).unwrap();
        assert_relative_eq!(dist.statistics().mean, 6.0);
        assert_relative_eq!(dist.statistics().std_dev, 2f64.sqrt() * 3.0);
        let (mean, _) = moments(&dist, 50_000);
        assert_relative_eq!(mean, 6.0, epsilon = 0.1);
    }

    #[test]
    fn test_exponential() {
        let dist = exponential::<f32>(&params(json!({"lambda": 4.0}))).unwrap();
        assert_eq!(dist.statistics().mean, 0.25);
        let (mean, _) = moments(&dist, 50_000);
        assert_relative_eq!(mean, 0.25, epsilon = 0.01);
        assert!(exponential::<f32>(&params(json!({"lambda": 0.0}))).is_err());
    }

    #[test]
    fn test_weibull_shape_and_scale() {
        // Shape 1 is exponential with mean equal to the scale
        let dist = weibull::<f64>(&params(json!({"a": 1.0, "b": 2.0}))).unwrap();
        assert_relative_eq!(dist.statistics().mean, 2.0, max_relative = 1e-10);
        assert_relative_eq!(dist.statistics().std_dev, 2.0, max_relative = 1e-10);
        let (mean, _) = moments(&dist, 50_000);
        assert_relative_eq!(mean, 2.0, epsilon = 0.05);
    }

    #[test]
    fn test_extreme_value() {
        let dist = extreme_value::<f64>(&params(json!({"a": 1.0, "b": 2.0}))).unwrap();
        assert_relative_eq!(dist.statistics().mean, 1.0 + 2.0 * EULER_GAMMA);
        let (mean, _) = moments(&dist, 50_000);
        assert_relative_eq!(mean, 1.0 + 2.0 * EULER_GAMMA, epsilon = 0.05);
    }

    #[test]
    fn test_cauchy_reports_zero_moments() {
        let dist = cauchy::<f64>(&params(json!({"a": 5.0}))).unwrap();
        assert_eq!(dist.statistics().mean, 0.0);
        assert_eq!(dist.statistics().std_dev, 0.0);
        assert!(cauchy::<f64>(&params(json!({"b": 0.0}))).is_err());
    }

    #[test]
    fn test_fisher_f_moments() {
        let dist = fisher_f::<f64>(&params(json!({"m": 5.0, "n": 10.0}))).unwrap();
        assert_relative_eq!(dist.statistics().mean, 1.25);
        let heavy = fisher_f::<f64>(&params(json!({"m": 5.0, "n": 2.0}))).unwrap();
        assert_eq!(heavy.statistics().mean, 0.0);
        assert_eq!(heavy.statistics().std_dev, 0.0);
        assert!(fisher_f::<f64>(&params(json!({"m": 5.0}))).is_err());
    }

    #[test]
    fn test_student_t_and_chi_squared() {
        let t = student_t::<f64>(&params(json!({"n": 4.0}))).unwrap();
        assert_relative_eq!(t.statistics().std_dev, 2f64.sqrt());
        let (mean, _) = moments(&t, 50_000);
        assert_relative_eq!(mean, 0.0, epsilon = 0.05);

        let chi = chi_squared::<f32>(&params(json!({"n": 3}))).unwrap();
        assert_eq!(chi.statistics().mean, 3.0);
        let (mean, _) = moments(&chi, 50_000);
        assert_relative_eq!(mean, 3.0, epsilon = 0.1);
        assert!(chi_squared::<f32>(&params(json!({}))).is_err());
    }
}
