//! Distribution catalog
//!
//! Names, families, and the parameter contract of every supported
//! distribution. The parameter table here is what `random-raster distributions`
//! prints; the resolvers in [`super::integer`] and [`super::real`] enforce it.

use std::fmt;

/// Supported distribution family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DistributionKind {
    Unspecified,
    UniformInteger,
    Bernoulli,
    Binomial,
    NegativeBinomial,
    Geometric,
    Poisson,
    Discrete,
    UniformReal,
    Normal,
    LogNormal,
    Gamma,
    Exponential,
    Weibull,
    ExtremeValue,
    Cauchy,
    FisherF,
    StudentT,
    ChiSquared,
    PiecewiseConstant,
    PiecewiseLinear,
}

/// Value family a distribution produces, used for dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// Integer-valued; stored in integer element types
    Discrete,
    /// Real-valued; stored in floating-point element types
    Continuous,
}

/// One row of a distribution's parameter contract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterSpec {
    pub name: &'static str,
    /// Default as text; `None` when the parameter is required
    pub default: Option<&'static str>,
    pub constraint: &'static str,
}

/// Struct literal so parameter tables are promoted to `'static`
macro_rules! param {
    ($name:expr, $default:expr, $constraint:expr) => {
        ParameterSpec {
            name: $name,
            default: $default,
            constraint: $constraint,
        }
    };
}

const REQUIRED: Option<&str> = None;

impl DistributionKind {
    /// Every supported kind (excludes the `Unspecified` sentinel)
    pub const ALL: [DistributionKind; 20] = [
        DistributionKind::UniformInteger,
        DistributionKind::Bernoulli,
        DistributionKind::Binomial,
        DistributionKind::NegativeBinomial,
        DistributionKind::Geometric,
        DistributionKind::Poisson,
        DistributionKind::Discrete,
        DistributionKind::UniformReal,
        DistributionKind::Normal,
        DistributionKind::LogNormal,
        DistributionKind::Gamma,
        DistributionKind::Exponential,
        DistributionKind::Weibull,
        DistributionKind::ExtremeValue,
        DistributionKind::Cauchy,
        DistributionKind::FisherF,
        DistributionKind::StudentT,
        DistributionKind::ChiSquared,
        DistributionKind::PiecewiseConstant,
        DistributionKind::PiecewiseLinear,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            DistributionKind::Unspecified => "unspecified",
            DistributionKind::UniformInteger => "uniform_integer",
            DistributionKind::Bernoulli => "bernoulli",
            DistributionKind::Binomial => "binomial",
            DistributionKind::NegativeBinomial => "negative_binomial",
            DistributionKind::Geometric => "geometric",
            DistributionKind::Poisson => "poisson",
            DistributionKind::Discrete => "discrete",
            DistributionKind::UniformReal => "uniform_real",
            DistributionKind::Normal => "normal",
            DistributionKind::LogNormal => "lognormal",
            DistributionKind::Gamma => "gamma",
            DistributionKind::Exponential => "exponential",
            DistributionKind::Weibull => "weibull",
            DistributionKind::ExtremeValue => "extreme_value",
            DistributionKind::Cauchy => "cauchy",
            DistributionKind::FisherF => "fisher_f",
            DistributionKind::StudentT => "student_t",
            DistributionKind::ChiSquared => "chi_squared",
            DistributionKind::PiecewiseConstant => "piecewise_constant",
            DistributionKind::PiecewiseLinear => "piecewise_linear",
        }
    }

    /// Look up a kind by name, `Unspecified` when unknown
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.name() == name.trim())
            .unwrap_or(DistributionKind::Unspecified)
    }

    /// `None` for `Unspecified`
    pub const fn family(self) -> Option<Family> {
        match self {
            DistributionKind::Unspecified => None,
            DistributionKind::UniformInteger
            | DistributionKind::Bernoulli
            | DistributionKind::Binomial
            | DistributionKind::NegativeBinomial
            | DistributionKind::Geometric
            | DistributionKind::Poisson
            | DistributionKind::Discrete => Some(Family::Discrete),
            _ => Some(Family::Continuous),
        }
    }

    /// Parameter contract
    pub const fn parameters(self) -> &'static [ParameterSpec] {
        match self {
            DistributionKind::Unspecified => &[],
            DistributionKind::UniformInteger => &[
                param!("a", Some("type min"), "a <= b"),
                param!("b", Some("type max"), "a <= b"),
            ],
            DistributionKind::UniformReal => &[
                param!("a", Some("0.0"), "a <= b"),
                param!("b", Some("1.0"), "a <= b"),
            ],
            DistributionKind::Bernoulli => &[param!("p", Some("0.5"), "0 <= p <= 1")],
            DistributionKind::Binomial => &[
                param!("t", Some("1"), "t >= 0"),
                param!("p", Some("0.5"), "0 <= p <= 1"),
            ],
            DistributionKind::NegativeBinomial => &[
                param!("k", Some("1"), "k > 0"),
                param!("p", Some("0.5"), "0 < p <= 1"),
            ],
            DistributionKind::Geometric => &[param!("p", Some("0.5"), "0 < p <= 1")],
            DistributionKind::Poisson => &[param!("mean", Some("1.0"), "mean > 0")],
            DistributionKind::Normal => &[
                param!("mean", Some("0.0"), "any"),
                param!("stddev", Some("1.0"), "stddev >= 0"),
            ],
            DistributionKind::LogNormal => &[
                param!("m", Some("0.0"), "any"),
                param!("s", Some("1.0"), "s >= 0"),
            ],
            DistributionKind::Gamma => &[
                param!("alpha", REQUIRED, "alpha > 0"),
                param!("beta", Some("1.0"), "beta > 0"),
            ],
            DistributionKind::Exponential => &[param!("lambda", Some("1.0"), "lambda > 0")],
            DistributionKind::Weibull => &[
                param!("a", Some("1.0"), "a > 0"),
                param!("b", Some("1.0"), "b > 0"),
            ],
            DistributionKind::ExtremeValue | DistributionKind::Cauchy => &[
                param!("a", Some("0.0"), "any"),
                param!("b", Some("1.0"), "b > 0"),
            ],
            DistributionKind::FisherF => &[
                param!("m", REQUIRED, "m > 0"),
                param!("n", REQUIRED, "n > 0"),
            ],
            DistributionKind::StudentT | DistributionKind::ChiSquared => {
                &[param!("n", REQUIRED, "n > 0")]
            }
            DistributionKind::Discrete => {
                &[param!("weights", REQUIRED, "non-empty array, all >= 0")]
            }
            DistributionKind::PiecewiseConstant => &[
                param!("intervals", REQUIRED, "increasing array, len >= 2"),
                param!("densities", REQUIRED, "array, len = intervals - 1"),
            ],
            DistributionKind::PiecewiseLinear => &[
                param!("intervals", REQUIRED, "increasing array, len >= 2"),
                param!("densities", REQUIRED, "array, len = intervals"),
            ],
        }
    }
}

impl fmt::Display for DistributionKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_round_trip() {
        for kind in DistributionKind::ALL {
            assert_eq!(DistributionKind::from_name(kind.name()), kind);
        }
    }

    #[test]
    fn test_unknown_name_is_unspecified() {
        assert_eq!(DistributionKind::from_name("bogus"), DistributionKind::Unspecified);
        assert_eq!(DistributionKind::from_name("Normal"), DistributionKind::Unspecified);
        assert_eq!(DistributionKind::from_name("unspecified"), DistributionKind::Unspecified);
    }

    #[test]
    fn test_families() {
        let discrete = DistributionKind::ALL
            .iter()
            .filter(|k| k.family() == Some(Family::Discrete))
            .count();
        assert_eq!(discrete, 7);
        assert_eq!(DistributionKind::Discrete.family(), Some(Family::Discrete));
        assert_eq!(DistributionKind::PiecewiseLinear.family(), Some(Family::Continuous));
        assert_eq!(DistributionKind::Unspecified.family(), None);
    }

    #[test]
    fn test_every_kind_declares_parameters() {
        for kind in DistributionKind::ALL {
            assert!(!kind.parameters().is_empty(), "{kind}");
        }
        let gamma = DistributionKind::Gamma.parameters();
        assert_eq!(gamma[0].name, "alpha");
        assert!(gamma[0].default.is_none());
    }

    #[test]
    fn test_parameter_tables_are_static() {
        const NORMAL: &[ParameterSpec] = DistributionKind::Normal.parameters();
        assert_eq!(NORMAL[1].name, "stddev");
        assert_eq!(NORMAL[1].default, Some("1.0"));

        let tables: Vec<&'static [ParameterSpec]> =
            DistributionKind::ALL.iter().map(|k| k.parameters()).collect();
        assert_eq!(tables.len(), 20);
        assert!(DistributionKind::Unspecified.parameters().is_empty());
    }
}
