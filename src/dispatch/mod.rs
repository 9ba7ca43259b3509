//! Dispatch from (storage type, distribution) to a block generator
//!
//! The pairing of element types with distribution kinds is an explicit table
//! built once per process. Each entry is a factory that resolves the
//! distribution's parameters and wraps the result in a
//! [`RandomBlockGenerator`] specialized for the storage type. Discrete
//! distributions are registered for integer storage types only, continuous
//! distributions for floating-point types only.

use crate::config::params::Params;
use crate::distribution::{integer, piecewise, real, DistributionKind, Sampler};
use crate::element::{Element, ElementType, RealElement};
use crate::error::{RasterError, Result};
use crate::generator::{BlockGenerator, RandomBlockGenerator, SeedScheme};
use rand::distributions::{Distribution, Standard};
use rand_distr::{Exp1, Open01, OpenClosed01, StandardNormal};
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::debug;

/// Builds a generator from distribution parameters and a seeding rule
pub type Factory = fn(&Params, SeedScheme) -> Result<Box<dyn BlockGenerator>>;

type Table = HashMap<(ElementType, DistributionKind), Factory>;

static TABLE: OnceLock<Table> = OnceLock::new();

fn table() -> &'static Table {
    TABLE.get_or_init(|| {
        let mut table = Table::new();
        integer_entries::<u8>(&mut table);
        integer_entries::<i8>(&mut table);
        integer_entries::<u16>(&mut table);
        integer_entries::<i16>(&mut table);
        integer_entries::<u32>(&mut table);
        integer_entries::<i32>(&mut table);
        integer_entries::<u64>(&mut table);
        integer_entries::<i64>(&mut table);
        real_entries::<f32>(&mut table);
        real_entries::<f64>(&mut table);
        table
    })
}

fn boxed<T, S>(sampler: S, seeds: SeedScheme) -> Result<Box<dyn BlockGenerator>>
where
    T: Element,
    S: Sampler + 'static,
{
    Ok(Box::new(RandomBlockGenerator::<T, S>::new(sampler, seeds)))
}

fn integer_entries<T: Element>(table: &mut Table) {
    let mut add = |kind, factory: Factory| {
        table.insert((T::TYPE, kind), factory);
    };
    add(DistributionKind::UniformInteger, |p, s| {
        boxed::<T, _>(integer::uniform_integer::<T>(p)?, s)
    });
    add(DistributionKind::Bernoulli, |p, s| {
        boxed::<T, _>(integer::bernoulli::<T>(p)?, s)
    });
    add(DistributionKind::Binomial, |p, s| {
        boxed::<T, _>(integer::binomial::<T>(p)?, s)
    });
    add(DistributionKind::NegativeBinomial, |p, s| {
        boxed::<T, _>(integer::negative_binomial::<T>(p)?, s)
    });
    add(DistributionKind::Geometric, |p, s| {
        boxed::<T, _>(integer::geometric::<T>(p)?, s)
    });
    add(DistributionKind::Poisson, |p, s| {
        boxed::<T, _>(integer::poisson::<T>(p)?, s)
    });
    add(DistributionKind::Discrete, |p, s| {
        boxed::<T, _>(integer::discrete::<T>(p)?, s)
    });
}

fn real_entries<F>(table: &mut Table)
where
    F: RealElement,
    StandardNormal: Distribution<F>,
    Exp1: Distribution<F>,
    Open01: Distribution<F>,
    OpenClosed01: Distribution<F>,
    Standard: Distribution<F>,
{
    let mut add = |kind, factory: Factory| {
        table.insert((F::TYPE, kind), factory);
    };
    add(DistributionKind::UniformReal, |p, s| {
        boxed::<F, _>(real::uniform_real::<F>(p)?, s)
    });
    add(DistributionKind::Normal, |p, s| {
        boxed::<F, _>(real::normal::<F>(p)?, s)
    });
    add(DistributionKind::LogNormal, |p, s| {
        boxed::<F, _>(real::lognormal::<F>(p)?, s)
    });
    add(DistributionKind::Gamma, |p, s| {
        boxed::<F, _>(real::gamma::<F>(p)?, s)
    });
    add(DistributionKind::Exponential, |p, s| {
        boxed::<F, _>(real::exponential::<F>(p)?, s)
    });
    add(DistributionKind::Weibull, |p, s| {
        boxed::<F, _>(real::weibull::<F>(p)?, s)
    });
    add(DistributionKind::ExtremeValue, |p, s| {
        boxed::<F, _>(real::extreme_value::<F>(p)?, s)
    });
    add(DistributionKind::Cauchy, |p, s| {
        boxed::<F, _>(real::cauchy::<F>(p)?, s)
    });
    add(DistributionKind::FisherF, |p, s| {
        boxed::<F, _>(real::fisher_f::<F>(p)?, s)
    });
    add(DistributionKind::StudentT, |p, s| {
        boxed::<F, _>(real::student_t::<F>(p)?, s)
    });
    add(DistributionKind::ChiSquared, |p, s| {
        boxed::<F, _>(real::chi_squared::<F>(p)?, s)
    });
    add(DistributionKind::PiecewiseConstant, |p, s| {
        boxed::<F, _>(piecewise::piecewise_constant::<F>(p)?, s)
    });
    add(DistributionKind::PiecewiseLinear, |p, s| {
        boxed::<F, _>(piecewise::piecewise_linear::<F>(p)?, s)
    });
}

/// True when `(element_type, distribution)` has a generator
pub fn is_supported(element_type: ElementType, distribution: DistributionKind) -> bool {
    table().contains_key(&(element_type, distribution))
}

/// Look up the factory for a pair
///
/// # Errors
///
/// Returns [`RasterError::UnsupportedCombination`] naming both the type and the
/// distribution when no entry exists.
pub fn factory(element_type: ElementType, distribution: DistributionKind) -> Result<Factory> {
    table()
        .get(&(element_type, distribution))
        .copied()
        .ok_or(RasterError::UnsupportedCombination {
            element_type,
            distribution,
        })
}

/// Build the generator for a pair
///
/// # Errors
///
/// Fails with [`RasterError::UnsupportedCombination`] for a pair with no entry,
/// or [`RasterError::Parameter`] when the distribution parameters do not
/// resolve.
pub fn build_generator(
    element_type: ElementType,
    distribution: DistributionKind,
    params: &Params,
    seeds: SeedScheme,
) -> Result<Box<dyn BlockGenerator>> {
    let generator = factory(element_type, distribution)?(params, seeds)?;
    debug!(
        storage = %generator.element_type(),
        sampling = %generator.sampling_type(),
        %distribution,
        base_seed = seeds.base_seed(),
        "built block generator"
    );
    Ok(generator)
}
