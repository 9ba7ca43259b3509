//! Distribution parameter resolution
//!
//! Distribution parameters arrive as a free-form JSON object. This module pulls
//! named scalars and arrays out of it, converts them to the type a distribution
//! needs, and checks them against simple interval constraints. Every failure is
//! a [`ParameterError`] that names the key, the rule, and the offending value.

use crate::element::Element;
use crate::error::ParameterError;
use serde_json::{Map, Value};
use std::fmt;

/// Distribution parameter tree
pub type Params = Map<String, Value>;

/// One end of a [`Constraint`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound<T> {
    Unbounded,
    Inclusive(T),
    Exclusive(T),
}

/// Interval a parameter value must fall in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constraint<T> {
    lower: Bound<T>,
    upper: Bound<T>,
}

impl<T: Element> Constraint<T> {
    pub fn any() -> Self {
        Self {
            lower: Bound::Unbounded,
            upper: Bound::Unbounded,
        }
    }

    /// `value >= min`
    pub fn at_least(min: T) -> Self {
        Self {
            lower: Bound::Inclusive(min),
            upper: Bound::Unbounded,
        }
    }

    /// `value > min`
    pub fn greater_than(min: T) -> Self {
        Self {
            lower: Bound::Exclusive(min),
            upper: Bound::Unbounded,
        }
    }

    /// Add an inclusive upper bound
    pub fn at_most(mut self, max: T) -> Self {
        self.upper = Bound::Inclusive(max);
        self
    }

    /// Add an exclusive upper bound
    pub fn below(mut self, max: T) -> Self {
        self.upper = Bound::Exclusive(max);
        self
    }

    pub fn admits(&self, value: T) -> bool {
        let lower_ok = match self.lower {
            Bound::Unbounded => true,
            Bound::Inclusive(min) => value >= min,
            Bound::Exclusive(min) => value > min,
        };
        let upper_ok = match self.upper {
            Bound::Unbounded => true,
            Bound::Inclusive(max) => value <= max,
            Bound::Exclusive(max) => value < max,
        };
        lower_ok && upper_ok
    }
}

impl<T: fmt::Display> fmt::Display for Constraint<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (&self.lower, &self.upper) {
            (Bound::Unbounded, Bound::Unbounded) => write!(f, "any value"),
            (Bound::Inclusive(min), Bound::Unbounded) => write!(f, ">= {}", min),
            (Bound::Exclusive(min), Bound::Unbounded) => write!(f, "> {}", min),
            (Bound::Unbounded, Bound::Inclusive(max)) => write!(f, "<= {}", max),
            (Bound::Unbounded, Bound::Exclusive(max)) => write!(f, "< {}", max),
            (lower, upper) => {
                match lower {
                    Bound::Inclusive(min) => write!(f, "in [{}, ", min)?,
                    Bound::Exclusive(min) => write!(f, "in ({}, ", min)?,
                    Bound::Unbounded => write!(f, "in (-inf, ")?,
                }
                match upper {
                    Bound::Inclusive(max) => write!(f, "{}]", max),
                    Bound::Exclusive(max) => write!(f, "{})", max),
                    Bound::Unbounded => write!(f, "inf)"),
                }
            }
        }
    }
}

fn expected_shape<T: Element>() -> String {
    if T::TYPE.is_integer() {
        format!("an integer representable as {}", T::TYPE)
    } else {
        format!("a finite number representable as {}", T::TYPE)
    }
}

fn convert<T: Element>(key: &str, value: &Value) -> Result<T, ParameterError> {
    T::from_json(value).ok_or_else(|| ParameterError::WrongType {
        key: key.to_string(),
        expected: expected_shape::<T>(),
        found: value.to_string(),
    })
}

/// Resolve a scalar parameter
///
/// Returns `default` when `key` is absent; a `None` default makes the
/// parameter required. A present value must convert to `T` and satisfy
/// `constraint`.
pub fn get_scalar<T: Element>(
    params: &Params,
    key: &str,
    default: Option<T>,
    constraint: Constraint<T>,
) -> Result<T, ParameterError> {
    let Some(raw) = params.get(key) else {
        return match default {
            Some(value) => {
                debug_assert!(
                    constraint.admits(value),
                    "default {} for '{}' violates {}",
                    value,
                    key,
                    constraint
                );
                Ok(value)
            }
            None => Err(ParameterError::Missing {
                key: key.to_string(),
            }),
        };
    };

    let value = convert::<T>(key, raw)?;
    if !constraint.admits(value) {
        return Err(ParameterError::OutOfRange {
            key: key.to_string(),
            value: value.to_string(),
            constraint: constraint.to_string(),
        });
    }
    Ok(value)
}

/// Resolve a parameter that must be present
pub fn required<T: Element>(
    params: &Params,
    key: &str,
    constraint: Constraint<T>,
) -> Result<T, ParameterError> {
    get_scalar(params, key, None, constraint)
}

/// Resolve a parameter that falls back to `default`
pub fn optional<T: Element>(
    params: &Params,
    key: &str,
    default: T,
    constraint: Constraint<T>,
) -> Result<T, ParameterError> {
    get_scalar(params, key, Some(default), constraint)
}

/// Resolve a required array parameter
pub fn get_array<T: Element>(params: &Params, key: &str) -> Result<Vec<T>, ParameterError> {
    let raw = params.get(key).ok_or_else(|| ParameterError::Missing {
        key: key.to_string(),
    })?;
    let items = raw.as_array().ok_or_else(|| ParameterError::WrongType {
        key: key.to_string(),
        expected: format!("an array of {}", T::TYPE),
        found: raw.to_string(),
    })?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| convert::<T>(&format!("{}[{}]", key, i), item))
        .collect()
}

/// Check that `lower <= upper` for a pair of bound parameters
pub fn check_order<T: Element>(
    lower_key: &str,
    lower: T,
    upper_key: &str,
    upper: T,
) -> Result<(), ParameterError> {
    if lower > upper {
        return Err(ParameterError::Misordered {
            lower_key: lower_key.to_string(),
            lower: lower.to_string(),
            upper_key: upper_key.to_string(),
            upper: upper.to_string(),
        });
    }
    Ok(())
}
