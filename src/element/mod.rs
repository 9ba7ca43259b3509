//! Storage element types
//!
//! This module provides the catalog of numeric types a raster can be stored as
//! and the [`Element`] trait that binds each catalog entry to a Rust primitive.
//!
//! # Narrow-type substitution
//!
//! Integer distributions never sample directly in an 8-bit type. `Byte` and
//! `Int8` rasters are sampled in `Int16` and narrowed when the tile is
//! written. This is the only place the rule lives: [`ElementType::sampling_type`]
//! at the value level and [`Element::Sample`] at the type level.

use num_traits::{Bounded, NumCast, One, ToPrimitive, Zero};
use rand::distributions::uniform::{SampleUniform, UniformFloat, UniformInt, UniformSampler};
use serde_json::Value;
use std::fmt;

/// Supported raster storage type
///
/// Names follow GDAL's data type names. Unsupported names map to `Unknown`
/// rather than an error, so callers test for the sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementType {
    Unknown,
    Byte,
    Int8,
    UInt16,
    Int16,
    UInt32,
    Int32,
    UInt64,
    Int64,
    Float32,
    Float64,
}

impl ElementType {
    /// Every supported type (excludes the `Unknown` sentinel)
    pub const ALL: [ElementType; 10] = [
        ElementType::Byte,
        ElementType::Int8,
        ElementType::UInt16,
        ElementType::Int16,
        ElementType::UInt32,
        ElementType::Int32,
        ElementType::UInt64,
        ElementType::Int64,
        ElementType::Float32,
        ElementType::Float64,
    ];

    /// Canonical name
    pub const fn name(self) -> &'static str {
        match self {
            ElementType::Unknown => "Unknown",
            ElementType::Byte => "Byte",
            ElementType::Int8 => "Int8",
            ElementType::UInt16 => "UInt16",
            ElementType::Int16 => "Int16",
            ElementType::UInt32 => "UInt32",
            ElementType::Int32 => "Int32",
            ElementType::UInt64 => "UInt64",
            ElementType::Int64 => "Int64",
            ElementType::Float32 => "Float32",
            ElementType::Float64 => "Float64",
        }
    }

    /// Look up a type by name (case-insensitive)
    ///
    /// Returns `ElementType::Unknown` for anything not in the catalog.
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(name.trim()))
            .unwrap_or(ElementType::Unknown)
    }

    /// Size of one element in bits (0 for `Unknown`)
    pub const fn size_in_bits(self) -> usize {
        self.size_in_bytes() * 8
    }

    /// Size of one element in bytes (0 for `Unknown`)
    pub const fn size_in_bytes(self) -> usize {
        match self {
            ElementType::Unknown => 0,
            ElementType::Byte | ElementType::Int8 => 1,
            ElementType::UInt16 | ElementType::Int16 => 2,
            ElementType::UInt32 | ElementType::Int32 | ElementType::Float32 => 4,
            ElementType::UInt64 | ElementType::Int64 | ElementType::Float64 => 8,
        }
    }

    /// Numeric limits as `(lowest, max)`, widened to f64
    ///
    /// 64-bit integer limits are not exactly representable and round to the
    /// nearest f64. `Unknown` reports `(0.0, 0.0)`.
    pub fn limits(self) -> (f64, f64) {
        match self {
            ElementType::Unknown => (0.0, 0.0),
            ElementType::Byte => (u8::MIN as f64, u8::MAX as f64),
            ElementType::Int8 => (i8::MIN as f64, i8::MAX as f64),
            ElementType::UInt16 => (u16::MIN as f64, u16::MAX as f64),
            ElementType::Int16 => (i16::MIN as f64, i16::MAX as f64),
            ElementType::UInt32 => (u32::MIN as f64, u32::MAX as f64),
            ElementType::Int32 => (i32::MIN as f64, i32::MAX as f64),
            ElementType::UInt64 => (u64::MIN as f64, u64::MAX as f64),
            ElementType::Int64 => (i64::MIN as f64, i64::MAX as f64),
            ElementType::Float32 => (f32::MIN as f64, f32::MAX as f64),
            ElementType::Float64 => (f64::MIN, f64::MAX),
        }
    }

    pub const fn is_integer(self) -> bool {
        !matches!(
            self,
            ElementType::Float32 | ElementType::Float64 | ElementType::Unknown
        )
    }

    pub const fn is_float(self) -> bool {
        matches!(self, ElementType::Float32 | ElementType::Float64)
    }

    /// Type integer distributions sample in before narrowing to `self`
    pub const fn sampling_type(self) -> ElementType {
        match self {
            ElementType::Byte | ElementType::Int8 => ElementType::Int16,
            other => other,
        }
    }

    /// Decode one native-endian element to f64
    ///
    /// Returns `None` when `bytes` is shorter than one element or the type is
    /// `Unknown`.
    pub fn decode_f64(self, bytes: &[u8]) -> Option<f64> {
        if self == ElementType::Unknown || bytes.len() < self.size_in_bytes() {
            return None;
        }
        let value = match self {
            ElementType::Unknown => return None,
            ElementType::Byte => u8::read_ne(bytes).to_f64_lossy(),
            ElementType::Int8 => i8::read_ne(bytes).to_f64_lossy(),
            ElementType::UInt16 => u16::read_ne(bytes).to_f64_lossy(),
            ElementType::Int16 => i16::read_ne(bytes).to_f64_lossy(),
            ElementType::UInt32 => u32::read_ne(bytes).to_f64_lossy(),
            ElementType::Int32 => i32::read_ne(bytes).to_f64_lossy(),
            ElementType::UInt64 => u64::read_ne(bytes).to_f64_lossy(),
            ElementType::Int64 => i64::read_ne(bytes).to_f64_lossy(),
            ElementType::Float32 => f32::read_ne(bytes).to_f64_lossy(),
            ElementType::Float64 => f64::read_ne(bytes),
        };
        Some(value)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A Rust primitive that can be stored in a raster tile
pub trait Element:
    Copy
    + PartialOrd
    + fmt::Debug
    + fmt::Display
    + NumCast
    + Bounded
    + Zero
    + One
    + SampleUniform
    + Send
    + Sync
    + 'static
{
    /// Catalog entry for this primitive
    const TYPE: ElementType;

    /// Type integer distributions sample in for this storage type
    type Sample: Element;

    /// Inclusive-range uniform sampler, built once per distribution
    type Uniform: UniformSampler<X = Self> + Send + Sync;

    /// Extract a value from a JSON number, `None` if it is not representable
    fn from_json(value: &Value) -> Option<Self>;

    /// Write `self` into the first `size_of::<Self>()` bytes of `out`
    fn write_ne(self, out: &mut [u8]);

    /// Read a value from the first `size_of::<Self>()` bytes of `bytes`
    fn read_ne(bytes: &[u8]) -> Self;

    /// Convert, saturating at this type's limits when out of range
    fn saturating_from<V: ToPrimitive + Copy>(value: V) -> Self {
        if let Some(v) = <Self as NumCast>::from(value) {
            return v;
        }
        match value.to_f64() {
            Some(x) if x < 0.0 => <Self as Bounded>::min_value(),
            _ => <Self as Bounded>::max_value(),
        }
    }

    fn to_f64_lossy(self) -> f64 {
        self.to_f64().unwrap_or(f64::NAN)
    }
}

/// Marker for floating-point storage types
pub trait RealElement: Element + num_traits::Float + num_traits::FloatConst {}

impl RealElement for f32 {}
impl RealElement for f64 {}

fn integer_from_json<T: NumCast>(value: &Value) -> Option<T> {
    if let Some(v) = value.as_i64() {
        return <T as NumCast>::from(v);
    }
    value.as_u64().and_then(<T as NumCast>::from)
}

fn float_from_json<T: NumCast>(value: &Value) -> Option<T> {
    let v = value.as_f64()?;
    if !v.is_finite() {
        return None;
    }
    <T as NumCast>::from(v).filter(|x: &T| x.to_f64().map_or(false, f64::is_finite))
}

macro_rules! impl_element {
    ($t:ty, $variant:ident, $sample:ty, $uniform:ident, $from_json:ident) => {
        impl Element for $t {
            const TYPE: ElementType = ElementType::$variant;
            type Sample = $sample;
            type Uniform = $uniform<$t>;

            fn from_json(value: &Value) -> Option<Self> {
                $from_json::<$t>(value)
            }

            #[inline(always)]
            fn write_ne(self, out: &mut [u8]) {
                out[..std::mem::size_of::<$t>()].copy_from_slice(&self.to_ne_bytes());
            }

            #[inline(always)]
            fn read_ne(bytes: &[u8]) -> Self {
                let mut raw = [0u8; std::mem::size_of::<$t>()];
                raw.copy_from_slice(&bytes[..std::mem::size_of::<$t>()]);
                <$t>::from_ne_bytes(raw)
            }
        }
    };
}

impl_element!(u8, Byte, i16, UniformInt, integer_from_json);
impl_element!(i8, Int8, i16, UniformInt, integer_from_json);
impl_element!(u16, UInt16, u16, UniformInt, integer_from_json);
impl_element!(i16, Int16, i16, UniformInt, integer_from_json);
impl_element!(u32, UInt32, u32, UniformInt, integer_from_json);
impl_element!(i32, Int32, i32, UniformInt, integer_from_json);
impl_element!(u64, UInt64, u64, UniformInt, integer_from_json);
impl_element!(i64, Int64, i64, UniformInt, integer_from_json);
impl_element!(f32, Float32, f32, UniformFloat, float_from_json);
impl_element!(f64, Float64, f64, UniformFloat, float_from_json);
