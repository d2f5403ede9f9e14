//! Typed property values and the runtime type tag carried by every action

use crate::error::{ErrorCode, ErrorOr};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tolerance used whenever two float property values are compared
pub const FLOAT_TOLERANCE: f32 = 1e-5;

/// Most values a min/max span may expand to
pub const MAX_STEP_RANGE_LEN: usize = 10_000;

/// Compare two floats with `FLOAT_TOLERANCE`
pub fn float_equals(a: f32, b: f32) -> bool {
    (a - b).abs() < FLOAT_TOLERANCE
}

/// Runtime type tag of a property or action value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Bool,
    Int,
    Float,
    IntArray,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Bool => "bool",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::IntArray => "int_array",
        };
        f.write_str(name)
    }
}

/// A dynamically typed property value as exchanged with the vehicle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i32),
    Float(f32),
    IntArray(Vec<i32>),
}

impl PropertyValue {
    /// Type tag of this value
    pub fn value_type(&self) -> ValueType {
        match self {
            PropertyValue::Bool(_) => ValueType::Bool,
            PropertyValue::Int(_) => ValueType::Int,
            PropertyValue::Float(_) => ValueType::Float,
            PropertyValue::IntArray(_) => ValueType::IntArray,
        }
    }

    /// Equality with float tolerance
    pub fn value_equals(&self, other: &PropertyValue) -> bool {
        match (self, other) {
            (PropertyValue::Float(a), PropertyValue::Float(b)) => float_equals(*a, *b),
            _ => self == other,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Bool(v) => write!(f, "{}", v),
            PropertyValue::Int(v) => write!(f, "{}", v),
            PropertyValue::Float(v) => write!(f, "{}", v),
            PropertyValue::IntArray(v) => write!(f, "{:?}", v),
        }
    }
}

/// A value type an action can be declared with
///
/// Registries hold differently typed actions behind one interface, so every
/// action value carries its `ValueType` tag for runtime comparison against
/// the type a caller asks for.
pub trait ActionValue: Clone + fmt::Debug + PartialEq + PartialOrd + Send + Sync + 'static {
    const VALUE_TYPE: ValueType;

    /// Extract a value of this type, `None` on a type mismatch
    fn from_property_value(value: &PropertyValue) -> Option<Self>;

    fn to_property_value(&self) -> PropertyValue;

    /// Equality used for supported-value and already-set checks
    fn value_equals(&self, other: &Self) -> bool {
        self == other
    }

    /// Every value from `min` to `max` inclusive
    ///
    /// Non-numeric types have no such list and report `BadValImpl`.
    fn values_between(_min: &Self, _max: &Self) -> ErrorOr<Vec<Self>> {
        Err(ErrorCode::BadValImpl)
    }
}

impl ActionValue for bool {
    const VALUE_TYPE: ValueType = ValueType::Bool;

    fn from_property_value(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    fn to_property_value(&self) -> PropertyValue {
        PropertyValue::Bool(*self)
    }
}

impl ActionValue for i32 {
    const VALUE_TYPE: ValueType = ValueType::Int;

    fn from_property_value(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    fn to_property_value(&self) -> PropertyValue {
        PropertyValue::Int(*self)
    }

    fn values_between(min: &Self, max: &Self) -> ErrorOr<Vec<Self>> {
        Self::step_range(*min, *max)
    }
}

impl ActionValue for f32 {
    const VALUE_TYPE: ValueType = ValueType::Float;

    fn from_property_value(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    fn to_property_value(&self) -> PropertyValue {
        PropertyValue::Float(*self)
    }

    fn value_equals(&self, other: &Self) -> bool {
        float_equals(*self, *other)
    }

    fn values_between(min: &Self, max: &Self) -> ErrorOr<Vec<Self>> {
        Self::step_range(*min, *max)
    }
}

/// Numeric action values: the ones that can carry min/max ranges and offsets
pub trait NumericValue: ActionValue + Copy + PartialOrd {
    /// `self + offset`, saturating at the type's bounds
    fn offset_by(self, offset: Self) -> Self;

    fn as_f32(self) -> f32;

    /// Every value from `min` to `max` inclusive, in steps of one
    ///
    /// Spans longer than `MAX_STEP_RANGE_LEN` values, and non-finite
    /// bounds, are `BadPlatformImpl`. An inverted span is empty.
    fn step_range(min: Self, max: Self) -> ErrorOr<Vec<Self>>;

    fn zero() -> Self;
}

impl NumericValue for i32 {
    fn offset_by(self, offset: Self) -> Self {
        self.saturating_add(offset)
    }

    fn as_f32(self) -> f32 {
        self as f32
    }

    fn step_range(min: Self, max: Self) -> ErrorOr<Vec<Self>> {
        if max < min {
            return Ok(Vec::new());
        }
        let len = (i64::from(max) - i64::from(min) + 1) as u64;
        if len > MAX_STEP_RANGE_LEN as u64 {
            return Err(ErrorCode::BadPlatformImpl);
        }
        Ok((min..=max).collect())
    }

    fn zero() -> Self {
        0
    }
}

impl NumericValue for f32 {
    fn offset_by(self, offset: Self) -> Self {
        self + offset
    }

    fn as_f32(self) -> f32 {
        self
    }

    fn step_range(min: Self, max: Self) -> ErrorOr<Vec<Self>> {
        if !min.is_finite() || !max.is_finite() {
            return Err(ErrorCode::BadPlatformImpl);
        }
        if max < min {
            return Ok(Vec::new());
        }
        let steps = (f64::from(max) - f64::from(min)).floor();
        if steps >= MAX_STEP_RANGE_LEN as f64 {
            return Err(ErrorCode::BadPlatformImpl);
        }
        Ok((0..=steps as usize).map(|i| min + i as f32).collect())
    }

    fn zero() -> Self {
        0.0
    }
}
