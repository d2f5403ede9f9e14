//! Ordered set of values an element accepts

use crate::error::{ErrorCode, ErrorOr};
use crate::value::{ActionValue, NumericValue};

/// The supported values of one element of a numeric action
///
/// The list is never empty. `min()` and `max()` are the first and last
/// entries, which for the HVAC temperature table are the first Celsius and
/// last Fahrenheit values rather than numeric extremes.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueRange<T> {
    supported_values: Vec<T>,
}

impl<T: ActionValue> ValueRange<T> {
    /// Create a range from an explicit list of supported values
    pub fn new(supported_values: Vec<T>) -> ErrorOr<Self> {
        if supported_values.is_empty() {
            return Err(ErrorCode::BadValImpl);
        }
        Ok(Self { supported_values })
    }

    pub fn supported_values(&self) -> &[T] {
        &self.supported_values
    }

    /// First supported value
    pub fn min(&self) -> &T {
        &self.supported_values[0]
    }

    /// Last supported value
    pub fn max(&self) -> &T {
        &self.supported_values[self.supported_values.len() - 1]
    }

    /// Membership test, float values compared with tolerance
    pub fn is_value_supported(&self, value: &T) -> bool {
        self.supported_values
            .iter()
            .any(|supported| supported.value_equals(value))
    }

    pub fn len(&self) -> usize {
        self.supported_values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.supported_values.is_empty()
    }
}

impl<T: NumericValue> ValueRange<T> {
    /// Every value from `min` to `max` inclusive in steps of one
    ///
    /// Requires `min < max`.
    pub fn from_min_max(min: T, max: T) -> ErrorOr<Self> {
        if !(min < max) {
            return Err(ErrorCode::BadValImpl);
        }
        Self::new(T::step_range(min, max)?)
    }

    /// Convert to a float range for callers that compare ranges across types
    pub fn to_f32(&self) -> ValueRange<f32> {
        ValueRange {
            supported_values: self.supported_values.iter().map(|v| v.as_f32()).collect(),
        }
    }
}
