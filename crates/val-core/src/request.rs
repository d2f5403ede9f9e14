//! Requests for offset and target-temperature actions

use crate::temperature::Temperature;
use std::collections::BTreeSet;

/// An offset of one of the supported kinds, tagged at runtime
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OffsetAmount {
    Int(i32),
    Float(f32),
    Temperature(Temperature),
}

/// Types an offset request can carry
///
/// Offset outputs use the same type as the offset: an int offset reports the
/// new int values, a temperature offset reports temperatures.
pub trait OffsetValue: Clone + std::fmt::Debug + Send + Sync + 'static {
    fn into_amount(self) -> OffsetAmount;

    /// `None` when the amount holds a different kind
    fn from_amount(amount: OffsetAmount) -> Option<Self>;
}

impl OffsetValue for i32 {
    fn into_amount(self) -> OffsetAmount {
        OffsetAmount::Int(self)
    }

    fn from_amount(amount: OffsetAmount) -> Option<Self> {
        match amount {
            OffsetAmount::Int(v) => Some(v),
            _ => None,
        }
    }
}

impl OffsetValue for f32 {
    fn into_amount(self) -> OffsetAmount {
        OffsetAmount::Float(self)
    }

    fn from_amount(amount: OffsetAmount) -> Option<Self> {
        match amount {
            OffsetAmount::Float(v) => Some(v),
            _ => None,
        }
    }
}

impl OffsetValue for Temperature {
    fn into_amount(self) -> OffsetAmount {
        OffsetAmount::Temperature(self)
    }

    fn from_amount(amount: OffsetAmount) -> Option<Self> {
        match amount {
            OffsetAmount::Temperature(v) => Some(v),
            _ => None,
        }
    }
}

/// Move the current value of each element by `offset`
#[derive(Debug, Clone, PartialEq)]
pub struct OffsetRequest<U> {
    pub offset: U,
    pub elements: BTreeSet<String>,
    /// Snap the result to the closest supported value instead of failing.
    /// Only temperature offsets look at it.
    pub round_to_nearest_supported_value: bool,
}

impl<U: OffsetValue> OffsetRequest<U> {
    pub fn new(offset: U) -> Self {
        Self {
            offset,
            elements: BTreeSet::new(),
            round_to_nearest_supported_value: true,
        }
    }

    pub fn with_elements<I, S>(mut self, elements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.elements = elements.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_rounding(mut self, round: bool) -> Self {
        self.round_to_nearest_supported_value = round;
        self
    }

    /// Erase the offset type
    pub fn into_amount(self) -> OffsetRequest<OffsetAmount> {
        OffsetRequest {
            offset: self.offset.into_amount(),
            elements: self.elements,
            round_to_nearest_supported_value: self.round_to_nearest_supported_value,
        }
    }
}

/// Set the HVAC target temperature of the given seats
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateTargetTemperatureRequest {
    pub seats: BTreeSet<String>,
    pub temperature: Temperature,
    pub round_to_nearest_supported_value: bool,
}

impl UpdateTargetTemperatureRequest {
    pub fn new<I, S>(seats: I, temperature: Temperature) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            seats: seats.into_iter().map(Into::into).collect(),
            temperature,
            round_to_nearest_supported_value: true,
        }
    }

    pub fn with_rounding(mut self, round: bool) -> Self {
        self.round_to_nearest_supported_value = round;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_kind_checked() {
        assert_eq!(i32::from_amount(OffsetAmount::Int(2)), Some(2));
        assert_eq!(i32::from_amount(OffsetAmount::Float(2.0)), None);
        assert_eq!(
            Temperature::from_amount(Temperature::celsius(1.0).into_amount()),
            Some(Temperature::celsius(1.0))
        );
    }

    #[test]
    fn test_offset_request_defaults() {
        let request = OffsetRequest::new(1).with_elements(["SEAT_ROW_1_LEFT"]);
        assert!(request.round_to_nearest_supported_value);
        assert!(request.elements.contains("SEAT_ROW_1_LEFT"));

        let erased = request.with_rounding(false).into_amount();
        assert_eq!(erased.offset, OffsetAmount::Int(1));
        assert!(!erased.round_to_nearest_supported_value);
    }
}
