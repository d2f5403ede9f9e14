//! Core types for the vehicle action library
//!
//! This crate provides the fundamental types shared by every layer of the
//! library: the flat `ErrorCode` taxonomy and `ErrorOr` result alias, typed
//! property values, per-element action results, supported value ranges,
//! temperatures, and the element to area mapping used to address hardware.

mod element;
mod error;
mod request;
mod result;
mod temperature;
mod value;
mod value_range;

pub use element::{ElementAreaMap, GLOBAL_AREA_ID, GLOBAL_ELEMENT};
pub use error::{ErrorCode, ErrorOr};
pub use request::{OffsetAmount, OffsetRequest, OffsetValue, UpdateTargetTemperatureRequest};
pub use result::{GetActionResult, GlobalGetResult, GlobalSetResult, OffsetActionResult, SetActionResult};
pub use temperature::{Temperature, TemperatureUnit};
pub use value::{
    float_equals, ActionValue, NumericValue, PropertyValue, ValueType, FLOAT_TOLERANCE, MAX_STEP_RANGE_LEN,
};
pub use value_range::ValueRange;
