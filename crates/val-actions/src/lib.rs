//! Actions over vehicle properties
//!
//! An action gets, sets or offsets one property for a set of named
//! elements. Actions determine once whether the vehicle supports them and
//! which elements and values are valid, then validate every request against
//! that answer before touching the vehicle. Actions on climate properties
//! gated by HVAC power resolve the power state first and can turn power on.

mod action;
mod base;
mod cache;
mod generator;
mod get;
mod hvac_power;
mod offset;
mod params;
mod set;
mod temperature;
pub mod temperature_utils;

pub use action::{Action, Capability, DispatchValue, GetActionKind, OffsetActionKind, SetActionKind};
pub use base::{ActionContext, ActionCore, ActionDefinition, ActionInfo};
pub use generator::{
    CustomValueRangeGenerator, HvacTemperatureSetValueRangeGenerator, ZeroOrGreaterThan, ZeroOrLessThan,
};
pub use get::GetAction;
pub use hvac_power::{HvacPowerState, HvacPowerUtils};
pub use offset::OffsetAction;
pub use params::OptionalActionParameters;
pub use set::SetAction;
pub use temperature::{
    HvacTargetTemperatureGetAction, HvacTargetTemperatureOffsetAction, HvacTargetTemperatureSetAction,
};
