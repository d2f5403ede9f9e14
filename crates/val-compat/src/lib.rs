//! Vehicle property compat layer
//!
//! Wraps the raw vehicle property service (`VehicleHal`) behind
//! `PropertyManagerCompat`, which validates platform configs, resolves
//! caller areas against config areas, and confirms writes by reading them
//! back. Also holds the permission boundary and an in-memory vehicle.

mod config;
mod fake;
mod hal;
pub mod ids;
mod manager;
mod permission;

pub use config::{AreaConfig, PropertyConfig, PropertyValueRecord};
pub use fake::FakeVehicle;
pub use hal::{
    HalError, PropertyAccess, PropertyStatus, RawAreaConfig, RawPropertyConfig, RawPropertyValue,
    VehicleHal,
};
pub use ids::{parse_property_id, property_name, AreaType};
pub use manager::{AreaResults, PropertyManagerCompat};
pub use permission::{PermissionChecker, StaticPermissions};
