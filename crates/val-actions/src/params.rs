//! Optional parameters shared by all action kinds

use crate::generator::CustomValueRangeGenerator;
use std::fmt;
use std::sync::Arc;
use val_core::ActionValue;

/// Tuning knobs of an action
///
/// Construct with struct update syntax over `Default::default()`.
pub struct OptionalActionParameters<T: ActionValue> {
    /// Turn HVAC power on for seats where it is off instead of reporting
    /// `HvacPowerIsDisabled`. Only HVAC-dependent actions look at it.
    pub enable_hvac_power_if_dependent: bool,
    /// Derive each element's supported values from the area min/max.
    pub is_min_max_property: bool,
    /// Values every supported element must accept.
    pub required_supported_values: Vec<T>,
    pub custom_value_range_generator: Option<Arc<dyn CustomValueRangeGenerator<T>>>,
}

impl<T: ActionValue> Default for OptionalActionParameters<T> {
    fn default() -> Self {
        Self {
            enable_hvac_power_if_dependent: false,
            is_min_max_property: false,
            required_supported_values: Vec::new(),
            custom_value_range_generator: None,
        }
    }
}

impl<T: ActionValue> Clone for OptionalActionParameters<T> {
    fn clone(&self) -> Self {
        Self {
            enable_hvac_power_if_dependent: self.enable_hvac_power_if_dependent,
            is_min_max_property: self.is_min_max_property,
            required_supported_values: self.required_supported_values.clone(),
            custom_value_range_generator: self.custom_value_range_generator.clone(),
        }
    }
}

impl<T: ActionValue> fmt::Debug for OptionalActionParameters<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionalActionParameters")
            .field("enable_hvac_power_if_dependent", &self.enable_hvac_power_if_dependent)
            .field("is_min_max_property", &self.is_min_max_property)
            .field("required_supported_values", &self.required_supported_values)
            .field(
                "custom_value_range_generator",
                &self.custom_value_range_generator.is_some(),
            )
            .finish()
    }
}
