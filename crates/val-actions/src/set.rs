use crate::base::{ActionContext, ActionCore, ActionDefinition};
use crate::hvac_power::HvacPowerUtils;
use std::collections::BTreeSet;
use tracing::{debug, instrument};
use val_core::{ActionValue, ErrorOr, SetActionResult};

/// Writes one value to a set of elements
pub struct SetAction<T: ActionValue> {
    core: ActionCore<T>,
}

impl<T: ActionValue> SetAction<T> {
    pub fn new(context: ActionContext, definition: ActionDefinition<T>) -> ErrorOr<Self> {
        Ok(Self {
            core: ActionCore::new(context, definition, true)?,
        })
    }

    pub fn core(&self) -> &ActionCore<T> {
        &self.core
    }

    /// Write `value` to every element and confirm it
    ///
    /// Elements that already hold the value report `ValueAlreadySet`, except
    /// seats whose HVAC power this call turned on.
    #[instrument(skip(self), fields(action = %self.core.name()))]
    pub fn set(&self, elements: &BTreeSet<String>, value: &T) -> ErrorOr<SetActionResult> {
        if let Some(err) = self.core.check_are_elements_supported(elements) {
            return Err(err);
        }
        let Some(hvac_power) = self.core.hvac_power() else {
            return self.set_unconditionally(elements, value);
        };

        let state = hvac_power.compute_hvac_power_state(elements);
        if let Some(err) = state.error_code {
            return Err(err);
        }

        let mut element_to_error_code = state.seat_to_error_code;
        if !state.seats_to_update.is_empty() {
            let written = self.core.set_internal(&state.seats_to_update, value)?;
            element_to_error_code.extend(written);
        }
        let element_to_error_code = HvacPowerUtils::filtered_seat_to_error_code(
            &state.seats_that_enabled_hvac_power,
            element_to_error_code,
        );
        debug!(failed = element_to_error_code.len(), "Set finished");
        Ok(SetActionResult::new(self.core.name(), element_to_error_code))
    }

    /// Write without resolving HVAC power
    pub fn set_unconditionally(&self, elements: &BTreeSet<String>, value: &T) -> ErrorOr<SetActionResult> {
        if let Some(err) = self.core.check_are_elements_supported(elements) {
            return Err(err);
        }
        let element_to_error_code = self.core.set_internal(elements, value)?;
        Ok(SetActionResult::new(self.core.name(), element_to_error_code))
    }
}
