use crate::base::{ActionContext, ActionCore, ActionDefinition};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, instrument};
use val_core::{ActionValue, ErrorOr, GetActionResult};

/// Reads a property for a set of elements
pub struct GetAction<T: ActionValue> {
    core: ActionCore<T>,
}

impl<T: ActionValue> GetAction<T> {
    pub fn new(context: ActionContext, definition: ActionDefinition<T>) -> ErrorOr<Self> {
        Ok(Self {
            core: ActionCore::new(context, definition, false)?,
        })
    }

    pub fn core(&self) -> &ActionCore<T> {
        &self.core
    }

    /// Current value of each element
    ///
    /// For HVAC-dependent actions the seats whose power is off (and could not
    /// be turned on) report an error instead of a value.
    #[instrument(skip(self), fields(action = %self.core.name()))]
    pub fn get(&self, elements: &BTreeSet<String>) -> ErrorOr<GetActionResult<T>> {
        if let Some(err) = self.core.check_are_elements_supported(elements) {
            return Err(err);
        }
        let Some(hvac_power) = self.core.hvac_power() else {
            return self.get_unconditionally(elements);
        };

        let state = hvac_power.compute_hvac_power_state(elements);
        if let Some(err) = state.error_code {
            return Err(err);
        }

        let mut element_to_value: BTreeMap<String, ErrorOr<T>> = state
            .seat_to_error_code
            .into_iter()
            .map(|(seat, err)| (seat, Err(err)))
            .collect();
        if !state.seats_to_update.is_empty() {
            let read = self.get_unconditionally(&state.seats_to_update)?;
            element_to_value.extend(read.element_to_value);
        }
        debug!(elements = element_to_value.len(), "Get finished");
        Ok(GetActionResult::new(self.core.name(), element_to_value))
    }

    /// Read without resolving HVAC power
    pub fn get_unconditionally(&self, elements: &BTreeSet<String>) -> ErrorOr<GetActionResult<T>> {
        if let Some(err) = self.core.check_are_elements_supported(elements) {
            return Err(err);
        }
        let element_to_value = self.core.get_internal(elements)?;
        Ok(GetActionResult::new(self.core.name(), element_to_value))
    }
}
