//! Shared construction helpers for the built-in categories

use std::sync::Arc;
use val_actions::{
    Action, ActionContext, ActionDefinition, DispatchValue, GetAction, OptionalActionParameters,
    SetAction, ZeroOrGreaterThan, ZeroOrLessThan,
};
use val_core::{ElementAreaMap, ErrorOr};

/// Builds plain get and set actions over one element map and permission
pub(crate) struct ActionBuilder {
    pub context: ActionContext,
    pub elements: ElementAreaMap,
    pub permission: &'static str,
}

impl ActionBuilder {
    fn definition<T: DispatchValue>(
        &self,
        name: &str,
        property_id: i32,
        params: OptionalActionParameters<T>,
    ) -> ActionDefinition<T> {
        ActionDefinition::new(name, property_id, self.permission, self.elements.clone()).with_params(params)
    }

    pub fn get<T: DispatchValue>(
        &self,
        name: &str,
        property_id: i32,
        params: OptionalActionParameters<T>,
    ) -> ErrorOr<Action> {
        let action = GetAction::new(self.context.clone(), self.definition(name, property_id, params))?;
        Ok(Action::Get(T::get_kind(action)))
    }

    pub fn set<T: DispatchValue>(
        &self,
        name: &str,
        property_id: i32,
        params: OptionalActionParameters<T>,
    ) -> ErrorOr<Action> {
        let action = SetAction::new(self.context.clone(), self.definition(name, property_id, params))?;
        Ok(Action::Set(T::set_kind(action)))
    }

    /// Get, enable and disable over a boolean property
    pub fn toggles(&self, property_id: i32, names: [&str; 3]) -> ErrorOr<Vec<Action>> {
        let [get, enable, disable] = names;
        Ok(vec![
            self.get::<bool>(get, property_id, Default::default())?,
            self.set::<bool>(enable, property_id, Default::default())?,
            self.set::<bool>(disable, property_id, Default::default())?,
        ])
    }
}

/// Min/max property that must accept zero
pub(crate) fn with_zero() -> OptionalActionParameters<i32> {
    OptionalActionParameters {
        is_min_max_property: true,
        required_supported_values: vec![0],
        ..Default::default()
    }
}

/// `[0, max]` of a property that also takes negative values
pub(crate) fn zero_or_greater() -> OptionalActionParameters<i32> {
    OptionalActionParameters {
        custom_value_range_generator: Some(Arc::new(ZeroOrGreaterThan)),
        ..with_zero()
    }
}

/// `[min, 0]` of a property that also takes positive values
pub(crate) fn zero_or_less() -> OptionalActionParameters<i32> {
    OptionalActionParameters {
        custom_value_range_generator: Some(Arc::new(ZeroOrLessThan)),
        ..with_zero()
    }
}

/// The positive side of a signed level, zero otherwise
pub(crate) fn positive_part(level: i32) -> i32 {
    level.max(0)
}

/// The negative side of a signed level as a positive number
pub(crate) fn negative_part(level: i32) -> i32 {
    level.saturating_neg().max(0)
}
