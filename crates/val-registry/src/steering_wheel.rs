//! Built-in steering wheel actions
//!
//! The steering wheel has no elements; its actions address `GLOBAL` and
//! return the single-value global results.

use crate::builder::{negative_part, positive_part, zero_or_greater, zero_or_less, ActionBuilder};
use crate::category::{rejected, ActionCategory, ActionFuture};
use crate::seat::CLIMATE_PERMISSION;
use std::sync::Arc;
use tokio::runtime::Handle;
use val_actions::ActionContext;
use val_compat::ids::HVAC_STEERING_WHEEL_HEAT;
use val_compat::{PermissionChecker, PropertyManagerCompat};
use val_core::{ElementAreaMap, ErrorOr, GlobalGetResult, GlobalSetResult};

pub const STEERING_WHEEL_ACTION_GET_HEATING_LEVEL: &str = "STEERING_WHEEL_ACTION_GET_HEATING_LEVEL";
pub const STEERING_WHEEL_ACTION_SET_HEATING_LEVEL: &str = "STEERING_WHEEL_ACTION_SET_HEATING_LEVEL";
pub const STEERING_WHEEL_ACTION_GET_COOLING_LEVEL: &str = "STEERING_WHEEL_ACTION_GET_COOLING_LEVEL";
pub const STEERING_WHEEL_ACTION_SET_COOLING_LEVEL: &str = "STEERING_WHEEL_ACTION_SET_COOLING_LEVEL";

/// Steering wheel heating and cooling
pub struct SteeringWheelActions {
    category: ActionCategory,
}

impl SteeringWheelActions {
    pub fn new(
        compat: Arc<PropertyManagerCompat>,
        permissions: Arc<dyn PermissionChecker>,
        handle: Handle,
    ) -> ErrorOr<Self> {
        let wheel = ActionBuilder {
            context: ActionContext::new(compat, permissions),
            elements: ElementAreaMap::global(),
            permission: CLIMATE_PERMISSION,
        };
        let property_id = HVAC_STEERING_WHEEL_HEAT;
        let actions = vec![
            wheel.get(STEERING_WHEEL_ACTION_GET_HEATING_LEVEL, property_id, zero_or_greater())?,
            wheel.set(STEERING_WHEEL_ACTION_SET_HEATING_LEVEL, property_id, zero_or_greater())?,
            wheel.get(STEERING_WHEEL_ACTION_GET_COOLING_LEVEL, property_id, zero_or_less())?,
            wheel.set(STEERING_WHEEL_ACTION_SET_COOLING_LEVEL, property_id, zero_or_less())?,
        ];

        Ok(Self {
            category: ActionCategory::new("STEERING_WHEEL", actions, handle)?,
        })
    }

    pub fn category(&self) -> &ActionCategory {
        &self.category
    }

    /// Heating level, zero while off or cooling
    pub fn get_heating_level(&self) -> ActionFuture<GlobalGetResult<i32>> {
        let future = self
            .category
            .execute_global_get_async::<i32>(STEERING_WHEEL_ACTION_GET_HEATING_LEVEL);
        Box::pin(async move { Ok(future.await?.map(positive_part)) })
    }

    pub fn set_heating_level(&self, level: i32) -> ActionFuture<GlobalSetResult> {
        if level < 0 {
            return rejected("steering wheel heating level must not be negative");
        }
        self.category
            .execute_global_set_async(STEERING_WHEEL_ACTION_SET_HEATING_LEVEL, level)
    }

    /// Cooling level as a positive number, zero while off or heating
    pub fn get_cooling_level(&self) -> ActionFuture<GlobalGetResult<i32>> {
        let future = self
            .category
            .execute_global_get_async::<i32>(STEERING_WHEEL_ACTION_GET_COOLING_LEVEL);
        Box::pin(async move { Ok(future.await?.map(negative_part)) })
    }

    pub fn set_cooling_level(&self, level: i32) -> ActionFuture<GlobalSetResult> {
        if level < 0 {
            return rejected("steering wheel cooling level must not be negative");
        }
        self.category
            .execute_global_set_async(STEERING_WHEEL_ACTION_SET_COOLING_LEVEL, -level)
    }
}
