//! Built-in climate actions for seats

use crate::builder::{negative_part, positive_part, zero_or_greater, zero_or_less};
use crate::category::{rejected, ActionCategory, ActionFuture};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::runtime::Handle;
use val_actions::{
    Action, ActionContext, ActionDefinition, GetAction, GetActionKind, HvacTargetTemperatureGetAction,
    HvacTargetTemperatureOffsetAction, HvacTargetTemperatureSetAction, OffsetAction, OffsetActionKind,
    OptionalActionParameters, SetAction, SetActionKind,
};
use val_compat::ids::*;
use val_compat::{PermissionChecker, PropertyManagerCompat};
use val_core::{
    ActionValue, ElementAreaMap, ErrorOr, GetActionResult, OffsetActionResult,
    OffsetRequest, SetActionResult, Temperature, TemperatureUnit, UpdateTargetTemperatureRequest,
};

pub const CLIMATE_PERMISSION: &str = "android.car.permission.CONTROL_CAR_CLIMATE";

pub const SEAT_ACTION_GET_HVAC_POWER: &str = "SEAT_ACTION_GET_HVAC_POWER";
pub const SEAT_ACTION_ENABLE_HVAC_POWER: &str = "SEAT_ACTION_ENABLE_HVAC_POWER";
pub const SEAT_ACTION_DISABLE_HVAC_POWER: &str = "SEAT_ACTION_DISABLE_HVAC_POWER";
pub const SEAT_ACTION_GET_AC: &str = "SEAT_ACTION_GET_AC";
pub const SEAT_ACTION_ENABLE_AC: &str = "SEAT_ACTION_ENABLE_AC";
pub const SEAT_ACTION_DISABLE_AC: &str = "SEAT_ACTION_DISABLE_AC";
pub const SEAT_ACTION_GET_RECIRCULATION: &str = "SEAT_ACTION_GET_RECIRCULATION";
pub const SEAT_ACTION_ENABLE_RECIRCULATION: &str = "SEAT_ACTION_ENABLE_RECIRCULATION";
pub const SEAT_ACTION_DISABLE_RECIRCULATION: &str = "SEAT_ACTION_DISABLE_RECIRCULATION";
pub const SEAT_ACTION_GET_AUTO_MODE: &str = "SEAT_ACTION_GET_AUTO_MODE";
pub const SEAT_ACTION_ENABLE_AUTO_MODE: &str = "SEAT_ACTION_ENABLE_AUTO_MODE";
pub const SEAT_ACTION_DISABLE_AUTO_MODE: &str = "SEAT_ACTION_DISABLE_AUTO_MODE";
pub const SEAT_ACTION_GET_FAN_SPEED: &str = "SEAT_ACTION_GET_FAN_SPEED";
pub const SEAT_ACTION_SET_FAN_SPEED: &str = "SEAT_ACTION_SET_FAN_SPEED";
pub const SEAT_ACTION_INCREMENT_FAN_SPEED: &str = "SEAT_ACTION_INCREMENT_FAN_SPEED";
pub const SEAT_ACTION_DECREMENT_FAN_SPEED: &str = "SEAT_ACTION_DECREMENT_FAN_SPEED";
pub const SEAT_ACTION_GET_SEAT_HEATING: &str = "SEAT_ACTION_GET_SEAT_HEATING";
pub const SEAT_ACTION_SET_SEAT_HEATING: &str = "SEAT_ACTION_SET_SEAT_HEATING";
pub const SEAT_ACTION_GET_SEAT_COOLING: &str = "SEAT_ACTION_GET_SEAT_COOLING";
pub const SEAT_ACTION_SET_SEAT_COOLING: &str = "SEAT_ACTION_SET_SEAT_COOLING";
pub const SEAT_ACTION_GET_TARGET_TEMPERATURE: &str = "SEAT_ACTION_GET_TARGET_TEMPERATURE";
pub const SEAT_ACTION_SET_TARGET_TEMPERATURE: &str = "SEAT_ACTION_SET_TARGET_TEMPERATURE";
pub const SEAT_ACTION_INCREMENT_TARGET_TEMPERATURE: &str = "SEAT_ACTION_INCREMENT_TARGET_TEMPERATURE";
pub const SEAT_ACTION_DECREMENT_TARGET_TEMPERATURE: &str = "SEAT_ACTION_DECREMENT_TARGET_TEMPERATURE";

/// The nine seat positions and their area ids
pub fn seat_elements() -> ErrorOr<ElementAreaMap> {
    ElementAreaMap::new([
        ("SEAT_ROW_1_LEFT", SEAT_ROW_1_LEFT),
        ("SEAT_ROW_1_CENTER", SEAT_ROW_1_CENTER),
        ("SEAT_ROW_1_RIGHT", SEAT_ROW_1_RIGHT),
        ("SEAT_ROW_2_LEFT", SEAT_ROW_2_LEFT),
        ("SEAT_ROW_2_CENTER", SEAT_ROW_2_CENTER),
        ("SEAT_ROW_2_RIGHT", SEAT_ROW_2_RIGHT),
        ("SEAT_ROW_3_LEFT", SEAT_ROW_3_LEFT),
        ("SEAT_ROW_3_CENTER", SEAT_ROW_3_CENTER),
        ("SEAT_ROW_3_RIGHT", SEAT_ROW_3_RIGHT),
    ])
}

/// Options of the built-in climate category
#[derive(Debug, Clone)]
pub struct SeatActionsConfig {
    /// Turn HVAC power on when a dependent action needs it
    pub enable_hvac_power_if_dependent: bool,
    pub category_name: String,
}

impl Default for SeatActionsConfig {
    fn default() -> Self {
        Self {
            enable_hvac_power_if_dependent: true,
            category_name: "SEAT".to_string(),
        }
    }
}

/// Seat climate control: HVAC power, AC, recirculation, auto mode, fan
/// speed, seat heating and cooling, and target temperature
pub struct SeatActions {
    category: ActionCategory,
}

struct Builder {
    context: ActionContext,
    seats: ElementAreaMap,
    enable: bool,
}

impl Builder {
    fn definition<T: ActionValue>(&self, name: &str, property_id: i32) -> ActionDefinition<T> {
        ActionDefinition::new(name, property_id, CLIMATE_PERMISSION, self.seats.clone())
    }

    fn dependent<T: ActionValue>(
        &self,
        name: &str,
        property_id: i32,
        params: OptionalActionParameters<T>,
    ) -> ActionDefinition<T> {
        self.definition(name, property_id)
            .with_params(OptionalActionParameters {
                enable_hvac_power_if_dependent: self.enable,
                ..params
            })
            .dependent_on_hvac_power()
    }

    fn get_bool(&self, definition: ActionDefinition<bool>) -> ErrorOr<Action> {
        Ok(Action::Get(GetActionKind::Bool(GetAction::new(self.context.clone(), definition)?)))
    }

    fn set_bool(&self, definition: ActionDefinition<bool>) -> ErrorOr<Action> {
        Ok(Action::Set(SetActionKind::Bool(SetAction::new(self.context.clone(), definition)?)))
    }

    fn toggles(&self, property_id: i32, names: [&str; 3]) -> ErrorOr<Vec<Action>> {
        let [get, enable, disable] = names;
        Ok(vec![
            self.get_bool(self.dependent(get, property_id, Default::default()))?,
            self.set_bool(self.dependent(enable, property_id, Default::default()))?,
            self.set_bool(self.dependent(disable, property_id, Default::default()))?,
        ])
    }

    fn fan_speed(&self) -> ErrorOr<Vec<Action>> {
        let min_max = || OptionalActionParameters::<i32> {
            is_min_max_property: true,
            ..Default::default()
        };
        let context = &self.context;
        Ok(vec![
            Action::Get(GetActionKind::Int(GetAction::new(
                context.clone(),
                self.dependent(SEAT_ACTION_GET_FAN_SPEED, HVAC_FAN_SPEED, min_max()),
            )?)),
            Action::Set(SetActionKind::Int(SetAction::new(
                context.clone(),
                self.dependent(SEAT_ACTION_SET_FAN_SPEED, HVAC_FAN_SPEED, min_max()),
            )?)),
            Action::Offset(OffsetActionKind::Int(OffsetAction::new(
                context.clone(),
                self.dependent(SEAT_ACTION_INCREMENT_FAN_SPEED, HVAC_FAN_SPEED, min_max()),
            )?)),
            Action::Offset(OffsetActionKind::Int(OffsetAction::new(
                context.clone(),
                self.dependent(SEAT_ACTION_DECREMENT_FAN_SPEED, HVAC_FAN_SPEED, min_max()),
            )?)),
        ])
    }

    fn seat_temperature(&self) -> ErrorOr<Vec<Action>> {
        let context = &self.context;
        let definition = |name: &str, params: OptionalActionParameters<i32>| {
            self.definition(name, HVAC_SEAT_TEMPERATURE).with_params(params)
        };
        Ok(vec![
            Action::Get(GetActionKind::Int(GetAction::new(
                context.clone(),
                definition(SEAT_ACTION_GET_SEAT_HEATING, zero_or_greater()),
            )?)),
            Action::Set(SetActionKind::Int(SetAction::new(
                context.clone(),
                definition(SEAT_ACTION_SET_SEAT_HEATING, zero_or_greater()),
            )?)),
            Action::Get(GetActionKind::Int(GetAction::new(
                context.clone(),
                definition(SEAT_ACTION_GET_SEAT_COOLING, zero_or_less()),
            )?)),
            Action::Set(SetActionKind::Int(SetAction::new(
                context.clone(),
                definition(SEAT_ACTION_SET_SEAT_COOLING, zero_or_less()),
            )?)),
        ])
    }

    fn target_temperature(&self) -> ErrorOr<Vec<Action>> {
        let context = &self.context;
        Ok(vec![
            Action::Get(GetActionKind::Temperature(HvacTargetTemperatureGetAction::new(
                context.clone(),
                SEAT_ACTION_GET_TARGET_TEMPERATURE,
                CLIMATE_PERMISSION,
                self.seats.clone(),
                self.enable,
            )?)),
            Action::Set(SetActionKind::Temperature(HvacTargetTemperatureSetAction::new(
                context.clone(),
                SEAT_ACTION_SET_TARGET_TEMPERATURE,
                CLIMATE_PERMISSION,
                self.seats.clone(),
                self.enable,
            )?)),
            Action::Offset(OffsetActionKind::Temperature(HvacTargetTemperatureOffsetAction::new(
                context.clone(),
                SEAT_ACTION_INCREMENT_TARGET_TEMPERATURE,
                CLIMATE_PERMISSION,
                self.seats.clone(),
                self.enable,
            )?)),
            Action::Offset(OffsetActionKind::Temperature(HvacTargetTemperatureOffsetAction::new(
                context.clone(),
                SEAT_ACTION_DECREMENT_TARGET_TEMPERATURE,
                CLIMATE_PERMISSION,
                self.seats.clone(),
                self.enable,
            )?)),
        ])
    }
}

impl SeatActions {
    pub fn new(
        compat: Arc<PropertyManagerCompat>,
        permissions: Arc<dyn PermissionChecker>,
        handle: Handle,
        config: SeatActionsConfig,
    ) -> ErrorOr<Self> {
        let builder = Builder {
            context: ActionContext::new(compat, permissions),
            seats: seat_elements()?,
            enable: config.enable_hvac_power_if_dependent,
        };

        let mut actions = vec![
            builder.get_bool(builder.definition(SEAT_ACTION_GET_HVAC_POWER, HVAC_POWER_ON))?,
            builder.set_bool(builder.definition(SEAT_ACTION_ENABLE_HVAC_POWER, HVAC_POWER_ON))?,
            builder.set_bool(builder.definition(SEAT_ACTION_DISABLE_HVAC_POWER, HVAC_POWER_ON))?,
        ];
        actions.extend(builder.toggles(
            HVAC_AC_ON,
            [SEAT_ACTION_GET_AC, SEAT_ACTION_ENABLE_AC, SEAT_ACTION_DISABLE_AC],
        )?);
        actions.extend(builder.toggles(
            HVAC_RECIRC_ON,
            [
                SEAT_ACTION_GET_RECIRCULATION,
                SEAT_ACTION_ENABLE_RECIRCULATION,
                SEAT_ACTION_DISABLE_RECIRCULATION,
            ],
        )?);
        actions.extend(builder.toggles(
            HVAC_AUTO_ON,
            [
                SEAT_ACTION_GET_AUTO_MODE,
                SEAT_ACTION_ENABLE_AUTO_MODE,
                SEAT_ACTION_DISABLE_AUTO_MODE,
            ],
        )?);
        actions.extend(builder.fan_speed()?);
        actions.extend(builder.seat_temperature()?);
        actions.extend(builder.target_temperature()?);

        Ok(Self {
            category: ActionCategory::new(config.category_name, actions, handle)?,
        })
    }

    /// The underlying category, for name-based dispatch
    pub fn category(&self) -> &ActionCategory {
        &self.category
    }

    pub fn is_hvac_power_on(&self, seats: BTreeSet<String>) -> ActionFuture<GetActionResult<bool>> {
        self.category.execute_get_async(SEAT_ACTION_GET_HVAC_POWER, seats)
    }

    pub fn set_hvac_power(&self, seats: BTreeSet<String>, on: bool) -> ActionFuture<SetActionResult> {
        let name = if on {
            SEAT_ACTION_ENABLE_HVAC_POWER
        } else {
            SEAT_ACTION_DISABLE_HVAC_POWER
        };
        self.category.execute_set_async(name, seats, on)
    }

    pub fn is_ac_on(&self, seats: BTreeSet<String>) -> ActionFuture<GetActionResult<bool>> {
        self.category.execute_get_async(SEAT_ACTION_GET_AC, seats)
    }

    pub fn set_ac(&self, seats: BTreeSet<String>, on: bool) -> ActionFuture<SetActionResult> {
        let name = if on { SEAT_ACTION_ENABLE_AC } else { SEAT_ACTION_DISABLE_AC };
        self.category.execute_set_async(name, seats, on)
    }

    pub fn is_recirculation_on(&self, seats: BTreeSet<String>) -> ActionFuture<GetActionResult<bool>> {
        self.category.execute_get_async(SEAT_ACTION_GET_RECIRCULATION, seats)
    }

    pub fn set_recirculation(&self, seats: BTreeSet<String>, on: bool) -> ActionFuture<SetActionResult> {
        let name = if on {
            SEAT_ACTION_ENABLE_RECIRCULATION
        } else {
            SEAT_ACTION_DISABLE_RECIRCULATION
        };
        self.category.execute_set_async(name, seats, on)
    }

    pub fn is_auto_mode_on(&self, seats: BTreeSet<String>) -> ActionFuture<GetActionResult<bool>> {
        self.category.execute_get_async(SEAT_ACTION_GET_AUTO_MODE, seats)
    }

    pub fn set_auto_mode(&self, seats: BTreeSet<String>, on: bool) -> ActionFuture<SetActionResult> {
        let name = if on {
            SEAT_ACTION_ENABLE_AUTO_MODE
        } else {
            SEAT_ACTION_DISABLE_AUTO_MODE
        };
        self.category.execute_set_async(name, seats, on)
    }

    pub fn get_fan_speed(&self, seats: BTreeSet<String>) -> ActionFuture<GetActionResult<i32>> {
        self.category.execute_get_async(SEAT_ACTION_GET_FAN_SPEED, seats)
    }

    pub fn set_fan_speed(&self, seats: BTreeSet<String>, speed: i32) -> ActionFuture<SetActionResult> {
        self.category.execute_set_async(SEAT_ACTION_SET_FAN_SPEED, seats, speed)
    }

    /// Raise the fan speed by a positive `amount`
    pub fn increment_fan_speed(&self, seats: BTreeSet<String>, amount: i32) -> ActionFuture<OffsetActionResult<i32>> {
        if amount <= 0 {
            return rejected("fan speed increment must be positive");
        }
        let request = OffsetRequest::new(amount).with_elements(seats);
        self.category.execute_apply_offset_async(SEAT_ACTION_INCREMENT_FAN_SPEED, request)
    }

    /// Lower the fan speed by a positive `amount`
    pub fn decrement_fan_speed(&self, seats: BTreeSet<String>, amount: i32) -> ActionFuture<OffsetActionResult<i32>> {
        if amount <= 0 {
            return rejected("fan speed decrement must be positive");
        }
        let request = OffsetRequest::new(-amount).with_elements(seats);
        self.category.execute_apply_offset_async(SEAT_ACTION_DECREMENT_FAN_SPEED, request)
    }

    /// Heating level of each seat, zero while the seat is off or cooling
    pub fn get_seat_heating_level(&self, seats: BTreeSet<String>) -> ActionFuture<GetActionResult<i32>> {
        let future = self.category.execute_get_async::<i32>(SEAT_ACTION_GET_SEAT_HEATING, seats);
        Box::pin(async move { Ok(future.await?.map(positive_part)) })
    }

    pub fn set_seat_heating_level(&self, seats: BTreeSet<String>, level: i32) -> ActionFuture<SetActionResult> {
        if level < 0 {
            return rejected("seat heating level must not be negative");
        }
        self.category.execute_set_async(SEAT_ACTION_SET_SEAT_HEATING, seats, level)
    }

    /// Cooling level of each seat as a positive number, zero while the seat
    /// is off or heating
    pub fn get_seat_cooling_level(&self, seats: BTreeSet<String>) -> ActionFuture<GetActionResult<i32>> {
        let future = self.category.execute_get_async::<i32>(SEAT_ACTION_GET_SEAT_COOLING, seats);
        Box::pin(async move { Ok(future.await?.map(negative_part)) })
    }

    /// Set a cooling level given as a positive number
    pub fn set_seat_cooling_level(&self, seats: BTreeSet<String>, level: i32) -> ActionFuture<SetActionResult> {
        if level < 0 {
            return rejected("seat cooling level must not be negative");
        }
        self.category.execute_set_async(SEAT_ACTION_SET_SEAT_COOLING, seats, -level)
    }

    pub fn get_target_temperature(
        &self,
        seats: BTreeSet<String>,
        unit: Option<TemperatureUnit>,
    ) -> ActionFuture<GetActionResult<Temperature>> {
        self.category
            .execute_get_temperature_async(SEAT_ACTION_GET_TARGET_TEMPERATURE, seats, unit)
    }

    pub fn set_target_temperature(&self, request: UpdateTargetTemperatureRequest) -> ActionFuture<SetActionResult> {
        self.category
            .execute_set_temperature_async(SEAT_ACTION_SET_TARGET_TEMPERATURE, request)
    }

    /// Raise the target temperature by a positive amount
    pub fn increment_target_temperature(
        &self,
        seats: BTreeSet<String>,
        amount: Temperature,
    ) -> ActionFuture<OffsetActionResult<Temperature>> {
        if amount.value <= 0.0 {
            return rejected("temperature increment must be positive");
        }
        let request = OffsetRequest::new(amount).with_elements(seats);
        self.category
            .execute_apply_offset_async(SEAT_ACTION_INCREMENT_TARGET_TEMPERATURE, request)
    }

    /// Lower the target temperature by a positive amount
    pub fn decrement_target_temperature(
        &self,
        seats: BTreeSet<String>,
        amount: Temperature,
    ) -> ActionFuture<OffsetActionResult<Temperature>> {
        if amount.value <= 0.0 {
            return rejected("temperature decrement must be positive");
        }
        let request = OffsetRequest::new(Temperature::new(-amount.value, amount.unit)).with_elements(seats);
        self.category
            .execute_apply_offset_async(SEAT_ACTION_DECREMENT_TARGET_TEMPERATURE, request)
    }
}
