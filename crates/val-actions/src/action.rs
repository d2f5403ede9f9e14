//! The closed set of action kinds
//!
//! A registry stores differently typed actions side by side. `Action` names
//! every capability and value type a registry can hold, so dispatch is an
//! exhaustive match instead of a runtime downcast.

use crate::base::{ActionCore, ActionInfo};
use crate::get::GetAction;
use crate::offset::OffsetAction;
use crate::set::SetAction;
use crate::temperature::{
    HvacTargetTemperatureGetAction, HvacTargetTemperatureOffsetAction, HvacTargetTemperatureSetAction,
};
use std::collections::BTreeSet;
use std::fmt;
use val_core::{
    ActionValue, ErrorCode, ErrorOr, GetActionResult, OffsetActionResult, OffsetAmount,
    OffsetRequest, SetActionResult, Temperature, TemperatureUnit, UpdateTargetTemperatureRequest,
};

/// What an action does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Get,
    Set,
    Offset,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Get => "get",
            Capability::Set => "set",
            Capability::Offset => "offset",
        };
        f.write_str(name)
    }
}

pub enum GetActionKind {
    Bool(GetAction<bool>),
    Int(GetAction<i32>),
    Float(GetAction<f32>),
    Temperature(HvacTargetTemperatureGetAction),
}

pub enum SetActionKind {
    Bool(SetAction<bool>),
    Int(SetAction<i32>),
    Float(SetAction<f32>),
    Temperature(HvacTargetTemperatureSetAction),
}

pub enum OffsetActionKind {
    Int(OffsetAction<i32>),
    Float(OffsetAction<f32>),
    Temperature(HvacTargetTemperatureOffsetAction),
}

pub enum Action {
    Get(GetActionKind),
    Set(SetActionKind),
    Offset(OffsetActionKind),
}

impl Action {
    pub fn name(&self) -> &str {
        self.info().name()
    }

    pub fn capability(&self) -> Capability {
        match self {
            Action::Get(_) => Capability::Get,
            Action::Set(_) => Capability::Set,
            Action::Offset(_) => Capability::Offset,
        }
    }

    /// Type-erased queries over the action
    pub fn info(&self) -> &dyn ActionInfo {
        match self {
            Action::Get(GetActionKind::Bool(action)) => action.core(),
            Action::Get(GetActionKind::Int(action)) => action.core(),
            Action::Get(GetActionKind::Float(action)) => action.core(),
            Action::Get(GetActionKind::Temperature(action)) => action.core(),
            Action::Set(SetActionKind::Bool(action)) => action.core(),
            Action::Set(SetActionKind::Int(action)) => action.core(),
            Action::Set(SetActionKind::Float(action)) => action.core(),
            Action::Set(SetActionKind::Temperature(action)) => action.core(),
            Action::Offset(OffsetActionKind::Int(action)) => action.core(),
            Action::Offset(OffsetActionKind::Float(action)) => action.core(),
            Action::Offset(OffsetActionKind::Temperature(action)) => action.core(),
        }
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("name", &self.name())
            .field("capability", &self.capability())
            .field("value_type", &self.info().value_type())
            .finish()
    }
}

impl GetActionKind {
    /// Target temperatures, only for temperature actions
    pub fn get_temperature(
        &self,
        elements: &BTreeSet<String>,
        unit: Option<TemperatureUnit>,
    ) -> ErrorOr<GetActionResult<Temperature>> {
        match self {
            GetActionKind::Temperature(action) => action.get_temperature(elements, unit),
            _ => Err(ErrorCode::BadValImpl),
        }
    }
}

impl SetActionKind {
    /// Set target temperatures, only for temperature actions
    pub fn set_temperature(&self, request: &UpdateTargetTemperatureRequest) -> ErrorOr<SetActionResult> {
        match self {
            SetActionKind::Temperature(action) => action.set_temperature(request),
            _ => Err(ErrorCode::BadValImpl),
        }
    }
}

impl OffsetActionKind {
    pub fn core_info(&self) -> &dyn ActionInfo {
        match self {
            OffsetActionKind::Int(action) => action.core(),
            OffsetActionKind::Float(action) => action.core(),
            OffsetActionKind::Temperature(action) => action.core(),
        }
    }

    /// Apply an offset whose kind must match the action
    ///
    /// Elements are validated before the kind, so a bad request reports the
    /// caller's mistake rather than the mismatch.
    pub fn apply_offset(
        &self,
        request: OffsetRequest<OffsetAmount>,
    ) -> ErrorOr<OffsetActionResult<OffsetAmount>> {
        let OffsetRequest {
            offset,
            elements,
            round_to_nearest_supported_value,
        } = request;

        match (self, offset) {
            (OffsetActionKind::Int(action), OffsetAmount::Int(offset)) => {
                let request = OffsetRequest {
                    offset,
                    elements,
                    round_to_nearest_supported_value,
                };
                Ok(action.apply_offset(&request)?.map(OffsetAmount::Int))
            }
            (OffsetActionKind::Float(action), OffsetAmount::Float(offset)) => {
                let request = OffsetRequest {
                    offset,
                    elements,
                    round_to_nearest_supported_value,
                };
                Ok(action.apply_offset(&request)?.map(OffsetAmount::Float))
            }
            (OffsetActionKind::Temperature(action), OffsetAmount::Temperature(offset)) => {
                let request = OffsetRequest {
                    offset,
                    elements,
                    round_to_nearest_supported_value,
                };
                Ok(action.apply_offset(&request)?.map(OffsetAmount::Temperature))
            }
            _ => match self.core_info().check_are_elements_supported(&elements) {
                Some(err) => Err(err),
                None => Err(ErrorCode::BadValImpl),
            },
        }
    }
}

/// Values a registry can dispatch typed gets and sets for
///
/// Temperature actions expose their raw Celsius values as `f32`.
pub trait DispatchValue: ActionValue {
    fn core_of(action: &Action) -> Option<&ActionCore<Self>>;
    fn get_action(kind: &GetActionKind) -> Option<&GetAction<Self>>;
    fn set_action(kind: &SetActionKind) -> Option<&SetAction<Self>>;
    fn get_kind(action: GetAction<Self>) -> GetActionKind;
    fn set_kind(action: SetAction<Self>) -> SetActionKind;
}

impl DispatchValue for bool {
    fn core_of(action: &Action) -> Option<&ActionCore<Self>> {
        match action {
            Action::Get(kind) => Self::get_action(kind).map(GetAction::core),
            Action::Set(kind) => Self::set_action(kind).map(SetAction::core),
            Action::Offset(_) => None,
        }
    }

    fn get_action(kind: &GetActionKind) -> Option<&GetAction<Self>> {
        match kind {
            GetActionKind::Bool(action) => Some(action),
            _ => None,
        }
    }

    fn set_action(kind: &SetActionKind) -> Option<&SetAction<Self>> {
        match kind {
            SetActionKind::Bool(action) => Some(action),
            _ => None,
        }
    }

    fn get_kind(action: GetAction<Self>) -> GetActionKind {
        GetActionKind::Bool(action)
    }

    fn set_kind(action: SetAction<Self>) -> SetActionKind {
        SetActionKind::Bool(action)
    }
}

impl DispatchValue for i32 {
    fn core_of(action: &Action) -> Option<&ActionCore<Self>> {
        match action {
            Action::Get(kind) => Self::get_action(kind).map(GetAction::core),
            Action::Set(kind) => Self::set_action(kind).map(SetAction::core),
            Action::Offset(OffsetActionKind::Int(action)) => Some(action.core()),
            Action::Offset(_) => None,
        }
    }

    fn get_action(kind: &GetActionKind) -> Option<&GetAction<Self>> {
        match kind {
            GetActionKind::Int(action) => Some(action),
            _ => None,
        }
    }

    fn set_action(kind: &SetActionKind) -> Option<&SetAction<Self>> {
        match kind {
            SetActionKind::Int(action) => Some(action),
            _ => None,
        }
    }

    fn get_kind(action: GetAction<Self>) -> GetActionKind {
        GetActionKind::Int(action)
    }

    fn set_kind(action: SetAction<Self>) -> SetActionKind {
        SetActionKind::Int(action)
    }
}

impl DispatchValue for f32 {
    fn core_of(action: &Action) -> Option<&ActionCore<Self>> {
        match action {
            Action::Get(kind) => Self::get_action(kind).map(GetAction::core),
            Action::Set(kind) => Self::set_action(kind).map(SetAction::core),
            Action::Offset(OffsetActionKind::Float(action)) => Some(action.core()),
            Action::Offset(OffsetActionKind::Temperature(action)) => Some(action.core()),
            Action::Offset(OffsetActionKind::Int(_)) => None,
        }
    }

    fn get_action(kind: &GetActionKind) -> Option<&GetAction<Self>> {
        match kind {
            GetActionKind::Float(action) => Some(action),
            GetActionKind::Temperature(action) => Some(action.raw()),
            _ => None,
        }
    }

    fn set_action(kind: &SetActionKind) -> Option<&SetAction<Self>> {
        match kind {
            SetActionKind::Float(action) => Some(action),
            SetActionKind::Temperature(action) => Some(action.raw()),
            _ => None,
        }
    }

    fn get_kind(action: GetAction<Self>) -> GetActionKind {
        GetActionKind::Float(action)
    }

    fn set_kind(action: SetAction<Self>) -> SetActionKind {
        SetActionKind::Float(action)
    }
}
