//! Built-in window actions
//!
//! `WINDOW_POS` is signed: positive positions open the window, negative
//! positions vent it and zero closes it. The open and vent actions each see
//! one side of that range and report it as a positive position.

use crate::builder::{negative_part, positive_part, with_zero, zero_or_greater, zero_or_less, ActionBuilder};
use crate::category::{rejected, ActionCategory, ActionFuture};
use crate::seat::CLIMATE_PERMISSION;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::runtime::Handle;
use val_actions::ActionContext;
use val_compat::ids::*;
use val_compat::{PermissionChecker, PropertyManagerCompat};
use val_core::{ElementAreaMap, ErrorOr, GetActionResult, SetActionResult, ValueRange};

pub const WINDOWS_PERMISSION: &str = "android.car.permission.CONTROL_CAR_WINDOWS";

pub const WINDOW_ACTION_IS_OPEN: &str = "WINDOW_ACTION_IS_OPEN";
pub const WINDOW_ACTION_CLOSE: &str = "WINDOW_ACTION_CLOSE";
pub const WINDOW_ACTION_GET_OPEN_POSITION: &str = "WINDOW_ACTION_GET_OPEN_POSITION";
pub const WINDOW_ACTION_SET_OPEN_POSITION: &str = "WINDOW_ACTION_SET_OPEN_POSITION";
pub const WINDOW_ACTION_GET_VENT_POSITION: &str = "WINDOW_ACTION_GET_VENT_POSITION";
pub const WINDOW_ACTION_SET_VENT_POSITION: &str = "WINDOW_ACTION_SET_VENT_POSITION";
pub const WINDOW_ACTION_IS_CHILD_LOCKED: &str = "WINDOW_ACTION_IS_CHILD_LOCKED";
pub const WINDOW_ACTION_ENABLE_CHILD_LOCK: &str = "WINDOW_ACTION_ENABLE_CHILD_LOCK";
pub const WINDOW_ACTION_DISABLE_CHILD_LOCK: &str = "WINDOW_ACTION_DISABLE_CHILD_LOCK";
pub const WINDOW_ACTION_IS_HVAC_DEFROSTER_ENABLED: &str = "WINDOW_ACTION_IS_HVAC_DEFROSTER_ENABLED";
pub const WINDOW_ACTION_ENABLE_HVAC_DEFROSTER: &str = "WINDOW_ACTION_ENABLE_HVAC_DEFROSTER";
pub const WINDOW_ACTION_DISABLE_HVAC_DEFROSTER: &str = "WINDOW_ACTION_DISABLE_HVAC_DEFROSTER";
pub const WINDOW_ACTION_IS_ELECTRIC_DEFROSTER_ENABLED: &str = "WINDOW_ACTION_IS_ELECTRIC_DEFROSTER_ENABLED";
pub const WINDOW_ACTION_ENABLE_ELECTRIC_DEFROSTER: &str = "WINDOW_ACTION_ENABLE_ELECTRIC_DEFROSTER";
pub const WINDOW_ACTION_DISABLE_ELECTRIC_DEFROSTER: &str = "WINDOW_ACTION_DISABLE_ELECTRIC_DEFROSTER";

pub fn window_elements() -> ErrorOr<ElementAreaMap> {
    ElementAreaMap::new([
        ("WINDOW_FRONT_WINDSHIELD", WINDOW_FRONT_WINDSHIELD),
        ("WINDOW_REAR_WINDSHIELD", WINDOW_REAR_WINDSHIELD),
        ("WINDOW_ROW_1_LEFT", WINDOW_ROW_1_LEFT),
        ("WINDOW_ROW_1_RIGHT", WINDOW_ROW_1_RIGHT),
        ("WINDOW_ROW_2_LEFT", WINDOW_ROW_2_LEFT),
        ("WINDOW_ROW_2_RIGHT", WINDOW_ROW_2_RIGHT),
        ("WINDOW_ROW_3_LEFT", WINDOW_ROW_3_LEFT),
        ("WINDOW_ROW_3_RIGHT", WINDOW_ROW_3_RIGHT),
        ("WINDOW_ROOF_TOP_1", WINDOW_ROOF_TOP_1),
        ("WINDOW_ROOF_TOP_2", WINDOW_ROOF_TOP_2),
    ])
}

/// Window position, child lock and defrosters
pub struct WindowActions {
    category: ActionCategory,
}

impl WindowActions {
    pub fn new(
        compat: Arc<PropertyManagerCompat>,
        permissions: Arc<dyn PermissionChecker>,
        handle: Handle,
    ) -> ErrorOr<Self> {
        let context = ActionContext::new(compat, permissions);
        let windows = ActionBuilder {
            context: context.clone(),
            elements: window_elements()?,
            permission: WINDOWS_PERMISSION,
        };
        let defrosters = ActionBuilder {
            context,
            elements: window_elements()?,
            permission: CLIMATE_PERMISSION,
        };

        let mut actions = vec![
            windows.get(WINDOW_ACTION_IS_OPEN, WINDOW_POS, with_zero())?,
            windows.set(WINDOW_ACTION_CLOSE, WINDOW_POS, with_zero())?,
            windows.get(WINDOW_ACTION_GET_OPEN_POSITION, WINDOW_POS, zero_or_greater())?,
            windows.set(WINDOW_ACTION_SET_OPEN_POSITION, WINDOW_POS, zero_or_greater())?,
            windows.get(WINDOW_ACTION_GET_VENT_POSITION, WINDOW_POS, zero_or_less())?,
            windows.set(WINDOW_ACTION_SET_VENT_POSITION, WINDOW_POS, zero_or_less())?,
        ];
        actions.extend(windows.toggles(
            WINDOW_LOCK,
            [
                WINDOW_ACTION_IS_CHILD_LOCKED,
                WINDOW_ACTION_ENABLE_CHILD_LOCK,
                WINDOW_ACTION_DISABLE_CHILD_LOCK,
            ],
        )?);
        actions.extend(defrosters.toggles(
            HVAC_DEFROSTER,
            [
                WINDOW_ACTION_IS_HVAC_DEFROSTER_ENABLED,
                WINDOW_ACTION_ENABLE_HVAC_DEFROSTER,
                WINDOW_ACTION_DISABLE_HVAC_DEFROSTER,
            ],
        )?);
        actions.extend(defrosters.toggles(
            HVAC_ELECTRIC_DEFROSTER_ON,
            [
                WINDOW_ACTION_IS_ELECTRIC_DEFROSTER_ENABLED,
                WINDOW_ACTION_ENABLE_ELECTRIC_DEFROSTER,
                WINDOW_ACTION_DISABLE_ELECTRIC_DEFROSTER,
            ],
        )?);

        Ok(Self {
            category: ActionCategory::new("WINDOW", actions, handle)?,
        })
    }

    pub fn category(&self) -> &ActionCategory {
        &self.category
    }

    pub fn get_supported_windows(&self, action: &str) -> ErrorOr<BTreeSet<String>> {
        self.category.get_supported_elements(action)
    }

    pub fn get_window_to_value_range_map(&self, action: &str) -> ErrorOr<BTreeMap<String, ValueRange<i32>>> {
        self.category.get_element_to_value_range_map(action)
    }

    /// Whether each window is open, vented counting as open
    pub fn is_open(&self, windows: BTreeSet<String>) -> ActionFuture<GetActionResult<bool>> {
        let future = self.category.execute_get_async::<i32>(WINDOW_ACTION_IS_OPEN, windows);
        Box::pin(async move { Ok(future.await?.map(|position| position != 0)) })
    }

    /// Close each window whether it is open or vented
    pub fn close(&self, windows: BTreeSet<String>) -> ActionFuture<SetActionResult> {
        self.category.execute_set_async(WINDOW_ACTION_CLOSE, windows, 0)
    }

    /// Open position of each window, zero while closed or vented
    pub fn get_open_position(&self, windows: BTreeSet<String>) -> ActionFuture<GetActionResult<i32>> {
        let future = self.category.execute_get_async::<i32>(WINDOW_ACTION_GET_OPEN_POSITION, windows);
        Box::pin(async move { Ok(future.await?.map(positive_part)) })
    }

    pub fn set_open_position(&self, windows: BTreeSet<String>, position: i32) -> ActionFuture<SetActionResult> {
        if position < 0 {
            return rejected("window open position must not be negative");
        }
        self.category.execute_set_async(WINDOW_ACTION_SET_OPEN_POSITION, windows, position)
    }

    /// Vent position of each window as a positive number, zero while closed
    /// or open
    pub fn get_vent_position(&self, windows: BTreeSet<String>) -> ActionFuture<GetActionResult<i32>> {
        let future = self.category.execute_get_async::<i32>(WINDOW_ACTION_GET_VENT_POSITION, windows);
        Box::pin(async move { Ok(future.await?.map(negative_part)) })
    }

    pub fn set_vent_position(&self, windows: BTreeSet<String>, position: i32) -> ActionFuture<SetActionResult> {
        if position < 0 {
            return rejected("window vent position must not be negative");
        }
        self.category.execute_set_async(WINDOW_ACTION_SET_VENT_POSITION, windows, -position)
    }

    pub fn is_child_locked(&self, windows: BTreeSet<String>) -> ActionFuture<GetActionResult<bool>> {
        self.category.execute_get_async(WINDOW_ACTION_IS_CHILD_LOCKED, windows)
    }

    pub fn set_child_lock(&self, windows: BTreeSet<String>, locked: bool) -> ActionFuture<SetActionResult> {
        let name = if locked {
            WINDOW_ACTION_ENABLE_CHILD_LOCK
        } else {
            WINDOW_ACTION_DISABLE_CHILD_LOCK
        };
        self.category.execute_set_async(name, windows, locked)
    }

    pub fn is_hvac_defroster_enabled(&self, windows: BTreeSet<String>) -> ActionFuture<GetActionResult<bool>> {
        self.category.execute_get_async(WINDOW_ACTION_IS_HVAC_DEFROSTER_ENABLED, windows)
    }

    pub fn set_hvac_defroster(&self, windows: BTreeSet<String>, on: bool) -> ActionFuture<SetActionResult> {
        let name = if on {
            WINDOW_ACTION_ENABLE_HVAC_DEFROSTER
        } else {
            WINDOW_ACTION_DISABLE_HVAC_DEFROSTER
        };
        self.category.execute_set_async(name, windows, on)
    }

    pub fn is_electric_defroster_enabled(&self, windows: BTreeSet<String>) -> ActionFuture<GetActionResult<bool>> {
        self.category.execute_get_async(WINDOW_ACTION_IS_ELECTRIC_DEFROSTER_ENABLED, windows)
    }

    pub fn set_electric_defroster(&self, windows: BTreeSet<String>, on: bool) -> ActionFuture<SetActionResult> {
        let name = if on {
            WINDOW_ACTION_ENABLE_ELECTRIC_DEFROSTER
        } else {
            WINDOW_ACTION_DISABLE_ELECTRIC_DEFROSTER
        };
        self.category.execute_set_async(name, windows, on)
    }
}
