//! Built-in door actions

use crate::builder::{with_zero, ActionBuilder};
use crate::category::{rejected, ActionCategory, ActionFuture};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::runtime::Handle;
use val_actions::ActionContext;
use val_compat::ids::*;
use val_compat::{PermissionChecker, PropertyManagerCompat};
use val_core::{ElementAreaMap, ErrorOr, GetActionResult, SetActionResult};

pub const DOORS_PERMISSION: &str = "android.car.permission.CONTROL_CAR_DOORS";

pub const DOOR_ACTION_IS_OPEN: &str = "DOOR_ACTION_IS_OPEN";
pub const DOOR_ACTION_CLOSE: &str = "DOOR_ACTION_CLOSE";
pub const DOOR_ACTION_GET_POSITION: &str = "DOOR_ACTION_GET_POSITION";
pub const DOOR_ACTION_SET_POSITION: &str = "DOOR_ACTION_SET_POSITION";
pub const DOOR_ACTION_IS_LOCKED: &str = "DOOR_ACTION_IS_LOCKED";
pub const DOOR_ACTION_LOCK: &str = "DOOR_ACTION_LOCK";
pub const DOOR_ACTION_UNLOCK: &str = "DOOR_ACTION_UNLOCK";
pub const DOOR_ACTION_IS_CHILD_LOCKED: &str = "DOOR_ACTION_IS_CHILD_LOCKED";
pub const DOOR_ACTION_ENABLE_CHILD_LOCK: &str = "DOOR_ACTION_ENABLE_CHILD_LOCK";
pub const DOOR_ACTION_DISABLE_CHILD_LOCK: &str = "DOOR_ACTION_DISABLE_CHILD_LOCK";

pub fn door_elements() -> ErrorOr<ElementAreaMap> {
    ElementAreaMap::new([
        ("DOOR_ROW_1_LEFT", DOOR_ROW_1_LEFT),
        ("DOOR_ROW_1_RIGHT", DOOR_ROW_1_RIGHT),
        ("DOOR_ROW_2_LEFT", DOOR_ROW_2_LEFT),
        ("DOOR_ROW_2_RIGHT", DOOR_ROW_2_RIGHT),
        ("DOOR_ROW_3_LEFT", DOOR_ROW_3_LEFT),
        ("DOOR_ROW_3_RIGHT", DOOR_ROW_3_RIGHT),
        ("DOOR_HOOD", DOOR_HOOD),
        ("DOOR_REAR", DOOR_REAR),
    ])
}

/// Door position, locks and child locks
pub struct DoorActions {
    category: ActionCategory,
}

impl DoorActions {
    pub fn new(
        compat: Arc<PropertyManagerCompat>,
        permissions: Arc<dyn PermissionChecker>,
        handle: Handle,
    ) -> ErrorOr<Self> {
        let doors = ActionBuilder {
            context: ActionContext::new(compat, permissions),
            elements: door_elements()?,
            permission: DOORS_PERMISSION,
        };

        let mut actions = vec![
            doors.get(DOOR_ACTION_IS_OPEN, DOOR_POS, with_zero())?,
            doors.set(DOOR_ACTION_CLOSE, DOOR_POS, with_zero())?,
            doors.get(DOOR_ACTION_GET_POSITION, DOOR_POS, with_zero())?,
            doors.set(DOOR_ACTION_SET_POSITION, DOOR_POS, with_zero())?,
        ];
        actions.extend(doors.toggles(
            DOOR_LOCK,
            [DOOR_ACTION_IS_LOCKED, DOOR_ACTION_LOCK, DOOR_ACTION_UNLOCK],
        )?);
        actions.extend(doors.toggles(
            DOOR_CHILD_LOCK_ENABLED,
            [
                DOOR_ACTION_IS_CHILD_LOCKED,
                DOOR_ACTION_ENABLE_CHILD_LOCK,
                DOOR_ACTION_DISABLE_CHILD_LOCK,
            ],
        )?);

        Ok(Self {
            category: ActionCategory::new("DOOR", actions, handle)?,
        })
    }

    pub fn category(&self) -> &ActionCategory {
        &self.category
    }

    pub fn get_supported_doors(&self, action: &str) -> ErrorOr<BTreeSet<String>> {
        self.category.get_supported_elements(action)
    }

    pub fn is_open(&self, doors: BTreeSet<String>) -> ActionFuture<GetActionResult<bool>> {
        let future = self.category.execute_get_async::<i32>(DOOR_ACTION_IS_OPEN, doors);
        Box::pin(async move { Ok(future.await?.map(|position| position != 0)) })
    }

    pub fn close(&self, doors: BTreeSet<String>) -> ActionFuture<SetActionResult> {
        self.category.execute_set_async(DOOR_ACTION_CLOSE, doors, 0)
    }

    pub fn get_position(&self, doors: BTreeSet<String>) -> ActionFuture<GetActionResult<i32>> {
        self.category.execute_get_async(DOOR_ACTION_GET_POSITION, doors)
    }

    /// Move each door to `position`, zero being closed
    pub fn set_position(&self, doors: BTreeSet<String>, position: i32) -> ActionFuture<SetActionResult> {
        if position < 0 {
            return rejected("door position must not be negative");
        }
        self.category.execute_set_async(DOOR_ACTION_SET_POSITION, doors, position)
    }

    pub fn is_locked(&self, doors: BTreeSet<String>) -> ActionFuture<GetActionResult<bool>> {
        self.category.execute_get_async(DOOR_ACTION_IS_LOCKED, doors)
    }

    pub fn set_locked(&self, doors: BTreeSet<String>, locked: bool) -> ActionFuture<SetActionResult> {
        let name = if locked { DOOR_ACTION_LOCK } else { DOOR_ACTION_UNLOCK };
        self.category.execute_set_async(name, doors, locked)
    }

    pub fn is_child_locked(&self, doors: BTreeSet<String>) -> ActionFuture<GetActionResult<bool>> {
        self.category.execute_get_async(DOOR_ACTION_IS_CHILD_LOCKED, doors)
    }

    pub fn set_child_lock(&self, doors: BTreeSet<String>, locked: bool) -> ActionFuture<SetActionResult> {
        let name = if locked {
            DOOR_ACTION_ENABLE_CHILD_LOCK
        } else {
            DOOR_ACTION_DISABLE_CHILD_LOCK
        };
        self.category.execute_set_async(name, doors, locked)
    }
}
