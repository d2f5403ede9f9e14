//! Every built-in category behind one entry point

use crate::category::ActionCategory;
use crate::door::DoorActions;
use crate::seat::{SeatActions, SeatActionsConfig};
use crate::steering_wheel::SteeringWheelActions;
use crate::window::WindowActions;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, info};
use val_compat::{PermissionChecker, PropertyManagerCompat};
use val_core::ErrorOr;

#[derive(Debug, Clone, Default)]
pub struct VehicleActionsConfig {
    pub seat: SeatActionsConfig,
}

/// The seat, window, door and steering wheel categories over one vehicle
pub struct VehicleActions {
    seat: SeatActions,
    window: WindowActions,
    door: DoorActions,
    steering_wheel: SteeringWheelActions,
}

impl VehicleActions {
    pub fn new(
        compat: Arc<PropertyManagerCompat>,
        permissions: Arc<dyn PermissionChecker>,
        handle: Handle,
        config: VehicleActionsConfig,
    ) -> ErrorOr<Self> {
        let actions = Self {
            seat: SeatActions::new(compat.clone(), permissions.clone(), handle.clone(), config.seat)?,
            window: WindowActions::new(compat.clone(), permissions.clone(), handle.clone())?,
            door: DoorActions::new(compat.clone(), permissions.clone(), handle.clone())?,
            steering_wheel: SteeringWheelActions::new(compat, permissions, handle)?,
        };
        info!(
            categories = ?actions.categories().map(ActionCategory::name).collect::<Vec<_>>(),
            "Vehicle actions ready"
        );
        Ok(actions)
    }

    pub fn seat(&self) -> &SeatActions {
        &self.seat
    }

    pub fn window(&self) -> &WindowActions {
        &self.window
    }

    pub fn door(&self) -> &DoorActions {
        &self.door
    }

    pub fn steering_wheel(&self) -> &SteeringWheelActions {
        &self.steering_wheel
    }

    pub fn categories(&self) -> impl Iterator<Item = &ActionCategory> {
        [
            self.seat.category(),
            self.window.category(),
            self.door.category(),
            self.steering_wheel.category(),
        ]
        .into_iter()
    }

    pub fn category(&self, name: &str) -> Option<&ActionCategory> {
        self.categories().find(|category| category.name() == name)
    }

    /// Names of the actions this vehicle supports, per category
    ///
    /// Actions whose support check fails are left out. Categories with no
    /// supported action are omitted.
    pub fn supported_actions(&self) -> BTreeMap<String, BTreeSet<String>> {
        let mut supported = BTreeMap::new();
        for category in self.categories() {
            let names: BTreeSet<String> = category
                .action_names()
                .into_iter()
                .filter(|name| match category.is_action_supported(name) {
                    Ok(is_supported) => is_supported,
                    Err(err) => {
                        debug!(category = %category.name(), action = %name, error = %err, "Support check failed");
                        false
                    }
                })
                .collect();
            if !names.is_empty() {
                supported.insert(category.name().to_string(), names);
            }
        }
        supported
    }
}
