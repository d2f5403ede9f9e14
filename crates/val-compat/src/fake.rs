//! In-memory vehicle for tests and demos

use crate::hal::{
    HalError, PropertyAccess, PropertyStatus, RawAreaConfig, RawPropertyConfig, RawPropertyValue,
    VehicleHal,
};
use crate::ids::*;
use dashmap::{DashMap, DashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::trace;
use val_core::{PropertyValue, ValueType};

type Key = (i32, i32);

/// A `VehicleHal` backed by maps
///
/// Values written are stored and read back unless the area was told to
/// ignore writes. Errors can be injected per property and area. Every read,
/// write and config lookup is counted.
#[derive(Default)]
pub struct FakeVehicle {
    configs: DashMap<i32, Vec<RawPropertyConfig>>,
    values: DashMap<Key, RawPropertyValue>,
    config_errors: DashMap<i32, HalError>,
    get_errors: DashMap<Key, HalError>,
    set_errors: DashMap<Key, HalError>,
    ignored_writes: DashSet<Key>,
    reads: DashMap<Key, usize>,
    writes: DashMap<Key, usize>,
    config_lookups: AtomicUsize,
}

impl FakeVehicle {
    pub fn new() -> Self {
        Self::default()
    }

    /// A two-zone climate system
    ///
    /// HVAC power covers the zones `0x11` (row 1 and 2 left) and `0x44`
    /// (row 1 and 2 right) and gates AC, recirculation, auto mode, fan speed
    /// and target temperature. Seat heating/cooling lives on the front seats
    /// and does not depend on HVAC power. Power is on, display units are
    /// Celsius, the target temperature is 20°C in both zones.
    pub fn climate() -> Self {
        let fake = Self::new();
        let zones = [0x11, 0x44];

        fake.add_property(
            RawPropertyConfig::new(HVAC_POWER_ON, ValueType::Bool, PropertyAccess::ReadWrite)
                .with_areas(zones.map(RawAreaConfig::new))
                .with_config_array(vec![
                    HVAC_AC_ON,
                    HVAC_RECIRC_ON,
                    HVAC_AUTO_ON,
                    HVAC_FAN_SPEED,
                    HVAC_TEMPERATURE_SET,
                ]),
        );
        for property_id in [HVAC_AC_ON, HVAC_RECIRC_ON, HVAC_AUTO_ON] {
            fake.add_property(
                RawPropertyConfig::new(property_id, ValueType::Bool, PropertyAccess::ReadWrite)
                    .with_areas(zones.map(RawAreaConfig::new)),
            );
        }
        fake.add_property(
            RawPropertyConfig::new(HVAC_FAN_SPEED, ValueType::Int, PropertyAccess::ReadWrite)
                .with_areas(zones.map(|zone| {
                    RawAreaConfig::new(zone).with_range(PropertyValue::Int(1), PropertyValue::Int(6))
                })),
        );
        fake.add_property(
            RawPropertyConfig::new(HVAC_TEMPERATURE_SET, ValueType::Float, PropertyAccess::ReadWrite)
                .with_areas(zones.map(|zone| {
                    RawAreaConfig::new(zone)
                        .with_range(PropertyValue::Float(16.0), PropertyValue::Float(28.0))
                }))
                .with_config_array(vec![160, 280, 5, 600, 840, 10]),
        );
        fake.add_property(
            RawPropertyConfig::new(HVAC_SEAT_TEMPERATURE, ValueType::Int, PropertyAccess::ReadWrite)
                .with_areas([SEAT_ROW_1_LEFT, SEAT_ROW_1_RIGHT].map(|seat| {
                    RawAreaConfig::new(seat).with_range(PropertyValue::Int(-3), PropertyValue::Int(3))
                })),
        );
        fake.add_property(
            RawPropertyConfig::new(
                HVAC_TEMPERATURE_DISPLAY_UNITS,
                ValueType::Int,
                PropertyAccess::ReadWrite,
            )
            .with_areas([RawAreaConfig::new(0)]),
        );

        for zone in zones {
            fake.set_value(HVAC_POWER_ON, zone, PropertyValue::Bool(true));
            fake.set_value(HVAC_AC_ON, zone, PropertyValue::Bool(false));
            fake.set_value(HVAC_RECIRC_ON, zone, PropertyValue::Bool(false));
            fake.set_value(HVAC_AUTO_ON, zone, PropertyValue::Bool(false));
            fake.set_value(HVAC_FAN_SPEED, zone, PropertyValue::Int(1));
            fake.set_value(HVAC_TEMPERATURE_SET, zone, PropertyValue::Float(20.0));
        }
        for seat in [SEAT_ROW_1_LEFT, SEAT_ROW_1_RIGHT] {
            fake.set_value(HVAC_SEAT_TEMPERATURE, seat, PropertyValue::Int(0));
        }
        fake.set_value(HVAC_TEMPERATURE_DISPLAY_UNITS, 0, PropertyValue::Int(VEHICLE_UNIT_CELSIUS));
        fake
    }

    /// Windows, doors and the steering wheel
    ///
    /// Front windows open to 10 and vent to -5, rear windows only open.
    /// Rear windows carry the child lock. The windshields have the HVAC
    /// defroster and the rear one also an electric defroster. Four doors
    /// open to 10 and lock, and the rear doors carry the child lock. The
    /// steering wheel heats to 3 and cools to -2. Everything starts closed,
    /// unlocked and off.
    pub fn body() -> Self {
        let fake = Self::new();
        fake.install_body();
        fake
    }

    /// `climate` and `body` together
    pub fn full() -> Self {
        let fake = Self::climate();
        fake.install_body();
        fake
    }

    fn install_body(&self) {
        let front = [WINDOW_ROW_1_LEFT, WINDOW_ROW_1_RIGHT];
        let rear = [WINDOW_ROW_2_LEFT, WINDOW_ROW_2_RIGHT];
        let windshields = [WINDOW_FRONT_WINDSHIELD, WINDOW_REAR_WINDSHIELD];
        let window_range = |window: i32, min: i32| {
            RawAreaConfig::new(window).with_range(PropertyValue::Int(min), PropertyValue::Int(10))
        };
        self.add_property(
            RawPropertyConfig::new(WINDOW_POS, ValueType::Int, PropertyAccess::ReadWrite).with_areas(
                front
                    .map(|window| window_range(window, -5))
                    .into_iter()
                    .chain(rear.map(|window| window_range(window, 0))),
            ),
        );
        self.add_bool(WINDOW_LOCK, &rear);
        self.add_bool(HVAC_DEFROSTER, &windshields);
        self.add_bool(HVAC_ELECTRIC_DEFROSTER_ON, &[WINDOW_REAR_WINDSHIELD]);
        for window in front.into_iter().chain(rear) {
            self.set_value(WINDOW_POS, window, PropertyValue::Int(0));
        }

        let doors = [DOOR_ROW_1_LEFT, DOOR_ROW_1_RIGHT, DOOR_ROW_2_LEFT, DOOR_ROW_2_RIGHT];
        self.add_property(
            RawPropertyConfig::new(DOOR_POS, ValueType::Int, PropertyAccess::ReadWrite).with_areas(
                doors.map(|door| {
                    RawAreaConfig::new(door).with_range(PropertyValue::Int(0), PropertyValue::Int(10))
                }),
            ),
        );
        self.add_bool(DOOR_LOCK, &doors);
        self.add_bool(DOOR_CHILD_LOCK_ENABLED, &[DOOR_ROW_2_LEFT, DOOR_ROW_2_RIGHT]);
        for door in doors {
            self.set_value(DOOR_POS, door, PropertyValue::Int(0));
        }

        self.add_property(
            RawPropertyConfig::new(HVAC_STEERING_WHEEL_HEAT, ValueType::Int, PropertyAccess::ReadWrite)
                .with_areas([RawAreaConfig::new(0).with_range(PropertyValue::Int(-2), PropertyValue::Int(3))]),
        );
        self.set_value(HVAC_STEERING_WHEEL_HEAT, 0, PropertyValue::Int(0));
    }

    fn add_bool(&self, property_id: i32, areas: &[i32]) {
        self.add_property(
            RawPropertyConfig::new(property_id, ValueType::Bool, PropertyAccess::ReadWrite)
                .with_areas(areas.iter().map(|area| RawAreaConfig::new(*area))),
        );
        for area in areas {
            self.set_value(property_id, *area, PropertyValue::Bool(false));
        }
    }

    /// Register a config, replacing any earlier one for the same property
    pub fn add_property(&self, config: RawPropertyConfig) {
        self.configs.insert(config.property_id, vec![config]);
    }

    /// Register several configs for one property, valid or not
    pub fn set_configs(&self, property_id: i32, configs: Vec<RawPropertyConfig>) {
        self.configs.insert(property_id, configs);
    }

    pub fn remove_property(&self, property_id: i32) {
        self.configs.remove(&property_id);
    }

    pub fn set_value(&self, property_id: i32, area_id: i32, value: PropertyValue) {
        self.values.insert(
            (property_id, area_id),
            RawPropertyValue {
                property_id,
                area_id,
                status: PropertyStatus::Available,
                value: Some(value),
            },
        );
    }

    pub fn set_status(&self, property_id: i32, area_id: i32, status: PropertyStatus) {
        if let Some(mut raw) = self.values.get_mut(&(property_id, area_id)) {
            raw.status = status;
        }
    }

    pub fn value(&self, property_id: i32, area_id: i32) -> Option<PropertyValue> {
        self.values
            .get(&(property_id, area_id))
            .and_then(|raw| raw.value.clone())
    }

    pub fn fail_config(&self, property_id: i32, err: HalError) {
        self.config_errors.insert(property_id, err);
    }

    pub fn clear_config_failure(&self, property_id: i32) {
        self.config_errors.remove(&property_id);
    }

    pub fn fail_get(&self, property_id: i32, area_id: i32, err: HalError) {
        self.get_errors.insert((property_id, area_id), err);
    }

    pub fn fail_set(&self, property_id: i32, area_id: i32, err: HalError) {
        self.set_errors.insert((property_id, area_id), err);
    }

    /// Accept writes to the area without changing its value
    pub fn ignore_writes(&self, property_id: i32, area_id: i32) {
        self.ignored_writes.insert((property_id, area_id));
    }

    pub fn read_count(&self, property_id: i32, area_id: i32) -> usize {
        self.reads.get(&(property_id, area_id)).map(|n| *n).unwrap_or(0)
    }

    pub fn write_count(&self, property_id: i32, area_id: i32) -> usize {
        self.writes.get(&(property_id, area_id)).map(|n| *n).unwrap_or(0)
    }

    pub fn total_writes(&self) -> usize {
        self.writes.iter().map(|entry| *entry.value()).sum()
    }

    /// Number of HAL calls of any kind
    pub fn total_calls(&self) -> usize {
        self.config_lookups()
            + self.reads.iter().map(|entry| *entry.value()).sum::<usize>()
            + self.total_writes()
    }

    pub fn config_lookups(&self) -> usize {
        self.config_lookups.load(Ordering::SeqCst)
    }
}

impl VehicleHal for FakeVehicle {
    fn property_list(&self, property_id: i32) -> Result<Vec<RawPropertyConfig>, HalError> {
        self.config_lookups.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.config_errors.get(&property_id) {
            return Err(err.clone());
        }
        Ok(self
            .configs
            .get(&property_id)
            .map(|configs| configs.clone())
            .unwrap_or_default())
    }

    fn get_property(&self, property_id: i32, area_id: i32) -> Result<RawPropertyValue, HalError> {
        let key = (property_id, area_id);
        *self.reads.entry(key).or_insert(0) += 1;

        if let Some(err) = self.get_errors.get(&key) {
            return Err(err.clone());
        }
        self.values
            .get(&key)
            .map(|raw| raw.clone())
            .ok_or(HalError::NotAvailable)
    }

    fn set_property(
        &self,
        property_id: i32,
        area_id: i32,
        value: &PropertyValue,
    ) -> Result<(), HalError> {
        let key = (property_id, area_id);
        *self.writes.entry(key).or_insert(0) += 1;

        if let Some(err) = self.set_errors.get(&key) {
            return Err(err.clone());
        }
        if self.ignored_writes.contains(&key) {
            trace!(property = %property_name(property_id), area_id = area_id, "Write ignored");
            return Ok(());
        }
        self.set_value(property_id, area_id, value.clone());
        Ok(())
    }
}
