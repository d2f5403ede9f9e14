//! HVAC power dependency resolution
//!
//! Many climate properties can only change while HVAC power is on for the
//! zone. The platform lists those properties in the `HVAC_POWER_ON` config
//! array. Before a dependent action touches its property it partitions the
//! requested seats by power state and, when allowed, turns power on first.

use crate::cache::publish_once;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};
use val_compat::ids::{property_name, HVAC_POWER_ON};
use val_compat::PropertyManagerCompat;
use val_core::{ElementAreaMap, ErrorCode, ErrorOr, PropertyValue};

/// Outcome of resolving HVAC power for one call
///
/// `error_code` aborts the call. Otherwise the action runs on
/// `seats_to_update` and reports `seat_to_error_code` for the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HvacPowerState {
    pub error_code: Option<ErrorCode>,
    pub seats_that_enabled_hvac_power: BTreeSet<String>,
    pub seats_to_update: BTreeSet<String>,
    pub seat_to_error_code: BTreeMap<String, ErrorCode>,
}

impl HvacPowerState {
    fn failed(error_code: ErrorCode) -> Self {
        Self {
            error_code: Some(error_code),
            ..Default::default()
        }
    }
}

/// HVAC power handling for one action
pub struct HvacPowerUtils {
    compat: Arc<PropertyManagerCompat>,
    property_id: i32,
    seat_to_area: ElementAreaMap,
    enable_hvac_power_if_dependent: bool,
    is_dependent: OnceLock<ErrorOr<bool>>,
}

impl HvacPowerUtils {
    /// `HVAC_POWER_ON` itself cannot depend on HVAC power
    pub fn new(
        compat: Arc<PropertyManagerCompat>,
        property_id: i32,
        seat_to_area: ElementAreaMap,
        enable_hvac_power_if_dependent: bool,
    ) -> ErrorOr<Self> {
        if property_id == HVAC_POWER_ON || seat_to_area.is_empty() {
            return Err(ErrorCode::BadValImpl);
        }
        Ok(Self {
            compat,
            property_id,
            seat_to_area,
            enable_hvac_power_if_dependent,
            is_dependent: OnceLock::new(),
        })
    }

    pub fn enable_hvac_power_if_dependent(&self) -> bool {
        self.enable_hvac_power_if_dependent
    }

    /// Whether the property is gated by HVAC power on this vehicle
    ///
    /// Computed once and cached, errors included.
    pub fn is_hvac_power_dependent(&self) -> ErrorOr<bool> {
        *publish_once(&self.is_dependent, || self.determine_is_hvac_power_dependent())
    }

    fn determine_is_hvac_power_dependent(&self) -> ErrorOr<bool> {
        if !self.compat.is_property_supported(HVAC_POWER_ON)? {
            return Ok(false);
        }
        let hvac_config = self.compat.get_config(HVAC_POWER_ON)?;
        if !hvac_config.config_array.contains(&self.property_id) {
            return Ok(false);
        }

        let config = self.compat.get_config(self.property_id)?;
        if let Some(area_id) = config
            .area_ids()
            .find(|area_id| hvac_config.get_area_id(*area_id).is_err())
        {
            warn!(
                property = %property_name(self.property_id),
                area_id = area_id,
                "Area is not covered by any HVAC power area"
            );
            return Err(ErrorCode::BadPlatformImpl);
        }

        debug!(property = %property_name(self.property_id), "Property depends on HVAC power");
        Ok(true)
    }

    /// Partition `seats` by HVAC power, enabling power where allowed
    pub fn compute_hvac_power_state(&self, seats: &BTreeSet<String>) -> HvacPowerState {
        match self.is_hvac_power_dependent() {
            Err(err) => return HvacPowerState::failed(err),
            Ok(false) => {
                return HvacPowerState {
                    seats_to_update: seats.clone(),
                    ..Default::default()
                }
            }
            Ok(true) => {}
        }

        let mut state = HvacPowerState::default();
        if seats.is_empty() {
            return state;
        }

        let areas = match self.seat_to_area.get_areas(seats) {
            Ok(areas) => areas,
            Err(err) => return HvacPowerState::failed(err),
        };
        let power = match self.compat.get_values(HVAC_POWER_ON, &areas) {
            Ok(power) => power,
            Err(err) => return HvacPowerState::failed(err),
        };

        let mut powered_off = BTreeSet::new();
        for (area, record) in power {
            let Some(seat) = self.seat_to_area.element_for_area(area) else {
                continue;
            };
            match record.map(|record| record.value) {
                Err(err) => {
                    state.seat_to_error_code.insert(seat.to_string(), err);
                }
                Ok(PropertyValue::Bool(true)) => {
                    state.seats_to_update.insert(seat.to_string());
                }
                Ok(PropertyValue::Bool(false)) => {
                    powered_off.insert(seat.to_string());
                }
                Ok(other) => {
                    warn!(seat = %seat, value = %other, "HVAC power is not a boolean");
                    state.seat_to_error_code.insert(seat.to_string(), ErrorCode::BadPlatformImpl);
                }
            }
        }

        if !self.enable_hvac_power_if_dependent {
            for seat in powered_off {
                state.seat_to_error_code.insert(seat, ErrorCode::HvacPowerIsDisabled);
            }
            return state;
        }
        self.enable_hvac_power(powered_off, state)
    }

    fn enable_hvac_power(&self, seats: BTreeSet<String>, mut state: HvacPowerState) -> HvacPowerState {
        if seats.is_empty() {
            return state;
        }
        debug!(
            property = %property_name(self.property_id),
            seats = ?seats,
            "Enabling HVAC power"
        );

        let areas = match self.seat_to_area.get_areas(&seats) {
            Ok(areas) => areas,
            Err(err) => return HvacPowerState::failed(err),
        };
        let updated = match self.compat.set_value_with_confirmation(
            HVAC_POWER_ON,
            &areas,
            &PropertyValue::Bool(true),
        ) {
            Ok(updated) => updated,
            Err(err) => return HvacPowerState::failed(err),
        };

        for (area, record) in updated {
            let Some(seat) = self.seat_to_area.element_for_area(area) else {
                continue;
            };
            match record.map(|record| record.value) {
                Err(err) => {
                    state.seat_to_error_code.insert(seat.to_string(), err);
                }
                Ok(PropertyValue::Bool(true)) => {
                    state.seats_to_update.insert(seat.to_string());
                    state.seats_that_enabled_hvac_power.insert(seat.to_string());
                }
                Ok(_) => {
                    warn!(seat = %seat, "HVAC power did not turn on after a confirmed write");
                    return HvacPowerState::failed(ErrorCode::BadValImpl);
                }
            }
        }
        state
    }

    /// Drop `ValueAlreadySet` for seats whose power this call turned on
    ///
    /// Turning power on can restore the zone's previous value, so a request
    /// for that value reports success.
    pub fn filtered_seat_to_error_code(
        seats_that_enabled_hvac_power: &BTreeSet<String>,
        seat_to_error_code: BTreeMap<String, ErrorCode>,
    ) -> BTreeMap<String, ErrorCode> {
        seat_to_error_code
            .into_iter()
            .filter(|(seat, code)| {
                !(*code == ErrorCode::ValueAlreadySet && seats_that_enabled_hvac_power.contains(seat))
            })
            .collect()
    }

    /// Offset counterpart of `filtered_seat_to_error_code`
    pub fn filtered_seat_to_new_value<U>(
        seats_that_enabled_hvac_power: &BTreeSet<String>,
        seat_to_new_value: BTreeMap<String, ErrorOr<U>>,
    ) -> BTreeMap<String, ErrorOr<U>> {
        seat_to_new_value
            .into_iter()
            .filter(|(seat, value)| {
                !(matches!(value, Err(ErrorCode::ValueAlreadySet))
                    && seats_that_enabled_hvac_power.contains(seat))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use val_compat::ids::{
        HVAC_AC_ON, HVAC_SEAT_TEMPERATURE, SEAT_ROW_1_LEFT, SEAT_ROW_1_RIGHT, SEAT_ROW_2_LEFT,
    };
    use val_compat::{FakeVehicle, HalError, PropertyAccess, RawAreaConfig, RawPropertyConfig};
    use val_core::ValueType;

    fn seats(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn seat_map() -> ElementAreaMap {
        ElementAreaMap::new([
            ("SEAT_ROW_1_LEFT", SEAT_ROW_1_LEFT),
            ("SEAT_ROW_1_RIGHT", SEAT_ROW_1_RIGHT),
            ("SEAT_ROW_2_LEFT", SEAT_ROW_2_LEFT),
        ])
        .unwrap()
    }

    fn utils(fake: &Arc<FakeVehicle>, property_id: i32, enable: bool) -> HvacPowerUtils {
        let compat = Arc::new(PropertyManagerCompat::new(fake.clone()));
        HvacPowerUtils::new(compat, property_id, seat_map(), enable).unwrap()
    }

    #[test]
    fn test_new_rejects_hvac_power_itself() {
        let compat = Arc::new(PropertyManagerCompat::new(Arc::new(FakeVehicle::climate())));
        assert!(matches!(
            HvacPowerUtils::new(compat, HVAC_POWER_ON, seat_map(), false),
            Err(ErrorCode::BadValImpl)
        ));
    }

    #[test]
    fn test_dependency_detection() {
        let fake = Arc::new(FakeVehicle::climate());
        assert_eq!(utils(&fake, HVAC_AC_ON, false).is_hvac_power_dependent(), Ok(true));
        assert_eq!(
            utils(&fake, HVAC_SEAT_TEMPERATURE, false).is_hvac_power_dependent(),
            Ok(false)
        );
    }

    #[test]
    fn test_no_hvac_power_property_means_independent() {
        let fake = Arc::new(FakeVehicle::climate());
        fake.remove_property(HVAC_POWER_ON);
        assert_eq!(utils(&fake, HVAC_AC_ON, false).is_hvac_power_dependent(), Ok(false));
    }

    #[test]
    fn test_uncovered_area_is_platform_error() {
        let fake = Arc::new(FakeVehicle::climate());
        fake.add_property(
            RawPropertyConfig::new(HVAC_AC_ON, ValueType::Bool, PropertyAccess::ReadWrite)
                .with_areas([RawAreaConfig::new(0x11), RawAreaConfig::new(0x100)]),
        );
        assert_eq!(
            utils(&fake, HVAC_AC_ON, false).is_hvac_power_dependent(),
            Err(ErrorCode::BadPlatformImpl)
        );
    }

    #[test]
    fn test_dependency_is_cached() {
        let fake = Arc::new(FakeVehicle::climate());
        let utils = utils(&fake, HVAC_AC_ON, false);
        utils.is_hvac_power_dependent().unwrap();
        let lookups = fake.config_lookups();
        fake.remove_property(HVAC_POWER_ON);
        assert_eq!(utils.is_hvac_power_dependent(), Ok(true));
        assert_eq!(fake.config_lookups(), lookups);
    }

    #[test]
    fn test_independent_property_updates_every_seat() {
        let fake = Arc::new(FakeVehicle::climate());
        let requested = seats(&["SEAT_ROW_1_LEFT", "SEAT_ROW_1_RIGHT"]);
        let state = utils(&fake, HVAC_SEAT_TEMPERATURE, true).compute_hvac_power_state(&requested);
        assert_eq!(state.seats_to_update, requested);
        assert!(state.seat_to_error_code.is_empty());
        assert_eq!(fake.total_writes(), 0);
    }

    #[test]
    fn test_power_off_seats_excluded_without_enable() {
        let fake = Arc::new(FakeVehicle::climate());
        fake.set_value(HVAC_POWER_ON, 0x11, PropertyValue::Bool(false));
        let state = utils(&fake, HVAC_AC_ON, false)
            .compute_hvac_power_state(&seats(&["SEAT_ROW_1_LEFT", "SEAT_ROW_1_RIGHT"]));

        assert_eq!(state.error_code, None);
        assert_eq!(state.seats_to_update, seats(&["SEAT_ROW_1_RIGHT"]));
        assert_eq!(
            state.seat_to_error_code.get("SEAT_ROW_1_LEFT"),
            Some(&ErrorCode::HvacPowerIsDisabled)
        );
        assert_eq!(fake.total_writes(), 0);
    }

    #[test]
    fn test_power_enabled_when_allowed() {
        let fake = Arc::new(FakeVehicle::climate());
        fake.set_value(HVAC_POWER_ON, 0x11, PropertyValue::Bool(false));
        let state = utils(&fake, HVAC_AC_ON, true)
            .compute_hvac_power_state(&seats(&["SEAT_ROW_1_LEFT", "SEAT_ROW_2_LEFT", "SEAT_ROW_1_RIGHT"]));

        assert_eq!(state.error_code, None);
        assert_eq!(
            state.seats_to_update,
            seats(&["SEAT_ROW_1_LEFT", "SEAT_ROW_2_LEFT", "SEAT_ROW_1_RIGHT"])
        );
        assert_eq!(
            state.seats_that_enabled_hvac_power,
            seats(&["SEAT_ROW_1_LEFT", "SEAT_ROW_2_LEFT"])
        );
        assert_eq!(fake.write_count(HVAC_POWER_ON, 0x11), 1);
        assert_eq!(fake.value(HVAC_POWER_ON, 0x11), Some(PropertyValue::Bool(true)));
    }

    #[test]
    fn test_power_read_error_recorded_per_seat() {
        let fake = Arc::new(FakeVehicle::climate());
        fake.fail_get(HVAC_POWER_ON, 0x44, HalError::NotAvailable);
        let state = utils(&fake, HVAC_AC_ON, true)
            .compute_hvac_power_state(&seats(&["SEAT_ROW_1_LEFT", "SEAT_ROW_1_RIGHT"]));

        assert_eq!(state.seats_to_update, seats(&["SEAT_ROW_1_LEFT"]));
        assert_eq!(
            state.seat_to_error_code.get("SEAT_ROW_1_RIGHT"),
            Some(&ErrorCode::PropertyNotAvailable)
        );
    }

    #[test]
    fn test_enable_failure_recorded_per_seat() {
        let fake = Arc::new(FakeVehicle::climate());
        fake.set_value(HVAC_POWER_ON, 0x11, PropertyValue::Bool(false));
        fake.ignore_writes(HVAC_POWER_ON, 0x11);
        let state = utils(&fake, HVAC_AC_ON, true).compute_hvac_power_state(&seats(&["SEAT_ROW_1_LEFT"]));

        assert_eq!(state.error_code, None);
        assert!(state.seats_to_update.is_empty());
        assert_eq!(
            state.seat_to_error_code.get("SEAT_ROW_1_LEFT"),
            Some(&ErrorCode::SetPropertyCallbackTimedOut)
        );
    }

    #[test]
    fn test_dependency_error_aborts() {
        let fake = Arc::new(FakeVehicle::climate());
        fake.fail_config(HVAC_POWER_ON, HalError::Internal("down".into()));
        let state = utils(&fake, HVAC_AC_ON, true).compute_hvac_power_state(&seats(&["SEAT_ROW_1_LEFT"]));
        assert_eq!(state.error_code, Some(ErrorCode::PlatformInternalError));
    }

    #[test]
    fn test_value_already_set_filtered_only_for_enabled_seats() {
        let enabled = seats(&["SEAT_ROW_1_LEFT"]);
        let mut errors = BTreeMap::new();
        errors.insert("SEAT_ROW_1_LEFT".to_string(), ErrorCode::ValueAlreadySet);
        errors.insert("SEAT_ROW_1_RIGHT".to_string(), ErrorCode::ValueAlreadySet);
        errors.insert("SEAT_ROW_2_LEFT".to_string(), ErrorCode::AreaNotWritable);

        let filtered = HvacPowerUtils::filtered_seat_to_error_code(&enabled, errors);
        assert!(!filtered.contains_key("SEAT_ROW_1_LEFT"));
        assert_eq!(filtered.get("SEAT_ROW_1_RIGHT"), Some(&ErrorCode::ValueAlreadySet));
        assert_eq!(filtered.get("SEAT_ROW_2_LEFT"), Some(&ErrorCode::AreaNotWritable));

        let mut values = BTreeMap::new();
        values.insert("SEAT_ROW_1_LEFT".to_string(), Err(ErrorCode::ValueAlreadySet));
        values.insert("SEAT_ROW_1_RIGHT".to_string(), Ok(3));
        let filtered = HvacPowerUtils::filtered_seat_to_new_value(&enabled, values);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.get("SEAT_ROW_1_RIGHT"), Some(&Ok(3)));
    }
}
