//! HVAC target temperature actions
//!
//! The vehicle stores target temperatures in Celsius. These actions accept
//! and report temperatures in the vehicle's display units, matched to the
//! supported-value table of each seat.

use crate::base::{ActionContext, ActionCore, ActionDefinition};
use crate::generator::HvacTemperatureSetValueRangeGenerator;
use crate::get::GetAction;
use crate::offset::OffsetAction;
use crate::params::OptionalActionParameters;
use crate::set::SetAction;
use crate::temperature_utils::{
    bounds_for_unit, celsius_to_fahrenheit_by_index, get_hvac_temperature_display_units,
    get_processed_temperature_index,
};
use std::cell::OnceCell;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, instrument};
use val_compat::ids::HVAC_TEMPERATURE_SET;
use val_core::{
    ElementAreaMap, ErrorCode, ErrorOr, GetActionResult, OffsetActionResult, OffsetRequest,
    SetActionResult, Temperature, TemperatureUnit, UpdateTargetTemperatureRequest, ValueRange,
};

fn target_temperature_definition(
    name: String,
    permission: String,
    seat_to_area: ElementAreaMap,
    enable_hvac_power_if_dependent: bool,
) -> ActionDefinition<f32> {
    ActionDefinition::new(name, HVAC_TEMPERATURE_SET, permission, seat_to_area)
        .with_params(OptionalActionParameters {
            enable_hvac_power_if_dependent,
            is_min_max_property: true,
            custom_value_range_generator: Some(Arc::new(HvacTemperatureSetValueRangeGenerator)),
            ..Default::default()
        })
        .dependent_on_hvac_power()
}

/// Supported Celsius then Fahrenheit values of a seat
fn temperature_table<'a>(core: &'a ActionCore<f32>, seat: &str) -> ErrorOr<&'a [f32]> {
    core.value_range(seat)
        .map(ValueRange::supported_values)
        .ok_or(ErrorCode::BadValImpl)
}

/// Reads target temperatures
pub struct HvacTargetTemperatureGetAction {
    inner: GetAction<f32>,
}

impl HvacTargetTemperatureGetAction {
    pub fn new(
        context: ActionContext,
        name: impl Into<String>,
        permission: impl Into<String>,
        seat_to_area: ElementAreaMap,
        enable_hvac_power_if_dependent: bool,
    ) -> ErrorOr<Self> {
        let definition = target_temperature_definition(
            name.into(),
            permission.into(),
            seat_to_area,
            enable_hvac_power_if_dependent,
        );
        Ok(Self {
            inner: GetAction::new(context, definition)?,
        })
    }

    pub fn core(&self) -> &ActionCore<f32> {
        self.inner.core()
    }

    pub fn raw(&self) -> &GetAction<f32> {
        &self.inner
    }

    /// Raw Celsius values
    pub fn get(&self, seats: &BTreeSet<String>) -> ErrorOr<GetActionResult<f32>> {
        self.inner.get(seats)
    }

    /// Target temperatures in `unit`, or in the display units when `None`
    #[instrument(skip(self), fields(action = %self.core().name()))]
    pub fn get_temperature(
        &self,
        seats: &BTreeSet<String>,
        unit: Option<TemperatureUnit>,
    ) -> ErrorOr<GetActionResult<Temperature>> {
        let raw = self.inner.get(seats)?;
        let unit = match unit {
            Some(unit) => unit,
            None => get_hvac_temperature_display_units(self.core().compat())?,
        };

        let element_to_value = raw
            .element_to_value
            .into_iter()
            .map(|(seat, value)| {
                let converted = value.and_then(|celsius| match unit {
                    TemperatureUnit::Celsius => Ok(Temperature::celsius(celsius)),
                    TemperatureUnit::Fahrenheit => {
                        let table = temperature_table(self.core(), &seat)?;
                        celsius_to_fahrenheit_by_index(celsius, table).map(Temperature::fahrenheit)
                    }
                });
                (seat, converted)
            })
            .collect();
        Ok(GetActionResult::new(raw.action_name, element_to_value))
    }
}

/// Sets target temperatures
pub struct HvacTargetTemperatureSetAction {
    inner: SetAction<f32>,
}

impl HvacTargetTemperatureSetAction {
    pub fn new(
        context: ActionContext,
        name: impl Into<String>,
        permission: impl Into<String>,
        seat_to_area: ElementAreaMap,
        enable_hvac_power_if_dependent: bool,
    ) -> ErrorOr<Self> {
        let definition = target_temperature_definition(
            name.into(),
            permission.into(),
            seat_to_area,
            enable_hvac_power_if_dependent,
        );
        Ok(Self {
            inner: SetAction::new(context, definition)?,
        })
    }

    pub fn core(&self) -> &ActionCore<f32> {
        self.inner.core()
    }

    pub fn raw(&self) -> &SetAction<f32> {
        &self.inner
    }

    /// Write a raw Celsius value
    pub fn set(&self, seats: &BTreeSet<String>, celsius: f32) -> ErrorOr<SetActionResult> {
        self.inner.set(seats, &celsius)
    }

    /// Set each seat to the requested temperature
    ///
    /// The request is converted to the display units and matched against
    /// that half of the seat's table, then the Celsius value at the same
    /// position is written.
    #[instrument(skip(self), fields(action = %self.core().name()))]
    pub fn set_temperature(&self, request: &UpdateTargetTemperatureRequest) -> ErrorOr<SetActionResult> {
        let core = self.core();
        if let Some(err) = core.check_are_elements_supported(&request.seats) {
            return Err(err);
        }
        let display = get_hvac_temperature_display_units(core.compat())?;
        let requested = request.temperature.to_unit(display);

        let mut element_to_error_code = BTreeMap::new();
        let mut groups: Vec<(f32, BTreeSet<String>)> = Vec::new();
        for seat in &request.seats {
            let celsius = temperature_table(core, seat).and_then(|table| {
                let bounds = bounds_for_unit(table, display)?;
                let index = get_processed_temperature_index(
                    requested,
                    request.round_to_nearest_supported_value,
                    table,
                    bounds,
                )?;
                Ok(table[index - bounds.start])
            });
            match celsius {
                Err(err) => {
                    debug!(seat = %seat, error = %err, "Temperature not supported");
                    element_to_error_code.insert(seat.clone(), err);
                }
                Ok(celsius) => match groups.iter_mut().find(|(value, _)| *value == celsius) {
                    Some((_, seats)) => {
                        seats.insert(seat.clone());
                    }
                    None => groups.push((celsius, BTreeSet::from([seat.clone()]))),
                },
            }
        }

        for (celsius, seats) in groups {
            let result = self.inner.set(&seats, &celsius)?;
            element_to_error_code.extend(result.element_to_error_code);
        }
        Ok(SetActionResult::new(core.name(), element_to_error_code))
    }
}

/// Raises or lowers target temperatures
pub struct HvacTargetTemperatureOffsetAction {
    inner: OffsetAction<f32>,
}

impl HvacTargetTemperatureOffsetAction {
    pub fn new(
        context: ActionContext,
        name: impl Into<String>,
        permission: impl Into<String>,
        seat_to_area: ElementAreaMap,
        enable_hvac_power_if_dependent: bool,
    ) -> ErrorOr<Self> {
        let definition = target_temperature_definition(
            name.into(),
            permission.into(),
            seat_to_area,
            enable_hvac_power_if_dependent,
        );
        Ok(Self {
            inner: OffsetAction::new(context, definition)?,
        })
    }

    pub fn core(&self) -> &ActionCore<f32> {
        self.inner.core()
    }

    /// Move each seat's target temperature by `request.offset`
    ///
    /// The offset is applied in the display units and the outputs are
    /// reported in them.
    #[instrument(skip(self), fields(action = %self.core().name()))]
    pub fn apply_offset(
        &self,
        request: &OffsetRequest<Temperature>,
    ) -> ErrorOr<OffsetActionResult<Temperature>> {
        let core = self.core();
        let display: OnceCell<ErrorOr<TemperatureUnit>> = OnceCell::new();

        let element_to_output = self.inner.apply_with(&request.elements, |seat, celsius| {
            let unit = (*display.get_or_init(|| get_hvac_temperature_display_units(core.compat())))?;
            let table = temperature_table(core, seat)?;
            let bounds = bounds_for_unit(table, unit)?;

            let current = match unit {
                TemperatureUnit::Celsius => celsius,
                TemperatureUnit::Fahrenheit => celsius_to_fahrenheit_by_index(celsius, table)?,
            };
            let target = Temperature::new(current + request.offset.delta_in(unit), unit);
            let index = get_processed_temperature_index(
                target,
                request.round_to_nearest_supported_value,
                table,
                bounds,
            )?;
            Ok((table[index - bounds.start], Temperature::new(table[index], unit)))
        })?;
        Ok(OffsetActionResult::new(core.name(), element_to_output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::test_support::*;
    use val_compat::ids::{HVAC_POWER_ON, HVAC_TEMPERATURE_DISPLAY_UNITS, VEHICLE_UNIT_FAHRENHEIT};
    use val_compat::FakeVehicle;
    use val_core::PropertyValue;

    fn fahrenheit_display(fake: &FakeVehicle) {
        fake.set_value(HVAC_TEMPERATURE_DISPLAY_UNITS, 0, PropertyValue::Int(VEHICLE_UNIT_FAHRENHEIT));
    }

    fn target(fake: &FakeVehicle, zone: i32) -> Option<PropertyValue> {
        fake.value(HVAC_TEMPERATURE_SET, zone)
    }

    fn get_action(fake: &Arc<FakeVehicle>) -> HvacTargetTemperatureGetAction {
        HvacTargetTemperatureGetAction::new(context(fake), "GET_TEMP", PERMISSION, seat_map(), false).unwrap()
    }

    fn set_action(fake: &Arc<FakeVehicle>, enable: bool) -> HvacTargetTemperatureSetAction {
        HvacTargetTemperatureSetAction::new(context(fake), "SET_TEMP", PERMISSION, seat_map(), enable).unwrap()
    }

    fn offset_action(fake: &Arc<FakeVehicle>) -> HvacTargetTemperatureOffsetAction {
        HvacTargetTemperatureOffsetAction::new(context(fake), "OFFSET_TEMP", PERMISSION, seat_map(), false)
            .unwrap()
    }

    #[test]
    fn test_get_in_display_units() {
        let fake = Arc::new(FakeVehicle::climate());
        let action = get_action(&fake);
        let driver = seats(&["SEAT_ROW_1_LEFT"]);

        let result = action.get_temperature(&driver, None).unwrap();
        assert_eq!(result.get("SEAT_ROW_1_LEFT"), Some(&Ok(Temperature::celsius(20.0))));

        fahrenheit_display(&fake);
        let result = action.get_temperature(&driver, None).unwrap();
        assert_eq!(result.get("SEAT_ROW_1_LEFT"), Some(&Ok(Temperature::fahrenheit(68.0))));

        let result = action.get_temperature(&driver, Some(TemperatureUnit::Celsius)).unwrap();
        assert_eq!(result.get("SEAT_ROW_1_LEFT"), Some(&Ok(Temperature::celsius(20.0))));
    }

    #[test]
    fn test_supported_seats_come_from_table() {
        let fake = Arc::new(FakeVehicle::climate());
        let action = get_action(&fake);
        let ranges = action.core().get_element_to_value_range_map().unwrap();
        assert_eq!(ranges.len(), 3);
        assert_eq!(ranges["SEAT_ROW_1_LEFT"].len(), 50);
    }

    #[test]
    fn test_set_rounds_to_nearest() {
        let fake = Arc::new(FakeVehicle::climate());
        let request = UpdateTargetTemperatureRequest::new(["SEAT_ROW_1_LEFT"], Temperature::celsius(22.3));
        let result = set_action(&fake, false).set_temperature(&request).unwrap();

        assert!(result.is_success());
        assert_eq!(target(&fake, 0x11), Some(PropertyValue::Float(22.5)));
    }

    #[test]
    fn test_set_without_rounding() {
        let fake = Arc::new(FakeVehicle::climate());
        let action = set_action(&fake, false);
        let request = UpdateTargetTemperatureRequest::new(
            ["SEAT_ROW_1_LEFT", "SEAT_ROW_1_RIGHT"],
            Temperature::celsius(22.3),
        )
        .with_rounding(false);
        let result = action.set_temperature(&request).unwrap();
        assert_eq!(result.error_for("SEAT_ROW_1_LEFT"), Some(ErrorCode::ValueNotSupported));

        let request = UpdateTargetTemperatureRequest::new(["SEAT_ROW_1_LEFT"], Temperature::celsius(12.0))
            .with_rounding(false);
        let result = action.set_temperature(&request).unwrap();
        assert_eq!(result.error_for("SEAT_ROW_1_LEFT"), Some(ErrorCode::ValueBelowMinimum));
        assert_eq!(fake.total_writes(), 0);
    }

    #[test]
    fn test_set_fahrenheit_request_in_fahrenheit_display() {
        let fake = Arc::new(FakeVehicle::climate());
        fahrenheit_display(&fake);
        let request = UpdateTargetTemperatureRequest::new(["SEAT_ROW_1_RIGHT"], Temperature::fahrenheit(70.0));
        set_action(&fake, false).set_temperature(&request).unwrap();
        assert_eq!(target(&fake, 0x44), Some(PropertyValue::Float(21.0)));
    }

    #[test]
    fn test_set_fahrenheit_request_in_celsius_display() {
        let fake = Arc::new(FakeVehicle::climate());
        let request = UpdateTargetTemperatureRequest::new(["SEAT_ROW_1_RIGHT"], Temperature::fahrenheit(70.0));
        set_action(&fake, false).set_temperature(&request).unwrap();
        assert_eq!(target(&fake, 0x44), Some(PropertyValue::Float(21.0)));
    }

    #[test]
    fn test_set_enables_power() {
        let fake = Arc::new(FakeVehicle::climate());
        fake.set_value(HVAC_POWER_ON, 0x11, PropertyValue::Bool(false));
        let request = UpdateTargetTemperatureRequest::new(["SEAT_ROW_1_LEFT"], Temperature::celsius(24.0));

        let result = set_action(&fake, false).set_temperature(&request).unwrap();
        assert_eq!(result.error_for("SEAT_ROW_1_LEFT"), Some(ErrorCode::HvacPowerIsDisabled));

        let result = set_action(&fake, true).set_temperature(&request).unwrap();
        assert!(result.is_success());
        assert_eq!(target(&fake, 0x11), Some(PropertyValue::Float(24.0)));
    }

    #[test]
    fn test_offset_in_celsius() {
        let fake = Arc::new(FakeVehicle::climate());
        let request = OffsetRequest::new(Temperature::celsius(1.0)).with_elements(["SEAT_ROW_1_LEFT"]);
        let result = offset_action(&fake).apply_offset(&request).unwrap();

        assert_eq!(result.get("SEAT_ROW_1_LEFT"), Some(&Ok(Temperature::celsius(21.0))));
        assert_eq!(target(&fake, 0x11), Some(PropertyValue::Float(21.0)));
    }

    #[test]
    fn test_offset_in_fahrenheit_display() {
        let fake = Arc::new(FakeVehicle::climate());
        fahrenheit_display(&fake);
        let request = OffsetRequest::new(Temperature::fahrenheit(2.0)).with_elements(["SEAT_ROW_1_LEFT"]);
        let result = offset_action(&fake).apply_offset(&request).unwrap();

        assert_eq!(result.get("SEAT_ROW_1_LEFT"), Some(&Ok(Temperature::fahrenheit(70.0))));
        assert_eq!(target(&fake, 0x11), Some(PropertyValue::Float(21.0)));
    }

    #[test]
    fn test_offset_unit_converted_to_display() {
        let fake = Arc::new(FakeVehicle::climate());
        let request = OffsetRequest::new(Temperature::fahrenheit(1.0)).with_elements(["SEAT_ROW_1_LEFT"]);
        let result = offset_action(&fake).apply_offset(&request).unwrap();
        assert_eq!(result.get("SEAT_ROW_1_LEFT"), Some(&Ok(Temperature::celsius(20.5))));
    }

    #[test]
    fn test_offset_past_maximum() {
        let fake = Arc::new(FakeVehicle::climate());
        let action = offset_action(&fake);

        let strict = OffsetRequest::new(Temperature::celsius(10.0))
            .with_elements(["SEAT_ROW_1_LEFT"])
            .with_rounding(false);
        let result = action.apply_offset(&strict).unwrap();
        assert_eq!(result.get("SEAT_ROW_1_LEFT"), Some(&Err(ErrorCode::ValueAboveMaximum)));

        let rounded = OffsetRequest::new(Temperature::celsius(10.0)).with_elements(["SEAT_ROW_1_LEFT"]);
        let result = action.apply_offset(&rounded).unwrap();
        assert_eq!(result.get("SEAT_ROW_1_LEFT"), Some(&Ok(Temperature::celsius(28.0))));
    }

    #[test]
    fn test_display_units_failure_recorded_per_seat() {
        let fake = Arc::new(FakeVehicle::climate());
        fake.set_value(HVAC_TEMPERATURE_DISPLAY_UNITS, 0, PropertyValue::Int(0x27));
        let request = OffsetRequest::new(Temperature::celsius(1.0))
            .with_elements(["SEAT_ROW_1_LEFT", "SEAT_ROW_1_RIGHT"]);
        let result = offset_action(&fake).apply_offset(&request).unwrap();

        assert_eq!(result.get("SEAT_ROW_1_LEFT"), Some(&Err(ErrorCode::BadPlatformImpl)));
        assert_eq!(result.get("SEAT_ROW_1_RIGHT"), Some(&Err(ErrorCode::BadPlatformImpl)));
        assert_eq!(fake.read_count(HVAC_TEMPERATURE_DISPLAY_UNITS, 0), 1);
    }
}
