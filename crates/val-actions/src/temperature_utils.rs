//! HVAC temperature table lookups
//!
//! A temperature table holds `n` supported values: indices `[0, n/2 - 1]`
//! are Celsius and `[n/2, n - 1]` the matching Fahrenheit values, each half
//! sorted ascending.

use std::collections::BTreeSet;
use tracing::warn;
use val_compat::ids::{HVAC_TEMPERATURE_DISPLAY_UNITS, VEHICLE_UNIT_CELSIUS, VEHICLE_UNIT_FAHRENHEIT};
use val_compat::PropertyManagerCompat;
use val_core::{
    float_equals, ErrorCode, ErrorOr, PropertyValue, Temperature, TemperatureUnit, GLOBAL_AREA_ID,
};

/// Inclusive index bounds of one unit's half of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalfBounds {
    pub start: usize,
    pub end: usize,
}

/// Bounds of the half holding `unit`
///
/// Tables with an odd or zero length have no halves and are `BadPlatformImpl`.
pub fn bounds_for_unit(values: &[f32], unit: TemperatureUnit) -> ErrorOr<HalfBounds> {
    let n = values.len();
    if n < 2 || n % 2 != 0 {
        warn!(len = n, "Temperature table cannot be split into halves");
        return Err(ErrorCode::BadPlatformImpl);
    }
    Ok(match unit {
        TemperatureUnit::Celsius => HalfBounds { start: 0, end: n / 2 - 1 },
        TemperatureUnit::Fahrenheit => HalfBounds { start: n / 2, end: n - 1 },
    })
}

fn round_half_up(value: f32) -> f32 {
    (value + 0.5).floor()
}

/// Index of the value in `values[start..=end]` closest to `target`
///
/// Targets outside the slice clamp to its ends. When `target` sits exactly
/// between two neighbours the lower one wins if it rounds to the same whole
/// number as `target`, otherwise the upper one. Bounds outside `values` are
/// `BadValImpl`.
pub fn find_index_of_closest_supported_value(
    target: f32,
    values: &[f32],
    start: usize,
    end: usize,
) -> ErrorOr<usize> {
    let slice = bounded(values, start, end)?;
    let insertion = match slice.binary_search_by(|candidate| candidate.total_cmp(&target)) {
        Ok(index) => return Ok(start + index),
        Err(insertion) => insertion,
    };
    if insertion == 0 {
        return Ok(start);
    }
    if insertion == slice.len() {
        return Ok(end);
    }

    let (lower, upper) = (slice[insertion - 1], slice[insertion]);
    let (to_lower, to_upper) = ((lower - target).abs(), (upper - target).abs());
    let lower_wins = if float_equals(to_lower, to_upper) {
        float_equals(round_half_up(target), round_half_up(lower))
    } else {
        to_lower < to_upper
    };
    Ok(if lower_wins { start + insertion - 1 } else { start + insertion })
}

fn bounded(values: &[f32], start: usize, end: usize) -> ErrorOr<&[f32]> {
    values.get(start..=end).ok_or_else(|| {
        warn!(start = start, end = end, len = values.len(), "Temperature table bounds out of range");
        ErrorCode::BadValImpl
    })
}

/// Closest index within the half holding `unit`
pub fn find_index_of_closest_value_in_unit(
    target: f32,
    values: &[f32],
    unit: TemperatureUnit,
) -> ErrorOr<usize> {
    let bounds = bounds_for_unit(values, unit)?;
    find_index_of_closest_supported_value(target, values, bounds.start, bounds.end)
}

/// Index a requested temperature maps to
///
/// With rounding this is the closest value of the temperature's unit.
/// Without rounding the temperature must match a value in
/// `values[start..=end]`, otherwise it is reported below, above or between
/// the supported values.
pub fn get_processed_temperature_index(
    temperature: Temperature,
    round_to_nearest_supported_value: bool,
    values: &[f32],
    bounds: HalfBounds,
) -> ErrorOr<usize> {
    if round_to_nearest_supported_value {
        return find_index_of_closest_value_in_unit(temperature.value, values, temperature.unit);
    }

    let value = temperature.value;
    let half = bounded(values, bounds.start, bounds.end)?;
    if let Some(offset) = half.iter().position(|supported| float_equals(*supported, value)) {
        return Ok(bounds.start + offset);
    }
    if value < half[0] {
        Err(ErrorCode::ValueBelowMinimum)
    } else if value > half[half.len() - 1] {
        Err(ErrorCode::ValueAboveMaximum)
    } else {
        Err(ErrorCode::ValueNotSupported)
    }
}

/// Fahrenheit value matching a raw Celsius reading
pub fn celsius_to_fahrenheit_by_index(celsius: f32, values: &[f32]) -> ErrorOr<f32> {
    let celsius_index = find_index_of_closest_value_in_unit(celsius, values, TemperatureUnit::Celsius)?;
    Ok(values[celsius_index + values.len() / 2])
}

/// Units the vehicle shows temperatures in
pub fn get_hvac_temperature_display_units(compat: &PropertyManagerCompat) -> ErrorOr<TemperatureUnit> {
    let areas = BTreeSet::from([GLOBAL_AREA_ID]);
    let mut results = compat.get_values(HVAC_TEMPERATURE_DISPLAY_UNITS, &areas)?;
    let record = results
        .remove(&GLOBAL_AREA_ID)
        .ok_or(ErrorCode::BadPlatformImpl)??;

    match record.value {
        PropertyValue::Int(VEHICLE_UNIT_CELSIUS) => Ok(TemperatureUnit::Celsius),
        PropertyValue::Int(VEHICLE_UNIT_FAHRENHEIT) => Ok(TemperatureUnit::Fahrenheit),
        other => {
            warn!(value = %other, "Unknown temperature display units");
            Err(ErrorCode::BadPlatformImpl)
        }
    }
}
