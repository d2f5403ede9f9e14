//! Custom supported-value ranges
//!
//! A generator replaces the default step-one range built from an area's
//! min/max, or supplies a range for properties without min/max.

use tracing::warn;
use val_compat::PropertyManagerCompat;
use val_core::{ActionValue, ErrorCode, ErrorOr, NumericValue, ValueRange};

/// Produces the supported values of one element
///
/// Both methods default to `BadValImpl` so a generator only implements the
/// form its action uses. Returning `AreaNotSupported` from the min/max form
/// drops the element instead of failing the action.
pub trait CustomValueRangeGenerator<T: ActionValue>: Send + Sync {
    fn value_range_from_min_max(
        &self,
        _min: T,
        _max: T,
        _config_array: &[i32],
    ) -> ErrorOr<ValueRange<T>> {
        Err(ErrorCode::BadValImpl)
    }

    fn value_range_for_area(
        &self,
        _compat: &PropertyManagerCompat,
        _area: i32,
    ) -> ErrorOr<ValueRange<T>> {
        Err(ErrorCode::BadValImpl)
    }
}

/// `[0, max]`, for levels where zero means off and positive values are on
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroOrGreaterThan;

impl<T: NumericValue> CustomValueRangeGenerator<T> for ZeroOrGreaterThan {
    fn value_range_from_min_max(&self, min: T, max: T, _config_array: &[i32]) -> ErrorOr<ValueRange<T>> {
        if max <= T::zero() || min > T::zero() {
            return Err(ErrorCode::AreaNotSupported);
        }
        ValueRange::from_min_max(T::zero(), max)
    }
}

/// `[min, 0]`, for levels expressed as negative values
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroOrLessThan;

impl<T: NumericValue> CustomValueRangeGenerator<T> for ZeroOrLessThan {
    fn value_range_from_min_max(&self, min: T, max: T, _config_array: &[i32]) -> ErrorOr<ValueRange<T>> {
        if max < T::zero() || min >= T::zero() {
            return Err(ErrorCode::AreaNotSupported);
        }
        ValueRange::from_min_max(min, T::zero())
    }
}

/// Supported HVAC target temperatures
///
/// Produces the Celsius values followed by the same number of Fahrenheit
/// values, index `i` in one half matching index `i` in the other. The table
/// comes from a six-entry config array `[minC, maxC, incC, minF, maxF, incF]`
/// (tenths of a degree) or is derived from min/max with 0.5°C and 1°F steps.
#[derive(Debug, Clone, Copy, Default)]
pub struct HvacTemperatureSetValueRangeGenerator;

const DERIVED_CELSIUS_INCREMENT: i32 = 5;
const DERIVED_FAHRENHEIT_INCREMENT: i32 = 10;

impl HvacTemperatureSetValueRangeGenerator {
    fn table_bounds(min: f32, max: f32, config_array: &[i32]) -> ErrorOr<[i32; 6]> {
        if let [min_c, max_c, inc_c, min_f, max_f, inc_f] = *config_array {
            return Ok([min_c, max_c, inc_c, min_f, max_f, inc_f]);
        }

        let min_c = (min * 10.0).round() as i32;
        let max_c = (max * 10.0).round() as i32;
        if min_c % DERIVED_CELSIUS_INCREMENT != 0 || max_c % DERIVED_CELSIUS_INCREMENT != 0 {
            warn!(min = min, max = max, "Temperature bounds are not multiples of 0.5");
            return Err(ErrorCode::BadPlatformImpl);
        }
        let steps = (max_c - min_c) / DERIVED_CELSIUS_INCREMENT;
        let min_f = (min * 1.8 + 32.0).floor() as i32 * 10;
        let max_f = steps * DERIVED_FAHRENHEIT_INCREMENT + min_f;
        Ok([
            min_c,
            max_c,
            DERIVED_CELSIUS_INCREMENT,
            min_f,
            max_f,
            DERIVED_FAHRENHEIT_INCREMENT,
        ])
    }
}

impl CustomValueRangeGenerator<f32> for HvacTemperatureSetValueRangeGenerator {
    fn value_range_from_min_max(&self, min: f32, max: f32, config_array: &[i32]) -> ErrorOr<ValueRange<f32>> {
        let [min_c, max_c, inc_c, min_f, max_f, inc_f] = Self::table_bounds(min, max, config_array)?;

        let consistent = inc_c > 0
            && inc_f > 0
            && max_c >= min_c
            && max_f >= min_f
            && (max_c - min_c) % inc_c == 0
            && (max_f - min_f) % inc_f == 0
            && (max_c - min_c) / inc_c == (max_f - min_f) / inc_f;
        if !consistent {
            warn!(
                table = ?[min_c, max_c, inc_c, min_f, max_f, inc_f],
                "Inconsistent temperature table"
            );
            return Err(ErrorCode::BadPlatformImpl);
        }

        let steps = (max_c - min_c) / inc_c;
        let celsius = (0..=steps).map(|i| (min_c + i * inc_c) as f32 / 10.0);
        let fahrenheit = (0..=steps).map(|i| (min_f + i * inc_f) as f32 / 10.0);
        ValueRange::new(celsius.chain(fahrenheit).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_or_greater() {
        let range = ZeroOrGreaterThan.value_range_from_min_max(-3i32, 3, &[]).unwrap();
        assert_eq!(range.supported_values(), &[0, 1, 2, 3]);
        assert_eq!(
            CustomValueRangeGenerator::<i32>::value_range_from_min_max(&ZeroOrGreaterThan, -3, 0, &[]),
            Err(ErrorCode::AreaNotSupported)
        );
        assert_eq!(
            CustomValueRangeGenerator::<i32>::value_range_from_min_max(&ZeroOrGreaterThan, 1, 3, &[]),
            Err(ErrorCode::AreaNotSupported)
        );
    }

    #[test]
    fn test_zero_or_less() {
        let range = ZeroOrLessThan.value_range_from_min_max(-3i32, 3, &[]).unwrap();
        assert_eq!(range.supported_values(), &[-3, -2, -1, 0]);
        assert_eq!(
            CustomValueRangeGenerator::<i32>::value_range_from_min_max(&ZeroOrLessThan, 0, 3, &[]),
            Err(ErrorCode::AreaNotSupported)
        );
        assert_eq!(
            CustomValueRangeGenerator::<i32>::value_range_from_min_max(&ZeroOrLessThan, -3, -1, &[]),
            Err(ErrorCode::AreaNotSupported)
        );
    }

    #[test]
    fn test_area_form_defaults_to_library_error() {
        struct MinMaxOnly;
        impl CustomValueRangeGenerator<i32> for MinMaxOnly {}

        let compat = PropertyManagerCompat::new(std::sync::Arc::new(val_compat::FakeVehicle::new()));
        assert_eq!(
            MinMaxOnly.value_range_for_area(&compat, 1),
            Err(ErrorCode::BadValImpl)
        );
    }

    #[test]
    fn test_temperature_from_config_array() {
        let range = HvacTemperatureSetValueRangeGenerator
            .value_range_from_min_max(16.0, 28.0, &[160, 280, 5, 600, 840, 10])
            .unwrap();
        let values = range.supported_values();
        assert_eq!(values.len(), 50);
        assert_eq!(values[0], 16.0);
        assert_eq!(values[1], 16.5);
        assert_eq!(values[24], 28.0);
        assert_eq!(values[25], 60.0);
        assert_eq!(values[49], 84.0);
    }

    #[test]
    fn test_temperature_derived_from_min_max() {
        let range = HvacTemperatureSetValueRangeGenerator
            .value_range_from_min_max(16.0, 28.0, &[])
            .unwrap();
        let values = range.supported_values();
        assert_eq!(values.len(), 50);
        assert_eq!(values[25], 60.0);
        assert_eq!(values[49], 84.0);
    }

    #[test]
    fn test_temperature_rejects_bad_tables() {
        let generator = HvacTemperatureSetValueRangeGenerator;
        assert_eq!(
            generator.value_range_from_min_max(16.2, 28.0, &[]),
            Err(ErrorCode::BadPlatformImpl)
        );
        assert_eq!(
            generator.value_range_from_min_max(16.0, 28.0, &[160, 280, 0, 600, 840, 10]),
            Err(ErrorCode::BadPlatformImpl)
        );
        assert_eq!(
            generator.value_range_from_min_max(16.0, 28.0, &[160, 280, 5, 600, 850, 10]),
            Err(ErrorCode::BadPlatformImpl)
        );
        assert_eq!(
            generator.value_range_from_min_max(16.0, 28.0, &[160, 283, 5, 600, 840, 10]),
            Err(ErrorCode::BadPlatformImpl)
        );
    }
}
