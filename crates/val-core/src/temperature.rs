//! Temperature value object

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unit a temperature is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureUnit {
    Celsius,
    Fahrenheit,
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemperatureUnit::Celsius => f.write_str("°C"),
            TemperatureUnit::Fahrenheit => f.write_str("°F"),
        }
    }
}

/// A temperature reading or request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Temperature {
    pub value: f32,
    pub unit: TemperatureUnit,
}

impl Temperature {
    pub fn new(value: f32, unit: TemperatureUnit) -> Self {
        Self { value, unit }
    }

    pub fn celsius(value: f32) -> Self {
        Self::new(value, TemperatureUnit::Celsius)
    }

    pub fn fahrenheit(value: f32) -> Self {
        Self::new(value, TemperatureUnit::Fahrenheit)
    }

    /// Absolute conversion, e.g. 20°C becomes 68°F
    pub fn to_unit(self, unit: TemperatureUnit) -> Self {
        match (self.unit, unit) {
            (TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit) => {
                Self::fahrenheit(self.value * 9.0 / 5.0 + 32.0)
            }
            (TemperatureUnit::Fahrenheit, TemperatureUnit::Celsius) => {
                Self::celsius((self.value - 32.0) * 5.0 / 9.0)
            }
            _ => self,
        }
    }

    /// Conversion of a temperature difference, e.g. a 1°C step becomes 1.8°F
    pub fn delta_in(self, unit: TemperatureUnit) -> f32 {
        match (self.unit, unit) {
            (TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit) => self.value * 9.0 / 5.0,
            (TemperatureUnit::Fahrenheit, TemperatureUnit::Celsius) => self.value * 5.0 / 9.0,
            _ => self.value,
        }
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::float_equals;

    #[test]
    fn test_absolute_conversion() {
        assert!(float_equals(Temperature::celsius(20.0).to_unit(TemperatureUnit::Fahrenheit).value, 68.0));
        assert!(float_equals(Temperature::fahrenheit(212.0).to_unit(TemperatureUnit::Celsius).value, 100.0));
        assert_eq!(
            Temperature::celsius(21.5).to_unit(TemperatureUnit::Celsius),
            Temperature::celsius(21.5)
        );
    }

    #[test]
    fn test_delta_conversion() {
        assert!(float_equals(Temperature::celsius(1.0).delta_in(TemperatureUnit::Fahrenheit), 1.8));
        assert!(float_equals(Temperature::fahrenheit(9.0).delta_in(TemperatureUnit::Celsius), 5.0));
        assert!(float_equals(Temperature::fahrenheit(2.0).delta_in(TemperatureUnit::Fahrenheit), 2.0));
    }

    #[test]
    fn test_display() {
        assert_eq!(Temperature::celsius(21.5).to_string(), "21.5°C");
    }
}
