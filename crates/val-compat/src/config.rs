//! Validated property configs

use crate::hal::RawPropertyConfig;
use crate::ids::{property_name, AreaType};
use std::collections::BTreeSet;
use tracing::warn;
use val_core::{ErrorCode, ErrorOr, PropertyValue, ValueType, GLOBAL_AREA_ID};

/// One area of a validated config
#[derive(Debug, Clone, PartialEq)]
pub struct AreaConfig {
    pub area_id: i32,
    pub readable: bool,
    pub writable: bool,
    pub min_value: Option<PropertyValue>,
    pub max_value: Option<PropertyValue>,
}

/// A property config that passed validation
///
/// Area ids are unique and kept in the order the platform reported them,
/// which decides ties in `get_area_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyConfig {
    pub property_id: i32,
    pub value_type: ValueType,
    pub area_type: AreaType,
    pub config_array: Vec<i32>,
    pub areas: Vec<AreaConfig>,
}

/// A value read for one area
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyValueRecord {
    pub property_id: i32,
    pub area_id: i32,
    pub value: PropertyValue,
}

impl PropertyConfig {
    /// Validate what the platform returned for `property_id`
    pub fn from_raw(property_id: i32, raw: Vec<RawPropertyConfig>) -> ErrorOr<Self> {
        let name = property_name(property_id);
        let mut raw = raw.into_iter();
        let config = raw.next().ok_or(ErrorCode::PropertyNotSupported)?;

        if raw.next().is_some() {
            warn!(property = %name, "Platform returned more than one config");
            return Err(ErrorCode::BadPlatformImpl);
        }
        if config.property_id != property_id {
            warn!(
                property = %name,
                returned = %property_name(config.property_id),
                "Platform returned a config for a different property"
            );
            return Err(ErrorCode::BadPlatformImpl);
        }

        let value_type = config.value_type.ok_or_else(|| {
            warn!(property = %name, "Config has no value type");
            ErrorCode::BadPlatformImpl
        })?;

        if config.areas.is_empty() {
            warn!(property = %name, "Config has no areas");
            return Err(ErrorCode::BadPlatformImpl);
        }

        let mut seen = BTreeSet::new();
        if !config.areas.iter().all(|area| seen.insert(area.area_id)) {
            warn!(property = %name, "Config repeats an area id");
            return Err(ErrorCode::BadPlatformImpl);
        }

        let area_type = AreaType::of_property(property_id);
        let is_global_only = seen.len() == 1 && seen.contains(&GLOBAL_AREA_ID);
        match area_type {
            AreaType::Global if !is_global_only => {
                warn!(property = %name, "Global property with non-global areas");
                return Err(ErrorCode::BadPlatformImpl);
            }
            AreaType::Global => {}
            _ if seen.contains(&GLOBAL_AREA_ID) => {
                warn!(property = %name, "Zoned property with the global area");
                return Err(ErrorCode::BadPlatformImpl);
            }
            _ => {}
        }

        let (readable, writable) = (config.access.is_readable(), config.access.is_writable());
        if !readable && !writable {
            warn!(property = %name, access = ?config.access, "Invalid access mode");
            return Err(ErrorCode::BadPlatformImpl);
        }

        Ok(Self {
            property_id,
            value_type,
            area_type,
            config_array: config.config_array,
            areas: config
                .areas
                .into_iter()
                .map(|area| AreaConfig {
                    area_id: area.area_id,
                    readable,
                    writable,
                    min_value: area.min_value,
                    max_value: area.max_value,
                })
                .collect(),
        })
    }

    /// The config area that covers `area`
    ///
    /// The global area only resolves against a global-only config. Any other
    /// area resolves to the first config area whose bits contain it.
    pub fn get_area_id(&self, area: i32) -> ErrorOr<i32> {
        if area == GLOBAL_AREA_ID {
            let is_global_only = self.areas.len() == 1 && self.areas[0].area_id == GLOBAL_AREA_ID;
            return if is_global_only {
                Ok(GLOBAL_AREA_ID)
            } else {
                Err(ErrorCode::AreaNotSupported)
            };
        }
        self.areas
            .iter()
            .map(|config| config.area_id)
            .find(|area_id| area_id & area == area)
            .ok_or(ErrorCode::AreaNotSupported)
    }

    pub fn area_config(&self, area_id: i32) -> Option<&AreaConfig> {
        self.areas.iter().find(|config| config.area_id == area_id)
    }

    pub fn area_ids(&self) -> impl Iterator<Item = i32> + '_ {
        self.areas.iter().map(|config| config.area_id)
    }

    pub fn are_all_areas_readable(&self) -> bool {
        self.areas.iter().all(|config| config.readable)
    }

    pub fn are_all_areas_writable(&self) -> bool {
        self.areas.iter().all(|config| config.writable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::{PropertyAccess, RawAreaConfig};
    use crate::ids::{HVAC_AC_ON, HVAC_TEMPERATURE_DISPLAY_UNITS};

    fn raw_seat(areas: &[i32]) -> RawPropertyConfig {
        RawPropertyConfig::new(HVAC_AC_ON, ValueType::Bool, PropertyAccess::ReadWrite)
            .with_areas(areas.iter().map(|a| RawAreaConfig::new(*a)))
    }

    #[test]
    fn test_from_raw_valid() {
        let config = PropertyConfig::from_raw(HVAC_AC_ON, vec![raw_seat(&[0x11, 0x44])]).unwrap();
        assert_eq!(config.value_type, ValueType::Bool);
        assert_eq!(config.area_type, AreaType::Seat);
        assert_eq!(config.area_ids().collect::<Vec<_>>(), vec![0x11, 0x44]);
        assert!(config.are_all_areas_readable());
        assert!(config.are_all_areas_writable());
    }

    #[test]
    fn test_from_raw_rejections() {
        assert_eq!(
            PropertyConfig::from_raw(HVAC_AC_ON, vec![]),
            Err(ErrorCode::PropertyNotSupported)
        );
        assert_eq!(
            PropertyConfig::from_raw(HVAC_AC_ON, vec![raw_seat(&[1]), raw_seat(&[4])]),
            Err(ErrorCode::BadPlatformImpl)
        );
        assert_eq!(
            PropertyConfig::from_raw(HVAC_TEMPERATURE_DISPLAY_UNITS, vec![raw_seat(&[1])]),
            Err(ErrorCode::BadPlatformImpl)
        );
        assert_eq!(
            PropertyConfig::from_raw(HVAC_AC_ON, vec![raw_seat(&[])]),
            Err(ErrorCode::BadPlatformImpl)
        );
        assert_eq!(
            PropertyConfig::from_raw(HVAC_AC_ON, vec![raw_seat(&[1, 1])]),
            Err(ErrorCode::BadPlatformImpl)
        );
        assert_eq!(
            PropertyConfig::from_raw(HVAC_AC_ON, vec![raw_seat(&[0, 1])]),
            Err(ErrorCode::BadPlatformImpl)
        );

        let mut untyped = raw_seat(&[1]);
        untyped.value_type = None;
        assert_eq!(
            PropertyConfig::from_raw(HVAC_AC_ON, vec![untyped]),
            Err(ErrorCode::BadPlatformImpl)
        );

        let mut no_access = raw_seat(&[1]);
        no_access.access = PropertyAccess::None;
        assert_eq!(
            PropertyConfig::from_raw(HVAC_AC_ON, vec![no_access]),
            Err(ErrorCode::BadPlatformImpl)
        );
    }

    #[test]
    fn test_global_config() {
        let raw = RawPropertyConfig::new(
            HVAC_TEMPERATURE_DISPLAY_UNITS,
            ValueType::Int,
            PropertyAccess::Read,
        )
        .with_areas([RawAreaConfig::new(0)]);
        let config = PropertyConfig::from_raw(HVAC_TEMPERATURE_DISPLAY_UNITS, vec![raw]).unwrap();
        assert_eq!(config.get_area_id(0), Ok(0));
        assert_eq!(config.get_area_id(1), Err(ErrorCode::AreaNotSupported));
        assert!(!config.are_all_areas_writable());
    }

    #[test]
    fn test_get_area_id_bitmask() {
        let config = PropertyConfig::from_raw(HVAC_AC_ON, vec![raw_seat(&[0x11, 0x44])]).unwrap();
        assert_eq!(config.get_area_id(0x1), Ok(0x11));
        assert_eq!(config.get_area_id(0x10), Ok(0x11));
        assert_eq!(config.get_area_id(0x40), Ok(0x44));
        assert_eq!(config.get_area_id(0x2), Err(ErrorCode::AreaNotSupported));
        assert_eq!(config.get_area_id(0), Err(ErrorCode::AreaNotSupported));
    }

    #[test]
    fn test_get_area_id_first_match_wins() {
        let config = PropertyConfig::from_raw(HVAC_AC_ON, vec![raw_seat(&[0x5, 0x1])]).unwrap();
        assert_eq!(config.get_area_id(0x1), Ok(0x5));
    }
}
