//! Normalized, validating access to vehicle properties

use crate::config::{PropertyConfig, PropertyValueRecord};
use crate::hal::{PropertyStatus, RawPropertyValue, VehicleHal};
use crate::ids::property_name;
use dashmap::DashMap;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, trace, warn};
use val_core::{ErrorCode, ErrorOr, PropertyValue};

/// Per-area outcome of a read or confirmed write, keyed by requested area
pub type AreaResults = BTreeMap<i32, ErrorOr<PropertyValueRecord>>;

/// Validated property access over a `VehicleHal`
///
/// Configs are validated once and cached. Reads and writes are addressed by
/// the caller's area ids, which may be narrower than the config areas they
/// resolve to.
pub struct PropertyManagerCompat {
    hal: Arc<dyn VehicleHal>,
    configs: DashMap<i32, PropertyConfig>,
}

impl PropertyManagerCompat {
    pub fn new(hal: Arc<dyn VehicleHal>) -> Self {
        Self {
            hal,
            configs: DashMap::new(),
        }
    }

    /// Validated config of `property_id`
    ///
    /// Only successful validations are cached.
    pub fn get_config(&self, property_id: i32) -> ErrorOr<PropertyConfig> {
        if let Some(config) = self.configs.get(&property_id) {
            return Ok(config.clone());
        }

        let raw = self.hal.property_list(property_id).map_err(|err| {
            debug!(property = %property_name(property_id), error = %err, "Config lookup failed");
            ErrorCode::from(err)
        })?;
        let config = PropertyConfig::from_raw(property_id, raw)?;

        debug!(
            property = %property_name(property_id),
            value_type = %config.value_type,
            areas = config.areas.len(),
            "Loaded property config"
        );
        self.configs.insert(property_id, config.clone());
        Ok(config)
    }

    /// `Ok(false)` when the platform does not know the property
    pub fn is_property_supported(&self, property_id: i32) -> ErrorOr<bool> {
        match self.get_config(property_id) {
            Ok(_) => Ok(true),
            Err(ErrorCode::PropertyNotSupported) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Whether every area resolves against the config of `property_id`
    pub fn are_all_areas_supported(&self, property_id: i32, areas: &BTreeSet<i32>) -> ErrorOr<bool> {
        if areas.is_empty() {
            return Err(ErrorCode::BadValImpl);
        }
        let config = self.get_config(property_id)?;
        Ok(areas.iter().all(|area| config.get_area_id(*area).is_ok()))
    }

    /// Read `property_id` for each requested area
    ///
    /// Requested areas that resolve to the same config area share one read.
    pub fn get_values(&self, property_id: i32, areas: &BTreeSet<i32>) -> ErrorOr<AreaResults> {
        if areas.is_empty() {
            return Err(ErrorCode::BadValImpl);
        }
        let config = self.get_config(property_id)?;

        let mut by_area_id: BTreeMap<i32, ErrorOr<PropertyValueRecord>> = BTreeMap::new();
        let mut results = AreaResults::new();

        for area in areas {
            let area_id = match config.get_area_id(*area) {
                Ok(area_id) => area_id,
                Err(err) => {
                    results.insert(*area, Err(err));
                    continue;
                }
            };
            let record = by_area_id
                .entry(area_id)
                .or_insert_with(|| self.read_area(&config, area_id))
                .clone();
            results.insert(*area, record);
        }

        Ok(results)
    }

    /// Write `value` to each requested area and confirm it by reading back
    ///
    /// Areas already holding the value report `ValueAlreadySet` and are not
    /// written. A read-back that disagrees with the request reports
    /// `SetPropertyCallbackTimedOut`.
    pub fn set_value_with_confirmation(
        &self,
        property_id: i32,
        areas: &BTreeSet<i32>,
        value: &PropertyValue,
    ) -> ErrorOr<AreaResults> {
        if areas.is_empty() {
            return Err(ErrorCode::BadValImpl);
        }
        let config = self.get_config(property_id)?;
        if value.value_type() != config.value_type {
            warn!(
                property = %property_name(property_id),
                expected = %config.value_type,
                actual = %value.value_type(),
                "Set value has the wrong type"
            );
            return Err(ErrorCode::BadValImpl);
        }

        let current = self.get_values(property_id, areas).map_err(|err| {
            warn!(property = %property_name(property_id), error = %err, "Pre-write read failed");
            ErrorCode::BadValImpl
        })?;

        let mut results = AreaResults::new();
        let mut to_write: BTreeMap<i32, Vec<i32>> = BTreeMap::new();

        for area in areas {
            match current.get(area) {
                None => {
                    results.insert(*area, Err(ErrorCode::BadPlatformImpl));
                }
                Some(Err(err)) => {
                    results.insert(*area, Err(*err));
                }
                Some(Ok(record)) if record.value.value_equals(value) => {
                    trace!(property = %property_name(property_id), area = *area, "Value already set");
                    results.insert(*area, Err(ErrorCode::ValueAlreadySet));
                }
                Some(Ok(record)) => {
                    to_write.entry(record.area_id).or_default().push(*area);
                }
            }
        }

        for (area_id, requested) in to_write {
            let outcome = self.write_area(&config, area_id, value);
            for area in requested {
                results.insert(area, outcome.clone());
            }
        }

        if results.len() != areas.len() || !results.keys().eq(areas.iter()) {
            warn!(property = %property_name(property_id), "Set results do not cover the request");
            return Err(ErrorCode::BadPlatformImpl);
        }
        Ok(results)
    }

    fn read_area(&self, config: &PropertyConfig, area_id: i32) -> ErrorOr<PropertyValueRecord> {
        let readable = config
            .area_config(area_id)
            .map(|area| area.readable)
            .unwrap_or(false);
        if !readable {
            return Err(ErrorCode::AreaNotReadable);
        }

        let raw = self
            .hal
            .get_property(config.property_id, area_id)
            .map_err(|err| {
                debug!(
                    property = %property_name(config.property_id),
                    area_id = area_id,
                    error = %err,
                    "Read failed"
                );
                ErrorCode::from(err)
            })?;
        self.validate_read(config, area_id, raw)
    }

    fn validate_read(
        &self,
        config: &PropertyConfig,
        area_id: i32,
        raw: RawPropertyValue,
    ) -> ErrorOr<PropertyValueRecord> {
        let name = property_name(config.property_id);
        if raw.property_id != config.property_id || raw.area_id != area_id {
            warn!(
                property = %name,
                area_id = area_id,
                returned_area = raw.area_id,
                "Read returned a value for a different property or area"
            );
            return Err(ErrorCode::BadPlatformImpl);
        }

        match raw.status {
            PropertyStatus::Available => {}
            PropertyStatus::Unavailable => return Err(ErrorCode::PropertyNotAvailable),
            PropertyStatus::Error => return Err(ErrorCode::PlatformInternalError),
        }

        let value = raw.value.ok_or_else(|| {
            warn!(property = %name, area_id = area_id, "Available value has no payload");
            ErrorCode::BadPlatformImpl
        })?;
        if value.value_type() != config.value_type {
            warn!(
                property = %name,
                expected = %config.value_type,
                actual = %value.value_type(),
                "Read returned the wrong value type"
            );
            return Err(ErrorCode::BadPlatformImpl);
        }

        trace!(property = %name, area_id = area_id, value = %value, "Read value");
        Ok(PropertyValueRecord {
            property_id: config.property_id,
            area_id,
            value,
        })
    }

    fn write_area(
        &self,
        config: &PropertyConfig,
        area_id: i32,
        value: &PropertyValue,
    ) -> ErrorOr<PropertyValueRecord> {
        let name = property_name(config.property_id);
        let writable = config
            .area_config(area_id)
            .map(|area| area.writable)
            .unwrap_or(false);
        if !writable {
            return Err(ErrorCode::AreaNotWritable);
        }

        debug!(property = %name, area_id = area_id, value = %value, "Writing value");
        self.hal
            .set_property(config.property_id, area_id, value)
            .map_err(|err| {
                warn!(property = %name, area_id = area_id, error = %err, "Write failed");
                ErrorCode::from(err)
            })?;

        let raw = self
            .hal
            .get_property(config.property_id, area_id)
            .map_err(ErrorCode::from)?;
        let record = self.validate_read(config, area_id, raw)?;
        if !record.value.value_equals(value) {
            warn!(
                property = %name,
                area_id = area_id,
                requested = %value,
                confirmed = %record.value,
                "Write was not confirmed"
            );
            return Err(ErrorCode::SetPropertyCallbackTimedOut);
        }
        Ok(record)
    }
}
