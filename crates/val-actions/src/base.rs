//! Behavior shared by every action
//!
//! `ActionCore` owns an action's identity, its element map and the cached
//! answer to "is this action supported on this vehicle, for which elements,
//! with which values". Get, set and offset actions wrap a core and add their
//! operation on top.

use crate::cache::publish_once;
use crate::hvac_power::HvacPowerUtils;
use crate::params::OptionalActionParameters;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, OnceLock};
use tracing::{debug, trace, warn};
use val_compat::{property_name, PermissionChecker, PropertyConfig, PropertyManagerCompat};
use val_core::{ActionValue, ElementAreaMap, ErrorCode, ErrorOr, PropertyValue, ValueRange, ValueType};

/// Collaborators shared by all actions of a category
#[derive(Clone)]
pub struct ActionContext {
    pub compat: Arc<PropertyManagerCompat>,
    pub permissions: Arc<dyn PermissionChecker>,
}

impl ActionContext {
    pub fn new(compat: Arc<PropertyManagerCompat>, permissions: Arc<dyn PermissionChecker>) -> Self {
        Self {
            compat,
            permissions,
        }
    }
}

/// What an action is: name, target property, permission and elements
#[derive(Debug, Clone)]
pub struct ActionDefinition<T: ActionValue> {
    pub name: String,
    pub property_id: i32,
    pub permission: String,
    pub element_to_area: ElementAreaMap,
    pub params: OptionalActionParameters<T>,
    /// Resolve HVAC power before touching the property
    pub hvac_power_dependent: bool,
}

impl<T: ActionValue> ActionDefinition<T> {
    pub fn new(
        name: impl Into<String>,
        property_id: i32,
        permission: impl Into<String>,
        element_to_area: ElementAreaMap,
    ) -> Self {
        Self {
            name: name.into(),
            property_id,
            permission: permission.into(),
            element_to_area,
            params: OptionalActionParameters::default(),
            hvac_power_dependent: false,
        }
    }

    pub fn with_params(mut self, params: OptionalActionParameters<T>) -> Self {
        self.params = params;
        self
    }

    pub fn dependent_on_hvac_power(mut self) -> Self {
        self.hvac_power_dependent = true;
        self
    }
}

struct SupportInfo<T> {
    supported: ErrorOr<bool>,
    elements: BTreeSet<String>,
    ranges: BTreeMap<String, ValueRange<T>>,
}

impl<T> SupportInfo<T> {
    fn unsupported(supported: ErrorOr<bool>) -> Self {
        Self {
            supported,
            elements: BTreeSet::new(),
            ranges: BTreeMap::new(),
        }
    }
}

/// State and checks common to all actions of value type `T`
pub struct ActionCore<T: ActionValue> {
    context: ActionContext,
    name: String,
    property_id: i32,
    permission: String,
    element_to_area: ElementAreaMap,
    params: OptionalActionParameters<T>,
    requires_write: bool,
    hvac_power: Option<HvacPowerUtils>,
    support: OnceLock<SupportInfo<T>>,
}

impl<T: ActionValue> ActionCore<T> {
    pub fn new(
        context: ActionContext,
        definition: ActionDefinition<T>,
        requires_write: bool,
    ) -> ErrorOr<Self> {
        let ActionDefinition {
            name,
            property_id,
            permission,
            element_to_area,
            params,
            hvac_power_dependent,
        } = definition;

        let numeric = matches!(T::VALUE_TYPE, ValueType::Int | ValueType::Float);
        let invalid = name.is_empty()
            || permission.is_empty()
            || element_to_area.is_empty()
            || (params.is_min_max_property && !numeric)
            || (!params.required_supported_values.is_empty() && !params.is_min_max_property);
        if invalid {
            warn!(action = %name, property = %property_name(property_id), "Invalid action definition");
            return Err(ErrorCode::BadValImpl);
        }

        let hvac_power = if hvac_power_dependent {
            Some(HvacPowerUtils::new(
                context.compat.clone(),
                property_id,
                element_to_area.clone(),
                params.enable_hvac_power_if_dependent,
            )?)
        } else {
            None
        };

        Ok(Self {
            context,
            name,
            property_id,
            permission,
            element_to_area,
            params,
            requires_write,
            hvac_power,
            support: OnceLock::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn property_id(&self) -> i32 {
        self.property_id
    }

    pub fn permission(&self) -> &str {
        &self.permission
    }

    pub fn element_to_area(&self) -> &ElementAreaMap {
        &self.element_to_area
    }

    pub fn params(&self) -> &OptionalActionParameters<T> {
        &self.params
    }

    pub fn compat(&self) -> &PropertyManagerCompat {
        &self.context.compat
    }

    pub fn context(&self) -> &ActionContext {
        &self.context
    }

    /// Present when the action resolves HVAC power before running
    pub fn hvac_power(&self) -> Option<&HvacPowerUtils> {
        self.hvac_power.as_ref()
    }

    /// Whether the vehicle supports this action
    ///
    /// Computed once per action, errors included.
    pub fn is_action_supported(&self) -> ErrorOr<bool> {
        self.support().supported
    }

    /// The error that makes every operation fail, if any
    pub fn action_error(&self) -> Option<ErrorCode> {
        match self.is_action_supported() {
            Ok(true) => None,
            Ok(false) => Some(ErrorCode::ActionNotSupported),
            Err(err) => Some(err),
        }
    }

    pub fn get_supported_elements(&self) -> ErrorOr<BTreeSet<String>> {
        if let Some(err) = self.action_error() {
            return Err(err);
        }
        Ok(self.support().elements.clone())
    }

    pub fn get_element_to_value_range_map(&self) -> ErrorOr<BTreeMap<String, ValueRange<T>>> {
        if let Some(err) = self.action_error() {
            return Err(err);
        }
        Ok(self.support().ranges.clone())
    }

    pub(crate) fn value_range(&self, element: &str) -> Option<&ValueRange<T>> {
        self.support().ranges.get(element)
    }

    /// Whether `element` accepts `value`
    ///
    /// Numeric elements without a range accept any value.
    pub fn does_element_support_value(&self, element: &str, value: &T) -> ErrorOr<bool> {
        if let Some(err) = self.action_error() {
            return Err(err);
        }
        let support = self.support();
        if !support.elements.contains(element) {
            debug!(action = %self.name, element = %element, "Element not supported");
            return Err(ErrorCode::ElementNotSupported);
        }
        match T::VALUE_TYPE {
            ValueType::Bool => Ok(true),
            _ => Ok(support
                .ranges
                .get(element)
                .map_or(true, |range| range.is_value_supported(value))),
        }
    }

    /// First reason `elements` cannot be operated on, if any
    pub fn check_are_elements_supported(&self, elements: &BTreeSet<String>) -> Option<ErrorCode> {
        if elements.is_empty() {
            warn!(action = %self.name, "No elements requested");
            return Some(ErrorCode::InvalidApiArgument);
        }
        if let Some(err) = self.action_error() {
            debug!(action = %self.name, error = %err, "Action not available");
            return Some(err);
        }
        if let Some(element) = elements
            .iter()
            .find(|element| !self.element_to_area.contains_element(element))
        {
            warn!(action = %self.name, element = %element, "Undefined element");
            return Some(ErrorCode::UndefinedElement);
        }
        let supported = &self.support().elements;
        if let Some(element) = elements.iter().find(|element| !supported.contains(*element)) {
            warn!(action = %self.name, element = %element, "Element not supported on this vehicle");
            return Some(ErrorCode::InvalidApiArgument);
        }
        None
    }

    /// Area ids of `elements`, all of which must resolve on the vehicle
    pub fn get_areas(&self, elements: &BTreeSet<String>) -> ErrorOr<BTreeSet<i32>> {
        if let Some(err) = self.action_error() {
            return Err(err);
        }
        let areas = self.element_to_area.get_areas(elements)?;
        if !self.compat().are_all_areas_supported(self.property_id, &areas)? {
            warn!(action = %self.name, areas = ?areas, "Areas not supported");
            return Err(ErrorCode::ElementNotSupported);
        }
        Ok(areas)
    }

    /// Read the property for `elements`
    pub fn get_internal(&self, elements: &BTreeSet<String>) -> ErrorOr<BTreeMap<String, ErrorOr<T>>> {
        let areas = self.get_areas(elements)?;
        let values = self.compat().get_values(self.property_id, &areas)?;

        Ok(values
            .into_iter()
            .filter_map(|(area, record)| {
                let element = self.element_to_area.element_for_area(area)?;
                let value = record.and_then(|record| {
                    T::from_property_value(&record.value).ok_or(ErrorCode::BadPlatformImpl)
                });
                if let Err(err) = &value {
                    debug!(action = %self.name, element = %element, error = %err, "Read failed");
                }
                Some((element.to_string(), value))
            })
            .collect())
    }

    /// Write `value` to `elements`, returning the elements that failed
    pub fn set_internal(
        &self,
        elements: &BTreeSet<String>,
        value: &T,
    ) -> ErrorOr<BTreeMap<String, ErrorCode>> {
        let areas = self.get_areas(elements)?;
        let results = self.compat().set_value_with_confirmation(
            self.property_id,
            &areas,
            &value.to_property_value(),
        )?;

        Ok(results
            .into_iter()
            .filter_map(|(area, result)| {
                let element = self.element_to_area.element_for_area(area)?;
                match result {
                    Ok(_) => {
                        trace!(action = %self.name, element = %element, "Updated");
                        None
                    }
                    Err(err) => {
                        debug!(action = %self.name, element = %element, error = %err, "Update failed");
                        Some((element.to_string(), err))
                    }
                }
            })
            .collect())
    }

    fn support(&self) -> &SupportInfo<T> {
        publish_once(&self.support, || {
            self.determine_support()
                .unwrap_or_else(|err| SupportInfo::unsupported(Err(err)))
        })
    }

    fn determine_support(&self) -> ErrorOr<SupportInfo<T>> {
        let name = property_name(self.property_id);
        if !self.context.permissions.is_granted(&self.permission) {
            warn!(action = %self.name, permission = %self.permission, "Permission not granted");
            return Err(ErrorCode::MissingRequiredPermission);
        }
        if !self.compat().is_property_supported(self.property_id)? {
            debug!(action = %self.name, property = %name, "Property not supported");
            return Ok(SupportInfo::unsupported(Ok(false)));
        }

        let config = self.compat().get_config(self.property_id)?;
        if config.value_type != T::VALUE_TYPE {
            warn!(
                action = %self.name,
                property = %name,
                expected = %T::VALUE_TYPE,
                actual = %config.value_type,
                "Property has the wrong value type"
            );
            return Err(ErrorCode::BadPlatformImpl);
        }
        if !config.are_all_areas_readable()
            || (self.requires_write && !config.are_all_areas_writable())
        {
            warn!(action = %self.name, property = %name, "Property lacks the required access");
            return Err(ErrorCode::BadPlatformImpl);
        }

        let (elements, ranges) = self.supported_elements_and_ranges(&config)?;
        let supported = if !elements.is_empty() {
            true
        } else if self.params.custom_value_range_generator.is_some() {
            debug!(action = %self.name, "No element has a usable range");
            false
        } else {
            warn!(action = %self.name, property = %name, "No element is supported");
            return Err(ErrorCode::BadValImpl);
        };

        debug!(action = %self.name, elements = ?elements, "Action support determined");
        if !supported {
            return Ok(SupportInfo::unsupported(Ok(false)));
        }
        if let Some(hvac_power) = &self.hvac_power {
            hvac_power.is_hvac_power_dependent()?;
        }
        Ok(SupportInfo {
            supported: Ok(true),
            elements,
            ranges,
        })
    }

    fn supported_elements_and_ranges(
        &self,
        config: &PropertyConfig,
    ) -> ErrorOr<(BTreeSet<String>, BTreeMap<String, ValueRange<T>>)> {
        let mut elements = BTreeSet::new();
        let mut ranges = BTreeMap::new();
        let generator = self.params.custom_value_range_generator.as_ref();

        for (element, area) in self.element_to_area.iter() {
            let Ok(area_id) = config.get_area_id(area) else {
                trace!(action = %self.name, element = %element, "Area not in config");
                continue;
            };

            if self.params.is_min_max_property {
                let area_config = config.area_config(area_id).ok_or(ErrorCode::BadPlatformImpl)?;
                let min = area_config.min_value.as_ref().and_then(T::from_property_value);
                let max = area_config.max_value.as_ref().and_then(T::from_property_value);
                let (min, max) = match (min, max) {
                    (Some(min), Some(max)) if min < max => (min, max),
                    _ => {
                        warn!(
                            action = %self.name,
                            element = %element,
                            min = ?area_config.min_value,
                            max = ?area_config.max_value,
                            "Invalid min/max"
                        );
                        return Err(ErrorCode::BadPlatformImpl);
                    }
                };

                let range = match generator {
                    Some(generator) => {
                        generator.value_range_from_min_max(min, max, &config.config_array)
                    }
                    None => T::values_between(&min, &max).and_then(ValueRange::new),
                };
                let range = match range {
                    Ok(range) => range,
                    Err(ErrorCode::AreaNotSupported) => {
                        debug!(action = %self.name, element = %element, "Range excludes element");
                        continue;
                    }
                    Err(err) => return Err(err),
                };

                if !self
                    .params
                    .required_supported_values
                    .iter()
                    .all(|value| range.is_value_supported(value))
                {
                    warn!(action = %self.name, element = %element, "Required values not supported");
                    return Err(ErrorCode::BadPlatformImpl);
                }
                ranges.insert(element.to_string(), range);
            } else if let Some(generator) = generator {
                let range = generator.value_range_for_area(self.compat(), area)?;
                ranges.insert(element.to_string(), range);
            }

            elements.insert(element.to_string());
        }

        Ok((elements, ranges))
    }
}

/// Value-type-erased view of an action
///
/// Lets the dispatcher answer queries without knowing the action's type.
pub trait ActionInfo: Send + Sync {
    fn name(&self) -> &str;
    fn property_id(&self) -> i32;
    fn value_type(&self) -> ValueType;
    fn is_action_supported(&self) -> ErrorOr<bool>;
    fn get_supported_elements(&self) -> ErrorOr<BTreeSet<String>>;
    fn check_are_elements_supported(&self, elements: &BTreeSet<String>) -> Option<ErrorCode>;

    /// `BadValImpl` when `value` has a different type than the action
    fn does_element_support_property_value(&self, element: &str, value: &PropertyValue) -> ErrorOr<bool>;

    /// Supported values of each element
    fn supported_property_values(&self) -> ErrorOr<BTreeMap<String, Vec<PropertyValue>>>;
}

impl<T: ActionValue> ActionInfo for ActionCore<T> {
    fn name(&self) -> &str {
        ActionCore::name(self)
    }

    fn property_id(&self) -> i32 {
        ActionCore::property_id(self)
    }

    fn value_type(&self) -> ValueType {
        T::VALUE_TYPE
    }

    fn is_action_supported(&self) -> ErrorOr<bool> {
        ActionCore::is_action_supported(self)
    }

    fn get_supported_elements(&self) -> ErrorOr<BTreeSet<String>> {
        ActionCore::get_supported_elements(self)
    }

    fn check_are_elements_supported(&self, elements: &BTreeSet<String>) -> Option<ErrorCode> {
        ActionCore::check_are_elements_supported(self, elements)
    }

    fn does_element_support_property_value(&self, element: &str, value: &PropertyValue) -> ErrorOr<bool> {
        let value = T::from_property_value(value).ok_or(ErrorCode::BadValImpl)?;
        self.does_element_support_value(element, &value)
    }

    fn supported_property_values(&self) -> ErrorOr<BTreeMap<String, Vec<PropertyValue>>> {
        Ok(self
            .get_element_to_value_range_map()?
            .into_iter()
            .map(|(element, range)| {
                let values = range
                    .supported_values()
                    .iter()
                    .map(ActionValue::to_property_value)
                    .collect();
                (element, values)
            })
            .collect())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use val_compat::ids::{SEAT_ROW_1_LEFT, SEAT_ROW_1_RIGHT, SEAT_ROW_2_LEFT, SEAT_ROW_3_LEFT};
    use val_compat::{FakeVehicle, StaticPermissions};

    pub const PERMISSION: &str = "android.car.permission.CONTROL_CAR_CLIMATE";

    pub fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    pub fn context(fake: &Arc<FakeVehicle>) -> ActionContext {
        init_tracing();
        ActionContext::new(
            Arc::new(PropertyManagerCompat::new(fake.clone())),
            Arc::new(StaticPermissions::granting([PERMISSION])),
        )
    }

    /// Front seats, the second-row left seat and a third-row seat the
    /// climate fake does not cover
    pub fn seat_map() -> ElementAreaMap {
        ElementAreaMap::new([
            ("SEAT_ROW_1_LEFT", SEAT_ROW_1_LEFT),
            ("SEAT_ROW_1_RIGHT", SEAT_ROW_1_RIGHT),
            ("SEAT_ROW_2_LEFT", SEAT_ROW_2_LEFT),
            ("SEAT_ROW_3_LEFT", SEAT_ROW_3_LEFT),
        ])
        .unwrap()
    }

    pub fn seats(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::generator::{ZeroOrGreaterThan, ZeroOrLessThan};
    use std::sync::Barrier;
    use std::thread;
    use val_compat::ids::{
        HVAC_AC_ON, HVAC_FAN_SPEED, HVAC_POWER_ON, HVAC_SEAT_TEMPERATURE, HVAC_TEMPERATURE_DISPLAY_UNITS,
    };
    use val_compat::{FakeVehicle, HalError, StaticPermissions};

    fn build<T: ActionValue>(
        fake: &Arc<FakeVehicle>,
        property_id: i32,
        params: OptionalActionParameters<T>,
    ) -> ActionCore<T> {
        let definition = ActionDefinition::new("TEST_ACTION", property_id, PERMISSION, seat_map())
            .with_params(params);
        ActionCore::new(context(fake), definition, true).unwrap()
    }

    fn min_max<T: ActionValue>() -> OptionalActionParameters<T> {
        OptionalActionParameters {
            is_min_max_property: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_definition_preconditions() {
        let fake = Arc::new(FakeVehicle::climate());
        let bool_min_max = ActionDefinition::<bool>::new("A", HVAC_AC_ON, PERMISSION, seat_map())
            .with_params(min_max());
        assert!(matches!(
            ActionCore::new(context(&fake), bool_min_max, false),
            Err(ErrorCode::BadValImpl)
        ));

        let required_without_min_max = ActionDefinition::<i32>::new("A", HVAC_FAN_SPEED, PERMISSION, seat_map())
            .with_params(OptionalActionParameters {
                required_supported_values: vec![1],
                ..Default::default()
            });
        assert!(matches!(
            ActionCore::new(context(&fake), required_without_min_max, false),
            Err(ErrorCode::BadValImpl)
        ));

        let no_permission = ActionDefinition::<bool>::new("A", HVAC_AC_ON, "", seat_map());
        assert!(matches!(
            ActionCore::new(context(&fake), no_permission, false),
            Err(ErrorCode::BadValImpl)
        ));
    }

    #[test]
    fn test_supported_elements_follow_config() {
        let fake = Arc::new(FakeVehicle::climate());
        let core = build::<bool>(&fake, HVAC_AC_ON, Default::default());
        assert_eq!(core.is_action_supported(), Ok(true));
        assert_eq!(
            core.get_supported_elements(),
            Ok(seats(&["SEAT_ROW_1_LEFT", "SEAT_ROW_1_RIGHT", "SEAT_ROW_2_LEFT"]))
        );
    }

    #[test]
    fn test_missing_permission() {
        let fake = Arc::new(FakeVehicle::climate());
        let context = ActionContext::new(
            Arc::new(PropertyManagerCompat::new(fake.clone())),
            Arc::new(StaticPermissions::none()),
        );
        let definition = ActionDefinition::<bool>::new("A", HVAC_AC_ON, PERMISSION, seat_map());
        let core = ActionCore::new(context, definition, false).unwrap();
        assert_eq!(core.is_action_supported(), Err(ErrorCode::MissingRequiredPermission));
        assert_eq!(fake.total_calls(), 0);
    }

    #[test]
    fn test_unsupported_property() {
        let fake = Arc::new(FakeVehicle::climate());
        fake.remove_property(HVAC_AC_ON);
        let core = build::<bool>(&fake, HVAC_AC_ON, Default::default());
        assert_eq!(core.is_action_supported(), Ok(false));
        assert_eq!(core.get_supported_elements(), Err(ErrorCode::ActionNotSupported));
    }

    #[test]
    fn test_wrong_type_is_platform_error() {
        let fake = Arc::new(FakeVehicle::climate());
        let core = build::<i32>(&fake, HVAC_AC_ON, Default::default());
        assert_eq!(core.is_action_supported(), Err(ErrorCode::BadPlatformImpl));
    }

    #[test]
    fn test_write_access_required() {
        let fake = Arc::new(FakeVehicle::climate());
        let definition =
            ActionDefinition::<i32>::new("A", HVAC_TEMPERATURE_DISPLAY_UNITS, PERMISSION, ElementAreaMap::global());
        fake.add_property(
            val_compat::RawPropertyConfig::new(
                HVAC_TEMPERATURE_DISPLAY_UNITS,
                ValueType::Int,
                val_compat::PropertyAccess::Read,
            )
            .with_areas([val_compat::RawAreaConfig::new(0)]),
        );
        let core = ActionCore::new(context(&fake), definition.clone(), true).unwrap();
        assert_eq!(core.is_action_supported(), Err(ErrorCode::BadPlatformImpl));

        let read_only = ActionCore::new(context(&fake), definition, false).unwrap();
        assert_eq!(read_only.is_action_supported(), Ok(true));
    }

    #[test]
    fn test_min_max_ranges() {
        let fake = Arc::new(FakeVehicle::climate());
        let core = build::<i32>(&fake, HVAC_FAN_SPEED, min_max());
        let ranges = core.get_element_to_value_range_map().unwrap();
        assert_eq!(ranges["SEAT_ROW_1_LEFT"].supported_values(), &[1, 2, 3, 4, 5, 6]);
        assert_eq!(core.does_element_support_value("SEAT_ROW_1_LEFT", &6), Ok(true));
        assert_eq!(core.does_element_support_value("SEAT_ROW_1_LEFT", &7), Ok(false));
        assert_eq!(
            core.does_element_support_value("SEAT_ROW_3_LEFT", &1),
            Err(ErrorCode::ElementNotSupported)
        );
    }

    #[test]
    fn test_required_values_must_be_supported() {
        let fake = Arc::new(FakeVehicle::climate());
        let core = build::<i32>(
            &fake,
            HVAC_FAN_SPEED,
            OptionalActionParameters {
                is_min_max_property: true,
                required_supported_values: vec![0],
                ..Default::default()
            },
        );
        assert_eq!(core.is_action_supported(), Err(ErrorCode::BadPlatformImpl));
    }

    #[test]
    fn test_invalid_min_max_is_platform_error() {
        let fake = Arc::new(FakeVehicle::climate());
        fake.add_property(
            val_compat::RawPropertyConfig::new(HVAC_FAN_SPEED, ValueType::Int, val_compat::PropertyAccess::ReadWrite)
                .with_areas([val_compat::RawAreaConfig::new(0x11)
                    .with_range(PropertyValue::Int(3), PropertyValue::Int(3))]),
        );
        let core = build::<i32>(&fake, HVAC_FAN_SPEED, min_max());
        assert_eq!(core.is_action_supported(), Err(ErrorCode::BadPlatformImpl));
    }

    #[test]
    fn test_generator_ranges() {
        let fake = Arc::new(FakeVehicle::climate());
        let heating = build::<i32>(
            &fake,
            HVAC_SEAT_TEMPERATURE,
            OptionalActionParameters {
                is_min_max_property: true,
                required_supported_values: vec![0],
                custom_value_range_generator: Some(Arc::new(ZeroOrGreaterThan)),
                ..Default::default()
            },
        );
        let ranges = heating.get_element_to_value_range_map().unwrap();
        assert_eq!(ranges["SEAT_ROW_1_LEFT"].supported_values(), &[0, 1, 2, 3]);

        let cooling = build::<i32>(
            &fake,
            HVAC_SEAT_TEMPERATURE,
            OptionalActionParameters {
                is_min_max_property: true,
                custom_value_range_generator: Some(Arc::new(ZeroOrLessThan)),
                ..Default::default()
            },
        );
        let ranges = cooling.get_element_to_value_range_map().unwrap();
        assert_eq!(ranges["SEAT_ROW_1_RIGHT"].supported_values(), &[-3, -2, -1, 0]);
    }

    #[test]
    fn test_generator_excluding_every_area_means_unsupported() {
        let fake = Arc::new(FakeVehicle::climate());
        fake.add_property(
            val_compat::RawPropertyConfig::new(
                HVAC_SEAT_TEMPERATURE,
                ValueType::Int,
                val_compat::PropertyAccess::ReadWrite,
            )
            .with_areas([val_compat::RawAreaConfig::new(0x1)
                .with_range(PropertyValue::Int(0), PropertyValue::Int(3))]),
        );
        let cooling = build::<i32>(
            &fake,
            HVAC_SEAT_TEMPERATURE,
            OptionalActionParameters {
                is_min_max_property: true,
                custom_value_range_generator: Some(Arc::new(ZeroOrLessThan)),
                ..Default::default()
            },
        );
        assert_eq!(cooling.is_action_supported(), Ok(false));
    }

    #[test]
    fn test_no_supported_element_without_generator() {
        let fake = Arc::new(FakeVehicle::climate());
        let definition = ActionDefinition::<bool>::new(
            "A",
            HVAC_AC_ON,
            PERMISSION,
            ElementAreaMap::new([("SEAT_ROW_3_LEFT", 0x100)]).unwrap(),
        );
        let core = ActionCore::new(context(&fake), definition, false).unwrap();
        assert_eq!(core.is_action_supported(), Err(ErrorCode::BadValImpl));
    }

    #[test]
    fn test_check_are_elements_supported_order() {
        let fake = Arc::new(FakeVehicle::climate());
        let core = build::<bool>(&fake, HVAC_AC_ON, Default::default());
        assert_eq!(
            core.check_are_elements_supported(&BTreeSet::new()),
            Some(ErrorCode::InvalidApiArgument)
        );
        assert_eq!(
            core.check_are_elements_supported(&seats(&["SEAT_ROW_3_LEFT", "TRUNK"])),
            Some(ErrorCode::UndefinedElement)
        );
        assert_eq!(
            core.check_are_elements_supported(&seats(&["SEAT_ROW_3_LEFT"])),
            Some(ErrorCode::InvalidApiArgument)
        );
        assert_eq!(core.check_are_elements_supported(&seats(&["SEAT_ROW_1_LEFT"])), None);

        let unsupported = Arc::new(FakeVehicle::climate());
        unsupported.remove_property(HVAC_AC_ON);
        let core = build::<bool>(&unsupported, HVAC_AC_ON, Default::default());
        assert_eq!(
            core.check_are_elements_supported(&seats(&["SEAT_ROW_1_LEFT"])),
            Some(ErrorCode::ActionNotSupported)
        );
    }

    #[test]
    fn test_support_errors_are_cached() {
        let fake = Arc::new(FakeVehicle::climate());
        fake.fail_config(HVAC_AC_ON, HalError::Internal("starting".into()));
        let core = build::<bool>(&fake, HVAC_AC_ON, Default::default());
        assert_eq!(core.is_action_supported(), Err(ErrorCode::PlatformInternalError));
        let lookups = fake.config_lookups();

        fake.clear_config_failure(HVAC_AC_ON);
        assert_eq!(core.is_action_supported(), Err(ErrorCode::PlatformInternalError));
        assert_eq!(core.get_supported_elements(), Err(ErrorCode::PlatformInternalError));
        assert_eq!(fake.config_lookups(), lookups);
    }

    #[test]
    fn test_unsupported_action_skips_hvac_power_lookup() {
        let fake = Arc::new(FakeVehicle::climate());
        fake.add_property(
            val_compat::RawPropertyConfig::new(HVAC_FAN_SPEED, ValueType::Int, val_compat::PropertyAccess::ReadWrite)
                .with_areas([val_compat::RawAreaConfig::new(0x11)
                    .with_range(PropertyValue::Int(1), PropertyValue::Int(6))]),
        );
        fake.fail_config(HVAC_POWER_ON, HalError::Internal("starting".into()));
        let definition = ActionDefinition::<i32>::new("A", HVAC_FAN_SPEED, PERMISSION, seat_map())
            .with_params(OptionalActionParameters {
                is_min_max_property: true,
                custom_value_range_generator: Some(Arc::new(ZeroOrLessThan)),
                ..Default::default()
            })
            .dependent_on_hvac_power();
        let core = ActionCore::new(context(&fake), definition, true).unwrap();

        assert_eq!(core.is_action_supported(), Ok(false));
        assert_eq!(
            core.hvac_power().map(|hvac_power| hvac_power.is_hvac_power_dependent()),
            Some(Err(ErrorCode::PlatformInternalError))
        );
    }

    #[test]
    fn test_supported_dependent_action_surfaces_hvac_power_error() {
        let fake = Arc::new(FakeVehicle::climate());
        fake.fail_config(HVAC_POWER_ON, HalError::Internal("starting".into()));
        let definition = ActionDefinition::<i32>::new("A", HVAC_FAN_SPEED, PERMISSION, seat_map())
            .with_params(min_max())
            .dependent_on_hvac_power();
        let core = ActionCore::new(context(&fake), definition, true).unwrap();
        assert_eq!(core.is_action_supported(), Err(ErrorCode::PlatformInternalError));
    }

    #[test]
    fn test_oversized_min_max_span_is_platform_error() {
        let fake = Arc::new(FakeVehicle::climate());
        fake.add_property(
            val_compat::RawPropertyConfig::new(HVAC_FAN_SPEED, ValueType::Int, val_compat::PropertyAccess::ReadWrite)
                .with_areas([val_compat::RawAreaConfig::new(0x11)
                    .with_range(PropertyValue::Int(0), PropertyValue::Int(i32::MAX))]),
        );
        let core = build::<i32>(&fake, HVAC_FAN_SPEED, min_max());
        assert_eq!(core.is_action_supported(), Err(ErrorCode::BadPlatformImpl));
    }

    #[test]
    fn test_concurrent_support_checks_agree() {
        const THREADS: usize = 8;
        let fake = Arc::new(FakeVehicle::climate());
        let core = Arc::new(build::<i32>(&fake, HVAC_FAN_SPEED, min_max()));
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let (core, barrier) = (core.clone(), barrier.clone());
                thread::spawn(move || {
                    barrier.wait();
                    (core.is_action_supported(), core.get_supported_elements())
                })
            })
            .collect();

        for handle in handles {
            let (supported, elements) = handle.join().unwrap();
            assert_eq!(supported, Ok(true));
            assert_eq!(
                elements,
                Ok(seats(&["SEAT_ROW_1_LEFT", "SEAT_ROW_1_RIGHT", "SEAT_ROW_2_LEFT"]))
            );
        }
    }

    #[test]
    fn test_get_and_set_internal() {
        let fake = Arc::new(FakeVehicle::climate());
        let core = build::<i32>(&fake, HVAC_FAN_SPEED, min_max());
        let errors = core
            .set_internal(&seats(&["SEAT_ROW_1_LEFT", "SEAT_ROW_1_RIGHT"]), &3)
            .unwrap();
        assert!(errors.is_empty());

        let values = core.get_internal(&seats(&["SEAT_ROW_2_LEFT", "SEAT_ROW_1_RIGHT"])).unwrap();
        assert_eq!(values["SEAT_ROW_2_LEFT"], Ok(3));
        assert_eq!(values["SEAT_ROW_1_RIGHT"], Ok(3));
    }

    #[test]
    fn test_erased_value_type_mismatch() {
        let fake = Arc::new(FakeVehicle::climate());
        let core = build::<i32>(&fake, HVAC_FAN_SPEED, min_max());
        let info: &dyn ActionInfo = &core;
        assert_eq!(
            info.does_element_support_property_value("SEAT_ROW_1_LEFT", &PropertyValue::Bool(true)),
            Err(ErrorCode::BadValImpl)
        );
        assert_eq!(
            info.does_element_support_property_value("SEAT_ROW_1_LEFT", &PropertyValue::Int(2)),
            Ok(true)
        );
        assert_eq!(info.value_type(), ValueType::Int);
    }
}
