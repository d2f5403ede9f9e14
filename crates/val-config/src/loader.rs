//! Building action categories from YAML

use crate::error::{ConfigError, ConfigResult};
use crate::schema::{
    ActionDeclaration, ActionKindDeclaration, CategoryFile, GeneratorDeclaration, PropertyRef, ScalarValue,
};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, info};
use val_actions::{
    Action, ActionContext, ActionDefinition, CustomValueRangeGenerator, GetAction, GetActionKind,
    HvacTargetTemperatureGetAction, HvacTargetTemperatureOffsetAction, HvacTargetTemperatureSetAction,
    HvacTemperatureSetValueRangeGenerator, OffsetAction, OffsetActionKind, OptionalActionParameters,
    SetAction, SetActionKind, ZeroOrGreaterThan, ZeroOrLessThan,
};
use val_compat::ids::HVAC_TEMPERATURE_SET;
use val_compat::{parse_property_id, PermissionChecker, PropertyManagerCompat};
use val_core::{ActionValue, ElementAreaMap, ErrorOr, ValueType};
use val_registry::ActionCategory;

/// Load a category file and build its actions
pub fn load_category_file(
    path: impl AsRef<Path>,
    compat: Arc<PropertyManagerCompat>,
    permissions: Arc<dyn PermissionChecker>,
    handle: Handle,
) -> ConfigResult<ActionCategory> {
    let path = path.as_ref();
    debug!(path = ?path, "Loading category file");

    let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    let file = parse_category(&content, path)?;
    build_category(&file, compat, permissions, handle)
}

/// Build a category from YAML text
pub fn load_category_str(
    content: &str,
    compat: Arc<PropertyManagerCompat>,
    permissions: Arc<dyn PermissionChecker>,
    handle: Handle,
) -> ConfigResult<ActionCategory> {
    let file = parse_category(content, Path::new("<string>"))?;
    build_category(&file, compat, permissions, handle)
}

/// Parse and validate without building anything
pub fn parse_category(content: &str, source_path: &Path) -> ConfigResult<CategoryFile> {
    let file: CategoryFile = serde_yaml::from_str(content).map_err(|source| ConfigError::ParseYaml {
        path: source_path.to_path_buf(),
        source,
    })?;
    validate(&file)?;
    Ok(file)
}

/// Structural checks over the whole file
pub fn validate(file: &CategoryFile) -> ConfigResult<()> {
    if file.category.trim().is_empty() {
        return Err(ConfigError::invalid("category", "must not be empty"));
    }
    if file.elements.is_empty() {
        return Err(ConfigError::ValidationFailed {
            message: format!("category '{}' declares no elements", file.category),
        });
    }
    if file.actions.is_empty() {
        return Err(ConfigError::ValidationFailed {
            message: format!("category '{}' declares no actions", file.category),
        });
    }

    let mut areas: BTreeMap<i32, &str> = BTreeMap::new();
    for (element, area) in &file.elements {
        if element.is_empty() {
            return Err(ConfigError::invalid("elements", "element names must not be empty"));
        }
        if let Some(other) = areas.insert(*area, element) {
            return Err(ConfigError::ValidationFailed {
                message: format!("area 0x{area:x} is mapped by both '{other}' and '{element}'"),
            });
        }
    }

    let mut names = BTreeSet::new();
    for (index, action) in file.actions.iter().enumerate() {
        if action.name.trim().is_empty() {
            return Err(ConfigError::invalid(format!("actions[{index}].name"), "must not be empty"));
        }
        if !names.insert(action.name.as_str()) {
            return Err(ConfigError::ValidationFailed {
                message: format!("duplicate action '{}'", action.name),
            });
        }
    }
    Ok(())
}

/// Build every declared action into one category
pub fn build_category(
    file: &CategoryFile,
    compat: Arc<PropertyManagerCompat>,
    permissions: Arc<dyn PermissionChecker>,
    handle: Handle,
) -> ConfigResult<ActionCategory> {
    validate(file)?;
    let elements = ElementAreaMap::new(file.elements.iter().map(|(name, area)| (name.clone(), *area)))
        .map_err(|source| ConfigError::Build {
            name: file.category.clone(),
            source,
        })?;
    let builder = Builder {
        context: ActionContext::new(compat, permissions),
        elements,
        default_permission: file.permission.as_deref(),
    };

    let actions = file
        .actions
        .iter()
        .map(|declaration| builder.action(declaration))
        .collect::<ConfigResult<Vec<_>>>()?;
    let count = actions.len();
    let category = ActionCategory::new(file.category.clone(), actions, handle).map_err(|source| {
        ConfigError::Build {
            name: file.category.clone(),
            source,
        }
    })?;

    info!(category = %file.category, actions = count, "Loaded action category");
    Ok(category)
}

/// Value types a declaration can carry literals and generators for
trait DeclaredValue: ActionValue {
    fn from_scalar(value: ScalarValue) -> Option<Self>;
    fn generator(generator: GeneratorDeclaration) -> Option<Arc<dyn CustomValueRangeGenerator<Self>>>;
}

impl DeclaredValue for bool {
    fn from_scalar(value: ScalarValue) -> Option<Self> {
        match value {
            ScalarValue::Bool(v) => Some(v),
            _ => None,
        }
    }

    fn generator(_generator: GeneratorDeclaration) -> Option<Arc<dyn CustomValueRangeGenerator<Self>>> {
        None
    }
}

impl DeclaredValue for i32 {
    fn from_scalar(value: ScalarValue) -> Option<Self> {
        match value {
            ScalarValue::Int(v) => i32::try_from(v).ok(),
            _ => None,
        }
    }

    fn generator(generator: GeneratorDeclaration) -> Option<Arc<dyn CustomValueRangeGenerator<Self>>> {
        match generator {
            GeneratorDeclaration::ZeroOrGreater => Some(Arc::new(ZeroOrGreaterThan)),
            GeneratorDeclaration::ZeroOrLess => Some(Arc::new(ZeroOrLessThan)),
            GeneratorDeclaration::HvacTemperature => None,
        }
    }
}

impl DeclaredValue for f32 {
    fn from_scalar(value: ScalarValue) -> Option<Self> {
        match value {
            ScalarValue::Int(v) => Some(v as f32),
            ScalarValue::Float(v) => Some(v as f32),
            ScalarValue::Bool(_) => None,
        }
    }

    fn generator(generator: GeneratorDeclaration) -> Option<Arc<dyn CustomValueRangeGenerator<Self>>> {
        match generator {
            GeneratorDeclaration::ZeroOrGreater => Some(Arc::new(ZeroOrGreaterThan)),
            GeneratorDeclaration::ZeroOrLess => Some(Arc::new(ZeroOrLessThan)),
            GeneratorDeclaration::HvacTemperature => Some(Arc::new(HvacTemperatureSetValueRangeGenerator)),
        }
    }
}

struct Builder<'a> {
    context: ActionContext,
    elements: ElementAreaMap,
    default_permission: Option<&'a str>,
}

impl Builder<'_> {
    fn action(&self, declaration: &ActionDeclaration) -> ConfigResult<Action> {
        use ActionKindDeclaration as Kind;

        let key = format!("actions.{}", declaration.name);
        let property_id = self.property_id(declaration, &key)?;
        let permission = declaration
            .permission
            .as_deref()
            .or(self.default_permission)
            .ok_or_else(|| ConfigError::invalid(format!("{key}.permission"), "no permission declared"))?;
        let value_type = self.value_type(declaration, &key)?;
        debug!(action = %declaration.name, kind = %declaration.kind, value_type = %value_type, "Building action");

        let context = self.context.clone();
        let name = declaration.name.as_str();
        let enable = declaration.enable_hvac_power_if_dependent;
        let elements = self.elements.clone();

        let built: ErrorOr<Action> = match (declaration.kind, value_type) {
            (Kind::Get, ValueType::Bool) => {
                GetAction::new(context, self.definition::<bool>(declaration, property_id, permission, &key)?)
                    .map(|action| Action::Get(GetActionKind::Bool(action)))
            }
            (Kind::Get, ValueType::Int) => {
                GetAction::new(context, self.definition::<i32>(declaration, property_id, permission, &key)?)
                    .map(|action| Action::Get(GetActionKind::Int(action)))
            }
            (Kind::Get, ValueType::Float) => {
                GetAction::new(context, self.definition::<f32>(declaration, property_id, permission, &key)?)
                    .map(|action| Action::Get(GetActionKind::Float(action)))
            }
            (Kind::Set, ValueType::Bool) => {
                SetAction::new(context, self.definition::<bool>(declaration, property_id, permission, &key)?)
                    .map(|action| Action::Set(SetActionKind::Bool(action)))
            }
            (Kind::Set, ValueType::Int) => {
                SetAction::new(context, self.definition::<i32>(declaration, property_id, permission, &key)?)
                    .map(|action| Action::Set(SetActionKind::Int(action)))
            }
            (Kind::Set, ValueType::Float) => {
                SetAction::new(context, self.definition::<f32>(declaration, property_id, permission, &key)?)
                    .map(|action| Action::Set(SetActionKind::Float(action)))
            }
            (Kind::Offset, ValueType::Int) => {
                OffsetAction::new(context, self.definition::<i32>(declaration, property_id, permission, &key)?)
                    .map(|action| Action::Offset(OffsetActionKind::Int(action)))
            }
            (Kind::Offset, ValueType::Float) => {
                OffsetAction::new(context, self.definition::<f32>(declaration, property_id, permission, &key)?)
                    .map(|action| Action::Offset(OffsetActionKind::Float(action)))
            }
            (Kind::GetTemperature, _) => {
                HvacTargetTemperatureGetAction::new(context, name, permission, elements, enable)
                    .map(|action| Action::Get(GetActionKind::Temperature(action)))
            }
            (Kind::SetTemperature, _) => {
                HvacTargetTemperatureSetAction::new(context, name, permission, elements, enable)
                    .map(|action| Action::Set(SetActionKind::Temperature(action)))
            }
            (Kind::OffsetTemperature, _) => {
                HvacTargetTemperatureOffsetAction::new(context, name, permission, elements, enable)
                    .map(|action| Action::Offset(OffsetActionKind::Temperature(action)))
            }
            (kind, value_type) => {
                return Err(ConfigError::invalid(
                    format!("{key}.value_type"),
                    format!("{kind} actions cannot hold {value_type} values"),
                ));
            }
        };

        built.map_err(|source| ConfigError::Build {
            name: declaration.name.clone(),
            source,
        })
    }

    fn property_id(&self, declaration: &ActionDeclaration, key: &str) -> ConfigResult<i32> {
        let resolve = |property: &PropertyRef| match property {
            PropertyRef::Id(id) => Ok(*id),
            PropertyRef::Name(name) => parse_property_id(name).ok_or_else(|| {
                ConfigError::invalid(format!("{key}.property"), format!("unknown property '{name}'"))
            }),
        };

        if !declaration.kind.is_temperature() {
            let property = declaration
                .property
                .as_ref()
                .ok_or_else(|| ConfigError::invalid(format!("{key}.property"), "missing"))?;
            return resolve(property);
        }

        if let Some(property) = &declaration.property {
            let id = resolve(property)?;
            if id != HVAC_TEMPERATURE_SET {
                return Err(ConfigError::invalid(
                    format!("{key}.property"),
                    format!("{} actions always use HVAC_TEMPERATURE_SET", declaration.kind),
                ));
            }
        }
        if declaration.value_range_generator.is_some() || !declaration.required_supported_values.is_empty() {
            return Err(ConfigError::invalid(
                key,
                "temperature actions take their supported values from the vehicle",
            ));
        }
        Ok(HVAC_TEMPERATURE_SET)
    }

    fn value_type(&self, declaration: &ActionDeclaration, key: &str) -> ConfigResult<ValueType> {
        let value_key = || format!("{key}.value_type");
        if declaration.kind.is_temperature() {
            return match declaration.value_type {
                None | Some(ValueType::Float) => Ok(ValueType::Float),
                Some(other) => Err(ConfigError::invalid(
                    value_key(),
                    format!("{} actions hold float values, not {other}", declaration.kind),
                )),
            };
        }
        match declaration.value_type {
            None => Err(ConfigError::invalid(value_key(), "missing")),
            Some(ValueType::IntArray) => Err(ConfigError::invalid(value_key(), "array values are not supported")),
            Some(value_type) => Ok(value_type),
        }
    }

    fn definition<T: DeclaredValue>(
        &self,
        declaration: &ActionDeclaration,
        property_id: i32,
        permission: &str,
        key: &str,
    ) -> ConfigResult<ActionDefinition<T>> {
        let required_supported_values = declaration
            .required_supported_values
            .iter()
            .map(|value| {
                T::from_scalar(*value).ok_or_else(|| {
                    ConfigError::invalid(
                        format!("{key}.required_supported_values"),
                        format!("{value:?} is not a {} value", T::VALUE_TYPE),
                    )
                })
            })
            .collect::<ConfigResult<Vec<T>>>()?;

        let custom_value_range_generator = match declaration.value_range_generator {
            None => None,
            Some(generator) => Some(T::generator(generator).ok_or_else(|| {
                ConfigError::invalid(
                    format!("{key}.value_range_generator"),
                    format!("{generator:?} does not produce {} values", T::VALUE_TYPE),
                )
            })?),
        };

        let definition = ActionDefinition::new(
            declaration.name.clone(),
            property_id,
            permission,
            self.elements.clone(),
        )
        .with_params(OptionalActionParameters {
            enable_hvac_power_if_dependent: declaration.enable_hvac_power_if_dependent,
            is_min_max_property: declaration.min_max,
            required_supported_values,
            custom_value_range_generator,
        });

        Ok(if declaration.hvac_power_dependent {
            definition.dependent_on_hvac_power()
        } else {
            definition
        })
    }
}
