//! Serde model of a category file
//!
//! ```yaml
//! category: CLIMATE
//! permission: android.car.permission.CONTROL_CAR_CLIMATE
//! elements:
//!   DRIVER: 0x1
//!   PASSENGER: 0x4
//! actions:
//!   - name: GET_FAN_SPEED
//!     kind: get
//!     property: HVAC_FAN_SPEED
//!     value_type: int
//!     min_max: true
//!     hvac_power_dependent: true
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use val_core::ValueType;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryFile {
    pub category: String,
    /// Used by actions that do not name their own permission
    pub permission: Option<String>,
    /// Element name to area id
    pub elements: BTreeMap<String, i32>,
    pub actions: Vec<ActionDeclaration>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDeclaration {
    pub name: String,
    pub kind: ActionKindDeclaration,
    /// Symbolic name or numeric id. Temperature kinds always use
    /// `HVAC_TEMPERATURE_SET`.
    #[serde(default)]
    pub property: Option<PropertyRef>,
    #[serde(default)]
    pub value_type: Option<ValueType>,
    #[serde(default)]
    pub permission: Option<String>,
    #[serde(default)]
    pub hvac_power_dependent: bool,
    #[serde(default)]
    pub enable_hvac_power_if_dependent: bool,
    #[serde(default)]
    pub min_max: bool,
    #[serde(default)]
    pub required_supported_values: Vec<ScalarValue>,
    #[serde(default)]
    pub value_range_generator: Option<GeneratorDeclaration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKindDeclaration {
    Get,
    Set,
    Offset,
    GetTemperature,
    SetTemperature,
    OffsetTemperature,
}

impl ActionKindDeclaration {
    pub fn is_temperature(self) -> bool {
        matches!(
            self,
            ActionKindDeclaration::GetTemperature
                | ActionKindDeclaration::SetTemperature
                | ActionKindDeclaration::OffsetTemperature
        )
    }
}

impl fmt::Display for ActionKindDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionKindDeclaration::Get => "get",
            ActionKindDeclaration::Set => "set",
            ActionKindDeclaration::Offset => "offset",
            ActionKindDeclaration::GetTemperature => "get_temperature",
            ActionKindDeclaration::SetTemperature => "set_temperature",
            ActionKindDeclaration::OffsetTemperature => "offset_temperature",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyRef {
    Id(i32),
    Name(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorDeclaration {
    ZeroOrGreater,
    ZeroOrLess,
    HvacTemperature,
}

/// A literal from `required_supported_values`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Bool(bool),
    Int(i64),
    Float(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_declarations() {
        let file: CategoryFile = serde_yaml::from_str(
            r#"
category: CLIMATE
elements:
  DRIVER: 0x1
  PASSENGER: 4
actions:
  - name: GET_FAN_SPEED
    kind: get
    property: HVAC_FAN_SPEED
    value_type: int
    min_max: true
  - name: SET_SEAT_HEATING
    kind: set
    property: 0x1540050B
    value_type: int
    required_supported_values: [0]
    value_range_generator: zero_or_greater
  - name: GET_TARGET_TEMPERATURE
    kind: get_temperature
"#,
        )
        .unwrap();

        assert_eq!(file.category, "CLIMATE");
        assert_eq!(file.permission, None);
        assert_eq!(file.elements.get("DRIVER"), Some(&1));
        assert_eq!(file.elements.get("PASSENGER"), Some(&4));
        assert_eq!(
            file.actions[0].property,
            Some(PropertyRef::Name("HVAC_FAN_SPEED".to_string()))
        );
        assert!(file.actions[0].min_max);
        assert_eq!(file.actions[1].property, Some(PropertyRef::Id(0x1540050B)));
        assert_eq!(file.actions[1].required_supported_values, vec![ScalarValue::Int(0)]);
        assert_eq!(
            file.actions[1].value_range_generator,
            Some(GeneratorDeclaration::ZeroOrGreater)
        );
        assert!(file.actions[2].kind.is_temperature());
        assert!(!file.actions[2].hvac_power_dependent);
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let file: CategoryFile = serde_yaml::from_str("category: EMPTY\n").unwrap();
        assert!(file.elements.is_empty());
        assert!(file.actions.is_empty());
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let result: Result<CategoryFile, _> = serde_yaml::from_str(
            "actions:\n  - name: X\n    kind: toggle\n",
        );
        assert!(result.is_err());
    }
}
