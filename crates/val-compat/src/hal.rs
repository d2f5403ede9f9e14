//! Boundary to the raw vehicle property service
//!
//! Everything behind `VehicleHal` is platform specific. The compat layer
//! treats whatever comes back as untrusted and validates it before use.

use thiserror::Error;
use val_core::{ErrorCode, PropertyValue, ValueType};

/// Access mode of a property as the platform reports it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyAccess {
    None,
    Read,
    Write,
    ReadWrite,
}

impl PropertyAccess {
    pub fn is_readable(self) -> bool {
        matches!(self, PropertyAccess::Read | PropertyAccess::ReadWrite)
    }

    pub fn is_writable(self) -> bool {
        matches!(self, PropertyAccess::Write | PropertyAccess::ReadWrite)
    }
}

/// Status attached to a property value read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyStatus {
    Available,
    Unavailable,
    Error,
}

/// Per-area part of a raw property config
#[derive(Debug, Clone, PartialEq)]
pub struct RawAreaConfig {
    pub area_id: i32,
    pub min_value: Option<PropertyValue>,
    pub max_value: Option<PropertyValue>,
}

impl RawAreaConfig {
    pub fn new(area_id: i32) -> Self {
        Self {
            area_id,
            min_value: None,
            max_value: None,
        }
    }

    pub fn with_range(mut self, min: PropertyValue, max: PropertyValue) -> Self {
        self.min_value = Some(min);
        self.max_value = Some(max);
        self
    }
}

/// Property config as reported by the platform, before validation
#[derive(Debug, Clone, PartialEq)]
pub struct RawPropertyConfig {
    pub property_id: i32,
    pub value_type: Option<ValueType>,
    pub access: PropertyAccess,
    pub config_array: Vec<i32>,
    pub areas: Vec<RawAreaConfig>,
}

impl RawPropertyConfig {
    pub fn new(property_id: i32, value_type: ValueType, access: PropertyAccess) -> Self {
        Self {
            property_id,
            value_type: Some(value_type),
            access,
            config_array: Vec::new(),
            areas: Vec::new(),
        }
    }

    pub fn with_areas(mut self, areas: impl IntoIterator<Item = RawAreaConfig>) -> Self {
        self.areas = areas.into_iter().collect();
        self
    }

    pub fn with_config_array(mut self, config_array: Vec<i32>) -> Self {
        self.config_array = config_array;
        self
    }
}

/// A value read from the platform
#[derive(Debug, Clone, PartialEq)]
pub struct RawPropertyValue {
    pub property_id: i32,
    pub area_id: i32,
    pub status: PropertyStatus,
    pub value: Option<PropertyValue>,
}

/// Failures reported by the platform
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HalError {
    #[error("internal platform error: {0}")]
    Internal(String),

    #[error("access denied")]
    AccessDenied,

    #[error("property temporarily not available")]
    NotAvailable,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("property not supported")]
    Unsupported,
}

impl From<HalError> for ErrorCode {
    fn from(err: HalError) -> Self {
        match err {
            HalError::Internal(_) => ErrorCode::PlatformInternalError,
            HalError::AccessDenied => ErrorCode::PropertyAccessDeniedSecurity,
            HalError::NotAvailable => ErrorCode::PropertyNotAvailable,
            HalError::InvalidArgument(_) => ErrorCode::BadValImpl,
            HalError::Unsupported => ErrorCode::PropertyNotSupported,
        }
    }
}

/// Raw vehicle property access
///
/// Implementations block until the platform answers.
pub trait VehicleHal: Send + Sync {
    /// Configs the platform reports for `property_id`, normally zero or one
    fn property_list(&self, property_id: i32) -> Result<Vec<RawPropertyConfig>, HalError>;

    fn get_property(&self, property_id: i32, area_id: i32) -> Result<RawPropertyValue, HalError>;

    fn set_property(
        &self,
        property_id: i32,
        area_id: i32,
        value: &PropertyValue,
    ) -> Result<(), HalError>;
}
