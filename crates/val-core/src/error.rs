//! Error taxonomy shared by every action, the dispatcher and the compat layer

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for every fallible operation in the library
///
/// Exactly one of value or error code is present. Per-element outcomes inside
/// aggregate results use the same alias.
pub type ErrorOr<T> = Result<T, ErrorCode>;

/// Flat error taxonomy
///
/// Variants fall into a handful of classes: caller mistakes
/// (`InvalidApiArgument`, `UndefinedElement`), wiring defects (`BadValImpl`),
/// vehicle configuration that contradicts itself (`BadPlatformImpl`),
/// value-domain failures and dependency failures (`HvacPowerIsDisabled`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Error, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The vehicle reported something that violates its own contract
    #[error("platform implementation is inconsistent")]
    BadPlatformImpl,

    #[error("property is not supported")]
    PropertyNotSupported,

    #[error("area is not supported")]
    AreaNotSupported,

    /// Defect inside the library itself, e.g. an action registered under the
    /// wrong capability
    #[error("library implementation error")]
    BadValImpl,

    #[error("property is not available")]
    PropertyNotAvailable,

    #[error("platform internal error")]
    PlatformInternalError,

    #[error("property access denied")]
    PropertyAccessDeniedSecurity,

    #[error("action is not supported")]
    ActionNotSupported,

    /// An element name that is not part of the action's element map
    #[error("element is not defined for this action")]
    UndefinedElement,

    #[error("required permission is not granted")]
    MissingRequiredPermission,

    #[error("set confirmation timed out")]
    SetPropertyCallbackTimedOut,

    #[error("set confirmation was interrupted")]
    SetPropertyCallbackInterruptException,

    #[error("element is not supported")]
    ElementNotSupported,

    #[error("invalid argument")]
    InvalidApiArgument,

    #[error("value is already set")]
    ValueAlreadySet,

    #[error("HVAC power is disabled")]
    HvacPowerIsDisabled,

    #[error("value is not supported")]
    ValueNotSupported,

    #[error("value is below the minimum supported value")]
    ValueBelowMinimum,

    #[error("value is above the maximum supported value")]
    ValueAboveMaximum,

    #[error("area is not readable")]
    AreaNotReadable,

    #[error("area is not writable")]
    AreaNotWritable,
}

impl ErrorCode {
    /// Stable identifier, e.g. `ERROR_CODE_VALUE_ALREADY_SET`
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::BadPlatformImpl => "ERROR_CODE_BAD_PLATFORM_IMPL",
            ErrorCode::PropertyNotSupported => "ERROR_CODE_PROPERTY_NOT_SUPPORTED",
            ErrorCode::AreaNotSupported => "ERROR_CODE_AREA_NOT_SUPPORTED",
            ErrorCode::BadValImpl => "ERROR_CODE_BAD_VAL_IMPL",
            ErrorCode::PropertyNotAvailable => "ERROR_CODE_PROPERTY_NOT_AVAILABLE",
            ErrorCode::PlatformInternalError => "ERROR_CODE_PLATFORM_INTERNAL_ERROR",
            ErrorCode::PropertyAccessDeniedSecurity => "ERROR_CODE_PROPERTY_ACCESS_DENIED_SECURITY",
            ErrorCode::ActionNotSupported => "ERROR_CODE_ACTION_NOT_SUPPORTED",
            ErrorCode::UndefinedElement => "ERROR_CODE_UNDEFINED_ELEMENT",
            ErrorCode::MissingRequiredPermission => "ERROR_CODE_MISSING_REQUIRED_PERMISSION",
            ErrorCode::SetPropertyCallbackTimedOut => "ERROR_CODE_SET_PROPERTY_CALLBACK_TIMED_OUT",
            ErrorCode::SetPropertyCallbackInterruptException => {
                "ERROR_CODE_SET_PROPERTY_CALLBACK_INTERRUPT_EXCEPTION"
            }
            ErrorCode::ElementNotSupported => "ERROR_CODE_ELEMENT_NOT_SUPPORTED",
            ErrorCode::InvalidApiArgument => "ERROR_CODE_INVALID_API_ARGUMENT",
            ErrorCode::ValueAlreadySet => "ERROR_CODE_VALUE_ALREADY_SET",
            ErrorCode::HvacPowerIsDisabled => "ERROR_CODE_HVAC_POWER_IS_DISABLED",
            ErrorCode::ValueNotSupported => "ERROR_CODE_VALUE_NOT_SUPPORTED",
            ErrorCode::ValueBelowMinimum => "ERROR_CODE_VALUE_BELOW_MINIMUM",
            ErrorCode::ValueAboveMaximum => "ERROR_CODE_VALUE_ABOVE_MAXIMUM",
            ErrorCode::AreaNotReadable => "ERROR_CODE_AREA_NOT_READABLE",
            ErrorCode::AreaNotWritable => "ERROR_CODE_AREA_NOT_WRITABLE",
        }
    }

    /// Whether the code describes a value outside the supported domain
    pub fn is_value_domain(&self) -> bool {
        matches!(
            self,
            ErrorCode::ValueNotSupported
                | ErrorCode::ValueBelowMinimum
                | ErrorCode::ValueAboveMaximum
                | ErrorCode::ValueAlreadySet
                | ErrorCode::AreaNotSupported
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_str() {
        assert_eq!(
            ErrorCode::ValueAlreadySet.as_str(),
            "ERROR_CODE_VALUE_ALREADY_SET"
        );
        assert_eq!(
            ErrorCode::HvacPowerIsDisabled.as_str(),
            "ERROR_CODE_HVAC_POWER_IS_DISABLED"
        );
    }

    #[test]
    fn test_value_domain() {
        assert!(ErrorCode::ValueBelowMinimum.is_value_domain());
        assert!(ErrorCode::AreaNotSupported.is_value_domain());
        assert!(!ErrorCode::HvacPowerIsDisabled.is_value_domain());
        assert!(!ErrorCode::BadValImpl.is_value_domain());
    }

    #[test]
    fn test_display() {
        assert_eq!(ErrorCode::AreaNotWritable.to_string(), "area is not writable");
    }

    #[test]
    fn test_error_or_question_mark() {
        fn inner() -> ErrorOr<i32> {
            Err(ErrorCode::UndefinedElement)
        }
        fn outer() -> ErrorOr<i32> {
            let v = inner()?;
            Ok(v + 1)
        }
        assert_eq!(outer(), Err(ErrorCode::UndefinedElement));
    }
}
