//! Per-element aggregate results

use crate::element::GLOBAL_ELEMENT;
use crate::error::{ErrorCode, ErrorOr};
use std::collections::BTreeMap;

/// Values read by a get action, keyed by element
#[derive(Debug, Clone, PartialEq)]
pub struct GetActionResult<T> {
    pub action_name: String,
    pub element_to_value: BTreeMap<String, ErrorOr<T>>,
}

impl<T> GetActionResult<T> {
    pub fn new(action_name: impl Into<String>, element_to_value: BTreeMap<String, ErrorOr<T>>) -> Self {
        Self {
            action_name: action_name.into(),
            element_to_value,
        }
    }

    /// True when no element carries an error
    pub fn is_success(&self) -> bool {
        self.element_to_value.values().all(Result::is_ok)
    }

    pub fn get(&self, element: &str) -> Option<&ErrorOr<T>> {
        self.element_to_value.get(element)
    }

    /// Convert every successful value, keeping errors in place
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> GetActionResult<U> {
        GetActionResult {
            action_name: self.action_name,
            element_to_value: self
                .element_to_value
                .into_iter()
                .map(|(element, value)| (element, value.map(&mut f)))
                .collect(),
        }
    }
}

/// Outcome of a set action
///
/// Elements absent from the map succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetActionResult {
    pub action_name: String,
    pub element_to_error_code: BTreeMap<String, ErrorCode>,
}

impl SetActionResult {
    pub fn new(action_name: impl Into<String>, element_to_error_code: BTreeMap<String, ErrorCode>) -> Self {
        Self {
            action_name: action_name.into(),
            element_to_error_code,
        }
    }

    pub fn success(action_name: impl Into<String>) -> Self {
        Self::new(action_name, BTreeMap::new())
    }

    pub fn is_success(&self) -> bool {
        self.element_to_error_code.is_empty()
    }

    pub fn error_for(&self, element: &str) -> Option<ErrorCode> {
        self.element_to_error_code.get(element).copied()
    }
}

/// Values elements hold after an offset was applied
#[derive(Debug, Clone, PartialEq)]
pub struct OffsetActionResult<T> {
    pub action_name: String,
    pub element_to_output: BTreeMap<String, ErrorOr<T>>,
}

impl<T> OffsetActionResult<T> {
    pub fn new(action_name: impl Into<String>, element_to_output: BTreeMap<String, ErrorOr<T>>) -> Self {
        Self {
            action_name: action_name.into(),
            element_to_output,
        }
    }

    pub fn is_success(&self) -> bool {
        self.element_to_output.values().all(Result::is_ok)
    }

    pub fn get(&self, element: &str) -> Option<&ErrorOr<T>> {
        self.element_to_output.get(element)
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> OffsetActionResult<U> {
        OffsetActionResult {
            action_name: self.action_name,
            element_to_output: self
                .element_to_output
                .into_iter()
                .map(|(element, value)| (element, value.map(&mut f)))
                .collect(),
        }
    }
}

/// Value read by a get action addressed at the whole vehicle
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalGetResult<T> {
    pub action_name: String,
    pub value: ErrorOr<T>,
}

impl<T> GlobalGetResult<T> {
    pub fn new(action_name: impl Into<String>, value: ErrorOr<T>) -> Self {
        Self {
            action_name: action_name.into(),
            value,
        }
    }

    pub fn is_success(&self) -> bool {
        self.value.is_ok()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> GlobalGetResult<U> {
        GlobalGetResult {
            action_name: self.action_name,
            value: self.value.map(f),
        }
    }
}

impl<T> TryFrom<GetActionResult<T>> for GlobalGetResult<T> {
    type Error = ErrorCode;

    /// Keep the `GLOBAL` entry; a result without one is `BadValImpl`
    fn try_from(mut result: GetActionResult<T>) -> ErrorOr<Self> {
        let value = result
            .element_to_value
            .remove(GLOBAL_ELEMENT)
            .ok_or(ErrorCode::BadValImpl)?;
        Ok(Self::new(result.action_name, value))
    }
}

/// Outcome of a set action addressed at the whole vehicle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalSetResult {
    pub action_name: String,
    pub error_code: Option<ErrorCode>,
}

impl GlobalSetResult {
    pub fn new(action_name: impl Into<String>, error_code: Option<ErrorCode>) -> Self {
        Self {
            action_name: action_name.into(),
            error_code,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error_code.is_none()
    }
}

impl From<SetActionResult> for GlobalSetResult {
    fn from(result: SetActionResult) -> Self {
        let error_code = result.error_for(GLOBAL_ELEMENT);
        Self::new(result.action_name, error_code)
    }
}
