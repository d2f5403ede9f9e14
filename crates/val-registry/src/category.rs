//! Named action registry
//!
//! An `ActionCategory` owns the actions of one functional area and
//! dispatches calls to them by name. Every execute entry point has an async
//! twin that runs the same synchronous body on the tokio blocking pool.

use dashmap::DashMap;
use std::collections::{BTreeMap, BTreeSet};
use std::future::{self, Future};
use std::pin::Pin;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, instrument, warn};
use val_actions::{Action, DispatchValue};
use val_core::{
    ErrorCode, ErrorOr, GetActionResult, GlobalGetResult, GlobalSetResult, OffsetActionResult,
    OffsetRequest, OffsetValue, SetActionResult, Temperature, TemperatureUnit,
    UpdateTargetTemperatureRequest, ValueRange, ValueType, GLOBAL_ELEMENT,
};

/// Future returned by the async entry points
///
/// Never fails outward: a task that panics or is cancelled resolves to
/// `PlatformInternalError`.
pub type ActionFuture<R> = Pin<Box<dyn Future<Output = ErrorOr<R>> + Send>>;

/// An already-failed future for arguments a typed method refuses
pub(crate) fn rejected<R: Send + 'static>(reason: &str) -> ActionFuture<R> {
    warn!(reason = %reason, "Rejected action arguments");
    Box::pin(future::ready(Err(ErrorCode::InvalidApiArgument)))
}

fn global_element() -> BTreeSet<String> {
    BTreeSet::from([GLOBAL_ELEMENT.to_string()])
}

/// Actions of one functional area, indexed by name
#[derive(Clone)]
pub struct ActionCategory {
    name: String,
    actions: Arc<DashMap<String, Arc<Action>>>,
    handle: Handle,
}

impl ActionCategory {
    /// Create a category from its actions
    ///
    /// Fails with `BadValImpl` when there are no actions or two share a name.
    pub fn new(name: impl Into<String>, actions: Vec<Action>, handle: Handle) -> ErrorOr<Self> {
        let name = name.into();
        if name.is_empty() || actions.is_empty() {
            warn!(category = %name, "Category needs a name and at least one action");
            return Err(ErrorCode::BadValImpl);
        }

        let map = DashMap::new();
        for action in actions {
            let action_name = action.name().to_string();
            debug!(category = %name, action = %action_name, capability = %action.capability(), "Registering action");
            if map.insert(action_name.clone(), Arc::new(action)).is_some() {
                warn!(category = %name, action = %action_name, "Duplicate action name");
                return Err(ErrorCode::BadValImpl);
            }
        }

        Ok(Self {
            name,
            actions: Arc::new(map),
            handle,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Names of all actions, sorted
    pub fn action_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.actions.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }

    pub fn has_action(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    fn lookup(&self, name: &str) -> ErrorOr<Arc<Action>> {
        self.actions
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| {
                warn!(category = %self.name, action = %name, "Action not found");
                ErrorCode::InvalidApiArgument
            })
    }

    fn wiring_error(&self, action: &Action, expected: &str) -> ErrorCode {
        warn!(
            category = %self.name,
            action = %action.name(),
            capability = %action.capability(),
            value_type = %action.info().value_type(),
            expected = %expected,
            "Action cannot serve this call"
        );
        ErrorCode::BadValImpl
    }

    pub fn is_action_supported(&self, name: &str) -> ErrorOr<bool> {
        self.lookup(name)?.info().is_action_supported()
    }

    pub fn get_supported_elements(&self, name: &str) -> ErrorOr<BTreeSet<String>> {
        self.lookup(name)?.info().get_supported_elements()
    }

    /// Supported values of each element, typed as `T`
    ///
    /// Asking with a type other than the action's is `InvalidApiArgument`.
    pub fn get_element_to_value_range_map<T: DispatchValue>(
        &self,
        name: &str,
    ) -> ErrorOr<BTreeMap<String, ValueRange<T>>> {
        let action = self.lookup(name)?;
        let value_type = action.info().value_type();
        if value_type != T::VALUE_TYPE {
            warn!(action = %name, expected = %value_type, requested = %T::VALUE_TYPE, "Value type mismatch");
            return Err(ErrorCode::InvalidApiArgument);
        }
        T::core_of(&action)
            .ok_or(ErrorCode::InvalidApiArgument)?
            .get_element_to_value_range_map()
    }

    /// The values every supported element accepts, as `[largest min, smallest max]`
    ///
    /// `None` when the action has no ranges or they do not overlap.
    pub fn get_supported_overlapping_min_max(&self, name: &str) -> ErrorOr<Option<ValueRange<f32>>> {
        let action = self.lookup(name)?;
        let ranges: Vec<ValueRange<f32>> = match action.info().value_type() {
            ValueType::Int => i32::core_of(&action)
                .ok_or(ErrorCode::InvalidApiArgument)?
                .get_element_to_value_range_map()?
                .values()
                .map(ValueRange::to_f32)
                .collect(),
            ValueType::Float => f32::core_of(&action)
                .ok_or(ErrorCode::InvalidApiArgument)?
                .get_element_to_value_range_map()?
                .into_values()
                .collect(),
            other => {
                warn!(action = %name, value_type = %other, "Action has no numeric range");
                return Err(ErrorCode::InvalidApiArgument);
            }
        };

        let Some(low) = ranges.iter().map(|range| *range.min()).reduce(f32::max) else {
            return Ok(None);
        };
        let high = ranges.iter().map(|range| *range.max()).fold(f32::INFINITY, f32::min);
        if low > high {
            return Ok(None);
        }
        let bounds = if low == high { vec![low] } else { vec![low, high] };
        ValueRange::new(bounds).map(Some)
    }

    #[instrument(skip(self), fields(category = %self.name))]
    pub fn execute_get<T: DispatchValue>(
        &self,
        name: &str,
        elements: &BTreeSet<String>,
    ) -> ErrorOr<GetActionResult<T>> {
        let action = self.lookup(name)?;
        match &*action {
            Action::Get(kind) => match T::get_action(kind) {
                Some(get) => get.get(elements),
                None => Err(self.wiring_error(&action, "typed get")),
            },
            Action::Set(_) | Action::Offset(_) => Err(self.wiring_error(&action, "get")),
        }
    }

    #[instrument(skip(self), fields(category = %self.name))]
    pub fn execute_get_temperature(
        &self,
        name: &str,
        elements: &BTreeSet<String>,
        unit: Option<TemperatureUnit>,
    ) -> ErrorOr<GetActionResult<Temperature>> {
        let action = self.lookup(name)?;
        match &*action {
            Action::Get(kind) => kind.get_temperature(elements, unit),
            Action::Set(_) | Action::Offset(_) => Err(self.wiring_error(&action, "temperature get")),
        }
    }

    /// Set `value` on every element that supports it
    ///
    /// Elements that cannot take the value are reported without blocking
    /// the rest.
    #[instrument(skip(self), fields(category = %self.name))]
    pub fn execute_set<T: DispatchValue>(
        &self,
        name: &str,
        elements: &BTreeSet<String>,
        value: T,
    ) -> ErrorOr<SetActionResult> {
        let action = self.lookup(name)?;
        let set = match &*action {
            Action::Set(kind) => match T::set_action(kind) {
                Some(set) => set,
                None => return Err(self.wiring_error(&action, "typed set")),
            },
            Action::Get(_) | Action::Offset(_) => return Err(self.wiring_error(&action, "set")),
        };
        if elements.is_empty() {
            return set.set(elements, &value);
        }

        let mut filtered = BTreeMap::new();
        let mut remaining = BTreeSet::new();
        for element in elements {
            match set.core().does_element_support_value(element, &value) {
                Ok(true) => {
                    remaining.insert(element.clone());
                }
                Ok(false) => {
                    filtered.insert(element.clone(), ErrorCode::ValueNotSupported);
                }
                Err(err) => {
                    filtered.insert(element.clone(), err);
                }
            }
        }
        if !filtered.is_empty() {
            debug!(action = %name, filtered = ?filtered, "Elements rejected the value");
        }
        if remaining.is_empty() {
            return Ok(SetActionResult::new(name, filtered));
        }

        let mut result = set.set(&remaining, &value)?;
        result.element_to_error_code.extend(filtered);
        Ok(result)
    }

    /// Get on an action addressed at the whole vehicle
    pub fn execute_global_get<T: DispatchValue>(&self, name: &str) -> ErrorOr<GlobalGetResult<T>> {
        GlobalGetResult::try_from(self.execute_get(name, &global_element())?)
    }

    /// Set on an action addressed at the whole vehicle
    pub fn execute_global_set<T: DispatchValue>(&self, name: &str, value: T) -> ErrorOr<GlobalSetResult> {
        self.execute_set(name, &global_element(), value).map(GlobalSetResult::from)
    }

    #[instrument(skip(self), fields(category = %self.name))]
    pub fn execute_set_temperature(
        &self,
        name: &str,
        request: &UpdateTargetTemperatureRequest,
    ) -> ErrorOr<SetActionResult> {
        let action = self.lookup(name)?;
        match &*action {
            Action::Set(kind) => kind.set_temperature(request),
            Action::Get(_) | Action::Offset(_) => Err(self.wiring_error(&action, "temperature set")),
        }
    }

    /// Apply an offset of kind `U`, reported in the same kind
    #[instrument(skip(self), fields(category = %self.name))]
    pub fn execute_apply_offset<U: OffsetValue>(
        &self,
        name: &str,
        request: OffsetRequest<U>,
    ) -> ErrorOr<OffsetActionResult<U>> {
        let action = self.lookup(name)?;
        let kind = match &*action {
            Action::Offset(kind) => kind,
            Action::Get(_) | Action::Set(_) => return Err(self.wiring_error(&action, "offset")),
        };

        let result = kind.apply_offset(request.into_amount())?;
        let element_to_output = result
            .element_to_output
            .into_iter()
            .map(|(element, output)| {
                let output = output.and_then(|amount| U::from_amount(amount).ok_or(ErrorCode::BadValImpl));
                (element, output)
            })
            .collect();
        Ok(OffsetActionResult::new(result.action_name, element_to_output))
    }

    fn submit<R, F>(&self, body: F) -> ActionFuture<R>
    where
        R: Send + 'static,
        F: FnOnce(&ActionCategory) -> ErrorOr<R> + Send + 'static,
    {
        let category = self.clone();
        let task = self.handle.spawn_blocking(move || body(&category));
        Box::pin(async move {
            task.await.unwrap_or_else(|err| {
                warn!(error = %err, "Action task did not complete");
                Err(ErrorCode::PlatformInternalError)
            })
        })
    }

    pub fn execute_get_async<T: DispatchValue>(
        &self,
        name: impl Into<String>,
        elements: BTreeSet<String>,
    ) -> ActionFuture<GetActionResult<T>> {
        let name = name.into();
        self.submit(move |category| category.execute_get(&name, &elements))
    }

    pub fn execute_get_temperature_async(
        &self,
        name: impl Into<String>,
        elements: BTreeSet<String>,
        unit: Option<TemperatureUnit>,
    ) -> ActionFuture<GetActionResult<Temperature>> {
        let name = name.into();
        self.submit(move |category| category.execute_get_temperature(&name, &elements, unit))
    }

    pub fn execute_set_async<T: DispatchValue>(
        &self,
        name: impl Into<String>,
        elements: BTreeSet<String>,
        value: T,
    ) -> ActionFuture<SetActionResult> {
        let name = name.into();
        self.submit(move |category| category.execute_set(&name, &elements, value))
    }

    pub fn execute_set_temperature_async(
        &self,
        name: impl Into<String>,
        request: UpdateTargetTemperatureRequest,
    ) -> ActionFuture<SetActionResult> {
        let name = name.into();
        self.submit(move |category| category.execute_set_temperature(&name, &request))
    }

    pub fn execute_global_get_async<T: DispatchValue>(
        &self,
        name: impl Into<String>,
    ) -> ActionFuture<GlobalGetResult<T>> {
        let name = name.into();
        self.submit(move |category| category.execute_global_get(&name))
    }

    pub fn execute_global_set_async<T: DispatchValue>(
        &self,
        name: impl Into<String>,
        value: T,
    ) -> ActionFuture<GlobalSetResult> {
        let name = name.into();
        self.submit(move |category| category.execute_global_set(&name, value))
    }

    pub fn execute_apply_offset_async<U: OffsetValue>(
        &self,
        name: impl Into<String>,
        request: OffsetRequest<U>,
    ) -> ActionFuture<OffsetActionResult<U>> {
        let name = name.into();
        self.submit(move |category| category.execute_apply_offset(&name, request))
    }
}

impl std::fmt::Debug for ActionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionCategory")
            .field("name", &self.name)
            .field("actions", &self.action_names())
            .finish()
    }
}
