use crate::base::{ActionContext, ActionCore, ActionDefinition};
use crate::hvac_power::HvacPowerUtils;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, instrument, trace};
use val_core::{ActionValue, ErrorCode, ErrorOr, NumericValue, OffsetActionResult, OffsetRequest};

/// Moves the value of each element by a relative amount
pub struct OffsetAction<T: NumericValue> {
    core: ActionCore<T>,
}

/// Elements that will be written with the same value
struct WriteGroup<T, O> {
    value: T,
    outputs: Vec<(String, O)>,
}

impl<T: NumericValue> OffsetAction<T> {
    pub fn new(context: ActionContext, definition: ActionDefinition<T>) -> ErrorOr<Self> {
        Ok(Self {
            core: ActionCore::new(context, definition, true)?,
        })
    }

    pub fn core(&self) -> &ActionCore<T> {
        &self.core
    }

    /// Add `request.offset` to the current value of each element
    ///
    /// A result outside an element's supported values is reported as below
    /// the minimum, above the maximum or unsupported for that element.
    #[instrument(skip(self), fields(action = %self.core.name()))]
    pub fn apply_offset(&self, request: &OffsetRequest<T>) -> ErrorOr<OffsetActionResult<T>> {
        let offset = request.offset;
        let element_to_output = self.apply_with(&request.elements, |element, current| {
            let new_value = current.offset_by(offset);
            if self.core.does_element_support_value(element, &new_value)? {
                return Ok((new_value, new_value));
            }
            let Some(range) = self.core.value_range(element) else {
                return Err(ErrorCode::ValueNotSupported);
            };
            if new_value < *range.min() {
                Err(ErrorCode::ValueBelowMinimum)
            } else if new_value > *range.max() {
                Err(ErrorCode::ValueAboveMaximum)
            } else {
                Err(ErrorCode::ValueNotSupported)
            }
        })?;
        Ok(OffsetActionResult::new(self.core.name(), element_to_output))
    }

    /// Read, compute and write per element
    ///
    /// `calculate` maps an element and its current value to the value to
    /// write and the output to report. Elements whose value would not change
    /// are reported without a write. Elements sharing a computed value are
    /// written together.
    pub(crate) fn apply_with<O>(
        &self,
        elements: &BTreeSet<String>,
        calculate: impl Fn(&str, T) -> ErrorOr<(T, O)>,
    ) -> ErrorOr<BTreeMap<String, ErrorOr<O>>> {
        if let Some(err) = self.core.check_are_elements_supported(elements) {
            return Err(err);
        }

        let Some(hvac_power) = self.core.hvac_power() else {
            return self.apply_to(elements, calculate);
        };
        let state = hvac_power.compute_hvac_power_state(elements);
        if let Some(err) = state.error_code {
            return Err(err);
        }

        let mut element_to_output: BTreeMap<String, ErrorOr<O>> = state
            .seat_to_error_code
            .into_iter()
            .map(|(seat, err)| (seat, Err(err)))
            .collect();
        if !state.seats_to_update.is_empty() {
            element_to_output.extend(self.apply_to(&state.seats_to_update, calculate)?);
        }
        Ok(HvacPowerUtils::filtered_seat_to_new_value(
            &state.seats_that_enabled_hvac_power,
            element_to_output,
        ))
    }

    fn apply_to<O>(
        &self,
        elements: &BTreeSet<String>,
        calculate: impl Fn(&str, T) -> ErrorOr<(T, O)>,
    ) -> ErrorOr<BTreeMap<String, ErrorOr<O>>> {
        let current = self.core.get_internal(elements)?;

        let mut element_to_output = BTreeMap::new();
        let mut groups: Vec<WriteGroup<T, O>> = Vec::new();
        for (element, value) in current {
            let computed = value.and_then(|value| {
                calculate(&element, value).map(|(new_value, output)| (value, new_value, output))
            });
            match computed {
                Err(err) => {
                    debug!(element = %element, error = %err, "Offset not applied");
                    element_to_output.insert(element, Err(err));
                }
                Ok((value, new_value, output)) if new_value.value_equals(&value) => {
                    trace!(element = %element, "Offset leaves value unchanged");
                    element_to_output.insert(element, Ok(output));
                }
                Ok((_, new_value, output)) => {
                    match groups.iter_mut().find(|group| group.value.value_equals(&new_value)) {
                        Some(group) => group.outputs.push((element, output)),
                        None => groups.push(WriteGroup {
                            value: new_value,
                            outputs: vec![(element, output)],
                        }),
                    }
                }
            }
        }

        for group in groups {
            let elements: BTreeSet<String> = group
                .outputs
                .iter()
                .map(|(element, _)| element.clone())
                .collect();
            let mut errors = self.core.set_internal(&elements, &group.value)?;
            for (element, output) in group.outputs {
                let outcome = match errors.remove(&element) {
                    Some(err) => Err(err),
                    None => Ok(output),
                };
                element_to_output.insert(element, outcome);
            }
        }
        Ok(element_to_output)
    }
}
