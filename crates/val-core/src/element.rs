//! Caller-facing element names and their vehicle area ids

use crate::error::{ErrorCode, ErrorOr};
use std::collections::{BTreeMap, BTreeSet};

/// Element name used by actions on global properties
pub const GLOBAL_ELEMENT: &str = "GLOBAL";

/// Area id of global properties
pub const GLOBAL_AREA_ID: i32 = 0;

/// Bijective map between element names and area ids
///
/// Never empty. Both directions are kept so results can be reported by
/// element after the compat layer answers by area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementAreaMap {
    element_to_area: BTreeMap<String, i32>,
    area_to_element: BTreeMap<i32, String>,
}

impl ElementAreaMap {
    /// Build a map from `(element, area)` pairs
    ///
    /// Fails with `BadValImpl` when the pairs are empty or either side repeats.
    pub fn new<I, S>(pairs: I) -> ErrorOr<Self>
    where
        I: IntoIterator<Item = (S, i32)>,
        S: Into<String>,
    {
        let mut element_to_area = BTreeMap::new();
        let mut area_to_element = BTreeMap::new();

        for (element, area) in pairs {
            let element = element.into();
            if element.is_empty() {
                return Err(ErrorCode::BadValImpl);
            }
            if element_to_area.insert(element.clone(), area).is_some() {
                return Err(ErrorCode::BadValImpl);
            }
            if area_to_element.insert(area, element).is_some() {
                return Err(ErrorCode::BadValImpl);
            }
        }

        if element_to_area.is_empty() {
            return Err(ErrorCode::BadValImpl);
        }

        Ok(Self {
            element_to_area,
            area_to_element,
        })
    }

    /// The single-entry map `GLOBAL -> 0`
    pub fn global() -> Self {
        let mut element_to_area = BTreeMap::new();
        let mut area_to_element = BTreeMap::new();
        element_to_area.insert(GLOBAL_ELEMENT.to_string(), GLOBAL_AREA_ID);
        area_to_element.insert(GLOBAL_AREA_ID, GLOBAL_ELEMENT.to_string());
        Self {
            element_to_area,
            area_to_element,
        }
    }

    /// Area ids of the given elements
    ///
    /// An empty request is `BadValImpl`, an element outside the map is
    /// `UndefinedElement`.
    pub fn get_areas(&self, elements: &BTreeSet<String>) -> ErrorOr<BTreeSet<i32>> {
        if elements.is_empty() {
            return Err(ErrorCode::BadValImpl);
        }
        elements
            .iter()
            .map(|element| {
                self.element_to_area
                    .get(element)
                    .copied()
                    .ok_or(ErrorCode::UndefinedElement)
            })
            .collect()
    }

    pub fn area_for_element(&self, element: &str) -> Option<i32> {
        self.element_to_area.get(element).copied()
    }

    pub fn element_for_area(&self, area: i32) -> Option<&str> {
        self.area_to_element.get(&area).map(String::as_str)
    }

    pub fn contains_element(&self, element: &str) -> bool {
        self.element_to_area.contains_key(element)
    }

    /// Element names in sorted order
    pub fn elements(&self) -> impl Iterator<Item = &str> {
        self.element_to_area.keys().map(String::as_str)
    }

    pub fn areas(&self) -> impl Iterator<Item = i32> + '_ {
        self.area_to_element.keys().copied()
    }

    /// `(element, area)` pairs in element order
    pub fn iter(&self) -> impl Iterator<Item = (&str, i32)> {
        self.element_to_area
            .iter()
            .map(|(element, area)| (element.as_str(), *area))
    }

    pub fn len(&self) -> usize {
        self.element_to_area.len()
    }

    pub fn is_empty(&self) -> bool {
        self.element_to_area.is_empty()
    }
}
