// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Value filters and range filters.
//!
//! Both live in a [`KeyedMap`]: an insertion-ordered map whose entries are
//! addressed either by an explicit name or by a positional index handed out
//! in insertion order. Named keys replace earlier entries with the same key.

use std::fmt;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::{Result, SphinxError};

/// A single filter value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl AttrValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttrValue::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Int(v) => write!(f, "{v}"),
            AttrValue::Float(v) => write!(f, "{v}"),
            AttrValue::Text(v) => f.write_str(v),
        }
    }
}

macro_rules! attr_value_from {
    ($($ty:ty => $variant:ident as $cast:ty),+ $(,)?) => {
        $(
            impl From<$ty> for AttrValue {
                fn from(v: $ty) -> Self {
                    AttrValue::$variant(v as $cast)
                }
            }
        )+
    };
}

attr_value_from! {
    i64 => Int as i64,
    i32 => Int as i64,
    u32 => Int as i64,
    f64 => Float as f64,
    f32 => Float as f64,
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::Text(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        AttrValue::Text(v)
    }
}

/// Filter values; a scalar becomes a one-element list.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterValues(pub Vec<AttrValue>);

impl<T: Into<AttrValue>> From<Vec<T>> for FilterValues {
    fn from(values: Vec<T>) -> Self {
        FilterValues(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<AttrValue>, const N: usize> From<[T; N]> for FilterValues {
    fn from(values: [T; N]) -> Self {
        FilterValues(values.into_iter().map(Into::into).collect())
    }
}

macro_rules! filter_values_from_scalar {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for FilterValues {
                fn from(v: $ty) -> Self {
                    FilterValues(vec![AttrValue::from(v)])
                }
            }
        )+
    };
}

filter_values_from_scalar!(i64, i32, u32, f64, f32, &str, String);

impl From<AttrValue> for FilterValues {
    fn from(v: AttrValue) -> Self {
        FilterValues(vec![v])
    }
}

/// A range bound. Integer and float bounds never mix inside one range.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RangeBound {
    Int(i64),
    Float(f64),
}

impl RangeBound {
    pub fn is_float(self) -> bool {
        matches!(self, RangeBound::Float(_))
    }

    pub fn as_f64(self) -> f64 {
        match self {
            RangeBound::Int(v) => v as f64,
            RangeBound::Float(v) => v,
        }
    }

    /// Integer view; float bounds are truncated toward zero.
    pub fn as_i64(self) -> i64 {
        match self {
            RangeBound::Int(v) => v,
            RangeBound::Float(v) => v as i64,
        }
    }
}

impl fmt::Display for RangeBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeBound::Int(v) => write!(f, "{v}"),
            RangeBound::Float(v) => write!(f, "{v:?}"),
        }
    }
}

impl From<i64> for RangeBound {
    fn from(v: i64) -> Self {
        RangeBound::Int(v)
    }
}

impl From<i32> for RangeBound {
    fn from(v: i32) -> Self {
        RangeBound::Int(v.into())
    }
}

impl From<u32> for RangeBound {
    fn from(v: u32) -> Self {
        RangeBound::Int(v.into())
    }
}

impl From<f64> for RangeBound {
    fn from(v: f64) -> Self {
        RangeBound::Float(v)
    }
}

impl From<f32> for RangeBound {
    fn from(v: f32) -> Self {
        RangeBound::Float(v.into())
    }
}

/// Address of a keyed filter entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FilterKey {
    Named(String),
    Position(usize),
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterKey::Named(name) => f.write_str(name),
            FilterKey::Position(pos) => write!(f, "{pos}"),
        }
    }
}

impl From<&str> for FilterKey {
    fn from(v: &str) -> Self {
        FilterKey::Named(v.to_string())
    }
}

impl From<String> for FilterKey {
    fn from(v: String) -> Self {
        FilterKey::Named(v)
    }
}

impl From<usize> for FilterKey {
    fn from(v: usize) -> Self {
        FilterKey::Position(v)
    }
}

/// Insertion-ordered map of filter entries.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedMap<V> {
    entries: IndexMap<FilterKey, V>,
    next_position: usize,
}

impl<V> Default for KeyedMap<V> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
            next_position: 0,
        }
    }
}

impl<V> KeyedMap<V> {
    /// Insert under `key`, or under the next free position when `key` is `None`.
    /// An existing entry with the same key is replaced in place.
    pub(crate) fn insert(&mut self, key: Option<FilterKey>, value: V) -> FilterKey {
        let key = match key {
            Some(key) => key,
            None => FilterKey::Position(self.next_position),
        };
        if let FilterKey::Position(pos) = key {
            self.next_position = self.next_position.max(pos + 1);
        }
        self.entries.insert(key.clone(), value);
        key
    }

    pub(crate) fn remove(&mut self, key: &FilterKey) -> Option<V> {
        self.entries.shift_remove(key)
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.next_position = 0;
    }

    pub fn get(&self, key: &FilterKey) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FilterKey, &V)> {
        self.entries.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.values()
    }
}

/// A value-set filter on one attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub attribute: String,
    pub values: Vec<AttrValue>,
    pub exclude: bool,
}

/// An inclusive range filter on one attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeFilter {
    pub attribute: String,
    pub min: RangeBound,
    pub max: RangeBound,
    pub exclude: bool,
}

impl RangeFilter {
    pub fn is_float(&self) -> bool {
        self.min.is_float()
    }
}

/// Input for [`SearchCriteria::add_filter`](crate::SearchCriteria::add_filter).
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    pub(crate) key: Option<FilterKey>,
    pub(crate) attribute: String,
    pub(crate) values: Vec<AttrValue>,
    pub(crate) exclude: bool,
}

impl FilterSpec {
    pub fn new(attribute: impl Into<String>, values: impl Into<FilterValues>) -> Self {
        Self {
            key: None,
            attribute: attribute.into(),
            values: values.into().0,
            exclude: false,
        }
    }

    pub fn exclude(mut self) -> Self {
        self.exclude = true;
        self
    }

    pub fn key(mut self, key: impl Into<FilterKey>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub(crate) fn validate(self) -> Result<(Option<FilterKey>, Filter)> {
        if self.attribute.trim().is_empty() {
            return Err(SphinxError::validation("filter attribute must not be empty"));
        }
        if self.values.is_empty() {
            return Err(SphinxError::Validation(format!(
                "filter on \"{}\" has no values",
                self.attribute
            )));
        }
        if self
            .values
            .iter()
            .any(|v| matches!(v, AttrValue::Float(f) if !f.is_finite()))
        {
            return Err(SphinxError::Validation(format!(
                "filter on \"{}\" has a non-finite value",
                self.attribute
            )));
        }
        Ok((
            self.key,
            Filter {
                attribute: self.attribute,
                values: self.values,
                exclude: self.exclude,
            },
        ))
    }
}

/// Input for [`SearchCriteria::add_range_filter`](crate::SearchCriteria::add_range_filter).
#[derive(Debug, Clone, PartialEq)]
pub struct RangeSpec {
    pub(crate) key: Option<FilterKey>,
    pub(crate) attribute: String,
    pub(crate) min: RangeBound,
    pub(crate) max: RangeBound,
    pub(crate) exclude: bool,
}

impl RangeSpec {
    pub fn new(
        attribute: impl Into<String>,
        min: impl Into<RangeBound>,
        max: impl Into<RangeBound>,
    ) -> Self {
        Self {
            key: None,
            attribute: attribute.into(),
            min: min.into(),
            max: max.into(),
            exclude: false,
        }
    }

    pub fn exclude(mut self) -> Self {
        self.exclude = true;
        self
    }

    pub fn key(mut self, key: impl Into<FilterKey>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Validates and coerces: if either bound is a float both become floats.
    pub(crate) fn validate(self) -> Result<(Option<FilterKey>, RangeFilter)> {
        if self.attribute.trim().is_empty() {
            return Err(SphinxError::validation("range filter attribute must not be empty"));
        }
        if !self.min.as_f64().is_finite() || !self.max.as_f64().is_finite() {
            return Err(SphinxError::Validation(format!(
                "range on \"{}\" has a non-finite bound",
                self.attribute
            )));
        }
        let (min, max) = if self.min.is_float() || self.max.is_float() {
            (
                RangeBound::Float(self.min.as_f64()),
                RangeBound::Float(self.max.as_f64()),
            )
        } else {
            (self.min, self.max)
        };
        Ok((
            self.key,
            RangeFilter {
                attribute: self.attribute,
                min,
                max,
                exclude: self.exclude,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_becomes_single_value() {
        let spec = FilterSpec::new("user_id", 2000);
        assert_eq!(spec.values, vec![AttrValue::Int(2000)]);

        let spec = FilterSpec::new("user_id", vec![1000, 2000]);
        assert_eq!(spec.values.len(), 2);
    }

    #[test]
    fn test_empty_values_rejected() {
        let spec = FilterSpec::new("user_id", Vec::<i64>::new());
        assert!(matches!(spec.validate(), Err(SphinxError::Validation(_))));
    }

    #[test]
    fn test_float_coercion() {
        let (_, range) = RangeSpec::new("rating", 0, 100.0).validate().unwrap();
        assert!(range.is_float());
        assert_eq!(range.min, RangeBound::Float(0.0));
        assert_eq!(range.max, RangeBound::Float(100.0));

        let (_, range) = RangeSpec::new("user_id", 1000, 3000).validate().unwrap();
        assert!(!range.is_float());
        assert_eq!(range.max, RangeBound::Int(3000));
    }

    #[test]
    fn test_non_finite_bound_rejected() {
        assert!(RangeSpec::new("rating", f64::NAN, 1.0).validate().is_err());
        assert!(RangeSpec::new("rating", 0, f64::INFINITY).validate().is_err());
    }

    #[test]
    fn test_keyed_map_positions_and_names() {
        let mut map = KeyedMap::default();
        assert_eq!(map.insert(None, "a"), FilterKey::Position(0));
        assert_eq!(map.insert(Some("named".into()), "b"), FilterKey::Named("named".into()));
        assert_eq!(map.insert(None, "c"), FilterKey::Position(1));

        // Same name replaces in place
        map.insert(Some("named".into()), "b2");
        let values: Vec<_> = map.values().copied().collect();
        assert_eq!(values, vec!["a", "b2", "c"]);

        map.remove(&FilterKey::Position(0));
        let values: Vec<_> = map.values().copied().collect();
        assert_eq!(values, vec!["b2", "c"]);

        map.clear();
        assert_eq!(map.insert(None, "d"), FilterKey::Position(0));
    }
}
