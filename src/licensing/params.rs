//! Flattening request models into form parameters.
//!
//! Every request model implements [`ToParams`]. A model built on top of a
//! base model calls the base's `write_params` first, so inherited fields are
//! always sent. Only present values end up in the map.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;

/// Flat, string-keyed form parameters for one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams(BTreeMap<String, String>);

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value under `name` using its `Display` form.
    pub fn insert(&mut self, name: &str, value: impl Display) {
        self.0.insert(name.to_string(), value.to_string());
    }

    /// Insert `value` only if it is present.
    pub fn insert_opt<T: Display>(&mut self, name: &str, value: Option<T>) {
        if let Some(value) = value {
            self.insert(name, value);
        }
    }

    /// Merge caller-supplied parameters; they win over model fields.
    pub fn merge(&mut self, extra: &HashMap<String, String>) {
        for (key, value) in extra {
            self.0.insert(key.clone(), value.clone());
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.0
    }
}

/// A request model that can be sent to the license server
pub trait ToParams {
    /// Write this model's present fields, base fields first.
    fn write_params(&self, params: &mut RequestParams);

    fn to_params(&self) -> RequestParams {
        let mut params = RequestParams::new();
        self.write_params(&mut params);
        params
    }
}

/// Model fields plus extra parameters, extras taking precedence.
pub fn marshal<M: ToParams + ?Sized>(
    model: &M,
    extra_params: Option<&HashMap<String, String>>,
) -> RequestParams {
    let mut params = model.to_params();
    if let Some(extra) = extra_params {
        params.merge(extra);
    }
    params
}
