//! Filter, quality and attribute bookkeeping shared by records.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{ConstructionError, DecodingError, Result};
use crate::types::AttributeValue;

/// Name, error probability, filters and attributes of a record.
///
/// `filters` is `None` when filters were never evaluated and an empty set
/// when the record passed them all.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CommonInfo {
    name: String,
    log10_p_error: Option<f64>,
    filters: Option<BTreeSet<String>>,
    attributes: BTreeMap<String, AttributeValue>,
}

impl CommonInfo {
    pub fn new(
        name: impl Into<String>,
        log10_p_error: Option<f64>,
        filters: Option<BTreeSet<String>>,
        attributes: BTreeMap<String, AttributeValue>,
    ) -> Result<Self> {
        if let Some(value) = log10_p_error {
            if !value.is_finite() || value > 0.0 {
                return Err(ConstructionError::InvalidLog10PError(value).into());
            }
        }
        if let Some(filters) = &filters {
            if filters.iter().any(String::is_empty) {
                return Err(ConstructionError::EmptyFilterName.into());
            }
        }
        Ok(Self {
            name: name.into(),
            log10_p_error,
            filters,
            attributes,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // ------------------------------------------------------------------
    // quality
    // ------------------------------------------------------------------

    pub fn has_log10_p_error(&self) -> bool {
        self.log10_p_error.is_some()
    }

    pub fn log10_p_error(&self) -> Option<f64> {
        self.log10_p_error
    }

    /// Phred-scaled quality, `-10 * log10(P(error))`.
    pub fn phred_scaled_qual(&self) -> Option<f64> {
        self.log10_p_error.map(|value| value * -10.0)
    }

    // ------------------------------------------------------------------
    // filters
    // ------------------------------------------------------------------

    /// Filter names; empty both when unfiltered and when never evaluated.
    pub fn filters(&self) -> BTreeSet<String> {
        self.filters.clone().unwrap_or_default()
    }

    pub fn filters_maybe_none(&self) -> Option<&BTreeSet<String>> {
        self.filters.as_ref()
    }

    pub fn filters_were_applied(&self) -> bool {
        self.filters.is_some()
    }

    pub fn is_filtered(&self) -> bool {
        self.filters.as_ref().is_some_and(|f| !f.is_empty())
    }

    pub fn is_not_filtered(&self) -> bool {
        !self.is_filtered()
    }

    // ------------------------------------------------------------------
    // attributes
    // ------------------------------------------------------------------

    pub fn attributes(&self) -> &BTreeMap<String, AttributeValue> {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    pub fn has_attribute(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    /// The attribute read as an integer, or `default` when absent or missing.
    pub fn attribute_as_int(&self, key: &str, default: i64) -> Result<i64> {
        self.typed_attribute(key, default, "integer", AttributeValue::to_int)
    }

    pub fn attribute_as_float(&self, key: &str, default: f64) -> Result<f64> {
        self.typed_attribute(key, default, "float", AttributeValue::to_float)
    }

    pub fn attribute_as_bool(&self, key: &str, default: bool) -> Result<bool> {
        self.typed_attribute(key, default, "flag", AttributeValue::to_bool)
    }

    pub fn attribute_as_string(&self, key: &str, default: &str) -> String {
        match self.attributes.get(key) {
            None | Some(AttributeValue::Missing) => default.to_string(),
            Some(value) => value.to_string(),
        }
    }

    /// Elements of the attribute; a scalar becomes a one-element list and
    /// undecoded text is split on commas.
    pub fn attribute_as_list(&self, key: &str) -> Vec<AttributeValue> {
        match self.attributes.get(key) {
            None => Vec::new(),
            Some(AttributeValue::String(text)) => text
                .split(',')
                .map(|part| AttributeValue::String(part.to_string()))
                .collect(),
            Some(value) => value.to_list(),
        }
    }

    fn typed_attribute<T>(
        &self,
        key: &str,
        default: T,
        requested: &'static str,
        read: impl Fn(&AttributeValue) -> Option<T>,
    ) -> Result<T> {
        match self.attributes.get(key) {
            None | Some(AttributeValue::Missing) => Ok(default),
            Some(value) => read(value).ok_or_else(|| {
                DecodingError::WrongAttributeType {
                    locus: String::new(),
                    key: key.to_string(),
                    found: format!("{} '{}'", value.type_name(), value),
                    requested,
                }
                .into()
            }),
        }
    }
}
