//! Header-driven conversion of textual attribute values into typed ones.
//!
//! A text codec stores every INFO and FORMAT value as `AttributeValue::String`.
//! `VariantContext::fully_decode` looks each key up in a [`FieldTypeSource`],
//! splits the text on commas, parses each element as the declared
//! [`FieldType`] and checks the element count against the declared
//! [`FieldCount`].

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{trace, warn};

use crate::config::ValidationConfig;
use crate::error::{DecodingError, Result, VariantError};
use crate::genotype::GenotypeBuilder;
use crate::genotypes_context::GenotypesContext;
use crate::types::AttributeValue;
use crate::variant_context::{VariantContext, VariantContextBuilder};

/// Declared value type of a header field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    Integer,
    Float,
    Flag,
    Character,
    String,
}

/// Declared number of values of a header field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldCount {
    Fixed(usize),
    /// One per alternate allele (`A`).
    PerAltAllele,
    /// One per allele including the reference (`R`).
    PerAllele,
    /// One per possible genotype (`G`).
    PerGenotype,
    /// Any number (`.`).
    Unbounded,
}

impl FieldCount {
    /// Expected element count for a site with `n_alleles` alleles and the
    /// given ploidy, or `None` when any count is allowed.
    pub fn expected(&self, n_alleles: usize, ploidy: usize) -> Option<usize> {
        match self {
            FieldCount::Fixed(n) => Some(*n),
            FieldCount::PerAltAllele => Some(n_alleles.saturating_sub(1)),
            FieldCount::PerAllele => Some(n_alleles),
            FieldCount::PerGenotype => Some(genotype_count(n_alleles, ploidy)),
            FieldCount::Unbounded => None,
        }
    }
}

/// Unordered genotypes of `ploidy` alleles drawn from `n_alleles`,
/// i.e. C(n_alleles + ploidy - 1, ploidy). Saturates at `usize::MAX`.
fn genotype_count(n_alleles: usize, ploidy: usize) -> usize {
    if n_alleles == 0 {
        return 0;
    }
    let mut count = 1usize;
    for i in 1..=ploidy {
        match count.checked_mul(n_alleles.saturating_add(i - 1)) {
            Some(product) => count = product / i,
            None => return usize::MAX,
        }
    }
    count
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub field_type: FieldType,
    pub count: FieldCount,
}

impl FieldDefinition {
    pub fn new(field_type: FieldType, count: FieldCount) -> Self {
        Self { field_type, count }
    }
}

/// Where declared types of site (INFO) and per-sample (FORMAT) fields come
/// from, usually a parsed file header.
pub trait FieldTypeSource {
    fn info_field(&self, key: &str) -> Option<FieldDefinition>;
    fn format_field(&self, key: &str) -> Option<FieldDefinition>;
}

/// In-memory field declarations.
#[derive(Debug, Clone, Default)]
pub struct FieldTable {
    info: HashMap<String, FieldDefinition>,
    format: HashMap<String, FieldDefinition>,
}

impl FieldTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_info(
        mut self,
        key: impl Into<String>,
        field_type: FieldType,
        count: FieldCount,
    ) -> Self {
        self.add_info(key, field_type, count);
        self
    }

    pub fn with_format(
        mut self,
        key: impl Into<String>,
        field_type: FieldType,
        count: FieldCount,
    ) -> Self {
        self.add_format(key, field_type, count);
        self
    }

    pub fn add_info(&mut self, key: impl Into<String>, field_type: FieldType, count: FieldCount) {
        self.info
            .insert(key.into(), FieldDefinition::new(field_type, count));
    }

    pub fn add_format(&mut self, key: impl Into<String>, field_type: FieldType, count: FieldCount) {
        self.format
            .insert(key.into(), FieldDefinition::new(field_type, count));
    }
}

impl FieldTypeSource for FieldTable {
    fn info_field(&self, key: &str) -> Option<FieldDefinition> {
        self.info.get(key).copied()
    }

    fn format_field(&self, key: &str) -> Option<FieldDefinition> {
        self.format.get(key).copied()
    }
}

/// Shape of the site a value belongs to.
struct DecodeSite<'a> {
    locus: &'a str,
    n_alleles: usize,
    ploidy: usize,
    lenient: bool,
}

impl DecodeSite<'_> {
    fn decode(
        &self,
        key: &str,
        value: &AttributeValue,
        definition: Option<FieldDefinition>,
    ) -> Result<AttributeValue> {
        let Some(definition) = definition else {
            if self.lenient {
                warn!("{}: field {} is not defined in the header", self.locus, key);
                return Ok(value.clone());
            }
            return Err(DecodingError::UndefinedField {
                locus: self.locus.to_string(),
                key: key.to_string(),
            }
            .into());
        };

        let AttributeValue::String(text) = value else {
            return Ok(value.clone());
        };

        if definition.field_type == FieldType::Flag {
            return self.decode_flag(key, text);
        }
        if text == "." {
            return Ok(AttributeValue::Missing);
        }

        let mut elements = text
            .split(',')
            .map(|element| self.decode_element(key, element, definition.field_type))
            .collect::<Result<Vec<_>>>()?;

        if let Some(expected) = definition.count.expected(self.n_alleles, self.ploidy) {
            if expected != elements.len() {
                if !self.lenient {
                    return Err(DecodingError::WrongCount {
                        locus: self.locus.to_string(),
                        key: key.to_string(),
                        expected,
                        observed: elements.len(),
                    }
                    .into());
                }
                warn!(
                    "{}: field {} has {} values, expected {}",
                    self.locus,
                    key,
                    elements.len(),
                    expected
                );
            }
        }

        if elements.len() == 1 {
            Ok(elements.remove(0))
        } else {
            Ok(AttributeValue::List(elements))
        }
    }

    fn decode_flag(&self, key: &str, text: &str) -> Result<AttributeValue> {
        match text.to_ascii_lowercase().as_str() {
            "" | "1" | "true" => Ok(AttributeValue::Bool(true)),
            "0" | "false" => Ok(AttributeValue::Bool(false)),
            _ => Err(self.invalid(key, text, FieldType::Flag)),
        }
    }

    fn decode_element(
        &self,
        key: &str,
        element: &str,
        field_type: FieldType,
    ) -> Result<AttributeValue> {
        if element == "." {
            return Ok(AttributeValue::Missing);
        }
        match field_type {
            FieldType::Integer => element
                .parse::<i64>()
                .map(AttributeValue::Integer)
                .map_err(|_| self.invalid(key, element, field_type)),
            FieldType::Float => element
                .parse::<f64>()
                .map(AttributeValue::Float)
                .map_err(|_| self.invalid(key, element, field_type)),
            FieldType::Character if element.chars().count() != 1 => {
                Err(self.invalid(key, element, field_type))
            }
            FieldType::Character | FieldType::String | FieldType::Flag => {
                Ok(AttributeValue::String(element.to_string()))
            }
        }
    }

    fn invalid(&self, key: &str, value: &str, field_type: FieldType) -> VariantError {
        DecodingError::InvalidValue {
            locus: self.locus.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            expected: format!("{:?}", field_type),
        }
        .into()
    }

    fn decode_map<F>(
        &self,
        attributes: &BTreeMap<String, AttributeValue>,
        lookup: F,
    ) -> Result<BTreeMap<String, AttributeValue>>
    where
        F: Fn(&str) -> Option<FieldDefinition>,
    {
        attributes
            .iter()
            .map(|(key, value)| Ok((key.clone(), self.decode(key, value, lookup(key))?)))
            .collect()
    }
}

impl VariantContext {
    /// A copy with every textual site and genotype attribute converted to
    /// the type its header declares.
    ///
    /// Undeclared keys and element-count mismatches fail unless `lenient`,
    /// in which case they are logged and the value is kept as is. A record
    /// that is already decoded is returned as a clone.
    pub fn fully_decode<H>(&self, header: &H, lenient: bool) -> Result<VariantContext>
    where
        H: FieldTypeSource + ?Sized,
    {
        if self.is_fully_decoded() {
            return Ok(self.clone());
        }

        let locus = self.locus();
        let site = DecodeSite {
            locus: &locus,
            n_alleles: self.n_alleles(),
            ploidy: self.genotypes().max_ploidy(2),
            lenient,
        };
        let attributes = site.decode_map(self.attributes(), |key| header.info_field(key))?;

        let mut builder = VariantContextBuilder::from_variant(self)
            .attributes(attributes)
            .fully_decoded(true);

        if self
            .genotypes()
            .iter()
            .any(|g| !g.extended_attributes().is_empty())
        {
            let mut genotypes = GenotypesContext::with_capacity(self.n_samples());
            for genotype in self.genotypes().iter() {
                let sample = DecodeSite {
                    ploidy: if genotype.ploidy() == 0 { 2 } else { genotype.ploidy() },
                    ..site
                };
                let decoded = sample.decode_map(genotype.extended_attributes(), |key| {
                    header.format_field(key)
                })?;
                genotypes.add(
                    GenotypeBuilder::from_genotype(genotype)
                        .clear_attributes()
                        .attributes(decoded)
                        .make()?,
                )?;
            }
            builder = builder.genotypes(genotypes);
        }

        trace!("Decoded record at {}", locus);
        builder.make()
    }

    /// [`fully_decode`](Self::fully_decode) with leniency taken from `config`.
    pub fn fully_decode_with_config<H>(
        &self,
        header: &H,
        config: &ValidationConfig,
    ) -> Result<VariantContext>
    where
        H: FieldTypeSource + ?Sized,
    {
        self.fully_decode(header, config.lenient_decoding)
    }
}
