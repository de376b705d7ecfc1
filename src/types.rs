use serde::{Deserialize, Serialize};
use std::fmt;

use crate::allele::Allele;

/// Classification of the alleles segregating at one site
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum VariantType {
    NoVariation,
    Snp,
    Mnp, // multi-nucleotide polymorphism
    Indel,
    Symbolic,
    Mixed,
}

impl VariantType {
    /// Pairwise type of a single alternate allele against the reference.
    pub fn of_pair(reference: &Allele, alternate: &Allele) -> Self {
        if reference.is_symbolic() || alternate.is_symbolic() {
            VariantType::Symbolic
        } else if reference.len() == alternate.len() {
            if alternate.len() == 1 {
                VariantType::Snp
            } else {
                VariantType::Mnp
            }
        } else {
            VariantType::Indel
        }
    }
}

impl fmt::Display for VariantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VariantType::NoVariation => "NO_VARIATION",
            VariantType::Snp => "SNP",
            VariantType::Mnp => "MNP",
            VariantType::Indel => "INDEL",
            VariantType::Symbolic => "SYMBOLIC",
            VariantType::Mixed => "MIXED",
        };
        f.write_str(name)
    }
}

/// Class of a single sample's genotype call
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum GenotypeType {
    Unavailable, // no alleles at all
    NoCall,      // ./. or .
    HomRef,      // ref/ref
    Het,         // called alleles differ
    HomVar,      // alt/alt
    Mixed,       // some alleles called, some not
}

impl GenotypeType {
    pub const ALL: [GenotypeType; 6] = [
        GenotypeType::Unavailable,
        GenotypeType::NoCall,
        GenotypeType::HomRef,
        GenotypeType::Het,
        GenotypeType::HomVar,
        GenotypeType::Mixed,
    ];

    /// Classify a ploidy-length allele list in a single pass.
    ///
    /// Works for any ploidy: `Het` means the called alleles are not all
    /// identical, not that exactly two distinct alleles are present.
    pub fn classify(alleles: &[Allele]) -> Self {
        if alleles.is_empty() {
            return GenotypeType::Unavailable;
        }

        let mut saw_no_call = false;
        let mut saw_multiple = false;
        let mut observed: Option<&Allele> = None;

        for allele in alleles {
            if allele.is_no_call() {
                saw_no_call = true;
            } else {
                match observed {
                    None => observed = Some(allele),
                    Some(first) if first != allele => saw_multiple = true,
                    Some(_) => {}
                }
            }
        }

        match (saw_no_call, observed) {
            (true, None) => GenotypeType::NoCall,
            (true, Some(_)) => GenotypeType::Mixed,
            (false, Some(_)) if saw_multiple => GenotypeType::Het,
            (false, Some(allele)) if allele.is_reference() => GenotypeType::HomRef,
            (false, Some(_)) => GenotypeType::HomVar,
            // every allele is either a no-call or called, and the list is non-empty
            (false, None) => GenotypeType::Unavailable,
        }
    }

    pub(crate) fn slot(self) -> usize {
        match self {
            GenotypeType::Unavailable => 0,
            GenotypeType::NoCall => 1,
            GenotypeType::HomRef => 2,
            GenotypeType::Het => 3,
            GenotypeType::HomVar => 4,
            GenotypeType::Mixed => 5,
        }
    }
}

/// Dynamically typed attribute value.
///
/// Values produced by a text codec start out as `String` (or lists of them)
/// and become typed once the record is fully decoded against its header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Integer(i64),
    Float(f64),
    Bool(bool),
    String(String),
    List(Vec<AttributeValue>),
    Missing,
}

impl AttributeValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            AttributeValue::Integer(_) => "integer",
            AttributeValue::Float(_) => "float",
            AttributeValue::Bool(_) => "flag",
            AttributeValue::String(_) => "string",
            AttributeValue::List(_) => "list",
            AttributeValue::Missing => "missing value",
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, AttributeValue::Missing)
    }

    /// Number of elements: list length, 0 for missing, 1 otherwise.
    pub fn element_count(&self) -> usize {
        match self {
            AttributeValue::List(values) => values.len(),
            AttributeValue::Missing => 0,
            _ => 1,
        }
    }

    /// Integer view; textual values are parsed.
    pub fn to_int(&self) -> Option<i64> {
        match self {
            AttributeValue::Integer(v) => Some(*v),
            AttributeValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Float view; integers widen and textual values are parsed.
    pub fn to_float(&self) -> Option<f64> {
        match self {
            AttributeValue::Float(v) => Some(*v),
            AttributeValue::Integer(v) => Some(*v as f64),
            AttributeValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn to_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(v) => Some(*v),
            AttributeValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Element view: a list's items, nothing for a missing value, or the value itself.
    pub fn to_list(&self) -> Vec<AttributeValue> {
        match self {
            AttributeValue::List(values) => values.clone(),
            AttributeValue::Missing => Vec::new(),
            other => vec![other.clone()],
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Integer(v) => write!(f, "{}", v),
            AttributeValue::Float(v) => write!(f, "{}", v),
            AttributeValue::Bool(v) => write!(f, "{}", v),
            AttributeValue::String(s) => f.write_str(s),
            AttributeValue::List(values) => {
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", value)?;
                }
                Ok(())
            }
            AttributeValue::Missing => f.write_str("."),
        }
    }
}

impl From<i32> for AttributeValue {
    fn from(v: i32) -> Self {
        AttributeValue::Integer(v as i64)
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        AttributeValue::Integer(v)
    }
}

impl From<usize> for AttributeValue {
    fn from(v: usize) -> Self {
        AttributeValue::Integer(v as i64)
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        AttributeValue::Float(v)
    }
}

impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        AttributeValue::Bool(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        AttributeValue::String(v.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        AttributeValue::String(v)
    }
}

impl<T: Into<AttributeValue>> From<Vec<T>> for AttributeValue {
    fn from(values: Vec<T>) -> Self {
        AttributeValue::List(values.into_iter().map(Into::into).collect())
    }
}
