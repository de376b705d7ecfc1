//! Per-sample genotype calls and their builder.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::allele::Allele;
use crate::error::{ConstructionError, Result};
use crate::types::{AttributeValue, GenotypeType};

pub const GENOTYPE_KEY: &str = "GT";
pub const GENOTYPE_QUALITY_KEY: &str = "GQ";
pub const DEPTH_KEY: &str = "DP";
pub const ALLELE_DEPTHS_KEY: &str = "AD";
pub const PHRED_LIKELIHOODS_KEY: &str = "PL";
pub const GENOTYPE_FILTER_KEY: &str = "FT";

/// Keys stored as inline fields; extended attributes may never use them.
pub const INLINE_KEYS: [&str; 6] = [
    GENOTYPE_KEY,
    GENOTYPE_QUALITY_KEY,
    DEPTH_KEY,
    ALLELE_DEPTHS_KEY,
    PHRED_LIKELIHOODS_KEY,
    GENOTYPE_FILTER_KEY,
];

const PHASED_SEPARATOR: &str = "|";
const UNPHASED_SEPARATOR: &str = "/";

/// One sample's call at a locus. Built only through [`GenotypeBuilder`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Genotype {
    sample_name: String,
    alleles: Vec<Allele>,
    phased: bool,
    gq: Option<i32>,
    dp: Option<i32>,
    ad: Option<Vec<i32>>,
    pl: Option<Vec<i32>>,
    filters: Option<String>,
    extended_attributes: BTreeMap<String, AttributeValue>,
    genotype_type: GenotypeType,
}

impl Genotype {
    pub fn sample_name(&self) -> &str {
        &self.sample_name
    }

    pub fn alleles(&self) -> &[Allele] {
        &self.alleles
    }

    pub fn allele(&self, i: usize) -> Option<&Allele> {
        self.alleles.get(i)
    }

    pub fn ploidy(&self) -> usize {
        self.alleles.len()
    }

    pub fn is_phased(&self) -> bool {
        self.phased
    }

    pub fn gq(&self) -> Option<i32> {
        self.gq
    }

    pub fn has_gq(&self) -> bool {
        self.gq.is_some()
    }

    pub fn dp(&self) -> Option<i32> {
        self.dp
    }

    pub fn has_dp(&self) -> bool {
        self.dp.is_some()
    }

    pub fn ad(&self) -> Option<&[i32]> {
        self.ad.as_deref()
    }

    pub fn has_ad(&self) -> bool {
        self.ad.is_some()
    }

    pub fn pl(&self) -> Option<&[i32]> {
        self.pl.as_deref()
    }

    pub fn has_likelihoods(&self) -> bool {
        self.pl.is_some()
    }

    /// Phred-scaled likelihoods converted to log10 scale.
    pub fn likelihoods_as_log10(&self) -> Option<Vec<f64>> {
        self.pl
            .as_ref()
            .map(|pl| pl.iter().map(|&p| p as f64 / -10.0).collect())
    }

    pub fn filters(&self) -> Option<&str> {
        self.filters.as_deref()
    }

    pub fn is_filtered(&self) -> bool {
        self.filters.is_some()
    }

    pub fn extended_attributes(&self) -> &BTreeMap<String, AttributeValue> {
        &self.extended_attributes
    }

    pub fn extended_attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.extended_attributes.get(key)
    }

    pub fn has_extended_attribute(&self, key: &str) -> bool {
        self.extended_attributes.contains_key(key)
    }

    pub fn genotype_type(&self) -> GenotypeType {
        self.genotype_type
    }

    pub fn is_hom(&self) -> bool {
        self.is_hom_ref() || self.is_hom_var()
    }

    pub fn is_hom_ref(&self) -> bool {
        self.genotype_type == GenotypeType::HomRef
    }

    pub fn is_hom_var(&self) -> bool {
        self.genotype_type == GenotypeType::HomVar
    }

    pub fn is_het(&self) -> bool {
        self.genotype_type == GenotypeType::Het
    }

    /// Heterozygous without any reference allele, e.g. `C/T` at an `A` site.
    pub fn is_het_non_ref(&self) -> bool {
        self.is_het() && self.alleles.iter().all(Allele::is_non_reference)
    }

    pub fn is_no_call(&self) -> bool {
        self.genotype_type == GenotypeType::NoCall
    }

    /// Every allele called (hom-ref, het or hom-var).
    pub fn is_called(&self) -> bool {
        !matches!(
            self.genotype_type,
            GenotypeType::NoCall | GenotypeType::Unavailable | GenotypeType::Mixed
        )
    }

    pub fn is_mixed(&self) -> bool {
        self.genotype_type == GenotypeType::Mixed
    }

    pub fn is_available(&self) -> bool {
        self.genotype_type != GenotypeType::Unavailable
    }

    /// Copies of `allele` carried by this sample.
    pub fn count_allele(&self, allele: &Allele) -> usize {
        self.alleles.iter().filter(|a| *a == allele).count()
    }

    pub fn called_alleles(&self) -> impl Iterator<Item = &Allele> {
        self.alleles.iter().filter(|a| a.is_called())
    }

    /// `A/T`, or `A|T` when phased. With `ignore_ref_state` the reference
    /// marker is left out.
    pub fn genotype_string(&self, ignore_ref_state: bool) -> String {
        let separator = if self.phased {
            PHASED_SEPARATOR
        } else {
            UNPHASED_SEPARATOR
        };
        let rendered: Vec<String> = self
            .alleles
            .iter()
            .map(|a| {
                if ignore_ref_state {
                    a.display_string()
                } else {
                    a.to_string()
                }
            })
            .collect();
        rendered.join(separator)
    }
}

impl fmt::Display for Genotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {}", self.sample_name, self.genotype_string(false))?;
        if let Some(gq) = self.gq {
            write!(f, " GQ {}", gq)?;
        }
        if let Some(dp) = self.dp {
            write!(f, " DP {}", dp)?;
        }
        if let Some(ad) = &self.ad {
            write!(f, " AD {}", join_ints(ad))?;
        }
        if let Some(pl) = &self.pl {
            write!(f, " PL {}", join_ints(pl))?;
        }
        if let Some(filters) = &self.filters {
            write!(f, " FT {}", filters)?;
        }
        for (key, value) in &self.extended_attributes {
            write!(f, " {} {}", key, value)?;
        }
        f.write_str("]")
    }
}

fn join_ints(values: &[i32]) -> String {
    values
        .iter()
        .map(i32::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Mutable staging area for a [`Genotype`].
///
/// Setters never fail; all checks happen in [`GenotypeBuilder::make`].
#[derive(Debug, Clone, Default)]
pub struct GenotypeBuilder {
    sample_name: String,
    alleles: Vec<Allele>,
    phased: bool,
    gq: Option<i32>,
    dp: Option<i32>,
    ad: Option<Vec<i32>>,
    pl: Option<Vec<i32>>,
    filters: Option<String>,
    extended_attributes: BTreeMap<String, AttributeValue>,
}

impl GenotypeBuilder {
    pub fn new(sample_name: impl Into<String>) -> Self {
        Self {
            sample_name: sample_name.into(),
            ..Self::default()
        }
    }

    /// Shorthand for a genotype with only a name and alleles.
    pub fn create(
        sample_name: impl Into<String>,
        alleles: impl IntoIterator<Item = Allele>,
    ) -> Result<Genotype> {
        Self::new(sample_name).alleles(alleles).make()
    }

    /// Seed a builder from an existing genotype.
    pub fn from_genotype(genotype: &Genotype) -> Self {
        Self {
            sample_name: genotype.sample_name.clone(),
            alleles: genotype.alleles.clone(),
            phased: genotype.phased,
            gq: genotype.gq,
            dp: genotype.dp,
            ad: genotype.ad.clone(),
            pl: genotype.pl.clone(),
            filters: genotype.filters.clone(),
            extended_attributes: genotype.extended_attributes.clone(),
        }
    }

    pub fn name(mut self, sample_name: impl Into<String>) -> Self {
        self.sample_name = sample_name.into();
        self
    }

    pub fn alleles(mut self, alleles: impl IntoIterator<Item = Allele>) -> Self {
        self.alleles = alleles.into_iter().collect();
        self
    }

    pub fn phased(mut self, phased: bool) -> Self {
        self.phased = phased;
        self
    }

    /// Genotype quality; any negative value means missing.
    pub fn gq(mut self, gq: i32) -> Self {
        self.gq = (gq >= 0).then_some(gq);
        self
    }

    pub fn no_gq(mut self) -> Self {
        self.gq = None;
        self
    }

    /// Read depth; any negative value means missing.
    pub fn dp(mut self, dp: i32) -> Self {
        self.dp = (dp >= 0).then_some(dp);
        self
    }

    pub fn no_dp(mut self) -> Self {
        self.dp = None;
        self
    }

    /// Per-allele depths. The vector is moved into the genotype as is.
    pub fn ad(mut self, ad: Vec<i32>) -> Self {
        self.ad = Some(ad);
        self
    }

    pub fn no_ad(mut self) -> Self {
        self.ad = None;
        self
    }

    /// Phred-scaled likelihoods. The vector is moved into the genotype as is.
    pub fn pl(mut self, pl: Vec<i32>) -> Self {
        self.pl = Some(pl);
        self
    }

    pub fn no_pl(mut self) -> Self {
        self.pl = None;
        self
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filters = Some(filter.into());
        self
    }

    /// Joins the filter names with `;`; an empty list clears the filter.
    pub fn filters<S: AsRef<str>>(mut self, filters: &[S]) -> Self {
        self.filters = if filters.is_empty() {
            None
        } else {
            Some(
                filters
                    .iter()
                    .map(|f| f.as_ref())
                    .collect::<Vec<_>>()
                    .join(";"),
            )
        };
        self
    }

    pub fn unfiltered(mut self) -> Self {
        self.filters = None;
        self
    }

    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.extended_attributes.insert(key.into(), value.into());
        self
    }

    pub fn attributes(mut self, attributes: BTreeMap<String, AttributeValue>) -> Self {
        self.extended_attributes.extend(attributes);
        self
    }

    pub fn clear_attributes(mut self) -> Self {
        self.extended_attributes.clear();
        self
    }

    /// Clear every field, optionally keeping the sample name.
    pub fn reset(self, keep_sample_name: bool) -> Self {
        if keep_sample_name {
            Self::new(self.sample_name)
        } else {
            Self::default()
        }
    }

    pub fn make(&self) -> Result<Genotype> {
        if self.sample_name.is_empty() {
            return Err(ConstructionError::EmptySampleName.into());
        }
        if let Some(key) = self
            .extended_attributes
            .keys()
            .find(|k| INLINE_KEYS.contains(&k.as_str()))
        {
            return Err(ConstructionError::ReservedGenotypeKey(key.clone()).into());
        }
        if matches!(&self.ad, Some(ad) if ad.is_empty()) {
            return Err(ConstructionError::EmptyArrayField(ALLELE_DEPTHS_KEY).into());
        }
        if matches!(&self.pl, Some(pl) if pl.is_empty()) {
            return Err(ConstructionError::EmptyArrayField(PHRED_LIKELIHOODS_KEY).into());
        }

        Ok(Genotype {
            sample_name: self.sample_name.clone(),
            genotype_type: GenotypeType::classify(&self.alleles),
            alleles: self.alleles.clone(),
            phased: self.phased,
            gq: self.gq,
            dp: self.dp,
            ad: self.ad.clone(),
            pl: self.pl.clone(),
            filters: self.filters.clone(),
            extended_attributes: self.extended_attributes.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VariantError;

    fn allele(s: &str) -> Allele {
        s.parse().unwrap()
    }

    #[test]
    fn test_partially_called_genotype() {
        let g = GenotypeBuilder::create("foo", vec![allele("C"), Allele::no_call()]).unwrap();
        assert!(!g.is_het());
        assert!(!g.is_hom());
        assert!(!g.is_no_call());
        assert!(!g.is_called());
        assert!(g.is_mixed());
        assert_eq!(g.genotype_type(), GenotypeType::Mixed);
        assert_eq!(g.called_alleles().count(), 1);
    }

    #[test]
    fn test_inline_fields() {
        let g = GenotypeBuilder::new("NA12878")
            .alleles(vec![allele("A*"), allele("T")])
            .phased(true)
            .gq(42)
            .dp(-1)
            .ad(vec![10, 12])
            .pl(vec![100, 0, 80])
            .attribute("PS", 7)
            .make()
            .unwrap();

        assert_eq!(g.gq(), Some(42));
        assert!(!g.has_dp());
        assert_eq!(g.ad(), Some(&[10, 12][..]));
        assert_eq!(g.likelihoods_as_log10(), Some(vec![-10.0, 0.0, -8.0]));
        assert_eq!(g.genotype_string(false), "A*|T");
        assert_eq!(g.genotype_string(true), "A|T");
        assert_eq!(g.extended_attribute("PS"), Some(&AttributeValue::Integer(7)));
        assert!(!g.is_filtered());
        assert_eq!(
            g.to_string(),
            "[NA12878 A*|T GQ 42 AD 10,12 PL 100,0,80 PS 7]"
        );
    }

    #[test]
    fn test_builder_rejects_bad_input() {
        assert_eq!(
            GenotypeBuilder::create("", vec![allele("A")]).unwrap_err(),
            VariantError::Construction(ConstructionError::EmptySampleName)
        );
        assert_eq!(
            GenotypeBuilder::new("s").attribute("GQ", 3).make().unwrap_err(),
            VariantError::Construction(ConstructionError::ReservedGenotypeKey("GQ".into()))
        );
        assert_eq!(
            GenotypeBuilder::new("s").pl(Vec::new()).make().unwrap_err(),
            VariantError::Construction(ConstructionError::EmptyArrayField("PL"))
        );
        assert_eq!(
            GenotypeBuilder::new("s").ad(Vec::new()).make().unwrap_err(),
            VariantError::Construction(ConstructionError::EmptyArrayField("AD"))
        );
    }

    #[test]
    fn test_copy_builder_round_trip() {
        let original = GenotypeBuilder::new("s1")
            .alleles(vec![allele("T"), allele("C")])
            .filters(&["LowQual", "LowDP"])
            .dp(9)
            .make()
            .unwrap();
        let copy = GenotypeBuilder::from_genotype(&original).make().unwrap();
        assert_eq!(copy, original);
        assert!(copy.is_het_non_ref());
        assert_eq!(copy.filters(), Some("LowQual;LowDP"));

        let renamed = GenotypeBuilder::from_genotype(&original)
            .name("s2")
            .unfiltered()
            .make()
            .unwrap();
        assert_eq!(renamed.sample_name(), "s2");
        assert!(!renamed.is_filtered());
        assert_eq!(renamed.alleles(), original.alleles());
    }

    #[test]
    fn test_reset() {
        let builder = GenotypeBuilder::new("s1").alleles(vec![allele("A*")]).gq(10);
        let g = builder.reset(true).make().unwrap();
        assert_eq!(g.sample_name(), "s1");
        assert_eq!(g.genotype_type(), GenotypeType::Unavailable);
        assert!(!g.has_gq());
    }
}
