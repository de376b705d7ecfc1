//! A single site: locus, alleles, per-sample genotypes and site annotations.

mod builder;
mod validation;

pub use builder::VariantContextBuilder;
pub use validation::ValidationMode;

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use tracing::debug;

use crate::allele::Allele;
use crate::allele_context::AlleleContext;
use crate::common_info::CommonInfo;
use crate::config::ValidationConfig;
use crate::error::Result;
use crate::genotype::Genotype;
use crate::genotypes_context::GenotypesContext;
use crate::types::{AttributeValue, VariantType};

/// Site attribute carrying the end position of records whose stop cannot be
/// derived from the reference allele.
pub const END_KEY: &str = "END";
/// Total number of called alleles.
pub const ALLELE_NUMBER_KEY: &str = "AN";
/// Called copies of each alternate allele.
pub const ALLELE_COUNT_KEY: &str = "AC";

/// An immutable, validated variant record.
///
/// Only [`VariantContextBuilder::make`] creates one. Its genotypes are
/// sealed; derive a modified record with [`VariantContextBuilder::from_variant`].
#[derive(Debug, Clone)]
pub struct VariantContext {
    contig: String,
    start: u64,
    stop: u64,
    id: Option<String>,
    alleles: AlleleContext,
    genotypes: GenotypesContext,
    info: CommonInfo,
    fully_decoded: bool,
    config: ValidationConfig,
}

// Records compare on content; the strictness they were checked with is not part of it.
impl PartialEq for VariantContext {
    fn eq(&self, other: &Self) -> bool {
        self.contig == other.contig
            && self.start == other.start
            && self.stop == other.stop
            && self.id == other.id
            && self.alleles == other.alleles
            && self.genotypes == other.genotypes
            && self.info == other.info
            && self.fully_decoded == other.fully_decoded
    }
}

impl VariantContext {
    // ------------------------------------------------------------------
    // location and identity
    // ------------------------------------------------------------------

    pub fn contig(&self) -> &str {
        &self.contig
    }

    /// 1-based, inclusive.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// 1-based, inclusive.
    pub fn stop(&self) -> u64 {
        self.stop
    }

    /// Number of reference bases spanned.
    pub fn length(&self) -> u64 {
        self.stop - self.start + 1
    }

    /// `contig:start`, the form used in error messages.
    pub fn locus(&self) -> String {
        format!("{}:{}", self.contig, self.start)
    }

    pub fn source(&self) -> &str {
        self.info.name()
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn has_id(&self) -> bool {
        self.id.is_some()
    }

    /// The ID, or `.` when the record has none.
    pub fn id_or_missing(&self) -> &str {
        self.id.as_deref().unwrap_or(".")
    }

    pub fn is_fully_decoded(&self) -> bool {
        self.fully_decoded
    }

    /// Strictness this record was validated with; derived records inherit it.
    pub fn validation_config(&self) -> &ValidationConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // alleles
    // ------------------------------------------------------------------

    pub fn allele_context(&self) -> &AlleleContext {
        &self.alleles
    }

    pub fn alleles(&self) -> &[Allele] {
        self.alleles.alleles()
    }

    pub fn reference(&self) -> &Allele {
        self.alleles.reference()
    }

    pub fn alternate_alleles(&self) -> &[Allele] {
        self.alleles.alternate_alleles()
    }

    pub fn alternate_allele(&self, i: usize) -> Option<&Allele> {
        self.alleles.alternate_allele(i)
    }

    pub fn n_alleles(&self) -> usize {
        self.alleles.n_alleles()
    }

    pub fn has_allele(&self, allele: &Allele) -> bool {
        self.alleles.has_allele(allele)
    }

    pub fn is_biallelic(&self) -> bool {
        self.alleles.is_biallelic()
    }

    pub fn variant_type(&self) -> VariantType {
        self.alleles.variant_type()
    }

    pub fn is_variant(&self) -> bool {
        self.alleles.is_variant()
    }

    pub fn is_snp(&self) -> bool {
        self.alleles.is_snp()
    }

    pub fn is_mnp(&self) -> bool {
        self.alleles.is_mnp()
    }

    pub fn is_indel(&self) -> bool {
        self.alleles.is_indel()
    }

    pub fn is_symbolic(&self) -> bool {
        self.alleles.is_symbolic()
    }

    pub fn is_mixed(&self) -> bool {
        self.alleles.is_mixed()
    }

    pub fn is_structural_indel(&self) -> bool {
        self.alleles.is_structural_indel()
    }

    // ------------------------------------------------------------------
    // genotypes
    // ------------------------------------------------------------------

    pub fn genotypes(&self) -> &GenotypesContext {
        &self.genotypes
    }

    pub fn genotype(&self, sample_name: &str) -> Option<&Genotype> {
        self.genotypes.get_by_name(sample_name)
    }

    pub fn has_genotypes(&self) -> bool {
        !self.genotypes.is_empty()
    }

    pub fn n_samples(&self) -> usize {
        self.genotypes.len()
    }

    pub fn sample_names(&self) -> impl Iterator<Item = &str> {
        self.genotypes.sample_names()
    }

    pub fn called_chr_count(&self) -> usize {
        self.genotypes.called_chr_count_all()
    }

    pub fn called_chr_count_of(&self, allele: &Allele) -> usize {
        self.genotypes.called_chr_count_of(allele)
    }

    /// True when no sample carries a called non-reference allele.
    pub fn is_monomorphic_in_samples(&self) -> bool {
        self.genotypes.is_monomorphic_in_samples(self.reference())
    }

    pub fn is_polymorphic_in_samples(&self) -> bool {
        !self.is_monomorphic_in_samples()
    }

    /// Called copies of each allele, in allele order.
    pub fn allele_counts(&self) -> Vec<usize> {
        self.alleles
            .alleles()
            .iter()
            .map(|a| self.genotypes.called_chr_count_of(a))
            .collect()
    }

    /// Fraction of called chromosomes carrying `allele`; `None` when nothing
    /// is called or the allele is not part of this site.
    pub fn allele_frequency(&self, allele: &Allele) -> Option<f64> {
        let called = self.called_chr_count();
        if called == 0 || !self.has_allele(allele) {
            return None;
        }
        Some(self.called_chr_count_of(allele) as f64 / called as f64)
    }

    /// Frequency of each alternate allele; `None` when nothing is called.
    pub fn alt_allele_frequencies(&self) -> Option<Vec<f64>> {
        let called = self.called_chr_count();
        if called == 0 {
            return None;
        }
        Some(
            self.alternate_alleles()
                .iter()
                .map(|a| self.called_chr_count_of(a) as f64 / called as f64)
                .collect(),
        )
    }

    /// The alternate allele with the most called copies. Ties go to the
    /// allele listed last.
    pub fn alt_allele_with_highest_allele_count(&self) -> Option<&Allele> {
        match self.alternate_alleles() {
            [] => None,
            [only] => Some(only),
            alternates => alternates
                .iter()
                .max_by_key(|a| self.genotypes.called_chr_count_of(a)),
        }
    }

    /// A new record restricted to `sample_names`.
    ///
    /// With `rederive_alleles` the alleles shrink to the reference plus the
    /// alternates still called among the kept samples.
    pub fn sub_context_from_samples(
        &self,
        sample_names: &HashSet<String>,
        rederive_alleles: bool,
    ) -> Result<VariantContext> {
        let genotypes = self.genotypes.subset_to_samples(sample_names);
        let mut builder = VariantContextBuilder::from_variant(self);

        if rederive_alleles {
            let called: HashSet<&Allele> = genotypes
                .iter()
                .flat_map(|g| g.called_alleles())
                .collect();
            let alleles = self.alleles.retain(|a| called.contains(a));
            if alleles.n_alleles() != self.n_alleles() {
                debug!(
                    "Re-derived alleles at {}: {} -> {}",
                    self.locus(),
                    self.alleles,
                    alleles
                );
            }
            builder = builder.allele_context(alleles);
        }

        builder.genotypes(genotypes).make()
    }

    pub fn sub_context_from_sample(&self, sample_name: &str) -> Result<VariantContext> {
        let names: HashSet<String> = [sample_name.to_string()].into_iter().collect();
        self.sub_context_from_samples(&names, true)
    }

    // ------------------------------------------------------------------
    // quality, filters and attributes
    // ------------------------------------------------------------------

    pub fn common_info(&self) -> &CommonInfo {
        &self.info
    }

    pub fn has_log10_p_error(&self) -> bool {
        self.info.has_log10_p_error()
    }

    pub fn log10_p_error(&self) -> Option<f64> {
        self.info.log10_p_error()
    }

    pub fn phred_scaled_qual(&self) -> Option<f64> {
        self.info.phred_scaled_qual()
    }

    pub fn filters(&self) -> BTreeSet<String> {
        self.info.filters()
    }

    pub fn filters_were_applied(&self) -> bool {
        self.info.filters_were_applied()
    }

    pub fn is_filtered(&self) -> bool {
        self.info.is_filtered()
    }

    pub fn is_not_filtered(&self) -> bool {
        self.info.is_not_filtered()
    }

    pub fn attributes(&self) -> &BTreeMap<String, AttributeValue> {
        self.info.attributes()
    }

    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.info.attribute(key)
    }

    pub fn has_attribute(&self, key: &str) -> bool {
        self.info.has_attribute(key)
    }

    pub fn attribute_as_int(&self, key: &str, default: i64) -> Result<i64> {
        self.info
            .attribute_as_int(key, default)
            .map_err(|err| err.at_locus(&self.locus()))
    }

    pub fn attribute_as_float(&self, key: &str, default: f64) -> Result<f64> {
        self.info
            .attribute_as_float(key, default)
            .map_err(|err| err.at_locus(&self.locus()))
    }

    pub fn attribute_as_bool(&self, key: &str, default: bool) -> Result<bool> {
        self.info
            .attribute_as_bool(key, default)
            .map_err(|err| err.at_locus(&self.locus()))
    }

    pub fn attribute_as_string(&self, key: &str, default: &str) -> String {
        self.info.attribute_as_string(key, default)
    }

    pub fn attribute_as_list(&self, key: &str) -> Vec<AttributeValue> {
        self.info.attribute_as_list(key)
    }

    /// The `END` attribute, if present.
    pub fn end_attribute(&self) -> Result<Option<i64>> {
        if !self.has_attribute(END_KEY) {
            return Ok(None);
        }
        self.attribute_as_int(END_KEY, 0).map(Some)
    }
}

impl fmt::Display for VariantContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let qual = match self.phred_scaled_qual() {
            Some(q) => format!("{:.2}", q),
            None => ".".to_string(),
        };
        let filters = match self.info.filters_maybe_none() {
            None => ".".to_string(),
            Some(f) if f.is_empty() => "PASS".to_string(),
            Some(f) => f.iter().cloned().collect::<Vec<_>>().join(";"),
        };
        let attributes = self
            .attributes()
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(", ");
        write!(
            f,
            "[VC {} @ {}:{}-{} Q{} of type={} alleles={} attr={{{}}} GT={} filters={}]",
            self.source(),
            self.contig,
            self.start,
            self.stop,
            qual,
            self.variant_type(),
            self.alleles,
            attributes,
            self.genotypes,
            filters
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConsistencyError, ConstructionError, VariantError};
    use crate::genotype::GenotypeBuilder;

    fn allele(s: &str) -> Allele {
        s.parse().unwrap()
    }

    fn genotype(name: &str, alleles: &[&str]) -> Genotype {
        GenotypeBuilder::create(name, alleles.iter().map(|a| allele(a))).unwrap()
    }

    fn snp_site() -> VariantContext {
        let genotypes = GenotypesContext::from_genotypes(vec![
            genotype("AA", &["A*", "A*"]),
            genotype("AT", &["A*", "T"]),
            genotype("TT", &["T", "T"]),
        ])
        .unwrap();
        VariantContextBuilder::new("test", "chr1", 10, 10, vec![allele("A*"), allele("T")])
            .genotypes(genotypes)
            .make()
            .unwrap()
    }

    fn triallelic(counts: [usize; 3]) -> VariantContext {
        let alts = ["C", "G", "T"];
        let mut genotypes = Vec::new();
        for (alt, &count) in alts.iter().zip(counts.iter()) {
            for i in 0..count {
                genotypes.push(genotype(&format!("{}{}", alt, i), &["A*", alt]));
            }
        }
        VariantContextBuilder::new(
            "test",
            "chr1",
            10,
            10,
            vec![allele("A*"), allele("C"), allele("G"), allele("T")],
        )
        .genotype_list(genotypes)
        .make()
        .unwrap()
    }

    #[test]
    fn test_snp_site_statistics() {
        let vc = snp_site();
        assert_eq!(vc.variant_type(), VariantType::Snp);
        assert_eq!(vc.length(), 1);
        assert_eq!(vc.called_chr_count(), 6);
        assert_eq!(vc.called_chr_count_of(&allele("T")), 3);
        assert_eq!(vc.called_chr_count_of(&allele("A*")), 3);
        assert!(vc.is_polymorphic_in_samples());
        assert!(vc.genotypes().is_sealed());
        assert_eq!(vc.allele_counts(), vec![3, 3]);
        assert_eq!(vc.allele_frequency(&allele("T")), Some(0.5));
        assert_eq!(vc.allele_frequency(&allele("G")), None);
        assert_eq!(vc.alt_allele_frequencies(), Some(vec![0.5]));
        assert_eq!(vc.locus(), "chr1:10");
    }

    #[test]
    fn test_highest_count_tie_goes_to_last() {
        let vc = triallelic([3, 5, 5]);
        assert_eq!(vc.alt_allele_with_highest_allele_count(), Some(&allele("T")));

        let vc = triallelic([6, 5, 1]);
        assert_eq!(vc.alt_allele_with_highest_allele_count(), Some(&allele("C")));

        let biallelic = snp_site();
        assert_eq!(
            biallelic.alt_allele_with_highest_allele_count(),
            Some(&allele("T"))
        );

        let reference_only =
            VariantContextBuilder::new("test", "chr1", 10, 10, vec![allele("A*")])
                .make()
                .unwrap();
        assert_eq!(reference_only.alt_allele_with_highest_allele_count(), None);
    }

    #[test]
    fn test_sub_context_rederives_alleles() {
        let vc = snp_site();

        let hom_ref = vc.sub_context_from_sample("AA").unwrap();
        assert_eq!(hom_ref.alleles(), &[allele("A*")]);
        assert_eq!(hom_ref.n_samples(), 1);
        assert_eq!(hom_ref.variant_type(), VariantType::NoVariation);

        let names: HashSet<String> = ["AT".to_string(), "TT".to_string()].into_iter().collect();
        let kept = vc.sub_context_from_samples(&names, false).unwrap();
        assert_eq!(kept.n_alleles(), 2);
        assert_eq!(kept.sample_names().collect::<Vec<_>>(), vec!["AT", "TT"]);

        let none = vc.sub_context_from_samples(&HashSet::new(), true).unwrap();
        assert_eq!(none.alleles(), &[allele("A*")]);
        assert!(!none.has_genotypes());
    }

    #[test]
    fn test_genotype_allele_must_be_in_site() {
        let err = VariantContextBuilder::new("test", "chr1", 10, 10, vec![allele("A*"), allele("T")])
            .genotype_list(vec![genotype("S1", &["A*", "C"])])
            .make()
            .unwrap_err();
        assert!(matches!(
            err,
            VariantError::Consistency(ConsistencyError::GenotypeAlleleNotInContext { .. })
        ));

        // no-calls are not site alleles
        assert!(
            VariantContextBuilder::new("test", "chr1", 10, 10, vec![allele("A*"), allele("T")])
                .genotype_list(vec![genotype("S1", &[".", "."])])
                .make()
                .is_ok()
        );
    }

    #[test]
    fn test_end_attribute() {
        let vc = VariantContextBuilder::new("test", "chr1", 10, 20, vec![allele("A*"), allele("<DEL>")])
            .attribute(END_KEY, 20)
            .make()
            .unwrap();
        assert_eq!(vc.end_attribute().unwrap(), Some(20));
        assert_eq!(vc.length(), 11);
        assert!(vc.is_symbolic());
        assert_eq!(snp_site().end_attribute().unwrap(), None);
    }

    #[test]
    fn test_id_handling() {
        let base = VariantContextBuilder::new("test", "chr1", 10, 10, vec![allele("A*")]);
        let vc = base.clone().id("rs123").make().unwrap();
        assert_eq!(vc.id(), Some("rs123"));
        assert_eq!(vc.id_or_missing(), "rs123");

        let vc = base.clone().id(".").make().unwrap();
        assert!(!vc.has_id());
        assert_eq!(vc.id_or_missing(), ".");

        assert_eq!(
            base.id("").make().unwrap_err(),
            VariantError::Construction(ConstructionError::EmptyId)
        );
    }

    #[test]
    fn test_display() {
        let vc = VariantContextBuilder::new("test", "chr1", 10, 10, vec![allele("A*"), allele("T")])
            .phred_qual(30.0)
            .passes_filters()
            .attribute("DP", 12)
            .make()
            .unwrap();
        let text = vc.to_string();
        assert!(text.starts_with("[VC test @ chr1:10-10 Q30.00 of type=SNP alleles=[A*, T]"));
        assert!(text.contains("attr={DP=12}"));
        assert!(text.ends_with("filters=PASS]"));
    }
}
