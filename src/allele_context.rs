//! The ordered allele set of one locus and its variant-type classification.

use std::collections::HashSet;
use std::fmt;

use crate::allele::Allele;
use crate::cache::Memo;
use crate::error::{ConstructionError, Result};
use crate::types::VariantType;

/// Indels whose length change exceeds this many bases count as structural.
pub const MAX_ALLELE_SIZE_FOR_NON_SV: usize = 150;

/// Unique alleles of a locus with the reference at index 0.
///
/// Construction rejects empty sets, missing or repeated reference alleles,
/// duplicate bases and no-calls. The variant type is computed on first
/// request and frozen.
#[derive(Debug, Clone)]
pub struct AlleleContext {
    alleles: Vec<Allele>,
    variant_type: Memo<VariantType>,
}

impl AlleleContext {
    pub fn new(alleles: impl IntoIterator<Item = Allele>) -> Result<Self> {
        let mut alleles: Vec<Allele> = alleles.into_iter().collect();
        if alleles.is_empty() {
            return Err(ConstructionError::EmptyAlleleContext.into());
        }

        let mut reference_index = None;
        let mut reference_count = 0;
        let mut seen: HashSet<&[u8]> = HashSet::with_capacity(alleles.len());
        for (i, allele) in alleles.iter().enumerate() {
            if allele.is_no_call() {
                return Err(ConstructionError::NoCallInContext.into());
            }
            if allele.is_reference() {
                reference_count += 1;
                reference_index.get_or_insert(i);
            }
            // duplicates are detected on bases alone, so A* and A clash
            if !seen.insert(allele.bases()) {
                return Err(ConstructionError::DuplicateAllele(allele.to_string()).into());
            }
        }

        match (reference_index, reference_count) {
            (None, _) => Err(ConstructionError::MissingReference(render(&alleles)).into()),
            (Some(index), 1) => {
                if index != 0 {
                    let reference = alleles.remove(index);
                    alleles.insert(0, reference);
                }
                Ok(Self {
                    alleles,
                    variant_type: Memo::new(),
                })
            }
            (Some(_), n) => Err(ConstructionError::MultipleReferences(n).into()),
        }
    }

    /// All alleles, reference first.
    pub fn alleles(&self) -> &[Allele] {
        &self.alleles
    }

    pub fn reference(&self) -> &Allele {
        &self.alleles[0]
    }

    pub fn alternate_alleles(&self) -> &[Allele] {
        &self.alleles[1..]
    }

    pub fn alternate_allele(&self, i: usize) -> Option<&Allele> {
        self.alternate_alleles().get(i)
    }

    pub fn n_alleles(&self) -> usize {
        self.alleles.len()
    }

    pub fn is_biallelic(&self) -> bool {
        self.n_alleles() == 2
    }

    pub fn is_variant(&self) -> bool {
        self.variant_type() != VariantType::NoVariation
    }

    /// Position of `allele` (exact equality) in allele order.
    pub fn index_of(&self, allele: &Allele) -> Option<usize> {
        self.alleles.iter().position(|a| a == allele)
    }

    pub fn allele_with_bases(&self, bases: impl AsRef<[u8]>) -> Option<&Allele> {
        let bases = bases.as_ref();
        self.alleles.iter().find(|a| a.bases_match(bases))
    }

    pub fn has_allele(&self, allele: &Allele) -> bool {
        self.has_allele_ignoring_ref(allele, false)
    }

    pub fn has_allele_ignoring_ref(&self, allele: &Allele, ignore_ref_state: bool) -> bool {
        self.alleles
            .iter()
            .any(|a| a.equals(allele, ignore_ref_state))
    }

    /// Same alleles, regardless of order.
    pub fn has_same_alleles_as(&self, other: &AlleleContext) -> bool {
        self.n_alleles() == other.n_alleles() && self.alleles.iter().all(|a| other.has_allele(a))
    }

    /// Same alternate alleles, regardless of order.
    pub fn has_same_alternate_alleles_as(&self, other: &AlleleContext) -> bool {
        let mine = self.alternate_alleles();
        let theirs = other.alternate_alleles();
        mine.len() == theirs.len() && mine.iter().all(|a| theirs.contains(a))
    }

    pub fn has_symbolic_alleles(&self) -> bool {
        self.alleles.iter().any(Allele::is_symbolic)
    }

    pub fn max_allele_length(&self) -> usize {
        self.alleles.iter().map(Allele::len).max().unwrap_or(0)
    }

    /// Length change of each alternate allele relative to the reference
    /// (positive for insertions, negative for deletions).
    pub fn indel_lengths(&self) -> Vec<i64> {
        let ref_len = self.reference().len() as i64;
        self.alternate_alleles()
            .iter()
            .map(|a| a.len() as i64 - ref_len)
            .collect()
    }

    /// The reference plus every alternate that `keep` accepts, in the
    /// current order.
    pub fn retain(&self, keep: impl Fn(&Allele) -> bool) -> AlleleContext {
        let alleles = self
            .alleles
            .iter()
            .enumerate()
            .filter(|(i, a)| *i == 0 || keep(a))
            .map(|(_, a)| a.clone())
            .collect();
        AlleleContext {
            alleles,
            variant_type: Memo::new(),
        }
    }

    pub fn variant_type(&self) -> VariantType {
        *self.variant_type.get_or_compute(|| self.classify())
    }

    /// The overall type is the pairwise type of the first alternate; any
    /// alternate with a different pairwise type makes the site Mixed.
    fn classify(&self) -> VariantType {
        let reference = self.reference();
        let mut site_type = VariantType::NoVariation;
        for alternate in self.alternate_alleles() {
            let pair_type = VariantType::of_pair(reference, alternate);
            if site_type == VariantType::NoVariation {
                site_type = pair_type;
            } else if pair_type != site_type {
                return VariantType::Mixed;
            }
        }
        site_type
    }

    pub fn is_snp(&self) -> bool {
        self.variant_type() == VariantType::Snp
    }

    pub fn is_mnp(&self) -> bool {
        self.variant_type() == VariantType::Mnp
    }

    pub fn is_indel(&self) -> bool {
        self.variant_type() == VariantType::Indel
    }

    pub fn is_symbolic(&self) -> bool {
        self.variant_type() == VariantType::Symbolic
    }

    pub fn is_mixed(&self) -> bool {
        self.variant_type() == VariantType::Mixed
    }

    /// Biallelic indel whose alleles are non-empty and share a leading base.
    pub fn is_simple_indel(&self) -> bool {
        if !self.is_indel() || !self.is_biallelic() {
            return false;
        }
        let reference = self.reference().bases();
        let alternate = self.alleles[1].bases();
        !reference.is_empty() && !alternate.is_empty() && reference[0] == alternate[0]
    }

    pub fn is_simple_insertion(&self) -> bool {
        self.is_simple_indel()
            && self.reference().len() == 1
            && self.alleles[1].len() > self.reference().len()
    }

    pub fn is_simple_deletion(&self) -> bool {
        self.is_simple_indel()
            && self.alleles[1].len() == 1
            && self.reference().len() > self.alleles[1].len()
    }

    pub fn is_complex_indel(&self) -> bool {
        self.is_indel() && !self.is_simple_indel()
    }

    pub fn is_structural_indel(&self) -> bool {
        self.is_indel()
            && self
                .indel_lengths()
                .iter()
                .any(|delta| delta.unsigned_abs() as usize > MAX_ALLELE_SIZE_FOR_NON_SV)
    }

    pub fn is_symbolic_or_sv(&self) -> bool {
        self.is_symbolic() || self.is_structural_indel()
    }
}

impl PartialEq for AlleleContext {
    fn eq(&self, other: &Self) -> bool {
        self.alleles == other.alleles
    }
}

impl fmt::Display for AlleleContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(&self.alleles))
    }
}

fn render(alleles: &[Allele]) -> String {
    let names: Vec<String> = alleles.iter().map(Allele::to_string).collect();
    format!("[{}]", names.join(", "))
}
