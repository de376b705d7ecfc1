//! Ordered per-sample genotypes with lazily derived indices and statistics.
//!
//! Every derived value (sample-name index, sorted names, class counts, max
//! ploidy, called-chromosome count, monomorphism) lives in its own cache.
//! Reads fill a `Dirty` cache; structural mutations reset the affected caches
//! to `Dirty`. Appending a genotype patches a fresh name index in place, every
//! other insert, remove or rename forces a rebuild on the next lookup, so
//! removing samples one by one costs O(n) each; prefer [`GenotypesContext::retain_samples`].

use hashbrown::HashMap;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::fmt;

use crate::allele::Allele;
use crate::cache::{CacheState, Memo};
use crate::error::{ConstructionError, Result, VariantError};
use crate::genotype::Genotype;
use crate::types::GenotypeType;

/// Snapshot of every derived cache, for callers that want to observe
/// invalidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenotypesCacheStates {
    pub sample_index: CacheState,
    pub sorted_names: CacheState,
    pub type_counts: CacheState,
    pub max_ploidy: CacheState,
    pub called_chr_count: CacheState,
}

#[derive(Debug)]
pub struct GenotypesContext {
    genotypes: Vec<Genotype>,
    sealed: bool,
    sample_index: Memo<HashMap<String, usize>>,
    sorted_names: Memo<Vec<String>>,
    type_counts: Memo<[usize; 6]>,
    max_ploidy: Memo<usize>,
    called_chr_count: Memo<usize>,
    monomorphic: Mutex<Option<(Allele, bool)>>,
}

impl GenotypesContext {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            genotypes: Vec::with_capacity(capacity),
            sealed: false,
            sample_index: Memo::new(),
            sorted_names: Memo::new(),
            type_counts: Memo::new(),
            max_ploidy: Memo::new(),
            called_chr_count: Memo::new(),
            monomorphic: Mutex::new(None),
        }
    }

    /// Build from genotypes with distinct sample names.
    pub fn from_genotypes(genotypes: impl IntoIterator<Item = Genotype>) -> Result<Self> {
        let mut context = Self::new();
        context.extend(genotypes)?;
        Ok(context)
    }

    // ------------------------------------------------------------------
    // sealing
    // ------------------------------------------------------------------

    /// Forbid any further mutation.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// A mutable copy, regardless of whether this context is sealed.
    pub fn unsealed_copy(&self) -> Self {
        let mut copy = self.clone();
        copy.sealed = false;
        copy
    }

    fn ensure_mutable(&self, operation: &'static str) -> Result<()> {
        if self.sealed {
            Err(VariantError::Sealed(operation))
        } else {
            Ok(())
        }
    }

    // ------------------------------------------------------------------
    // access
    // ------------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.genotypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genotypes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Genotype> {
        self.genotypes.iter()
    }

    pub fn genotypes(&self) -> &[Genotype] {
        &self.genotypes
    }

    pub fn get(&self, index: usize) -> Option<&Genotype> {
        self.genotypes.get(index)
    }

    pub fn get_by_name(&self, sample_name: &str) -> Option<&Genotype> {
        self.index_of_sample(sample_name)
            .map(|index| &self.genotypes[index])
    }

    pub fn index_of_sample(&self, sample_name: &str) -> Option<usize> {
        self.index().get(sample_name).copied()
    }

    pub fn contains_sample(&self, sample_name: &str) -> bool {
        self.index().contains_key(sample_name)
    }

    /// Sample names in genotype order.
    pub fn sample_names(&self) -> impl Iterator<Item = &str> {
        self.genotypes.iter().map(Genotype::sample_name)
    }

    pub fn sample_names_ordered_by_name(&self) -> &[String] {
        self.sorted_names.get_or_compute(|| {
            let mut names: Vec<String> = self
                .genotypes
                .iter()
                .map(|g| g.sample_name().to_string())
                .collect();
            names.sort();
            names
        })
    }

    pub fn iter_in_sample_name_order(&self) -> impl Iterator<Item = &Genotype> {
        self.iter_in_order_of(self.sample_names_ordered_by_name())
    }

    /// Genotypes for `names`, in that order; unknown names are skipped.
    pub fn iter_in_order_of<'a, S: AsRef<str> + 'a>(
        &'a self,
        names: &'a [S],
    ) -> impl Iterator<Item = &'a Genotype> + 'a {
        names
            .iter()
            .filter_map(move |name| self.get_by_name(name.as_ref()))
    }

    /// Genotypes for `names`, in that order; unknown names are dropped.
    pub fn by_sample_names<S: AsRef<str>>(&self, names: &[S]) -> Vec<&Genotype> {
        names
            .iter()
            .filter_map(|name| self.get_by_name(name.as_ref()))
            .collect()
    }

    /// An independent, unsealed context with only the named samples, in
    /// their original order.
    pub fn subset_to_samples(&self, names: &HashSet<String>) -> GenotypesContext {
        let mut subset = GenotypesContext::with_capacity(names.len().min(self.len()));
        subset.genotypes = self
            .genotypes
            .iter()
            .filter(|g| names.contains(g.sample_name()))
            .cloned()
            .collect();
        subset
    }

    fn index(&self) -> &HashMap<String, usize> {
        self.sample_index.get_or_compute(|| {
            self.genotypes
                .iter()
                .enumerate()
                .map(|(i, g)| (g.sample_name().to_string(), i))
                .collect()
        })
    }

    // ------------------------------------------------------------------
    // aggregate statistics
    // ------------------------------------------------------------------

    /// Copies of `allele` (or of any called allele when `None`) among the
    /// samples in `samples`; an empty set means every sample.
    ///
    /// Passing the no-call allele counts uncalled copies.
    pub fn called_chr_count(&self, allele: Option<&Allele>, samples: &HashSet<String>) -> usize {
        self.genotypes
            .iter()
            .filter(|g| samples.is_empty() || samples.contains(g.sample_name()))
            .map(|g| match allele {
                Some(allele) => g.count_allele(allele),
                None => g.called_alleles().count(),
            })
            .sum()
    }

    /// Called alleles across all samples (AN).
    pub fn called_chr_count_all(&self) -> usize {
        *self
            .called_chr_count
            .get_or_compute(|| self.called_chr_count(None, &HashSet::new()))
    }

    /// Copies of `allele` across all samples (AC for that allele).
    pub fn called_chr_count_of(&self, allele: &Allele) -> usize {
        self.called_chr_count(Some(allele), &HashSet::new())
    }

    fn type_counts(&self) -> &[usize; 6] {
        self.type_counts.get_or_compute(|| {
            let mut counts = [0usize; 6];
            for genotype in &self.genotypes {
                counts[genotype.genotype_type().slot()] += 1;
            }
            counts
        })
    }

    pub fn count_of(&self, genotype_type: GenotypeType) -> usize {
        self.type_counts()[genotype_type.slot()]
    }

    pub fn no_call_count(&self) -> usize {
        self.count_of(GenotypeType::NoCall)
    }

    pub fn hom_ref_count(&self) -> usize {
        self.count_of(GenotypeType::HomRef)
    }

    pub fn het_count(&self) -> usize {
        self.count_of(GenotypeType::Het)
    }

    pub fn hom_var_count(&self) -> usize {
        self.count_of(GenotypeType::HomVar)
    }

    pub fn mixed_count(&self) -> usize {
        self.count_of(GenotypeType::Mixed)
    }

    /// Largest ploidy among the genotypes, or `default` when none has any
    /// alleles.
    pub fn max_ploidy(&self, default: usize) -> usize {
        let max = *self.max_ploidy.get_or_compute(|| {
            self.genotypes
                .iter()
                .map(Genotype::ploidy)
                .max()
                .unwrap_or(0)
        });
        if max == 0 {
            default
        } else {
            max
        }
    }

    /// True when no sample carries a called allele other than `reference`.
    /// The answer is remembered for the most recent reference allele.
    pub fn is_monomorphic_in_samples(&self, reference: &Allele) -> bool {
        let mut slot = self.monomorphic.lock();
        if let Some((cached_reference, monomorphic)) = slot.as_ref() {
            if cached_reference == reference {
                return *monomorphic;
            }
        }
        let monomorphic = self.called_chr_count_of(reference) == self.called_chr_count_all();
        *slot = Some((reference.clone(), monomorphic));
        monomorphic
    }

    pub fn is_polymorphic_in_samples(&self, reference: &Allele) -> bool {
        !self.is_monomorphic_in_samples(reference)
    }

    pub fn cache_states(&self) -> GenotypesCacheStates {
        GenotypesCacheStates {
            sample_index: self.sample_index.state(),
            sorted_names: self.sorted_names.state(),
            type_counts: self.type_counts.state(),
            max_ploidy: self.max_ploidy.state(),
            called_chr_count: self.called_chr_count.state(),
        }
    }

    // ------------------------------------------------------------------
    // mutation
    // ------------------------------------------------------------------

    /// Append a genotype. Fails if the sample is already present.
    pub fn add(&mut self, genotype: Genotype) -> Result<()> {
        self.ensure_mutable("add")?;
        self.ensure_new_sample(genotype.sample_name())?;

        let position = self.genotypes.len();
        let name = genotype.sample_name().to_string();
        self.genotypes.push(genotype);

        self.invalidate_derived();
        if let Some(index) = self.sample_index.fresh_mut() {
            index.insert(name, position);
        }
        Ok(())
    }

    pub fn extend(&mut self, genotypes: impl IntoIterator<Item = Genotype>) -> Result<()> {
        for genotype in genotypes {
            self.add(genotype)?;
        }
        Ok(())
    }

    /// Insert at `position`, shifting later genotypes.
    pub fn insert(&mut self, position: usize, genotype: Genotype) -> Result<()> {
        self.ensure_mutable("insert")?;
        if position > self.genotypes.len() {
            return Err(ConstructionError::IndexOutOfBounds {
                index: position,
                len: self.genotypes.len(),
            }
            .into());
        }
        if position == self.genotypes.len() {
            return self.add(genotype);
        }
        self.ensure_new_sample(genotype.sample_name())?;

        self.genotypes.insert(position, genotype);
        self.invalidate_derived();
        self.sample_index.invalidate();
        Ok(())
    }

    /// Overwrite the genotype at `position`, returning the previous one.
    pub fn set(&mut self, position: usize, genotype: Genotype) -> Result<Genotype> {
        self.ensure_mutable("set")?;
        let current_name = match self.genotypes.get(position) {
            Some(current) => current.sample_name().to_string(),
            None => {
                return Err(ConstructionError::IndexOutOfBounds {
                    index: position,
                    len: self.genotypes.len(),
                }
                .into())
            }
        };
        let renamed = current_name != genotype.sample_name();
        if renamed {
            self.ensure_new_sample(genotype.sample_name())?;
        }

        let new_name = genotype.sample_name().to_string();
        let previous = std::mem::replace(&mut self.genotypes[position], genotype);
        self.invalidate_derived();
        if renamed {
            if let Some(index) = self.sample_index.fresh_mut() {
                index.remove(&current_name);
                index.insert(new_name, position);
            }
        }
        Ok(previous)
    }

    /// Replace the genotype of the same sample, or append it when the sample
    /// is new. Returns the replaced genotype, if any.
    pub fn replace(&mut self, genotype: Genotype) -> Result<Option<Genotype>> {
        self.ensure_mutable("replace")?;
        match self.index_of_sample(genotype.sample_name()) {
            Some(position) => self.set(position, genotype).map(Some),
            None => self.add(genotype).map(|_| None),
        }
    }

    pub fn remove(&mut self, position: usize) -> Result<Genotype> {
        self.ensure_mutable("remove")?;
        if position >= self.genotypes.len() {
            return Err(ConstructionError::IndexOutOfBounds {
                index: position,
                len: self.genotypes.len(),
            }
            .into());
        }
        let removed = self.genotypes.remove(position);
        self.invalidate_derived();
        self.sample_index.invalidate();
        Ok(removed)
    }

    pub fn remove_sample(&mut self, sample_name: &str) -> Result<Option<Genotype>> {
        self.ensure_mutable("remove")?;
        match self.index_of_sample(sample_name) {
            Some(position) => self.remove(position).map(Some),
            None => Ok(None),
        }
    }

    /// Keep only the named samples. Indices are rebuilt once, on next use.
    pub fn retain_samples(&mut self, names: &HashSet<String>) -> Result<()> {
        self.ensure_mutable("retain")?;
        let before = self.genotypes.len();
        self.genotypes.retain(|g| names.contains(g.sample_name()));
        if self.genotypes.len() != before {
            self.invalidate_derived();
            self.sample_index.invalidate();
        }
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        self.ensure_mutable("clear")?;
        self.genotypes.clear();
        self.invalidate_derived();
        self.sample_index.invalidate();
        Ok(())
    }

    fn ensure_new_sample(&self, sample_name: &str) -> Result<()> {
        if self.contains_sample(sample_name) {
            Err(ConstructionError::DuplicateSample(sample_name.to_string()).into())
        } else {
            Ok(())
        }
    }

    /// Everything except the name index, which callers patch or drop.
    fn invalidate_derived(&mut self) {
        self.sorted_names.invalidate();
        self.type_counts.invalidate();
        self.max_ploidy.invalidate();
        self.called_chr_count.invalidate();
        *self.monomorphic.get_mut() = None;
    }
}

impl Default for GenotypesContext {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for GenotypesContext {
    fn clone(&self) -> Self {
        Self {
            genotypes: self.genotypes.clone(),
            sealed: self.sealed,
            sample_index: self.sample_index.clone(),
            sorted_names: self.sorted_names.clone(),
            type_counts: self.type_counts.clone(),
            max_ploidy: self.max_ploidy.clone(),
            called_chr_count: self.called_chr_count.clone(),
            monomorphic: Mutex::new(self.monomorphic.lock().clone()),
        }
    }
}

impl PartialEq for GenotypesContext {
    fn eq(&self, other: &Self) -> bool {
        self.genotypes == other.genotypes
    }
}

impl<'a> IntoIterator for &'a GenotypesContext {
    type Item = &'a Genotype;
    type IntoIter = std::slice::Iter<'a, Genotype>;

    fn into_iter(self) -> Self::IntoIter {
        self.genotypes.iter()
    }
}

impl fmt::Display for GenotypesContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, genotype) in self.iter_in_sample_name_order().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", genotype)?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genotype::GenotypeBuilder;

    fn allele(s: &str) -> Allele {
        s.parse().unwrap()
    }

    fn genotype(name: &str, alleles: &[&str]) -> Genotype {
        let alleles: Vec<Allele> = alleles
            .iter()
            .map(|s| {
                if *s == "." {
                    Allele::no_call()
                } else {
                    allele(s)
                }
            })
            .collect();
        GenotypeBuilder::create(name, alleles).unwrap()
    }

    fn snp_context() -> GenotypesContext {
        GenotypesContext::from_genotypes(vec![
            genotype("AA", &["A*", "A*"]),
            genotype("AT", &["A*", "T"]),
            genotype("TT", &["T", "T"]),
        ])
        .unwrap()
    }

    fn names(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    /// Touch every lazily derived value so all caches are Fresh.
    fn warm(context: &GenotypesContext) {
        context.sample_names_ordered_by_name();
        context.het_count();
        context.max_ploidy(2);
        context.called_chr_count_all();
        context.contains_sample("AA");
    }

    fn all_fresh() -> GenotypesCacheStates {
        GenotypesCacheStates {
            sample_index: CacheState::Fresh,
            sorted_names: CacheState::Fresh,
            type_counts: CacheState::Fresh,
            max_ploidy: CacheState::Fresh,
            called_chr_count: CacheState::Fresh,
        }
    }

    #[test]
    fn test_simple_snp_counts() {
        let gc = snp_context();
        assert_eq!(gc.called_chr_count_all(), 6);
        assert_eq!(gc.called_chr_count_of(&allele("A*")), 3);
        assert_eq!(gc.called_chr_count_of(&allele("T")), 3);
        assert!(gc.is_polymorphic_in_samples(&allele("A*")));
        assert_eq!(gc.hom_ref_count(), 1);
        assert_eq!(gc.het_count(), 1);
        assert_eq!(gc.hom_var_count(), 1);
        assert_eq!(gc.max_ploidy(1), 2);
    }

    #[test]
    fn test_sample_subset_counts() {
        let gc = snp_context();
        let t = allele("T");
        assert_eq!(gc.called_chr_count(Some(&t), &names(&["AT", "TT"])), 3);
        assert_eq!(gc.called_chr_count(None, &names(&["AA"])), 2);
        assert_eq!(gc.called_chr_count(None, &HashSet::new()), 6);
        assert_eq!(gc.called_chr_count(Some(&t), &names(&["MISSING"])), 0);
    }

    #[test]
    fn test_no_call_counting() {
        let gc = GenotypesContext::from_genotypes(vec![
            genotype("AA1", &["A*", "A*"]),
            genotype("AA2", &["A*", "A*"]),
            genotype("..", &[".", "."]),
        ])
        .unwrap();
        assert!(gc.is_monomorphic_in_samples(&allele("A*")));
        assert_eq!(gc.called_chr_count_all(), 4);
        assert_eq!(gc.called_chr_count_of(&Allele::no_call()), 2);
        assert_eq!(gc.called_chr_count_of(&allele("T")), 0);
        assert_eq!(gc.no_call_count(), 1);
    }

    #[test]
    fn test_lookup_by_name() {
        let gc = snp_context();
        assert_eq!(gc.get_by_name("AT").map(Genotype::sample_name), Some("AT"));
        assert!(gc.get_by_name("at").is_none());
        assert!(gc.contains_sample("TT"));
        assert!(!gc.contains_sample("TTT"));

        let found = gc.by_sample_names(&["TT", "CC", "AA"]);
        let found: Vec<&str> = found.iter().map(|g| g.sample_name()).collect();
        assert_eq!(found, vec!["TT", "AA"]);
        assert_eq!(gc.get(1).map(Genotype::sample_name), Some("AT"));
    }

    #[test]
    fn test_sample_name_ordering() {
        let mut gc = GenotypesContext::new();
        for name in ["NA3", "NA1", "NA2"] {
            gc.add(genotype(name, &["A*", "T"])).unwrap();
        }
        assert_eq!(gc.sample_names_ordered_by_name(), &["NA1", "NA2", "NA3"]);
        let in_order: Vec<&str> = gc.iter_in_sample_name_order().map(|g| g.sample_name()).collect();
        assert_eq!(in_order, vec!["NA1", "NA2", "NA3"]);
        let insertion: Vec<&str> = gc.sample_names().collect();
        assert_eq!(insertion, vec!["NA3", "NA1", "NA2"]);
    }

    #[test]
    fn test_duplicate_samples_rejected() {
        let mut gc = snp_context();
        let err = gc.add(genotype("AT", &["T", "T"])).unwrap_err();
        assert_eq!(
            err,
            VariantError::Construction(ConstructionError::DuplicateSample("AT".into()))
        );
        assert!(GenotypesContext::from_genotypes(vec![
            genotype("x", &["A*"]),
            genotype("x", &["T"])
        ])
        .is_err());
        assert!(gc.set(0, genotype("TT", &["T", "T"])).is_err());
        assert_eq!(gc.len(), 3);
    }

    #[test]
    fn test_add_patches_fresh_index() {
        let mut gc = snp_context();
        warm(&gc);
        assert_eq!(gc.cache_states(), all_fresh());

        gc.add(genotype("CC", &["T", "A*"])).unwrap();
        let states = gc.cache_states();
        assert_eq!(states.sample_index, CacheState::Fresh);
        assert_eq!(states.sorted_names, CacheState::Dirty);
        assert_eq!(states.type_counts, CacheState::Dirty);
        assert_eq!(gc.index_of_sample("CC"), Some(3));
        assert_eq!(gc.het_count(), 2);
        assert_eq!(gc.called_chr_count_all(), 8);
    }

    #[test]
    fn test_add_on_dirty_caches() {
        let mut gc = GenotypesContext::new();
        gc.add(genotype("s1", &["A*", "T"])).unwrap();
        gc.add(genotype("s2", &["T", "T"])).unwrap();
        assert_eq!(gc.cache_states().type_counts, CacheState::Dirty);
        assert_eq!(gc.hom_var_count(), 1);
        assert_eq!(gc.index_of_sample("s2"), Some(1));
    }

    #[test]
    fn test_insert_invalidates_index() {
        for warmed in [true, false] {
            let mut gc = snp_context();
            if warmed {
                warm(&gc);
            }
            gc.insert(0, genotype("first", &[".", "."])).unwrap();
            assert_eq!(gc.cache_states().sample_index, CacheState::Dirty);
            assert_eq!(gc.index_of_sample("first"), Some(0));
            assert_eq!(gc.index_of_sample("TT"), Some(3));
            assert_eq!(gc.no_call_count(), 1);
            assert_eq!(gc.sample_names_ordered_by_name()[0], "AA");
            assert!(gc.insert(10, genotype("late", &["A*"])).is_err());
        }
    }

    #[test]
    fn test_set_and_replace() {
        for warmed in [true, false] {
            let mut gc = snp_context();
            if warmed {
                warm(&gc);
            }
            let previous = gc.set(2, genotype("TC", &["T", "A*"])).unwrap();
            assert_eq!(previous.sample_name(), "TT");
            assert!(gc.get_by_name("TT").is_none());
            assert_eq!(gc.index_of_sample("TC"), Some(2));
            assert_eq!(gc.hom_var_count(), 0);
            assert_eq!(gc.het_count(), 2);

            let replaced = gc.replace(genotype("AA", &["T", "T"])).unwrap();
            assert_eq!(replaced.map(|g| g.genotype_type()), Some(GenotypeType::HomRef));
            assert_eq!(gc.hom_var_count(), 1);
            assert_eq!(gc.hom_ref_count(), 0);

            assert!(gc.replace(genotype("new", &["A*", "A*"])).unwrap().is_none());
            assert_eq!(gc.len(), 4);
            assert_eq!(gc.index_of_sample("new"), Some(3));
        }
    }

    #[test]
    fn test_remove_variants() {
        for warmed in [true, false] {
            let mut gc = snp_context();
            if warmed {
                warm(&gc);
            }
            let removed = gc.remove(0).unwrap();
            assert_eq!(removed.sample_name(), "AA");
            assert_eq!(gc.cache_states().sample_index, CacheState::Dirty);
            assert_eq!(gc.index_of_sample("TT"), Some(1));
            assert_eq!(gc.called_chr_count_all(), 4);

            assert!(gc.remove_sample("AT").unwrap().is_some());
            assert!(gc.remove_sample("AT").unwrap().is_none());
            assert_eq!(gc.sample_names_ordered_by_name(), &["TT"]);
            assert!(gc.remove(5).is_err());
        }
    }

    #[test]
    fn test_retain_and_clear() {
        for warmed in [true, false] {
            let mut gc = snp_context();
            if warmed {
                warm(&gc);
            }
            gc.retain_samples(&names(&["TT", "AA"])).unwrap();
            let kept: Vec<&str> = gc.sample_names().collect();
            assert_eq!(kept, vec!["AA", "TT"]);
            assert_eq!(gc.index_of_sample("TT"), Some(1));
            assert!(gc.is_polymorphic_in_samples(&allele("A*")));

            gc.clear().unwrap();
            assert!(gc.is_empty());
            assert_eq!(gc.max_ploidy(2), 2);
            assert!(!gc.contains_sample("AA"));
        }
    }

    #[test]
    fn test_monomorphism_follows_mutation() {
        let mut gc = GenotypesContext::from_genotypes(vec![genotype("AA", &["A*", "A*"])]).unwrap();
        let reference = allele("A*");
        assert!(gc.is_monomorphic_in_samples(&reference));
        gc.add(genotype("AT", &["A*", "T"])).unwrap();
        assert!(gc.is_polymorphic_in_samples(&reference));
        gc.remove_sample("AT").unwrap();
        assert!(gc.is_monomorphic_in_samples(&reference));
        // a different reference is not answered from the cache
        assert!(gc.is_polymorphic_in_samples(&allele("T")));
    }

    #[test]
    fn test_sealed_context_rejects_mutation() {
        let mut gc = snp_context();
        gc.seal();
        assert!(gc.is_sealed());
        assert_eq!(
            gc.add(genotype("new", &["A*"])).unwrap_err(),
            VariantError::Sealed("add")
        );
        assert!(gc.remove(0).is_err());
        assert!(gc.remove_sample("AA").is_err());
        assert!(gc.replace(genotype("AA", &["T"])).is_err());
        assert!(gc.set(0, genotype("AA", &["T"])).is_err());
        assert!(gc.insert(0, genotype("z", &["T"])).is_err());
        assert!(gc.retain_samples(&HashSet::new()).is_err());
        assert!(gc.clear().is_err());
        assert_eq!(gc.len(), 3);

        let mut copy = gc.unsealed_copy();
        assert!(copy.add(genotype("new", &["A*"])).is_ok());
        assert_eq!(gc.len(), 3);
    }

    #[test]
    fn test_subset_is_independent() {
        let gc = snp_context();
        let mut subset = gc.subset_to_samples(&names(&["TT", "AA", "MISSING"]));
        let kept: Vec<&str> = subset.sample_names().collect();
        assert_eq!(kept, vec!["AA", "TT"]);
        subset.add(genotype("x", &["T"])).unwrap();
        assert_eq!(gc.len(), 3);
        assert!(gc.subset_to_samples(&HashSet::new()).is_empty());
    }

    #[test]
    fn test_polyploid_max_ploidy() {
        let gc = GenotypesContext::from_genotypes(vec![
            genotype("tetra", &["A*", "A*", "T", "T"]),
            genotype("haploid", &["T"]),
            genotype("empty", &[]),
        ])
        .unwrap();
        assert_eq!(gc.max_ploidy(2), 4);
        assert_eq!(gc.count_of(GenotypeType::Unavailable), 1);
        assert_eq!(gc.called_chr_count_all(), 5);
    }
}
