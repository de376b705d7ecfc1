use std::collections::{BTreeMap, BTreeSet};

use super::validation::ValidationMode;
use super::VariantContext;
use crate::allele::Allele;
use crate::allele_context::AlleleContext;
use crate::common_info::CommonInfo;
use crate::config::ValidationConfig;
use crate::error::{ConstructionError, Result};
use crate::genotype::Genotype;
use crate::genotypes_context::GenotypesContext;
use crate::types::AttributeValue;

#[derive(Debug, Clone)]
enum PendingAlleles {
    Unset,
    Raw(Vec<Allele>),
    Context(AlleleContext),
}

#[derive(Debug, Clone)]
enum PendingGenotypes {
    Context(GenotypesContext),
    List(Vec<Genotype>),
}

/// Staging area for a [`VariantContext`].
///
/// Setters never fail and may leave the builder inconsistent; `make`
/// validates. A builder seeded with [`from_variant`](Self::from_variant)
/// re-checks only the relations whose fields were replaced.
#[derive(Debug, Clone)]
pub struct VariantContextBuilder {
    source: String,
    contig: Option<String>,
    start: Option<u64>,
    stop: Option<u64>,
    id: Option<String>,
    alleles: PendingAlleles,
    genotypes: PendingGenotypes,
    log10_p_error: Option<f64>,
    filters: Option<BTreeSet<String>>,
    attributes: BTreeMap<String, AttributeValue>,
    fully_decoded: bool,
    config: ValidationConfig,
    seeded: bool,
    alleles_touched: bool,
    genotypes_touched: bool,
}

impl Default for VariantContextBuilder {
    fn default() -> Self {
        Self {
            source: String::new(),
            contig: None,
            start: None,
            stop: None,
            id: None,
            alleles: PendingAlleles::Unset,
            genotypes: PendingGenotypes::Context(GenotypesContext::new()),
            log10_p_error: None,
            filters: None,
            attributes: BTreeMap::new(),
            fully_decoded: false,
            config: ValidationConfig::default(),
            seeded: false,
            alleles_touched: false,
            genotypes_touched: false,
        }
    }
}

impl VariantContextBuilder {
    /// A builder with every required field set.
    pub fn new(
        source: impl Into<String>,
        contig: impl Into<String>,
        start: u64,
        stop: u64,
        alleles: impl IntoIterator<Item = Allele>,
    ) -> Self {
        Self::default()
            .source(source)
            .chr(contig)
            .start(start)
            .stop(stop)
            .alleles(alleles)
    }

    /// Seed from an existing record; `make` on the untouched builder yields
    /// an equal record.
    pub fn from_variant(vc: &VariantContext) -> Self {
        Self {
            source: vc.source().to_string(),
            contig: Some(vc.contig.clone()),
            start: Some(vc.start),
            stop: Some(vc.stop),
            id: vc.id.clone(),
            alleles: PendingAlleles::Context(vc.alleles.clone()),
            genotypes: PendingGenotypes::Context(vc.genotypes.clone()),
            log10_p_error: vc.info.log10_p_error(),
            filters: vc.info.filters_maybe_none().cloned(),
            attributes: vc.info.attributes().clone(),
            fully_decoded: vc.fully_decoded,
            config: vc.config.clone(),
            seeded: true,
            alleles_touched: false,
            genotypes_touched: false,
        }
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn chr(mut self, contig: impl Into<String>) -> Self {
        self.contig = Some(contig.into());
        self
    }

    pub fn start(mut self, start: u64) -> Self {
        self.start = Some(start);
        self
    }

    pub fn stop(mut self, stop: u64) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Set contig, start and stop together.
    pub fn loc(self, contig: impl Into<String>, start: u64, stop: u64) -> Self {
        self.chr(contig).start(start).stop(stop)
    }

    pub fn alleles(mut self, alleles: impl IntoIterator<Item = Allele>) -> Self {
        self.alleles = PendingAlleles::Raw(alleles.into_iter().collect());
        self.alleles_touched = true;
        self
    }

    pub fn allele_context(mut self, alleles: AlleleContext) -> Self {
        self.alleles = PendingAlleles::Context(alleles);
        self.alleles_touched = true;
        self
    }

    pub fn genotypes(mut self, genotypes: GenotypesContext) -> Self {
        self.genotypes = PendingGenotypes::Context(genotypes);
        self.genotypes_touched = true;
        self
    }

    /// Genotypes from a plain collection; sample names are checked for
    /// uniqueness in `make`.
    pub fn genotype_list(mut self, genotypes: impl IntoIterator<Item = Genotype>) -> Self {
        self.genotypes = PendingGenotypes::List(genotypes.into_iter().collect());
        self.genotypes_touched = true;
        self
    }

    pub fn no_genotypes(self) -> Self {
        self.genotypes(GenotypesContext::new())
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn no_id(mut self) -> Self {
        self.id = None;
        self
    }

    pub fn log10_p_error(mut self, log10_p_error: f64) -> Self {
        self.log10_p_error = Some(log10_p_error);
        self
    }

    /// Set the quality from a phred-scaled value.
    pub fn phred_qual(self, qual: f64) -> Self {
        self.log10_p_error(qual / -10.0)
    }

    pub fn no_qual(mut self) -> Self {
        self.log10_p_error = None;
        self
    }

    pub fn filters<I, S>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters = Some(filters.into_iter().map(Into::into).collect());
        self
    }

    /// Add one failed filter.
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filters
            .get_or_insert_with(BTreeSet::new)
            .insert(filter.into());
        self
    }

    /// Mark filters as evaluated and passed.
    pub fn passes_filters(mut self) -> Self {
        self.filters = Some(BTreeSet::new());
        self
    }

    /// Mark filters as never evaluated.
    pub fn unfiltered(mut self) -> Self {
        self.filters = None;
        self
    }

    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Replace every attribute.
    pub fn attributes(mut self, attributes: BTreeMap<String, AttributeValue>) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn rm_attribute(mut self, key: &str) -> Self {
        self.attributes.remove(key);
        self
    }

    pub fn rm_attributes<S: AsRef<str>>(mut self, keys: &[S]) -> Self {
        for key in keys {
            self.attributes.remove(key.as_ref());
        }
        self
    }

    pub fn fully_decoded(mut self, fully_decoded: bool) -> Self {
        self.fully_decoded = fully_decoded;
        self
    }

    pub fn validation_config(mut self, config: ValidationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn validation_mode(&self) -> ValidationMode {
        if self.seeded {
            ValidationMode::from_touched(self.alleles_touched, self.genotypes_touched)
        } else {
            ValidationMode::Both
        }
    }

    /// Validate and build. The builder is left untouched and can be reused.
    pub fn make(&self) -> Result<VariantContext> {
        let contig = self
            .contig
            .clone()
            .ok_or(ConstructionError::MissingField("contig"))?;
        let start = self.start.ok_or(ConstructionError::MissingField("start"))?;
        let stop = self.stop.ok_or(ConstructionError::MissingField("stop"))?;
        if start == 0 || stop < start {
            return Err(ConstructionError::InvalidInterval { start, stop }.into());
        }

        let id = match self.id.as_deref() {
            Some("") => return Err(ConstructionError::EmptyId.into()),
            Some(".") | None => None,
            Some(id) => Some(id.to_string()),
        };

        let alleles = match &self.alleles {
            PendingAlleles::Unset => return Err(ConstructionError::MissingField("alleles").into()),
            PendingAlleles::Raw(alleles) => AlleleContext::new(alleles.iter().cloned())?,
            PendingAlleles::Context(alleles) => alleles.clone(),
        };

        let mut genotypes = match &self.genotypes {
            PendingGenotypes::Context(genotypes) => genotypes.clone(),
            PendingGenotypes::List(genotypes) => {
                GenotypesContext::from_genotypes(genotypes.iter().cloned())?
            }
        };
        genotypes.seal();

        let info = CommonInfo::new(
            self.source.clone(),
            self.log10_p_error,
            self.filters.clone(),
            self.attributes.clone(),
        )?;

        let vc = VariantContext {
            contig,
            start,
            stop,
            id,
            alleles,
            genotypes,
            info,
            fully_decoded: self.fully_decoded,
            config: self.config.clone(),
        };
        vc.validate(self.validation_mode(), &self.config)?;
        Ok(vc)
    }
}
