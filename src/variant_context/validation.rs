use tracing::warn;

use super::{VariantContext, ALLELE_COUNT_KEY, ALLELE_NUMBER_KEY};
use crate::config::{StopPolicy, ValidationConfig};
use crate::error::{ConsistencyError, DecodingError, Result, VariantError};

/// Which relations `make` re-checks, decided by the builder fields touched
/// since seeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    None,
    AllelesOnly,
    GenotypesOnly,
    Both,
}

impl ValidationMode {
    pub fn from_touched(alleles: bool, genotypes: bool) -> Self {
        match (alleles, genotypes) {
            (false, false) => ValidationMode::None,
            (true, false) => ValidationMode::AllelesOnly,
            (false, true) => ValidationMode::GenotypesOnly,
            (true, true) => ValidationMode::Both,
        }
    }

    /// Changing either side can orphan a genotype allele.
    pub fn checks_genotype_alleles(self) -> bool {
        self != ValidationMode::None
    }
}

impl VariantContext {
    pub(crate) fn validate(&self, mode: ValidationMode, config: &ValidationConfig) -> Result<()> {
        match self.validate_stop() {
            Err(VariantError::Consistency(err)) if config.stop_policy == StopPolicy::Lenient => {
                warn!("Keeping inconsistent record: {}", err);
            }
            other => other?,
        }
        if mode.checks_genotype_alleles() {
            self.validate_genotype_alleles()?;
            if config.check_chromosome_counts {
                self.validate_chromosome_counts()?;
            }
        }
        Ok(())
    }

    /// The stop must match the `END` attribute when one is present, and
    /// otherwise the reference length unless a symbolic allele is present.
    pub fn validate_stop(&self) -> Result<()> {
        if let Some(end) = self.end_attribute()? {
            if end != self.stop as i64 {
                return Err(ConsistencyError::EndAttributeMismatch {
                    locus: self.locus(),
                    end,
                    stop: self.stop,
                }
                .into());
            }
            return Ok(());
        }
        if self.alleles.has_symbolic_alleles() {
            return Ok(());
        }

        let ref_length = self.reference().len();
        let expected = self.start + ref_length as u64 - 1;
        if self.stop != expected {
            return Err(ConsistencyError::StopMismatch {
                locus: self.locus(),
                stop: self.stop,
                ref_length,
                expected,
            }
            .into());
        }
        Ok(())
    }

    /// Every called allele of every genotype must be one of the site alleles.
    pub fn validate_genotype_alleles(&self) -> Result<()> {
        for genotype in self.genotypes.iter() {
            if let Some(allele) = genotype.called_alleles().find(|a| !self.has_allele(a)) {
                return Err(ConsistencyError::GenotypeAlleleNotInContext {
                    sample: genotype.sample_name().to_string(),
                    allele: allele.to_string(),
                    alleles: self.alleles.to_string(),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Compare the AN and AC attributes, when present, with the counts the
    /// genotypes yield. Sites without genotypes pass.
    pub fn validate_chromosome_counts(&self) -> Result<()> {
        if !self.has_genotypes() {
            return Ok(());
        }

        if self.has_attribute(ALLELE_NUMBER_KEY) {
            let declared = self.attribute_as_int(ALLELE_NUMBER_KEY, 0)?;
            let observed = self.called_chr_count();
            if declared != observed as i64 {
                return Err(ConsistencyError::ChromosomeCountMismatch {
                    locus: self.locus(),
                    key: ALLELE_NUMBER_KEY,
                    declared: declared.to_string(),
                    observed: observed.to_string(),
                }
                .into());
            }
        }

        if self.has_attribute(ALLELE_COUNT_KEY) {
            let declared = self
                .attribute_as_list(ALLELE_COUNT_KEY)
                .iter()
                .map(|value| {
                    value.to_int().ok_or_else(|| {
                        VariantError::from(DecodingError::InvalidValue {
                            locus: self.locus(),
                            key: ALLELE_COUNT_KEY.to_string(),
                            value: value.to_string(),
                            expected: "integer".to_string(),
                        })
                    })
                })
                .collect::<Result<Vec<i64>>>()?;
            let observed: Vec<i64> = self
                .alternate_alleles()
                .iter()
                .map(|a| self.called_chr_count_of(a) as i64)
                .collect();
            if declared != observed {
                return Err(ConsistencyError::ChromosomeCountMismatch {
                    locus: self.locus(),
                    key: ALLELE_COUNT_KEY,
                    declared: join(&declared),
                    observed: join(&observed),
                }
                .into());
            }
        }
        Ok(())
    }

    /// The reference allele must spell `bases` (case-insensitive).
    pub fn validate_reference_bases(&self, bases: impl AsRef<[u8]>) -> Result<()> {
        let bases = bases.as_ref();
        let reference = self.reference();
        if !reference.bases().eq_ignore_ascii_case(bases) {
            return Err(ConsistencyError::ReferenceBasesMismatch {
                locus: self.locus(),
                allele: reference.to_string(),
                bases: String::from_utf8_lossy(bases).into_owned(),
            }
            .into());
        }
        Ok(())
    }
}

fn join(values: &[i64]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
