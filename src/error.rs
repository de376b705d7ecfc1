use thiserror::Error;

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, VariantError>;

/// Any failure raised while building, validating or decoding a record.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VariantError {
    #[error(transparent)]
    Construction(#[from] ConstructionError),
    #[error(transparent)]
    Consistency(#[from] ConsistencyError),
    #[error(transparent)]
    Decoding(#[from] DecodingError),
    #[error("genotypes context is sealed: {0} is not permitted")]
    Sealed(&'static str),
}

impl VariantError {
    /// Attach `locus` to an attribute error raised without one.
    pub(crate) fn at_locus(self, locus: &str) -> Self {
        match self {
            VariantError::Decoding(DecodingError::WrongAttributeType {
                locus: current,
                key,
                found,
                requested,
            }) if current.is_empty() => DecodingError::WrongAttributeType {
                locus: locus.to_string(),
                key,
                found,
                requested,
            }
            .into(),
            other => other,
        }
    }
}

fn locus_prefix(locus: &str) -> String {
    if locus.is_empty() {
        String::new()
    } else {
        format!("{}: ", locus)
    }
}

/// Illegal input to a constructor or builder. Never recovered.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConstructionError {
    #[error("null alleles are not supported")]
    NullAllele,
    #[error("unexpected base in allele bases '{0}'")]
    InvalidAlleleBases(String),
    #[error("a no-call allele cannot be tagged as the reference allele")]
    NoCallReference,
    #[error("a symbolic allele cannot be tagged as the reference allele: {0}")]
    SymbolicReference(String),
    #[error("cannot extend symbolic allele {0}")]
    SymbolicExtension(String),
    #[error("an allele context needs at least one allele")]
    EmptyAlleleContext,
    #[error("no reference allele among alleles {0}")]
    MissingReference(String),
    #[error("found {0} reference alleles, expected exactly one")]
    MultipleReferences(usize),
    #[error("duplicate allele {0} in allele context")]
    DuplicateAllele(String),
    #[error("no-call allele is not allowed in an allele context")]
    NoCallInContext,
    #[error("genotype sample name must not be empty")]
    EmptySampleName,
    #[error("extended attribute '{0}' shadows an inline genotype field")]
    ReservedGenotypeKey(String),
    #[error("genotype field {0} is present but empty")]
    EmptyArrayField(&'static str),
    #[error("builder field '{0}' was never set")]
    MissingField(&'static str),
    #[error("ID must not be empty; clear it to mark the record as having no ID")]
    EmptyId,
    #[error("log10 probability of error must be finite and <= 0, got {0}")]
    InvalidLog10PError(f64),
    #[error("filter names must not be empty")]
    EmptyFilterName,
    #[error("sample '{0}' already present in genotypes context")]
    DuplicateSample(String),
    #[error("genotype index {index} out of bounds for {len} genotypes")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("invalid interval {start}-{stop}")]
    InvalidInterval { start: u64, stop: u64 },
}

/// A structurally well-formed record whose parts disagree with each other.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConsistencyError {
    #[error("allele {allele} of sample {sample} is not among the site alleles {alleles}")]
    GenotypeAlleleNotInContext {
        sample: String,
        allele: String,
        alleles: String,
    },
    #[error("{locus}: stop {stop} disagrees with reference allele length {ref_length} (expected stop {expected})")]
    StopMismatch {
        locus: String,
        stop: u64,
        ref_length: usize,
        expected: u64,
    },
    #[error("{locus}: END attribute {end} disagrees with stop {stop}")]
    EndAttributeMismatch { locus: String, end: i64, stop: u64 },
    #[error("{locus}: attribute {key} is {declared} but the genotypes yield {observed}")]
    ChromosomeCountMismatch {
        locus: String,
        key: &'static str,
        declared: String,
        observed: String,
    },
    #[error("{locus}: reference allele {allele} does not match reference bases {bases}")]
    ReferenceBasesMismatch {
        locus: String,
        allele: String,
        bases: String,
    },
}

/// A value that cannot be read as the type or count its header declares.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodingError {
    #[error("{locus}: value '{value}' of field {key} is not a valid {expected}")]
    InvalidValue {
        locus: String,
        key: String,
        value: String,
        expected: String,
    },
    #[error("{locus}: field {key} has {observed} values, the header declares {expected}")]
    WrongCount {
        locus: String,
        key: String,
        expected: usize,
        observed: usize,
    },
    #[error("{locus}: field {key} is not defined in the header")]
    UndefinedField { locus: String, key: String },
    #[error(
        "{}attribute {key} holds {found}, which cannot be read as {requested}",
        locus_prefix(.locus)
    )]
    WrongAttributeType {
        locus: String,
        key: String,
        found: String,
        requested: &'static str,
    },
}
