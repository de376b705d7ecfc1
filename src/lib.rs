//! # Variant Context
//!
//! In-memory model of a genomic variant site: the alleles observed at a
//! locus, the genotype of every sample, and the site-level quality,
//! filters and annotations.
//!
//! ## Features
//!
//! - Validated alleles with interned single-base instances
//! - Variant-type classification (SNP, MNP, indel, symbolic, mixed)
//! - Per-sample genotypes with lazily indexed, cached statistics
//! - Immutable records built and modified through fluent builders
//! - Sample subsetting with allele re-derivation
//! - Header-driven decoding of textual attributes
//! - TOML-configurable validation strictness

pub mod allele;
pub mod allele_context;
pub mod cache;
pub mod common_info;
pub mod config;
pub mod decode;
pub mod error;
pub mod genotype;
pub mod genotypes_context;
pub mod logging;
pub mod types;
pub mod variant_context;

// Re-export key types
pub use allele::Allele;
pub use allele_context::AlleleContext;
pub use cache::CacheState;
pub use common_info::CommonInfo;
pub use config::{StopPolicy, ValidationConfig};
pub use decode::{FieldCount, FieldDefinition, FieldTable, FieldType, FieldTypeSource};
pub use error::{ConsistencyError, ConstructionError, DecodingError, Result, VariantError};
pub use genotype::{Genotype, GenotypeBuilder};
pub use genotypes_context::{GenotypesCacheStates, GenotypesContext};
pub use types::*;
pub use variant_context::{ValidationMode, VariantContext, VariantContextBuilder};
