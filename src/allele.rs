//! Immutable alleles.
//!
//! An [`Allele`] is a normalized base sequence (or a symbolic token such as
//! `<DEL>`) plus a reference flag. Single-base alleles are interned in a
//! process-wide read-only table so that the common case never allocates.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{ConstructionError, Result};

const NO_CALL_STRING: &str = ".";
const LEGAL_BASES: &[u8] = b"ACGTN";

lazy_static! {
    static ref SINGLE_BASE_ALLELES: HashMap<(u8, bool), Allele> = {
        let mut table = HashMap::new();
        for &base in LEGAL_BASES {
            for is_ref in [true, false] {
                table.insert(
                    (base, is_ref),
                    Allele {
                        bases: Arc::from(vec![base]),
                        is_ref,
                        is_no_call: false,
                        is_symbolic: false,
                    },
                );
            }
        }
        table
    };
    static ref NO_CALL: Allele = Allele {
        bases: Arc::from(Vec::<u8>::new()),
        is_ref: false,
        is_no_call: true,
        is_symbolic: false,
    };
}

/// A single allele at a locus.
///
/// Equality and hashing use the bases and the reference flag. Ordering puts
/// reference alleles first, then sorts lexicographically on the bases.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Allele {
    bases: Arc<[u8]>,
    is_ref: bool,
    is_no_call: bool,
    is_symbolic: bool,
}

impl Allele {
    /// Create an allele, validating and upper-casing literal bases.
    pub fn new(bases: impl AsRef<[u8]>, is_ref: bool) -> Result<Self> {
        let bases = bases.as_ref();
        if bases.is_empty() {
            return Err(ConstructionError::NullAllele.into());
        }

        if bases == NO_CALL_STRING.as_bytes() {
            if is_ref {
                return Err(ConstructionError::NoCallReference.into());
            }
            return Ok(Self::no_call());
        }

        if would_be_symbolic(bases) {
            if is_ref {
                return Err(ConstructionError::SymbolicReference(
                    String::from_utf8_lossy(bases).into_owned(),
                )
                .into());
            }
            return Ok(Self {
                bases: Arc::from(bases),
                is_ref: false,
                is_no_call: false,
                is_symbolic: true,
            });
        }

        let normalized: Vec<u8> = bases.iter().map(u8::to_ascii_uppercase).collect();
        if !normalized.iter().all(|b| LEGAL_BASES.contains(b)) {
            return Err(ConstructionError::InvalidAlleleBases(
                String::from_utf8_lossy(bases).into_owned(),
            )
            .into());
        }

        if normalized.len() == 1 {
            if let Some(interned) = SINGLE_BASE_ALLELES.get(&(normalized[0], is_ref)) {
                return Ok(interned.clone());
            }
        }

        Ok(Self {
            bases: Arc::from(normalized),
            is_ref,
            is_no_call: false,
            is_symbolic: false,
        })
    }

    pub fn reference(bases: impl AsRef<[u8]>) -> Result<Self> {
        Self::new(bases, true)
    }

    pub fn alternate(bases: impl AsRef<[u8]>) -> Result<Self> {
        Self::new(bases, false)
    }

    /// The shared no-call allele (`.`).
    pub fn no_call() -> Self {
        NO_CALL.clone()
    }

    /// Append `right` to the bases of `left`, yielding a non-reference allele.
    pub fn extend(left: &Allele, right: &[u8]) -> Result<Self> {
        if left.is_symbolic {
            return Err(ConstructionError::SymbolicExtension(left.to_string()).into());
        }
        let mut bases = Vec::with_capacity(left.len() + right.len());
        bases.extend_from_slice(&left.bases);
        bases.extend_from_slice(right);
        Self::new(bases, false)
    }

    /// The bases; empty for the no-call allele.
    pub fn bases(&self) -> &[u8] {
        &self.bases
    }

    /// Bases as text, `.` for the no-call allele.
    pub fn display_string(&self) -> String {
        if self.is_no_call {
            NO_CALL_STRING.to_string()
        } else {
            String::from_utf8_lossy(&self.bases).into_owned()
        }
    }

    pub fn len(&self) -> usize {
        self.bases.len()
    }

    /// Only the no-call allele has no bases.
    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    pub fn is_reference(&self) -> bool {
        self.is_ref
    }

    pub fn is_non_reference(&self) -> bool {
        !self.is_ref
    }

    pub fn is_no_call(&self) -> bool {
        self.is_no_call
    }

    pub fn is_called(&self) -> bool {
        !self.is_no_call
    }

    pub fn is_symbolic(&self) -> bool {
        self.is_symbolic
    }

    /// True if the bases equal `bases`, ignoring the reference flag.
    /// A no-call never matches.
    pub fn bases_match(&self, bases: impl AsRef<[u8]>) -> bool {
        !self.is_no_call && self.bases.as_ref() == bases.as_ref()
    }

    pub fn bases_match_allele(&self, other: &Allele) -> bool {
        self.bases_match(other.bases())
    }

    /// Equality, optionally ignoring whether either allele is the reference.
    pub fn equals(&self, other: &Allele, ignore_ref_state: bool) -> bool {
        self.bases == other.bases
            && self.is_no_call == other.is_no_call
            && (ignore_ref_state || self.is_ref == other.is_ref)
    }
}

/// Symbolic alleles: `<ID>`, breakends with `[`/`]`, and single breakends
/// that start or end with `.`.
fn would_be_symbolic(bases: &[u8]) -> bool {
    if bases.len() <= 1 {
        return false;
    }
    let first = bases[0];
    let last = bases[bases.len() - 1];
    (first == b'<' && last == b'>')
        || bases.contains(&b'[')
        || bases.contains(&b']')
        || first == b'.'
        || last == b'.'
}

impl PartialEq for Allele {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other, false)
    }
}

impl Eq for Allele {}

impl Hash for Allele {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bases.hash(state);
        self.is_ref.hash(state);
        self.is_no_call.hash(state);
    }
}

impl Ord for Allele {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .is_ref
            .cmp(&self.is_ref)
            .then_with(|| self.bases.cmp(&other.bases))
            .then_with(|| self.is_no_call.cmp(&other.is_no_call))
    }
}

impl PartialOrd for Allele {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Allele {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_string())?;
        if self.is_ref {
            f.write_str("*")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Allele {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Allele({})", self)
    }
}

/// Parses the display form: bases, with a trailing `*` for the reference.
impl FromStr for Allele {
    type Err = crate::error::VariantError;

    fn from_str(s: &str) -> Result<Self> {
        match s.strip_suffix('*') {
            Some(bases) if !bases.is_empty() => Allele::new(bases, true),
            _ => Allele::new(s, false),
        }
    }
}

impl TryFrom<String> for Allele {
    type Error = crate::error::VariantError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Allele> for String {
    fn from(allele: Allele) -> Self {
        allele.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VariantError;

    #[test]
    fn test_creating_snp_alleles() {
        let a = Allele::alternate("A").unwrap();
        let a_ref = Allele::reference("A").unwrap();
        let t = Allele::alternate("T").unwrap();

        assert!(a.is_non_reference());
        assert!(!a.is_reference());
        assert!(a.bases_match("A"));
        assert_eq!(a.len(), 1);

        assert!(a_ref.is_reference());
        assert!(a_ref.bases_match("A"));
        assert!(!a_ref.bases_match("T"));
        assert!(!t.bases_match("A"));
    }

    #[test]
    fn test_no_call_allele() {
        let no_call = Allele::new(".", false).unwrap();
        assert!(no_call.is_no_call());
        assert!(!no_call.is_called());
        assert!(no_call.is_non_reference());
        assert!(!no_call.bases_match("."));
        assert_eq!(no_call.len(), 0);
        assert_eq!(no_call, Allele::no_call());
        assert_eq!(no_call.to_string(), ".");
    }

    #[test]
    fn test_lowercase_bases_are_normalized() {
        let lower = Allele::alternate("acgt").unwrap();
        assert_eq!(lower.bases(), b"ACGT");
        assert_eq!(lower, Allele::alternate("ACGT").unwrap());
    }

    #[test]
    fn test_equality_and_ref_state() {
        let a1 = Allele::alternate("AC").unwrap();
        let a2 = Allele::new(b"AC".to_vec(), false).unwrap();
        let a_ref = Allele::reference("AC").unwrap();

        assert_eq!(a1, a2);
        assert_ne!(a1, a_ref);
        assert!(a1.equals(&a_ref, true));
        assert!(a_ref.bases_match_allele(&a1));
    }

    #[test]
    fn test_bad_constructor_args() {
        for bad in ["x", "--", "-A", "A A"] {
            let err = Allele::alternate(bad).unwrap_err();
            assert!(
                matches!(
                    err,
                    VariantError::Construction(ConstructionError::InvalidAlleleBases(_))
                ),
                "{} should be rejected",
                bad
            );
        }
        assert_eq!(
            Allele::alternate("").unwrap_err(),
            VariantError::Construction(ConstructionError::NullAllele)
        );
        assert_eq!(
            Allele::reference(".").unwrap_err(),
            VariantError::Construction(ConstructionError::NoCallReference)
        );
        assert!(Allele::reference("<DEL>").is_err());
    }

    #[test]
    fn test_symbolic_forms() {
        for symbolic in ["<DEL>", "A[chr2:100[", "]chr1:5]T", ".A", "G."] {
            let allele = Allele::alternate(symbolic).unwrap();
            assert!(allele.is_symbolic(), "{} should be symbolic", symbolic);
        }
        assert!(!Allele::alternate("ACGT").unwrap().is_symbolic());
    }

    #[test]
    fn test_ordering_puts_reference_first() {
        let mut alleles: Vec<Allele> = ["T", "C*", "A", "AT"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        alleles.sort();
        let rendered: Vec<String> = alleles.iter().map(|a| a.to_string()).collect();
        assert_eq!(rendered, vec!["C*", "A", "AT", "T"]);
    }

    #[test]
    fn test_extend() {
        let extend = |left: &str, right: &str| {
            Allele::extend(&left.parse().unwrap(), right.as_bytes())
                .unwrap()
                .to_string()
        };
        assert_eq!(extend("A", "T"), "AT");
        assert_eq!(extend("A", "TA"), "ATA");
        assert_eq!(extend(".", "A"), "A");
        assert_eq!(extend("AT", "CGA"), "ATCGA");
        assert_eq!(extend("ATC", "GA"), "ATCGA");
        assert!(Allele::extend(&Allele::alternate("<INS>").unwrap(), b"A").is_err());
    }

    #[test]
    fn test_single_base_alleles_are_interned() {
        let first = Allele::alternate("g").unwrap();
        let second = Allele::alternate("G").unwrap();
        assert!(Arc::ptr_eq(&first.bases, &second.bases));
    }
}
