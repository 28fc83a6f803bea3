use regex::{RegexSet, RegexSetBuilder};

use crate::error::{CatalogError, Result};
use crate::types::PartRecord;

/// Narrow `candidates` to those satisfying `predicate`, unless nothing does, in
/// which case the input is returned unchanged.
pub fn try_restrict<'a, P>(candidates: Vec<&'a PartRecord>, predicate: P) -> Vec<&'a PartRecord>
where
    P: Fn(&PartRecord) -> bool,
{
    let restricted: Vec<&PartRecord> = candidates
        .iter()
        .copied()
        .filter(|part| predicate(*part))
        .collect();
    if restricted.is_empty() {
        if !candidates.is_empty() {
            log::debug!(
                "Restriction matched none of {} candidates; keeping all",
                candidates.len()
            );
        }
        candidates
    } else {
        restricted
    }
}

/// Detects integrated graphics by name pattern or non-positive price.
#[derive(Clone, Debug)]
pub struct IntegratedGpuFilter {
    patterns: RegexSet,
}

impl IntegratedGpuFilter {
    /// Patterns are regular expressions matched case-insensitively anywhere in
    /// the part name.
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = RegexSetBuilder::new(patterns)
            .case_insensitive(true)
            .build()
            .map_err(|err| CatalogError::InvalidPattern(err.to_string()))?;
        Ok(Self { patterns })
    }

    #[must_use]
    pub fn is_integrated(&self, part: &PartRecord) -> bool {
        part.price <= 0.0 || self.patterns.is_match(&part.name)
    }

    /// Drop integrated entries; if that would leave nothing, keep the input.
    #[must_use]
    pub fn apply<'a>(&self, candidates: Vec<&'a PartRecord>) -> Vec<&'a PartRecord> {
        if candidates.is_empty() {
            return candidates;
        }
        let discrete: Vec<&PartRecord> = candidates
            .iter()
            .copied()
            .filter(|part| !self.is_integrated(part))
            .collect();
        if discrete.is_empty() {
            log::warn!(
                "All {} GPU candidates look integrated; keeping them",
                candidates.len()
            );
            candidates
        } else {
            discrete
        }
    }

    #[must_use]
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }
}
