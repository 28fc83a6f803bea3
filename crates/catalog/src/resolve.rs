use std::collections::BTreeMap;

use crate::error::{CatalogError, Result};
use crate::normalize::{normalize_label, Catalog, SecondaryColumn};
use crate::types::{PartKind, PartRecord};

/// Synonyms accepted for each canonical part type during alias fallback.
#[derive(Clone, Debug, PartialEq)]
pub struct AliasMap {
    aliases: BTreeMap<PartKind, Vec<String>>,
}

impl AliasMap {
    /// Every canonical type must be present with at least one alias, and its
    /// own name must be among them.
    pub fn new(aliases: BTreeMap<PartKind, Vec<String>>) -> Result<Self> {
        let mut normalized = BTreeMap::new();
        for kind in PartKind::BUILD_ORDER {
            let Some(raw) = aliases.get(&kind) else {
                return Err(CatalogError::InvalidAliases(format!(
                    "missing aliases for '{kind}'"
                )));
            };
            let list: Vec<String> = raw
                .iter()
                .map(|alias| normalize_label(alias))
                .filter(|alias| !alias.is_empty())
                .collect();
            if !list.iter().any(|alias| alias == kind.as_str()) {
                return Err(CatalogError::InvalidAliases(format!(
                    "aliases for '{kind}' must include '{kind}' itself"
                )));
            }
            normalized.insert(kind, list);
        }
        Ok(Self {
            aliases: normalized,
        })
    }

    #[must_use]
    pub fn aliases(&self, kind: PartKind) -> &[String] {
        self.aliases.get(&kind).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn matches(&self, kind: PartKind, label: &str) -> bool {
        self.aliases(kind).iter().any(|alias| alias == label)
    }
}

impl Catalog {
    /// Candidate rows for a canonical part type, in catalog order.
    ///
    /// Exact normalized-category matches win; otherwise rows whose secondary
    /// label (`part`, else `type`) is an alias of `kind`. Without a secondary
    /// column the result is empty rather than the whole catalog.
    #[must_use]
    pub fn resolve(&self, kind: PartKind, aliases: &AliasMap) -> Vec<&PartRecord> {
        let exact: Vec<&PartRecord> = self
            .parts()
            .iter()
            .filter(|part| part.norm_category() == kind.as_str())
            .collect();
        if !exact.is_empty() {
            return exact;
        }

        let Some(column) = self.secondary_column() else {
            return Vec::new();
        };

        let fallback: Vec<&PartRecord> = self
            .parts()
            .iter()
            .filter(|part| {
                let label = match column {
                    SecondaryColumn::Part => part.norm_part(),
                    SecondaryColumn::Type => part.norm_type(),
                };
                label.is_some_and(|label| aliases.matches(kind, label))
            })
            .collect();

        log::debug!(
            "No exact '{kind}' category rows; alias fallback on '{}' matched {}",
            column.key(),
            fallback.len()
        );
        fallback
    }
}
