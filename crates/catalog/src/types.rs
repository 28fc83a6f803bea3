use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use buildwise_protocol::serialize_rounded;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CatalogError;
use crate::normalize::normalize_token;

/// Name carried by the synthetic record returned when a category has no candidates.
pub const PLACEHOLDER_NAME: &str = "Unknown";

/// Canonical part type.
///
/// Declaration order is the build order: motherboard selection depends on the
/// chosen CPU and RAM selection on the chosen motherboard, so `Ord` on this enum
/// doubles as the processing order and the emission order of a build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartKind {
    Cpu,
    Motherboard,
    Ram,
    Gpu,
    Storage,
    Psu,
    Case,
    Cooling,
}

impl PartKind {
    pub const BUILD_ORDER: [PartKind; 8] = [
        PartKind::Cpu,
        PartKind::Motherboard,
        PartKind::Ram,
        PartKind::Gpu,
        PartKind::Storage,
        PartKind::Psu,
        PartKind::Case,
        PartKind::Cooling,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            PartKind::Cpu => "cpu",
            PartKind::Motherboard => "motherboard",
            PartKind::Ram => "ram",
            PartKind::Gpu => "gpu",
            PartKind::Storage => "storage",
            PartKind::Psu => "psu",
            PartKind::Case => "case",
            PartKind::Cooling => "cooling",
        }
    }
}

impl fmt::Display for PartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PartKind {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        PartKind::BUILD_ORDER
            .into_iter()
            .find(|kind| kind.as_str() == needle)
            .ok_or_else(|| CatalogError::UnknownPartKind(s.to_string()))
    }
}

/// Memory standard(s) declared by a part: a single label or, for boards that
/// accept several, a list.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RamType {
    Single(String),
    Multiple(Vec<String>),
}

impl Default for RamType {
    fn default() -> Self {
        RamType::Single(String::new())
    }
}

impl RamType {
    pub(crate) fn from_value(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => RamType::default(),
            Some(Value::String(s)) => RamType::Single(s.clone()),
            Some(Value::Array(items)) => RamType::Multiple(
                items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect(),
            ),
            Some(other) => RamType::Single(other.to_string()),
        }
    }

    /// The type a board is assumed to run: the first list entry, or the scalar.
    #[must_use]
    pub fn primary(&self) -> Option<&str> {
        let first = match self {
            RamType::Single(s) => Some(s.as_str()),
            RamType::Multiple(items) => items.first().map(String::as_str),
        };
        first.filter(|s| !s.trim().is_empty())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            RamType::Single(s) => std::slice::from_ref(s),
            RamType::Multiple(items) => items,
        };
        slice
            .iter()
            .map(String::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values().next().is_none()
    }

    /// Loose substring match against any declared value, ignoring case and
    /// whitespace. `token` is expected in [`normalize_token`] form.
    #[must_use]
    pub fn mentions(&self, token: &str) -> bool {
        self.values().any(|v| normalize_token(v).contains(token))
    }

    /// Exact normalized membership, used by the compatibility audit.
    #[must_use]
    pub fn supports(&self, ram_type: &str) -> bool {
        let wanted = normalize_token(ram_type);
        self.values().any(|v| normalize_token(v) == wanted)
    }
}

/// One normalized catalog entry.
///
/// Unknown keys of the raw record are kept in `extra` and emitted alongside the
/// typed fields when the part is selected.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartRecord {
    pub name: String,
    #[serde(serialize_with = "serialize_rounded")]
    pub price: f64,
    #[serde(serialize_with = "serialize_rounded")]
    pub performance_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance: Option<f64>,
    pub category: String,
    pub socket: String,
    pub ram_type: RamType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wattage: Option<f64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
    #[serde(skip)]
    pub(crate) norm_category: String,
    #[serde(skip)]
    pub(crate) norm_part: Option<String>,
    #[serde(skip)]
    pub(crate) norm_type: Option<String>,
}

impl PartRecord {
    /// Zero-price, zero-score stand-in for a category with no candidates.
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            name: PLACEHOLDER_NAME.to_string(),
            price: 0.0,
            performance_score: 0.0,
            performance: None,
            category: String::new(),
            socket: String::new(),
            ram_type: RamType::default(),
            wattage: None,
            extra: BTreeMap::new(),
            norm_category: String::new(),
            norm_part: None,
            norm_type: None,
        }
    }

    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        let name = self.name.trim();
        name.is_empty() || name == PLACEHOLDER_NAME
    }

    #[must_use]
    pub fn norm_category(&self) -> &str {
        &self.norm_category
    }

    #[must_use]
    pub fn norm_part(&self) -> Option<&str> {
        self.norm_part.as_deref()
    }

    #[must_use]
    pub fn norm_type(&self) -> Option<&str> {
        self.norm_type.as_deref()
    }

    /// Socket with case and all whitespace removed, for equality checks.
    #[must_use]
    pub fn normalized_socket(&self) -> String {
        normalize_token(&self.socket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn build_order_matches_ord() {
        let mut sorted = PartKind::BUILD_ORDER;
        sorted.sort();
        assert_eq!(sorted, PartKind::BUILD_ORDER);
    }

    #[test]
    fn part_kind_round_trips_through_str() {
        for kind in PartKind::BUILD_ORDER {
            assert_eq!(kind.as_str().parse::<PartKind>().unwrap(), kind);
        }
        assert!(" GPU ".parse::<PartKind>().is_ok());
        assert!("monitor".parse::<PartKind>().is_err());
    }

    #[test]
    fn ram_type_primary_prefers_first_list_entry() {
        let list = RamType::from_value(Some(&json!(["DDR5", "DDR4"])));
        assert_eq!(list.primary(), Some("DDR5"));
        assert!(list.supports("ddr4"));

        let scalar = RamType::from_value(Some(&json!("DDR4")));
        assert_eq!(scalar.primary(), Some("DDR4"));

        let empty = RamType::from_value(None);
        assert_eq!(empty.primary(), None);
        assert!(empty.is_empty());
    }

    #[test]
    fn ram_type_mentions_is_loose() {
        let ram = RamType::from_value(Some(&json!("LPDDR4X")));
        assert!(ram.mentions("ddr4"));
        assert!(!ram.supports("ddr4"));

        let spaced = RamType::from_value(Some(&json!(["DDR 5"])));
        assert!(spaced.mentions("ddr5"));
        assert!(spaced.supports("DDR5"));
    }

    #[test]
    fn placeholder_is_recognised() {
        let placeholder = PartRecord::placeholder();
        assert!(placeholder.is_placeholder());
        assert_eq!(placeholder.price, 0.0);
        assert_eq!(placeholder.performance_score, 0.0);

        let serialized = serde_json::to_value(&placeholder).unwrap();
        assert_eq!(serialized["name"], "Unknown");
        assert_eq!(serialized["ramType"], "");
        assert!(serialized.get("wattage").is_none());
    }
}
