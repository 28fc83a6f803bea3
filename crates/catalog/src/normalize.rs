use std::collections::BTreeMap;

use buildwise_protocol::{coerce_number, opaque_to_string};
use serde_json::{Map, Value};

use crate::error::{CatalogError, Result};
use crate::types::{PartRecord, RamType};

/// Keys consumed into typed fields; everything else is carried through as-is.
const TYPED_KEYS: &[&str] = &[
    "name",
    "price",
    "performance",
    "performanceScore",
    "performance_score",
    "category",
    "socket",
    "ramType",
    "wattage",
];

/// Secondary label column used for alias fallback when a record's category
/// does not name a canonical part type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SecondaryColumn {
    Part,
    Type,
}

impl SecondaryColumn {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            SecondaryColumn::Part => "part",
            SecondaryColumn::Type => "type",
        }
    }
}

/// Immutable, normalized part table shared by every strategy run of a request.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    parts: Vec<PartRecord>,
    secondary: Option<SecondaryColumn>,
}

impl Catalog {
    /// Normalize raw records. Non-object entries are skipped.
    #[must_use]
    pub fn normalize(raw: &[Value]) -> Self {
        let mut parts = Vec::with_capacity(raw.len());
        let mut has_part = false;
        let mut has_type = false;

        for (idx, entry) in raw.iter().enumerate() {
            let Value::Object(obj) = entry else {
                log::warn!("Skipping catalog entry #{idx}: not a JSON object");
                continue;
            };
            has_part |= obj.contains_key("part");
            has_type |= obj.contains_key("type");
            parts.push(normalize_record(obj));
        }

        let secondary = if has_part {
            Some(SecondaryColumn::Part)
        } else if has_type {
            Some(SecondaryColumn::Type)
        } else {
            None
        };

        log::debug!(
            "Normalized catalog: {} parts (secondary label column: {:?})",
            parts.len(),
            secondary.map(SecondaryColumn::key)
        );

        Self { parts, secondary }
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Array(items) => Ok(Self::normalize(items)),
            Value::Null => Ok(Self::default()),
            _ => Err(CatalogError::NotAnArray),
        }
    }

    #[must_use]
    pub fn parts(&self) -> &[PartRecord] {
        &self.parts
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// The first secondary label column present anywhere in the input
    /// (`part` before `type`), if any.
    #[must_use]
    pub const fn secondary_column(&self) -> Option<SecondaryColumn> {
        self.secondary
    }
}

/// Lower-cased, trimmed label.
#[must_use]
pub fn normalize_label(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Lower-cased label with all whitespace removed ("AM 5 " -> "am5").
#[must_use]
pub fn normalize_token(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

fn normalize_record(obj: &Map<String, Value>) -> PartRecord {
    let price = obj.get("price").map_or(0.0, coerce_number);
    let performance = obj.get("performance").map(coerce_number);
    let performance_score = obj
        .get("performanceScore")
        .or_else(|| obj.get("performance_score"))
        .map(coerce_number)
        .or(performance)
        .unwrap_or(0.0);
    let wattage = obj
        .get("wattage")
        .map(coerce_number)
        .filter(|w| *w > 0.0);

    let category = text_of(obj.get("category"));
    let norm_category = normalize_label(&category);
    let norm_part = obj.get("part").map(|v| normalize_label(&text_of(Some(v))));
    let norm_type = obj.get("type").map(|v| normalize_label(&text_of(Some(v))));

    let extra: BTreeMap<String, Value> = obj
        .iter()
        .filter(|(key, _)| !TYPED_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), opaque_to_string(value.clone())))
        .collect();

    PartRecord {
        name: text_of(obj.get("name")),
        price,
        performance_score,
        performance,
        category,
        socket: text_of(obj.get("socket")),
        ram_type: RamType::from_value(obj.get("ramType")),
        wattage,
        extra,
        norm_category,
        norm_part,
        norm_type,
    }
}

fn text_of(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
