use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use buildwise_catalog::{PartKind, PartRecord};
use buildwise_protocol::{serialize_rounded, ResponseStatus};
use serde::{Deserialize, Serialize};

use crate::compat::CompatibilityIssue;
use crate::error::OptimizerError;
use crate::workload::WorkloadScores;

/// Workload profile that decides how the budget is split across categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UseCase {
    Gaming,
    Productivity,
    General,
}

impl UseCase {
    pub const ALL: [UseCase; 3] = [UseCase::Gaming, UseCase::Productivity, UseCase::General];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            UseCase::Gaming => "Gaming",
            UseCase::Productivity => "Productivity",
            UseCase::General => "General",
        }
    }

    /// Case-insensitive exact match.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        UseCase::ALL
            .into_iter()
            .find(|uc| uc.as_str().eq_ignore_ascii_case(raw))
    }

    /// Like [`UseCase::parse`], but unrecognized labels fall back to `General`.
    #[must_use]
    pub fn resolve(raw: &str) -> Self {
        Self::parse(raw).unwrap_or_else(|| {
            log::debug!("Unknown use case '{raw}', falling back to General");
            UseCase::General
        })
    }
}

impl fmt::Display for UseCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Value,
    Performance,
    FutureProof,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Value, Strategy::Performance, Strategy::FutureProof];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Strategy::Value => "value",
            Strategy::Performance => "performance",
            Strategy::FutureProof => "future_proof",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Strategy::Value => "Value",
            Strategy::Performance => "Performance",
            Strategy::FutureProof => "Future Proof",
        }
    }

    /// Map a 0-100 preference slider onto a tier: up to 33 is value, 67 and
    /// above is future-proof, everything between is performance.
    #[must_use]
    pub fn from_preference(preference: f64) -> Self {
        if !preference.is_finite() {
            return Strategy::Performance;
        }
        if preference <= 33.0 {
            Strategy::Value
        } else if preference >= 67.0 {
            Strategy::FutureProof
        } else {
            Strategy::Performance
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = OptimizerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == s)
            .ok_or_else(|| OptimizerError::UnknownStrategy(s.to_string()))
    }
}

/// Output of one strategy run.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildResult {
    pub strategy: Strategy,
    pub label: String,
    pub description: String,
    pub parts: BTreeMap<PartKind, PartRecord>,
    #[serde(serialize_with = "serialize_rounded")]
    pub total_price: f64,
    #[serde(serialize_with = "serialize_rounded")]
    pub ai_score: f64,
    #[serde(serialize_with = "serialize_rounded")]
    pub target_budget: f64,
    /// `total_price - user_budget`; negative means under budget.
    #[serde(serialize_with = "serialize_rounded")]
    pub budget_delta: f64,
    pub issues: Vec<String>,
    pub within_budget: bool,
    /// Informational only: totals are never clipped.
    pub hard_cap: bool,
    pub compatibility: Vec<CompatibilityIssue>,
    #[serde(serialize_with = "serialize_rounded")]
    pub estimated_wattage: f64,
    pub workload_scores: WorkloadScores,
    /// Hints about leftover budget and CPU/GPU balance.
    pub suggestions: Vec<String>,
    pub upgrade_path: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategySummary {
    pub label: String,
    pub description: String,
    #[serde(serialize_with = "serialize_rounded")]
    pub total_price: f64,
    #[serde(serialize_with = "serialize_rounded")]
    pub ai_score: f64,
    #[serde(serialize_with = "serialize_rounded")]
    pub budget_delta: f64,
    pub within_budget: bool,
    pub issue_count: usize,
}

impl From<&BuildResult> for StrategySummary {
    fn from(build: &BuildResult) -> Self {
        Self {
            label: build.label.clone(),
            description: build.description.clone(),
            total_price: build.total_price,
            ai_score: build.ai_score,
            budget_delta: build.budget_delta,
            within_budget: build.within_budget,
            issue_count: build.issues.len(),
        }
    }
}

/// Successful response: all three strategy builds plus a condensed comparison.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub status: ResponseStatus,
    #[serde(serialize_with = "serialize_rounded")]
    pub user_budget: f64,
    pub use_case: UseCase,
    pub selected_strategy: Strategy,
    pub options: BTreeMap<Strategy, BuildResult>,
    pub summary: BTreeMap<Strategy, StrategySummary>,
    pub reasoning: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn use_case_resolution_falls_back_to_general() {
        assert_eq!(UseCase::resolve("Gaming"), UseCase::Gaming);
        assert_eq!(UseCase::resolve(" productivity "), UseCase::Productivity);
        assert_eq!(UseCase::resolve("Streaming"), UseCase::General);
        assert_eq!(UseCase::resolve(""), UseCase::General);
    }

    #[test]
    fn strategy_names_are_strict() {
        assert_eq!("future_proof".parse::<Strategy>().unwrap(), Strategy::FutureProof);
        let err = "premium".parse::<Strategy>().unwrap_err();
        assert!(matches!(err, OptimizerError::UnknownStrategy(ref s) if s == "premium"));
    }

    #[test]
    fn preference_slider_maps_to_tiers() {
        assert_eq!(Strategy::from_preference(0.0), Strategy::Value);
        assert_eq!(Strategy::from_preference(33.0), Strategy::Value);
        assert_eq!(Strategy::from_preference(34.0), Strategy::Performance);
        assert_eq!(Strategy::from_preference(50.0), Strategy::Performance);
        assert_eq!(Strategy::from_preference(67.0), Strategy::FutureProof);
        assert_eq!(Strategy::from_preference(f64::NAN), Strategy::Performance);
    }

    #[test]
    fn strategy_serializes_as_snake_case_key() {
        let mut map = BTreeMap::new();
        map.insert(Strategy::FutureProof, 1);
        map.insert(Strategy::Value, 0);
        let raw = serde_json::to_string(&map).unwrap();
        assert_eq!(raw, r#"{"value":0,"future_proof":1}"#);
    }
}
