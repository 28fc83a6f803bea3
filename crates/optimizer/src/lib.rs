//! # Buildwise Optimizer
//!
//! Greedy budget allocation that turns a normalized part catalog into three
//! alternative builds: value, performance and future-proof.
//!
//! ## Architecture
//!
//! ```text
//! RecommendRequest { request: { budget, useCase, performancePreference }, database }
//!     │
//!     ├──> Orchestrator
//!     │      ├─ validate budget (> 0)
//!     │      ├─ normalize catalog once
//!     │      └─ one BuildGenerator run per strategy (sequential or spawn_blocking)
//!     │
//!     ├──> BuildGenerator (per strategy)
//!     │      ├─ effective budget = user budget × multiplier
//!     │      ├─ CPU → Motherboard → RAM → GPU → Storage → PSU → Case → Cooling
//!     │      │    ├─ future-socket preference, socket match, RAM type match (soft)
//!     │      │    └─ integrated-GPU exclusion
//!     │      ├─ Part Selector: best score under share × (1 + flexibility)
//!     │      └─ Bottleneck Analyzer, compatibility audit, workload scores, suggestions
//!     │
//!     └──> Recommendation
//!            ├─ limited-stock correction for future-proof
//!            ├─ per-strategy summary
//!            └─ reasoning line
//! ```
//!
//! All tuning constants live in a [`TuningProfile`] loaded once and shared
//! read-only across runs.

pub mod bottleneck;
pub mod compat;
mod error;
pub mod generator;
pub mod orchestrator;
pub mod profile;
pub mod selector;
pub mod suggest;
mod types;
pub mod workload;

pub use compat::{CompatibilityIssue, Severity};
pub use error::{OptimizerError, Result};
pub use generator::BuildGenerator;
pub use orchestrator::{format_amount, Orchestrator};
pub use profile::{BottleneckRules, CompatibilityRules, LimitedStock, StrategyConfig, TuningProfile};
pub use selector::{select_part, Selection, SelectionOutcome};
pub use types::{BuildResult, Recommendation, Strategy, StrategySummary, UseCase};
pub use workload::WorkloadScores;
