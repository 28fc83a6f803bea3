use std::collections::BTreeMap;

use buildwise_catalog::{PartKind, PartRecord};
use serde::Serialize;

use crate::types::UseCase;

/// Weighted blends of component scores, one per workload family.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct WorkloadScores {
    pub gaming: i64,
    pub productivity: i64,
    pub rendering: i64,
    /// The score for the requested use case; the mean of all three for General.
    pub overall: i64,
}

#[allow(clippy::cast_possible_truncation)]
fn to_score(value: f64) -> i64 {
    value.round() as i64
}

#[must_use]
pub fn compute(parts: &BTreeMap<PartKind, PartRecord>, use_case: UseCase) -> WorkloadScores {
    let score = |kind: PartKind| parts.get(&kind).map_or(0.0, |part| part.performance_score);
    let (cpu, gpu, ram, storage) = (
        score(PartKind::Cpu),
        score(PartKind::Gpu),
        score(PartKind::Ram),
        score(PartKind::Storage),
    );

    let gaming = to_score(gpu * 0.45 + cpu * 0.35 + ram * 0.15 + storage * 0.05);
    let productivity = to_score(cpu * 0.40 + ram * 0.25 + storage * 0.20 + gpu * 0.15);
    let rendering = to_score(cpu * 0.35 + gpu * 0.35 + ram * 0.20 + storage * 0.10);

    #[allow(clippy::cast_precision_loss)]
    let overall = match use_case {
        UseCase::Gaming => gaming,
        UseCase::Productivity => productivity,
        UseCase::General => to_score((gaming + productivity + rendering) as f64 / 3.0),
    };

    WorkloadScores {
        gaming,
        productivity,
        rendering,
        overall,
    }
}
