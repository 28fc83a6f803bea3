use buildwise_catalog::PartRecord;

/// How a part was chosen for its slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// Highest score within the category ceiling.
    Affordable,
    /// Nothing fit the ceiling; the cheapest candidate was taken instead.
    CheapestFallback,
    /// No candidates at all.
    Placeholder,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Selection {
    pub part: PartRecord,
    pub outcome: SelectionOutcome,
}

/// Pick the best-scoring candidate priced at or below
/// `category_budget * (1 + flexibility)`.
///
/// Ties keep the earliest candidate. When nothing is affordable the cheapest
/// candidate is returned, and an empty candidate list yields the placeholder.
#[must_use]
pub fn select_part(
    candidates: &[&PartRecord],
    category_budget: f64,
    flexibility: f64,
) -> Selection {
    let ceiling = category_budget * (1.0 + flexibility);

    let mut best: Option<&PartRecord> = None;
    for part in candidates.iter().copied().filter(|p| p.price <= ceiling) {
        if best.map_or(true, |b| part.performance_score > b.performance_score) {
            best = Some(part);
        }
    }
    if let Some(part) = best {
        return Selection {
            part: part.clone(),
            outcome: SelectionOutcome::Affordable,
        };
    }

    let mut cheapest: Option<&PartRecord> = None;
    for part in candidates.iter().copied() {
        if cheapest.map_or(true, |c| part.price < c.price) {
            cheapest = Some(part);
        }
    }
    match cheapest {
        Some(part) => {
            log::debug!(
                "No candidate under {ceiling:.2}; falling back to cheapest '{}' at {:.2}",
                part.name,
                part.price
            );
            Selection {
                part: part.clone(),
                outcome: SelectionOutcome::CheapestFallback,
            }
        }
        None => Selection {
            part: PartRecord::placeholder(),
            outcome: SelectionOutcome::Placeholder,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildwise_catalog::Catalog;
    use proptest::prelude::*;
    use serde_json::json;

    fn catalog(rows: &[(&str, f64, f64)]) -> Catalog {
        let raw: Vec<_> = rows
            .iter()
            .map(|(name, price, score)| json!({"name": name, "price": price, "performanceScore": score}))
            .collect();
        Catalog::normalize(&raw)
    }

    #[test]
    fn picks_highest_score_within_ceiling() {
        let catalog = catalog(&[("a", 100.0, 10.0), ("b", 104.0, 30.0), ("c", 200.0, 90.0)]);
        let all: Vec<&PartRecord> = catalog.parts().iter().collect();

        let strict = select_part(&all, 100.0, 0.0);
        assert_eq!(strict.part.name, "a");
        assert_eq!(strict.outcome, SelectionOutcome::Affordable);

        let flexible = select_part(&all, 100.0, 0.05);
        assert_eq!(flexible.part.name, "b");
    }

    #[test]
    fn ties_keep_catalog_order() {
        let catalog = catalog(&[("first", 50.0, 20.0), ("second", 40.0, 20.0)]);
        let all: Vec<&PartRecord> = catalog.parts().iter().collect();
        assert_eq!(select_part(&all, 100.0, 0.0).part.name, "first");
    }

    #[test]
    fn falls_back_to_cheapest_when_nothing_fits() {
        let catalog = catalog(&[("x", 500.0, 99.0), ("y", 300.0, 1.0), ("z", 300.0, 5.0)]);
        let all: Vec<&PartRecord> = catalog.parts().iter().collect();
        let pick = select_part(&all, 100.0, 0.18);
        assert_eq!(pick.part.name, "y");
        assert_eq!(pick.outcome, SelectionOutcome::CheapestFallback);
    }

    #[test]
    fn empty_candidates_yield_placeholder() {
        let pick = select_part(&[], 1000.0, 0.0);
        assert!(pick.part.is_placeholder());
        assert_eq!(pick.part.price, 0.0);
        assert_eq!(pick.outcome, SelectionOutcome::Placeholder);
    }

    proptest! {
        #[test]
        fn proptest_affordable_pick_is_optimal(
            rows in prop::collection::vec((0u32..2_000, 0u32..100), 1..25),
            budget in 0u32..2_000,
        ) {
            let raw: Vec<_> = rows
                .iter()
                .enumerate()
                .map(|(i, (price, score))| json!({"name": format!("p{i}"), "price": price, "performanceScore": score}))
                .collect();
            let catalog = Catalog::normalize(&raw);
            let all: Vec<&PartRecord> = catalog.parts().iter().collect();
            let budget = f64::from(budget);
            let pick = select_part(&all, budget, 0.0);

            let affordable: Vec<&&PartRecord> = all.iter().filter(|p| p.price <= budget).collect();
            if affordable.is_empty() {
                prop_assert_eq!(pick.outcome, SelectionOutcome::CheapestFallback);
                let min = all.iter().map(|p| p.price).fold(f64::INFINITY, f64::min);
                prop_assert_eq!(pick.part.price, min);
            } else {
                prop_assert_eq!(pick.outcome, SelectionOutcome::Affordable);
                prop_assert!(pick.part.price <= budget);
                let max = affordable.iter().map(|p| p.performance_score).fold(f64::NEG_INFINITY, f64::max);
                prop_assert_eq!(pick.part.performance_score, max);
            }
        }
    }
}
