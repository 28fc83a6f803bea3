use std::collections::BTreeMap;

use buildwise_catalog::{normalize_token, try_restrict, Catalog, PartKind, PartRecord};

use crate::bottleneck;
use crate::compat;
use crate::error::Result;
use crate::profile::TuningProfile;
use crate::selector::{select_part, SelectionOutcome};
use crate::suggest;
use crate::types::{BuildResult, Strategy, UseCase};
use crate::workload;

/// Greedy, per-category build assembly for a single strategy.
///
/// Categories are processed in [`PartKind::BUILD_ORDER`]; the chosen CPU
/// narrows the motherboard candidates and the chosen motherboard narrows the
/// memory candidates. Both narrowings are soft and are skipped when nothing
/// would remain.
#[derive(Clone, Copy, Debug)]
pub struct BuildGenerator<'a> {
    profile: &'a TuningProfile,
}

impl<'a> BuildGenerator<'a> {
    #[must_use]
    pub const fn new(profile: &'a TuningProfile) -> Self {
        Self { profile }
    }

    /// String-keyed entry point: an unknown use case falls back to General,
    /// an unknown strategy is an error.
    pub fn generate_named(
        &self,
        catalog: &Catalog,
        user_budget: f64,
        use_case: &str,
        strategy: &str,
    ) -> Result<BuildResult> {
        let strategy: Strategy = strategy.parse()?;
        self.generate(catalog, user_budget, UseCase::resolve(use_case), strategy)
    }

    pub fn generate(
        &self,
        catalog: &Catalog,
        user_budget: f64,
        use_case: UseCase,
        strategy: Strategy,
    ) -> Result<BuildResult> {
        let config = self.profile.strategy(strategy)?;
        let effective_budget = user_budget * config.budget_multiplier;
        let aliases = self.profile.aliases();
        let rules = self.profile.compatibility();

        let select = |kind: PartKind, candidates: Vec<&PartRecord>| -> PartRecord {
            let category_budget = effective_budget * self.profile.ratio(use_case, kind);
            let selection = select_part(&candidates, category_budget, config.flexibility);
            match selection.outcome {
                SelectionOutcome::Affordable => log::debug!(
                    "[{strategy}] {kind}: '{}' at {:.2} (share {category_budget:.2})",
                    selection.part.name,
                    selection.part.price
                ),
                SelectionOutcome::CheapestFallback => log::debug!(
                    "[{strategy}] {kind}: nothing under {category_budget:.2}, took cheapest '{}'",
                    selection.part.name
                ),
                SelectionOutcome::Placeholder => {
                    log::warn!("[{strategy}] {kind}: no candidates in catalog");
                }
            }
            selection.part
        };

        let mut parts: BTreeMap<PartKind, PartRecord> = BTreeMap::new();

        let mut cpus = catalog.resolve(PartKind::Cpu, aliases);
        if config.prefer_future_socket {
            cpus = try_restrict(cpus, |cpu| rules.is_future_socket(&cpu.socket));
        }
        let cpu = select(PartKind::Cpu, cpus);

        let cpu_socket = cpu.normalized_socket();
        let mut boards = catalog.resolve(PartKind::Motherboard, aliases);
        if !cpu_socket.is_empty() {
            boards = try_restrict(boards, |board| board.normalized_socket() == cpu_socket);
        }
        let motherboard = select(PartKind::Motherboard, boards);

        let board_ram_type = if motherboard.is_placeholder() {
            Some(normalize_token(&rules.default_ram_type))
        } else {
            motherboard.ram_type.primary().map(normalize_token)
        };
        let ram_type = board_ram_type.filter(|t| !t.is_empty());
        let mut modules = catalog.resolve(PartKind::Ram, aliases);
        if let Some(ram_type) = ram_type.as_deref() {
            modules = try_restrict(modules, |module| {
                normalize_token(&module.name).contains(ram_type) || module.ram_type.mentions(ram_type)
            });
        }
        let ram = select(PartKind::Ram, modules);

        let gpus = self
            .profile
            .gpu_filter()
            .apply(catalog.resolve(PartKind::Gpu, aliases));
        let gpu = select(PartKind::Gpu, gpus);

        parts.insert(PartKind::Cpu, cpu);
        parts.insert(PartKind::Motherboard, motherboard);
        parts.insert(PartKind::Ram, ram);
        parts.insert(PartKind::Gpu, gpu);

        for kind in [
            PartKind::Storage,
            PartKind::Psu,
            PartKind::Case,
            PartKind::Cooling,
        ] {
            let part = select(kind, catalog.resolve(kind, aliases));
            parts.insert(kind, part);
        }

        let mut total_price = 0.0;
        let mut ai_score = 0.0;
        for kind in PartKind::BUILD_ORDER {
            if let Some(part) = parts.get(&kind) {
                total_price += part.price;
                ai_score += part.performance_score;
            }
        }

        let issues = bottleneck::analyze(&parts, self.profile.bottleneck());
        let audit = compat::audit(&parts, rules);
        let workload_scores = workload::compute(&parts, use_case);
        let suggestions = suggest::suggestions(
            &parts,
            user_budget,
            total_price,
            self.profile.currency_symbol(),
        );
        let upgrade_path = suggest::upgrade_path(&parts);
        let within_budget = total_price <= effective_budget;

        if config.hard_cap && !within_budget {
            log::warn!(
                "[{strategy}] total {total_price:.2} exceeds capped target {effective_budget:.2}"
            );
        }

        Ok(BuildResult {
            strategy,
            label: config.label.clone(),
            description: config.description.clone(),
            parts,
            total_price,
            ai_score,
            target_budget: effective_budget,
            budget_delta: total_price - user_budget,
            issues,
            within_budget,
            hard_cap: config.hard_cap,
            compatibility: audit.issues,
            estimated_wattage: audit.estimated_wattage,
            workload_scores,
            suggestions,
            upgrade_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OptimizerError;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn catalog() -> Catalog {
        Catalog::normalize(&[
            json!({"name": "Ryzen 5 5600", "category": "CPU", "price": 11000, "performanceScore": 60, "socket": "AM4"}),
            json!({"name": "Ryzen 5 7600", "category": "CPU", "price": 18000, "performanceScore": 75, "socket": "AM5"}),
            json!({"name": "B550 Board", "category": "Motherboard", "price": 9000, "performanceScore": 20, "socket": "AM4", "ramType": "DDR4"}),
            json!({"name": "B650 Board", "category": "Motherboard", "price": 15000, "performanceScore": 25, "socket": "AM 5", "ramType": ["DDR5"]}),
            json!({"name": "16GB DDR4 3200", "category": "RAM", "price": 3500, "performanceScore": 30, "ramType": "DDR4"}),
            json!({"name": "16GB Kit", "category": "RAM", "price": 5200, "performanceScore": 40, "ramType": "DDR5"}),
            json!({"name": "Intel UHD 770", "category": "GPU", "price": 100, "performanceScore": 5}),
            json!({"name": "RTX 4060", "category": "GPU", "price": 29000, "performanceScore": 80}),
            json!({"name": "1TB NVMe", "category": "Storage", "price": 5000, "performanceScore": 50}),
            json!({"name": "650W Gold", "category": "PSU", "price": 6000, "performanceScore": 10, "wattage": 650}),
            json!({"name": "Airflow Case", "category": "Case", "price": 4000, "performanceScore": 5}),
            json!({"name": "Tower Cooler", "category": "Cooling", "price": 2500, "performanceScore": 8}),
        ])
    }

    #[test]
    fn totals_are_exact_sums_of_selected_parts() {
        let profile = TuningProfile::standard();
        let build = BuildGenerator::new(&profile)
            .generate(&catalog(), 100_000.0, UseCase::Gaming, Strategy::Performance)
            .unwrap();

        assert_eq!(build.parts.len(), 8);
        let price: f64 = build.parts.values().map(|p| p.price).sum();
        let score: f64 = build.parts.values().map(|p| p.performance_score).sum();
        assert_eq!(build.total_price, price);
        assert_eq!(build.ai_score, score);
        assert_eq!(build.target_budget, 100_000.0);
        assert_eq!(build.budget_delta, build.total_price - 100_000.0);
        assert_eq!(build.label, "Max Performance");
    }

    #[test]
    fn future_proof_prefers_new_sockets_and_follows_the_chain() {
        let profile = TuningProfile::standard();
        let build = BuildGenerator::new(&profile)
            .generate(&catalog(), 100_000.0, UseCase::Gaming, Strategy::FutureProof)
            .unwrap();

        assert_eq!(build.parts[&PartKind::Cpu].name, "Ryzen 5 7600");
        assert_eq!(build.parts[&PartKind::Motherboard].name, "B650 Board");
        assert_eq!(build.parts[&PartKind::Ram].name, "16GB Kit");
        assert!(build.compatibility.is_empty(), "{:?}", build.compatibility);
    }

    #[test]
    fn memory_follows_ddr4_board() {
        let profile = TuningProfile::standard();
        // Value tier: CPU share 0.18 * 0.78 * 80k ~ 11.2k, only the AM4 part fits.
        let build = BuildGenerator::new(&profile)
            .generate(&catalog(), 80_000.0, UseCase::Gaming, Strategy::Value)
            .unwrap();

        assert_eq!(build.parts[&PartKind::Cpu].socket, "AM4");
        assert_eq!(build.parts[&PartKind::Motherboard].name, "B550 Board");
        assert_eq!(build.parts[&PartKind::Ram].name, "16GB DDR4 3200");
    }

    #[test]
    fn spaced_board_ram_type_still_narrows_memory() {
        let catalog = Catalog::normalize(&[
            json!({"name": "Ryzen 7 7700", "category": "CPU", "price": 30000, "performanceScore": 85, "socket": "AM5"}),
            json!({"name": "X670 Board", "category": "Motherboard", "price": 18000, "performanceScore": 30, "socket": "AM5", "ramType": "DDR 5"}),
            json!({"name": "Fury 32GB DDR5", "category": "RAM", "price": 9000, "performanceScore": 50, "ramType": "DDR5"}),
            json!({"name": "Corsair 16GB DDR4", "category": "RAM", "price": 4000, "performanceScore": 60, "ramType": "DDR4"}),
        ]);
        let profile = TuningProfile::standard();
        let build = BuildGenerator::new(&profile)
            .generate(&catalog, 200_000.0, UseCase::Gaming, Strategy::Performance)
            .unwrap();

        assert_eq!(build.parts[&PartKind::Ram].name, "Fury 32GB DDR5");
        assert!(build.compatibility.is_empty(), "{:?}", build.compatibility);
    }

    #[test]
    fn board_is_kept_when_no_socket_matches_the_cpu() {
        let catalog = Catalog::normalize(&[
            json!({"name": "Ryzen 5 7600", "category": "CPU", "price": 18000, "performanceScore": 75, "socket": "AM5"}),
            json!({"name": "B550 Board", "category": "Motherboard", "price": 9000, "performanceScore": 20, "socket": "AM4", "ramType": "DDR4"}),
        ]);
        let profile = TuningProfile::standard();
        let build = BuildGenerator::new(&profile)
            .generate(&catalog, 100_000.0, UseCase::Gaming, Strategy::Performance)
            .unwrap();

        assert_eq!(build.parts[&PartKind::Motherboard].name, "B550 Board");
        assert!(build.compatibility.iter().any(|issue| issue.category
            == PartKind::Motherboard
            && issue.message == "CPU socket (AM5) does not match motherboard socket (AM4)"));
    }

    #[test]
    fn memory_is_kept_when_no_module_matches_the_board() {
        let catalog = Catalog::normalize(&[
            json!({"name": "Ryzen 5 7600", "category": "CPU", "price": 18000, "performanceScore": 75, "socket": "AM5"}),
            json!({"name": "B650 Board", "category": "Motherboard", "price": 15000, "performanceScore": 25, "socket": "AM5", "ramType": "DDR5"}),
            json!({"name": "16GB DDR4 3200", "category": "RAM", "price": 3500, "performanceScore": 30, "ramType": "DDR4"}),
        ]);
        let profile = TuningProfile::standard();
        let build = BuildGenerator::new(&profile)
            .generate(&catalog, 100_000.0, UseCase::Gaming, Strategy::Performance)
            .unwrap();

        assert_eq!(build.parts[&PartKind::Ram].name, "16GB DDR4 3200");
        assert!(build
            .compatibility
            .iter()
            .any(|issue| issue.category == PartKind::Ram));
    }

    #[test]
    fn missing_board_falls_back_to_default_memory_standard() {
        let catalog = Catalog::normalize(&[
            json!({"name": "16GB DDR4 3200", "category": "RAM", "price": 3500, "performanceScore": 30, "ramType": "DDR4"}),
            json!({"name": "32GB DDR5 6000", "category": "RAM", "price": 4000, "performanceScore": 70, "ramType": "DDR5"}),
        ]);
        let profile = TuningProfile::standard();
        let build = BuildGenerator::new(&profile)
            .generate(&catalog, 100_000.0, UseCase::Gaming, Strategy::Performance)
            .unwrap();

        assert!(build.parts[&PartKind::Motherboard].is_placeholder());
        assert_eq!(build.parts[&PartKind::Ram].name, "16GB DDR4 3200");
    }

    #[test]
    fn gpu_never_integrated_when_discrete_exists() {
        let profile = TuningProfile::standard();
        let build = BuildGenerator::new(&profile)
            .generate(&catalog(), 30_000.0, UseCase::General, Strategy::Value)
            .unwrap();
        assert_eq!(build.parts[&PartKind::Gpu].name, "RTX 4060");
    }

    #[test]
    fn empty_catalog_degrades_to_placeholders() {
        let profile = TuningProfile::standard();
        let build = BuildGenerator::new(&profile)
            .generate(&Catalog::default(), 50_000.0, UseCase::General, Strategy::Value)
            .unwrap();
        assert!(build.parts.values().all(PartRecord::is_placeholder));
        assert_eq!(build.total_price, 0.0);
        assert_eq!(build.ai_score, 0.0);
        assert!(build.within_budget);
        assert_eq!(build.issues, vec![bottleneck::MISSING_GPU_WARNING.to_string()]);
    }

    #[test]
    fn named_entry_point_validates_strategy() {
        let profile = TuningProfile::standard();
        let generator = BuildGenerator::new(&profile);
        let build = generator
            .generate_named(&catalog(), 100_000.0, "streaming", "value")
            .unwrap();
        assert_eq!(build.strategy, Strategy::Value);

        let err = generator
            .generate_named(&catalog(), 100_000.0, "Gaming", "ultra")
            .unwrap_err();
        assert!(matches!(err, OptimizerError::UnknownStrategy(ref s) if s == "ultra"));
    }
}
