use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use buildwise_catalog::Catalog;
use buildwise_protocol::{RecommendRequest, ResponseStatus, DEFAULT_PERFORMANCE_PREFERENCE};

use crate::error::{OptimizerError, Result};
use crate::generator::BuildGenerator;
use crate::profile::TuningProfile;
use crate::types::{BuildResult, Recommendation, Strategy, StrategySummary, UseCase};

/// Runs every strategy over one request and assembles the combined response.
#[derive(Clone, Debug)]
pub struct Orchestrator {
    profile: Arc<TuningProfile>,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new(TuningProfile::standard())
    }
}

impl Orchestrator {
    #[must_use]
    pub fn new(profile: TuningProfile) -> Self {
        Self::with_shared(Arc::new(profile))
    }

    #[must_use]
    pub const fn with_shared(profile: Arc<TuningProfile>) -> Self {
        Self { profile }
    }

    /// Load the profile at `path` (or the bundled default) and wrap it.
    pub fn from_profile_path(path: Option<&Path>) -> Result<Self> {
        let profile = TuningProfile::load(path)
            .map_err(|err| OptimizerError::InvalidProfile(format!("{err:#}")))?;
        Ok(Self::new(profile))
    }

    #[must_use]
    pub fn profile(&self) -> &TuningProfile {
        &self.profile
    }

    pub fn recommend(&self, request: &RecommendRequest) -> Result<Recommendation> {
        let budget = validate_budget(request.request.budget)?;
        let use_case = UseCase::resolve(&request.request.use_case);
        let catalog = Catalog::from_value(&request.database)?;

        let generator = BuildGenerator::new(&self.profile);
        let mut options = BTreeMap::new();
        for strategy in Strategy::ALL {
            options.insert(
                strategy,
                generator.generate(&catalog, budget, use_case, strategy)?,
            );
        }

        self.assemble(budget, use_case, request.request.performance_preference, options)
    }

    /// Same result as [`Orchestrator::recommend`], with the strategy runs
    /// spread over blocking tasks that share one normalized catalog.
    pub async fn recommend_concurrent(&self, request: &RecommendRequest) -> Result<Recommendation> {
        let budget = validate_budget(request.request.budget)?;
        let use_case = UseCase::resolve(&request.request.use_case);
        let catalog = Arc::new(Catalog::from_value(&request.database)?);

        let handles: Vec<_> = Strategy::ALL
            .into_iter()
            .map(|strategy| {
                let profile = Arc::clone(&self.profile);
                let catalog = Arc::clone(&catalog);
                let handle = tokio::task::spawn_blocking(move || {
                    BuildGenerator::new(&profile).generate(&catalog, budget, use_case, strategy)
                });
                (strategy, handle)
            })
            .collect();

        let mut options = BTreeMap::new();
        for (strategy, handle) in handles {
            let build = handle
                .await
                .map_err(|err| OptimizerError::Join(format!("{strategy}: {err}")))??;
            options.insert(strategy, build);
        }

        self.assemble(budget, use_case, request.request.performance_preference, options)
    }

    fn assemble(
        &self,
        budget: f64,
        use_case: UseCase,
        preference: Option<f64>,
        mut options: BTreeMap<Strategy, BuildResult>,
    ) -> Result<Recommendation> {
        let performance_total = options
            .get(&Strategy::Performance)
            .map(|build| build.total_price)
            .ok_or_else(|| missing(Strategy::Performance))?;
        let future = options
            .get_mut(&Strategy::FutureProof)
            .ok_or_else(|| missing(Strategy::FutureProof))?;
        if future.total_price <= performance_total {
            let limited = self.profile.limited_stock();
            log::info!(
                "Future-proof total {:.2} does not exceed performance total {performance_total:.2}; marking as limited stock",
                future.total_price
            );
            future.label.clone_from(&limited.label);
            future.description.clone_from(&limited.description);
        }

        let summary = options
            .iter()
            .map(|(strategy, build)| (*strategy, StrategySummary::from(build)))
            .collect();
        let reasoning = self.reasoning(budget, &options)?;
        let selected_strategy =
            Strategy::from_preference(preference.unwrap_or(DEFAULT_PERFORMANCE_PREFERENCE));

        Ok(Recommendation {
            status: ResponseStatus::Success,
            user_budget: budget,
            use_case,
            selected_strategy,
            options,
            summary,
            reasoning,
        })
    }

    fn reasoning(&self, budget: f64, options: &BTreeMap<Strategy, BuildResult>) -> Result<String> {
        let symbol = self.profile.currency_symbol();
        let mut segments = Vec::with_capacity(Strategy::ALL.len());
        for strategy in Strategy::ALL {
            let build = options.get(&strategy).ok_or_else(|| missing(strategy))?;
            segments.push(format!(
                "{} {symbol}{}",
                strategy.display_name(),
                format_amount(build.total_price)
            ));
        }
        Ok(format!(
            "{} (user budget {symbol}{})",
            segments.join(" | "),
            format_amount(budget)
        ))
    }
}

fn missing(strategy: Strategy) -> OptimizerError {
    OptimizerError::UnknownStrategy(strategy.as_str().to_string())
}

fn validate_budget(budget: f64) -> Result<f64> {
    if budget.is_finite() && budget > 0.0 {
        Ok(budget)
    } else {
        Err(OptimizerError::InvalidBudget(budget))
    }
}

/// Whole currency units with comma thousands separators: `123456.7` -> `123,457`.
/// Halves round to the even neighbour (`2.5` -> `2`, `3.5` -> `4`).
#[must_use]
pub fn format_amount(amount: f64) -> String {
    let rounded = format!("{:.0}", amount.abs().round_ties_even());
    let digits = rounded.as_bytes();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if amount < 0.0 && rounded != "0" {
        out.push('-');
    }
    for (idx, digit) in digits.iter().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(char::from(*digit));
    }
    out
}
