use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use buildwise_catalog::{AliasMap, IntegratedGpuFilter, PartKind};
use serde::{Deserialize, Serialize};

use crate::types::{Strategy, UseCase};

const BUILTIN_DEFAULT: &str = include_str!("../../../profiles/default.json");

/// Tolerance for floating sums of ratio tables.
const RATIO_SUM_EPSILON: f64 = 1e-9;

/// Immutable tuning data: category aliases, budget splits, strategy tiers and
/// the compatibility / bottleneck rules. Loaded once and shared read-only.
#[derive(Clone, Debug)]
pub struct TuningProfile {
    name: String,
    description: Option<String>,
    currency_symbol: String,
    aliases: AliasMap,
    ratios: BTreeMap<UseCase, BTreeMap<PartKind, f64>>,
    default_ratio: f64,
    strategies: BTreeMap<Strategy, StrategyConfig>,
    limited_stock: LimitedStock,
    compatibility: CompatibilityRules,
    bottleneck: BottleneckRules,
    gpu_patterns: Vec<String>,
    gpu_filter: IntegratedGpuFilter,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StrategyConfig {
    /// Scales the user budget into the effective budget.
    pub budget_multiplier: f64,
    /// Fractional slack above a category share when testing affordability.
    pub flexibility: f64,
    pub prefer_future_socket: bool,
    pub hard_cap: bool,
    pub label: String,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LimitedStock {
    pub label: String,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CompatibilityRules {
    pub future_sockets: Vec<String>,
    /// Assumed when the motherboard slot could not be filled.
    pub default_ram_type: String,
    pub default_cpu_wattage: f64,
    pub default_gpu_wattage: f64,
    pub base_wattage: f64,
    pub psu_headroom: f64,
}

impl CompatibilityRules {
    #[must_use]
    pub fn is_future_socket(&self, socket: &str) -> bool {
        let socket = socket.to_lowercase();
        self.future_sockets
            .iter()
            .any(|token| socket.contains(&token.to_lowercase()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BottleneckRules {
    /// Score ratio (stronger / weaker) at which a CPU/GPU pair is flagged.
    pub ratio: f64,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
struct RawProfile {
    #[serde(default)]
    schema_version: Option<u32>,
    name: Option<String>,
    description: Option<String>,
    currency_symbol: Option<String>,
    #[serde(default)]
    aliases: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    ratios: BTreeMap<String, BTreeMap<String, f64>>,
    default_ratio: Option<f64>,
    #[serde(default)]
    strategies: BTreeMap<String, RawStrategy>,
    limited_stock: Option<RawLimitedStock>,
    compatibility: Option<RawCompatibility>,
    bottleneck: Option<RawBottleneck>,
    integrated_gpu_patterns: Option<Vec<String>>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
struct RawStrategy {
    budget_multiplier: Option<f64>,
    flexibility: Option<f64>,
    prefer_future_socket: Option<bool>,
    hard_cap: Option<bool>,
    label: Option<String>,
    description: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
struct RawLimitedStock {
    label: Option<String>,
    description: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
struct RawCompatibility {
    future_sockets: Option<Vec<String>>,
    default_ram_type: Option<String>,
    default_cpu_wattage: Option<f64>,
    default_gpu_wattage: Option<f64>,
    base_wattage: Option<f64>,
    psu_headroom: Option<f64>,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
struct RawBottleneck {
    ratio: Option<f64>,
}

impl TuningProfile {
    #[must_use]
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "default" => Some(
                Self::from_bytes("default", BUILTIN_DEFAULT.as_bytes(), None)
                    .expect("builtin default profile must parse"),
            ),
            _ => None,
        }
    }

    #[must_use]
    pub fn standard() -> Self {
        Self::builtin("default").expect("default profile is bundled")
    }

    /// Load an overlay file and merge it onto the bundled default.
    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read profile file {}", path.display()))?;
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("custom");
        Self::from_bytes(name, &bytes, Some("default"))
    }

    /// Resolve `path` if given, otherwise the bundled default.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::standard()),
        }
    }

    pub fn from_bytes(profile_name: &str, bytes: &[u8], base: Option<&str>) -> Result<Self> {
        let raw = parse_raw(bytes).with_context(|| {
            format!("Profile '{profile_name}' is not valid JSON/TOML configuration")
        })?;
        let merged_raw = if let Some(base_name) = base {
            let overlay_name = raw.name.clone();
            let base_raw = builtin_raw(base_name)?;
            let mut merged = merge_raw_profiles(base_raw, raw);
            // An overlay is named after itself, never after its base.
            merged.name = overlay_name;
            merged
        } else {
            raw
        };
        Self::from_raw(merged_raw, profile_name)
            .with_context(|| format!("Invalid profile '{profile_name}'"))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn currency_symbol(&self) -> &str {
        &self.currency_symbol
    }

    #[must_use]
    pub const fn aliases(&self) -> &AliasMap {
        &self.aliases
    }

    /// Budget share of `kind` under `use_case`; categories the profile omits
    /// get the default share.
    #[must_use]
    pub fn ratio(&self, use_case: UseCase, kind: PartKind) -> f64 {
        self.ratios
            .get(&use_case)
            .and_then(|table| table.get(&kind))
            .copied()
            .unwrap_or(self.default_ratio)
    }

    pub fn strategy(&self, strategy: Strategy) -> crate::Result<&StrategyConfig> {
        self.strategies
            .get(&strategy)
            .ok_or_else(|| crate::OptimizerError::UnknownStrategy(strategy.as_str().to_string()))
    }

    #[must_use]
    pub const fn limited_stock(&self) -> &LimitedStock {
        &self.limited_stock
    }

    #[must_use]
    pub const fn compatibility(&self) -> &CompatibilityRules {
        &self.compatibility
    }

    #[must_use]
    pub const fn bottleneck(&self) -> &BottleneckRules {
        &self.bottleneck
    }

    #[must_use]
    pub const fn gpu_filter(&self) -> &IntegratedGpuFilter {
        &self.gpu_filter
    }

    /// Effective profile as JSON, in the same shape profile files use.
    #[must_use]
    pub fn describe(&self) -> serde_json::Value {
        let aliases: BTreeMap<&str, &[String]> = PartKind::BUILD_ORDER
            .into_iter()
            .map(|kind| (kind.as_str(), self.aliases.aliases(kind)))
            .collect();
        let ratios: BTreeMap<&str, BTreeMap<&str, f64>> = self
            .ratios
            .iter()
            .map(|(uc, table)| {
                (
                    uc.as_str(),
                    table.iter().map(|(k, v)| (k.as_str(), *v)).collect(),
                )
            })
            .collect();
        let strategies: BTreeMap<&str, &StrategyConfig> = self
            .strategies
            .iter()
            .map(|(s, cfg)| (s.as_str(), cfg))
            .collect();

        serde_json::json!({
            "schema_version": 1,
            "name": self.name,
            "description": self.description,
            "currency_symbol": self.currency_symbol,
            "aliases": aliases,
            "ratios": ratios,
            "default_ratio": self.default_ratio,
            "strategies": strategies,
            "limited_stock": self.limited_stock,
            "compatibility": self.compatibility,
            "bottleneck": self.bottleneck,
            "integrated_gpu_patterns": self.gpu_patterns,
        })
    }

    fn from_raw(raw: RawProfile, fallback_name: &str) -> Result<Self> {
        if let Some(schema_version) = raw.schema_version {
            if schema_version != 1 {
                return Err(anyhow!(
                    "profile.schema_version {schema_version} is not supported (expected 1)"
                ));
            }
        }

        let name = raw
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| fallback_name.to_string());
        let currency_symbol = raw.currency_symbol.unwrap_or_default();

        let aliases = build_aliases(raw.aliases)?;
        let ratios = build_ratios(raw.ratios)?;
        let default_ratio = raw
            .default_ratio
            .ok_or_else(|| anyhow!("default_ratio is required"))?;
        if !(0.0..=1.0).contains(&default_ratio) {
            return Err(anyhow!(
                "default_ratio must be in [0.0, 1.0] (got {default_ratio})"
            ));
        }

        let strategies = build_strategies(raw.strategies)?;
        let limited_stock = build_limited_stock(raw.limited_stock)?;
        let compatibility = build_compatibility(raw.compatibility)?;

        let ratio = raw
            .bottleneck
            .and_then(|b| b.ratio)
            .ok_or_else(|| anyhow!("bottleneck.ratio is required"))?;
        if !ratio.is_finite() || ratio <= 1.0 {
            return Err(anyhow!("bottleneck.ratio must be > 1.0 (got {ratio})"));
        }

        let gpu_patterns = raw.integrated_gpu_patterns.unwrap_or_default();
        let gpu_filter = IntegratedGpuFilter::new(&gpu_patterns)
            .context("integrated_gpu_patterns contains an invalid pattern")?;

        log::debug!(
            "Loaded tuning profile '{name}' ({} integrated GPU patterns)",
            gpu_filter.pattern_count()
        );

        Ok(Self {
            name,
            description: raw.description,
            currency_symbol,
            aliases,
            ratios,
            default_ratio,
            strategies,
            limited_stock,
            compatibility,
            bottleneck: BottleneckRules { ratio },
            gpu_patterns,
            gpu_filter,
        })
    }
}

fn build_aliases(raw: BTreeMap<String, Vec<String>>) -> Result<AliasMap> {
    let mut map = BTreeMap::new();
    for (key, list) in raw {
        let kind: PartKind = key
            .parse()
            .map_err(|_| anyhow!("aliases.{key} is not a canonical part type"))?;
        map.insert(kind, list);
    }
    AliasMap::new(map).map_err(|err| anyhow!("{err}"))
}

fn build_ratios(
    raw: BTreeMap<String, BTreeMap<String, f64>>,
) -> Result<BTreeMap<UseCase, BTreeMap<PartKind, f64>>> {
    let mut out = BTreeMap::new();
    for (uc_key, table) in raw {
        let use_case = UseCase::parse(&uc_key)
            .ok_or_else(|| anyhow!("ratios.{uc_key} is not a known use case"))?;
        let mut parsed = BTreeMap::new();
        for (kind_key, share) in table {
            let kind: PartKind = kind_key
                .parse()
                .map_err(|_| anyhow!("ratios.{uc_key}.{kind_key} is not a canonical part type"))?;
            if !share.is_finite() || !(0.0..=1.0).contains(&share) {
                return Err(anyhow!(
                    "ratios.{uc_key}.{kind_key} must be in [0.0, 1.0] (got {share})"
                ));
            }
            parsed.insert(kind, share);
        }
        let sum: f64 = parsed.values().sum();
        if sum > 1.0 + RATIO_SUM_EPSILON {
            return Err(anyhow!(
                "ratios.{uc_key} must sum to at most 1.0 (got {sum:.4})"
            ));
        }
        out.insert(use_case, parsed);
    }
    for use_case in UseCase::ALL {
        if !out.contains_key(&use_case) {
            return Err(anyhow!("ratios.{use_case} is required"));
        }
    }
    Ok(out)
}

fn build_strategies(raw: BTreeMap<String, RawStrategy>) -> Result<BTreeMap<Strategy, StrategyConfig>> {
    let mut out = BTreeMap::new();
    for (key, cfg) in raw {
        let strategy: Strategy = key
            .parse()
            .map_err(|_| anyhow!("strategies.{key} is not a known strategy"))?;
        let field = |name: &str| anyhow!("strategies.{key}.{name} is required");
        let config = StrategyConfig {
            budget_multiplier: cfg.budget_multiplier.ok_or_else(|| field("budget_multiplier"))?,
            flexibility: cfg.flexibility.ok_or_else(|| field("flexibility"))?,
            prefer_future_socket: cfg.prefer_future_socket.unwrap_or(false),
            hard_cap: cfg.hard_cap.unwrap_or(false),
            label: cfg.label.ok_or_else(|| field("label"))?,
            description: cfg.description.unwrap_or_default(),
        };
        if !config.budget_multiplier.is_finite() || config.budget_multiplier <= 0.0 {
            return Err(anyhow!(
                "strategies.{key}.budget_multiplier must be > 0 (got {})",
                config.budget_multiplier
            ));
        }
        if !config.flexibility.is_finite() || config.flexibility < 0.0 {
            return Err(anyhow!(
                "strategies.{key}.flexibility must be >= 0 (got {})",
                config.flexibility
            ));
        }
        out.insert(strategy, config);
    }

    let multiplier = |strategy: Strategy| -> Result<f64> {
        out.get(&strategy)
            .map(|cfg| cfg.budget_multiplier)
            .ok_or_else(|| anyhow!("strategies.{strategy} is required"))
    };
    let value = multiplier(Strategy::Value)?;
    let performance = multiplier(Strategy::Performance)?;
    let future_proof = multiplier(Strategy::FutureProof)?;
    if !(value < performance && performance <= 1.0 && 1.0 < future_proof) {
        return Err(anyhow!(
            "strategy multipliers must satisfy value < performance <= 1.0 < future_proof \
             (got {value}, {performance}, {future_proof})"
        ));
    }
    Ok(out)
}

fn build_limited_stock(raw: Option<RawLimitedStock>) -> Result<LimitedStock> {
    let raw = raw.unwrap_or_default();
    Ok(LimitedStock {
        label: raw
            .label
            .ok_or_else(|| anyhow!("limited_stock.label is required"))?,
        description: raw.description.unwrap_or_default(),
    })
}

fn build_compatibility(raw: Option<RawCompatibility>) -> Result<CompatibilityRules> {
    let raw = raw.unwrap_or_default();
    let rules = CompatibilityRules {
        future_sockets: raw
            .future_sockets
            .unwrap_or_default()
            .into_iter()
            .filter(|s| !s.trim().is_empty())
            .collect(),
        default_ram_type: raw.default_ram_type.unwrap_or_default(),
        default_cpu_wattage: raw.default_cpu_wattage.unwrap_or(0.0),
        default_gpu_wattage: raw.default_gpu_wattage.unwrap_or(0.0),
        base_wattage: raw.base_wattage.unwrap_or(0.0),
        psu_headroom: raw.psu_headroom.unwrap_or(1.0),
    };
    if !rules.psu_headroom.is_finite() || rules.psu_headroom < 1.0 {
        return Err(anyhow!(
            "compatibility.psu_headroom must be >= 1.0 (got {})",
            rules.psu_headroom
        ));
    }
    Ok(rules)
}

fn builtin_raw(name: &str) -> Result<RawProfile> {
    match name {
        "default" => parse_raw(BUILTIN_DEFAULT.as_bytes()),
        other => Err(anyhow!("Base profile '{other}' not bundled")),
    }
}

fn merge_raw_profiles(mut base: RawProfile, overlay: RawProfile) -> RawProfile {
    base.schema_version = overlay.schema_version.or(base.schema_version);
    base.description = overlay.description.or(base.description);
    base.currency_symbol = overlay.currency_symbol.or(base.currency_symbol);
    base.aliases.extend(overlay.aliases);
    for (use_case, table) in overlay.ratios {
        base.ratios.entry(use_case).or_default().extend(table);
    }
    base.default_ratio = overlay.default_ratio.or(base.default_ratio);
    for (key, strategy) in overlay.strategies {
        let merged = merge_strategy_raw(base.strategies.remove(&key), strategy);
        base.strategies.insert(key, merged);
    }
    if overlay.limited_stock.is_some() {
        base.limited_stock = Some(merge_limited_stock_raw(
            base.limited_stock.take(),
            overlay.limited_stock,
        ));
    }
    if overlay.compatibility.is_some() {
        base.compatibility = Some(merge_compatibility_raw(
            base.compatibility.take(),
            overlay.compatibility,
        ));
    }
    if let Some(bottleneck) = overlay.bottleneck {
        let previous = base.bottleneck.unwrap_or_default();
        base.bottleneck = Some(RawBottleneck {
            ratio: bottleneck.ratio.or(previous.ratio),
        });
    }
    base.integrated_gpu_patterns = overlay
        .integrated_gpu_patterns
        .or(base.integrated_gpu_patterns);
    base
}

fn merge_strategy_raw(base: Option<RawStrategy>, overlay: RawStrategy) -> RawStrategy {
    let base = base.unwrap_or_default();
    RawStrategy {
        budget_multiplier: overlay.budget_multiplier.or(base.budget_multiplier),
        flexibility: overlay.flexibility.or(base.flexibility),
        prefer_future_socket: overlay.prefer_future_socket.or(base.prefer_future_socket),
        hard_cap: overlay.hard_cap.or(base.hard_cap),
        label: overlay.label.or(base.label),
        description: overlay.description.or(base.description),
    }
}

fn merge_limited_stock_raw(
    base: Option<RawLimitedStock>,
    overlay: Option<RawLimitedStock>,
) -> RawLimitedStock {
    let base = base.unwrap_or_default();
    let overlay = overlay.unwrap_or_default();
    RawLimitedStock {
        label: overlay.label.or(base.label),
        description: overlay.description.or(base.description),
    }
}

fn merge_compatibility_raw(
    base: Option<RawCompatibility>,
    overlay: Option<RawCompatibility>,
) -> RawCompatibility {
    let base = base.unwrap_or_default();
    let overlay = overlay.unwrap_or_default();
    RawCompatibility {
        future_sockets: overlay.future_sockets.or(base.future_sockets),
        default_ram_type: overlay.default_ram_type.or(base.default_ram_type),
        default_cpu_wattage: overlay.default_cpu_wattage.or(base.default_cpu_wattage),
        default_gpu_wattage: overlay.default_gpu_wattage.or(base.default_gpu_wattage),
        base_wattage: overlay.base_wattage.or(base.base_wattage),
        psu_headroom: overlay.psu_headroom.or(base.psu_headroom),
    }
}

fn parse_raw(bytes: &[u8]) -> Result<RawProfile> {
    let value: serde_json::Value = match serde_json::from_slice(bytes) {
        Ok(value) => value,
        Err(json_err) => {
            let utf8 = std::str::from_utf8(bytes).map_err(|err| anyhow!("{json_err}; {err}"))?;
            let toml_value: toml::Value = toml::from_str(utf8).map_err(|toml_err| {
                anyhow!(
                    "Profile is not valid JSON or TOML ({json_err}); TOML parse error: {toml_err}"
                )
            })?;
            serde_json::to_value(toml_value)
                .map_err(|err| anyhow!("Failed to convert TOML profile to JSON: {err}"))?
        }
    };

    validate_profile_value(&value)?;
    serde_json::from_value(value).map_err(|err| anyhow!("Profile parse error: {err}"))
}

fn validate_profile_value(value: &serde_json::Value) -> Result<()> {
    type Object = serde_json::Map<String, serde_json::Value>;

    fn validate_object_keys(unknown: &mut Vec<String>, obj: &Object, base: &str, allowed: &[&str]) {
        for key in obj.keys() {
            if !allowed.iter().any(|a| a == &key.as_str()) {
                if base.is_empty() {
                    unknown.push(key.clone());
                } else {
                    unknown.push(format!("{base}.{key}"));
                }
            }
        }
    }

    fn object_at(value: &serde_json::Value) -> Option<&Object> {
        match value {
            serde_json::Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    let serde_json::Value::Object(root) = value else {
        return Err(anyhow!("Profile must be a JSON object"));
    };

    let part_kinds: Vec<&str> = PartKind::BUILD_ORDER.iter().map(|k| k.as_str()).collect();
    let use_cases: Vec<&str> = UseCase::ALL.iter().map(|u| u.as_str()).collect();
    let strategies: Vec<&str> = Strategy::ALL.iter().map(|s| s.as_str()).collect();

    let mut unknown = Vec::new();
    validate_object_keys(
        &mut unknown,
        root,
        "",
        &[
            "schema_version",
            "name",
            "description",
            "currency_symbol",
            "aliases",
            "ratios",
            "default_ratio",
            "strategies",
            "limited_stock",
            "compatibility",
            "bottleneck",
            "integrated_gpu_patterns",
        ],
    );

    if let Some(aliases) = root.get("aliases").and_then(object_at) {
        validate_object_keys(&mut unknown, aliases, "aliases", &part_kinds);
    }
    if let Some(ratios) = root.get("ratios").and_then(object_at) {
        validate_object_keys(&mut unknown, ratios, "ratios", &use_cases);
        for (use_case, table) in ratios {
            if let Some(table) = object_at(table) {
                validate_object_keys(&mut unknown, table, &format!("ratios.{use_case}"), &part_kinds);
            }
        }
    }
    if let Some(configs) = root.get("strategies").and_then(object_at) {
        validate_object_keys(&mut unknown, configs, "strategies", &strategies);
        for (strategy, cfg) in configs {
            if let Some(cfg) = object_at(cfg) {
                validate_object_keys(
                    &mut unknown,
                    cfg,
                    &format!("strategies.{strategy}"),
                    &[
                        "budget_multiplier",
                        "flexibility",
                        "prefer_future_socket",
                        "hard_cap",
                        "label",
                        "description",
                    ],
                );
            }
        }
    }
    if let Some(limited) = root.get("limited_stock").and_then(object_at) {
        validate_object_keys(&mut unknown, limited, "limited_stock", &["label", "description"]);
    }
    if let Some(compat) = root.get("compatibility").and_then(object_at) {
        validate_object_keys(
            &mut unknown,
            compat,
            "compatibility",
            &[
                "future_sockets",
                "default_ram_type",
                "default_cpu_wattage",
                "default_gpu_wattage",
                "base_wattage",
                "psu_headroom",
            ],
        );
    }
    if let Some(bottleneck) = root.get("bottleneck").and_then(object_at) {
        validate_object_keys(&mut unknown, bottleneck, "bottleneck", &["ratio"]);
    }

    if unknown.is_empty() {
        Ok(())
    } else {
        Err(anyhow!(
            "Profile config has unknown fields: {}",
            unknown.join(", ")
        ))
    }
}
