use std::collections::BTreeMap;

use buildwise_catalog::{PartKind, PartRecord};
use serde_json::Value;

use crate::orchestrator::format_amount;

/// Leftover budget above which the build counts as under-spent.
const REMAINING_THRESHOLD: f64 = 100.0;
/// CPU/GPU rating gap that earns an imbalance hint.
const IMBALANCE_GAP: f64 = 20.0;
/// Tighter gap used when naming the single next upgrade.
const UPGRADE_GAP: f64 = 15.0;
const CHEAP_RAM_PRICE: f64 = 50.0;
const CHEAP_RAM_REMAINING: f64 = 30.0;

pub const INCOMPLETE_BUILD: &str = "Complete your build to see upgrade suggestions.";
pub const BALANCED_BUILD: &str = "Your system is well-balanced. No immediate upgrades needed.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tier {
    Budget,
    Mid,
    Premium,
}

/// Market tier from the free-form `tier` field carried on catalog records.
fn tier(part: &PartRecord) -> Option<Tier> {
    let raw = part.extra.get("tier").and_then(Value::as_str)?;
    match raw.trim().to_lowercase().as_str() {
        "budget" => Some(Tier::Budget),
        "mid" => Some(Tier::Mid),
        "premium" => Some(Tier::Premium),
        _ => None,
    }
}

/// 0-100 rating when the record declares one, else the ranking score.
fn rating(part: &PartRecord) -> f64 {
    part.performance.unwrap_or(part.performance_score)
}

fn present(parts: &BTreeMap<PartKind, PartRecord>, kind: PartKind) -> Option<&PartRecord> {
    parts.get(&kind).filter(|part| !part.is_placeholder())
}

/// Short hints about how to spend what is left of `user_budget` and which of
/// the CPU/GPU pair is lagging.
#[must_use]
pub fn suggestions(
    parts: &BTreeMap<PartKind, PartRecord>,
    user_budget: f64,
    total_price: f64,
    currency_symbol: &str,
) -> Vec<String> {
    let mut out = Vec::new();
    let remaining = user_budget - total_price;

    if remaining > REMAINING_THRESHOLD {
        out.push(format!(
            "You have {currency_symbol}{} left. Consider upgrading your GPU.",
            format_amount(remaining)
        ));
    }

    if let (Some(cpu), Some(gpu)) = (present(parts, PartKind::Cpu), present(parts, PartKind::Gpu)) {
        let gap = rating(cpu) - rating(gpu);
        if gap > IMBALANCE_GAP {
            out.push(
                "Your CPU is much stronger than your GPU. Upgrade GPU for better gaming performance."
                    .to_string(),
            );
        } else if gap < -IMBALANCE_GAP {
            out.push("Your GPU is bottlenecked by the CPU. Upgrade CPU.".to_string());
        }
    }

    let cheap_ram = present(parts, PartKind::Ram).is_some_and(|ram| ram.price < CHEAP_RAM_PRICE);
    if cheap_ram && remaining > CHEAP_RAM_REMAINING {
        out.push("Upgrade to 32GB RAM for better multitasking.".to_string());
    }

    out
}

/// The single most useful next upgrade for a finished build.
#[must_use]
pub fn upgrade_path(parts: &BTreeMap<PartKind, PartRecord>) -> String {
    let (Some(cpu), Some(gpu)) = (present(parts, PartKind::Cpu), present(parts, PartKind::Gpu))
    else {
        return INCOMPLETE_BUILD.to_string();
    };
    let (cpu_rating, gpu_rating) = (rating(cpu), rating(gpu));
    let (cpu_tier, gpu_tier) = (tier(cpu), tier(gpu));

    if cpu_rating < gpu_rating - UPGRADE_GAP {
        return format!(
            "Your CPU ({}) is holding back your GPU. Consider upgrading to a higher-tier processor like an Intel i7 or Ryzen 7.",
            cpu.name
        );
    }
    if gpu_rating < cpu_rating - UPGRADE_GAP && gpu_tier != Some(Tier::Premium) {
        return format!(
            "Your GPU ({}) is the bottleneck. A graphics card upgrade would significantly improve gaming performance.",
            gpu.name
        );
    }

    let premium_core = cpu_tier == Some(Tier::Premium) || gpu_tier == Some(Tier::Premium);
    if let Some(ram) = present(parts, PartKind::Ram) {
        if premium_core && tier(ram) == Some(Tier::Budget) {
            return format!(
                "Your RAM ({}) is entry-level. Upgrading to 32GB or faster memory would improve multitasking and stability.",
                ram.name
            );
        }
    }
    if cpu_tier == Some(Tier::Premium) && gpu_tier == Some(Tier::Premium) {
        return "Your build is top-tier! The next upgrade might be custom cooling or more fast NVMe storage."
            .to_string();
    }

    BALANCED_BUILD.to_string()
}
