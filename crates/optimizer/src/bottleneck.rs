use std::collections::BTreeMap;

use buildwise_catalog::{PartKind, PartRecord};

use crate::profile::BottleneckRules;

pub const MISSING_GPU_WARNING: &str =
    "No dedicated GPU selected. Add a discrete GPU for gaming or rendering workloads.";

/// Inspect the CPU/GPU pair of a finished build. Produces at most one warning.
#[must_use]
pub fn analyze(parts: &BTreeMap<PartKind, PartRecord>, rules: &BottleneckRules) -> Vec<String> {
    let gpu = parts.get(&PartKind::Gpu);
    if gpu.map_or(true, |gpu| gpu.price <= 0.0 || gpu.is_placeholder()) {
        return vec![MISSING_GPU_WARNING.to_string()];
    }

    let cpu_score = parts.get(&PartKind::Cpu).map_or(0.0, |cpu| cpu.performance_score);
    let gpu_score = gpu.map_or(0.0, |gpu| gpu.performance_score);
    if cpu_score <= 0.0 || gpu_score <= 0.0 {
        return Vec::new();
    }

    let ratio = cpu_score.max(gpu_score) / cpu_score.min(gpu_score);
    if ratio < rules.ratio {
        return Vec::new();
    }

    let warning = if cpu_score > gpu_score {
        format!(
            "CPU bottleneck: CPU score ({cpu_score:.0}) is much higher than GPU score ({gpu_score:.0}). \
             Upgrade the GPU for better gaming performance."
        )
    } else {
        format!(
            "GPU bottleneck: GPU score ({gpu_score:.0}) far exceeds CPU score ({cpu_score:.0}). \
             Upgrade the CPU to avoid throttling the GPU."
        )
    };
    log::debug!("Bottleneck detected at ratio {ratio:.2}");
    vec![warning]
}
