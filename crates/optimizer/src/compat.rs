use std::collections::BTreeMap;

use buildwise_catalog::{PartKind, PartRecord};
use serde::Serialize;

use crate::profile::CompatibilityRules;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CompatibilityIssue {
    pub severity: Severity,
    pub category: PartKind,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Audit {
    pub issues: Vec<CompatibilityIssue>,
    pub estimated_wattage: f64,
}

fn present(parts: &BTreeMap<PartKind, PartRecord>, kind: PartKind) -> Option<&PartRecord> {
    parts.get(&kind).filter(|part| !part.is_placeholder())
}

/// Cross-check an assembled build: socket fit, memory standard and PSU headroom.
#[must_use]
pub fn audit(parts: &BTreeMap<PartKind, PartRecord>, rules: &CompatibilityRules) -> Audit {
    let cpu = present(parts, PartKind::Cpu);
    let motherboard = present(parts, PartKind::Motherboard);
    let ram = present(parts, PartKind::Ram);
    let gpu = present(parts, PartKind::Gpu);
    let psu = present(parts, PartKind::Psu);

    let mut issues = Vec::new();

    if let (Some(cpu), Some(board)) = (cpu, motherboard) {
        let (cpu_socket, board_socket) = (cpu.normalized_socket(), board.normalized_socket());
        if !cpu_socket.is_empty() && !board_socket.is_empty() && cpu_socket != board_socket {
            issues.push(CompatibilityIssue {
                severity: Severity::Error,
                category: PartKind::Motherboard,
                message: format!(
                    "CPU socket ({}) does not match motherboard socket ({})",
                    cpu.socket, board.socket
                ),
            });
        }
    }

    if let (Some(board), Some(ram)) = (motherboard, ram) {
        if let Some(module_type) = ram.ram_type.primary() {
            if !board.ram_type.is_empty() && !board.ram_type.supports(module_type) {
                let supported: Vec<&str> = board.ram_type.values().collect();
                issues.push(CompatibilityIssue {
                    severity: Severity::Error,
                    category: PartKind::Ram,
                    message: format!(
                        "Motherboard supports {} but selected RAM is {module_type}",
                        supported.join("/")
                    ),
                });
            }
        }
    }

    let estimated_wattage = cpu
        .and_then(|cpu| cpu.wattage)
        .unwrap_or(rules.default_cpu_wattage)
        + gpu
            .and_then(|gpu| gpu.wattage)
            .unwrap_or(rules.default_gpu_wattage)
        + rules.base_wattage;

    if let Some((psu, rated)) = psu.and_then(|psu| psu.wattage.map(|w| (psu, w))) {
        if rated < estimated_wattage {
            let recommended = (estimated_wattage * rules.psu_headroom).ceil();
            issues.push(CompatibilityIssue {
                severity: Severity::Warning,
                category: PartKind::Psu,
                message: format!(
                    "PSU ({rated:.0}W) may be insufficient. Estimated draw: {estimated_wattage:.0}W. \
                     Recommended: {recommended:.0}W"
                ),
            });
            log::debug!("PSU '{}' below estimated draw", psu.name);
        }
    }

    Audit {
        issues,
        estimated_wattage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::TuningProfile;
    use buildwise_catalog::Catalog;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn parts(rows: &[(PartKind, Value)]) -> BTreeMap<PartKind, PartRecord> {
        let raw: Vec<Value> = rows.iter().map(|(_, v)| v.clone()).collect();
        let catalog = Catalog::normalize(&raw);
        rows.iter()
            .zip(catalog.parts())
            .map(|((kind, _), part)| (*kind, part.clone()))
            .collect()
    }

    fn rules() -> CompatibilityRules {
        TuningProfile::standard().compatibility().clone()
    }

    #[test]
    fn clean_build_has_no_issues() {
        let build = parts(&[
            (PartKind::Cpu, json!({"name": "cpu", "socket": "AM5", "wattage": 105})),
            (PartKind::Motherboard, json!({"name": "mb", "socket": "am 5", "ramType": ["DDR5"]})),
            (PartKind::Ram, json!({"name": "ram", "ramType": "ddr5"})),
            (PartKind::Gpu, json!({"name": "gpu", "wattage": 200})),
            (PartKind::Psu, json!({"name": "psu", "wattage": 650})),
        ]);
        let audit = audit(&build, &rules());
        assert!(audit.issues.is_empty(), "{:?}", audit.issues);
        assert_eq!(audit.estimated_wattage, 405.0);
    }

    #[test]
    fn reports_socket_and_memory_mismatches() {
        let build = parts(&[
            (PartKind::Cpu, json!({"name": "cpu", "socket": "AM4"})),
            (PartKind::Motherboard, json!({"name": "mb", "socket": "AM5", "ramType": ["DDR5", "DDR5X"]})),
            (PartKind::Ram, json!({"name": "ram", "ramType": "DDR4"})),
        ]);
        let audit = audit(&build, &rules());
        let messages: Vec<&str> = audit.issues.iter().map(|i| i.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "CPU socket (AM4) does not match motherboard socket (AM5)",
                "Motherboard supports DDR5/DDR5X but selected RAM is DDR4",
            ]
        );
        assert!(audit.issues.iter().all(|i| i.severity == Severity::Error));
        assert_eq!(audit.issues[1].category, PartKind::Ram);
    }

    #[test]
    fn undersized_psu_is_a_warning_with_headroom() {
        let build = parts(&[
            (PartKind::Cpu, json!({"name": "cpu", "wattage": 125})),
            (PartKind::Gpu, json!({"name": "gpu", "wattage": 320})),
            (PartKind::Psu, json!({"name": "psu", "wattage": 450})),
        ]);
        let audit = audit(&build, &rules());
        assert_eq!(audit.estimated_wattage, 545.0);
        assert_eq!(audit.issues.len(), 1);
        assert_eq!(audit.issues[0].severity, Severity::Warning);
        assert_eq!(
            audit.issues[0].message,
            "PSU (450W) may be insufficient. Estimated draw: 545W. Recommended: 654W"
        );
    }

    #[test]
    fn placeholders_are_ignored_and_defaults_apply() {
        let mut build = BTreeMap::new();
        for kind in PartKind::BUILD_ORDER {
            build.insert(kind, PartRecord::placeholder());
        }
        let audit = audit(&build, &rules());
        assert!(audit.issues.is_empty());
        assert_eq!(audit.estimated_wattage, 315.0);
    }

    #[test]
    fn severity_serializes_lowercase() {
        let issue = CompatibilityIssue {
            severity: Severity::Warning,
            category: PartKind::Psu,
            message: "m".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&issue).unwrap(),
            json!({"severity": "warning", "category": "psu", "message": "m"})
        );
    }
}
