//! Conflict detection: duplicate pin names and URL path collisions.
//!
//! Pin-name duplication inside one section is a normalization step, not an
//! error — the first occurrence wins and later ones are logged and dropped.
//! URL paths are stricter: a path duplicated inside one box, or shared by
//! two boxes, marks the offending box Invalid.

use crate::core::context::ValidationContext;
use crate::core::error::{Issue, IssueKind};
use crate::core::resource::{BoxResource, ResourceIndex};
use crate::core::types::ConfigValue;
use indexmap::IndexMap;
use log::warn;
use std::collections::{BTreeSet, HashSet};

const PORT_SECTIONS: [&str; 3] = ["clusterIP", "nodePort", "loadBalancer"];

/// Drop pins whose name was already taken inside their section.
///
/// Runs before relation building so that links always resolve against the
/// surviving pin. Never marks a box Invalid.
pub fn normalize_duplicate_pins(index: &mut ResourceIndex) {
    for (name, resource) in index.boxes_mut() {
        let pins = &mut resource.spec.pins;
        retain_unique(&mut pins.mq.subscribers, name, "mq subscribers");
        retain_unique(&mut pins.mq.publishers, name, "mq publishers");
        retain_unique(&mut pins.grpc.client, name, "grpc client");
        retain_unique(&mut pins.grpc.server, name, "grpc server");
    }
}

trait NamedPin {
    fn pin_name(&self) -> &str;
}

impl NamedPin for crate::core::pin::MqPin {
    fn pin_name(&self) -> &str {
        &self.name
    }
}

impl NamedPin for crate::core::pin::GrpcClientPin {
    fn pin_name(&self) -> &str {
        &self.name
    }
}

impl NamedPin for crate::core::pin::GrpcServerPin {
    fn pin_name(&self) -> &str {
        &self.name
    }
}

fn retain_unique<T: NamedPin>(pins: &mut Vec<T>, box_name: &str, section: &str) {
    let mut seen: HashSet<String> = HashSet::new();
    pins.retain(|pin| {
        let fresh = seen.insert(pin.pin_name().to_string());
        if !fresh {
            warn!(
                "Detected duplicated pin: \"{}\" in \"{}\" ({}). Will be ignored",
                pin.pin_name(),
                box_name,
                section
            );
        }
        fresh
    });
}

/// Detect URL path conflicts inside and across boxes.
///
/// Cross-box comparison fixes one box at a time and compares its path set
/// against every box not yet fixed, so each conflicting pair is reported
/// exactly once, against the box held fixed.
pub fn detect_url_path_conflicts(index: &ResourceIndex, ctx: &mut ValidationContext) {
    let paths_by_box = collect_url_paths(index, ctx);
    // A single path-exposing box cannot conflict with anything.
    if paths_by_box.len() < 2 {
        return;
    }

    let mut fixed: HashSet<&str> = HashSet::new();
    for (name, paths) in &paths_by_box {
        fixed.insert(name.as_str());
        for (other_name, other_paths) in &paths_by_box {
            if fixed.contains(other_name.as_str()) {
                continue;
            }
            let shared: Vec<&str> = other_paths
                .iter()
                .filter(|path| paths.contains(*path))
                .map(String::as_str)
                .collect();
            if !shared.is_empty() {
                ctx.add_invalidating_issue(
                    name,
                    Issue::Resource {
                        kind: IssueKind::Conflict,
                        name: name.clone(),
                        message: format!(
                            "Conflict of url paths [{}] with resource \"{}\"",
                            shared.join(", "),
                            other_name
                        ),
                    },
                );
            }
        }
    }
}

fn collect_url_paths(
    index: &ResourceIndex,
    ctx: &mut ValidationContext,
) -> IndexMap<String, BTreeSet<String>> {
    let mut paths_by_box = IndexMap::new();
    for resource in index.boxes() {
        match box_url_paths(resource, ctx) {
            Ok(paths) => {
                paths_by_box.insert(resource.name.clone(), paths);
            }
            Err(reason) => {
                ctx.add_invalidating_issue(
                    &resource.name,
                    Issue::Resource {
                        kind: IssueKind::Unexpected,
                        name: resource.name.clone(),
                        message: format!("Failed to extract url paths: {reason}"),
                    },
                );
            }
        }
    }
    paths_by_box
}

/// Both historical spec shapes are accepted: `service.ingress.urlPaths[]`
/// (plain strings) and per-service-type port lists carrying a `urlPath`.
fn box_url_paths(resource: &BoxResource, ctx: &mut ValidationContext) -> Result<BTreeSet<String>, String> {
    let mut paths = BTreeSet::new();

    let service = resource
        .spec
        .extended_settings
        .as_ref()
        .and_then(|settings| settings.get("service"));
    let Some(service) = service else {
        return Ok(paths);
    };

    if let Some(ingress) = service.get("ingress") {
        if let Some(listed) = ingress.get("urlPaths") {
            let items = listed
                .as_sequence()
                .ok_or_else(|| "urlPaths is not a list".to_string())?;
            for item in items {
                let path = item
                    .as_str()
                    .ok_or_else(|| "urlPaths entry is not a string".to_string())?;
                record_path(resource, path, &mut paths, ctx);
            }
        }
    }

    for section in PORT_SECTIONS {
        let Some(ports) = service.get(section) else {
            continue;
        };
        let ports = ports
            .as_sequence()
            .ok_or_else(|| format!("{section} is not a list"))?;
        for port in ports {
            match port.get("urlPath") {
                None | Some(ConfigValue::Null) => {}
                Some(ConfigValue::String(path)) => record_path(resource, path, &mut paths, ctx),
                Some(_) => return Err(format!("{section} urlPath is not a string")),
            }
        }
    }

    Ok(paths)
}

fn record_path(
    resource: &BoxResource,
    path: &str,
    paths: &mut BTreeSet<String>,
    ctx: &mut ValidationContext,
) {
    if !paths.insert(path.to_string()) {
        ctx.add_invalidating_issue(
            &resource.name,
            Issue::Resource {
                kind: IssueKind::Conflict,
                name: resource.name.clone(),
                message: "Contains duplicated url paths".to_string(),
            },
        );
    }
}
