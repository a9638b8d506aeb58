//! Placeholder scanning over configuration trees.
//!
//! Boxes reference shared objects indirectly, through textual placeholders
//! buried anywhere inside their `customConfig` tree:
//! - `${dictionary_link:<name>}` as a full string value names a dictionary
//! - `${secret_value:<key>}` / `${secret_path:<key>}` embedded inside any
//!   string name keys of the namespace's custom secret
//!
//! The scan is purely collecting — nothing is substituted — and recursion
//! has no depth bound.

use crate::core::context::ValidationContext;
use crate::core::error::{Issue, IssueKind};
use crate::core::resource::ResourceIndex;
use crate::core::types::ConfigValue;
use crate::external::{SecretSource, SECRET_NAME};
use crate::graph::link::DictionaryRef;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static DICTIONARY_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\$\{dictionary_link:([^}]+)\}$").expect("pattern compiles")
});

static SECRET_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{secret_(?:value|path):([^}]+)\}").expect("pattern compiles")
});

/// Collect every dictionary name referenced by a configuration tree.
pub fn collect_dictionary_refs(tree: &ConfigValue, names: &mut Vec<String>) {
    visit_strings(tree, &mut |text| {
        if let Some(captures) = DICTIONARY_REF.captures(text) {
            names.push(captures[1].to_string());
        }
    });
}

/// Collect every secret key referenced by a configuration tree.
pub fn collect_secret_keys(tree: &ConfigValue, keys: &mut BTreeSet<String>) {
    visit_strings(tree, &mut |text| {
        for captures in SECRET_REF.captures_iter(text) {
            keys.insert(captures[1].to_string());
        }
    });
}

fn visit_strings(tree: &ConfigValue, visit: &mut impl FnMut(&str)) {
    match tree {
        ConfigValue::String(text) => visit(text),
        ConfigValue::Sequence(items) => {
            for item in items {
                visit_strings(item, visit);
            }
        }
        ConfigValue::Mapping(entries) => {
            for value in entries.values() {
                visit_strings(value, visit);
            }
        }
        ConfigValue::Null | ConfigValue::Bool(_) | ConfigValue::Integer(_) | ConfigValue::Float(_) => {}
    }
}

/// Check every dictionary reference against the dictionary index.
pub fn validate_dictionary_refs(index: &ResourceIndex, ctx: &mut ValidationContext) {
    for resource in index.boxes() {
        let Some(config) = resource.spec.custom_config.as_ref() else {
            continue;
        };
        let mut names = Vec::new();
        collect_dictionary_refs(config, &mut names);

        for name in names {
            let dict_ref = DictionaryRef::new(resource.name.clone(), name);
            if index.has_dictionary(&dict_ref.dictionary) {
                ctx.add_valid_dictionary_ref(&resource.name, dict_ref);
            } else {
                let message = format!("Dictionary \"{}\" doesn't exist", dict_ref.dictionary);
                ctx.add_invalidating_issue(
                    &resource.name,
                    Issue::DictionaryRef {
                        kind: IssueKind::Reference,
                        content: dict_ref.content(),
                        message,
                    },
                );
            }
        }
    }
}

/// Check every secret reference against the namespace's custom secret.
///
/// A failure fetching the secret is a run-level message, not an abort.
pub fn validate_secret_refs(
    index: &ResourceIndex,
    namespace: &str,
    secrets: &dyn SecretSource,
    ctx: &mut ValidationContext,
) {
    let known_keys = match secrets.custom_secret_keys(namespace) {
        Ok(Some(keys)) => keys,
        Ok(None) => {
            ctx.report_mut().add_exception(format!(
                "Secret \"{SECRET_NAME}\" is not present in namespace: \"{namespace}\""
            ));
            return;
        }
        Err(error) => {
            ctx.report_mut()
                .add_exception(format!("Failed to fetch secret \"{SECRET_NAME}\": {error}"));
            return;
        }
    };

    for resource in index.boxes() {
        let Some(config) = resource.spec.custom_config.as_ref() else {
            continue;
        };
        let mut referenced = BTreeSet::new();
        collect_secret_keys(config, &mut referenced);

        for key in referenced {
            if !known_keys.contains(&key) {
                ctx.add_invalidating_issue(
                    &resource.name,
                    Issue::Resource {
                        kind: IssueKind::Reference,
                        name: resource.name.clone(),
                        message: format!(
                            "Value \"{key}\" from \"{SECRET_NAME}\" is not present in the cluster"
                        ),
                    },
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::resource::{BoxResource, BoxSpec};
    use crate::external::StaticSecretSource;
    use serde_json::json;

    fn box_with_config(name: &str, config: serde_json::Value) -> BoxResource {
        let mut spec = BoxSpec::default();
        spec.custom_config = Some(config.into());
        BoxResource::new(name, spec)
    }

    #[test]
    fn test_scan_finds_refs_at_depth() {
        let tree: ConfigValue = json!({
            "l1": {"l2": {"l3": {"l4": {"l5": {"codec": "${dictionary_link:fix44}"}}}}},
            "sibling": "plain string",
            "other": 42
        })
        .into();

        let mut names = Vec::new();
        collect_dictionary_refs(&tree, &mut names);
        assert_eq!(names, vec!["fix44".to_string()]);
    }

    #[test]
    fn test_scan_ignores_partial_matches() {
        // A dictionary placeholder must be the whole string value.
        let tree: ConfigValue =
            json!({"mixed": "prefix ${dictionary_link:fix44} suffix"}).into();
        let mut names = Vec::new();
        collect_dictionary_refs(&tree, &mut names);
        assert!(names.is_empty());
    }

    #[test]
    fn test_secret_keys_extracted_from_anywhere_in_string() {
        let tree: ConfigValue = json!({
            "auth": {
                "token": "${secret_value:api-token}",
                "combined": "user:${secret_value:user}/pass:${secret_path:pass-file}"
            }
        })
        .into();

        let mut keys = BTreeSet::new();
        collect_secret_keys(&tree, &mut keys);
        assert_eq!(
            keys,
            BTreeSet::from([
                "api-token".to_string(),
                "user".to_string(),
                "pass-file".to_string()
            ])
        );
    }

    #[test]
    fn test_missing_dictionary_marks_box_invalid() {
        let mut index = ResourceIndex::new();
        index.insert_box(box_with_config(
            "act",
            json!({"settings": {"auth": {"token": "${dictionary_link:missingDict}"}}}),
        ));
        let mut ctx = ValidationContext::new();

        validate_dictionary_refs(&index, &mut ctx);

        assert!(ctx.resource("act").unwrap().is_invalid());
        let issues = ctx.report().issues_for("act");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind(), IssueKind::Reference);
        assert!(issues[0].message().contains("missingDict"));
    }

    #[test]
    fn test_existing_dictionary_recorded_valid() {
        let mut index = ResourceIndex::new();
        index.insert_dictionary("fix44");
        index.insert_box(box_with_config("act", json!({"codec": "${dictionary_link:fix44}"})));
        let mut ctx = ValidationContext::new();

        validate_dictionary_refs(&index, &mut ctx);

        assert!(ctx.is_valid());
        let refs = ctx.resource("act").unwrap().valid_dictionary_refs();
        assert_eq!(refs, &[DictionaryRef::new("act", "fix44")][..]);
    }

    #[test]
    fn test_missing_secret_key_marks_box_invalid() {
        let mut index = ResourceIndex::new();
        index.insert_box(box_with_config("act", json!({"token": "${secret_value:ghost}"})));
        let mut ctx = ValidationContext::new();
        let secrets = StaticSecretSource::with_keys(["api-token"]);

        validate_secret_refs(&index, "schema-ns", &secrets, &mut ctx);

        assert!(ctx.resource("act").unwrap().is_invalid());
        assert!(ctx.report().issues_for("act")[0]
            .message()
            .contains("\"ghost\""));
    }

    #[test]
    fn test_absent_secret_is_single_run_level_error() {
        let mut index = ResourceIndex::new();
        index.insert_box(box_with_config("act", json!({"token": "${secret_value:any}"})));
        let mut ctx = ValidationContext::new();
        let secrets = StaticSecretSource::missing();

        validate_secret_refs(&index, "schema-ns", &secrets, &mut ctx);

        assert!(!ctx.is_valid());
        assert_eq!(ctx.report().exceptions().len(), 1);
        assert!(ctx.report().exceptions()[0].contains("schema-ns"));
        // The box itself is not blamed for a missing secret object.
        assert!(ctx.resource("act").is_none());
    }
}
