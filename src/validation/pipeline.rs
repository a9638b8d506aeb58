//! The validation pipeline.
//!
//! One call runs every pass over the index in a fixed order and returns the
//! accumulator. The run is single-threaded, deterministic for a given input,
//! and never unwinds: per-box problems are isolated to the owning box, and
//! collaborator failures become run-level report messages.

use crate::core::context::ValidationContext;
use crate::core::resource::{ResourceIndex, SettingsResource};
use crate::external::{SecretSource, StorageClient};
use crate::graph::{dedup, relation};
use crate::validation::links::LinkValidator;
use crate::validation::{books, conflicts, placeholders};
use log::debug;

/// Validate a schema's topology and return the filled accumulator.
///
/// `index` is taken mutably because pin normalization rewrites duplicate pin
/// declarations in place before any link resolves against them; the same
/// normalized index is what repair operates on afterwards.
pub fn validate(
    schema_name: &str,
    namespace_prefix: &str,
    index: &mut ResourceIndex,
    settings: &SettingsResource,
    secrets: &dyn SecretSource,
    storage: &dyn StorageClient,
) -> ValidationContext {
    let mut ctx = ValidationContext::new();

    conflicts::normalize_duplicate_pins(index);

    let mut graph = relation::build_relations(index);
    debug!(
        "schema {schema_name}: {} mq / {} grpc links arranged",
        graph.mq().len(),
        graph.grpc().len()
    );
    dedup::remove_duplicate_links(&mut graph, &mut ctx);
    dedup::remove_self_links(&mut graph, &mut ctx);

    let link_validator = LinkValidator::new(index);
    for link in graph.mq() {
        link_validator.validate_mq_link(link, &mut ctx);
    }
    for link in graph.grpc() {
        link_validator.validate_grpc_link(link, &mut ctx);
    }

    placeholders::validate_dictionary_refs(index, &mut ctx);
    conflicts::detect_url_path_conflicts(index, &mut ctx);

    let namespace = format!("{namespace_prefix}{schema_name}");
    placeholders::validate_secret_refs(index, &namespace, secrets, &mut ctx);
    books::validate_books(index, settings, storage, &mut ctx);

    debug!(
        "schema {schema_name}: validation finished, valid = {}",
        ctx.is_valid()
    );
    ctx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::IssueKind;
    use crate::core::pin::{GrpcClientPin, GrpcServerPin, LinkToEndpoint, MqPin};
    use crate::core::resource::{BoxResource, BoxSpec};
    use crate::external::{StaticSecretSource, StaticStorageClient};
    use crate::validation::repair::repair_invalid_resources;
    use serde_json::json;
    use std::collections::BTreeSet;

    fn settings() -> SettingsResource {
        SettingsResource {
            name: "schema-settings".to_string(),
            keyspace: "schema".to_string(),
            default_book: None,
        }
    }

    fn storage() -> StaticStorageClient {
        StaticStorageClient::empty().with_keyspace("schema", ["book1"])
    }

    fn run(index: &mut ResourceIndex) -> ValidationContext {
        let _ = env_logger::builder().is_test(true).try_init();
        validate(
            "schema",
            "ns-",
            index,
            &settings(),
            &StaticSecretSource::with_keys(["api-token"]),
            &storage(),
        )
    }

    fn grpc_pair(client_class: &str, server_classes: &[&str]) -> ResourceIndex {
        let mut index = ResourceIndex::new();

        let mut act_spec = BoxSpec::default();
        act_spec.pins.grpc.client = vec![GrpcClientPin {
            name: "c1".to_string(),
            service_class: Some(client_class.to_string()),
            link_to: Some(vec![LinkToEndpoint::new("check1", "s1")]),
            ..Default::default()
        }];
        index.insert_box(BoxResource::new("act", act_spec));

        let mut check_spec = BoxSpec::default();
        check_spec.pins.grpc.server = vec![GrpcServerPin {
            name: "s1".to_string(),
            attributes: Vec::new(),
            service_classes: Some(server_classes.iter().map(ToString::to_string).collect()),
        }];
        index.insert_box(BoxResource::new("check1", check_spec));

        index
    }

    #[test]
    fn test_clean_grpc_topology_stays_valid() {
        let mut index = grpc_pair("X", &["X"]);
        let ctx = run(&mut index);

        assert!(ctx.is_valid());
        assert!(ctx.invalid_resources().is_empty());
        assert_eq!(ctx.resource("act").unwrap().valid_grpc_links().len(), 1);
    }

    #[test]
    fn test_unsupported_service_class_invalidates_owner() {
        let mut index = grpc_pair("Y", &["X"]);
        let ctx = run(&mut index);

        assert_eq!(ctx.invalid_resources(), BTreeSet::from(["act"]));
        let issues = ctx.report().issues_for("act");
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message().contains("[Y] is not supported"));
        assert!(issues[0].message().contains("[X]"));
    }

    #[test]
    fn test_self_link_and_duplicate_produce_one_error_each() {
        let mut index = ResourceIndex::new();

        let mut a_spec = BoxSpec::default();
        a_spec.pins.mq.subscribers = vec![MqPin {
            name: "sub1".to_string(),
            attributes: Vec::new(),
            link_to: Some(vec![
                // Self-link back into the same box.
                LinkToEndpoint::new("a", "pub1"),
                // Duplicate of an otherwise valid link.
                LinkToEndpoint::new("b", "pub2"),
                LinkToEndpoint::new("b", "pub2"),
            ]),
        }];
        a_spec.pins.mq.publishers = vec![MqPin {
            name: "pub1".to_string(),
            ..Default::default()
        }];
        index.insert_box(BoxResource::new("a", a_spec));

        let mut b_spec = BoxSpec::default();
        b_spec.pins.mq.publishers = vec![MqPin {
            name: "pub2".to_string(),
            ..Default::default()
        }];
        index.insert_box(BoxResource::new("b", b_spec));

        let ctx = run(&mut index);

        let kinds: Vec<IssueKind> = ctx
            .report()
            .issues_for("a")
            .iter()
            .map(|issue| issue.kind())
            .collect();
        assert_eq!(kinds.len(), 2);
        assert!(kinds.contains(&IssueKind::Duplicate));
        assert!(kinds.contains(&IssueKind::SelfLink));

        // The surviving link was still validated and recorded.
        assert_eq!(ctx.resource("a").unwrap().valid_mq_links().len(), 1);
    }

    #[test]
    fn test_missing_dictionary_reference() {
        let mut index = ResourceIndex::new();
        let mut spec = BoxSpec::default();
        spec.custom_config =
            Some(json!({"settings": {"auth": {"token": "${dictionary_link:missingDict}"}}}).into());
        index.insert_box(BoxResource::new("a", spec));

        let ctx = run(&mut index);

        assert_eq!(ctx.invalid_resources(), BTreeSet::from(["a"]));
        assert!(ctx.report().issues_for("a")[0]
            .message()
            .contains("missingDict"));
    }

    #[test]
    fn test_url_conflict_between_two_boxes() {
        let mut index = ResourceIndex::new();
        for name in ["a", "b"] {
            let mut spec = BoxSpec::default();
            spec.extended_settings =
                Some(json!({"service": {"ingress": {"urlPaths": ["/v1/report"]}}}).into());
            index.insert_box(BoxResource::new(name, spec));
        }

        let ctx = run(&mut index);

        let conflict_messages: Vec<&str> = ctx
            .report()
            .iter()
            .flat_map(|(_, issues)| issues)
            .filter(|issue| issue.kind() == IssueKind::Conflict)
            .map(|issue| issue.message())
            .collect();
        assert_eq!(conflict_messages.len(), 1);
        assert!(conflict_messages[0].contains("/v1/report"));
    }

    #[test]
    fn test_end_to_end_repair_strips_invalid_links() {
        let mut index = ResourceIndex::new();

        let mut act_spec = BoxSpec::default();
        act_spec.pins.mq.subscribers = vec![MqPin {
            name: "in".to_string(),
            attributes: Vec::new(),
            link_to: Some(vec![
                LinkToEndpoint::new("codec", "out"),
                LinkToEndpoint::new("ghost", "out"),
            ]),
        }];
        index.insert_box(BoxResource::new("act", act_spec));

        let mut codec_spec = BoxSpec::default();
        codec_spec.pins.mq.publishers = vec![MqPin {
            name: "out".to_string(),
            ..Default::default()
        }];
        index.insert_box(BoxResource::new("codec", codec_spec));

        let ctx = run(&mut index);
        assert_eq!(ctx.invalid_resources(), BTreeSet::from(["act"]));

        repair_invalid_resources(&ctx, index.boxes_mut()).unwrap();

        let act = index.get_box("act").unwrap();
        assert_eq!(
            act.spec.pins.mq.subscribers[0].link_to.as_deref(),
            Some(&[LinkToEndpoint::new("codec", "out")][..])
        );
        assert!(act.source_hash.is_some());
    }

    #[test]
    fn test_duplicate_pins_normalized_before_linking() {
        let mut index = ResourceIndex::new();

        let mut act_spec = BoxSpec::default();
        act_spec.pins.mq.subscribers = vec![
            MqPin {
                name: "in".to_string(),
                attributes: Vec::new(),
                link_to: Some(vec![LinkToEndpoint::new("codec", "out")]),
            },
            // Later duplicate is dropped, so its bogus link never surfaces.
            MqPin {
                name: "in".to_string(),
                attributes: Vec::new(),
                link_to: Some(vec![LinkToEndpoint::new("ghost", "out")]),
            },
        ];
        index.insert_box(BoxResource::new("act", act_spec));

        let mut codec_spec = BoxSpec::default();
        codec_spec.pins.mq.publishers = vec![MqPin {
            name: "out".to_string(),
            ..Default::default()
        }];
        index.insert_box(BoxResource::new("codec", codec_spec));

        let ctx = run(&mut index);

        assert!(ctx.is_valid());
        assert_eq!(ctx.resource("act").unwrap().valid_mq_links().len(), 1);
    }
}
