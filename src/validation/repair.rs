//! Repair: strip invalid references from resource specs.
//!
//! For every resource a run marked Invalid, the `linkTo` lists of its MQ
//! subscriber and gRPC client pins are rewritten to exactly the links that
//! passed chain validation for that resource; a pin that declared links but
//! kept none loses its list entirely. The rewritten spec gets a fresh
//! content hash so downstream consumers can detect the change. Repairing an
//! already-repaired spec is a no-op (same spec, same hash).

use crate::core::context::ValidationContext;
use crate::core::pin::LinkToEndpoint;
use crate::core::resource::{BoxResource, BoxSpec};
use anyhow::Result;
use indexmap::IndexMap;
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Rewrite every invalid resource's pins to its confirmed-valid link set and
/// recompute its source hash.
pub fn repair_invalid_resources(
    ctx: &ValidationContext,
    boxes: &mut IndexMap<String, BoxResource>,
) -> Result<()> {
    for (name, resource) in boxes.iter_mut() {
        let Some(resource_ctx) = ctx.resource(name) else {
            continue;
        };
        if !resource_ctx.is_invalid() {
            continue;
        }

        let mut valid_mq: HashMap<&str, Vec<LinkToEndpoint>> = HashMap::new();
        for link in resource_ctx.valid_mq_links() {
            valid_mq
                .entry(link.to.pin.as_str())
                .or_default()
                .push(link.mq_link_to());
        }
        for pin in &mut resource.spec.pins.mq.subscribers {
            if pin.link_to.is_some() {
                pin.link_to = valid_mq.remove(pin.name.as_str());
            }
        }

        let mut valid_grpc: HashMap<&str, Vec<LinkToEndpoint>> = HashMap::new();
        for link in resource_ctx.valid_grpc_links() {
            valid_grpc
                .entry(link.from.pin.as_str())
                .or_default()
                .push(link.grpc_link_to());
        }
        for pin in &mut resource.spec.pins.grpc.client {
            if pin.link_to.is_some() {
                pin.link_to = valid_grpc.remove(pin.name.as_str());
            }
        }

        resource.source_hash = Some(spec_hash(&resource.spec)?);
    }

    Ok(())
}

/// SHA-256 over the serialized spec, hex-encoded.
pub fn spec_hash(spec: &BoxSpec) -> Result<String> {
    let serialized = serde_json::to_string(spec)?;
    let mut hasher = Sha256::new();
    hasher.update(serialized.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pin::{GrpcClientPin, MqPin};
    use crate::graph::link::{Endpoint, Link};

    fn subscriber(name: &str, targets: &[(&str, &str)]) -> MqPin {
        MqPin {
            name: name.to_string(),
            attributes: Vec::new(),
            link_to: Some(
                targets
                    .iter()
                    .map(|(box_name, pin)| LinkToEndpoint::new(*box_name, *pin))
                    .collect(),
            ),
        }
    }

    fn boxes_with(resource: BoxResource) -> IndexMap<String, BoxResource> {
        let mut boxes = IndexMap::new();
        boxes.insert(resource.name.clone(), resource);
        boxes
    }

    #[test]
    fn test_valid_resources_left_untouched() {
        let mut spec = BoxSpec::default();
        spec.pins.mq.subscribers = vec![subscriber("in", &[("ghost", "out")])];
        let mut boxes = boxes_with(BoxResource::new("act", spec.clone()));

        // Nothing marked invalid: the spec keeps its declared links.
        let ctx = ValidationContext::new();
        repair_invalid_resources(&ctx, &mut boxes).unwrap();

        assert_eq!(boxes["act"].spec, spec);
        assert!(boxes["act"].source_hash.is_none());
    }

    #[test]
    fn test_invalid_resource_keeps_only_confirmed_links() {
        let mut spec = BoxSpec::default();
        spec.pins.mq.subscribers = vec![
            subscriber("in", &[("codec", "out"), ("ghost", "out")]),
            subscriber("dead", &[("ghost", "out2")]),
        ];
        spec.pins.grpc.client = vec![GrpcClientPin {
            name: "c1".to_string(),
            link_to: Some(vec![LinkToEndpoint::new("check1", "s1")]),
            ..Default::default()
        }];
        let mut boxes = boxes_with(BoxResource::new("act", spec));

        let mut ctx = ValidationContext::new();
        ctx.set_invalid("act");
        ctx.add_valid_mq_link(
            "act",
            Link::new("act", Endpoint::new("codec", "out"), Endpoint::new("act", "in")),
        );
        ctx.add_valid_grpc_link(
            "act",
            Link::new("act", Endpoint::new("act", "c1"), Endpoint::new("check1", "s1")),
        );

        repair_invalid_resources(&ctx, &mut boxes).unwrap();

        let act = &boxes["act"];
        assert_eq!(
            act.spec.pins.mq.subscribers[0].link_to.as_deref(),
            Some(&[LinkToEndpoint::new("codec", "out")][..])
        );
        // The pin that kept no valid links loses its list.
        assert!(act.spec.pins.mq.subscribers[1].link_to.is_none());
        assert_eq!(
            act.spec.pins.grpc.client[0].link_to.as_deref(),
            Some(&[LinkToEndpoint::new("check1", "s1")][..])
        );
        assert!(act.source_hash.is_some());
    }

    #[test]
    fn test_repair_is_idempotent() {
        let mut spec = BoxSpec::default();
        spec.pins.mq.subscribers = vec![subscriber("in", &[("codec", "out"), ("ghost", "out")])];
        let mut boxes = boxes_with(BoxResource::new("act", spec));

        let mut ctx = ValidationContext::new();
        ctx.set_invalid("act");
        ctx.add_valid_mq_link(
            "act",
            Link::new("act", Endpoint::new("codec", "out"), Endpoint::new("act", "in")),
        );

        repair_invalid_resources(&ctx, &mut boxes).unwrap();
        let first_spec = boxes["act"].spec.clone();
        let first_hash = boxes["act"].source_hash.clone();

        repair_invalid_resources(&ctx, &mut boxes).unwrap();
        assert_eq!(boxes["act"].spec, first_spec);
        assert_eq!(boxes["act"].source_hash, first_hash);
    }
}
