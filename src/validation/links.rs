//! Per-link validation: chain assembly and the endpoint driver.
//!
//! One chain pair exists per connection kind — a "from" chain and a "to"
//! chain, independently instantiated. Validating a link runs both endpoint
//! chains; the link joins the confirmed-valid set of its owning resource
//! only when both sides pass, and a failure on either side marks the owner
//! Invalid with a message quoting the failed endpoint.

use crate::core::context::ValidationContext;
use crate::core::error::{CheckFailure, Issue};
use crate::core::resource::ResourceIndex;
use crate::graph::link::Link;
use crate::validation::chain::{
    CheckChain, ConnectionKind, Direction, LinkContext, PeerRef, Target,
};
use crate::validation::checks::{
    DirectionalAttr, FormatAttr, PinExists, ResourceExists, ServiceClass,
};

fn mq_chain() -> CheckChain {
    CheckChain::new(vec![
        Box::new(ResourceExists),
        Box::new(PinExists),
        Box::new(DirectionalAttr),
        Box::new(FormatAttr::raw()),
        Box::new(FormatAttr::parsed()),
        Box::new(FormatAttr::group()),
    ])
}

fn grpc_from_chain() -> CheckChain {
    CheckChain::new(vec![
        Box::new(ResourceExists),
        Box::new(PinExists),
        Box::new(ServiceClass),
    ])
}

fn grpc_to_chain() -> CheckChain {
    CheckChain::new(vec![Box::new(ResourceExists), Box::new(PinExists)])
}

/// Validates links against the resource index through the assembled chains.
pub struct LinkValidator<'a> {
    index: &'a ResourceIndex,
    mq_from: CheckChain,
    mq_to: CheckChain,
    grpc_from: CheckChain,
    grpc_to: CheckChain,
}

impl<'a> LinkValidator<'a> {
    /// Assemble the chains for one validation run.
    pub fn new(index: &'a ResourceIndex) -> Self {
        Self {
            index,
            mq_from: mq_chain(),
            mq_to: mq_chain(),
            grpc_from: grpc_from_chain(),
            grpc_to: grpc_to_chain(),
        }
    }

    /// Validate one MQ link (peer publisher -> owning subscriber).
    pub fn validate_mq_link(&self, link: &Link, ctx: &mut ValidationContext) {
        let from_resource = self.index.get_box(&link.from.box_name);
        let to_resource = self.index.get_box(&link.to.box_name);

        let from_ctx = LinkContext {
            pin_name: &link.from.pin,
            direction: Direction::From,
            kind: ConnectionKind::Mq,
            peer: Some(PeerRef {
                box_name: &link.to.box_name,
                pin_name: &link.to.pin,
                resource: to_resource,
            }),
        };
        let to_ctx = LinkContext {
            pin_name: &link.to.pin,
            direction: Direction::To,
            kind: ConnectionKind::Mq,
            peer: Some(PeerRef {
                box_name: &link.from.box_name,
                pin_name: &link.from.pin,
                resource: from_resource,
            }),
        };

        let from_result = self.mq_from.run(Target::Resource(from_resource), &from_ctx);
        let to_result = self.mq_to.run(Target::Resource(to_resource), &to_ctx);

        if from_result.is_ok() && to_result.is_ok() {
            ctx.add_valid_mq_link(&link.owner, link.clone());
        } else {
            record_endpoint_failures(link, from_result, to_result, ctx);
        }
    }

    /// Validate one gRPC link (owning client -> peer server).
    pub fn validate_grpc_link(&self, link: &Link, ctx: &mut ValidationContext) {
        let from_resource = self.index.get_box(&link.from.box_name);
        let to_resource = self.index.get_box(&link.to.box_name);

        let from_ctx = LinkContext {
            pin_name: &link.from.pin,
            direction: Direction::From,
            kind: ConnectionKind::GrpcClient,
            peer: Some(PeerRef {
                box_name: &link.to.box_name,
                pin_name: &link.to.pin,
                resource: to_resource,
            }),
        };
        // The server side needs no view of its caller.
        let to_ctx = LinkContext {
            pin_name: &link.to.pin,
            direction: Direction::To,
            kind: ConnectionKind::GrpcServer,
            peer: None,
        };

        let from_result = self.grpc_from.run(Target::Resource(from_resource), &from_ctx);
        let to_result = self.grpc_to.run(Target::Resource(to_resource), &to_ctx);

        if from_result.is_ok() && to_result.is_ok() {
            ctx.add_valid_grpc_link(&link.owner, link.clone());
        } else {
            record_endpoint_failures(link, from_result, to_result, ctx);
        }
    }
}

fn record_endpoint_failures(
    link: &Link,
    from_result: Result<(), CheckFailure>,
    to_result: Result<(), CheckFailure>,
    ctx: &mut ValidationContext,
) {
    for (endpoint, result) in [(&link.from, from_result), (&link.to, to_result)] {
        if let Err(failure) = result {
            ctx.add_invalidating_issue(
                &link.owner,
                Issue::Link {
                    kind: failure.kind,
                    content: link.content(),
                    message: format!(
                        "Endpoint {endpoint}: {}. Link will be ignored",
                        failure.message
                    ),
                },
            );
        }
    }
}
