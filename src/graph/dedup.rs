//! Duplicate and self-link elimination over the flattened link lists.
//!
//! Both passes are total: they never fail, and their output lists are
//! subsets of their input lists. Every removal emits one diagnostic
//! attributed to the owning resource.

use crate::core::context::ValidationContext;
use crate::core::error::{Issue, IssueKind};
use crate::graph::link::Link;
use crate::graph::relation::LinkGraph;
use std::collections::HashSet;

/// Drop links whose content key was already seen; first occurrence wins.
pub fn remove_duplicate_links(graph: &mut LinkGraph, ctx: &mut ValidationContext) {
    let mq = distinct_links(graph.take_mq(), ctx);
    graph.set_mq(mq);
    let grpc = distinct_links(graph.take_grpc(), ctx);
    graph.set_grpc(grpc);
}

/// Drop links whose endpoints sit on the same box.
pub fn remove_self_links(graph: &mut LinkGraph, ctx: &mut ValidationContext) {
    let mq = differing_endpoints(graph.take_mq(), ctx);
    graph.set_mq(mq);
    let grpc = differing_endpoints(graph.take_grpc(), ctx);
    graph.set_grpc(grpc);
}

fn distinct_links(links: Vec<Link>, ctx: &mut ValidationContext) -> Vec<Link> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut kept = Vec::with_capacity(links.len());

    for link in links {
        if seen.insert(link.content()) {
            kept.push(link);
        } else {
            ctx.add_issue(
                &link.owner,
                Issue::Link {
                    kind: IssueKind::Duplicate,
                    content: link.content(),
                    message: "Link is the same as other link(s). Ignoring".to_string(),
                },
            );
        }
    }

    kept
}

fn differing_endpoints(links: Vec<Link>, ctx: &mut ValidationContext) -> Vec<Link> {
    let mut kept = Vec::with_capacity(links.len());

    for link in links {
        if link.from.box_name == link.to.box_name {
            ctx.add_issue(
                &link.owner,
                Issue::Link {
                    kind: IssueKind::SelfLink,
                    content: link.content(),
                    message: "\"from\" box name cannot be the same as \"to\" box name. Ignoring"
                        .to_string(),
                },
            );
        } else {
            kept.push(link);
        }
    }

    kept
}
