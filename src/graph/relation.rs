//! Relation building: flattening pin declarations into the link graph.
//!
//! Every box declares its wiring locally, on its own pins. Validation wants
//! the opposite view: one flat list of directed links per connection kind.
//! Direction is fixed by pin kind — a subscriber pin is a sink (the link
//! flows from the referenced peer into the declaring box), a client pin is a
//! source (the link flows from the declaring box to the referenced peer).

use crate::core::resource::ResourceIndex;
use crate::graph::link::{Endpoint, Link};

/// The flattened link lists of a topology, one per connection kind.
#[derive(Debug, Clone, Default)]
pub struct LinkGraph {
    mq: Vec<Link>,
    grpc: Vec<Link>,
}

impl LinkGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// MQ links.
    pub fn mq(&self) -> &[Link] {
        &self.mq
    }

    /// gRPC links.
    pub fn grpc(&self) -> &[Link] {
        &self.grpc
    }

    /// Replace the MQ list (used by the elimination passes).
    pub fn set_mq(&mut self, links: Vec<Link>) {
        self.mq = links;
    }

    /// Replace the gRPC list (used by the elimination passes).
    pub fn set_grpc(&mut self, links: Vec<Link>) {
        self.grpc = links;
    }

    /// Take the MQ list out, leaving it empty.
    pub fn take_mq(&mut self) -> Vec<Link> {
        std::mem::take(&mut self.mq)
    }

    /// Take the gRPC list out, leaving it empty.
    pub fn take_grpc(&mut self) -> Vec<Link> {
        std::mem::take(&mut self.grpc)
    }
}

/// Scan every box's outbound pin declarations and flatten them into a
/// [`LinkGraph`].
///
/// Missing `linkTo` lists are treated as empty, not as an error.
pub fn build_relations(index: &ResourceIndex) -> LinkGraph {
    let mut graph = LinkGraph::new();

    for resource in index.boxes() {
        let box_name = &resource.name;

        for subscriber in &resource.spec.pins.mq.subscribers {
            for target in subscriber.link_to.as_deref().unwrap_or(&[]) {
                graph.mq.push(Link::new(
                    box_name.clone(),
                    Endpoint::new(target.box_name.clone(), target.pin.clone()),
                    Endpoint::new(box_name.clone(), subscriber.name.clone()),
                ));
            }
        }

        for client in &resource.spec.pins.grpc.client {
            for target in client.link_to.as_deref().unwrap_or(&[]) {
                graph.grpc.push(Link::new(
                    box_name.clone(),
                    Endpoint::new(box_name.clone(), client.name.clone()),
                    Endpoint::new(target.box_name.clone(), target.pin.clone()),
                ));
            }
        }
    }

    graph
}
