//! Composable check chains for link endpoints.
//!
//! A chain is an immutable ordered list of checks. Each check receives the
//! value produced by the previous one — the value's type narrows as the
//! chain progresses (resource, then pin, then kind-specific pin) — and
//! either passes a value forward or short-circuits with a failure. Chains
//! are assembled per connection kind and endpoint role; the same chain
//! instance can be run against any number of endpoints because no check
//! holds mutable state.

use crate::core::error::CheckFailure;
use crate::core::pin::{GrpcClientPin, GrpcServerPin, MqPin};
use crate::core::resource::BoxResource;

/// Which side of the link the endpoint under validation sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Source side of the link.
    From,
    /// Sink side of the link.
    To,
}

/// Connection kind of the endpoint under validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionKind {
    /// Message-queue pin (subscriber or publisher section).
    Mq,
    /// gRPC client pin.
    GrpcClient,
    /// gRPC server pin.
    GrpcServer,
}

/// The peer endpoint a check may need to compare against.
#[derive(Debug, Clone, Copy)]
pub struct PeerRef<'a> {
    /// Peer box name (usable in messages even when the box is absent).
    pub box_name: &'a str,
    /// Peer pin name.
    pub pin_name: &'a str,
    /// The peer box resource, if it exists in the index.
    pub resource: Option<&'a BoxResource>,
}

/// Everything a check can know about the endpoint it validates.
#[derive(Debug, Clone, Copy)]
pub struct LinkContext<'a> {
    /// Name of the pin under validation.
    pub pin_name: &'a str,
    /// Side of the link this endpoint is on.
    pub direction: Direction,
    /// Connection kind of this endpoint.
    pub kind: ConnectionKind,
    /// The opposite endpoint, when the chain needs it.
    pub peer: Option<PeerRef<'a>>,
}

/// The value flowing through a chain, narrowing as checks succeed.
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    /// The endpoint's box as resolved from the index; `None` if absent.
    Resource(Option<&'a BoxResource>),
    /// An MQ pin resolved on the resource.
    MqPin(&'a MqPin),
    /// A gRPC client pin resolved on the resource.
    GrpcClient(&'a GrpcClientPin),
    /// A gRPC server pin resolved on the resource.
    GrpcServer(&'a GrpcServerPin),
}

/// A single composable check.
pub trait Check {
    /// Inspect the target; pass a (possibly narrowed) target forward or fail.
    fn check<'a>(
        &self,
        target: Target<'a>,
        ctx: &LinkContext<'a>,
    ) -> Result<Target<'a>, CheckFailure>;
}

/// An ordered chain of checks, executed until the first failure.
pub struct CheckChain {
    checks: Vec<Box<dyn Check>>,
}

impl CheckChain {
    /// Assemble a chain from its checks, in execution order.
    pub fn new(checks: Vec<Box<dyn Check>>) -> Self {
        Self { checks }
    }

    /// Run the chain over an endpoint. `Ok` means every check passed.
    pub fn run<'a>(&self, start: Target<'a>, ctx: &LinkContext<'a>) -> Result<(), CheckFailure> {
        let mut current = start;
        for check in &self.checks {
            current = check.check(current, ctx)?;
        }
        Ok(())
    }
}
