//! Link types for the topology graph.

use crate::core::pin::LinkToEndpoint;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An endpoint of a link (box + pin).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    /// The box name.
    pub box_name: String,
    /// The pin name on that box.
    pub pin: String,
}

impl Endpoint {
    /// Create a new endpoint.
    pub fn new(box_name: impl Into<String>, pin: impl Into<String>) -> Self {
        Self {
            box_name: box_name.into(),
            pin: pin.into(),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.box_name, self.pin)
    }
}

/// A directed wiring between two pins on two boxes.
///
/// Links are derived, never stored: they are the flattened view of the
/// `linkTo` declarations found on subscriber and client pins. The `owner` is
/// the box whose spec declared the wiring — errors are attributed to it and
/// repair rewrites its pins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Box whose spec declared this link.
    pub owner: String,
    /// Source endpoint.
    pub from: Endpoint,
    /// Sink endpoint.
    pub to: Endpoint,
}

impl Link {
    /// Create a link owned by the declaring box.
    pub fn new(owner: impl Into<String>, from: Endpoint, to: Endpoint) -> Self {
        Self {
            owner: owner.into(),
            from,
            to,
        }
    }

    /// Printable content key, used both for de-duplication identity and for
    /// diagnostics.
    pub fn content(&self) -> String {
        format!("FROM {} TO {}", self.from, self.to)
    }

    /// The `linkTo` entry a repaired MQ subscriber pin keeps for this link.
    pub fn mq_link_to(&self) -> LinkToEndpoint {
        LinkToEndpoint::new(self.from.box_name.clone(), self.from.pin.clone())
    }

    /// The `linkTo` entry a repaired gRPC client pin keeps for this link.
    pub fn grpc_link_to(&self) -> LinkToEndpoint {
        LinkToEndpoint::new(self.to.box_name.clone(), self.to.pin.clone())
    }
}

/// A dictionary reference extracted from a box's configuration tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryRef {
    /// Box whose configuration referenced the dictionary.
    pub box_name: String,
    /// Referenced dictionary name.
    pub dictionary: String,
}

impl DictionaryRef {
    /// Create a reference.
    pub fn new(box_name: impl Into<String>, dictionary: impl Into<String>) -> Self {
        Self {
            box_name: box_name.into(),
            dictionary: dictionary.into(),
        }
    }

    /// Printable content key for diagnostics.
    pub fn content(&self) -> String {
        format!("FROM {} TO {}", self.box_name, self.dictionary)
    }
}
