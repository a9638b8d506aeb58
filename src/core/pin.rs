//! Pin declarations for box resources.
//!
//! Pins are the typed endpoints of a box: MQ subscriber/publisher pins and
//! gRPC client/server pins, grouped into sections. Non-server pins may carry
//! a `linkTo` list naming the peer endpoints they are wired to; the relation
//! builder flattens those declarations into directed links.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Attribute tag marking a pin as publishing (outbound MQ traffic).
pub const ATTRIBUTE_PUBLISH: &str = "publish";

/// Attribute tag marking a pin as subscribing (inbound MQ traffic).
pub const ATTRIBUTE_SUBSCRIBE: &str = "subscribe";

/// One declared outbound wiring target: a peer box and a pin on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkToEndpoint {
    /// Name of the peer box.
    #[serde(rename = "box")]
    pub box_name: String,
    /// Name of the pin on the peer box.
    pub pin: String,
}

impl LinkToEndpoint {
    /// Create a new wiring target.
    pub fn new(box_name: impl Into<String>, pin: impl Into<String>) -> Self {
        Self {
            box_name: box_name.into(),
            pin: pin.into(),
        }
    }
}

/// An MQ pin (used for both the subscriber and the publisher section).
///
/// Attribute tags are free-form strings; the link chains interpret the
/// directional tags (`publish` / `subscribe`) and message-format tag
/// prefixes (`raw`, `parsed`, `group`, `event`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MqPin {
    /// Pin name, unique within its section.
    pub name: String,
    /// Free-form attribute tags.
    #[serde(default)]
    pub attributes: Vec<String>,
    /// Declared wiring targets. Only meaningful on subscriber pins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_to: Option<Vec<LinkToEndpoint>>,
}

/// A gRPC client pin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrpcClientPin {
    /// Pin name, unique within the client section.
    pub name: String,
    /// Free-form attribute tags.
    #[serde(default)]
    pub attributes: Vec<String>,
    /// Service class this client speaks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_class: Option<String>,
    /// Declared wiring targets (server pins on peer boxes).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_to: Option<Vec<LinkToEndpoint>>,
}

/// A gRPC server pin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrpcServerPin {
    /// Pin name, unique within the server section.
    pub name: String,
    /// Free-form attribute tags.
    #[serde(default)]
    pub attributes: Vec<String>,
    /// Service classes this server supports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_classes: Option<BTreeSet<String>>,
}

/// The MQ pin sections of a box.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MqSection {
    /// Inbound pins; links flow from the referenced peer into this box.
    #[serde(default)]
    pub subscribers: Vec<MqPin>,
    /// Outbound pins referenced by peers' subscriber links.
    #[serde(default)]
    pub publishers: Vec<MqPin>,
}

impl MqSection {
    /// Find an MQ pin by name, searching subscribers then publishers.
    pub fn pin(&self, name: &str) -> Option<&MqPin> {
        self.subscribers
            .iter()
            .chain(self.publishers.iter())
            .find(|pin| pin.name == name)
    }
}

/// The gRPC pin sections of a box.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GrpcSection {
    /// Client pins; links flow from this box to the referenced peer.
    #[serde(default)]
    pub client: Vec<GrpcClientPin>,
    /// Server pins exposed to peers' client links.
    #[serde(default)]
    pub server: Vec<GrpcServerPin>,
}

impl GrpcSection {
    /// Find a client pin by name.
    pub fn client_pin(&self, name: &str) -> Option<&GrpcClientPin> {
        self.client.iter().find(|pin| pin.name == name)
    }

    /// Find a server pin by name.
    pub fn server_pin(&self, name: &str) -> Option<&GrpcServerPin> {
        self.server.iter().find(|pin| pin.name == name)
    }
}

/// All pin sections of a box.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PinSpec {
    /// MQ subscriber/publisher sections.
    #[serde(default)]
    pub mq: MqSection,
    /// gRPC client/server sections.
    #[serde(default)]
    pub grpc: GrpcSection,
}
