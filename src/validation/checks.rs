//! Concrete chain checks.
//!
//! Each check certifies one property of a link endpoint. The MQ chains run
//! the full set (existence, direction, message-format compatibility); the
//! gRPC chains run existence plus the service-class check on the client
//! side. See [`crate::validation::links`] for the chain assemblies.

use crate::core::error::{CheckFailure, IssueKind};
use crate::core::pin::{GrpcServerPin, MqPin, ATTRIBUTE_PUBLISH, ATTRIBUTE_SUBSCRIBE};
use crate::core::resource::BoxResource;
use crate::validation::chain::{Check, ConnectionKind, Direction, LinkContext, PeerRef, Target};

fn unexpected(expected: &str) -> CheckFailure {
    CheckFailure::new(
        IssueKind::Unexpected,
        format!("Internal: expected {expected} at this point of the chain"),
    )
}

/// Fails when the endpoint's box is absent from the index.
pub struct ResourceExists;

impl Check for ResourceExists {
    fn check<'a>(
        &self,
        target: Target<'a>,
        _ctx: &LinkContext<'a>,
    ) -> Result<Target<'a>, CheckFailure> {
        match target {
            Target::Resource(Some(resource)) => Ok(Target::Resource(Some(resource))),
            Target::Resource(None) => Err(CheckFailure::new(
                IssueKind::Structural,
                "Resource doesn't exist",
            )),
            _ => Err(unexpected("a resource")),
        }
    }
}

/// Resolves the named pin on the resource, narrowing the target to the pin
/// matching the endpoint's connection kind.
pub struct PinExists;

impl Check for PinExists {
    fn check<'a>(
        &self,
        target: Target<'a>,
        ctx: &LinkContext<'a>,
    ) -> Result<Target<'a>, CheckFailure> {
        let resource = match target {
            Target::Resource(Some(resource)) => resource,
            _ => return Err(unexpected("a resource")),
        };

        let pins = &resource.spec.pins;
        let found = match ctx.kind {
            ConnectionKind::Mq => pins.mq.pin(ctx.pin_name).map(Target::MqPin),
            ConnectionKind::GrpcClient => {
                pins.grpc.client_pin(ctx.pin_name).map(Target::GrpcClient)
            }
            ConnectionKind::GrpcServer => {
                pins.grpc.server_pin(ctx.pin_name).map(Target::GrpcServer)
            }
        };

        found.ok_or_else(|| {
            CheckFailure::new(
                IssueKind::Structural,
                format!("Pin: [{}] does not exist", ctx.pin_name),
            )
        })
    }
}

/// Rejects pins tagged for the opposite traffic direction: a sink-side pin
/// must not carry `publish`, a source-side pin must not carry `subscribe`.
pub struct DirectionalAttr;

impl Check for DirectionalAttr {
    fn check<'a>(
        &self,
        target: Target<'a>,
        ctx: &LinkContext<'a>,
    ) -> Result<Target<'a>, CheckFailure> {
        let pin = match target {
            Target::MqPin(pin) => pin,
            _ => return Err(unexpected("an MQ pin")),
        };

        let forbidden = match ctx.direction {
            Direction::To => ATTRIBUTE_PUBLISH,
            Direction::From => ATTRIBUTE_SUBSCRIBE,
        };
        if pin.attributes.iter().any(|attr| attr == forbidden) {
            return Err(CheckFailure::new(
                IssueKind::Direction,
                format!(
                    "Invalid pin: \"{}\". Must not contain attribute: [{}]",
                    pin.name, forbidden
                ),
            ));
        }

        Ok(Target::MqPin(pin))
    }
}

/// Parameterized message-format attribute check.
///
/// For pins carrying a tag with the main prefix: exactly one such tag may be
/// present, no contradicting-prefix tag may sit on the same pin, and the
/// linked peer pin must carry either the exact tag or a tag with one of the
/// cross-compatible prefixes.
pub struct FormatAttr {
    main_prefix: &'static str,
    contradicting_prefixes: &'static [&'static str],
    compatible_prefixes: &'static [&'static str],
}

impl FormatAttr {
    /// Raw-format instance: contradicts parsed/event, `group` is compatible.
    pub fn raw() -> Self {
        Self {
            main_prefix: "raw",
            contradicting_prefixes: &["parsed", "event"],
            compatible_prefixes: &["group"],
        }
    }

    /// Parsed-format instance: contradicts raw/event, `group` is compatible.
    pub fn parsed() -> Self {
        Self {
            main_prefix: "parsed",
            contradicting_prefixes: &["raw", "event"],
            compatible_prefixes: &["group"],
        }
    }

    /// Group-format instance: compatible with both raw and parsed.
    pub fn group() -> Self {
        Self {
            main_prefix: "group",
            contradicting_prefixes: &["event"],
            compatible_prefixes: &["raw", "parsed"],
        }
    }

    fn contradicting_attributes<'p>(&self, pin: &'p MqPin) -> Vec<&'p str> {
        pin.attributes
            .iter()
            .map(String::as_str)
            .filter(|attr| {
                self.contradicting_prefixes
                    .iter()
                    .any(|prefix| attr.starts_with(prefix))
            })
            .collect()
    }

    fn peer_pin_matches(&self, peer_pin: &MqPin, exact_attribute: &str) -> bool {
        peer_pin.attributes.iter().any(|attr| {
            attr == exact_attribute
                || self
                    .compatible_prefixes
                    .iter()
                    .any(|prefix| attr.starts_with(prefix))
        })
    }
}

impl Check for FormatAttr {
    fn check<'a>(
        &self,
        target: Target<'a>,
        ctx: &LinkContext<'a>,
    ) -> Result<Target<'a>, CheckFailure> {
        let pin = match target {
            Target::MqPin(pin) => pin,
            _ => return Err(unexpected("an MQ pin")),
        };

        let tagged: Vec<&str> = pin
            .attributes
            .iter()
            .map(String::as_str)
            .filter(|attr| attr.starts_with(self.main_prefix))
            .collect();

        // No tag with this prefix: nothing to certify here.
        if tagged.is_empty() {
            return Ok(Target::MqPin(pin));
        }

        if tagged.len() > 1 {
            return Err(CheckFailure::new(
                IssueKind::Format,
                format!(
                    "Invalid pin: \"{}\". Detected multiple attributes with prefix: [{}]",
                    pin.name, self.main_prefix
                ),
            ));
        }
        let exact_attribute = tagged[0];

        let contradicting = self.contradicting_attributes(pin);
        if !contradicting.is_empty() {
            return Err(CheckFailure::new(
                IssueKind::Format,
                format!(
                    "Invalid pin: \"{}\". [{}] are contradicting with: [{}]",
                    pin.name,
                    contradicting.join(", "),
                    self.main_prefix
                ),
            ));
        }

        let peer = ctx.peer.ok_or_else(|| unexpected("a linked endpoint"))?;
        let peer_resource = peer.resource.ok_or_else(|| {
            CheckFailure::new(
                IssueKind::Structural,
                format!("Linked resource: [{}] does not exist", peer.box_name),
            )
        })?;
        let peer_pin = peer_resource
            .spec
            .pins
            .mq
            .pin(peer.pin_name)
            .ok_or_else(|| {
                CheckFailure::new(
                    IssueKind::Structural,
                    format!(
                        "Linked pin: [{}] on resource: [{}] does not exist",
                        peer.pin_name, peer.box_name
                    ),
                )
            })?;

        if self.peer_pin_matches(peer_pin, exact_attribute) {
            Ok(Target::MqPin(pin))
        } else {
            Err(CheckFailure::new(
                IssueKind::Format,
                format!(
                    "Linked pin: [{}] on resource: [{}] does not contain [{}] attribute",
                    peer.pin_name, peer.box_name, exact_attribute
                ),
            ))
        }
    }
}

/// Certifies that a gRPC client's declared service class is supported by the
/// linked server pin. A no-op on the server side of the link.
pub struct ServiceClass;

impl ServiceClass {
    fn server_pin<'a>(peer: &PeerRef<'a>) -> Result<&'a GrpcServerPin, CheckFailure> {
        let resource: &'a BoxResource = peer.resource.ok_or_else(|| {
            CheckFailure::new(
                IssueKind::Structural,
                format!("Linked resource: [{}] does not exist", peer.box_name),
            )
        })?;
        resource
            .spec
            .pins
            .grpc
            .server_pin(peer.pin_name)
            .ok_or_else(|| {
                CheckFailure::new(
                    IssueKind::Structural,
                    format!(
                        "Linked pin: [{}] does not exist in server section",
                        peer.pin_name
                    ),
                )
            })
    }
}

impl Check for ServiceClass {
    fn check<'a>(
        &self,
        target: Target<'a>,
        ctx: &LinkContext<'a>,
    ) -> Result<Target<'a>, CheckFailure> {
        if ctx.kind == ConnectionKind::GrpcServer {
            return Ok(target);
        }

        let pin = match target {
            Target::GrpcClient(pin) => pin,
            _ => return Err(unexpected("a gRPC client pin")),
        };

        let peer = ctx.peer.ok_or_else(|| unexpected("a linked endpoint"))?;
        let server_pin = Self::server_pin(&peer)?;

        let supported = match &server_pin.service_classes {
            Some(classes) if !classes.is_empty() => classes,
            _ => {
                return Err(CheckFailure::new(
                    IssueKind::ServiceClass,
                    format!(
                        "Linked resource: [{}] is invalid. Linked pin: [{}] does not contain service classes",
                        peer.box_name, peer.pin_name
                    ),
                ))
            }
        };

        let declared = pin.service_class.as_deref().unwrap_or_default();
        if supported.contains(declared) {
            Ok(Target::GrpcClient(pin))
        } else {
            let listed = supported
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            Err(CheckFailure::new(
                IssueKind::ServiceClass,
                format!(
                    "Provided service class: [{declared}] is not supported by the server: [{}]. Supported service classes are: [{listed}]",
                    peer.box_name
                ),
            ))
        }
    }
}
