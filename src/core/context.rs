//! Validation accumulator.
//!
//! One [`ValidationContext`] is owned by the orchestrating pipeline for the
//! duration of a run and threaded by mutable reference through the passes;
//! no other component keeps a long-lived handle on it. It must not be reused
//! across runs.

use crate::core::error::{Issue, Report};
use crate::graph::link::{DictionaryRef, Link};
use indexmap::IndexMap;
use std::collections::BTreeSet;

/// Validity of a single resource. Monotonic: once Invalid, stays Invalid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValidationStatus {
    /// No failed check touched this resource yet.
    #[default]
    Valid,
    /// At least one check failed for this resource.
    Invalid,
}

/// Per-resource accumulator: status plus the links that passed validation
/// (the confirmed-valid set used by repair).
#[derive(Debug, Clone, Default)]
pub struct ResourceContext {
    status: ValidationStatus,
    valid_mq_links: Vec<Link>,
    valid_grpc_links: Vec<Link>,
    valid_dictionary_refs: Vec<DictionaryRef>,
}

impl ResourceContext {
    /// Current status.
    pub fn status(&self) -> ValidationStatus {
        self.status
    }

    /// Whether this resource was marked invalid.
    pub fn is_invalid(&self) -> bool {
        self.status == ValidationStatus::Invalid
    }

    /// MQ links confirmed valid for this resource.
    pub fn valid_mq_links(&self) -> &[Link] {
        &self.valid_mq_links
    }

    /// gRPC links confirmed valid for this resource.
    pub fn valid_grpc_links(&self) -> &[Link] {
        &self.valid_grpc_links
    }

    /// Dictionary references confirmed valid for this resource.
    pub fn valid_dictionary_refs(&self) -> &[DictionaryRef] {
        &self.valid_dictionary_refs
    }
}

/// Central accumulator for one validation run.
#[derive(Debug, Default)]
pub struct ValidationContext {
    resources: IndexMap<String, ResourceContext>,
    report: Report,
}

impl ValidationContext {
    /// Create a fresh accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a resource invalid. Creates its entry if the resource was never
    /// seen before.
    pub fn set_invalid(&mut self, resource: &str) {
        self.entry(resource).status = ValidationStatus::Invalid;
    }

    /// Record an MQ link as confirmed valid for its owning resource.
    pub fn add_valid_mq_link(&mut self, resource: &str, link: Link) {
        self.entry(resource).valid_mq_links.push(link);
    }

    /// Record a gRPC link as confirmed valid for its owning resource.
    pub fn add_valid_grpc_link(&mut self, resource: &str, link: Link) {
        self.entry(resource).valid_grpc_links.push(link);
    }

    /// Record a dictionary reference as confirmed valid for its owner.
    pub fn add_valid_dictionary_ref(&mut self, resource: &str, dict_ref: DictionaryRef) {
        self.entry(resource).valid_dictionary_refs.push(dict_ref);
    }

    /// Record a report entry against its owning resource.
    pub fn add_issue(&mut self, resource: &str, issue: Issue) {
        self.report.add_issue(resource, issue);
    }

    /// Record a report entry and mark the owner invalid in one step.
    pub fn add_invalidating_issue(&mut self, resource: &str, issue: Issue) {
        self.set_invalid(resource);
        self.report.add_issue(resource, issue);
    }

    /// Per-resource accumulator, if the resource was touched by the run.
    pub fn resource(&self, name: &str) -> Option<&ResourceContext> {
        self.resources.get(name)
    }

    /// Names of all resources marked invalid.
    pub fn invalid_resources(&self) -> BTreeSet<&str> {
        self.resources
            .iter()
            .filter(|(_, ctx)| ctx.is_invalid())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Whether the run recorded no errors.
    pub fn is_valid(&self) -> bool {
        self.report.is_valid()
    }

    /// The structured report.
    pub fn report(&self) -> &Report {
        &self.report
    }

    /// Mutable report access for the validation passes.
    pub fn report_mut(&mut self) -> &mut Report {
        &mut self.report
    }

    fn entry(&mut self, resource: &str) -> &mut ResourceContext {
        self.resources.entry(resource.to_string()).or_default()
    }
}
