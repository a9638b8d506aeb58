//! Report entries and the per-run error report.
//!
//! Uses thiserror for structured errors. Report entries are designed to:
//! - Be serializable for sending to callers/frontends
//! - Carry the owning entity (link, box, dictionary reference) in their shape
//! - Render a stable printable format: `"<entity> is invalid. <message>"`

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Category of a recorded problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueKind {
    /// Missing resource or pin
    Structural,
    /// Wrong publish/subscribe tag for the traffic direction
    Direction,
    /// Missing/duplicated/contradicting message-format tag
    Format,
    /// Unsupported gRPC service class
    ServiceClass,
    /// Link or pin content collision
    Duplicate,
    /// Link with equal endpoints
    SelfLink,
    /// URL path collision
    Conflict,
    /// Missing dictionary or secret key
    Reference,
    /// Malformed input caught and wrapped
    Unexpected,
}

/// A single report entry, attributed to exactly one owning resource.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Issue {
    /// A link failed validation or was eliminated.
    #[error("Link: {content} is invalid. {message}")]
    Link {
        /// Problem category.
        kind: IssueKind,
        /// Printable content key of the link.
        content: String,
        /// What went wrong.
        message: String,
    },

    /// A box resource failed a box-level check.
    #[error("Resource: {name} is invalid. {message}")]
    Resource {
        /// Problem category.
        kind: IssueKind,
        /// Name of the box.
        name: String,
        /// What went wrong.
        message: String,
    },

    /// A dictionary reference extracted from configuration failed to resolve.
    #[error("Dictionary link: {content} is invalid. {message}")]
    DictionaryRef {
        /// Problem category.
        kind: IssueKind,
        /// Printable content key of the reference.
        content: String,
        /// What went wrong.
        message: String,
    },
}

impl Issue {
    /// Category of this entry.
    pub fn kind(&self) -> IssueKind {
        match self {
            Issue::Link { kind, .. }
            | Issue::Resource { kind, .. }
            | Issue::DictionaryRef { kind, .. } => *kind,
        }
    }

    /// The message body, without the entity prefix.
    pub fn message(&self) -> &str {
        match self {
            Issue::Link { message, .. }
            | Issue::Resource { message, .. }
            | Issue::DictionaryRef { message, .. } => message,
        }
    }
}

/// Failure returned by a single chain check.
///
/// The chain driver wraps it into an [`Issue`] naming the failed endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckFailure {
    /// Problem category.
    pub kind: IssueKind,
    /// What went wrong, quoted verbatim into the report.
    pub message: String,
}

impl CheckFailure {
    /// Create a failure with a category and message.
    pub fn new(kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Structured per-run error report.
///
/// Messages are grouped by the resource that owns them; iteration order
/// within a group is the order of recording, but correctness must not depend
/// on ordering across groups.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Report {
    errors: IndexMap<String, Vec<Issue>>,
    book_errors: IndexMap<String, Vec<Issue>>,
    exceptions: Vec<String>,
}

impl Report {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an entry against its owning resource.
    pub fn add_issue(&mut self, resource: impl Into<String>, issue: Issue) {
        self.errors.entry(resource.into()).or_default().push(issue);
    }

    /// Record a book-existence entry against its owning resource.
    pub fn add_book_issue(&mut self, resource: impl Into<String>, issue: Issue) {
        self.book_errors
            .entry(resource.into())
            .or_default()
            .push(issue);
    }

    /// Record a run-level message not attributable to a single resource.
    pub fn add_exception(&mut self, message: impl Into<String>) {
        self.exceptions.push(message.into());
    }

    /// Whether the run recorded no errors at all.
    pub fn is_valid(&self) -> bool {
        self.errors.values().all(|issues| issues.is_empty())
            && self.book_errors.values().all(|issues| issues.is_empty())
            && self.exceptions.is_empty()
    }

    /// Entries recorded for one resource.
    pub fn issues_for(&self, resource: &str) -> &[Issue] {
        self.errors.get(resource).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Book entries recorded for one resource.
    pub fn book_issues_for(&self, resource: &str) -> &[Issue] {
        self.book_errors
            .get(resource)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Iterate all (resource, entries) groups.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Issue])> {
        self.errors
            .iter()
            .map(|(name, issues)| (name.as_str(), issues.as_slice()))
    }

    /// Run-level messages.
    pub fn exceptions(&self) -> &[String] {
        &self.exceptions
    }

    /// All entries rendered in the stable printable format.
    pub fn printable_messages(&self) -> Vec<String> {
        self.errors
            .values()
            .chain(self.book_errors.values())
            .flatten()
            .map(|issue| issue.to_string())
            .chain(self.exceptions.iter().cloned())
            .collect()
    }
}
