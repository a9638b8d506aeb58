//! External collaborator interfaces.
//!
//! Two narrow synchronous calls leave the process during a run: fetching the
//! namespace's custom secret and probing the storage service for keyspace /
//! book existence. Both sit behind traits so the engine stays testable and
//! the transport stays swappable; failures at these boundaries are converted
//! into report-level messages by the callers, never retried and never
//! propagated as panics.

use anyhow::Result;
use std::collections::{BTreeMap, BTreeSet};

/// Name of the per-namespace secret object holding custom-config values.
pub const SECRET_NAME: &str = "secret-custom-config";

/// Source of the namespace's custom secret.
pub trait SecretSource {
    /// Keys of the `secret-custom-config` object in the namespace, or `None`
    /// when the secret object itself is absent.
    fn custom_secret_keys(&self, namespace: &str) -> Result<Option<BTreeSet<String>>>;
}

/// Existence probes against the external storage service.
pub trait StorageClient {
    /// Whether the keyspace exists.
    fn keyspace_exists(&self, keyspace: &str) -> Result<bool>;

    /// Whether the book exists inside the keyspace.
    fn book_exists(&self, keyspace: &str, book: &str) -> Result<bool>;
}

/// [`StorageClient`] backed by synchronous HTTP GETs against the storage
/// service's REST surface. Any non-success status means "does not exist";
/// transport errors bubble up for the caller to report.
pub struct HttpStorageClient {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpStorageClient {
    /// Create a client for a storage service at `host[:port]`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            agent: ureq::agent(),
        }
    }

    fn probe(&self, path: &str) -> Result<bool> {
        let url = format!("http://{}/{}", self.base_url, path);
        match self.agent.get(&url).call() {
            Ok(response) => Ok((200..300).contains(&response.status())),
            Err(ureq::Error::Status(_, _)) => Ok(false),
            Err(error) => Err(error.into()),
        }
    }
}

impl StorageClient for HttpStorageClient {
    fn keyspace_exists(&self, keyspace: &str) -> Result<bool> {
        self.probe(&format!("api/keyspaces/{keyspace}"))
    }

    fn book_exists(&self, keyspace: &str, book: &str) -> Result<bool> {
        self.probe(&format!("api/{keyspace}/books/{book}"))
    }
}

/// In-memory [`SecretSource`] for tests and offline runs.
#[derive(Debug, Clone, Default)]
pub struct StaticSecretSource {
    keys: Option<BTreeSet<String>>,
}

impl StaticSecretSource {
    /// A source whose secret holds exactly these keys.
    pub fn with_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: Some(keys.into_iter().map(Into::into).collect()),
        }
    }

    /// A source whose secret object is absent.
    pub fn missing() -> Self {
        Self { keys: None }
    }
}

impl SecretSource for StaticSecretSource {
    fn custom_secret_keys(&self, _namespace: &str) -> Result<Option<BTreeSet<String>>> {
        Ok(self.keys.clone())
    }
}

/// In-memory [`StorageClient`] for tests and offline runs.
#[derive(Debug, Clone, Default)]
pub struct StaticStorageClient {
    books_by_keyspace: BTreeMap<String, BTreeSet<String>>,
}

impl StaticStorageClient {
    /// A client knowing no keyspaces at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Register a keyspace and its books.
    pub fn with_keyspace<I, S>(mut self, keyspace: impl Into<String>, books: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.books_by_keyspace
            .insert(keyspace.into(), books.into_iter().map(Into::into).collect());
        self
    }
}

impl StorageClient for StaticStorageClient {
    fn keyspace_exists(&self, keyspace: &str) -> Result<bool> {
        Ok(self.books_by_keyspace.contains_key(keyspace))
    }

    fn book_exists(&self, keyspace: &str, book: &str) -> Result<bool> {
        Ok(self
            .books_by_keyspace
            .get(keyspace)
            .is_some_and(|books| books.contains(book)))
    }
}
