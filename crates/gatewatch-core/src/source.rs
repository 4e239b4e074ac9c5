//! Signal source trait and bearer credential.
//!
//! Anything that can produce a [`RawSignalSnapshot`] implements
//! [`SignalSource`]: the live gateway client, a JSON fixture on disk, or a
//! scripted source in tests.

use std::path::{Path, PathBuf};

use crate::error::FetchResult;
use crate::snapshot::RawSignalSnapshot;

/// Opaque bearer token handed out by the gateway's login endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for building an `Authorization` header.
    pub fn token(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Trait that every signal source must implement.
pub trait SignalSource: Send + Sync {
    /// Short identifier used in logs and status output.
    fn name(&self) -> &str;

    /// Read one raw snapshot. Failures are transient; callers retry on their
    /// own schedule.
    fn fetch(&self, credential: Option<&Credential>) -> FetchResult<RawSignalSnapshot>;
}

/// Reads a gateway-shaped JSON document from disk on every fetch.
///
/// Editing the file while a monitor runs changes the next sample, which makes
/// this handy for demos and offline UI work.
pub struct FileSource {
    path: PathBuf,
    name: String,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = format!("file:{}", path.display());
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SignalSource for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self, _credential: Option<&Credential>) -> FetchResult<RawSignalSnapshot> {
        let body = std::fs::read(&self.path)?;
        RawSignalSnapshot::from_slice(&body)
    }
}
