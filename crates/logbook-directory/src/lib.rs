//! Identity directory boundary.
//!
//! The directory is the external system of record for accounts and
//! credentials. This crate only ever forwards a secret for a probe
//! verification; nothing credential-shaped is stored on our side.

pub mod http;
pub mod memory;

use async_trait::async_trait;
use logbook_types::Result;

pub use http::HttpDirectory;
pub use memory::MemoryDirectory;

#[async_trait]
pub trait Directory: Send + Sync {
    /// Create a directory entry for a new account.
    ///
    /// Errors: `DuplicateIdentity` if the username is taken,
    /// `DirectoryUnavailable` on connectivity failure. Implementations
    /// must not retry the create itself — a duplicate side effect is
    /// worse than a surfaced error.
    async fn register(&self, username: &str, secret: &str) -> Result<()>;

    /// Probe-authenticate with the supplied secret.
    ///
    /// Errors: `InvalidCredentials` when the directory rejects the
    /// secret (not retryable), `DirectoryUnavailable` when it cannot be
    /// reached (retryable). The two are never conflated.
    async fn verify(&self, username: &str, secret: &str) -> Result<()>;
}
