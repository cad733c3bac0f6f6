use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use tracing::info;
use uuid::Uuid;

use logbook_directory::{Directory, HttpDirectory};
use logbook_types::{ContentMeta, Error, NewContent, Result, validate_username};

use crate::blob::BlobStore;
use crate::config::Config;
use crate::content::ContentStore;
use crate::session::SessionRegistry;
use crate::social::SocialGraph;

/// The service facade: everything a transport layer would expose, minus
/// the transport. Authenticated operations take a bearer token and are
/// scoped to the identity it resolves to.
pub struct Logbook<D: Directory> {
    directory: D,
    sessions: SessionRegistry,
    content: ContentStore,
    social: SocialGraph,
}

impl Logbook<HttpDirectory> {
    pub async fn from_config(config: &Config) -> Result<Self> {
        let directory = HttpDirectory::new(&config.directory_url, config.directory_timeout)?;
        Self::new(directory, config.storage_dir.clone(), config.session_ttl).await
    }
}

impl<D: Directory> Logbook<D> {
    pub async fn new(directory: D, storage_dir: PathBuf, session_ttl: Duration) -> Result<Self> {
        let blobs = BlobStore::new(storage_dir).await?;
        Ok(Self {
            directory,
            sessions: SessionRegistry::new(session_ttl),
            content: ContentStore::new(blobs),
            social: SocialGraph::new(),
        })
    }

    fn authenticate(&self, token: &str) -> Result<String> {
        self.sessions.resolve(token).ok_or(Error::Unauthenticated)
    }

    // -- Auth --

    /// Register a new account in two explicit steps: provision the local
    /// blob namespace, then create the directory entry. If the directory
    /// rejects the account, the namespace is rolled back.
    pub async fn register(&self, username: &str, secret: &str) -> Result<()> {
        validate_username(username)?;
        if secret.is_empty() {
            return Err(Error::InvalidPayload("secret is required"));
        }

        self.content.blobs().create_namespace(username).await?;
        if let Err(e) = self.directory.register(username, secret).await {
            self.content.blobs().remove_namespace(username).await;
            return Err(e);
        }

        self.social.ensure_member(username);
        info!("registered {}", username);
        Ok(())
    }

    /// Verify credentials against the directory and issue a session
    /// token. The directory round-trip completes before any session
    /// state is touched; no store lock is ever held across it.
    pub async fn login(&self, username: &str, secret: &str) -> Result<String> {
        validate_username(username)?;
        self.directory.verify(username, secret).await?;

        // Accounts can predate this process (the directory is the system
        // of record), so membership is re-established on login too.
        self.social.ensure_member(username);
        Ok(self.sessions.issue(username))
    }

    /// Best-effort by contract: the local token is cleared and logout
    /// never fails, even for a token that was never issued.
    pub fn logout(&self, token: &str) {
        self.sessions.revoke(token);
    }

    // -- Content --

    pub async fn upload(&self, token: &str, payload: &[u8], content: NewContent) -> Result<Uuid> {
        let user = self.authenticate(token)?;
        self.content.put(&user, payload, content).await
    }

    pub async fn fetch(&self, token: &str, id: Uuid) -> Result<(Vec<u8>, ContentMeta)> {
        let user = self.authenticate(token)?;
        self.content.get(id, &user, &self.social).await
    }

    pub fn list_owned(&self, token: &str) -> Result<Vec<ContentMeta>> {
        let user = self.authenticate(token)?;
        Ok(self.content.list_owned(&user))
    }

    /// Own records plus records shared with the caller, newest first.
    pub fn list_visible(&self, token: &str) -> Result<Vec<ContentMeta>> {
        let user = self.authenticate(token)?;
        Ok(self.content.list_visible(&user, &self.social))
    }

    pub fn search(&self, token: &str, query: &str) -> Result<Vec<ContentMeta>> {
        let user = self.authenticate(token)?;
        let visible = self.content.list_visible(&user, &self.social);
        Ok(crate::search::search(&visible, query))
    }

    // -- Social --

    pub fn add_friend(&self, token: &str, target: &str) -> Result<()> {
        let user = self.authenticate(token)?;
        self.social.add_friend(&user, target)
    }

    pub fn friends(&self, token: &str) -> Result<BTreeSet<String>> {
        let user = self.authenticate(token)?;
        Ok(self.social.friends_of(&user))
    }

    /// Grant a friend read access to one owned record. Checked in order:
    /// the record exists, the caller owns it, the grantee is a mutual
    /// friend.
    pub fn share(&self, token: &str, id: Uuid, grantee: &str) -> Result<()> {
        let user = self.authenticate(token)?;

        let owner = self.content.owner_of(id).ok_or(Error::NotFound)?;
        if owner != user {
            return Err(Error::Forbidden);
        }
        if !self.social.are_friends(&user, grantee) {
            return Err(Error::NotFriends);
        }

        self.social.record_grant(id, grantee);
        info!("{} shared {} with {}", user, id, grantee);
        Ok(())
    }
}
