use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use logbook_types::{Error, Result};

use crate::Directory;

/// In-process directory for tests and local development, standing in
/// for a real provider the same way a locally seeded LDAP container
/// would. Secrets live only inside this struct.
#[derive(Default)]
pub struct MemoryDirectory {
    accounts: Mutex<HashMap<String, String>>,
    offline: AtomicBool,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a directory outage; every call fails with
    /// `DirectoryUnavailable` until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_reachable(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::DirectoryUnavailable("directory offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl Directory for MemoryDirectory {
    async fn register(&self, username: &str, secret: &str) -> Result<()> {
        self.check_reachable()?;
        let mut accounts = self.accounts.lock().expect("directory lock poisoned");
        if accounts.contains_key(username) {
            return Err(Error::DuplicateIdentity);
        }
        accounts.insert(username.to_string(), secret.to_string());
        Ok(())
    }

    async fn verify(&self, username: &str, secret: &str) -> Result<()> {
        self.check_reachable()?;
        let accounts = self.accounts.lock().expect("directory lock poisoned");
        match accounts.get(username) {
            Some(stored) if stored == secret => Ok(()),
            _ => Err(Error::InvalidCredentials),
        }
    }
}
