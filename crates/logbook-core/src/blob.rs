use std::path::PathBuf;

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use uuid::Uuid;

use logbook_types::{Error, Result};

/// Write-once byte store: one flat file per record at
/// `{root}/{owner}/{id}`. No layout is promised beyond that key scheme.
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    pub async fn new(root: PathBuf) -> Result<Self> {
        fs::create_dir_all(&root).await?;
        info!("blob storage root: {}", root.display());
        Ok(Self { root })
    }

    fn blob_path(&self, owner: &str, id: Uuid) -> PathBuf {
        self.root.join(owner).join(id.to_string())
    }

    /// Create the per-user directory. Kept separate from `write` so
    /// registration can provision the namespace as an explicit step and
    /// undo it if the directory rejects the account.
    pub async fn create_namespace(&self, owner: &str) -> Result<()> {
        fs::create_dir_all(self.root.join(owner)).await?;
        Ok(())
    }

    /// Best-effort compensation for a failed registration. Only removes
    /// an empty directory, so an established user's data is never at
    /// risk.
    pub async fn remove_namespace(&self, owner: &str) {
        if let Err(e) = fs::remove_dir(self.root.join(owner)).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("could not undo namespace for {}: {}", owner, e);
            }
        }
    }

    /// Exclusive-create write: an id collision surfaces as an error
    /// instead of silently overwriting another record's payload.
    pub async fn write(&self, owner: &str, id: Uuid, payload: &[u8]) -> Result<()> {
        self.create_namespace(owner).await?;
        let path = self.blob_path(owner, id);
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        file.write_all(payload).await?;
        file.flush().await?;
        Ok(())
    }

    pub async fn read(&self, owner: &str, id: Uuid) -> Result<Vec<u8>> {
        match fs::read(self.blob_path(owner, id)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::NotFound),
            Err(e) => Err(e.into()),
        }
    }
}
