use std::path::PathBuf;
use std::time::Duration;

/// Environment-driven configuration; a `.env` file is honored when
/// present.
#[derive(Debug, Clone)]
pub struct Config {
    pub directory_url: String,
    pub storage_dir: PathBuf,
    pub session_ttl: Duration,
    pub directory_timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();

        let directory_url = std::env::var("LOGBOOK_DIRECTORY_URL")
            .unwrap_or_else(|_| "http://localhost:8389".into());
        let storage_dir: PathBuf = std::env::var("LOGBOOK_STORAGE_DIR")
            .unwrap_or_else(|_| "./logbook-storage".into())
            .into();
        let session_ttl_secs: u64 = std::env::var("LOGBOOK_SESSION_TTL_SECS")
            .unwrap_or_else(|_| "86400".into())
            .parse()?;
        let directory_timeout_secs: u64 = std::env::var("LOGBOOK_DIRECTORY_TIMEOUT_SECS")
            .unwrap_or_else(|_| "5".into())
            .parse()?;

        Ok(Self {
            directory_url,
            storage_dir,
            session_ttl: Duration::from_secs(session_ttl_secs),
            directory_timeout: Duration::from_secs(directory_timeout_secs),
        })
    }
}
