use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use tracing::{debug, warn};

use logbook_types::{Error, Result};

use crate::Directory;

/// OAuth-style HTTP identity provider.
///
/// Expected endpoints:
///   GET  /accounts/{username}         -> 200 | 404
///   POST /accounts                    -> 201 | 409
///   POST /accounts/{username}/verify  -> 204 | 401
pub struct HttpDirectory {
    base_url: String,
    client: reqwest::Client,
}

const MAX_ATTEMPTS: u32 = 3;
const BACKOFF_STEP: Duration = Duration::from_millis(200);

#[derive(Serialize)]
struct CreateAccount<'a> {
    username: &'a str,
    secret: &'a str,
}

#[derive(Serialize)]
struct VerifySecret<'a> {
    secret: &'a str,
}

impl HttpDirectory {
    /// `timeout` bounds every round-trip; the directory is the only
    /// externally blocking call in the system and must never hang a
    /// request handler indefinitely.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::DirectoryUnavailable(e.to_string()))?;
        let base_url: String = base_url.into();
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn account_exists(&self, username: &str) -> Result<bool> {
        let url = format!("{}/accounts/{}", self.base_url, username);
        let resp = with_retry(|| self.client.get(&url).send()).await?;
        match resp.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            other => Err(unexpected_status("account probe", other)),
        }
    }
}

#[async_trait]
impl Directory for HttpDirectory {
    async fn register(&self, username: &str, secret: &str) -> Result<()> {
        // Existence probe first, so a retried registration attempt fails
        // cleanly instead of racing the create.
        if self.account_exists(username).await? {
            return Err(Error::DuplicateIdentity);
        }

        // The create POST is sent exactly once per attempt, no retry.
        let url = format!("{}/accounts", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(&CreateAccount { username, secret })
            .send()
            .await
            .map_err(|e| Error::DirectoryUnavailable(e.to_string()))?;

        match resp.status() {
            s if s.is_success() => {
                debug!("directory account created for {}", username);
                Ok(())
            }
            StatusCode::CONFLICT => Err(Error::DuplicateIdentity),
            other => Err(unexpected_status("account create", other)),
        }
    }

    async fn verify(&self, username: &str, secret: &str) -> Result<()> {
        let url = format!("{}/accounts/{}/verify", self.base_url, username);
        let resp = with_retry(|| {
            self.client
                .post(&url)
                .json(&VerifySecret { secret })
                .send()
        })
        .await?;

        match resp.status() {
            s if s.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(Error::InvalidCredentials),
            other => Err(unexpected_status("verify", other)),
        }
    }
}

/// Retry transient connectivity failures with linear backoff. Anything
/// that reached the directory and came back is returned as-is; only
/// connect errors and timeouts are retried.
async fn with_retry<F, Fut>(mut call: F) -> Result<reqwest::Response>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = reqwest::Result<reqwest::Response>>,
{
    let mut last_err = None;
    for attempt in 1..=MAX_ATTEMPTS {
        match call().await {
            Ok(resp) => return Ok(resp),
            Err(e) if e.is_connect() || e.is_timeout() => {
                warn!(
                    "directory unreachable (attempt {}/{}): {}",
                    attempt, MAX_ATTEMPTS, e
                );
                last_err = Some(e);
                if attempt < MAX_ATTEMPTS {
                    tokio::time::sleep(BACKOFF_STEP * attempt).await;
                }
            }
            Err(e) => return Err(Error::DirectoryUnavailable(e.to_string())),
        }
    }
    Err(Error::DirectoryUnavailable(
        last_err.map(|e| e.to_string()).unwrap_or_default(),
    ))
}

fn unexpected_status(op: &str, status: StatusCode) -> Error {
    Error::DirectoryUnavailable(format!("{} returned {}", op, status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    // The client gives up at 100 ms; servers that stall hold the socket
    // well past that so the failure is a timeout, not a reset.
    const CLIENT_TIMEOUT: Duration = Duration::from_millis(100);
    const STALL: Duration = Duration::from_millis(400);

    const NOT_FOUND: &[u8] =
        b"HTTP/1.1 404 Not Found\r\ncontent-length: 0\r\nconnection: close\r\n\r\n";
    const UNAUTHORIZED: &[u8] =
        b"HTTP/1.1 401 Unauthorized\r\ncontent-length: 0\r\nconnection: close\r\n\r\n";

    fn read_head(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 512];
        loop {
            match stream.read(&mut chunk) {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    buf.extend_from_slice(&chunk[..n]);
                    if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Reads each request and never answers; every attempt times out on
    /// the client side. Counts requests seen.
    fn spawn_silent_server(requests: Arc<AtomicUsize>) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        thread::spawn(move || {
            for conn in listener.incoming() {
                let Ok(mut stream) = conn else { break };
                let requests = requests.clone();
                thread::spawn(move || {
                    let _ = read_head(&mut stream);
                    requests.fetch_add(1, Ordering::SeqCst);
                    thread::sleep(STALL);
                });
            }
        });
        port
    }

    /// Answers the existence probe with 404 and handles the POST per
    /// `post_response` (`None` stalls until the client times out).
    /// Counts POSTs seen.
    fn spawn_account_server(posts: Arc<AtomicUsize>, post_response: Option<&'static [u8]>) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        thread::spawn(move || {
            for conn in listener.incoming() {
                let Ok(mut stream) = conn else { break };
                let head = read_head(&mut stream);
                if head.starts_with("GET") {
                    let _ = stream.write_all(NOT_FOUND);
                } else if head.starts_with("POST") {
                    posts.fetch_add(1, Ordering::SeqCst);
                    match post_response {
                        Some(resp) => {
                            let _ = stream.write_all(resp);
                        }
                        None => thread::sleep(STALL),
                    }
                }
            }
        });
        port
    }

    fn directory(port: u16) -> HttpDirectory {
        HttpDirectory::new(format!("http://127.0.0.1:{}", port), CLIENT_TIMEOUT).unwrap()
    }

    #[tokio::test]
    async fn verify_retries_transient_failures_then_gives_up() {
        let requests = Arc::new(AtomicUsize::new(0));
        let port = spawn_silent_server(requests.clone());

        let result = directory(port).verify("kirk", "secret").await;

        assert!(matches!(result, Err(Error::DirectoryUnavailable(_))));
        assert_eq!(requests.load(Ordering::SeqCst), MAX_ATTEMPTS as usize);
    }

    #[tokio::test]
    async fn create_post_is_sent_exactly_once() {
        let posts = Arc::new(AtomicUsize::new(0));
        let port = spawn_account_server(posts.clone(), None);

        let result = directory(port).register("kirk", "secret").await;

        assert!(matches!(result, Err(Error::DirectoryUnavailable(_))));
        assert_eq!(posts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn verify_maps_rejection_to_invalid_credentials() {
        let posts = Arc::new(AtomicUsize::new(0));
        let port = spawn_account_server(posts.clone(), Some(UNAUTHORIZED));

        let result = directory(port).verify("kirk", "wrong").await;

        assert!(matches!(result, Err(Error::InvalidCredentials)));
        // A rejection reached the directory; nothing to retry.
        assert_eq!(posts.load(Ordering::SeqCst), 1);
    }
}
