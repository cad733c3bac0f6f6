use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use logbook_types::{ContentMeta, Error, NewContent, Result};

use crate::blob::BlobStore;
use crate::social::SocialGraph;

struct Indexed {
    seq: u64,
    meta: ContentMeta,
}

/// Per-user content records: payload bytes in the blob store, metadata
/// in a synchronized in-memory index that tracks the owner for
/// authorization. Records are immutable once stored and there is no
/// delete path.
pub struct ContentStore {
    blobs: BlobStore,
    index: RwLock<HashMap<Uuid, Indexed>>,
    next_seq: AtomicU64,
}

impl ContentStore {
    pub fn new(blobs: BlobStore) -> Self {
        Self {
            blobs,
            index: RwLock::new(HashMap::new()),
            next_seq: AtomicU64::new(0),
        }
    }

    pub fn blobs(&self) -> &BlobStore {
        &self.blobs
    }

    /// Store a new record. The payload hits the blob store first
    /// (exclusive create) and the index second, so a failed write never
    /// leaves metadata pointing at nothing.
    pub async fn put(&self, owner: &str, payload: &[u8], content: NewContent) -> Result<Uuid> {
        if payload.is_empty() {
            return Err(Error::InvalidPayload("payload is empty"));
        }
        if content.title.trim().is_empty() {
            return Err(Error::InvalidPayload("title is required"));
        }

        let id = Uuid::new_v4();
        self.blobs.write(owner, id, payload).await?;

        let meta = ContentMeta {
            id,
            owner: owner.to_string(),
            title: content.title,
            transcription: content.transcription,
            created_at: Utc::now(),
        };
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.index
            .write()
            .expect("content index lock poisoned")
            .insert(id, Indexed { seq, meta });

        info!("stored content {} for {} ({} bytes)", id, owner, payload.len());
        Ok(id)
    }

    /// Fetch payload and metadata. Succeeds iff the requester owns the
    /// record or holds a share grant for it.
    pub async fn get(
        &self,
        id: Uuid,
        requester: &str,
        social: &SocialGraph,
    ) -> Result<(Vec<u8>, ContentMeta)> {
        let meta = {
            let index = self.index.read().expect("content index lock poisoned");
            index.get(&id).map(|e| e.meta.clone()).ok_or(Error::NotFound)?
        };

        if meta.owner != requester && !social.has_grant(id, requester) {
            return Err(Error::Forbidden);
        }

        let payload = self.blobs.read(&meta.owner, id).await?;
        Ok((payload, meta))
    }

    pub fn owner_of(&self, id: Uuid) -> Option<String> {
        let index = self.index.read().expect("content index lock poisoned");
        index.get(&id).map(|e| e.meta.owner.clone())
    }

    /// Records owned by `owner`, newest first.
    pub fn list_owned(&self, owner: &str) -> Vec<ContentMeta> {
        let index = self.index.read().expect("content index lock poisoned");
        let entries = index
            .values()
            .filter(|e| e.meta.owner == owner)
            .map(|e| (e.seq, e.meta.clone()))
            .collect();
        newest_first(entries)
    }

    /// Own records plus records shared with the requester, newest first.
    pub fn list_visible(&self, requester: &str, social: &SocialGraph) -> Vec<ContentMeta> {
        let shared = social.granted_to(requester);
        let index = self.index.read().expect("content index lock poisoned");
        let entries = index
            .values()
            .filter(|e| e.meta.owner == requester || shared.contains(&e.meta.id))
            .map(|e| (e.seq, e.meta.clone()))
            .collect();
        newest_first(entries)
    }
}

/// Creation timestamps can tie at clock granularity; the insertion
/// sequence keeps the order total.
fn newest_first(mut entries: Vec<(u64, ContentMeta)>) -> Vec<ContentMeta> {
    entries.sort_by(|a, b| {
        b.1.created_at
            .cmp(&a.1.created_at)
            .then_with(|| b.0.cmp(&a.0))
    });
    entries.into_iter().map(|(_, meta)| meta).collect()
}
