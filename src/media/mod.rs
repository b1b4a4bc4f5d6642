//! Media resolution.
//!
//! Maps card attachments to local file nodes. The cache key for an
//! attachment is `card-media-{id}`; its value records everything needed to
//! rebuild the file node, so a cached file is reported again on every run.
//!
//! # Protocol
//!
//! 1. Take the per-key lock (held until resolution finishes)
//! 2. Cache hit: rebuild the file node from the entry, marked as reused
//! 3. Cache miss: download, build a new file node, write the cache entry
//!
//! Holding the lock across the whole protocol means concurrent resolutions
//! of one attachment download at most once. Download failures are logged and
//! leave the attachment unresolved.
//!
//! The resolver never writes to the node store. Resolved files travel on the
//! card and are registered when emission reaches it.

mod files;

pub use files::{HttpFileStore, RemoteFiles, StoredFile};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

use crate::cache::MediaCache;
use crate::model::{Card, FileNode, Internal, MediaAttachment, NodeType, ResolvedFile};

/// Errors downloading a single attachment.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Cache entry for a resolved attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedMedia {
    pub file_node_id: String,
    pub name: String,
    pub extension: String,
    pub path: PathBuf,
    pub url: String,
    pub size: u64,
    pub digest: String,
}

impl CachedMedia {
    fn new(node: &FileNode) -> Self {
        Self {
            file_node_id: node.id.clone(),
            name: node.name.clone(),
            extension: node.extension.clone(),
            path: node.path.clone(),
            url: node.url.clone(),
            size: node.size,
            digest: node.internal.content_digest.clone(),
        }
    }

    /// The file node this entry was written for.
    #[must_use]
    pub fn to_file_node(&self) -> FileNode {
        FileNode {
            id: self.file_node_id.clone(),
            name: self.name.clone(),
            extension: self.extension.clone(),
            url: self.url.clone(),
            path: self.path.clone(),
            size: self.size,
            internal: file_internal(self.digest.clone()),
        }
    }
}

fn file_internal(digest: String) -> Internal {
    Internal {
        node_type: NodeType::File,
        content_digest: digest,
        media_type: None,
    }
}

/// Counters for one resolver's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MediaStats {
    pub hits: usize,
    pub downloads: usize,
    pub failures: usize,
}

/// Cache key for an attachment id.
#[must_use]
pub fn cache_key(media_id: &str) -> String {
    format!("card-media-{media_id}")
}

/// Extension of the file a URL points at, without the dot.
///
/// Query strings and fragments are ignored; a last path segment without a
/// `.` has no extension.
#[must_use]
pub fn url_extension(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.rsplit('/').next().unwrap_or(path);
    match segment.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext.to_string(),
        _ => String::new(),
    }
}

/// Resolves attachments to file nodes, downloading each at most once.
pub struct MediaResolver<'a, F> {
    cache: &'a dyn MediaCache,
    files: &'a F,
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
    hits: AtomicUsize,
    downloads: AtomicUsize,
    failures: AtomicUsize,
}

impl<'a, F: RemoteFiles> MediaResolver<'a, F> {
    pub fn new(cache: &'a dyn MediaCache, files: &'a F) -> Self {
        Self {
            cache,
            files,
            locks: Mutex::new(HashMap::new()),
            hits: AtomicUsize::new(0),
            downloads: AtomicUsize::new(0),
            failures: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn stats(&self) -> MediaStats {
        MediaStats {
            hits: self.hits.load(Ordering::Relaxed),
            downloads: self.downloads.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }

    fn lock_for(&self, key: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(key.to_string()).or_default())
    }

    /// Resolve one attachment to a file node.
    ///
    /// Returns `None` when the attachment could not be downloaded; the
    /// reason is logged.
    pub async fn resolve(&self, media: &MediaAttachment) -> Option<ResolvedFile> {
        let key = cache_key(&media.id);
        let lock = self.lock_for(&key);
        let _guard = lock.lock().await;

        if let Some(cached) = self.lookup(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(media_id = %media.id, file_node_id = %cached.file_node_id, "Media cache hit");
            return Some(ResolvedFile {
                node: cached.to_file_node(),
                reused: true,
            });
        }

        match self.download(media).await {
            Ok(node) => {
                self.downloads.fetch_add(1, Ordering::Relaxed);
                let entry = serde_json::to_value(CachedMedia::new(&node)).unwrap_or_default();
                if let Err(e) = self.cache.set(&key, &entry) {
                    warn!(media_id = %media.id, error = %e, "Failed to cache media resolution");
                }
                Some(ResolvedFile {
                    node,
                    reused: false,
                })
            }
            Err(e) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                warn!(media_id = %media.id, url = %media.url, error = %e, "Error while creating remote file");
                None
            }
        }
    }

    /// Resolve every attachment of every card concurrently.
    ///
    /// Each resolved attachment gets its `local_file` set and its file node
    /// appended to the card's `files`.
    pub async fn resolve_cards(&self, cards: &mut [Card]) {
        let resolved = futures::future::join_all(
            cards
                .iter()
                .flat_map(|card| card.medias.iter())
                .map(|media| self.resolve(media)),
        )
        .await;

        let mut resolved = resolved.into_iter();
        for card in cards.iter_mut() {
            for media in &mut card.medias {
                if let Some(file) = resolved.next().flatten() {
                    media.local_file = Some(file.node.id.clone());
                    card.files.push(file);
                }
            }
        }
    }

    fn lookup(&self, key: &str) -> Option<CachedMedia> {
        match self.cache.get(key) {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(cached) => Some(cached),
                Err(e) => {
                    warn!(key, error = %e, "Ignoring unreadable media cache entry");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(key, error = %e, "Media cache lookup failed");
                None
            }
        }
    }

    async fn download(&self, media: &MediaAttachment) -> Result<FileNode, MediaError> {
        let extension = url_extension(&media.url);
        let stored = self.files.download(&media.url, &extension).await?;

        Ok(FileNode {
            id: uuid::Uuid::new_v4().to_string(),
            name: media.name.clone(),
            extension,
            url: media.url.clone(),
            path: stored.path,
            size: stored.size,
            internal: file_internal(stored.digest),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_is_namespaced() {
        assert_eq!(cache_key("5e9a"), "card-media-5e9a");
    }

    #[test]
    fn test_url_extension() {
        assert_eq!(url_extension("https://trello.com/x/hero.png"), "png");
        assert_eq!(url_extension("https://trello.com/x/archive.tar.gz"), "gz");
        assert_eq!(url_extension("https://trello.com/x/photo.JPG?v=2#top"), "JPG");
    }

    #[test]
    fn test_cached_entry_rebuilds_file_node() {
        let node = FileNode {
            id: "file_1".into(),
            name: "Hero.png".into(),
            extension: "png".into(),
            url: "https://x/hero.png".into(),
            path: PathBuf::from("/cache/files/file_1.png"),
            size: 12,
            internal: file_internal("abc123".into()),
        };

        let value = serde_json::to_value(CachedMedia::new(&node)).unwrap();
        let cached: CachedMedia = serde_json::from_value(value).unwrap();

        assert_eq!(cached.to_file_node(), node);
    }

    #[test]
    fn test_url_extension_missing() {
        assert_eq!(url_extension("https://trello.com/c/abc123"), "");
        assert_eq!(url_extension("https://example.com/files/.hidden"), "");
    }
}
