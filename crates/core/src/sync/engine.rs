use std::path::PathBuf;
use tracing::{debug, error, warn};

use crate::auth::AccessTokenProvider;
use crate::errors::CoreError;
use crate::models::portfolio::Portfolio;
use crate::storage::cache::CacheFile;
use crate::store::traits::DocumentStore;

use super::repair::strip_trailing_commas;

/// Name of the one document this engine manages in the app-private space.
pub const DOCUMENT_NAME: &str = "portfolio.json";

/// Keeps the authoritative portfolio document consistent across the remote
/// store, the local cache, and local mutations.
///
/// Owns the remote file identity (`file_id` + version tag), rediscovered
/// each cold start via a name lookup. `load()` prefers remote over cache
/// whenever a credential is available and the remote call succeeds; `save()`
/// is a conditional write retried exactly once on a version conflict.
///
/// Neither operation fails outward: `load()` degrades to the cache and then
/// to an empty portfolio, `save()` reports success as a plain `bool`.
///
/// One engine instance per cache path, one in-flight operation per
/// instance — the identity fields are plain mutable state and the engine
/// is not meant to be shared across concurrent callers.
pub struct SyncEngine {
    store: Box<dyn DocumentStore>,
    tokens: Box<dyn AccessTokenProvider>,
    cache: CacheFile,
    file_id: Option<String>,
    etag: Option<String>,
}

impl SyncEngine {
    pub fn new(
        store: Box<dyn DocumentStore>,
        tokens: Box<dyn AccessTokenProvider>,
        cache_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            tokens,
            cache: CacheFile::new(cache_path),
            file_id: None,
            etag: None,
        }
    }

    /// Remote file id, once `load()` has resolved it.
    #[must_use]
    pub fn file_id(&self) -> Option<&str> {
        self.file_id.as_deref()
    }

    /// Version tag held from the last successful remote read or write.
    #[must_use]
    pub fn version_tag(&self) -> Option<&str> {
        self.etag.as_deref()
    }

    // ── Load ────────────────────────────────────────────────────────

    /// Remote-first read. Falls back to the local cache when no credential
    /// is available or every remote step fails, and to an empty portfolio
    /// when there is no cache either.
    pub async fn load(&mut self) -> Portfolio {
        if let Some(token) = self.tokens.access_token().await {
            match self.load_remote(&token).await {
                Ok(Some(portfolio)) => return portfolio,
                Ok(None) => debug!("remote had no usable content; using cache"),
                Err(e) => error!(error = %e, "remote load failed; using cache"),
            }
        } else {
            warn!("no access token; using cache");
        }

        self.load_cached()
    }

    /// The remote read path: resolve (or create) the file, fetch the
    /// version tag, download, repair, parse. `Ok(None)` means nothing
    /// usable was found remotely and the caller should consult the cache.
    async fn load_remote(&mut self, token: &str) -> Result<Option<Portfolio>, CoreError> {
        let listed = self.store.list(token, DOCUMENT_NAME).await?;
        let id = match listed.into_iter().next() {
            Some(existing) => existing.id,
            None => self.create_empty(token).await?,
        };
        self.file_id = Some(id.clone());

        // The store may omit versioning headers; tag absence is fine.
        self.etag = self.store.version_tag(token, &id).await?;
        debug!(etag = ?self.etag, "fetched version tag");

        let body = match self.store.download(token, &id).await {
            Ok(body) => body,
            Err(e) => {
                error!(error = %e, "download failed");
                return Ok(None);
            }
        };
        if body.trim().is_empty() {
            return Ok(None);
        }

        let repaired = strip_trailing_commas(&body);
        match serde_json::from_str::<Portfolio>(&repaired) {
            Ok(portfolio) => {
                if let Err(e) = self.cache.write(&repaired) {
                    warn!(error = %e, "cache write failed after remote load");
                }
                debug!("loaded portfolio from remote");
                Ok(Some(portfolio))
            }
            Err(e) => {
                error!(error = %e, "remote document malformed; self-healing to empty");
                self.self_heal(token, &id).await;
                Ok(Some(Portfolio::default()))
            }
        }
    }

    async fn create_empty(&mut self, token: &str) -> Result<String, CoreError> {
        let empty = serde_json::to_string(&Portfolio::default())
            .map_err(|e| CoreError::Serialization(e.to_string()))?;
        let created = self.store.create(token, DOCUMENT_NAME, &empty).await?;
        if let Err(e) = self.cache.write(&empty) {
            warn!(error = %e, "cache write failed after create");
        }
        debug!(id = %created.id, "created empty remote document");
        Ok(created.id)
    }

    fn load_cached(&self) -> Portfolio {
        let Some(cached) = self.cache.read() else {
            return Portfolio::default();
        };
        if cached.trim().is_empty() {
            return Portfolio::default();
        }

        let repaired = strip_trailing_commas(&cached);
        match serde_json::from_str::<Portfolio>(&repaired) {
            Ok(portfolio) => {
                debug!("loaded portfolio from cache");
                portfolio
            }
            Err(e) => {
                error!(error = %e, "cached document malformed; resetting to empty");
                if let Ok(empty) = serde_json::to_string(&Portfolio::default()) {
                    if let Err(write_err) = self.cache.write(&empty) {
                        warn!(error = %write_err, "cache reset failed");
                    }
                }
                Portfolio::default()
            }
        }
    }

    // ── Save ────────────────────────────────────────────────────────

    /// Conditional write keyed on the held version tag, retried exactly
    /// once on a version conflict. Returns `false` without touching cache
    /// or in-memory state when no credential is available, no file id has
    /// been resolved yet, or the write ultimately fails.
    pub async fn save(&mut self, portfolio: &Portfolio) -> bool {
        let Some(token) = self.tokens.access_token().await else {
            warn!("save skipped: no access token");
            return false;
        };
        let Some(id) = self.file_id.clone() else {
            warn!("save skipped: file id not resolved (call load first)");
            return false;
        };
        let json = match serde_json::to_string(portfolio) {
            Ok(json) => json,
            Err(e) => {
                error!(error = %e, "portfolio serialization failed");
                return false;
            }
        };

        let tag = self.etag.clone();
        match self.write_once(&token, &id, tag.as_deref(), &json).await {
            Ok(()) => true,
            Err(CoreError::VersionConflict) => {
                warn!("version conflict; refreshing tag and retrying once");
                match self.retry_after_conflict(&token, &id, &json).await {
                    Ok(()) => true,
                    Err(e) => {
                        error!(error = %e, "retry after version conflict failed");
                        false
                    }
                }
            }
            Err(e) => {
                error!(error = %e, "save failed");
                false
            }
        }
    }

    /// One write attempt: conditional update, tag refresh, cache write.
    /// The cache is only touched after the remote write is confirmed.
    async fn write_once(
        &mut self,
        token: &str,
        id: &str,
        precondition: Option<&str>,
        json: &str,
    ) -> Result<(), CoreError> {
        let updated = self.store.update(token, id, precondition, json).await?;
        self.etag = self.store.version_tag(token, &updated.id).await?;
        self.cache.write(json)?;
        debug!(etag = ?self.etag, "save success");
        Ok(())
    }

    async fn retry_after_conflict(
        &mut self,
        token: &str,
        id: &str,
        json: &str,
    ) -> Result<(), CoreError> {
        self.etag = self.store.version_tag(token, id).await?;
        debug!(etag = ?self.etag, "refreshed version tag after conflict");
        let tag = self.etag.clone();
        self.write_once(token, id, tag.as_deref(), json).await
    }

    // ── Self-heal ───────────────────────────────────────────────────

    /// Replace a corrupt remote document with a fresh empty one. The write
    /// is unconditional: the remote content is presumed corrupt and not
    /// worth preserving. A failed heal is absorbed — the caller proceeds
    /// with an empty in-memory portfolio either way.
    async fn self_heal(&mut self, token: &str, id: &str) {
        match self.try_self_heal(token, id).await {
            Ok(()) => debug!(etag = ?self.etag, "self-heal complete"),
            Err(e) => {
                error!(error = %e, "self-heal failed; continuing with empty in-memory portfolio");
            }
        }
    }

    async fn try_self_heal(&mut self, token: &str, id: &str) -> Result<(), CoreError> {
        let empty = serde_json::to_string(&Portfolio::default())
            .map_err(|e| CoreError::Serialization(e.to_string()))?;
        let updated = self.store.update(token, id, None, &empty).await?;
        self.etag = self.store.version_tag(token, &updated.id).await?;
        self.cache.write(&empty)?;
        Ok(())
    }
}
