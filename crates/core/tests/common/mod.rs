#![allow(dead_code)]

// ═══════════════════════════════════════════════════════════════════
// Shared Test Doubles — in-memory document store, scripted price feeds
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use gaino_core::errors::CoreError;
use gaino_core::market::feed::PriceFeed;
use gaino_core::models::prices::PricesPayload;
use gaino_core::store::traits::{DocumentStore, RemoteFile};

// ═══════════════════════════════════════════════════════════════════
// MemoryStore — an in-memory DocumentStore with revision tags
// ═══════════════════════════════════════════════════════════════════

struct StoredDoc {
    id: String,
    name: String,
    content: String,
    revision: u64,
}

#[derive(Default)]
struct State {
    files: Vec<StoredDoc>,
    next_id: usize,
    serve_tags: bool,
    injected_conflicts: usize,
    fail_lists: bool,
    fail_downloads: bool,
    fail_updates: bool,
    create_calls: usize,
    update_calls: usize,
}

/// In-memory document store. Every successful write bumps a per-file
/// revision; the version tag is `rev-<revision>`. Failure modes are
/// scripted per test. Clones share the same underlying state, so a test
/// can keep a handle after boxing one into the engine.
#[derive(Clone)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                serve_tags: true,
                ..State::default()
            })),
        }
    }

    /// Pre-populate a remote document. Returns its id.
    pub fn seed(&self, name: &str, content: &str) -> String {
        let mut st = self.state.lock().unwrap();
        st.next_id += 1;
        let id = format!("file-{}", st.next_id);
        st.files.push(StoredDoc {
            id: id.clone(),
            name: name.to_string(),
            content: content.to_string(),
            revision: 1,
        });
        id
    }

    /// Simulate another client writing the document behind our back:
    /// replaces the content and bumps the revision, invalidating any
    /// previously read version tag.
    pub fn external_write(&self, name: &str, content: &str) {
        let mut st = self.state.lock().unwrap();
        let file = st
            .files
            .iter_mut()
            .find(|f| f.name == name)
            .expect("external_write: no such document");
        file.content = content.to_string();
        file.revision += 1;
    }

    /// Reject the next `n` conditional updates with a version conflict,
    /// regardless of the supplied tag.
    pub fn inject_conflicts(&self, n: usize) {
        self.state.lock().unwrap().injected_conflicts = n;
    }

    /// Stop serving version tags (store omits versioning headers).
    pub fn serve_no_tags(&self) {
        self.state.lock().unwrap().serve_tags = false;
    }

    pub fn fail_lists(&self) {
        self.state.lock().unwrap().fail_lists = true;
    }

    pub fn fail_downloads(&self) {
        self.state.lock().unwrap().fail_downloads = true;
    }

    pub fn fail_updates(&self) {
        self.state.lock().unwrap().fail_updates = true;
    }

    pub fn content_of(&self, name: &str) -> Option<String> {
        let st = self.state.lock().unwrap();
        st.files
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.content.clone())
    }

    pub fn revision_of(&self, name: &str) -> Option<u64> {
        let st = self.state.lock().unwrap();
        st.files.iter().find(|f| f.name == name).map(|f| f.revision)
    }

    pub fn file_count(&self) -> usize {
        self.state.lock().unwrap().files.len()
    }

    pub fn create_calls(&self) -> usize {
        self.state.lock().unwrap().create_calls
    }

    pub fn update_calls(&self) -> usize {
        self.state.lock().unwrap().update_calls
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list(&self, _token: &str, name_equals: &str) -> Result<Vec<RemoteFile>, CoreError> {
        let st = self.state.lock().unwrap();
        if st.fail_lists {
            return Err(CoreError::Network("connection refused".into()));
        }
        Ok(st
            .files
            .iter()
            .filter(|f| f.name == name_equals)
            .map(|f| RemoteFile {
                id: f.id.clone(),
                name: f.name.clone(),
            })
            .collect())
    }

    async fn version_tag(&self, _token: &str, file_id: &str) -> Result<Option<String>, CoreError> {
        let st = self.state.lock().unwrap();
        if !st.serve_tags {
            return Ok(None);
        }
        Ok(st
            .files
            .iter()
            .find(|f| f.id == file_id)
            .map(|f| format!("rev-{}", f.revision)))
    }

    async fn download(&self, _token: &str, file_id: &str) -> Result<String, CoreError> {
        let st = self.state.lock().unwrap();
        if st.fail_downloads {
            return Err(CoreError::Store {
                endpoint: "download".into(),
                status: 500,
            });
        }
        st.files
            .iter()
            .find(|f| f.id == file_id)
            .map(|f| f.content.clone())
            .ok_or(CoreError::Store {
                endpoint: "download".into(),
                status: 404,
            })
    }

    async fn create(
        &self,
        _token: &str,
        name: &str,
        content: &str,
    ) -> Result<RemoteFile, CoreError> {
        let mut st = self.state.lock().unwrap();
        st.create_calls += 1;
        st.next_id += 1;
        let id = format!("file-{}", st.next_id);
        st.files.push(StoredDoc {
            id: id.clone(),
            name: name.to_string(),
            content: content.to_string(),
            revision: 1,
        });
        Ok(RemoteFile {
            id,
            name: name.to_string(),
        })
    }

    async fn update(
        &self,
        _token: &str,
        file_id: &str,
        precondition: Option<&str>,
        content: &str,
    ) -> Result<RemoteFile, CoreError> {
        let mut st = self.state.lock().unwrap();
        st.update_calls += 1;
        if precondition.is_some() && st.injected_conflicts > 0 {
            st.injected_conflicts -= 1;
            return Err(CoreError::VersionConflict);
        }
        if st.fail_updates {
            return Err(CoreError::Store {
                endpoint: "update".into(),
                status: 500,
            });
        }
        let file = st
            .files
            .iter_mut()
            .find(|f| f.id == file_id)
            .ok_or(CoreError::Store {
                endpoint: "update".into(),
                status: 404,
            })?;
        if let Some(tag) = precondition {
            if tag != format!("rev-{}", file.revision) {
                return Err(CoreError::VersionConflict);
            }
        }
        file.content = content.to_string();
        file.revision += 1;
        Ok(RemoteFile {
            id: file.id.clone(),
            name: file.name.clone(),
        })
    }
}

// ═══════════════════════════════════════════════════════════════════
// Price feed doubles
// ═══════════════════════════════════════════════════════════════════

/// Feed that always serves the same price map and counts its calls.
/// Clones share the call counter.
#[derive(Clone)]
pub struct StaticFeed {
    prices: HashMap<String, f64>,
    calls: Arc<AtomicUsize>,
}

impl StaticFeed {
    pub fn new(pairs: &[(&str, f64)]) -> Self {
        Self {
            prices: pairs.iter().map(|(s, p)| (s.to_string(), *p)).collect(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceFeed for StaticFeed {
    async fn fetch(&self) -> Result<PricesPayload, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(PricesPayload {
            tab: "stocks".into(),
            as_of: "2025-06-01T10:00:00Z".into(),
            prices: self.prices.clone(),
        })
    }
}

/// Feed that always fails, counting its calls. Clones share the counter.
#[derive(Clone)]
pub struct FailingFeed {
    calls: Arc<AtomicUsize>,
}

impl FailingFeed {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceFeed for FailingFeed {
    async fn fetch(&self) -> Result<PricesPayload, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(CoreError::PriceFeed("feed unreachable".into()))
    }
}
