use async_trait::async_trait;

use crate::errors::CoreError;

/// Identity of a remote document as reported by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub id: String,
    pub name: String,
}

/// Trait abstraction over the remote document store.
///
/// Exactly the five operations the sync engine consumes — no business
/// logic lives behind this seam. The HTTP-backed implementation is
/// `drive::DriveClient`; tests substitute an in-memory store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// List documents in the app-private space whose name matches exactly.
    async fn list(&self, token: &str, name_equals: &str) -> Result<Vec<RemoteFile>, CoreError>;

    /// Read the current version tag of a document.
    ///
    /// `Ok(None)` when the store omits versioning headers or the metadata
    /// read is rejected — tag absence is tolerated, only transport
    /// failures are errors.
    async fn version_tag(&self, token: &str, file_id: &str) -> Result<Option<String>, CoreError>;

    /// Download the document content as text.
    async fn download(&self, token: &str, file_id: &str) -> Result<String, CoreError>;

    /// Create a document in the app-private space and return its identity.
    async fn create(
        &self,
        token: &str,
        name: &str,
        content: &str,
    ) -> Result<RemoteFile, CoreError>;

    /// Overwrite a document's content. When `precondition` carries a
    /// version tag the write is conditional and a mismatch fails with
    /// `CoreError::VersionConflict`; with `None` the write is
    /// last-write-wins.
    async fn update(
        &self,
        token: &str,
        file_id: &str,
        precondition: Option<&str>,
        content: &str,
    ) -> Result<RemoteFile, CoreError>;
}
