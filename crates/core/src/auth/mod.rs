use async_trait::async_trait;

/// Source of short-lived bearer credentials for the document store.
///
/// Absence of a token is not an error — it signals "operate offline" and
/// the sync engine degrades to its local cache. Implementations must
/// absorb their own failures and return `None`.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn access_token(&self) -> Option<String>;
}

/// Provider backed by a fixed token (or none at all). Useful for embedders
/// that manage token refresh themselves, and for tests.
pub struct StaticTokenProvider {
    token: Option<String>,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    /// A provider that always reports "offline".
    pub fn offline() -> Self {
        Self { token: None }
    }
}

#[async_trait]
impl AccessTokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Option<String> {
        self.token.clone()
    }
}
