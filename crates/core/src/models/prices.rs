use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Wire payload of the read-only market price feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricesPayload {
    /// Which sheet/tab the feed served (e.g. "stocks").
    #[serde(default)]
    pub tab: String,

    /// Feed-side timestamp of the quote snapshot.
    #[serde(default)]
    pub as_of: String,

    /// Symbol → last-known price.
    #[serde(default)]
    pub prices: HashMap<String, f64>,
}
