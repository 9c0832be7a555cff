use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, error, warn};

use crate::storage::cache::CacheFile;

use super::feed::PriceFeed;

/// How long a fetched price snapshot stays fresh.
pub const TTL_MS: i64 = 90_000;

/// On-disk shape of the persisted price snapshot.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredPrices {
    /// Millis since epoch of the fetch that produced this snapshot.
    fetched_at: i64,
    #[serde(default)]
    prices: HashMap<String, f64>,
}

/// Bounded-staleness read-through cache over the price feed.
///
/// Prices are a soft-real-time, best-effort signal: a fresh-enough snapshot
/// is served without touching the network, a failed fetch falls back to the
/// stale snapshot regardless of age, and with nothing cached the result is
/// an empty map. Never fails outward.
pub struct PriceRepo {
    feed: Box<dyn PriceFeed>,
    cache: CacheFile,
}

impl PriceRepo {
    pub fn new(feed: Box<dyn PriceFeed>, cache_path: impl Into<PathBuf>) -> Self {
        Self {
            feed,
            cache: CacheFile::new(cache_path),
        }
    }

    /// Symbol → last-known price. `force` bypasses the freshness window
    /// but not the stale-on-error fallback.
    pub async fn get_prices(&self, force: bool) -> HashMap<String, f64> {
        let now = Utc::now().timestamp_millis();
        let stored = self.read_stored();

        if !force {
            if let Some(snapshot) = &stored {
                if now - snapshot.fetched_at < TTL_MS {
                    debug!(age_ms = now - snapshot.fetched_at, "serving prices from fresh cache");
                    return snapshot.prices.clone();
                }
            }
        }

        match self.feed.fetch().await {
            Ok(payload) => {
                debug!(
                    tab = %payload.tab,
                    as_of = %payload.as_of,
                    count = payload.prices.len(),
                    "fetched prices from feed"
                );
                self.persist(now, &payload.prices);
                payload.prices
            }
            Err(e) => {
                error!(error = %e, "price fetch failed; falling back to stale cache");
                stored.map(|s| s.prices).unwrap_or_default()
            }
        }
    }

    fn read_stored(&self) -> Option<StoredPrices> {
        let text = self.cache.read()?;
        match serde_json::from_str(&text) {
            Ok(stored) => Some(stored),
            Err(e) => {
                warn!(error = %e, "failed to parse cached prices");
                None
            }
        }
    }

    fn persist(&self, fetched_at: i64, prices: &HashMap<String, f64>) {
        let snapshot = StoredPrices {
            fetched_at,
            prices: prices.clone(),
        };
        match serde_json::to_string(&snapshot) {
            Ok(json) => {
                if let Err(e) = self.cache.write(&json) {
                    warn!(error = %e, "failed to persist price snapshot");
                }
            }
            Err(e) => warn!(error = %e, "failed to serialize price snapshot"),
        }
    }
}
