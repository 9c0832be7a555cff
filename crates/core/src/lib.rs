pub mod auth;
pub mod errors;
pub mod market;
pub mod models;
pub mod storage;
pub mod store;
pub mod sync;

use std::collections::HashMap;
use std::path::Path;

use auth::AccessTokenProvider;
use errors::CoreError;
use market::feed::HttpPriceFeed;
use market::repo::PriceRepo;
use models::portfolio::Portfolio;
use models::view::PortfolioSnapshot;
use store::drive::DriveClient;
use sync::engine::SyncEngine;

/// Portfolio cache file name inside the app-private data directory.
const PORTFOLIO_CACHE_FILE: &str = "portfolio_cache.json";
/// Price cache file name inside the app-private data directory.
const PRICES_CACHE_FILE: &str = "prices_cache.json";

/// Main entry point for the Gaino core library.
///
/// Owns the sync engine, the price cache, the current in-memory document
/// and the last-known price map, and projects them into view-ready
/// snapshots for the presentation layer.
///
/// Mutations go through `add_lot`: the document is replaced wholesale on a
/// confirmed save; on a rejected save the prior state is retained and
/// `CoreError::SaveRejected` is surfaced.
#[must_use]
pub struct GainoTracker {
    engine: SyncEngine,
    prices: PriceRepo,
    portfolio: Portfolio,
    last_prices: HashMap<String, f64>,
}

impl std::fmt::Debug for GainoTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GainoTracker")
            .field("holdings", &self.portfolio.holdings.len())
            .field("display_currency", &self.portfolio.display_currency)
            .field("cached_prices", &self.last_prices.len())
            .finish()
    }
}

impl GainoTracker {
    /// Build a tracker from explicitly constructed collaborators. This is
    /// the composition-root seam — no ambient globals are involved.
    pub fn new(engine: SyncEngine, prices: PriceRepo) -> Self {
        Self {
            engine,
            prices,
            portfolio: Portfolio::default(),
            last_prices: HashMap::new(),
        }
    }

    /// Convenience constructor wiring the production collaborators: the
    /// remote document store, an HTTP price feed at `feed_endpoint`, and
    /// both cache files under `data_dir`.
    pub fn with_defaults(
        tokens: Box<dyn AccessTokenProvider>,
        feed_endpoint: &str,
        data_dir: &Path,
    ) -> Self {
        let engine = SyncEngine::new(
            Box::new(DriveClient::new()),
            tokens,
            data_dir.join(PORTFOLIO_CACHE_FILE),
        );
        let prices = PriceRepo::new(
            Box::new(HttpPriceFeed::new(feed_endpoint)),
            data_dir.join(PRICES_CACHE_FILE),
        );
        Self::new(engine, prices)
    }

    // ── Loading ─────────────────────────────────────────────────────

    /// Load the portfolio (remote-first, cache fallback) and the
    /// last-known prices, then project the combined snapshot.
    /// Never fails — degraded inputs produce a degraded snapshot.
    pub async fn load(&mut self) -> PortfolioSnapshot {
        self.portfolio = self.engine.load().await;
        self.last_prices = self.prices.get_prices(false).await;
        self.snapshot()
    }

    /// Re-fetch prices past the freshness window and re-project.
    pub async fn refresh_prices(&mut self) -> PortfolioSnapshot {
        self.last_prices = self.prices.get_prices(true).await;
        self.snapshot()
    }

    // ── Mutation ────────────────────────────────────────────────────

    /// Record a purchase lot dated today and persist the new document.
    pub async fn add_lot(
        &mut self,
        symbol: &str,
        qty: f64,
        price: f64,
    ) -> Result<PortfolioSnapshot, CoreError> {
        let today = chrono::Utc::now().date_naive().to_string();
        self.add_lot_on(symbol, qty, price, &today).await
    }

    /// Record a purchase lot with an explicit ISO date (backfill/import).
    ///
    /// On a confirmed save the in-memory document advances and the new
    /// snapshot is returned; otherwise the prior document is retained and
    /// `CoreError::SaveRejected` is returned for the presentation layer.
    pub async fn add_lot_on(
        &mut self,
        symbol: &str,
        qty: f64,
        price: f64,
        date_iso: &str,
    ) -> Result<PortfolioSnapshot, CoreError> {
        let updated = self.portfolio.upsert_lot(symbol.trim(), qty, price, date_iso);
        if self.engine.save(&updated).await {
            self.portfolio = updated;
            Ok(self.snapshot())
        } else {
            Err(CoreError::SaveRejected)
        }
    }

    // ── Projection ──────────────────────────────────────────────────

    /// Project the current document against the last-known prices.
    #[must_use]
    pub fn snapshot(&self) -> PortfolioSnapshot {
        PortfolioSnapshot::project(&self.portfolio, &self.last_prices)
    }

    /// The current in-memory document.
    #[must_use]
    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    /// The last-known price map used for projections.
    #[must_use]
    pub fn last_prices(&self) -> &HashMap<String, f64> {
        &self.last_prices
    }
}
