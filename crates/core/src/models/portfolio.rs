use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Client identifier written into every document this library produces.
pub const CLIENT_ID: &str = "gaino-core";

fn default_version() -> u32 {
    1
}

fn default_currency() -> String {
    "INR".to_string()
}

fn default_kind() -> String {
    "stock".to_string()
}

fn default_client() -> String {
    CLIENT_ID.to_string()
}

/// The one authoritative document: everything the app persists remotely
/// lives in here as a single JSON file.
///
/// The value is immutable — every mutation produces a new `Portfolio`,
/// never edits in place. Missing or unknown fields deserialize to their
/// defaults so older writers stay readable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    /// Document schema version, currently 1.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Currency all portfolio values are displayed in.
    #[serde(default = "default_currency")]
    pub display_currency: String,

    /// Holdings in insertion order of each symbol's first lot.
    #[serde(default)]
    pub holdings: Vec<Holding>,

    /// RFC 3339 timestamp of the last mutation, if any.
    #[serde(default)]
    pub last_modified_at: Option<String>,

    /// Free-form identifier of the client that last wrote the document.
    #[serde(default = "default_client")]
    pub last_modified_by_client: String,
}

impl Default for Portfolio {
    fn default() -> Self {
        Self {
            version: 1,
            display_currency: default_currency(),
            holdings: Vec::new(),
            last_modified_at: None,
            last_modified_by_client: default_client(),
        }
    }
}

impl Portfolio {
    /// Append a lot to the holding with this exact symbol, or create a new
    /// holding (id = symbol, kind "stock", currency "INR") if none exists.
    /// Returns a new `Portfolio`; `self` is untouched. This is the only
    /// mutation path — lots are never edited or removed.
    #[must_use]
    pub fn upsert_lot(&self, symbol: &str, qty: f64, price: f64, date_iso: &str) -> Portfolio {
        let lot = Lot {
            qty,
            price,
            date: date_iso.to_string(),
        };

        let mut holdings = self.holdings.clone();
        match holdings.iter_mut().find(|h| h.symbol == symbol) {
            Some(holding) => holding.lots.push(lot),
            None => holdings.push(Holding {
                id: symbol.to_string(),
                kind: default_kind(),
                symbol: symbol.to_string(),
                currency: default_currency(),
                lots: vec![lot],
            }),
        }

        Portfolio {
            holdings,
            last_modified_at: Some(Utc::now().to_rfc3339()),
            last_modified_by_client: default_client(),
            ..self.clone()
        }
    }

    /// Look up a holding by exact symbol.
    #[must_use]
    pub fn holding(&self, symbol: &str) -> Option<&Holding> {
        self.holdings.iter().find(|h| h.symbol == symbol)
    }
}

/// One tracked instrument and its purchase history.
/// At most one `Holding` exists per distinct symbol; `symbol` is the
/// merge key for lot upserts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    /// Stable identifier, currently equal to the symbol.
    pub id: String,

    /// Asset class tag (e.g. "stock").
    #[serde(default = "default_kind")]
    pub kind: String,

    pub symbol: String,

    #[serde(default = "default_currency")]
    pub currency: String,

    /// Purchase lots, append-only, in purchase order.
    #[serde(default)]
    pub lots: Vec<Lot>,
}

impl Holding {
    /// Sum of all lot quantities.
    #[must_use]
    pub fn total_qty(&self) -> f64 {
        self.lots.iter().map(|l| l.qty).sum()
    }

    /// Quantity-weighted average unit cost. 0.0 when nothing is held.
    #[must_use]
    pub fn avg_cost(&self) -> f64 {
        let total_cost: f64 = self.lots.iter().map(|l| l.qty * l.price).sum();
        let qty = self.total_qty();
        if qty > 0.0 {
            total_cost / qty
        } else {
            0.0
        }
    }

    /// Market value of the position at the given last price.
    #[must_use]
    pub fn current_value(&self, last_price: f64) -> f64 {
        self.total_qty() * last_price
    }

    /// Absolute profit/loss: current value minus invested capital.
    #[must_use]
    pub fn pnl_abs(&self, last_price: f64) -> f64 {
        let invested: f64 = self.lots.iter().map(|l| l.qty * l.price).sum();
        self.current_value(last_price) - invested
    }

    /// Percent profit/loss over invested capital. 0.0 when nothing was
    /// invested.
    #[must_use]
    pub fn pnl_pct(&self, last_price: f64) -> f64 {
        let invested: f64 = self.lots.iter().map(|l| l.qty * l.price).sum();
        if invested > 0.0 {
            self.pnl_abs(last_price) / invested * 100.0
        } else {
            0.0
        }
    }
}

/// One discrete purchase record. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lot {
    /// Signed quantity; negative lots record disposals by convention.
    pub qty: f64,

    /// Unit cost at purchase.
    pub price: f64,

    /// ISO calendar date (yyyy-mm-dd).
    pub date: String,
}
