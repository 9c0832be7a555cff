use std::collections::HashMap;

use super::portfolio::Portfolio;

/// One holding, projected for display: derived quantities already computed
/// against the last known price.
#[derive(Debug, Clone, PartialEq)]
pub struct HoldingView {
    pub symbol: String,
    pub qty: f64,
    pub avg_cost: f64,
    pub last_price: f64,
    pub pnl_abs: f64,
    pub pnl_pct: f64,
}

/// View-ready projection of the whole portfolio, combining the document
/// with the last known price map. Symbols missing from the price map
/// project with a last price of 0.0 rather than failing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortfolioSnapshot {
    pub display_currency: String,
    pub holdings: Vec<HoldingView>,
}

impl PortfolioSnapshot {
    pub fn project(portfolio: &Portfolio, prices: &HashMap<String, f64>) -> Self {
        let holdings = portfolio
            .holdings
            .iter()
            .map(|h| {
                let last = prices.get(&h.symbol).copied().unwrap_or(0.0);
                HoldingView {
                    symbol: h.symbol.clone(),
                    qty: h.total_qty(),
                    avg_cost: h.avg_cost(),
                    last_price: last,
                    pnl_abs: h.pnl_abs(last),
                    pnl_pct: h.pnl_pct(last),
                }
            })
            .collect();

        Self {
            display_currency: portfolio.display_currency.clone(),
            holdings,
        }
    }
}
