use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::prices::PricesPayload;

/// Read-only source of last-known market prices.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    async fn fetch(&self) -> Result<PricesPayload, CoreError>;
}

/// Price feed over a query-parameterized HTTP endpoint
/// (`GET <endpoint>?tab=stocks`).
pub struct HttpPriceFeed {
    client: Client,
    endpoint: String,
    tab: String,
}

impl HttpPriceFeed {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::for_tab(endpoint, "stocks")
    }

    pub fn for_tab(endpoint: impl Into<String>, tab: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            endpoint: endpoint.into(),
            tab: tab.into(),
        }
    }
}

#[async_trait]
impl PriceFeed for HttpPriceFeed {
    async fn fetch(&self) -> Result<PricesPayload, CoreError> {
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[("tab", self.tab.as_str())])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(CoreError::PriceFeed(format!(
                "feed returned HTTP {}",
                resp.status().as_u16()
            )));
        }

        resp.json()
            .await
            .map_err(|e| CoreError::PriceFeed(format!("failed to parse feed response: {e}")))
    }
}
