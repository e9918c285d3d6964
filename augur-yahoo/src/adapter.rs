use async_trait::async_trait;
use reqwest::StatusCode;
use url::Url;

use augur_core::AugurError;

use crate::PROVIDER_NAME;
use crate::chart::{ChartEnvelope, map_chart_error};

/// Default host of the chart endpoint.
pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com/";

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

/// Source of daily chart payloads, injectable for tests.
#[async_trait]
pub trait ChartSource: Send + Sync {
    /// Fetch daily bars for `symbol` between two epoch-second bounds.
    ///
    /// # Errors
    /// `NotFound` for unknown symbols, `Provider` for transport or decode failures.
    async fn chart(
        &self,
        symbol: &str,
        period1: i64,
        period2: i64,
    ) -> Result<ChartEnvelope, AugurError>;
}

/// Production source talking to the public chart endpoint over HTTPS.
#[derive(Clone)]
pub struct HttpChartSource {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpChartSource {
    /// Build against [`DEFAULT_BASE_URL`].
    ///
    /// # Errors
    /// Returns `Other` if the HTTP client cannot be constructed.
    pub fn new() -> Result<Self, AugurError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Build against a custom host, e.g. a local mock server.
    ///
    /// # Errors
    /// - `InvalidArg` if `base_url` does not parse or cannot carry a path.
    /// - `Other` if the HTTP client cannot be constructed.
    pub fn with_base_url(base_url: &str) -> Result<Self, AugurError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AugurError::Other(e.to_string()))?;
        Self::with_client(client, base_url)
    }

    /// Reuse an existing `reqwest::Client`.
    ///
    /// # Errors
    /// Returns `InvalidArg` if `base_url` does not parse or cannot carry a path.
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Result<Self, AugurError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| AugurError::InvalidArg(format!("base url {base_url:?}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(AugurError::InvalidArg(format!(
                "base url {base_url} cannot carry a path"
            )));
        }
        Ok(Self { client, base_url })
    }

    fn chart_url(&self, symbol: &str, period1: i64, period2: i64) -> Result<Url, AugurError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| AugurError::InvalidArg(format!("base url {} cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol]);
        url.query_pairs_mut()
            .append_pair("period1", &period1.to_string())
            .append_pair("period2", &period2.to_string())
            .append_pair("interval", "1d")
            .append_pair("includeAdjustedClose", "true");
        Ok(url)
    }
}

fn transport_err(e: &reqwest::Error) -> AugurError {
    AugurError::provider(PROVIDER_NAME, e.to_string())
}

#[async_trait]
impl ChartSource for HttpChartSource {
    async fn chart(
        &self,
        symbol: &str,
        period1: i64,
        period2: i64,
    ) -> Result<ChartEnvelope, AugurError> {
        let url = self.chart_url(symbol, period1, period2)?;
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_err(&e))?;
        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AugurError::not_found(format!("series for {symbol}")));
        }
        if !status.is_success() {
            // Error bodies usually carry a chart.error object worth surfacing.
            let body = resp.text().await.unwrap_or_default();
            if let Ok(env) = serde_json::from_str::<ChartEnvelope>(&body)
                && let Some(err) = env.chart.error
            {
                return Err(map_chart_error(&err, symbol));
            }
            return Err(AugurError::provider(
                PROVIDER_NAME,
                format!("http status {status}"),
            ));
        }
        resp.json::<ChartEnvelope>()
            .await
            .map_err(|e| AugurError::provider(PROVIDER_NAME, format!("malformed chart payload: {e}")))
    }
}

#[cfg(feature = "test-adapters")]
impl dyn ChartSource {
    /// Build a `ChartSource` from a closure (testing convenience).
    pub fn from_fn<F>(f: F) -> std::sync::Arc<dyn ChartSource>
    where
        F: Fn(&str, i64, i64) -> Result<ChartEnvelope, AugurError> + Send + Sync + 'static,
    {
        struct FnChart<F>(F);
        #[async_trait]
        impl<F> ChartSource for FnChart<F>
        where
            F: Fn(&str, i64, i64) -> Result<ChartEnvelope, AugurError> + Send + Sync + 'static,
        {
            async fn chart(
                &self,
                symbol: &str,
                period1: i64,
                period2: i64,
            ) -> Result<ChartEnvelope, AugurError> {
                (self.0)(symbol, period1, period2)
            }
        }
        std::sync::Arc::new(FnChart(f))
    }
}
