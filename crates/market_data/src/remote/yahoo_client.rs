use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use common::models::{OhlcvBar, RawNewsRecord};
use reqwest::{Client, Response, StatusCode};
use tracing::{debug, info};
use url::Url;

use crate::error::RemoteError;
use crate::remote::{ChartResponse, SearchResponse};
use crate::traits::{HistoryWindow, MarketDataProvider, NewsProvider, RemoteResponse};

const NEWS_LOOKBACK_SECS: i64 = 24 * 60 * 60;

/// Price history and headlines from Yahoo Finance's public JSON endpoints.
#[derive(Clone)]
pub struct YahooClient {
    client: Client,
    base_url: String,
}

impl YahooClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (X11; Linux x86_64) market-agent/0.1")
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn chart_url(&self, ticker: &str, window: HistoryWindow) -> Result<Url, RemoteError> {
        let mut url = Url::parse(&format!("{}/v8/finance/chart/", self.base_url))
            .map_err(|e| RemoteError::Transport(format!("bad base url: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| RemoteError::Transport("base url cannot be a base".into()))?
            .pop_if_empty()
            .push(ticker);
        url.query_pairs_mut()
            .append_pair("range", window.range)
            .append_pair("interval", window.interval);
        Ok(url)
    }

    fn search_url(&self, ticker: &str, max_results: usize) -> Result<Url, RemoteError> {
        let count = max_results.to_string();
        Url::parse_with_params(
            &format!("{}/v1/finance/search", self.base_url),
            &[
                ("q", ticker),
                ("quotesCount", "0"),
                ("newsCount", count.as_str()),
            ],
        )
        .map_err(|e| RemoteError::Transport(format!("bad base url: {}", e)))
    }

    async fn check_status(endpoint: &str, resp: Response) -> Result<Response, RemoteError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(RemoteError::Status {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl MarketDataProvider for YahooClient {
    async fn price_history(
        &self,
        ticker: &str,
        window: HistoryWindow,
    ) -> Result<Vec<OhlcvBar>, RemoteError> {
        let url = self.chart_url(ticker, window)?;
        debug!("GET {}", url);

        let resp = self.client.get(url).send().await?;

        // Yahoo answers 404 with a JSON body for delisted/unknown symbols.
        if resp.status() == StatusCode::NOT_FOUND {
            info!("No chart data for {}", ticker);
            return Ok(Vec::new());
        }

        let resp = Self::check_status("chart", resp).await?;
        let chart = resp
            .json::<ChartResponse>()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;

        let bars = chart.to_domain()?;
        debug!("Fetched {} bars for {}", bars.len(), ticker);
        Ok(bars)
    }
}

#[async_trait]
impl NewsProvider for YahooClient {
    async fn recent_news(
        &self,
        ticker: &str,
        max_results: usize,
    ) -> Result<Vec<RawNewsRecord>, RemoteError> {
        info!("Fetching news for {}...", ticker);
        let url = self.search_url(ticker, max_results)?;

        let resp = self.client.get(url).send().await?;
        let resp = Self::check_status("search", resp).await?;
        let search = resp
            .json::<SearchResponse>()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;

        let cutoff = Utc::now().timestamp() - NEWS_LOOKBACK_SECS;
        Ok(search.into_records(cutoff, max_results))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> YahooClient {
        YahooClient::new("https://query1.finance.yahoo.com/", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_chart_url() {
        let url = client().chart_url("BTC-USD", HistoryWindow::RECENT).unwrap();
        assert_eq!(
            url.as_str(),
            "https://query1.finance.yahoo.com/v8/finance/chart/BTC-USD?range=5d&interval=1h"
        );

        let url = client().chart_url("a/b", HistoryWindow::BACKTEST).unwrap();
        assert_eq!(
            url.as_str(),
            "https://query1.finance.yahoo.com/v8/finance/chart/a%2Fb?range=60d&interval=1h"
        );
    }

    #[test]
    fn test_search_url() {
        let url = client().search_url("BTC-USD", 3).unwrap();
        assert_eq!(
            url.as_str(),
            "https://query1.finance.yahoo.com/v1/finance/search?q=BTC-USD&quotesCount=0&newsCount=3"
        );
    }
}
