use crate::config::Config;
use crate::consolidator::UpstreamSource;
use crate::errors::AppError;
use serde_json::Value;
use std::time::Duration;

/// Page size requested from the purchase-detail upstream.
pub const DETAIL_PAGE_LIMIT: u32 = 100;

/// Client for the segmentation, customer registry and purchase-detail upstreams.
///
/// Every call is a single attempt bounded by the configured timeout.
#[derive(Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    base_url: String,
}

impl UpstreamClient {
    /// Creates a new `UpstreamClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL shared by the three upstreams, without trailing slash.
    /// * `timeout` - Per-call timeout.
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                AppError::InternalError(format!("Failed to create upstream client: {}", e))
            })?;

        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Self::new(config.api_base_url.clone(), config.upstream_timeout())
    }

    /// GET /api/segmentation/customers
    pub async fn fetch_segments(&self) -> Result<Value, AppError> {
        self.get_json(UpstreamSource::Segments, "/api/segmentation/customers", &[])
            .await
    }

    /// GET /api/clientes
    pub async fn fetch_customers(&self) -> Result<Value, AppError> {
        self.get_json(UpstreamSource::Customers, "/api/clientes", &[])
            .await
    }

    /// GET /api/clientes/detalles?page={page}&limit=100
    ///
    /// # Arguments
    ///
    /// * `source` - `DetailsPage1` or `DetailsPage2`; any other source is rejected.
    pub async fn fetch_detail_page(&self, source: UpstreamSource) -> Result<Value, AppError> {
        let page = match source {
            UpstreamSource::DetailsPage1 => "1",
            UpstreamSource::DetailsPage2 => "2",
            other => {
                return Err(AppError::InternalError(format!(
                    "{} is not a purchase detail page",
                    other
                )))
            }
        };
        let limit = DETAIL_PAGE_LIMIT.to_string();

        self.get_json(
            source,
            "/api/clientes/detalles",
            &[("page", page), ("limit", limit.as_str())],
        )
        .await
    }

    /// Performs one GET and parses the body as JSON.
    ///
    /// Transport failures and non-success statuses map to
    /// [`AppError::UpstreamUnavailable`]; bodies that are not JSON map to
    /// [`AppError::UpstreamFormat`].
    async fn get_json(
        &self,
        source: UpstreamSource,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Value, AppError> {
        let mut url = reqwest::Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| AppError::InternalError(format!("Failed to build URL: {}", e)))?;
        // An empty pair list would still leave a bare `?` behind.
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        tracing::info!("Fetching {} from {}", source, url);

        let response = self.client.get(url).send().await.map_err(|e| {
            AppError::UpstreamUnavailable(format!("{} request failed: {}", source, e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!("{} returned {}: {}", source, status, error_text);
            return Err(AppError::UpstreamUnavailable(format!(
                "{} returned status {}",
                source, status
            )));
        }

        let body = response.text().await.map_err(|e| {
            AppError::UpstreamUnavailable(format!("Failed to read {} response: {}", source, e))
        })?;

        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!("{} body is not valid JSON: {}", source, e);
            AppError::UpstreamFormat(format!("Failed to parse {} response: {}", source, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_client_creation() {
        let client = UpstreamClient::new("https://example.com".to_string(), Duration::from_secs(5));
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_detail_page_rejects_non_detail_sources() {
        // Unroutable base: the call must fail before any request is sent.
        let client =
            UpstreamClient::new("http://127.0.0.1:9".to_string(), Duration::from_secs(1)).unwrap();

        for source in [UpstreamSource::Segments, UpstreamSource::Customers] {
            let err = client.fetch_detail_page(source).await.unwrap_err();
            assert!(matches!(err, AppError::InternalError(_)), "{}", err);
            assert!(err.to_string().contains("not a purchase detail page"));
        }
    }
}
