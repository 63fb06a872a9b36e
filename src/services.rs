use crate::consolidator::{self, UpstreamSource};
use crate::errors::{AppError, ResultExt};
use crate::models::Consolidation;
use crate::upstream_client::UpstreamClient;

/// Fetches the upstream payloads and consolidates them.
pub struct ConsolidationService<'a> {
    upstream: &'a UpstreamClient,
}

impl<'a> ConsolidationService<'a> {
    pub fn new(upstream: &'a UpstreamClient) -> Self {
        Self { upstream }
    }

    /// Calls segments, customers, detail page 1 and detail page 2 in that order.
    ///
    /// The first three are required and abort on any failure. Page 2 is best
    /// effort: a failed call only shrinks the result.
    pub async fn consolidate_customers(&self) -> Result<Consolidation, AppError> {
        tracing::info!("Starting consolidated customer collection");

        let segments = self
            .upstream
            .fetch_segments()
            .await
            .context("Failed to fetch customer segments")?;

        let customers = self
            .upstream
            .fetch_customers()
            .await
            .context("Failed to fetch customers")?;

        let details_page1 = self
            .upstream
            .fetch_detail_page(UpstreamSource::DetailsPage1)
            .await
            .context("Failed to fetch purchase details")?;

        let details_page2 = match self
            .upstream
            .fetch_detail_page(UpstreamSource::DetailsPage2)
            .await
        {
            Ok(page) => Some(page),
            Err(e) => {
                tracing::warn!("Continuing without purchase details page 2: {}", e);
                None
            }
        };

        consolidator::consolidate(segments, customers, details_page1, details_page2)
            .context("Failed to consolidate customer data")
    }
}
