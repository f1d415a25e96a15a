use tracing::{debug, error, info};

use super::page::PageElement;
use super::{ListingOutcome, ListingRecord, NOT_AVAILABLE};
use crate::config::SelectorConfig;
use crate::error::{ScraperError, ScraperResult, SkipReason};

/// Pulls title, price and image out of a single listing element
#[derive(Debug, Clone)]
pub struct ListingExtractor {
    selectors: SelectorConfig,
}

impl ListingExtractor {
    pub fn new(selectors: SelectorConfig) -> Self {
        Self { selectors }
    }

    pub fn selectors(&self) -> &SelectorConfig {
        &self.selectors
    }

    /// Extract one listing, turning any field failure into a skip.
    ///
    /// `index` is the position of the candidate on the page and only feeds
    /// the skip reason and log lines.
    pub async fn extract_listing<E: PageElement>(&self, index: usize, listing: &E) -> ListingOutcome {
        match self.extract_record(listing).await {
            Ok(record) => {
                info!("Scraped: {} - {} - {}", record.title, record.price, record.img_url);
                ListingOutcome::Scraped(record)
            }
            Err(e) => {
                error!("Error processing listing {}: {}", index, e);
                ListingOutcome::Skipped {
                    index,
                    reason: SkipReason::from(&e),
                }
            }
        }
    }

    async fn extract_record<E: PageElement>(&self, listing: &E) -> ScraperResult<ListingRecord> {
        let title = self.extract_title(listing).await?;
        let price = self.extract_price(listing).await?;
        let img_url = self.extract_image(listing).await;

        Ok(ListingRecord { title, price, img_url })
    }

    /// The title is mandatory; a listing without one is not a listing.
    pub async fn extract_title<E: PageElement>(&self, listing: &E) -> ScraperResult<String> {
        let element = listing
            .query(&self.selectors.title)
            .await?
            .ok_or_else(|| ScraperError::element_not_found(&self.selectors.title))?;

        Ok(element.text().await?.trim().to_string())
    }

    /// First visible match among the price selectors, in order.
    ///
    /// Hidden matches fall through to the next selector. Driver errors are
    /// not swallowed: they fail the whole record.
    pub async fn extract_price<E: PageElement>(&self, listing: &E) -> ScraperResult<String> {
        for selector in &self.selectors.price {
            let Some(element) = listing.query(selector).await? else {
                continue;
            };

            if element.is_visible().await? {
                return Ok(element.text().await?.trim().to_string());
            }

            debug!("Price element for '{}' is hidden", selector);
        }

        Ok(NOT_AVAILABLE.to_string())
    }

    /// `src`, else `data-src`, else the sentinel. Never fails.
    pub async fn extract_image<E: PageElement>(&self, listing: &E) -> String {
        match self.lookup_image(listing).await {
            Ok(Some(url)) => url,
            Ok(None) => NOT_AVAILABLE.to_string(),
            Err(e) => {
                debug!("Image lookup failed: {}", e);
                NOT_AVAILABLE.to_string()
            }
        }
    }

    async fn lookup_image<E: PageElement>(&self, listing: &E) -> ScraperResult<Option<String>> {
        let Some(img) = listing.query(&self.selectors.image).await? else {
            return Ok(None);
        };

        let src = non_empty(img.attribute("src").await?);
        if src.is_some() {
            return Ok(src);
        }

        Ok(non_empty(img.attribute("data-src").await?))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
