use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

pub mod browser;
pub mod extract;
pub mod page;
pub mod scroll;
pub mod static_page;

#[cfg(test)]
pub(crate) mod testing;

use crate::config::{AppConfig, ScrapingConfig};
use crate::error::{ScraperResult, SkipReason};
use extract::ListingExtractor;
use page::PageDriver;
use scroll::{ScrollOutcome, ScrollSettings};

/// Placeholder for a price or image that could not be extracted
pub const NOT_AVAILABLE: &str = "N/A";

/// One scraped vehicle advertisement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub title: String,
    pub price: String,
    pub img_url: String,
}

/// Result of extracting a single candidate element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingOutcome {
    Scraped(ListingRecord),
    Skipped { index: usize, reason: SkipReason },
}

/// A candidate that did not yield a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedListing {
    pub index: usize,
    pub reason: SkipReason,
}

/// Everything one pass over the results page produced
#[derive(Debug, Clone)]
pub struct ScrapeReport {
    pub records: Vec<ListingRecord>,
    pub skipped: Vec<SkippedListing>,
    /// Candidates considered, after the listing cap
    pub candidates: usize,
    pub scroll: ScrollOutcome,
}

impl ScrapeReport {
    fn from_outcomes(outcomes: Vec<ListingOutcome>, scroll: ScrollOutcome) -> Self {
        let candidates = outcomes.len();
        let mut records = Vec::with_capacity(candidates);
        let mut skipped = Vec::new();

        for outcome in outcomes {
            match outcome {
                ListingOutcome::Scraped(record) => records.push(record),
                ListingOutcome::Skipped { index, reason } => skipped.push(SkippedListing { index, reason }),
            }
        }

        Self { records, skipped, candidates, scroll }
    }
}

/// Loads the results page and extracts every listing on it
pub struct ListingScraper {
    config: ScrapingConfig,
    settle_delay: Duration,
    extractor: ListingExtractor,
}

impl ListingScraper {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            config: config.scraping.clone(),
            settle_delay: Duration::from_millis(config.browser.settle_delay_ms),
            extractor: ListingExtractor::new(config.selectors.clone()),
        }
    }

    pub fn target_url(&self) -> &str {
        &self.config.target_url
    }

    /// Navigate, scroll, wait for listings and extract them
    pub async fn scrape_page<D: PageDriver>(&self, driver: &mut D) -> ScraperResult<ScrapeReport> {
        info!("Loading {}", self.config.target_url);
        driver.navigate(&self.config.target_url).await?;
        tokio::time::sleep(self.settle_delay).await;

        let scroll = scroll::scroll_page(driver, &ScrollSettings::from(&self.config)).await?;
        debug!(
            "Scrolled {} times (height {} -> {}, converged: {})",
            scroll.iterations, scroll.initial_height, scroll.final_height, scroll.converged
        );

        let outcomes = self.extract_listings(driver).await?;
        let report = ScrapeReport::from_outcomes(outcomes, scroll);

        info!(
            "Extracted {} of {} listings ({} skipped)",
            report.records.len(),
            report.candidates,
            report.skipped.len()
        );

        Ok(report)
    }

    /// Wait for the listing container selector and extract up to `max_listings`.
    ///
    /// A timeout here fails the run; per-listing failures only skip the listing.
    pub async fn extract_listings<D: PageDriver>(&self, driver: &D) -> ScraperResult<Vec<ListingOutcome>> {
        let listing_selector = &self.extractor.selectors().listing;

        driver
            .wait_for_selector(listing_selector, self.config.wait_timeout())
            .await?;

        let mut candidates = driver.query_all(listing_selector).await?;
        debug!("Found {} candidate listings", candidates.len());
        candidates.truncate(self.config.max_listings);

        let mut outcomes = Vec::with_capacity(candidates.len());
        for (index, listing) in candidates.iter().enumerate() {
            outcomes.push(self.extractor.extract_listing(index, listing).await);
        }

        Ok(outcomes)
    }
}
