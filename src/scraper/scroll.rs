use std::time::Duration;
use tracing::debug;

use super::page::PageDriver;
use crate::config::ScrapingConfig;
use crate::error::ScraperResult;

/// How far and how patiently to scroll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollSettings {
    pub max_scrolls: usize,
    pub pause: Duration,
}

impl From<&ScrapingConfig> for ScrollSettings {
    fn from(config: &ScrapingConfig) -> Self {
        Self {
            max_scrolls: config.max_scrolls,
            pause: config.scroll_pause(),
        }
    }
}

/// What the scroll loop observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollOutcome {
    pub iterations: usize,
    pub initial_height: i64,
    pub final_height: i64,
    /// Height stopped growing before the iteration budget ran out
    pub converged: bool,
}

/// Scroll to the bottom repeatedly so lazy-loaded listings enter the DOM.
///
/// Stops as soon as the document height is unchanged after a pause. If the
/// height keeps changing the loop simply runs out of iterations.
pub async fn scroll_page<D: PageDriver>(driver: &D, settings: &ScrollSettings) -> ScraperResult<ScrollOutcome> {
    let initial_height = driver.scroll_height().await?;
    let mut last_height = initial_height;
    let mut iterations = 0;
    let mut converged = false;

    for _ in 0..settings.max_scrolls {
        driver.scroll_to_bottom().await?;
        tokio::time::sleep(settings.pause).await;
        iterations += 1;

        let new_height = driver.scroll_height().await?;
        debug!("Scroll {}: height {} -> {}", iterations, last_height, new_height);

        if new_height == last_height {
            converged = true;
            break;
        }
        last_height = new_height;
    }

    Ok(ScrollOutcome {
        iterations,
        initial_height,
        final_height: last_height,
        converged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scraper::testing::ScriptedPage;

    fn settings(max_scrolls: usize) -> ScrollSettings {
        ScrollSettings { max_scrolls, pause: Duration::ZERO }
    }

    #[tokio::test]
    async fn test_stops_when_height_stable() {
        let page = ScriptedPage::with_heights(vec![1000, 1000]);
        let outcome = scroll_page(&page, &settings(4)).await.unwrap();

        assert_eq!(outcome.iterations, 1);
        assert!(outcome.converged);
        assert_eq!(page.scroll_count(), 1);
    }

    #[tokio::test]
    async fn test_stops_after_growth_then_stable() {
        let page = ScriptedPage::with_heights(vec![1000, 2000, 3000, 3000]);
        let outcome = scroll_page(&page, &settings(4)).await.unwrap();

        assert_eq!(outcome.iterations, 3);
        assert!(outcome.converged);
        assert_eq!(outcome.initial_height, 1000);
        assert_eq!(outcome.final_height, 3000);
    }

    #[tokio::test]
    async fn test_bounded_when_height_never_stabilizes() {
        let page = ScriptedPage::with_heights((1..=20).map(|n| n * 1000).collect());
        let outcome = scroll_page(&page, &settings(4)).await.unwrap();

        assert_eq!(outcome.iterations, 4);
        assert!(!outcome.converged);
        assert_eq!(page.scroll_count(), 4);
        assert_eq!(outcome.final_height, 5000);
    }

    #[tokio::test]
    async fn test_zero_budget_does_not_scroll() {
        let page = ScriptedPage::with_heights(vec![1000]);
        let outcome = scroll_page(&page, &settings(0)).await.unwrap();

        assert_eq!(outcome.iterations, 0);
        assert_eq!(page.scroll_count(), 0);
    }
}
