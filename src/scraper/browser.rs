#[cfg(feature = "browser")]
use async_trait::async_trait;
#[cfg(feature = "browser")]
use playwright::api::frame::FrameState;
#[cfg(feature = "browser")]
use playwright::api::{Browser, BrowserContext, ElementHandle, Page};
#[cfg(feature = "browser")]
use playwright::Playwright;
#[cfg(feature = "browser")]
use std::time::Duration;
#[cfg(feature = "browser")]
use tracing::{debug, info};

use crate::config::BrowserConfig;
#[cfg(feature = "browser")]
use super::page::{PageDriver, PageElement};
use crate::error::{ScraperError, ScraperResult};

/// Browser session using Playwright.
///
/// Owns the driver process, the browser, and the single page everything
/// happens in. `close` consumes the session.
#[cfg(feature = "browser")]
pub struct BrowserSession {
    _playwright: Playwright,
    browser: Browser,
    _context: BrowserContext,
    page: Page,
    page_timeout: Duration,
}

#[cfg(feature = "browser")]
impl BrowserSession {
    /// Start the Playwright driver and launch a browser
    pub async fn open(config: &BrowserConfig, user_agent: &str) -> ScraperResult<Self> {
        debug!("Initializing browser session (headless: {})", config.headless);

        let playwright = Playwright::initialize()
            .await
            .map_err(|e| ScraperError::session(format!("Failed to start Playwright driver: {}", e)))?;

        // Without an explicit executable, make sure the bundled browsers exist
        if config.driver_path.is_none() {
            playwright
                .prepare()
                .map_err(|e| ScraperError::session(format!("Failed to install browsers: {}", e)))?;
        }

        let page_timeout = Duration::from_secs(config.page_timeout_seconds);
        let chromium = playwright.chromium();
        let mut launcher = chromium
            .launcher()
            .headless(config.headless)
            .timeout(page_timeout.as_millis() as f64);

        if let Some(path) = &config.driver_path {
            launcher = launcher.executable(path);
        }

        let browser = launcher
            .launch()
            .await
            .map_err(|e| ScraperError::session(format!("Failed to launch browser: {}", e)))?;

        let context = browser
            .context_builder()
            .user_agent(user_agent)
            .build()
            .await
            .map_err(|e| ScraperError::session(format!("Failed to create browser context: {}", e)))?;

        let page = context
            .new_page()
            .await
            .map_err(|e| ScraperError::session(format!("Failed to open page: {}", e)))?;

        info!("Browser session opened");

        Ok(Self {
            _playwright: playwright,
            browser,
            _context: context,
            page,
            page_timeout,
        })
    }

    async fn evaluate(&self, expression: &str) -> ScraperResult<serde_json::Value> {
        self.page
            .evaluate::<(), serde_json::Value>(expression, ())
            .await
            .map_err(|e| ScraperError::script(format!("{}: {}", expression, e)))
    }
}

#[cfg(feature = "browser")]
#[async_trait(?Send)]
impl PageDriver for BrowserSession {
    type Element = BrowserElement;

    async fn navigate(&mut self, url: &str) -> ScraperResult<()> {
        debug!("Navigating to {}", url);

        self.page
            .goto_builder(url)
            .timeout(self.page_timeout.as_millis() as f64)
            .goto()
            .await
            .map_err(|e| ScraperError::navigation(url, e.to_string()))?;

        Ok(())
    }

    async fn scroll_height(&self) -> ScraperResult<i64> {
        let value = self.evaluate("document.body.scrollHeight").await?;

        value
            .as_i64()
            .or_else(|| value.as_f64().map(|h| h as i64))
            .ok_or_else(|| ScraperError::script(format!("Unexpected scrollHeight: {}", value)))
    }

    async fn scroll_to_bottom(&self) -> ScraperResult<()> {
        self.evaluate("window.scrollTo(0, document.body.scrollHeight)").await?;
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> ScraperResult<()> {
        // Presence in the DOM is enough; lazy placeholders may not be visible yet
        self.page
            .wait_for_selector_builder(selector)
            .state(FrameState::Attached)
            .timeout(timeout.as_millis() as f64)
            .wait_for_selector()
            .await
            .map_err(|e| {
                let message = e.to_string();
                if message.to_lowercase().contains("timeout") {
                    ScraperError::Timeout {
                        selector: selector.to_string(),
                        seconds: timeout.as_secs(),
                    }
                } else {
                    ScraperError::script(message)
                }
            })?;

        Ok(())
    }

    async fn query_all(&self, selector: &str) -> ScraperResult<Vec<BrowserElement>> {
        let handles = self
            .page
            .query_selector_all(selector)
            .await
            .map_err(|e| ScraperError::script(format!("query '{}': {}", selector, e)))?;

        Ok(handles.into_iter().map(|handle| BrowserElement { handle }).collect())
    }

    async fn close(self) -> ScraperResult<()> {
        self.browser
            .close()
            .await
            .map_err(|e| ScraperError::session(format!("Failed to close browser: {}", e)))?;

        info!("Browser session closed");
        Ok(())
    }
}

/// A live DOM element inside the browser page
#[cfg(feature = "browser")]
pub struct BrowserElement {
    handle: ElementHandle,
}

#[cfg(feature = "browser")]
#[async_trait(?Send)]
impl PageElement for BrowserElement {
    async fn query(&self, selector: &str) -> ScraperResult<Option<Self>> {
        let handle = self
            .handle
            .query_selector(selector)
            .await
            .map_err(|e| ScraperError::script(format!("query '{}': {}", selector, e)))?;

        Ok(handle.map(|handle| BrowserElement { handle }))
    }

    async fn text(&self) -> ScraperResult<String> {
        self.handle
            .inner_text()
            .await
            .map_err(|e| ScraperError::script(format!("innerText: {}", e)))
    }

    async fn attribute(&self, name: &str) -> ScraperResult<Option<String>> {
        self.handle
            .get_attribute(name)
            .await
            .map_err(|e| ScraperError::script(format!("attribute '{}': {}", name, e)))
    }

    async fn is_visible(&self) -> ScraperResult<bool> {
        self.handle
            .is_visible()
            .await
            .map_err(|e| ScraperError::script(format!("visibility: {}", e)))
    }
}

// Stub implementation when browser feature is disabled. Both types are
// uninhabited: `open` is the only way to get a session and it always fails.
#[cfg(not(feature = "browser"))]
mod stub {
    use async_trait::async_trait;
    use std::convert::Infallible;
    use std::time::Duration;

    use crate::error::ScraperResult;
    use crate::scraper::page::{PageDriver, PageElement};

    pub struct BrowserSession(pub(super) Infallible);

    pub struct BrowserElement(Infallible);

    #[async_trait(?Send)]
    impl PageDriver for BrowserSession {
        type Element = BrowserElement;

        async fn navigate(&mut self, _url: &str) -> ScraperResult<()> {
            match self.0 {}
        }

        async fn scroll_height(&self) -> ScraperResult<i64> {
            match self.0 {}
        }

        async fn scroll_to_bottom(&self) -> ScraperResult<()> {
            match self.0 {}
        }

        async fn wait_for_selector(&self, _selector: &str, _timeout: Duration) -> ScraperResult<()> {
            match self.0 {}
        }

        async fn query_all(&self, _selector: &str) -> ScraperResult<Vec<BrowserElement>> {
            match self.0 {}
        }

        async fn close(self) -> ScraperResult<()> {
            match self.0 {}
        }
    }

    #[async_trait(?Send)]
    impl PageElement for BrowserElement {
        async fn query(&self, _selector: &str) -> ScraperResult<Option<Self>> {
            match self.0 {}
        }

        async fn text(&self) -> ScraperResult<String> {
            match self.0 {}
        }

        async fn attribute(&self, _name: &str) -> ScraperResult<Option<String>> {
            match self.0 {}
        }

        async fn is_visible(&self) -> ScraperResult<bool> {
            match self.0 {}
        }
    }
}

#[cfg(not(feature = "browser"))]
pub use stub::{BrowserElement, BrowserSession};

#[cfg(not(feature = "browser"))]
impl BrowserSession {
    pub async fn open(_config: &BrowserConfig, _user_agent: &str) -> ScraperResult<Self> {
        Err(ScraperError::session(
            "Browser feature not enabled; rebuild with `--features browser` or run with --static-html",
        ))
    }
}

#[cfg(all(test, not(feature = "browser")))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_without_feature_fails() {
        let result = BrowserSession::open(&BrowserConfig::default(), "test-agent").await;
        match result {
            Err(ScraperError::Session { message }) => assert!(message.contains("--features browser")),
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("stub session must not open"),
        }
    }
}

#[cfg(all(test, feature = "browser"))]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "launches a real browser"]
    async fn test_wait_accepts_listings_not_yet_visible() {
        let config = BrowserConfig {
            headless: true,
            ..BrowserConfig::default()
        };
        let mut session = BrowserSession::open(&config, "test-agent").await.unwrap();
        session
            .navigate("data:text/html,<div data-testid=SearchResultListItem style=display:none>x</div>")
            .await
            .unwrap();

        let waited = session
            .wait_for_selector(r#"[data-testid="SearchResultListItem"]"#, Duration::from_secs(2))
            .await;
        let found = session.query_all(r#"[data-testid="SearchResultListItem"]"#).await.unwrap().len();
        session.close().await.unwrap();

        waited.unwrap();
        assert_eq!(found, 1);
    }
}
