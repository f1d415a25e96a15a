//! The seam between listing extraction and whatever renders the page.
//!
//! A real browser session and a parsed static HTML document both implement
//! these traits, so scrolling and field extraction are written once.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::ScraperResult;

/// A loaded page that can be navigated, scrolled and queried
#[async_trait(?Send)]
pub trait PageDriver: Sized {
    type Element: PageElement;

    /// Load `url` and block until the navigation settles
    async fn navigate(&mut self, url: &str) -> ScraperResult<()>;

    /// Current `document.body.scrollHeight`
    async fn scroll_height(&self) -> ScraperResult<i64>;

    /// Scroll the window to the bottom of the document
    async fn scroll_to_bottom(&self) -> ScraperResult<()>;

    /// Wait until at least one element matches `selector`.
    ///
    /// Returns `ScraperError::Timeout` once `timeout` elapses.
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> ScraperResult<()>;

    /// All elements matching `selector`, in document order
    async fn query_all(&self, selector: &str) -> ScraperResult<Vec<Self::Element>>;

    /// Release the underlying resources. Consumes the driver so it runs once.
    async fn close(self) -> ScraperResult<()>;
}

/// An element handle scoped to one node of the page
#[async_trait(?Send)]
pub trait PageElement: Sized {
    /// First descendant matching `selector`, if any
    async fn query(&self, selector: &str) -> ScraperResult<Option<Self>>;

    /// Rendered text content
    async fn text(&self) -> ScraperResult<String>;

    async fn attribute(&self, name: &str) -> ScraperResult<Option<String>>;

    async fn is_visible(&self) -> ScraperResult<bool>;
}
