//! Scripted page and element doubles for driving the scraper in tests.

use async_trait::async_trait;
use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::time::Duration;

use super::page::{PageDriver, PageElement};
use crate::error::{ScraperError, ScraperResult};

/// A page whose heights and listings are fixed up front
pub struct ScriptedPage {
    heights: Vec<i64>,
    height_reads: Cell<usize>,
    scrolls: Cell<usize>,
    listings: Vec<ScriptedElement>,
    navigations: Vec<String>,
    fail_navigation: bool,
    closes: Rc<Cell<usize>>,
}

impl ScriptedPage {
    /// Successive `scroll_height` reads return these values, repeating the last
    pub fn with_heights(heights: Vec<i64>) -> Self {
        Self {
            heights,
            height_reads: Cell::new(0),
            scrolls: Cell::new(0),
            listings: Vec::new(),
            navigations: Vec::new(),
            fail_navigation: false,
            closes: Rc::new(Cell::new(0)),
        }
    }

    pub fn with_listings(mut self, listings: Vec<ScriptedElement>) -> Self {
        self.listings = listings;
        self
    }

    pub fn failing_navigation(mut self) -> Self {
        self.fail_navigation = true;
        self
    }

    pub fn scroll_count(&self) -> usize {
        self.scrolls.get()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.clone()
    }

    /// Shared counter that outlives the page once it is closed
    pub fn close_counter(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.closes)
    }
}

#[async_trait(?Send)]
impl PageDriver for ScriptedPage {
    type Element = ScriptedElement;

    async fn navigate(&mut self, url: &str) -> ScraperResult<()> {
        if self.fail_navigation {
            return Err(ScraperError::navigation(url, "browser crashed"));
        }
        self.navigations.push(url.to_string());
        Ok(())
    }

    async fn scroll_height(&self) -> ScraperResult<i64> {
        let read = self.height_reads.get();
        self.height_reads.set(read + 1);

        self.heights
            .get(read)
            .or_else(|| self.heights.last())
            .copied()
            .ok_or_else(|| ScraperError::script("no heights scripted"))
    }

    async fn scroll_to_bottom(&self) -> ScraperResult<()> {
        self.scrolls.set(self.scrolls.get() + 1);
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> ScraperResult<()> {
        if self.listings.is_empty() {
            return Err(ScraperError::Timeout {
                selector: selector.to_string(),
                seconds: timeout.as_secs(),
            });
        }
        Ok(())
    }

    async fn query_all(&self, _selector: &str) -> ScraperResult<Vec<ScriptedElement>> {
        Ok(self.listings.clone())
    }

    async fn close(self) -> ScraperResult<()> {
        self.closes.set(self.closes.get() + 1);
        Ok(())
    }
}

/// An element whose descendants are keyed by the exact selector string
#[derive(Debug, Clone, Default)]
pub struct ScriptedElement {
    text: String,
    attributes: HashMap<String, String>,
    hidden: bool,
    children: HashMap<String, ScriptedElement>,
    failing: HashSet<String>,
}

impl ScriptedElement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn with_child(mut self, selector: &str, child: ScriptedElement) -> Self {
        self.children.insert(selector.to_string(), child);
        self
    }

    pub fn with_failing_query(mut self, selector: &str) -> Self {
        self.failing.insert(selector.to_string());
        self
    }
}

#[async_trait(?Send)]
impl PageElement for ScriptedElement {
    async fn query(&self, selector: &str) -> ScraperResult<Option<Self>> {
        if self.failing.contains(selector) {
            return Err(ScraperError::script(format!("stale element while querying {}", selector)));
        }
        Ok(self.children.get(selector).cloned())
    }

    async fn text(&self) -> ScraperResult<String> {
        Ok(self.text.clone())
    }

    async fn attribute(&self, name: &str) -> ScraperResult<Option<String>> {
        Ok(self.attributes.get(name).cloned())
    }

    async fn is_visible(&self) -> ScraperResult<bool> {
        Ok(!self.hidden)
    }
}
