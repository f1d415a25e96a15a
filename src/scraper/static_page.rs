//! Page driver over a parsed HTML document.
//!
//! No JavaScript runs, so lazy-loaded listings never appear and scrolling
//! is a no-op. Useful for server-rendered mirrors of the results page and
//! for exercising extraction against fixtures.

use ::scraper::{ElementRef, Html, Selector};
use async_trait::async_trait;
use ego_tree::NodeId;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, info};

use super::page::{PageDriver, PageElement};
use crate::config::{BrowserConfig, ScrapingConfig};
use crate::error::{ScraperError, ScraperResult};

/// A page backed by static HTML, fetched over HTTP or supplied inline
pub struct StaticPage {
    client: Option<Client>,
    url: String,
    document: Option<LoadedDocument>,
}

struct LoadedDocument {
    html: Rc<Html>,
    height: i64,
}

impl LoadedDocument {
    fn parse(source: &str) -> Self {
        Self {
            html: Rc::new(Html::parse_document(source)),
            height: source.len() as i64,
        }
    }
}

impl StaticPage {
    /// Create a page that fetches documents over HTTP
    pub fn new(scraping: &ScrapingConfig, browser: &BrowserConfig) -> ScraperResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("Accept", HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"));
        headers.insert("Accept-Language", HeaderValue::from_static("en-CA,en;q=0.5"));

        let client = Client::builder()
            .user_agent(scraping.user_agent.clone())
            .timeout(Duration::from_secs(browser.page_timeout_seconds))
            .connect_timeout(Duration::from_secs(10))
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        info!("Static HTML driver initialized");

        Ok(Self {
            client: Some(client),
            url: String::new(),
            document: None,
        })
    }

    /// Create a page from an already available document
    pub fn from_html(url: impl Into<String>, html: &str) -> Self {
        Self {
            client: None,
            url: url.into(),
            document: Some(LoadedDocument::parse(html)),
        }
    }

    fn document(&self) -> ScraperResult<&LoadedDocument> {
        self.document
            .as_ref()
            .ok_or_else(|| ScraperError::session("No page has been loaded"))
    }
}

#[async_trait(?Send)]
impl PageDriver for StaticPage {
    type Element = StaticElement;

    async fn navigate(&mut self, url: &str) -> ScraperResult<()> {
        let Some(client) = &self.client else {
            // Inline documents are already "loaded"
            self.url = url.to_string();
            return Ok(());
        };

        debug!("Fetching {}", url);
        let response = client
            .get(url)
            .send()
            .await
            .map_err(|e| ScraperError::navigation(url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::navigation(url, format!("HTTP {}", status)));
        }

        let body = response.text().await?;
        debug!("Fetched {} bytes from {}", body.len(), url);

        self.url = url.to_string();
        self.document = Some(LoadedDocument::parse(&body));
        Ok(())
    }

    async fn scroll_height(&self) -> ScraperResult<i64> {
        Ok(self.document()?.height)
    }

    async fn scroll_to_bottom(&self) -> ScraperResult<()> {
        self.document().map(|_| ())
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> ScraperResult<()> {
        // A static document never changes, so there is nothing to wait for
        if self.query_all(selector).await?.is_empty() {
            return Err(ScraperError::Timeout {
                selector: selector.to_string(),
                seconds: timeout.as_secs(),
            });
        }
        Ok(())
    }

    async fn query_all(&self, selector: &str) -> ScraperResult<Vec<StaticElement>> {
        let selector = parse_selector(selector)?;
        let html = &self.document()?.html;

        Ok(html
            .select(&selector)
            .map(|el| StaticElement::new(html, el))
            .collect())
    }

    async fn close(self) -> ScraperResult<()> {
        debug!("Static page for {} released", self.url);
        Ok(())
    }
}

/// One element of a shared parsed document
#[derive(Clone)]
pub struct StaticElement {
    document: Rc<Html>,
    id: NodeId,
}

impl std::fmt::Debug for StaticElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticElement")
            .field("html", &self.node().ok().map(|n| n.html()))
            .finish()
    }
}

impl StaticElement {
    fn new(document: &Rc<Html>, element: ElementRef<'_>) -> Self {
        Self {
            document: Rc::clone(document),
            id: element.id(),
        }
    }

    fn node(&self) -> ScraperResult<ElementRef<'_>> {
        self.document
            .tree
            .get(self.id)
            .and_then(ElementRef::wrap)
            .ok_or_else(|| ScraperError::extraction("Element is not part of the document"))
    }
}

#[async_trait(?Send)]
impl PageElement for StaticElement {
    async fn query(&self, selector: &str) -> ScraperResult<Option<Self>> {
        let selector = parse_selector(selector)?;
        let node = self.node()?;

        // Matching sees the whole document, like querySelector on a live element
        let found = node
            .select(&selector)
            .find(|el| el.id() != node.id())
            .map(|el| StaticElement::new(&self.document, el));

        Ok(found)
    }

    async fn text(&self) -> ScraperResult<String> {
        let text = self.node()?.text().collect::<String>();
        Ok(text.split_whitespace().collect::<Vec<_>>().join(" "))
    }

    async fn attribute(&self, name: &str) -> ScraperResult<Option<String>> {
        Ok(self.node()?.value().attr(name).map(str::to_string))
    }

    async fn is_visible(&self) -> ScraperResult<bool> {
        Ok(!is_hidden_with_ancestors(self.node()?))
    }
}

fn parse_selector(selector: &str) -> ScraperResult<Selector> {
    Selector::parse(selector)
        .map_err(|e| ScraperError::extraction(format!("Invalid CSS selector '{}': {}", selector, e)))
}

/// Whether `element` or any of its ancestors hides it
fn is_hidden_with_ancestors(element: ElementRef<'_>) -> bool {
    is_hidden(&element)
        || element
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|el| is_hidden(&el))
}

/// Static approximation of CSS visibility: only attributes and inline style
fn is_hidden(element: &ElementRef<'_>) -> bool {
    let value = element.value();

    if matches!(value.name(), "script" | "style" | "template" | "noscript") {
        return true;
    }

    if value.attr("hidden").is_some() {
        return true;
    }

    if value.name() == "input" && value.attr("type") == Some("hidden") {
        return true;
    }

    value
        .attr("style")
        .map(|style| {
            let style: String = style.chars().filter(|c| !c.is_whitespace()).collect::<String>().to_lowercase();
            style.contains("display:none") || style.contains("visibility:hidden")
        })
        .unwrap_or(false)
}
