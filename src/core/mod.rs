use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::{ScraperError, ScraperResult};
use crate::export::{ExportManager, ExportStats};
use crate::logging::{LogContext, PerformanceLogger, RunIdGenerator};
use crate::scraper::browser::BrowserSession;
use crate::scraper::page::PageDriver;
use crate::scraper::static_page::StaticPage;
use crate::scraper::{ListingScraper, ScrapeReport};

/// Which page driver a run uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriverMode {
    /// A real browser session, with JavaScript and lazy loading
    #[default]
    Browser,
    /// Plain HTTP fetch parsed as static HTML
    StaticHtml,
}

/// How a run ended
#[derive(Debug)]
pub enum RunOutcome {
    Completed {
        report: ScrapeReport,
        exports: Vec<ExportStats>,
    },
    /// A fatal error was caught at the top level and logged
    Failed { error: ScraperError },
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Completed { .. })
    }
}

/// Wires configuration, the page driver, scraping, and export into one run
pub struct KijijiAutosApp {
    config: AppConfig,
    run_id: String,
}

impl KijijiAutosApp {
    pub fn new(config: AppConfig) -> ScraperResult<Self> {
        config.validate()?;

        Ok(Self {
            config,
            run_id: RunIdGenerator::generate(),
        })
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Open the page driver for `mode` and run against it.
    ///
    /// Never returns an error: fatal failures are logged and reported in the
    /// outcome.
    pub async fn run(&self, mode: DriverMode) -> RunOutcome {
        info!("Starting run {} in {:?} mode", self.run_id, mode);

        match mode {
            DriverMode::Browser => {
                match BrowserSession::open(&self.config.browser, &self.config.scraping.user_agent).await {
                    Ok(session) => self.run_with_driver(session).await,
                    Err(e) => self.fail(e),
                }
            }
            DriverMode::StaticHtml => match StaticPage::new(&self.config.scraping, &self.config.browser) {
                Ok(page) => self.run_with_driver(page).await,
                Err(e) => self.fail(e),
            },
        }
    }

    /// Scrape and export with an already opened driver, then close it.
    ///
    /// The driver is closed exactly once whether or not the run succeeded.
    pub async fn run_with_driver<D: PageDriver>(&self, mut driver: D) -> RunOutcome {
        let outcome = match self.scrape_and_export(&mut driver).await {
            Ok((report, exports)) => RunOutcome::Completed { report, exports },
            Err(e) => self.fail(e),
        };

        if let Err(e) = driver.close().await {
            warn!("Failed to close page driver: {}", e);
        }

        outcome
    }

    async fn scrape_and_export<D: PageDriver>(&self, driver: &mut D) -> ScraperResult<(ScrapeReport, Vec<ExportStats>)> {
        let scraper = ListingScraper::new(&self.config);

        let scrape_timer = PerformanceLogger::new(
            self.context("scrape")
                .with_url(scraper.target_url())
                .with_number_field("max_listings", self.config.scraping.max_listings as i64),
        );
        let report = match scraper.scrape_page(driver).await {
            Ok(report) => {
                scrape_timer.finish("Scrape phase finished");
                report
            }
            Err(e) => {
                scrape_timer.finish_with_status("Scrape phase failed", false);
                return Err(e);
            }
        };

        let export_timer = PerformanceLogger::new(
            self.context("export")
                .with_string_field("file_stem", &self.config.export.file_stem)
                .with_number_field("records", report.records.len() as i64),
        );
        let exports = match self.export(&report).await {
            Ok(exports) => {
                export_timer.finish("Export phase finished");
                exports
            }
            Err(e) => {
                export_timer.finish_with_status("Export phase failed", false);
                return Err(e);
            }
        };

        Ok((report, exports))
    }

    async fn export(&self, report: &ScrapeReport) -> ScraperResult<Vec<ExportStats>> {
        ExportManager::new(&self.config.export)?
            .export_all(&report.records)
            .await
    }

    fn fail(&self, error: ScraperError) -> RunOutcome {
        let context = self.context("run").with_error_category(error.category());
        crate::log_error!(context, "Critical error: {}", error);
        RunOutcome::Failed { error }
    }

    fn context(&self, operation: &str) -> LogContext {
        LogContext::new("app", operation).with_run_id(&self.run_id)
    }
}
