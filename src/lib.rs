//! Kijiji Autos Scraper - loads a car-listings page in a browser and saves the listings
//!
//! This library provides:
//! - A page driver seam with a Playwright browser backend and a static HTML backend
//! - Scroll-until-stable loading of lazy content
//! - Listing extraction with selector fallbacks and per-listing skip handling
//! - JSON and CSV export

pub mod config;
pub mod core;
pub mod error;
pub mod export;
pub mod logging;
pub mod scraper;

// Re-export main types for convenience
pub use crate::config::AppConfig;
pub use crate::core::{DriverMode, KijijiAutosApp, RunOutcome};
pub use crate::error::{ScraperError, ScraperResult};
pub use crate::scraper::{ListingRecord, NOT_AVAILABLE};
