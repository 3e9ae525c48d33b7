//! Listing fragment extraction.
//!
//! Turns the outer HTML of one listing card into a [`JobRecord`] or a typed
//! [`ExtractionError`].

pub mod document;
pub mod errors;
pub mod extractor;
pub mod schema;

pub use document::ListingDocument;
pub use errors::{ExtractionError, ExtractionResult};
pub use extractor::ListingExtractor;
pub use schema::JobRecord;

use anyhow::{Result, anyhow};
use scraper::Selector;

/// Compile a CSS selector, turning scraper's borrowed error into an owned one
pub fn compile_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| anyhow!("Invalid CSS selector '{selector}': {e}"))
}
