//! Fragment → `JobRecord` extraction.

use regex::Regex;
use scraper::Selector;
use std::sync::LazyLock;

use super::compile_selector;
use super::document::ListingDocument;
use super::errors::{ExtractionError, ExtractionResult};
use super::schema::JobRecord;
use crate::config::ListingSelectors;
use crate::utils::constants::DESCRIPTION_PLACEHOLDER;

// html5ever serializes line breaks as `<br>`; raw fragments may use any spelling
static LINE_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?>").expect("LINE_BREAK: hardcoded regex is valid")
});

/// Compiled selectors for one listing layout
#[derive(Debug, Clone)]
pub struct ListingExtractor {
    title: Selector,
    level_location: Selector,
    link: Selector,
}

impl ListingExtractor {
    pub fn new(selectors: &ListingSelectors) -> anyhow::Result<Self> {
        Ok(Self {
            title: compile_selector(&selectors.title)?,
            level_location: compile_selector(&selectors.level_location)?,
            link: compile_selector(&selectors.link)?,
        })
    }

    /// Turn one listing fragment into a record.
    ///
    /// A successful result may still be incomplete (empty title or location);
    /// callers check [`JobRecord::is_complete`] before persisting.
    pub fn extract(&self, fragment: &str) -> ExtractionResult<JobRecord> {
        let document = ListingDocument::parse(fragment)?;

        let title = document.text(&self.title);

        // A card without a link is rejected before its level/location block is read
        let url = document
            .attr(&self.link, "href")
            .ok_or(ExtractionError::MissingUrl)?;

        let block = document.inner_html(&self.level_location).unwrap_or_default();
        let (experience_level, location) = split_level_location(&block)?;

        Ok(JobRecord {
            title,
            location,
            description: DESCRIPTION_PLACEHOLDER.to_string(),
            experience_level,
            url,
        })
    }
}

/// Split `level<br>location` into its two trimmed, entity-decoded parts.
/// Segments past the second are ignored.
fn split_level_location(block: &str) -> ExtractionResult<(String, String)> {
    if block.trim().is_empty() {
        return Err(ExtractionError::MalformedLocationFormat { segments: 0 });
    }

    let segments: Vec<&str> = LINE_BREAK.split(block).collect();
    if segments.len() < 2 {
        return Err(ExtractionError::MalformedLocationFormat {
            segments: segments.len(),
        });
    }

    let clean = |s: &str| html_escape::decode_html_entities(s.trim()).into_owned();
    Ok((clean(segments[0]), clean(segments[1])))
}
