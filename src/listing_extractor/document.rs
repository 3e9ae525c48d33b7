//! Structural queries over one listing fragment.
//!
//! `scraper::Html` is `!Send`, so a `ListingDocument` is built, queried and
//! dropped without crossing an `.await`.

use scraper::{Html, Selector};

use super::errors::{ExtractionError, ExtractionResult};

pub struct ListingDocument {
    html: Html,
}

impl ListingDocument {
    /// Parse a fragment. Fails with `Parse` when the fragment holds no
    /// element at all (empty, whitespace-only or bare text).
    pub fn parse(fragment: &str) -> ExtractionResult<Self> {
        if fragment.trim().is_empty() {
            return Err(ExtractionError::Parse);
        }

        let html = Html::parse_fragment(fragment);
        let has_element = html
            .root_element()
            .children()
            .any(|node| node.value().is_element());
        if !has_element {
            return Err(ExtractionError::Parse);
        }

        Ok(Self { html })
    }

    /// Concatenated text of every element matching `selector`, trimmed.
    /// Empty when nothing matches.
    #[must_use]
    pub fn text(&self, selector: &Selector) -> String {
        let mut out = String::new();
        for element in self.html.select(selector) {
            for chunk in element.text() {
                out.push_str(chunk);
            }
        }
        out.trim().to_string()
    }

    /// Inner HTML of the first element matching `selector`
    #[must_use]
    pub fn inner_html(&self, selector: &Selector) -> Option<String> {
        self.html
            .select(selector)
            .next()
            .map(|element| element.inner_html())
    }

    /// Attribute `name` of the first element matching `selector`
    #[must_use]
    pub fn attr(&self, selector: &Selector, name: &str) -> Option<String> {
        self.html
            .select(selector)
            .next()
            .and_then(|element| element.value().attr(name))
            .map(str::to_string)
    }
}
