//! URL manipulation utilities.
//!
//! Helpers for building the per-page listing URLs and for embedding CSS
//! selectors into JavaScript snippets evaluated by the renderer.

use anyhow::{Result, anyhow};
use url::Url;

/// Normalize a start URL: add `https://` if no scheme is present, then parse it.
pub fn normalize_start_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("start_url must not be empty"));
    }

    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let url = Url::parse(&with_scheme).map_err(|e| anyhow!("Invalid start URL '{raw}': {e}"))?;
    if url.host_str().is_none() {
        return Err(anyhow!("Invalid start URL '{raw}': no host"));
    }
    Ok(url)
}

/// Build the URL of results page `page` from the start URL.
///
/// The page parameter is replaced in place when present (first occurrence
/// wins, duplicates are dropped) and appended otherwise. Every other query
/// pair keeps its position.
#[must_use]
pub fn page_url(base: &Url, page_param: &str, page: u32) -> Url {
    let pairs: Vec<(String, String)> = base.query_pairs().into_owned().collect();
    let page_value = page.to_string();

    let mut url = base.clone();
    {
        let mut query = url.query_pairs_mut();
        query.clear();

        let mut replaced = false;
        for (key, value) in &pairs {
            if key == page_param {
                if !replaced {
                    query.append_pair(key, &page_value);
                    replaced = true;
                }
            } else {
                query.append_pair(key, value);
            }
        }
        if !replaced {
            query.append_pair(page_param, &page_value);
        }
    }
    url
}

/// Quote a CSS selector as a JavaScript string literal.
///
/// JSON string syntax is a subset of JS string syntax, so serde's escaping
/// handles quotes and backslashes inside attribute selectors.
#[must_use]
pub fn selector_literal(selector: &str) -> String {
    serde_json::Value::String(selector.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_adds_scheme() {
        let url = normalize_start_url("www.ibm.com/careers/search?p=1").unwrap();
        assert_eq!(url.as_str(), "https://www.ibm.com/careers/search?p=1");
    }

    #[test]
    fn test_normalize_rejects_empty() {
        assert!(normalize_start_url("   ").is_err());
    }

    #[test]
    fn test_page_url_replaces_existing_param() {
        let base = Url::parse("https://www.ibm.com/careers/search?p=1").unwrap();
        assert_eq!(
            page_url(&base, "p", 2).as_str(),
            "https://www.ibm.com/careers/search?p=2"
        );
    }

    #[test]
    fn test_page_url_keeps_other_pairs_in_order() {
        let base = Url::parse("https://example.com/search?q=rust&p=7&sort=new").unwrap();
        assert_eq!(
            page_url(&base, "p", 3).as_str(),
            "https://example.com/search?q=rust&p=3&sort=new"
        );
    }

    #[test]
    fn test_page_url_appends_missing_param() {
        let base = Url::parse("https://example.com/search?q=rust").unwrap();
        assert_eq!(
            page_url(&base, "page", 1).as_str(),
            "https://example.com/search?q=rust&page=1"
        );
    }

    #[test]
    fn test_selector_literal_escapes_quotes() {
        assert_eq!(
            selector_literal(r#"a[data-key="next"]"#),
            r#""a[data-key=\"next\"]""#
        );
    }
}
