//! JavaScript snippets evaluated against listing pages.
//!
//! Selectors are embedded as JSON string literals so quotes inside attribute
//! selectors survive.

use crate::utils::selector_literal;

/// `outerHTML` of every element matching `selector`, in document order
#[must_use]
pub fn outer_html_list(selector: &str) -> String {
    format!(
        "Array.from(document.querySelectorAll({})).map(e => e.outerHTML)",
        selector_literal(selector)
    )
}

/// `true` when at least one element matches `selector`
#[must_use]
pub fn element_exists(selector: &str) -> String {
    format!("document.querySelector({}) !== null", selector_literal(selector))
}

/// `true` when the first match is laid out and not hidden by CSS
#[must_use]
pub fn element_visible(selector: &str) -> String {
    format!(
        r"(() => {{
    const el = document.querySelector({});
    if (!el) return false;
    const style = window.getComputedStyle(el);
    if (style.display === 'none' || style.visibility === 'hidden') return false;
    const rect = el.getBoundingClientRect();
    return rect.width > 0 && rect.height > 0;
}})()",
        selector_literal(selector)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outer_html_list_script() {
        assert_eq!(
            outer_html_list(".bx--card-group__cards__col"),
            r#"Array.from(document.querySelectorAll(".bx--card-group__cards__col")).map(e => e.outerHTML)"#
        );
    }

    #[test]
    fn test_element_exists_escapes_attribute_quotes() {
        assert_eq!(
            element_exists(r#"a[data-key="next"][aria-disabled="true"]"#),
            r#"document.querySelector("a[data-key=\"next\"][aria-disabled=\"true\"]") !== null"#
        );
    }
}
