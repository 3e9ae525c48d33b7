pub mod constants;
pub mod url_utils;

pub use constants::*;
pub use url_utils::{normalize_start_url, page_url, selector_literal};
