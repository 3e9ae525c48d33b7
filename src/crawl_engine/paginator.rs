//! The pagination loop: load a results page, persist its records, move on.
//!
//! Pages are visited one at a time in increasing order. Page n+1 is not
//! requested until every record of page n has been written and the sink
//! flushed.

use log::{debug, info, warn};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use super::crawl_types::{CrawlError, CrawlResult, CrawlSummary, PageCursor};
use super::progress::ProgressReporter;
use super::retry::RetryPolicy;
use super::state::{CrawlState, PageSnapshot};
use crate::config::ScrapeConfig;
use crate::listing_extractor::ListingExtractor;
use crate::page_renderer::{PageRenderer, RenderError, scripts};
use crate::record_sink::RecordSink;

/// Crawl every results page reachable from the configured start URL.
///
/// Extraction failures, incomplete records and single write failures are
/// counted and skipped. A page that still fails after the retry budget, a
/// failed flush, or cancellation ends the crawl with an error; whatever was
/// written before that stays flushed in the sink.
pub async fn crawl_listings<R, P>(
    renderer: &mut R,
    sink: &mut RecordSink,
    config: &ScrapeConfig,
    extractor: &ListingExtractor,
    progress: &P,
    cancel: &CancellationToken,
) -> CrawlResult<CrawlSummary>
where
    R: PageRenderer,
    P: ProgressReporter,
{
    let mut summary = CrawlSummary::default();
    let result = run_pages(
        renderer,
        sink,
        config,
        extractor,
        progress,
        cancel,
        &mut summary,
    )
    .await;

    match result {
        Ok(()) => {
            info!(
                "Crawl finished: {} page(s), {} record(s) written, {} extraction failure(s), {} incomplete, {} write failure(s)",
                summary.pages_visited,
                summary.records_written,
                summary.extraction_failures,
                summary.incomplete_records,
                summary.write_failures
            );
            progress.report_completed(&summary);
            Ok(summary)
        }
        Err(e) => {
            if let Err(flush_err) = sink.flush() {
                warn!("Flushing sink after crawl failure failed: {flush_err}");
            }
            progress.report_error(&e.to_string());
            Err(e)
        }
    }
}

async fn run_pages<R, P>(
    renderer: &mut R,
    sink: &mut RecordSink,
    config: &ScrapeConfig,
    extractor: &ListingExtractor,
    progress: &P,
    cancel: &CancellationToken,
    summary: &mut CrawlSummary,
) -> CrawlResult<()>
where
    R: PageRenderer,
    P: ProgressReporter,
{
    let retry = RetryPolicy::from_config(config);
    let mut state = CrawlState::Loading(PageCursor::first(config.start_url(), config.page_param()));

    loop {
        debug!("Crawl state: {}", state.name());
        state = match state {
            CrawlState::Loading(cursor) => {
                if cancel.is_cancelled() {
                    return Err(CrawlError::Cancelled {
                        pages_completed: summary.pages_visited,
                    });
                }

                info!(
                    "Starting scraping at page: {}, URL: {}, count: {}",
                    cursor.page_number, cursor.url, summary.records_written
                );
                progress.report_page_started(cursor.page_number, cursor.url.as_str());

                let snapshot =
                    load_with_retry(renderer, &cursor, config, &retry, progress, cancel, summary)
                        .await?;
                summary.pages_visited += 1;
                progress.report_page_loaded(cursor.page_number, snapshot.fragments.len());

                CrawlState::Processing { cursor, snapshot }
            }

            CrawlState::Processing {
                mut cursor,
                snapshot,
            } => {
                cursor.has_next = !snapshot.next_disabled;
                for fragment in &snapshot.fragments {
                    persist_fragment(fragment, cursor.page_number, extractor, sink, progress, summary);
                }
                sink.flush()?;
                CrawlState::Advancing(cursor)
            }

            CrawlState::Advancing(cursor) => {
                if !cursor.has_next {
                    info!("Page {} is the last page", cursor.page_number);
                    CrawlState::Done
                } else if config
                    .max_pages()
                    .is_some_and(|cap| cursor.page_number >= cap)
                {
                    warn!(
                        "Reached the page cap ({}) before the last page; stopping",
                        cursor.page_number
                    );
                    summary.hit_page_cap = true;
                    CrawlState::Done
                } else {
                    CrawlState::Loading(cursor.advance(config.page_param()))
                }
            }

            CrawlState::Done => return Ok(()),
        };
    }
}

/// Extract one fragment and hand it to the sink if it is complete
fn persist_fragment<P: ProgressReporter>(
    fragment: &str,
    page: u32,
    extractor: &ListingExtractor,
    sink: &mut RecordSink,
    progress: &P,
    summary: &mut CrawlSummary,
) {
    summary.fragments_seen += 1;

    let record = match extractor.extract(fragment) {
        Ok(record) => record,
        Err(e) => {
            warn!("Skipping listing on page {page}: {e}");
            summary.extraction_failures += 1;
            progress.report_fragment_skipped(page, e.kind());
            return;
        }
    };

    if !record.is_complete() {
        debug!(
            "Skipping incomplete listing on page {page} (title: {:?}, location: {:?}, url: {:?})",
            record.title, record.location, record.url
        );
        summary.incomplete_records += 1;
        progress.report_fragment_skipped(page, "incomplete");
        return;
    }

    match sink.write(&record) {
        Ok(()) => {
            summary.records_written += 1;
            progress.report_record_written(&record);
        }
        Err(e) => {
            warn!("{e}");
            summary.write_failures += 1;
        }
    }
}

async fn load_with_retry<R, P>(
    renderer: &mut R,
    cursor: &PageCursor,
    config: &ScrapeConfig,
    retry: &RetryPolicy,
    progress: &P,
    cancel: &CancellationToken,
    summary: &CrawlSummary,
) -> CrawlResult<PageSnapshot>
where
    R: PageRenderer,
    P: ProgressReporter,
{
    let mut attempt: u32 = 1;
    loop {
        let error = match load_page(renderer, cursor, config).await {
            Ok(snapshot) => return Ok(snapshot),
            Err(e) => e,
        };

        if !error.is_transient() || attempt >= retry.max_attempts() {
            return Err(CrawlError::Render {
                page: cursor.page_number,
                attempts: attempt,
                source: error,
            });
        }

        let delay = retry.delay_for(attempt - 1);
        warn!(
            "Loading page {} failed (attempt {attempt}/{}): {error}; retrying in {delay:?}",
            cursor.page_number,
            retry.max_attempts()
        );
        progress.report_page_retry(cursor.page_number, attempt, &error.to_string());

        tokio::select! {
            () = cancel.cancelled() => {
                return Err(CrawlError::Cancelled {
                    pages_completed: summary.pages_visited,
                });
            }
            () = tokio::time::sleep(delay) => {}
        }
        attempt += 1;
    }
}

/// Navigate, wait for the listing container and read the page
async fn load_page<R: PageRenderer>(
    renderer: &mut R,
    cursor: &PageCursor,
    config: &ScrapeConfig,
) -> Result<PageSnapshot, RenderError> {
    let selectors = config.selectors();

    renderer.navigate(cursor.url.as_str()).await?;
    renderer.wait_visible(&selectors.container).await?;

    let fragments = renderer
        .evaluate(&scripts::outer_html_list(&selectors.container))
        .await?;
    let fragments = fragment_list(fragments)?;

    let next_disabled = renderer
        .evaluate(&scripts::element_exists(&selectors.next_disabled))
        .await?;
    let next_disabled = next_disabled.as_bool().ok_or_else(|| {
        RenderError::UnexpectedValue(format!("next-disabled check returned {next_disabled}"))
    })?;

    Ok(PageSnapshot {
        fragments,
        next_disabled,
    })
}

fn fragment_list(value: Value) -> Result<Vec<String>, RenderError> {
    let Value::Array(items) = value else {
        return Err(RenderError::UnexpectedValue(format!(
            "fragment list is not an array: {value}"
        )));
    };
    items
        .into_iter()
        .map(|item| match item {
            Value::String(html) => Ok(html),
            other => Err(RenderError::UnexpectedValue(format!(
                "fragment is not a string: {other}"
            ))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fragment_list_accepts_strings() {
        let list = fragment_list(json!(["<div>a</div>", "<div>b</div>"])).unwrap();
        assert_eq!(list, vec!["<div>a</div>", "<div>b</div>"]);
    }

    #[test]
    fn test_fragment_list_rejects_other_shapes() {
        assert!(matches!(
            fragment_list(json!(null)),
            Err(RenderError::UnexpectedValue(_))
        ));
        assert!(matches!(
            fragment_list(json!(["ok", 3])),
            Err(RenderError::UnexpectedValue(_))
        ));
    }
}
