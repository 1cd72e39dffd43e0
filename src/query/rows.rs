//! Paginated result streaming.

use crate::athena::{FetchedRow, QueryHandle, QueryService, ResultRecord, ResultRow};
use crate::error::{Result, ReviewError};
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use std::sync::Arc;
use tracing::debug;

/// Rows requested per results page (the service maximum).
pub const PAGE_SIZE: i32 = 1000;

enum PageCursor {
    Start,
    Next(String),
    Done,
}

/// Streams every result row of a finished query, page by page.
///
/// Pages are requested lazily as the stream is polled. With
/// `extract_header` the first row names the fields of all following rows
/// and is not yielded itself.
pub fn stream_rows<'a>(
    service: &'a dyn QueryService,
    handle: QueryHandle,
    extract_header: bool,
) -> BoxStream<'a, Result<FetchedRow>> {
    let pages = stream::try_unfold(PageCursor::Start, move |cursor| {
        fetch_page(service, handle.clone(), cursor)
    });

    let rows = pages
        .map_ok(|rows| stream::iter(rows.into_iter().map(Ok::<ResultRow, ReviewError>)))
        .try_flatten();

    let mut header: Option<Arc<[String]>> = None;
    rows.try_filter_map(move |row| {
        futures::future::ready(name_row(&mut header, extract_header, row))
    })
    .boxed()
}

/// Fetches the page `cursor` points at and advances the cursor.
async fn fetch_page(
    service: &dyn QueryService,
    handle: QueryHandle,
    cursor: PageCursor,
) -> Result<Option<(Vec<ResultRow>, PageCursor)>> {
    let next_token = match cursor {
        PageCursor::Done => return Ok(None),
        PageCursor::Start => None,
        PageCursor::Next(token) => Some(token),
    };

    let page = service
        .get_results_page(&handle, next_token, PAGE_SIZE)
        .await?;
    debug!("Fetched {} result rows for query {}", page.rows.len(), handle);

    let cursor = match page.next_token {
        Some(token) => PageCursor::Next(token),
        None => PageCursor::Done,
    };
    Ok(Some((page.rows, cursor)))
}

/// Applies header extraction to one row.
fn name_row(
    header: &mut Option<Arc<[String]>>,
    extract_header: bool,
    row: ResultRow,
) -> Result<Option<FetchedRow>> {
    if !extract_header {
        return Ok(Some(FetchedRow::Row(row)));
    }

    if let Some(fields) = header.as_ref() {
        let record = ResultRecord::new(Arc::clone(fields), row)?;
        return Ok(Some(FetchedRow::Record(record)));
    }

    let fields: Vec<String> = row
        .into_iter()
        .map(|cell| cell.unwrap_or_default())
        .collect();
    *header = Some(fields.into());
    Ok(None)
}
