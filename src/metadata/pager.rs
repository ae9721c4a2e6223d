//! Continuation-token draining shared by the scanning store backends.

use std::future::Future;

use crate::error::CatalogResult;

/// One page of results and the cursor for the next page, if any
#[derive(Debug)]
pub struct Page<T, C> {
    pub items: Vec<T>,
    pub next: Option<C>,
}

/// Fetch pages until the store stops returning a cursor and concatenate them.
///
/// The first call receives `None`. An error from any page aborts the whole
/// operation; no partial result is returned.
pub async fn drain_pages<T, C, F, Fut>(mut fetch: F) -> CatalogResult<Vec<T>>
where
    F: FnMut(Option<C>) -> Fut,
    Fut: Future<Output = CatalogResult<Page<T, C>>>,
{
    let mut items = Vec::new();
    let mut cursor = None;
    let mut pages = 0usize;

    loop {
        let page = fetch(cursor.take()).await?;
        pages += 1;
        items.extend(page.items);
        match page.next {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    log::debug!("Drained {} page(s), {} item(s)", pages, items.len());
    Ok(items)
}
