//! Generic incremental pagination over a searchable table.
//!
//! A [`PagedQuery`] supplies "build the query for search term S" and "parse
//! one row"; the [`Pager`] turns that into an incrementally-loadable,
//! de-duplicated result stream that stays consistent under rapidly changing
//! search input. There is no cancellation token: an in-flight page load always
//! completes its I/O, and its result is discarded if the live search term has
//! moved on (stale-result discard).

use std::sync::{Arc, Mutex};

use log::debug;
use rusqlite::Row;

use crate::error::VerdantError;
use crate::executor::Executor;

pub const DEFAULT_PAGE_SIZE: usize = 150;

/// A parameterized SQL query: the text plus its positional string arguments.
pub struct SqlQuery {
    pub sql: String,
    pub args: Vec<String>,
}

/// Entity-specific half of the pagination contract.
///
/// `build_query` must produce a query with a fixed, stable ordering (distinct
/// from the searched column) and without LIMIT/OFFSET; the pager appends
/// those. An empty search term returns everything.
pub trait PagedQuery: Send + Sync + 'static {
    type Item: Send + 'static;

    fn build_query(&self, search: &str) -> SqlQuery;
    fn parse_row(&self, row: &Row<'_>) -> rusqlite::Result<Self::Item>;
}

/// Per-view pagination state: the rows accumulated so far plus the two flags
/// the scroll surface needs. `items` only ever grows by appending a page.
#[derive(Clone, Debug)]
pub struct PagedState<T> {
    pub items: Vec<T>,
    pub is_loading: bool,
    pub end_reached: bool,
}

impl<T> Default for PagedState<T> {
    fn default() -> Self {
        PagedState {
            items: Vec::new(),
            is_loading: false,
            end_reached: false,
        }
    }
}

struct PagerInner<T> {
    state: PagedState<T>,
    offset: usize,
    searched: String,
}

pub struct Pager<Q: PagedQuery> {
    query: Arc<Q>,
    executor: Executor,
    page_size: usize,
    inner: Mutex<PagerInner<Q::Item>>,
}

impl<Q: PagedQuery> Pager<Q> {
    pub fn new(executor: Executor, query: Q) -> Self {
        Self::with_page_size(executor, query, DEFAULT_PAGE_SIZE)
    }

    /// Page size trades request count against per-request latency: smaller
    /// pages keep fast scrolling responsive, larger ones reduce round-trips.
    pub fn with_page_size(executor: Executor, query: Q, page_size: usize) -> Self {
        Pager {
            query: Arc::new(query),
            executor,
            page_size,
            inner: Mutex::new(PagerInner {
                state: PagedState::default(),
                offset: 0,
                searched: String::new(),
            }),
        }
    }

    /// Replace the search term: reset the window and request the first page.
    ///
    /// Any page load still in flight for the previous term will find the term
    /// changed when it completes and discard its result.
    pub async fn update_search(&self, search: &str) -> Result<(), VerdantError> {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.searched = search.to_owned();
            inner.offset = 0;
            inner.state = PagedState::default();
        }

        self.load_next_page().await
    }

    /// Request the next page. No-op while a load is in flight or once the end
    /// was reached, so scroll-proximity triggers may call this repeatedly.
    pub async fn load_next_page(&self) -> Result<(), VerdantError> {
        let (snapshot, offset) = {
            let mut inner = self.inner.lock().unwrap();
            if inner.state.is_loading || inner.state.end_reached {
                return Ok(());
            }
            inner.state.is_loading = true;
            (inner.searched.clone(), inner.offset)
        };

        let query = Arc::clone(&self.query);
        let SqlQuery { sql, args } = query.build_query(&snapshot);
        let final_sql = format!("{} LIMIT {} OFFSET {}", sql, self.page_size, offset);

        let result = self
            .executor
            .read(move |conn| {
                let mut stmt = conn.prepare(&final_sql)?;
                let rows =
                    stmt.query_map(rusqlite::params_from_iter(args.iter()), |row| {
                        query.parse_row(row)
                    })?;
                let mut page = Vec::new();
                for row in rows {
                    page.push(row?);
                }
                Ok(page)
            })
            .await;

        let mut inner = self.inner.lock().unwrap();
        match result {
            Ok(page) => {
                apply_page(&mut inner, &snapshot, page);
                Ok(())
            }
            Err(e) => {
                if snapshot == inner.searched {
                    inner.state.is_loading = false;
                }
                Err(e)
            }
        }
    }

    /// Copy of the current state for the view layer.
    pub fn snapshot(&self) -> PagedState<Q::Item>
    where
        Q::Item: Clone,
    {
        self.inner.lock().unwrap().state.clone()
    }
}

/// Merge a completed page into the state, or discard it if the live search
/// term no longer matches the snapshot taken at request time. The discard is
/// silent: a stale page is not an error.
fn apply_page<T>(inner: &mut PagerInner<T>, snapshot: &str, page: Vec<T>) {
    if snapshot != inner.searched {
        debug!("discarding stale page for search {snapshot:?}");
        return;
    }

    inner.state.end_reached = page.is_empty();
    inner.offset += page.len();
    inner.state.items.extend(page);
    inner.state.is_loading = false;
}
