//! Search result aggregation
//!
//! Turns the page-oriented catalog search into one growing list. A fresh
//! search replaces the list, "load more" appends the next page. Each request
//! carries a token; only the response to the most recently issued request is
//! applied, so a slow answer to an abandoned search cannot overwrite newer
//! results.

use crate::catalog::{CatalogClient, CatalogError, SearchPage, Title};

/// Where the aggregator is in its request cycle
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchStatus {
    /// No search issued yet
    #[default]
    Idle,
    /// A request is in flight
    Loading,
    /// The last request succeeded
    Loaded,
    /// The last request failed with the given user-facing message
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestMode {
    Replace,
    Append,
}

/// A page fetch the caller must perform and hand back to
/// [`ResultAggregator::complete`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    token: u64,
    mode: RequestMode,
    /// The search term to send
    pub term: String,
    /// The 1-based page to fetch
    pub page: u32,
    /// Keep at most this many items from the page
    pub limit: Option<usize>,
}

/// Accumulated search results
#[derive(Debug, Default)]
pub struct ResultAggregator {
    items: Vec<Title>,
    term: Option<String>,
    page: u32,
    total_count: usize,
    status: SearchStatus,
    last_token: u64,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulated titles in provider order
    pub fn items(&self) -> &[Title] {
        &self.items
    }

    /// The term of the current search, if any
    pub fn term(&self) -> Option<&str> {
        self.term.as_deref()
    }

    /// The last page applied (0 before any search completed)
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Result count reported by the most recent response
    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn status(&self) -> &SearchStatus {
        &self.status
    }

    /// Message of the last failure, if the last request failed
    pub fn error(&self) -> Option<&str> {
        match &self.status {
            SearchStatus::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == SearchStatus::Loading
    }

    /// Whether the provider reports more results than have been accumulated
    pub fn has_more(&self) -> bool {
        self.items.len() < self.total_count
    }

    /// Starts a fresh search for `term`
    ///
    /// Returns `None` for a blank term, leaving the state untouched.
    pub fn begin_search(&mut self, term: &str) -> Option<PageRequest> {
        let term = term.trim();
        if term.is_empty() {
            return None;
        }

        self.term = Some(term.to_string());
        Some(self.issue(RequestMode::Replace, 1, None))
    }

    /// Starts fetching the page after the last applied one
    ///
    /// `limit` keeps only the first items of that page. Returns `None` when
    /// no search has been started or a request is still outstanding.
    pub fn begin_load_more(&mut self, limit: Option<usize>) -> Option<PageRequest> {
        if self.is_loading() {
            return None;
        }
        self.term.as_ref()?;
        Some(self.issue(RequestMode::Append, self.page + 1, limit))
    }

    /// Applies the outcome of `request`
    ///
    /// Returns `false` and changes nothing when a newer request has been
    /// issued since `request`.
    pub fn complete(
        &mut self,
        request: &PageRequest,
        result: Result<SearchPage, CatalogError>,
    ) -> bool {
        if request.token != self.last_token {
            tracing::debug!(
                term = %request.term,
                page = request.page,
                "dropping stale search response"
            );
            return false;
        }

        match result {
            Ok(page) => {
                self.page = request.page;
                let mut items = page.items;
                if let Some(limit) = request.limit {
                    items.truncate(limit);
                }

                match request.mode {
                    RequestMode::Replace => self.items = items,
                    RequestMode::Append => self.items.extend(items),
                }
                self.total_count = page.total_count;
                self.status = SearchStatus::Loaded;
            }
            Err(e) => {
                tracing::warn!(
                    term = %request.term,
                    page = request.page,
                    error = %e,
                    "search failed"
                );
                // Nothing is accumulated any more, so the next page is the first
                self.page = 0;
                self.items.clear();
                self.total_count = 0;
                self.status = SearchStatus::Failed(e.user_message());
            }
        }

        true
    }

    /// Runs a fresh search for `term` against `client`
    pub fn search<C>(&mut self, client: &C, term: &str) -> &SearchStatus
    where
        C: CatalogClient + ?Sized,
    {
        if let Some(request) = self.begin_search(term) {
            self.fetch(client, &request);
        }
        &self.status
    }

    /// Appends the next page of the current search from `client`
    pub fn load_more<C>(&mut self, client: &C, limit: Option<usize>) -> &SearchStatus
    where
        C: CatalogClient + ?Sized,
    {
        if let Some(request) = self.begin_load_more(limit) {
            self.fetch(client, &request);
        }
        &self.status
    }

    /// Loads just enough of the next page to complete a partially filled last
    /// row of a grid with `items_per_row` columns
    ///
    /// Does nothing when the last row is already full or nothing is left.
    /// Returns the number of titles added.
    pub fn fill_last_row<C>(&mut self, client: &C, items_per_row: usize) -> usize
    where
        C: CatalogClient + ?Sized,
    {
        let needed = missing_in_last_row(self.items.len(), items_per_row);
        if needed == 0 || !self.has_more() || self.is_loading() {
            return 0;
        }

        let before = self.items.len();
        self.load_more(client, Some(needed));
        self.items.len().saturating_sub(before)
    }

    fn issue(&mut self, mode: RequestMode, page: u32, limit: Option<usize>) -> PageRequest {
        self.last_token += 1;
        self.status = SearchStatus::Loading;

        PageRequest {
            token: self.last_token,
            mode,
            term: self.term.clone().unwrap_or_default(),
            page,
            limit,
        }
    }

    fn fetch<C>(&mut self, client: &C, request: &PageRequest)
    where
        C: CatalogClient + ?Sized,
    {
        let result = client.search(&request.term, request.page);
        self.complete(request, result);
    }
}

/// How many items a grid needs to complete its last row
fn missing_in_last_row(count: usize, items_per_row: usize) -> usize {
    if count == 0 || items_per_row == 0 {
        return 0;
    }

    match count % items_per_row {
        0 => 0,
        remainder => items_per_row - remainder,
    }
}
