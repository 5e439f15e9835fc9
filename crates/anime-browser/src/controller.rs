//! Browser controller: filter state, URL location and list loading.
//!
//! Every filter change resets the page to 1 and rewrites the location in
//! place. The location is replaced, never pushed, so browsing does not grow
//! any history.

use crate::query::BrowserQuery;
use crate::source::{DataSource, PageResult};
use crate::state::{FilterAction, FilterState};
use catalog_api::CatalogApi;
use shared::config::BrowserConfig;
use shared::GenreCatalog;
use tracing::{debug, error, info, warn};

/// Message shown when a page cannot be loaded
pub const LOAD_ERROR_MESSAGE: &str = "An error occurred while loading anime";

/// Path of the anime list page
pub const LIST_PATH: &str = "/anime";

/// What the list area shows
#[derive(Debug, Clone, PartialEq)]
pub enum ListView {
    Items(PageResult),
    /// Nothing matches the filters
    Empty,
    Error(String),
}

/// Owns the filter state and the location it is mirrored to
pub struct Browser<S> {
    source: S,
    genres: GenreCatalog,
    query: BrowserQuery,
    /// Search box contents, committed to the filters after a pause
    search_input: String,
    page_size: u32,
    year_bounds: (i32, i32),
    path: String,
    location: String,
}

impl<S: DataSource> Browser<S> {
    /// Create a browser positioned at `location` (path plus optional query)
    pub fn new(source: S, config: &BrowserConfig, location: &str) -> Self {
        let (path, query) = match location.split_once('?') {
            Some((path, query)) => (path, query),
            None => (location, ""),
        };
        let path = if path.is_empty() { LIST_PATH } else { path };

        let query = BrowserQuery::parse(query);
        let search_input = query.filters.search.clone();

        let mut browser = Self {
            source,
            genres: GenreCatalog::default(),
            query,
            search_input,
            page_size: config.page_size.max(1),
            year_bounds: config.year_bounds(),
            path: path.to_string(),
            location: String::new(),
        };
        browser.replace_location();
        browser
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn filters(&self) -> &FilterState {
        &self.query.filters
    }

    pub fn page(&self) -> u32 {
        self.query.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn year_bounds(&self) -> (i32, i32) {
        self.year_bounds
    }

    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    pub fn genres(&self) -> &GenreCatalog {
        &self.genres
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Load genre labels; on failure continue with an empty catalogue
    pub async fn load_genres<A: CatalogApi>(&mut self, api: &A) {
        match api.fetch_genres().await {
            Ok(genres) => {
                self.genres = GenreCatalog::new(genres);
                debug!(genres = self.genres.len(), "Genres loaded");
            }
            Err(e) => {
                warn!(error = %e, "Failed to load genres, labels will be unavailable");
                self.genres = GenreCatalog::default();
            }
        }
    }

    /// Apply a filter change, returning whether anything changed
    pub fn dispatch(&mut self, action: FilterAction) -> bool {
        let action = self.clamp_years(action);
        debug!(?action, "Dispatching filter action");

        // Other controls leave uncommitted search text alone
        let sets_search = matches!(action, FilterAction::SetSearch(_));
        if !self.query.filters.apply(action) {
            return false;
        }

        self.query.page = 1;
        if sets_search {
            self.search_input.clone_from(&self.query.filters.search);
        }
        self.replace_location();
        true
    }

    /// Update the search box without touching the filters or the location
    pub fn type_search(&mut self, text: &str) {
        self.search_input = text.to_string();
    }

    /// Commit the search box contents once typing has paused
    pub fn commit_search(&mut self) -> bool {
        let text = self.search_input.clone();
        self.dispatch(FilterAction::SetSearch(text))
    }

    /// Navigate to another page of the current results
    pub fn go_to_page(&mut self, page: u32) -> bool {
        let page = page.max(1);
        if page == self.query.page {
            return false;
        }
        self.query.page = page;
        self.replace_location();
        true
    }

    /// Load the current page from the data source
    ///
    /// A requested page past the end is clamped and the location updated.
    pub async fn load(&mut self) -> ListView {
        let result = self
            .source
            .load_page(&self.query.filters, self.query.page, self.page_size)
            .await;

        match result {
            Ok(page) => {
                if page.pager.page() != self.query.page {
                    debug!(
                        requested = self.query.page,
                        clamped = page.pager.page(),
                        "Clamped page"
                    );
                    self.query.page = page.pager.page();
                    self.replace_location();
                }

                info!(
                    total = page.total_items,
                    page = page.pager.page(),
                    pages = page.pager.total_pages(),
                    "Loaded anime page"
                );

                if page.is_empty() {
                    ListView::Empty
                } else {
                    ListView::Items(page)
                }
            }
            Err(e) => {
                error!(error = %e, "Failed to load anime");
                ListView::Error(LOAD_ERROR_MESSAGE.to_string())
            }
        }
    }

    /// Clamp year inputs into the selectable range; zero stays unset
    fn clamp_years(&self, action: FilterAction) -> FilterAction {
        let (min, max) = self.year_bounds;
        let clamp = |year: Option<i32>| year.filter(|y| *y != 0).map(|y| y.clamp(min, max));

        match action {
            FilterAction::SetYears { start, end } => FilterAction::SetYears {
                start: clamp(start),
                end: clamp(end),
            },
            other => other,
        }
    }

    fn replace_location(&mut self) {
        let location = format!("{}?{}", self.path, self.query.to_query_string());
        if location != self.location {
            debug!(location = %location, "Replacing location");
            self.location = location;
        }
    }
}
