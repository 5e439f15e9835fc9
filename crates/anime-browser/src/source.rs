//! Where a page of anime comes from.
//!
//! [`ClientFiltered`] downloads the whole catalogue once and runs the filter
//! engine locally. [`ServerFiltered`] hands the criteria to the filtered
//! listing endpoint. Both produce the same [`PageResult`].

use crate::filter::apply_filters;
use crate::pagination::Pager;
use crate::state::FilterState;
use catalog_api::{AnimePage, CatalogApi, FetchError, FetchResult, ListQuery};
use serde::Serialize;
use shared::{Anime, Strategy};
use std::future::Future;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// One page of the filtered list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageResult {
    pub items: Vec<Anime>,
    /// Number of anime matching the filters across all pages
    pub total_items: usize,
    /// Navigation state; its page may differ from the requested one after clamping
    pub pager: Pager,
}

impl PageResult {
    pub fn is_empty(&self) -> bool {
        self.total_items == 0
    }

    /// Page a fully materialized list locally
    fn paginate(matched: &[&Anime], page: u32, page_size: u32) -> Self {
        let pager = Pager::new(matched.len(), page_size, page);
        let items = pager.slice(matched).iter().map(|a| (*a).clone()).collect();
        Self {
            items,
            total_items: matched.len(),
            pager,
        }
    }
}

/// Strategy producing pages of filtered anime
pub trait DataSource: Send + Sync {
    fn load_page(
        &self,
        filters: &FilterState,
        page: u32,
        page_size: u32,
    ) -> impl Future<Output = FetchResult<PageResult>> + Send;

    fn strategy(&self) -> Strategy;
}

/// Fetch the catalogue once, filter in memory
pub struct ClientFiltered<A> {
    api: A,
    catalog_limit: u32,
    catalog: OnceCell<Vec<Anime>>,
}

impl<A: CatalogApi> ClientFiltered<A> {
    pub fn new(api: A, catalog_limit: u32) -> Self {
        Self {
            api,
            catalog_limit,
            catalog: OnceCell::new(),
        }
    }

    /// The catalogue, fetched on first use
    ///
    /// A failed fetch leaves the cell empty so the next call retries.
    pub async fn catalog(&self) -> FetchResult<&[Anime]> {
        let catalog = self
            .catalog
            .get_or_try_init(|| async {
                let page = self.api.fetch_catalog(self.catalog_limit).await?;
                info!(records = page.anime_list.len(), "Catalogue loaded");
                Ok::<_, FetchError>(page.anime_list)
            })
            .await?;
        Ok(catalog.as_slice())
    }
}

impl<A: CatalogApi> DataSource for ClientFiltered<A> {
    async fn load_page(
        &self,
        filters: &FilterState,
        page: u32,
        page_size: u32,
    ) -> FetchResult<PageResult> {
        let catalog = self.catalog().await?;
        let matched = apply_filters(catalog, filters);

        debug!(
            catalog = catalog.len(),
            matched = matched.len(),
            page,
            "Filtered catalogue"
        );

        Ok(PageResult::paginate(&matched, page, page_size))
    }

    fn strategy(&self) -> Strategy {
        Strategy::Client
    }
}

/// Delegate filtering and sorting to the server
///
/// Title search uses the search endpoint and filters its results locally,
/// since the filtered listing has no text parameter.
pub struct ServerFiltered<A> {
    api: A,
}

impl<A: CatalogApi> ServerFiltered<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    fn list_query(filters: &FilterState, page: u32, page_size: u32) -> ListQuery {
        let (start_year, end_year) = filters
            .years
            .bounds()
            .map_or((None, None), |(start, end)| (Some(start), Some(end)));

        ListQuery {
            sort: filters.sort.map(|sort| (sort.key, sort.order)),
            status: filters.status,
            rating: filters.rating,
            kind: filters.kind,
            start_year,
            end_year,
            genre_ids: filters.genres.iter().copied().collect(),
            ..ListQuery::new(page, page_size)
        }
    }

    async fn fetch_filtered(
        &self,
        filters: &FilterState,
        page: u32,
        page_size: u32,
    ) -> FetchResult<(AnimePage, Pager)> {
        let result = self
            .api
            .fetch_filtered(&Self::list_query(filters, page, page_size))
            .await?;
        let pager = Pager::new(result.total_count as usize, page_size, page);
        Ok((result, pager))
    }
}

impl<A: CatalogApi> DataSource for ServerFiltered<A> {
    async fn load_page(
        &self,
        filters: &FilterState,
        page: u32,
        page_size: u32,
    ) -> FetchResult<PageResult> {
        if let Some(term) = filters.search_term() {
            let found = self.api.search_by_name(term).await?;
            let matched = apply_filters(&found.anime_list, filters);
            debug!(term, matched = matched.len(), "Filtered search results");
            return Ok(PageResult::paginate(&matched, page, page_size));
        }

        let (mut result, mut pager) = self.fetch_filtered(filters, page, page_size).await?;

        // Past the last page the server answers with an empty list
        if pager.page() != page {
            debug!(requested = page, clamped = pager.page(), "Refetching clamped page");
            (result, pager) = self.fetch_filtered(filters, pager.page(), page_size).await?;
        }

        let mut items = result.anime_list;
        items.truncate(page_size as usize);

        Ok(PageResult {
            items,
            total_items: result.total_count as usize,
            pager,
        })
    }

    fn strategy(&self) -> Strategy {
        Strategy::Server
    }
}

/// Source chosen from configuration
pub enum AnySource<A> {
    Client(ClientFiltered<A>),
    Server(ServerFiltered<A>),
}

impl<A: CatalogApi> AnySource<A> {
    pub fn new(strategy: Strategy, api: A, catalog_limit: u32) -> Self {
        match strategy {
            Strategy::Client => AnySource::Client(ClientFiltered::new(api, catalog_limit)),
            Strategy::Server => AnySource::Server(ServerFiltered::new(api)),
        }
    }
}

impl<A: CatalogApi> DataSource for AnySource<A> {
    async fn load_page(
        &self,
        filters: &FilterState,
        page: u32,
        page_size: u32,
    ) -> FetchResult<PageResult> {
        match self {
            AnySource::Client(source) => source.load_page(filters, page, page_size).await,
            AnySource::Server(source) => source.load_page(filters, page, page_size).await,
        }
    }

    fn strategy(&self) -> Strategy {
        match self {
            AnySource::Client(source) => source.strategy(),
            AnySource::Server(source) => source.strategy(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{FilterAction, Sort, YearRange};
    use crate::testing::FakeCatalog;
    use shared::{Kind, SortKey, SortOrder, Status};

    #[tokio::test]
    async fn test_client_source_fetches_catalog_once() {
        let api = FakeCatalog::numbered(65);
        let source = ClientFiltered::new(api.clone(), 10_000);

        let first = source
            .load_page(&FilterState::default(), 1, 30)
            .await
            .expect("page loads");
        let last = source
            .load_page(&FilterState::default(), 5, 30)
            .await
            .expect("page loads");

        assert_eq!(first.items.len(), 30);
        assert_eq!(last.pager.page(), 3);
        assert_eq!(last.items.len(), 5);
        assert_eq!(last.total_items, 65);
        assert_eq!(api.catalog_calls(), 1);
    }

    #[tokio::test]
    async fn test_client_source_retries_after_failure() {
        let api = FakeCatalog::numbered(3);
        api.set_failing(true);
        let source = ClientFiltered::new(api.clone(), 10_000);

        assert!(source.load_page(&FilterState::default(), 1, 30).await.is_err());

        api.set_failing(false);
        let page = source
            .load_page(&FilterState::default(), 1, 30)
            .await
            .expect("page loads");
        assert_eq!(page.total_items, 3);
        assert_eq!(api.catalog_calls(), 2);
    }

    #[tokio::test]
    async fn test_client_source_applies_filters() {
        let api = FakeCatalog::sample();
        let source = ClientFiltered::new(api, 10_000);

        let mut filters = FilterState::default();
        filters.apply(FilterAction::SelectKind(Some(Kind::Tv)));

        let page = source.load_page(&filters, 1, 30).await.expect("page loads");
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "A");

        filters.apply(FilterAction::SelectKind(Some(Kind::Tv)));
        filters.apply(FilterAction::SetYears {
            start: Some(2021),
            end: Some(2021),
        });
        let page = source.load_page(&filters, 1, 30).await.expect("page loads");
        assert_eq!(page.items[0].name, "B");
    }

    #[test]
    fn test_server_query_mapping() {
        let filters = FilterState {
            search: "ignored".to_string(),
            status: Some(Status::Ongoing),
            years: YearRange {
                start: Some(2010),
                end: None,
            },
            sort: Some(Sort::new(SortKey::Date, SortOrder::Asc)),
            genres: [2, 1].into_iter().collect(),
            ..Default::default()
        };

        let query = ServerFiltered::<FakeCatalog>::list_query(&filters, 2, 30);
        assert_eq!(query.page, 2);
        assert_eq!(query.limit, 30);
        assert_eq!(query.sort, Some((SortKey::Date, SortOrder::Asc)));
        assert_eq!(query.status, Some(Status::Ongoing));
        assert_eq!(query.start_year, None);
        assert_eq!(query.genre_ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_server_source_clamps_past_last_page() {
        let api = FakeCatalog::numbered(65);
        let source = ServerFiltered::new(api.clone());

        let page = source
            .load_page(&FilterState::default(), 9, 30)
            .await
            .expect("page loads");

        assert_eq!(page.pager.page(), 3);
        assert_eq!(page.items.len(), 5);
        assert_eq!(api.filtered_pages(), vec![9, 3]);
    }

    #[tokio::test]
    async fn test_server_source_search_filters_locally() {
        let api = FakeCatalog::sample();
        let source = ServerFiltered::new(api.clone());

        let filters = FilterState {
            search: "b".to_string(),
            kind: Some(Kind::Movie),
            ..Default::default()
        };
        let page = source.load_page(&filters, 1, 30).await.expect("page loads");

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "B");
        assert!(api.filtered_pages().is_empty());
    }

    #[tokio::test]
    async fn test_any_source_reports_strategy() {
        let client = AnySource::new(Strategy::Client, FakeCatalog::sample(), 100);
        let server = AnySource::new(Strategy::Server, FakeCatalog::sample(), 100);

        assert_eq!(client.strategy(), Strategy::Client);
        assert_eq!(server.strategy(), Strategy::Server);

        let page = server
            .load_page(&FilterState::default(), 1, 30)
            .await
            .expect("page loads");
        assert_eq!(page.total_items, 2);
    }
}
