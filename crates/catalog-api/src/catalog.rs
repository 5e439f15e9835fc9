//! Service-agnostic catalogue interface and its cached decorator.

use crate::api::{AnimePage, CatalogClient, ListQuery};
use crate::cache::CacheManager;
use crate::error::FetchResult;
use shared::{Anime, Genre};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

/// Read access to the anime catalogue
///
/// Implemented by the HTTP client and by in-memory fakes in tests.
pub trait CatalogApi: Send + Sync {
    /// Fetch the whole catalogue in one page of at most `limit` records.
    fn fetch_catalog(&self, limit: u32) -> impl Future<Output = FetchResult<AnimePage>> + Send;

    /// Fetch one page filtered and sorted by the server.
    fn fetch_filtered(
        &self,
        query: &ListQuery,
    ) -> impl Future<Output = FetchResult<AnimePage>> + Send;

    /// Search anime by title.
    fn search_by_name(&self, name: &str) -> impl Future<Output = FetchResult<AnimePage>> + Send;

    /// Fetch a single anime record.
    fn fetch_anime(&self, anime_id: u64) -> impl Future<Output = FetchResult<Anime>> + Send;

    /// Fetch every genre.
    fn fetch_genres(&self) -> impl Future<Output = FetchResult<Vec<Genre>>> + Send;
}

impl CatalogApi for CatalogClient {
    async fn fetch_catalog(&self, limit: u32) -> FetchResult<AnimePage> {
        CatalogClient::fetch_catalog(self, limit).await
    }

    async fn fetch_filtered(&self, query: &ListQuery) -> FetchResult<AnimePage> {
        CatalogClient::fetch_filtered(self, query).await
    }

    async fn search_by_name(&self, name: &str) -> FetchResult<AnimePage> {
        CatalogClient::search_by_name(self, name).await
    }

    async fn fetch_anime(&self, anime_id: u64) -> FetchResult<Anime> {
        CatalogClient::fetch_anime(self, anime_id).await
    }

    async fn fetch_genres(&self) -> FetchResult<Vec<Genre>> {
        CatalogClient::fetch_genres(self).await
    }
}

impl<T: CatalogApi> CatalogApi for Arc<T> {
    fn fetch_catalog(&self, limit: u32) -> impl Future<Output = FetchResult<AnimePage>> + Send {
        (**self).fetch_catalog(limit)
    }

    fn fetch_filtered(
        &self,
        query: &ListQuery,
    ) -> impl Future<Output = FetchResult<AnimePage>> + Send {
        (**self).fetch_filtered(query)
    }

    fn search_by_name(&self, name: &str) -> impl Future<Output = FetchResult<AnimePage>> + Send {
        (**self).search_by_name(name)
    }

    fn fetch_anime(&self, anime_id: u64) -> impl Future<Output = FetchResult<Anime>> + Send {
        (**self).fetch_anime(anime_id)
    }

    fn fetch_genres(&self) -> impl Future<Output = FetchResult<Vec<Genre>>> + Send {
        (**self).fetch_genres()
    }
}

const GENRES_KEY: &str = "genres";

/// Catalogue decorator that keeps the full catalogue and genre list on disk
///
/// Filtered pages, searches and single records always go to the inner API.
/// Cache failures are logged and never fail a fetch.
pub struct CachedCatalog<A> {
    inner: A,
    cache: CacheManager,
}

impl<A: CatalogApi> CachedCatalog<A> {
    pub fn new(inner: A, cache: CacheManager) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    fn load<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.cache.get(key) {
            Ok(hit) => hit,
            Err(e) => {
                warn!(key, error = %e, "Ignoring unreadable cache entry");
                None
            }
        }
    }

    fn store<T: serde::Serialize>(&self, key: &str, data: &T) {
        if let Err(e) = self.cache.set(key, data) {
            warn!(key, error = %e, "Failed to cache response");
        }
    }
}

fn catalog_key(limit: u32) -> String {
    format!("catalog_{}", limit)
}

impl<A: CatalogApi> CatalogApi for CachedCatalog<A> {
    async fn fetch_catalog(&self, limit: u32) -> FetchResult<AnimePage> {
        let key = catalog_key(limit);
        if let Some(page) = self.load::<AnimePage>(&key) {
            debug!(records = page.anime_list.len(), "Using cached catalogue");
            return Ok(page);
        }

        let page = self.inner.fetch_catalog(limit).await?;
        self.store(&key, &page);
        Ok(page)
    }

    async fn fetch_filtered(&self, query: &ListQuery) -> FetchResult<AnimePage> {
        self.inner.fetch_filtered(query).await
    }

    async fn search_by_name(&self, name: &str) -> FetchResult<AnimePage> {
        self.inner.search_by_name(name).await
    }

    async fn fetch_anime(&self, anime_id: u64) -> FetchResult<Anime> {
        self.inner.fetch_anime(anime_id).await
    }

    async fn fetch_genres(&self) -> FetchResult<Vec<Genre>> {
        if let Some(genres) = self.load::<Vec<Genre>>(GENRES_KEY) {
            debug!(genres = genres.len(), "Using cached genres");
            return Ok(genres);
        }

        let genres = self.inner.fetch_genres().await?;
        self.store(GENRES_KEY, &genres);
        Ok(genres)
    }
}
