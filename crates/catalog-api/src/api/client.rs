//! Catalogue API client.

use super::request::ListQuery;
use super::types::*;
use crate::error::{FetchError, FetchResult};
use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use shared::{Anime, Genre};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// HTTP client for the anime catalogue service
#[derive(Debug, Clone)]
pub struct CatalogClient {
    /// HTTP client
    client: Client,
    /// Base URL, always ending with a slash
    base_url: Url,
}

impl CatalogClient {
    /// Create a new catalogue client
    pub fn new(base_url: &str, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .user_agent(concat!("anime-browser/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        let mut base = base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url =
            Url::parse(&base).with_context(|| format!("Invalid catalogue base URL: {}", base_url))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build an endpoint URL from path segments and query pairs
    fn endpoint(&self, segments: &[&str], query: &[(&str, String)]) -> FetchResult<Url> {
        let mut url = self.base_url.clone();

        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl {
                url: self.base_url.to_string(),
                source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
            })?
            .pop_if_empty()
            .extend(segments);

        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }

        Ok(url)
    }

    /// Make a single GET request and decode the JSON body
    async fn get<T: DeserializeOwned>(&self, url: Url) -> FetchResult<T> {
        let url_str = url.to_string();
        debug!(url = %url_str, "Making API request");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| {
                warn!(url = %url_str, error = %source, "Request error");
                FetchError::Network {
                    url: url_str.clone(),
                    source,
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url_str, status = %status, "Request failed");
            return Err(FetchError::Status {
                url: url_str,
                status,
            });
        }

        let body = response.text().await.map_err(|source| FetchError::Network {
            url: url_str.clone(),
            source,
        })?;

        let data = serde_json::from_str(&body).map_err(|source| {
            warn!(url = %url_str, error = %source, "Failed to parse response");
            FetchError::Decode {
                url: url_str.clone(),
                source,
            }
        })?;

        debug!(url = %url_str, bytes = body.len(), "Request successful");
        Ok(data)
    }

    /// Fetch the whole catalogue in a single page
    pub async fn fetch_catalog(&self, limit: u32) -> FetchResult<AnimePage> {
        info!(limit, "Fetching anime catalogue");
        let url = self.endpoint(
            &["anime", "get-anime-list"],
            &[("page", "1".to_string()), ("limit", limit.to_string())],
        )?;

        let raw: RawAnimeList = self.get(url).await?;
        let page = raw.validate();

        info!(
            total = page.total_count,
            received = page.anime_list.len(),
            "Catalogue fetched"
        );
        Ok(page)
    }

    /// Fetch one page from the server-side filtered listing
    pub async fn fetch_filtered(&self, query: &ListQuery) -> FetchResult<AnimePage> {
        debug!(page = query.page, limit = query.limit, "Fetching filtered anime list");
        let url = self.endpoint(&["anime", "get-anime-list-filtered"], &query.to_pairs())?;

        let raw: RawAnimeList = self.get(url).await?;
        Ok(raw.validate())
    }

    /// Search anime by title
    pub async fn search_by_name(&self, name: &str) -> FetchResult<AnimePage> {
        debug!(name, "Searching anime by name");
        let url = self.endpoint(&["anime", "name", name.trim()], &[])?;

        let raw: RawSearchResponse = self.get(url).await?;
        Ok(raw.validate())
    }

    /// Fetch a single anime record
    pub async fn fetch_anime(&self, anime_id: u64) -> FetchResult<Anime> {
        debug!(anime_id, "Fetching anime details");
        let id = anime_id.to_string();
        let url = self.endpoint(&["anime", id.as_str()], &[])?;
        let url_str = url.to_string();

        let raw: serde_json::Value = self.get(url).await?;
        parse_anime(raw).map_err(|source| FetchError::InvalidRecord {
            url: url_str,
            source,
        })
    }

    /// Fetch every genre
    pub async fn fetch_genres(&self) -> FetchResult<Vec<Genre>> {
        info!("Fetching anime genres");
        let url = self.endpoint(&["genre", "get-list-genres"], &[])?;

        let raw: Vec<RawGenre> = self.get(url).await?;
        Ok(validate_genres(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{SortKey, SortOrder};

    #[test]
    fn test_client_creation() {
        let client = CatalogClient::new("http://localhost:8000", 30);
        assert!(client.is_ok());

        assert!(CatalogClient::new("not a url", 30).is_err());
    }

    #[test]
    fn test_endpoint_urls() -> Result<()> {
        let client = CatalogClient::new("http://localhost:8000/api", 30)?;

        let url = client.endpoint(
            &["anime", "get-anime-list"],
            &[("page", "1".to_string()), ("limit", "10".to_string())],
        )?;
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/anime/get-anime-list?page=1&limit=10"
        );

        let url = client.endpoint(&["genre", "get-list-genres"], &[])?;
        assert_eq!(url.as_str(), "http://localhost:8000/api/genre/get-list-genres");

        Ok(())
    }

    #[test]
    fn test_search_term_is_one_path_segment() -> Result<()> {
        let client = CatalogClient::new("http://localhost:8000/", 30)?;

        let url = client.endpoint(&["anime", "name", "a/b c"], &[])?;
        assert_eq!(url.as_str(), "http://localhost:8000/anime/name/a%2Fb%20c");

        Ok(())
    }

    #[test]
    fn test_filtered_endpoint_query() -> Result<()> {
        let client = CatalogClient::new("http://localhost:8000", 30)?;
        let query = ListQuery {
            sort: Some((SortKey::Name, SortOrder::Asc)),
            genre_ids: vec![3, 7],
            ..ListQuery::new(1, 30)
        };

        let url = client.endpoint(&["anime", "get-anime-list-filtered"], &query.to_pairs())?;
        assert_eq!(
            url.query(),
            Some("page=1&limit=30&sort_order=asc&filter_by_name=true&genre_id=3&genre_id=7")
        );

        Ok(())
    }
}
