//! In-memory catalogue used by unit tests.

use catalog_api::{AnimePage, CatalogApi, FetchError, FetchResult, ListQuery, StatusCode};
use chrono::NaiveDate;
use shared::{Anime, Genre, Kind};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Default)]
struct Inner {
    anime: Vec<Anime>,
    genres: Vec<Genre>,
    failing: bool,
    genres_failing: bool,
    catalog_calls: usize,
    filtered_pages: Vec<u32>,
}

/// Shared handle so tests can inspect calls after handing a clone away
#[derive(Clone, Default)]
pub struct FakeCatalog {
    inner: Arc<Mutex<Inner>>,
}

fn server_error(path: &str) -> FetchError {
    FetchError::Status {
        url: format!("http://fake{}", path),
        status: StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl FakeCatalog {
    pub fn new(anime: Vec<Anime>) -> Self {
        let fake = Self::default();
        fake.lock().anime = anime;
        fake
    }

    /// `A` (9.0, 2020, tv) and `B` (7.0, 2021, movie)
    pub fn sample() -> Self {
        let a = Anime {
            score: Some(9.0),
            kind: Some(Kind::Tv),
            aired_on: NaiveDate::from_ymd_opt(2020, 4, 1),
            genre_ids: [1].into_iter().collect(),
            ..Anime::new(1, "A")
        };
        let b = Anime {
            score: Some(7.0),
            kind: Some(Kind::Movie),
            aired_on: NaiveDate::from_ymd_opt(2021, 7, 1),
            genre_ids: [1, 2].into_iter().collect(),
            ..Anime::new(2, "B")
        };

        let fake = Self::new(vec![a, b]);
        fake.lock().genres = vec![
            Genre {
                genre_id: 1,
                name: "Action".to_string(),
                russian: Some("Экшен".to_string()),
            },
            Genre {
                genre_id: 2,
                name: "Drama".to_string(),
                russian: None,
            },
        ];
        fake
    }

    /// `count` anime named `Anime 1` .. `Anime {count}`
    pub fn numbered(count: u64) -> Self {
        Self::new(
            (1..=count)
                .map(|id| Anime::new(id, format!("Anime {}", id)))
                .collect(),
        )
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set_failing(&self, failing: bool) {
        self.lock().failing = failing;
    }

    pub fn set_genres_failing(&self, failing: bool) {
        self.lock().genres_failing = failing;
    }

    pub fn catalog_calls(&self) -> usize {
        self.lock().catalog_calls
    }

    /// Pages requested from the filtered endpoint, in order
    pub fn filtered_pages(&self) -> Vec<u32> {
        self.lock().filtered_pages.clone()
    }
}

impl CatalogApi for FakeCatalog {
    async fn fetch_catalog(&self, limit: u32) -> FetchResult<AnimePage> {
        let mut inner = self.lock();
        inner.catalog_calls += 1;
        if inner.failing {
            return Err(server_error("/anime/get-anime-list"));
        }
        Ok(AnimePage {
            total_count: inner.anime.len() as u64,
            anime_list: inner.anime.iter().take(limit as usize).cloned().collect(),
        })
    }

    async fn fetch_filtered(&self, query: &ListQuery) -> FetchResult<AnimePage> {
        let mut inner = self.lock();
        inner.filtered_pages.push(query.page);
        if inner.failing {
            return Err(server_error("/anime/get-anime-list-filtered"));
        }

        let limit = query.limit as usize;
        let start = (query.page.saturating_sub(1) as usize) * limit;
        Ok(AnimePage {
            total_count: inner.anime.len() as u64,
            anime_list: inner.anime.iter().skip(start).take(limit).cloned().collect(),
        })
    }

    async fn search_by_name(&self, name: &str) -> FetchResult<AnimePage> {
        let inner = self.lock();
        if inner.failing {
            return Err(server_error("/anime/name"));
        }
        let needle = name.to_lowercase();
        let found: Vec<Anime> = inner
            .anime
            .iter()
            .filter(|a| a.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        Ok(AnimePage {
            total_count: found.len() as u64,
            anime_list: found,
        })
    }

    async fn fetch_anime(&self, anime_id: u64) -> FetchResult<Anime> {
        let inner = self.lock();
        inner
            .anime
            .iter()
            .find(|a| a.anime_id == anime_id)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: format!("http://fake/anime/{}", anime_id),
                status: StatusCode::NOT_FOUND,
            })
    }

    async fn fetch_genres(&self) -> FetchResult<Vec<Genre>> {
        let inner = self.lock();
        if inner.genres_failing {
            return Err(server_error("/genre/get-list-genres"));
        }
        Ok(inner.genres.clone())
    }
}
