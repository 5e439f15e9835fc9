//! Catalogue API response types and the validation boundary.
//!
//! The `Raw*` types mirror the JSON the API actually sends, which is loosely
//! typed: ids arrive as numbers or strings, enumerations as free text, dates as
//! strings in more than one shape. They are converted into the validated
//! records from `shared::models` before anything else sees them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::{Anime, Genre};
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{debug, warn};

/// Number or string scalar as sent by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(u64),
    Float(f64),
    Text(String),
}

impl Scalar {
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Scalar::Int(n) => Some(*n),
            Scalar::Float(f) if f.fract() == 0.0 && *f >= 0.0 => Some(*f as u64),
            Scalar::Float(_) => None,
            Scalar::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        self.as_u64().and_then(|n| u32::try_from(n).ok())
    }

    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            Scalar::Int(n) => *n as f64,
            Scalar::Float(f) => *f,
            Scalar::Text(s) => s.trim().parse().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

/// Anime listing response
#[derive(Debug, Clone, Deserialize)]
pub struct RawAnimeList {
    #[serde(default)]
    pub total_count: Option<Scalar>,
    #[serde(default, alias = "animeList")]
    pub anime_list: Vec<serde_json::Value>,
}

/// Anime record as sent by the API
#[derive(Debug, Clone, Deserialize)]
pub struct RawAnime {
    #[serde(default)]
    pub anime_id: Option<Scalar>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub russian: Option<String>,
    #[serde(default)]
    pub english: Option<String>,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub score: Option<Scalar>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default)]
    pub episodes: Option<Scalar>,
    #[serde(default)]
    pub episodes_aired: Option<Scalar>,
    #[serde(default)]
    pub duration: Option<Scalar>,
    #[serde(default)]
    pub aired_on: Option<String>,
    #[serde(default)]
    pub released_on: Option<String>,
    #[serde(default)]
    pub next_episode_at: Option<String>,
    #[serde(default)]
    pub season: Option<String>,
    #[serde(default)]
    pub franchise: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<Scalar>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Genre record as sent by the API
#[derive(Debug, Clone, Deserialize)]
pub struct RawGenre {
    #[serde(default)]
    pub genre_id: Option<Scalar>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub russian: Option<String>,
}

/// Reason a record was rejected at the boundary
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("record has no valid id")]
    MissingId,
    #[error("record {0} has no title")]
    MissingTitle(u64),
    #[error("record is not an object: {0}")]
    Malformed(String),
}

/// Validated page of anime
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimePage {
    /// Total matching records on the server (not just this page)
    pub total_count: u64,
    pub anime_list: Vec<Anime>,
}

/// Trim a string and drop it when empty
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Parse `2009-04-05`, `2009-04-05T00:00:00` or a full RFC 3339 timestamp
fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    let value = value?.trim();
    let day = value.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn parse_timestamp(value: Option<&str>) -> Option<DateTime<Utc>> {
    let value = value?.trim();
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse an enumerated attribute, logging values the model does not know
fn parse_enum<T: std::str::FromStr>(value: Option<&str>, anime_id: u64) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            debug!(anime_id, error = %e, "Ignoring unknown attribute value");
            None
        }
    }
}

impl TryFrom<RawAnime> for Anime {
    type Error = RecordError;

    fn try_from(raw: RawAnime) -> Result<Self, Self::Error> {
        let anime_id = raw
            .anime_id
            .as_ref()
            .and_then(Scalar::as_u64)
            .ok_or(RecordError::MissingId)?;

        let russian = non_empty(raw.russian);
        let name = non_empty(raw.name)
            .or_else(|| russian.clone())
            .ok_or(RecordError::MissingTitle(anime_id))?;

        // Unscored titles are reported as 0
        let score = raw
            .score
            .as_ref()
            .and_then(Scalar::as_f64)
            .filter(|s| *s > 0.0);

        let genre_ids: BTreeSet<u32> = raw.genre_ids.iter().filter_map(Scalar::as_u32).collect();

        Ok(Anime {
            anime_id,
            name,
            russian,
            english: non_empty(raw.english),
            poster_url: non_empty(raw.poster_url),
            score,
            episodes: raw.episodes.as_ref().and_then(Scalar::as_u32),
            episodes_aired: raw.episodes_aired.as_ref().and_then(Scalar::as_u32),
            duration: raw.duration.as_ref().and_then(Scalar::as_u32),
            aired_on: parse_date(raw.aired_on.as_deref()),
            released_on: parse_date(raw.released_on.as_deref()),
            next_episode_at: parse_timestamp(raw.next_episode_at.as_deref()),
            season: non_empty(raw.season),
            status: parse_enum(raw.status.as_deref(), anime_id),
            kind: parse_enum(raw.kind.as_deref(), anime_id),
            rating: parse_enum(raw.rating.as_deref(), anime_id),
            genre_ids,
            franchise: non_empty(raw.franchise),
            description: non_empty(raw.description),
        })
    }
}

impl TryFrom<RawGenre> for Genre {
    type Error = RecordError;

    fn try_from(raw: RawGenre) -> Result<Self, Self::Error> {
        let genre_id = raw
            .genre_id
            .as_ref()
            .and_then(Scalar::as_u32)
            .ok_or(RecordError::MissingId)?;

        let russian = non_empty(raw.russian);
        let name = non_empty(raw.name)
            .or_else(|| russian.clone())
            .ok_or(RecordError::MissingTitle(genre_id as u64))?;

        Ok(Genre {
            genre_id,
            name,
            russian,
        })
    }
}

/// Validate a single JSON value as an anime record
pub fn parse_anime(value: serde_json::Value) -> Result<Anime, RecordError> {
    let raw: RawAnime =
        serde_json::from_value(value).map_err(|e| RecordError::Malformed(e.to_string()))?;
    Anime::try_from(raw)
}

impl RawAnimeList {
    /// Validate every record, dropping the ones that fail
    pub fn validate(self) -> AnimePage {
        let received = self.anime_list.len();
        let anime_list: Vec<Anime> = self
            .anime_list
            .into_iter()
            .filter_map(|value| match parse_anime(value) {
                Ok(anime) => Some(anime),
                Err(e) => {
                    warn!(error = %e, "Dropping invalid anime record");
                    None
                }
            })
            .collect();

        let dropped = received - anime_list.len();
        if dropped > 0 {
            warn!(received, dropped, "Some anime records failed validation");
        }

        let total_count = self
            .total_count
            .as_ref()
            .and_then(Scalar::as_u64)
            .unwrap_or(anime_list.len() as u64);

        AnimePage {
            total_count,
            anime_list,
        }
    }
}

/// Title search response, either a bare array or a listing envelope
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawSearchResponse {
    List(Vec<serde_json::Value>),
    Page(RawAnimeList),
}

impl RawSearchResponse {
    pub fn validate(self) -> AnimePage {
        match self {
            RawSearchResponse::List(anime_list) => RawAnimeList {
                total_count: None,
                anime_list,
            }
            .validate(),
            RawSearchResponse::Page(page) => page.validate(),
        }
    }
}

/// Validate a genre listing, dropping invalid entries
pub fn validate_genres(raw: Vec<RawGenre>) -> Vec<Genre> {
    raw.into_iter()
        .filter_map(|g| match Genre::try_from(g) {
            Ok(genre) => Some(genre),
            Err(e) => {
                warn!(error = %e, "Dropping invalid genre record");
                None
            }
        })
        .collect()
}
