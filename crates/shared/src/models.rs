//! Data models for the project.
//!
//! This module defines the domain records shared by every crate: validated
//! anime and genre records, their enumerated attributes, and the entries of
//! the user's personal lists.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

use crate::slug;

/// Error returned when an enumerated attribute cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field}: {value:?}")]
pub struct ParseEnumError {
    pub field: &'static str,
    pub value: String,
}

impl ParseEnumError {
    fn new(field: &'static str, value: &str) -> Self {
        Self {
            field,
            value: value.to_string(),
        }
    }
}

/// Anime kind (format)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Tv,
    Movie,
    Ova,
    Ona,
    Special,
    TvSpecial,
    Music,
}

impl Kind {
    pub const ALL: [Kind; 7] = [
        Kind::Tv,
        Kind::Movie,
        Kind::Ova,
        Kind::Ona,
        Kind::Special,
        Kind::TvSpecial,
        Kind::Music,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Tv => "tv",
            Kind::Movie => "movie",
            Kind::Ova => "ova",
            Kind::Ona => "ona",
            Kind::Special => "special",
            Kind::TvSpecial => "tv_special",
            Kind::Music => "music",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Kind::Tv => "TV Series",
            Kind::Movie => "Movie",
            Kind::Ova => "OVA",
            Kind::Ona => "ONA",
            Kind::Special => "Special",
            Kind::TvSpecial => "TV Special",
            Kind::Music => "Music",
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Kind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tv" => Ok(Kind::Tv),
            "movie" => Ok(Kind::Movie),
            "ova" => Ok(Kind::Ova),
            "ona" => Ok(Kind::Ona),
            "special" => Ok(Kind::Special),
            "tv_special" => Ok(Kind::TvSpecial),
            "music" => Ok(Kind::Music),
            _ => Err(ParseEnumError::new("kind", s)),
        }
    }
}

/// Airing status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Announced,
    Ongoing,
    Released,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Announced, Status::Ongoing, Status::Released];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Announced => "announced",
            Status::Ongoing => "ongoing",
            Status::Released => "released",
        }
    }

    /// Value expected by the filtered listing endpoint
    pub fn filter_param(&self) -> &'static str {
        match self {
            Status::Announced => "anons",
            Status::Ongoing => "ongoing",
            Status::Released => "released",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Status::Announced => "Announced",
            Status::Ongoing => "Ongoing",
            Status::Released => "Released",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Status {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "announced" | "anons" => Ok(Status::Announced),
            "ongoing" => Ok(Status::Ongoing),
            "released" => Ok(Status::Released),
            _ => Err(ParseEnumError::new("status", s)),
        }
    }
}

/// Content (age) rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    G,
    Pg,
    Pg13,
    R,
    RPlus,
    Rx,
    #[serde(rename = "none")]
    Unrated,
}

impl Rating {
    pub const ALL: [Rating; 7] = [
        Rating::G,
        Rating::Pg,
        Rating::Pg13,
        Rating::R,
        Rating::RPlus,
        Rating::Rx,
        Rating::Unrated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::G => "g",
            Rating::Pg => "pg",
            Rating::Pg13 => "pg_13",
            Rating::R => "r",
            Rating::RPlus => "r_plus",
            Rating::Rx => "rx",
            Rating::Unrated => "none",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Rating::G => "G",
            Rating::Pg => "PG",
            Rating::Pg13 => "PG-13",
            Rating::R => "R-17",
            Rating::RPlus => "R+",
            Rating::Rx => "Rx",
            Rating::Unrated => "None",
        }
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Rating {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "g" => Ok(Rating::G),
            "pg" => Ok(Rating::Pg),
            "pg_13" => Ok(Rating::Pg13),
            "r" => Ok(Rating::R),
            "r_plus" => Ok(Rating::RPlus),
            "rx" => Ok(Rating::Rx),
            "none" => Ok(Rating::Unrated),
            _ => Err(ParseEnumError::new("rating", s)),
        }
    }
}

/// Field an anime list can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Air date
    Date,
    Score,
    /// Localized title
    Name,
}

impl SortKey {
    pub const ALL: [SortKey; 3] = [SortKey::Score, SortKey::Date, SortKey::Name];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Date => "date",
            SortKey::Score => "score",
            SortKey::Name => "name",
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SortKey {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "date" => Ok(SortKey::Date),
            "score" => Ok(SortKey::Score),
            "name" => Ok(SortKey::Name),
            _ => Err(ParseEnumError::new("sort key", s)),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    /// Apply the direction to an ascending comparison
    pub fn apply(&self, ordering: std::cmp::Ordering) -> std::cmp::Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SortOrder {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(ParseEnumError::new("sort order", s)),
        }
    }
}

/// Validated anime record
///
/// Built only by the catalogue fetch boundary; read-only everywhere else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anime {
    pub anime_id: u64,

    // Titles
    pub name: String,
    pub russian: Option<String>,
    pub english: Option<String>,

    pub poster_url: Option<String>,
    pub score: Option<f64>,

    // Episodes
    pub episodes: Option<u32>,
    pub episodes_aired: Option<u32>,
    pub duration: Option<u32>, // minutes per episode

    // Dates
    pub aired_on: Option<NaiveDate>,
    pub released_on: Option<NaiveDate>,
    pub next_episode_at: Option<DateTime<Utc>>,
    pub season: Option<String>,

    // Classifications
    pub status: Option<Status>,
    pub kind: Option<Kind>,
    pub rating: Option<Rating>,
    pub genre_ids: BTreeSet<u32>,
    pub franchise: Option<String>,

    pub description: Option<String>,
}

impl Anime {
    /// Record with only an id and native title set
    pub fn new(anime_id: u64, name: impl Into<String>) -> Self {
        Self {
            anime_id,
            name: name.into(),
            russian: None,
            english: None,
            poster_url: None,
            score: None,
            episodes: None,
            episodes_aired: None,
            duration: None,
            aired_on: None,
            released_on: None,
            next_episode_at: None,
            season: None,
            status: None,
            kind: None,
            rating: None,
            genre_ids: BTreeSet::new(),
            franchise: None,
            description: None,
        }
    }

    /// Localized title, falling back to the native one
    pub fn display_title(&self) -> &str {
        self.russian
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&self.name)
    }

    /// Year the anime started airing
    pub fn air_year(&self) -> Option<i32> {
        self.aired_on.map(|d| d.year())
    }

    /// Detail page path, e.g. `/anime/5114-stalnoy-alhimik`
    pub fn detail_path(&self) -> String {
        let slug = slug::title_to_slug(self.display_title());
        if slug.is_empty() {
            format!("/anime/{}", self.anime_id)
        } else {
            format!("/anime/{}-{}", self.anime_id, slug)
        }
    }
}

/// Genre record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub genre_id: u32,
    pub name: String,
    pub russian: Option<String>,
}

impl Genre {
    pub fn label(&self) -> &str {
        self.russian
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&self.name)
    }
}

/// Genre lookup table (id -> label)
#[derive(Debug, Clone, Default)]
pub struct GenreCatalog {
    genres: HashMap<u32, Genre>,
}

impl GenreCatalog {
    /// Placeholder shown for unknown genre ids
    pub const UNKNOWN_LABEL: &'static str = "...";

    pub fn new(genres: impl IntoIterator<Item = Genre>) -> Self {
        Self {
            genres: genres.into_iter().map(|g| (g.genre_id, g)).collect(),
        }
    }

    pub fn get(&self, genre_id: u32) -> Option<&Genre> {
        self.genres.get(&genre_id)
    }

    pub fn label(&self, genre_id: u32) -> &str {
        self.get(genre_id)
            .map(Genre::label)
            .unwrap_or(Self::UNKNOWN_LABEL)
    }

    /// All genres sorted by label
    pub fn sorted(&self) -> Vec<&Genre> {
        let mut genres: Vec<_> = self.genres.values().collect();
        genres.sort_by_key(|g| g.label().to_lowercase());
        genres
    }

    pub fn len(&self) -> usize {
        self.genres.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genres.is_empty()
    }
}

/// Format a season string such as `fall_2020` as `Fall 2020`
pub fn season_label(season: &str) -> String {
    let Some((name, year)) = season.split_once('_') else {
        return season.to_string();
    };

    let name = match name {
        "winter" => "Winter",
        "spring" => "Spring",
        "summer" => "Summer",
        "fall" => "Fall",
        _ => return season.to_string(),
    };

    format!("{} {}", name, year)
}

/// Status of an anime in the user's personal lists
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ListStatus {
    Watching,
    Planned,
    Completed,
    Dropped,
    OnHold,
}

impl ListStatus {
    pub const ALL: [ListStatus; 5] = [
        ListStatus::Watching,
        ListStatus::Planned,
        ListStatus::Completed,
        ListStatus::Dropped,
        ListStatus::OnHold,
    ];
}

impl std::fmt::Display for ListStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListStatus::Watching => write!(f, "watching"),
            ListStatus::Planned => write!(f, "planned"),
            ListStatus::Completed => write!(f, "completed"),
            ListStatus::Dropped => write!(f, "dropped"),
            ListStatus::OnHold => write!(f, "on_hold"),
        }
    }
}

impl std::str::FromStr for ListStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "watching" => Ok(ListStatus::Watching),
            "planned" => Ok(ListStatus::Planned),
            "completed" => Ok(ListStatus::Completed),
            "dropped" => Ok(ListStatus::Dropped),
            "on_hold" => Ok(ListStatus::OnHold),
            _ => Err(ParseEnumError::new("list status", s)),
        }
    }
}

/// Entry in the user's personal lists
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListEntry {
    pub anime_id: u64,
    pub title: String,
    pub status: ListStatus,
    pub episodes_watched: u32,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Anime {
        Anime {
            anime_id: 5114,
            name: "Fullmetal Alchemist: Brotherhood".to_string(),
            russian: Some("Стальной алхимик: Братство".to_string()),
            english: None,
            poster_url: None,
            score: Some(9.1),
            episodes: Some(64),
            episodes_aired: Some(64),
            duration: Some(24),
            aired_on: NaiveDate::from_ymd_opt(2009, 4, 5),
            released_on: None,
            next_episode_at: None,
            season: Some("spring_2009".to_string()),
            status: Some(Status::Released),
            kind: Some(Kind::Tv),
            rating: Some(Rating::R),
            genre_ids: BTreeSet::from([1, 2]),
            franchise: None,
            description: None,
        }
    }

    #[test]
    fn test_enum_parsing_is_case_insensitive() {
        assert_eq!("TV".parse::<Kind>(), Ok(Kind::Tv));
        assert_eq!(" tv_special ".parse::<Kind>(), Ok(Kind::TvSpecial));
        assert_eq!("Released".parse::<Status>(), Ok(Status::Released));
        assert_eq!("anons".parse::<Status>(), Ok(Status::Announced));
        assert_eq!("PG_13".parse::<Rating>(), Ok(Rating::Pg13));
        assert!("cartoon".parse::<Kind>().is_err());
    }

    #[test]
    fn test_enum_round_trip_through_str() {
        for kind in Kind::ALL {
            assert_eq!(kind.as_str().parse::<Kind>(), Ok(kind));
        }
        for rating in Rating::ALL {
            assert_eq!(rating.as_str().parse::<Rating>(), Ok(rating));
        }
        for status in ListStatus::ALL {
            assert_eq!(status.to_string().parse::<ListStatus>(), Ok(status));
        }
    }

    #[test]
    fn test_display_title_falls_back_to_native() {
        let mut anime = sample();
        assert_eq!(anime.display_title(), "Стальной алхимик: Братство");

        anime.russian = Some("  ".to_string());
        assert_eq!(anime.display_title(), "Fullmetal Alchemist: Brotherhood");
    }

    #[test]
    fn test_air_year_and_detail_path() {
        let anime = sample();
        assert_eq!(anime.air_year(), Some(2009));
        assert_eq!(anime.detail_path(), "/anime/5114-stalnoy-alhimik-bratstvo");
    }

    #[test]
    fn test_genre_catalog_labels() {
        let catalog = GenreCatalog::new(vec![
            Genre {
                genre_id: 1,
                name: "Action".to_string(),
                russian: Some("Экшен".to_string()),
            },
            Genre {
                genre_id: 2,
                name: "Comedy".to_string(),
                russian: None,
            },
        ]);

        assert_eq!(catalog.label(1), "Экшен");
        assert_eq!(catalog.label(2), "Comedy");
        assert_eq!(catalog.label(99), "...");
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_season_label() {
        assert_eq!(season_label("fall_2020"), "Fall 2020");
        assert_eq!(season_label("winter_1999"), "Winter 1999");
        assert_eq!(season_label("2020"), "2020");
        assert_eq!(season_label("monsoon_2020"), "monsoon_2020");
    }
}
