//! Filter state encoded in the URL query string.
//!
//! The query is the only persisted browsing state. Keys are written in a
//! fixed order (`search`, `genre_id`, `kind`, `status`, `rating`, `years`,
//! `sort`, `order`, `page`) followed by unknown keys in their original order.
//! Unset filters are omitted entirely.

use crate::state::{FilterState, Sort, YearRange};
use shared::{SortKey, SortOrder};
use tracing::debug;
use url::form_urlencoded;

const KNOWN_KEYS: [&str; 9] = [
    "search", "genre_id", "kind", "status", "rating", "years", "sort", "order", "page",
];

/// Parsed browsing query
#[derive(Debug, Clone, PartialEq)]
pub struct BrowserQuery {
    pub filters: FilterState,
    /// 1-based page number
    pub page: u32,
    /// Keys this browser does not understand, kept verbatim
    pub extras: Vec<(String, String)>,
}

impl Default for BrowserQuery {
    fn default() -> Self {
        Self {
            filters: FilterState::default(),
            page: 1,
            extras: Vec::new(),
        }
    }
}

/// Parse an optional enumerated value, treating `all`, empty and unknown as unset
fn parse_choice<T: std::str::FromStr>(key: &str, value: &str) -> Option<T> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("all") {
        return None;
    }
    let parsed = value.parse().ok();
    if parsed.is_none() {
        debug!(key, value, "Ignoring unrecognized query value");
    }
    parsed
}

/// Parse a year bound; zero or garbage means unset
fn parse_year(value: &str) -> Option<i32> {
    value.trim().parse().ok().filter(|year| *year != 0)
}

impl BrowserQuery {
    /// Parse a query string, with or without the leading `?`
    pub fn parse(query: &str) -> Self {
        let query = query.trim().trim_start_matches('?');

        let mut filters = FilterState::default();
        let mut page = 1;
        let mut years = Vec::new();
        let mut sort_key: Option<SortKey> = None;
        let mut sort_order: Option<SortOrder> = None;
        let mut extras = Vec::new();

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "search" => filters.search = value.into_owned(),
                "genre_id" => {
                    // Accept both repeated keys and comma-separated lists
                    for part in value.split(',') {
                        if let Ok(genre_id) = part.trim().parse() {
                            filters.genres.insert(genre_id);
                        }
                    }
                }
                "kind" => filters.kind = parse_choice("kind", &value),
                "status" => filters.status = parse_choice("status", &value),
                "rating" => filters.rating = parse_choice("rating", &value),
                "years" => years.push(parse_year(&value)),
                "sort" => sort_key = parse_choice("sort", &value),
                "order" => sort_order = parse_choice("order", &value),
                "page" => {
                    page = value.trim().parse().ok().filter(|p| *p >= 1).unwrap_or(1);
                }
                _ => extras.push((key.into_owned(), value.into_owned())),
            }
        }

        filters.years = YearRange {
            start: years.first().copied().flatten(),
            end: years.get(1).copied().flatten(),
        };

        filters.sort = sort_key.map(|key| Sort::new(key, sort_order.unwrap_or(SortOrder::Desc)));

        Self {
            filters,
            page,
            extras,
        }
    }

    /// Serialize in canonical key order, without the leading `?`
    pub fn to_query_string(&self) -> String {
        let filters = &self.filters;
        let mut serializer = form_urlencoded::Serializer::new(String::new());

        if filters.search_term().is_some() {
            serializer.append_pair("search", &filters.search);
        }
        for genre_id in &filters.genres {
            serializer.append_pair("genre_id", &genre_id.to_string());
        }
        if let Some(kind) = filters.kind {
            serializer.append_pair("kind", kind.as_str());
        }
        if let Some(status) = filters.status {
            serializer.append_pair("status", status.as_str());
        }
        if let Some(rating) = filters.rating {
            serializer.append_pair("rating", rating.as_str());
        }
        if let Some((start, end)) = filters.years.bounds() {
            serializer.append_pair("years", &start.to_string());
            serializer.append_pair("years", &end.to_string());
        }
        if let Some(sort) = filters.sort {
            serializer.append_pair("sort", sort.key.as_str());
            serializer.append_pair("order", sort.order.as_str());
        }

        serializer.append_pair("page", &self.page.max(1).to_string());

        for (key, value) in &self.extras {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                serializer.append_pair(key, value);
            }
        }

        serializer.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::FilterAction;
    use shared::{Kind, Rating, Status};
    use std::collections::BTreeSet;

    #[test]
    fn test_parse_full_query() {
        let query = BrowserQuery::parse(
            "?search=fma&genre_id=1&genre_id=4&kind=TV&status=anons&rating=pg_13&years=2000&years=2010&sort=score&order=asc&page=3",
        );

        let filters = &query.filters;
        assert_eq!(filters.search, "fma");
        assert_eq!(filters.genres, BTreeSet::from([1, 4]));
        assert_eq!(filters.kind, Some(Kind::Tv));
        assert_eq!(filters.status, Some(Status::Announced));
        assert_eq!(filters.rating, Some(Rating::Pg13));
        assert_eq!(filters.years, YearRange::new(2000, 2010));
        assert_eq!(filters.sort, Some(Sort::new(SortKey::Score, SortOrder::Asc)));
        assert_eq!(query.page, 3);
    }

    #[test]
    fn test_sentinels_and_garbage_parse_as_unset() {
        let query = BrowserQuery::parse(
            "kind=all&status=&rating=bogus&genre_id=x&years=0&years=2010&sort=popularity&page=-2",
        );

        let expected = FilterState {
            years: YearRange {
                start: None,
                end: Some(2010),
            },
            ..Default::default()
        };
        assert_eq!(query.filters, expected);
        assert_eq!(query.page, 1);
    }

    #[test]
    fn test_sort_without_order_defaults_to_desc() {
        let query = BrowserQuery::parse("sort=date");
        assert_eq!(
            query.filters.sort,
            Some(Sort::new(SortKey::Date, SortOrder::Desc))
        );

        assert_eq!(BrowserQuery::parse("order=asc").filters.sort, None);
    }

    #[test]
    fn test_blank_search_is_not_serialized() {
        let mut query = BrowserQuery::default();
        query.filters.apply(FilterAction::SetSearch("   ".to_string()));

        assert_eq!(query.filters.search_term(), None);
        assert_eq!(query.to_query_string(), "page=1");
    }

    #[test]
    fn test_comma_separated_genres() {
        let query = BrowserQuery::parse("genre_id=3,5&genre_id=7");
        assert_eq!(query.filters.genres, BTreeSet::from([3, 5, 7]));
    }

    #[test]
    fn test_serialize_canonical_order() {
        let mut query = BrowserQuery::parse("utm_source=mail&page=2&kind=movie&search=one%20piece");
        query.filters.apply(FilterAction::ClickSort(SortKey::Name));

        assert_eq!(
            query.to_query_string(),
            "search=one+piece&kind=movie&sort=name&order=desc&page=2&utm_source=mail"
        );
    }

    #[test]
    fn test_cleared_filter_removes_key() {
        let mut query = BrowserQuery::parse("kind=tv&years=2001&years=2003&page=1");
        assert!(query.to_query_string().contains("kind=tv"));

        query.filters.apply(FilterAction::SelectKind(Some(Kind::Tv)));
        query.filters.apply(FilterAction::SetYears {
            start: None,
            end: None,
        });

        assert_eq!(query.to_query_string(), "page=1");
    }

    #[test]
    fn test_half_open_years_are_not_written() {
        let mut query = BrowserQuery::default();
        query.filters.years = YearRange {
            start: Some(2005),
            end: None,
        };

        assert_eq!(query.to_query_string(), "page=1");
    }

    #[test]
    fn test_round_trip_preserves_state() {
        let original = "search=bleach&genre_id=2&genre_id=9&status=ongoing&years=1999&years=2004&sort=score&order=desc&page=4&ref=home";
        let query = BrowserQuery::parse(original);
        let reparsed = BrowserQuery::parse(&query.to_query_string());

        assert_eq!(reparsed, query);
        assert_eq!(query.to_query_string(), original);
    }
}
