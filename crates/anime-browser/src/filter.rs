//! Filtering and sorting of an in-memory anime list.

use crate::state::{FilterState, Sort};
use shared::{Anime, SortKey};
use std::cmp::Ordering;

/// Anime matching every criterion in `state`, in the requested order
///
/// Without a sort the input order is kept.
pub fn apply_filters<'a>(catalog: &'a [Anime], state: &FilterState) -> Vec<&'a Anime> {
    let needle = state.search_term().map(str::to_lowercase);

    let mut matched: Vec<&Anime> = catalog
        .iter()
        .filter(|anime| matches(anime, state, needle.as_deref()))
        .collect();

    if let Some(sort) = state.sort {
        sort_anime(&mut matched, sort);
    }

    matched
}

fn matches(anime: &Anime, state: &FilterState, needle: Option<&str>) -> bool {
    if let Some(needle) = needle {
        if !matches_search(anime, needle) {
            return false;
        }
    }

    if !state.genres.is_subset(&anime.genre_ids) {
        return false;
    }

    if state.kind.is_some_and(|kind| anime.kind != Some(kind)) {
        return false;
    }
    if state.status.is_some_and(|status| anime.status != Some(status)) {
        return false;
    }
    if state.rating.is_some_and(|rating| anime.rating != Some(rating)) {
        return false;
    }

    if let Some((start, end)) = state.years.bounds() {
        match anime.air_year() {
            Some(year) if (start..=end).contains(&year) => {}
            _ => return false,
        }
    }

    true
}

/// Case-insensitive substring match on either title; `needle` is lower-case
fn matches_search(anime: &Anime, needle: &str) -> bool {
    anime.name.to_lowercase().contains(needle)
        || anime
            .russian
            .as_deref()
            .is_some_and(|title| title.to_lowercase().contains(needle))
}

/// Stable sort; missing values order below present ones when ascending
pub fn sort_anime(list: &mut [&Anime], sort: Sort) {
    match sort.key {
        SortKey::Name => {
            // Lower-case each title once instead of per comparison
            let mut keyed: Vec<(String, &Anime)> = list
                .iter()
                .map(|anime| (anime.display_title().to_lowercase(), *anime))
                .collect();
            keyed.sort_by(|a, b| sort.order.apply(a.0.cmp(&b.0)));
            for (slot, (_, anime)) in list.iter_mut().zip(keyed) {
                *slot = anime;
            }
        }
        SortKey::Score => {
            list.sort_by(|a, b| sort.order.apply(compare_scores(a.score, b.score)));
        }
        SortKey::Date => {
            list.sort_by(|a, b| sort.order.apply(a.aired_on.cmp(&b.aired_on)));
        }
    }
}

fn compare_scores(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{FilterAction, YearRange};
    use chrono::NaiveDate;
    use shared::{Kind, Rating, SortOrder, Status};
    use std::collections::BTreeSet;

    fn anime(id: u64, name: &str, score: Option<f64>, year: Option<i32>, kind: Kind) -> Anime {
        Anime {
            score,
            kind: Some(kind),
            aired_on: year.and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1)),
            ..Anime::new(id, name)
        }
    }

    fn pair() -> Vec<Anime> {
        vec![
            anime(1, "A", Some(9.0), Some(2020), Kind::Tv),
            anime(2, "B", Some(7.0), Some(2021), Kind::Movie),
        ]
    }

    fn names(list: &[&Anime]) -> Vec<String> {
        list.iter().map(|a| a.name.clone()).collect()
    }

    #[test]
    fn test_no_filters_keeps_order() {
        let catalog = pair();
        let result = apply_filters(&catalog, &FilterState::default());
        assert_eq!(names(&result), vec!["A", "B"]);
    }

    #[test]
    fn test_kind_filter() {
        let catalog = pair();
        let state = FilterState {
            kind: Some(Kind::Tv),
            ..Default::default()
        };
        assert_eq!(names(&apply_filters(&catalog, &state)), vec!["A"]);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let catalog = pair();
        let state = FilterState {
            search: "b".to_string(),
            ..Default::default()
        };
        assert_eq!(names(&apply_filters(&catalog, &state)), vec!["B"]);
    }

    #[test]
    fn test_search_matches_localized_title() {
        let catalog = vec![Anime {
            russian: Some("Стальной алхимик".to_string()),
            ..Anime::new(5114, "Hagane no Renkinjutsushi")
        }];
        let state = FilterState {
            search: "АЛХИМ".to_string(),
            ..Default::default()
        };
        assert_eq!(apply_filters(&catalog, &state).len(), 1);
    }

    #[test]
    fn test_year_range() {
        let catalog = pair();
        let state = FilterState {
            years: YearRange::new(2021, 2021),
            ..Default::default()
        };
        assert_eq!(names(&apply_filters(&catalog, &state)), vec!["B"]);
    }

    #[test]
    fn test_year_range_excludes_undated_only_when_active() {
        let mut catalog = pair();
        catalog.push(anime(3, "C", None, None, Kind::Tv));

        let active = FilterState {
            years: YearRange::new(2000, 2030),
            ..Default::default()
        };
        assert_eq!(names(&apply_filters(&catalog, &active)), vec!["A", "B"]);

        let half_open = FilterState {
            years: YearRange {
                start: Some(2021),
                end: Some(0),
            },
            ..Default::default()
        };
        assert_eq!(apply_filters(&catalog, &half_open).len(), 3);
    }

    #[test]
    fn test_genres_are_conjunctive() {
        let catalog = vec![
            Anime {
                genre_ids: BTreeSet::from([1, 2]),
                ..Anime::new(1, "Both")
            },
            Anime {
                genre_ids: BTreeSet::from([1]),
                ..Anime::new(2, "One")
            },
        ];
        let state = FilterState {
            genres: BTreeSet::from([1, 2]),
            ..Default::default()
        };
        assert_eq!(names(&apply_filters(&catalog, &state)), vec!["Both"]);
    }

    #[test]
    fn test_status_and_rating() {
        let catalog = vec![
            Anime {
                status: Some(Status::Ongoing),
                rating: Some(Rating::Pg13),
                ..Anime::new(1, "Airing")
            },
            Anime {
                status: Some(Status::Released),
                rating: Some(Rating::Pg13),
                ..Anime::new(2, "Done")
            },
            Anime::new(3, "Unknown"),
        ];

        let mut state = FilterState::default();
        state.apply(FilterAction::SelectRating(Some(Rating::Pg13)));
        assert_eq!(apply_filters(&catalog, &state).len(), 2);

        state.apply(FilterAction::SelectStatus(Some(Status::Ongoing)));
        assert_eq!(names(&apply_filters(&catalog, &state)), vec!["Airing"]);
    }

    #[test]
    fn test_score_orders_reverse() {
        let catalog = vec![
            anime(1, "Mid", Some(7.5), None, Kind::Tv),
            anime(2, "Top", Some(9.0), None, Kind::Tv),
            anime(3, "Low", Some(6.0), None, Kind::Tv),
        ];

        let mut state = FilterState::default();
        state.apply(FilterAction::ClickSort(SortKey::Score));
        let desc = names(&apply_filters(&catalog, &state));
        assert_eq!(desc, vec!["Top", "Mid", "Low"]);

        state.apply(FilterAction::ClickSort(SortKey::Score));
        let mut asc = names(&apply_filters(&catalog, &state));
        asc.reverse();
        assert_eq!(asc, desc);
    }

    #[test]
    fn test_missing_values_sort_lowest() {
        let catalog = vec![
            anime(1, "Scored", Some(5.0), Some(2001), Kind::Tv),
            anime(2, "Unscored", None, None, Kind::Tv),
        ];

        let asc = FilterState {
            sort: Some(Sort::new(SortKey::Score, SortOrder::Asc)),
            ..Default::default()
        };
        assert_eq!(names(&apply_filters(&catalog, &asc)), vec!["Unscored", "Scored"]);

        let date_desc = FilterState {
            sort: Some(Sort::new(SortKey::Date, SortOrder::Desc)),
            ..Default::default()
        };
        assert_eq!(
            names(&apply_filters(&catalog, &date_desc)),
            vec!["Scored", "Unscored"]
        );
    }

    #[test]
    fn test_name_sort_uses_display_title() {
        let catalog = vec![
            Anime {
                russian: Some("бета".to_string()),
                ..Anime::new(1, "Alpha")
            },
            Anime::new(2, "Zeta"),
            Anime::new(3, "gamma"),
        ];
        let state = FilterState {
            sort: Some(Sort::new(SortKey::Name, SortOrder::Asc)),
            ..Default::default()
        };

        assert_eq!(names(&apply_filters(&catalog, &state)), vec!["gamma", "Zeta", "Alpha"]);
    }

    #[test]
    fn test_sort_is_stable_on_ties() {
        let catalog = vec![
            anime(1, "First", Some(8.0), None, Kind::Tv),
            anime(2, "Second", Some(8.0), None, Kind::Tv),
        ];
        let state = FilterState {
            sort: Some(Sort::new(SortKey::Score, SortOrder::Desc)),
            ..Default::default()
        };
        assert_eq!(names(&apply_filters(&catalog, &state)), vec!["First", "Second"]);
    }
}
