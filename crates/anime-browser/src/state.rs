//! Filter state and the reducer that updates it.
//!
//! `FilterState` is the single source of truth for the list's criteria. It is
//! changed only through [`FilterState::apply`], which lets the controller know
//! whether anything actually changed (and therefore whether the page must be
//! reset and the URL rewritten).

use serde::Serialize;
use shared::{Kind, Rating, SortKey, SortOrder, Status};
use std::collections::BTreeSet;

/// Inclusive air-year range
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct YearRange {
    pub start: Option<i32>,
    pub end: Option<i32>,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Both bounds, when the range is active
    ///
    /// A missing or zero bound disables the year predicate.
    pub fn bounds(&self) -> Option<(i32, i32)> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if start != 0 && end != 0 => Some((start, end)),
            _ => None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.bounds().is_some()
    }
}

/// Sort key and direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Sort {
    pub key: SortKey,
    pub order: SortOrder,
}

impl Sort {
    pub fn new(key: SortKey, order: SortOrder) -> Self {
        Self { key, order }
    }
}

/// Every criterion applied to the anime list
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterState {
    pub search: String,
    pub genres: BTreeSet<u32>,
    pub kind: Option<Kind>,
    pub status: Option<Status>,
    pub rating: Option<Rating>,
    pub years: YearRange,
    pub sort: Option<Sort>,
}

/// A single user interaction with the filter controls
#[derive(Debug, Clone, PartialEq)]
pub enum FilterAction {
    /// Commit the search text
    SetSearch(String),
    /// Add the genre if absent, remove it if present
    ToggleGenre(u32),
    /// Replace the whole genre selection
    SetGenres(BTreeSet<u32>),
    /// Select a kind; selecting the active kind clears it
    SelectKind(Option<Kind>),
    /// Select a status; selecting the active status clears it
    SelectStatus(Option<Status>),
    /// Select a rating; selecting the active rating clears it
    SelectRating(Option<Rating>),
    /// Set the year range; ignored when start is after end
    SetYears { start: Option<i32>, end: Option<i32> },
    /// Click on a sort control
    ClickSort(SortKey),
    /// Set or clear the sort directly
    SetSort(Option<Sort>),
    /// Clear every filter except the search text
    ClearAll,
}

/// Select `value`, clearing the field when it is already selected
fn toggle<T: PartialEq + Copy>(field: &mut Option<T>, value: Option<T>) {
    *field = match value {
        Some(v) if *field == Some(v) => None,
        other => other,
    };
}

impl FilterState {
    /// Apply an action, returning whether the state changed
    pub fn apply(&mut self, action: FilterAction) -> bool {
        let before = self.clone();

        match action {
            FilterAction::SetSearch(text) => self.search = text,
            FilterAction::ToggleGenre(genre_id) => {
                if !self.genres.remove(&genre_id) {
                    self.genres.insert(genre_id);
                }
            }
            FilterAction::SetGenres(genres) => self.genres = genres,
            FilterAction::SelectKind(kind) => toggle(&mut self.kind, kind),
            FilterAction::SelectStatus(status) => toggle(&mut self.status, status),
            FilterAction::SelectRating(rating) => toggle(&mut self.rating, rating),
            FilterAction::SetYears { start, end } => {
                if matches!((start, end), (Some(s), Some(e)) if s > e) {
                    return false;
                }
                self.years = YearRange { start, end };
            }
            FilterAction::ClickSort(key) => self.sort = next_sort(self.sort, key),
            FilterAction::SetSort(sort) => self.sort = sort,
            FilterAction::ClearAll => {
                *self = FilterState {
                    search: std::mem::take(&mut self.search),
                    ..FilterState::default()
                };
            }
        }

        *self != before
    }

    /// Whether any criterion other than search is set
    pub fn has_filters(&self) -> bool {
        !self.genres.is_empty()
            || self.kind.is_some()
            || self.status.is_some()
            || self.rating.is_some()
            || self.years != YearRange::default()
            || self.sort.is_some()
    }

    /// Trimmed search text, or None when blank
    pub fn search_term(&self) -> Option<&str> {
        let term = self.search.trim();
        (!term.is_empty()).then_some(term)
    }
}

/// Sort cycle: new key starts descending, then ascending, then off
fn next_sort(current: Option<Sort>, key: SortKey) -> Option<Sort> {
    match current {
        Some(sort) if sort.key == key => match sort.order {
            SortOrder::Desc => Some(Sort::new(key, SortOrder::Asc)),
            SortOrder::Asc => None,
        },
        _ => Some(Sort::new(key, SortOrder::Desc)),
    }
}
