//! Query parameters of the filtered listing endpoint.

use shared::{Kind, Rating, SortKey, SortOrder, Status};

/// Parameters for `/anime/get-anime-list-filtered`
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub page: u32,
    pub limit: u32,
    pub sort: Option<(SortKey, SortOrder)>,
    pub status: Option<Status>,
    pub rating: Option<Rating>,
    pub kind: Option<Kind>,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub genre_ids: Vec<u32>,
}

impl ListQuery {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit,
            sort: None,
            status: None,
            rating: None,
            kind: None,
            start_year: None,
            end_year: None,
            genre_ids: Vec::new(),
        }
    }

    /// Query string pairs in the order the server expects
    ///
    /// Unset filters are omitted. The year range is sent only when both
    /// bounds are present. Genres become repeated `genre_id` pairs.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];

        if let Some((key, order)) = self.sort {
            pairs.push(("sort_order", order.as_str().to_string()));
            let flag = match key {
                SortKey::Score => "filter_by_score",
                SortKey::Date => "filter_by_date",
                SortKey::Name => "filter_by_name",
            };
            pairs.push((flag, "true".to_string()));
        }

        if let Some(status) = self.status {
            pairs.push(("status", status.filter_param().to_string()));
        }
        if let Some(rating) = self.rating {
            pairs.push(("rating", rating.as_str().to_string()));
        }
        if let Some(kind) = self.kind {
            pairs.push(("kind", kind.as_str().to_string()));
        }

        if let (Some(start), Some(end)) = (self.start_year, self.end_year) {
            pairs.push(("start_year", start.to_string()));
            pairs.push(("end_year", end.to_string()));
        }

        for genre_id in &self.genre_ids {
            pairs.push(("genre_id", genre_id.to_string()));
        }

        pairs
    }
}
