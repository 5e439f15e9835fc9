//! Page slicing and the page navigation model.

use serde::Serialize;
use std::ops::Range;

/// Pages shown on each side of the current page
const WINDOW: u32 = 2;

/// Current page within a list of known length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pager {
    page: u32,
    total_pages: u32,
    page_size: u32,
}

/// One control in the page navigation bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageItem {
    Page { number: u32, current: bool },
    /// Hidden pages strictly between `after` and `before`
    Ellipsis { after: u32, before: u32 },
}

impl Pager {
    /// Number of pages needed for `total_items`, never less than one
    pub fn total_pages_for(total_items: usize, page_size: u32) -> u32 {
        let page_size = page_size.max(1) as usize;
        let pages = total_items.div_ceil(page_size).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// Pager for `total_items`, with `requested_page` clamped into range
    pub fn new(total_items: usize, page_size: u32, requested_page: u32) -> Self {
        let total_pages = Self::total_pages_for(total_items, page_size);
        Self {
            page: requested_page.clamp(1, total_pages),
            total_pages,
            page_size: page_size.max(1),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Index range of the current page within a list of `len` items
    pub fn slice_range(&self, len: usize) -> Range<usize> {
        let size = self.page_size as usize;
        let start = ((self.page - 1) as usize).saturating_mul(size).min(len);
        let end = start.saturating_add(size).min(len);
        start..end
    }

    /// Items of the current page
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.slice_range(items.len())]
    }

    pub fn prev(&self) -> Option<u32> {
        (self.page > 1).then(|| self.page - 1)
    }

    pub fn next(&self) -> Option<u32> {
        (self.page < self.total_pages).then(|| self.page + 1)
    }

    /// Numbered buttons and ellipses for the navigation bar
    ///
    /// Shows the first and last page and a window around the current one. A
    /// gap of a single page shows that page instead of an ellipsis.
    pub fn items(&self) -> Vec<PageItem> {
        let window_start = self.page.saturating_sub(WINDOW).max(1);
        let window_end = self.page.saturating_add(WINDOW).min(self.total_pages);

        let mut shown = vec![1];
        shown.extend(window_start..=window_end);
        shown.push(self.total_pages);
        shown.sort_unstable();
        shown.dedup();

        let mut items = Vec::with_capacity(shown.len() + 2);
        let mut previous: Option<u32> = None;

        for number in shown {
            if let Some(prev) = previous {
                match number - prev {
                    1 => {}
                    2 => items.push(self.page_item(prev + 1)),
                    _ => items.push(PageItem::Ellipsis {
                        after: prev,
                        before: number,
                    }),
                }
            }
            items.push(self.page_item(number));
            previous = Some(number);
        }

        items
    }

    fn page_item(&self, number: u32) -> PageItem {
        PageItem::Page {
            number,
            current: number == self.page,
        }
    }
}

/// Inline page number editor opened from an ellipsis
///
/// Accepts digits only. Edits that would exceed the number of digits in the
/// page count, or the page count itself, are rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageJump {
    total_pages: u32,
    input: String,
}

impl PageJump {
    pub fn new(total_pages: u32) -> Self {
        Self {
            total_pages: total_pages.max(1),
            input: String::new(),
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replace the input text, returning whether the edit was accepted
    pub fn set_input(&mut self, raw: &str) -> bool {
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();

        let max_len = self.total_pages.to_string().len();
        if digits.len() > max_len {
            return false;
        }

        if let Ok(value) = digits.parse::<u32>() {
            if value > self.total_pages {
                return false;
            }
        }

        self.input = digits;
        true
    }

    /// Enter: the chosen page, when it is a valid page number
    pub fn commit(self) -> Option<u32> {
        self.input
            .parse::<u32>()
            .ok()
            .filter(|page| (1..=self.total_pages).contains(page))
    }
}
