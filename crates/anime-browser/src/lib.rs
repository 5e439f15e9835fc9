//! Filterable, paginated anime list browser.
//!
//! The browser keeps a [`FilterState`] mirrored into a URL query string,
//! loads pages through a [`DataSource`] and renders them as plain text.
//! Filtering can happen locally over a downloaded catalogue or on the
//! server, selected by configuration.

pub mod console;
pub mod controller;
pub mod debounce;
pub mod filter;
pub mod pagination;
pub mod query;
pub mod source;
pub mod state;
pub mod view;

#[cfg(test)]
mod testing;

pub use controller::{Browser, ListView};
pub use debounce::Debouncer;
pub use filter::{apply_filters, sort_anime};
pub use pagination::{PageItem, PageJump, Pager};
pub use query::BrowserQuery;
pub use source::{AnySource, ClientFiltered, DataSource, PageResult, ServerFiltered};
pub use state::{FilterAction, FilterState, Sort, YearRange};
