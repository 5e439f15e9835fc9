//! Plain-text rendering of the browser.

use crate::controller::ListView;
use crate::pagination::{PageItem, Pager};
use crate::state::FilterState;
use once_cell::sync::Lazy;
use regex::Regex;
use shared::{season_label, Anime, GenreCatalog, ListEntry, ListStats};
use std::fmt::Write;

/// Placeholder shown when no anime match the filters
pub const NOTHING_FOUND: &str = "Nothing found";

static MARKUP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[(character|anime)=\d+\]([^\[]+)\[/(character|anime)\]")
        .expect("markup pattern is valid")
});

/// Replace `[character=ID]Name[/character]` and `[anime=ID]Name[/anime]` tags
/// with their plain names
pub fn render_markup(description: &str) -> String {
    MARKUP.replace_all(description, "$2").into_owned()
}

fn genre_labels(anime: &Anime, genres: &GenreCatalog) -> String {
    anime
        .genre_ids
        .iter()
        .map(|id| genres.label(*id))
        .collect::<Vec<_>>()
        .join(", ")
}

fn episodes(anime: &Anime) -> Option<String> {
    match (anime.episodes_aired, anime.episodes) {
        (Some(aired), Some(total)) if aired > 0 && aired < total => {
            Some(format!("{}/{} ep", aired, total))
        }
        (_, Some(total)) if total > 0 => Some(format!("{} ep", total)),
        (Some(aired), None) if aired > 0 => Some(format!("{}/? ep", aired)),
        _ => None,
    }
}

/// Short facts line: kind, year, episodes, score, status
fn facts(anime: &Anime) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(kind) = anime.kind {
        parts.push(kind.label().to_string());
    }
    if let Some(year) = anime.air_year() {
        parts.push(year.to_string());
    }
    if let Some(episodes) = episodes(anime) {
        parts.push(episodes);
    }
    if let Some(score) = anime.score {
        parts.push(format!("★ {:.2}", score));
    }
    if let Some(status) = anime.status {
        parts.push(status.label().to_string());
    }

    parts.join(" · ")
}

/// One list card
pub fn card(anime: &Anime, genres: &GenreCatalog) -> String {
    let mut out = format!("#{} {}\n", anime.anime_id, anime.display_title());

    let facts = facts(anime);
    if !facts.is_empty() {
        let _ = writeln!(out, "    {}", facts);
    }
    if !anime.genre_ids.is_empty() {
        let _ = writeln!(out, "    {}", genre_labels(anime, genres));
    }
    let _ = writeln!(out, "    {}", anime.detail_path());

    out
}

/// Navigation bar, e.g. `‹ 1 … 4 5 [6] 7 8 … 20 ›`
pub fn pager(pager: &Pager) -> String {
    let mut parts = Vec::new();

    parts.push(if pager.prev().is_some() { "‹" } else { " " }.to_string());
    for item in pager.items() {
        parts.push(match item {
            PageItem::Page {
                number,
                current: true,
            } => format!("[{}]", number),
            PageItem::Page { number, .. } => number.to_string(),
            PageItem::Ellipsis { .. } => "…".to_string(),
        });
    }
    parts.push(if pager.next().is_some() { "›" } else { " " }.to_string());

    parts.join(" ")
}

/// List area: cards and pager, the placeholder, or the error line
pub fn list(view: &ListView, genres: &GenreCatalog) -> String {
    match view {
        ListView::Items(page) => {
            let mut out = String::new();
            for anime in &page.items {
                out.push_str(&card(anime, genres));
            }
            let _ = writeln!(
                out,
                "\n{}    ({} anime, page {}/{})",
                pager(&page.pager),
                page.total_items,
                page.pager.page(),
                page.pager.total_pages()
            );
            out
        }
        ListView::Empty => format!("{}\n", NOTHING_FOUND),
        ListView::Error(message) => format!("{}\n", message),
    }
}

/// Active filters in one line
pub fn filters(filters: &FilterState, genres: &GenreCatalog) -> String {
    let mut parts = Vec::new();

    if let Some(term) = filters.search_term() {
        parts.push(format!("search: \"{}\"", term));
    }
    if !filters.genres.is_empty() {
        let labels: Vec<&str> = filters.genres.iter().map(|id| genres.label(*id)).collect();
        parts.push(format!("genres: {}", labels.join(" + ")));
    }
    if let Some(kind) = filters.kind {
        parts.push(format!("kind: {}", kind.label()));
    }
    if let Some(status) = filters.status {
        parts.push(format!("status: {}", status.label()));
    }
    if let Some(rating) = filters.rating {
        parts.push(format!("rating: {}", rating.label()));
    }
    if let Some((start, end)) = filters.years.bounds() {
        parts.push(format!("years: {}–{}", start, end));
    }
    if let Some(sort) = filters.sort {
        parts.push(format!("sort: {} {}", sort.key, sort.order));
    }

    if parts.is_empty() {
        "no filters".to_string()
    } else {
        parts.join(" | ")
    }
}

/// Full detail view of one anime
pub fn detail(anime: &Anime, genres: &GenreCatalog) -> String {
    let mut out = format!("{}\n", anime.display_title());

    if anime.name != anime.display_title() {
        let _ = writeln!(out, "{}", anime.name);
    }
    if let Some(english) = &anime.english {
        let _ = writeln!(out, "{}", english);
    }
    out.push('\n');

    let mut field = |label: &str, value: String| {
        let _ = writeln!(out, "{:<12}{}", label, value);
    };

    if let Some(kind) = anime.kind {
        field("Type:", kind.label().to_string());
    }
    if let Some(episodes) = episodes(anime) {
        field("Episodes:", episodes);
    }
    if let Some(duration) = anime.duration {
        field("Duration:", format!("{} min", duration));
    }
    if let Some(status) = anime.status {
        field("Status:", status.label().to_string());
    }
    if let Some(aired_on) = anime.aired_on {
        field("Aired:", aired_on.format("%Y-%m-%d").to_string());
    }
    if let Some(released_on) = anime.released_on {
        field("Released:", released_on.format("%Y-%m-%d").to_string());
    }
    if let Some(next) = anime.next_episode_at {
        field("Next ep:", next.format("%Y-%m-%d %H:%M UTC").to_string());
    }
    if let Some(season) = &anime.season {
        field("Season:", season_label(season));
    }
    if let Some(rating) = anime.rating {
        field("Rating:", rating.label().to_string());
    }
    if let Some(score) = anime.score {
        field("Score:", format!("{:.2}", score));
    }
    if !anime.genre_ids.is_empty() {
        field("Genres:", genre_labels(anime, genres));
    }
    if let Some(franchise) = &anime.franchise {
        field("Franchise:", franchise.clone());
    }
    field("Link:", anime.detail_path());

    if let Some(description) = &anime.description {
        let _ = write!(out, "\n{}\n", render_markup(description));
    }

    out
}

/// Genre table sorted by label
pub fn genre_table(genres: &GenreCatalog) -> String {
    let mut out = String::new();
    for genre in genres.sorted() {
        let _ = writeln!(out, "{:>4}  {}", genre.genre_id, genre.label());
    }
    out
}

/// Personal list entries
pub fn list_entries(entries: &[ListEntry]) -> String {
    if entries.is_empty() {
        return "No entries\n".to_string();
    }

    let mut out = String::new();
    for entry in entries {
        let _ = writeln!(
            out,
            "{:<10} #{:<6} {} ({} ep watched, updated {})",
            entry.status.to_string(),
            entry.anime_id,
            entry.title,
            entry.episodes_watched,
            entry.updated_at.format("%Y-%m-%d")
        );
    }
    out
}

pub fn list_stats(stats: &ListStats) -> String {
    format!(
        "watching: {}\nplanned: {}\ncompleted: {}\ndropped: {}\non hold: {}\ntotal: {}\n",
        stats.watching,
        stats.planned,
        stats.completed,
        stats.dropped,
        stats.on_hold,
        stats.total()
    )
}
