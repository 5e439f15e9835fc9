//! Line-driven interactive browsing session.
//!
//! Each input line is one interaction with the filter controls. Search text
//! is debounced: typing updates the search box immediately, and the filters
//! and location follow once input pauses.

use crate::controller::{Browser, ListView};
use crate::debounce::Debouncer;
use crate::pagination::PageJump;
use crate::source::DataSource;
use crate::state::{FilterAction, Sort};
use crate::view;
use anyhow::{bail, Context, Result};
use catalog_api::CatalogApi;
use shared::{Kind, Rating, SortKey, Status};
use std::collections::BTreeSet;
use std::str::FromStr;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

pub const HELP: &str = "\
Commands:
  search <text>        type into the search box (applied after a pause)
  genre <id>           toggle a genre
  genres <id,..|none>  replace the genre selection
  kind <value|all>     tv, movie, ova, ona, special, tv_special, music
  status <value|all>   announced, ongoing, released
  rating <value|all>   g, pg, pg_13, r, r_plus, rx, none
  years <from> <to>    air year range; `years clear` removes it
  sort <key>           date, score, name; repeat to flip, then clear
  sort off             remove the sort
  clear                clear every filter except search
  page <n> | next | prev
  jump <digits>        type a page number into the jump box and go
  show <id>            anime details
  genre-list           list known genres
  url                  print the current location
  help | quit";

/// One parsed console line
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Search(String),
    Filter(FilterAction),
    Page(u32),
    Next,
    Prev,
    Jump(String),
    Show(u64),
    GenreList,
    Url,
    Help,
    Quit,
}

/// Parse `all` as no selection, anything else as a value
fn choice<T: FromStr>(name: &str, value: &str) -> Result<Option<T>> {
    if value.eq_ignore_ascii_case("all") {
        return Ok(None);
    }
    match value.parse() {
        Ok(parsed) => Ok(Some(parsed)),
        Err(_) => bail!("unknown {}: {}", name, value),
    }
}

fn number<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid {}: {}", name, value))
}

impl Command {
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "search" | "/" => Command::Search(rest.to_string()),
            "genre" => Command::Filter(FilterAction::ToggleGenre(number("genre id", rest)?)),
            "genres" => {
                let genres = if rest.eq_ignore_ascii_case("none") || rest.is_empty() {
                    BTreeSet::new()
                } else {
                    rest.split(',')
                        .map(|id| number("genre id", id))
                        .collect::<Result<BTreeSet<u32>>>()?
                };
                Command::Filter(FilterAction::SetGenres(genres))
            }
            "kind" => Command::Filter(FilterAction::SelectKind(choice::<Kind>("kind", rest)?)),
            "status" => Command::Filter(FilterAction::SelectStatus(choice::<Status>(
                "status", rest,
            )?)),
            "rating" => Command::Filter(FilterAction::SelectRating(choice::<Rating>(
                "rating", rest,
            )?)),
            "years" => {
                if rest.eq_ignore_ascii_case("clear") {
                    Command::Filter(FilterAction::SetYears {
                        start: None,
                        end: None,
                    })
                } else {
                    let Some((start, end)) = rest.split_once(char::is_whitespace) else {
                        bail!("usage: years <from> <to>");
                    };
                    Command::Filter(FilterAction::SetYears {
                        start: Some(number("year", start)?),
                        end: Some(number("year", end)?),
                    })
                }
            }
            "sort" => {
                if rest.eq_ignore_ascii_case("off") {
                    Command::Filter(FilterAction::SetSort(None::<Sort>))
                } else {
                    let key: SortKey = rest
                        .parse()
                        .map_err(|_| anyhow::anyhow!("unknown sort key: {}", rest))?;
                    Command::Filter(FilterAction::ClickSort(key))
                }
            }
            "clear" => Command::Filter(FilterAction::ClearAll),
            "page" => Command::Page(number("page", rest)?),
            "next" => Command::Next,
            "prev" => Command::Prev,
            "jump" => Command::Jump(rest.to_string()),
            "show" => Command::Show(number("anime id", rest)?),
            "genre-list" => Command::GenreList,
            "url" => Command::Url,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            "" => bail!("empty command"),
            other => bail!("unknown command: {} (try `help`)", other),
        };

        Ok(command)
    }
}

/// Print the location, active filters and current page
async fn render<S: DataSource>(browser: &mut Browser<S>) -> ListView {
    let view = browser.load().await;
    println!("{}", browser.location());
    println!("{}", view::filters(browser.filters(), browser.genres()));
    print!("{}", view::list(&view, browser.genres()));
    view
}

fn total_pages(view: &ListView) -> u32 {
    match view {
        ListView::Items(page) => page.pager.total_pages(),
        _ => 1,
    }
}

/// Run the interactive session until `quit` or end of input
pub async fn run<S: DataSource, A: CatalogApi>(
    browser: &mut Browser<S>,
    api: &A,
    search_delay: Duration,
) -> Result<()> {
    let (mut debouncer, mut settled) = Debouncer::new(search_delay);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let mut view = render(browser).await;
    println!("Type `help` for commands.");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read input")? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }

                let command = match Command::parse(&line) {
                    Ok(command) => command,
                    Err(e) => {
                        println!("{}", e);
                        continue;
                    }
                };
                debug!(?command, "Console command");

                let changed = match command {
                    Command::Search(text) => {
                        browser.type_search(&text);
                        debouncer.submit(());
                        false
                    }
                    Command::Filter(action) => browser.dispatch(action),
                    Command::Page(page) => browser.go_to_page(page),
                    Command::Next => match &view {
                        ListView::Items(page) => {
                            page.pager.next().is_some_and(|n| browser.go_to_page(n))
                        }
                        _ => false,
                    },
                    Command::Prev => match &view {
                        ListView::Items(page) => {
                            page.pager.prev().is_some_and(|n| browser.go_to_page(n))
                        }
                        _ => false,
                    },
                    Command::Jump(text) => {
                        let mut jump = PageJump::new(total_pages(&view));
                        if !jump.set_input(&text) {
                            println!("Page must be between 1 and {}", total_pages(&view));
                            false
                        } else {
                            match jump.commit() {
                                Some(page) => browser.go_to_page(page),
                                None => false,
                            }
                        }
                    }
                    Command::Show(anime_id) => {
                        match api.fetch_anime(anime_id).await {
                            Ok(anime) => print!("{}", view::detail(&anime, browser.genres())),
                            Err(e) => {
                                warn!(anime_id, error = %e, "Failed to load anime details");
                                println!("{}", crate::controller::LOAD_ERROR_MESSAGE);
                            }
                        }
                        false
                    }
                    Command::GenreList => {
                        print!("{}", view::genre_table(browser.genres()));
                        false
                    }
                    Command::Url => {
                        println!("{}", browser.location());
                        false
                    }
                    Command::Help => {
                        println!("{}", HELP);
                        false
                    }
                    Command::Quit => break,
                };

                if changed {
                    view = render(browser).await;
                }
            }
            Some(()) = settled.recv() => {
                if browser.commit_search() {
                    view = render(browser).await;
                }
            }
        }
    }

    debouncer.cancel();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filters() -> Result<()> {
        assert_eq!(
            Command::parse("kind TV")?,
            Command::Filter(FilterAction::SelectKind(Some(Kind::Tv)))
        );
        assert_eq!(
            Command::parse("status all")?,
            Command::Filter(FilterAction::SelectStatus(None))
        );
        assert_eq!(
            Command::parse("genre 7")?,
            Command::Filter(FilterAction::ToggleGenre(7))
        );
        assert_eq!(
            Command::parse("genres 1, 4")?,
            Command::Filter(FilterAction::SetGenres(BTreeSet::from([1, 4])))
        );
        assert_eq!(
            Command::parse("years 2001 2005")?,
            Command::Filter(FilterAction::SetYears {
                start: Some(2001),
                end: Some(2005)
            })
        );
        assert_eq!(
            Command::parse("sort score")?,
            Command::Filter(FilterAction::ClickSort(SortKey::Score))
        );
        assert_eq!(
            Command::parse("sort off")?,
            Command::Filter(FilterAction::SetSort(None))
        );
        Ok(())
    }

    #[test]
    fn test_parse_navigation() -> Result<()> {
        assert_eq!(
            Command::parse("  search  one piece ")?,
            Command::Search("one piece".to_string())
        );
        assert_eq!(Command::parse("search")?, Command::Search(String::new()));
        assert_eq!(Command::parse("page 3")?, Command::Page(3));
        assert_eq!(Command::parse("jump 1x2")?, Command::Jump("1x2".to_string()));
        assert_eq!(Command::parse("show 5114")?, Command::Show(5114));
        assert_eq!(Command::parse("QUIT")?, Command::Quit);
        Ok(())
    }

    #[test]
    fn test_parse_errors() {
        assert!(Command::parse("kind anime").is_err());
        assert!(Command::parse("years 2001").is_err());
        assert!(Command::parse("page two").is_err());
        assert!(Command::parse("dance").is_err());
        assert!(Command::parse("sort popularity").is_err());
    }
}
