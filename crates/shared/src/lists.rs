//! Personal anime lists (watching, planned, completed, dropped, on hold).
//!
//! Each anime appears in at most one list; moving it to another list replaces
//! the previous status.

use crate::models::*;
use crate::Database;
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use std::collections::HashMap;
use tracing::{debug, info};

/// Store for the user's lists
pub struct UserLists {
    db: Database,
}

impl UserLists {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Put an anime into a list, replacing any previous status
    ///
    /// The watched episode counter is kept when the anime was already listed.
    pub fn set_status(&self, anime_id: u64, title: &str, status: ListStatus) -> Result<ListEntry> {
        let now = Utc::now();

        self.db
            .conn()
            .execute(
                "INSERT INTO list_entries (anime_id, title, status, episodes_watched, updated_at)
                 VALUES (?1, ?2, ?3, 0, ?4)
                 ON CONFLICT(anime_id) DO UPDATE SET
                     title = excluded.title,
                     status = excluded.status,
                     updated_at = excluded.updated_at",
                params![anime_id as i64, title, status.to_string(), now],
            )
            .context("Failed to save list entry")?;

        info!(anime_id, status = %status, "Updated list entry");

        self.get(anime_id)?
            .with_context(|| format!("List entry {} missing after save", anime_id))
    }

    /// Record watch progress for a listed anime
    ///
    /// Returns false when the anime is not in any list.
    pub fn set_progress(&self, anime_id: u64, episodes_watched: u32) -> Result<bool> {
        let updated = self.db.conn().execute(
            "UPDATE list_entries SET episodes_watched = ?1, updated_at = ?2 WHERE anime_id = ?3",
            params![episodes_watched, Utc::now(), anime_id as i64],
        )?;

        debug!(anime_id, episodes_watched, updated, "Updated watch progress");

        Ok(updated > 0)
    }

    /// Remove an anime from the lists
    pub fn remove(&self, anime_id: u64) -> Result<bool> {
        let removed = self.db.conn().execute(
            "DELETE FROM list_entries WHERE anime_id = ?1",
            params![anime_id as i64],
        )?;

        if removed > 0 {
            info!(anime_id, "Removed list entry");
        }

        Ok(removed > 0)
    }

    pub fn get(&self, anime_id: u64) -> Result<Option<ListEntry>> {
        let entry = self
            .db
            .conn()
            .query_row(
                "SELECT anime_id, title, status, episodes_watched, updated_at
                 FROM list_entries WHERE anime_id = ?1",
                params![anime_id as i64],
                row_to_entry,
            )
            .optional()
            .context("Failed to query list entry")?;

        Ok(entry)
    }

    /// Entries in one list, most recently updated first
    pub fn by_status(&self, status: ListStatus) -> Result<Vec<ListEntry>> {
        let conn = self.db.conn();

        let mut stmt = conn.prepare(
            "SELECT anime_id, title, status, episodes_watched, updated_at
             FROM list_entries WHERE status = ?1
             ORDER BY updated_at DESC, anime_id ASC",
        )?;

        let entries = stmt
            .query_map(params![status.to_string()], row_to_entry)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// Every entry, grouped by list
    pub fn all(&self) -> Result<Vec<ListEntry>> {
        let conn = self.db.conn();

        let mut stmt = conn.prepare(
            "SELECT anime_id, title, status, episodes_watched, updated_at
             FROM list_entries ORDER BY status ASC, updated_at DESC",
        )?;

        let entries = stmt
            .query_map([], row_to_entry)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// Get list statistics
    pub fn get_stats(&self) -> Result<ListStats> {
        let conn = self.db.conn();

        let mut stmt = conn.prepare("SELECT status, COUNT(*) FROM list_entries GROUP BY status")?;
        let mut counts = HashMap::new();

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        for row in rows {
            let (status, count) = row?;
            counts.insert(status, count as usize);
        }

        let count = |status: ListStatus| counts.get(&status.to_string()).copied().unwrap_or(0);

        Ok(ListStats {
            watching: count(ListStatus::Watching),
            planned: count(ListStatus::Planned),
            completed: count(ListStatus::Completed),
            dropped: count(ListStatus::Dropped),
            on_hold: count(ListStatus::OnHold),
        })
    }
}

/// Helper: Convert a database row to a ListEntry
fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<ListEntry> {
    let status: String = row.get(2)?;
    let status = status.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(ListEntry {
        anime_id: row.get::<_, i64>(0)? as u64,
        title: row.get(1)?,
        status,
        episodes_watched: row.get::<_, i64>(3)? as u32,
        updated_at: row.get(4)?,
    })
}

/// Number of entries per list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListStats {
    pub watching: usize,
    pub planned: usize,
    pub completed: usize,
    pub dropped: usize,
    pub on_hold: usize,
}

impl ListStats {
    pub fn total(&self) -> usize {
        self.watching + self.planned + self.completed + self.dropped + self.on_hold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_lists() -> Result<UserLists> {
        Ok(UserLists::new(Database::open_in_memory()?))
    }

    #[test]
    fn test_set_and_get_status() -> Result<()> {
        let lists = open_lists()?;

        let entry = lists.set_status(5114, "Fullmetal Alchemist", ListStatus::Watching)?;
        assert_eq!(entry.status, ListStatus::Watching);
        assert_eq!(entry.episodes_watched, 0);

        let fetched = lists.get(5114)?;
        assert_eq!(fetched.map(|e| e.title), Some("Fullmetal Alchemist".to_string()));
        assert!(lists.get(1)?.is_none());

        Ok(())
    }

    #[test]
    fn test_moving_between_lists_keeps_progress() -> Result<()> {
        let lists = open_lists()?;

        lists.set_status(1, "Naruto", ListStatus::Watching)?;
        assert!(lists.set_progress(1, 12)?);

        let moved = lists.set_status(1, "Naruto", ListStatus::Dropped)?;
        assert_eq!(moved.status, ListStatus::Dropped);
        assert_eq!(moved.episodes_watched, 12);

        assert!(lists.by_status(ListStatus::Watching)?.is_empty());
        assert_eq!(lists.by_status(ListStatus::Dropped)?.len(), 1);

        Ok(())
    }

    #[test]
    fn test_progress_requires_entry() -> Result<()> {
        let lists = open_lists()?;

        assert!(!lists.set_progress(42, 3)?);

        Ok(())
    }

    #[test]
    fn test_remove() -> Result<()> {
        let lists = open_lists()?;

        lists.set_status(7, "Mushishi", ListStatus::Completed)?;
        assert!(lists.remove(7)?);
        assert!(!lists.remove(7)?);
        assert!(lists.get(7)?.is_none());

        Ok(())
    }

    #[test]
    fn test_stats() -> Result<()> {
        let lists = open_lists()?;

        lists.set_status(1, "A", ListStatus::Watching)?;
        lists.set_status(2, "B", ListStatus::Watching)?;
        lists.set_status(3, "C", ListStatus::Completed)?;
        lists.set_status(4, "D", ListStatus::OnHold)?;

        let stats = lists.get_stats()?;
        assert_eq!(stats.watching, 2);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.on_hold, 1);
        assert_eq!(stats.dropped, 0);
        assert_eq!(stats.total(), 4);
        assert_eq!(lists.all()?.len(), 4);

        Ok(())
    }
}
