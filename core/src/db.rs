use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use uuid::Uuid;

use crate::models::{Day, Entry, EntryType};
use crate::store::{LedgerStore, SettingsStore};

// Keeps `IN (...)` lists well under SQLite's bound-parameter limit.
const MAX_IN_PARAMS: usize = 500;

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        self.conn.pragma_update(None, "foreign_keys", true)?;

        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS days (
                    id TEXT PRIMARY KEY,
                    date TEXT UNIQUE NOT NULL,
                    weight REAL,
                    notes TEXT
                );

                CREATE TABLE IF NOT EXISTS entries (
                    id TEXT PRIMARY KEY,
                    day_id TEXT NOT NULL REFERENCES days(id) ON DELETE CASCADE,
                    type TEXT NOT NULL CHECK (type IN ('food', 'exercise')),
                    name TEXT NOT NULL,
                    calories REAL NOT NULL,
                    created_at TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_entries_day ON entries(day_id, created_at);

                CREATE TABLE IF NOT EXISTS settings (
                    key TEXT PRIMARY KEY NOT NULL,
                    value TEXT NOT NULL
                );

                PRAGMA user_version = 1;",
            )?;
        }

        Ok(())
    }

    /// Run `f` as one unit of work: everything it writes commits together or
    /// not at all.
    pub fn transaction<T>(&self, f: impl FnOnce(&Self) -> Result<T>) -> Result<T> {
        let tx = self.conn.unchecked_transaction()?;
        let value = f(self)?;
        tx.commit()?;
        Ok(value)
    }

    #[cfg(test)]
    pub(crate) fn execute_batch(&self, sql: &str) -> Result<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    // --- Row mapping helpers ---

    // Expects columns: 0: id, 1: date, 2: weight, 3: notes
    fn day_from_row(row: &rusqlite::Row) -> rusqlite::Result<Day> {
        Ok(Day {
            id: row.get(0)?,
            date: row.get(1)?,
            weight: row.get(2)?,
            notes: row.get(3)?,
        })
    }

    // Expects columns: 0: id, 1: day_id, 2: type, 3: name, 4: calories, 5: created_at
    fn entry_from_row(row: &rusqlite::Row) -> rusqlite::Result<Entry> {
        let raw_type: String = row.get(2)?;
        let entry_type = raw_type.parse::<EntryType>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
        })?;
        Ok(Entry {
            id: row.get(0)?,
            day_id: row.get(1)?,
            entry_type,
            name: row.get(3)?,
            calories: row.get(4)?,
            created_at: row.get(5)?,
        })
    }

    fn get_day(&self, id: &str) -> Result<Day> {
        self.conn
            .query_row(
                "SELECT id, date, weight, notes FROM days WHERE id = ?1",
                params![id],
                Self::day_from_row,
            )
            .context("Day not found")
    }
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(",")
}

impl LedgerStore for Database {
    // --- Days ---

    fn find_day_by_date(&self, date: &str) -> Result<Option<Day>> {
        let day = self
            .conn
            .query_row(
                "SELECT id, date, weight, notes FROM days WHERE date = ?1",
                params![date],
                Self::day_from_row,
            )
            .optional()?;
        Ok(day)
    }

    fn create_day(&self, date: &str) -> Result<Day> {
        let id = Uuid::new_v4().to_string();
        self.conn
            .execute(
                "INSERT INTO days (id, date) VALUES (?1, ?2)",
                params![id, date],
            )
            .with_context(|| format!("Failed to create day {date}"))?;
        tracing::debug!(day_id = %id, date, "Created day");
        self.get_day(&id)
    }

    fn update_day_weight(&self, day_id: &str, weight: Option<f64>) -> Result<()> {
        let rows = self.conn.execute(
            "UPDATE days SET weight = ?1 WHERE id = ?2",
            params![weight, day_id],
        )?;
        if rows == 0 {
            anyhow::bail!("Day not found");
        }
        Ok(())
    }

    fn update_day_notes(&self, day_id: &str, notes: Option<&str>) -> Result<()> {
        let rows = self.conn.execute(
            "UPDATE days SET notes = ?1 WHERE id = ?2",
            params![notes, day_id],
        )?;
        if rows == 0 {
            anyhow::bail!("Day not found");
        }
        Ok(())
    }

    fn update_day_date(&self, day_id: &str, date: &str) -> Result<()> {
        let rows = self
            .conn
            .execute(
                "UPDATE days SET date = ?1 WHERE id = ?2",
                params![date, day_id],
            )
            .with_context(|| format!("Failed to move day {day_id} to {date}"))?;
        if rows == 0 {
            anyhow::bail!("Day not found");
        }
        Ok(())
    }

    fn delete_day(&self, day_id: &str) -> Result<()> {
        let rows = self
            .conn
            .execute("DELETE FROM days WHERE id = ?1", params![day_id])?;
        if rows == 0 {
            anyhow::bail!("Day not found");
        }
        Ok(())
    }

    fn find_days_by_date_set(&self, dates: &[String]) -> Result<Vec<Day>> {
        let mut days = Vec::new();
        for chunk in dates.chunks(MAX_IN_PARAMS) {
            let sql = format!(
                "SELECT id, date, weight, notes FROM days WHERE date IN ({})",
                placeholders(chunk.len())
            );
            let mut stmt = self.conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params_from_iter(chunk.iter()), Self::day_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            days.extend(rows);
        }
        Ok(days)
    }

    fn list_recent_days(&self, limit: usize) -> Result<Vec<Day>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = self.conn.prepare(
            "SELECT id, date, weight, notes FROM days ORDER BY date DESC LIMIT ?1",
        )?;
        let days = stmt
            .query_map(params![limit], Self::day_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(days)
    }

    fn list_days(&self) -> Result<Vec<Day>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, date, weight, notes FROM days ORDER BY date DESC")?;
        let days = stmt
            .query_map([], Self::day_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(days)
    }

    // --- Entries ---

    fn list_entries_for_day(&self, day_id: &str) -> Result<Vec<Entry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, day_id, type, name, calories, created_at
             FROM entries WHERE day_id = ?1
             ORDER BY created_at ASC, rowid ASC",
        )?;
        let entries = stmt
            .query_map(params![day_id], Self::entry_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    fn find_entries_by_day_set(&self, day_ids: &[String]) -> Result<Vec<Entry>> {
        let mut entries = Vec::new();
        for chunk in day_ids.chunks(MAX_IN_PARAMS) {
            let sql = format!(
                "SELECT id, day_id, type, name, calories, created_at
                 FROM entries WHERE day_id IN ({})
                 ORDER BY created_at ASC, rowid ASC",
                placeholders(chunk.len())
            );
            let mut stmt = self.conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params_from_iter(chunk.iter()), Self::entry_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            entries.extend(rows);
        }
        Ok(entries)
    }

    fn get_entry(&self, id: &str) -> Result<Option<Entry>> {
        let entry = self
            .conn
            .query_row(
                "SELECT id, day_id, type, name, calories, created_at FROM entries WHERE id = ?1",
                params![id],
                Self::entry_from_row,
            )
            .optional()?;
        Ok(entry)
    }

    fn insert_entry(
        &self,
        day_id: &str,
        entry_type: EntryType,
        name: &str,
        calories: f64,
        created_at: &str,
    ) -> Result<Entry> {
        let id = Uuid::new_v4().to_string();
        self.conn.execute(
            "INSERT INTO entries (id, day_id, type, name, calories, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![id, day_id, entry_type.as_str(), name, calories, created_at],
        )?;
        self.get_entry(&id)?
            .context("Entry not found after insert")
    }

    fn update_entry(
        &self,
        id: &str,
        entry_type: EntryType,
        name: &str,
        calories: f64,
    ) -> Result<bool> {
        let rows = self.conn.execute(
            "UPDATE entries SET type = ?1, name = ?2, calories = ?3 WHERE id = ?4",
            params![entry_type.as_str(), name, calories, id],
        )?;
        Ok(rows > 0)
    }

    fn delete_entry(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM entries WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn reassign_entries(&self, from_day_id: &str, to_day_id: &str) -> Result<usize> {
        let moved = self.conn.execute(
            "UPDATE entries SET day_id = ?1 WHERE day_id = ?2",
            params![to_day_id, from_day_id],
        )?;
        tracing::debug!(from = from_day_id, to = to_day_id, moved, "Reassigned entries");
        Ok(moved)
    }
}

impl SettingsStore for Database {
    fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    fn delete_setting(&self, key: &str) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM settings WHERE key = ?1", params![key])?;
        Ok(rows > 0)
    }
}
