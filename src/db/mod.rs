use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Result as SqlResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::Result;
use crate::models::{PurchaseGoal, RevenueConversion, TrackerData};
use crate::services::daily::check_and_reset_for_new_day;
use crate::services::goals::GoalRepository;
use crate::services::validation::validate;

pub const TRACKER_DATA_KEY: &str = "activityTracker";
pub const PURCHASE_GOALS_KEY: &str = "purchaseGoals";
pub const REVENUE_CONVERSION_KEY: &str = "revenueConversion";

/// Key/value store of JSON documents backed by SQLite.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn new(db_path: impl AsRef<Path>) -> SqlResult<Self> {
        Self::with_connection(Connection::open(db_path)?)
    }

    pub fn open_in_memory() -> SqlResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> SqlResult<Self> {
        let mut db = Database { conn };
        db.run_migrations()?;
        Ok(db)
    }

    fn run_migrations(&mut self) -> SqlResult<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                name TEXT PRIMARY KEY,
                applied_at TEXT NOT NULL
            );",
        )?;

        let migrations = vec![(
            "001_create_kv_store.sql",
            include_str!(concat!(
                env!("CARGO_MANIFEST_DIR"),
                "/migrations/001_create_kv_store.sql"
            )),
        )];

        for (name, sql) in migrations {
            let applied: Option<String> = self
                .conn
                .query_row(
                    "SELECT name FROM schema_migrations WHERE name = ?1",
                    params![name],
                    |row| row.get(0),
                )
                .optional()?;

            if applied.is_none() {
                let tx = self.conn.transaction()?;
                tx.execute_batch(sql)?;
                tx.execute(
                    "INSERT INTO schema_migrations (name, applied_at) VALUES (?1, datetime('now'))",
                    params![name],
                )?;
                tx.commit()?;
                debug!("Applied migration {}", name);
            }
        }

        Ok(())
    }

    pub fn set_value(&self, key: &str, value: &str) -> SqlResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv_store (key, value, updated_at) VALUES (?1, ?2, datetime('now'))",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn get_value(&self, key: &str) -> SqlResult<Option<String>> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv_store WHERE key = ?1")?;
        stmt.query_row(params![key], |row| row.get(0)).optional()
    }

    pub fn delete_value(&self, key: &str) -> SqlResult<()> {
        self.conn
            .execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
        Ok(())
    }

    pub fn load_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get_value(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn save_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.set_value(key, &raw)?;
        Ok(())
    }

    /// Today's record, rolled over to `today` and falling back to defaults when
    /// the stored document is missing, unreadable or invalid.
    pub fn load_tracker_data(&self, today: NaiveDate, now_rfc3339: &str) -> Result<TrackerData> {
        let defaults = || TrackerData::defaults_for(today, now_rfc3339.to_string());
        let data = match self.load_json::<TrackerData>(TRACKER_DATA_KEY) {
            Ok(Some(data)) => match validate(&data) {
                Ok(()) => {
                    let rolled =
                        check_and_reset_for_new_day(data.clone(), today, now_rfc3339.to_string());
                    if rolled != data {
                        self.save_json(TRACKER_DATA_KEY, &rolled)?;
                    }
                    rolled
                }
                // The stored record stays in place until a valid one is saved over it.
                Err(err) => {
                    warn!("Stored tracker data rejected, using defaults: {}", err);
                    defaults()
                }
            },
            Ok(None) => {
                let data = defaults();
                self.save_json(TRACKER_DATA_KEY, &data)?;
                data
            }
            Err(err) => {
                warn!("Stored tracker data unreadable, using defaults: {}", err);
                defaults()
            }
        };
        Ok(data)
    }

    /// Validates before writing; an invalid record is never persisted.
    pub fn save_tracker_data(&self, data: &TrackerData) -> Result<()> {
        validate(data)?;
        self.save_json(TRACKER_DATA_KEY, data)
    }
}

impl GoalRepository for Database {
    fn load_goals(&self) -> Result<Vec<PurchaseGoal>> {
        match self.load_json::<Vec<PurchaseGoal>>(PURCHASE_GOALS_KEY) {
            Ok(goals) => Ok(goals.unwrap_or_default()),
            Err(crate::error::TrackerError::Serialization(err)) => {
                warn!("Stored purchase goals unreadable, starting empty: {}", err);
                Ok(Vec::new())
            }
            Err(err) => Err(err),
        }
    }

    fn save_goals(&self, goals: &[PurchaseGoal]) -> Result<()> {
        self.save_json(PURCHASE_GOALS_KEY, goals)
    }

    fn load_conversion(&self) -> Result<RevenueConversion> {
        Ok(self
            .load_json::<RevenueConversion>(REVENUE_CONVERSION_KEY)?
            .unwrap_or_default())
    }

    fn save_conversion(&self, conversion: &RevenueConversion) -> Result<()> {
        self.save_json(REVENUE_CONVERSION_KEY, conversion)
    }
}
