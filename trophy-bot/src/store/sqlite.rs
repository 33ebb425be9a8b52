use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use rusqlite::{Connection, OptionalExtension, params};

use super::{now_timestamp, CounterField, LeaderboardEntry, StoreError, UserRecord, UserStore};

/// SQLite-backed user store.
pub struct SqliteUserStore {
    conn: Mutex<Connection>,
}

fn unavailable(e: rusqlite::Error) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

impl SqliteUserStore {
    /// Open (or create) the database and make sure the schema exists.
    pub fn open(database_url: &str) -> Result<Self, StoreError> {
        // Parse sqlite: prefix if present
        let path = database_url
            .strip_prefix("sqlite://")
            .or_else(|| database_url.strip_prefix("sqlite:"))
            .unwrap_or(database_url);

        // Only the scheme is reported; the rest may hold credentials
        if let Some((scheme, _)) = path.split_once("://") {
            return Err(StoreError::Unavailable(format!(
                "unsupported database URL scheme: {}",
                scheme
            )));
        }

        let conn = if path == ":memory:" || path == "memory" {
            Connection::open_in_memory().map_err(unavailable)?
        } else {
            // Create parent directories if needed
            if let Some(parent) = Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .map_err(|e| StoreError::IoError(e.to_string()))?;
                }
            }
            Connection::open(path).map_err(unavailable)?
        };

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.ensure_schema()?;

        tracing::info!("User store initialized with database: {}", path);
        Ok(store)
    }

    /// In-memory store, mostly for tests.
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::open(":memory:")
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

impl UserStore for SqliteUserStore {
    fn ensure_schema(&self) -> Result<(), StoreError> {
        let conn = self.lock()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                user_id INTEGER PRIMARY KEY,
                name TEXT,
                last_access REAL,
                rating INTEGER NOT NULL DEFAULT 0,
                quiz_score INTEGER NOT NULL DEFAULT 0
            )",
            [],
        ).map_err(unavailable)?;

        Ok(())
    }

    fn get(&self, user_id: i64) -> Result<Option<UserRecord>, StoreError> {
        let conn = self.lock()?;

        conn.query_row(
            "SELECT user_id, name, last_access, rating, quiz_score FROM users WHERE user_id = ?1",
            params![user_id],
            |row| Ok(UserRecord {
                user_id: row.get(0)?,
                display_name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                last_access: row.get(2)?,
                rating: row.get(3)?,
                quiz_score: row.get(4)?,
            }),
        )
        .optional()
        .map_err(unavailable)
    }

    fn upsert(
        &self,
        user_id: i64,
        display_name: &str,
        field: CounterField,
        value: i64,
    ) -> Result<(), StoreError> {
        let conn = self.lock()?;
        let column = field.column();

        conn.execute(
            &format!(
                "INSERT INTO users (user_id, name, last_access, {column}) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (user_id) DO UPDATE
                 SET name = excluded.name, last_access = excluded.last_access, {column} = excluded.{column}"
            ),
            params![user_id, display_name, now_timestamp(), value],
        ).map_err(unavailable)?;

        tracing::debug!(user_id, column, value, "Upserted user counter");
        Ok(())
    }

    fn increment(
        &self,
        user_id: i64,
        display_name: &str,
        field: CounterField,
    ) -> Result<i64, StoreError> {
        let conn = self.lock()?;
        let column = field.column();

        let value: i64 = conn.query_row(
            &format!(
                "INSERT INTO users (user_id, name, last_access, {column}) VALUES (?1, ?2, ?3, 1)
                 ON CONFLICT (user_id) DO UPDATE
                 SET name = excluded.name, last_access = excluded.last_access, {column} = {column} + 1
                 RETURNING {column}"
            ),
            params![user_id, display_name, now_timestamp()],
            |row| row.get(0),
        ).map_err(unavailable)?;

        tracing::debug!(user_id, column, value, "Incremented user counter");
        Ok(value)
    }

    fn touch(&self, user_id: i64, display_name: &str) -> Result<(), StoreError> {
        let conn = self.lock()?;

        conn.execute(
            "UPDATE users SET name = ?2, last_access = ?3 WHERE user_id = ?1",
            params![user_id, display_name, now_timestamp()],
        ).map_err(unavailable)?;

        Ok(())
    }

    fn top_n(
        &self,
        field: CounterField,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>, StoreError> {
        let conn = self.lock()?;
        let column = field.column();

        let mut stmt = conn
            .prepare(&format!(
                "SELECT name, {column} FROM users ORDER BY {column} DESC, user_id ASC LIMIT ?1"
            ))
            .map_err(unavailable)?;

        let rows = stmt
            .query_map(params![i64::try_from(limit).unwrap_or(i64::MAX)], |row| {
                Ok(LeaderboardEntry {
                    display_name: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                    score: row.get(1)?,
                })
            })
            .map_err(unavailable)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(unavailable)
    }

    fn count(&self) -> Result<u64, StoreError> {
        let conn = self.lock()?;

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .map_err(unavailable)?;

        Ok(count as u64)
    }
}
