//! SQLite-backed store (native only)
//!
//! `profiles` holds one row per player; `scores` is the append-only run log.
//! Ranks come from a `RANK()` window over qualifying profiles, so equal best
//! scores share a rank.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, OptionalExtension, params};

use super::{LeaderboardEntry, Profile, ScoreStore, StoreError, StoreOp};
use crate::platform;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS profiles (
    id          TEXT PRIMARY KEY,
    username    TEXT NOT NULL,
    best_score  INTEGER NOT NULL DEFAULT 0 CHECK (best_score >= 0),
    avatar_url  TEXT
);
CREATE TABLE IF NOT EXISTS scores (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id        TEXT NOT NULL,
    score          INTEGER NOT NULL CHECK (score >= 0),
    created_at_ms  INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS scores_user_id ON scores (user_id);
";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|e| {
            StoreError::new(
                StoreOp::Open,
                format!("{}: {e}", path.display()),
            )
        })?;
        log::info!("Opened score database at {}", path.display());
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::new(StoreOp::Open, e.to_string()))?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)
            .map_err(|e| StoreError::new(StoreOp::Open, format!("schema failed: {e}")))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Number of runs logged for `user_id`
    pub fn run_count(&self, user_id: &str) -> Result<u32, StoreError> {
        let conn = self.lock(StoreOp::ListRuns)?;
        conn.query_row(
            "SELECT COUNT(*) FROM scores WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )
        .map_err(|e| StoreError::new(StoreOp::ListRuns, e.to_string()))
    }

    fn lock(&self, op: StoreOp) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::new(op, "connection lock poisoned"))
    }
}

impl ScoreStore for SqliteStore {
    fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, StoreError> {
        let conn = self.lock(StoreOp::GetProfile)?;
        conn.query_row(
            "SELECT id, username, best_score, avatar_url FROM profiles WHERE id = ?1",
            params![user_id],
            |row| {
                Ok(Profile {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    best_score: row.get(2)?,
                    avatar_url: row.get(3)?,
                })
            },
        )
        .optional()
        .map_err(|e| StoreError::new(StoreOp::GetProfile, e.to_string()))
    }

    fn upsert_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        let conn = self.lock(StoreOp::UpsertProfile)?;
        conn.execute(
            "INSERT INTO profiles (id, username, best_score, avatar_url)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (id) DO UPDATE SET
                username = excluded.username,
                best_score = excluded.best_score,
                avatar_url = excluded.avatar_url",
            params![
                profile.id,
                profile.username,
                profile.best_score,
                profile.avatar_url.as_deref(),
            ],
        )
        .map_err(|e| StoreError::new(StoreOp::UpsertProfile, e.to_string()))?;
        Ok(())
    }

    fn insert_run(&self, user_id: &str, score: u32) -> Result<(), StoreError> {
        let created_at_ms = platform::now_ms() as i64;
        let conn = self.lock(StoreOp::InsertRun)?;
        conn.execute(
            "INSERT INTO scores (user_id, score, created_at_ms) VALUES (?1, ?2, ?3)",
            params![user_id, score, created_at_ms],
        )
        .map_err(|e| StoreError::new(StoreOp::InsertRun, e.to_string()))?;
        Ok(())
    }

    fn get_rank(&self, user_id: &str) -> Result<Option<u32>, StoreError> {
        let conn = self.lock(StoreOp::GetRank)?;
        conn.query_row(
            "SELECT rank FROM (
                SELECT id, RANK() OVER (ORDER BY best_score DESC) AS rank
                FROM profiles WHERE best_score > 0
             ) WHERE id = ?1",
            params![user_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| StoreError::new(StoreOp::GetRank, e.to_string()))
    }

    fn list_leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, StoreError> {
        let map_err = |e: rusqlite::Error| StoreError::new(StoreOp::ListLeaderboard, e.to_string());
        let conn = self.lock(StoreOp::ListLeaderboard)?;
        let mut stmt = conn
            .prepare(
                "SELECT id, username, best_score, avatar_url,
                        RANK() OVER (ORDER BY best_score DESC) AS rank
                 FROM profiles WHERE best_score > 0
                 ORDER BY best_score DESC, id ASC
                 LIMIT ?1",
            )
            .map_err(map_err)?;
        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok(LeaderboardEntry {
                    user_id: row.get(0)?,
                    username: row.get(1)?,
                    best_score: row.get(2)?,
                    avatar_url: row.get(3)?,
                    rank: row.get(4)?,
                })
            })
            .map_err(map_err)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(map_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaderboard::{ProfileSeed, Reconciler, ScoreError};

    fn profile(id: &str, best_score: u32) -> Profile {
        Profile {
            id: id.to_string(),
            username: format!("{id}-name"),
            best_score,
            avatar_url: Some(format!("https://avatars.example/{id}.png")),
        }
    }

    #[test]
    fn test_profile_upsert_round_trip() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.get_profile("alice").unwrap(), None);

        let mut alice = profile("alice", 10);
        store.upsert_profile(&alice).unwrap();
        assert_eq!(store.get_profile("alice").unwrap(), Some(alice.clone()));

        alice.username = "Alice".to_string();
        alice.avatar_url = None;
        store.upsert_profile(&alice).unwrap();
        store.upsert_profile(&alice).unwrap();
        assert_eq!(store.get_profile("alice").unwrap(), Some(alice));
    }

    #[test]
    fn test_rank_matches_memory_store() {
        let store = SqliteStore::open_in_memory().unwrap();
        for p in [
            profile("dave", 10),
            profile("bob", 30),
            profile("carol", 30),
            profile("alice", 50),
            profile("erin", 0),
        ] {
            store.upsert_profile(&p).unwrap();
        }

        let rows: Vec<(String, u32)> = store
            .list_leaderboard(10)
            .unwrap()
            .into_iter()
            .map(|e| (e.user_id, e.rank))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("alice".to_string(), 1),
                ("bob".to_string(), 2),
                ("carol".to_string(), 2),
                ("dave".to_string(), 4),
            ]
        );
        assert_eq!(store.get_rank("dave").unwrap(), Some(4));
        assert_eq!(store.get_rank("erin").unwrap(), None);
        assert_eq!(store.list_leaderboard(1).unwrap().len(), 1);
    }

    #[test]
    fn test_reconcile_against_sqlite() {
        let reconciler = Reconciler::new(SqliteStore::open_in_memory().unwrap());
        assert_eq!(
            reconciler.record_score("u1", 5, None),
            Err(ScoreError::ProfileMissing {
                user_id: "u1".to_string()
            })
        );
        // The run is logged even though the profile step failed
        assert_eq!(reconciler.store().run_count("u1").unwrap(), 1);

        let seed = ProfileSeed {
            username: "first".to_string(),
            avatar_url: None,
            best_score: 8,
        };
        assert_eq!(reconciler.record_score("u1", 5, Some(&seed)).unwrap(), 8);
        assert_eq!(reconciler.record_score("u1", 20, None).unwrap(), 20);
        assert_eq!(reconciler.record_score("u1", 3, None).unwrap(), 20);
        assert_eq!(reconciler.store().run_count("u1").unwrap(), 4);
        assert_eq!(reconciler.fetch_rank("u1").unwrap(), Some(1));
    }

    #[test]
    fn test_file_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.db");
        {
            let store = SqliteStore::open(&path).unwrap();
            store.upsert_profile(&profile("alice", 42)).unwrap();
            store.insert_run("alice", 42).unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.get_profile("alice").unwrap().unwrap().best_score, 42);
        assert_eq!(store.run_count("alice").unwrap(), 1);
    }

    #[test]
    fn test_open_failure_is_labelled() {
        let dir = tempfile::tempdir().unwrap();
        // A directory is not a database file
        let err = SqliteStore::open(dir.path()).err().unwrap();
        assert_eq!(err.op, StoreOp::Open);
    }
}
