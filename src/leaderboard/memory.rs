//! In-process store
//!
//! Mutex-guarded tables; also the working set behind `LocalStore`.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use super::{
    LeaderboardEntry, Profile, RunRecord, ScoreStore, StoreError, StoreOp, rank_profiles,
};
use crate::platform;

/// Serializable contents of a store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreData {
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
    /// Oldest first
    #[serde(default)]
    pub runs: Vec<RunRecord>,
}

impl StoreData {
    pub fn upsert_profile(&mut self, profile: &Profile) {
        self.profiles.insert(profile.id.clone(), profile.clone());
    }

    pub fn push_run(&mut self, user_id: &str, score: u32, created_at_ms: u64) {
        self.runs.push(RunRecord {
            user_id: user_id.to_string(),
            score,
            created_at_ms,
        });
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<StoreData>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_data(data: StoreData) -> Self {
        Self {
            data: Mutex::new(data),
        }
    }

    /// Copy of every recorded run, oldest first
    pub fn runs(&self) -> Result<Vec<RunRecord>, StoreError> {
        self.with_data(StoreOp::ListRuns, |data| data.runs.clone())
    }

    /// Run `f` against the tables under the lock
    pub(crate) fn with_data<T>(
        &self,
        op: StoreOp,
        f: impl FnOnce(&mut StoreData) -> T,
    ) -> Result<T, StoreError> {
        let mut guard = self.lock(op)?;
        Ok(f(&mut guard))
    }

    fn lock(&self, op: StoreOp) -> Result<MutexGuard<'_, StoreData>, StoreError> {
        self.data
            .lock()
            .map_err(|_| StoreError::new(op, "store lock poisoned"))
    }
}

impl ScoreStore for MemoryStore {
    fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, StoreError> {
        self.with_data(StoreOp::GetProfile, |data| data.profiles.get(user_id).cloned())
    }

    fn upsert_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        self.with_data(StoreOp::UpsertProfile, |data| data.upsert_profile(profile))
    }

    fn insert_run(&self, user_id: &str, score: u32) -> Result<(), StoreError> {
        let created_at_ms = platform::now_ms();
        self.with_data(StoreOp::InsertRun, |data| {
            data.push_run(user_id, score, created_at_ms)
        })
    }

    fn get_rank(&self, user_id: &str) -> Result<Option<u32>, StoreError> {
        self.with_data(StoreOp::GetRank, |data| {
            rank_profiles(data.profiles.values())
                .into_iter()
                .find(|e| e.user_id == user_id)
                .map(|e| e.rank)
        })
    }

    fn list_leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, StoreError> {
        self.with_data(StoreOp::ListLeaderboard, |data| {
            let mut entries = rank_profiles(data.profiles.values());
            entries.truncate(limit);
            entries
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: &str, best_score: u32) -> Profile {
        Profile {
            id: id.to_string(),
            username: format!("{id}-name"),
            best_score,
            avatar_url: None,
        }
    }

    #[test]
    fn test_competition_ranking() {
        let store = MemoryStore::new();
        for p in [
            profile("dave", 10),
            profile("bob", 30),
            profile("carol", 30),
            profile("alice", 50),
            profile("erin", 0),
        ] {
            store.upsert_profile(&p).unwrap();
        }

        let board = store.list_leaderboard(10).unwrap();
        let rows: Vec<(&str, u32)> = board
            .iter()
            .map(|e| (e.user_id.as_str(), e.rank))
            .collect();
        assert_eq!(
            rows,
            vec![("alice", 1), ("bob", 2), ("carol", 2), ("dave", 4)]
        );

        assert_eq!(store.get_rank("carol").unwrap(), Some(2));
        assert_eq!(store.get_rank("dave").unwrap(), Some(4));
        // Zero best score does not qualify
        assert_eq!(store.get_rank("erin").unwrap(), None);
        assert_eq!(store.get_rank("nobody").unwrap(), None);
    }

    #[test]
    fn test_leaderboard_limit() {
        let store = MemoryStore::new();
        for i in 1..=5 {
            store.upsert_profile(&profile(&format!("u{i}"), i * 10)).unwrap();
        }
        let board = store.list_leaderboard(2).unwrap();
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].user_id, "u5");
        assert_eq!(board[1].best_score, 40);
    }

    #[test]
    fn test_runs_are_appended() {
        let store = MemoryStore::new();
        store.insert_run("alice", 3).unwrap();
        store.insert_run("alice", 1).unwrap();
        let runs = store.runs().unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].score, 3);
        assert_eq!(runs[1].score, 1);
    }
}
