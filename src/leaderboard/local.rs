//! Device-local store
//!
//! A `MemoryStore` saved as one JSON document after every write: to
//! LocalStorage in the browser, to a file natively. For playing without an
//! account or a network.
//!
//! Writes are applied to a copy of the tables, and the copy replaces the
//! in-memory tables only once the document has been stored.

use super::{
    LeaderboardEntry, MemoryStore, Profile, ScoreStore, StoreData, StoreError, StoreOp,
};
use crate::platform::{self, storage};

#[derive(Debug)]
pub struct LocalStore {
    inner: MemoryStore,
    location: String,
}

impl LocalStore {
    /// LocalStorage key used by the web build
    pub const DEFAULT_KEY: &'static str = "skyflap_scores";

    /// Load the document at `location`, starting empty if there is none
    ///
    /// A document that no longer parses is logged and replaced on the next
    /// write rather than blocking play.
    pub fn open(location: impl Into<String>) -> Result<Self, StoreError> {
        let location = location.into();
        let data = match storage::read(&location)
            .map_err(|e| StoreError::new(StoreOp::Open, e))?
        {
            Some(json) => serde_json::from_str::<StoreData>(&json).unwrap_or_else(|e| {
                log::warn!("Discarding unreadable score data at {}: {}", location, e);
                StoreData::default()
            }),
            None => {
                log::info!("No saved scores at {}, starting fresh", location);
                StoreData::default()
            }
        };
        log::info!(
            "Loaded {} profiles and {} runs from {}",
            data.profiles.len(),
            data.runs.len(),
            location
        );
        Ok(Self {
            inner: MemoryStore::from_data(data),
            location,
        })
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn memory(&self) -> &MemoryStore {
        &self.inner
    }

    /// Apply `change` to a copy, store it, then adopt it
    fn commit(&self, op: StoreOp, change: impl FnOnce(&mut StoreData)) -> Result<(), StoreError> {
        self.inner.with_data(op, |data| -> Result<(), StoreError> {
            let mut next = data.clone();
            change(&mut next);
            let json = serde_json::to_string(&next)
                .map_err(|e| StoreError::new(op, format!("serialize failed: {e}")))?;
            storage::write(&self.location, &json).map_err(|e| StoreError::new(op, e))?;
            *data = next;
            Ok(())
        })?
    }
}

impl ScoreStore for LocalStore {
    fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, StoreError> {
        self.inner.get_profile(user_id)
    }

    fn upsert_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        self.commit(StoreOp::UpsertProfile, |data| data.upsert_profile(profile))
    }

    fn insert_run(&self, user_id: &str, score: u32) -> Result<(), StoreError> {
        let created_at_ms = platform::now_ms();
        self.commit(StoreOp::InsertRun, |data| {
            data.push_run(user_id, score, created_at_ms)
        })
    }

    fn get_rank(&self, user_id: &str) -> Result<Option<u32>, StoreError> {
        self.inner.get_rank(user_id)
    }

    fn list_leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, StoreError> {
        self.inner.list_leaderboard(limit)
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::leaderboard::{ProfileSeed, Reconciler};

    #[test]
    fn test_scores_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");
        let location = path.to_str().unwrap().to_string();

        let seed = ProfileSeed {
            username: "pilot".to_string(),
            ..Default::default()
        };
        {
            let reconciler = Reconciler::new(LocalStore::open(location.clone()).unwrap());
            assert_eq!(reconciler.record_score("u1", 12, Some(&seed)).unwrap(), 12);
            assert_eq!(reconciler.record_score("u1", 7, None).unwrap(), 12);
        }

        let reopened = LocalStore::open(location).unwrap();
        let profile = reopened.get_profile("u1").unwrap().unwrap();
        assert_eq!(profile.username, "pilot");
        assert_eq!(profile.best_score, 12);
        assert_eq!(reopened.memory().runs().unwrap().len(), 2);
        assert_eq!(reopened.get_rank("u1").unwrap(), Some(1));
    }

    #[test]
    fn test_corrupt_document_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");
        std::fs::write(&path, "not json").unwrap();

        let store = LocalStore::open(path.to_str().unwrap()).unwrap();
        assert!(store.list_leaderboard(10).unwrap().is_empty());
        store.insert_run("u1", 3).unwrap();

        let saved = std::fs::read_to_string(&path).unwrap();
        let data: StoreData = serde_json::from_str(&saved).unwrap();
        assert_eq!(data.runs.len(), 1);
    }

    #[test]
    fn test_unwritable_location_reports_store_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("scores.json");
        let store = LocalStore::open(path.to_str().unwrap()).unwrap();

        let err = store.insert_run("u1", 3).unwrap_err();
        assert_eq!(err.op, StoreOp::InsertRun);
    }

    #[test]
    fn test_failed_write_leaves_no_trace() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("later");
        let path = sub.join("scores.json");
        let location = path.to_str().unwrap().to_string();
        let store = LocalStore::open(location.clone()).unwrap();

        assert!(store.insert_run("u", 99).is_err());
        let pilot = Profile {
            id: "u".to_string(),
            username: "pilot".to_string(),
            best_score: 99,
            avatar_url: None,
        };
        assert!(store.upsert_profile(&pilot).is_err());
        assert!(store.memory().runs().unwrap().is_empty());
        assert_eq!(store.get_profile("u").unwrap(), None);
        assert_eq!(store.get_rank("u").unwrap(), None);

        std::fs::create_dir(&sub).unwrap();
        store.insert_run("u", 1).unwrap();

        let reopened = LocalStore::open(location).unwrap();
        let scores: Vec<u32> = reopened
            .memory()
            .runs()
            .unwrap()
            .into_iter()
            .map(|run| run.score)
            .collect();
        assert_eq!(scores, vec![1]);
        assert_eq!(reopened.get_profile("u").unwrap(), None);
    }

    #[test]
    fn test_unreadable_location_reports_open() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be read as a document
        let err = LocalStore::open(dir.path().to_str().unwrap()).unwrap_err();
        assert_eq!(err.op, StoreOp::Open);
        assert!(err.to_string().starts_with("open store failed"));
    }
}
