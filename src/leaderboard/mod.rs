//! Score reconciliation
//!
//! Persists finished runs and keeps each player's best score, rank and the
//! leaderboard in step with a profile/run store.
//!
//! `record_score` reads the stored best and writes it back in two separate
//! store calls, so two concurrent submissions for the same user can race and
//! the later write wins even if it carries the lower score. Closing that
//! needs a conditional "set if greater" at the store boundary.

mod local;
mod memory;
#[cfg(not(target_arch = "wasm32"))]
mod sqlite;

use core::fmt;

use serde::{Deserialize, Serialize};

pub use local::LocalStore;
pub use memory::{MemoryStore, StoreData};
#[cfg(not(target_arch = "wasm32"))]
pub use sqlite::SqliteStore;

/// Rows returned when the caller does not ask for a size
pub const DEFAULT_LEADERBOARD_LIMIT: usize = 20;
/// Largest leaderboard page served
pub const MAX_LEADERBOARD_LIMIT: usize = 100;

/// Generated usernames are this prefix plus the first characters of the id
pub const GENERATED_NAME_PREFIX: &str = "Void-";
const GENERATED_NAME_ID_CHARS: usize = 6;

/// A player's stored profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub username: String,
    /// Never decreases
    pub best_score: u32,
    pub avatar_url: Option<String>,
}

/// Profile fields used to create a missing profile on first submission
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProfileSeed {
    pub username: String,
    pub avatar_url: Option<String>,
    pub best_score: u32,
}

/// One leaderboard row (1-based rank)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub username: String,
    pub best_score: u32,
    pub avatar_url: Option<String>,
    pub rank: u32,
}

/// An immutable finished run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    pub user_id: String,
    pub score: u32,
    /// Unix time (ms) the store accepted the run
    pub created_at_ms: u64,
}

/// Store call that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    /// Opening or loading the backing storage
    Open,
    InsertRun,
    ListRuns,
    GetProfile,
    UpsertProfile,
    GetRank,
    ListLeaderboard,
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open store"),
            Self::InsertRun => write!(f, "insert run"),
            Self::ListRuns => write!(f, "list runs"),
            Self::GetProfile => write!(f, "get profile"),
            Self::UpsertProfile => write!(f, "upsert profile"),
            Self::GetRank => write!(f, "get rank"),
            Self::ListLeaderboard => write!(f, "list leaderboard"),
        }
    }
}

/// Failure reported by a store implementation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    pub op: StoreOp,
    pub message: String,
}

impl StoreError {
    pub fn new(op: StoreOp, message: impl Into<String>) -> Self {
        Self {
            op,
            message: message.into(),
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.op, self.message)
    }
}

impl std::error::Error for StoreError {}

/// Why a reconciliation call failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreError {
    /// No profile and no usable fallback to create one
    ProfileMissing { user_id: String },
    /// The store failed; passed through unchanged
    Store(StoreError),
}

impl fmt::Display for ScoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProfileMissing { user_id } => {
                write!(f, "no profile for user {user_id}; sign in again and retry")
            }
            Self::Store(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ScoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(e) => Some(e),
            Self::ProfileMissing { .. } => None,
        }
    }
}

impl From<StoreError> for ScoreError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

/// The persistence boundary reconciliation depends on
///
/// Implementations synchronise internally; every method takes `&self`.
pub trait ScoreStore {
    fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, StoreError>;

    /// Insert or replace the profile keyed by `profile.id`
    fn upsert_profile(&self, profile: &Profile) -> Result<(), StoreError>;

    /// Append a run; runs are never updated or deleted
    fn insert_run(&self, user_id: &str, score: u32) -> Result<(), StoreError>;

    /// 1-based rank, or `None` when the user has no qualifying score
    fn get_rank(&self, user_id: &str) -> Result<Option<u32>, StoreError>;

    /// Top `limit` rows, ascending by rank
    fn list_leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, StoreError>;
}

/// Runs the score-sync contract against a store
#[derive(Debug)]
pub struct Reconciler<S> {
    store: S,
}

impl<S: ScoreStore> Reconciler<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Persist a run and raise the stored best if `score` beats it
    ///
    /// Returns the best score after the call. The run insert is not undone
    /// when a later step fails.
    pub fn record_score(
        &self,
        user_id: &str,
        score: u32,
        fallback: Option<&ProfileSeed>,
    ) -> Result<u32, ScoreError> {
        self.store.insert_run(user_id, score).inspect_err(|e| {
            log::warn!("Run for {} (score {}) not saved: {}", user_id, score, e);
        })?;

        let Some(mut profile) = self.store.get_profile(user_id)? else {
            let Some(seed) = fallback.filter(|s| !s.username.is_empty()) else {
                log::warn!("No profile for {} and no fallback", user_id);
                return Err(ScoreError::ProfileMissing {
                    user_id: user_id.to_string(),
                });
            };
            let best = seed.best_score.max(score);
            self.store.upsert_profile(&Profile {
                id: user_id.to_string(),
                username: seed.username.clone(),
                best_score: best,
                avatar_url: seed.avatar_url.clone(),
            })?;
            log::info!("Created profile for {} with best score {}", user_id, best);
            return Ok(best);
        };

        let current = profile.best_score;
        let next = current.max(score);
        if next > current {
            profile.best_score = next;
            self.store.upsert_profile(&profile)?;
            log::info!("Best score for {} raised {} -> {}", user_id, current, next);
        } else {
            log::debug!("Score {} for {} does not beat {}", score, user_id, current);
        }
        Ok(next)
    }

    pub fn fetch_rank(&self, user_id: &str) -> Result<Option<u32>, ScoreError> {
        Ok(self.store.get_rank(user_id)?)
    }

    /// Top rows, with `limit` clamped to `1..=MAX_LEADERBOARD_LIMIT`
    pub fn fetch_leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, ScoreError> {
        let limit = limit.clamp(1, MAX_LEADERBOARD_LIMIT);
        Ok(self.store.list_leaderboard(limit)?)
    }

    pub fn fetch_profile(&self, user_id: &str) -> Result<Option<Profile>, ScoreError> {
        Ok(self.store.get_profile(user_id)?)
    }

    /// Load the profile for a signed-in user, creating an empty one if needed
    ///
    /// A new profile takes `fallback_name` when it is non-empty, otherwise a
    /// generated `Void-xxxxxx` name. Existing profiles are returned untouched.
    pub fn ensure_profile(
        &self,
        user_id: &str,
        fallback_name: Option<&str>,
    ) -> Result<Profile, ScoreError> {
        if let Some(profile) = self.store.get_profile(user_id)? {
            return Ok(profile);
        }
        let username = match fallback_name.filter(|name| !name.is_empty()) {
            Some(name) => name.to_string(),
            None => generated_name(user_id),
        };
        let profile = Profile {
            id: user_id.to_string(),
            username,
            best_score: 0,
            avatar_url: None,
        };
        self.store.upsert_profile(&profile)?;
        log::info!("Created profile {} for {}", profile.username, user_id);
        Ok(profile)
    }

    /// Store profile details; the stored best score is never lowered
    ///
    /// Returns the profile as saved.
    pub fn save_profile(&self, profile: &Profile) -> Result<Profile, ScoreError> {
        let mut next = profile.clone();
        if let Some(stored) = self.store.get_profile(&profile.id)? {
            next.best_score = next.best_score.max(stored.best_score);
        }
        self.store.upsert_profile(&next)?;
        Ok(next)
    }
}

fn generated_name(user_id: &str) -> String {
    let short: String = user_id.chars().take(GENERATED_NAME_ID_CHARS).collect();
    format!("{GENERATED_NAME_PREFIX}{short}")
}

/// Competition ranking (equal best scores share a rank) over qualifying
/// profiles, ordered by best score then user id
pub(crate) fn rank_profiles<'a>(
    profiles: impl IntoIterator<Item = &'a Profile>,
) -> Vec<LeaderboardEntry> {
    let mut qualifying: Vec<&Profile> = profiles
        .into_iter()
        .filter(|p| p.best_score > 0)
        .collect();
    qualifying.sort_by(|a, b| b.best_score.cmp(&a.best_score).then_with(|| a.id.cmp(&b.id)));

    let mut entries: Vec<LeaderboardEntry> = Vec::with_capacity(qualifying.len());
    for (i, profile) in qualifying.into_iter().enumerate() {
        let rank = match entries.last() {
            Some(prev) if prev.best_score == profile.best_score => prev.rank,
            _ => i as u32 + 1,
        };
        entries.push(LeaderboardEntry {
            user_id: profile.id.clone(),
            username: profile.username.clone(),
            best_score: profile.best_score,
            avatar_url: profile.avatar_url.clone(),
            rank,
        });
    }
    entries
}
