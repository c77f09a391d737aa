//! Session lifecycle: load at start, mutate, checkpoint.
//!
//! The session owns the blob store and the one `Progress` for its lifetime.
//! Loading never fails on bad save data: an absent or empty blob seeds a
//! fresh default state, and a malformed blob is logged and replaced by one.

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Serialize;

use crate::logutil::escape_blob;
use crate::progress::catalog::Catalog;
use crate::progress::errors::ProgressError;
use crate::progress::preferences::{Preferences, TutorialStatus};
use crate::progress::shop::Progress;
use crate::progress::storage::BlobStore;

/// Blob key used for the save string when none is configured.
pub const DEFAULT_SAVE_KEY: &str = "SaveFile";

/// How the session obtained its state.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LoadOutcome {
    /// No save existed; defaults were seeded.
    FirstRun,
    /// The stored save string decoded cleanly.
    Restored,
    /// The stored save string was malformed; defaults were seeded over it.
    Recovered,
}

/// Daily play bonus settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardPolicy {
    pub enabled: bool,
    pub daily_play_bonus: u32,
}

impl Default for RewardPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            daily_play_bonus: 50,
        }
    }
}

/// A reward is due once per UTC calendar day.
pub fn daily_reward_due(last_claimed: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now.date_naive() > last_claimed.date_naive()
}

/// What the game-over screen needs after a run is banked.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RunSummary {
    pub score: u32,
    pub total_score: u32,
    pub highscore: u32,
    pub new_highscore: bool,
    pub daily_reward: Option<u32>,
    pub something_purchaseable: bool,
}

pub struct Session<S: BlobStore> {
    store: S,
    save_key: String,
    progress: Progress,
    outcome: LoadOutcome,
    rewards: RewardPolicy,
}

impl<S: BlobStore> Session<S> {
    /// Load the save under `save_key`, starting from `catalog` defaults.
    pub fn open(
        store: S,
        save_key: impl Into<String>,
        catalog: Catalog,
    ) -> Result<Self, ProgressError> {
        let save_key = save_key.into();
        let mut progress = Progress::new(catalog);

        let raw = store.load_raw(&save_key)?.filter(|raw| !raw.is_empty());
        let outcome = match raw {
            None => {
                info!("No save under '{}', seeding defaults", save_key);
                LoadOutcome::FirstRun
            }
            Some(raw) => match progress.decode(&raw) {
                Ok(()) => LoadOutcome::Restored,
                Err(e) => {
                    // Decode is atomic, so `progress` still holds the defaults.
                    warn!(
                        "Discarding unreadable save '{}' ({}): {}",
                        save_key,
                        e,
                        escape_blob(&raw)
                    );
                    LoadOutcome::Recovered
                }
            },
        };

        let session = Self {
            store,
            save_key,
            progress,
            outcome,
            rewards: RewardPolicy::default(),
        };
        if outcome != LoadOutcome::Restored {
            session.checkpoint()?;
        }
        Ok(session)
    }

    pub fn with_rewards(mut self, rewards: RewardPolicy) -> Self {
        self.rewards = rewards;
        self
    }

    pub fn outcome(&self) -> LoadOutcome {
        self.outcome
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn progress_mut(&mut self) -> &mut Progress {
        &mut self.progress
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn save_key(&self) -> &str {
        &self.save_key
    }

    pub fn preferences(&self) -> Preferences<'_, S> {
        Preferences::new(&self.store)
    }

    /// Encode the current state and write it to the store.
    pub fn checkpoint(&self) -> Result<(), ProgressError> {
        let encoded = self.progress.encode();
        self.store.save_raw(&self.save_key, &encoded)?;
        info!(
            "Checkpoint saved to '{}' ({} bytes)",
            self.save_key,
            encoded.len()
        );
        Ok(())
    }

    /// Credit the daily play bonus if one is due at `now`.
    ///
    /// The credited balance is checkpointed before the claim time is stored,
    /// so a failed save leaves the reward unclaimed and the ledger unchanged.
    pub fn claim_daily_reward(&mut self, now: DateTime<Utc>) -> Result<Option<u32>, ProgressError> {
        if !self.rewards.enabled {
            return Ok(None);
        }
        if !daily_reward_due(self.preferences().last_reward_time()?, now) {
            return Ok(None);
        }

        let bonus = self.rewards.daily_play_bonus;
        let balance = self.progress.total_score();
        self.progress.ledger_mut().credit(bonus);
        if let Err(e) = self.checkpoint() {
            self.progress.set_total_score(balance);
            warn!("Daily play reward not saved, leaving it unclaimed: {}", e);
            return Err(e);
        }
        self.preferences().set_last_reward_time(now)?;
        info!("Daily play reward of {} claimed", bonus);
        Ok(Some(bonus))
    }

    /// Game over: claim any daily reward, bank the run, close the tutorial
    /// and checkpoint.
    pub fn finish_run(
        &mut self,
        score: u32,
        now: DateTime<Utc>,
    ) -> Result<RunSummary, ProgressError> {
        let daily_reward = self.claim_daily_reward(now)?;
        let new_highscore = self.progress.record_run(score);
        self.preferences()
            .set_tutorial_status(TutorialStatus::Done)?;
        self.checkpoint()?;

        Ok(RunSummary {
            score,
            total_score: self.progress.total_score(),
            highscore: self.progress.highscore(),
            new_highscore,
            daily_reward,
            something_purchaseable: self.progress.is_something_purchaseable(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::catalog::StandardCatalog;
    use crate::progress::preferences::default_last_reward_time;
    use crate::progress::storage::MemoryBlobStore;
    use chrono::TimeZone;
    use std::cell::Cell;

    /// Memory store whose save-string writes can be made to fail.
    struct FailingSaveStore {
        inner: MemoryBlobStore,
        fail_saves: Cell<bool>,
    }

    impl BlobStore for FailingSaveStore {
        fn load_raw(&self, key: &str) -> Result<Option<String>, ProgressError> {
            self.inner.load_raw(key)
        }

        fn save_raw(&self, key: &str, value: &str) -> Result<(), ProgressError> {
            if key == DEFAULT_SAVE_KEY && self.fail_saves.get() {
                return Err(ProgressError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "disk full",
                )));
            }
            self.inner.save_raw(key, value)
        }
    }

    fn catalog() -> Catalog {
        Catalog::from_provider(&StandardCatalog).unwrap()
    }

    #[test]
    fn first_run_seeds_store() {
        let store = MemoryBlobStore::new();
        let session = Session::open(&store, DEFAULT_SAVE_KEY, catalog()).unwrap();
        assert_eq!(session.outcome(), LoadOutcome::FirstRun);
        assert_eq!(
            store.load_raw(DEFAULT_SAVE_KEY).unwrap(),
            Some(session.progress().encode())
        );
    }

    #[test]
    fn empty_blob_counts_as_first_run() {
        let store = MemoryBlobStore::new().with_blob(DEFAULT_SAVE_KEY, "");
        let session = Session::open(&store, DEFAULT_SAVE_KEY, catalog()).unwrap();
        assert_eq!(session.outcome(), LoadOutcome::FirstRun);
    }

    #[test]
    fn malformed_blob_recovers_with_defaults() {
        let store = MemoryBlobStore::new().with_blob(DEFAULT_SAVE_KEY, "H9");
        let session = Session::open(&store, DEFAULT_SAVE_KEY, catalog()).unwrap();
        assert_eq!(session.outcome(), LoadOutcome::Recovered);
        assert_eq!(session.progress().total_score(), 0);
        let reseeded = store.load_raw(DEFAULT_SAVE_KEY).unwrap().unwrap();
        assert_eq!(reseeded, session.progress().encode());
    }

    #[test]
    fn daily_reward_once_per_day() {
        let last = Utc.with_ymd_and_hms(2024, 3, 1, 23, 59, 0).unwrap();
        assert!(!daily_reward_due(last, Utc.with_ymd_and_hms(2024, 3, 1, 23, 59, 59).unwrap()));
        assert!(daily_reward_due(last, Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 1).unwrap()));
    }

    #[test]
    fn finish_run_claims_reward_once() {
        let store = MemoryBlobStore::new();
        let mut session = Session::open(&store, DEFAULT_SAVE_KEY, catalog())
            .unwrap()
            .with_rewards(RewardPolicy {
                enabled: true,
                daily_play_bonus: 25,
            });
        let now = Utc.with_ymd_and_hms(2024, 3, 2, 12, 0, 0).unwrap();

        let first = session.finish_run(30, now).unwrap();
        assert_eq!(first.daily_reward, Some(25));
        assert_eq!(first.total_score, 55);
        assert!(first.new_highscore);

        let second = session.finish_run(10, now).unwrap();
        assert_eq!(second.daily_reward, None);
        assert_eq!(second.total_score, 65);
        assert!(!second.new_highscore);
        assert_eq!(
            session.preferences().tutorial_status().unwrap(),
            TutorialStatus::Done
        );
    }

    #[test]
    fn failed_checkpoint_leaves_daily_reward_unclaimed() {
        let store = FailingSaveStore {
            inner: MemoryBlobStore::new(),
            fail_saves: Cell::new(false),
        };
        let mut session = Session::open(&store, DEFAULT_SAVE_KEY, catalog()).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap();

        store.fail_saves.set(true);
        assert!(matches!(
            session.finish_run(0, now),
            Err(ProgressError::Io(_))
        ));
        assert_eq!(session.progress().total_score(), 0);
        assert_eq!(
            session.preferences().last_reward_time().unwrap(),
            default_last_reward_time()
        );

        store.fail_saves.set(false);
        let mut reopened = Session::open(&store, DEFAULT_SAVE_KEY, catalog()).unwrap();
        assert_eq!(reopened.claim_daily_reward(now).unwrap(), Some(50));
        assert_eq!(reopened.progress().total_score(), 50);

        let saved = Session::open(&store, DEFAULT_SAVE_KEY, catalog()).unwrap();
        assert_eq!(saved.progress().total_score(), 50);
        assert_eq!(saved.preferences().last_reward_time().unwrap(), now);
    }
}
