//! Small persisted settings that live next to the save string: sound,
//! tutorial progress and the last daily reward time. Each is its own blob key.
//! Missing or unreadable values fall back to their defaults.

use chrono::{DateTime, TimeZone, Utc};
use log::warn;
use serde::Serialize;

use crate::logutil::escape_blob;
use crate::progress::errors::ProgressError;
use crate::progress::storage::BlobStore;

pub const SOUND_STATUS_KEY: &str = "SoundStatus";
pub const TUTORIAL_STATUS_KEY: &str = "TutorialStatus";
pub const LAST_REWARD_TIME_KEY: &str = "LastRewardTime";

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SoundStatus {
    Off,
    #[default]
    On,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TutorialStatus {
    #[default]
    Open,
    Done,
}

/// Last reward time assumed before any reward was claimed.
pub fn default_last_reward_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Typed view over the preference keys of a blob store.
pub struct Preferences<'a, S: BlobStore> {
    store: &'a S,
}

impl<'a, S: BlobStore> Preferences<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    fn read_flag(&self, key: &str) -> Result<Option<bool>, ProgressError> {
        let Some(raw) = self.store.load_raw(key)? else {
            return Ok(None);
        };
        match raw.trim() {
            "0" => Ok(Some(false)),
            "" => Ok(None),
            digits if digits.chars().all(|c| c.is_ascii_digit()) => Ok(Some(true)),
            other => {
                warn!("Ignoring unreadable {} value '{}'", key, escape_blob(other));
                Ok(None)
            }
        }
    }

    fn write_flag(&self, key: &str, value: bool) -> Result<(), ProgressError> {
        self.store.save_raw(key, if value { "1" } else { "0" })
    }

    pub fn sound_status(&self) -> Result<SoundStatus, ProgressError> {
        Ok(match self.read_flag(SOUND_STATUS_KEY)? {
            Some(false) => SoundStatus::Off,
            Some(true) => SoundStatus::On,
            None => SoundStatus::default(),
        })
    }

    pub fn set_sound_status(&self, status: SoundStatus) -> Result<(), ProgressError> {
        self.write_flag(SOUND_STATUS_KEY, status == SoundStatus::On)
    }

    pub fn tutorial_status(&self) -> Result<TutorialStatus, ProgressError> {
        // Stored as 1 while the tutorial is still open.
        Ok(match self.read_flag(TUTORIAL_STATUS_KEY)? {
            Some(false) => TutorialStatus::Done,
            Some(true) => TutorialStatus::Open,
            None => TutorialStatus::default(),
        })
    }

    pub fn set_tutorial_status(&self, status: TutorialStatus) -> Result<(), ProgressError> {
        self.write_flag(TUTORIAL_STATUS_KEY, status == TutorialStatus::Open)
    }

    pub fn last_reward_time(&self) -> Result<DateTime<Utc>, ProgressError> {
        let Some(raw) = self.store.load_raw(LAST_REWARD_TIME_KEY)? else {
            return Ok(default_last_reward_time());
        };
        match DateTime::parse_from_rfc3339(raw.trim()) {
            Ok(parsed) => Ok(parsed.with_timezone(&Utc)),
            Err(e) => {
                warn!(
                    "Ignoring unreadable {} value '{}': {}",
                    LAST_REWARD_TIME_KEY,
                    escape_blob(&raw),
                    e
                );
                Ok(default_last_reward_time())
            }
        }
    }

    pub fn set_last_reward_time(&self, when: DateTime<Utc>) -> Result<(), ProgressError> {
        self.store.save_raw(LAST_REWARD_TIME_KEY, &when.to_rfc3339())
    }
}
