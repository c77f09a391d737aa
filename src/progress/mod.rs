//! Player progression: the unlockable catalog, the score ledger, the save
//! string codec and the purchase engine, plus the session plumbing that moves
//! save strings in and out of a blob store.
//!
//! Everything here is synchronous and owned by a single session.

pub mod catalog;
pub mod codec;
pub mod errors;
pub mod preferences;
pub mod session;
pub mod shop;
pub mod storage;
pub mod types;

pub use catalog::{validate_entry_name, Catalog, CatalogProvider, StandardCatalog};
pub use codec::{decode, encode};
pub use errors::ProgressError;
pub use preferences::{
    default_last_reward_time, Preferences, SoundStatus, TutorialStatus, LAST_REWARD_TIME_KEY,
    SOUND_STATUS_KEY, TUTORIAL_STATUS_KEY,
};
pub use session::{
    daily_reward_due, LoadOutcome, RewardPolicy, RunSummary, Session, DEFAULT_SAVE_KEY,
};
pub use shop::{format_section_listing, Progress};
pub use storage::{BlobStore, MemoryBlobStore, SledBlobStore, SledBlobStoreBuilder};
pub use types::*;
