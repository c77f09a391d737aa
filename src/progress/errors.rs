use thiserror::Error;

use crate::progress::types::Section;

/// Errors raised by the catalog, purchase engine, save codec and blob stores.
#[derive(Debug, Error)]
pub enum ProgressError {
    /// Section + index addresses an entry outside the catalog.
    #[error("invalid index {index} for {section} (section has {len} entries)")]
    InvalidIndex {
        section: Section,
        index: usize,
        len: usize,
    },

    /// The operation has no meaning for the section (e.g. selecting a powerup).
    #[error("cannot {operation} in section {section}")]
    InvalidSection {
        section: Section,
        operation: &'static str,
    },

    /// Decoding stopped on a bad or truncated save string.
    #[error("malformed save string at byte {position}: {reason}")]
    MalformedSaveString { position: usize, reason: String },

    /// Purchase attempted with less currency than the entry costs.
    #[error("insufficient funds: price {price}, balance {balance}")]
    InsufficientFunds { price: u32, balance: u32 },

    /// Entry is already unlocked (or, for powerups, already at max level).
    #[error("{section} entry {index} is already unlocked")]
    AlreadyUnlocked { section: Section, index: usize },

    /// Selecting an entry the player does not own yet.
    #[error("{section} entry {index} is not unlocked")]
    NotUnlocked { section: Section, index: usize },

    /// Level outside `0..=max` for the entry.
    #[error("level {level} out of range (max {max})")]
    LevelOutOfRange { level: u8, max: u8 },

    /// Catalog definition violates the save format or entry rules.
    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),

    /// Wrapper around sled's error type.
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    /// Wrapper around IO errors (directory creation, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored blob was not valid UTF-8.
    #[error("utf-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}
