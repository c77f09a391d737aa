//! # snakesave - progression persistence and shop engine for a snake game
//!
//! snakesave keeps a player's unlockable cosmetics and powerups, their score
//! ledger, and the compact save string those are persisted as between sessions.
//!
//! ## Features
//!
//! - **Catalog**: hats, color schemes and leveled powerups, addressed by section + index.
//! - **Purchase Engine**: unlock, select and query operations with funds and bounds checks.
//! - **Save Codec**: a fixed-field, delimiter-light text format decoded by an explicit scanner.
//! - **Sessions**: first-run seeding, corrupt-save recovery, checkpoints and daily rewards.
//! - **Blob Stores**: a sled-backed store for disk and an in-memory store for tests.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use snakesave::progress::{Catalog, Section, Session, SledBlobStore, StandardCatalog};
//!
//! fn main() -> anyhow::Result<()> {
//!     let store = SledBlobStore::open("./data")?;
//!     let catalog = Catalog::from_provider(&StandardCatalog)?;
//!     let mut session = Session::open(store, "SaveFile", catalog)?;
//!
//!     session.progress_mut().set_total_score(150);
//!     session.progress_mut().unlock_purchaseable(Section::Hats, 1)?;
//!     session.checkpoint()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`progress`] - catalog, ledger, codec, purchase engine, stores and sessions
//! - [`config`] - TOML configuration for the command line tool
//! - [`logutil`] - log formatting helpers
//!
//! ## Save Format
//!
//! ```text
//! H00;H11;H20;C01;C10;C21;P01;P10;S007;T00420;A1;O2;
//! └ hats ──┘ └ colors ─┘ └ pwr ─┘ └hi┘ └total─┘ └ worn ┘
//! ```

pub mod config;
pub mod logutil;
pub mod progress;
