//! Purchase engine for the in-game shop.
//!
//! This module provides:
//! - `Progress`, the session-owned catalog + ledger pair
//! - Unlock / select / query operations addressed by section + index
//! - The "something purchaseable" check used for the game-over notification
//! - Run finalisation (score banking and highscore tracking)
//!
//! Every operation takes the section explicitly; nothing about the last
//! addressed section is remembered between calls.

use log::{debug, info};
use serde::Serialize;

use crate::progress::catalog::{Catalog, CatalogProvider};
use crate::progress::errors::ProgressError;
use crate::progress::types::{
    CatalogEntry, Color, ColorChannel, Ledger, Section, MAX_HIGHSCORE,
};

/// Catalog and ledger owned by one game session.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Progress {
    catalog: Catalog,
    ledger: Ledger,
}

impl Progress {
    /// Fresh progress: default selections (index 0) and zero scores.
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            ledger: Ledger::default(),
        }
    }

    pub fn from_provider(provider: &impl CatalogProvider) -> Result<Self, ProgressError> {
        Ok(Self::new(Catalog::from_provider(provider)?))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    pub(crate) fn catalog_mut(&mut self) -> &mut Catalog {
        &mut self.catalog
    }

    pub fn total_score(&self) -> u32 {
        self.ledger.total_score()
    }

    pub fn set_total_score(&mut self, total_score: u32) {
        self.ledger.set_total_score(total_score);
    }

    pub fn highscore(&self) -> u32 {
        self.ledger.highscore()
    }

    pub fn set_highscore(&mut self, highscore: u32) {
        self.ledger.set_highscore(highscore);
    }

    pub fn selected_hat(&self) -> usize {
        self.ledger.selected_hat()
    }

    pub fn selected_color(&self) -> usize {
        self.ledger.selected_color()
    }

    /// Buy one unlock (or one powerup level). Returns the price paid.
    ///
    /// The debit and the unlock are applied together or not at all.
    pub fn unlock_purchaseable(
        &mut self,
        section: Section,
        index: usize,
    ) -> Result<u32, ProgressError> {
        let (price, name) = {
            let entry = self.catalog.entry(section, index)?;
            if entry.is_fully_owned() {
                return Err(ProgressError::AlreadyUnlocked { section, index });
            }
            (entry.price(), entry.name().to_string())
        };

        // Debit first: it is the only step that can still fail.
        self.ledger.debit(price)?;
        let entry = self.catalog.entry_mut(section, index)?;
        entry.unlock();

        info!(
            "Purchased {} '{}' (index {}) for {}; level {}/{}, balance {}",
            section,
            name,
            index,
            price,
            entry.current_level(),
            entry.max_level(),
            self.ledger.total_score()
        );
        Ok(price)
    }

    /// Wear a hat or color scheme. Powerups cannot be selected.
    pub fn select_purchaseable(
        &mut self,
        section: Section,
        index: usize,
    ) -> Result<(), ProgressError> {
        let select: fn(&mut Ledger, usize) = match section {
            Section::Hats => Ledger::set_selected_hat,
            Section::ColorScheme => Ledger::set_selected_color,
            Section::Powerups => {
                return Err(ProgressError::InvalidSection {
                    section,
                    operation: "select",
                })
            }
        };
        if !self.catalog.entry(section, index)?.is_unlocked() {
            return Err(ProgressError::NotUnlocked { section, index });
        }
        select(&mut self.ledger, index);
        debug!("Selected {} entry {}", section, index);
        Ok(())
    }

    pub fn is_purchaseable_unlocked(
        &self,
        section: Section,
        index: usize,
    ) -> Result<bool, ProgressError> {
        Ok(self.catalog.entry(section, index)?.is_unlocked())
    }

    pub fn purchaseable_price(&self, section: Section, index: usize) -> Result<u32, ProgressError> {
        Ok(self.catalog.entry(section, index)?.price())
    }

    pub fn purchaseable_name(&self, section: Section, index: usize) -> Result<&str, ProgressError> {
        Ok(self.catalog.entry(section, index)?.name())
    }

    /// Current powerup level.
    pub fn current_level(&self, index: usize) -> Result<u8, ProgressError> {
        Ok(self.catalog.entry(Section::Powerups, index)?.current_level())
    }

    pub fn max_level(&self, index: usize) -> Result<u8, ProgressError> {
        Ok(self.catalog.entry(Section::Powerups, index)?.max_level())
    }

    /// Powerups with at least one level bought, with their indices.
    pub fn unlocked_powerups(&self) -> impl Iterator<Item = (usize, &CatalogEntry)> {
        self.catalog
            .section(Section::Powerups)
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.is_unlocked())
    }

    /// True when the balance covers any entry that can still be bought.
    ///
    /// The free default at index 0 of hats and color schemes is skipped.
    pub fn is_something_purchaseable(&self) -> bool {
        let balance = self.ledger.total_score();
        Section::ALL.iter().any(|&section| {
            let skip = usize::from(section.is_wearable());
            self.catalog
                .section(section)
                .iter()
                .skip(skip)
                .any(|entry| entry.price() <= balance && !entry.is_fully_owned())
        })
    }

    /// Color for `channel` from the currently worn color scheme.
    pub fn color_by_channel(&self, channel: ColorChannel) -> Result<Color, ProgressError> {
        self.color_by_index(self.ledger.selected_color(), channel)
    }

    /// Color for `channel` from an explicit color scheme (e.g. shop previews).
    pub fn color_by_index(
        &self,
        index: usize,
        channel: ColorChannel,
    ) -> Result<Color, ProgressError> {
        let entry = self.catalog.entry(Section::ColorScheme, index)?;
        entry
            .palette()
            .map(|palette| palette.channel(channel))
            .ok_or_else(|| {
                ProgressError::InvalidCatalog(format!("color scheme {} has no palette", index))
            })
    }

    /// Bank a finished run: adds `score` to the balance and raises the
    /// highscore when beaten. Returns true on a new highscore.
    pub fn record_run(&mut self, score: u32) -> bool {
        self.ledger.credit(score);
        let new_highscore = score.min(MAX_HIGHSCORE) > self.ledger.highscore();
        if new_highscore {
            self.ledger.set_highscore(score);
        }
        info!(
            "Run finished with {} points (balance {}, highscore {}{})",
            score,
            self.ledger.total_score(),
            self.ledger.highscore(),
            if new_highscore { ", new best" } else { "" }
        );
        new_highscore
    }
}

/// Format a section listing for terminal output.
pub fn format_section_listing(progress: &Progress, section: Section) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!("=== {} ===", section));

    let selected = match section {
        Section::Hats => Some(progress.selected_hat()),
        Section::ColorScheme => Some(progress.selected_color()),
        Section::Powerups => None,
    };

    for (idx, entry) in progress.catalog().section(section).iter().enumerate() {
        let status = match section {
            Section::Powerups => format!("lvl {}/{}", entry.current_level(), entry.max_level()),
            _ if selected == Some(idx) => "worn".to_string(),
            _ if entry.is_unlocked() => "owned".to_string(),
            _ => "locked".to_string(),
        };
        let price = if entry.is_fully_owned() {
            "-".to_string()
        } else {
            entry.price().to_string()
        };
        lines.push(format!("{}. {} [{}] {}", idx, entry.name(), status, price));
    }

    lines
}
