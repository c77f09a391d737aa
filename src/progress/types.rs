use log::warn;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::progress::errors::ProgressError;

/// Width of the zero-padded highscore field in the save string.
pub const HIGHSCORE_WIDTH: usize = 3;
/// Width of the zero-padded total score field in the save string.
pub const TOTAL_SCORE_WIDTH: usize = 5;
pub const MAX_HIGHSCORE: u32 = 999;
pub const MAX_TOTAL_SCORE: u32 = 99_999;
/// Indices are written as a single decimal digit.
pub const MAX_SECTION_ENTRIES: usize = 10;
/// Powerup levels are written as a single decimal digit.
pub const MAX_POWERUP_LEVEL: u8 = 9;
pub const MAX_NAME_LEN: usize = 24;

/// One of the three purchasable catalogs.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Hats,
    ColorScheme,
    Powerups,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Hats, Section::ColorScheme, Section::Powerups];

    /// Record tag used by the save string.
    pub fn tag(self) -> u8 {
        match self {
            Section::Hats => b'H',
            Section::ColorScheme => b'C',
            Section::Powerups => b'P',
        }
    }

    /// Hats and color schemes are worn and selected; powerups are only leveled.
    pub fn is_wearable(self) -> bool {
        !matches!(self, Section::Powerups)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Section::Hats => "hats",
            Section::ColorScheme => "color schemes",
            Section::Powerups => "powerups",
        };
        f.write_str(label)
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "h" | "hat" | "hats" => Ok(Section::Hats),
            "c" | "color" | "colors" | "colour" | "colours" | "color_scheme" | "color-scheme" => {
                Ok(Section::ColorScheme)
            }
            "p" | "powerup" | "powerups" => Ok(Section::Powerups),
            other => Err(format!("unknown section '{}' (expected hats, colors or powerups)", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Semantic slot a color scheme provides a color for.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ColorChannel {
    Body,
    Accent,
    Background,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ColorScheme {
    pub body: Color,
    pub accent: Color,
    pub background: Color,
}

impl ColorScheme {
    pub fn channel(&self, channel: ColorChannel) -> Color {
        match channel {
            ColorChannel::Body => self.body,
            ColorChannel::Accent => self.accent,
            ColorChannel::Background => self.background,
        }
    }
}

/// Ownership state of an entry. Hats and color schemes toggle; powerups level up.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryState {
    Toggle { unlocked: bool },
    Leveled { current_level: u8, max_level: u8 },
}

/// One purchasable item.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CatalogEntry {
    name: String,
    price: u32,
    state: EntryState,
    #[serde(skip_serializing_if = "Option::is_none")]
    palette: Option<ColorScheme>,
}

impl CatalogEntry {
    /// A locked hat.
    pub fn hat(name: impl Into<String>, price: u32) -> Self {
        Self {
            name: name.into(),
            price,
            state: EntryState::Toggle { unlocked: false },
            palette: None,
        }
    }

    /// A locked color scheme.
    pub fn color_scheme(name: impl Into<String>, price: u32, palette: ColorScheme) -> Self {
        Self {
            name: name.into(),
            price,
            state: EntryState::Toggle { unlocked: false },
            palette: Some(palette),
        }
    }

    /// A powerup at level 0. Each purchase raises the level by one.
    pub fn powerup(name: impl Into<String>, price: u32, max_level: u8) -> Self {
        Self {
            name: name.into(),
            price,
            state: EntryState::Leveled {
                current_level: 0,
                max_level,
            },
            palette: None,
        }
    }

    /// Mark the entry as owned from the start (free defaults).
    pub fn with_unlocked(mut self) -> Self {
        self.set_unlocked(true);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> u32 {
        self.price
    }

    pub fn state(&self) -> EntryState {
        self.state
    }

    pub fn palette(&self) -> Option<&ColorScheme> {
        self.palette.as_ref()
    }

    /// Apply one purchase: toggles become unlocked, powerups gain a level (capped at max).
    pub fn unlock(&mut self) {
        match &mut self.state {
            EntryState::Toggle { unlocked } => *unlocked = true,
            EntryState::Leveled {
                current_level,
                max_level,
            } => {
                if *current_level < *max_level {
                    *current_level += 1;
                }
            }
        }
    }

    /// Owned at all. For powerups this means at least one level bought.
    pub fn is_unlocked(&self) -> bool {
        match self.state {
            EntryState::Toggle { unlocked } => unlocked,
            EntryState::Leveled { current_level, .. } => current_level > 0,
        }
    }

    /// Nothing left to buy: unlocked toggle, or powerup at max level.
    pub fn is_fully_owned(&self) -> bool {
        match self.state {
            EntryState::Toggle { unlocked } => unlocked,
            EntryState::Leveled {
                current_level,
                max_level,
            } => current_level >= max_level,
        }
    }

    /// For powerups, `true` raises level 0 to 1 and `false` resets to 0.
    pub fn set_unlocked(&mut self, value: bool) {
        match &mut self.state {
            EntryState::Toggle { unlocked } => *unlocked = value,
            EntryState::Leveled { current_level, .. } => {
                if !value {
                    *current_level = 0;
                } else if *current_level == 0 {
                    *current_level = 1;
                }
            }
        }
    }

    /// Toggles report 0 or 1.
    pub fn current_level(&self) -> u8 {
        match self.state {
            EntryState::Toggle { unlocked } => u8::from(unlocked),
            EntryState::Leveled { current_level, .. } => current_level,
        }
    }

    pub fn max_level(&self) -> u8 {
        match self.state {
            EntryState::Toggle { .. } => 1,
            EntryState::Leveled { max_level, .. } => max_level,
        }
    }

    pub fn set_current_level(&mut self, level: u8) -> Result<(), ProgressError> {
        let max = self.max_level();
        if level > max {
            return Err(ProgressError::LevelOutOfRange { level, max });
        }
        match &mut self.state {
            EntryState::Toggle { unlocked } => *unlocked = level == 1,
            EntryState::Leveled { current_level, .. } => *current_level = level,
        }
        Ok(())
    }
}

/// Scalar progress fields: scores and the worn hat / color scheme.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct Ledger {
    highscore: u32,
    total_score: u32,
    current_hat: usize,
    current_color: usize,
}

impl Ledger {
    pub fn highscore(&self) -> u32 {
        self.highscore
    }

    /// Values above the 3-digit field are saturated.
    pub fn set_highscore(&mut self, highscore: u32) {
        if highscore > MAX_HIGHSCORE {
            warn!("highscore {} exceeds {}, saturating", highscore, MAX_HIGHSCORE);
        }
        self.highscore = highscore.min(MAX_HIGHSCORE);
    }

    pub fn total_score(&self) -> u32 {
        self.total_score
    }

    /// Values above the 5-digit field are saturated.
    pub fn set_total_score(&mut self, total_score: u32) {
        if total_score > MAX_TOTAL_SCORE {
            warn!(
                "total score {} exceeds {}, saturating",
                total_score, MAX_TOTAL_SCORE
            );
        }
        self.total_score = total_score.min(MAX_TOTAL_SCORE);
    }

    pub fn selected_hat(&self) -> usize {
        self.current_hat
    }

    pub fn selected_color(&self) -> usize {
        self.current_color
    }

    // Callers bounds-check against the catalog.
    pub(crate) fn set_selected_hat(&mut self, index: usize) {
        self.current_hat = index;
    }

    pub(crate) fn set_selected_color(&mut self, index: usize) {
        self.current_color = index;
    }

    pub(crate) fn debit(&mut self, amount: u32) -> Result<(), ProgressError> {
        if amount > self.total_score {
            return Err(ProgressError::InsufficientFunds {
                price: amount,
                balance: self.total_score,
            });
        }
        self.total_score -= amount;
        Ok(())
    }

    pub(crate) fn credit(&mut self, amount: u32) {
        self.set_total_score(self.total_score.saturating_add(amount));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_entry_accessors() {
        let mut hat = CatalogEntry::hat("Top Hat", 100);
        assert!(!hat.is_unlocked());
        assert_eq!(hat.current_level(), 0);
        assert_eq!(hat.max_level(), 1);

        hat.unlock();
        assert!(hat.is_unlocked());
        assert!(hat.is_fully_owned());
        assert_eq!(hat.current_level(), 1);

        hat.set_unlocked(false);
        assert!(!hat.is_unlocked());
    }

    #[test]
    fn test_powerup_levels_cap_at_max() {
        let mut magnet = CatalogEntry::powerup("Magnet", 80, 2);
        assert!(!magnet.is_unlocked());

        magnet.unlock();
        assert!(magnet.is_unlocked());
        assert!(!magnet.is_fully_owned());

        magnet.unlock();
        magnet.unlock();
        assert_eq!(magnet.current_level(), 2);
        assert!(magnet.is_fully_owned());
    }

    #[test]
    fn test_set_current_level_rejects_above_max() {
        let mut magnet = CatalogEntry::powerup("Magnet", 80, 3);
        magnet.set_current_level(3).unwrap();
        assert_eq!(magnet.current_level(), 3);

        let err = magnet.set_current_level(4).unwrap_err();
        assert!(matches!(err, ProgressError::LevelOutOfRange { level: 4, max: 3 }));
        assert_eq!(magnet.current_level(), 3);
    }

    #[test]
    fn test_powerup_set_unlocked_maps_to_levels() {
        let mut thin = CatalogEntry::powerup("Thin", 60, 3);
        thin.set_unlocked(true);
        assert_eq!(thin.current_level(), 1);
        thin.set_current_level(3).unwrap();
        thin.set_unlocked(true);
        assert_eq!(thin.current_level(), 3);
        thin.set_unlocked(false);
        assert_eq!(thin.current_level(), 0);
    }

    #[test]
    fn test_snapshot_serialization_shape() {
        let mut magnet = CatalogEntry::powerup("Magnet", 80, 3);
        magnet.unlock();
        let value = serde_json::to_value(&magnet).unwrap();
        assert_eq!(value["state"]["kind"], "leveled");
        assert_eq!(value["state"]["current_level"], 1);
        assert!(value.get("palette").is_none());

        let mut ledger = Ledger::default();
        ledger.set_highscore(5000);
        let value = serde_json::to_value(&ledger).unwrap();
        assert_eq!(value["highscore"], MAX_HIGHSCORE);
        assert_eq!(serde_json::to_value(Section::ColorScheme).unwrap(), "color_scheme");
    }

    #[test]
    fn test_ledger_saturates_fixed_width_fields() {
        let mut ledger = Ledger::default();
        ledger.set_highscore(5000);
        ledger.set_total_score(250_000);
        assert_eq!(ledger.highscore(), MAX_HIGHSCORE);
        assert_eq!(ledger.total_score(), MAX_TOTAL_SCORE);
    }

    #[test]
    fn test_ledger_debit_never_goes_negative() {
        let mut ledger = Ledger::default();
        ledger.set_total_score(40);
        assert!(matches!(
            ledger.debit(50),
            Err(ProgressError::InsufficientFunds {
                price: 50,
                balance: 40
            })
        ));
        assert_eq!(ledger.total_score(), 40);
        ledger.debit(40).unwrap();
        assert_eq!(ledger.total_score(), 0);
    }

    #[test]
    fn test_section_parsing() {
        assert_eq!("hats".parse::<Section>().unwrap(), Section::Hats);
        assert_eq!("Color".parse::<Section>().unwrap(), Section::ColorScheme);
        assert_eq!("P".parse::<Section>().unwrap(), Section::Powerups);
        assert!("shoes".parse::<Section>().is_err());
    }
}
