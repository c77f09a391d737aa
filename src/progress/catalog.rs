//! Catalog of hats, color schemes and powerups, plus the shipped default set.
//!
//! Entry counts are fixed when the catalog is built; entries are mutated in
//! place afterwards but never added or removed. Building a catalog checks the
//! limits the save format depends on (at most ten entries per section, powerup
//! levels up to nine, printable names).

use serde::Serialize;

use crate::progress::errors::ProgressError;
use crate::progress::types::{
    CatalogEntry, Color, ColorScheme, EntryState, Section, MAX_NAME_LEN, MAX_POWERUP_LEVEL,
    MAX_SECTION_ENTRIES,
};

/// Supplies the default entries a fresh catalog starts from.
pub trait CatalogProvider {
    fn default_hats(&self) -> Vec<CatalogEntry>;
    fn default_colors(&self) -> Vec<CatalogEntry>;
    fn default_powerups(&self) -> Vec<CatalogEntry>;
}

/// The catalog shipped with the game.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardCatalog;

impl CatalogProvider for StandardCatalog {
    fn default_hats(&self) -> Vec<CatalogEntry> {
        vec![
            CatalogEntry::hat("Default", 0).with_unlocked(),
            CatalogEntry::hat("Top Hat", 100),
            CatalogEntry::hat("Party Hat", 150),
            CatalogEntry::hat("Crown", 300),
            CatalogEntry::hat("Viking Helmet", 450),
            CatalogEntry::hat("Wizard Hat", 600),
        ]
    }

    fn default_colors(&self) -> Vec<CatalogEntry> {
        vec![
            CatalogEntry::color_scheme(
                "Classic",
                0,
                ColorScheme {
                    body: Color::rgb(0x4c, 0xaf, 0x50),
                    accent: Color::rgb(0x2e, 0x7d, 0x32),
                    background: Color::rgb(0xf1, 0xf8, 0xe9),
                },
            )
            .with_unlocked(),
            CatalogEntry::color_scheme(
                "Ocean",
                120,
                ColorScheme {
                    body: Color::rgb(0x03, 0xa9, 0xf4),
                    accent: Color::rgb(0x01, 0x57, 0x9b),
                    background: Color::rgb(0xe1, 0xf5, 0xfe),
                },
            ),
            CatalogEntry::color_scheme(
                "Lava",
                200,
                ColorScheme {
                    body: Color::rgb(0xff, 0x57, 0x22),
                    accent: Color::rgb(0xbf, 0x36, 0x0c),
                    background: Color::rgb(0x26, 0x19, 0x15),
                },
            ),
            CatalogEntry::color_scheme(
                "Forest",
                250,
                ColorScheme {
                    body: Color::rgb(0x33, 0x69, 0x1e),
                    accent: Color::rgb(0x8d, 0x6e, 0x63),
                    background: Color::rgb(0xdc, 0xed, 0xc8),
                },
            ),
            CatalogEntry::color_scheme(
                "Neon",
                400,
                ColorScheme {
                    body: Color::rgb(0xe9, 0x1e, 0x63),
                    accent: Color::rgb(0x00, 0xe5, 0xff),
                    background: Color::rgb(0x12, 0x12, 0x12),
                },
            ),
            CatalogEntry::color_scheme(
                "Gold",
                750,
                ColorScheme {
                    body: Color::rgb(0xff, 0xc1, 0x07),
                    accent: Color::rgb(0xff, 0x8f, 0x00),
                    background: Color::rgb(0x3e, 0x27, 0x23),
                },
            ),
        ]
    }

    fn default_powerups(&self) -> Vec<CatalogEntry> {
        vec![
            CatalogEntry::powerup("Magnet", 80, 3),
            CatalogEntry::powerup("Thin", 60, 3),
            CatalogEntry::powerup("Invincibility", 150, 3),
        ]
    }
}

/// Three ordered sequences of entries, addressed by section + index.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Catalog {
    hats: Vec<CatalogEntry>,
    colors: Vec<CatalogEntry>,
    powerups: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(
        hats: Vec<CatalogEntry>,
        colors: Vec<CatalogEntry>,
        powerups: Vec<CatalogEntry>,
    ) -> Result<Self, ProgressError> {
        let catalog = Self {
            hats,
            colors,
            powerups,
        };
        for section in Section::ALL {
            catalog.validate_section(section)?;
        }
        Ok(catalog)
    }

    pub fn from_provider(provider: &impl CatalogProvider) -> Result<Self, ProgressError> {
        Self::new(
            provider.default_hats(),
            provider.default_colors(),
            provider.default_powerups(),
        )
    }

    pub fn section(&self, section: Section) -> &[CatalogEntry] {
        match section {
            Section::Hats => &self.hats,
            Section::ColorScheme => &self.colors,
            Section::Powerups => &self.powerups,
        }
    }

    // A slice keeps the entry count fixed.
    fn section_mut(&mut self, section: Section) -> &mut [CatalogEntry] {
        match section {
            Section::Hats => &mut self.hats,
            Section::ColorScheme => &mut self.colors,
            Section::Powerups => &mut self.powerups,
        }
    }

    pub fn len(&self, section: Section) -> usize {
        self.section(section).len()
    }

    pub fn entry(&self, section: Section, index: usize) -> Result<&CatalogEntry, ProgressError> {
        let entries = self.section(section);
        entries.get(index).ok_or(ProgressError::InvalidIndex {
            section,
            index,
            len: entries.len(),
        })
    }

    pub fn entry_mut(
        &mut self,
        section: Section,
        index: usize,
    ) -> Result<&mut CatalogEntry, ProgressError> {
        let entries = self.section_mut(section);
        let len = entries.len();
        entries
            .get_mut(index)
            .ok_or(ProgressError::InvalidIndex {
                section,
                index,
                len,
            })
    }

    fn validate_section(&self, section: Section) -> Result<(), ProgressError> {
        let entries = self.section(section);
        if entries.is_empty() {
            return Err(ProgressError::InvalidCatalog(format!(
                "{} must contain at least one entry",
                section
            )));
        }
        if entries.len() > MAX_SECTION_ENTRIES {
            return Err(ProgressError::InvalidCatalog(format!(
                "{} has {} entries (max {})",
                section,
                entries.len(),
                MAX_SECTION_ENTRIES
            )));
        }

        for (index, entry) in entries.iter().enumerate() {
            validate_entry_name(entry.name()).map_err(|reason| {
                ProgressError::InvalidCatalog(format!("{} entry {}: {}", section, index, reason))
            })?;

            match (section, entry.state()) {
                (Section::Powerups, EntryState::Leveled { max_level, current_level }) => {
                    if max_level == 0 || max_level > MAX_POWERUP_LEVEL {
                        return Err(ProgressError::InvalidCatalog(format!(
                            "powerup {} max level {} outside 1..={}",
                            index, max_level, MAX_POWERUP_LEVEL
                        )));
                    }
                    if current_level > max_level {
                        return Err(ProgressError::InvalidCatalog(format!(
                            "powerup {} starts above its max level",
                            index
                        )));
                    }
                }
                (Section::Hats | Section::ColorScheme, EntryState::Toggle { .. }) => {}
                _ => {
                    return Err(ProgressError::InvalidCatalog(format!(
                        "{} entry {} has the wrong kind of state",
                        section, index
                    )));
                }
            }

            if section == Section::ColorScheme && entry.palette().is_none() {
                return Err(ProgressError::InvalidCatalog(format!(
                    "color scheme {} has no palette",
                    index
                )));
            }
        }
        Ok(())
    }
}

/// Entry names are short, trimmed and free of control characters.
pub fn validate_entry_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("name is empty".to_string());
    }
    if name.trim() != name {
        return Err("name has leading or trailing whitespace".to_string());
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(format!("name longer than {} characters", MAX_NAME_LEN));
    }
    if name.chars().any(|c| c.is_control()) {
        return Err("name contains control characters".to_string());
    }
    Ok(())
}
