//! Save string encoding and decoding.
//!
//! The save string is a flat run of tagged records:
//!
//! ```text
//! (H<i><0|1>;)* (C<i><0|1>;)* (P<i><level>;)* S<ddd>; T<ddddd>; A<hat>; O<color>;
//! ```
//!
//! Entry indices, flags, levels and selections are one decimal digit each;
//! highscore and total score are zero-padded to fixed widths. Catalog building
//! enforces the limits that keep every variable field to one digit.
//!
//! Decoding is a byte-level state machine keyed on the tag byte. Bytes outside
//! a record (including the `;` terminators) are skipped.

use std::fmt::Write;

use log::debug;

use crate::logutil::escape_blob;
use crate::progress::errors::ProgressError;
use crate::progress::shop::Progress;
use crate::progress::types::{EntryState, Section, HIGHSCORE_WIDTH, TOTAL_SCORE_WIDTH};

const TAG_HIGHSCORE: u8 = b'S';
const TAG_TOTAL_SCORE: u8 = b'T';
const TAG_HAT: u8 = b'A';
const TAG_COLOR: u8 = b'O';

/// Render catalog + ledger as a save string.
pub fn encode(progress: &Progress) -> String {
    let catalog = progress.catalog();
    let mut out = String::with_capacity(64);

    for section in Section::ALL {
        let tag = char::from(section.tag());
        for (index, entry) in catalog.section(section).iter().enumerate() {
            // Toggles report 0/1 as their level, so one rule covers all sections.
            let _ = write!(out, "{}{}{};", tag, index, entry.current_level());
        }
    }

    let ledger = progress.ledger();
    let _ = write!(
        out,
        "{}{:0hw$};{}{:0tw$};{}{};{}{};",
        char::from(TAG_HIGHSCORE),
        ledger.highscore(),
        char::from(TAG_TOTAL_SCORE),
        ledger.total_score(),
        char::from(TAG_HAT),
        ledger.selected_hat(),
        char::from(TAG_COLOR),
        ledger.selected_color(),
        hw = HIGHSCORE_WIDTH,
        tw = TOTAL_SCORE_WIDTH,
    );

    debug!("Encoded save string: {}", escape_blob(&out));
    out
}

#[derive(Debug, Clone, Copy)]
enum Scalar {
    Highscore,
    TotalScore,
}

#[derive(Debug, Clone, Copy)]
enum Selection {
    Hat,
    Color,
}

/// Scanner state between bytes.
#[derive(Debug, Clone, Copy)]
enum Scan {
    Tag,
    EntryIndex(Section),
    EntryValue(Section, usize),
    Scalar {
        field: Scalar,
        value: u32,
        remaining: usize,
    },
    Selection(Selection),
}

impl Scan {
    fn describe(self) -> &'static str {
        match self {
            Scan::Tag => "tag",
            Scan::EntryIndex(_) => "entry index",
            Scan::EntryValue(..) => "entry value",
            Scan::Scalar {
                field: Scalar::Highscore,
                ..
            } => "highscore",
            Scan::Scalar {
                field: Scalar::TotalScore,
                ..
            } => "total score",
            Scan::Selection(Selection::Hat) => "current hat",
            Scan::Selection(Selection::Color) => "current color",
        }
    }
}

fn malformed(position: usize, reason: impl Into<String>) -> ProgressError {
    ProgressError::MalformedSaveString {
        position,
        reason: reason.into(),
    }
}

fn digit(byte: u8, position: usize, state: Scan) -> Result<u8, ProgressError> {
    if byte.is_ascii_digit() {
        Ok(byte - b'0')
    } else {
        Err(malformed(
            position,
            format!(
                "expected digit for {}, found {:?}",
                state.describe(),
                char::from(byte)
            ),
        ))
    }
}

/// Apply a save string to `progress`.
///
/// On error `progress` is left exactly as it was. Records missing from the
/// input keep their current values; a repeated record overwrites the earlier one.
///
/// The worn hat and color scheme must be owned once the whole string is
/// applied, the same rule `select_purchaseable` enforces. Index 0 is the free
/// default and is always wearable.
pub fn decode(progress: &mut Progress, input: &str) -> Result<(), ProgressError> {
    let mut staged = progress.clone();
    let mut state = Scan::Tag;
    let mut hat_at = None;
    let mut color_at = None;

    for (position, &byte) in input.as_bytes().iter().enumerate() {
        state = match state {
            Scan::Tag => match byte {
                b'H' => Scan::EntryIndex(Section::Hats),
                b'C' => Scan::EntryIndex(Section::ColorScheme),
                b'P' => Scan::EntryIndex(Section::Powerups),
                TAG_HIGHSCORE => Scan::Scalar {
                    field: Scalar::Highscore,
                    value: 0,
                    remaining: HIGHSCORE_WIDTH,
                },
                TAG_TOTAL_SCORE => Scan::Scalar {
                    field: Scalar::TotalScore,
                    value: 0,
                    remaining: TOTAL_SCORE_WIDTH,
                },
                TAG_HAT => Scan::Selection(Selection::Hat),
                TAG_COLOR => Scan::Selection(Selection::Color),
                _ => Scan::Tag,
            },
            Scan::EntryIndex(section) => {
                let index = usize::from(digit(byte, position, state)?);
                let len = staged.catalog().len(section);
                if index >= len {
                    return Err(malformed(
                        position,
                        format!("{} index {} out of range ({} entries)", section, index, len),
                    ));
                }
                Scan::EntryValue(section, index)
            }
            Scan::EntryValue(section, index) => {
                let value = digit(byte, position, state)?;
                let entry = staged.catalog_mut().entry_mut(section, index)?;
                match entry.state() {
                    EntryState::Toggle { .. } => match value {
                        0 | 1 => entry.set_unlocked(value == 1),
                        other => {
                            return Err(malformed(
                                position,
                                format!("{} flag must be 0 or 1, found {}", section, other),
                            ))
                        }
                    },
                    EntryState::Leveled { .. } => entry
                        .set_current_level(value)
                        .map_err(|e| malformed(position, format!("powerup {}: {}", index, e)))?,
                }
                Scan::Tag
            }
            Scan::Scalar {
                field,
                value,
                remaining,
            } => {
                let value = value * 10 + u32::from(digit(byte, position, state)?);
                if remaining > 1 {
                    Scan::Scalar {
                        field,
                        value,
                        remaining: remaining - 1,
                    }
                } else {
                    match field {
                        Scalar::Highscore => staged.set_highscore(value),
                        Scalar::TotalScore => staged.set_total_score(value),
                    }
                    Scan::Tag
                }
            }
            Scan::Selection(which) => {
                let index = usize::from(digit(byte, position, state)?);
                let section = match which {
                    Selection::Hat => Section::Hats,
                    Selection::Color => Section::ColorScheme,
                };
                let len = staged.catalog().len(section);
                if index >= len {
                    return Err(malformed(
                        position,
                        format!("selected {} index {} out of range ({} entries)", section, index, len),
                    ));
                }
                match which {
                    Selection::Hat => {
                        staged.ledger_mut().set_selected_hat(index);
                        hat_at = Some(position);
                    }
                    Selection::Color => {
                        staged.ledger_mut().set_selected_color(index);
                        color_at = Some(position);
                    }
                }
                Scan::Tag
            }
        };
    }

    if !matches!(state, Scan::Tag) {
        return Err(malformed(
            input.len(),
            format!("input ended inside {} field", state.describe()),
        ));
    }

    let worn = [
        (Section::Hats, staged.selected_hat(), hat_at),
        (Section::ColorScheme, staged.selected_color(), color_at),
    ];
    for (section, index, at) in worn {
        if index != 0 && !staged.catalog().entry(section, index)?.is_unlocked() {
            return Err(malformed(
                at.unwrap_or(input.len()),
                format!("worn {} entry {} is not unlocked", section, index),
            ));
        }
    }

    debug!("Decoded save string: {}", escape_blob(input));
    *progress = staged;
    Ok(())
}

impl Progress {
    /// See [`encode`].
    pub fn encode(&self) -> String {
        encode(self)
    }

    /// See [`decode`].
    pub fn decode(&mut self, input: &str) -> Result<(), ProgressError> {
        decode(self, input)
    }
}
