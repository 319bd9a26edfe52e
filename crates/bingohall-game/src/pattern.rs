//! Win patterns and the evaluator.
//!
//! A pattern is a set of grid indices that must all be satisfied (marked
//! or free) for a card to win. A round configures one or more patterns;
//! completing any one of them counts.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::card::{BingoCell, CELLS_PER_CARD, GRID_SIZE};
use crate::error::GameError;

// ---------------------------------------------------------------------------
// WinPattern
// ---------------------------------------------------------------------------

/// A non-empty set of cell indices (0..=24) over the 5x5 grid.
///
/// The constructor enforces non-emptiness and range; a value built through
/// [`WinPattern::new`] is always valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WinPattern(BTreeSet<u8>);

impl WinPattern {
    /// Builds a pattern from cell indices, rejecting an empty set and any
    /// index outside the grid.
    pub fn new(
        indices: impl IntoIterator<Item = u8>,
    ) -> Result<Self, GameError> {
        let set: BTreeSet<u8> = indices.into_iter().collect();
        if set.is_empty() {
            return Err(GameError::EmptyPattern);
        }
        if let Some(&bad) = set.iter().find(|&&i| i as usize >= CELLS_PER_CARD)
        {
            return Err(GameError::IndexOutOfRange(bad));
        }
        Ok(Self(set))
    }

    /// The cell indices this pattern requires.
    pub fn indices(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.iter().copied()
    }

    /// True when every required index is flagged satisfied.
    pub fn satisfied_by(&self, flags: &[bool]) -> bool {
        self.0
            .iter()
            .all(|&i| flags.get(i as usize).copied().unwrap_or(false))
    }
}

// ---------------------------------------------------------------------------
// Presets
// ---------------------------------------------------------------------------

/// The configured winning rule for a round, expanded into index-sets by
/// [`PatternPreset::patterns`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatternPreset {
    /// Any full row, column, or diagonal: 12 patterns.
    AnyLine,
    /// All 25 cells.
    Blackout,
    /// Both diagonals: indices {0, 4, 6, 8, 12, 16, 18, 20, 24}.
    LetterX,
    /// The four corner cells: {0, 4, 20, 24}.
    FourCorners,
    /// A host-chosen index subset. Must be non-empty.
    Custom(Vec<u8>),
}

impl PatternPreset {
    /// Expands the preset into concrete patterns.
    ///
    /// # Errors
    /// `Custom` with an empty or out-of-range subset is rejected; the
    /// built-in presets cannot fail.
    pub fn patterns(&self) -> Result<Vec<WinPattern>, GameError> {
        match self {
            Self::AnyLine => {
                let mut out = Vec::with_capacity(12);
                for r in 0..GRID_SIZE as u8 {
                    out.push(WinPattern::new(
                        (0..GRID_SIZE as u8).map(|c| r * 5 + c),
                    )?);
                }
                for c in 0..GRID_SIZE as u8 {
                    out.push(WinPattern::new(
                        (0..GRID_SIZE as u8).map(|r| r * 5 + c),
                    )?);
                }
                out.push(WinPattern::new((0..GRID_SIZE as u8).map(|i| i * 6))?);
                out.push(WinPattern::new(
                    (0..GRID_SIZE as u8).map(|i| (i + 1) * 4),
                )?);
                Ok(out)
            }
            Self::Blackout => {
                Ok(vec![WinPattern::new(0..CELLS_PER_CARD as u8)?])
            }
            Self::LetterX => Ok(vec![WinPattern::new([
                0, 4, 6, 8, 12, 16, 18, 20, 24,
            ])?]),
            Self::FourCorners => {
                Ok(vec![WinPattern::new([0, 4, 20, 24])?])
            }
            Self::Custom(indices) => {
                Ok(vec![WinPattern::new(indices.iter().copied())?])
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// True iff at least one pattern is fully satisfied by the cells as they
/// currently stand (marked or free).
pub fn evaluate(cells: &[BingoCell], patterns: &[WinPattern]) -> bool {
    let mut flags = [false; CELLS_PER_CARD];
    for cell in cells {
        if let Some(slot) = flags.get_mut(cell.index as usize) {
            *slot = cell.is_satisfied();
        }
    }
    evaluate_flags(&flags, patterns)
}

/// Evaluates against precomputed satisfied flags. Used by the host when
/// the flags come from the called-items history rather than cell marks.
pub fn evaluate_flags(flags: &[bool], patterns: &[WinPattern]) -> bool {
    patterns.iter().any(|p| p.satisfied_by(flags))
}

// =========================================================================
// Tests
// =========================================================================
