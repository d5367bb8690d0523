// Click configuration value types
// Subdivision, per-beat dynamics, and the 4-symbol beat pattern

use std::fmt;

use super::{MetronomeError, PATTERN_BEATS};

/// Clicks-per-beat subdivision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum Subdivision {
    /// One click per beat
    #[default]
    Quarter,
    /// Two clicks per beat
    Eighth,
    /// Four clicks per beat
    Sixteenth,
    /// Three clicks per beat
    Triplet,
}

impl Subdivision {
    /// Number of clicks making up one beat at this subdivision
    pub fn clicks_per_beat(&self) -> u32 {
        match self {
            Subdivision::Quarter => 1,
            Subdivision::Eighth => 2,
            Subdivision::Sixteenth => 4,
            Subdivision::Triplet => 3,
        }
    }
}

impl fmt::Display for Subdivision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Subdivision::Quarter => "quarter",
            Subdivision::Eighth => "eighth",
            Subdivision::Sixteenth => "sixteenth",
            Subdivision::Triplet => "triplet",
        };
        write!(f, "{name}")
    }
}

/// Dynamic tier assigned to one beat position.
/// Each tier maps to a fixed (frequency, gain) pair; every click within a
/// beat inherits that beat's dynamic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum DynamicLevel {
    Loud,
    #[default]
    Normal,
    Soft,
}

impl DynamicLevel {
    /// Click tone for this dynamic: (frequency in Hz, linear gain)
    pub fn click_tone(&self) -> (f32, f32) {
        match self {
            DynamicLevel::Loud => (1200.0, 0.6),
            DynamicLevel::Normal => (800.0, 0.4),
            DynamicLevel::Soft => (500.0, 0.25),
        }
    }
}

/// A cyclic 4-beat pattern of symbolic note markers (values 1-3).
/// The symbols are opaque to the scheduler; they are read at each beat
/// boundary and reported to beat listeners for the UI to interpret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Pattern {
    symbols: [u8; PATTERN_BEATS],
}

impl Pattern {
    /// Build a pattern from exactly 4 symbols in 1..=3
    pub fn from_slice(symbols: &[u8]) -> Result<Self, MetronomeError> {
        if symbols.len() != PATTERN_BEATS {
            return Err(MetronomeError::PatternLength(symbols.len()));
        }
        let mut fixed = [0u8; PATTERN_BEATS];
        for (slot, &symbol) in fixed.iter_mut().zip(symbols) {
            if !(1..=3).contains(&symbol) {
                return Err(MetronomeError::PatternSymbol(symbol));
            }
            *slot = symbol;
        }
        Ok(Self { symbols: fixed })
    }

    /// Symbol at a beat position (0-3)
    pub fn symbol(&self, beat: usize) -> u8 {
        self.symbols[beat % PATTERN_BEATS]
    }

    pub fn symbols(&self) -> &[u8; PATTERN_BEATS] {
        &self.symbols
    }
}

impl Default for Pattern {
    fn default() -> Self {
        Self {
            symbols: [1; PATTERN_BEATS],
        }
    }
}

/// Dynamic levels for the 4 beat positions of the pattern cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BeatDynamics {
    levels: [DynamicLevel; PATTERN_BEATS],
}

impl BeatDynamics {
    /// Build from exactly 4 dynamic levels
    pub fn from_slice(levels: &[DynamicLevel]) -> Result<Self, MetronomeError> {
        if levels.len() != PATTERN_BEATS {
            return Err(MetronomeError::DynamicsLength(levels.len()));
        }
        let mut fixed = [DynamicLevel::Normal; PATTERN_BEATS];
        fixed.copy_from_slice(levels);
        Ok(Self { levels: fixed })
    }

    /// Dynamic at a beat position (0-3)
    pub fn level(&self, beat: usize) -> DynamicLevel {
        self.levels[beat % PATTERN_BEATS]
    }
}

impl Default for BeatDynamics {
    fn default() -> Self {
        // Accented downbeat, the conventional 4/4 click
        Self {
            levels: [
                DynamicLevel::Loud,
                DynamicLevel::Normal,
                DynamicLevel::Normal,
                DynamicLevel::Normal,
            ],
        }
    }
}
