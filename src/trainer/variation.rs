// Rhythmic variation - Duration multipliers for uneven practice rhythms
//
// The dotted-rhythm practice method: notes play at unequal relative
// durations while the underlying beat stays constant. Pure lookup aside
// from the single selector.

use crate::metronome::PATTERN_BEATS;

/// Relative-duration shape applied to the 4 notes of a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum RhythmVariation {
    /// Straight: every note the same length
    #[default]
    Even,
    /// Dotted: long-short pairs
    LongShort,
    /// Reverse dotted: short-long pairs
    ShortLong,
}

/// Supplies duration multipliers for the current variation
#[derive(Debug, Clone, Copy, Default)]
pub struct VariationGenerator {
    variation: RhythmVariation,
}

impl VariationGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Multipliers for the 4 notes of the pattern under the current
    /// variation. LongShort and ShortLong are element-wise inverses.
    pub fn duration_multipliers(&self) -> [f64; PATTERN_BEATS] {
        match self.variation {
            RhythmVariation::Even => [1.0, 1.0, 1.0, 1.0],
            RhythmVariation::LongShort => [1.5, 0.5, 1.5, 0.5],
            RhythmVariation::ShortLong => [0.5, 1.5, 0.5, 1.5],
        }
    }

    pub fn variation(&self) -> RhythmVariation {
        self.variation
    }

    pub fn set_variation(&mut self, variation: RhythmVariation) {
        self.variation = variation;
    }

    /// Cycle Even → LongShort → ShortLong → Even, returning the new value
    pub fn next_variation(&mut self) -> RhythmVariation {
        self.variation = match self.variation {
            RhythmVariation::Even => RhythmVariation::LongShort,
            RhythmVariation::LongShort => RhythmVariation::ShortLong,
            RhythmVariation::ShortLong => RhythmVariation::Even,
        };
        self.variation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multipliers_per_variation() {
        let mut generator = VariationGenerator::new();
        assert_eq!(generator.duration_multipliers(), [1.0, 1.0, 1.0, 1.0]);

        generator.set_variation(RhythmVariation::LongShort);
        assert_eq!(generator.duration_multipliers(), [1.5, 0.5, 1.5, 0.5]);

        generator.set_variation(RhythmVariation::ShortLong);
        assert_eq!(generator.duration_multipliers(), [0.5, 1.5, 0.5, 1.5]);
    }

    #[test]
    fn test_full_cycle_returns_to_even() {
        let mut generator = VariationGenerator::new();
        assert_eq!(generator.variation(), RhythmVariation::Even);

        assert_eq!(generator.next_variation(), RhythmVariation::LongShort);
        assert_eq!(generator.next_variation(), RhythmVariation::ShortLong);
        assert_eq!(generator.next_variation(), RhythmVariation::Even);
    }

    #[test]
    fn test_uneven_shapes_are_elementwise_inverse() {
        let mut long_short = VariationGenerator::new();
        long_short.set_variation(RhythmVariation::LongShort);
        let mut short_long = VariationGenerator::new();
        short_long.set_variation(RhythmVariation::ShortLong);

        let a = long_short.duration_multipliers();
        let b = short_long.duration_multipliers();
        for (x, y) in a.iter().zip(b.iter()) {
            // 1.5 and 0.5 swap positions; each pair still sums to a full
            // two-note span
            assert_eq!(x + y, 2.0);
            assert_ne!(x, y);
        }
    }

    #[test]
    fn test_multipliers_preserve_total_duration() {
        for variation in [
            RhythmVariation::Even,
            RhythmVariation::LongShort,
            RhythmVariation::ShortLong,
        ] {
            let mut generator = VariationGenerator::new();
            generator.set_variation(variation);
            let total: f64 = generator.duration_multipliers().iter().sum();
            assert_eq!(total, 4.0);
        }
    }
}
