use std::fmt::Debug;

/// Normalized textual similarity in `[0, 1]`.
///
/// Implementations must be symmetric: `similarity(a, b) == similarity(b, a)`.
/// The detector only compares the score against its threshold, so any
/// metric can be plugged in through `DetectorParams::with_similarity`.
pub trait Similarity: Debug + Send + Sync {
    fn similarity(&self, a: &str, b: &str) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimilarityMetric {
    /// Dice coefficient over character bigrams, whitespace ignored
    SorensenDice,
    Jaro,
}

impl Similarity for SimilarityMetric {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        match self {
            SimilarityMetric::SorensenDice => strsim::sorensen_dice(a, b),
            SimilarityMetric::Jaro => strsim::jaro(a, b),
        }
    }
}

impl Default for SimilarityMetric {
    fn default() -> Self {
        SimilarityMetric::SorensenDice
    }
}

#[allow(unused_imports)]
mod test {
    use super::*;

    fn symmetry_pairs() -> Vec<(&'static str, &'static str)> {
        vec![
            ("hello world", "hello world!"),
            ("hello world", "goodbye moon"),
            ("buy cheap gold now", "buy cheap gold n0w"),
            ("スノイムの方が良さげ", "スノイム方が良さげ"),
            ("", "something"),
        ]
    }

    #[test]
    pub fn test_sorensen_dice_is_symmetric() {
        let metric = SimilarityMetric::SorensenDice;
        for (a, b) in symmetry_pairs().iter() {
            assert_eq!(metric.similarity(a, b), metric.similarity(b, a));
        }
    }

    #[test]
    pub fn test_jaro_is_symmetric() {
        let metric = SimilarityMetric::Jaro;
        for (a, b) in symmetry_pairs().iter() {
            let forward = metric.similarity(a, b);
            let backward = metric.similarity(b, a);
            assert!((forward - backward).abs() < 1e-9, "{:?} vs {:?}", a, b);
        }
    }

    #[test]
    pub fn test_sorensen_dice_cutoff() {
        let metric = SimilarityMetric::default();

        assert_eq!(1.0, metric.similarity("hello world", "hello world"));
        assert!(metric.similarity("hello world", "hello world!") > 0.85);
        assert!(metric.similarity("hello world", "how are you doing") < 0.85);
    }

    #[test]
    pub fn test_jaro_on_near_duplicates() {
        let metric = SimilarityMetric::Jaro;

        assert_eq!(1.0, metric.similarity("buy cheap gold", "buy cheap gold"));
        assert!(metric.similarity("buy cheap gold now", "buy cheap gold n0w") > 0.85);
    }
}
