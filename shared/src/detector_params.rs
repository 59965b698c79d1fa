use std::{sync::Arc, time::Duration};

use crate::similarity::{Similarity, SimilarityMetric};

/// Which tracked message an elapsed expiry timer removes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExpiryPolicy {
    /// The message that scheduled the timer, if it's still tracked
    ByIdentity,
    /// Whatever message is at the front of the window, regardless of which
    /// message scheduled the timer. After spam deletions this can evict
    /// a newer message than the one whose timer elapsed.
    OldestFirst,
}

#[derive(Debug, Clone)]
pub struct DetectorParams {
    flood_message_threshold: usize,
    similar_message_threshold: usize,
    similarity_threshold: f64,
    retention: Duration,
    warning_lifetime: Duration,
    expiry_policy: ExpiryPolicy,
    similarity: Arc<dyn Similarity>,
}

impl DetectorParams {
    pub fn new(
        flood_message_threshold: usize,
        similar_message_threshold: usize,
        similarity_threshold: f64,
        retention: Duration,
        warning_lifetime: Duration,
        expiry_policy: ExpiryPolicy,
        similarity: Arc<dyn Similarity>,
    ) -> Self {
        Self {
            flood_message_threshold,
            similar_message_threshold,
            similarity_threshold,
            retention,
            warning_lifetime,
            expiry_policy,
            similarity,
        }
    }

    pub fn is_flood(&self, message_count: usize) -> bool {
        message_count >= self.flood_message_threshold
    }

    pub fn are_messages_similar(&self, message_1: &str, message_2: &str) -> bool {
        self.similarity.similarity(message_1, message_2) > self.similarity_threshold
    }

    pub fn too_many_similar_messages(&self, similar_messages_count: usize) -> bool {
        similar_messages_count >= self.similar_message_threshold
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }

    pub fn warning_lifetime(&self) -> Duration {
        self.warning_lifetime
    }

    pub fn expiry_policy(&self) -> ExpiryPolicy {
        self.expiry_policy
    }

    pub fn with_expiry_policy(mut self, expiry_policy: ExpiryPolicy) -> Self {
        self.expiry_policy = expiry_policy;
        self
    }

    pub fn with_similarity(mut self, similarity: Arc<dyn Similarity>) -> Self {
        self.similarity = similarity;
        self
    }
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            flood_message_threshold: 5,
            similar_message_threshold: 2,
            similarity_threshold: 0.85,
            retention: Duration::from_secs(30),
            warning_lifetime: Duration::from_secs(3),
            expiry_policy: ExpiryPolicy::ByIdentity,
            similarity: Arc::new(SimilarityMetric::SorensenDice),
        }
    }
}

#[allow(unused_imports)]
mod test {
    use super::*;

    #[test]
    pub fn test_default_thresholds() {
        let params = DetectorParams::default();

        assert!(!params.is_flood(4));
        assert!(params.is_flood(5));
        assert!(!params.too_many_similar_messages(1));
        assert!(params.too_many_similar_messages(2));
        assert_eq!(Duration::from_secs(30), params.retention());
        assert_eq!(Duration::from_secs(3), params.warning_lifetime());
        assert_eq!(ExpiryPolicy::ByIdentity, params.expiry_policy());
    }

    #[test]
    pub fn test_similarity_cutoff_is_exclusive() {
        struct TestCase {
            threshold: f64,
            expected: bool,
        }

        // Identical strings score exactly 1.0
        let test_cases = vec![
            TestCase { threshold: 0.85, expected: true },
            TestCase { threshold: 0.99, expected: true },
            TestCase { threshold: 1.0, expected: false },
        ];

        for test_case in test_cases {
            let params = DetectorParams::new(
                5,
                2,
                test_case.threshold,
                Duration::from_secs(30),
                Duration::from_secs(3),
                ExpiryPolicy::ByIdentity,
                Arc::new(SimilarityMetric::SorensenDice),
            );

            assert_eq!(
                test_case.expected,
                params.are_messages_similar("hello world", "hello world")
            );
        }
    }

    #[derive(Debug)]
    struct FixedScore(f64);

    impl Similarity for FixedScore {
        fn similarity(&self, _a: &str, _b: &str) -> f64 {
            self.0
        }
    }

    #[test]
    pub fn test_injected_similarity_is_used() {
        let lenient = DetectorParams::default().with_similarity(Arc::new(FixedScore(0.9)));
        let strict = DetectorParams::default().with_similarity(Arc::new(FixedScore(0.1)));

        assert!(lenient.are_messages_similar("hello", "completely different"));
        assert!(!strict.are_messages_similar("hello", "hello"));
    }
}
