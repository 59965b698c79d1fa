pub mod detector {
    use crate::{
        detector_params::DetectorParams,
        types::{SenderKey, TrackedMessage},
    };

    #[derive(Debug, Clone)]
    pub enum IncMessage {
        Close,
        CheckMessage(TrackedMessage),
        UpdateParams(DetectorParams),
    }

    #[derive(Debug)]
    pub enum OutMessage {
        SpamDetected(DetectorDecision),
        ActionFailed { key: SenderKey, error: String },
        Closed,
    }

    #[derive(Debug)]
    pub struct DetectorDecision {
        pub key: SenderKey,
        pub timestamp: i64,
        pub decision: Decision,
    }

    impl DetectorDecision {
        pub fn new(key: SenderKey, decision: Decision) -> Self {
            Self {
                key,
                timestamp: chrono::Utc::now().timestamp(),
                decision,
            }
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Decision {
        Clean,
        Flood { deleted: usize },
        Repetition { deleted: usize },
    }

    impl Decision {
        pub fn is_spam(&self) -> bool {
            !matches!(self, Decision::Clean)
        }
    }
}
