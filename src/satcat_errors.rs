use thiserror::Error;

#[derive(Error, Debug)]
pub enum SatcatError {
    #[error("Invalid catalog source: {0}")]
    InvalidSource(String),

    #[error("Unable to fetch catalog source {location}: {reason}")]
    SourceFetch { location: String, reason: String },

    #[error("Malformed orbit element record: {0}")]
    ParseError(String),

    #[error("Elements failed trial propagation: {0}")]
    PropagationInit(String),

    #[error("Propagation failed: {0}")]
    PropagationRuntime(String),

    #[error("Invalid shard count: {0} (must be at least 1)")]
    InvalidShardCount(usize),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP reqwest error: {0}")]
    ReqwestError(#[from] reqwest::Error),
}

impl SatcatError {
    /// Build a batch-fatal fetch error for the given source location.
    pub(crate) fn fetch(location: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        SatcatError::SourceFetch {
            location: location.into(),
            reason: reason.to_string(),
        }
    }
}

impl PartialEq for SatcatError {
    fn eq(&self, other: &Self) -> bool {
        use SatcatError::*;
        match (self, other) {
            (InvalidSource(a), InvalidSource(b)) => a == b,
            (
                SourceFetch {
                    location: la,
                    reason: ra,
                },
                SourceFetch {
                    location: lb,
                    reason: rb,
                },
            ) => la == lb && ra == rb,
            (ParseError(a), ParseError(b)) => a == b,
            (PropagationInit(a), PropagationInit(b)) => a == b,
            (PropagationRuntime(a), PropagationRuntime(b)) => a == b,
            (InvalidShardCount(a), InvalidShardCount(b)) => a == b,
            (InvalidConfig(a), InvalidConfig(b)) => a == b,

            // not comparable: same variant is enough
            (IoError(_), IoError(_)) => true,
            (JsonError(_), JsonError(_)) => true,
            (ReqwestError(_), ReqwestError(_)) => true,

            _ => false,
        }
    }
}
