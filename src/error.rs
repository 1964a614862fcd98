use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeeError {
    #[error("insufficient history: got {got} candles, need at least {required}")]
    InsufficientHistory { got: usize, required: usize },

    #[error("malformed feature vector: got {got} features, expected {expected}")]
    MalformedFeatureVector { got: usize, expected: usize },

    #[error("non-finite feature {name}: {value}")]
    NonFiniteFeature { name: &'static str, value: f64 },

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type FeeResult<T> = Result<T, FeeError>;

impl FeeError {
    /// Stable machine-readable kind, paired with the `Display` message on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InsufficientHistory { .. } => "insufficient_history",
            Self::MalformedFeatureVector { .. } => "malformed_feature_vector",
            Self::NonFiniteFeature { .. } => "non_finite_feature",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
            Self::Json(_) => "json",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_history_message_names_counts() {
        let err = FeeError::InsufficientHistory {
            got: 12,
            required: 30,
        };
        let msg = err.to_string();
        assert!(msg.contains("12"), "{msg}");
        assert!(msg.contains("30"), "{msg}");
        assert_eq!(err.kind(), "insufficient_history");
    }

    #[test]
    fn kinds_are_distinct() {
        let kinds = [
            FeeError::InsufficientHistory {
                got: 0,
                required: 30,
            }
            .kind(),
            FeeError::MalformedFeatureVector {
                got: 14,
                expected: 15,
            }
            .kind(),
            FeeError::NonFiniteFeature {
                name: "HL Range 1m",
                value: f64::NAN,
            }
            .kind(),
            FeeError::Config("bad".to_string()).kind(),
            FeeError::Io(std::io::Error::new(std::io::ErrorKind::Other, "io")).kind(),
        ];
        for (i, a) in kinds.iter().enumerate() {
            for b in kinds.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn json_errors_convert() {
        let err: FeeError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert_eq!(err.kind(), "json");
    }
}
