use thiserror::Error;

/// Transport-level failure from an external gateway (naming service,
/// content store, wallet RPC). Expected domain conditions — a name with
/// no mapping, a denied authorization, a still-pending confirmation —
/// are carried in result types, never in this enum.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_variants_display() {
        let variants = vec![
            GatewayError::Config("missing url".into()),
            GatewayError::Network("connection refused".into()),
            GatewayError::Protocol("http status 500".into()),
            GatewayError::Serialization("bad json".into()),
        ];
        for v in variants {
            assert!(!v.to_string().is_empty());
        }
    }

    #[test]
    fn test_display_carries_detail() {
        let err = GatewayError::Protocol("http status 502".into());
        assert_eq!(err.to_string(), "protocol error: http status 502");
    }
}
