use thiserror::Error;

use certibadge_core::GatewayError;
use certibadge_issuer::WorkflowError;

/// Error type for the CertiBadge root binary, aggregating errors from the
/// workflow and the transport adapters.
#[derive(Debug, Error)]
pub enum RootError {
    #[error("workflow error: {0}")]
    Workflow(#[from] WorkflowError),

    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for RootError {
    fn from(e: toml::de::Error) -> Self {
        RootError::Config(format!("TOML parse error: {}", e))
    }
}

pub type RootResult<T> = Result<T, RootError>;
