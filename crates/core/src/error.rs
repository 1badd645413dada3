use thiserror::Error;

/// Failures the swap flows raise themselves. Vendor and RPC errors travel
/// as `anyhow::Error` with the response context attached.
#[derive(Debug, Error)]
pub enum SwapError {
    #[error("{name} environment variable is not set.")]
    MissingEnv { name: String },

    #[error("No {kind} quote found.")]
    NoMatchingQuote { kind: String },

    #[error("No swap route found.")]
    NoRoute,

    #[error("Transaction receipt is null")]
    NullReceipt,

    #[error("Approval address is undefined.")]
    ApprovalAddressMissing,

    #[error("Approval address is not a valid EVM address: {0}")]
    InvalidApprovalAddress(String),

    #[error("Unsupported chain: {0}")]
    UnsupportedChain(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}

impl SwapError {
    pub fn missing_env(name: &str) -> Self {
        SwapError::MissingEnv {
            name: name.to_string(),
        }
    }
}
