use thiserror::Error;

/// Failure modes of the live execution gateway.
///
/// The dispatcher absorbs these into Failed order records; they never cross
/// the execution boundary as panics or bubbled errors.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("order rejected by exchange: {0}")]
    Rejected(String),

    #[error("exchange transport error: {0}")]
    Transport(String),

    #[error("gateway not configured: {0}")]
    NotConfigured(&'static str),
}
