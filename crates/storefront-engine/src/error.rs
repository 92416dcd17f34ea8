use storefront_domain::PathError;
use thiserror::Error;

use crate::gateway::GatewayError;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid field path: {0}")]
    InvalidFieldPath(#[from] PathError),
    #[error("A submission is already in progress")]
    SubmissionInFlight,
    #[error("Submission ticket is stale (session restarted)")]
    StaleSubmission,
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
    #[error("Validation failed at step {step}: {count} field(s) need attention")]
    Validation { step: u8, count: usize },
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}
