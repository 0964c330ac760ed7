//! Store-level error type.
//!
//! Containers never panic across their public boundary for expected failure
//! modes; they return `StoreError`, which renders as a human-readable
//! message the UI layer can show directly. Only contract violations
//! (documented under `# Panics`) are allowed to panic.

use kirana_core::OrderStatus;
use thiserror::Error;

use crate::gateway::GatewayError;

/// Failure of a public store operation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend call failed; state was left at its last-known-good
    /// value. The message is suitable for display.
    #[error("{0}")]
    Remote(String),

    /// The backend rejected the call for lack of authentication. Stores
    /// keep their cached data and operate in local-only mode.
    #[error("authentication required")]
    AuthRequired,

    /// The order draft was malformed; rejected before any network call.
    #[error("invalid order draft: {0}")]
    InvalidDraft(String),

    /// The order is already in a terminal status; the requested transition
    /// can never succeed, so no network call was made.
    #[error("order is already {0}")]
    AlreadyTerminal(OrderStatus),
}

impl From<GatewayError> for StoreError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::AuthRequired => Self::AuthRequired,
            GatewayError::Api { message, .. } => Self::Remote(message),
            GatewayError::Http(e) => Self::Remote(format!("network error: {e}")),
            GatewayError::Parse(e) => Self::Remote(format!("unexpected server response: {e}")),
        }
    }
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_surface_the_server_message() {
        let err = StoreError::from(GatewayError::Api {
            status: 422,
            message: "address pincode not serviceable".to_string(),
        });
        assert_eq!(err.to_string(), "address pincode not serviceable");
    }

    #[test]
    fn auth_errors_map_to_auth_required() {
        let err = StoreError::from(GatewayError::AuthRequired);
        assert!(matches!(err, StoreError::AuthRequired));
    }
}
