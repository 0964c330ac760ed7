//! Session login/logout commands.

use secrecy::SecretString;
use tracing::{info, warn};

use kirana_client::Session;

/// Adopt a bearer token for this and future invocations.
///
/// The token is persisted in the session's data directory; a push-channel
/// failure is reported but does not discard it, since request/response
/// calls work regardless.
pub async fn login(session: &Session, token: String) {
    match session.login(SecretString::from(token)).await {
        Ok(()) => info!("logged in; push channel connected"),
        Err(e) => warn!(error = %e, "logged in, but the push channel is unavailable"),
    }
}

/// Drop the stored token and tear down the push channel. Cached cart,
/// wishlist, and order data stay on disk for offline display.
pub async fn logout(session: &Session) {
    session.logout().await;
    info!("logged out");
}
