//! Session middleware configuration for admin.
//!
//! Sets up in-memory sessions using tower-sessions with stricter security
//! settings than the storefront (SameSite=Strict, 24hr expiry).

use freshfold_core::models::AuthResponse;
use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer};

use crate::config::AdminConfig;
use crate::models::{CurrentAdmin, Flash, session_keys};

/// Session cookie name for admin.
pub const SESSION_COOKIE_NAME: &str = "ff_admin_session";

/// Session expiry time in seconds (24 hours - stricter than storefront).
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// Create the session layer over an in-memory store.
#[must_use]
pub fn create_session_layer(
    store: MemoryStore,
    config: &AdminConfig,
) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        // SameSite=Strict for admin (stricter than storefront's Lax)
        .with_same_site(tower_sessions::cookie::SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
}

/// Store the signed-in admin and its backend token.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    admin: &CurrentAdmin,
    auth: &AuthResponse,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_ADMIN, admin).await?;
    session.insert(session_keys::ACCESS_TOKEN, &auth.token).await
}

/// Clear the current admin from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

/// Queue a notice for the next full page render.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn push_flash(session: &Session, flash: Flash) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::FLASH, flash).await
}

/// Take the pending notice, if any.
///
/// # Errors
///
/// Returns an error if the session cannot be read.
pub async fn take_flash(session: &Session) -> Result<Option<Flash>, tower_sessions::session::Error> {
    session.remove(session_keys::FLASH).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn test_flash_is_taken_once() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);

        push_flash(&session, Flash::success("Order status updated"))
            .await
            .unwrap();
        let flash = take_flash(&session).await.unwrap().unwrap();
        assert_eq!(flash.message, "Order status updated");
        assert!(take_flash(&session).await.unwrap().is_none());
    }
}
