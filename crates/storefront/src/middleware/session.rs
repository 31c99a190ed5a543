//! Session middleware configuration and the typed session context.
//!
//! Sessions live in an in-process `MemoryStore`; the cookie only carries
//! the session id. [`SessionContext`] is the one place handlers read and
//! write per-browser state.

use axum::{extract::FromRequestParts, http::request::Parts};
use freshfold_core::models::{AuthResponse, AuthUser, Business};
use freshfold_core::{Cart, Postcode};
use secrecy::SecretString;
use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer};
use uuid::Uuid;

use crate::config::StorefrontConfig;
use crate::error::AppError;
use crate::models::{Flash, session_keys};

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "ff_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

type SessionResult<T> = Result<T, tower_sessions::session::Error>;

/// Create the session layer over an in-memory store.
#[must_use]
pub fn create_session_layer(
    store: MemoryStore,
    config: &StorefrontConfig,
) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// A signed-in account together with its backend token.
#[derive(Clone)]
pub struct SignedIn {
    pub user: AuthUser,
    pub token: SecretString,
}

impl std::fmt::Debug for SignedIn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedIn")
            .field("user", &self.user)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Typed access to the browser session.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(ctx: SessionContext) -> Result<impl IntoResponse, AppError> {
///     let mut cart = ctx.cart().await?;
///     cart.clear();
///     ctx.save_cart(&cart).await?;
///     Ok(StatusCode::NO_CONTENT)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SessionContext {
    session: Session,
}

impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .map(Self::new)
            .ok_or_else(|| AppError::Internal("session layer is not installed".to_string()))
    }
}

impl SessionContext {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }

    // -------------------------------------------------------------------------
    // Account
    // -------------------------------------------------------------------------

    /// The signed-in account, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn current_user(&self) -> SessionResult<Option<AuthUser>> {
        self.session.get(session_keys::CURRENT_USER).await
    }

    /// The signed-in account and its token, if both are present.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn signed_in(&self) -> SessionResult<Option<SignedIn>> {
        let user: Option<AuthUser> = self.session.get(session_keys::CURRENT_USER).await?;
        let token: Option<String> = self.session.get(session_keys::ACCESS_TOKEN).await?;

        Ok(user.zip(token).map(|(user, token)| SignedIn {
            user,
            token: SecretString::from(token),
        }))
    }

    /// Store the account returned by login or registration.
    ///
    /// The session id is cycled so a pre-login id cannot be reused.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn sign_in(&self, auth: &AuthResponse) -> SessionResult<()> {
        self.session.cycle_id().await?;
        self.session
            .insert(session_keys::CURRENT_USER, &auth.user)
            .await?;
        self.session
            .insert(session_keys::ACCESS_TOKEN, &auth.token)
            .await
    }

    /// Forget the account. The cart and postcode gate are kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn sign_out(&self) -> SessionResult<()> {
        self.session
            .remove::<AuthUser>(session_keys::CURRENT_USER)
            .await?;
        self.session
            .remove::<String>(session_keys::ACCESS_TOKEN)
            .await?;
        self.session.cycle_id().await
    }

    // -------------------------------------------------------------------------
    // Cart
    // -------------------------------------------------------------------------

    /// The session cart (empty when none was saved yet).
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn cart(&self) -> SessionResult<Cart> {
        Ok(self
            .session
            .get::<Cart>(session_keys::CART)
            .await?
            .unwrap_or_default())
    }

    /// Write the cart back to the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn save_cart(&self, cart: &Cart) -> SessionResult<()> {
        self.session.insert(session_keys::CART, cart).await
    }

    /// The key that routes cart events to this session, created on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn cart_key(&self) -> SessionResult<Uuid> {
        if let Some(key) = self.session.get::<Uuid>(session_keys::CART_KEY).await? {
            return Ok(key);
        }
        let key = Uuid::new_v4();
        self.session.insert(session_keys::CART_KEY, key).await?;
        Ok(key)
    }

    // -------------------------------------------------------------------------
    // Postcode gate
    // -------------------------------------------------------------------------

    /// The postcode that unlocked the catalog, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn postcode(&self) -> SessionResult<Option<Postcode>> {
        self.session.get(session_keys::POSTCODE).await
    }

    /// Businesses serving the unlocked postcode.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn businesses(&self) -> SessionResult<Vec<Business>> {
        Ok(self
            .session
            .get(session_keys::BUSINESSES)
            .await?
            .unwrap_or_default())
    }

    /// Record a serviceable postcode and unlock the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn unlock(&self, postcode: &Postcode, businesses: &[Business]) -> SessionResult<()> {
        self.session.insert(session_keys::POSTCODE, postcode).await?;
        self.session
            .insert(session_keys::BUSINESSES, businesses)
            .await
    }

    /// Clear the postcode gate.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn lock(&self) -> SessionResult<()> {
        self.session
            .remove::<Postcode>(session_keys::POSTCODE)
            .await?;
        self.session
            .remove::<Vec<Business>>(session_keys::BUSINESSES)
            .await?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Flash
    // -------------------------------------------------------------------------

    /// Queue a notice for the next full page render.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn flash(&self, flash: Flash) -> SessionResult<()> {
        self.session.insert(session_keys::FLASH, flash).await
    }

    /// Take the pending notice, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn take_flash(&self) -> SessionResult<Option<Flash>> {
        self.session.remove(session_keys::FLASH).await
    }
}
