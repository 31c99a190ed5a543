//! Sanity check for the configured admin credentials.

use freshfold_core::models::AuthUser;
use tracing::info;

use super::{CliError, admin_token, api};

/// Sign in and read the account back through `/auth/me`.
///
/// # Errors
///
/// Returns an error if credentials are missing, the sign-in fails, the
/// account is not an admin, or the token is rejected.
pub async fn whoami() -> Result<AuthUser, CliError> {
    dotenvy::dotenv().ok();

    let api = api()?;
    let token = admin_token(&api).await?;
    let user = api.authorized(&token).me().await?;

    info!(user_id = %user.id, "Signed in as {} <{}> ({})", user.name, user.email, user.role);
    Ok(user)
}
