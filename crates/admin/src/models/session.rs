//! Session-related types for admin authentication.
//!
//! Types stored in the session for authentication state.

use freshfold_core::models::AuthUser;
use freshfold_core::{UserId, UserRole};
use serde::{Deserialize, Serialize};

/// Session-stored admin identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentAdmin {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub role: UserRole,
}

impl CurrentAdmin {
    /// Accept a backend account only if its role may use the console.
    #[must_use]
    pub fn from_user(user: &AuthUser) -> Option<Self> {
        user.role.is_admin().then(|| Self {
            id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
        })
    }

    /// Whether this admin may create businesses.
    #[must_use]
    pub const fn can_manage_businesses(&self) -> bool {
        self.role.can_manage_businesses()
    }
}

/// Severity of a one-shot notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashLevel {
    Success,
    Error,
}

impl FlashLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// A notice shown once on the next full page render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }
}

/// Session keys for admin authentication data.
pub mod keys {
    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";

    /// Bearer token for the backend.
    pub const ACCESS_TOKEN: &str = "access_token";

    /// Pending one-shot notice.
    pub const FLASH: &str = "flash";
}
