//! Status and role enums shared with the backend.

use serde::{Deserialize, Serialize};

use super::UnknownOption;

/// Order lifecycle status.
///
/// Owned by the backend. Customers only read it; admins move it along
/// `pending → confirmed → processing → completed`, or to `cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Processing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Every status in lifecycle order, as offered by the admin status select.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Confirmed,
        Self::Processing,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Capitalized label for badges and selects.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Confirmed => "Confirmed",
            Self::Processing => "Processing",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Places orders for their own household.
    #[default]
    Customer,
    /// Manages a single business's catalog and orders.
    BusinessAdmin,
    /// Manages every business on the marketplace.
    PlatformAdmin,
    /// Unrestricted access.
    SuperAdmin,
}

impl UserRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::BusinessAdmin => "business_admin",
            Self::PlatformAdmin => "platform_admin",
            Self::SuperAdmin => "super_admin",
        }
    }

    /// Whether the role may use the admin console.
    ///
    /// Mirrors the backend rule: any role whose name contains `admin`.
    #[must_use]
    pub fn is_admin(self) -> bool {
        self.as_str().contains("admin")
    }

    /// Whether the role may create businesses.
    #[must_use]
    pub const fn can_manage_businesses(self) -> bool {
        matches!(self, Self::PlatformAdmin | Self::SuperAdmin)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "business_admin" => Ok(Self::BusinessAdmin),
            "platform_admin" => Ok(Self::PlatformAdmin),
            "super_admin" => Ok(Self::SuperAdmin),
            _ => Err(format!("invalid user role: {s}")),
        }
    }
}

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash on delivery.
    #[default]
    Cod,
    /// Card payment. Shown at checkout but not yet accepted.
    Stripe,
}

impl PaymentMethod {
    pub const ALL: [Self; 2] = [Self::Cod, Self::Stripe];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cod => "cod",
            Self::Stripe => "stripe",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cod => "Cash on Delivery",
            Self::Stripe => "Card Payment (Coming soon)",
        }
    }

    /// Whether orders can currently be placed with this method.
    #[must_use]
    pub const fn is_available(self) -> bool {
        matches!(self, Self::Cod)
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cod" => Ok(Self::Cod),
            "stripe" => Ok(Self::Stripe),
            _ => Err(UnknownOption {
                kind: "payment method",
                value: s.to_owned(),
            }),
        }
    }
}

/// Payment state recorded by the backend at order creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Collected in cash on delivery.
    #[default]
    Cod,
    /// Awaiting card settlement.
    Pending,
    Paid,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cod => write!(f, "cod"),
            Self::Pending => write!(f, "pending"),
            Self::Paid => write!(f, "paid"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_roles() {
        assert!(!UserRole::Customer.is_admin());
        assert!(UserRole::BusinessAdmin.is_admin());
        assert!(UserRole::PlatformAdmin.is_admin());
        assert!(UserRole::SuperAdmin.is_admin());
    }

    #[test]
    fn test_only_platform_roles_manage_businesses() {
        assert!(!UserRole::BusinessAdmin.can_manage_businesses());
        assert!(UserRole::PlatformAdmin.can_manage_businesses());
        assert!(UserRole::SuperAdmin.can_manage_businesses());
    }

    #[test]
    fn test_order_status_from_str() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_role_serde_matches_wire() {
        let role: UserRole = serde_json::from_str("\"platform_admin\"").unwrap();
        assert_eq!(role, UserRole::PlatformAdmin);
    }

    #[test]
    fn test_only_cod_available() {
        assert!(PaymentMethod::Cod.is_available());
        assert!(!PaymentMethod::Stripe.is_available());
    }
}
