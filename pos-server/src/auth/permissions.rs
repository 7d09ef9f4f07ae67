//! Roles and the permissions they carry
//!
//! Permissions are fixed per role; tokens only carry the role name.

use std::fmt;
use std::str::FromStr;

pub const ORDERS_READ: &str = "orders:read";
pub const ORDERS_CREATE: &str = "orders:create";
/// Edit lines, seats and customer details before service
pub const ORDERS_UPDATE: &str = "orders:update";
/// Void an unserved order
pub const ORDERS_CANCEL: &str = "orders:cancel";
/// Advance status and mark served
pub const ORDERS_STATUS: &str = "orders:status";
pub const PAYMENTS_MANAGE: &str = "payments:manage";
pub const TABLES_READ: &str = "tables:read";
/// Assign/release seats and merge tables
pub const TABLES_SEAT: &str = "tables:seat";
pub const TABLES_RELEASE: &str = "tables:release";
/// Create and delete tables
pub const TABLES_MANAGE: &str = "tables:manage";
pub const BILLS_SPLIT: &str = "bills:split";

pub const ALL_PERMISSIONS: &[&str] = &[
    ORDERS_READ,
    ORDERS_CREATE,
    ORDERS_UPDATE,
    ORDERS_CANCEL,
    ORDERS_STATUS,
    PAYMENTS_MANAGE,
    TABLES_READ,
    TABLES_SEAT,
    TABLES_RELEASE,
    TABLES_MANAGE,
    BILLS_SPLIT,
];

const MANAGER_PERMISSIONS: &[&str] = ALL_PERMISSIONS;

const CASHIER_PERMISSIONS: &[&str] = &[
    ORDERS_READ,
    ORDERS_CREATE,
    ORDERS_UPDATE,
    ORDERS_CANCEL,
    PAYMENTS_MANAGE,
    TABLES_READ,
    TABLES_SEAT,
    TABLES_RELEASE,
    BILLS_SPLIT,
];

const WAITER_PERMISSIONS: &[&str] = &[
    ORDERS_READ,
    ORDERS_CREATE,
    ORDERS_UPDATE,
    TABLES_READ,
    TABLES_SEAT,
    TABLES_RELEASE,
    BILLS_SPLIT,
];

/// Kitchen, bar and chef staff
const STATION_PERMISSIONS: &[&str] = &[ORDERS_READ, ORDERS_STATUS, TABLES_READ];

/// Staff role carried in the token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    Manager,
    Cashier,
    Waiter,
    Chef,
    Kitchen,
    Bar,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Cashier => "cashier",
            Role::Waiter => "waiter",
            Role::Chef => "chef",
            Role::Kitchen => "kitchen",
            Role::Bar => "bar",
        }
    }

    pub fn permissions(&self) -> &'static [&'static str] {
        match self {
            Role::Admin | Role::Manager => MANAGER_PERMISSIONS,
            Role::Cashier => CASHIER_PERMISSIONS,
            Role::Waiter => WAITER_PERMISSIONS,
            Role::Chef | Role::Kitchen | Role::Bar => STATION_PERMISSIONS,
        }
    }

    /// Admin passes every check, including permissions added later
    pub fn grants(&self, permission: &str) -> bool {
        *self == Role::Admin || self.permissions().contains(&permission)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "cashier" => Ok(Role::Cashier),
            "waiter" => Ok(Role::Waiter),
            "chef" => Ok(Role::Chef),
            "kitchen" => Ok(Role::Kitchen),
            "bar" => Ok(Role::Bar),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// Whether a permission string is one the server knows
pub fn is_valid_permission(permission: &str) -> bool {
    ALL_PERMISSIONS.contains(&permission)
}
