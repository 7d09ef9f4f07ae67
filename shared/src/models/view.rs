//! Station views
//!
//! Read-only projections of an [`Order`](super::Order). The status in a view
//! is always the canonical order status; only the visible lines differ.

use super::order::{OrderLine, OrderStatus, OrderType};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    Kitchen,
    Bar,
    #[default]
    General,
}

impl Audience {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kitchen => "kitchen",
            Self::Bar => "bar",
            Self::General => "general",
        }
    }
}

impl fmt::Display for Audience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Audience {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kitchen" => Ok(Self::Kitchen),
            "bar" => Ok(Self::Bar),
            "general" => Ok(Self::General),
            other => Err(format!("unknown audience '{other}'")),
        }
    }
}

/// What one station sees of an order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderView {
    pub order_id: i64,
    pub audience: Audience,
    pub status: OrderStatus,
    pub order_type: OrderType,
    pub table_number: Option<u32>,
    pub customer_name: Option<String>,
    pub special_requests: Option<String>,
    pub lines: Vec<OrderLine>,
    /// Only the general view carries money
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<Decimal>,
    pub created_at: i64,
    pub updated_at: i64,
    pub version: u64,
}
