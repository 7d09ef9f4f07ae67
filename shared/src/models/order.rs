//! Order Model
//!
//! The canonical order record. Kitchen, bar and floor terminals all read
//! projections of this one record; none of them keeps its own status copy.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Preparation lifecycle status
///
/// Strictly linear: `pending → preparing → ready → served`. `cancelled` is
/// terminal and reachable only through cancellation of an unserved order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Preparing,
    Ready,
    Served,
    Cancelled,
}

impl OrderStatus {
    /// The single status this one may advance to
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::Preparing),
            Self::Preparing => Some(Self::Ready),
            Self::Ready => Some(Self::Served),
            Self::Served | Self::Cancelled => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::Served => "served",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "preparing" => Ok(Self::Preparing),
            "ready" => Ok(Self::Ready),
            "served" => Ok(Self::Served),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!(
                "unknown order status '{other}' (expected pending, preparing, ready, served or cancelled)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    #[default]
    DineIn,
    Takeaway,
    Delivery,
}

/// Payment lifecycle: `pending → paid → refunded`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Refunded => "refunded",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    Cash,
    Card,
    Qr,
    EWallet,
    GiftCard,
}

/// Modifier applied to a line (extra shot, no onions, large size)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Modifier {
    pub name: String,
    /// Price delta per unit, may be zero
    #[serde(default)]
    pub price: Decimal,
}

/// Order line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderLine {
    pub name: String,
    pub unit_price: Decimal,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// Menu category, drives kitchen/bar routing
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    /// Seat the line is served to, used by by-seat bill splits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seat_number: Option<u32>,
}

fn default_quantity() -> u32 {
    1
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OrderCreate {
    pub lines: Vec<OrderLine>,
    #[serde(default)]
    pub order_type: OrderType,
    /// Human-facing table number, required for dine-in
    pub table_number: Option<u32>,
    /// Explicit seats to occupy; empty means "first free seats"
    #[serde(default)]
    pub seats: Vec<u32>,
    /// Number of free seats to take when `seats` is empty (default 1)
    pub customer_count: Option<u32>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub delivery_address: Option<String>,
    pub special_requests: Option<String>,
    pub payment_type: Option<PaymentType>,
    /// Claimed total; must match the lines when present
    pub total: Option<Decimal>,
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: i64,
    pub lines: Vec<OrderLine>,
    pub total: Decimal,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub table_id: Option<i64>,
    pub table_number: Option<u32>,
    /// Seats bound to this order on its table
    #[serde(default)]
    pub seats: Vec<u32>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub delivery_address: Option<String>,
    pub special_requests: Option<String>,
    pub payment_type: Option<PaymentType>,
    pub payment_status: PaymentStatus,
    pub created_at: i64,
    pub updated_at: i64,
    pub served_at: Option<i64>,
    pub paid_at: Option<i64>,
    pub refunded_at: Option<i64>,
    /// Stamped when the order settles; its seats go back to the table then
    pub settled_at: Option<i64>,
    /// Bumped on every stored mutation
    pub version: u64,
}

impl Order {
    /// The order no longer holds seats
    ///
    /// Served and paid is the normal end; a refund or a cancellation ends it
    /// early.
    pub fn is_closed(&self) -> bool {
        match (self.status, self.payment_status) {
            (OrderStatus::Cancelled, _) | (_, PaymentStatus::Refunded) => true,
            (OrderStatus::Served, PaymentStatus::Paid) => true,
            _ => false,
        }
    }
}

/// Edit payload for an unserved, unpaid order; absent fields stay as they are
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OrderUpdate {
    pub lines: Option<Vec<OrderLine>>,
    /// Replacement seat set on the order's table (dine-in only)
    pub seats: Option<Vec<u32>>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub special_requests: Option<String>,
    /// Claimed total for the new lines; must match when present
    pub total: Option<Decimal>,
}

/// Status change payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

/// Record payment payload; `payment_type` falls back to the order's own
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PaymentRecord {
    #[serde(default)]
    pub payment_type: Option<PaymentType>,
}
