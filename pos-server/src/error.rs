//! Errors raised by the order and table managers

use crate::storage::StorageError;
use shared::error::{AppError, ErrorCode};
use shared::models::{OrderStatus, PaymentStatus};
use thiserror::Error;

/// Manager errors
///
/// Every variant except `Storage` leaves persisted state untouched: the
/// write transaction it was raised in is dropped without commit.
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Order not found: {0}")]
    OrderNotFound(i64),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Seat {seat_number} does not exist on table {table_number}")]
    SeatNotFound { table_number: u32, seat_number: u32 },

    #[error("Order {order_id} cannot move from {from} to {to}")]
    InvalidTransition {
        order_id: i64,
        from: OrderStatus,
        to: OrderStatus,
    },

    #[error("Order {order_id} cannot be {action} while payment is {from}")]
    InvalidPaymentTransition {
        order_id: i64,
        from: PaymentStatus,
        action: &'static str,
    },

    #[error("Order {0} has been cancelled")]
    OrderCancelled(i64),

    #[error("Order {order_id} can no longer be edited: {reason}")]
    OrderNotEditable { order_id: i64, reason: String },

    #[error("Seat conflict: {0}")]
    SeatConflict(String),

    #[error("Table cannot be released: {0}")]
    TableNotReleasable(String),

    #[error("Split mismatch: {0}")]
    SplitMismatch(String),

    #[error("Table number already exists: {0}")]
    TableNumberExists(u32),

    #[error("Validation failed: {0}")]
    Validation(String),
}

pub type ManagerResult<T> = Result<T, ManagerError>;

impl ManagerError {
    pub fn table_id_not_found(table_id: i64) -> Self {
        Self::TableNotFound(format!("id {table_id}"))
    }

    pub fn table_number_not_found(table_number: u32) -> Self {
        Self::TableNotFound(format!("#{table_number}"))
    }
}

/// Map a storage failure onto the closest error code
fn classify_storage_error(e: &StorageError) -> ErrorCode {
    match e {
        StorageError::Serialization(_) => return ErrorCode::StorageCorrupted,
        StorageError::Storage(redb::StorageError::Corrupted(_)) => {
            return ErrorCode::StorageCorrupted;
        }
        _ => {}
    }

    if e.is_transient() {
        ErrorCode::SystemBusy
    } else {
        ErrorCode::DatabaseError
    }
}

impl From<ManagerError> for AppError {
    fn from(err: ManagerError) -> Self {
        match err {
            ManagerError::Storage(e) => {
                let code = classify_storage_error(&e);
                tracing::error!(error = %e, error_code = %code, "Storage error occurred");
                AppError::with_message(code, e.to_string())
            }
            ManagerError::OrderNotFound(id) => {
                AppError::with_message(ErrorCode::OrderNotFound, format!("Order {id} not found"))
                    .with_detail("order_id", id)
            }
            ManagerError::TableNotFound(table) => {
                AppError::with_message(ErrorCode::TableNotFound, format!("Table {table} not found"))
                    .with_detail("table", table)
            }
            ManagerError::SeatNotFound {
                table_number,
                seat_number,
            } => AppError::with_message(
                ErrorCode::SeatNotFound,
                format!("Seat {seat_number} does not exist on table {table_number}"),
            )
            .with_detail("table_number", table_number)
            .with_detail("seat_number", seat_number),
            ManagerError::InvalidTransition { order_id, from, to } => AppError::with_message(
                ErrorCode::InvalidTransition,
                format!("Order {order_id} cannot move from {from} to {to}"),
            )
            .with_detail("order_id", order_id)
            .with_detail("from", from.as_str())
            .with_detail("to", to.as_str()),
            ManagerError::InvalidPaymentTransition {
                order_id,
                from,
                action,
            } => {
                let code = if from == PaymentStatus::Refunded {
                    ErrorCode::PaymentAlreadyRefunded
                } else {
                    ErrorCode::PaymentInvalidTransition
                };
                AppError::with_message(
                    code,
                    format!("Order {order_id} cannot be {action} while payment is {from}"),
                )
                .with_detail("order_id", order_id)
                .with_detail("payment_status", from.as_str())
            }
            ManagerError::OrderCancelled(id) => {
                AppError::with_message(ErrorCode::OrderCancelled, format!("Order {id} has been cancelled"))
                    .with_detail("order_id", id)
            }
            ManagerError::OrderNotEditable { order_id, reason } => AppError::with_message(
                ErrorCode::OrderNotEditable,
                format!("Order {order_id} can no longer be edited: {reason}"),
            )
            .with_detail("order_id", order_id),
            ManagerError::SeatConflict(msg) => AppError::with_message(ErrorCode::SeatConflict, msg),
            ManagerError::TableNotReleasable(msg) => {
                AppError::with_message(ErrorCode::TableNotReleasable, msg)
            }
            ManagerError::SplitMismatch(msg) => AppError::with_message(ErrorCode::SplitMismatch, msg),
            ManagerError::TableNumberExists(number) => AppError::with_message(
                ErrorCode::TableNumberExists,
                format!("Table number {number} already exists"),
            )
            .with_detail("table_number", number),
            ManagerError::Validation(msg) => AppError::validation(msg),
        }
    }
}
