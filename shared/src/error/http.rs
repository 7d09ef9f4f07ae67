//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound | Self::OrderNotFound | Self::TableNotFound | Self::SeatNotFound => {
                StatusCode::NOT_FOUND
            }

            // 409 Conflict: the request was well formed but the current
            // state of the record forbids it
            Self::AlreadyExists
            | Self::InvalidTransition
            | Self::OrderCancelled
            | Self::OrderNotEditable
            | Self::PaymentInvalidTransition
            | Self::PaymentAlreadyRefunded
            | Self::TableOccupied
            | Self::SeatConflict
            | Self::TableNotReleasable
            | Self::TableNumberExists => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated | Self::TokenExpired | Self::TokenInvalid => {
                StatusCode::UNAUTHORIZED
            }

            // 403 Forbidden
            Self::PermissionDenied | Self::RoleRequired => StatusCode::FORBIDDEN,

            // 503 Service Unavailable (transient errors, client can retry)
            Self::TimeoutError | Self::SystemBusy => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            Self::Unknown
            | Self::InternalError
            | Self::DatabaseError
            | Self::ConfigError
            | Self::StorageCorrupted => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (validation errors)
            Self::ValidationFailed
            | Self::InvalidRequest
            | Self::OrderEmpty
            | Self::OrderTotalMismatch
            | Self::PaymentInvalidMethod
            | Self::SplitMismatch => StatusCode::BAD_REQUEST,
        }
    }
}
