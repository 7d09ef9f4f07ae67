//! `CurrentUser` extractor for handlers

use axum::{extract::FromRequestParts, http::request::Parts};
use shared::error::AppError;

use super::middleware::authenticate;
use crate::auth::CurrentUser;
use crate::core::ServerState;

impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        // already resolved by require_auth
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let auth_header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());
        let user = authenticate(&state.jwt_service, auth_header, &parts.uri)?;
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}
