pub mod jwt;
pub mod password;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::headers::{authorization::Bearer, Authorization};
use axum_extra::TypedHeader;
use serde::{Deserialize, Serialize};

use crate::{error::AppError, state::AppState};

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_STAFF: &str = "staff";

/// Backoffice identity attached to a request. Only `admin` and `staff`
/// roles pass the extractor; everything reviewer-facing records this
/// identity as the `reviewed_by` attribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedAdmin {
    pub user_id: uuid::Uuid,
    pub username: String,
    pub role: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::unauthorized())?;

        let claims = state
            .jwt
            .verify_token(bearer.token())
            .map_err(|_| AppError::unauthorized())?;

        if claims.role != ROLE_ADMIN && claims.role != ROLE_STAFF {
            return Err(AppError::forbidden());
        }

        Ok(AuthenticatedAdmin {
            user_id: claims.sub,
            username: claims.username,
            role: claims.role,
        })
    }
}
