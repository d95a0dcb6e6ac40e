use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use crate::api::errors::ApiError;
use crate::core::{security, state::AppState};
use crate::db::models::{StudentProfile, User};
use crate::repositories;

pub(crate) struct CurrentUser(pub(crate) User);

/// Authenticated caller that owns a student profile.
pub(crate) struct CurrentStudent(pub(crate) StudentProfile);

const INVALID_CREDENTIALS: &str = "Invalid authentication credentials";

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(ApiError::Unauthorized(INVALID_CREDENTIALS))?;
        let claims = security::verify_token(token, state.settings()).map_err(|err| {
            tracing::debug!(error = %err, "Rejected bearer token");
            ApiError::Unauthorized(INVALID_CREDENTIALS)
        })?;

        let user = repositories::users::find_by_id(state.db(), &claims.sub)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load user"))?
            .ok_or(ApiError::Unauthorized("User not found"))?;

        if !user.is_active {
            return Err(ApiError::Unauthorized(INVALID_CREDENTIALS));
        }

        Ok(CurrentUser(user))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentStudent {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        let profile = repositories::students::find_by_user_id(state.db(), &user.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load student profile"))?;

        profile.map(CurrentStudent).ok_or(ApiError::Forbidden("Student profile not found"))
    }
}
