use axum::{extract::FromRequestParts, http::header};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, Validation, decode};
use sea_orm::EntityTrait;
use uuid::Uuid;

use crate::{
    domain::GlobalRole,
    dto::auth::Claims,
    entity::sessions::Entity as Sessions,
    error::AppError,
    state::AppState,
};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: GlobalRole,
    pub session_id: Uuid,
}

pub fn ensure_superadmin(user: &AuthUser) -> Result<(), AppError> {
    if !user.role.is_superadmin() {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::BadRequest("Missing Authorization header".into()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::BadRequest("Invalid Authorization header".into()))?;

        if !auth_str.starts_with("Bearer ") {
            return Err(AppError::BadRequest("Invalid Authorization scheme".into()));
        }
        let token = auth_str.trim_start_matches("Bearer ").trim();

        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(state.config.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AppError::Unauthorized)?;

        let user_id = Uuid::parse_str(&decoded.claims.sub)
            .map_err(|_| AppError::BadRequest("Invalid user id in token".into()))?;
        let session_id = Uuid::parse_str(&decoded.claims.sid)
            .map_err(|_| AppError::BadRequest("Invalid session id in token".into()))?;
        let role = decoded
            .claims
            .role
            .parse::<GlobalRole>()
            .map_err(|_| AppError::BadRequest("Invalid role in token".into()))?;

        let session = Sessions::find_by_id(session_id).one(&state.orm).await?;
        match session {
            Some(s) if s.user_id == user_id && s.expires_at.with_timezone(&Utc) > Utc::now() => {}
            _ => return Err(AppError::Unauthorized),
        }

        Ok(AuthUser {
            user_id,
            role,
            session_id,
        })
    }
}
