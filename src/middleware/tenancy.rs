use axum::extract::FromRequestParts;

use crate::{
    domain::{CompanyRole, RequestContext},
    error::AppError,
    middleware::auth::AuthUser,
    services::tenancy_service,
    state::AppState,
};

/// Extracts the [`RequestContext`] for company-scoped handlers. Requests that
/// cannot resolve an active company are rejected before the handler runs.
#[derive(Debug, Clone)]
pub struct CompanyScope(pub RequestContext);

impl FromRequestParts<AppState> for CompanyScope {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        let ctx = tenancy_service::resolve_context(state, &user).await?;
        Ok(CompanyScope(ctx))
    }
}

pub fn ensure_company_role(ctx: &RequestContext, allowed: &[CompanyRole]) -> Result<(), AppError> {
    if !ctx.has_role(allowed) {
        return Err(AppError::Forbidden);
    }
    Ok(())
}
