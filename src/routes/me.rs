use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::companies::{MyCompanies, SelectCompanyRequest, SessionState},
    error::AppResult,
    middleware::auth::AuthUser,
    response::{ApiResponse, Meta},
    services::tenancy_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/companies", get(my_companies))
        .route("/session", get(current_session))
        .route(
            "/active-company",
            post(select_active_company).delete(clear_active_company),
        )
}

#[utoipa::path(
    get,
    path = "/api/me/companies",
    responses(
        (status = 200, description = "Companies the user belongs to and the current resolution", body = ApiResponse<MyCompanies>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Me"
)]
pub async fn my_companies(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<MyCompanies>>> {
    let data = tenancy_service::my_companies(&state, &user).await?;
    Ok(Json(ApiResponse::success("Companies", data, Some(Meta::empty()))))
}

#[utoipa::path(
    get,
    path = "/api/me/session",
    responses(
        (status = 200, description = "Current session state", body = ApiResponse<SessionState>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Scope violation")
    ),
    security(("bearer_auth" = [])),
    tag = "Me"
)]
pub async fn current_session(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<SessionState>>> {
    let data = tenancy_service::current_session(&state, &user).await?;
    Ok(Json(ApiResponse::success("Session", data, Some(Meta::empty()))))
}

#[utoipa::path(
    post,
    path = "/api/me/active-company",
    request_body = SelectCompanyRequest,
    responses(
        (status = 200, description = "Active company selected", body = ApiResponse<SessionState>),
        (status = 403, description = "Not a member of the company")
    ),
    security(("bearer_auth" = [])),
    tag = "Me"
)]
pub async fn select_active_company(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<SelectCompanyRequest>,
) -> AppResult<Json<ApiResponse<SessionState>>> {
    let data = tenancy_service::select_active_company(&state, &user, payload.company_id).await?;
    Ok(Json(ApiResponse::success(
        "Active company selected",
        data,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    delete,
    path = "/api/me/active-company",
    responses(
        (status = 200, description = "Active company cleared", body = ApiResponse<SessionState>)
    ),
    security(("bearer_auth" = [])),
    tag = "Me"
)]
pub async fn clear_active_company(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<SessionState>>> {
    let data = tenancy_service::clear_active_company(&state, &user).await?;
    Ok(Json(ApiResponse::success(
        "Active company cleared",
        data,
        Some(Meta::empty()),
    )))
}
