use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::companies::{
        ApprovalListQuery, ApprovalRequest, CompanyList, CreateCompanyRequest, ImpersonateRequest,
        SessionState, SetActiveRequest, UserList,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Company, User},
    response::{ApiResponse, Meta},
    services::{admin_service, impersonation_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/companies", get(list_companies).post(create_company))
        .route("/companies/{id}/approval", patch(decide_company))
        .route("/companies/{id}/active", patch(set_company_active))
        .route("/users", get(list_users))
        .route("/users/{id}/approval", patch(decide_user))
        .route(
            "/impersonation",
            post(enter_impersonation).delete(exit_impersonation),
        )
}

#[utoipa::path(
    get,
    path = "/api/admin/companies",
    params(
        ("status" = Option<String>, Query, description = "Filter by approval status")
    ),
    responses(
        (status = 200, description = "All companies (superadmin only)", body = ApiResponse<CompanyList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_companies(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ApprovalListQuery>,
) -> AppResult<Json<ApiResponse<CompanyList>>> {
    let resp = admin_service::list_companies(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/companies",
    request_body = CreateCompanyRequest,
    responses(
        (status = 200, description = "Company created, pending approval", body = ApiResponse<Company>),
        (status = 400, description = "Document already registered"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_company(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateCompanyRequest>,
) -> AppResult<Json<ApiResponse<Company>>> {
    let resp = admin_service::create_company(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/admin/companies/{id}/approval",
    params(
        ("id" = Uuid, Path, description = "Company ID")
    ),
    request_body = ApprovalRequest,
    responses(
        (status = 200, description = "Approval status changed", body = ApiResponse<Company>),
        (status = 404, description = "Company not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn decide_company(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ApprovalRequest>,
) -> AppResult<Json<ApiResponse<Company>>> {
    let resp = admin_service::decide_company(&state, &user, id, payload.status).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/admin/companies/{id}/active",
    params(
        ("id" = Uuid, Path, description = "Company ID")
    ),
    request_body = SetActiveRequest,
    responses(
        (status = 200, description = "Company activated or deactivated", body = ApiResponse<Company>),
        (status = 404, description = "Company not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn set_company_active(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetActiveRequest>,
) -> AppResult<Json<ApiResponse<Company>>> {
    let resp = admin_service::set_company_active(&state, &user, id, payload.active).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    params(
        ("status" = Option<String>, Query, description = "Filter by approval status")
    ),
    responses(
        (status = 200, description = "Users (superadmin only)", body = ApiResponse<UserList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_users(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ApprovalListQuery>,
) -> AppResult<Json<ApiResponse<UserList>>> {
    let resp = admin_service::list_users(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/admin/users/{id}/approval",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = ApprovalRequest,
    responses(
        (status = 200, description = "Approval status changed", body = ApiResponse<User>),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn decide_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ApprovalRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = admin_service::decide_user(&state, &user, id, payload.status).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/impersonation",
    request_body = ImpersonateRequest,
    responses(
        (status = 200, description = "Acting as the company; clients must drop scoped caches", body = ApiResponse<SessionState>),
        (status = 403, description = "Superadmin only"),
        (status = 404, description = "Company not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn enter_impersonation(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ImpersonateRequest>,
) -> AppResult<Json<ApiResponse<SessionState>>> {
    let data = impersonation_service::enter_impersonation(&state, &user, payload.company_id).await?;
    Ok(Json(ApiResponse::success(
        "Impersonation started",
        data,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    delete,
    path = "/api/admin/impersonation",
    responses(
        (status = 200, description = "Back to the superadmin's own context", body = ApiResponse<SessionState>)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn exit_impersonation(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<SessionState>>> {
    let data = impersonation_service::exit_impersonation(&state, &user).await?;
    Ok(Json(ApiResponse::success(
        "Impersonation ended",
        data,
        Some(Meta::empty()),
    )))
}
