use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get},
};
use uuid::Uuid;

use crate::{
    dto::companies::{AddMemberRequest, MemberList},
    error::AppResult,
    middleware::tenancy::CompanyScope,
    models::CompanyMember,
    response::{ApiResponse, Empty},
    services::company_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/members", get(list_members).post(add_member))
        .route("/members/{user_id}", delete(remove_member))
}

#[utoipa::path(
    get,
    path = "/api/company/members",
    responses(
        (status = 200, description = "Members of the active company", body = ApiResponse<MemberList>),
        (status = 403, description = "Company admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Company"
)]
pub async fn list_members(
    State(state): State<AppState>,
    CompanyScope(ctx): CompanyScope,
) -> AppResult<Json<ApiResponse<MemberList>>> {
    let resp = company_service::list_members(&state, &ctx).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/company/members",
    request_body = AddMemberRequest,
    responses(
        (status = 200, description = "Member added or role changed", body = ApiResponse<CompanyMember>),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Company"
)]
pub async fn add_member(
    State(state): State<AppState>,
    CompanyScope(ctx): CompanyScope,
    Json(payload): Json<AddMemberRequest>,
) -> AppResult<Json<ApiResponse<CompanyMember>>> {
    let resp = company_service::add_member(&state, &ctx, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/company/members/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Member removed", body = ApiResponse<Empty>),
        (status = 404, description = "Not a member")
    ),
    security(("bearer_auth" = [])),
    tag = "Company"
)]
pub async fn remove_member(
    State(state): State<AppState>,
    CompanyScope(ctx): CompanyScope,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Empty>>> {
    let resp = company_service::remove_member(&state, &ctx, user_id).await?;
    Ok(Json(resp))
}
