use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    domain::DiscountStatus,
    dto::discounts::{DiscountDecision, DiscountList, DiscountListQuery},
    error::AppResult,
    middleware::tenancy::CompanyScope,
    response::ApiResponse,
    services::discount_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_discounts))
        .route("/{id}/approve", post(approve_discount))
        .route("/{id}/reject", post(reject_discount))
}

#[utoipa::path(
    get,
    path = "/api/discounts",
    params(
        ("status" = Option<String>, Query, description = "Filter by status: PENDING, APPROVED, REJECTED")
    ),
    responses(
        (status = 200, description = "Discounts across the active company's orders", body = ApiResponse<DiscountList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Discounts"
)]
pub async fn list_discounts(
    State(state): State<AppState>,
    CompanyScope(ctx): CompanyScope,
    Query(query): Query<DiscountListQuery>,
) -> AppResult<Json<ApiResponse<DiscountList>>> {
    let resp = discount_service::list_discounts(&state, &ctx, None, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/discounts/{id}/approve",
    params(
        ("id" = Uuid, Path, description = "Discount ID")
    ),
    responses(
        (status = 200, description = "Discount approved, order repriced", body = ApiResponse<DiscountDecision>),
        (status = 403, description = "Company admin only"),
        (status = 409, description = "Discount already decided")
    ),
    security(("bearer_auth" = [])),
    tag = "Discounts"
)]
pub async fn approve_discount(
    State(state): State<AppState>,
    CompanyScope(ctx): CompanyScope,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<DiscountDecision>>> {
    let resp = discount_service::decide_discount(&state, &ctx, id, DiscountStatus::Approved).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/discounts/{id}/reject",
    params(
        ("id" = Uuid, Path, description = "Discount ID")
    ),
    responses(
        (status = 200, description = "Discount rejected, order repriced", body = ApiResponse<DiscountDecision>),
        (status = 403, description = "Company admin only"),
        (status = 409, description = "Discount already rejected")
    ),
    security(("bearer_auth" = [])),
    tag = "Discounts"
)]
pub async fn reject_discount(
    State(state): State<AppState>,
    CompanyScope(ctx): CompanyScope,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<DiscountDecision>>> {
    let resp = discount_service::decide_discount(&state, &ctx, id, DiscountStatus::Rejected).await?;
    Ok(Json(resp))
}
