use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::{
        discounts::{DiscountList, DiscountListQuery, RequestDiscountRequest},
        orders::{
            AddOrderItemRequest, AdvanceStageRequest, CheckoutRequest, OrderList, OrderWithItems,
            StageAdvanced, UpdateFreightRequest, UpdateOrderItemRequest, UpdateOrderStatusRequest,
        },
    },
    error::AppResult,
    middleware::tenancy::CompanyScope,
    models::{Order, OrderItemDiscount},
    response::ApiResponse,
    routes::params::OrderListQuery,
    services::{discount_service, order_service, stage_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders))
        .route("/checkout", post(checkout))
        .route("/{id}", get(get_order))
        .route("/{id}/items", post(add_item))
        .route(
            "/{id}/items/{item_id}",
            patch(update_item).delete(remove_item),
        )
        .route("/{id}/items/{item_id}/discounts", post(request_discount))
        .route("/{id}/discounts", get(list_order_discounts))
        .route("/{id}/stage/advance", post(advance_stage))
        .route("/{id}/status", patch(update_status))
        .route("/{id}/cancel", post(cancel_order))
        .route("/{id}/freight", patch(update_freight))
        .route("/{id}/recalculate", post(recalculate))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("stage" = Option<String>, Query, description = "Filter by fulfillment stage"),
        ("sort_order" = Option<String>, Query, description = "Sort order: asc, desc")
    ),
    responses(
        (status = 200, description = "Orders of the active company", body = ApiResponse<OrderList>),
        (status = 403, description = "No active company")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    CompanyScope(ctx): CompanyScope,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_orders(&state, &ctx, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/orders/checkout",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Quote created from the cart", body = ApiResponse<OrderWithItems>),
        (status = 400, description = "Empty cart or insufficient stock"),
        (status = 403, description = "Role not allowed")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn checkout(
    State(state): State<AppState>,
    CompanyScope(ctx): CompanyScope,
    Json(payload): Json<CheckoutRequest>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = order_service::checkout(&state, &ctx, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order with items and discounts", body = ApiResponse<OrderWithItems>),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    CompanyScope(ctx): CompanyScope,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = order_service::get_order(&state, &ctx, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/orders/{id}/items",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    request_body = AddOrderItemRequest,
    responses(
        (status = 200, description = "Item added, totals recalculated", body = ApiResponse<OrderWithItems>),
        (status = 409, description = "Order no longer editable")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn add_item(
    State(state): State<AppState>,
    CompanyScope(ctx): CompanyScope,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddOrderItemRequest>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = order_service::add_item(&state, &ctx, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/orders/{id}/items/{item_id}",
    params(
        ("id" = Uuid, Path, description = "Order ID"),
        ("item_id" = Uuid, Path, description = "Order item ID")
    ),
    request_body = UpdateOrderItemRequest,
    responses(
        (status = 200, description = "Quantity changed, totals recalculated", body = ApiResponse<OrderWithItems>),
        (status = 409, description = "Order no longer editable"),
        (status = 422, description = "Invalid quantity")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn update_item(
    State(state): State<AppState>,
    CompanyScope(ctx): CompanyScope,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateOrderItemRequest>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = order_service::update_item(&state, &ctx, id, item_id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/orders/{id}/items/{item_id}",
    params(
        ("id" = Uuid, Path, description = "Order ID"),
        ("item_id" = Uuid, Path, description = "Order item ID")
    ),
    responses(
        (status = 200, description = "Item removed, totals recalculated", body = ApiResponse<OrderWithItems>),
        (status = 404, description = "Item not found"),
        (status = 409, description = "Order no longer editable")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn remove_item(
    State(state): State<AppState>,
    CompanyScope(ctx): CompanyScope,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = order_service::remove_item(&state, &ctx, id, item_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/orders/{id}/items/{item_id}/discounts",
    params(
        ("id" = Uuid, Path, description = "Order ID"),
        ("item_id" = Uuid, Path, description = "Order item ID")
    ),
    request_body = RequestDiscountRequest,
    responses(
        (status = 200, description = "Discount requested, pending approval", body = ApiResponse<OrderItemDiscount>),
        (status = 404, description = "Order or item not found"),
        (status = 422, description = "Invalid discount value")
    ),
    security(("bearer_auth" = [])),
    tag = "Discounts"
)]
pub async fn request_discount(
    State(state): State<AppState>,
    CompanyScope(ctx): CompanyScope,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<RequestDiscountRequest>,
) -> AppResult<Json<ApiResponse<OrderItemDiscount>>> {
    let resp = discount_service::request_discount(&state, &ctx, id, item_id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}/discounts",
    params(
        ("id" = Uuid, Path, description = "Order ID"),
        ("status" = Option<String>, Query, description = "Filter by status: PENDING, APPROVED, REJECTED")
    ),
    responses(
        (status = 200, description = "Discounts on the order", body = ApiResponse<DiscountList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Discounts"
)]
pub async fn list_order_discounts(
    State(state): State<AppState>,
    CompanyScope(ctx): CompanyScope,
    Path(id): Path<Uuid>,
    Query(query): Query<DiscountListQuery>,
) -> AppResult<Json<ApiResponse<DiscountList>>> {
    let resp = discount_service::list_discounts(&state, &ctx, Some(id), query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/orders/{id}/stage/advance",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    request_body = AdvanceStageRequest,
    responses(
        (status = 200, description = "Stage advanced", body = ApiResponse<StageAdvanced>),
        (status = 409, description = "Stage changed, order cancelled or already shipped"),
        (status = 502, description = "Document generation failed, stage unchanged")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn advance_stage(
    State(state): State<AppState>,
    CompanyScope(ctx): CompanyScope,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdvanceStageRequest>,
) -> AppResult<Json<ApiResponse<StageAdvanced>>> {
    let resp = stage_service::advance_order_stage(&state, &ctx, id, payload.from_stage).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/orders/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<Order>),
        (status = 409, description = "Transition not allowed")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn update_status(
    State(state): State<AppState>,
    CompanyScope(ctx): CompanyScope,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = order_service::update_status(&state, &ctx, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/orders/{id}/cancel",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order cancelled, stock restored", body = ApiResponse<Order>),
        (status = 409, description = "Already cancelled or shipped")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn cancel_order(
    State(state): State<AppState>,
    CompanyScope(ctx): CompanyScope,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = order_service::cancel_order(&state, &ctx, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/orders/{id}/freight",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    request_body = UpdateFreightRequest,
    responses(
        (status = 200, description = "Freight updated", body = ApiResponse<Order>),
        (status = 422, description = "Invalid amount")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn update_freight(
    State(state): State<AppState>,
    CompanyScope(ctx): CompanyScope,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateFreightRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = order_service::update_freight(&state, &ctx, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/orders/{id}/recalculate",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Totals recomputed from items and approved discounts", body = ApiResponse<Order>),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn recalculate(
    State(state): State<AppState>,
    CompanyScope(ctx): CompanyScope,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = order_service::recalculate(&state, &ctx, id).await?;
    Ok(Json(resp))
}
