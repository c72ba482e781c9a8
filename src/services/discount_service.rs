use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, JoinType, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    domain::{
        CompanyRole, DiscountStatus, OrderEvent, OrderStage, OrderStatus, RequestContext,
        pricing::validate_discount,
    },
    dto::discounts::{DiscountDecision, DiscountList, DiscountListQuery, RequestDiscountRequest},
    entity::{
        order_item_discounts::{
            self, ActiveModel as DiscountActive, Column as DiscountCol,
            Entity as OrderItemDiscounts,
        },
        order_items::{self, Column as OrderItemCol, Entity as OrderItems},
        orders::{Column as OrderCol, Model as OrderModel},
    },
    error::{AppError, AppResult},
    middleware::tenancy::ensure_company_role,
    models::{Order, OrderItemDiscount, parse_column},
    response::{ApiResponse, Meta},
    services::{order_service::find_scoped_order, pricing_service::apply_order_event},
    state::AppState,
};

/// Discounts can change the total until the order is invoiced or shipped.
fn ensure_discounts_open(order: &OrderModel) -> AppResult<()> {
    let status: OrderStatus = parse_column(&order.status)?;
    let stage: OrderStage = parse_column(&order.stage)?;
    if status.is_cancelled() {
        return Err(AppError::InvalidTransition("order is cancelled".into()));
    }
    if status == OrderStatus::Invoiced {
        return Err(AppError::InvalidTransition("order is invoiced".into()));
    }
    if stage.is_terminal() {
        return Err(AppError::InvalidTransition("order is shipped".into()));
    }
    Ok(())
}

pub async fn request_discount(
    state: &AppState,
    ctx: &RequestContext,
    order_id: Uuid,
    item_id: Uuid,
    payload: RequestDiscountRequest,
) -> AppResult<ApiResponse<OrderItemDiscount>> {
    validate_discount(payload.kind, payload.value)?;

    let txn = state.orm.begin().await?;
    let order = find_scoped_order(&txn, ctx, order_id, true).await?;
    ensure_discounts_open(&order)?;

    OrderItems::find()
        .filter(OrderItemCol::Id.eq(item_id))
        .filter(OrderItemCol::OrderId.eq(order.id))
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let discount = DiscountActive {
        id: Set(Uuid::new_v4()),
        order_item_id: Set(item_id),
        requested_by: Set(ctx.actor_id),
        approved_by: Set(None),
        kind: Set(payload.kind.as_str().to_string()),
        value: Set(payload.value),
        status: Set(DiscountStatus::Pending.as_str().to_string()),
        reason: Set(payload.reason),
        created_at: NotSet,
        decided_at: Set(None),
    }
    .insert(&txn)
    .await?;

    apply_order_event(
        &txn,
        order.id,
        OrderEvent::DiscountRequested {
            discount_id: discount.id,
        },
    )
    .await?;
    txn.commit().await?;

    audit::record(
        state,
        ctx,
        "discount_request",
        "order_item_discounts",
        serde_json::json!({
            "order_id": order_id,
            "item_id": item_id,
            "discount_id": discount.id,
            "kind": discount.kind,
            "value": discount.value
        }),
    )
    .await;

    Ok(ApiResponse::success(
        "Discount requested",
        OrderItemDiscount::try_from(discount)?,
        Some(Meta::empty()),
    ))
}

pub async fn list_discounts(
    state: &AppState,
    ctx: &RequestContext,
    order_id: Option<Uuid>,
    query: DiscountListQuery,
) -> AppResult<ApiResponse<DiscountList>> {
    let mut finder = OrderItemDiscounts::find()
        .join(
            JoinType::InnerJoin,
            order_item_discounts::Relation::OrderItems.def(),
        )
        .join(JoinType::InnerJoin, order_items::Relation::Orders.def())
        .filter(OrderCol::CompanyId.eq(ctx.company_id));

    if let Some(order_id) = order_id {
        finder = finder.filter(OrderCol::Id.eq(order_id));
    }
    if let Some(status) = query.status {
        finder = finder.filter(DiscountCol::Status.eq(status.as_str()));
    }

    let items = finder
        .order_by_desc(DiscountCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(OrderItemDiscount::try_from)
        .collect::<AppResult<Vec<_>>>()?;

    Ok(ApiResponse::success(
        "Discounts",
        DiscountList { items },
        Some(Meta::empty()),
    ))
}

/// Approve or reject a discount. Pending discounts can be approved or
/// rejected; an approved discount can still be revoked by rejecting it.
/// The decision is recorded against the real actor and the order is
/// repriced in the same transaction.
pub async fn decide_discount(
    state: &AppState,
    ctx: &RequestContext,
    discount_id: Uuid,
    decision: DiscountStatus,
) -> AppResult<ApiResponse<DiscountDecision>> {
    ensure_company_role(ctx, &[CompanyRole::Admin])?;
    if decision == DiscountStatus::Pending {
        return Err(AppError::Validation(
            "decision must be APPROVED or REJECTED".into(),
        ));
    }

    let txn = state.orm.begin().await?;

    let (discount, item) = OrderItemDiscounts::find_by_id(discount_id)
        .find_also_related(OrderItems)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    let item = item.ok_or(AppError::NotFound)?;

    // order lock first, then re-read the discount under it
    let order = find_scoped_order(&txn, ctx, item.order_id, true).await?;
    ensure_discounts_open(&order)?;

    let discount = OrderItemDiscounts::find_by_id(discount.id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    let current: DiscountStatus = parse_column(&discount.status)?;
    let allowed = matches!(
        (current, decision),
        (DiscountStatus::Pending, DiscountStatus::Approved)
            | (DiscountStatus::Pending, DiscountStatus::Rejected)
            | (DiscountStatus::Approved, DiscountStatus::Rejected)
    );
    if !allowed {
        return Err(AppError::InvalidTransition(format!(
            "discount is {} and cannot become {}",
            current.as_str(),
            decision.as_str()
        )));
    }

    let mut active: DiscountActive = discount.into();
    active.status = Set(decision.as_str().to_string());
    active.approved_by = Set(Some(ctx.actor_id));
    active.decided_at = Set(Some(Utc::now().into()));
    let discount = active.update(&txn).await?;

    let event = match decision {
        DiscountStatus::Approved => OrderEvent::DiscountApproved {
            discount_id: discount.id,
        },
        _ => OrderEvent::DiscountRejected {
            discount_id: discount.id,
        },
    };
    let order = apply_order_event(&txn, order.id, event)
        .await?
        .ok_or(AppError::NotFound)?;
    txn.commit().await?;

    tracing::info!(
        discount_id = %discount.id,
        order_id = %order.id,
        decision = decision.as_str(),
        actor_id = %ctx.actor_id,
        total = %order.total,
        "discount decided"
    );
    audit::record(
        state,
        ctx,
        event.name(),
        "order_item_discounts",
        serde_json::json!({
            "discount_id": discount.id,
            "order_id": order.id,
            "previous": current.as_str(),
            "total": order.total
        }),
    )
    .await;

    Ok(ApiResponse::success(
        "Discount decided",
        DiscountDecision {
            discount: OrderItemDiscount::try_from(discount)?,
            order: Order::try_from(order)?,
        },
        Some(Meta::empty()),
    ))
}
