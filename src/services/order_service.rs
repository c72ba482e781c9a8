use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, FromQueryResult,
    JoinType, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
    Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    domain::{
        CompanyRole, OrderEvent, OrderStage, OrderStatus, RequestContext,
        pricing::{validate_price, validate_quantity},
        stage::plan_cancel,
    },
    dto::orders::{
        AddOrderItemRequest, CheckoutRequest, OrderItemWithDiscounts, OrderList, OrderWithItems,
        UpdateFreightRequest, UpdateOrderItemRequest, UpdateOrderStatusRequest,
    },
    entity::{
        cart_items::{self, Column as CartCol, Entity as CartItems},
        order_item_discounts::{Column as DiscountCol, Entity as OrderItemDiscounts},
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        products::{Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::tenancy::ensure_company_role,
    models::{Order, OrderItem, OrderItemDiscount, parse_column},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::pricing_service::{apply_order_event, recalc_order_totals},
    state::AppState,
};

const ITEM_EDITORS: [CompanyRole; 2] = [CompanyRole::Admin, CompanyRole::Operator];

/// Load an order of the active company. Orders of other companies are
/// reported as missing.
pub async fn find_scoped_order<C: ConnectionTrait>(
    conn: &C,
    ctx: &RequestContext,
    id: Uuid,
    lock: bool,
) -> AppResult<OrderModel> {
    let mut finder = Orders::find().filter(
        Condition::all()
            .add(OrderCol::CompanyId.eq(ctx.company_id))
            .add(OrderCol::Id.eq(id)),
    );
    if lock {
        finder = finder.lock(LockType::Update);
    }
    finder.one(conn).await?.ok_or(AppError::NotFound)
}

/// Lines can change only while the order is still a live, unprinted order.
fn ensure_items_editable(order: &OrderModel) -> AppResult<()> {
    let status: OrderStatus = parse_column(&order.status)?;
    let stage: OrderStage = parse_column(&order.stage)?;
    if status.is_cancelled() {
        return Err(AppError::InvalidTransition("order is cancelled".into()));
    }
    if status == OrderStatus::Invoiced {
        return Err(AppError::InvalidTransition("order is invoiced".into()));
    }
    if stage != OrderStage::AwaitingPrint {
        return Err(AppError::InvalidTransition(format!(
            "order items cannot change at stage {stage}"
        )));
    }
    Ok(())
}

pub async fn list_orders(
    state: &AppState,
    ctx: &RequestContext,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all().add(OrderCol::CompanyId.eq(ctx.company_id));
    if let Some(status) = query.status {
        condition = condition.add(OrderCol::Status.eq(status.as_str()));
    }
    if let Some(stage) = query.stage {
        condition = condition.add(OrderCol::Stage.eq(stage.as_str()));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);

    let mut finder = Orders::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::try_from)
        .collect::<AppResult<Vec<_>>>()?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Ok",
        OrderList { items: orders },
        Some(meta),
    ))
}

/// Order with its lines and every discount on those lines.
pub async fn load_order_detail<C: ConnectionTrait>(
    conn: &C,
    order: OrderModel,
) -> AppResult<OrderWithItems> {
    let items = order
        .find_related(OrderItems)
        .order_by_asc(OrderItemCol::CreatedAt)
        .all(conn)
        .await?;

    let mut discounts: HashMap<Uuid, Vec<OrderItemDiscount>> = HashMap::new();
    if !items.is_empty() {
        let rows = OrderItemDiscounts::find()
            .filter(DiscountCol::OrderItemId.is_in(items.iter().map(|i| i.id)))
            .order_by_asc(DiscountCol::CreatedAt)
            .all(conn)
            .await?;
        for row in rows {
            let discount = OrderItemDiscount::try_from(row)?;
            discounts
                .entry(discount.order_item_id)
                .or_default()
                .push(discount);
        }
    }

    let items = items
        .into_iter()
        .map(|item| {
            let item_discounts = discounts.remove(&item.id).unwrap_or_default();
            OrderItemWithDiscounts {
                item: OrderItem::from(item),
                discounts: item_discounts,
            }
        })
        .collect();

    Ok(OrderWithItems {
        order: Order::try_from(order)?,
        items,
    })
}

pub async fn get_order(
    state: &AppState,
    ctx: &RequestContext,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = find_scoped_order(&state.orm, ctx, id, false).await?;
    let data = load_order_detail(&state.orm, order).await?;
    Ok(ApiResponse::success("OK", data, Some(Meta::empty())))
}

pub async fn checkout(
    state: &AppState,
    ctx: &RequestContext,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    ensure_company_role(ctx, &[CompanyRole::Admin, CompanyRole::Buyer])?;
    let freight = payload.freight.unwrap_or(Decimal::ZERO);
    validate_price(freight)?;

    let txn = state.orm.begin().await?;

    #[derive(Debug, FromQueryResult)]
    struct CartProductRow {
        product_id: Uuid,
        quantity: i32,
        name: String,
        price: Decimal,
        stock: i32,
        active: bool,
    }

    let rows = CartItems::find()
        .select_only()
        .column(CartCol::ProductId)
        .column(CartCol::Quantity)
        .column(ProdCol::Name)
        .column(ProdCol::Price)
        .column(ProdCol::Stock)
        .column(ProdCol::Active)
        .join(JoinType::InnerJoin, cart_items::Relation::Products.def())
        .filter(CartCol::CompanyId.eq(ctx.company_id))
        .filter(CartCol::UserId.eq(ctx.actor_id))
        .filter(ProdCol::CompanyId.eq(ctx.company_id))
        .lock(LockType::Update)
        .into_model::<CartProductRow>()
        .all(&txn)
        .await?;

    if rows.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }

    for row in &rows {
        validate_quantity(row.quantity)?;
        if !row.active {
            return Err(AppError::BadRequest(format!(
                "Product {} is no longer available",
                row.product_id
            )));
        }
        if row.stock < row.quantity {
            return Err(AppError::BadRequest(format!(
                "Insufficient stock for product {}",
                row.product_id
            )));
        }
    }

    let order_id = Uuid::new_v4();
    let now = Utc::now();
    let order = OrderActive {
        id: Set(order_id),
        company_id: Set(ctx.company_id),
        created_by: Set(ctx.actor_id),
        order_number: Set(build_order_number(order_id)),
        status: Set(OrderStatus::Quote.as_str().to_string()),
        stage: Set(OrderStage::initial().as_str().to_string()),
        subtotal: Set(Decimal::ZERO),
        total_discount: Set(Decimal::ZERO),
        freight: Set(freight),
        total: Set(Decimal::ZERO),
        notes: Set(payload.notes),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;

    for row in &rows {
        OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(row.product_id),
            product_name: Set(row.name.clone()),
            quantity: Set(row.quantity),
            unit_price: Set(row.price),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;

        // reduce stock
        Products::update_many()
            .col_expr(ProdCol::Stock, Expr::col(ProdCol::Stock).sub(row.quantity))
            .filter(ProdCol::Id.eq(row.product_id))
            .exec(&txn)
            .await?;
    }

    // clear cart
    CartItems::delete_many()
        .filter(CartCol::CompanyId.eq(ctx.company_id))
        .filter(CartCol::UserId.eq(ctx.actor_id))
        .exec(&txn)
        .await?;

    let order = apply_order_event(&txn, order.id, OrderEvent::ItemsChanged)
        .await?
        .ok_or(AppError::NotFound)?;
    let data = load_order_detail(&txn, order).await?;

    txn.commit().await?;

    tracing::info!(
        order_id = %data.order.id,
        company_id = %ctx.company_id,
        actor_id = %ctx.actor_id,
        total = %data.order.total,
        "checkout completed"
    );
    audit::record(
        state,
        ctx,
        "checkout",
        "orders",
        serde_json::json!({ "order_id": data.order.id, "order_number": data.order.order_number }),
    )
    .await;

    Ok(ApiResponse::success(
        "Checkout success",
        data,
        Some(Meta::empty()),
    ))
}

pub async fn add_item(
    state: &AppState,
    ctx: &RequestContext,
    order_id: Uuid,
    payload: AddOrderItemRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    ensure_company_role(ctx, &ITEM_EDITORS)?;
    validate_quantity(payload.quantity)?;

    let txn = state.orm.begin().await?;
    let order = find_scoped_order(&txn, ctx, order_id, true).await?;
    ensure_items_editable(&order)?;

    let product = Products::find()
        .filter(ProdCol::Id.eq(payload.product_id))
        .filter(ProdCol::CompanyId.eq(ctx.company_id))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::BadRequest("product not found".into()))?;

    if !product.active {
        return Err(AppError::BadRequest("product is not available".into()));
    }
    if product.stock < payload.quantity {
        return Err(AppError::BadRequest(format!(
            "Insufficient stock for product {}",
            product.id
        )));
    }

    let item = OrderItemActive {
        id: Set(Uuid::new_v4()),
        order_id: Set(order.id),
        product_id: Set(product.id),
        product_name: Set(product.name.clone()),
        quantity: Set(payload.quantity),
        unit_price: Set(product.price),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    Products::update_many()
        .col_expr(ProdCol::Stock, Expr::col(ProdCol::Stock).sub(payload.quantity))
        .filter(ProdCol::Id.eq(product.id))
        .exec(&txn)
        .await?;

    let order = apply_order_event(&txn, order.id, OrderEvent::ItemsChanged)
        .await?
        .ok_or(AppError::NotFound)?;
    let data = load_order_detail(&txn, order).await?;
    txn.commit().await?;

    audit::record(
        state,
        ctx,
        "order_item_add",
        "order_items",
        serde_json::json!({ "order_id": order_id, "item_id": item.id, "quantity": item.quantity }),
    )
    .await;

    Ok(ApiResponse::success("Item added", data, Some(Meta::empty())))
}

async fn find_order_item<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
    item_id: Uuid,
) -> AppResult<OrderItemModel> {
    OrderItems::find()
        .filter(OrderItemCol::Id.eq(item_id))
        .filter(OrderItemCol::OrderId.eq(order_id))
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn update_item(
    state: &AppState,
    ctx: &RequestContext,
    order_id: Uuid,
    item_id: Uuid,
    payload: UpdateOrderItemRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    ensure_company_role(ctx, &ITEM_EDITORS)?;
    validate_quantity(payload.quantity)?;

    let txn = state.orm.begin().await?;
    let order = find_scoped_order(&txn, ctx, order_id, true).await?;
    ensure_items_editable(&order)?;
    let item = find_order_item(&txn, order.id, item_id).await?;

    let delta = payload.quantity - item.quantity;
    if delta > 0 {
        let product = Products::find_by_id(item.product_id)
            .lock(LockType::Update)
            .one(&txn)
            .await?
            .ok_or(AppError::NotFound)?;
        if product.stock < delta {
            return Err(AppError::BadRequest(format!(
                "Insufficient stock for product {}",
                product.id
            )));
        }
    }
    if delta != 0 {
        Products::update_many()
            .col_expr(ProdCol::Stock, Expr::col(ProdCol::Stock).sub(delta))
            .filter(ProdCol::Id.eq(item.product_id))
            .exec(&txn)
            .await?;
    }

    // the unit price snapshot is kept; only the quantity moves
    let previous = item.quantity;
    let mut active: OrderItemActive = item.into();
    active.quantity = Set(payload.quantity);
    active.update(&txn).await?;

    let order = apply_order_event(&txn, order.id, OrderEvent::ItemsChanged)
        .await?
        .ok_or(AppError::NotFound)?;
    let data = load_order_detail(&txn, order).await?;
    txn.commit().await?;

    audit::record(
        state,
        ctx,
        "order_item_update",
        "order_items",
        serde_json::json!({
            "order_id": order_id,
            "item_id": item_id,
            "from": previous,
            "to": payload.quantity
        }),
    )
    .await;

    Ok(ApiResponse::success("Item updated", data, Some(Meta::empty())))
}

pub async fn remove_item(
    state: &AppState,
    ctx: &RequestContext,
    order_id: Uuid,
    item_id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    ensure_company_role(ctx, &ITEM_EDITORS)?;

    let txn = state.orm.begin().await?;
    let order = find_scoped_order(&txn, ctx, order_id, true).await?;
    ensure_items_editable(&order)?;
    let item = find_order_item(&txn, order.id, item_id).await?;

    Products::update_many()
        .col_expr(ProdCol::Stock, Expr::col(ProdCol::Stock).add(item.quantity))
        .filter(ProdCol::Id.eq(item.product_id))
        .exec(&txn)
        .await?;

    // discounts go with the line (ON DELETE CASCADE)
    OrderItems::delete_by_id(item.id).exec(&txn).await?;

    let order = apply_order_event(&txn, order.id, OrderEvent::ItemsChanged)
        .await?
        .ok_or(AppError::NotFound)?;
    let data = load_order_detail(&txn, order).await?;
    txn.commit().await?;

    audit::record(
        state,
        ctx,
        "order_item_remove",
        "order_items",
        serde_json::json!({ "order_id": order_id, "item_id": item_id }),
    )
    .await;

    Ok(ApiResponse::success("Item removed", data, Some(Meta::empty())))
}

pub async fn update_freight(
    state: &AppState,
    ctx: &RequestContext,
    order_id: Uuid,
    payload: UpdateFreightRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_company_role(ctx, &ITEM_EDITORS)?;
    validate_price(payload.freight)?;

    let txn = state.orm.begin().await?;
    let order = find_scoped_order(&txn, ctx, order_id, true).await?;
    let status: OrderStatus = parse_column(&order.status)?;
    if status.is_cancelled() {
        return Err(AppError::InvalidTransition("order is cancelled".into()));
    }

    let mut active: OrderActive = order.into();
    active.freight = Set(payload.freight);
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;

    let order = apply_order_event(&txn, order.id, OrderEvent::FreightChanged)
        .await?
        .ok_or(AppError::NotFound)?;
    txn.commit().await?;

    audit::record(
        state,
        ctx,
        "order_freight_update",
        "orders",
        serde_json::json!({ "order_id": order.id, "freight": order.freight }),
    )
    .await;

    Ok(ApiResponse::success(
        "Freight updated",
        Order::try_from(order)?,
        Some(Meta::empty()),
    ))
}

/// Explicit repricing; returns `NotFound` when the order is missing or
/// belongs to another company.
pub async fn recalculate(
    state: &AppState,
    ctx: &RequestContext,
    order_id: Uuid,
) -> AppResult<ApiResponse<Order>> {
    let txn = state.orm.begin().await?;
    find_scoped_order(&txn, ctx, order_id, true).await?;
    let order = recalc_order_totals(&txn, order_id)
        .await?
        .ok_or(AppError::NotFound)?;
    txn.commit().await?;

    Ok(ApiResponse::success(
        "Totals recalculated",
        Order::try_from(order)?,
        Some(Meta::empty()),
    ))
}

pub async fn update_status(
    state: &AppState,
    ctx: &RequestContext,
    order_id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    if payload.status == OrderStatus::Cancelled {
        return cancel_order(state, ctx, order_id).await;
    }
    ensure_company_role(ctx, &[CompanyRole::Admin])?;

    let txn = state.orm.begin().await?;
    let order = find_scoped_order(&txn, ctx, order_id, true).await?;
    let current: OrderStatus = parse_column(&order.status)?;
    if current.next() != Some(payload.status) {
        return Err(AppError::InvalidTransition(format!(
            "cannot move order from {} to {}",
            current.as_str(),
            payload.status.as_str()
        )));
    }

    let mut active: OrderActive = order.into();
    active.status = Set(payload.status.as_str().to_string());
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;
    txn.commit().await?;

    audit::record(
        state,
        ctx,
        "order_status_update",
        "orders",
        serde_json::json!({
            "order_id": order.id,
            "from": current.as_str(),
            "to": order.status
        }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order updated",
        Order::try_from(order)?,
        Some(Meta::empty()),
    ))
}

/// Cancel keeps the row and its stage; stock taken by the order is returned.
pub async fn cancel_order(
    state: &AppState,
    ctx: &RequestContext,
    order_id: Uuid,
) -> AppResult<ApiResponse<Order>> {
    ensure_company_role(ctx, &[CompanyRole::Admin])?;

    let txn = state.orm.begin().await?;
    let order = find_scoped_order(&txn, ctx, order_id, true).await?;
    let status: OrderStatus = parse_column(&order.status)?;
    let stage: OrderStage = parse_column(&order.stage)?;
    plan_cancel(status, stage)?;

    let items = order.find_related(OrderItems).all(&txn).await?;
    for item in &items {
        Products::update_many()
            .col_expr(ProdCol::Stock, Expr::col(ProdCol::Stock).add(item.quantity))
            .filter(ProdCol::Id.eq(item.product_id))
            .exec(&txn)
            .await?;
    }

    let mut active: OrderActive = order.into();
    active.status = Set(OrderStatus::Cancelled.as_str().to_string());
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;
    txn.commit().await?;

    tracing::info!(
        order_id = %order.id,
        stage = %stage,
        actor_id = %ctx.actor_id,
        "order cancelled"
    );
    audit::record(
        state,
        ctx,
        "order_cancel",
        "orders",
        serde_json::json!({ "order_id": order.id, "stage": stage.as_str() }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order cancelled",
        Order::try_from(order)?,
        Some(Meta::empty()),
    ))
}

/// `ORD-<date>-<order id>`; the full id keeps the number unique.
pub fn build_order_number(order_id: Uuid) -> String {
    let date = Utc::now().format("%Y%m%d");
    let suffix = order_id.simple().to_string().to_uppercase();
    format!("ORD-{date}-{suffix}")
}
