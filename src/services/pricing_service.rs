use chrono::Utc;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    domain::{LineDiscount, OrderEvent, OrderTotals, PricedLine, compute_totals},
    entity::{
        order_item_discounts::{Column as DiscountCol, Entity as OrderItemDiscounts},
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, Entity as Orders, Model as OrderModel},
    },
    error::AppResult,
    models::parse_column,
};

/// Read the current lines and discounts of an order and price them.
/// Must run on the same connection/transaction that holds the order lock.
pub async fn price_order<C: ConnectionTrait>(conn: &C, order_id: Uuid) -> AppResult<OrderTotals> {
    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order_id))
        .all(conn)
        .await?;

    let lines: Vec<PricedLine> = items
        .iter()
        .map(|item| PricedLine {
            item_id: item.id,
            quantity: item.quantity,
            unit_price: item.unit_price,
        })
        .collect();

    if lines.is_empty() {
        return Ok(compute_totals(&[], &[]));
    }

    let discounts = OrderItemDiscounts::find()
        .filter(DiscountCol::OrderItemId.is_in(lines.iter().map(|l| l.item_id)))
        .all(conn)
        .await?
        .into_iter()
        .map(|d| {
            Ok(LineDiscount {
                item_id: d.order_item_id,
                kind: parse_column(&d.kind)?,
                value: d.value,
                status: parse_column(&d.status)?,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(compute_totals(&lines, &discounts))
}

/// Recompute and persist `subtotal`, `total_discount` and `total`.
///
/// Locks the order row first and re-reads discount state under the lock, so
/// concurrent recalculations on one order serialize. Returns `None` when the
/// order does not exist.
pub async fn recalc_order_totals<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
) -> AppResult<Option<OrderModel>> {
    let order = Orders::find_by_id(order_id)
        .lock(LockType::Update)
        .one(conn)
        .await?;
    let Some(order) = order else {
        return Ok(None);
    };

    let totals = price_order(conn, order_id).await?;

    if order.subtotal == totals.subtotal
        && order.total_discount == totals.total_discount
        && order.total == totals.total
    {
        return Ok(Some(order));
    }

    tracing::debug!(
        order_id = %order_id,
        subtotal = %totals.subtotal,
        total_discount = %totals.total_discount,
        total = %totals.total,
        "order totals recalculated"
    );

    let mut active: OrderActive = order.into();
    active.subtotal = Set(totals.subtotal);
    active.total_discount = Set(totals.total_discount);
    active.total = Set(totals.total);
    active.updated_at = Set(Utc::now().into());
    let order = active.update(conn).await?;

    Ok(Some(order))
}

/// React to an order event; repricing happens here and nowhere else.
pub async fn apply_order_event<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
    event: OrderEvent,
) -> AppResult<Option<OrderModel>> {
    tracing::debug!(order_id = %order_id, event = event.name(), "order event");
    if event.affects_totals() {
        recalc_order_totals(conn, order_id).await
    } else {
        Ok(Orders::find_by_id(order_id).one(conn).await?)
    }
}
