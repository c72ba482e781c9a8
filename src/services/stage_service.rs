use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryOrder, Set, TransactionTrait};
use uuid::Uuid;

use crate::{
    audit,
    domain::{CompanyRole, OrderStage, OrderStatus, RequestContext, stage::plan_advance},
    dto::orders::StageAdvanced,
    entity::{
        companies::Entity as Companies,
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, Model as OrderModel},
    },
    error::{AppError, AppResult},
    middleware::tenancy::ensure_company_role,
    models::{Order, parse_column},
    printing::{OrderSnapshot, PrintLine},
    response::{ApiResponse, Meta},
    services::order_service::find_scoped_order,
    state::AppState,
};

async fn order_snapshot<C: ConnectionTrait>(conn: &C, order: &OrderModel) -> AppResult<OrderSnapshot> {
    let lines = order
        .find_related(OrderItems)
        .order_by_asc(OrderItemCol::CreatedAt)
        .all(conn)
        .await?
        .into_iter()
        .map(|item| PrintLine {
            product_name: item.product_name,
            quantity: item.quantity,
            unit_price: item.unit_price,
        })
        .collect();

    let company_name = Companies::find_by_id(order.company_id)
        .one(conn)
        .await?
        .map(|c| c.name)
        .unwrap_or_default();

    Ok(OrderSnapshot {
        order_id: order.id,
        order_number: order.order_number.clone(),
        company_name,
        lines,
        subtotal: order.subtotal,
        total_discount: order.total_discount,
        freight: order.freight,
        total: order.total,
    })
}

/// Move an order one step forward through the fulfillment pipeline.
///
/// `from_stage` must match the stored stage, which makes a repeated request
/// fail with `InvalidTransition` instead of advancing twice. When the step
/// needs a document, the stage is written only after the document rendered.
pub async fn advance_order_stage(
    state: &AppState,
    ctx: &RequestContext,
    order_id: Uuid,
    from_stage: OrderStage,
) -> AppResult<ApiResponse<StageAdvanced>> {
    ensure_company_role(ctx, &[CompanyRole::Admin, CompanyRole::Operator])?;

    let txn = state.orm.begin().await?;
    let order = find_scoped_order(&txn, ctx, order_id, true).await?;
    let status: OrderStatus = parse_column(&order.status)?;
    let current: OrderStage = parse_column(&order.stage)?;
    let action = plan_advance(status, current, from_stage)?;

    let document = if action.requires_document() {
        let snapshot = order_snapshot(&txn, &order).await?;
        match state.printer.render(&snapshot) {
            Ok(doc) => Some(doc),
            Err(err) => {
                tracing::warn!(
                    order_id = %order_id,
                    stage = %current,
                    error = %err,
                    "document generation failed, stage unchanged"
                );
                return Err(AppError::from(err));
            }
        }
    } else {
        None
    };

    let mut active: OrderActive = order.into();
    active.stage = Set(action.next.as_str().to_string());
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;
    txn.commit().await?;

    tracing::info!(
        order_id = %order.id,
        from = %current,
        to = %action.next,
        actor_id = %ctx.actor_id,
        impersonating = ctx.impersonating,
        "order stage advanced"
    );
    audit::record(
        state,
        ctx,
        "order_stage_advance",
        "orders",
        serde_json::json!({
            "order_id": order.id,
            "from": current.as_str(),
            "to": action.next.as_str(),
            "document": document.as_ref().map(|d| d.file_name.clone())
        }),
    )
    .await;

    Ok(ApiResponse::success(
        action.label,
        StageAdvanced {
            order: Order::try_from(order)?,
            previous_stage: current,
            document,
        },
        Some(Meta::empty()),
    ))
}
