mod common;

use b2b_portal_api::{
    domain::{CompanyRole, DiscountKind, DiscountStatus, GlobalRole, OrderStatus},
    dto::{
        cart::AddToCartRequest,
        discounts::RequestDiscountRequest,
        orders::{CheckoutRequest, UpdateOrderStatusRequest},
    },
    error::AppError,
    services::{cart_service, discount_service, order_service, pricing_service, tenancy_service},
};
use common::{
    add_membership, create_company, create_product, create_user, database_url, login,
    setup_state,
};
use rust_decimal_macros::dec;
use uuid::Uuid;

// Persisted repricing tolerates missing orders and is stable when repeated;
// once invoiced, discounts can no longer move the total.
#[tokio::test]
async fn stored_totals_are_stable_and_frozen_after_invoicing() -> anyhow::Result<()> {
    let Some(database_url) = database_url() else {
        return Ok(());
    };

    let state = setup_state(&database_url).await?;

    let company = create_company(&state, "Initech Parts", "33.333.333/0001-33").await?;
    let admin = create_user(&state, "user", "admin@initech.test").await?;
    add_membership(&state, admin, company, CompanyRole::Admin).await?;
    let gears = create_product(&state, company, "GEAR-12", "Gear 12T", dec!(3.33), 50).await?;

    let auth = login(&state, admin, GlobalRole::User).await?;
    let ctx = tenancy_service::resolve_context(&state, &auth).await?;

    // unknown order: nothing to price, not an error
    let missing = pricing_service::recalc_order_totals(&state.orm, Uuid::new_v4()).await?;
    assert!(missing.is_none());

    cart_service::add_to_cart(
        &state,
        &ctx,
        AddToCartRequest {
            product_id: gears,
            quantity: 3,
        },
    )
    .await?;
    let detail = order_service::checkout(&state, &ctx, CheckoutRequest::default())
        .await?
        .data
        .expect("order detail");
    let order_id = detail.order.id;
    let line = detail.items[0].item.id;

    let discount = discount_service::request_discount(
        &state,
        &ctx,
        order_id,
        line,
        RequestDiscountRequest {
            kind: DiscountKind::Percentage,
            value: dec!(15),
            reason: None,
        },
    )
    .await?
    .data
    .expect("discount");
    discount_service::decide_discount(&state, &ctx, discount.id, DiscountStatus::Approved)
        .await?;

    let first = pricing_service::recalc_order_totals(&state.orm, order_id)
        .await?
        .expect("order");
    let second = pricing_service::recalc_order_totals(&state.orm, order_id)
        .await?
        .expect("order");
    // 3 x 3.33 = 9.99; 15% of it rounds to 1.50
    assert_eq!(
        (first.subtotal, first.total_discount, first.total),
        (dec!(9.99), dec!(1.50), dec!(8.49))
    );
    assert_eq!(
        (first.subtotal, first.total_discount, first.total),
        (second.subtotal, second.total_discount, second.total)
    );

    let pending = discount_service::request_discount(
        &state,
        &ctx,
        order_id,
        line,
        RequestDiscountRequest {
            kind: DiscountKind::Fixed,
            value: dec!(1.00),
            reason: Some("late delivery".into()),
        },
    )
    .await?
    .data
    .expect("discount");

    for status in [OrderStatus::Generated, OrderStatus::Invoiced] {
        order_service::update_status(&state, &ctx, order_id, UpdateOrderStatusRequest { status })
            .await?;
    }

    let err = discount_service::decide_discount(&state, &ctx, pending.id, DiscountStatus::Approved)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition(_)));

    let err = discount_service::decide_discount(&state, &ctx, discount.id, DiscountStatus::Rejected)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition(_)));

    let err = discount_service::request_discount(
        &state,
        &ctx,
        order_id,
        line,
        RequestDiscountRequest {
            kind: DiscountKind::Fixed,
            value: dec!(2.00),
            reason: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition(_)));

    let invoiced = order_service::get_order(&state, &ctx, order_id)
        .await?
        .data
        .expect("order");
    assert_eq!(invoiced.order.status, OrderStatus::Invoiced);
    assert_eq!(invoiced.order.total, dec!(8.49));

    Ok(())
}
