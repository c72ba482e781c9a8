mod common;

use std::sync::Arc;

use b2b_portal_api::{
    domain::{
        ActiveCompany, CompanyRole, DiscountKind, DiscountStatus, GlobalRole, OrderStage,
        OrderStatus,
    },
    dto::{
        cart::AddToCartRequest,
        discounts::RequestDiscountRequest,
        orders::{CheckoutRequest, UpdateOrderItemRequest},
    },
    entity::products::{ActiveModel as ProductActive, Entity as Products},
    error::AppError,
    printing::{DocumentPrinter, OrderSnapshot, PrintError, PrintedDocument},
    services::{
        cart_service, discount_service, impersonation_service, order_service, stage_service,
        tenancy_service,
    },
};
use common::{
    add_membership, create_company, create_product, create_user, database_url, login,
    setup_state,
};
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};

struct JammedPrinter;

impl DocumentPrinter for JammedPrinter {
    fn render(&self, _order: &OrderSnapshot) -> Result<PrintedDocument, PrintError> {
        Err(PrintError::Render("paper jam".into()))
    }
}

// Buyer checks out, admin approves a discount, the order is printed, other
// companies cannot see it, and a superadmin can step in as the company.
#[tokio::test]
async fn checkout_discount_print_and_impersonation_flow() -> anyhow::Result<()> {
    let Some(database_url) = database_url() else {
        return Ok(());
    };

    let state = setup_state(&database_url).await?;

    let acme = create_company(&state, "Acme Wholesale", "11.111.111/0001-11").await?;
    let globex = create_company(&state, "Globex Supplies", "22.222.222/0001-22").await?;

    let buyer = create_user(&state, "user", "buyer@acme.test").await?;
    let admin = create_user(&state, "user", "admin@acme.test").await?;
    let outsider = create_user(&state, "user", "buyer@globex.test").await?;
    let superadmin = create_user(&state, "superadmin", "root@portal.test").await?;

    add_membership(&state, buyer, acme, CompanyRole::Buyer).await?;
    add_membership(&state, admin, acme, CompanyRole::Admin).await?;
    add_membership(&state, outsider, globex, CompanyRole::Buyer).await?;

    let bolts = create_product(&state, acme, "BOLT-M8", "Steel bolts M8", dec!(10.00), 20).await?;
    let wire = create_product(&state, acme, "WIRE-CU", "Copper wire", dec!(50.00), 5).await?;

    let buyer_auth = login(&state, buyer, GlobalRole::User).await?;
    let admin_auth = login(&state, admin, GlobalRole::User).await?;
    let outsider_auth = login(&state, outsider, GlobalRole::User).await?;
    let root_auth = login(&state, superadmin, GlobalRole::Superadmin).await?;

    // single membership resolves without an explicit selection
    let buyer_ctx = tenancy_service::resolve_context(&state, &buyer_auth).await?;
    assert_eq!(buyer_ctx.company_id, acme);
    let admin_ctx = tenancy_service::resolve_context(&state, &admin_auth).await?;
    assert_eq!(admin_ctx.company_role, CompanyRole::Admin);

    // cart -> checkout
    for (product_id, quantity) in [(bolts, 3), (wire, 1)] {
        cart_service::add_to_cart(
            &state,
            &buyer_ctx,
            AddToCartRequest {
                product_id,
                quantity,
            },
        )
        .await?;
    }
    let detail = order_service::checkout(&state, &buyer_ctx, CheckoutRequest::default())
        .await?
        .data
        .expect("order detail");
    let order_id = detail.order.id;
    assert_eq!(detail.order.status, OrderStatus::Quote);
    assert_eq!(detail.order.stage, OrderStage::AwaitingPrint);
    assert_eq!(detail.order.subtotal, dec!(80.00));
    assert_eq!(detail.order.total, dec!(80.00));
    assert_eq!(detail.items.len(), 2);

    let stock = Products::find_by_id(bolts).one(&state.orm).await?.expect("product");
    assert_eq!(stock.stock, 17);
    // the whole order id goes into the number, not a short prefix of it
    assert!(detail.order.order_number.starts_with("ORD-"));
    assert!(
        detail
            .order
            .order_number
            .ends_with(&format!("-{}", order_id.simple().to_string().to_uppercase()))
    );

    // a later catalog price change does not touch the order
    let mut repriced: ProductActive = stock.into();
    repriced.price = Set(dec!(99.90));
    repriced.update(&state.orm).await?;
    let recalculated = order_service::recalculate(&state, &buyer_ctx, order_id)
        .await?
        .data
        .expect("order");
    assert_eq!(recalculated.subtotal, dec!(80.00));
    assert_eq!(recalculated.total, dec!(80.00));
    let snapshot = order_service::get_order(&state, &buyer_ctx, order_id)
        .await?
        .data
        .expect("order");
    let bolt_item = snapshot
        .items
        .iter()
        .find(|line| line.item.product_id == bolts)
        .expect("bolt line");
    assert_eq!(bolt_item.item.unit_price, dec!(10.00));

    // a pending discount does not change the total
    let bolt_line = detail
        .items
        .iter()
        .find(|line| line.item.product_id == bolts)
        .expect("bolt line")
        .item
        .id;
    let discount = discount_service::request_discount(
        &state,
        &buyer_ctx,
        order_id,
        bolt_line,
        RequestDiscountRequest {
            kind: DiscountKind::Fixed,
            value: dec!(5.00),
            reason: Some("loyal customer".into()),
        },
    )
    .await?
    .data
    .expect("discount");
    assert_eq!(discount.status, DiscountStatus::Pending);

    let order = order_service::get_order(&state, &buyer_ctx, order_id)
        .await?
        .data
        .expect("order");
    assert_eq!(order.order.total, dec!(80.00));

    // buyers cannot decide discounts
    let err = discount_service::decide_discount(
        &state,
        &buyer_ctx,
        discount.id,
        DiscountStatus::Approved,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    let decision = discount_service::decide_discount(
        &state,
        &admin_ctx,
        discount.id,
        DiscountStatus::Approved,
    )
    .await?
    .data
    .expect("decision");
    assert_eq!(decision.discount.approved_by, Some(admin));
    assert_eq!(decision.order.total_discount, dec!(5.00));
    assert_eq!(decision.order.total, dec!(75.00));

    // deciding twice is not a valid transition
    let err = discount_service::decide_discount(
        &state,
        &admin_ctx,
        discount.id,
        DiscountStatus::Approved,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition(_)));

    // quantity change reprices with the approved discount still applied
    let edited = order_service::update_item(
        &state,
        &admin_ctx,
        order_id,
        bolt_line,
        UpdateOrderItemRequest { quantity: 4 },
    )
    .await?
    .data
    .expect("order detail");
    assert_eq!(edited.order.subtotal, dec!(90.00));
    assert_eq!(edited.order.total, dec!(85.00));

    // a failed print leaves the stage where it was
    let jammed = state.clone().with_printer(Arc::new(JammedPrinter));
    let err = stage_service::advance_order_stage(
        &jammed,
        &admin_ctx,
        order_id,
        OrderStage::AwaitingPrint,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::SideEffect(_)));
    let order = order_service::get_order(&state, &admin_ctx, order_id)
        .await?
        .data
        .expect("order");
    assert_eq!(order.order.stage, OrderStage::AwaitingPrint);

    let advanced = stage_service::advance_order_stage(
        &state,
        &admin_ctx,
        order_id,
        OrderStage::AwaitingPrint,
    )
    .await?
    .data
    .expect("stage advanced");
    assert_eq!(advanced.previous_stage, OrderStage::AwaitingPrint);
    assert_eq!(advanced.order.stage, OrderStage::Printed);
    let document = advanced.document.expect("picking list");
    assert!(document.content.contains("Steel bolts M8"));

    // replaying the same request does not skip a stage
    let err = stage_service::advance_order_stage(
        &state,
        &admin_ctx,
        order_id,
        OrderStage::AwaitingPrint,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition(_)));

    // lines are frozen once printed
    let err = order_service::update_item(
        &state,
        &admin_ctx,
        order_id,
        bolt_line,
        UpdateOrderItemRequest { quantity: 1 },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition(_)));

    // another company's user sees nothing
    let outsider_ctx = tenancy_service::resolve_context(&state, &outsider_auth).await?;
    assert_eq!(outsider_ctx.company_id, globex);
    let err = order_service::get_order(&state, &outsider_ctx, order_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));
    let err = discount_service::decide_discount(
        &state,
        &outsider_ctx,
        discount.id,
        DiscountStatus::Rejected,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden | AppError::NotFound));

    // superadmin has no company of its own until impersonating
    let err = tenancy_service::resolve_context(&state, &root_auth)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ScopeViolation(_)));

    let err = impersonation_service::enter_impersonation(&state, &buyer_auth, acme)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    let entered = impersonation_service::enter_impersonation(&state, &root_auth, acme).await?;
    assert_eq!(entered.impersonated_company_id, Some(acme));
    assert!(!entered.invalidate.is_empty());

    let root_ctx = tenancy_service::resolve_context(&state, &root_auth).await?;
    assert_eq!(root_ctx.company_id, acme);
    assert_eq!(root_ctx.actor_id, superadmin);
    assert!(root_ctx.impersonating);
    let seen = order_service::get_order(&state, &root_ctx, order_id)
        .await?
        .data
        .expect("order");
    assert_eq!(seen.order.total, dec!(85.00));

    let exited = impersonation_service::exit_impersonation(&state, &root_auth).await?;
    assert_eq!(exited.impersonated_company_id, None);
    assert_eq!(exited.resolution, ActiveCompany::None);
    assert!(tenancy_service::resolve_context(&state, &root_auth).await.is_err());

    // cancelling returns the stock
    order_service::cancel_order(&state, &admin_ctx, order_id).await?;
    let stock = Products::find_by_id(bolts).one(&state.orm).await?.expect("product");
    assert_eq!(stock.stock, 20);

    Ok(())
}
