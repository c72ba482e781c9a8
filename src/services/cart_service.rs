use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    domain::{RequestContext, pricing::validate_quantity},
    dto::cart::{AddToCartRequest, CartItemDto, CartList},
    entity::{
        cart_items::{ActiveModel as CartActive, Column as CartCol, Entity as CartItems},
        products::{Column as ProductCol, Entity as Products},
    },
    error::{AppError, AppResult},
    models::{CartItem, Product},
    response::{ApiResponse, Empty, Meta},
    routes::params::Pagination,
    state::AppState,
};

/// The cart belongs to the user within the active company.
pub async fn list_cart(
    state: &AppState,
    ctx: &RequestContext,
    pagination: Pagination,
) -> AppResult<ApiResponse<CartList>> {
    let (page, limit, offset) = pagination.normalize();
    let finder = CartItems::find()
        .filter(CartCol::CompanyId.eq(ctx.company_id))
        .filter(CartCol::UserId.eq(ctx.actor_id));

    let total = finder.clone().count(&state.orm).await? as i64;

    let rows = finder
        .order_by_desc(CartCol::CreatedAt)
        .limit(limit as u64)
        .offset(offset as u64)
        .find_also_related(Products)
        .all(&state.orm)
        .await?;

    let items = rows
        .into_iter()
        .filter_map(|(item, product)| {
            product.map(|p| CartItemDto {
                id: item.id,
                product: Product::from(p),
                quantity: item.quantity,
            })
        })
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("OK", CartList { items }, Some(meta)))
}

/// Adding a product already in the cart replaces its quantity.
pub async fn add_to_cart(
    state: &AppState,
    ctx: &RequestContext,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartItem>> {
    validate_quantity(payload.quantity)?;

    let product = Products::find()
        .filter(ProductCol::Id.eq(payload.product_id))
        .filter(ProductCol::CompanyId.eq(ctx.company_id))
        .filter(ProductCol::Active.eq(true))
        .one(&state.orm)
        .await?;
    if product.is_none() {
        return Err(AppError::BadRequest("product not found".to_string()));
    }

    let existing = CartItems::find()
        .filter(CartCol::CompanyId.eq(ctx.company_id))
        .filter(CartCol::UserId.eq(ctx.actor_id))
        .filter(CartCol::ProductId.eq(payload.product_id))
        .one(&state.orm)
        .await?;

    let cart_item = match existing {
        Some(item) => {
            let mut active: CartActive = item.into();
            active.quantity = Set(payload.quantity);
            active.update(&state.orm).await?
        }
        None => {
            CartActive {
                id: Set(Uuid::new_v4()),
                company_id: Set(ctx.company_id),
                user_id: Set(ctx.actor_id),
                product_id: Set(payload.product_id),
                quantity: Set(payload.quantity),
                created_at: NotSet,
            }
            .insert(&state.orm)
            .await?
        }
    };

    audit::record(
        state,
        ctx,
        "cart_update",
        "cart_items",
        serde_json::json!({ "product_id": payload.product_id, "quantity": payload.quantity }),
    )
    .await;

    Ok(ApiResponse::success("OK", CartItem::from(cart_item), None))
}

pub async fn remove_from_cart(
    state: &AppState,
    ctx: &RequestContext,
    product_id: Uuid,
) -> AppResult<ApiResponse<Empty>> {
    let result = CartItems::delete_many()
        .filter(CartCol::CompanyId.eq(ctx.company_id))
        .filter(CartCol::UserId.eq(ctx.actor_id))
        .filter(CartCol::ProductId.eq(product_id))
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        state,
        ctx,
        "cart_remove",
        "cart_items",
        serde_json::json!({ "product_id": product_id }),
    )
    .await;

    Ok(ApiResponse::done("Removed from cart"))
}
