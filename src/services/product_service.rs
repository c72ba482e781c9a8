use uuid::Uuid;

use crate::{
    audit,
    domain::{CompanyRole, RequestContext, pricing::validate_price},
    dto::products::{CreateProductRequest, ProductList, UpdateProductRequest},
    entity::products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
    error::{AppError, AppResult},
    middleware::tenancy::ensure_company_role,
    models::Product,
    response::{ApiResponse, Empty, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    state::AppState,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::ActiveValue::NotSet;

async fn find_scoped_product<C: ConnectionTrait>(
    conn: &C,
    ctx: &RequestContext,
    id: Uuid,
) -> AppResult<ProductModel> {
    Products::find()
        .filter(Column::Id.eq(id))
        .filter(Column::CompanyId.eq(ctx.company_id))
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)
}

fn validate_stock(stock: i32) -> AppResult<()> {
    if stock < 0 {
        return Err(AppError::Validation("stock must not be negative".into()));
    }
    Ok(())
}

/// Catalog of the active company; prices are that company's prices.
pub async fn list_products(
    state: &AppState,
    ctx: &RequestContext,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all()
        .add(Column::CompanyId.eq(ctx.company_id))
        .add(Column::Active.eq(true));

    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::Sku).ilike(pattern.clone()))
                .add(Expr::col(Column::Description).ilike(pattern)),
        );
    }

    if let Some(min_price) = query.min_price {
        condition = condition.add(Column::Price.gte(min_price));
    }

    if let Some(max_price) = query.max_price {
        condition = condition.add(Column::Price.lte(max_price));
    }

    let sort_by = query.sort_by.unwrap_or(ProductSortBy::CreatedAt);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match sort_by {
        ProductSortBy::CreatedAt => Column::CreatedAt,
        ProductSortBy::Price => Column::Price,
        ProductSortBy::Name => Column::Name,
    };

    let mut finder = Products::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    let data = ProductList { items };
    Ok(ApiResponse::success("Products", data, Some(meta)))
}

pub async fn get_product(
    state: &AppState,
    ctx: &RequestContext,
    id: Uuid,
) -> AppResult<ApiResponse<Product>> {
    let product = find_scoped_product(&state.orm, ctx, id).await?;
    Ok(ApiResponse::success("Product", Product::from(product), None))
}

pub async fn create_product(
    state: &AppState,
    ctx: &RequestContext,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_company_role(ctx, &[CompanyRole::Admin])?;
    validate_price(payload.price)?;
    validate_stock(payload.stock)?;
    if payload.sku.trim().is_empty() || payload.name.trim().is_empty() {
        return Err(AppError::Validation("sku and name are required".into()));
    }

    let active = ActiveModel {
        id: Set(Uuid::new_v4()),
        company_id: Set(ctx.company_id),
        sku: Set(payload.sku.trim().to_string()),
        name: Set(payload.name),
        description: Set(payload.description),
        price: Set(payload.price),
        stock: Set(payload.stock),
        active: Set(true),
        created_at: NotSet,
    };
    let product = active.insert(&state.orm).await?;

    audit::record(
        state,
        ctx,
        "product_create",
        "products",
        serde_json::json!({ "product_id": product.id, "price": product.price }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product created",
        Product::from(product),
        Some(Meta::empty()),
    ))
}

/// Price changes never touch existing order lines; those keep their snapshot.
pub async fn update_product(
    state: &AppState,
    ctx: &RequestContext,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_company_role(ctx, &[CompanyRole::Admin])?;
    let existing = find_scoped_product(&state.orm, ctx, id).await?;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(price) = payload.price {
        validate_price(price)?;
        active.price = Set(price);
    }
    if let Some(stock) = payload.stock {
        validate_stock(stock)?;
        active.stock = Set(stock);
    }
    if let Some(is_active) = payload.active {
        active.active = Set(is_active);
    }

    let product = active.update(&state.orm).await?;

    audit::record(
        state,
        ctx,
        "product_update",
        "products",
        serde_json::json!({ "product_id": product.id, "price": product.price }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        Product::from(product),
        Some(Meta::empty()),
    ))
}

/// Products referenced by orders cannot disappear, so delete deactivates.
pub async fn delete_product(
    state: &AppState,
    ctx: &RequestContext,
    id: Uuid,
) -> AppResult<ApiResponse<Empty>> {
    ensure_company_role(ctx, &[CompanyRole::Admin])?;
    let existing = find_scoped_product(&state.orm, ctx, id).await?;

    let mut active: ActiveModel = existing.into();
    active.active = Set(false);
    active.update(&state.orm).await?;

    audit::record(
        state,
        ctx,
        "product_delete",
        "products",
        serde_json::json!({ "product_id": id }),
    )
    .await;

    Ok(ApiResponse::done("Deleted"))
}
