use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    domain::{
        ApprovalStatus, CompanyRole, DiscountKind, DiscountStatus, GlobalRole, OrderStage,
        OrderStatus, StageView, stage_view,
    },
    entity::{
        cart_items::Model as CartItemModel, companies::Model as CompanyModel,
        order_item_discounts::Model as DiscountModel, order_items::Model as OrderItemModel,
        orders::Model as OrderModel, products::Model as ProductModel, users::Model as UserModel,
    },
    error::AppError,
};

/// Parse a status-like column. An unparseable value means the row was written
/// outside this service, so it surfaces as an internal error.
pub fn parse_column<T>(value: &str) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse::<T>()
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: GlobalRole,
    pub approval_status: ApprovalStatus,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserModel> for User {
    type Error = AppError;

    fn try_from(model: UserModel) -> Result<Self, Self::Error> {
        Ok(User {
            id: model.id,
            email: model.email,
            name: model.name,
            role: parse_column(&model.role)?,
            approval_status: parse_column(&model.approval_status)?,
            created_at: model.created_at.with_timezone(&Utc),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub document: String,
    pub approval_status: ApprovalStatus,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<CompanyModel> for Company {
    type Error = AppError;

    fn try_from(model: CompanyModel) -> Result<Self, Self::Error> {
        Ok(Company {
            id: model.id,
            name: model.name,
            document: model.document,
            approval_status: parse_column(&model.approval_status)?,
            active: model.active,
            created_at: model.created_at.with_timezone(&Utc),
        })
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CompanyMembership {
    pub company: Company,
    pub role: CompanyRole,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CompanyMember {
    pub user: User,
    pub role: CompanyRole,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub company_id: Uuid,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    #[schema(value_type = String, example = "10.00")]
    pub price: Decimal,
    pub stock: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<ProductModel> for Product {
    fn from(model: ProductModel) -> Self {
        Product {
            id: model.id,
            company_id: model.company_id,
            sku: model.sku,
            name: model.name,
            description: model.description,
            price: model.price,
            stock: model.stock,
            active: model.active,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartItem {
    pub id: Uuid,
    pub company_id: Uuid,
    pub product_id: Uuid,
    pub user_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

impl From<CartItemModel> for CartItem {
    fn from(model: CartItemModel) -> Self {
        CartItem {
            id: model.id,
            company_id: model.company_id,
            product_id: model.product_id,
            user_id: model.user_id,
            quantity: model.quantity,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub company_id: Uuid,
    pub created_by: Uuid,
    pub order_number: String,
    pub status: OrderStatus,
    pub stage: OrderStage,
    pub stage_view: StageView,
    #[schema(value_type = String, example = "80.00")]
    pub subtotal: Decimal,
    #[schema(value_type = String, example = "5.00")]
    pub total_discount: Decimal,
    #[schema(value_type = String, example = "0.00")]
    pub freight: Decimal,
    #[schema(value_type = String, example = "75.00")]
    pub total: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<OrderModel> for Order {
    type Error = AppError;

    fn try_from(model: OrderModel) -> Result<Self, Self::Error> {
        let status: OrderStatus = parse_column(&model.status)?;
        let stage: OrderStage = parse_column(&model.stage)?;
        Ok(Order {
            id: model.id,
            company_id: model.company_id,
            created_by: model.created_by,
            order_number: model.order_number,
            status,
            stage,
            stage_view: stage_view(status, stage),
            subtotal: model.subtotal,
            total_discount: model.total_discount,
            freight: model.freight,
            total: model.total,
            notes: model.notes,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        })
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    #[schema(value_type = String, example = "10.00")]
    pub unit_price: Decimal,
    #[schema(value_type = String, example = "30.00")]
    pub line_total: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<OrderItemModel> for OrderItem {
    fn from(model: OrderItemModel) -> Self {
        OrderItem {
            id: model.id,
            order_id: model.order_id,
            product_id: model.product_id,
            product_name: model.product_name,
            quantity: model.quantity,
            unit_price: model.unit_price,
            line_total: Decimal::from(model.quantity) * model.unit_price,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderItemDiscount {
    pub id: Uuid,
    pub order_item_id: Uuid,
    pub requested_by: Uuid,
    pub approved_by: Option<Uuid>,
    pub kind: DiscountKind,
    #[schema(value_type = String, example = "5.00")]
    pub value: Decimal,
    pub status: DiscountStatus,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
}

impl TryFrom<DiscountModel> for OrderItemDiscount {
    type Error = AppError;

    fn try_from(model: DiscountModel) -> Result<Self, Self::Error> {
        Ok(OrderItemDiscount {
            id: model.id,
            order_item_id: model.order_item_id,
            requested_by: model.requested_by,
            approved_by: model.approved_by,
            kind: parse_column(&model.kind)?,
            value: model.value,
            status: parse_column(&model.status)?,
            reason: model.reason,
            created_at: model.created_at.with_timezone(&Utc),
            decided_at: model.decided_at.map(|dt| dt.with_timezone(&Utc)),
        })
    }
}
