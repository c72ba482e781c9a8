use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    domain::{OrderStage, OrderStatus},
    models::{Order, OrderItem, OrderItemDiscount},
    printing::PrintedDocument,
};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub notes: Option<String>,
    #[schema(value_type = Option<String>, example = "25.00")]
    pub freight: Option<Decimal>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddOrderItemRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderItemRequest {
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateFreightRequest {
    #[schema(value_type = String, example = "25.00")]
    pub freight: Decimal,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdvanceStageRequest {
    /// Stage the caller saw; the advance is rejected if the order moved on.
    pub from_stage: OrderStage,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemWithDiscounts {
    #[serde(flatten)]
    pub item: OrderItem,
    pub discounts: Vec<OrderItemDiscount>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItemWithDiscounts>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StageAdvanced {
    pub order: Order,
    pub previous_stage: OrderStage,
    pub document: Option<PrintedDocument>,
}
