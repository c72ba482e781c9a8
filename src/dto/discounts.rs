use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    domain::{DiscountKind, DiscountStatus},
    models::{Order, OrderItemDiscount},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct RequestDiscountRequest {
    pub kind: DiscountKind,
    #[schema(value_type = String, example = "10.00")]
    pub value: Decimal,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DiscountListQuery {
    pub status: Option<DiscountStatus>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DiscountList {
    pub items: Vec<OrderItemDiscount>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DiscountDecision {
    pub discount: OrderItemDiscount,
    /// Order after recalculation.
    pub order: Order,
}
