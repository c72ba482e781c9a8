use std::collections::HashMap;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use super::status::{DiscountKind, DiscountStatus};

/// One order line as seen by the pricing engine. `unit_price` is the price
/// snapshot taken when the item was added, never the live product price.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedLine {
    pub item_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl PricedLine {
    pub fn contribution(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineDiscount {
    pub item_id: Uuid,
    pub kind: DiscountKind,
    pub value: Decimal,
    pub status: DiscountStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct OrderTotals {
    #[schema(value_type = String, example = "80.00")]
    pub subtotal: Decimal,
    #[schema(value_type = String, example = "5.00")]
    pub total_discount: Decimal,
    #[schema(value_type = String, example = "75.00")]
    pub total: Decimal,
}

impl OrderTotals {
    pub fn zero() -> Self {
        Self {
            subtotal: Decimal::ZERO,
            total_discount: Decimal::ZERO,
            total: Decimal::ZERO,
        }
    }
}

/// Two decimal places, half away from zero.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Amount a single approved discount takes off its line.
pub fn discount_amount(kind: DiscountKind, value: Decimal, contribution: Decimal) -> Decimal {
    match kind {
        DiscountKind::Percentage => round_money(contribution * value / Decimal::ONE_HUNDRED),
        DiscountKind::Fixed => round_money(value),
    }
}

/// Derive the monetary fields of an order from its lines and discounts.
///
/// Only `APPROVED` discounts count. Discounts pointing at a line that is not
/// part of `lines` are ignored. The total never goes below zero.
pub fn compute_totals(lines: &[PricedLine], discounts: &[LineDiscount]) -> OrderTotals {
    if lines.is_empty() {
        return OrderTotals::zero();
    }

    let contributions: HashMap<Uuid, Decimal> = lines
        .iter()
        .fold(HashMap::new(), |mut acc, line| {
            *acc.entry(line.item_id).or_insert(Decimal::ZERO) += line.contribution();
            acc
        });

    let subtotal = round_money(contributions.values().copied().sum());

    let total_discount = round_money(
        discounts
            .iter()
            .filter(|d| d.status == DiscountStatus::Approved)
            .filter_map(|d| {
                contributions
                    .get(&d.item_id)
                    .map(|contribution| discount_amount(d.kind, d.value, *contribution))
            })
            .sum(),
    );

    let total = round_money((subtotal - total_discount).max(Decimal::ZERO));

    OrderTotals {
        subtotal,
        total_discount,
        total,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct PricingViolation(pub String);

pub fn validate_quantity(quantity: i32) -> Result<(), PricingViolation> {
    if quantity <= 0 {
        return Err(PricingViolation("quantity must be greater than 0".into()));
    }
    Ok(())
}

pub fn validate_price(price: Decimal) -> Result<(), PricingViolation> {
    if price.is_sign_negative() {
        return Err(PricingViolation("price must not be negative".into()));
    }
    ensure_cents(price, "price")
}

/// NUMERIC(14,2) would round extra digits silently.
fn ensure_cents(value: Decimal, what: &str) -> Result<(), PricingViolation> {
    if value.scale() > 2 && value != round_money(value) {
        return Err(PricingViolation(format!(
            "{what} must have at most 2 decimal places"
        )));
    }
    Ok(())
}

pub fn validate_discount(kind: DiscountKind, value: Decimal) -> Result<(), PricingViolation> {
    if value <= Decimal::ZERO {
        return Err(PricingViolation("discount must be greater than 0".into()));
    }
    if kind == DiscountKind::Percentage && value > Decimal::ONE_HUNDRED {
        return Err(PricingViolation(
            "percentage discount must not exceed 100".into(),
        ));
    }
    ensure_cents(value, "discount")
}
