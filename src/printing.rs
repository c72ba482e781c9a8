use std::fmt::Write as _;

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct PrintLine {
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// Everything needed to render an order document, detached from the ORM.
#[derive(Debug, Clone)]
pub struct OrderSnapshot {
    pub order_id: Uuid,
    pub order_number: String,
    pub company_name: String,
    pub lines: Vec<PrintLine>,
    pub subtotal: Decimal,
    pub total_discount: Decimal,
    pub freight: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PrintedDocument {
    pub file_name: String,
    pub content_type: String,
    pub content: String,
}

#[derive(Debug, Error)]
pub enum PrintError {
    #[error("order {0} has no items to print")]
    EmptyOrder(String),

    #[error("document rendering failed: {0}")]
    Render(String),
}

/// Produces the document that must exist before an order leaves the
/// awaiting-print stage.
pub trait DocumentPrinter: Send + Sync {
    fn render(&self, order: &OrderSnapshot) -> Result<PrintedDocument, PrintError>;
}

/// Plain-text picking list used by the warehouse to separate items.
#[derive(Debug, Default, Clone)]
pub struct PickingListPrinter;

impl DocumentPrinter for PickingListPrinter {
    fn render(&self, order: &OrderSnapshot) -> Result<PrintedDocument, PrintError> {
        if order.lines.is_empty() {
            return Err(PrintError::EmptyOrder(order.order_number.clone()));
        }

        let mut out = String::new();
        let render = |out: &mut String| -> std::fmt::Result {
            writeln!(out, "PICKING LIST {}", order.order_number)?;
            writeln!(out, "Company: {}", order.company_name)?;
            writeln!(out, "{:-<60}", "")?;
            for line in &order.lines {
                writeln!(
                    out,
                    "{:>5} x {:<36} {:>12}",
                    line.quantity, line.product_name, line.unit_price
                )?;
            }
            writeln!(out, "{:-<60}", "")?;
            writeln!(out, "Subtotal: {}", order.subtotal)?;
            writeln!(out, "Discount: {}", order.total_discount)?;
            writeln!(out, "Freight:  {}", order.freight)?;
            writeln!(out, "Total:    {}", order.total)
        };
        render(&mut out).map_err(|e| PrintError::Render(e.to_string()))?;

        Ok(PrintedDocument {
            file_name: format!("picking-{}.txt", order.order_number),
            content_type: "text/plain".into(),
            content: out,
        })
    }
}
