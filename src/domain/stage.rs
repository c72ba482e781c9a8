//! Fulfillment pipeline of an order.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use super::status::{OrderStatus, UnknownValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStage {
    #[serde(alias = "AGUARDANDO_IMPRESSAO", alias = "PENDENTE_IMPRESSAO")]
    AwaitingPrint,
    #[serde(alias = "IMPRESSO")]
    Printed,
    #[serde(alias = "SEPARADO")]
    Separated,
    #[serde(alias = "COBRADO")]
    Charged,
    #[serde(alias = "CONFERIR_RECEBIMENTO")]
    VerifyReceipt,
    #[serde(alias = "EM_CONFERENCIA")]
    InVerification,
    #[serde(alias = "AGUARDANDO_ENVIO")]
    AwaitingShipment,
    #[serde(alias = "ENVIADO")]
    Shipped,
}

impl OrderStage {
    pub const PIPELINE: [OrderStage; 8] = [
        OrderStage::AwaitingPrint,
        OrderStage::Printed,
        OrderStage::Separated,
        OrderStage::Charged,
        OrderStage::VerifyReceipt,
        OrderStage::InVerification,
        OrderStage::AwaitingShipment,
        OrderStage::Shipped,
    ];

    pub fn initial() -> Self {
        OrderStage::AwaitingPrint
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStage::AwaitingPrint => "AWAITING_PRINT",
            OrderStage::Printed => "PRINTED",
            OrderStage::Separated => "SEPARATED",
            OrderStage::Charged => "CHARGED",
            OrderStage::VerifyReceipt => "VERIFY_RECEIPT",
            OrderStage::InVerification => "IN_VERIFICATION",
            OrderStage::AwaitingShipment => "AWAITING_SHIPMENT",
            OrderStage::Shipped => "SHIPPED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStage::Shipped)
    }

    /// Zero-based index in [`OrderStage::PIPELINE`].
    pub fn position(&self) -> usize {
        match self {
            OrderStage::AwaitingPrint => 0,
            OrderStage::Printed => 1,
            OrderStage::Separated => 2,
            OrderStage::Charged => 3,
            OrderStage::VerifyReceipt => 4,
            OrderStage::InVerification => 5,
            OrderStage::AwaitingShipment => 6,
            OrderStage::Shipped => 7,
        }
    }

    pub fn next(&self) -> Option<OrderStage> {
        Self::PIPELINE.get(self.position() + 1).copied()
    }

    pub fn progress(&self) -> StageProgress {
        let index = self.position();
        let total = Self::PIPELINE.len();
        StageProgress {
            index,
            total,
            percent: ((index * 100) / (total - 1)) as u8,
        }
    }

    /// The single forward action available from this stage.
    pub fn action(&self) -> Option<StageAction> {
        let (kind, label, icon) = match self {
            OrderStage::AwaitingPrint => (ActionKind::Print, "Print order", "printer"),
            OrderStage::Printed => (ActionKind::Separate, "Separate items", "package"),
            OrderStage::Separated => (ActionKind::Charge, "Charge order", "credit-card"),
            OrderStage::Charged => (
                ActionKind::VerifyReceipt,
                "Verify receipt",
                "receipt",
            ),
            OrderStage::VerifyReceipt => (
                ActionKind::MoveToVerification,
                "Move to verification",
                "clipboard-check",
            ),
            OrderStage::InVerification => (
                ActionKind::AwaitShipment,
                "Await shipment",
                "clock",
            ),
            OrderStage::AwaitingShipment => (ActionKind::Ship, "Ship order", "truck"),
            OrderStage::Shipped => return None,
        };
        let next = self.next()?;
        Some(StageAction {
            kind,
            label,
            icon,
            next,
        })
    }
}

impl fmt::Display for OrderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStage {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AWAITING_PRINT" | "AGUARDANDO_IMPRESSAO" | "PENDENTE_IMPRESSAO" => {
                Ok(OrderStage::AwaitingPrint)
            }
            "PRINTED" | "IMPRESSO" => Ok(OrderStage::Printed),
            "SEPARATED" | "SEPARADO" => Ok(OrderStage::Separated),
            "CHARGED" | "COBRADO" => Ok(OrderStage::Charged),
            "VERIFY_RECEIPT" | "CONFERIR_RECEBIMENTO" => Ok(OrderStage::VerifyReceipt),
            "IN_VERIFICATION" | "EM_CONFERENCIA" => Ok(OrderStage::InVerification),
            "AWAITING_SHIPMENT" | "AGUARDANDO_ENVIO" => Ok(OrderStage::AwaitingShipment),
            "SHIPPED" | "ENVIADO" => Ok(OrderStage::Shipped),
            _ => Err(UnknownValue {
                kind: "order stage",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Print,
    Separate,
    Charge,
    VerifyReceipt,
    MoveToVerification,
    AwaitShipment,
    Ship,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct StageAction {
    pub kind: ActionKind,
    pub label: &'static str,
    pub icon: &'static str,
    pub next: OrderStage,
}

impl StageAction {
    /// Printing renders the picking list before the stage may move.
    pub fn requires_document(&self) -> bool {
        matches!(self.kind, ActionKind::Print)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct StageProgress {
    pub index: usize,
    pub total: usize,
    pub percent: u8,
}

/// What a client should render for an order's fulfillment state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum StageView {
    Active {
        stage: OrderStage,
        action: StageAction,
        progress: StageProgress,
    },
    Completed {
        stage: OrderStage,
        progress: StageProgress,
    },
    Cancelled,
}

pub fn stage_view(status: OrderStatus, stage: OrderStage) -> StageView {
    if status.is_cancelled() {
        return StageView::Cancelled;
    }
    match stage.action() {
        Some(action) => StageView::Active {
            stage,
            action,
            progress: stage.progress(),
        },
        None => StageView::Completed {
            stage,
            progress: stage.progress(),
        },
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("order is cancelled")]
    Cancelled,

    #[error("no action available from stage {0}")]
    Terminal(OrderStage),

    #[error("order is at stage {actual}, not {expected}")]
    StageMismatch {
        expected: OrderStage,
        actual: OrderStage,
    },
}

/// Decide the single permitted forward step. `from` is the stage the caller
/// believes the order is in; a stale value is rejected instead of skipping.
pub fn plan_advance(
    status: OrderStatus,
    current: OrderStage,
    from: OrderStage,
) -> Result<StageAction, TransitionError> {
    if status.is_cancelled() {
        return Err(TransitionError::Cancelled);
    }
    if current != from {
        return Err(TransitionError::StageMismatch {
            expected: from,
            actual: current,
        });
    }
    current.action().ok_or(TransitionError::Terminal(current))
}

/// Cancellation is allowed from every stage except the terminal one.
pub fn plan_cancel(status: OrderStatus, current: OrderStage) -> Result<(), TransitionError> {
    if status.is_cancelled() {
        return Err(TransitionError::Cancelled);
    }
    if current.is_terminal() {
        return Err(TransitionError::Terminal(current));
    }
    Ok(())
}
