//! Canonical enums for every status-like column.
//!
//! Values are stored and serialized with their canonical SCREAMING_SNAKE
//! names. Legacy spellings that older clients and imported rows still carry
//! are accepted by `FromStr` and serde aliases only; nothing past the parsing
//! boundary ever sees them.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownValue {
    pub kind: &'static str,
    pub value: String,
}

fn unknown(kind: &'static str, value: &str) -> UnknownValue {
    UnknownValue {
        kind,
        value: value.to_string(),
    }
}

/// Commercial state of an order. Orthogonal to [`super::stage::OrderStage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[serde(alias = "ORCAMENTO")]
    Quote,
    #[serde(alias = "GERADO")]
    Generated,
    #[serde(alias = "FATURADO")]
    Invoiced,
    #[serde(alias = "CANCELADO")]
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Quote => "QUOTE",
            OrderStatus::Generated => "GENERATED",
            OrderStatus::Invoiced => "INVOICED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, OrderStatus::Cancelled)
    }

    /// Forward commercial progression. Cancellation is handled separately
    /// because it also depends on the fulfillment stage.
    pub fn next(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Quote => Some(OrderStatus::Generated),
            OrderStatus::Generated => Some(OrderStatus::Invoiced),
            OrderStatus::Invoiced | OrderStatus::Cancelled => None,
        }
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "QUOTE" | "ORCAMENTO" => Ok(OrderStatus::Quote),
            "GENERATED" | "GERADO" => Ok(OrderStatus::Generated),
            "INVOICED" | "FATURADO" => Ok(OrderStatus::Invoiced),
            "CANCELLED" | "CANCELED" | "CANCELADO" => Ok(OrderStatus::Cancelled),
            _ => Err(unknown("order status", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountKind {
    #[serde(alias = "FIXO")]
    Fixed,
    #[serde(alias = "PERCENTUAL")]
    Percentage,
}

impl DiscountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountKind::Fixed => "FIXED",
            DiscountKind::Percentage => "PERCENTAGE",
        }
    }
}

impl FromStr for DiscountKind {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FIXED" | "FIXO" | "VALOR" => Ok(DiscountKind::Fixed),
            "PERCENTAGE" | "PERCENTUAL" => Ok(DiscountKind::Percentage),
            _ => Err(unknown("discount kind", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountStatus {
    #[serde(alias = "PENDENTE")]
    Pending,
    #[serde(alias = "APROVADO")]
    Approved,
    #[serde(alias = "REJEITADO")]
    Rejected,
}

impl DiscountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountStatus::Pending => "PENDING",
            DiscountStatus::Approved => "APPROVED",
            DiscountStatus::Rejected => "REJECTED",
        }
    }
}

impl FromStr for DiscountStatus {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" | "PENDENTE" => Ok(DiscountStatus::Pending),
            "APPROVED" | "APROVADO" => Ok(DiscountStatus::Approved),
            "REJECTED" | "REJEITADO" => Ok(DiscountStatus::Rejected),
            _ => Err(unknown("discount status", s)),
        }
    }
}

/// Approval state shared by companies and users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    #[serde(alias = "PENDENTE")]
    Pending,
    #[serde(alias = "APROVADO")]
    Approved,
    #[serde(alias = "REJEITADO")]
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "PENDING",
            ApprovalStatus::Approved => "APPROVED",
            ApprovalStatus::Rejected => "REJECTED",
        }
    }
}

impl FromStr for ApprovalStatus {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" | "PENDENTE" => Ok(ApprovalStatus::Pending),
            "APPROVED" | "APROVADO" => Ok(ApprovalStatus::Approved),
            "REJECTED" | "REJEITADO" => Ok(ApprovalStatus::Rejected),
            _ => Err(unknown("approval status", s)),
        }
    }
}

/// Role a user holds inside one company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CompanyRole {
    Admin,
    Buyer,
    Operator,
}

impl CompanyRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompanyRole::Admin => "admin",
            CompanyRole::Buyer => "buyer",
            CompanyRole::Operator => "operator",
        }
    }
}

impl FromStr for CompanyRole {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" | "admin_empresa" => Ok(CompanyRole::Admin),
            "buyer" | "comprador" | "cliente" => Ok(CompanyRole::Buyer),
            "operator" | "operador" => Ok(CompanyRole::Operator),
            _ => Err(unknown("company role", s)),
        }
    }
}

/// Platform-wide role carried in the access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum GlobalRole {
    Superadmin,
    User,
}

impl GlobalRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            GlobalRole::Superadmin => "superadmin",
            GlobalRole::User => "user",
        }
    }

    pub fn is_superadmin(&self) -> bool {
        matches!(self, GlobalRole::Superadmin)
    }
}

impl FromStr for GlobalRole {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "superadmin" | "super_admin" => Ok(GlobalRole::Superadmin),
            "user" => Ok(GlobalRole::User),
            _ => Err(unknown("role", s)),
        }
    }
}
