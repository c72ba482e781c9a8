//! Database-free business rules: pricing, fulfillment stages and tenancy.

pub mod events;
pub mod pricing;
pub mod stage;
pub mod status;
pub mod tenancy;

pub use events::OrderEvent;
pub use pricing::{LineDiscount, OrderTotals, PricedLine, compute_totals};
pub use stage::{OrderStage, StageAction, StageView, stage_view};
pub use status::{
    ApprovalStatus, CompanyRole, DiscountKind, DiscountStatus, GlobalRole, OrderStatus,
};
pub use tenancy::{ActiveCompany, Membership, RequestContext, resolve_active_company};
