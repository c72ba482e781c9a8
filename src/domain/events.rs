use uuid::Uuid;

/// Something that happened to an order or its lines. Totals are recalculated
/// from the event, so write paths never decide on their own whether to
/// reprice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderEvent {
    ItemsChanged,
    FreightChanged,
    DiscountRequested { discount_id: Uuid },
    DiscountApproved { discount_id: Uuid },
    DiscountRejected { discount_id: Uuid },
}

impl OrderEvent {
    pub fn name(&self) -> &'static str {
        match self {
            OrderEvent::ItemsChanged => "items_changed",
            OrderEvent::FreightChanged => "freight_changed",
            OrderEvent::DiscountRequested { .. } => "discount_requested",
            OrderEvent::DiscountApproved { .. } => "discount_approved",
            OrderEvent::DiscountRejected { .. } => "discount_rejected",
        }
    }

    /// A pending discount contributes nothing, so requesting one leaves the
    /// totals as they are. Rejection can revoke an approved discount.
    pub fn affects_totals(&self) -> bool {
        match self {
            OrderEvent::ItemsChanged
            | OrderEvent::DiscountApproved { .. }
            | OrderEvent::DiscountRejected { .. } => true,
            OrderEvent::FreightChanged | OrderEvent::DiscountRequested { .. } => false,
        }
    }
}
