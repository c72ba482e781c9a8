use b2b_portal_api::domain::{
    DiscountKind, DiscountStatus, LineDiscount, OrderEvent, PricedLine, compute_totals,
    pricing::{discount_amount, round_money, validate_discount, validate_price, validate_quantity},
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

fn two_line_order() -> (Vec<PricedLine>, Uuid, Uuid) {
    let first = Uuid::new_v4();
    let second = Uuid::new_v4();
    let lines = vec![
        PricedLine {
            item_id: first,
            quantity: 3,
            unit_price: dec!(10.00),
        },
        PricedLine {
            item_id: second,
            quantity: 1,
            unit_price: dec!(50.00),
        },
    ];
    (lines, first, second)
}

fn discount(item_id: Uuid, kind: DiscountKind, value: Decimal, status: DiscountStatus) -> LineDiscount {
    LineDiscount {
        item_id,
        kind,
        value,
        status,
    }
}

#[test]
fn fixed_approved_discount_reduces_total() {
    let (lines, first, _) = two_line_order();
    let totals = compute_totals(
        &lines,
        &[discount(first, DiscountKind::Fixed, dec!(5.00), DiscountStatus::Approved)],
    );

    assert_eq!(totals.subtotal, dec!(80.00));
    assert_eq!(totals.total_discount, dec!(5.00));
    assert_eq!(totals.total, dec!(75.00));
}

#[test]
fn percentage_discount_applies_to_line_contribution() {
    let (lines, first, _) = two_line_order();
    let totals = compute_totals(
        &lines,
        &[discount(first, DiscountKind::Percentage, dec!(10), DiscountStatus::Approved)],
    );

    assert_eq!(totals.subtotal, dec!(80.00));
    assert_eq!(totals.total_discount, dec!(3.00));
    assert_eq!(totals.total, dec!(77.00));
}

#[test]
fn pending_and_rejected_discounts_are_ignored() {
    let (lines, first, second) = two_line_order();
    let without = compute_totals(&lines, &[]);
    let with_inactive = compute_totals(
        &lines,
        &[
            discount(first, DiscountKind::Fixed, dec!(5.00), DiscountStatus::Pending),
            discount(second, DiscountKind::Percentage, dec!(50), DiscountStatus::Rejected),
        ],
    );

    assert_eq!(without, with_inactive);
    assert_eq!(with_inactive.total, dec!(80.00));
    assert_eq!(with_inactive.total_discount, Decimal::ZERO);
}

#[test]
fn recalculation_is_idempotent() {
    let (lines, first, second) = two_line_order();
    let discounts = vec![
        discount(first, DiscountKind::Fixed, dec!(5.00), DiscountStatus::Approved),
        discount(second, DiscountKind::Percentage, dec!(12.5), DiscountStatus::Approved),
    ];

    let once = compute_totals(&lines, &discounts);
    let twice = compute_totals(&lines, &discounts);
    assert_eq!(once, twice);
    assert_eq!(once.total, once.subtotal - once.total_discount);
}

#[test]
fn order_without_items_prices_to_zero() {
    let orphan = discount(Uuid::new_v4(), DiscountKind::Fixed, dec!(5.00), DiscountStatus::Approved);
    let totals = compute_totals(&[], &[orphan]);

    assert_eq!(totals.subtotal, Decimal::ZERO);
    assert_eq!(totals.total_discount, Decimal::ZERO);
    assert_eq!(totals.total, Decimal::ZERO);
}

#[test]
fn discount_on_unknown_line_is_ignored() {
    let (lines, _, _) = two_line_order();
    let totals = compute_totals(
        &lines,
        &[discount(Uuid::new_v4(), DiscountKind::Fixed, dec!(5.00), DiscountStatus::Approved)],
    );
    assert_eq!(totals.total, dec!(80.00));
}

#[test]
fn total_never_goes_negative() {
    let (lines, first, second) = two_line_order();
    let totals = compute_totals(
        &lines,
        &[
            discount(first, DiscountKind::Fixed, dec!(60.00), DiscountStatus::Approved),
            discount(second, DiscountKind::Fixed, dec!(60.00), DiscountStatus::Approved),
        ],
    );
    assert_eq!(totals.total_discount, dec!(120.00));
    assert_eq!(totals.total, Decimal::ZERO);
}

#[test]
fn amounts_round_half_away_from_zero() {
    assert_eq!(round_money(dec!(1.005)), dec!(1.01));
    assert_eq!(round_money(dec!(2.344)), dec!(2.34));
    // 15% of 3 x 3.33 = 1.4985
    assert_eq!(
        discount_amount(DiscountKind::Percentage, dec!(15), dec!(9.99)),
        dec!(1.50)
    );
}

#[test]
fn input_validation_rejects_bad_values() {
    assert!(validate_quantity(0).is_err());
    assert!(validate_quantity(-2).is_err());
    assert!(validate_quantity(1).is_ok());

    assert!(validate_price(dec!(-0.01)).is_err());
    assert!(validate_price(dec!(10.001)).is_err());
    assert!(validate_price(dec!(10.50)).is_ok());
    assert!(validate_price(Decimal::ZERO).is_ok());

    assert!(validate_discount(DiscountKind::Fixed, Decimal::ZERO).is_err());
    assert!(validate_discount(DiscountKind::Percentage, dec!(100.01)).is_err());
    assert!(validate_discount(DiscountKind::Percentage, dec!(100)).is_ok());
    assert!(validate_discount(DiscountKind::Fixed, dec!(250)).is_ok());
}

#[test]
fn only_decisions_and_item_changes_reprice() {
    let id = Uuid::new_v4();
    assert!(OrderEvent::ItemsChanged.affects_totals());
    assert!(OrderEvent::DiscountApproved { discount_id: id }.affects_totals());
    assert!(OrderEvent::DiscountRejected { discount_id: id }.affects_totals());
    assert!(!OrderEvent::DiscountRequested { discount_id: id }.affects_totals());
    assert!(!OrderEvent::FreightChanged.affects_totals());
    assert_eq!(OrderEvent::DiscountApproved { discount_id: id }.name(), "discount_approved");
}

#[test]
fn legacy_discount_spellings_parse_to_canonical_values() {
    assert_eq!("PERCENTUAL".parse::<DiscountKind>(), Ok(DiscountKind::Percentage));
    assert_eq!("FIXO".parse::<DiscountKind>(), Ok(DiscountKind::Fixed));
    assert_eq!("PENDENTE".parse::<DiscountStatus>(), Ok(DiscountStatus::Pending));
    assert_eq!("REJEITADO".parse::<DiscountStatus>(), Ok(DiscountStatus::Rejected));

    let parsed: DiscountStatus = serde_json::from_str("\"APROVADO\"").unwrap();
    assert_eq!(parsed, DiscountStatus::Approved);
    assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"APPROVED\"");
    assert!("HALF_OFF".parse::<DiscountKind>().is_err());
}

#[test]
fn discount_values_are_limited_to_cents() {
    assert!(validate_discount(DiscountKind::Fixed, dec!(12.345)).is_err());
    assert!(validate_discount(DiscountKind::Percentage, dec!(7.125)).is_err());
    assert!(validate_discount(DiscountKind::Fixed, dec!(12.35)).is_ok());
    // trailing zeros beyond two places are still whole cents
    assert!(validate_discount(DiscountKind::Fixed, dec!(12.3500)).is_ok());
}
