use b2b_portal_api::printing::{
    DocumentPrinter, OrderSnapshot, PickingListPrinter, PrintError, PrintLine, PrintedDocument,
};
use rust_decimal_macros::dec;
use uuid::Uuid;

fn snapshot(lines: Vec<PrintLine>) -> OrderSnapshot {
    OrderSnapshot {
        order_id: Uuid::new_v4(),
        order_number: "ORD-20260101-ABCDEF12".into(),
        company_name: "Acme Wholesale".into(),
        lines,
        subtotal: dec!(80.00),
        total_discount: dec!(5.00),
        freight: dec!(12.00),
        total: dec!(75.00),
    }
}

#[test]
fn picking_list_lists_every_line_and_the_totals() {
    let doc = PickingListPrinter
        .render(&snapshot(vec![
            PrintLine {
                product_name: "Steel bolts M8".into(),
                quantity: 3,
                unit_price: dec!(10.00),
            },
            PrintLine {
                product_name: "Copper wire".into(),
                quantity: 1,
                unit_price: dec!(50.00),
            },
        ]))
        .expect("rendered");

    assert_eq!(doc.file_name, "picking-ORD-20260101-ABCDEF12.txt");
    assert_eq!(doc.content_type, "text/plain");
    assert!(doc.content.contains("Acme Wholesale"));
    assert!(doc.content.contains("Steel bolts M8"));
    assert!(doc.content.contains("Copper wire"));
    assert!(doc.content.contains("Total:    75.00"));
}

#[test]
fn empty_order_cannot_be_printed() {
    let err = PickingListPrinter.render(&snapshot(Vec::new())).unwrap_err();
    assert!(matches!(err, PrintError::EmptyOrder(ref n) if n == "ORD-20260101-ABCDEF12"));
}

struct OfflinePrinter;

impl DocumentPrinter for OfflinePrinter {
    fn render(&self, _order: &OrderSnapshot) -> Result<PrintedDocument, PrintError> {
        Err(PrintError::Render("printer offline".into()))
    }
}

#[test]
fn printers_are_swappable_behind_the_trait() {
    let printers: Vec<Box<dyn DocumentPrinter>> =
        vec![Box::new(PickingListPrinter), Box::new(OfflinePrinter)];
    let order = snapshot(vec![PrintLine {
        product_name: "Washers".into(),
        quantity: 2,
        unit_price: dec!(3.25),
    }]);

    assert!(printers[0].render(&order).is_ok());
    assert_eq!(
        printers[1].render(&order).unwrap_err().to_string(),
        "document rendering failed: printer offline"
    );
}
