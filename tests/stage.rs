use b2b_portal_api::domain::{
    OrderStage, OrderStatus, StageView,
    stage::{ActionKind, TransitionError, plan_advance, plan_cancel},
    stage_view,
};

#[test]
fn each_stage_advances_exactly_one_step() {
    for pair in OrderStage::PIPELINE.windows(2) {
        let (current, expected_next) = (pair[0], pair[1]);
        let action = plan_advance(OrderStatus::Quote, current, current).expect("forward step");
        assert_eq!(action.next, expected_next);
        assert_eq!(current.next(), Some(expected_next));
    }
}

#[test]
fn only_the_print_step_needs_a_document() {
    let printing: Vec<_> = OrderStage::PIPELINE
        .iter()
        .filter_map(|s| s.action())
        .filter(|a| a.requires_document())
        .collect();
    assert_eq!(printing.len(), 1);
    assert_eq!(printing[0].kind, ActionKind::Print);
    assert_eq!(printing[0].next, OrderStage::Printed);
}

#[test]
fn shipped_is_terminal() {
    assert!(OrderStage::Shipped.is_terminal());
    assert_eq!(OrderStage::Shipped.action(), None);
    assert_eq!(
        plan_advance(OrderStatus::Invoiced, OrderStage::Shipped, OrderStage::Shipped),
        Err(TransitionError::Terminal(OrderStage::Shipped))
    );
}

#[test]
fn cancelled_orders_cannot_advance() {
    for stage in OrderStage::PIPELINE {
        assert_eq!(
            plan_advance(OrderStatus::Cancelled, stage, stage),
            Err(TransitionError::Cancelled)
        );
    }
}

#[test]
fn stale_from_stage_is_rejected() {
    // A retried "print" after the first one succeeded must not skip ahead.
    let err = plan_advance(OrderStatus::Quote, OrderStage::Printed, OrderStage::AwaitingPrint)
        .unwrap_err();
    assert_eq!(
        err,
        TransitionError::StageMismatch {
            expected: OrderStage::AwaitingPrint,
            actual: OrderStage::Printed,
        }
    );
}

#[test]
fn cancel_is_allowed_from_any_non_terminal_stage() {
    for stage in OrderStage::PIPELINE.iter().filter(|s| !s.is_terminal()) {
        assert_eq!(plan_cancel(OrderStatus::Generated, *stage), Ok(()));
        // once cancelled, nothing moves forward
        assert_eq!(stage_view(OrderStatus::Cancelled, *stage), StageView::Cancelled);
        assert!(plan_advance(OrderStatus::Cancelled, *stage, *stage).is_err());
    }
    assert!(plan_cancel(OrderStatus::Quote, OrderStage::Shipped).is_err());
    assert_eq!(
        plan_cancel(OrderStatus::Cancelled, OrderStage::Separated),
        Err(TransitionError::Cancelled)
    );
}

#[test]
fn stage_view_describes_next_action_and_progress() {
    match stage_view(OrderStatus::Quote, OrderStage::AwaitingPrint) {
        StageView::Active {
            stage,
            action,
            progress,
        } => {
            assert_eq!(stage, OrderStage::AwaitingPrint);
            assert_eq!(action.kind, ActionKind::Print);
            assert_eq!(progress.index, 0);
            assert_eq!(progress.total, 8);
            assert_eq!(progress.percent, 0);
        }
        other => panic!("unexpected view {other:?}"),
    }

    match stage_view(OrderStatus::Invoiced, OrderStage::Shipped) {
        StageView::Completed { progress, .. } => assert_eq!(progress.percent, 100),
        other => panic!("unexpected view {other:?}"),
    }

    let json = serde_json::to_value(stage_view(OrderStatus::Quote, OrderStage::Charged)).unwrap();
    assert_eq!(json["state"], "active");
    assert_eq!(json["stage"], "CHARGED");
    assert_eq!(json["action"]["next"], "VERIFY_RECEIPT");
}

#[test]
fn legacy_stage_names_map_to_one_canonical_stage() {
    assert_eq!("AGUARDANDO_IMPRESSAO".parse::<OrderStage>(), Ok(OrderStage::AwaitingPrint));
    assert_eq!("PENDENTE_IMPRESSAO".parse::<OrderStage>(), Ok(OrderStage::AwaitingPrint));
    assert_eq!("enviado".parse::<OrderStage>(), Ok(OrderStage::Shipped));
    assert_eq!("FATURADO".parse::<OrderStatus>(), Ok(OrderStatus::Invoiced));

    let stage: OrderStage = serde_json::from_str("\"PENDENTE_IMPRESSAO\"").unwrap();
    assert_eq!(stage.to_string(), "AWAITING_PRINT");
    assert!("PACKED".parse::<OrderStage>().is_err());
}

#[test]
fn commercial_status_moves_forward_only() {
    assert_eq!(OrderStatus::Quote.next(), Some(OrderStatus::Generated));
    assert_eq!(OrderStatus::Generated.next(), Some(OrderStatus::Invoiced));
    assert_eq!(OrderStatus::Invoiced.next(), None);
    assert_eq!(OrderStatus::Cancelled.next(), None);
}
