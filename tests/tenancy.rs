use b2b_portal_api::domain::{
    ActiveCompany, CompanyRole, GlobalRole, Membership, RequestContext, resolve_active_company,
    tenancy::{ResolutionSource, ScopeError},
};
use uuid::Uuid;

fn membership(role: CompanyRole) -> Membership {
    Membership {
        company_id: Uuid::new_v4(),
        role,
    }
}

fn context(active: &ActiveCompany, role: GlobalRole) -> Result<RequestContext, ScopeError> {
    RequestContext::from_resolution(Uuid::new_v4(), role, Uuid::new_v4(), active)
}

#[test]
fn no_membership_resolves_to_none_and_scoped_access_fails() {
    let resolution = resolve_active_company(&[], None, None);
    assert_eq!(resolution.active, ActiveCompany::None);
    assert_eq!(
        context(&resolution.active, GlobalRole::User),
        Err(ScopeError::NoActiveCompany)
    );
}

#[test]
fn single_membership_is_selected_automatically() {
    let only = membership(CompanyRole::Buyer);
    let resolution = resolve_active_company(&[only], None, None);
    assert_eq!(
        resolution.active,
        ActiveCompany::Resolved {
            company_id: only.company_id,
            role: Some(CompanyRole::Buyer),
            source: ResolutionSource::AutoSelected,
        }
    );

    let ctx = context(&resolution.active, GlobalRole::User).expect("scoped context");
    assert_eq!(ctx.company_id, only.company_id);
    assert!(!ctx.impersonating);
    assert!(ctx.has_role(&[CompanyRole::Admin, CompanyRole::Buyer]));
    assert!(!ctx.has_role(&[CompanyRole::Operator]));
}

#[test]
fn several_memberships_require_explicit_selection() {
    let memberships = [membership(CompanyRole::Buyer), membership(CompanyRole::Admin)];
    let resolution = resolve_active_company(&memberships, None, None);
    match &resolution.active {
        ActiveCompany::RequiresSelection { candidates } => {
            assert_eq!(candidates.len(), 2);
        }
        other => panic!("expected selection, got {other:?}"),
    }
    assert_eq!(
        context(&resolution.active, GlobalRole::User),
        Err(ScopeError::SelectionRequired)
    );
}

#[test]
fn stored_selection_wins_when_still_a_membership() {
    let memberships = [membership(CompanyRole::Buyer), membership(CompanyRole::Admin)];
    let chosen = memberships[1].company_id;
    let resolution = resolve_active_company(&memberships, Some(chosen), None);

    assert_eq!(resolution.stale_selection, None);
    assert_eq!(
        resolution.active,
        ActiveCompany::Resolved {
            company_id: chosen,
            role: Some(CompanyRole::Admin),
            source: ResolutionSource::Session,
        }
    );
}

#[test]
fn stale_selection_is_discarded_not_trusted() {
    let only = membership(CompanyRole::Operator);
    let former = Uuid::new_v4();
    let resolution = resolve_active_company(&[only], Some(former), None);

    assert_eq!(resolution.stale_selection, Some(former));
    match resolution.active {
        ActiveCompany::Resolved { company_id, .. } => assert_eq!(company_id, only.company_id),
        other => panic!("expected fallback to the single membership, got {other:?}"),
    }

    let nobody = resolve_active_company(&[], Some(former), None);
    assert_eq!(nobody.active, ActiveCompany::None);
    assert_eq!(nobody.stale_selection, Some(former));
}

#[test]
fn impersonation_overrides_membership_resolution() {
    let own = membership(CompanyRole::Buyer);
    let target = Uuid::new_v4();
    let resolution = resolve_active_company(&[own], Some(own.company_id), Some(target));

    assert_eq!(
        resolution.active,
        ActiveCompany::Resolved {
            company_id: target,
            role: None,
            source: ResolutionSource::Impersonation,
        }
    );

    let ctx = context(&resolution.active, GlobalRole::Superadmin).expect("impersonated context");
    assert_eq!(ctx.company_id, target);
    assert!(ctx.impersonating);
    assert_eq!(ctx.company_role, CompanyRole::Admin);
}

#[test]
fn impersonation_requires_superadmin() {
    let resolution = resolve_active_company(&[], None, Some(Uuid::new_v4()));
    assert_eq!(
        context(&resolution.active, GlobalRole::User),
        Err(ScopeError::ImpersonationDenied)
    );
}

#[test]
fn exiting_impersonation_returns_to_own_context() {
    let target = Uuid::new_v4();
    let during = resolve_active_company(&[], None, Some(target));
    assert!(context(&during.active, GlobalRole::Superadmin).is_ok());

    // superadmins usually have no membership of their own
    let after = resolve_active_company(&[], None, None);
    assert_eq!(after.active, ActiveCompany::None);
    assert_eq!(
        context(&after.active, GlobalRole::Superadmin),
        Err(ScopeError::NoActiveCompany)
    );
}

#[test]
fn actor_stays_the_superadmin_while_impersonating() {
    let actor = Uuid::new_v4();
    let target = Uuid::new_v4();
    let resolution = resolve_active_company(&[], None, Some(target));
    let ctx = RequestContext::from_resolution(
        actor,
        GlobalRole::Superadmin,
        Uuid::new_v4(),
        &resolution.active,
    )
    .expect("context");

    assert_eq!(ctx.actor_id, actor);
    assert_ne!(ctx.actor_id, ctx.company_id);
    assert_eq!(ctx.actor_role, GlobalRole::Superadmin);
}

#[test]
fn resolution_serializes_with_a_kind_tag() {
    let json = serde_json::to_value(ActiveCompany::RequiresSelection {
        candidates: vec![Uuid::nil()],
    })
    .unwrap();
    assert_eq!(json["kind"], "requires_selection");
    assert_eq!(serde_json::to_value(ActiveCompany::None).unwrap()["kind"], "none");
}
