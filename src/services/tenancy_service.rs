use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    domain::{
        ActiveCompany, ApprovalStatus, CompanyRole, Membership, RequestContext,
        resolve_active_company,
        tenancy::{Resolution, ScopeError},
    },
    dto::companies::{MyCompanies, SessionState},
    entity::{
        companies::{Entity as Companies, Model as CompanyModel},
        sessions::{ActiveModel as SessionActive, Entity as Sessions, Model as SessionModel},
        user_companies::{Column as UserCompanyCol, Entity as UserCompanies},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Company, CompanyMembership, parse_column},
    state::AppState,
};

pub const SCOPED_CACHES: [&str; 3] = ["orders", "users", "companies"];

fn is_usable(company: &CompanyModel) -> bool {
    company.active
        && company
            .approval_status
            .parse::<ApprovalStatus>()
            .is_ok_and(|s| s == ApprovalStatus::Approved)
}

/// Memberships the user can act in, paired with their company rows.
pub async fn load_memberships<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> AppResult<Vec<(Membership, CompanyModel)>> {
    let rows = UserCompanies::find()
        .filter(UserCompanyCol::UserId.eq(user_id))
        .order_by_asc(UserCompanyCol::CreatedAt)
        .find_also_related(Companies)
        .all(conn)
        .await?;

    let mut memberships = Vec::with_capacity(rows.len());
    for (link, company) in rows {
        let Some(company) = company else { continue };
        if !is_usable(&company) {
            continue;
        }
        let role: CompanyRole = parse_column(&link.role)?;
        memberships.push((
            Membership {
                company_id: company.id,
                role,
            },
            company,
        ));
    }
    Ok(memberships)
}

pub async fn load_session<C: ConnectionTrait>(
    conn: &C,
    user: &AuthUser,
) -> AppResult<SessionModel> {
    let session = Sessions::find_by_id(user.session_id).one(conn).await?;
    match session {
        Some(s) if s.user_id == user.user_id => Ok(s),
        _ => Err(AppError::Unauthorized),
    }
}

/// Resolve the active company for this session. A stored selection that no
/// longer matches a membership is cleared instead of trusted.
pub async fn resolve(state: &AppState, user: &AuthUser) -> AppResult<(SessionModel, Resolution)> {
    let session = load_session(&state.orm, user).await?;

    let impersonated = match session.impersonated_company_id {
        Some(company_id) if user.role.is_superadmin() => Some(company_id),
        Some(company_id) => {
            tracing::warn!(
                user_id = %user.user_id,
                company_id = %company_id,
                "impersonation state on a non-superadmin session"
            );
            return Err(ScopeError::ImpersonationDenied.into());
        }
        None => None,
    };

    let memberships: Vec<Membership> = load_memberships(&state.orm, user.user_id)
        .await?
        .into_iter()
        .map(|(m, _)| m)
        .collect();

    let resolution = resolve_active_company(&memberships, session.active_company_id, impersonated);

    let session = match resolution.stale_selection {
        Some(stale) => {
            tracing::info!(
                user_id = %user.user_id,
                company_id = %stale,
                "discarding stale active company selection"
            );
            let mut active: SessionActive = session.into();
            active.active_company_id = Set(None);
            active.updated_at = Set(Utc::now().into());
            active.update(&state.orm).await?
        }
        None => session,
    };

    Ok((session, resolution))
}

pub async fn resolve_context(state: &AppState, user: &AuthUser) -> AppResult<RequestContext> {
    let (_, resolution) = resolve(state, user).await?;
    RequestContext::from_resolution(user.user_id, user.role, user.session_id, &resolution.active)
        .map_err(|err| {
            tracing::warn!(
                user_id = %user.user_id,
                session_id = %user.session_id,
                error = %err,
                "scope violation: no active company"
            );
            AppError::from(err)
        })
}

pub fn session_state(
    session: &SessionModel,
    resolution: ActiveCompany,
    invalidate: bool,
) -> SessionState {
    SessionState {
        session_id: session.id,
        user_id: session.user_id,
        active_company_id: session.active_company_id,
        impersonated_company_id: session.impersonated_company_id,
        resolution,
        invalidate: if invalidate {
            SCOPED_CACHES.iter().map(|s| s.to_string()).collect()
        } else {
            Vec::new()
        },
    }
}

pub async fn current_session(state: &AppState, user: &AuthUser) -> AppResult<SessionState> {
    let (session, resolution) = resolve(state, user).await?;
    Ok(session_state(&session, resolution.active, false))
}

pub async fn my_companies(state: &AppState, user: &AuthUser) -> AppResult<MyCompanies> {
    let memberships = load_memberships(&state.orm, user.user_id).await?;
    let (_, resolution) = resolve(state, user).await?;

    let items = memberships
        .into_iter()
        .map(|(m, company)| {
            Ok(CompanyMembership {
                company: Company::try_from(company)?,
                role: m.role,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(MyCompanies {
        items,
        resolution: resolution.active,
    })
}

pub async fn select_active_company(
    state: &AppState,
    user: &AuthUser,
    company_id: Uuid,
) -> AppResult<SessionState> {
    let memberships = load_memberships(&state.orm, user.user_id).await?;
    if !memberships.iter().any(|(m, _)| m.company_id == company_id) {
        tracing::warn!(
            user_id = %user.user_id,
            company_id = %company_id,
            "scope violation: selecting a company outside memberships"
        );
        return Err(AppError::ScopeViolation(
            "not a member of this company".into(),
        ));
    }

    let session = load_session(&state.orm, user).await?;
    let changed = session.active_company_id != Some(company_id);
    let mut active: SessionActive = session.into();
    active.active_company_id = Set(Some(company_id));
    active.updated_at = Set(Utc::now().into());
    active.update(&state.orm).await?;

    audit::record(
        state,
        audit::AuditActor {
            actor_id: Some(user.user_id),
            acting_company_id: Some(company_id),
            impersonating: false,
        },
        "active_company_select",
        "sessions",
        serde_json::json!({ "company_id": company_id }),
    )
    .await;

    let (session, resolution) = resolve(state, user).await?;
    Ok(session_state(&session, resolution.active, changed))
}

pub async fn clear_active_company(state: &AppState, user: &AuthUser) -> AppResult<SessionState> {
    let session = load_session(&state.orm, user).await?;
    let changed = session.active_company_id.is_some();
    let mut active: SessionActive = session.into();
    active.active_company_id = Set(None);
    active.updated_at = Set(Utc::now().into());
    active.update(&state.orm).await?;

    let (session, resolution) = resolve(state, user).await?;
    Ok(session_state(&session, resolution.active, changed))
}
