use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use uuid::Uuid;

use crate::{
    audit::{self, AuditActor},
    dto::companies::SessionState,
    entity::{companies::Entity as Companies, sessions::ActiveModel as SessionActive},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_superadmin},
    services::tenancy_service::{self, load_session, session_state},
    state::AppState,
};

/// Act as `company_id` for the rest of the session. The authenticated
/// identity does not change; only the resolved company does.
pub async fn enter_impersonation(
    state: &AppState,
    user: &AuthUser,
    company_id: Uuid,
) -> AppResult<SessionState> {
    ensure_superadmin(user)?;

    let company = Companies::find_by_id(company_id).one(&state.orm).await?;
    if company.is_none() {
        return Err(AppError::NotFound);
    }

    let session = load_session(&state.orm, user).await?;
    let previous = session.impersonated_company_id;
    let mut active: SessionActive = session.into();
    active.impersonated_company_id = Set(Some(company_id));
    active.updated_at = Set(Utc::now().into());
    active.update(&state.orm).await?;

    tracing::info!(
        actor_id = %user.user_id,
        company_id = %company_id,
        "impersonation started"
    );
    audit::record(
        state,
        AuditActor {
            actor_id: Some(user.user_id),
            acting_company_id: Some(company_id),
            impersonating: true,
        },
        "impersonation_enter",
        "sessions",
        serde_json::json!({ "company_id": company_id, "previous": previous }),
    )
    .await;

    let (session, resolution) = tenancy_service::resolve(state, user).await?;
    Ok(session_state(&session, resolution.active, true))
}

/// Drop impersonation; scoped requests fall back to the superadmin's own
/// context. Clients are told to discard cached scoped data.
pub async fn exit_impersonation(state: &AppState, user: &AuthUser) -> AppResult<SessionState> {
    let session = load_session(&state.orm, user).await?;
    let previous = session.impersonated_company_id;

    if previous.is_some() {
        let mut active: SessionActive = session.into();
        active.impersonated_company_id = Set(None);
        active.updated_at = Set(Utc::now().into());
        active.update(&state.orm).await?;
    }

    if let Some(company_id) = previous {
        tracing::info!(
            actor_id = %user.user_id,
            company_id = %company_id,
            "impersonation ended"
        );
        audit::record(
            state,
            AuditActor {
                actor_id: Some(user.user_id),
                acting_company_id: Some(company_id),
                impersonating: false,
            },
            "impersonation_exit",
            "sessions",
            serde_json::json!({ "company_id": company_id }),
        )
        .await;
    }

    let (session, resolution) = tenancy_service::resolve(state, user).await?;
    Ok(session_state(&session, resolution.active, true))
}
