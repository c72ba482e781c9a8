use serde_json::Value;
use uuid::Uuid;

use crate::{domain::RequestContext, error::AppResult, state::AppState};

/// Who performed an action. While impersonating, `actor_id` is still the
/// superadmin and `acting_company_id` is the impersonated company.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditActor {
    pub actor_id: Option<Uuid>,
    pub acting_company_id: Option<Uuid>,
    pub impersonating: bool,
}

impl AuditActor {
    pub fn user(user_id: Uuid) -> Self {
        Self {
            actor_id: Some(user_id),
            acting_company_id: None,
            impersonating: false,
        }
    }
}

impl From<&RequestContext> for AuditActor {
    fn from(ctx: &RequestContext) -> Self {
        Self {
            actor_id: Some(ctx.actor_id),
            acting_company_id: Some(ctx.company_id),
            impersonating: ctx.impersonating,
        }
    }
}

pub async fn log_audit(
    state: &AppState,
    actor: AuditActor,
    action: &str,
    resource: Option<&str>,
    metadata: Option<Value>,
) -> AppResult<()> {
    let pool = state.orm.get_postgres_connection_pool();
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO audit_logs (id, actor_id, acting_company_id, impersonating, action, resource, metadata)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(id)
    .bind(actor.actor_id)
    .bind(actor.acting_company_id)
    .bind(actor.impersonating)
    .bind(action)
    .bind(resource)
    .bind(metadata)
    .execute(pool)
    .await?;

    Ok(())
}

/// Write an audit entry after the main transaction committed. A failed audit
/// write is logged and never fails the request.
pub async fn record(
    state: &AppState,
    actor: impl Into<AuditActor>,
    action: &str,
    resource: &str,
    metadata: Value,
) {
    let actor = actor.into();
    if let Err(err) = log_audit(state, actor, action, Some(resource), Some(metadata)).await {
        tracing::warn!(error = %err, action, "audit log failed");
    }
}
