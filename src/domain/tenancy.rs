//! Active company resolution and the per-request context built from it.

use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use super::status::{CompanyRole, GlobalRole};

/// A company the user may act in: membership exists and the company is
/// approved and active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Membership {
    pub company_id: Uuid,
    pub role: CompanyRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    Impersonation,
    Session,
    AutoSelected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActiveCompany {
    Resolved {
        company_id: Uuid,
        /// `None` when a superadmin impersonates a company they are not a
        /// member of; the context treats that as admin.
        role: Option<CompanyRole>,
        source: ResolutionSource,
    },
    RequiresSelection {
        candidates: Vec<Uuid>,
    },
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub active: ActiveCompany,
    /// Session selection that no longer matches a membership and must be
    /// cleared by the caller.
    pub stale_selection: Option<Uuid>,
}

/// Resolve the company a request acts in.
///
/// Order: impersonation target, then the stored session selection (only if it
/// is still one of `memberships`), then the single membership. Several
/// memberships without a valid selection require an explicit choice.
pub fn resolve_active_company(
    memberships: &[Membership],
    stored: Option<Uuid>,
    impersonated: Option<Uuid>,
) -> Resolution {
    if let Some(company_id) = impersonated {
        let role = memberships
            .iter()
            .find(|m| m.company_id == company_id)
            .map(|m| m.role);
        return Resolution {
            active: ActiveCompany::Resolved {
                company_id,
                role,
                source: ResolutionSource::Impersonation,
            },
            stale_selection: None,
        };
    }

    let mut stale_selection = None;
    if let Some(selected) = stored {
        match memberships.iter().find(|m| m.company_id == selected) {
            Some(m) => {
                return Resolution {
                    active: ActiveCompany::Resolved {
                        company_id: m.company_id,
                        role: Some(m.role),
                        source: ResolutionSource::Session,
                    },
                    stale_selection: None,
                };
            }
            None => stale_selection = Some(selected),
        }
    }

    let active = match memberships {
        [] => ActiveCompany::None,
        [only] => ActiveCompany::Resolved {
            company_id: only.company_id,
            role: Some(only.role),
            source: ResolutionSource::AutoSelected,
        },
        many => ActiveCompany::RequiresSelection {
            candidates: many.iter().map(|m| m.company_id).collect(),
        },
    };

    Resolution {
        active,
        stale_selection,
    }
}

/// Who is acting and in which company. Passed explicitly through every
/// company-scoped service call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// The authenticated user; stays the superadmin while impersonating.
    pub actor_id: Uuid,
    pub actor_role: GlobalRole,
    pub session_id: Uuid,
    pub company_id: Uuid,
    pub company_role: CompanyRole,
    pub impersonating: bool,
}

impl RequestContext {
    pub fn from_resolution(
        actor_id: Uuid,
        actor_role: GlobalRole,
        session_id: Uuid,
        active: &ActiveCompany,
    ) -> Result<Self, ScopeError> {
        match active {
            ActiveCompany::Resolved {
                company_id,
                role,
                source,
            } => {
                let impersonating = *source == ResolutionSource::Impersonation;
                if impersonating && !actor_role.is_superadmin() {
                    return Err(ScopeError::ImpersonationDenied);
                }
                let company_role = match (role, impersonating) {
                    (_, true) => CompanyRole::Admin,
                    (Some(role), false) => *role,
                    (None, false) => return Err(ScopeError::NoActiveCompany),
                };
                Ok(Self {
                    actor_id,
                    actor_role,
                    session_id,
                    company_id: *company_id,
                    company_role,
                    impersonating,
                })
            }
            ActiveCompany::RequiresSelection { .. } => Err(ScopeError::SelectionRequired),
            ActiveCompany::None => Err(ScopeError::NoActiveCompany),
        }
    }

    pub fn has_role(&self, allowed: &[CompanyRole]) -> bool {
        allowed.contains(&self.company_role)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScopeError {
    #[error("no active company")]
    NoActiveCompany,

    #[error("select an active company before continuing")]
    SelectionRequired,

    #[error("impersonation not allowed")]
    ImpersonationDenied,
}
