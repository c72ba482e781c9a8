use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    domain::{ActiveCompany, ApprovalStatus, CompanyRole},
    models::{Company, CompanyMember, CompanyMembership, User},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct SelectCompanyRequest {
    pub company_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ImpersonateRequest {
    pub company_id: Uuid,
}

/// Server-side session as seen by the client.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionState {
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub active_company_id: Option<Uuid>,
    pub impersonated_company_id: Option<Uuid>,
    pub resolution: ActiveCompany,
    /// Client-side caches to drop, set when the acting company changed.
    pub invalidate: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MyCompanies {
    pub items: Vec<CompanyMembership>,
    pub resolution: ActiveCompany,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCompanyRequest {
    pub name: String,
    pub document: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ApprovalRequest {
    pub status: ApprovalStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetActiveRequest {
    pub active: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ApprovalListQuery {
    pub status: Option<ApprovalStatus>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CompanyList {
    pub items: Vec<Company>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserList {
    pub items: Vec<User>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddMemberRequest {
    pub user_id: Uuid,
    pub role: CompanyRole,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MemberList {
    pub items: Vec<CompanyMember>,
}
