use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    audit::{self, AuditActor},
    domain::ApprovalStatus,
    dto::companies::{ApprovalListQuery, CompanyList, CreateCompanyRequest, UserList},
    entity::{
        companies::{ActiveModel as CompanyActive, Column as CompanyCol, Entity as Companies},
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_superadmin},
    models::{Company, User},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_companies(
    state: &AppState,
    user: &AuthUser,
    query: ApprovalListQuery,
) -> AppResult<ApiResponse<CompanyList>> {
    ensure_superadmin(user)?;
    let mut finder = Companies::find();
    if let Some(status) = query.status {
        finder = finder.filter(CompanyCol::ApprovalStatus.eq(status.as_str()));
    }
    let items = finder
        .order_by_asc(CompanyCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Company::try_from)
        .collect::<AppResult<Vec<_>>>()?;

    Ok(ApiResponse::success(
        "Companies",
        CompanyList { items },
        Some(Meta::empty()),
    ))
}

/// Companies created from the console start pending like self-service ones.
pub async fn create_company(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCompanyRequest,
) -> AppResult<ApiResponse<Company>> {
    ensure_superadmin(user)?;
    let document = payload.document.trim().to_string();
    if payload.name.trim().is_empty() || document.is_empty() {
        return Err(AppError::Validation("name and document are required".into()));
    }

    let exist = Companies::find()
        .filter(CompanyCol::Document.eq(document.as_str()))
        .one(&state.orm)
        .await?;
    if exist.is_some() {
        return Err(AppError::BadRequest("document is already registered".into()));
    }

    let company = CompanyActive {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name.trim().to_string()),
        document: Set(document),
        approval_status: Set(ApprovalStatus::Pending.as_str().to_string()),
        active: Set(true),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        state,
        AuditActor::user(user.user_id),
        "company_create",
        "companies",
        serde_json::json!({ "company_id": company.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Company created",
        Company::try_from(company)?,
        Some(Meta::empty()),
    ))
}

pub async fn decide_company(
    state: &AppState,
    user: &AuthUser,
    company_id: Uuid,
    status: ApprovalStatus,
) -> AppResult<ApiResponse<Company>> {
    ensure_superadmin(user)?;
    let company = Companies::find_by_id(company_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let previous = company.approval_status.clone();
    let mut active: CompanyActive = company.into();
    active.approval_status = Set(status.as_str().to_string());
    let company = active.update(&state.orm).await?;

    tracing::info!(
        company_id = %company.id,
        from = %previous,
        to = status.as_str(),
        "company approval changed"
    );
    audit::record(
        state,
        AuditActor::user(user.user_id),
        "company_approval",
        "companies",
        serde_json::json!({ "company_id": company.id, "from": previous, "to": status.as_str() }),
    )
    .await;

    Ok(ApiResponse::success(
        "Company updated",
        Company::try_from(company)?,
        Some(Meta::empty()),
    ))
}

/// An inactive company drops out of every member's resolution.
pub async fn set_company_active(
    state: &AppState,
    user: &AuthUser,
    company_id: Uuid,
    is_active: bool,
) -> AppResult<ApiResponse<Company>> {
    ensure_superadmin(user)?;
    let company = Companies::find_by_id(company_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: CompanyActive = company.into();
    active.active = Set(is_active);
    let company = active.update(&state.orm).await?;

    audit::record(
        state,
        AuditActor::user(user.user_id),
        "company_set_active",
        "companies",
        serde_json::json!({ "company_id": company.id, "active": is_active }),
    )
    .await;

    Ok(ApiResponse::success(
        "Company updated",
        Company::try_from(company)?,
        Some(Meta::empty()),
    ))
}

pub async fn list_users(
    state: &AppState,
    user: &AuthUser,
    query: ApprovalListQuery,
) -> AppResult<ApiResponse<UserList>> {
    ensure_superadmin(user)?;
    let mut finder = Users::find();
    if let Some(status) = query.status {
        finder = finder.filter(UserCol::ApprovalStatus.eq(status.as_str()));
    }
    let items = finder
        .order_by_desc(UserCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(User::try_from)
        .collect::<AppResult<Vec<_>>>()?;

    Ok(ApiResponse::success("Users", UserList { items }, Some(Meta::empty())))
}

pub async fn decide_user(
    state: &AppState,
    user: &AuthUser,
    user_id: Uuid,
    status: ApprovalStatus,
) -> AppResult<ApiResponse<User>> {
    ensure_superadmin(user)?;
    let target = Users::find_by_id(user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let previous = target.approval_status.clone();
    let mut active: UserActive = target.into();
    active.approval_status = Set(status.as_str().to_string());
    let target = active.update(&state.orm).await?;

    audit::record(
        state,
        AuditActor::user(user.user_id),
        "user_approval",
        "users",
        serde_json::json!({ "user_id": target.id, "from": previous, "to": status.as_str() }),
    )
    .await;

    Ok(ApiResponse::success(
        "User updated",
        User::try_from(target)?,
        Some(Meta::empty()),
    ))
}
