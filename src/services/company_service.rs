use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    audit,
    domain::{CompanyRole, RequestContext},
    dto::companies::{AddMemberRequest, MemberList},
    entity::{
        user_companies::{
            ActiveModel as UserCompanyActive, Column as UserCompanyCol, Entity as UserCompanies,
        },
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::tenancy::ensure_company_role,
    models::{CompanyMember, User, parse_column},
    response::{ApiResponse, Empty, Meta},
    state::AppState,
};

pub async fn list_members(
    state: &AppState,
    ctx: &RequestContext,
) -> AppResult<ApiResponse<MemberList>> {
    ensure_company_role(ctx, &[CompanyRole::Admin])?;
    let rows = UserCompanies::find()
        .filter(UserCompanyCol::CompanyId.eq(ctx.company_id))
        .order_by_asc(UserCompanyCol::CreatedAt)
        .find_also_related(Users)
        .all(&state.orm)
        .await?;

    let mut items = Vec::with_capacity(rows.len());
    for (link, user) in rows {
        let Some(user) = user else { continue };
        items.push(CompanyMember {
            user: User::try_from(user)?,
            role: parse_column(&link.role)?,
        });
    }

    Ok(ApiResponse::success("Members", MemberList { items }, Some(Meta::empty())))
}

/// Adds a user to the active company, or changes the role of an existing member.
pub async fn add_member(
    state: &AppState,
    ctx: &RequestContext,
    payload: AddMemberRequest,
) -> AppResult<ApiResponse<CompanyMember>> {
    ensure_company_role(ctx, &[CompanyRole::Admin])?;
    let user = Users::find_by_id(payload.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let existing = UserCompanies::find_by_id((payload.user_id, ctx.company_id))
        .one(&state.orm)
        .await?;
    match existing {
        Some(link) => {
            let mut active: UserCompanyActive = link.into();
            active.role = Set(payload.role.as_str().to_string());
            active.update(&state.orm).await?;
        }
        None => {
            UserCompanyActive {
                user_id: Set(payload.user_id),
                company_id: Set(ctx.company_id),
                role: Set(payload.role.as_str().to_string()),
                created_at: NotSet,
            }
            .insert(&state.orm)
            .await?;
        }
    }

    audit::record(
        state,
        ctx,
        "member_upsert",
        "user_companies",
        serde_json::json!({ "user_id": payload.user_id, "role": payload.role.as_str() }),
    )
    .await;

    Ok(ApiResponse::success(
        "Member saved",
        CompanyMember {
            user: User::try_from(user)?,
            role: payload.role,
        },
        Some(Meta::empty()),
    ))
}

pub async fn remove_member(
    state: &AppState,
    ctx: &RequestContext,
    user_id: Uuid,
) -> AppResult<ApiResponse<Empty>> {
    ensure_company_role(ctx, &[CompanyRole::Admin])?;
    if user_id == ctx.actor_id && !ctx.impersonating {
        return Err(AppError::BadRequest("cannot remove yourself".into()));
    }

    let result = UserCompanies::delete_by_id((user_id, ctx.company_id))
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        state,
        ctx,
        "member_remove",
        "user_companies",
        serde_json::json!({ "user_id": user_id }),
    )
    .await;

    Ok(ApiResponse::done("Member removed"))
}
