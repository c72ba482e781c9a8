use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::{
    audit::{self, AuditActor},
    domain::{ApprovalStatus, GlobalRole},
    dto::auth::{Claims, LoginRequest, LoginResponse, RegisterRequest},
    entity::{
        sessions::{ActiveModel as SessionActive, Entity as Sessions},
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{User, parse_column},
    response::{ApiResponse, Empty, Meta},
    state::AppState,
};

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

/// New accounts wait for superadmin approval before they can log in.
pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<User>> {
    let RegisterRequest {
        email,
        name,
        password,
    } = payload;
    let email = email.trim().to_lowercase();
    if email.is_empty() || password.len() < 8 {
        return Err(AppError::Validation(
            "email is required and password needs at least 8 characters".into(),
        ));
    }

    let exist = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?;
    if exist.is_some() {
        return Err(AppError::BadRequest("Email is already taken".to_string()));
    }

    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(email),
        name: Set(name),
        password_hash: Set(hash_password(&password)?),
        role: Set(GlobalRole::User.as_str().to_string()),
        approval_status: Set(ApprovalStatus::Pending.as_str().to_string()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        state,
        AuditActor::user(user.id),
        "user_register",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    Ok(ApiResponse::success("User created", User::try_from(user)?, None))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { email, password } = payload;
    let user = Users::find()
        .filter(UserCol::Email.eq(email.trim().to_lowercase()))
        .one(&state.orm)
        .await?;

    let user = match user {
        Some(u) => u,
        None => return Err(AppError::BadRequest("Invalid email or password".into())),
    };

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    if Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::BadRequest("Invalid email or password".into()));
    }

    let role: GlobalRole = parse_column(&user.role)?;
    let approval: ApprovalStatus = parse_column(&user.approval_status)?;
    if !role.is_superadmin() && approval != ApprovalStatus::Approved {
        tracing::info!(user_id = %user.id, status = approval.as_str(), "login refused, account not approved");
        return Err(AppError::Forbidden);
    }

    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(state.config.session_ttl_hours))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let session = SessionActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.id),
        active_company_id: Set(None),
        impersonated_company_id: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
        expires_at: Set(expiration.into()),
    }
    .insert(&state.orm)
    .await?;

    let claims = Claims {
        sub: user.id.to_string(),
        role: role.as_str().to_string(),
        sid: session.id.to_string(),
        exp: expiration.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;

    let resp = LoginResponse {
        token: format!("Bearer {}", token),
    };

    audit::record(
        state,
        AuditActor::user(user.id),
        "user_login",
        "users",
        serde_json::json!({ "user_id": user.id, "session_id": session.id }),
    )
    .await;

    Ok(ApiResponse::success("Logged in", resp, Some(Meta::empty())))
}

/// Ends the server-side session, which also ends any impersonation in it.
pub async fn logout_user(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<Empty>> {
    Sessions::delete_by_id(user.session_id)
        .exec(&state.orm)
        .await?;

    audit::record(
        state,
        AuditActor::user(user.user_id),
        "user_logout",
        "sessions",
        serde_json::json!({ "session_id": user.session_id }),
    )
    .await;

    Ok(ApiResponse::done("Logged out"))
}
