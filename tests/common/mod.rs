//! Shared setup for the database-backed tests.
#![allow(dead_code)]

use b2b_portal_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    domain::{CompanyRole, GlobalRole},
    entity::{
        companies::ActiveModel as CompanyActive, products::ActiveModel as ProductActive,
        sessions::ActiveModel as SessionActive, user_companies::ActiveModel as MembershipActive,
        users::ActiveModel as UserActive,
    },
    middleware::auth::AuthUser,
    state::AppState,
};
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};
use uuid::Uuid;

/// `None` means no database is configured and the test should skip.
pub fn database_url() -> Option<String> {
    match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
        Ok(url) => Some(url),
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            None
        }
    }
}

pub async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE audit_logs, order_item_discounts, order_items, orders, cart_items, products, sessions, user_companies, companies, users CASCADE",
    ))
    .await?;

    let config = AppConfig {
        database_url: database_url.to_string(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "test-secret".into(),
        session_ttl_hours: 1,
    };
    Ok(AppState::new(orm, config))
}

pub async fn create_company(state: &AppState, name: &str, document: &str) -> anyhow::Result<Uuid> {
    let company = CompanyActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.into()),
        document: Set(document.into()),
        approval_status: Set("APPROVED".into()),
        active: Set(true),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(company.id)
}

pub async fn create_user(state: &AppState, role: &str, email: &str) -> anyhow::Result<Uuid> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        name: Set(email.to_string()),
        password_hash: Set("dummy".into()),
        role: Set(role.into()),
        approval_status: Set("APPROVED".into()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(user.id)
}

pub async fn add_membership(
    state: &AppState,
    user_id: Uuid,
    company_id: Uuid,
    role: CompanyRole,
) -> anyhow::Result<()> {
    MembershipActive {
        user_id: Set(user_id),
        company_id: Set(company_id),
        role: Set(role.as_str().to_string()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(())
}

pub async fn create_product(
    state: &AppState,
    company_id: Uuid,
    sku: &str,
    name: &str,
    price: Decimal,
    stock: i32,
) -> anyhow::Result<Uuid> {
    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        company_id: Set(company_id),
        sku: Set(sku.into()),
        name: Set(name.into()),
        description: Set(None),
        price: Set(price),
        stock: Set(stock),
        active: Set(true),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(product.id)
}

/// Server-side session as `auth_service::login_user` would create it.
pub async fn login(state: &AppState, user_id: Uuid, role: GlobalRole) -> anyhow::Result<AuthUser> {
    let now = Utc::now();
    let session = SessionActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        active_company_id: Set(None),
        impersonated_company_id: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        expires_at: Set((now + Duration::hours(1)).into()),
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser {
        user_id,
        role,
        session_id: session.id,
    })
}
