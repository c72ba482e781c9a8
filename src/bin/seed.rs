use b2b_portal_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    domain::{ApprovalStatus, CompanyRole, GlobalRole},
    entity::{
        companies::{self, Entity as Companies},
        products::{self, Entity as Products},
        user_companies::{self, Entity as UserCompanies},
        users::{self, Entity as Users},
    },
    services::auth_service::hash_password,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;

    let superadmin_id = ensure_user(
        &orm,
        "superadmin@example.com",
        "Platform Admin",
        "superadmin123",
        GlobalRole::Superadmin,
    )
    .await?;
    let admin_id = ensure_user(
        &orm,
        "admin@acme.example.com",
        "Acme Admin",
        "admin12345",
        GlobalRole::User,
    )
    .await?;
    let buyer_id = ensure_user(
        &orm,
        "buyer@acme.example.com",
        "Acme Buyer",
        "buyer12345",
        GlobalRole::User,
    )
    .await?;

    let acme = ensure_company(&orm, "Acme Wholesale", "12345678000190").await?;
    let globex = ensure_company(&orm, "Globex Supplies", "98765432000110").await?;

    ensure_membership(&orm, admin_id, acme, CompanyRole::Admin).await?;
    ensure_membership(&orm, buyer_id, acme, CompanyRole::Buyer).await?;
    ensure_membership(&orm, buyer_id, globex, CompanyRole::Buyer).await?;

    seed_products(
        &orm,
        acme,
        &[
            ("ACM-001", "Steel bolts M8 (box of 100)", dec!(10.00), 500),
            ("ACM-002", "Hex nuts M8 (box of 100)", dec!(4.50), 800),
            ("ACM-003", "Washers 8mm (box of 200)", dec!(3.25), 350),
        ],
    )
    .await?;
    seed_products(
        &orm,
        globex,
        &[
            ("GLX-100", "Copper wire 2.5mm (100m)", dec!(189.90), 40),
            ("GLX-101", "Cable ties 200mm (pack of 500)", dec!(27.00), 120),
        ],
    )
    .await?;

    println!(
        "Seed completed. Superadmin: {superadmin_id}, admin: {admin_id}, buyer: {buyer_id}, companies: {acme}, {globex}"
    );
    Ok(())
}

async fn ensure_user(
    orm: &DatabaseConnection,
    email: &str,
    name: &str,
    password: &str,
    role: GlobalRole,
) -> anyhow::Result<Uuid> {
    if let Some(existing) = Users::find()
        .filter(users::Column::Email.eq(email))
        .one(orm)
        .await?
    {
        return Ok(existing.id);
    }

    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    let user = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        name: Set(name.to_string()),
        password_hash: Set(password_hash),
        role: Set(role.as_str().to_string()),
        approval_status: Set(ApprovalStatus::Approved.as_str().to_string()),
        created_at: NotSet,
    }
    .insert(orm)
    .await?;
    Ok(user.id)
}

async fn ensure_company(
    orm: &DatabaseConnection,
    name: &str,
    document: &str,
) -> anyhow::Result<Uuid> {
    if let Some(existing) = Companies::find()
        .filter(companies::Column::Document.eq(document))
        .one(orm)
        .await?
    {
        return Ok(existing.id);
    }

    let company = companies::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        document: Set(document.to_string()),
        approval_status: Set(ApprovalStatus::Approved.as_str().to_string()),
        active: Set(true),
        created_at: NotSet,
    }
    .insert(orm)
    .await?;
    Ok(company.id)
}

async fn ensure_membership(
    orm: &DatabaseConnection,
    user_id: Uuid,
    company_id: Uuid,
    role: CompanyRole,
) -> anyhow::Result<()> {
    if UserCompanies::find_by_id((user_id, company_id))
        .one(orm)
        .await?
        .is_some()
    {
        return Ok(());
    }

    user_companies::ActiveModel {
        user_id: Set(user_id),
        company_id: Set(company_id),
        role: Set(role.as_str().to_string()),
        created_at: NotSet,
    }
    .insert(orm)
    .await?;
    Ok(())
}

async fn seed_products(
    orm: &DatabaseConnection,
    company_id: Uuid,
    items: &[(&str, &str, Decimal, i32)],
) -> anyhow::Result<()> {
    for (sku, name, price, stock) in items {
        let exists = Products::find()
            .filter(products::Column::CompanyId.eq(company_id))
            .filter(products::Column::Sku.eq(*sku))
            .one(orm)
            .await?
            .is_some();
        if exists {
            continue;
        }

        products::ActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(company_id),
            sku: Set(sku.to_string()),
            name: Set(name.to_string()),
            description: Set(None),
            price: Set(*price),
            stock: Set(*stock),
            active: Set(true),
            created_at: NotSet,
        }
        .insert(orm)
        .await?;
    }
    Ok(())
}
