//! Database seeder for Permio development and testing.
//!
//! Seeds an admin, an HR officer, a manager, two reports, and their
//! vacation balances for the current year.
//!
//! Usage: cargo run --bin seeder

use chrono::{Datelike, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::info;
use uuid::Uuid;

use permio_db::entities::{
    employees,
    sea_orm_active_enums::{AccessLevel, EmployeeStatus},
    vacation_balances,
};

/// Seed IDs are fixed so reruns update the same rows.
const ADMIN_ID: &str = "00000000-0000-0000-0000-000000000001";
const HR_ID: &str = "00000000-0000-0000-0000-000000000002";
const MANAGER_ID: &str = "00000000-0000-0000-0000-000000000003";
const EMPLOYEE_A_ID: &str = "00000000-0000-0000-0000-000000000004";
const EMPLOYEE_B_ID: &str = "00000000-0000-0000-0000-000000000005";

const DEFAULT_ANNUAL_DAYS: i32 = 22;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "permio=info,seeder=info".into()),
        )
        .init();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    info!("Connecting to database...");
    let db = permio_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    info!("Seeding employees...");
    seed_employees(&db).await;

    info!("Seeding vacation balances...");
    seed_balances(&db).await;

    info!("Seeding complete!");
}

fn parse_id(raw: &str) -> Uuid {
    Uuid::parse_str(raw).unwrap()
}

async fn seed_employee(
    db: &DatabaseConnection,
    id: Uuid,
    full_name: &str,
    access_level: AccessLevel,
    manager_id: Option<Uuid>,
) {
    let existing = employees::Entity::find_by_id(id)
        .one(db)
        .await
        .expect("Failed to query employee");
    if existing.is_some() {
        return;
    }

    let now = Utc::now();
    employees::ActiveModel {
        id: Set(id),
        full_name: Set(full_name.to_string()),
        access_level: Set(access_level),
        manager_id: Set(manager_id),
        status: Set(EmployeeStatus::Active),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await
    .expect("Failed to insert employee");
}

async fn seed_employees(db: &DatabaseConnection) {
    seed_employee(db, parse_id(ADMIN_ID), "Avery Quinn", AccessLevel::Admin, None).await;
    seed_employee(db, parse_id(HR_ID), "Sol Tanaka", AccessLevel::Hr, None).await;
    seed_employee(
        db,
        parse_id(MANAGER_ID),
        "Mika Lindholm",
        AccessLevel::Manager,
        Some(parse_id(ADMIN_ID)),
    )
    .await;
    seed_employee(
        db,
        parse_id(EMPLOYEE_A_ID),
        "Ana Reyes",
        AccessLevel::Employee,
        Some(parse_id(MANAGER_ID)),
    )
    .await;
    seed_employee(
        db,
        parse_id(EMPLOYEE_B_ID),
        "Imre Szabo",
        AccessLevel::Employee,
        Some(parse_id(MANAGER_ID)),
    )
    .await;
}

async fn seed_balances(db: &DatabaseConnection) {
    let year = Utc::now().year();
    for raw in [ADMIN_ID, HR_ID, MANAGER_ID, EMPLOYEE_A_ID, EMPLOYEE_B_ID] {
        let employee_id = parse_id(raw);
        let found = vacation_balances::Entity::find()
            .filter(vacation_balances::Column::EmployeeId.eq(employee_id))
            .filter(vacation_balances::Column::Year.eq(year))
            .one(db)
            .await
            .expect("Failed to query balance");
        if found.is_some() {
            continue;
        }

        let now = Utc::now();
        vacation_balances::ActiveModel {
            id: Set(Uuid::now_v7()),
            employee_id: Set(employee_id),
            year: Set(year),
            available_days: Set(DEFAULT_ANNUAL_DAYS),
            days_taken: Set(0),
            days_reserved: Set(0),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(db)
        .await
        .expect("Failed to insert balance");
    }
}
