//! Initial database migration.
//!
//! Creates the enums and core tables for the request workflow: employees,
//! vacation balances, reservations, requests, approval decisions, and
//! notification events.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: EMPLOYEES
        // ============================================================
        db.execute_unprepared(EMPLOYEES_SQL).await?;

        // ============================================================
        // PART 3: LEDGER
        // ============================================================
        db.execute_unprepared(VACATION_BALANCES_SQL).await?;
        db.execute_unprepared(RESERVATIONS_SQL).await?;

        // ============================================================
        // PART 4: REQUESTS & DECISIONS
        // ============================================================
        db.execute_unprepared(REQUESTS_SQL).await?;
        db.execute_unprepared(APPROVAL_DECISIONS_SQL).await?;

        // ============================================================
        // PART 5: NOTIFICATIONS
        // ============================================================
        db.execute_unprepared(NOTIFICATION_EVENTS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_SQL).await?;
        Ok(())
    }
}

const ENUMS_SQL: &str = r"
CREATE TYPE access_level AS ENUM ('employee', 'manager', 'hr', 'admin');
CREATE TYPE employee_status AS ENUM ('active', 'inactive', 'suspended');
CREATE TYPE request_type AS ENUM ('vacation', 'leave', 'certificate');
CREATE TYPE request_status AS ENUM ('pending', 'approved', 'rejected', 'cancelled');
CREATE TYPE decision_outcome AS ENUM ('approved', 'rejected');
CREATE TYPE notification_kind AS ENUM ('submitted', 'approved', 'rejected', 'cancelled');
CREATE TYPE reservation_state AS ENUM ('held', 'committed', 'released');
";

const EMPLOYEES_SQL: &str = r"
CREATE TABLE employees (
    id UUID PRIMARY KEY,
    full_name TEXT NOT NULL,
    access_level access_level NOT NULL DEFAULT 'employee',
    manager_id UUID REFERENCES employees(id),
    status employee_status NOT NULL DEFAULT 'active',
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_employees_manager ON employees(manager_id);
";

const VACATION_BALANCES_SQL: &str = r"
CREATE TABLE vacation_balances (
    id UUID PRIMARY KEY,
    employee_id UUID NOT NULL REFERENCES employees(id),
    year INTEGER NOT NULL,
    available_days INTEGER NOT NULL CHECK (available_days >= 0),
    days_taken INTEGER NOT NULL DEFAULT 0 CHECK (days_taken >= 0),
    days_reserved INTEGER NOT NULL DEFAULT 0 CHECK (days_reserved >= 0),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT uq_vacation_balances_employee_year UNIQUE (employee_id, year),
    CONSTRAINT ck_vacation_balances_no_overdraw
        CHECK (days_taken + days_reserved <= available_days)
);
";

const RESERVATIONS_SQL: &str = r"
CREATE TABLE reservations (
    id UUID PRIMARY KEY,
    employee_id UUID NOT NULL REFERENCES employees(id),
    year INTEGER NOT NULL,
    days INTEGER NOT NULL CHECK (days > 0),
    state reservation_state NOT NULL DEFAULT 'held',
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_reservations_employee_year ON reservations(employee_id, year);
";

const REQUESTS_SQL: &str = r"
CREATE TABLE requests (
    id UUID PRIMARY KEY,
    employee_id UUID NOT NULL REFERENCES employees(id),
    request_type request_type NOT NULL,
    start_date DATE NOT NULL,
    end_date DATE,
    requested_days INTEGER NOT NULL DEFAULT 0 CHECK (requested_days >= 0),
    status request_status NOT NULL DEFAULT 'pending',
    comments TEXT,
    approver_id UUID REFERENCES employees(id),
    reservation_id UUID REFERENCES reservations(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    decided_at TIMESTAMPTZ,
    version BIGINT NOT NULL DEFAULT 0
);

CREATE INDEX idx_requests_employee ON requests(employee_id);
CREATE INDEX idx_requests_status ON requests(status);
";

const APPROVAL_DECISIONS_SQL: &str = r"
CREATE TABLE approval_decisions (
    id UUID PRIMARY KEY,
    request_id UUID NOT NULL UNIQUE REFERENCES requests(id),
    approver_id UUID NOT NULL REFERENCES employees(id),
    outcome decision_outcome NOT NULL,
    comments TEXT,
    decided_at TIMESTAMPTZ NOT NULL
);
";

const NOTIFICATION_EVENTS_SQL: &str = r#"
CREATE TABLE notification_events (
    id UUID PRIMARY KEY,
    request_id UUID NOT NULL REFERENCES requests(id),
    recipient_id UUID NOT NULL REFERENCES employees(id),
    kind notification_kind NOT NULL,
    message TEXT NOT NULL,
    "read" BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT uq_notification_events_request_kind UNIQUE (request_id, kind)
);

CREATE INDEX idx_notification_events_recipient ON notification_events(recipient_id);
"#;

const DROP_SQL: &str = r"
DROP TABLE IF EXISTS notification_events;
DROP TABLE IF EXISTS approval_decisions;
DROP TABLE IF EXISTS requests;
DROP TABLE IF EXISTS reservations;
DROP TABLE IF EXISTS vacation_balances;
DROP TABLE IF EXISTS employees;
DROP TYPE IF EXISTS reservation_state;
DROP TYPE IF EXISTS notification_kind;
DROP TYPE IF EXISTS decision_outcome;
DROP TYPE IF EXISTS request_status;
DROP TYPE IF EXISTS request_type;
DROP TYPE IF EXISTS employee_status;
DROP TYPE IF EXISTS access_level;
";
