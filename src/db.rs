use anyhow::Context;
use sqlx::MySqlPool;
use tracing::info;

pub async fn init_db(database_url: &str) -> anyhow::Result<MySqlPool> {
    let pool = MySqlPool::connect(database_url)
        .await
        .context("Failed to connect to database")?;
    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    Ok(pool)
}

/// Creates the ledger tables if they are missing. The `employees` and
/// `departments` tables belong to the employee directory and are only read.
pub async fn run_migrations(pool: &MySqlPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS attendance_records (
            employee_id BIGINT UNSIGNED NOT NULL,
            date        DATE            NOT NULL,
            check_in    TIME            NULL,
            check_out   TIME            NULL,
            status      VARCHAR(16)     NOT NULL,
            PRIMARY KEY (employee_id, date),
            INDEX idx_attendance_date (date)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // one row per generated period; its primary key is the generation guard
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS payroll_periods (
            period       CHAR(7)  NOT NULL PRIMARY KEY,
            generated_at DATETIME NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS payroll_records (
            id           VARCHAR(64)     NOT NULL PRIMARY KEY,
            employee_id  BIGINT UNSIGNED NOT NULL,
            period       CHAR(7)         NOT NULL,
            basic_salary DOUBLE          NOT NULL,
            allowances   DOUBLE          NOT NULL,
            deductions   DOUBLE          NOT NULL,
            net_salary   DOUBLE          NOT NULL,
            status       VARCHAR(16)     NOT NULL,
            UNIQUE KEY uq_payroll_employee_period (employee_id, period),
            INDEX idx_payroll_period (period)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS manual_payments (
            id           VARCHAR(64)     NOT NULL PRIMARY KEY,
            employee_id  BIGINT UNSIGNED NOT NULL,
            amount       DOUBLE          NOT NULL CHECK (amount > 0),
            date         DATE            NOT NULL,
            payment_type VARCHAR(16)     NOT NULL,
            notes        TEXT            NULL,
            status       VARCHAR(16)     NOT NULL,
            INDEX idx_manual_payments_date (date)
        )
        "#,
    )
    .execute(pool)
    .await?;

    info!("Database migrations applied");
    Ok(())
}
