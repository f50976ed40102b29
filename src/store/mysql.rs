use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use sqlx::{MySqlConnection, MySqlPool};

use crate::error::{CoreError, CoreResult};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::employee::Employee;
use crate::model::manual_payment::ManualPayment;
use crate::model::payroll::{PaymentStatus, PayrollCorrection, PayrollRecord};
use crate::model::period::Period;
use crate::store::{AttendanceStore, ManualPaymentStore, PayrollStore, RosterSource};

fn is_duplicate_key(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23000"))
}

/// A duplicate guard row means another generation for the period won.
fn guard_insert_error(e: sqlx::Error, period: Period) -> CoreError {
    if is_duplicate_key(&e) {
        CoreError::AlreadyGenerated { period }
    } else {
        e.into()
    }
}

fn corrupt(column: &str, value: &str) -> CoreError {
    CoreError::Storage(format!("unexpected {column} value '{value}'"))
}

#[derive(sqlx::FromRow)]
struct AttendanceRow {
    employee_id: u64,
    date: NaiveDate,
    check_in: Option<NaiveTime>,
    check_out: Option<NaiveTime>,
    status: String,
}

impl TryFrom<AttendanceRow> for AttendanceRecord {
    type Error = CoreError;

    fn try_from(row: AttendanceRow) -> Result<Self, Self::Error> {
        Ok(AttendanceRecord {
            employee_id: row.employee_id,
            date: row.date,
            check_in: row.check_in,
            check_out: row.check_out,
            status: row.status.parse().map_err(|_| corrupt("status", &row.status))?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PayrollRow {
    id: String,
    employee_id: u64,
    period: String,
    basic_salary: f64,
    allowances: f64,
    deductions: f64,
    net_salary: f64,
    status: String,
}

impl TryFrom<PayrollRow> for PayrollRecord {
    type Error = CoreError;

    fn try_from(row: PayrollRow) -> Result<Self, Self::Error> {
        Ok(PayrollRecord {
            period: row.period.parse().map_err(|_| corrupt("period", &row.period))?,
            status: row.status.parse().map_err(|_| corrupt("status", &row.status))?,
            id: row.id,
            employee_id: row.employee_id,
            basic_salary: row.basic_salary,
            allowances: row.allowances,
            deductions: row.deductions,
            net_salary: row.net_salary,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ManualPaymentRow {
    id: String,
    employee_id: u64,
    amount: f64,
    date: NaiveDate,
    payment_type: String,
    notes: Option<String>,
    status: String,
}

impl TryFrom<ManualPaymentRow> for ManualPayment {
    type Error = CoreError;

    fn try_from(row: ManualPaymentRow) -> Result<Self, Self::Error> {
        Ok(ManualPayment {
            payment_type: row
                .payment_type
                .parse()
                .map_err(|_| corrupt("payment_type", &row.payment_type))?,
            status: row.status.parse().map_err(|_| corrupt("status", &row.status))?,
            id: row.id,
            employee_id: row.employee_id,
            amount: row.amount,
            date: row.date,
            notes: row.notes,
        })
    }
}

fn convert_all<R, T>(rows: Vec<R>) -> CoreResult<Vec<T>>
where
    T: TryFrom<R, Error = CoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}

pub struct MySqlAttendanceStore {
    pool: MySqlPool,
}

impl MySqlAttendanceStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, employee_id: u64, date: NaiveDate) -> CoreResult<Option<AttendanceRecord>> {
        let row = sqlx::query_as::<_, AttendanceRow>(
            r#"
            SELECT employee_id, date, check_in, check_out, status
            FROM attendance_records
            WHERE employee_id = ? AND date = ?
            "#,
        )
        .bind(employee_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;
        row.map(AttendanceRecord::try_from).transpose()
    }
}

#[async_trait]
impl AttendanceStore for MySqlAttendanceStore {
    async fn upsert(&self, record: AttendanceRecord) -> CoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO attendance_records (employee_id, date, check_in, check_out, status)
            VALUES (?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                check_in = VALUES(check_in),
                check_out = VALUES(check_out),
                status = VALUES(status)
            "#,
        )
        .bind(record.employee_id)
        .bind(record.date)
        .bind(record.check_in)
        .bind(record.check_out)
        .bind(record.status.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn check_in(
        &self,
        employee_id: u64,
        date: NaiveDate,
        time: NaiveTime,
    ) -> CoreResult<Option<AttendanceRecord>> {
        // a manual entry without a check-in is taken over in place
        let upgraded = sqlx::query(
            r#"
            UPDATE attendance_records
            SET check_in = ?, status = ?
            WHERE employee_id = ? AND date = ? AND check_in IS NULL
            "#,
        )
        .bind(time)
        .bind(AttendanceStatus::Present.to_string())
        .bind(employee_id)
        .bind(date)
        .execute(&self.pool)
        .await?;
        if upgraded.rows_affected() > 0 {
            return self.fetch(employee_id, date).await;
        }

        let record = AttendanceRecord {
            employee_id,
            date,
            check_in: Some(time),
            check_out: None,
            status: AttendanceStatus::Present,
        };
        let inserted = sqlx::query(
            r#"
            INSERT INTO attendance_records (employee_id, date, check_in, check_out, status)
            VALUES (?, ?, ?, NULL, ?)
            "#,
        )
        .bind(employee_id)
        .bind(date)
        .bind(time)
        .bind(record.status.to_string())
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(_) => Ok(Some(record)),
            // the day already has a checked-in record
            Err(e) if is_duplicate_key(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn check_out(
        &self,
        employee_id: u64,
        date: NaiveDate,
        time: NaiveTime,
    ) -> CoreResult<Option<AttendanceRecord>> {
        let result = sqlx::query(
            r#"
            UPDATE attendance_records
            SET check_out = ?
            WHERE employee_id = ? AND date = ?
            AND check_in IS NOT NULL
            AND check_out IS NULL
            "#,
        )
        .bind(time)
        .bind(employee_id)
        .bind(date)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.fetch(employee_id, date).await
    }

    async fn list_for_date(&self, date: NaiveDate) -> CoreResult<Vec<AttendanceRecord>> {
        let rows = sqlx::query_as::<_, AttendanceRow>(
            r#"
            SELECT employee_id, date, check_in, check_out, status
            FROM attendance_records
            WHERE date = ?
            ORDER BY employee_id
            "#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    async fn list_for_employee_range(
        &self,
        employee_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> CoreResult<Vec<AttendanceRecord>> {
        let rows = sqlx::query_as::<_, AttendanceRow>(
            r#"
            SELECT employee_id, date, check_in, check_out, status
            FROM attendance_records
            WHERE employee_id = ? AND date BETWEEN ? AND ?
            ORDER BY date
            "#,
        )
        .bind(employee_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }
}

pub struct MySqlPayrollStore {
    pool: MySqlPool,
}

impl MySqlPayrollStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

const PAYROLL_COLUMNS: &str =
    "id, employee_id, period, basic_salary, allowances, deductions, net_salary, status";

#[async_trait]
impl PayrollStore for MySqlPayrollStore {
    async fn period_exists(&self, period: Period) -> CoreResult<bool> {
        let found: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM payroll_periods WHERE period = ?")
                .bind(period.to_string())
                .fetch_optional(&self.pool)
                .await?;
        Ok(found.is_some())
    }

    async fn insert_period(&self, period: Period, records: Vec<PayrollRecord>) -> CoreResult<()> {
        // A dropped transaction rolls back, so an error or a cancelled future
        // leaves neither the guard row nor any record behind.
        let mut tx = self.pool.begin().await?;

        let guard = sqlx::query(
            "INSERT INTO payroll_periods (period, generated_at) VALUES (?, UTC_TIMESTAMP())",
        )
        .bind(period.to_string())
        .execute(&mut *tx)
        .await;

        if let Err(e) = guard {
            return Err(guard_insert_error(e, period));
        }

        for record in &records {
            sqlx::query(
                r#"
                INSERT INTO payroll_records
                (id, employee_id, period, basic_salary, allowances, deductions, net_salary, status)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&record.id)
            .bind(record.employee_id)
            .bind(record.period.to_string())
            .bind(record.basic_salary)
            .bind(record.allowances)
            .bind(record.deductions)
            .bind(record.net_salary)
            .bind(record.status.to_string())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn list_period(&self, period: Period) -> CoreResult<Vec<PayrollRecord>> {
        let sql = format!(
            "SELECT {PAYROLL_COLUMNS} FROM payroll_records WHERE period = ? ORDER BY employee_id"
        );
        let rows = sqlx::query_as::<_, PayrollRow>(&sql)
            .bind(period.to_string())
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    async fn get(&self, id: &str) -> CoreResult<Option<PayrollRecord>> {
        let sql = format!("SELECT {PAYROLL_COLUMNS} FROM payroll_records WHERE id = ?");
        let row = sqlx::query_as::<_, PayrollRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(PayrollRecord::try_from).transpose()
    }

    async fn mark_paid(&self, id: &str) -> CoreResult<PayrollRecord> {
        sqlx::query("UPDATE payroll_records SET status = ? WHERE id = ?")
            .bind(PaymentStatus::Paid.to_string())
            .bind(id)
            .execute(&self.pool)
            .await?;

        self.get(id)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("payroll record {id}")))
    }

    async fn correct(&self, id: &str, change: &PayrollCorrection) -> CoreResult<PayrollRecord> {
        let mut tx = self.pool.begin().await?;

        let sql = format!("SELECT {PAYROLL_COLUMNS} FROM payroll_records WHERE id = ? FOR UPDATE");
        let row = sqlx::query_as::<_, PayrollRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let mut record = row
            .map(PayrollRecord::try_from)
            .transpose()?
            .ok_or_else(|| CoreError::not_found(format!("payroll record {id}")))?;

        change.apply(&mut record);

        // status is left to mark_paid
        sqlx::query(
            r#"
            UPDATE payroll_records
            SET basic_salary = ?, allowances = ?, deductions = ?, net_salary = ?
            WHERE id = ?
            "#,
        )
        .bind(record.basic_salary)
        .bind(record.allowances)
        .bind(record.deductions)
        .bind(record.net_salary)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(record)
    }
}

pub struct MySqlManualPaymentStore {
    pool: MySqlPool,
}

impl MySqlManualPaymentStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn fetch(
        conn: &mut MySqlConnection,
        id: &str,
        lock: bool,
    ) -> CoreResult<Option<ManualPayment>> {
        let sql = format!(
            "SELECT id, employee_id, amount, date, payment_type, notes, status \
             FROM manual_payments WHERE id = ?{}",
            if lock { " FOR UPDATE" } else { "" }
        );
        let row = sqlx::query_as::<_, ManualPaymentRow>(&sql)
            .bind(id)
            .fetch_optional(conn)
            .await?;
        row.map(ManualPayment::try_from).transpose()
    }
}

#[async_trait]
impl ManualPaymentStore for MySqlManualPaymentStore {
    async fn insert(&self, payment: ManualPayment) -> CoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO manual_payments
            (id, employee_id, amount, date, payment_type, notes, status)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&payment.id)
        .bind(payment.employee_id)
        .bind(payment.amount)
        .bind(payment.date)
        .bind(payment.payment_type.to_string())
        .bind(&payment.notes)
        .bind(payment.status.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, mut payment: ManualPayment, keep_status: bool) -> CoreResult<ManualPayment> {
        let mut tx = self.pool.begin().await?;

        let existing = Self::fetch(&mut *tx, &payment.id, true)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("manual payment {}", payment.id)))?;
        if keep_status {
            payment.status = existing.status;
        }

        sqlx::query(
            r#"
            UPDATE manual_payments
            SET employee_id = ?, amount = ?, date = ?, payment_type = ?, notes = ?, status = ?
            WHERE id = ?
            "#,
        )
        .bind(payment.employee_id)
        .bind(payment.amount)
        .bind(payment.date)
        .bind(payment.payment_type.to_string())
        .bind(&payment.notes)
        .bind(payment.status.to_string())
        .bind(&payment.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(payment)
    }

    async fn delete(&self, id: &str) -> CoreResult<ManualPayment> {
        let mut tx = self.pool.begin().await?;

        let existing = Self::fetch(&mut *tx, id, true)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("manual payment {id}")))?;

        sqlx::query("DELETE FROM manual_payments WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(existing)
    }

    async fn get(&self, id: &str) -> CoreResult<Option<ManualPayment>> {
        let mut conn = self.pool.acquire().await?;
        Self::fetch(&mut conn, id, false).await
    }

    async fn list_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        employee_id: Option<u64>,
    ) -> CoreResult<Vec<ManualPayment>> {
        let rows = sqlx::query_as::<_, ManualPaymentRow>(
            r#"
            SELECT id, employee_id, amount, date, payment_type, notes, status
            FROM manual_payments
            WHERE date BETWEEN ? AND ?
              AND (? IS NULL OR employee_id = ?)
            ORDER BY date DESC, id
            "#,
        )
        .bind(start)
        .bind(end)
        .bind(employee_id)
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }
}

/// Reads the roster from the employee directory tables.
pub struct MySqlRoster {
    pool: MySqlPool,
}

impl MySqlRoster {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RosterSource for MySqlRoster {
    async fn list_employees(&self) -> CoreResult<Vec<Employee>> {
        sqlx::query_as::<_, Employee>(
            r#"
            SELECT e.id AS id, d.name AS department, e.hire_date AS join_date
            FROM employees e
            JOIN departments d ON d.id = e.department_id
            WHERE e.status = 'active'
            ORDER BY e.id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch employee roster");
            CoreError::Roster(e.to_string())
        })
    }
}
