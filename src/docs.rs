use crate::api::attendance::{DailyQuery, MonthQuery};
use crate::api::manual_payment::PaymentQuery;
use crate::api::payroll::{GeneratePayroll, PeriodQuery};
use crate::model::attendance::{
    AttendanceInput, AttendanceRecord, AttendanceStatus, DailyRoster, DailyStats, MonthlySummary,
    RosterEntry, StatusCounts,
};
use crate::model::employee::Employee;
use crate::model::manual_payment::{ManualPayment, ManualPaymentInput, PaymentType};
use crate::model::payroll::{PaymentStatus, PayrollCorrection, PayrollRecord};
use crate::service::reporting::{EmployeeStatement, MonthlyTotals};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM Attendance & Payroll API",
        version = "1.0.0",
        description = r#"
## Attendance & Payroll

Daily attendance, monthly calendar summaries, payroll generation per
period (`YYYY-MM`) and manual payments outside the payroll cycle.

### 🔹 Key Features
- **Attendance**
  - Record a day for an employee, self check-in/check-out, daily roster, monthly summaries
- **Payroll**
  - Generate a period once for the whole roster, corrections, payment status
- **Manual payments**
  - Bonuses, reimbursements and advances
- **Reports**
  - Monthly totals and per-employee statements

### 🔐 Security
Every endpoint requires a **JWT Bearer** access token.
Payroll, payments and totals are **Admin** only; attendance management is **HR/Admin**.
"#,
    ),
    paths(
        crate::api::attendance::upsert_attendance,
        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::daily_roster,
        crate::api::attendance::monthly_summary,
        crate::api::attendance::monthly_summaries,

        crate::api::payroll::generate_payroll,
        crate::api::payroll::list_payroll,
        crate::api::payroll::get_payroll,
        crate::api::payroll::correct_payroll,
        crate::api::payroll::mark_paid,

        crate::api::manual_payment::create_payment,
        crate::api::manual_payment::list_payments,
        crate::api::manual_payment::get_payment,
        crate::api::manual_payment::update_payment,
        crate::api::manual_payment::delete_payment,

        crate::api::reports::monthly_totals,
        crate::api::reports::employee_statement
    ),
    components(
        schemas(
            AttendanceStatus,
            AttendanceRecord,
            AttendanceInput,
            StatusCounts,
            MonthlySummary,
            RosterEntry,
            DailyStats,
            DailyRoster,
            DailyQuery,
            MonthQuery,
            Employee,
            PaymentStatus,
            PayrollRecord,
            PayrollCorrection,
            GeneratePayroll,
            PeriodQuery,
            PaymentType,
            ManualPayment,
            ManualPaymentInput,
            PaymentQuery,
            MonthlyTotals,
            EmployeeStatement
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Attendance", description = "Attendance management APIs"),
        (name = "Payroll", description = "Payroll management APIs"),
        (name = "Payments", description = "Manual payment APIs"),
        (name = "Reports", description = "Payroll reporting APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
