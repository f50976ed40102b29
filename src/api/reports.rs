use actix_web::{HttpResponse, Responder, web};

use crate::api::payroll::PeriodQuery;
use crate::auth::auth::AuthUser;
use crate::model::period::Period;
use crate::service::HrmCore;
use crate::service::reporting::{EmployeeStatement, MonthlyTotals};

/// Net payroll and manual payment totals for one period
#[utoipa::path(
    get,
    path = "/api/reports/totals",
    params(PeriodQuery),
    responses(
        (status = 200, description = "Monthly totals", body = MonthlyTotals),
        (status = 400, description = "Invalid period"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn monthly_totals(
    auth: AuthUser,
    core: web::Data<HrmCore>,
    query: web::Query<PeriodQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let period: Period = query.period.parse()?;
    Ok(HttpResponse::Ok().json(core.monthly_totals(period).await?))
}

/// Salary statement: payroll record plus manual payments of one employee
#[utoipa::path(
    get,
    path = "/api/reports/statement/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID"),
        PeriodQuery
    ),
    responses(
        (status = 200, description = "Employee statement", body = EmployeeStatement),
        (status = 403),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn employee_statement(
    auth: AuthUser,
    core: web::Data<HrmCore>,
    path: web::Path<u64>,
    query: web::Query<PeriodQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    auth.require_self_or_admin(employee_id)?;

    let period: Period = query.period.parse()?;
    let statement = core.employee_statement(employee_id, period).await?;
    Ok(HttpResponse::Ok().json(statement))
}
