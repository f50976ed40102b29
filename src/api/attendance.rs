use actix_web::{HttpResponse, Responder, web};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::model::attendance::{AttendanceInput, AttendanceRecord, DailyRoster, MonthlySummary};
use crate::service::HrmCore;

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct DailyQuery {
    /// Defaults to today
    #[schema(example = "2024-07-10", value_type = Option<String>, format = "date")]
    #[param(value_type = Option<String>, format = "date")]
    pub date: Option<NaiveDate>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct MonthQuery {
    #[schema(example = 2024)]
    pub year: i32,

    #[schema(example = 7)]
    pub month: u32,
}

/// Create or replace the attendance record of one employee and day
#[utoipa::path(
    put,
    path = "/api/attendance",
    request_body = AttendanceInput,
    responses(
        (status = 200, description = "Record stored", body = AttendanceRecord),
        (status = 400, description = "Missing or invalid fields", body = Object, example = json!({
            "message": "status is required"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn upsert_attendance(
    auth: AuthUser,
    core: web::Data<HrmCore>,
    payload: web::Json<AttendanceInput>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let record = core.upsert_attendance(payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(record))
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/check-in",
    responses(
        (status = 200, description = "Checked in successfully", body = Object, example = json!({
            "message": "Checked in successfully"
        })),
        (status = 400, description = "Already checked in today", body = Object, example = json!({
            "message": "Already checked in today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    core: web::Data<HrmCore>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.own_employee_id()?;
    let now = Local::now().naive_local();

    let record = core.check_in(employee_id, now.date(), now.time()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Checked in successfully",
        "attendance": record
    })))
}

/// Check-out endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/check-out",
    responses(
        (status = 200, description = "Checked out successfully", body = Object, example = json!({
            "message": "Checked out successfully"
        })),
        (status = 400, description = "No active check-in found for today", body = Object, example = json!({
            "message": "No active check-in found for today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    core: web::Data<HrmCore>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.own_employee_id()?;
    let now = Local::now().naive_local();

    let record = core.check_out(employee_id, now.date(), now.time()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Checked out successfully",
        "attendance": record
    })))
}

/// Everyone on the roster for one day, with computed durations
#[utoipa::path(
    get,
    path = "/api/attendance/daily",
    params(DailyQuery),
    responses(
        (status = 200, description = "Daily roster", body = DailyRoster),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn daily_roster(
    auth: AuthUser,
    core: web::Data<HrmCore>,
    query: web::Query<DailyQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let date = query.date.unwrap_or_else(|| Local::now().date_naive());
    let roster = core.daily_roster(date).await?;
    Ok(HttpResponse::Ok().json(roster))
}

/// Calendar summary of one employee for a month
#[utoipa::path(
    get,
    path = "/api/attendance/summary/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID"),
        MonthQuery
    ),
    responses(
        (status = 200, description = "Monthly summary", body = MonthlySummary),
        (status = 400, description = "Invalid month"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn monthly_summary(
    auth: AuthUser,
    core: web::Data<HrmCore>,
    path: web::Path<u64>,
    query: web::Query<MonthQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    auth.require_self_or_hr(employee_id)?;

    let summary = core
        .monthly_summary(employee_id, query.year, query.month)
        .await?;
    Ok(HttpResponse::Ok().json(summary))
}

/// Calendar summaries of the whole roster for a month
#[utoipa::path(
    get,
    path = "/api/attendance/summary",
    params(MonthQuery),
    responses(
        (status = 200, description = "Monthly summaries", body = [MonthlySummary]),
        (status = 400, description = "Invalid month"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn monthly_summaries(
    auth: AuthUser,
    core: web::Data<HrmCore>,
    query: web::Query<MonthQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let summaries = core.monthly_summaries(query.year, query.month).await?;
    Ok(HttpResponse::Ok().json(summaries))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test::{self, TestRequest};
    use actix_web::web::Data;
    use serde_json::Value;

    use crate::api::test_support::{admin, app, employee, hr};
    use crate::service::tests::test_core;

    #[actix_web::test]
    async fn hr_records_and_reads_the_daily_roster() {
        let core = Data::new(test_core(&[1, 2]));
        let app = test::init_service(app(core)).await;

        let req = hr(TestRequest::put().uri("/api/attendance").set_json(serde_json::json!({
            "employee_id": 1,
            "date": "2024-07-10",
            "check_in": "09:15",
            "check_out": "17:45",
            "status": "Present"
        })))
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = hr(TestRequest::get().uri("/api/attendance/daily?date=2024-07-10")).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["entries"][0]["duration"], "08:30");
        assert_eq!(body["entries"][1]["status"], "Absent");
        assert_eq!(body["stats"]["present"], 1);
        assert_eq!(body["stats"]["absent"], 1);
    }

    #[actix_web::test]
    async fn incomplete_records_are_rejected() {
        let core = Data::new(test_core(&[1]));
        let app = test::init_service(app(core)).await;

        let req = admin(TestRequest::put().uri("/api/attendance").set_json(serde_json::json!({
            "employee_id": 1,
            "date": "2024-07-10"
        })))
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn employees_cannot_write_or_read_others() {
        let core = Data::new(test_core(&[1, 2]));
        let app = test::init_service(app(core)).await;

        let req = employee(TestRequest::put().uri("/api/attendance"), 1)
            .set_json(serde_json::json!({
                "employee_id": 1,
                "date": "2024-07-10",
                "status": "Present"
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = employee(
            TestRequest::get().uri("/api/attendance/summary/2?year=2024&month=7"),
            1,
        )
        .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = employee(
            TestRequest::get().uri("/api/attendance/summary/1?year=2024&month=7"),
            1,
        )
        .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["days"].as_array().unwrap().len(), 31);
    }

    #[actix_web::test]
    async fn check_in_then_out() {
        let core = Data::new(test_core(&[3]));
        let app = test::init_service(app(core)).await;

        let req = employee(TestRequest::post().uri("/api/attendance/check-out"), 3).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = employee(TestRequest::post().uri("/api/attendance/check-in"), 3).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["attendance"]["status"], "Present");

        let req = employee(TestRequest::post().uri("/api/attendance/check-in"), 3).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Already checked in today");

        let req = employee(TestRequest::post().uri("/api/attendance/check-out"), 3).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn missing_or_bad_tokens_are_unauthorized() {
        let core = Data::new(test_core(&[1]));
        let app = test::init_service(app(core)).await;

        let req = TestRequest::get()
            .uri("/api/attendance/daily")
            .peer_addr("127.0.0.1:40000".parse().unwrap())
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let req = TestRequest::get()
            .uri("/api/attendance/daily")
            .peer_addr("127.0.0.1:40000".parse().unwrap())
            .insert_header(("Authorization", "Bearer not-a-jwt"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }
}
