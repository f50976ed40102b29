use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::model::payroll::{PayrollCorrection, PayrollRecord};
use crate::model::period::Period;
use crate::service::HrmCore;

#[derive(Deserialize, ToSchema)]
pub struct GeneratePayroll {
    #[schema(example = "2024-07")]
    pub period: String,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct PeriodQuery {
    /// Payroll cycle, YYYY-MM
    #[schema(example = "2024-07")]
    pub period: String,
}

#[utoipa::path(
    post,
    path = "/api/payroll/generate",
    request_body = GeneratePayroll,
    responses(
        (status = 201, description = "Payroll generated", body = [PayrollRecord]),
        (status = 400, description = "Invalid period or empty roster"),
        (status = 409, description = "Already generated", body = Object, example = json!({
            "message": "payroll for 2024-07 already generated"
        })),
        (status = 401),
        (status = 403),
        (status = 504, description = "Generation timed out")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn generate_payroll(
    auth: AuthUser,
    core: web::Data<HrmCore>,
    payload: web::Json<GeneratePayroll>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let period: Period = payload.period.parse()?;
    tracing::info!(user_id = auth.user_id, user = %auth.username, %period, "Payroll generation requested");

    let records = core.generate_payroll(period).await?;
    Ok(HttpResponse::Created().json(records))
}

#[utoipa::path(
    get,
    path = "/api/payroll",
    params(PeriodQuery),
    responses(
        (status = 200, description = "Payroll records of the period", body = [PayrollRecord]),
        (status = 400, description = "Invalid period"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn list_payroll(
    auth: AuthUser,
    core: web::Data<HrmCore>,
    query: web::Query<PeriodQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let period: Period = query.period.parse()?;
    Ok(HttpResponse::Ok().json(core.list_payroll(period).await?))
}

#[utoipa::path(
    get,
    path = "/api/payroll/{payroll_id}",
    params(
        ("payroll_id", Path, description = "Payroll ID")
    ),
    responses(
        (status = 200, description = "Payroll record", body = PayrollRecord),
        (status = 403),
        (status = 404, description = "Payroll not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn get_payroll(
    auth: AuthUser,
    core: web::Data<HrmCore>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let record = core.payroll_record(&path).await?;
    auth.require_self_or_admin(record.employee_id)?;

    Ok(HttpResponse::Ok().json(record))
}

#[utoipa::path(
    put,
    path = "/api/payroll/{payroll_id}",
    request_body = PayrollCorrection,
    params(
        ("payroll_id", Path, description = "Payroll ID")
    ),
    responses(
        (status = 200, description = "Payroll corrected", body = PayrollRecord),
        (status = 400, description = "Negative amount"),
        (status = 404, description = "Payroll not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn correct_payroll(
    auth: AuthUser,
    core: web::Data<HrmCore>,
    path: web::Path<String>,
    body: web::Json<PayrollCorrection>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let record = core.correct_payroll(&path, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(record))
}

#[utoipa::path(
    put,
    path = "/api/payroll/{payroll_id}/paid",
    params(
        ("payroll_id", Path, description = "Payroll ID")
    ),
    responses(
        (status = 200, description = "Payroll marked paid", body = PayrollRecord),
        (status = 404, description = "Payroll not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn mark_paid(
    auth: AuthUser,
    core: web::Data<HrmCore>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    Ok(HttpResponse::Ok().json(core.mark_payroll_paid(&path).await?))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test::{self, TestRequest};
    use actix_web::web::Data;
    use serde_json::{Value, json};

    use crate::api::test_support::{admin, app, employee, hr};
    use crate::service::tests::test_core;

    #[actix_web::test]
    async fn generate_once_then_conflict() {
        let app = test::init_service(app(Data::new(test_core(&[1, 2, 3])))).await;

        let generate = || {
            admin(TestRequest::post().uri("/api/payroll/generate"))
                .set_json(json!({ "period": "2024-07" }))
                .to_request()
        };

        let resp = test::call_service(&app, generate()).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body.as_array().unwrap().len(), 3);

        let resp = test::call_service(&app, generate()).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "payroll for 2024-07 already generated");

        let req = admin(TestRequest::get().uri("/api/payroll?period=2024-07")).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.as_array().unwrap().len(), 3);
        assert_eq!(body[0]["employee_id"], 1);
    }

    #[actix_web::test]
    async fn malformed_periods_are_bad_requests() {
        let app = test::init_service(app(Data::new(test_core(&[1])))).await;

        let req = admin(TestRequest::post().uri("/api/payroll/generate"))
            .set_json(json!({ "period": "2024-13" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = admin(TestRequest::get().uri("/api/payroll?period=July")).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn only_admins_generate() {
        let app = test::init_service(app(Data::new(test_core(&[1])))).await;

        let req = hr(TestRequest::post().uri("/api/payroll/generate"))
            .set_json(json!({ "period": "2024-07" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn employees_read_only_their_own_slip() {
        let app = test::init_service(app(Data::new(test_core(&[1, 2])))).await;
        let req = admin(TestRequest::post().uri("/api/payroll/generate"))
            .set_json(json!({ "period": "2024-07" }))
            .to_request();
        test::call_service(&app, req).await;

        let req = employee(TestRequest::get().uri("/api/payroll/payroll-1-2024-07"), 1).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["basic_salary"], 51000.0);

        let req = employee(TestRequest::get().uri("/api/payroll/payroll-2-2024-07"), 1).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = admin(TestRequest::get().uri("/api/payroll/payroll-9-2024-07")).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn corrections_and_payment_status() {
        let app = test::init_service(app(Data::new(test_core(&[1])))).await;
        let req = admin(TestRequest::post().uri("/api/payroll/generate"))
            .set_json(json!({ "period": "2024-07" }))
            .to_request();
        test::call_service(&app, req).await;

        let req = admin(TestRequest::put().uri("/api/payroll/payroll-1-2024-07"))
            .set_json(json!({ "allowances": 0.0, "deductions": 0.0 }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["net_salary"], 51000.0);

        let req = admin(TestRequest::put().uri("/api/payroll/payroll-1-2024-07/paid")).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "Paid");
    }
}
