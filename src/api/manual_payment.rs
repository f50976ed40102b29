use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::model::manual_payment::{ManualPayment, ManualPaymentInput};
use crate::model::period::Period;
use crate::service::HrmCore;

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct PaymentQuery {
    /// Month of the payment date, YYYY-MM
    #[schema(example = "2024-07")]
    pub period: String,

    #[schema(example = 2)]
    pub employee_id: Option<u64>,
}

#[utoipa::path(
    post,
    path = "/api/payments",
    request_body = ManualPaymentInput,
    responses(
        (status = 201, description = "Manual payment recorded", body = ManualPayment),
        (status = 400, description = "Invalid amount or missing fields"),
        (status = 404, description = "Employee not found"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn create_payment(
    auth: AuthUser,
    core: web::Data<HrmCore>,
    payload: web::Json<ManualPaymentInput>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let payment = core.create_manual_payment(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(payment))
}

#[utoipa::path(
    get,
    path = "/api/payments",
    params(PaymentQuery),
    responses(
        (status = 200, description = "Payments dated in the period, newest first", body = [ManualPayment]),
        (status = 400, description = "Invalid period")
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn list_payments(
    auth: AuthUser,
    core: web::Data<HrmCore>,
    query: web::Query<PaymentQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let period: Period = query.period.parse()?;
    let payments = core.list_manual_payments(period, query.employee_id).await?;
    Ok(HttpResponse::Ok().json(payments))
}

#[utoipa::path(
    get,
    path = "/api/payments/{payment_id}",
    params(
        ("payment_id", Path, description = "Manual payment ID")
    ),
    responses(
        (status = 200, description = "Manual payment", body = ManualPayment),
        (status = 404, description = "Payment not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn get_payment(
    auth: AuthUser,
    core: web::Data<HrmCore>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    Ok(HttpResponse::Ok().json(core.manual_payment(&path).await?))
}

#[utoipa::path(
    put,
    path = "/api/payments/{payment_id}",
    request_body = ManualPaymentInput,
    params(
        ("payment_id", Path, description = "Manual payment ID")
    ),
    responses(
        (status = 200, description = "Manual payment replaced; an omitted status keeps the stored one", body = ManualPayment),
        (status = 400, description = "Invalid amount or missing fields"),
        (status = 404, description = "Payment not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn update_payment(
    auth: AuthUser,
    core: web::Data<HrmCore>,
    path: web::Path<String>,
    payload: web::Json<ManualPaymentInput>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let payment = core
        .update_manual_payment(&path, payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(payment))
}

#[utoipa::path(
    delete,
    path = "/api/payments/{payment_id}",
    params(
        ("payment_id", Path, description = "Manual payment ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted", body = Object, example = json!({
            "message": "Successfully deleted"
        })),
        (status = 404, description = "Payment not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn delete_payment(
    auth: AuthUser,
    core: web::Data<HrmCore>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    core.delete_manual_payment(&path).await?;
    tracing::info!(user_id = auth.user_id, user = %auth.username, payment_id = path.as_str(), "Manual payment removed by admin");
    Ok(HttpResponse::Ok().json(json!({
        "message": "Successfully deleted"
    })))
}
