use crate::{
    api::{attendance, manual_payment, payroll, reports},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;

fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond((60_000 / requests_per_min as u64).max(1))
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap_or_default();
    Governor::new(&cfg)
}

/// Every route needs a bearer token; the `AuthUser` extractor enforces it per handler.
pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    let protected_limiter = build_limiter(config.rate_protected_per_min);

    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/attendance")
                    // /attendance
                    .service(
                        web::resource("").route(web::put().to(attendance::upsert_attendance)),
                    )
                    .service(
                        web::resource("/check-in").route(web::post().to(attendance::check_in)),
                    )
                    .service(
                        web::resource("/check-out").route(web::post().to(attendance::check_out)),
                    )
                    .service(
                        web::resource("/daily").route(web::get().to(attendance::daily_roster)),
                    )
                    // /attendance/summary
                    .service(
                        web::resource("/summary")
                            .route(web::get().to(attendance::monthly_summaries)),
                    )
                    .service(
                        web::resource("/summary/{employee_id}")
                            .route(web::get().to(attendance::monthly_summary)),
                    ),
            )
            .service(
                web::scope("/payroll")
                    // /payroll
                    .service(web::resource("").route(web::get().to(payroll::list_payroll)))
                    .service(
                        web::resource("/generate")
                            .route(web::post().to(payroll::generate_payroll)),
                    )
                    // /payroll/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(payroll::get_payroll))
                            .route(web::put().to(payroll::correct_payroll)),
                    )
                    .service(web::resource("/{id}/paid").route(web::put().to(payroll::mark_paid))),
            )
            .service(
                web::scope("/payments")
                    // /payments
                    .service(
                        web::resource("")
                            .route(web::post().to(manual_payment::create_payment))
                            .route(web::get().to(manual_payment::list_payments)),
                    )
                    // /payments/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(manual_payment::get_payment))
                            .route(web::put().to(manual_payment::update_payment))
                            .route(web::delete().to(manual_payment::delete_payment)),
                    ),
            )
            .service(
                web::scope("/reports")
                    .service(web::resource("/totals").route(web::get().to(reports::monthly_totals)))
                    .service(
                        web::resource("/statement/{employee_id}")
                            .route(web::get().to(reports::employee_statement)),
                    ),
            ),
    );
}
