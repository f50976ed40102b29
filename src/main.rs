use std::sync::Arc;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer};

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod models;
mod routes;
mod service;
mod store;
mod utils;

use config::Config;
use db::init_db;

use crate::docs::ApiDoc;
use crate::service::payroll::LinearCompensation;
use crate::service::{HrmCore, PayrollSettings, Stores};
use crate::store::memory::StaticRoster;
use crate::store::mysql::{
    MySqlAttendanceStore, MySqlManualPaymentStore, MySqlPayrollStore, MySqlRoster,
};
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

async fn build_stores(config: &Config) -> anyhow::Result<Stores> {
    match &config.database_url {
        Some(url) => {
            let pool = init_db(url).await?;
            info!("Using MySQL stores");
            Ok(Stores {
                attendance: Arc::new(MySqlAttendanceStore::new(pool.clone())),
                payroll: Arc::new(MySqlPayrollStore::new(pool.clone())),
                payments: Arc::new(MySqlManualPaymentStore::new(pool.clone())),
                roster: Arc::new(MySqlRoster::new(pool)),
            })
        }
        None => {
            let roster = match &config.roster_path {
                Some(path) => StaticRoster::from_json_file(path)?,
                None => {
                    warn!("No DATABASE_URL or ROSTER_PATH set, starting with an empty roster");
                    StaticRoster::new(Vec::new())
                }
            };
            info!("Using in-memory stores");
            Ok(Stores::in_memory(roster))
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let stores = build_stores(&config).await?;
    let core = Data::new(HrmCore::new(
        stores,
        PayrollSettings {
            compensation: Arc::new(LinearCompensation {
                base: config.compensation_base,
                step: config.compensation_step,
            }),
            initial_status: config.payroll_initial_status,
            timeout: config.payroll_timeout,
        },
    ));

    let server_addr = config.server_addr.clone();
    info!(%server_addr, "Listening");

    HttpServer::new(move || {
        let config_data = config.clone();
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            // one core shared by every worker
            .app_data(core.clone())
            .app_data(Data::new(config.clone()))
            .configure(|cfg| routes::configure(cfg, config_data))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}
