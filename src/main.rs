use std::sync::Arc;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use anyhow::Context;
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa_swagger_ui::SwaggerUi;

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod models;
mod notify;
mod payroll;
mod routes;
mod state;
mod store;
mod utils;

use crate::config::Config;
use crate::db::init_db;
use crate::docs::openapi_for_prefix;
use crate::notify::Mailer;
use crate::notify::mailer::{LogMailer, SmtpMailer};
use crate::state::AppState;

#[get("/")]
async fn index() -> impl Responder {
    "Employee Payroll Service"
}

fn build_mailer(config: &Config) -> anyhow::Result<Arc<dyn Mailer>> {
    match &config.smtp {
        Some(smtp) => {
            let credentials = smtp.username.clone().zip(smtp.password.clone());
            let mailer = SmtpMailer::new(&smtp.host, smtp.port, credentials, &config.mail_from)
                .context("Failed to configure SMTP mailer")?;
            info!(host = %smtp.host, port = smtp.port, "SMTP mailer configured");
            Ok(Arc::new(mailer))
        }
        None => {
            warn!("SMTP_HOST not set, salary emails will only be logged");
            Ok(Arc::new(LogMailer))
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

    let pool = init_db(&config.database_url).await?;
    let mailer = build_mailer(&config)?;
    let state = Data::new(AppState::mysql(pool, mailer, &config.institution_name));

    let server_addr = config.server_addr.clone();
    let config_data = Data::new(config.clone());
    let openapi = openapi_for_prefix(&config.api_prefix);

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", openapi.clone()),
            )
            .app_data(state.clone())
            .app_data(config_data.clone())
            .service(index)
            // Configure auth + protected routes with rate limiting
            .configure(|cfg| routes::configure(cfg, config.clone()))
    })
    .bind(&server_addr)
    .with_context(|| format!("Failed to bind {server_addr}"))?
    .run()
    .await?;

    Ok(())
}
