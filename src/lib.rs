use std::sync::Arc;

use crate::mail::{LogMailer, Mailer, SmtpMailer};
use crate::model::{DbConnection, ModelManager};
use crate::payment::{PaymentGateway, RazorpayGateway};
use crate::utils::{signal::shutdown_signal, uploads::MediaStore};
use crate::{error::AppResult, web::AppState};
use axum::Router;
use tokio::net::TcpListener;

pub mod config;
pub use config::{Config, ConfigError, ConfigResult};

pub mod auth;
pub mod error;
pub mod mail;
pub mod model;
pub mod payment;
pub mod utils;
pub mod web;

static APPLICATION_NAME: &str = "coursebay";

/// Outbound collaborators of the HTTP layer.
#[derive(Debug, Clone)]
pub struct Services {
    pub gateway: Arc<dyn PaymentGateway>,
    pub mailer: Arc<dyn Mailer>,
    pub media: MediaStore,
}

impl Services {
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let gateway = RazorpayGateway::from_config(config.payment())?;

        let mailer: Arc<dyn Mailer> = match config.mail() {
            Some(mail) => Arc::new(SmtpMailer::from_config(mail)?),
            None => {
                tracing::warn!("no [mail] section configured, outgoing mail is only logged");
                Arc::new(LogMailer)
            }
        };

        Ok(Self {
            gateway: Arc::new(gateway),
            mailer,
            media: MediaStore::from_config(config.app())?,
        })
    }
}

pub async fn build_server() -> AppResult<(AppState, Router)> {
    let use_local = cfg!(debug_assertions);
    let config = config::Config::get_or_init(use_local).await;
    let db = DbConnection::connect(config.app().database_uri())?;

    tracing::debug!("applying migrations...");
    db.migrate().await?;

    build_server_with_pool(db).await
}

pub async fn build_server_with_pool(db: DbConnection) -> AppResult<(AppState, Router)> {
    let config = config::Config::get_or_init(true).await;
    let services = Services::from_config(config)?;
    build_server_with_services(db, services).await
}

pub async fn build_server_with_services(
    db: DbConnection,
    services: Services,
) -> AppResult<(AppState, Router)> {
    let config = config::Config::get_or_init(true).await;

    let mm = ModelManager::new(db);
    let state = AppState::new(mm, services.gateway, services.mailer, services.media);
    let app = web::routes::build_app(state.clone(), config);
    Ok((state, app))
}

#[tracing::instrument]
pub async fn setup_workers() -> AppResult<()> {
    let (_, app) = build_server().await?;
    let config = Config::get_or_init(false).await;
    let listener = TcpListener::bind(config.host().bindto()).await?;

    tracing::info!("axum is starting at: {}", config.host().bindto());
    let axum_handle = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

    axum_handle.await?;
    Ok(())
}

fn setup_trace() {
    use tracing_error::ErrorLayer;
    use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

    // load .env file for RUST_LOG etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .with(ErrorLayer::default())
        .init();

    tracing::debug!("tracing initialized.");
}

#[tracing::instrument]
pub async fn run() -> AppResult<()> {
    setup_trace();
    setup_workers().await?;
    Ok(())
}
