//! Alert Mailer - email notification service for meme stock alerts
//!
//! Decides which alerts are eligible for delivery, renders them into
//! transactional emails and sends them over SMTP behind a small JSON API.

pub mod alert;
pub mod api;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod history;
pub mod settings;
pub mod template;
pub mod transport;

pub use config::{load_config, Config};
pub use error::{MailerError, Result};

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::api::AppState;
use crate::dispatcher::NotificationDispatcher;
use crate::transport::SmtpTransportFactory;

/// Run the alert mailer with the given configuration until Ctrl-C
pub async fn run(config: Config) -> Result<()> {
    let cancel = CancellationToken::new();

    let log = history::new_log_handle(config.server.history_size);
    let dispatcher = NotificationDispatcher::new(
        config.notifications.clone(),
        Arc::new(SmtpTransportFactory),
        log,
    )?;
    let router = api::build_router(AppState::new(dispatcher));

    // Setup shutdown handler
    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
            return;
        }
        tracing::info!("Shutdown signal received");
        cancel_for_signal.cancel();
    });

    let addr = format!("{}:{}", config.server.bind_address, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        MailerError::Api(format!("Failed to bind to {}: {}", addr, e))
    })?;
    tracing::info!("Email API listening on http://{}/api/email", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            cancel.cancelled().await;
        })
        .await?;

    tracing::info!("Alert mailer stopped");
    Ok(())
}
