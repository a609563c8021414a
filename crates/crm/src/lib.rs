//! CRM notification service and the backend's side of its contract.
//!
//! The backend tells the CRM about every new booking so facilitators can
//! be informed. Delivery is a single authenticated POST per booking,
//! retried a few times and otherwise dropped.
//!
//! ## Contract
//!
//! - [`Notice`] — Booking notification payload
//! - [`Outbox`] — Fire-and-forget sink used by the booking handlers
//! - [`Courier`] — HTTP delivery to the CRM
//!
//! ## Receiver
//!
//! - [`Inbox`] — In-memory notification log
//! - [`Caller`] — Static bearer token gate
//! - [`run`] — The CRM HTTP service
mod gate;
mod inbox;
mod notice;
mod outbox;
pub mod handlers;

pub use gate::*;
pub use inbox::*;
pub use notice::*;
pub use outbox::*;

use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpServer;
use actix_web::middleware::Logger;
use actix_web::web;

/// CRM service settings, from flags or environment.
#[derive(Debug, Clone, clap::Parser)]
#[command(name = "crm", about = "Booking notification receiver")]
pub struct Config {
    /// Address to listen on.
    #[arg(long, env = "CRM_BIND_ADDR", default_value = "0.0.0.0:5001")]
    pub bind: String,
    /// Static token senders must present as `Authorization: Bearer <token>`.
    #[arg(long, env = "CRM_BEARER_TOKEN")]
    pub token: String,
}

#[rustfmt::skip]
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/notify",        web::post().to(handlers::notify))
            .route("/notifications", web::get().to(handlers::notifications))
            .route("/health",        web::get().to(handlers::health)),
    );
}

pub async fn run(config: Config) -> std::io::Result<()> {
    let inbox = web::Data::new(Inbox::default());
    let secret = web::Data::new(Secret(config.token));
    log::info!("starting crm service on {}", config.bind);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%r %s %Ts"))
            .wrap(Cors::permissive())
            .app_data(inbox.clone())
            .app_data(secret.clone())
            .configure(routes)
    })
    .bind(config.bind)?
    .run()
    .await
}
