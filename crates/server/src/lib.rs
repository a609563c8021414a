//! Booking Backend Server
//!
//! Mounts authentication, events, bookings and the dashboard under `/api`
//! on a single actix-web server. Every route except registration, login
//! and health is gated by [`booking_auth::Auth`].
//!
//! Storage is PostgreSQL when `DB_URL` is set and in-memory otherwise.
use booking_auth::AuthRepository;
use booking_auth::Crypto;
use booking_auth::Roster;
use booking_core::SECONDS_PER_DAY;
use booking_core::TOKEN_TTL_DAYS;
use booking_crm::Courier;
use booking_crm::Outbox;
use booking_crm::Silent;
use booking_events::Agenda;
use booking_events::Ledger;

use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpServer;
use actix_web::middleware::Logger;
use actix_web::web;
use std::sync::Arc;
use std::time::Duration;

/// Backend settings, from flags or environment.
#[derive(Debug, Clone, clap::Parser)]
#[command(name = "backend", about = "Booking backend")]
pub struct Config {
    /// Address to listen on.
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:5000")]
    pub bind: String,
    /// PostgreSQL connection URL. In-memory stores are used when absent.
    #[arg(long, env = "DB_URL")]
    pub db_url: Option<String>,
    /// HMAC secret for signing access tokens.
    #[arg(long, env = "JWT_SECRET")]
    pub jwt_secret: String,
    /// Access token lifetime.
    #[arg(long, env = "JWT_TTL_DAYS", default_value_t = TOKEN_TTL_DAYS)]
    pub ttl_days: u64,
    /// CRM base URL; booking notices are dropped when absent.
    #[arg(long, env = "CRM_BASE_URL")]
    pub crm_url: Option<String>,
    /// Static token the CRM expects.
    #[arg(long, env = "CRM_BEARER_TOKEN")]
    pub crm_token: Option<String>,
}

impl Config {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_days * SECONDS_PER_DAY)
    }
}

/// Application state shared by every worker.
#[derive(Clone)]
pub struct Services {
    crypto: web::Data<Crypto>,
    members: web::Data<dyn AuthRepository>,
    ledger: web::Data<dyn Ledger>,
    outbox: web::Data<dyn Outbox>,
}

impl Services {
    pub fn new(
        crypto: Crypto,
        members: Arc<dyn AuthRepository>,
        ledger: Arc<dyn Ledger>,
        outbox: Arc<dyn Outbox>,
    ) -> Self {
        Self {
            crypto: web::Data::new(crypto),
            members: web::Data::from(members),
            ledger: web::Data::from(ledger),
            outbox: web::Data::from(outbox),
        }
    }

    /// Opens the stores named by `config`, creates tables and seeds
    /// sample data on first start.
    pub async fn connect(config: &Config) -> anyhow::Result<Self> {
        let crypto = Crypto::new(config.jwt_secret.as_bytes(), config.ttl());
        let (members, ledger): (Arc<dyn AuthRepository>, Arc<dyn Ledger>) =
            match config.db_url.as_deref() {
                Some(url) => {
                    let client = booking_pg::db(url).await?;
                    booking_pg::create::<booking_auth::Member>(&client).await?;
                    booking_pg::create::<booking_events::Facilitator>(&client).await?;
                    booking_pg::create::<booking_events::Event>(&client).await?;
                    booking_pg::create::<booking_events::Booking>(&client).await?;
                    let members: Arc<dyn AuthRepository> = client.clone();
                    let ledger: Arc<dyn Ledger> = client;
                    (members, ledger)
                }
                None => {
                    log::warn!("DB_URL not set, using in-memory stores");
                    let members: Arc<dyn AuthRepository> = Arc::new(Roster::default());
                    let ledger: Arc<dyn Ledger> = Arc::new(Agenda::default());
                    (members, ledger)
                }
            };
        if let Err(e) = ledger.seed(time::OffsetDateTime::now_utc()).await {
            log::warn!("sample data not seeded: {:#}", e);
        }
        let outbox: Arc<dyn Outbox> = match (&config.crm_url, &config.crm_token) {
            (Some(url), Some(token)) => {
                let courier = Courier::new(url, token.clone())?;
                log::info!("forwarding bookings to {}", courier.endpoint());
                Arc::new(courier)
            }
            _ => {
                log::warn!("CRM_BASE_URL or CRM_BEARER_TOKEN not set, bookings stay local");
                Arc::new(Silent)
            }
        };
        Ok(Self::new(crypto, members, ledger, outbox))
    }

    pub fn mount(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.crypto.clone())
            .app_data(self.members.clone())
            .app_data(self.ledger.clone())
            .app_data(self.outbox.clone());
    }
}

#[rustfmt::skip]
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health",          web::get().to(booking_events::health))
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(booking_auth::register))
                    .route("/login",    web::post().to(booking_auth::login))
                    .route("/me",       web::get().to(booking_auth::me)),
            )
            .route("/events",          web::get().to(booking_events::events))
            .route("/bookings",        web::post().to(booking_events::book))
            .route("/bookings",        web::get().to(booking_events::bookings))
            .route("/bookings/{id}",   web::delete().to(booking_events::cancel))
            .route("/dashboard/stats", web::get().to(booking_events::stats)),
    );
}

pub async fn run(config: Config) -> anyhow::Result<()> {
    let services = Services::connect(&config).await?;
    log::info!("starting booking backend on {}", config.bind);
    HttpServer::new(move || {
        let services = services.clone();
        App::new()
            .wrap(Logger::new("%r %s %Ts"))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header(),
            )
            .configure(|cfg| services.mount(cfg))
            .configure(routes)
    })
    .bind(&config.bind)?
    .run()
    .await?;
    Ok(())
}
