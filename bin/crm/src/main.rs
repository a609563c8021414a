//! CRM Notification Binary
//!
//! Receives booking notices from the backend on CRM_BIND_ADDR
//! (default 0.0.0.0:5001). Requires CRM_BEARER_TOKEN.

use clap::Parser;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    booking_core::log();
    booking_crm::run(booking_crm::Config::parse()).await
}
