//! Booking Backend Binary
//!
//! Serves authentication, events, bookings and the dashboard on BIND_ADDR
//! (e.g. 0.0.0.0:5000). Requires JWT_SECRET; see `--help` for the rest.

use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    booking_core::log();
    booking_server::run(booking_server::Config::parse()).await
}
