pub mod app;
pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod docs;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod migrate;
pub mod response;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initializes the tracing stack. `RUST_LOG` wins; otherwise a sensible
/// default keeps our own crate chatty and the HTTP plumbing quiet.
pub fn setup_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new("info,authd=debug,hyper_util=warn,tower_http=info")
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
