//! Menu Cart - browse a food menu and keep a cart between runs.
//!
//! # Usage
//!
//! ```bash
//! # Show the whole menu
//! menu-cart menu
//!
//! # Add an item and look at the cart
//! menu-cart add soups soup1
//! menu-cart cart
//!
//! # Change quantities, remove items, check out
//! menu-cart set soup1 3
//! menu-cart remove soup1
//! menu-cart checkout
//!
//! # Interactive session
//! menu-cart shell
//! ```
//!
//! Configuration comes from environment variables (see
//! [`menu_cart_storefront::config`]). Logs go
//! to stderr so they never mix with the menu and cart output.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::Parser;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use menu_cart_storefront::commands::{self, Cli};
use menu_cart_storefront::config::StorefrontConfig;

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Initialize tracing with `EnvFilter`, a stderr formatter and Sentry forwarding.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "menu_cart_storefront=info,menu_cart_core=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration from environment (needed for Sentry init)
    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            tracing::error!(error = %e, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    tracing::debug!(
        api_url = %config.catalog.base_url,
        cart_dir = %config.cart_dir.display(),
        "Configuration loaded"
    );

    match commands::run(cli, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            e.report();
            ExitCode::FAILURE
        }
    }
}

