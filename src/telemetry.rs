//! Logging setup
//!
//! Natively installs a `tracing-subscriber` fmt layer filtered by `RUST_LOG`;
//! in the browser, forwards spans and events to the console via `tracing-wasm`.

#[cfg(not(target_arch = "wasm32"))]
pub fn init() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let result = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "oj_resolver=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();

    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

#[cfg(target_arch = "wasm32")]
pub fn init() {
    tracing_wasm::set_as_global_default();
}
