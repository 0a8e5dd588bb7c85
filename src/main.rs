#![deny(unused_crate_dependencies)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

mod aggregate;
mod api;
mod config;
mod error;
mod fetch;
mod menu;
mod parse;
mod store;
#[cfg(test)]
mod test_support;

use axum::http::Method;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::{compression::CompressionLayer, cors::Any};

use crate::{
    api::AppState,
    config::Config,
    fetch::make_client,
    store::{SharedStore, Store},
};

pub use error::Result;

#[cfg(all(target_env = "musl", target_pointer_width = "64"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> core::result::Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let config = Config::from_env()?;
    let store = Store::open(&config).await?;
    log::info!("{store:?}");
    let addr = config.addr;
    let state = AppState::new(make_client(), config, SharedStore::new(store));

    let compression_layer: CompressionLayer = CompressionLayer::new()
        .br(true)
        .deflate(true)
        .gzip(true)
        .zstd(true);
    let cors_layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(Any);

    let app = api::router(state)
        .layer(cors_layer)
        .layer(compression_layer);

    let listener = TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| panic!("failed to listen on {addr}: {e}"));
    log::info!("listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
