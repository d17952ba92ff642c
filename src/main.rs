//! Server binary: logging + HTTP surface.

use taskalign_scheduler::{logging, server};
use tracing::info;

#[tokio::main]
async fn main() {
    logging::init();

    let addr = std::env::var("TASKALIGN_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {addr}: {e}"));
    info!(%addr, "scheduler listening");

    axum::serve(listener, server::router())
        .await
        .expect("server error");
}
