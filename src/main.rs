mod catalog;
mod frame;
mod layout;
mod offers;
mod preview;
mod routes;
mod services;
mod settings;
mod state;
mod upstream;
mod voucher;

use std::sync::Arc;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()
        .expect("invalid PORT");

    // Initialize the commerce client (non-fatal: voucher/offer routes answer
    // 503 if config is missing; the layout editor works regardless).
    let upstream: Option<Arc<dyn upstream::CommerceApi>> = match upstream::UpstreamClient::from_env() {
        Ok(client) => {
            tracing::info!(base_url = client.base_url(), "commerce client initialized");
            Some(Arc::new(client))
        }
        Err(e) => {
            tracing::warn!(error = %e, "commerce client not configured — voucher/offer routes disabled");
            None
        }
    };

    let state = state::AppState::new(upstream);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "storedesk listening");
    axum::serve(listener, app).await.expect("server failed");
}
