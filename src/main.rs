// src/main.rs
mod api;
mod auth;
mod db;
mod error;
mod models;
mod quotes;
mod view;
mod watchlist;

use crate::quotes::QuoteClient;
use env_logger::Builder;
use log::{error, info, warn, LevelFilter};
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    Builder::new()
        .filter_level(LevelFilter::Info)
        .format_timestamp_secs()
        .init();

    // Initialize database connection
    let node = env::var("SCYLLA_NODE").unwrap_or_else(|_| "127.0.0.1:9042".to_string());
    let session = match db::session(&node).await {
        Ok(session) => session,
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return;
        }
    };
    info!("Connected to database...");

    let token = env::var("FINNHUB_API_KEY").ok().filter(|t| !t.is_empty());
    if token.is_none() {
        warn!("FINNHUB_API_KEY is not configured; watchlists will be served without quote data");
    }
    let base_url =
        env::var("FINNHUB_BASE_URL").unwrap_or_else(|_| quotes::DEFAULT_BASE_URL.to_string());
    let quote_client = Arc::new(QuoteClient::new(base_url, token));

    let secret = Arc::new(env::var("JWT_SECRET").unwrap_or_else(|_| {
        warn!("JWT_SECRET is not set; using an insecure development secret");
        "dev-secret".to_string()
    }));

    // Identity provisioning belongs to the auth collaborator; this seeds a
    // known user for local runs.
    if let Ok(seed_email) = env::var("SEED_USER_EMAIL") {
        let seed_name = env::var("SEED_USER_NAME").unwrap_or_else(|_| "Demo User".to_string());
        match db::ensure_user(&session, &seed_email, &seed_name).await {
            Ok(user_id) => info!("Seed user {} ready ({})", seed_email, user_id),
            Err(e) => error!("Failed to seed user {}: {}", seed_email, e),
        }
    }

    // Define routes
    let api = api::routes(session, quote_client, secret);

    let addr: SocketAddr = match env::var("BIND_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:3030".to_string())
        .parse()
    {
        Ok(addr) => addr,
        Err(e) => {
            error!("Invalid BIND_ADDR: {}", e);
            return;
        }
    };

    // Start the server
    info!("Server running on http://{}", addr);
    warp::serve(api).run(addr).await;
}
