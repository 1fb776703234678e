// src/api.rs
use crate::db;
use crate::error::{CustomError, Unauthorized};
use crate::models::ActionResult;
use crate::quotes::QuoteClient;
use crate::view::StockCardView;
use crate::{auth, watchlist};
use log::{error, info};
use scylla::Session;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
}

#[derive(Serialize)]
struct TokenResponse {
    token: String,
}

#[derive(Deserialize)]
struct AddWatchlistRequest {
    symbol: String,
    company: String,
}

pub fn routes(
    session: Arc<Session>,
    quotes: Arc<QuoteClient>,
    secret: Arc<String>,
) -> impl Filter<Extract = impl Reply, Error = std::convert::Infallible> + Clone {
    let login = warp::path("login")
        .and(warp::path::end())
        .and(warp::post())
        .and(with_session(session.clone()))
        .and(with_secret(secret.clone()))
        .and(warp::body::json())
        .and_then(login_handler);

    let list = warp::path("watchlist")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_auth(secret.clone()))
        .and(with_session(session.clone()))
        .and(with_quotes(quotes))
        .and_then(list_watchlist_handler);

    let add = warp::path("watchlist")
        .and(warp::path::end())
        .and(warp::post())
        .and(with_auth(secret.clone()))
        .and(with_session(session.clone()))
        .and(warp::body::json())
        .and_then(add_watchlist_handler);

    let remove = warp::path!("watchlist" / String)
        .and(warp::delete())
        .and(with_auth(secret))
        .and(with_session(session))
        .and_then(remove_watchlist_handler);

    login
        .or(list)
        .or(add)
        .or(remove)
        .recover(crate::error::handle_rejection)
}

fn with_session(
    session: Arc<Session>,
) -> impl Filter<Extract = (Arc<Session>,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || session.clone())
}

fn with_quotes(
    quotes: Arc<QuoteClient>,
) -> impl Filter<Extract = (Arc<QuoteClient>,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || quotes.clone())
}

fn with_secret(
    secret: Arc<String>,
) -> impl Filter<Extract = (Arc<String>,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || secret.clone())
}

// Resolves the authenticated email from the Bearer token.
fn with_auth(secret: Arc<String>) -> impl Filter<Extract = (String,), Error = Rejection> + Clone {
    warp::header::optional::<String>("authorization").and_then(move |header: Option<String>| {
        let secret = secret.clone();
        async move {
            header
                .as_deref()
                .and_then(|h| h.strip_prefix("Bearer "))
                .and_then(|token| auth::verify_token(token, &secret))
                .ok_or_else(|| warp::reject::custom(Unauthorized))
        }
    })
}

async fn login_handler(
    session: Arc<Session>,
    secret: Arc<String>,
    request: LoginRequest,
) -> Result<impl Reply, Rejection> {
    match db::resolve_identity(&session, &request.email).await {
        Ok(Some(_)) => {
            let token = auth::create_token(&request.email, &secret).map_err(|e| {
                error!("Failed to issue token: {}", e);
                warp::reject::custom(CustomError {
                    message: e.to_string(),
                })
            })?;
            info!("Issued token for {}", request.email);
            Ok(warp::reply::with_status(
                warp::reply::json(&TokenResponse { token }),
                StatusCode::OK,
            ))
        }
        Ok(None) => Ok(warp::reply::with_status(
            warp::reply::json(&ActionResult::failure("User not found")),
            StatusCode::UNAUTHORIZED,
        )),
        Err(e) => {
            error!("Login identity lookup failed: {}", e);
            Err(warp::reject::custom(CustomError {
                message: e.to_string(),
            }))
        }
    }
}

async fn list_watchlist_handler(
    email: String,
    session: Arc<Session>,
    quotes: Arc<QuoteClient>,
) -> Result<impl Reply, Rejection> {
    let cards = watchlist::get_watchlist_with_quotes(&session, &quotes, &email).await;
    info!("Returning {} watchlist cards for {}", cards.len(), email);
    let views: Vec<StockCardView> = cards.into_iter().map(StockCardView::from).collect();
    Ok(warp::reply::json(&views))
}

async fn add_watchlist_handler(
    email: String,
    session: Arc<Session>,
    request: AddWatchlistRequest,
) -> Result<impl Reply, Rejection> {
    let result =
        watchlist::add_to_watchlist(&session, &email, &request.symbol, &request.company).await;
    Ok(warp::reply::json(&result))
}

async fn remove_watchlist_handler(
    symbol: String,
    email: String,
    session: Arc<Session>,
) -> Result<impl Reply, Rejection> {
    let result = watchlist::remove_from_watchlist(&session, &email, &symbol).await;
    Ok(warp::reply::json(&result))
}
