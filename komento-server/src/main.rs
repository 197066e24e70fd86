use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use axum::{
    error_handling::HandleErrorLayer,
    extract::DefaultBodyLimit,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use structopt::StructOpt;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

mod db;
mod error;
mod extractors;
mod handlers;
mod rate_limit;

pub use error::Error;

use extractors::AppState;
use komento_api::Store;
use rate_limit::{RateLimiter, SlidingWindow};

/// Submissions past this many bytes are cut off before reaching a handler;
/// no partial record is ever stored.
pub const MAX_BODY_BYTES: usize = 1_000_000;

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

#[derive(StructOpt)]
struct Opt {
    /// Address to listen on
    #[structopt(long, default_value = "0.0.0.0:3000")]
    bind: SocketAddr,

    /// Accepted submissions per IP within the rate-limit window
    #[structopt(long, default_value = "5")]
    rate_limit: usize,

    /// Rate-limit window, in seconds
    #[structopt(long, default_value = "60")]
    rate_window: i64,

    /// Distinct IPs the rate limiter tracks before sweeping stale entries
    #[structopt(long, default_value = "65536")]
    rate_max_tracked: usize,

    /// Per-request timeout, in seconds
    #[structopt(long, default_value = "30")]
    request_timeout: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let opt = Opt::from_args();

    let db_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .connect(&db_url)
        .await
        .with_context(|| format!("Error opening database {:?}", db_url))?;
    MIGRATOR.run(&pool).await.context("running migrations")?;

    let store: Arc<dyn Store> = Arc::new(db::PgStore::new(pool));
    let limiter: Arc<dyn RateLimiter> = Arc::new(SlidingWindow::new(
        opt.rate_window,
        opt.rate_limit,
        opt.rate_max_tracked,
    ));
    let app = app(store, limiter).layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(|_: tower::BoxError| async {
                StatusCode::REQUEST_TIMEOUT
            }))
            .timeout(Duration::from_secs(opt.request_timeout)),
    );

    tracing::info!("listening on {}", opt.bind);
    axum::Server::bind(&opt.bind)
        .serve(app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .context("serving axum webserver")
}

pub fn app(store: Arc<dyn Store>, limiter: Arc<dyn RateLimiter>) -> Router {
    Router::new()
        .route(
            "/api/comments",
            get(handlers::fetch_comments).post(handlers::submit_comment),
        )
        .route("/api/visit", post(handlers::record_visit))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { store, limiter })
}
