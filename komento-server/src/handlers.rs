use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};
use chrono::Utc;
use komento_api::{build_tree, Page, SortOrder, Store, SubmitOutcome, Submission};

use crate::{extractors::ClientIp, rate_limit::RateLimiter, Error};

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_LIMIT: usize = 15;

#[derive(serde::Deserialize)]
pub struct PageParams {
    page: Option<String>,
    limit: Option<String>,
}

impl PageParams {
    fn resolve(&self) -> (usize, usize) {
        (
            parse_param(self.page.as_deref(), DEFAULT_PAGE),
            parse_param(self.limit.as_deref(), DEFAULT_LIMIT),
        )
    }
}

// absent, non-numeric and non-positive all mean "use the default"
fn parse_param(raw: Option<&str>, default: usize) -> usize {
    raw.and_then(|s| s.parse::<usize>().ok())
        .filter(|&n| n >= 1)
        .unwrap_or(default)
}

pub async fn fetch_comments(
    State(store): State<Arc<dyn Store>>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page>, Error> {
    let (page, limit) = params.resolve();
    let comments = store
        .fetch_comments(SortOrder::NewestFirst)
        .await
        .context("fetching comments for board page")?;
    let roots = build_tree(comments);
    Ok(Json(Page::assemble(roots, page, limit)))
}

pub async fn submit_comment(
    ClientIp(ip): ClientIp,
    State(store): State<Arc<dyn Store>>,
    State(limiter): State<Arc<dyn RateLimiter>>,
    data: Result<Json<Submission>, JsonRejection>,
) -> Result<Json<SubmitOutcome>, Error> {
    let Json(data) = data.map_err(|rej| match rej {
        // the body-limit layer tripped before the body was even parsed
        JsonRejection::BytesRejection(_) => Error::payload_too_large(),
        _ => Error::malformed_input(),
    })?;

    if data.is_honeypot() {
        // deliberate fake success: the bot leaves happy, nothing is stored
        return Ok(Json(SubmitOutcome::honeypot()));
    }
    data.validate()?;

    let now = Utc::now();
    if !limiter.check(ip, now) {
        return Err(Error::too_many_requests());
    }
    limiter.record(ip, now);

    store
        .insert_comment(data.into_record(ip, now))
        .await
        .context("inserting comment")?;
    Ok(Json(SubmitOutcome::saved()))
}

#[derive(serde::Deserialize, serde::Serialize)]
pub struct VisitCount {
    pub count: i64,
}

pub async fn record_visit(
    State(store): State<Arc<dyn Store>>,
) -> Result<Json<VisitCount>, Error> {
    let count = store
        .increment_counter("visits")
        .await
        .context("bumping visit counter")?;
    Ok(Json(VisitCount { count }))
}
