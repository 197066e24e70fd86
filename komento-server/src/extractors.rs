use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use anyhow::Context;
use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::request,
};
use komento_api::Store;

use crate::{rate_limit::RateLimiter, Error};

#[derive(Clone, axum::extract::FromRef)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub limiter: Arc<dyn RateLimiter>,
}

/// The submitter's network address, as seen on the accepted connection.
pub struct ClientIp(pub IpAddr);

#[async_trait]
impl<S: Sync> FromRequestParts<S> for ClientIp {
    type Rejection = Error;

    async fn from_request_parts(req: &mut request::Parts, _state: &S) -> Result<ClientIp, Error> {
        let addr = req
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr)
            .context("server running without connect info")?;
        Ok(ClientIp(addr.ip()))
    }
}
