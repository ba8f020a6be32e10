//! Caller address and user agent for login history.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{headers::UserAgent, TypedHeader};

use domain::identity::ClientInfo;

use crate::middleware::client_ip;

/// Client details recorded with login attempts and refresh tokens.
#[derive(Debug, Clone, Default)]
pub struct ClientContext(pub ClientInfo);

#[async_trait]
impl<S> FromRequestParts<S> for ClientContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        let user_agent = Option::<TypedHeader<UserAgent>>::from_request_parts(parts, state)
            .await?
            .map(|TypedHeader(agent)| agent.as_str().to_string());

        Ok(ClientContext(ClientInfo {
            ip_address: client_ip(&parts.headers, peer),
            user_agent,
        }))
    }
}
