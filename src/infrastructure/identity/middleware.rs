use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;

use crate::error::AppError;

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Owner key of the caller: its network address, as text.
///
/// This is the only access-control boundary and it is spoofable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity(pub String);

impl ClientIdentity {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Resolve the caller address and expose it as a [`ClientIdentity`] extension.
///
/// With `trust_proxy` the first `X-Forwarded-For` hop wins over the socket
/// peer address.
pub async fn client_identity_middleware(
    State(trust_proxy): State<bool>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let forwarded = if trust_proxy {
        forwarded_client(request.headers())
    } else {
        None
    };

    let owner_key = match forwarded {
        Some(address) => address,
        None => request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .ok_or_else(|| AppError::Internal("Client address unavailable".to_string()))?,
    };

    request.extensions_mut().insert(ClientIdentity(owner_key));

    Ok(next.run(request).await)
}

fn forwarded_client(headers: &HeaderMap) -> Option<String> {
    headers
        .get(X_FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
