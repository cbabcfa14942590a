// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Client identifier used for rate limiting and log context.

use crate::handlers::AppState;
use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use std::convert::Infallible;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tracing::debug;

/// Identifier used when no address can be determined.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Best-known address of the requesting client, or `"unknown"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientId(String);

impl ClientId {
    /// Resolve the client from proxy headers (when trusted) or the peer address.
    ///
    /// Proxy order: first `X-Forwarded-For` entry, then `X-Real-IP`.
    pub fn resolve(headers: &HeaderMap, peer: Option<IpAddr>, trust_proxy_headers: bool) -> Self {
        if trust_proxy_headers {
            let forwarded = headers
                .get("x-forwarded-for")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .and_then(|v| v.trim().parse::<IpAddr>().ok());

            let real_ip = || {
                headers
                    .get("x-real-ip")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.trim().parse::<IpAddr>().ok())
            };

            if let Some(ip) = forwarded.or_else(real_ip) {
                return Self(ip.to_string());
            }
        }

        match peer {
            Some(ip) => Self(ip.to_string()),
            None => {
                debug!("No client address available");
                Self(UNKNOWN_CLIENT.to_string())
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The address, unless the client could not be identified.
    pub fn known(&self) -> Option<&str> {
        (self.0 != UNKNOWN_CLIENT).then_some(self.0.as_str())
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for ClientId {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());

        Ok(Self::resolve(
            &parts.headers,
            peer,
            state.config.trust_proxy_headers,
        ))
    }
}
