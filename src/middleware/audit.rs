// src/middleware/audit.rs

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{header, request::Parts},
};

use crate::models::audit::AuditEntry;

const FORWARDED_FOR: &str = "x-forwarded-for";

/// Client address and user agent recorded with audit entries.
#[derive(Debug, Clone, Default)]
pub struct RequestMeta {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestMeta {
    pub fn stamp(&self, mut entry: AuditEntry) -> AuditEntry {
        entry.ip_address = self.ip_address.clone();
        entry.user_agent = self.user_agent.clone();
        entry
    }
}

impl<S> FromRequestParts<S> for RequestMeta
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // first hop of X-Forwarded-For, else the socket peer
        let forwarded = parts
            .headers
            .get(FORWARDED_FOR)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());

        let user_agent = parts
            .headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Ok(RequestMeta {
            ip_address: forwarded.or(peer),
            user_agent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::audit::AuditAction;
    use axum::http::Request;

    #[tokio::test]
    async fn prefers_forwarded_address() {
        let request = Request::builder()
            .header(FORWARDED_FOR, "203.0.113.7, 10.0.0.1")
            .header(header::USER_AGENT, "curl/8")
            .body(())
            .unwrap();
        let (mut parts, _) = request.into_parts();
        parts
            .extensions
            .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 9000))));

        let meta = RequestMeta::from_request_parts(&mut parts, &()).await.unwrap();
        let entry = meta.stamp(AuditEntry::new("tender", "t-1", AuditAction::Create));
        assert_eq!(entry.ip_address.as_deref(), Some("203.0.113.7"));
        assert_eq!(entry.user_agent.as_deref(), Some("curl/8"));
    }
}
