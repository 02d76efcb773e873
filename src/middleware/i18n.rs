// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use crate::services::labels::Lang;

// Preferred language from Accept-Language; English when absent or unsupported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Locale(pub Lang);

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let lang = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok())
            .and_then(|header_str| {
                // parse() orders tags by quality
                accept_language::parse(header_str)
                    .iter()
                    .find_map(|tag| Lang::from_tag(tag))
            })
            .unwrap_or_default();

        Ok(Locale(lang))
    }
}
