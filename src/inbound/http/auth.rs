//! Bearer-key authentication for operator endpoints.
//!
//! The catalog CRUD endpoints require `Authorization: Bearer <key>` with an
//! exact match against the configured key. Handlers opt in by taking
//! [`OperatorAuth`] as an extractor parameter.

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};

use crate::domain::Error;

const BEARER_PREFIX: &str = "Bearer ";

/// Configured operator key, registered as app data.
#[derive(Clone)]
pub struct ApiKeyConfig {
    key: String,
}

impl ApiKeyConfig {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

/// Marker extractor proving the request carried a valid operator key.
pub struct OperatorAuth;

impl FromRequest for OperatorAuth {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let configured = req
            .app_data::<web::Data<ApiKeyConfig>>()
            .map(|config| config.key.as_str());
        let header = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        ready(match configured {
            Some(key) => validate_bearer(header, key).map(|()| OperatorAuth),
            None => Err(Error::internal("operator key is not configured")),
        })
    }
}

/// Check the `Authorization` header against the configured key.
fn validate_bearer(header: Option<&str>, expected: &str) -> Result<(), Error> {
    let header = header.ok_or_else(|| Error::unauthorized("authorization header is required"))?;

    let token = header.strip_prefix(BEARER_PREFIX).filter(|t| !t.is_empty());
    let token = token.ok_or_else(|| {
        Error::unauthorized("authorization header must be in 'Bearer {token}' format")
    })?;

    if token != expected {
        return Err(Error::unauthorized("invalid API key"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;

    #[test]
    fn matching_key_is_accepted() {
        assert!(validate_bearer(Some("Bearer sekret"), "sekret").is_ok());
    }

    #[rstest]
    #[case::missing(None)]
    #[case::wrong_scheme(Some("Basic sekret"))]
    #[case::no_token(Some("Bearer "))]
    #[case::bare_word(Some("Bearer"))]
    #[case::wrong_key(Some("Bearer other"))]
    fn invalid_headers_are_unauthorized(#[case] header: Option<&str>) {
        let error = validate_bearer(header, "sekret").expect_err("must be rejected");
        assert_eq!(error.code(), ErrorCode::Unauthorized);
    }

    #[test]
    fn key_comparison_is_exact() {
        let error = validate_bearer(Some("Bearer sekret2"), "sekret").expect_err("must reject");
        assert_eq!(error.message(), "invalid API key");
    }
}
