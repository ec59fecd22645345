//! Bearer-credential classification into the two access tiers.
//!
//! Two opaque tokens are configured per deployment: a write token (read +
//! write) and a read-only token. Comparison is exact string equality,
//! stateless per request. No lockout, no rotation, no expiry.

use crate::error::AppError;
use axum::http::{header, HeaderMap};

/// The configured deployment credentials.
#[derive(Clone, Debug)]
pub struct AuthTokens {
    pub write_token: String,
    pub read_token: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Principal {
    Anonymous,
    Reader,
    Writer,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Read,
    Write,
}

impl Principal {
    pub fn can_read(&self) -> bool {
        !matches!(self, Principal::Anonymous)
    }

    pub fn can_write(&self) -> bool {
        matches!(self, Principal::Writer)
    }
}

/// Classify the `Authorization` header. A missing header, a non-Bearer
/// scheme, and an unknown token all map to [`Principal::Anonymous`].
pub fn authorize(headers: &HeaderMap, tokens: &AuthTokens) -> Principal {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    match token {
        Some(t) if t == tokens.write_token => Principal::Writer,
        Some(t) if t == tokens.read_token => Principal::Reader,
        _ => Principal::Anonymous,
    }
}

/// Gate one resolved operation. Anonymous principals get 401; an
/// authenticated principal lacking the required tier gets 403 with the
/// operation named in the message.
pub fn require(principal: Principal, action: Action, operation: &str) -> Result<(), AppError> {
    if principal == Principal::Anonymous {
        return Err(AppError::Unauthenticated(
            "a valid bearer credential is required".into(),
        ));
    }
    let allowed = match action {
        Action::Read => principal.can_read(),
        Action::Write => principal.can_write(),
    };
    if allowed {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "write access required for {}",
            operation
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn tokens() -> AuthTokens {
        AuthTokens {
            write_token: "w-secret".into(),
            read_token: "r-secret".into(),
        }
    }

    fn headers_with(value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        h
    }

    #[test]
    fn missing_header_is_anonymous() {
        assert_eq!(authorize(&HeaderMap::new(), &tokens()), Principal::Anonymous);
    }

    #[test]
    fn non_bearer_scheme_is_anonymous() {
        let h = headers_with("Basic dXNlcjpwYXNz");
        assert_eq!(authorize(&h, &tokens()), Principal::Anonymous);
    }

    #[test]
    fn write_token_is_writer() {
        let h = headers_with("Bearer w-secret");
        let p = authorize(&h, &tokens());
        assert_eq!(p, Principal::Writer);
        assert!(p.can_read());
        assert!(p.can_write());
    }

    #[test]
    fn read_token_is_reader() {
        let h = headers_with("Bearer r-secret");
        let p = authorize(&h, &tokens());
        assert_eq!(p, Principal::Reader);
        assert!(p.can_read());
        assert!(!p.can_write());
    }

    #[test]
    fn unknown_token_is_anonymous() {
        let h = headers_with("Bearer nope");
        assert_eq!(authorize(&h, &tokens()), Principal::Anonymous);
    }

    #[test]
    fn require_names_the_operation_in_403() {
        let err = require(Principal::Reader, Action::Write, "dropTable").unwrap_err();
        match err {
            AppError::Forbidden(msg) => assert!(msg.contains("dropTable")),
            other => panic!("expected Forbidden, got {:?}", other),
        }
    }

    #[test]
    fn require_allows_reader_to_read() {
        assert!(require(Principal::Reader, Action::Read, "list").is_ok());
    }

    #[test]
    fn require_rejects_anonymous_with_401() {
        let err = require(Principal::Anonymous, Action::Read, "list").unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated(_)));
    }
}
