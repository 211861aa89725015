use axum::{
    extract::Request,
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

/// Cookie carrying the session token
pub const SESSION_COOKIE: &str = "mm_session";

/// Longest token accepted from a client before a fresh one is issued
const MAX_TOKEN_LEN: usize = 128;

/// Opaque per-session identity, scoped to feedback and exclusions
///
/// Issued by this middleware on first contact; the core never interprets
/// the token beyond using it as a lookup key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionId(String);

impl SessionId {
    /// Creates a new random session ID
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wraps a token supplied by the caller
    pub fn from_token(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Middleware that extracts the session token from the request cookie, or
/// issues a new one and adds a `Set-Cookie` header to the response.
///
/// Handlers access the session via the `SessionId` request extension.
pub async fn session_middleware(mut request: Request, next: Next) -> Response {
    let (session, issued) = match session_from_headers(request.headers()) {
        Some(token) => (SessionId(token), false),
        None => (SessionId::new(), true),
    };

    request.extensions_mut().insert(session.clone());

    let mut response = next.run(request).await;

    if issued {
        let cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            SESSION_COOKIE,
            session.as_str()
        );
        if let Ok(header_value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().insert(header::SET_COOKIE, header_value);
        }
    }

    response
}

/// Extracts the session token from the `Cookie` header, if present
fn session_from_headers(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    raw.split(';').map(str::trim).find_map(|pair| {
        let (name, value) = pair.split_once('=')?;
        if name == SESSION_COOKIE && !value.is_empty() && value.len() <= MAX_TOKEN_LEN {
            Some(value.to_string())
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_session_extracted_from_cookie() {
        let headers = headers_with_cookie("mm_session=abc-123; theme=dark");
        assert_eq!(session_from_headers(&headers), Some("abc-123".to_string()));
    }

    #[test]
    fn test_session_extracted_among_other_cookies() {
        let headers = headers_with_cookie("theme=dark; mm_session=tok");
        assert_eq!(session_from_headers(&headers), Some("tok".to_string()));
    }

    #[test]
    fn test_missing_cookie_yields_none() {
        assert_eq!(session_from_headers(&HeaderMap::new()), None);

        let headers = headers_with_cookie("theme=dark");
        assert_eq!(session_from_headers(&headers), None);
    }

    #[test]
    fn test_session_display_is_the_raw_token() {
        let session = SessionId::from_token("abc-123");
        assert_eq!(session.to_string(), "abc-123");
    }

    #[test]
    fn test_empty_or_oversized_token_rejected() {
        let headers = headers_with_cookie("mm_session=");
        assert_eq!(session_from_headers(&headers), None);

        let long = format!("mm_session={}", "x".repeat(MAX_TOKEN_LEN + 1));
        let headers = headers_with_cookie(&long);
        assert_eq!(session_from_headers(&headers), None);
    }
}
