//! The checkout session cookie.
//!
//! Set when checkout starts, read and cleared on the payment callback.

use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use footprint_core::custom_order::{QUOTE_SESSION_COOKIE, QUOTE_SESSION_MAX_AGE_SECS};

/// `Set-Cookie` value storing an encoded session.
pub fn session_cookie(value: &str, secure: bool) -> String {
    build(value, QUOTE_SESSION_MAX_AGE_SECS, secure)
}

/// `Set-Cookie` value that removes the session.
pub fn clear_session_cookie(secure: bool) -> String {
    build("", 0, secure)
}

fn build(value: &str, max_age: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{QUOTE_SESSION_COOKIE}={value}; HttpOnly; SameSite=Lax; Path=/; Max-Age={max_age}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Value of the session cookie from the request's `Cookie` headers.
pub fn read_session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == QUOTE_SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn session_cookie_attributes() {
        assert_eq!(
            session_cookie("abc", false),
            "custom-quote-session=abc; HttpOnly; SameSite=Lax; Path=/; Max-Age=1800"
        );
        assert!(session_cookie("abc", true).ends_with("; Secure"));
        assert!(clear_session_cookie(false).contains("custom-quote-session=; "));
        assert!(clear_session_cookie(false).contains("Max-Age=0"));
    }

    #[test]
    fn reads_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(
            COOKIE,
            HeaderValue::from_static("cart=1; custom-quote-session=eyJx; other=2"),
        );
        assert_eq!(read_session_cookie(&headers).as_deref(), Some("eyJx"));
    }

    #[test]
    fn missing_or_empty_cookie() {
        let mut headers = HeaderMap::new();
        assert_eq!(read_session_cookie(&headers), None);
        headers.insert(COOKIE, HeaderValue::from_static("custom-quote-session="));
        assert_eq!(read_session_cookie(&headers), None);
    }
}
