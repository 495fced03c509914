use axum::http::{header, HeaderMap};
use cookie::{Cookie, SameSite};

use crate::config::SessionConfig;

/// Session cookie carrying `token`, alive for the session TTL.
pub fn session_cookie(config: &SessionConfig, token: &str) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), token.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.cookie_secure)
        .max_age(cookie::time::Duration::minutes(config.ttl_minutes))
        .build()
}

/// Cookie that tells the client to drop the session cookie.
pub fn removal_cookie(config: &SessionConfig) -> Cookie<'static> {
    let mut cookie = Cookie::build((config.cookie_name.clone(), ""))
        .path("/")
        .http_only(true)
        .build();
    cookie.make_removal();
    cookie
}

/// Reads the session token out of the request's `Cookie` headers.
pub fn read_token(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| Cookie::split_parse(raw))
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name && !cookie.value().is_empty())
        .map(|cookie| cookie.value().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn config() -> SessionConfig {
        SessionConfig {
            cookie_name: "forkedflavors.sid".into(),
            cookie_secure: false,
            ttl_minutes: 360,
        }
    }

    #[test]
    fn session_cookie_is_http_only_with_six_hour_max_age() {
        let rendered = session_cookie(&config(), "abc123").to_string();
        assert!(rendered.starts_with("forkedflavors.sid=abc123"));
        assert!(rendered.contains("HttpOnly"));
        assert!(rendered.contains("Max-Age=21600"));
        assert!(!rendered.contains("Secure"));
    }

    #[test]
    fn removal_cookie_expires_immediately() {
        let rendered = removal_cookie(&config()).to_string();
        assert!(rendered.starts_with("forkedflavors.sid=;"));
        assert!(rendered.contains("Max-Age=0"));
    }

    #[test]
    fn read_token_finds_named_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(
            header::COOKIE,
            HeaderValue::from_static("a=1; forkedflavors.sid=tok; b=2"),
        );
        assert_eq!(read_token(&headers, "forkedflavors.sid").as_deref(), Some("tok"));
        assert_eq!(read_token(&headers, "missing"), None);
    }

    #[test]
    fn read_token_ignores_empty_value() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("forkedflavors.sid="));
        assert_eq!(read_token(&headers, "forkedflavors.sid"), None);
    }
}
