//! Session cookies.
//!
//! Both tokens travel as http-only cookies. Their max-age is fixed at 24
//! hours independently of the token windows; an expired token in a live
//! cookie just fails verification.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::config::{ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE, SESSION_COOKIE_MAX_AGE_HOURS};
use crate::domain::TokenPair;

fn session_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::hours(SESSION_COOKIE_MAX_AGE_HOURS))
        .build()
}

/// Add both session cookies to the jar.
pub fn set_session(jar: CookieJar, tokens: TokenPair) -> CookieJar {
    jar.add(session_cookie(ACCESS_TOKEN_COOKIE, tokens.access_token))
        .add(session_cookie(REFRESH_TOKEN_COOKIE, tokens.refresh_token))
}

/// Expire both session cookies.
pub fn clear_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(ACCESS_TOKEN_COOKIE).path("/"))
        .remove(Cookie::build(REFRESH_TOKEN_COOKIE).path("/"))
}

pub fn access_token(jar: &CookieJar) -> Option<&str> {
    jar.get(ACCESS_TOKEN_COOKIE).map(Cookie::value)
}

pub fn refresh_token(jar: &CookieJar) -> Option<&str> {
    jar.get(REFRESH_TOKEN_COOKIE).map(Cookie::value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    fn pair() -> TokenPair {
        TokenPair {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
        }
    }

    #[test]
    fn test_set_session_writes_http_only_cookies() {
        let jar = set_session(CookieJar::new(), pair());
        assert_eq!(access_token(&jar), Some("access"));
        assert_eq!(refresh_token(&jar), Some("refresh"));

        let response = jar.into_response();
        let headers: Vec<_> = response
            .headers()
            .get_all(axum::http::header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();

        assert_eq!(headers.len(), 2);
        for header in headers {
            assert!(header.contains("HttpOnly"));
            assert!(header.contains("Max-Age=86400"));
            assert!(header.contains("Path=/"));
        }
    }

    #[test]
    fn test_clear_session_expires_cookies() {
        let jar = clear_session(set_session(CookieJar::new(), pair()));
        assert_eq!(access_token(&jar), None);
        assert_eq!(refresh_token(&jar), None);
    }
}
