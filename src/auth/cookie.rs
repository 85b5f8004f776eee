use axum::http::{header, HeaderMap, HeaderValue};
use chrono::Duration;
use cookie::{time::Duration as CookieDuration, Cookie, SameSite};

pub const REFRESH_COOKIE: &str = "refreshToken";

fn base(token: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, token.to_string()))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .build()
}

/// `Set-Cookie` value carrying the refresh token. The access token never goes in a cookie.
pub fn refresh_cookie(token: &str, max_age: Duration, secure: bool) -> String {
    let mut set = base(token, secure);
    set.set_max_age(CookieDuration::seconds(max_age.num_seconds()));
    set.to_string()
}

/// `Set-Cookie` value that makes the browser drop the refresh cookie.
pub fn clear_refresh_cookie(secure: bool) -> String {
    let mut set = base("", secure);
    set.make_removal();
    set.to_string()
}

pub fn header_value(cookie: &str) -> Option<HeaderValue> {
    HeaderValue::from_str(cookie).ok()
}

/// Reads the refresh token from the request `Cookie` header(s). Malformed
/// pairs are skipped; a quoted value is unquoted.
pub fn refresh_token_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == REFRESH_COOKIE)
        .map(|cookie| cookie.value_trimmed().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_cookie_has_required_attributes() {
        let cookie = refresh_cookie("abc", Duration::days(7), true);
        assert!(cookie.starts_with("refreshToken=abc;"));
        assert!(cookie.contains("Max-Age=604800"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("SameSite=Strict"));
    }

    #[test]
    fn insecure_cookie_omits_secure_flag() {
        let cookie = refresh_cookie("abc", Duration::days(7), false);
        assert!(!cookie.contains("Secure"));
        assert!(header_value(&cookie).is_some());
    }

    #[test]
    fn clearing_cookie_expires_immediately() {
        let cookie = clear_refresh_cookie(true);
        assert!(cookie.starts_with("refreshToken=;"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn finds_refresh_token_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; refreshToken=tok.en.value; lang=ko"));
        assert_eq!(refresh_token_from_headers(&headers).as_deref(), Some("tok.en.value"));
    }

    #[test]
    fn quoted_value_is_unquoted() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("refreshToken=\"tok.en\"; theme=dark"));
        assert_eq!(refresh_token_from_headers(&headers).as_deref(), Some("tok.en"));
    }

    #[test]
    fn clearing_cookie_also_expires_in_the_past() {
        let cookie = clear_refresh_cookie(false);
        assert!(cookie.contains("Expires="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Path=/"));
    }

    #[test]
    fn missing_or_empty_cookie_is_none() {
        let mut headers = HeaderMap::new();
        assert_eq!(refresh_token_from_headers(&headers), None);
        headers.insert(header::COOKIE, HeaderValue::from_static("refreshToken="));
        assert_eq!(refresh_token_from_headers(&headers), None);
    }
}
