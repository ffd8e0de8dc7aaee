// ABOUTME: Cookie helpers for the HttpOnly session cookie carrying the JWT
// ABOUTME: Reads cookies from request headers and builds Set-Cookie values
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::errors::AppError;
use http::header::{COOKIE, SET_COOKIE};
use http::{HeaderMap, HeaderValue};

/// Find a cookie by name across all `Cookie` headers
#[must_use]
pub fn get_cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"').to_owned())
        .filter(|value| !value.is_empty())
}

/// Build a `Set-Cookie` value for an HttpOnly, `SameSite=Lax` cookie
#[must_use]
pub fn build_cookie(name: &str, value: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie =
        format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Build a `Set-Cookie` value that expires the named cookie
#[must_use]
pub fn expired_cookie(name: &str, secure: bool) -> String {
    build_cookie(name, "", 0, secure)
}

/// Append a `Set-Cookie` header
///
/// # Errors
///
/// Returns an internal error if the cookie contains bytes not allowed in a header
pub fn append_set_cookie(headers: &mut HeaderMap, cookie: &str) -> Result<(), AppError> {
    let value = HeaderValue::from_str(cookie)
        .map_err(|e| AppError::internal(format!("Invalid Set-Cookie value: {e}")))?;
    headers.append(SET_COOKIE, value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_cookie_value() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; setlog_session=abc.def.ghi; lang=en"),
        );
        assert_eq!(
            get_cookie_value(&headers, "setlog_session").as_deref(),
            Some("abc.def.ghi")
        );
        assert_eq!(get_cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn test_empty_cookie_is_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("setlog_session="));
        assert_eq!(get_cookie_value(&headers, "setlog_session"), None);
    }

    #[test]
    fn test_build_cookie_attributes() {
        let cookie = build_cookie("setlog_session", "token", 3600, true);
        assert!(cookie.starts_with("setlog_session=token;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Max-Age=3600"));
        assert!(cookie.ends_with("; Secure"));

        assert!(expired_cookie("setlog_session", false).contains("Max-Age=0"));
    }
}
