//! Cookie accessor: read named cookies from a request, build `Set-Cookie`
//! values for a response.
//!
//! Outside an HTTP request there is no cookie jar, so reads against an empty
//! header map simply return `None`.

use axum::http::{HeaderMap, HeaderValue, header};
use tower_sessions::cookie::time::{Duration, OffsetDateTime};
use tower_sessions::cookie::{Cookie, SameSite};

/// Attributes applied when writing a cookie.
///
/// `expires` wins over `max_age` when both are set.
#[derive(Debug, Clone, Copy, Default)]
pub struct CookieOptions {
    pub secure: bool,
    pub same_site: Option<SameSite>,
    pub max_age: Option<Duration>,
    pub expires: Option<OffsetDateTime>,
}

impl CookieOptions {
    /// Options that expire the cookie immediately.
    #[must_use]
    pub fn expired(secure: bool, same_site: Option<SameSite>) -> Self {
        Self {
            secure,
            same_site,
            max_age: None,
            expires: Some(OffsetDateTime::UNIX_EPOCH),
        }
    }
}

/// Read a cookie value by name from the request headers.
///
/// Empty values are treated as absent.
#[must_use]
pub fn get(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

/// Build a cookie with `path=/` and the given options.
#[must_use]
pub fn build(name: &str, value: &str, options: CookieOptions) -> Cookie<'static> {
    let mut builder = Cookie::build((name.to_string(), value.to_string()))
        .path("/")
        .secure(options.secure);

    if let Some(same_site) = options.same_site {
        builder = builder.same_site(same_site);
    }

    if let Some(expires) = options.expires {
        builder = builder.expires(expires);
    } else if let Some(max_age) = options.max_age {
        builder = builder
            .max_age(max_age)
            .expires(OffsetDateTime::now_utc() + max_age);
    }

    builder.build()
}

/// Append a `Set-Cookie` header for the given cookie.
pub fn set(headers: &mut HeaderMap, cookie: &Cookie<'_>) {
    match HeaderValue::from_str(&cookie.to_string()) {
        Ok(value) => {
            headers.append(header::SET_COOKIE, value);
        }
        Err(e) => {
            tracing::warn!(cookie = cookie.name(), error = %e, "Cookie value is not a valid header");
        }
    }
}
