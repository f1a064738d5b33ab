//! Session cookie parsing and emission.

use std::time::Duration;

use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use cookie::Cookie;
use cookie::time::{self, OffsetDateTime};

use crate::error::{Error, Result};

/// Raw (still escaped) value of cookie `name` from request headers.
///
/// Unparseable cookie pairs are skipped, matching how browsers and most
/// servers treat them.
pub fn find_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(|cookie| cookie.ok())
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_string())
}

/// Recover a session id from an escaped cookie value.
///
/// Only `%XX` escapes are decoded; a literal `+` stays a `+` rather than
/// becoming a space. Ids issued by this crate never contain either.
pub fn decode_value(raw: &str) -> Result<String> {
    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| Error::MalformedCookie(e.to_string()))
}

/// Cookie binding the browser to session `id`.
pub fn session_cookie(name: &str, id: &str, max_lifetime: Duration) -> Cookie<'static> {
    let max_age = i64::try_from(max_lifetime.as_secs()).unwrap_or(i64::MAX);
    Cookie::build((name.to_string(), urlencoding::encode(id).into_owned()))
        .path("/")
        .http_only(true)
        .max_age(time::Duration::seconds(max_age))
        .build()
}

/// Already-expired, empty cookie that makes the browser discard `name`.
pub fn removal_cookie(name: &str) -> Cookie<'static> {
    Cookie::build((name.to_string(), String::new()))
        .path("/")
        .http_only(true)
        .max_age(time::Duration::ZERO)
        .expires(OffsetDateTime::UNIX_EPOCH)
        .build()
}

/// Append `cookie` to the response as a `Set-Cookie` header.
pub fn set_cookie(headers: &mut HeaderMap, cookie: &Cookie<'_>) -> Result<()> {
    let value = HeaderValue::from_str(&cookie.to_string())
        .map_err(|e| Error::MalformedCookie(e.to_string()))?;
    headers.append(SET_COOKIE, value);
    Ok(())
}

/// Check that `name` is usable as a cookie name (an HTTP token).
pub fn is_valid_cookie_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_graphic() && !"()<>@,;:\\\"/[]?={}".contains(c))
}
