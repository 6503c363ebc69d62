use axum::http::{header::InvalidHeaderValue, HeaderValue};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Max-Age of the visitor session cookie: two weeks.
const COOKIE_MAX_AGE: u32 = 14 * 24 * 3600;

pub fn cookie(name: &str, value: &str, secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    let secure = if secure { "; Secure" } else { "" };
    HeaderValue::from_str(&format!(
        "{name}={value}; HttpOnly; Max-Age={COOKIE_MAX_AGE}{secure}; Path=/; SameSite=Strict"
    ))
}
