//! Location cookie carried on every location-scoped upstream request.

use bogo_core::LocationToken;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

pub(crate) const LOCATION_COOKIE_NAME: &str = "uev2.loc";

/// Characters left unescaped in the cookie value: alphanumerics plus
/// `_ . - ~ /`. Everything else, including JSON punctuation, is escaped.
const COOKIE_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~')
    .remove(b'/');

/// Builds the `uev2.loc=<percent-encoded JSON>` cookie pair for a location.
#[must_use]
pub fn location_cookie(location: &LocationToken) -> String {
    let json = location.location.to_string();
    format!(
        "{LOCATION_COOKIE_NAME}={}",
        utf8_percent_encode(&json, COOKIE_VALUE)
    )
}
