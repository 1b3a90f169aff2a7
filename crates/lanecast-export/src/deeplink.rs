//! Player deep links.
//!
//! A deep link is a fixed base URL with one query parameter carrying a
//! compact JSON payload, percent-encoded with every reserved character
//! escaped. Identical input always gives byte-identical output.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::{json, Value};

pub const DEEPLINK_BASE: &str = "https://www.peacocktv.com/deeplink?deeplinkData=";

/// Used by capture-based players when a lane has nothing to play.
pub const CHROME_FALLBACK: &str = "chrome://https://www.peacocktv.com";

/// Everything except ASCII alphanumerics and `-._~`.
const PAYLOAD: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Compact JSON payload for a provider variant id. Key order is fixed.
pub fn payload(pvid: &str) -> String {
    json!({
        "pvid": pvid,
        "type": "PROGRAMME",
        "action": "PLAY",
    })
    .to_string()
}

/// Deep link that plays `pvid`.
pub fn encode(pvid: &str) -> String {
    format!(
        "{DEEPLINK_BASE}{}",
        utf8_percent_encode(&payload(pvid), PAYLOAD)
    )
}

/// Wrap a URL for capture-based players.
pub fn chrome(url: &str) -> String {
    format!("chrome://{url}")
}

/// Parse the JSON payload back out of a deep link.
pub fn decode(url: &str) -> Option<Value> {
    let data = url.strip_prefix(DEEPLINK_BASE)?;
    let json = percent_decode_str(data).decode_utf8().ok()?;
    serde_json::from_str(&json).ok()
}
