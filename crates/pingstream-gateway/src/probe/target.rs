//! `url` query parameter validation.

use pingstream_core::error::{PingStreamError, Result};
use reqwest::Url;

/// Parse the requested target. Absent or empty is `MissingUrl`; anything
/// that does not parse as an absolute URL is `InvalidUrl`. A well-formed URL
/// that cannot be fetched over http(s) (`mailto:`, `ftp://`, no host) is
/// `Unreachable`, the same answer a failed pre-flight probe gets.
pub fn parse_target(raw: Option<&str>) -> Result<Url> {
    let raw = match raw {
        Some(s) if !s.is_empty() => s,
        _ => return Err(PingStreamError::MissingUrl),
    };

    let url = Url::parse(raw).map_err(|_| PingStreamError::InvalidUrl)?;
    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(url),
        _ => Err(PingStreamError::Unreachable),
    }
}
