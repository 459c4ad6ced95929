//! Helpers shared by the reqwest-backed adapters.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};

const PREVIEW_CHAR_LIMIT: usize = 160;
const USER_AGENT: &str = concat!("abroad-backend/", env!("CARGO_PKG_VERSION"));

/// Build the client shared by one adapter.
pub(crate) fn build_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
}

/// Whitespace-compacted, length-capped response body for error messages.
pub(crate) fn body_preview(body: &[u8]) -> String {
    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

pub(crate) fn status_message(status: StatusCode, body: &[u8]) -> String {
    let preview = body_preview(body);
    if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {preview}", status.as_u16())
    }
}

/// Describe a transport failure, flagging timeouts.
pub(crate) fn describe_transport_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        format!("request timed out: {error}")
    } else {
        error.to_string()
    }
}

/// Append path segments to `base`, keeping any path the base already has.
pub(crate) fn join_segments<'a, I>(base: &Url, segments: I) -> Option<Url>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut url = base.clone();
    url.path_segments_mut()
        .ok()?
        .pop_if_empty()
        .extend(segments);
    Some(url)
}
