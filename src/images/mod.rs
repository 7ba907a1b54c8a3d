pub mod locator;

pub use locator::locate;

use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Largest image body accepted; bigger images are skipped.
pub const MAX_IMAGE_BYTES: usize = 8 * 1024 * 1024;

/// Raw bytes of an image that was fetched successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    /// URL the bytes were fetched from
    pub url: String,
    /// MIME type inferred from the URL extension
    pub mime_type: &'static str,
    /// Response body
    pub data: Vec<u8>,
}

/// Build the client used for image downloads. Every request is bounded by
/// `timeout`.
pub fn client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("pr-ai-review/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Fetch one image of at most `max_bytes`. Any failure (timeout,
/// connection error, non-200 status, oversized or unreadable body) is
/// logged and yields `None`.
#[instrument(skip(client))]
pub async fn fetch_image(client: &reqwest::Client, url: &str, max_bytes: usize) -> Option<ImagePayload> {
    let mut response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "failed to download image");
            return None;
        }
    };

    let status = response.status();
    if status != StatusCode::OK {
        warn!(status = %status, "failed to download image");
        return None;
    }

    if let Some(length) = response.content_length() {
        if length > max_bytes as u64 {
            warn!(length, max_bytes, "image too large, skipping");
            return None;
        }
    }

    // Content-Length may be absent, so the streamed body is bounded too.
    let mut data = Vec::new();
    loop {
        match response.chunk().await {
            Ok(Some(chunk)) => {
                if data.len() + chunk.len() > max_bytes {
                    warn!(max_bytes, "image too large, skipping");
                    return None;
                }
                data.extend_from_slice(&chunk);
            }
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "failed to read image body");
                return None;
            }
        }
    }

    debug!(bytes = data.len(), "downloaded image");
    Some(ImagePayload {
        url: url.to_string(),
        mime_type: mime_type_for(url),
        data,
    })
}

/// Fetch at most `limit` images, in the order given. Failed or oversized
/// downloads are dropped from the result.
pub async fn fetch_all(
    client: &reqwest::Client,
    urls: &[String],
    limit: usize,
    max_bytes: usize,
) -> Vec<ImagePayload> {
    let mut payloads = Vec::new();
    for url in urls.iter().take(limit) {
        if let Some(payload) = fetch_image(client, url, max_bytes).await {
            payloads.push(payload);
        }
    }
    payloads
}

/// Guess the MIME type from the URL path's extension, defaulting to JPEG.
pub fn mime_type_for(url: &str) -> &'static str {
    let path = url
        .split(['?', '#'])
        .next()
        .unwrap_or(url)
        .to_ascii_lowercase();

    if path.ends_with(".png") {
        "image/png"
    } else if path.ends_with(".gif") {
        "image/gif"
    } else if path.ends_with(".webp") {
        "image/webp"
    } else {
        "image/jpeg"
    }
}
