//! Remote archive download with bounded manual redirect handling.

use reqwest::blocking::Client;
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use reqwest::Url;
use std::fs::File;
use std::time::Duration;
use tracing::{debug, info};

use super::AcquireError;

/// Downloads `url` into `file`, following at most `max_redirects` hops.
///
/// Redirects are followed by hand so relative `Location` headers resolve
/// against the URL that produced them and the hop count stays bounded.
pub(super) fn fetch_remote(
    url: &str,
    file: &mut File,
    timeout: Duration,
    max_redirects: usize,
) -> Result<u64, AcquireError> {
    let client = Client::builder()
        .redirect(Policy::none())
        .timeout(timeout)
        .build()
        .map_err(|e| AcquireError::download(url, e))?;

    let mut current = Url::parse(url).map_err(|e| AcquireError::download(url, e))?;

    for _ in 0..=max_redirects {
        let mut response = client
            .get(current.clone())
            .send()
            .map_err(|e| AcquireError::download(current.as_str(), e))?;
        let status = response.status();

        if status.is_redirection() {
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|value| value.to_str().ok())
                .ok_or_else(|| AcquireError::Download {
                    location: current.to_string(),
                    reason: format!("redirect {status} without Location header"),
                    status: Some(status.as_u16()),
                })?;
            let next = current
                .join(location)
                .map_err(|e| AcquireError::download(current.as_str(), e))?;
            debug!(from = %current, to = %next, "Following redirect");
            current = next;
            continue;
        }

        if !status.is_success() {
            return Err(AcquireError::Download {
                location: current.to_string(),
                reason: format!(
                    "Failed to download: {} {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("")
                )
                .trim_end()
                .to_string(),
                status: Some(status.as_u16()),
            });
        }

        let bytes = response
            .copy_to(file)
            .map_err(|e| AcquireError::download(current.as_str(), e))?;
        info!(url = %current, bytes, "Downloaded archive");
        return Ok(bytes);
    }

    Err(AcquireError::download(
        url,
        format!("too many redirects (limit {max_redirects})"),
    ))
}
