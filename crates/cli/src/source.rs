//! Document loading from an `http(s)` URL or a local file.

use std::path::Path;
use std::time::Duration;

use reqwest::header::ACCEPT;
use socg_core::Document;
use tracing::{debug, warn};

use crate::common::run_with_spinner_async;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

pub fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Whether the location names a YAML document, ignoring any query string.
pub fn is_yaml(location: &str) -> bool {
    let path = location.split(['?', '#']).next().unwrap_or(location);
    let lower = path.to_ascii_lowercase();
    lower.ends_with(".yaml") || lower.ends_with(".yml")
}

fn http_client() -> Result<reqwest::Client, String> {
    reqwest::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .map_err(|err| {
            warn!(error = %err, "Failed to build HTTP client.");
            format!("Failed to build HTTP client: {err}")
        })
}

async fn fetch_remote(url: &str) -> Result<String, String> {
    let client = http_client()?;
    let response = client
        .get(url)
        .header(ACCEPT, "application/json")
        .send()
        .await
        .map_err(|err| format!("Failed to fetch {url}: {err}"))?;

    let status = response.status();
    if !status.is_success() {
        return Err(format!("Failed to fetch {url}: {status}"));
    }
    response
        .text()
        .await
        .map_err(|err| format!("Failed to read response from {url}: {err}"))
}

/// Raw document text.
pub async fn load_text(location: &str) -> Result<String, String> {
    if is_remote(location) {
        debug!(url = location, "Fetching document.");
        fetch_remote(location).await
    } else {
        let path = Path::new(location);
        debug!(path = %path.display(), "Reading document.");
        std::fs::read_to_string(path)
            .map_err(|err| format!("Failed to read {}: {err}", path.display()))
    }
}

/// Parse as JSON, falling back to YAML when the location has a YAML
/// extension.
pub fn parse_document(location: &str, text: &str) -> Result<Document, String> {
    match Document::from_json(text) {
        Ok(doc) => Ok(doc),
        Err(_) if is_yaml(location) => Document::from_yaml(text).map_err(|err| err.to_string()),
        Err(err) => Err(err.to_string()),
    }
}

/// Document text re-encoded as pretty JSON with key order preserved.
pub fn pretty_json(location: &str, text: &str) -> Result<String, String> {
    let value: serde_json::Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(_) if is_yaml(location) => serde_yaml::from_str(text)
            .map_err(|err| format!("Failed to parse YAML document: {err}"))?,
        Err(err) => return Err(format!("Failed to parse JSON document: {err}")),
    };
    serde_json::to_string_pretty(&value).map_err(|err| format!("Failed to encode document: {err}"))
}

/// Load and parse a document behind a spinner.
pub async fn load_document(location: &str) -> Result<Document, String> {
    run_with_spinner_async(
        &format!("Loading {location}"),
        &format!("Loaded {location}"),
        || async {
            let text = load_text(location).await?;
            parse_document(location, &text)
        },
    )
    .await
}
