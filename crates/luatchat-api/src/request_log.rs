//! Best-effort request logging for debugging, enabled by `LUATCHAT_DEBUG_LOG`.

use chrono::Utc;
use std::env;
use std::fs;

/// Write the outgoing request to a timestamped file under `logs/`.
/// Failures are swallowed; logging must never affect a request.
pub(crate) fn log_request(url: &str, body: &serde_json::Value) {
    if env::var("LUATCHAT_DEBUG_LOG").is_err() {
        return;
    }
    let _ = write_log(url, body);
}

fn write_log(url: &str, body: &serde_json::Value) -> std::io::Result<()> {
    fs::create_dir_all("logs")?;

    let now = Utc::now();
    let filename = format!("logs/req-{}.txt", now.timestamp_millis());

    let mut content = String::new();
    content.push_str("HTTP REQUEST LOG\n");
    content.push_str("================\n\n");
    content.push_str(&format!("Timestamp: {}\n", now.to_rfc3339()));
    content.push_str(&format!("URL: {}\n\n", url));
    content.push_str("Request Body:\n");
    match serde_json::to_string_pretty(body) {
        Ok(json) => {
            content.push_str(&json);
            content.push('\n');
        }
        Err(err) => content.push_str(&format!("Error serializing request: {}\n", err)),
    }

    fs::write(&filename, content)
}
