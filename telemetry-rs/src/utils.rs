use crate::errors::LookupFailure;
use reqwest::Client;
use serde_json::{Map, Value};

#[cfg(feature = "tracing")]
use tracing::{debug, warn, instrument};

/// GETs `url` and returns its body as a JSON object.
///
/// Anything other than a successful status with an object body is a
/// [`LookupFailure`], including bodies of the form `{"error": true, ...}`
/// that some geolocation services send with a 200.
#[cfg_attr(feature = "tracing", instrument(skip(client)))]
pub async fn fetch_record(client: &Client, url: &str) -> Result<Map<String, Value>, LookupFailure> {
    #[cfg(feature = "tracing")]
    debug!(%url, "Sending lookup request");

    let res = client
        .get(url)
        .header("Accept", "application/json")
        .send()
        .await?;

    let status = res.status();
    let body = res.text().await?;

    if !status.is_success() {
        #[cfg(feature = "tracing")]
        warn!(status = ?status, body = %body, "Lookup endpoint returned error");
        return Err(LookupFailure::Status { status, body });
    }

    let record = match serde_json::from_str::<Value>(&body) {
        Ok(Value::Object(record)) => record,
        Ok(other) => {
            return Err(LookupFailure::Malformed(format!(
                "expected a JSON object, got {}",
                kind_of(&other)
            )))
        }
        Err(e) => return Err(LookupFailure::Malformed(e.to_string())),
    };

    if record.get("error").and_then(Value::as_bool) == Some(true) {
        let reason = record
            .get("reason")
            .and_then(Value::as_str)
            .unwrap_or("no reason given")
            .to_string();
        return Err(LookupFailure::Rejected(reason));
    }

    #[cfg(feature = "tracing")]
    debug!(status = ?status, keys = record.len(), "Lookup request successful");
    Ok(record)
}

/// Display text for a JSON value. `null` and empty strings count as absent.
pub fn render_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
