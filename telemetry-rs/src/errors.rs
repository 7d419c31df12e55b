use thiserror::Error;

/// Why a single remote lookup produced no usable record. Callers only ever
/// see the fallback values this turns into.
#[derive(Debug, Error)]
pub enum LookupFailure {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("lookup endpoint returned error ({status}): {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("malformed lookup response: {0}")]
    Malformed(String),

    #[error("lookup endpoint rejected the request: {0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("snapshot is not ready, pending fields: {}", pending.join(", "))]
    NotReady { pending: Vec<String> },

    #[error("snapshot is ready and can no longer be modified")]
    SnapshotSealed,

    #[error("no messaging bridge is available")]
    NoBridge,

    #[error("failed to serialize summary: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("unknown field `{0}`")]
    UnknownField(String),
}
