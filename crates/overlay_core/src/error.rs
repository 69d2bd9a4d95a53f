use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid peer url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("failed to connect websocket {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: tokio_tungstenite::tungstenite::Error,
    },
    #[error("failed to encode {event} request: {source}")]
    Encode {
        event: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("peer link is closed")]
    Closed,
}
