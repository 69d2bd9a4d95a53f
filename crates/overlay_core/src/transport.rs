use futures::{SinkExt, StreamExt};
use shared::protocol::{OverlayEvent, OverlayRequest};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::TransportError;

/// Websocket link to the remote peer. Requests are encoded on the caller's side and
/// written by a background task; decoded peer events arrive on the returned receiver.
#[derive(Debug, Clone)]
pub struct PeerLink {
    outbound: mpsc::UnboundedSender<String>,
}

impl PeerLink {
    pub async fn connect(
        peer_url: &str,
    ) -> Result<(Self, mpsc::UnboundedReceiver<OverlayEvent>), TransportError> {
        let ws_url = ws_url(peer_url)?;
        let (ws_stream, _) =
            connect_async(ws_url.as_str())
                .await
                .map_err(|source| TransportError::Connect {
                    url: ws_url.to_string(),
                    source,
                })?;
        info!(url = %ws_url, "peer link: connected");

        let (mut writer, mut reader) = ws_stream.split();
        let (outbound, mut outbound_rx) = mpsc::unbounded_channel::<String>();
        let (inbound_tx, inbound) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Some(text) = outbound_rx.recv().await {
                if let Err(err) = writer.send(Message::Text(text)).await {
                    warn!(%err, "peer link: send failed");
                    break;
                }
            }
            let _ = writer.close().await;
        });

        tokio::spawn(async move {
            while let Some(msg) = reader.next().await {
                match msg {
                    Ok(Message::Text(text)) => match serde_json::from_str::<OverlayEvent>(&text) {
                        Ok(event) => {
                            if inbound_tx.send(event).is_err() {
                                break;
                            }
                        }
                        Err(err) => warn!(%err, "peer link: invalid peer event"),
                    },
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(err) => {
                        warn!(%err, "peer link: receive failed");
                        break;
                    }
                }
            }
            debug!("peer link: reader finished");
        });

        Ok((Self { outbound }, inbound))
    }

    pub fn send(&self, request: &OverlayRequest) -> Result<(), TransportError> {
        let text = serde_json::to_string(request).map_err(|source| TransportError::Encode {
            event: request.name(),
            source,
        })?;
        self.outbound.send(text).map_err(|_| TransportError::Closed)?;
        debug!(event = request.name(), "peer link: queued request");
        Ok(())
    }
}

/// Maps an http(s) or ws(s) peer url to its websocket endpoint; a bare host gets `/ws`.
pub fn ws_url(peer_url: &str) -> Result<Url, TransportError> {
    let invalid = |reason: String| TransportError::InvalidUrl {
        url: peer_url.to_string(),
        reason,
    };
    let mut url = Url::parse(peer_url.trim()).map_err(|err| invalid(err.to_string()))?;

    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => return Err(invalid(format!("unsupported scheme '{other}'"))),
    };
    url.set_scheme(scheme)
        .map_err(|_| invalid(format!("cannot use scheme '{scheme}'")))?;
    if url.path().is_empty() || url.path() == "/" {
        url.set_path("/ws");
    }
    Ok(url)
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
