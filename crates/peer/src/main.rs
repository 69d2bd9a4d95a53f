use std::{net::SocketAddr, path::Path, sync::Arc, time::Duration};

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use futures::{SinkExt, StreamExt};
use shared::protocol::{OverlayEvent, OverlayRequest};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod session;
mod topology;

use config::load_settings;
use session::OverlaySession;
use topology::Topology;

#[derive(Clone)]
struct AppState {
    topology: Arc<Topology>,
    link_update_period: Duration,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = load_settings();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&settings.log_filter))
        .init();

    let topology = match &settings.topology_path {
        Some(path) => Topology::load(Path::new(path)).map_err(|error| {
            error!(%path, %error, "failed to load topology file");
            error
        })?,
        None => Topology::demo(),
    };
    info!(
        devices = topology.devices.len(),
        hosts = topology.hosts.len(),
        links = topology.links.len(),
        "topology loaded"
    );

    let state = AppState {
        topology: Arc::new(topology),
        link_update_period: settings.link_update_period(),
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "peer listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/ws", get(ws_handler))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| ws_connection(state, socket))
}

async fn ws_connection(state: Arc<AppState>, socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();
    let mut session = OverlaySession::new(Arc::clone(&state.topology));
    let mut ticker = tokio::time::interval_at(
        tokio::time::Instant::now() + state.link_update_period,
        state.link_update_period,
    );
    debug!("peer: overlay connection opened");

    loop {
        let events = tokio::select! {
            msg = receiver.next() => match msg {
                Some(Ok(Message::Text(text))) => match serde_json::from_str::<OverlayRequest>(&text) {
                    Ok(request) => session.process(request),
                    Err(err) => {
                        warn!(%err, "peer: invalid overlay request");
                        continue;
                    }
                },
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => continue,
                Some(Err(err)) => {
                    warn!(%err, "peer: websocket receive failed");
                    break;
                }
            },
            _ = ticker.tick() => session.tick().into_iter().collect(),
        };

        if send_events(&mut sender, events).await.is_err() {
            break;
        }
    }

    debug!("peer: overlay connection closed");
}

async fn send_events<S>(sender: &mut S, events: Vec<OverlayEvent>) -> Result<(), S::Error>
where
    S: futures::Sink<Message> + Unpin,
{
    for event in events {
        let text = match serde_json::to_string(&event) {
            Ok(v) => v,
            Err(err) => {
                warn!(%err, "peer: failed to encode overlay event");
                continue;
            }
        };
        sender.send(Message::Text(text)).await?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
