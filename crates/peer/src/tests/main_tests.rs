use super::*;
use axum::{body, body::Body, http::Request, http::StatusCode};
use shared::domain::{DisplayMode, ElementId};
use tokio::net::TcpListener;
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};
use tower::ServiceExt;

fn test_state(period: Duration) -> Arc<AppState> {
    Arc::new(AppState {
        topology: Arc::new(Topology::demo()),
        link_update_period: period,
    })
}

async fn spawn_peer(period: Duration) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let app = build_router(test_state(period));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("ws://{addr}/ws")
}

async fn next_event<S>(stream: &mut S) -> OverlayEvent
where
    S: futures::Stream<Item = Result<WsMessage, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), stream.next())
            .await
            .expect("timely event")
            .expect("open stream")
            .expect("frame");
        if let WsMessage::Text(text) = msg {
            return serde_json::from_str(&text).expect("event json");
        }
    }
}

#[tokio::test]
async fn healthz_reports_ok() {
    let app = build_router(test_state(Duration::from_secs(1)));
    let request = Request::get("/healthz")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(body.as_ref(), b"ok");
}

#[tokio::test]
async fn websocket_answers_port_requests_and_ticks_in_link_mode() {
    let url = spawn_peer(Duration::from_millis(20)).await;
    let (mut ws, _) = connect_async(url.as_str()).await.expect("connect");

    let request = OverlayRequest::DevicePortsRequest {
        id: ElementId::new(format!("of:{:016x}", 1)),
        seq: 3,
    };
    ws.send(WsMessage::Text(serde_json::to_string(&request).expect("json")))
        .await
        .expect("send");
    match next_event(&mut ws).await {
        OverlayEvent::DevicePorts { seq, ports, .. } => {
            assert_eq!(seq, Some(3));
            assert_eq!(ports.len(), 6);
        }
        other => panic!("unexpected event {other:?}"),
    }

    ws.send(WsMessage::Text("{\"type\":\"nonsense\"}".to_string()))
        .await
        .expect("send");
    let start = OverlayRequest::DisplayStart {
        mode: DisplayMode::link(),
    };
    ws.send(WsMessage::Text(serde_json::to_string(&start).expect("json")))
        .await
        .expect("send");

    let cleared = next_event(&mut ws).await;
    assert_eq!(cleared, OverlayEvent::Highlights(Default::default()));
    for _ in 0..3 {
        match next_event(&mut ws).await {
            OverlayEvent::Highlights(h) => {
                assert_eq!(h.links.iter().filter(|l| l.important).count(), 1);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
}

#[tokio::test]
async fn send_events_writes_one_text_frame_per_event() {
    let mut frames: Vec<Message> = Vec::new();
    let events = vec![
        OverlayEvent::Highlights(Default::default()),
        OverlayEvent::DevicePorts {
            id: ElementId::new("of:1"),
            seq: Some(2),
            ports: Vec::new(),
        },
    ];

    send_events(&mut frames, events.clone())
        .await
        .expect("vec sink never fails");

    let decoded: Vec<OverlayEvent> = frames
        .iter()
        .map(|frame| match frame {
            Message::Text(text) => serde_json::from_str(text).expect("event json"),
            other => panic!("unexpected frame {other:?}"),
        })
        .collect();
    assert_eq!(decoded, events);
}
