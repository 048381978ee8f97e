use super::*;
use crate::routes;
use frames::{EVENT_DRAWING, FRAME_MESSAGE, FRAME_PEER_ID, Segment, Tool};
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use std::net::SocketAddr;
use tokio::net::TcpStream;
use tokio::time::{Duration, timeout};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

fn pen_segment() -> Segment {
    Segment {
        x1: 10.0,
        y1: 10.0,
        x2: 20.0,
        y2: 20.0,
        tool: Tool::Pen,
        color: "#000000".into(),
        width: 5.0,
    }
}

async fn register_channel(state: &AppState) -> (PeerId, mpsc::Receiver<Frame>) {
    let peer_id = Uuid::new_v4();
    let (tx, rx) = mpsc::channel(32);
    services::relay::register(state, peer_id, tx).await;
    (peer_id, rx)
}

async fn recv_broadcast(rx: &mut mpsc::Receiver<Frame>) -> Frame {
    timeout(Duration::from_millis(500), rx.recv())
        .await
        .expect("broadcast receive timed out")
        .expect("broadcast channel closed unexpectedly")
}

async fn assert_no_broadcast(rx: &mut mpsc::Receiver<Frame>) {
    assert!(
        timeout(Duration::from_millis(80), rx.recv()).await.is_err(),
        "expected no broadcast frame"
    );
}

// =============================================================================
// ROUTING
// =============================================================================

#[test]
fn route_forwards_drawing_unchanged() {
    let frame = Frame::new(EVENT_DRAWING, json!({"x1": "not a number", "extra": true}));
    assert_eq!(route(&frame), Outcome::BroadcastExcludeSender(frame.clone()));
}

#[test]
fn route_strips_clear_payload() {
    let frame = Frame::new("clear-canvas", json!({"reason": "because"}));
    assert_eq!(route(&frame), Outcome::BroadcastExcludeSender(Frame::clear_canvas()));
}

#[test]
fn route_ignores_unknown_and_relay_events() {
    assert_eq!(route(&Frame::new("cursor", json!({}))), Outcome::Ignore);
    assert_eq!(route(&Frame::connected("spoofed")), Outcome::Ignore);
    assert_eq!(route(&Frame::error("spoofed")), Outcome::Ignore);
}

// =============================================================================
// DISPATCH
// =============================================================================

#[tokio::test]
async fn drawing_reaches_every_peer_except_sender() {
    let state = AppState::default();
    let (sender, mut sender_rx) = register_channel(&state).await;
    let (_, mut b_rx) = register_channel(&state).await;
    let (_, mut c_rx) = register_channel(&state).await;

    let text = frames::encode_frame(&Frame::drawing(&pen_segment()));
    let reply = process_inbound_text(&state, sender, &text).await;
    assert!(reply.is_none());

    let b = recv_broadcast(&mut b_rx).await;
    let c = recv_broadcast(&mut c_rx).await;
    assert_eq!(b.segment().expect("segment"), pen_segment());
    assert_eq!(b, c);
    assert_no_broadcast(&mut sender_rx).await;
}

#[tokio::test]
async fn clear_reaches_every_peer_except_sender() {
    let state = AppState::default();
    let (sender, mut sender_rx) = register_channel(&state).await;
    let (_, mut peer_rx) = register_channel(&state).await;

    process_inbound_text(&state, sender, r#"{"event":"clear-canvas"}"#).await;

    assert_eq!(recv_broadcast(&mut peer_rx).await, Frame::clear_canvas());
    assert_no_broadcast(&mut sender_rx).await;
}

#[tokio::test]
async fn invalid_envelope_replies_error_to_sender_only() {
    let state = AppState::default();
    let (sender, _sender_rx) = register_channel(&state).await;
    let (_, mut peer_rx) = register_channel(&state).await;

    let reply = process_inbound_text(&state, sender, "{{ definitely not json")
        .await
        .expect("sender should get an error frame");
    assert_eq!(reply.kind(), Some(EventKind::Error));
    assert!(reply.data_str(FRAME_MESSAGE).is_some_and(|m| m.starts_with("invalid frame")));
    assert_no_broadcast(&mut peer_rx).await;
}

#[tokio::test]
async fn unknown_event_is_not_broadcast() {
    let state = AppState::default();
    let (sender, _sender_rx) = register_channel(&state).await;
    let (_, mut peer_rx) = register_channel(&state).await;

    let reply = process_inbound_text(&state, sender, r#"{"event":"chat","data":{"text":"hi"}}"#).await;
    assert!(reply.is_none());
    assert_no_broadcast(&mut peer_rx).await;
}

#[tokio::test]
async fn lone_peer_drawing_goes_nowhere() {
    let state = AppState::default();
    let (sender, mut sender_rx) = register_channel(&state).await;

    let text = frames::encode_frame(&Frame::drawing(&pen_segment()));
    assert!(process_inbound_text(&state, sender, &text).await.is_none());
    assert_no_broadcast(&mut sender_rx).await;
}

// =============================================================================
// END TO END (real sockets)
// =============================================================================

async fn spawn_relay() -> (SocketAddr, AppState) {
    let state = AppState::default();
    let app = routes::app(state.clone(), None);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("relay serve failed");
    });
    (addr, state)
}

async fn next_frame(client: &mut Client) -> Frame {
    loop {
        let msg = timeout(Duration::from_millis(1000), client.next())
            .await
            .expect("websocket receive timed out")
            .expect("websocket closed")
            .expect("websocket error");
        if let WsMessage::Text(text) = msg {
            return frames::decode_frame(text.as_str()).expect("relay sent a valid frame");
        }
    }
}

async fn assert_silent(client: &mut Client) {
    assert!(
        timeout(Duration::from_millis(150), client.next()).await.is_err(),
        "expected no frame"
    );
}

/// Connect and consume the `connected` greeting.
async fn connect_peer(addr: SocketAddr) -> (Client, String) {
    let (mut client, _) = connect_async(format!("ws://{addr}/ws"))
        .await
        .expect("websocket connect");
    let greeting = next_frame(&mut client).await;
    assert_eq!(greeting.kind(), Some(EventKind::Connected));
    let peer_id = greeting
        .data_str(FRAME_PEER_ID)
        .expect("greeting carries peer id")
        .to_owned();
    (client, peer_id)
}

async fn send_text(client: &mut Client, text: &str) {
    client
        .send(WsMessage::Text(text.to_owned().into()))
        .await
        .expect("websocket send");
}

#[tokio::test]
async fn e2e_drawing_fans_out_to_n_minus_one_peers() {
    let (addr, state) = spawn_relay().await;
    let (mut a, a_id) = connect_peer(addr).await;
    let (mut b, b_id) = connect_peer(addr).await;
    let (mut c, _) = connect_peer(addr).await;
    assert_ne!(a_id, b_id);
    assert_eq!(services::relay::peer_count(&state).await, 3);

    let sent = Frame::drawing(&pen_segment());
    send_text(&mut a, &frames::encode_frame(&sent)).await;

    let got_b = next_frame(&mut b).await;
    let got_c = next_frame(&mut c).await;
    assert_eq!(got_b, sent);
    assert_eq!(got_c, sent);
    assert_silent(&mut a).await;
}

#[tokio::test]
async fn e2e_malformed_payload_is_forwarded_as_is() {
    let (addr, _state) = spawn_relay().await;
    let (mut a, _) = connect_peer(addr).await;
    let (mut b, _) = connect_peer(addr).await;

    send_text(&mut a, r#"{"event":"drawing","data":{"x1":"oops","tool":"laser"}}"#).await;

    let got = next_frame(&mut b).await;
    assert_eq!(got.event, "drawing");
    assert_eq!(got.data, json!({"x1": "oops", "tool": "laser"}));
}

#[tokio::test]
async fn e2e_clear_reaches_others_without_payload() {
    let (addr, _state) = spawn_relay().await;
    let (mut a, _) = connect_peer(addr).await;
    let (mut b, _) = connect_peer(addr).await;

    send_text(&mut a, r#"{"event":"clear-canvas","data":{"ignored":1}}"#).await;

    assert_eq!(next_frame(&mut b).await, Frame::clear_canvas());
    assert_silent(&mut a).await;
}

#[tokio::test]
async fn e2e_late_joiner_starts_blank() {
    let (addr, _state) = spawn_relay().await;
    let (mut a, _) = connect_peer(addr).await;
    let (mut b, _) = connect_peer(addr).await;

    for _ in 0..3 {
        send_text(&mut a, &frames::encode_frame(&Frame::drawing(&pen_segment()))).await;
    }
    for _ in 0..3 {
        next_frame(&mut b).await;
    }

    // Nothing is replayed to a new connection: greeting only.
    let (mut late, _) = connect_peer(addr).await;
    assert_silent(&mut late).await;
}

#[tokio::test]
async fn e2e_preserves_per_sender_order() {
    let (addr, _state) = spawn_relay().await;
    let (mut a, _) = connect_peer(addr).await;
    let (mut b, _) = connect_peer(addr).await;

    let sent: Vec<Frame> = (0..20)
        .map(|i| {
            let mut seg = pen_segment();
            seg.x1 = f64::from(i);
            seg.x2 = f64::from(i + 1);
            Frame::drawing(&seg)
        })
        .collect();
    for frame in &sent {
        send_text(&mut a, &frames::encode_frame(frame)).await;
    }
    for expected in &sent {
        assert_eq!(&next_frame(&mut b).await, expected);
    }
}

#[tokio::test]
async fn e2e_disconnect_deregisters_peer() {
    let (addr, state) = spawn_relay().await;
    let (mut a, _) = connect_peer(addr).await;
    let (_b, _) = connect_peer(addr).await;
    assert_eq!(services::relay::peer_count(&state).await, 2);

    a.close(None).await.expect("close handshake");
    drop(a);

    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while services::relay::peer_count(&state).await != 1 {
        assert!(tokio::time::Instant::now() < deadline, "peer was never deregistered");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn e2e_invalid_text_gets_error_frame() {
    let (addr, _state) = spawn_relay().await;
    let (mut a, _) = connect_peer(addr).await;
    let (mut b, _) = connect_peer(addr).await;

    send_text(&mut a, "hello").await;

    let reply = next_frame(&mut a).await;
    assert_eq!(reply.kind(), Some(EventKind::Error));
    assert_silent(&mut b).await;
}

#[tokio::test]
async fn e2e_healthz_responds() {
    let (addr, _state) = spawn_relay().await;
    let mut stream = TcpStream::connect(addr).await.expect("tcp connect");
    tokio::io::AsyncWriteExt::write_all(
        &mut stream,
        b"GET /healthz HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
    )
    .await
    .expect("write request");
    let mut response = Vec::new();
    tokio::io::AsyncReadExt::read_to_end(&mut stream, &mut response)
        .await
        .expect("read response");
    let response = String::from_utf8_lossy(&response);
    assert!(response.starts_with("HTTP/1.1 200"), "unexpected response: {response}");
    assert!(response.ends_with("ok peers=0\n"), "unexpected body: {response}");
}
