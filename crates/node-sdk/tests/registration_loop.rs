//! Integration test: boots an in-process WebSocket server that plays the
//! resource directory, runs a real [`Node`] against it over [`WsTransport`],
//! and asserts the registration + update cycle.
//!
//! Covered here:
//! - `POST /rd?ep=...` carries the link-format document
//! - `2.01 Created` location becomes the prefix of every update
//! - unrelated frames on the connection are ignored
//! - requests the directory sends over an open exchange are answered from
//!   the node's resource table
//! - a rejected registration stops the node before any update
//! - a silent directory exhausts the retransmission budget

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use rd_node_sdk::{
    ContentFormat, LinkAddr, Method, Node, NodeBuilder, NodeError, NodeEvent, Request, Resource,
    ResourceContext, ResourceResult, ResourceTable, Response, ResponseCode, RetransmitPolicy,
    WELL_KNOWN_CORE,
};
use rd_protocol::WireFrame;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

// ── Test resource ───────────────────────────────────────────────────────

struct Button;

#[async_trait::async_trait]
impl Resource for Button {
    async fn handle(&self, _ctx: ResourceContext, _req: Request) -> ResourceResult {
        Ok(Response::new(ResponseCode::CONTENT).with_payload(ContentFormat::TextPlain, "0"))
    }
}

// ── Mini directory: in-process WS server ────────────────────────────────

/// Decides the answer to each request; `None` means stay silent.
type Responder = Arc<dyn Fn(&Request) -> Option<Response> + Send + Sync>;

/// Boots a tiny WS server on an ephemeral port.  Every request the node
/// sends is forwarded to the returned channel.
async fn start_mini_directory(
    responder: Responder,
) -> (SocketAddr, mpsc::UnboundedReceiver<Request>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (seen_tx, seen_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Ok((stream, _peer)) = listener.accept().await {
            let seen_tx = seen_tx.clone();
            let responder = responder.clone();
            tokio::spawn(async move {
                let Ok(ws) = tokio_tungstenite::accept_async(stream).await else {
                    return;
                };
                let (mut sink, mut stream) = ws.split();

                while let Some(Ok(msg)) = stream.next().await {
                    let Message::Text(text) = msg else { continue };
                    let Ok(WireFrame::Request {
                        message_id,
                        request,
                    }) = serde_json::from_str::<WireFrame>(&text)
                    else {
                        continue;
                    };

                    let _ = seen_tx.send(request.clone());
                    let Some(response) = responder(&request) else {
                        continue;
                    };

                    // Noise first: a response for some other exchange.
                    let noise = WireFrame::Response {
                        message_id: message_id.wrapping_add(100),
                        response: Response::new(ResponseCode::SERVICE_UNAVAILABLE),
                    };
                    let frames = [
                        noise,
                        WireFrame::Response {
                            message_id,
                            response,
                        },
                    ];
                    for frame in frames {
                        let json = serde_json::to_string(&frame).unwrap();
                        if sink.send(Message::Text(json)).await.is_err() {
                            return;
                        }
                    }
                }
            });
        }
    });

    (addr, seen_rx)
}

/// Directory that, before answering each node request, issues a GET of its
/// own on the same connection: `/actuators/button` during registration and
/// `/.well-known/core` during updates.  The node's replies go to the
/// returned channel.
async fn start_querying_directory() -> (SocketAddr, mpsc::UnboundedReceiver<(Request, Response)>) {
    const QUERY_ID: u16 = 999;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (replies_tx, replies_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Ok((stream, _peer)) = listener.accept().await {
            let replies_tx = replies_tx.clone();
            tokio::spawn(async move {
                let Ok(ws) = tokio_tungstenite::accept_async(stream).await else {
                    return;
                };
                let (mut sink, mut stream) = ws.split();

                // The node's own request opens the exchange.
                let (message_id, method) = loop {
                    let Some(Ok(Message::Text(text))) = stream.next().await else {
                        return;
                    };
                    if let Ok(WireFrame::Request {
                        message_id,
                        request,
                    }) = serde_json::from_str::<WireFrame>(&text)
                    {
                        break (message_id, request.method);
                    }
                };

                let query = match method {
                    Method::Post => Request::new(Method::Get, "/actuators/button"),
                    _ => Request::new(Method::Get, WELL_KNOWN_CORE),
                };
                let frame = WireFrame::Request {
                    message_id: QUERY_ID,
                    request: query.clone(),
                };
                let json = serde_json::to_string(&frame).unwrap();
                if sink.send(Message::Text(json)).await.is_err() {
                    return;
                }

                // Wait for the node's answer before answering it.
                while let Some(Ok(msg)) = stream.next().await {
                    let Message::Text(text) = msg else { continue };
                    if let Ok(WireFrame::Response {
                        message_id: QUERY_ID,
                        response,
                    }) = serde_json::from_str::<WireFrame>(&text)
                    {
                        let _ = replies_tx.send((query, response));
                        break;
                    }
                }

                let response = match method {
                    Method::Post => Response::new(ResponseCode::CREATED).with_location("/rd/3"),
                    _ => Response::new(ResponseCode::CHANGED),
                };
                let json = serde_json::to_string(&WireFrame::Response {
                    message_id,
                    response,
                })
                .unwrap();
                let _ = sink.send(Message::Text(json)).await;
            });
        }
    });

    (addr, replies_rx)
}

fn fast_policy() -> RetransmitPolicy {
    RetransmitPolicy {
        ack_timeout: Duration::from_millis(50),
        backoff_factor: 1.0,
        random_factor: 1.0,
        max_retransmit: 2,
    }
}

fn node_for(addr: SocketAddr) -> Node {
    let mut table = ResourceTable::new();
    table.activate("actuators/button", Some("title=\"Button\""), Button);

    NodeBuilder::new()
        .directory(addr)
        .hw_addr("00:12:4b:00:06:0d:b2:a1".parse::<LinkAddr>().unwrap())
        .registration_delay(Duration::from_millis(10))
        .retransmit(fast_policy())
        .resources(table)
        .build()
        .unwrap()
}

async fn next_request(rx: &mut mpsc::UnboundedReceiver<Request>) -> Request {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timeout waiting for request")
        .expect("directory stopped")
}

// ── Tests ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn registration_and_updates_over_websocket() {
    let responder: Responder = Arc::new(|req: &Request| match req.method {
        Method::Post => Some(Response::new(ResponseCode::CREATED).with_location("/rd/7")),
        _ => Some(Response::new(ResponseCode::CHANGED)),
    });
    let (addr, mut seen) = start_mini_directory(responder).await;

    let (tx, rx) = mpsc::channel(8);
    let handle = node_for(addr).spawn(rx, CancellationToken::new());

    // ── Registration ─────────────────────────────────────────────────
    let reg = next_request(&mut seen).await;
    assert_eq!(reg.method, Method::Post);
    assert_eq!(reg.uri_path, "/rd");
    assert_eq!(reg.uri_query, vec!["ep=18.75.0.6.13.178.161"]);
    assert_eq!(reg.content_format, Some(ContentFormat::LinkFormat));
    assert_eq!(reg.payload, "</actuators/button>;title=\"Button\"");

    // Give the node time to process the 2.01 before pressing.
    tokio::time::sleep(Duration::from_millis(200)).await;

    // ── Updates ──────────────────────────────────────────────────────
    tx.send(NodeEvent::ButtonPressed).await.unwrap();
    tx.send(NodeEvent::ButtonPressed).await.unwrap();

    let first = next_request(&mut seen).await;
    assert_eq!(first.method, Method::Put);
    assert_eq!(first.uri_path, "/rd/7/actuators/button");
    assert_eq!(first.content_format, Some(ContentFormat::TextPlain));
    assert_eq!(first.payload, "Button pressed (1)!");

    let second = next_request(&mut seen).await;
    assert_eq!(second.payload, "Button pressed (2)!");

    drop(tx);
    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("node did not stop")
        .unwrap();
    assert!(result.is_ok(), "expected clean stop, got {result:?}");
}

#[tokio::test]
async fn rejected_registration_stops_node() {
    let responder: Responder = Arc::new(|_req: &Request| Some(Response::new(ResponseCode::BAD_REQUEST)));
    let (addr, mut seen) = start_mini_directory(responder).await;

    let (tx, rx) = mpsc::channel(8);
    let result = tokio::time::timeout(
        Duration::from_secs(5),
        node_for(addr).run(rx, CancellationToken::new()),
    )
    .await
    .expect("node did not stop");

    match result {
        Err(NodeError::RegistrationRejected(code)) => assert_eq!(code.flattened(), 400),
        other => panic!("expected rejection, got {other:?}"),
    }

    // The node is gone; nothing but the registration reached the directory.
    assert!(tx.send(NodeEvent::ButtonPressed).await.is_err());
    assert_eq!(next_request(&mut seen).await.method, Method::Post);
    assert!(seen.try_recv().is_err());
}

#[tokio::test]
async fn silent_directory_exhausts_retransmissions() {
    let responder: Responder = Arc::new(|_req: &Request| None);
    let (addr, mut seen) = start_mini_directory(responder).await;

    let (_tx, rx) = mpsc::channel(8);
    let result = tokio::time::timeout(
        Duration::from_secs(5),
        node_for(addr).run(rx, CancellationToken::new()),
    )
    .await
    .expect("node did not stop");

    assert!(
        matches!(result, Err(NodeError::RegistrationTimeout)),
        "got {result:?}"
    );

    // One transmission per attempt: the first plus two retransmissions.
    let policy = fast_policy();
    for _ in 0..policy.attempts() {
        assert_eq!(next_request(&mut seen).await.method, Method::Post);
    }
}

#[tokio::test]
async fn node_answers_directory_requests_while_running() {
    let (addr, mut replies) = start_querying_directory().await;

    let (tx, rx) = mpsc::channel(8);
    let handle = node_for(addr).spawn(rx, CancellationToken::new());

    let (query, reply) = tokio::time::timeout(Duration::from_secs(5), replies.recv())
        .await
        .expect("timeout waiting for reply")
        .expect("directory stopped");
    assert_eq!(query.uri_path, "/actuators/button");
    assert_eq!(reply.code, ResponseCode::CONTENT);
    assert_eq!(reply.content_format, Some(ContentFormat::TextPlain));
    assert_eq!(reply.payload, "0");

    // Registered under /rd/3 once the reply was in; an update round-trips
    // through the same kind of exchange.
    tokio::time::sleep(Duration::from_millis(200)).await;
    tx.send(NodeEvent::ButtonPressed).await.unwrap();

    let (query, reply) = tokio::time::timeout(Duration::from_secs(5), replies.recv())
        .await
        .expect("timeout waiting for reply")
        .expect("directory stopped");
    assert_eq!(query.uri_path, WELL_KNOWN_CORE);
    assert_eq!(reply.code, ResponseCode::CONTENT);
    assert_eq!(reply.content_format, Some(ContentFormat::LinkFormat));
    assert_eq!(reply.payload, "</actuators/button>;title=\"Button\"");

    drop(tx);
    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("node did not stop")
        .unwrap();
    assert!(result.is_ok(), "expected clean stop, got {result:?}");
}
