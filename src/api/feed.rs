/// WebSocket snapshot feed for real-time gallery updates
///
/// Push-mode clients hold one socket open for the lifetime of the view
/// and receive the full collection again on every remote change. Frames:
///
/// - `#snapshot`: complete replacement photo list, newest first
/// - `#error`: the subscription is gone; distinct from an empty snapshot
///   so the client can show a connection message instead of the
///   empty-gallery state
///
/// Browsers cannot attach headers to WebSocket upgrades, so the session
/// token rides in the query string.
use crate::{
    context::AppContext,
    error::{GalleryError, GalleryResult},
    metrics,
    store::PhotoRecord,
    sync::{FeedEvent, SnapshotFeed},
};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tokio::time::{interval, Duration};

const PING_INTERVAL_SECS: u64 = 30;

/// Build feed routes
pub fn routes() -> Router<AppContext> {
    Router::new().route("/photos/feed", get(photo_feed))
}

#[derive(Debug, Deserialize)]
pub struct FeedParams {
    pub token: Option<String>,
}

/// Feed frame sent to clients
#[derive(Debug, Serialize)]
#[serde(tag = "$type")]
enum FeedFrame {
    #[serde(rename = "#snapshot")]
    Snapshot { photos: Vec<PhotoRecord> },
    #[serde(rename = "#error")]
    Error { message: String },
}

/// WebSocket handler for the snapshot feed
///
/// Auth and mode checks happen before the upgrade so a poll-mode store or
/// a bad token turns into a plain HTTP error.
async fn photo_feed(
    ws: WebSocketUpgrade,
    Query(params): Query<FeedParams>,
    State(ctx): State<AppContext>,
) -> GalleryResult<Response> {
    let token = params.token.ok_or_else(|| {
        GalleryError::Authentication("Missing session token".to_string())
    })?;
    ctx.sessions.validate(&token).await?;

    let feed = ctx.sync.subscribe().await?;

    Ok(ws.on_upgrade(move |socket| stream_snapshots(socket, feed)))
}

/// Forward feed events onto the socket until either side goes away
async fn stream_snapshots(mut socket: WebSocket, mut feed: SnapshotFeed) {
    metrics::FEED_CLIENTS.inc();

    let mut ping = interval(Duration::from_secs(PING_INTERVAL_SECS));

    loop {
        tokio::select! {
            event = feed.next() => {
                let frame = match event {
                    Some(FeedEvent::Snapshot(photos)) => FeedFrame::Snapshot { photos },
                    Some(FeedEvent::Lost(message)) => FeedFrame::Error { message },
                    None => break,
                };
                let is_error = matches!(frame, FeedFrame::Error { .. });

                match serde_json::to_string(&frame) {
                    Ok(text) => {
                        if socket.send(Message::Text(text)).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::error!("Failed to encode feed frame: {}", e);
                        break;
                    }
                }

                if is_error {
                    // The subscription is dead; the client must reconnect
                    break;
                }
            }
            _ = ping.tick() => {
                if socket.send(Message::Ping(Vec::new())).await.is_err() {
                    break;
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    None | Some(Err(_)) | Some(Ok(Message::Close(_))) => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    metrics::FEED_CLIENTS.dec();
}
