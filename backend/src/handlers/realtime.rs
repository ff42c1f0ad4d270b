//! Live sold-item feed over WebSocket
//!
//! Browsers cannot set an Authorization header on a WebSocket upgrade, so the
//! access token travels in the `token` query parameter.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use futures::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;

use crate::middleware::auth::{unauthorized_response, AuthUser};
use crate::realtime::FeedSender;
use crate::AppState;

#[derive(Deserialize)]
pub struct LiveQuery {
    pub token: Option<String>,
}

pub async fn live_sales(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(query): Query<LiveQuery>,
) -> Response {
    let Some(token) = query.token else {
        return unauthorized_response("Missing token query parameter");
    };
    let user = match AuthUser::from_token(&token, &state.config.jwt.secret) {
        Ok(user) => user,
        Err(msg) => return unauthorized_response(&msg),
    };

    let feed = state.feed.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, feed, user))
}

async fn handle_socket(socket: WebSocket, feed: FeedSender, user: AuthUser) {
    let (mut sender, mut receiver) = socket.split();
    let mut rx = feed.subscribe();
    tracing::info!(user = %user.email, "Live sales subscriber connected");

    let mut send_task = tokio::spawn(async move {
        loop {
            let change = match rx.recv().await {
                Ok(change) => change,
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "Live sales subscriber lagging, changes dropped");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };
            let text = match serde_json::to_string(&change) {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to encode sold item change");
                    continue;
                }
            };
            if let Err(e) = sender.send(Message::Text(text)).await {
                tracing::debug!(error = %e, "Live sales socket closed while sending");
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if let Message::Close(_) = msg {
                break;
            }
        }
    });

    // Whichever side finishes first ends the subscription
    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    tracing::info!(user = %user.email, "Live sales subscriber disconnected");
}
