// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Server-sent event stream of store changes.

use crate::db::ChangeEvent;
use crate::AppState;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Router,
};
use futures_util::stream::{self, Stream};
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/events", get(stream_events))
}

/// Stream every change made after the client connects.
async fn stream_events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    tracing::info!("Event stream subscriber connected");
    Sse::new(change_stream(state.db.subscribe())).keep_alive(KeepAlive::default())
}

/// Adapt a broadcast receiver into SSE frames.
///
/// A lagging client gets a `lagged` frame with the number of missed events
/// and should refetch; the stream ends when the store is dropped.
fn change_stream(
    rx: broadcast::Receiver<ChangeEvent>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    stream::unfold(rx, |mut rx| async move {
        loop {
            let event = match rx.recv().await {
                Ok(change) => match Event::default().event("change").json_data(&change) {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to encode change event");
                        continue;
                    }
                },
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "Event stream subscriber lagged");
                    Event::default().event("lagged").data(missed.to_string())
                }
                Err(RecvError::Closed) => return None,
            };
            return Some((Ok::<_, Infallible>(event), rx));
        }
    })
}
