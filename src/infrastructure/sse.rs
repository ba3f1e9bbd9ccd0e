// Server-sent event streaming of dashboard change notifications
use crate::domain::dashboard::DashboardEvent;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast::{Receiver, error::RecvError};

/// Forward broadcast events to one SSE client until the sender goes away.
///
/// A client that falls behind gets a `resync` event telling it to refetch
/// full state instead of the notifications it missed.
pub fn event_stream(
    mut rx: Receiver<DashboardEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(event) => match to_sse(&event) {
                    Some(sse) => yield Ok(sse),
                    None => continue,
                },
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!("SSE client lagged, {} events skipped", skipped);
                    yield Ok(Event::default().event("resync").data(skipped.to_string()));
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}

fn to_sse(event: &DashboardEvent) -> Option<Event> {
    match Event::default().event("dashboard").json_data(event) {
        Ok(sse) => Some(sse),
        Err(e) => {
            tracing::warn!("Failed to encode dashboard event: {}", e);
            None
        }
    }
}
