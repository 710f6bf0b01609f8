//! SSE broadcaster for the external display client

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{Stream, StreamExt};
use kjc_common::ClientEvent;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, info, warn};

use super::events::SseEvent;
use super::ClientPush;

/// SSE Broadcaster manages client connections and event distribution
#[derive(Clone)]
pub struct SseBroadcaster {
    tx: broadcast::Sender<SseEvent>,
}

impl SseBroadcaster {
    /// Create a new SSE broadcaster
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of events buffered per lagging client
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        info!("SSE broadcaster initialized with capacity {}", capacity);
        Self { tx }
    }

    /// Broadcast an event to all connected clients
    ///
    /// Returns the number of clients that received it (0 if none connected)
    pub fn broadcast(&self, event: ClientEvent) -> usize {
        let name = event.event_name();
        match self.tx.send(SseEvent::new(event)) {
            Ok(count) => {
                debug!(event = name, clients = count, "Pushed event");
                count
            }
            Err(_) => {
                debug!(event = name, "No display client connected, event dropped");
                0
            }
        }
    }

    /// Get current number of connected clients
    pub fn client_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Raw subscription, used by tests and in-process listeners
    pub fn subscribe(&self) -> broadcast::Receiver<SseEvent> {
        self.tx.subscribe()
    }

    /// Create an SSE stream for a new client connection
    pub fn subscribe_stream(&self) -> impl Stream<Item = Result<Event, Infallible>> {
        BroadcastStream::new(self.tx.subscribe()).filter_map(|result| async move {
            match result {
                Ok(sse_event) => Event::default()
                    .id(sse_event.id.clone())
                    .event(sse_event.event)
                    .json_data(&sse_event.data)
                    .ok()
                    .map(Ok),
                Err(e) => {
                    // Lagged receiver: the client missed events, keep the stream open
                    warn!("SSE client error: {:?}", e);
                    None
                }
            }
        })
    }

    /// Axum SSE response for GET /events
    pub fn handle_sse_connection(&self) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
        let stream = self.subscribe_stream();
        info!("New display client connected, total clients: {}", self.client_count());

        Sse::new(stream).keep_alive(
            KeepAlive::new()
                .interval(Duration::from_secs(15))
                .text("keep-alive"),
        )
    }
}

impl ClientPush for SseBroadcaster {
    fn publish(&self, event: ClientEvent) {
        self.broadcast(event);
    }
}
