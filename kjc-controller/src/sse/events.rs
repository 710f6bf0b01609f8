//! SSE event envelope

use kjc_common::ClientEvent;
use serde::Serialize;
use uuid::Uuid;

/// SSE event wrapper for transmission
#[derive(Debug, Clone, Serialize)]
pub struct SseEvent {
    /// Event type name
    pub event: &'static str,

    /// Event payload
    pub data: ClientEvent,

    /// Event ID for client reconnection
    pub id: String,
}

impl SseEvent {
    pub fn new(data: ClientEvent) -> Self {
        Self {
            event: data.event_name(),
            data,
            id: Uuid::new_v4().to_string(),
        }
    }

    /// Format as SSE protocol string
    pub fn to_sse_string(&self) -> String {
        let data_json = serde_json::to_string(&self.data).unwrap_or_default();
        format!("id: {}\nevent: {}\ndata: {}\n\n", self.id, self.event, data_json)
    }
}
