//! Push channel double that records every published event

use kjc_common::ClientEvent;
use kjc_controller::sse::ClientPush;
use std::sync::Mutex;
use tokio::sync::broadcast;
use tokio::time::Instant;

pub struct RecordingPush {
    log: Mutex<Vec<(Instant, ClientEvent)>>,
    tx: broadcast::Sender<ClientEvent>,
}

impl RecordingPush {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self {
            log: Mutex::new(Vec::new()),
            tx,
        }
    }

    /// Live feed of events published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.tx.subscribe()
    }

    pub fn log(&self) -> Vec<(Instant, ClientEvent)> {
        self.log.lock().unwrap().clone()
    }

    pub fn events(&self) -> Vec<ClientEvent> {
        self.log().into_iter().map(|(_, e)| e).collect()
    }

    /// Wire names of the published events, in order
    pub fn names(&self) -> Vec<&'static str> {
        self.log().iter().map(|(_, e)| e.event_name()).collect()
    }

    /// Time the first event with wire name `name` was published
    pub fn first_time_of(&self, name: &str) -> Option<Instant> {
        self.log()
            .into_iter()
            .find(|(_, e)| e.event_name() == name)
            .map(|(t, _)| t)
    }

    pub fn count_of(&self, name: &str) -> usize {
        self.names().into_iter().filter(|n| *n == name).count()
    }

    pub fn clear(&self) {
        self.log.lock().unwrap().clear();
    }
}

impl Default for RecordingPush {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientPush for RecordingPush {
    fn publish(&self, event: ClientEvent) {
        self.log.lock().unwrap().push((Instant::now(), event.clone()));
        let _ = self.tx.send(event);
    }
}
