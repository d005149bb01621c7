use std::collections::HashMap;

use parking_lot::RwLock;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Outbound frames queued per session before a slow client starts dropping.
pub const MAX_SEND_QUEUE: usize = 64;

/// Opaque identifier for one viewer session.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ClientId(Uuid);

impl ClientId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Registry-owned half of a session: its outbound queue and the lesson it is
/// currently viewing, if any.
struct ClientHandle {
    tx: mpsc::Sender<String>,
    current_lesson: RwLock<Option<String>>,
}

/// Registry of all connected viewer sessions.
///
/// Sessions are created on connect and removed on disconnect; removal is
/// idempotent so a double close is a no-op. The broadcast pass iterates over
/// a snapshot of senders, so sessions registering or vanishing mid-pass can
/// neither corrupt iteration nor abort delivery to the rest.
pub struct ClientRegistry {
    clients: RwLock<HashMap<ClientId, ClientHandle>>,
    queue_depth: usize,
}

impl ClientRegistry {
    pub fn new(queue_depth: usize) -> Self {
        Self {
            clients: RwLock::new(HashMap::new()),
            queue_depth,
        }
    }

    /// Register a new session and return its ID + outbound queue receiver.
    pub fn register(&self) -> (ClientId, mpsc::Receiver<String>) {
        let id = ClientId::new();
        let (tx, rx) = mpsc::channel(self.queue_depth);
        let handle = ClientHandle {
            tx,
            current_lesson: RwLock::new(None),
        };
        self.clients.write().insert(id.clone(), handle);
        (id, rx)
    }

    /// Remove a session. Idempotent; returns whether it was present.
    pub fn unregister(&self, id: &ClientId) -> bool {
        self.clients.write().remove(id).is_some()
    }

    /// Number of live sessions.
    pub fn count(&self) -> usize {
        self.clients.read().len()
    }

    /// Record which lesson a session is viewing.
    pub fn set_current_lesson(&self, id: &ClientId, lesson: &str) {
        if let Some(handle) = self.clients.read().get(id) {
            *handle.current_lesson.write() = Some(lesson.to_string());
        }
    }

    pub fn current_lesson(&self, id: &ClientId) -> Option<String> {
        self.clients
            .read()
            .get(id)
            .and_then(|h| h.current_lesson.read().clone())
    }

    /// Queue a frame for one session. Returns false if the session is gone
    /// or its queue is full.
    pub fn send_to(&self, id: &ClientId, frame: String) -> bool {
        let tx = match self.clients.read().get(id) {
            Some(handle) => handle.tx.clone(),
            None => return false,
        };
        match tx.try_send(frame) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(client = %id, "send queue full, dropping frame");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }

    /// Fan a frame out to every live session. A full or closed queue skips
    /// that one recipient; delivery to the others continues. Returns the
    /// number of sessions the frame was queued for.
    pub fn broadcast(&self, frame: &str) -> usize {
        // Snapshot the senders so register/unregister during the pass can't
        // invalidate iteration.
        let senders: Vec<(ClientId, mpsc::Sender<String>)> = self
            .clients
            .read()
            .iter()
            .map(|(id, handle)| (id.clone(), handle.tx.clone()))
            .collect();

        let mut delivered = 0;
        for (id, tx) in senders {
            match tx.try_send(frame.to_string()) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!(client = %id, "send queue full, dropping broadcast frame");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    tracing::debug!(client = %id, "session closed mid-broadcast, skipped");
                }
            }
        }
        delivered
    }
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new(MAX_SEND_QUEUE)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
