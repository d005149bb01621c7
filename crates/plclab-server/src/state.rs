use std::sync::Arc;

use parking_lot::Mutex;
use plclab_core::action::Action;
use plclab_core::image::{ProcessImage, Snapshot};
use plclab_core::Result;

use crate::client::ClientRegistry;

/// Shared application state passed to all route handlers and sessions.
///
/// Every entry point (WebSocket actions and REST writes) mutates the one
/// process image held here, so all viewers stay consistent regardless of
/// which path a change came in on.
#[derive(Clone)]
pub struct AppState {
    image: Arc<Mutex<ProcessImage>>,
    pub registry: Arc<ClientRegistry>,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_image(ProcessImage::default())
    }

    pub fn with_image(image: ProcessImage) -> Self {
        Self {
            image: Arc::new(Mutex::new(image)),
            registry: Arc::new(ClientRegistry::default()),
        }
    }

    /// Apply one action and return the snapshot taken in the same critical
    /// section, so a broadcast can never observe a half-applied mutation.
    /// On failure the image is untouched and nothing should be broadcast.
    pub fn apply(&self, action: &Action) -> Result<Snapshot> {
        let mut image = self.image.lock();
        action.apply(&mut image)?;
        Ok(image.snapshot())
    }

    /// Set a coil (REST write path) and return the post-mutation snapshot.
    pub fn set_coil(&self, address: usize, value: bool) -> Result<Snapshot> {
        let mut image = self.image.lock();
        image.set_coil(address, value)?;
        Ok(image.snapshot())
    }

    /// Current full snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.image.lock().snapshot()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
