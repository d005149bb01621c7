//! State fan-out to connected viewer sessions.

use plclab_core::image::Snapshot;

use crate::client::ClientRegistry;
use crate::protocol::Outbound;

/// Push a `state` frame carrying `snapshot` to every live session.
///
/// The frame is serialized once; per-recipient failures (closed or congested
/// sessions) are isolated inside the registry pass and never abort delivery
/// to the rest. Called exactly once per successful mutation, whichever entry
/// point it came in on, and once when a new session registers.
pub fn broadcast_state(registry: &ClientRegistry, snapshot: Snapshot) -> usize {
    let frame = match Outbound::State(snapshot).encode() {
        Ok(frame) => frame,
        Err(e) => {
            tracing::warn!(error = %e, "failed to serialize state frame");
            return 0;
        }
    };
    let delivered = registry.broadcast(&frame);
    tracing::debug!(recipients = delivered, "broadcast state");
    delivered
}
