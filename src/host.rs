//! The host's `send` primitive (spec §6): best-effort transmit, may fail.

use crate::error::RouterError;

/// A host-provided transmit primitive. The router calls `send` once per
/// outbound frame; it never reads from the host beyond this and the static
/// configuration passed to `Router::new`.
pub trait Host {
    /// Transmits `frame` on the named interface. `Err` is logged by the
    /// caller and treated as "handled, not retried" (spec §4.4, §7) — the
    /// frame is not requeued.
    fn send(&mut self, frame: &[u8], interface: &str) -> Result<(), String>;
}

/// A `Host` that records every frame it was asked to send, for use in
/// tests that assert on the router's output instead of a real network.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub sent: Vec<(String, Vec<u8>)>,
    pub fail_on: Option<String>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames_on(&self, interface: &str) -> Vec<&[u8]> {
        self.sent
            .iter()
            .filter(|(name, _)| name == interface)
            .map(|(_, frame)| frame.as_slice())
            .collect()
    }
}

impl Host for RecordingHost {
    fn send(&mut self, frame: &[u8], interface: &str) -> Result<(), String> {
        if self.fail_on.as_deref() == Some(interface) {
            return Err(format!("simulated send failure on {interface}"));
        }
        self.sent.push((interface.to_string(), frame.to_vec()));
        Ok(())
    }
}

/// Sends `frame` and maps a host-side failure onto [`RouterError::SendError`]
/// (spec §7: send errors are logged and the caller proceeds as if sent).
pub(crate) fn send_or_log(host: &mut dyn Host, frame: &[u8], interface: &str) -> Result<(), RouterError> {
    host.send(frame, interface).map_err(|reason| {
        tracing::warn!(interface, %reason, "host send failed");
        RouterError::SendError {
            interface: interface.to_string(),
            reason,
        }
    })
}
