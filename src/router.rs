//! The router: owns both caches and the host's static configuration, and
//! exposes the single `receive` entry point the host calls per frame
//! (spec §2, §5, §6), grounded on `sr_router.c`'s `sr_handlepacket`.

use tracing::{trace, warn};

use crate::arp_cache::ArpCache;
use crate::clock::{Clock, SystemClock};
use crate::config::RouterConfig;
use crate::dispatcher::{self, Classification};
use crate::error::RouterError;
use crate::forwarder;
use crate::host::Host;
use crate::pending_cache::PendingCache;
use crate::{arp_handler, ip_handler};

/// The packet-processing pipeline: one per host process, constructed once
/// from a validated [`RouterConfig`] and driven by repeated [`Router::receive`]
/// calls. Not `Clone`: the caches are exactly the process-wide state spec §9
/// says must be encapsulated in a single owned value rather than globals.
pub struct Router<C: Clock, H: Host> {
    config: RouterConfig,
    arp_cache: ArpCache,
    pending_cache: PendingCache,
    clock: C,
    host: H,
}

impl<H: Host> Router<SystemClock, H> {
    /// Builds a router with the real wall clock. Most hosts want this.
    pub fn new(config: RouterConfig, host: H) -> Result<Self, RouterError> {
        Self::with_clock(config, SystemClock, host)
    }
}

impl<C: Clock, H: Host> Router<C, H> {
    /// Builds a router with an injected clock, for deterministic tests
    /// (spec §9: no module-global singleton).
    pub fn with_clock(config: RouterConfig, clock: C, host: H) -> Result<Self, RouterError> {
        config.validate()?;
        Ok(Self {
            config,
            arp_cache: ArpCache::new(),
            pending_cache: PendingCache::new(),
            clock,
            host,
        })
    }

    /// The host's per-frame entry point (spec §6 `receive`). Runs the
    /// staleness sweep, classifies the frame, and dispatches it; errors are
    /// local to the frame and never propagate past this call (spec §7).
    pub fn receive(&mut self, frame: &[u8], recv_interface: &str) {
        let now = self.clock.now();
        self.arp_cache.sweep(now);

        if let Err(err) = self.receive_inner(frame, recv_interface, now) {
            warn!(error = %err, interface = recv_interface, "dropping frame");
        }
    }

    fn receive_inner(&mut self, frame: &[u8], recv_interface: &str, now: u64) -> Result<(), RouterError> {
        let iface = self
            .config
            .interface(recv_interface)
            .ok_or_else(|| RouterError::UnknownInterface(recv_interface.to_string()))?;

        match dispatcher::classify(frame, iface)? {
            Classification::Arp => arp_handler::handle(
                frame,
                recv_interface,
                &self.config,
                &mut self.arp_cache,
                &mut self.pending_cache,
                &mut self.host,
                now,
            ),
            Classification::Ipv4Local => ip_handler::handle(frame, iface, &mut self.host),
            Classification::Ipv4Forward => forwarder::forward(
                frame,
                &self.config,
                &mut self.arp_cache,
                &mut self.pending_cache,
                &mut self.host,
                now,
            ),
            Classification::Drop => {
                trace!(interface = recv_interface, "frame classified as drop");
                Ok(())
            }
        }
    }

    /// Read-only access to the host object, e.g. for a test harness that
    /// inspects a [`crate::host::RecordingHost`] after driving a scenario.
    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }
}
