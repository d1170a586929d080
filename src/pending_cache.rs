//! Pending-packet cache: parks frames awaiting ARP resolution (spec §3,
//! §4.4), grounded on `forward.c`'s `arpCacheQueue`/`packetCache`.
//!
//! Each slot holds one frame plus the route it is waiting to go out on and
//! the IP whose MAC it's waiting for. The frame is stored as a fixed-size
//! buffer rather than a `Vec<u8>` to keep the cache's memory footprint
//! bounded the way the original's `struct packet_cache_entry[PACKET_CACHE_SIZE]`
//! is.

use tracing::{debug, trace};

use crate::arp_cache::ArpCache;
use crate::clock::Timestamp;
use crate::config::Route;
use crate::error::RouterError;
use crate::frame::MAX_FRAME_LEN;
use crate::types::Ipv4Address;

/// Number of slots in the pending-packet cache (spec §3).
pub const PACKET_CACHE_SIZE: usize = 256;

/// Upper bound on ARP requests sent for one pending entry before it is
/// dropped (spec §4.4). The original's loop condition is `arps <= 5`.
pub const MAX_ARP_ATTEMPTS: u8 = 5;

/// Minimum gap, in seconds, between ARP retransmissions for one entry (spec
/// §4.4), the literal `(now - enqueued_at) mod 3 < 1` retry gate.
pub const RETRY_INTERVAL: u64 = 3;

#[derive(Debug, Clone)]
struct PendingEntry {
    frame: Box<[u8; MAX_FRAME_LEN]>,
    frame_len: u16,
    target_ip: Ipv4Address,
    route: Route,
    arp_attempts: u8,
    enqueued_at: Timestamp,
    occupied: bool,
}

impl Default for PendingEntry {
    fn default() -> Self {
        Self {
            frame: Box::new([0u8; MAX_FRAME_LEN]),
            frame_len: 0,
            target_ip: [0; 4],
            route: Route::new([0; 4], [0; 4], [0; 4], String::new()),
            arp_attempts: 0,
            enqueued_at: 0,
            occupied: false,
        }
    }
}

/// What the router must do with one pending slot as a result of a drain
/// pass (spec §4.4's three-way `drain(now)` branch).
pub enum DrainAction {
    /// ARP cache now resolves `target_ip`: transmit `frame` via `route`
    /// using `resolved_mac`, then the slot is freed.
    Forward {
        frame: Vec<u8>,
        route: Route,
        resolved_mac: crate::types::MacAddress,
    },
    /// Still unresolved but within attempts and due for another request.
    Retry { target_ip: Ipv4Address, route: Route },
    /// Attempts exhausted: emit host-unreachable for `frame`, then freed.
    Unreachable { frame: Vec<u8>, target_ip: Ipv4Address, route: Route },
}

/// A fixed-capacity holding area for frames awaiting ARP resolution.
#[derive(Debug)]
pub struct PendingCache {
    slots: Box<[PendingEntry; PACKET_CACHE_SIZE]>,
}

impl Default for PendingCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PendingCache {
    pub fn new() -> Self {
        Self {
            slots: Box::new(std::array::from_fn(|_| PendingEntry::default())),
        }
    }

    /// Parks `frame` awaiting resolution of `route.gateway` (spec §4.4
    /// `park`). `arp_attempts` starts at 1: the caller emits the first ARP
    /// request itself before calling this.
    pub fn park(&mut self, frame: &[u8], route: Route, now: Timestamp) -> Result<(), RouterError> {
        if frame.len() > MAX_FRAME_LEN {
            return Err(RouterError::MalformedFrame {
                len: frame.len(),
                needed: MAX_FRAME_LEN,
            });
        }

        match self.slots.iter_mut().find(|s| !s.occupied) {
            Some(slot) => {
                slot.frame[..frame.len()].copy_from_slice(frame);
                slot.frame_len = frame.len() as u16;
                slot.target_ip = route.gateway;
                slot.route = route;
                slot.arp_attempts = 1;
                slot.enqueued_at = now;
                slot.occupied = true;
                debug!(ip = ?slot.target_ip, "parked frame awaiting ARP resolution");
                Ok(())
            }
            None => Err(RouterError::CacheFull("pending-packet")),
        }
    }

    /// Walks every occupied slot and decides its fate (spec §4.4 `drain`),
    /// invoked by the ARP handler on every reply ingestion. Slots resolved
    /// to `Forward` or `Unreachable` are freed as part of this call; `Retry`
    /// slots remain occupied with `arp_attempts` incremented.
    pub fn drain(&mut self, now: Timestamp, arp_cache: &ArpCache) -> Vec<DrainAction> {
        let mut actions = Vec::new();

        for slot in self.slots.iter_mut() {
            if !slot.occupied {
                continue;
            }

            if slot.arp_attempts <= MAX_ARP_ATTEMPTS {
                let resolved = arp_cache
                    .lookup_index(slot.target_ip)
                    .and_then(|index| arp_cache.mac_ref(index));
                if let Some(mac) = resolved {
                    trace!(ip = ?slot.target_ip, "pending slot resolved, forwarding");
                    actions.push(DrainAction::Forward {
                        frame: slot.frame[..slot.frame_len as usize].to_vec(),
                        route: slot.route.clone(),
                        resolved_mac: mac,
                    });
                    slot.occupied = false;
                } else if now.saturating_sub(slot.enqueued_at) % RETRY_INTERVAL < 1 {
                    slot.arp_attempts += 1;
                    trace!(ip = ?slot.target_ip, attempts = slot.arp_attempts, "ARP retry due");
                    actions.push(DrainAction::Retry {
                        target_ip: slot.target_ip,
                        route: slot.route.clone(),
                    });
                }
            } else {
                debug!(ip = ?slot.target_ip, "ARP attempts exhausted, emitting unreachable");
                actions.push(DrainAction::Unreachable {
                    frame: slot.frame[..slot.frame_len as usize].to_vec(),
                    target_ip: slot.target_ip,
                    route: slot.route.clone(),
                });
                slot.occupied = false;
            }
        }

        actions
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.occupied).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
