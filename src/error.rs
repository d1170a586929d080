//! Error taxonomy for the router datapath (spec §7).
//!
//! Every variant maps to a single drop/log/reply policy applied at the call
//! site; `Router::receive` never propagates one of these back to the host,
//! it only logs and continues.
//!
//! ARP exhaustion (spec §4.4, §7) has no variant here: attempts-exceeded is
//! a normal outcome of `PendingCache::drain`, surfaced as
//! `DrainAction::Unreachable` and handled inline by the ARP handler, not
//! raised as an error.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouterError {
    /// Frame shorter than the fixed-offset reads its classification needs.
    #[error("frame too short to parse ({len} bytes, needed at least {needed})")]
    MalformedFrame { len: usize, needed: usize },

    /// No routing-table entry matched and no default route was configured.
    #[error("no route for destination and no default route configured")]
    NoRoute,

    /// IPv4 payload was TCP/UDP terminating at this router.
    #[error("unsupported transport protocol {protocol} for local delivery")]
    UnsupportedL4 { protocol: u8 },

    /// The ARP cache or pending-packet cache had no free slot.
    #[error("{0} cache is full")]
    CacheFull(&'static str),

    /// The host's send primitive failed.
    #[error("send on interface {interface} failed: {reason}")]
    SendError { interface: String, reason: String },

    /// Interfaces or routes configured at startup failed validation.
    #[error("invalid router configuration: {0}")]
    InvalidConfig(String),

    /// No interface is configured with the given name.
    #[error("no such interface: {0}")]
    UnknownInterface(String),
}
