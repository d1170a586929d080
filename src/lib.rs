//! Single-threaded IPv4 router datapath: ARP termination, ICMP termination,
//! and IPv4 forwarding over an ARP translation cache and a pending-packet
//! cache (spec §1, §2).
//!
//! The host drives this crate by constructing a [`Router`] from a
//! [`RouterConfig`] and a [`Host`] implementation, then calling
//! [`Router::receive`] once per arriving frame.

pub mod arp_cache;
pub mod arp_handler;
pub mod checksum;
pub mod clock;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod forwarder;
pub mod frame;
pub mod host;
pub mod icmp_handler;
pub mod ip_handler;
pub mod pending_cache;
pub mod router;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Interface, Route, RouterConfig};
pub use error::RouterError;
pub use host::{Host, RecordingHost};
pub use router::Router;
