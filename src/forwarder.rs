//! Route lookup, ARP resolution, and send-or-park (spec §4.4), grounded on
//! `forward.c`'s `forwardPacket`.

use tracing::{debug, trace};

use crate::arp_cache::ArpCache;
use crate::arp_handler;
use crate::clock::Timestamp;
use crate::config::{Interface, RouterConfig};
use crate::error::RouterError;
use crate::frame::ethernet::EthernetHeader;
use crate::frame::ipv4::Ipv4Header;
use crate::host::{send_or_log, Host};
use crate::pending_cache::PendingCache;
use crate::types::MacAddress;

/// Forwards an IPv4 frame not addressed to us: resolves the next hop's MAC
/// and transmits, or parks the frame and kicks off ARP resolution.
///
/// TTL and the IPv4 checksum are left untouched, matching the source
/// behavior this was distilled from (see DESIGN.md Open Questions).
pub fn forward(
    frame: &[u8],
    config: &RouterConfig,
    arp_cache: &mut ArpCache,
    pending_cache: &mut PendingCache,
    host: &mut dyn Host,
    now: Timestamp,
) -> Result<(), RouterError> {
    let ip = Ipv4Header::parse(frame)?;

    let route = config.route_for(ip.destination).ok_or(RouterError::NoRoute)?;
    let out_iface = config
        .interface(&route.interface)
        .ok_or_else(|| RouterError::UnknownInterface(route.interface.clone()))?;

    if let Some(mac) = arp_cache.lookup(route.gateway) {
        transmit(frame, out_iface, mac, host);
        return Ok(());
    }

    debug!(gateway = ?route.gateway, iface = %route.interface, "ARP miss, parking frame");
    arp_handler::send_request(config, &route.interface, route.gateway, host);

    match pending_cache.park(frame, route.clone(), now) {
        Ok(()) => Ok(()),
        Err(err) => {
            trace!(error = %err, "pending cache full, dropping frame");
            Ok(())
        }
    }
}

/// Rewrites Ethernet source/destination and transmits on `out_iface`. The
/// IPv4 payload (and its checksum) is carried through byte-for-byte.
pub fn transmit(frame: &[u8], out_iface: &Interface, destination_mac: MacAddress, host: &mut dyn Host) {
    let mut out = frame.to_vec();
    let ether_type = match EthernetHeader::parse(frame) {
        Ok(eth) => eth.ether_type,
        Err(_) => return,
    };
    EthernetHeader::write(&mut out, destination_mac, out_iface.mac, ether_type);

    if let Err(err) = send_or_log(host, &out, &out_iface.name) {
        tracing::warn!(error = %err, "forward send failed");
    }
}
