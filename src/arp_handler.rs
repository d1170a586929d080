//! ARP request responder and reply ingester (spec §4.2), grounded on
//! `arp.c`'s `arpHandleArpReq`/`arpHandleArpReply`.

use tracing::{debug, trace};

use crate::arp_cache::ArpCache;
use crate::clock::Timestamp;
use crate::config::RouterConfig;
use crate::error::RouterError;
use crate::frame::arp::{ArpHeader, ArpOperation};
use crate::frame::ethernet::EthernetHeader;
use crate::frame::EtherType;
use crate::host::{send_or_log, Host};
use crate::pending_cache::{DrainAction, PendingCache};
use crate::types::{Ipv4Address, MacAddress};

/// Dispatches an ARP frame already known to need ARP handling, by opcode
/// (spec §4.2).
pub fn handle(
    frame: &[u8],
    recv_interface: &str,
    config: &RouterConfig,
    arp_cache: &mut ArpCache,
    pending_cache: &mut PendingCache,
    host: &mut dyn Host,
    now: Timestamp,
) -> Result<(), RouterError> {
    let arp = ArpHeader::parse(frame)?;

    match arp.operation {
        ArpOperation::Request => handle_request(&arp, recv_interface, config, host),
        ArpOperation::Reply => handle_reply(&arp, config, arp_cache, pending_cache, host, now),
    }
}

/// If `target_ip` names the receiving interface, answer with our MAC;
/// otherwise the request is for some other host on the segment and is
/// dropped (spec §4.2).
fn handle_request(
    arp: &ArpHeader,
    recv_interface: &str,
    config: &RouterConfig,
    host: &mut dyn Host,
) -> Result<(), RouterError> {
    let iface = config
        .interface(recv_interface)
        .ok_or_else(|| RouterError::UnknownInterface(recv_interface.to_string()))?;

    if arp.target_ip != iface.ip {
        trace!(target = ?arp.target_ip, iface = recv_interface, "ARP request not for us, dropping");
        return Ok(());
    }

    let mut reply = vec![0u8; crate::frame::ARP_OFFSET + crate::frame::ARP_HDR_LEN];
    EthernetHeader::write(&mut reply, arp.sender_mac, iface.mac, EtherType::Arp);
    ArpHeader::write(
        &mut reply,
        ArpOperation::Reply,
        iface.mac,
        iface.ip,
        arp.sender_mac,
        arp.sender_ip,
    );

    debug!(iface = recv_interface, requester = ?arp.sender_ip, "answering ARP request");
    send_or_log(host, &reply, recv_interface)
}

/// Learns `(sender_ip, sender_mac)` then drains the pending-packet cache,
/// since a newly resolved MAC may free parked frames (spec §4.2, §4.4).
fn handle_reply(
    arp: &ArpHeader,
    config: &RouterConfig,
    arp_cache: &mut ArpCache,
    pending_cache: &mut PendingCache,
    host: &mut dyn Host,
    now: Timestamp,
) -> Result<(), RouterError> {
    match arp_cache.insert(arp.sender_ip, arp.sender_mac, now) {
        Ok(()) => {}
        Err(err) => {
            tracing::warn!(error = %err, "dropping ARP reply");
            return Ok(());
        }
    }

    for action in pending_cache.drain(now, arp_cache) {
        match action {
            DrainAction::Forward { frame, route, resolved_mac } => {
                let Some(out_iface) = config.interface(&route.interface) else {
                    continue;
                };
                crate::forwarder::transmit(&frame, out_iface, resolved_mac, host);
            }
            DrainAction::Retry { target_ip, route } => {
                send_request(config, &route.interface, target_ip, host);
            }
            DrainAction::Unreachable { frame, target_ip, route } => {
                let Some(recv_iface) = config.interface(&route.interface) else {
                    continue;
                };
                crate::icmp_handler::send_host_unreachable(&frame, recv_iface, target_ip, host);
            }
        }
    }

    Ok(())
}

/// Broadcasts an ARP request for `target_ip` on `out_interface` (spec §4.4
/// `park`/`drain`). Best-effort: a send failure here is logged, not
/// propagated, since the caller has no frame of its own to roll back.
pub fn send_request(config: &RouterConfig, out_interface: &str, target_ip: Ipv4Address, host: &mut dyn Host) {
    let Some(iface) = config.interface(out_interface) else {
        tracing::warn!(interface = out_interface, "cannot send ARP request, no such interface");
        return;
    };

    let mut request = vec![0u8; crate::frame::ARP_OFFSET + crate::frame::ARP_HDR_LEN];
    let broadcast: MacAddress = crate::mac_broadcast_addr!();
    EthernetHeader::write(&mut request, broadcast, iface.mac, EtherType::Arp);
    ArpHeader::write(
        &mut request,
        ArpOperation::Request,
        iface.mac,
        iface.ip,
        [0; 6],
        target_ip,
    );

    if let Err(err) = send_or_log(host, &request, out_interface) {
        tracing::warn!(error = %err, "ARP request send failed");
    }
}
