//! ICMP echo responder and destination-unreachable generator (spec §4.5),
//! grounded on `icmp.c`'s `icmpSendEchoReply`/`icmpSendTypeThreeUnreachable`.

use crate::config::Interface;
use crate::error::RouterError;
use crate::frame::ethernet::EthernetHeader;
use crate::frame::icmp::{
    IcmpHeader, ICMP_CODE_HOST_UNREACHABLE, ICMP_CODE_PORT_UNREACHABLE, ICMP_ECHO_REPLY,
};
use crate::frame::ipv4::{Ipv4Header, Ipv4Protocol, DEFAULT_TTL};
use crate::frame::{EtherType, ETHERNET_HDR_LEN, ICMP_HDR_LEN, ICMP_OFFSET, IPV4_HDR_LEN, IPV4_OFFSET};
use crate::host::{send_or_log, Host};
use crate::types::{Ipv4Address, MacAddress};

/// How many bytes of the offending IPv4 datagram accompany a
/// destination-unreachable message: the IPv4 header plus the first 8 bytes
/// of whatever followed it (spec §4.5).
const UNREACHABLE_PAYLOAD_LEN: usize = IPV4_HDR_LEN + 8;

/// Answers an ICMP Echo Request in place: addresses and MACs are mirrored,
/// the ICMP type flips to Echo Reply, and both checksums are recomputed
/// over exactly the span the request occupied (spec §4.5).
pub fn handle_echo_request(frame: &[u8], recv_iface: &Interface, host: &mut dyn Host) -> Result<(), RouterError> {
    let eth = EthernetHeader::parse(frame)?;
    let ip = Ipv4Header::parse(frame)?;
    let icmp = IcmpHeader::parse(frame)?;

    let mut reply = frame.to_vec();

    // `total_length` is attacker-controlled and never validated against the
    // real buffer size by `Ipv4Header::parse`; clamp to what `reply` actually
    // holds past the ICMP offset so `IcmpHeader::rewrite` never slices out of
    // bounds, and floor at the fixed header so the checksum span is never
    // shorter than the header it covers.
    let available = reply.len().saturating_sub(ICMP_OFFSET);
    let icmp_len = (ip.total_length as usize)
        .saturating_sub(ip.header_len())
        .clamp(ICMP_HDR_LEN, available.max(ICMP_HDR_LEN));
    EthernetHeader::write(&mut reply, eth.source, recv_iface.mac, EtherType::Ipv4);
    Ipv4Header::patch_addresses(&mut reply, recv_iface.ip, ip.source);
    IcmpHeader::rewrite(&mut reply, ICMP_ECHO_REPLY, 0, icmp.identifier, icmp.sequence, icmp_len);

    send_or_log(host, &reply, &recv_iface.name)
}

/// Builds a fresh ICMP Destination-Unreachable frame carrying `code`, with
/// the offending datagram's header plus 8 bytes as payload (spec §4.5).
fn build_unreachable(
    offending_frame: &[u8],
    code: u8,
    recv_iface: &Interface,
    original_source: Ipv4Address,
    destination_mac: MacAddress,
) -> Vec<u8> {
    let ip_start = IPV4_OFFSET;
    let payload_len = UNREACHABLE_PAYLOAD_LEN.min(offending_frame.len().saturating_sub(ip_start));
    let payload = &offending_frame[ip_start..ip_start + payload_len];

    let icmp_len = ICMP_HDR_LEN + payload.len();
    let ip_total_len = IPV4_HDR_LEN + icmp_len;

    let mut frame = vec![0u8; ETHERNET_HDR_LEN + ip_total_len];
    EthernetHeader::write(&mut frame, destination_mac, recv_iface.mac, EtherType::Ipv4);
    Ipv4Header::write(
        &mut frame,
        ip_total_len as u16,
        DEFAULT_TTL,
        Ipv4Protocol::Icmp,
        recv_iface.ip,
        original_source,
    );
    frame[ICMP_OFFSET + ICMP_HDR_LEN..].copy_from_slice(payload);
    IcmpHeader::rewrite(&mut frame, 3, code, 0, 0, icmp_len);

    frame
}

/// Emits Destination-Host-Unreachable (code 1) to the original sender of a
/// frame whose ARP resolution was exhausted (spec §4.4 `drain`, §4.5).
pub fn send_host_unreachable(
    offending_frame: &[u8],
    recv_iface: &Interface,
    _unresolved_gateway: Ipv4Address,
    host: &mut dyn Host,
) {
    let Ok(ip) = Ipv4Header::parse(offending_frame) else {
        return;
    };
    let eth = match EthernetHeader::parse(offending_frame) {
        Ok(eth) => eth,
        Err(_) => return,
    };

    let unreachable = build_unreachable(
        offending_frame,
        ICMP_CODE_HOST_UNREACHABLE,
        recv_iface,
        ip.source,
        eth.source,
    );

    if let Err(err) = send_or_log(host, &unreachable, &recv_iface.name) {
        tracing::warn!(error = %err, "failed to send host-unreachable");
    }
}

/// Emits Destination-Port-Unreachable (code 3) for a TCP/UDP datagram
/// addressed to one of our own interfaces (spec §4.5, scenario 6).
pub fn send_port_unreachable(
    offending_frame: &[u8],
    recv_iface: &Interface,
    ip: &Ipv4Header,
    eth: &EthernetHeader,
    host: &mut dyn Host,
) -> Result<(), RouterError> {
    let unreachable = build_unreachable(
        offending_frame,
        ICMP_CODE_PORT_UNREACHABLE,
        recv_iface,
        ip.source,
        eth.source,
    );

    send_or_log(host, &unreachable, &recv_iface.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::icmp::ICMP_ECHO_REQUEST;
    use crate::host::RecordingHost;

    fn iface() -> Interface {
        Interface::new("eth0", [0, 0, 0, 0, 0, 1], [10, 0, 0, 1])
    }

    fn echo_request_frame() -> Vec<u8> {
        let total_len = 20 + 8 + 4;
        let mut frame = vec![0u8; ETHERNET_HDR_LEN + total_len];
        EthernetHeader::write(&mut frame, [0, 0, 0, 0, 0, 1], [2; 6], EtherType::Ipv4);
        Ipv4Header::write(&mut frame, total_len as u16, 64, Ipv4Protocol::Icmp, [10, 0, 0, 2], [10, 0, 0, 1]);
        IcmpHeader::rewrite(&mut frame, ICMP_ECHO_REQUEST, 0, 42, 1, 8 + 4);
        frame
    }

    #[test]
    fn echo_request_produces_a_validating_echo_reply() {
        let mut host = RecordingHost::new();
        handle_echo_request(&echo_request_frame(), &iface(), &mut host).unwrap();

        let reply = &host.sent[0].1;
        let ip = Ipv4Header::parse(reply).unwrap();
        let icmp = IcmpHeader::parse(reply).unwrap();
        assert_eq!(ip.source, [10, 0, 0, 1]);
        assert_eq!(ip.destination, [10, 0, 0, 2]);
        assert_eq!(icmp.icmp_type, ICMP_ECHO_REPLY);
        assert_eq!(icmp.identifier, 42);
        assert_eq!(icmp.sequence, 1);

        let ip_bytes = &reply[IPV4_OFFSET..IPV4_OFFSET + IPV4_HDR_LEN];
        assert_eq!(crate::checksum::checksum(ip_bytes), 0);
        let icmp_bytes = &reply[ICMP_OFFSET..];
        assert_eq!(crate::checksum::checksum(icmp_bytes), 0);
    }

    fn set_total_length(frame: &mut [u8], total_length: u16) {
        frame[IPV4_OFFSET + 2..IPV4_OFFSET + 4].copy_from_slice(&total_length.to_be_bytes());
    }

    #[test]
    fn echo_request_with_inflated_total_length_does_not_panic() {
        let mut frame = echo_request_frame();
        // `total_length` claims a much larger datagram than the buffer
        // actually holds; this must be clamped, not trusted.
        set_total_length(&mut frame, 1000);

        let mut host = RecordingHost::new();
        handle_echo_request(&frame, &iface(), &mut host).unwrap();

        let reply = &host.sent[0].1;
        assert_eq!(reply.len(), frame.len());
        let icmp_bytes = &reply[ICMP_OFFSET..];
        assert_eq!(crate::checksum::checksum(icmp_bytes), 0);
    }

    #[test]
    fn echo_request_with_total_length_shorter_than_icmp_header_does_not_panic() {
        let mut frame = echo_request_frame();
        // `total_length` claims the datagram ends before the ICMP header
        // even starts; the checksum span must still cover the real header.
        set_total_length(&mut frame, IPV4_HDR_LEN as u16);

        let mut host = RecordingHost::new();
        handle_echo_request(&frame, &iface(), &mut host).unwrap();

        assert_eq!(host.sent.len(), 1);
    }

    #[test]
    fn host_unreachable_is_seventy_bytes_with_embedded_header() {
        let mut host = RecordingHost::new();
        let offending = echo_request_frame();
        send_host_unreachable(&offending, &iface(), [10, 0, 0, 99], &mut host);

        let sent = &host.sent[0].1;
        assert_eq!(sent.len(), ETHERNET_HDR_LEN + IPV4_HDR_LEN + ICMP_HDR_LEN + IPV4_HDR_LEN + 8);
        let icmp = IcmpHeader::parse(sent).unwrap();
        assert_eq!(icmp.icmp_type, 3);
        assert_eq!(icmp.code, ICMP_CODE_HOST_UNREACHABLE);
    }

    #[test]
    fn build_unreachable_never_panics_on_a_short_frame() {
        let frame = vec![0u8; IPV4_OFFSET + 4];
        let built = build_unreachable(&frame, ICMP_CODE_PORT_UNREACHABLE, &iface(), [1, 1, 1, 1], [2; 6]);
        assert_eq!(built.len(), ETHERNET_HDR_LEN + IPV4_HDR_LEN + ICMP_HDR_LEN + 4);
    }
}
