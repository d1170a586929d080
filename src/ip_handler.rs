//! Local-delivery dispatch by IPv4 protocol number (spec §4.1, §4.5),
//! grounded on `sr_router.c`'s `sr_handlepacket` IP-for-us branch.

use crate::config::Interface;
use crate::error::RouterError;
use crate::frame::ethernet::EthernetHeader;
use crate::frame::icmp::ICMP_ECHO_REQUEST;
use crate::frame::ipv4::{Ipv4Header, Ipv4Protocol};
use crate::host::Host;
use crate::icmp_handler;

/// Routes an IPv4 frame addressed to one of our own interfaces to the
/// handler for its protocol: ICMP echo requests get a reply, TCP/UDP get
/// port-unreachable, anything else is silently dropped.
pub fn handle(frame: &[u8], recv_iface: &Interface, host: &mut dyn Host) -> Result<(), RouterError> {
    let ip = Ipv4Header::parse(frame)?;

    match ip.protocol {
        Ipv4Protocol::Icmp => {
            let icmp = crate::frame::icmp::IcmpHeader::parse(frame)?;
            if icmp.icmp_type == ICMP_ECHO_REQUEST {
                icmp_handler::handle_echo_request(frame, recv_iface, host)
            } else {
                tracing::trace!(icmp_type = icmp.icmp_type, "non-echo ICMP addressed to us, dropping");
                Ok(())
            }
        }
        Ipv4Protocol::Tcp | Ipv4Protocol::Udp => {
            let err = RouterError::UnsupportedL4 {
                protocol: ip.protocol.into(),
            };
            tracing::debug!(error = %err, "replying port-unreachable");
            let eth = EthernetHeader::parse(frame)?;
            icmp_handler::send_port_unreachable(frame, recv_iface, &ip, &eth, host)
        }
        Ipv4Protocol::Other(protocol) => {
            tracing::trace!(protocol, "unhandled IP protocol addressed to us, dropping");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::icmp::{IcmpHeader, ICMP_CODE_PORT_UNREACHABLE, ICMP_DEST_UNREACHABLE};
    use crate::frame::{ETHERNET_HDR_LEN, IPV4_HDR_LEN};
    use crate::host::RecordingHost;

    fn iface() -> Interface {
        Interface::new("eth0", [0, 0, 0, 0, 0, 1], [10, 0, 0, 1])
    }

    fn udp_frame_to_us() -> Vec<u8> {
        let total_len = IPV4_HDR_LEN + 8;
        let mut frame = vec![0u8; ETHERNET_HDR_LEN + total_len];
        EthernetHeader::write(&mut frame, [0, 0, 0, 0, 0, 1], [2; 6], crate::frame::EtherType::Ipv4);
        Ipv4Header::write(&mut frame, total_len as u16, 64, Ipv4Protocol::Udp, [10, 0, 0, 2], [10, 0, 0, 1]);
        frame
    }

    #[test]
    fn udp_to_us_gets_port_unreachable() {
        let mut host = RecordingHost::new();
        handle(&udp_frame_to_us(), &iface(), &mut host).unwrap();

        let sent = &host.sent[0].1;
        let icmp = IcmpHeader::parse(sent).unwrap();
        assert_eq!(icmp.icmp_type, ICMP_DEST_UNREACHABLE);
        assert_eq!(icmp.code, ICMP_CODE_PORT_UNREACHABLE);
    }
}
