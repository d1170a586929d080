//! Frame classification (spec §4.1), grounded on `sr_router.c`'s
//! `sr_handlepacket` top-level `if`/`else if` chain.

use crate::config::Interface;
use crate::error::RouterError;
use crate::frame::arp::ArpHeader;
use crate::frame::ethernet::EthernetHeader;
use crate::frame::ipv4::Ipv4Header;
use crate::frame::EtherType;
use crate::types::is_broadcast;

/// What a received frame should be handed to next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Arp,
    Ipv4Local,
    Ipv4Forward,
    Drop,
}

/// Classifies `frame`, received on `recv_iface`, per spec §4.1's ordered
/// rules. Never mutates `frame`; only reads the headers it needs.
pub fn classify(frame: &[u8], recv_iface: &Interface) -> Result<Classification, RouterError> {
    let eth = EthernetHeader::parse(frame)?;

    if is_broadcast(&eth.destination) && eth.ether_type == EtherType::Arp {
        return Ok(Classification::Arp);
    }

    match eth.ether_type {
        EtherType::Arp => {
            let arp = ArpHeader::parse(frame)?;
            if arp.target_ip == recv_iface.ip {
                Ok(Classification::Arp)
            } else {
                Ok(Classification::Drop)
            }
        }
        EtherType::Ipv4 => {
            let ip = Ipv4Header::parse(frame)?;
            if ip.destination == recv_iface.ip {
                Ok(Classification::Ipv4Local)
            } else {
                Ok(Classification::Ipv4Forward)
            }
        }
        EtherType::Other(_) => Ok(Classification::Drop),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::arp::ArpOperation;
    use crate::frame::ipv4::Ipv4Protocol;
    use crate::frame::{ETHERNET_HDR_LEN, IPV4_HDR_LEN};
    use crate::mac_broadcast_addr;

    fn iface() -> Interface {
        Interface::new("eth0", [0, 0, 0, 0, 0, 1], [10, 0, 0, 1])
    }

    #[test]
    fn broadcast_arp_classifies_as_arp() {
        let mut frame = vec![0u8; crate::frame::ARP_OFFSET + crate::frame::ARP_HDR_LEN];
        EthernetHeader::write(&mut frame, mac_broadcast_addr!(), [2; 6], EtherType::Arp);
        ArpHeader::write(&mut frame, ArpOperation::Request, [2; 6], [10, 0, 0, 2], [0; 6], [9, 9, 9, 9]);

        assert_eq!(classify(&frame, &iface()).unwrap(), Classification::Arp);
    }

    #[test]
    fn unicast_arp_reply_targeting_us_classifies_as_arp() {
        let mut frame = vec![0u8; crate::frame::ARP_OFFSET + crate::frame::ARP_HDR_LEN];
        EthernetHeader::write(&mut frame, [0, 0, 0, 0, 0, 1], [2; 6], EtherType::Arp);
        ArpHeader::write(&mut frame, ArpOperation::Reply, [2; 6], [10, 0, 0, 2], [0, 0, 0, 0, 0, 1], [10, 0, 0, 1]);

        assert_eq!(classify(&frame, &iface()).unwrap(), Classification::Arp);
    }

    #[test]
    fn ipv4_to_us_classifies_as_local() {
        let total_len = IPV4_HDR_LEN;
        let mut frame = vec![0u8; ETHERNET_HDR_LEN + total_len];
        EthernetHeader::write(&mut frame, [0, 0, 0, 0, 0, 1], [2; 6], EtherType::Ipv4);
        Ipv4Header::write(&mut frame, total_len as u16, 64, Ipv4Protocol::Icmp, [10, 0, 0, 2], [10, 0, 0, 1]);

        assert_eq!(classify(&frame, &iface()).unwrap(), Classification::Ipv4Local);
    }

    #[test]
    fn ipv4_elsewhere_classifies_as_forward() {
        let total_len = IPV4_HDR_LEN;
        let mut frame = vec![0u8; ETHERNET_HDR_LEN + total_len];
        EthernetHeader::write(&mut frame, [0, 0, 0, 0, 0, 1], [2; 6], EtherType::Ipv4);
        Ipv4Header::write(&mut frame, total_len as u16, 64, Ipv4Protocol::Icmp, [10, 0, 0, 2], [172, 16, 0, 1]);

        assert_eq!(classify(&frame, &iface()).unwrap(), Classification::Ipv4Forward);
    }

    #[test]
    fn unknown_ethertype_is_dropped() {
        let mut frame = vec![0u8; ETHERNET_HDR_LEN];
        EthernetHeader::write(&mut frame, [0, 0, 0, 0, 0, 1], [2; 6], EtherType::Other(0x1234));

        assert_eq!(classify(&frame, &iface()).unwrap(), Classification::Drop);
    }

    #[test]
    fn short_frame_is_malformed() {
        let frame = vec![0u8; 4];
        assert!(classify(&frame, &iface()).is_err());
    }
}
