//! ARP for IPv4-over-Ethernet: 28-byte header starting at offset 14
//! (spec §4.6). `hardware type = 1`, `protocol type = 0x0800`, `hln = 6`,
//! `pln = 4`.

use crate::error::RouterError;
use crate::types::{Ipv4Address, MacAddress};

use super::{require_len, ARP_HDR_LEN};

pub const ARPHRD_ETHER: u16 = 1;
pub const ARP_PROTO_IPV4: u16 = 0x0800;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArpOperation {
    Request,
    Reply,
}

impl From<u16> for ArpOperation {
    fn from(value: u16) -> Self {
        match value {
            2 => ArpOperation::Reply,
            _ => ArpOperation::Request,
        }
    }
}

impl From<ArpOperation> for u16 {
    fn from(value: ArpOperation) -> Self {
        match value {
            ArpOperation::Request => 1,
            ArpOperation::Reply => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArpHeader {
    pub hardware_type: u16,
    pub protocol_type: u16,
    pub hardware_len: u8,
    pub protocol_len: u8,
    pub operation: ArpOperation,
    pub sender_mac: MacAddress,
    pub sender_ip: Ipv4Address,
    pub target_mac: MacAddress,
    pub target_ip: Ipv4Address,
}

impl ArpHeader {
    /// Parses the 28-byte ARP header starting at `frame[14..]`.
    pub fn parse(frame: &[u8]) -> Result<Self, RouterError> {
        require_len(frame, super::ARP_OFFSET + ARP_HDR_LEN)?;
        let buf = &frame[super::ARP_OFFSET..super::ARP_OFFSET + ARP_HDR_LEN];

        Ok(Self {
            hardware_type: u16::from_be_bytes([buf[0], buf[1]]),
            protocol_type: u16::from_be_bytes([buf[2], buf[3]]),
            hardware_len: buf[4],
            protocol_len: buf[5],
            operation: u16::from_be_bytes([buf[6], buf[7]]).into(),
            sender_mac: buf[8..14].try_into().unwrap(),
            sender_ip: buf[14..18].try_into().unwrap(),
            target_mac: buf[18..24].try_into().unwrap(),
            target_ip: buf[24..28].try_into().unwrap(),
        })
    }

    /// Writes a fully-formed ARP-for-Ethernet/IPv4 header into
    /// `frame[14..42]`. `frame` must already be at least 42 bytes.
    #[allow(clippy::too_many_arguments)]
    pub fn write(
        frame: &mut [u8],
        operation: ArpOperation,
        sender_mac: MacAddress,
        sender_ip: Ipv4Address,
        target_mac: MacAddress,
        target_ip: Ipv4Address,
    ) {
        let buf = &mut frame[super::ARP_OFFSET..super::ARP_OFFSET + ARP_HDR_LEN];
        buf[0..2].copy_from_slice(&ARPHRD_ETHER.to_be_bytes());
        buf[2..4].copy_from_slice(&ARP_PROTO_IPV4.to_be_bytes());
        buf[4] = 6;
        buf[5] = 4;
        buf[6..8].copy_from_slice(&u16::from(operation).to_be_bytes());
        buf[8..14].copy_from_slice(&sender_mac);
        buf[14..18].copy_from_slice(&sender_ip);
        buf[18..24].copy_from_slice(&target_mac);
        buf[24..28].copy_from_slice(&target_ip);
    }
}
