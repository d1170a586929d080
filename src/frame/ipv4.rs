//! IPv4 header: 20-byte fixed header at offset 14 (spec §4.6). Frames
//! originated by this router are always version 4, IHL 5 (no options), TOS
//! 0, ID 0, DF set, TTL 64.

use crate::checksum::write_checksum;
use crate::error::RouterError;
use crate::types::Ipv4Address;

use super::{require_len, IPV4_HDR_LEN, IPV4_OFFSET};

pub const DF_FLAG: u16 = 0x4000;
pub const DEFAULT_TTL: u8 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ipv4Protocol {
    Icmp,
    Tcp,
    Udp,
    Other(u8),
}

impl From<u8> for Ipv4Protocol {
    fn from(value: u8) -> Self {
        match value {
            1 => Ipv4Protocol::Icmp,
            6 => Ipv4Protocol::Tcp,
            17 => Ipv4Protocol::Udp,
            other => Ipv4Protocol::Other(other),
        }
    }
}

impl From<Ipv4Protocol> for u8 {
    fn from(value: Ipv4Protocol) -> Self {
        match value {
            Ipv4Protocol::Icmp => 1,
            Ipv4Protocol::Tcp => 6,
            Ipv4Protocol::Udp => 17,
            Ipv4Protocol::Other(v) => v,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4Header {
    pub version_ihl: u8,
    pub tos: u8,
    pub total_length: u16,
    pub id: u16,
    pub flags_fragment_offset: u16,
    pub ttl: u8,
    pub protocol: Ipv4Protocol,
    pub checksum: u16,
    pub source: Ipv4Address,
    pub destination: Ipv4Address,
}

impl Ipv4Header {
    pub fn header_len(&self) -> usize {
        (self.version_ihl & 0x0f) as usize * 4
    }

    /// Parses the fixed 20-byte header at `frame[14..34]`. Options (if
    /// `IHL > 5`) are not read; this router never needs them.
    pub fn parse(frame: &[u8]) -> Result<Self, RouterError> {
        require_len(frame, IPV4_OFFSET + IPV4_HDR_LEN)?;
        let buf = &frame[IPV4_OFFSET..IPV4_OFFSET + IPV4_HDR_LEN];

        Ok(Self {
            version_ihl: buf[0],
            tos: buf[1],
            total_length: u16::from_be_bytes([buf[2], buf[3]]),
            id: u16::from_be_bytes([buf[4], buf[5]]),
            flags_fragment_offset: u16::from_be_bytes([buf[6], buf[7]]),
            ttl: buf[8],
            protocol: buf[9].into(),
            checksum: u16::from_be_bytes([buf[10], buf[11]]),
            source: buf[12..16].try_into().unwrap(),
            destination: buf[16..20].try_into().unwrap(),
        })
    }

    /// Writes a fresh 20-byte IPv4 header (version 4, IHL 5, no options)
    /// into `frame[14..34]` and recomputes its checksum. `total_length` is
    /// the full length of the IPv4 datagram, header included.
    #[allow(clippy::too_many_arguments)]
    pub fn write(
        frame: &mut [u8],
        total_length: u16,
        ttl: u8,
        protocol: Ipv4Protocol,
        source: Ipv4Address,
        destination: Ipv4Address,
    ) {
        let buf = &mut frame[IPV4_OFFSET..IPV4_OFFSET + IPV4_HDR_LEN];
        buf[0] = 0x45;
        buf[1] = 0;
        buf[2..4].copy_from_slice(&total_length.to_be_bytes());
        buf[4..6].copy_from_slice(&0u16.to_be_bytes());
        buf[6..8].copy_from_slice(&DF_FLAG.to_be_bytes());
        buf[8] = ttl;
        buf[9] = protocol.into();
        buf[10..12].copy_from_slice(&[0, 0]);
        buf[12..16].copy_from_slice(&source);
        buf[16..20].copy_from_slice(&destination);

        write_checksum(&mut frame[IPV4_OFFSET..IPV4_OFFSET + IPV4_HDR_LEN], 10);
    }

    /// Rewrites only the source/destination address fields of an existing
    /// header and recomputes its checksum, leaving TTL, ID, and flags as
    /// they were. Used by the ICMP echo-reply path, which mirrors addresses
    /// in place rather than building a fresh header (spec §4.5).
    pub fn patch_addresses(frame: &mut [u8], source: Ipv4Address, destination: Ipv4Address) {
        let buf = &mut frame[IPV4_OFFSET..IPV4_OFFSET + IPV4_HDR_LEN];
        buf[12..16].copy_from_slice(&source);
        buf[16..20].copy_from_slice(&destination);

        write_checksum(&mut frame[IPV4_OFFSET..IPV4_OFFSET + IPV4_HDR_LEN], 10);
    }
}
