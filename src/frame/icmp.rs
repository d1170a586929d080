//! ICMP header: 8 bytes at offset 34 (spec §4.6). Types/codes in use:
//! Echo Request (8/0), Echo Reply (0/0), Destination Unreachable (3) with
//! code 1 (host unreachable) or 3 (port unreachable).

use crate::checksum::write_checksum;
use crate::error::RouterError;

use super::{require_len, ICMP_HDR_LEN, ICMP_OFFSET};

pub const ICMP_ECHO_REPLY: u8 = 0;
pub const ICMP_ECHO_REQUEST: u8 = 8;
pub const ICMP_DEST_UNREACHABLE: u8 = 3;
pub const ICMP_CODE_HOST_UNREACHABLE: u8 = 1;
pub const ICMP_CODE_PORT_UNREACHABLE: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IcmpHeader {
    pub icmp_type: u8,
    pub code: u8,
    pub checksum: u16,
    pub identifier: u16,
    pub sequence: u16,
}

impl IcmpHeader {
    /// Parses the 8-byte ICMP header at `frame[34..42]`.
    pub fn parse(frame: &[u8]) -> Result<Self, RouterError> {
        require_len(frame, ICMP_OFFSET + ICMP_HDR_LEN)?;
        let buf = &frame[ICMP_OFFSET..ICMP_OFFSET + ICMP_HDR_LEN];

        Ok(Self {
            icmp_type: buf[0],
            code: buf[1],
            checksum: u16::from_be_bytes([buf[2], buf[3]]),
            identifier: u16::from_be_bytes([buf[4], buf[5]]),
            sequence: u16::from_be_bytes([buf[6], buf[7]]),
        })
    }

    /// Rewrites the type/code/identifier/sequence fields of the ICMP
    /// message occupying `frame[34..icmp_len]` and recomputes the checksum
    /// over that whole span (header plus any trailing payload bytes the
    /// caller has already placed there).
    pub fn rewrite(frame: &mut [u8], icmp_type: u8, code: u8, identifier: u16, sequence: u16, icmp_len: usize) {
        {
            let buf = &mut frame[ICMP_OFFSET..ICMP_OFFSET + ICMP_HDR_LEN];
            buf[0] = icmp_type;
            buf[1] = code;
            buf[4..6].copy_from_slice(&identifier.to_be_bytes());
            buf[6..8].copy_from_slice(&sequence.to_be_bytes());
        }

        write_checksum(&mut frame[ICMP_OFFSET..ICMP_OFFSET + icmp_len], 2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_then_parse_round_trips() {
        let mut frame = vec![0u8; ICMP_OFFSET + ICMP_HDR_LEN];
        IcmpHeader::rewrite(&mut frame, ICMP_ECHO_REPLY, 0, 7, 9, ICMP_HDR_LEN);

        let parsed = IcmpHeader::parse(&frame).unwrap();
        assert_eq!(parsed.icmp_type, ICMP_ECHO_REPLY);
        assert_eq!(parsed.identifier, 7);
        assert_eq!(parsed.sequence, 9);
    }

    #[test]
    fn checksum_covers_trailing_payload() {
        let mut frame = vec![0u8; ICMP_OFFSET + ICMP_HDR_LEN + 16];
        for (i, b) in frame[ICMP_OFFSET + ICMP_HDR_LEN..].iter_mut().enumerate() {
            *b = i as u8;
        }
        IcmpHeader::rewrite(&mut frame, ICMP_ECHO_REPLY, 0, 0, 0, ICMP_HDR_LEN + 16);

        let icmp_len = ICMP_HDR_LEN + 16;
        let body = &frame[ICMP_OFFSET..ICMP_OFFSET + icmp_len];
        assert_eq!(crate::checksum::checksum(body), 0);
    }
}
