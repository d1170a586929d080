//! ARP translation cache: fixed-capacity, index-addressed, with per-entry
//! timestamp and validity flag (spec §3, §4.3).
//!
//! A preallocated array of tagged slots replaces the pointer arithmetic of
//! the original `arp.c`'s `arpCache[ARP_CACHE_SIZE]`; a `valid` flag marks a
//! slot free, exactly as the C array did, but indexing is bounds-checked and
//! an insert into a full cache is a `CacheFull` error rather than a write one
//! past the end of the array (spec §9 Open Question 2).

use tracing::{debug, trace};

use crate::clock::Timestamp;
use crate::error::RouterError;
use crate::types::{Ipv4Address, MacAddress};

/// Maximum age, in seconds, of a valid ARP cache entry (spec §3, §4.3).
pub const STALE_TIME: u64 = 15;

/// Number of slots in the ARP cache (spec §3).
pub const ARP_CACHE_SIZE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ArpCacheEntry {
    sender_ip: Ipv4Address,
    sender_mac: MacAddress,
    cached_at: Timestamp,
    valid: bool,
}

impl Default for ArpCacheEntry {
    fn default() -> Self {
        Self {
            sender_ip: [0; 4],
            sender_mac: [0; 6],
            cached_at: 0,
            valid: false,
        }
    }
}

/// A fixed-capacity IPv4-to-MAC translation table with timed invalidation.
#[derive(Debug)]
pub struct ArpCache {
    slots: Box<[ArpCacheEntry; ARP_CACHE_SIZE]>,
}

impl Default for ArpCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ArpCache {
    pub fn new() -> Self {
        Self {
            slots: Box::new([ArpCacheEntry::default(); ARP_CACHE_SIZE]),
        }
    }

    /// Marks every slot older than `STALE_TIME` invalid. Idempotent: a
    /// second call with the same `now` changes nothing further (spec §8).
    pub fn sweep(&mut self, now: Timestamp) {
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if slot.valid && now.saturating_sub(slot.cached_at) > STALE_TIME {
                trace!(slot = i, "ARP cache entry gone stale");
                slot.valid = false;
            }
        }
    }

    /// Inserts `(ip, mac)`, coalescing onto an existing valid slot for the
    /// same IP if one exists (spec §4.3's MAY clause; see SPEC_FULL.md §10
    /// for why this implementation takes the MAY). Otherwise writes the
    /// first free slot. Returns `CacheFull` if none exists — never an
    /// out-of-bounds write (spec §9 Open Question 2).
    pub fn insert(&mut self, ip: Ipv4Address, mac: MacAddress, now: Timestamp) -> Result<(), RouterError> {
        if let Some(slot) = self
            .slots
            .iter_mut()
            .find(|s| s.valid && s.sender_ip == ip)
        {
            slot.sender_mac = mac;
            slot.cached_at = now;
            return Ok(());
        }

        match self.slots.iter_mut().find(|s| !s.valid) {
            Some(slot) => {
                slot.sender_ip = ip;
                slot.sender_mac = mac;
                slot.cached_at = now;
                slot.valid = true;
                debug!(ip = ?ip, mac = ?mac, "ARP cache insert");
                Ok(())
            }
            None => Err(RouterError::CacheFull("ARP")),
        }
    }

    /// Returns the index of the lowest-indexed valid slot whose IP matches
    /// (spec §4.3 tie-breaking rule), for callers that want to hold onto a
    /// handle instead of re-scanning with `lookup`.
    pub fn lookup_index(&self, ip: Ipv4Address) -> Option<usize> {
        self.slots.iter().position(|s| s.valid && s.sender_ip == ip)
    }

    /// Returns the MAC of slot `index` if it is occupied and valid (spec
    /// §4.3 `mac_ref`); used by the drain path alongside `lookup_index` so it
    /// references a specific slot instead of repeating the linear scan.
    pub fn mac_ref(&self, index: usize) -> Option<MacAddress> {
        self.slots.get(index).filter(|s| s.valid).map(|s| s.sender_mac)
    }

    /// Returns the MAC of the lowest-indexed valid slot whose IP matches
    /// (spec §4.3 tie-breaking rule).
    pub fn lookup(&self, ip: Ipv4Address) -> Option<MacAddress> {
        self.lookup_index(ip).and_then(|i| self.mac_ref(i))
    }

    /// Number of currently-valid entries (spec §8: never exceeds `ARP_CACHE_SIZE`).
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.valid).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_lookup_round_trips() {
        let mut cache = ArpCache::new();
        cache.insert([10, 0, 0, 1], [1; 6], 100).unwrap();
        assert_eq!(cache.lookup([10, 0, 0, 1]), Some([1; 6]));
        assert_eq!(cache.lookup([10, 0, 0, 2]), None);
    }

    #[test]
    fn lookup_index_then_mac_ref_matches_lookup() {
        let mut cache = ArpCache::new();
        cache.insert([10, 0, 0, 1], [1; 6], 100).unwrap();

        let index = cache.lookup_index([10, 0, 0, 1]).unwrap();
        assert_eq!(cache.mac_ref(index), Some([1; 6]));
        assert_eq!(cache.lookup_index([10, 0, 0, 2]), None);
    }

    #[test]
    fn mac_ref_is_none_for_an_out_of_range_or_free_index() {
        let cache = ArpCache::new();
        assert_eq!(cache.mac_ref(0), None);
        assert_eq!(cache.mac_ref(ARP_CACHE_SIZE), None);
    }

    #[test]
    fn insert_coalesces_existing_entry_for_same_ip() {
        let mut cache = ArpCache::new();
        cache.insert([10, 0, 0, 1], [1; 6], 100).unwrap();
        cache.insert([10, 0, 0, 1], [2; 6], 110).unwrap();

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.lookup([10, 0, 0, 1]), Some([2; 6]));
    }

    #[test]
    fn sweep_invalidates_entries_older_than_stale_time() {
        let mut cache = ArpCache::new();
        cache.insert([10, 0, 0, 1], [1; 6], 100).unwrap();

        cache.sweep(100 + STALE_TIME);
        assert_eq!(cache.lookup([10, 0, 0, 1]), Some([1; 6]));

        cache.sweep(100 + STALE_TIME + 1);
        assert_eq!(cache.lookup([10, 0, 0, 1]), None);
    }

    #[test]
    fn sweep_is_idempotent() {
        let mut cache = ArpCache::new();
        cache.insert([10, 0, 0, 1], [1; 6], 0).unwrap();
        cache.sweep(1000);
        let len_after_first = cache.len();
        cache.sweep(1000);
        assert_eq!(cache.len(), len_after_first);
        assert_eq!(len_after_first, 0);
    }

    #[test]
    fn insert_fails_when_cache_is_full() {
        let mut cache = ArpCache::new();
        for i in 0..ARP_CACHE_SIZE {
            let ip = [10, 0, (i / 256) as u8, (i % 256) as u8];
            cache.insert(ip, [1; 6], 0).unwrap();
        }

        let result = cache.insert([255, 255, 255, 255], [2; 6], 0);
        assert_eq!(result, Err(RouterError::CacheFull("ARP")));
    }

    #[test]
    fn never_exceeds_capacity_across_many_inserts() {
        let mut cache = ArpCache::new();
        for i in 0..1000u32 {
            let ip = [10, 0, (i / 256) as u8, (i % 256) as u8];
            let _ = cache.insert(ip, [1; 6], 0);
            assert!(cache.len() <= ARP_CACHE_SIZE);
        }
    }
}
