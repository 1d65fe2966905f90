//! Deterministic issuer of opaque tracking ids.
//!
//! Tracking ids must be unguessable to clients (they must not leak ship
//! identity or issue order) yet reproducible for a given scenario seed, so a
//! recorded game replays with identical outbound events.
//!
//! The generator is PCG-XSH-RR (Permuted Congruential Generator): 64-bit LCG
//! state, 32-bit permuted output. Two outputs form one 64-bit id.

use std::collections::HashSet;

use crate::ids::TrackingId;

/// PCG multiplier constant.
const MULTIPLIER: u64 = 6364136223846793005;

/// PCG increment constant.
const INCREMENT: u64 = 1442695040888963407;

#[inline]
fn pcg_step(state: u64) -> u64 {
    state.wrapping_mul(MULTIPLIER).wrapping_add(INCREMENT)
}

/// XSH-RR output permutation.
#[inline]
fn pcg_output(state: u64) -> u32 {
    let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
    let rot = (state >> 59) as u32;
    xorshifted.rotate_right(rot)
}

/// Mixes the scenario seed so nearby seeds start far apart.
fn avalanche(seed: u64) -> u64 {
    let mut hash = seed ^ 0x9e3779b97f4a7c15;
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;
    hash
}

/// Hands out tracking ids that are never repeated within one scenario.
#[derive(Clone, Debug)]
pub struct TrackingIdIssuer {
    state: u64,
    /// Every id handed out so far. Grows by one per ship appearance and is
    /// never pruned, so it is bounded by the number of sightings in a game.
    issued: HashSet<TrackingId>,
}

impl TrackingIdIssuer {
    pub fn new(seed: u64) -> Self {
        Self {
            state: avalanche(seed),
            issued: HashSet::new(),
        }
    }

    fn next_u32(&mut self) -> u32 {
        self.state = pcg_step(self.state);
        pcg_output(self.state)
    }

    /// Returns a fresh id distinct from every id issued before.
    pub fn issue(&mut self) -> TrackingId {
        loop {
            let high = u64::from(self.next_u32());
            let low = u64::from(self.next_u32());
            let id = TrackingId((high << 32) | low);
            if self.issued.insert(id) {
                return id;
            }
        }
    }

    pub fn issued_count(&self) -> usize {
        self.issued.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = TrackingIdIssuer::new(42);
        let mut b = TrackingIdIssuer::new(42);
        for _ in 0..16 {
            assert_eq!(a.issue(), b.issue());
        }
    }

    #[test]
    fn ids_are_unique() {
        let mut issuer = TrackingIdIssuer::new(7);
        let ids: HashSet<_> = (0..1000).map(|_| issuer.issue()).collect();
        assert_eq!(ids.len(), 1000);
        assert_eq!(issuer.issued_count(), 1000);
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = TrackingIdIssuer::new(1);
        let mut b = TrackingIdIssuer::new(2);
        assert_ne!(a.issue(), b.issue());
    }
}
