//! Reservation pooling by (origin, destination) pair.

use std::collections::BTreeMap;

use uam_core::{EdgeId, PersonId, ReservationId};
use uam_engine::Reservation;

// ── PoolKey ───────────────────────────────────────────────────────────────────

/// Pooling key: reservations travelling the same directed edge pair share a
/// pool entry and, eventually, a taxi.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct PoolKey {
    pub from: EdgeId,
    pub to:   EdgeId,
}

impl PoolKey {
    pub fn new(from: EdgeId, to: EdgeId) -> Self {
        Self { from, to }
    }
}

impl std::fmt::Display for PoolKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}→{}", self.from, self.to)
    }
}

// ── PoolEntry ─────────────────────────────────────────────────────────────────

/// One waiting party.
///
/// `members` and `reservations` are parallel append-only sequences: entry i
/// of each belongs to the same pedestrian.  The equality of their lengths is
/// a structural invariant checked in debug builds on every mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolEntry {
    /// Simulated seconds this party has been waiting.  Ages only via
    /// [`ReservationPool::tick`], never on admission.
    pub waiting_secs: u32,
    /// Waiting pedestrians, in admission order.
    pub members: Vec<PersonId>,
    /// Their reservation ids, parallel to `members`.
    pub reservations: Vec<ReservationId>,
}

impl PoolEntry {
    fn first(person: PersonId, reservation: ReservationId) -> Self {
        Self {
            waiting_secs: 0,
            members:      vec![person],
            reservations: vec![reservation],
        }
    }

    /// Size of the waiting party.
    #[inline]
    pub fn party_size(&self) -> usize {
        debug_assert_eq!(self.members.len(), self.reservations.len());
        self.members.len()
    }
}

// ── ReservationPool ───────────────────────────────────────────────────────────

/// All currently pooled, undispatched parties, keyed by edge pair.
///
/// A `BTreeMap` keeps iteration deterministic, so dispatch evaluation order
/// (and therefore taxi allocation under scarcity) is reproducible.
#[derive(Default)]
pub struct ReservationPool {
    entries: BTreeMap<PoolKey, PoolEntry>,
}

impl ReservationPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Absorb one engine reservation.
    ///
    /// Creates the entry on first sight of the key (waiting time zero),
    /// otherwise appends to the existing party.  Engines issue one
    /// reservation per pedestrian, so only the lead person of the
    /// reservation joins the pool.
    pub fn admit(&mut self, reservation: &Reservation) {
        let Some(&person) = reservation.persons.first() else {
            return;
        };
        let key = PoolKey::new(reservation.from, reservation.to);
        match self.entries.get_mut(&key) {
            None => {
                self.entries.insert(key, PoolEntry::first(person, reservation.id));
            }
            Some(entry) => {
                entry.members.push(person);
                entry.reservations.push(reservation.id);
                debug_assert_eq!(entry.members.len(), entry.reservations.len());
            }
        }
    }

    /// Age every entry by `delta_secs` of simulated time.
    ///
    /// Called exactly once per step, before dispatch evaluation.
    /// `tick(0)` leaves the pool unchanged.
    pub fn tick(&mut self, delta_secs: u32) {
        for entry in self.entries.values_mut() {
            entry.waiting_secs += delta_secs;
        }
    }

    /// Remove and return the entry for `key` — the instant of dispatch.
    pub fn remove(&mut self, key: &PoolKey) -> Option<PoolEntry> {
        self.entries.remove(key)
    }

    pub fn get(&self, key: &PoolKey) -> Option<&PoolEntry> {
        self.entries.get(key)
    }

    /// Entries in deterministic key order.
    pub fn iter(&self) -> impl Iterator<Item = (&PoolKey, &PoolEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total pedestrians waiting across all entries.
    pub fn waiting_count(&self) -> usize {
        self.entries.values().map(PoolEntry::party_size).sum()
    }
}
