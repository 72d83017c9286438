//! Packed fixed-width fingerprint of a partial armor combination.
//!
//! A [`Signature`] is the hash-map key that the foundation and split stages
//! group alternatives by: two armor combinations that produce the same
//! `Signature` are interchangeable for every purpose the search still cares
//! about, which is the entire reason the DAG shares structure instead of
//! enumerating N^5 tuples.
//!
//! Layout, packed into a single `u128` so comparison, hashing and equality
//! are a single machine word's worth of work (two, on 64-bit targets):
//!
//! ```text
//! [ skill slot 9 | ... | skill slot 0 | socket c3 | c2 | c1 | multiplier ]
//!    9 bits each (signed)              6 bits each (u6)     6 bits (u6)
//! ```
//!
//! `MAX_TRACKED_SKILLS` bounds how many query effects can be simultaneously
//! folded into one signature. Realistic queries track a handful of skills;
//! ten slots is generous headroom without paying for an arbitrary-width
//! bitset.

use crate::Points;

/// Number of skill slots a signature can track at once. Indexed by the
/// effect's position in the (already restrictiveness-sorted) query, not by
/// raw skill id.
pub const MAX_TRACKED_SKILLS: usize = 10;

const SKILL_BITS: u32 = 9;
const SKILL_MASK: u128 = (1 << SKILL_BITS) - 1;
const SKILL_BIAS: i32 = 1 << (SKILL_BITS - 1); // 256, recenters signed range

const SOCKET_BITS: u32 = 6;
const SOCKET_MASK: u128 = (1 << SOCKET_BITS) - 1;

const MULT_BITS: u32 = 6;
const MULT_MASK: u128 = (1 << MULT_BITS) - 1;

const MULT_SHIFT: u32 = 0;
const SOCKET_SHIFT: u32 = MULT_SHIFT + MULT_BITS;
const SKILL_SHIFT: u32 = SOCKET_SHIFT + SOCKET_BITS * 3;

/// A packed fingerprint: per-skill points, socket counts, body multiplier.
///
/// `Eq`/`Hash`/`Ord` are derived directly off the packed bits, so grouping
/// alternatives by signature in a `HashMap` is exactly as cheap as grouping
/// by a plain integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Signature(u128);

impl Signature {
    /// The zero signature: no points, no sockets, multiplier 1.
    pub fn empty() -> Self {
        Self(1u128 << MULT_SHIFT)
    }

    /// Builds a signature from explicit skill points, socket counts and a
    /// multiplier. `points[i]` corresponds to tracked skill slot `i`.
    pub fn new(points: &[Points], sockets: (u32, u32, u32), multiplier: u32) -> Self {
        let mut bits: u128 = 0;
        for (i, &p) in points.iter().enumerate() {
            assert!(i < MAX_TRACKED_SKILLS, "signature slot {i} out of range");
            bits |= Self::encode_skill(p) << (SKILL_SHIFT + i as u32 * SKILL_BITS);
        }
        bits |= (sockets.0 as u128 & SOCKET_MASK) << SOCKET_SHIFT;
        bits |= (sockets.1 as u128 & SOCKET_MASK) << (SOCKET_SHIFT + SOCKET_BITS);
        bits |= (sockets.2 as u128 & SOCKET_MASK) << (SOCKET_SHIFT + SOCKET_BITS * 2);
        bits |= (multiplier as u128 & MULT_MASK) << MULT_SHIFT;
        Self(bits)
    }

    fn encode_skill(p: Points) -> u128 {
        let clamped = p.clamp(-SKILL_BIAS, SKILL_BIAS - 1);
        ((clamped + SKILL_BIAS) as u128) & SKILL_MASK
    }

    fn decode_skill(raw: u128) -> Points {
        (raw as i32) - SKILL_BIAS
    }

    /// Points currently tracked at skill slot `i`.
    pub fn get_points(&self, slot: usize) -> Points {
        let raw = (self.0 >> (SKILL_SHIFT + slot as u32 * SKILL_BITS)) & SKILL_MASK;
        Self::decode_skill(raw)
    }

    /// Returns a copy with `slot` incremented by `delta` points.
    pub fn add_points(&self, slot: usize, delta: Points) -> Self {
        let current = self.get_points(slot);
        let shift = SKILL_SHIFT + slot as u32 * SKILL_BITS;
        let cleared = self.0 & !(SKILL_MASK << shift);
        Self(cleared | (Self::encode_skill(current + delta) << shift))
    }

    /// Socket counts `(size-1, size-2, size-3)` currently available, summed
    /// across every piece folded in so far — this alone can't say how many
    /// of them are the body piece's own; callers that need that split track
    /// it separately (see `TreeRoot::body_sockets`).
    pub fn sockets(&self) -> (u32, u32, u32) {
        let one = (self.0 >> SOCKET_SHIFT) & SOCKET_MASK;
        let two = (self.0 >> (SOCKET_SHIFT + SOCKET_BITS)) & SOCKET_MASK;
        let three = (self.0 >> (SOCKET_SHIFT + SOCKET_BITS * 2)) & SOCKET_MASK;
        (one as u32, two as u32, three as u32)
    }

    /// The body-torso multiplier, always >= 1.
    pub fn multiplier(&self) -> u32 {
        ((self.0 >> MULT_SHIFT) & MULT_MASK) as u32
    }

    /// Skill-wise and socket-wise add. The multiplier of the result is the
    /// larger of the two operands': exactly one side ever carries a
    /// non-default multiplier in any call site this engine has (the
    /// torso-up piece, post [`Signature::body_refactor`]), so `max` picks
    /// it up without either side needing to know which one that is.
    pub fn merge(&self, other: &Self) -> Self {
        let mut points = [0 as Points; MAX_TRACKED_SKILLS];
        for (i, slot) in points.iter_mut().enumerate() {
            *slot = self.get_points(i) + other.get_points(i);
        }
        let (a1, a2, a3) = self.sockets();
        let (b1, b2, b3) = other.sockets();
        let multiplier = self.multiplier().max(other.multiplier());
        Self::new(&points, (a1 + b1, a2 + b2, a3 + b3), multiplier)
    }

    /// Rewrites this signature as if every currently-tracked skill point
    /// had accrued under `new_multiplier` instead of the baseline. Used
    /// exactly once per armor-set merge: on the accumulated non-body
    /// signature, right before folding in the body piece's own
    /// contribution (see [`crate::pipeline::foundation`]).
    ///
    /// `body_refactor(s, 1)` is the identity for any `s` built with the
    /// default multiplier of 1 — the only shape this engine ever calls it
    /// on, since the non-body accumulation never carries a multiplier
    /// other than 1 before this call.
    pub fn body_refactor(&self, new_multiplier: u32) -> Self {
        let mut points = [0 as Points; MAX_TRACKED_SKILLS];
        for (i, slot) in points.iter_mut().enumerate() {
            *slot = self.get_points(i) * new_multiplier as Points;
        }
        Self::new(&points, self.sockets(), new_multiplier)
    }

    /// Adds a size-`size` jewel's contribution in: used when folding a
    /// candidate jewel-key signature into an armor signature to test
    /// satisfaction (`key | jewel_key` in spec.md's notation).
    pub fn union_jewel(&self, jewel: &Self) -> Self {
        self.merge(jewel)
    }

    /// `Satisfy`: true when every tracked skill slot in `self` meets or
    /// exceeds the corresponding threshold encoded in `inverse_key`.
    pub fn satisfies(&self, inverse_key: &Signature) -> bool {
        (0..MAX_TRACKED_SKILLS).all(|i| self.get_points(i) >= inverse_key.get_points(i))
    }

    /// Builds an "inverse key" — a signature whose skill slots hold the
    /// cumulative minimum-points thresholds for a prefix of query effects.
    /// Socket/multiplier fields are irrelevant for an inverse key and left
    /// at zero.
    pub fn inverse_key(required: &[Points]) -> Self {
        let mut points = [0 as Points; MAX_TRACKED_SKILLS];
        for (i, &r) in required.iter().enumerate() {
            points[i] = r;
        }
        Self::new(&points, (0, 0, 0), 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_points_zero_is_identity() {
        let s = Signature::new(&[3, -2], (1, 2, 3), 4);
        assert_eq!(s.add_points(0, 0), s);
        assert_eq!(s.add_points(1, 0), s);
    }

    #[test]
    fn body_refactor_one_is_identity_at_baseline() {
        let s = Signature::new(&[3, -2, 0], (1, 0, 2), 1);
        assert_eq!(s.body_refactor(1), s);
    }

    #[test]
    fn get_points_after_add_points_round_trips() {
        let s = Signature::empty();
        let s2 = s.add_points(2, 7);
        assert_eq!(s2.get_points(2), s.get_points(2) + 7);
    }

    #[test]
    fn negative_points_round_trip() {
        let s = Signature::new(&[-5], (0, 0, 0), 1);
        assert_eq!(s.get_points(0), -5);
    }

    #[test]
    fn merge_adds_sockets_and_points() {
        let a = Signature::new(&[1, 2], (1, 0, 0), 1);
        let b = Signature::new(&[3, -1], (0, 1, 0), 1);
        let c = a.merge(&b);
        assert_eq!(c.get_points(0), 4);
        assert_eq!(c.get_points(1), 1);
        assert_eq!(c.sockets(), (1, 1, 0));
    }

    #[test]
    fn merge_multiplier_takes_the_larger() {
        let a = Signature::new(&[0], (0, 0, 0), 1);
        let b = Signature::new(&[0], (0, 0, 0), 4);
        assert_eq!(a.merge(&b).multiplier(), 4);
        assert_eq!(b.merge(&a).multiplier(), 4);
    }

    #[test]
    fn body_refactor_scales_tracked_points() {
        let accumulated = Signature::new(&[8, 2], (0, 0, 0), 1);
        let refactored = accumulated.body_refactor(4);
        assert_eq!(refactored.get_points(0), 32);
        assert_eq!(refactored.get_points(1), 8);
        assert_eq!(refactored.multiplier(), 4);
    }

    #[test]
    fn satisfy_checks_every_tracked_slot() {
        let inverse = Signature::inverse_key(&[5, 3]);
        let short = Signature::new(&[5, 2], (0, 0, 0), 1);
        let exact = Signature::new(&[5, 3], (0, 0, 0), 1);
        assert!(!short.satisfies(&inverse));
        assert!(exact.satisfies(&inverse));
    }
}
