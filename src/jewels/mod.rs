//! Jewel-assignment sub-solver: given a residual socket budget, enumerate
//! the distinct skill-point signatures reachable by filling some subset of
//! those sockets with jewels.
//!
//! Grounded in `HoleClient`/`JewelSolver` as used throughout
//! `armor_up.h`'s `JewelFilterIterator::Proceed` (`hole_client_.GetResidual`,
//! `hole_client_.Query(...)`), reworked here as a struct owning its own
//! memoization table rather than a global singleton. `GetResidual` there
//! reports four counts out-parameter style (`one, two, three, extra`), the
//! fourth tracking body-only holes apart from the other three sizes — this
//! is why `candidates`/`residual` below take the body and non-body socket
//! budgets as two separate tuples rather than one aggregate, instead of
//! folding a body socket count into the same three size buckets as
//! everyone else's sockets.

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::catalog::{Catalog, Jewel};
use crate::signature::Signature;
use crate::SkillId;

type MemoKey = (u32, u32, u32, u32, u32, u32, u32, u64);

/// Enumerates jewel-key signatures and caches them per distinct
/// `(other c1, c2, c3, body c1, c2, c3, multiplier, active-skill-fingerprint)`
/// tuple, since the same residual socket budget recurs constantly across
/// OR-nodes that happen to share a signature.
pub struct HoleClient<'c> {
    catalog: &'c Catalog,
    memo: HashMap<MemoKey, Vec<Signature>>,
}

impl<'c> HoleClient<'c> {
    pub fn new(catalog: &'c Catalog) -> Self {
        Self {
            catalog,
            memo: HashMap::new(),
        }
    }

    /// Sockets still open after `used` have been spent out of `available`.
    /// Saturating: a caller never subtracts more than what's available,
    /// but defends against it rather than panicking (this sits on the
    /// pipeline's hot path, not a programming-error boundary).
    pub fn residual(available: (u32, u32, u32), used: (u32, u32, u32)) -> (u32, u32, u32) {
        (
            available.0.saturating_sub(used.0),
            available.1.saturating_sub(used.1),
            available.2.saturating_sub(used.2),
        )
    }

    /// Every distinct signature reachable by placing zero or more jewels
    /// into `other_sockets` (scaled ×1, the head/hands/waist/feet/amulet
    /// budget) and `body_sockets` (scaled ×`multiplier`, the body piece's
    /// own budget — `armor_up.h`'s `body_holes`), where jewels are drawn
    /// only from those touching one of `active_skills` (jewels touching
    /// none of the currently-tracked skills are indistinguishable from
    /// empty sockets and would only inflate the candidate set).
    pub fn candidates(
        &mut self,
        other_sockets: (u32, u32, u32),
        body_sockets: (u32, u32, u32),
        multiplier: u32,
        active_skills: &[SkillId],
    ) -> &[Signature] {
        let key = (
            other_sockets.0,
            other_sockets.1,
            other_sockets.2,
            body_sockets.0,
            body_sockets.1,
            body_sockets.2,
            multiplier,
            fingerprint(active_skills),
        );
        if !self.memo.contains_key(&key) {
            let relevant: Vec<&Jewel> = self
                .catalog
                .jewels()
                .iter()
                .filter(|j| j.effects.iter().any(|e| active_skills.contains(&e.skill_id)))
                .collect();
            // Scale is per slot, not per call: a body socket's jewel
            // contributes at `multiplier`, everyone else's at 1 (matching
            // `JewelPlacementPlan::build`'s `scale` and `armor_up.h`'s
            // `body_holes`-vs-`one/two/three` split).
            let mut slots: Vec<(u8, crate::Points)> = Vec::new();
            slots.extend(std::iter::repeat((3u8, multiplier as crate::Points)).take(body_sockets.2 as usize));
            slots.extend(std::iter::repeat((2u8, multiplier as crate::Points)).take(body_sockets.1 as usize));
            slots.extend(std::iter::repeat((1u8, multiplier as crate::Points)).take(body_sockets.0 as usize));
            slots.extend(std::iter::repeat((3u8, 1)).take(other_sockets.2 as usize));
            slots.extend(std::iter::repeat((2u8, 1)).take(other_sockets.1 as usize));
            slots.extend(std::iter::repeat((1u8, 1)).take(other_sockets.0 as usize));

            // BTreeSet, not HashSet: `found`'s iteration order becomes this
            // call's `Vec<Signature>` order, which feeds straight into
            // `TreeRoot::jewel_keys` and then `ArmorSet` stream order — that
            // has to be deterministic across runs (spec.md §8).
            let mut found = std::collections::BTreeSet::new();
            enumerate(&slots, &relevant, active_skills, Signature::empty(), &mut found);
            self.memo.insert(key, found.into_iter().collect());
        }
        &self.memo[&key]
    }
}

fn fingerprint(active_skills: &[SkillId]) -> u64 {
    let mut sorted = active_skills.to_vec();
    sorted.sort_unstable();
    let mut hasher = DefaultHasher::new();
    sorted.hash(&mut hasher);
    hasher.finish()
}

/// Depth-first enumeration over socket slots: at each slot, either leave
/// it empty or fill it with any relevant jewel whose size fits, folding
/// the jewel's effects (restricted to `active_skills`, at the slot index
/// matching each skill's position, scaled by that slot's own `scale`)
/// into `acc`.
fn enumerate(
    slots: &[(u8, crate::Points)],
    relevant: &[&Jewel],
    active_skills: &[SkillId],
    acc: Signature,
    found: &mut std::collections::BTreeSet<Signature>,
) {
    let Some((&(slot_size, scale), rest)) = slots.split_first() else {
        found.insert(acc);
        return;
    };
    enumerate(rest, relevant, active_skills, acc, found);
    for jewel in relevant {
        if jewel.size > slot_size {
            continue;
        }
        let mut next = acc;
        for effect in &jewel.effects {
            if let Some(slot) = active_skills.iter().position(|&s| s == effect.skill_id) {
                next = next.add_points(slot, effect.points * scale);
            }
        }
        enumerate(rest, relevant, active_skills, next, found);
    }
}
