//! Refines an OR-node's alternatives by their contribution to one
//! additional skill at a time.
//!
//! Grounded in `SkillSplitIterator`'s use of a `SkillSplitter` in
//! `armor_up.h` (`splitter_.Max(...)`, `splitter_.Split(...)`,
//! `sig::AddPoints(node.key, effect_id, sub_max)`): once the foundation's
//! two tracked skill slots are full, every later query effect is folded in
//! by grouping each OR-node's alternatives by exactly how much they
//! contribute to that skill — the same "group by shared signature" idea
//! the foundation itself uses, just applied one skill axis at a time
//! instead of building the whole signature up front.

use std::collections::{BTreeMap, HashMap};

use crate::catalog::Catalog;
use crate::error::Result;
use crate::pool::{AndId, AndNode, NodePool, OrId, OrKind, OrNode};
use crate::{Points, SkillId};

/// Caches `Max`/`Split` results per `(node, skill, composite_multiplier)`
/// for the lifetime of one query. `composite_multiplier` is part of the
/// key, not just `(node, skill)`, because the same sub-OR (a shared
/// non-body forest, say) is reachable from different `TreeRoot`s paired
/// with different body pieces, each carrying a different torso multiplier.
#[derive(Default)]
pub struct SkillSplitter {
    max_or: HashMap<(usize, SkillId, u32), Points>,
    max_and: HashMap<(usize, SkillId, u32), Points>,
    split_or: HashMap<(usize, SkillId, usize, u32), Vec<(Points, OrId)>>,
    split_and: HashMap<(usize, SkillId, usize, u32), Vec<(Points, AndId)>>,
}

/// The scale factor a leaf piece's raw skill contribution is multiplied
/// by: its own torso-up value for a body piece, or the ambient
/// `composite_multiplier` for everyone else. See [`SkillSplitter::max`].
fn scale_for(piece: &crate::catalog::ArmorPiece, composite_multiplier: u32) -> Points {
    if piece.part.is_body() {
        composite_multiplier.saturating_sub(1).max(1) as Points
    } else {
        composite_multiplier as Points
    }
}

impl SkillSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The best achievable contribution to `skill` across every
    /// alternative `or` represents, under `composite_multiplier` — the
    /// `TreeRoot`'s own `torso_multiplier` for this traversal.
    ///
    /// Every leaf's raw point contribution is scaled by
    /// `composite_multiplier`, *except* a body-slot leaf: the body piece's
    /// own contribution is multiplied by its own torso-up value `m`, not
    /// the post-merge `m + 1` (spec.md §3's "the body-piece contribution
    /// is multiplied by `m`"). Since the foundation merge always sets
    /// `composite_multiplier = m + 1` (see `pipeline::foundation::merge`),
    /// `m` is recovered as `composite_multiplier - 1`. A non-body leaf OR
    /// never carries any other armor part mixed in (each leaf is a single
    /// per-part classification group), so `catalog.armor(id).part` is
    /// enough to tell which rule applies.
    pub fn max(
        &mut self,
        pool: &NodePool,
        catalog: &Catalog,
        or: OrId,
        skill: SkillId,
        composite_multiplier: u32,
    ) -> Result<Points> {
        if let Some(&cached) = self.max_or.get(&(or.0, skill, composite_multiplier)) {
            return Ok(cached);
        }
        let node = pool.or(or)?;
        let value = match &node.kind {
            OrKind::Armors(ids) => ids
                .iter()
                .filter_map(|&id| catalog.armor(id))
                .map(|piece| piece.points_for(skill) * scale_for(piece, composite_multiplier))
                .max()
                .unwrap_or(0),
            OrKind::Ands(ands) => {
                let mut best = Points::MIN;
                for &and_id in ands {
                    best = best.max(self.max_and(pool, catalog, and_id, skill, composite_multiplier)?);
                }
                if best == Points::MIN {
                    0
                } else {
                    best
                }
            }
        };
        self.max_or.insert((or.0, skill, composite_multiplier), value);
        Ok(value)
    }

    fn max_and(
        &mut self,
        pool: &NodePool,
        catalog: &Catalog,
        and: AndId,
        skill: SkillId,
        composite_multiplier: u32,
    ) -> Result<Points> {
        if let Some(&cached) = self.max_and.get(&(and.0, skill, composite_multiplier)) {
            return Ok(cached);
        }
        let AndNode { left, right } = *pool.and(and)?;
        let value = self.max(pool, catalog, left, skill, composite_multiplier)?
            + self.max(pool, catalog, right, skill, composite_multiplier)?;
        self.max_and.insert((and.0, skill, composite_multiplier), value);
        Ok(value)
    }

    /// Partitions `or`'s alternatives by their exact contribution to
    /// `skill`, allocating one fresh OR-node per distinct value in `pool`
    /// (its signature equal to `or`'s own key with `value` folded into
    /// tracked slot `slot`). Alternatives contributing less than
    /// `sub_min` are dropped entirely — they can never reach the query's
    /// threshold for this skill even in the best case, so keeping them
    /// would only inflate later stages.
    pub fn split(
        &mut self,
        pool: &mut NodePool,
        catalog: &Catalog,
        or: OrId,
        skill: SkillId,
        slot: usize,
        sub_min: Points,
        composite_multiplier: u32,
    ) -> Result<Vec<(Points, OrId)>> {
        if let Some(cached) = self.split_or.get(&(or.0, skill, slot, composite_multiplier)) {
            return Ok(cached.clone());
        }
        let node = pool.or(or)?.clone();
        let groups = match &node.kind {
            OrKind::Armors(ids) => self.split_armors(pool, catalog, &node, ids, skill, slot, composite_multiplier),
            OrKind::Ands(ands) => {
                self.split_ands(pool, catalog, &node, ands, skill, slot, composite_multiplier)?
            }
        };
        let groups: Vec<(Points, OrId)> = groups.into_iter().filter(|(v, _)| *v >= sub_min).collect();
        self.split_or
            .insert((or.0, skill, slot, composite_multiplier), groups.clone());
        Ok(groups)
    }

    fn split_armors(
        &mut self,
        pool: &mut NodePool,
        catalog: &Catalog,
        node: &OrNode,
        ids: &[crate::ArmorId],
        skill: SkillId,
        slot: usize,
        composite_multiplier: u32,
    ) -> Vec<(Points, OrId)> {
        let mut buckets: BTreeMap<Points, Vec<crate::ArmorId>> = BTreeMap::new();
        for &id in ids {
            if let Some(piece) = catalog.armor(id) {
                let value = piece.points_for(skill) * scale_for(piece, composite_multiplier);
                buckets.entry(value).or_default().push(id);
            }
        }
        buckets
            .into_iter()
            .map(|(value, members)| {
                let key = node.key.add_points(slot, value);
                let id = pool.make_or_armors(key, members);
                (value, id)
            })
            .collect()
    }

    fn split_ands(
        &mut self,
        pool: &mut NodePool,
        catalog: &Catalog,
        node: &OrNode,
        ands: &[AndId],
        skill: SkillId,
        slot: usize,
        composite_multiplier: u32,
    ) -> Result<Vec<(Points, OrId)>> {
        let mut buckets: BTreeMap<Points, Vec<AndId>> = BTreeMap::new();
        for &and_id in ands {
            for (value, new_and) in self.split_and(pool, catalog, and_id, skill, slot, composite_multiplier)? {
                buckets.entry(value).or_default().push(new_and);
            }
        }
        Ok(buckets
            .into_iter()
            .map(|(value, members)| {
                let key = node.key.add_points(slot, value);
                let id = pool.make_or_ands(key, members);
                (value, id)
            })
            .collect())
    }

    fn split_and(
        &mut self,
        pool: &mut NodePool,
        catalog: &Catalog,
        and: AndId,
        skill: SkillId,
        slot: usize,
        composite_multiplier: u32,
    ) -> Result<Vec<(Points, AndId)>> {
        if let Some(cached) = self.split_and.get(&(and.0, skill, slot, composite_multiplier)) {
            return Ok(cached.clone());
        }
        let AndNode { left, right } = *pool.and(and)?;
        let lefts = self.split(pool, catalog, left, skill, slot, Points::MIN, composite_multiplier)?;
        let rights = self.split(pool, catalog, right, skill, slot, Points::MIN, composite_multiplier)?;
        let mut out = Vec::with_capacity(lefts.len() * rights.len());
        for &(lv, l_or) in &lefts {
            for &(rv, r_or) in &rights {
                let new_and = pool.make_and(l_or, r_or);
                out.push((lv + rv, new_and));
            }
        }
        self.split_and
            .insert((and.0, skill, slot, composite_multiplier), out.clone());
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ArmorPiece, SkillEffect, SkillSystem};
    use crate::signature::Signature;
    use crate::ArmorPart;

    fn catalog_with_pieces(pieces: Vec<ArmorPiece>) -> Catalog {
        let dir = std::env::temp_dir().join(format!(
            "gearsmith-split-test-{}-{}",
            std::process::id(),
            pieces.len()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("skills.json"),
            serde_json::to_string(&vec![SkillSystem {
                id: 1,
                name: "s".into(),
                lowest_positive_points: 1,
            }])
            .unwrap(),
        )
        .unwrap();
        std::fs::write(dir.join("armors.json"), serde_json::to_string(&pieces).unwrap()).unwrap();
        std::fs::write(dir.join("jewels.json"), "[]").unwrap();
        Catalog::load(&dir, 1).unwrap()
    }

    fn piece(id: crate::ArmorId, points: i32) -> ArmorPiece {
        ArmorPiece {
            id,
            part: ArmorPart::Head,
            name: format!("p{id}"),
            rare: 1,
            sockets: vec![],
            max_defense: 1,
            effects: vec![SkillEffect {
                skill_id: 1,
                points,
            }],
        }
    }

    #[test]
    fn max_picks_best_leaf_contribution() {
        let catalog = catalog_with_pieces(vec![piece(1, 2), piece(2, 5)]);
        let mut pool = NodePool::new();
        let or = pool.make_or_armors(Signature::empty(), vec![1, 2]);
        let mut splitter = SkillSplitter::new();
        assert_eq!(splitter.max(&pool, &catalog, or, 1, 1).unwrap(), 5);
    }

    #[test]
    fn split_groups_by_exact_contribution() {
        let catalog = catalog_with_pieces(vec![piece(1, 2), piece(2, 5), piece(3, 2)]);
        let mut pool = NodePool::new();
        let or = pool.make_or_armors(Signature::empty(), vec![1, 2, 3]);
        let mut splitter = SkillSplitter::new();
        let groups = splitter
            .split(&mut pool, &catalog, or, 1, 0, Points::MIN, 1)
            .unwrap();
        let mut values: Vec<_> = groups.iter().map(|(v, _)| *v).collect();
        values.sort_unstable();
        assert_eq!(values, vec![2, 5]);
    }

    #[test]
    fn split_drops_alternatives_below_sub_min() {
        let catalog = catalog_with_pieces(vec![piece(1, 2), piece(2, 5)]);
        let mut pool = NodePool::new();
        let or = pool.make_or_armors(Signature::empty(), vec![1, 2]);
        let mut splitter = SkillSplitter::new();
        let groups = splitter.split(&mut pool, &catalog, or, 1, 0, 3, 1).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].0, 5);
    }

    #[test]
    fn max_sums_across_and_node_sides() {
        let catalog = catalog_with_pieces(vec![piece(1, 2), piece(2, 3)]);
        let mut pool = NodePool::new();
        let left = pool.make_or_armors(Signature::empty(), vec![1]);
        let right = pool.make_or_armors(Signature::empty(), vec![2]);
        let and = pool.make_and(left, right);
        let composite = pool.make_or_ands(Signature::empty(), vec![and]);
        let mut splitter = SkillSplitter::new();
        assert_eq!(splitter.max(&pool, &catalog, composite, 1, 1).unwrap(), 5);
    }

    #[test]
    fn body_leaf_scales_by_its_own_torso_value_not_the_composite() {
        let mut body_piece = piece(1, 4);
        body_piece.part = ArmorPart::Body;
        let catalog = catalog_with_pieces(vec![body_piece]);
        let mut pool = NodePool::new();
        let or = pool.make_or_armors(Signature::empty(), vec![1]);
        let mut splitter = SkillSplitter::new();
        // composite_multiplier = m + 1 = 4, so the body leaf's own m is 3.
        assert_eq!(splitter.max(&pool, &catalog, or, 1, 4).unwrap(), 12);
    }
}
