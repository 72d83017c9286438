//! Skill-split iterator (spec.md §4.3.3): for each query skill beyond the
//! foundation's tracked pair, refines an OR-node's alternatives by their
//! exact contribution to that one skill, carrying jewel-key candidates
//! forward into the finer-grained sub-OR-nodes.
//!
//! Grounded in `SkillSplitIterator::Proceed` in
//! `examples/original_source/cpp/core/armor_up.h`.

use std::cell::RefCell;
use std::rc::Rc;

use crate::catalog::Catalog;
use crate::jewels::HoleClient;
use crate::pipeline::TreeRoot;
use crate::pool::NodePool;
use crate::query::Effect;
use crate::signature::Signature;
use crate::split::SkillSplitter;
use crate::{Points, SkillId};

pub struct SkillSplit<'c, I> {
    base: I,
    pool: Rc<RefCell<NodePool>>,
    catalog: &'c Catalog,
    splitter: SkillSplitter,
    hole_client: HoleClient<'c>,
    skill: SkillId,
    slot: usize,
    required_points: Points,
    active_skills: Vec<SkillId>,
    inverse_key: Signature,
    buffer: Vec<TreeRoot>,
}

impl<'c, I> SkillSplit<'c, I> {
    /// `stage` is also the signature slot this skill occupies: the
    /// foundation owns slots `0..FOUNDATION_NUM`, and every later stage
    /// claims the next slot in order, so `stage == slot` for any query
    /// with at most [`crate::signature::MAX_TRACKED_SKILLS`] effects.
    pub fn new(base: I, pool: Rc<RefCell<NodePool>>, catalog: &'c Catalog, effects: &[Effect], stage: usize) -> Self {
        let prefix = &effects[..=stage];
        let required: Vec<_> = prefix.iter().map(|e| e.min_points).collect();
        Self {
            base,
            pool,
            catalog,
            splitter: SkillSplitter::new(),
            hole_client: HoleClient::new(catalog),
            skill: effects[stage].skill_id,
            slot: stage,
            required_points: effects[stage].min_points,
            active_skills: prefix.iter().map(|e| e.skill_id).collect(),
            inverse_key: Signature::inverse_key(&required),
            buffer: Vec::new(),
        }
    }

    /// Pulls roots from `base` until one yields at least one split
    /// sub-root, filling `buffer`, or `base` is exhausted.
    fn advance(&mut self) {
        for root in self.base.by_ref() {
            let node_key = {
                let pool = self.pool.borrow();
                pool.or(root.id).expect("tree root id is always valid").key
            };

            let sub_max = {
                let pool = self.pool.borrow();
                self.splitter
                    .max(&pool, self.catalog, root.id, self.skill, root.torso_multiplier)
                    .expect("tree root id is always valid")
            };
            let key0 = node_key.add_points(self.slot, sub_max);

            let other_total = HoleClient::residual(node_key.sockets(), root.body_sockets);

            let mut jewel_candidates: Vec<Signature> = Vec::new();
            let mut sub_min = Points::MAX;
            for existing in &root.jewel_keys {
                let other_residual = HoleClient::residual(other_total, existing.sockets());
                let body_residual = HoleClient::residual(root.body_sockets, existing.sockets());
                let candidates = self
                    .hole_client
                    .candidates(other_residual, body_residual, root.torso_multiplier, &self.active_skills)
                    .to_vec();
                for jewel_key in candidates {
                    let combined = existing.merge(&jewel_key);
                    if key0.union_jewel(&combined).satisfies(&self.inverse_key) {
                        let diff = self.required_points - combined.get_points(self.slot);
                        sub_min = sub_min.min(diff);
                        jewel_candidates.push(combined);
                    }
                }
            }

            if jewel_candidates.is_empty() {
                continue;
            }

            let new_ors = {
                let mut pool = self.pool.borrow_mut();
                self.splitter
                    .split(&mut pool, self.catalog, root.id, self.skill, self.slot, sub_min, root.torso_multiplier)
                    .expect("tree root id is always valid")
            };

            for (_, or_id) in new_ors {
                let or_key = {
                    let pool = self.pool.borrow();
                    pool.or(or_id).expect("freshly split id is always valid").key
                };
                let surviving: Vec<Signature> = jewel_candidates
                    .iter()
                    .filter(|jewel_key| jewel_key.union_jewel(&or_key).satisfies(&self.inverse_key))
                    .copied()
                    .collect();
                self.buffer.push(TreeRoot {
                    id: or_id,
                    torso_multiplier: root.torso_multiplier,
                    body_sockets: root.body_sockets,
                    jewel_keys: surviving,
                });
            }
            if !self.buffer.is_empty() {
                return;
            }
        }
    }
}

impl<'c, I: Iterator<Item = TreeRoot>> Iterator for SkillSplit<'c, I> {
    type Item = TreeRoot;

    fn next(&mut self) -> Option<TreeRoot> {
        if self.buffer.is_empty() {
            self.advance();
        }
        self.buffer.pop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ArmorPiece, SkillEffect, SkillSystem};
    use crate::pool::NodePool;
    use crate::ArmorPart;

    fn catalog_with(pieces: Vec<ArmorPiece>) -> Catalog {
        let dir = std::env::temp_dir().join(format!(
            "gearsmith-skillsplit-test-{}-{}",
            std::process::id(),
            pieces.len()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("skills.json"),
            serde_json::to_string(&vec![
                SkillSystem { id: 1, name: "a".into(), lowest_positive_points: 1 },
                SkillSystem { id: 2, name: "b".into(), lowest_positive_points: 1 },
            ])
            .unwrap(),
        )
        .unwrap();
        std::fs::write(dir.join("armors.json"), serde_json::to_string(&pieces).unwrap()).unwrap();
        std::fs::write(dir.join("jewels.json"), "[]").unwrap();
        Catalog::load(&dir, 1).unwrap()
    }

    fn piece(id: crate::ArmorId, skill_2_points: i32) -> ArmorPiece {
        ArmorPiece {
            id,
            part: ArmorPart::Head,
            name: format!("p{id}"),
            rare: 1,
            sockets: vec![],
            max_defense: 1,
            effects: vec![SkillEffect { skill_id: 2, points: skill_2_points }],
        }
    }

    #[test]
    fn splits_keep_only_alternatives_meeting_the_new_skill() {
        let catalog = catalog_with(vec![piece(1, 5), piece(2, 1)]);
        let mut pool = NodePool::new();
        // foundation key already tracks slot 0 for skill 1 (empty here), slot
        // reserved at index 1 is this stage's skill 2.
        let key = Signature::new(&[0], (0, 0, 0), 1);
        let id = pool.make_or_armors(key, vec![1, 2]);
        let pool = Rc::new(RefCell::new(pool));
        let roots = vec![TreeRoot {
            id,
            torso_multiplier: 1,
            body_sockets: (0, 0, 0),
            jewel_keys: vec![Signature::empty()],
        }];
        let effects = vec![
            Effect { skill_id: 1, min_points: 0 },
            Effect { skill_id: 2, min_points: 5 },
        ];
        let mut stage = SkillSplit::new(roots.into_iter(), pool, &catalog, &effects, 1);
        let survivors: Vec<_> = std::iter::from_fn(|| stage.next()).collect();
        assert_eq!(survivors.len(), 1);
    }
}
