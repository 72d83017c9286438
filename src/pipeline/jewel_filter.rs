//! Jewel-filter iterator (spec.md §4.3.2): applied once per
//! foundation-tracked skill, refining each `TreeRoot`'s `jewel_keys`
//! against the cumulative threshold up to and including this stage.
//!
//! Grounded in `JewelFilterIterator::Proceed` in
//! `examples/original_source/cpp/core/armor_up.h`.

use std::cell::RefCell;
use std::rc::Rc;

use crate::catalog::Catalog;
use crate::jewels::HoleClient;
use crate::pipeline::TreeRoot;
use crate::pool::NodePool;
use crate::query::Effect;
use crate::signature::Signature;
use crate::SkillId;

pub struct JewelFilter<'c, I> {
    base: I,
    pool: Rc<RefCell<NodePool>>,
    hole_client: HoleClient<'c>,
    active_skills: Vec<SkillId>,
    inverse_key: Signature,
}

impl<'c, I> JewelFilter<'c, I> {
    /// `stage` is this skill's position in the already-restrictiveness-
    /// sorted `effects`; `active_skills`/`inverse_key` cover the whole
    /// prefix `effects[..=stage]`, since the foundation signature tracks
    /// both its slots from the very first merge.
    pub fn new(base: I, pool: Rc<RefCell<NodePool>>, catalog: &'c Catalog, effects: &[Effect], stage: usize) -> Self {
        let prefix = &effects[..=stage];
        let active_skills = prefix.iter().map(|e| e.skill_id).collect();
        let required: Vec<_> = prefix.iter().map(|e| e.min_points).collect();
        Self {
            base,
            pool,
            hole_client: HoleClient::new(catalog),
            active_skills,
            inverse_key: Signature::inverse_key(&required),
        }
    }
}

impl<'c, I: Iterator<Item = TreeRoot>> Iterator for JewelFilter<'c, I> {
    type Item = TreeRoot;

    fn next(&mut self) -> Option<TreeRoot> {
        for root in self.base.by_ref() {
            let key = {
                let pool = self.pool.borrow();
                pool.or(root.id).expect("tree root id is always valid").key
            };

            let other_total = HoleClient::residual(key.sockets(), root.body_sockets);

            let mut survivors = Vec::new();
            if root.jewel_keys.is_empty() {
                let candidates = self
                    .hole_client
                    .candidates(other_total, root.body_sockets, root.torso_multiplier, &self.active_skills)
                    .to_vec();
                for jewel_key in candidates {
                    if key.union_jewel(&jewel_key).satisfies(&self.inverse_key) {
                        survivors.push(jewel_key);
                    }
                }
            } else {
                for existing in &root.jewel_keys {
                    let other_residual = HoleClient::residual(other_total, existing.sockets());
                    let body_residual = HoleClient::residual(root.body_sockets, existing.sockets());
                    let key0 = key.union_jewel(existing);
                    let candidates = self
                        .hole_client
                        .candidates(other_residual, body_residual, root.torso_multiplier, &self.active_skills)
                        .to_vec();
                    for jewel_key in candidates {
                        if key0.union_jewel(&jewel_key).satisfies(&self.inverse_key) {
                            survivors.push(existing.merge(&jewel_key));
                        }
                    }
                }
            }

            if !survivors.is_empty() {
                return Some(TreeRoot {
                    id: root.id,
                    torso_multiplier: root.torso_multiplier,
                    body_sockets: root.body_sockets,
                    jewel_keys: survivors,
                });
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ArmorPiece, SkillEffect, SkillSystem};
    use crate::pool::NodePool;
    use crate::query::Effect;
    use crate::ArmorPart;

    fn catalog_with(pieces: Vec<ArmorPiece>, jewels: Vec<crate::catalog::Jewel>) -> Catalog {
        let dir = std::env::temp_dir().join(format!(
            "gearsmith-jewelfilter-test-{}-{}",
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
        std::fs::write(dir.join("jewels.json"), serde_json::to_string(&jewels).unwrap()).unwrap();
        Catalog::load(&dir, 1).unwrap()
    }

    fn piece(id: crate::ArmorId, points: i32, sockets: Vec<u8>) -> ArmorPiece {
        ArmorPiece {
            id,
            part: ArmorPart::Head,
            name: format!("p{id}"),
            rare: 1,
            sockets,
            max_defense: 1,
            effects: vec![SkillEffect { skill_id: 1, points }],
        }
    }

    #[test]
    fn root_survives_when_piece_alone_meets_threshold() {
        let catalog = catalog_with(vec![piece(1, 5, vec![])], vec![]);
        let mut pool = NodePool::new();
        let key = Signature::new(&[5], (0, 0, 0), 1);
        let id = pool.make_or_armors(key, vec![1]);
        let pool = Rc::new(RefCell::new(pool));
        let roots = vec![TreeRoot { id, torso_multiplier: 1, body_sockets: (0, 0, 0), jewel_keys: Vec::new() }];
        let effects = vec![Effect { skill_id: 1, min_points: 5 }];
        let mut filter = JewelFilter::new(roots.into_iter(), pool, &catalog, &effects, 0);
        let surviving = filter.next().unwrap();
        assert_eq!(surviving.jewel_keys.len(), 1);
    }

    #[test]
    fn root_needs_jewel_to_meet_threshold() {
        let jewel = crate::catalog::Jewel {
            id: 1,
            name: "j".into(),
            size: 1,
            effects: vec![SkillEffect { skill_id: 1, points: 1 }],
        };
        let catalog = catalog_with(vec![piece(1, 4, vec![1])], vec![jewel]);
        let mut pool = NodePool::new();
        let key = Signature::new(&[4], (1, 0, 0), 1);
        let id = pool.make_or_armors(key, vec![1]);
        let pool = Rc::new(RefCell::new(pool));
        let roots = vec![TreeRoot { id, torso_multiplier: 1, body_sockets: (0, 0, 0), jewel_keys: Vec::new() }];
        let effects = vec![Effect { skill_id: 1, min_points: 5 }];
        let mut filter = JewelFilter::new(roots.into_iter(), pool, &catalog, &effects, 0);
        let surviving = filter.next().unwrap();
        assert!(surviving.jewel_keys.iter().any(|k| k.get_points(0) == 1));
    }

    #[test]
    fn root_dropped_when_no_jewel_combination_reaches_threshold() {
        let catalog = catalog_with(vec![piece(1, 1, vec![])], vec![]);
        let mut pool = NodePool::new();
        let key = Signature::new(&[1], (0, 0, 0), 1);
        let id = pool.make_or_armors(key, vec![1]);
        let pool = Rc::new(RefCell::new(pool));
        let roots = vec![TreeRoot { id, torso_multiplier: 1, body_sockets: (0, 0, 0), jewel_keys: Vec::new() }];
        let effects = vec![Effect { skill_id: 1, min_points: 5 }];
        let mut filter = JewelFilter::new(roots.into_iter(), pool, &catalog, &effects, 0);
        assert!(filter.next().is_none());
    }
}
