//! Expansion iterator (spec.md §4.3.4): turns the merged AND/OR DAG a
//! `TreeRoot` still stands for into concrete [`ArmorSet`]s, one per leaf
//! armor-piece tuple crossed with one per surviving jewel-key.
//!
//! Grounded in `ExpansionIterator::Proceed` in
//! `examples/original_source/cpp/core/armor_up.h`, which walks the same
//! AND/OR structure depth-first. The cache here is keyed by raw `OrId`
//! index and lives for the whole iterator, so a sub-DAG shared by several
//! `TreeRoot`s (common once the body slot's refactor step collapses many
//! non-body combinations onto the same signature) is only expanded once.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::pipeline::{ArmorSet, TreeRoot};
use crate::pool::{NodePool, OrId, OrKind};
use crate::signature::Signature;
use crate::ArmorId;

pub struct Expansion<I> {
    base: I,
    pool: Rc<RefCell<NodePool>>,
    cache: HashMap<usize, Rc<Vec<Vec<ArmorId>>>>,
    buffer: Vec<ArmorSet>,
}

impl<I> Expansion<I> {
    pub fn new(base: I, pool: Rc<RefCell<NodePool>>) -> Self {
        Self { base, pool, cache: HashMap::new(), buffer: Vec::new() }
    }

    /// All concrete 6-piece id tuples (`ArmorPart::ALL` order) this
    /// OR-node's alternatives reduce to, memoized by `OrId` index.
    fn expand_or(&mut self, id: OrId) -> Rc<Vec<Vec<ArmorId>>> {
        if let Some(cached) = self.cache.get(&id.0) {
            return cached.clone();
        }
        let kind = {
            let pool = self.pool.borrow();
            pool.or(id).expect("DAG node id is always valid").kind.clone()
        };
        let combos = match kind {
            OrKind::Armors(ids) => ids.iter().map(|&a| vec![a]).collect(),
            OrKind::Ands(ands) => {
                let mut out = Vec::new();
                for and_id in ands {
                    let and_node = {
                        let pool = self.pool.borrow();
                        *pool.and(and_id).expect("DAG node id is always valid")
                    };
                    let lefts = self.expand_or(and_node.left);
                    let rights = self.expand_or(and_node.right);
                    for l in lefts.iter() {
                        for r in rights.iter() {
                            let mut combo = l.clone();
                            combo.extend_from_slice(r);
                            out.push(combo);
                        }
                    }
                }
                out
            }
        };
        let combos = Rc::new(combos);
        self.cache.insert(id.0, combos.clone());
        combos
    }
}

impl<I: Iterator<Item = TreeRoot>> Iterator for Expansion<I> {
    type Item = ArmorSet;

    fn next(&mut self) -> Option<ArmorSet> {
        loop {
            if let Some(set) = self.buffer.pop() {
                return Some(set);
            }
            let root = self.base.next()?;
            let combos = self.expand_or(root.id);
            // An empty `jewel_keys` here means no jewel stage ever ran
            // (the query tracked zero skills) rather than "every jewel
            // combination failed" — JewelFilter/SkillSplit always drop a
            // root outright once its own survivors run dry.
            let jewel_keys: &[Signature] =
                if root.jewel_keys.is_empty() { &[Signature::empty()] } else { &root.jewel_keys };
            for combo in combos.iter() {
                for &jewel_key in jewel_keys {
                    self.buffer.push(ArmorSet {
                        head: combo[0],
                        hands: combo[1],
                        waist: combo[2],
                        feet: combo[3],
                        body: combo[4],
                        amulet: combo[5],
                        jewel_key,
                        base_index: root.id.0,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_armors_node_yields_one_set_per_piece() {
        let mut pool = NodePool::new();
        let id = pool.make_or_armors(Signature::empty(), vec![1, 2, 3, 4, 5, 6]);
        let pool = Rc::new(RefCell::new(pool));
        let roots = vec![TreeRoot { id, torso_multiplier: 1, body_sockets: (0, 0, 0), jewel_keys: vec![Signature::empty()] }];
        let sets: Vec<_> = Expansion::new(roots.into_iter(), pool).collect();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].amulet, 6);
    }

    #[test]
    fn and_node_cross_product_and_shared_subtree_reuse() {
        let mut pool = NodePool::new();
        let head = pool.make_or_armors(Signature::empty(), vec![1, 2]);
        let rest = pool.make_or_armors(Signature::empty(), vec![10, 20, 30, 40, 50]);
        let and1 = pool.make_and(head, rest);
        let top = pool.make_or_ands(Signature::empty(), vec![and1]);
        let pool = Rc::new(RefCell::new(pool));
        let roots = vec![
            TreeRoot { id: top, torso_multiplier: 1, body_sockets: (0, 0, 0), jewel_keys: vec![Signature::empty()] },
            TreeRoot { id: top, torso_multiplier: 1, body_sockets: (0, 0, 0), jewel_keys: vec![Signature::empty()] },
        ];
        let sets: Vec<_> = Expansion::new(roots.into_iter(), pool).collect();
        // 2 heads * 1 rest-combo, duplicated across the two identical roots.
        assert_eq!(sets.len(), 4);
    }

    #[test]
    fn empty_jewel_keys_falls_back_to_no_jewels() {
        let mut pool = NodePool::new();
        let id = pool.make_or_armors(Signature::empty(), vec![1, 2, 3, 4, 5, 6]);
        let pool = Rc::new(RefCell::new(pool));
        let roots = vec![TreeRoot { id, torso_multiplier: 1, body_sockets: (0, 0, 0), jewel_keys: Vec::new() }];
        let sets: Vec<_> = Expansion::new(roots.into_iter(), pool).collect();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].jewel_key, Signature::empty());
    }
}
