//! Defense filter (spec.md §4.3.5): the pipeline's final stage, a plain
//! non-order-preserving rejection of any [`ArmorSet`] whose summed
//! `max_defense` across the five body pieces falls short of the query's
//! minimum.
//!
//! Grounded in `DefenseFilterIterator::Proceed` in
//! `examples/original_source/cpp/core/armor_up.h`.

use crate::catalog::Catalog;
use crate::pipeline::ArmorSet;

pub struct DefenseFilter<'c, I> {
    base: I,
    catalog: &'c Catalog,
    min_defense: i32,
}

impl<'c, I> DefenseFilter<'c, I> {
    pub fn new(base: I, catalog: &'c Catalog, min_defense: i32) -> Self {
        Self { base, catalog, min_defense }
    }

    fn defense_sum(&self, set: &ArmorSet) -> i32 {
        set.pieces()
            .iter()
            .filter_map(|&id| self.catalog.armor(id))
            .map(|piece| piece.max_defense)
            .sum()
    }
}

impl<'c, I: Iterator<Item = ArmorSet>> Iterator for DefenseFilter<'c, I> {
    type Item = ArmorSet;

    fn next(&mut self) -> Option<ArmorSet> {
        for set in self.base.by_ref() {
            if self.defense_sum(&set) >= self.min_defense {
                return Some(set);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ArmorPiece, SkillSystem};
    use crate::signature::Signature;
    use crate::ArmorPart;

    fn catalog_with_defenses(defenses: [i32; 5]) -> Catalog {
        let dir = std::env::temp_dir().join(format!("gearsmith-defense-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("skills.json"),
            serde_json::to_string(&vec![SkillSystem { id: 1, name: "s".into(), lowest_positive_points: 1 }])
                .unwrap(),
        )
        .unwrap();
        let pieces: Vec<ArmorPiece> = ArmorPart::BODY_SLOTS
            .iter()
            .enumerate()
            .map(|(i, &part)| ArmorPiece {
                id: (i + 1) as u32,
                part,
                name: format!("p{i}"),
                rare: 1,
                sockets: vec![],
                max_defense: defenses[i],
                effects: vec![],
            })
            .collect();
        std::fs::write(dir.join("armors.json"), serde_json::to_string(&pieces).unwrap()).unwrap();
        std::fs::write(dir.join("jewels.json"), "[]").unwrap();
        Catalog::load(&dir, 1).unwrap()
    }

    fn set(amulet: u32) -> ArmorSet {
        ArmorSet {
            head: 1,
            hands: 2,
            waist: 3,
            feet: 4,
            body: 5,
            amulet,
            jewel_key: Signature::empty(),
            base_index: 0,
        }
    }

    #[test]
    fn excludes_sets_below_the_minimum() {
        let catalog = catalog_with_defenses([80, 80, 80, 80, 79]);
        let mut filter = DefenseFilter::new(vec![set(0)].into_iter(), &catalog, 400);
        assert!(filter.next().is_none());
    }

    #[test]
    fn includes_sets_meeting_the_minimum() {
        let catalog = catalog_with_defenses([80, 80, 80, 80, 80]);
        let mut filter = DefenseFilter::new(vec![set(0)].into_iter(), &catalog, 400);
        assert!(filter.next().is_some());
    }

    #[test]
    fn zero_minimum_admits_everything() {
        let catalog = catalog_with_defenses([0, 0, 0, 0, 0]);
        let mut filter = DefenseFilter::new(vec![set(0)].into_iter(), &catalog, 0);
        assert!(filter.next().is_some());
    }
}
