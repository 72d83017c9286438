//! Formatter-side jewel placement (spec.md §4.4's "final packing", SPEC_FULL
//! §4.4): reconstructs *a* concrete per-piece jewel assignment consistent
//! with a surviving [`ArmorSet`], for display purposes only.
//!
//! The core never records which concrete jewels produced a surviving
//! `jewel_key` — only the aggregate signature. This greedily re-derives one
//! assignment by recomputing each query skill's armor-only shortfall
//! straight from the catalog (recomputing the body piece's own torso-up
//! multiplier along the way) and filling sockets, largest first, with
//! whichever still-useful jewel best plugs a remaining shortfall. This is
//! always *a* valid assignment, not necessarily the one the core's jewel
//! sub-solver found, because the surviving `jewel_key` already proves one
//! exists — the packing step is the same "realize, don't search" collaborator
//! described in `examples/original_source/cpp/utils/formatter.h`'s
//! `ArmorResult`/`JewelPlan`.

use std::collections::HashMap;

use crate::catalog::Catalog;
use crate::pipeline::ArmorSet;
use crate::query::Query;
use crate::{ArmorPart, JewelId, Points, SkillId};

/// One body slot's chosen jewels, in socket-fill order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PiecePlacement {
    pub part: ArmorPart,
    pub jewel_ids: Vec<JewelId>,
}

/// A complete per-piece jewel assignment for one [`ArmorSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JewelPlacementPlan {
    pub per_piece: Vec<PiecePlacement>,
}

impl JewelPlacementPlan {
    /// Builds the plan for `set` against `query`'s effects, drawing only
    /// from jewels `query.jewel_filter` admits.
    pub fn build(catalog: &Catalog, query: &Query, set: &ArmorSet) -> Self {
        let multiplier = torso_multiplier(catalog, set.body);
        let mut deficits = armor_only_deficits(catalog, query, set, multiplier);

        let mut per_piece = Vec::with_capacity(ArmorPart::BODY_SLOTS.len());
        for part in ArmorPart::BODY_SLOTS {
            let piece_id = match part {
                ArmorPart::Head => set.head,
                ArmorPart::Hands => set.hands,
                ArmorPart::Waist => set.waist,
                ArmorPart::Feet => set.feet,
                ArmorPart::Body => set.body,
                ArmorPart::Amulet => unreachable!("BODY_SLOTS excludes the amulet"),
            };
            let scale = if part.is_body() { multiplier as Points } else { 1 };
            let sockets = catalog.armor(piece_id).map(|p| p.sockets.clone()).unwrap_or_default();
            per_piece.push(PiecePlacement {
                part,
                jewel_ids: fill_sockets(catalog, query, &sockets, scale, &mut deficits),
            });
        }
        Self { per_piece }
    }
}

fn torso_multiplier(catalog: &Catalog, body_id: crate::ArmorId) -> u32 {
    catalog
        .armor(body_id)
        .map(|piece| piece.points_for(catalog.torso_up_id()).max(1) as u32)
        .unwrap_or(1)
}

/// How many more points each query skill needs, after accounting for the
/// set's armor pieces alone (no jewels). Skills already met by armor are
/// omitted.
fn armor_only_deficits(
    catalog: &Catalog,
    query: &Query,
    set: &ArmorSet,
    multiplier: u32,
) -> HashMap<SkillId, Points> {
    let mut deficits = HashMap::new();
    for effect in &query.effects {
        let armor_total: Points = set
            .pieces()
            .iter()
            .filter_map(|&id| catalog.armor(id))
            .map(|piece| {
                let raw = piece.points_for(effect.skill_id);
                if piece.part.is_body() { raw * multiplier as Points } else { raw }
            })
            .sum();
        let remaining = effect.min_points - armor_total;
        if remaining > 0 {
            deficits.insert(effect.skill_id, remaining);
        }
    }
    deficits
}

/// Greedily fills `sockets` (processed largest-first) with whichever
/// `query.jewel_filter`-admitted jewel both fits and still reduces some
/// entry in `deficits`, subtracting its (possibly `scale`d) contribution as
/// it goes.
fn fill_sockets(
    catalog: &Catalog,
    query: &Query,
    sockets: &[u8],
    scale: Points,
    deficits: &mut HashMap<SkillId, Points>,
) -> Vec<JewelId> {
    let mut order = sockets.to_vec();
    order.sort_unstable_by(|a, b| b.cmp(a));

    let mut chosen = Vec::new();
    for socket_size in order {
        if deficits.values().all(|&d| d <= 0) {
            break;
        }
        let pick = catalog
            .jewels()
            .iter()
            .filter(|j| (query.jewel_filter)(j))
            .filter(|j| j.size <= socket_size)
            .filter(|j| j.effects.iter().any(|e| deficits.get(&e.skill_id).copied().unwrap_or(0) > 0))
            .max_by_key(|j| j.size);
        let Some(jewel) = pick else { continue };
        for effect in &jewel.effects {
            if let Some(remaining) = deficits.get_mut(&effect.skill_id) {
                *remaining -= effect.points * scale;
            }
        }
        chosen.push(jewel.id);
    }
    chosen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ArmorPiece, Jewel, SkillEffect, SkillSystem};
    use crate::query::Effect;
    use crate::signature::Signature;

    fn catalog_with(armors: Vec<ArmorPiece>, jewels: Vec<Jewel>) -> Catalog {
        let dir = std::env::temp_dir().join(format!("gearsmith-jewelplan-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("skills.json"),
            serde_json::to_string(&vec![
                SkillSystem { id: 1, name: "torso_up".into(), lowest_positive_points: 1 },
                SkillSystem { id: 9, name: "target".into(), lowest_positive_points: 1 },
            ])
            .unwrap(),
        )
        .unwrap();
        std::fs::write(dir.join("armors.json"), serde_json::to_string(&armors).unwrap()).unwrap();
        std::fs::write(dir.join("jewels.json"), serde_json::to_string(&jewels).unwrap()).unwrap();
        Catalog::load(&dir, 1).unwrap()
    }

    fn body(id: crate::ArmorId, points: i32, sockets: Vec<u8>) -> ArmorPiece {
        ArmorPiece {
            id,
            part: ArmorPart::Body,
            name: "body".into(),
            rare: 1,
            sockets,
            max_defense: 1,
            effects: vec![SkillEffect { skill_id: 9, points }],
        }
    }

    fn blank(id: crate::ArmorId, part: ArmorPart) -> ArmorPiece {
        ArmorPiece { id, part, name: format!("{part}"), rare: 1, sockets: vec![], max_defense: 1, effects: vec![] }
    }

    #[test]
    fn places_jewel_to_cover_a_shortfall() {
        let jewel = Jewel { id: 1, name: "j".into(), size: 1, effects: vec![SkillEffect { skill_id: 9, points: 1 }] };
        let catalog = catalog_with(
            vec![
                blank(1, ArmorPart::Head),
                blank(2, ArmorPart::Hands),
                blank(3, ArmorPart::Waist),
                blank(4, ArmorPart::Feet),
                body(5, 4, vec![1]),
            ],
            vec![jewel],
        );
        let query = Query {
            effects: vec![Effect { skill_id: 9, min_points: 5 }],
            armor_filter: std::rc::Rc::new(|_| true),
            jewel_filter: std::rc::Rc::new(|_| true),
            amulets: Vec::new(),
            min_defense: None,
            max_results: 1,
        };
        let set = ArmorSet {
            head: 1,
            hands: 2,
            waist: 3,
            feet: 4,
            body: 5,
            amulet: 0,
            jewel_key: Signature::empty(),
            base_index: 0,
        };
        let plan = JewelPlacementPlan::build(&catalog, &query, &set);
        let body_plan = plan.per_piece.iter().find(|p| p.part == ArmorPart::Body).unwrap();
        assert_eq!(body_plan.jewel_ids, vec![1]);
    }

    #[test]
    fn no_shortfall_means_empty_plan() {
        let catalog = catalog_with(
            vec![
                blank(1, ArmorPart::Head),
                blank(2, ArmorPart::Hands),
                blank(3, ArmorPart::Waist),
                blank(4, ArmorPart::Feet),
                body(5, 5, vec![1]),
            ],
            vec![],
        );
        let query = Query {
            effects: vec![Effect { skill_id: 9, min_points: 5 }],
            armor_filter: std::rc::Rc::new(|_| true),
            jewel_filter: std::rc::Rc::new(|_| true),
            amulets: Vec::new(),
            min_defense: None,
            max_results: 1,
        };
        let set = ArmorSet {
            head: 1,
            hands: 2,
            waist: 3,
            feet: 4,
            body: 5,
            amulet: 0,
            jewel_key: Signature::empty(),
            base_index: 0,
        };
        let plan = JewelPlacementPlan::build(&catalog, &query, &set);
        assert!(plan.per_piece.iter().all(|p| p.jewel_ids.is_empty()));
    }
}
