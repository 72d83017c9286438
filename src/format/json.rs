//! `serde_json`-backed document renderer.
//!
//! Grounded in `ArmorSetFormatter<JSON>`/`JsonArmorResult` in
//! `examples/original_source/cpp/utils/formatter.h`.

use crate::catalog::Catalog;
use crate::format::jewel_plan::JewelPlacementPlan;
use crate::pipeline::ArmorSet;
use crate::query::Query;
use crate::ArmorPart;

#[derive(serde::Serialize)]
struct PieceDocument {
    part: ArmorPart,
    id: crate::ArmorId,
    name: String,
    jewel_ids: Vec<crate::JewelId>,
}

#[derive(serde::Serialize)]
struct ArmorSetDocument {
    defense: i32,
    pieces: Vec<PieceDocument>,
    skill_totals: Vec<(String, crate::Points)>,
}

pub struct JsonFormatter;

impl JsonFormatter {
    /// Serializes `set` to a single-line JSON document. Panics only if
    /// `serde_json` itself fails to serialize a plain data struct, which it
    /// cannot for these field types.
    pub fn format(&self, catalog: &Catalog, query: &Query, set: &ArmorSet) -> String {
        let plan = JewelPlacementPlan::build(catalog, query, set);
        let multiplier = catalog.armor(set.body).map(|p| p.points_for(catalog.torso_up_id()).max(1)).unwrap_or(1);

        let mut pieces = Vec::with_capacity(6);
        for part in ArmorPart::BODY_SLOTS {
            let id = match part {
                ArmorPart::Head => set.head,
                ArmorPart::Hands => set.hands,
                ArmorPart::Waist => set.waist,
                ArmorPart::Feet => set.feet,
                ArmorPart::Body => set.body,
                ArmorPart::Amulet => unreachable!("BODY_SLOTS excludes the amulet"),
            };
            let jewel_ids = plan
                .per_piece
                .iter()
                .find(|p| p.part == part)
                .map(|p| p.jewel_ids.clone())
                .unwrap_or_default();
            let name = catalog.armor(id).map(|p| p.name.clone()).unwrap_or_default();
            pieces.push(PieceDocument { part, id, name, jewel_ids });
        }
        let amulet_name = catalog.armor(set.amulet).map(|p| p.name.clone()).unwrap_or_default();
        pieces.push(PieceDocument { part: ArmorPart::Amulet, id: set.amulet, name: amulet_name, jewel_ids: Vec::new() });

        let skill_totals = query
            .effects
            .iter()
            .filter_map(|effect| catalog.skill(effect.skill_id).map(|s| (s.name.clone(), effect, s)))
            .map(|(name, effect, _)| {
                let armor_total: crate::Points = set
                    .pieces()
                    .iter()
                    .filter_map(|&id| catalog.armor(id))
                    .map(|p| {
                        let raw = p.points_for(effect.skill_id);
                        if p.part.is_body() { raw * multiplier } else { raw }
                    })
                    .sum();
                let jewel_total: crate::Points = pieces
                    .iter()
                    .flat_map(|p| {
                        let scale = if p.part.is_body() { multiplier } else { 1 };
                        p.jewel_ids.iter().map(move |&id| (id, scale))
                    })
                    .filter_map(|(id, scale)| catalog.jewels().iter().find(|j| j.id == id).map(|j| (j, scale)))
                    .map(|(jewel, scale)| {
                        let raw = jewel.effects.iter().find(|e| e.skill_id == effect.skill_id).map(|e| e.points).unwrap_or(0);
                        raw * scale
                    })
                    .sum();
                (name, armor_total + jewel_total)
            })
            .collect();

        let defense = set.pieces().iter().filter_map(|&id| catalog.armor(id)).map(|p| p.max_defense).sum();
        let doc = ArmorSetDocument { defense, pieces, skill_totals };
        serde_json::to_string(&doc).expect("ArmorSetDocument always serializes")
    }
}
