//! Human-readable one-block-per-[`ArmorSet`] renderer.
//!
//! Grounded in `ArmorSetFormatter<SCREEN>` in
//! `examples/original_source/cpp/utils/formatter.h`.

use std::fmt::Write as _;

use crate::catalog::Catalog;
use crate::format::jewel_plan::JewelPlacementPlan;
use crate::pipeline::ArmorSet;
use crate::query::Query;
use crate::ArmorPart;

pub struct TextFormatter;

impl TextFormatter {
    pub fn format(&self, catalog: &Catalog, query: &Query, set: &ArmorSet) -> String {
        let mut out = String::new();
        let defense = defense_sum(catalog, set);
        let _ = writeln!(out, "---------- ArmorSet (defense {defense}) ----------");

        for part in ArmorPart::BODY_SLOTS {
            let id = match part {
                ArmorPart::Head => set.head,
                ArmorPart::Hands => set.hands,
                ArmorPart::Waist => set.waist,
                ArmorPart::Feet => set.feet,
                ArmorPart::Body => set.body,
                ArmorPart::Amulet => unreachable!("BODY_SLOTS excludes the amulet"),
            };
            write_piece(&mut out, catalog, part, id);
        }
        write_piece(&mut out, catalog, ArmorPart::Amulet, set.amulet);

        let plan = JewelPlacementPlan::build(catalog, query, set);
        let _ = write!(out, "Jewel Plan:");
        for placement in &plan.per_piece {
            for &jewel_id in &placement.jewel_ids {
                let name = catalog.jewels().iter().find(|j| j.id == jewel_id).map(|j| j.name.as_str()).unwrap_or("?");
                let _ = write!(out, " | {name}[{}]", placement.part);
            }
        }
        let _ = writeln!(out, " |");

        for effect in &query.effects {
            if let Some(skill) = catalog.skill(effect.skill_id) {
                let total = total_points(catalog, set, effect.skill_id) + jewel_points(catalog, &plan, effect.skill_id, set);
                let _ = write!(out, "{}({total})  ", skill.name);
            }
        }
        let _ = writeln!(out);
        out
    }
}

fn write_piece(out: &mut String, catalog: &Catalog, part: ArmorPart, id: crate::ArmorId) {
    let Some(piece) = catalog.armor(id) else {
        let _ = writeln!(out, "[{part}] (missing piece {id})");
        return;
    };
    let holes = hole_text(&piece.sockets);
    let _ = writeln!(out, "[{part}] [{holes}] [Rare {:02}] {}", piece.rare, piece.name);
}

fn hole_text(sockets: &[u8]) -> String {
    match sockets.len() {
        0 => "---".to_string(),
        1 => "O--".to_string(),
        2 => "OO-".to_string(),
        _ => "OOO".to_string(),
    }
}

fn defense_sum(catalog: &Catalog, set: &ArmorSet) -> i32 {
    set.pieces().iter().filter_map(|&id| catalog.armor(id)).map(|p| p.max_defense).sum()
}

fn jewel_points(
    catalog: &Catalog,
    plan: &JewelPlacementPlan,
    skill_id: crate::SkillId,
    set: &ArmorSet,
) -> crate::Points {
    let multiplier = catalog.armor(set.body).map(|p| p.points_for(catalog.torso_up_id()).max(1)).unwrap_or(1);
    plan.per_piece
        .iter()
        .flat_map(|placement| {
            let scale = if placement.part.is_body() { multiplier } else { 1 };
            placement.jewel_ids.iter().map(move |&id| (id, scale))
        })
        .filter_map(|(id, scale)| catalog.jewels().iter().find(|j| j.id == id).map(|j| (j, scale)))
        .map(|(jewel, scale)| {
            let raw = jewel.effects.iter().find(|e| e.skill_id == skill_id).map(|e| e.points).unwrap_or(0);
            raw * scale
        })
        .sum()
}

fn total_points(catalog: &Catalog, set: &ArmorSet, skill_id: crate::SkillId) -> crate::Points {
    let multiplier = catalog.armor(set.body).map(|p| p.points_for(catalog.torso_up_id()).max(1)).unwrap_or(1);
    set.pieces()
        .iter()
        .filter_map(|&id| catalog.armor(id))
        .map(|p| {
            let raw = p.points_for(skill_id);
            if p.part.is_body() { raw * multiplier } else { raw }
        })
        .sum::<crate::Points>()
        + catalog.armor(set.amulet).map(|p| p.points_for(skill_id)).unwrap_or(0)
}
