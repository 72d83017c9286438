//! Compact S-expression renderer.
//!
//! Grounded in `EncodeFormatter`/`AppendNumberVector` in
//! `examples/original_source/cpp/utils/formatter.h`: one line per
//! `ArmorSet`, `:PART (id (jewel_ids...))` per slot.

use std::fmt::Write as _;

use crate::catalog::Catalog;
use crate::format::jewel_plan::JewelPlacementPlan;
use crate::pipeline::ArmorSet;
use crate::query::Query;
use crate::ArmorPart;

pub struct SexprFormatter;

impl SexprFormatter {
    pub fn format(&self, catalog: &Catalog, query: &Query, set: &ArmorSet) -> String {
        let plan = JewelPlacementPlan::build(catalog, query, set);
        let mut out = String::from("(");
        for part in ArmorPart::BODY_SLOTS {
            let id = match part {
                ArmorPart::Head => set.head,
                ArmorPart::Hands => set.hands,
                ArmorPart::Waist => set.waist,
                ArmorPart::Feet => set.feet,
                ArmorPart::Body => set.body,
                ArmorPart::Amulet => unreachable!("BODY_SLOTS excludes the amulet"),
            };
            let jewel_ids = plan.per_piece.iter().find(|p| p.part == part).map(|p| p.jewel_ids.as_slice()).unwrap_or(&[]);
            write_slot(&mut out, part, id, jewel_ids);
        }
        write_slot(&mut out, ArmorPart::Amulet, set.amulet, &[]);
        out.push(')');
        out
    }
}

fn write_slot(out: &mut String, part: ArmorPart, id: crate::ArmorId, jewel_ids: &[crate::JewelId]) {
    let _ = write!(out, ":{part} ({id} (");
    for (i, jewel_id) in jewel_ids.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{jewel_id}");
    }
    out.push_str(")) ");
}
