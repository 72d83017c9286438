use crate::{ArmorId, ArmorPart, Points, SkillId};

/// A `(skill_id, points)` contribution. `points` may be negative — some
/// pieces trade a skill down to buy headroom in another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SkillEffect {
    pub skill_id: SkillId,
    pub points: Points,
}

/// One armor piece, as read from `armors.json`. Amulets loaded from a
/// query document are represented the same way, tagged with
/// `part: ArmorPart::Amulet`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ArmorPiece {
    pub id: ArmorId,
    pub part: ArmorPart,
    pub name: String,
    pub rare: u8,
    /// Sizes of the piece's sockets, each 1..=3, length 0..=3. Richer than
    /// the single `holes` count spec.md's external-interface table
    /// sketches — see DESIGN.md for why the graded-size vector is what
    /// `Signature`'s three socket-count regions actually need.
    pub sockets: Vec<u8>,
    pub max_defense: i32,
    pub effects: Vec<SkillEffect>,
}

impl ArmorPiece {
    /// The piece's contribution to `skill_id`, or 0 if it doesn't touch
    /// that skill.
    pub fn points_for(&self, skill_id: SkillId) -> Points {
        self.effects
            .iter()
            .find(|e| e.skill_id == skill_id)
            .map(|e| e.points)
            .unwrap_or(0)
    }

    /// Counts of size-1, size-2, size-3 sockets on this piece.
    pub fn socket_counts(&self) -> (u32, u32, u32) {
        let mut counts = (0u32, 0u32, 0u32);
        for &size in &self.sockets {
            match size {
                1 => counts.0 += 1,
                2 => counts.1 += 1,
                3 => counts.2 += 1,
                other => debug_assert!(false, "socket size out of range: {other}"),
            }
        }
        counts
    }

    /// A piece with no effects, no sockets, no defense — the implicit
    /// "no amulet chosen" alternative always present in the amulet slot.
    pub fn none(id: ArmorId) -> Self {
        Self {
            id,
            part: ArmorPart::Amulet,
            name: "(none)".to_string(),
            rare: 0,
            sockets: Vec::new(),
            max_defense: 0,
            effects: Vec::new(),
        }
    }
}
