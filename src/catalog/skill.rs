use crate::{Points, SkillId};

/// A skill as declared by `skills.json`: just enough to drive query
/// validation and the `explore` binary's per-skill sweep.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SkillSystem {
    pub id: SkillId,
    pub name: String,
    /// Smallest positive point value any single piece or jewel grants of
    /// this skill. Used by `explore` to synthesize a "just barely require
    /// this skill" probe effect.
    pub lowest_positive_points: Points,
}
