use super::armor::SkillEffect;
use crate::JewelId;

/// A decoration/jewel as read from `jewels.json`. `size` is the socket
/// size it requires (1..=3); a jewel fits any socket of its size or
/// larger in the original game's rules, but this engine only ever tests
/// exact-size-or-larger fit in `jewels::HoleClient`, never smaller.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Jewel {
    pub id: JewelId,
    pub name: String,
    pub size: u8,
    pub effects: Vec<SkillEffect>,
}
