use crate::pool::OrId;
use crate::signature::Signature;

/// One top-level alternative out of the foundation forest: a fully merged
/// six-slot armor combination (as an OR-node id, possibly still standing
/// for many concrete piece tuples), its torso multiplier, and whichever
/// jewel-key signatures are currently known to let it satisfy the
/// foundation-tracked skills.
///
/// Grounded in the `(int id, Signature key)` pair `ArmorUp::Foundation()`
/// returns per root in `armor_up.h`, widened here to also carry
/// `torso_multiplier` (read once off `key` rather than recomputed by every
/// later stage), `body_sockets` (the body piece's own socket budget, kept
/// apart from the rest the same way `armor_up.h`'s `GetResidual` reports a
/// separate `body_holes` out-parameter alongside `one, two, three`), and
/// `jewel_keys` (populated by [`crate::pipeline::jewel_filter`]).
#[derive(Debug, Clone)]
pub struct TreeRoot {
    pub id: OrId,
    pub torso_multiplier: u32,
    pub body_sockets: (u32, u32, u32),
    pub jewel_keys: Vec<Signature>,
}
