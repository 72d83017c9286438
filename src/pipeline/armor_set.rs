//! The concrete leaf the whole pipeline exists to produce: one piece per
//! body slot, an amulet, and a single chosen jewel-key.
//!
//! Grounded in `ArmorSet` (`ids` + `jewel_key`) as consumed by
//! `ArmorSetFormatter`/`EncodeFormatter`/`JsonArmorResult` throughout
//! `examples/original_source/cpp/utils/formatter.h`.

use crate::signature::Signature;
use crate::ArmorId;

/// One fully-expanded armor combination plus the jewel-key it was paired
/// with. `base_index` is `ExpansionIterator::BaseIndex()`'s equivalent: a
/// stable id of the `TreeRoot` this set was expanded from, for any
/// downstream grouping the formatters want to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArmorSet {
    pub head: ArmorId,
    pub hands: ArmorId,
    pub waist: ArmorId,
    pub feet: ArmorId,
    pub body: ArmorId,
    pub amulet: ArmorId,
    pub jewel_key: Signature,
    pub base_index: usize,
}

impl ArmorSet {
    /// The five body-slot piece ids, in `ArmorPart::BODY_SLOTS` order.
    pub fn pieces(&self) -> [ArmorId; 5] {
        [self.head, self.hands, self.waist, self.feet, self.body]
    }
}
