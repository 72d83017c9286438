//! Lazy iterator pipeline: Foundation → JewelFilter (the foundation-tracked
//! skills) → SkillSplit (every skill beyond those) → Expansion → Defense
//! filter.
//!
//! Grounded in `ArmorUp::SearchCore`'s stage assembly in
//! `examples/original_source/cpp/core/armor_up.h`, which chains the same
//! five stages through `std::unique_ptr<TreeIterator>`/`ArmorSetIterator`
//! polymorphism. Rust has no single `dyn Iterator` vtable trick that lets
//! every stage share mutable access to the node pool the way a raw
//! `NodePool *` does, so the pool here is `Rc<RefCell<NodePool>>` — shared,
//! single-threaded interior mutability, the same idiom the teacher uses
//! for its own id-arena graphs (`examples/krukah-robopoker/src/cfr/node.rs`'s
//! `Rc<RefCell<DiGraph<..>>>`).

pub mod foundation;

mod armor_set;
mod defense_filter;
mod expansion;
mod jewel_filter;
mod root;
mod skill_split;

pub use armor_set::ArmorSet;
pub use defense_filter::DefenseFilter;
pub use expansion::Expansion;
pub use jewel_filter::JewelFilter;
pub use root::TreeRoot;
pub use skill_split::SkillSplit;
