//! Arena-backed AND/OR DAG.
//!
//! Grounded in `MergeForests`/`ClassifyArmors` from
//! `examples/original_source/cpp/core/armor_up.h`, which builds exactly this
//! shape (a flat pool of OR-node and AND-node records addressed by integer
//! id) but in C++ with raw vector indices; here the arena is two `Vec`s with
//! newtype ids, and `PushSnapshot`/`RestoreSnapshot` are truncations of those
//! `Vec`s rather than manual bookkeeping, mirroring the id-arena idiom in
//! `examples/krukah-robopoker/crates/mccfr/src/state/tree.rs`.

use crate::error::{PoolError, Result};
use crate::signature::Signature;
use crate::ArmorId;

/// Id of an OR-node within a [`NodePool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OrId(pub usize);

/// Id of an AND-node within a [`NodePool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AndId(pub usize);

/// What an OR-node's alternatives actually are: either leaf armor pieces
/// (all sharing the same signature) or pairs of sub-combinations already
/// merged into AND-nodes.
#[derive(Debug, Clone)]
pub enum OrKind {
    Armors(Vec<ArmorId>),
    Ands(Vec<AndId>),
}

/// A group of interchangeable alternatives, identified by the signature
/// they all reduce to.
#[derive(Debug, Clone)]
pub struct OrNode {
    pub key: Signature,
    pub kind: OrKind,
}

/// A pairing of two OR-nodes into one combined alternative — conceptually
/// "pick one alternative from `left`, one from `right`".
#[derive(Debug, Clone, Copy)]
pub struct AndNode {
    pub left: OrId,
    pub right: OrId,
}

/// A marker returned by [`NodePool::push_snapshot`], opaque to callers.
/// [`NodePool::restore_snapshot`] truncates both arenas back to the sizes
/// recorded here, discarding every node created since.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotId(usize);

/// Arena storing every OR-node and AND-node built for the lifetime of one
/// search (or one `Explore()` sweep, which snapshots/restores between each
/// skill it probes).
#[derive(Debug, Default)]
pub struct NodePool {
    ors: Vec<OrNode>,
    ands: Vec<AndNode>,
    snapshots: Vec<(usize, usize)>,
}

impl NodePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh OR-node over a set of leaf armor pieces.
    pub fn make_or_armors(&mut self, key: Signature, armors: Vec<ArmorId>) -> OrId {
        let id = OrId(self.ors.len());
        self.ors.push(OrNode {
            key,
            kind: OrKind::Armors(armors),
        });
        id
    }

    /// Allocates a fresh OR-node over a set of already-merged AND-nodes.
    pub fn make_or_ands(&mut self, key: Signature, ands: Vec<AndId>) -> OrId {
        let id = OrId(self.ors.len());
        self.ors.push(OrNode {
            key,
            kind: OrKind::Ands(ands),
        });
        id
    }

    /// Allocates a fresh AND-node pairing two OR-nodes.
    pub fn make_and(&mut self, left: OrId, right: OrId) -> AndId {
        let id = AndId(self.ands.len());
        self.ands.push(AndNode { left, right });
        id
    }

    pub fn or(&self, id: OrId) -> Result<&OrNode> {
        self.ors
            .get(id.0)
            .ok_or(PoolError::InvalidOrId(id.0, self.ors.len()))
            .map_err(Into::into)
    }

    pub fn and(&self, id: AndId) -> Result<&AndNode> {
        self.ands
            .get(id.0)
            .ok_or(PoolError::InvalidAndId(id.0, self.ands.len()))
            .map_err(Into::into)
    }

    pub fn or_count(&self) -> usize {
        self.ors.len()
    }

    pub fn and_count(&self) -> usize {
        self.ands.len()
    }

    /// Records the current arena sizes so a later [`Self::restore_snapshot`]
    /// can roll back to exactly this point. Used by `Explore()` between
    /// probes of each skill, so one skill's speculative nodes never leak
    /// into the next skill's probe.
    pub fn push_snapshot(&mut self) -> SnapshotId {
        let id = SnapshotId(self.snapshots.len());
        self.snapshots.push((self.ors.len(), self.ands.len()));
        id
    }

    /// Truncates both arenas back to the sizes recorded at `snapshot`,
    /// discarding every node allocated since. `snapshot` and every
    /// snapshot pushed after it become invalid.
    pub fn restore_snapshot(&mut self, snapshot: SnapshotId) -> Result<()> {
        let (or_len, and_len) = *self
            .snapshots
            .get(snapshot.0)
            .ok_or(PoolError::InvalidSnapshot(snapshot.0))?;
        self.ors.truncate(or_len);
        self.ands.truncate(and_len);
        self.snapshots.truncate(snapshot.0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig() -> Signature {
        Signature::empty()
    }

    #[test]
    fn snapshot_restore_discards_new_nodes() {
        let mut pool = NodePool::new();
        let base = pool.make_or_armors(sig(), vec![1, 2]);
        let snap = pool.push_snapshot();
        pool.make_or_armors(sig(), vec![3]);
        pool.make_and(base, base);
        assert_eq!(pool.or_count(), 2);
        assert_eq!(pool.and_count(), 1);
        pool.restore_snapshot(snap).unwrap();
        assert_eq!(pool.or_count(), 1);
        assert_eq!(pool.and_count(), 0);
        assert!(pool.or(base).is_ok());
    }

    #[test]
    fn invalid_or_id_is_reported() {
        let pool = NodePool::new();
        assert!(pool.or(OrId(0)).is_err());
    }

    #[test]
    fn invalid_snapshot_id_is_reported() {
        let mut pool = NodePool::new();
        let snap = pool.push_snapshot();
        pool.restore_snapshot(snap).unwrap();
        assert!(pool.restore_snapshot(snap).is_err());
    }
}
