//! Builds the foundation forest: group each part's pieces by signature,
//! then merge the six per-part forests (five body slots plus the amulet)
//! into one DAG.
//!
//! Grounded in `ArmorUp::ClassifyArmors` / `ArmorUp::MergeForests` in
//! `examples/original_source/cpp/core/armor_up.h`. The merge order and the
//! body-refactor step are spec.md §4.2's "why two skills only" and
//! §3's body-multiplier semantics, reworked as a `BTreeMap`-grouped fold
//! over [`ArmorPart::ALL`] instead of a hand-indexed array of forests.
//! `BTreeMap` rather than `HashMap`: grouping order feeds directly into
//! node-id assignment order, which feeds into `TreeRoot`/`ArmorSet` stream
//! order, so it has to be deterministic across runs (spec.md §8).

use std::collections::BTreeMap;

use crate::catalog::{ArmorPiece, Catalog};
use crate::pipeline::TreeRoot;
use crate::pool::{NodePool, OrId};
use crate::query::Query;
use crate::signature::Signature;
use crate::{ArmorPart, Points, SkillId, FOUNDATION_NUM};

/// Builds the signature a single piece contributes at foundation time:
/// its points on the first `FOUNDATION_NUM` query skills, its socket
/// counts, and — for the body slot only — a multiplier equal to its own
/// torso-up points (floored at 1). Every other slot keeps multiplier 1
/// until the body merge step rewrites it (see [`build`]).
fn piece_signature(piece: &ArmorPiece, skills: &[SkillId], torso_up_id: SkillId) -> Signature {
    let points: Vec<Points> = skills.iter().map(|&s| piece.points_for(s)).collect();
    let multiplier = if piece.part.is_body() {
        piece.points_for(torso_up_id).max(1) as u32
    } else {
        1
    };
    Signature::new(&points, piece.socket_counts(), multiplier)
}

/// Groups `part`'s catalog pieces (after `query.armor_filter`) by their
/// foundation signature, emitting one OR-node per group.
fn classify(
    pool: &mut NodePool,
    catalog: &Catalog,
    part: ArmorPart,
    skills: &[SkillId],
    torso_up_id: SkillId,
    query: &Query,
) -> Vec<OrId> {
    let mut groups: BTreeMap<Signature, Vec<crate::ArmorId>> = BTreeMap::new();
    for id in catalog.ids_in_part(part, &query.armor_filter) {
        let Some(piece) = catalog.armor(id) else {
            continue;
        };
        let key = piece_signature(piece, skills, torso_up_id);
        groups.entry(key).or_default().push(id);
    }
    groups
        .into_iter()
        .map(|(key, ids)| pool.make_or_armors(key, ids))
        .collect()
}

/// Pairs every OR-node in `accumulated` (everything folded in so far)
/// with every OR-node in `incoming` (the part being folded in this step),
/// grouping the resulting AND-node keys by signature. `is_body` triggers
/// the `BodyRefactor(m+1)` rewrite of `accumulated`'s key described in
/// spec.md §3, where `m` is `incoming`'s own multiplier — `incoming` is
/// the body forest exactly when `is_body` is set, by construction of the
/// [`ArmorPart::ALL`] fold in [`build`].
///
/// Also threads the body piece's own (unscaled) socket counts through as a
/// side-channel keyed by `OrId`, since once folded into a merged `Signature`
/// they're indistinguishable from anyone else's sockets — `body_before`
/// gives each accumulated id's body sockets so far (all zero before the
/// body step itself), and the return value gives each resulting id's.
/// `armor_up.h`'s `GetResidual` keeps the analogous `body_holes` count
/// apart from `one, two, three` for the same reason.
fn merge(
    pool: &mut NodePool,
    accumulated: &[OrId],
    incoming: &[OrId],
    is_body: bool,
    body_before: &BTreeMap<OrId, (u32, u32, u32)>,
) -> (Vec<OrId>, BTreeMap<OrId, (u32, u32, u32)>) {
    let mut groups: BTreeMap<Signature, Vec<crate::pool::AndId>> = BTreeMap::new();
    let mut body_by_key: BTreeMap<Signature, (u32, u32, u32)> = BTreeMap::new();
    for &a in accumulated {
        let a_key = pool.or(a).expect("foundation OR id is always valid").key;
        let a_body = body_before.get(&a).copied().unwrap_or((0, 0, 0));
        for &b in incoming {
            let b_key = pool.or(b).expect("foundation OR id is always valid").key;
            let key = if is_body {
                a_key.body_refactor(b_key.multiplier() + 1).merge(&b_key)
            } else {
                a_key.merge(&b_key)
            };
            let and_id = pool.make_and(a, b);
            groups.entry(key).or_default().push(and_id);
            let body_sockets = if is_body { b_key.sockets() } else { a_body };
            body_by_key.entry(key).or_insert(body_sockets);
        }
    }
    let mut body_after = BTreeMap::new();
    let ors = groups
        .into_iter()
        .map(|(key, ands)| {
            let or_id = pool.make_or_ands(key, ands);
            body_after.insert(or_id, body_by_key[&key]);
            or_id
        })
        .collect();
    (ors, body_after)
}

/// Builds the complete foundation forest for `query` against `catalog`,
/// merging the six slots in [`ArmorPart::ALL`] order (head, hands, waist,
/// feet, body, amulet), and returns one [`TreeRoot`] per surviving
/// top-level OR-node, each with an empty `jewel_keys`.
pub fn build(pool: &mut NodePool, catalog: &Catalog, query: &Query) -> Vec<TreeRoot> {
    let skills: Vec<SkillId> = query
        .effects
        .iter()
        .take(FOUNDATION_NUM)
        .map(|e| e.skill_id)
        .collect();
    let torso_up_id = catalog.torso_up_id();

    let mut current: Option<Vec<OrId>> = None;
    let mut body_of: BTreeMap<OrId, (u32, u32, u32)> = BTreeMap::new();
    for part in ArmorPart::ALL {
        let forest = classify(pool, catalog, part, &skills, torso_up_id, query);
        current = Some(match current {
            None => forest,
            Some(accumulated) => {
                let (merged, next_body_of) = merge(pool, &accumulated, &forest, part.is_body(), &body_of);
                body_of = next_body_of;
                merged
            }
        });
    }
    let roots = current.unwrap_or_default();

    roots
        .into_iter()
        .map(|id| {
            let multiplier = pool
                .or(id)
                .expect("just-built foundation OR id is always valid")
                .key
                .multiplier();
            let body_sockets = body_of.get(&id).copied().unwrap_or((0, 0, 0));
            TreeRoot {
                id,
                torso_multiplier: multiplier,
                body_sockets,
                jewel_keys: Vec::new(),
            }
        })
        .collect()
}
