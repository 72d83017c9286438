//! Search driver: orders a query's effects, assembles the pipeline and
//! drains it up to `max_results`. Also the `explore` sweep, which reuses one
//! snapshotted foundation across many trial queries.
//!
//! Grounded in `ArmorUp::Search`/`ArmorUp::SearchCore`/`ArmorUp::Explore` in
//! `examples/original_source/cpp/core/armor_up.h`.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::catalog::Catalog;
use crate::error::Result;
use crate::pipeline::{foundation, ArmorSet, DefenseFilter, Expansion, JewelFilter, SkillSplit, TreeRoot};
use crate::pool::NodePool;
use crate::query::{Effect, Query};
use crate::FOUNDATION_NUM;

/// Owns the node pool for the lifetime of one driver, so `explore` can
/// snapshot/restore between probes without rebuilding shared state.
pub struct SearchDriver<'c> {
    catalog: &'c Catalog,
    pool: Rc<RefCell<NodePool>>,
}

/// Outcome of probing one skill during an [`SearchDriver::explore`] sweep.
#[derive(Debug, Clone)]
pub struct ExploreResult {
    pub skill_id: crate::SkillId,
    pub feasible: bool,
    pub elapsed: Duration,
}

impl<'c> SearchDriver<'c> {
    pub fn new(catalog: &'c Catalog) -> Self {
        Self { catalog, pool: Rc::new(RefCell::new(NodePool::new())) }
    }

    /// Runs one query to completion, yielding up to `query.max_results`
    /// [`ArmorSet`]s in deterministic stream order. Reorders `query.effects`
    /// by restrictiveness first (spec.md §6, "Effect ordering").
    pub fn search(&self, query: &mut Query) -> Result<Vec<ArmorSet>> {
        query.validate(self.catalog)?;
        query.optimize(self.catalog);
        let results = self.assemble(query)?.take(query.max_results).collect();
        Ok(results)
    }

    /// Builds the lazy pipeline for `query` against the current pool. The
    /// pool is never cleared here — callers that want a clean slate between
    /// queries should construct a fresh [`SearchDriver`], or use
    /// [`Self::explore`]'s snapshot/restore cycle.
    fn assemble<'q>(&self, query: &'q Query) -> Result<Box<dyn Iterator<Item = ArmorSet> + 'q>>
    where
        'c: 'q,
    {
        let roots: Vec<TreeRoot> = {
            let mut pool = self.pool.borrow_mut();
            foundation::build(&mut pool, self.catalog, query)
        };

        let mut stage: Box<dyn Iterator<Item = TreeRoot> + 'q> = Box::new(roots.into_iter());

        let foundation_count = query.effects.len().min(FOUNDATION_NUM);
        for idx in 0..foundation_count {
            stage = Box::new(JewelFilter::new(stage, self.pool.clone(), self.catalog, &query.effects, idx));
        }
        for idx in FOUNDATION_NUM..query.effects.len() {
            stage = Box::new(SkillSplit::new(stage, self.pool.clone(), self.catalog, &query.effects, idx));
        }

        let expanded = Expansion::new(stage, self.pool.clone());
        let min_defense = query.min_defense.unwrap_or(0);
        Ok(Box::new(DefenseFilter::new(expanded, self.catalog, min_defense)))
    }

    /// For every skill the catalog declares that isn't already constrained
    /// by `base`, builds a trial query with one synthetic effect requiring
    /// `lowest_positive_points` of that skill, runs it against a
    /// snapshot of the current pool, and reports pass/fail plus timing.
    /// Mirrors `ArmorUp::Explore`: a fresh snapshot point per probe,
    /// restored right after, so speculative nodes from one skill never
    /// leak into the next. A [`crate::pool::SnapshotId`] is single-use —
    /// `restore_snapshot` truncates the snapshot list itself along with
    /// the arenas — so it has to be re-pushed before every probe, not
    /// just once before the loop.
    pub fn explore(&self, base: &Query) -> Result<Vec<ExploreResult>> {
        let already: std::collections::HashSet<_> = base.effects.iter().map(|e| e.skill_id).collect();

        let mut out = Vec::new();
        for skill in self.catalog.skills() {
            if already.contains(&skill.id) {
                continue;
            }
            let mut trial = base.clone();
            trial.effects.push(Effect { skill_id: skill.id, min_points: skill.lowest_positive_points.max(1) });
            trial.optimize(self.catalog);

            let snapshot = self.pool.borrow_mut().push_snapshot();
            let start = Instant::now();
            let feasible = self.assemble(&trial)?.next().is_some();
            out.push(ExploreResult { skill_id: skill.id, feasible, elapsed: start.elapsed() });

            self.pool.borrow_mut().restore_snapshot(snapshot)?;
        }
        Ok(out)
    }
}
