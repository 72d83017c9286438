//! The query document: what the caller is asking the search for.

use crate::catalog::{ArmorFilter, ArmorPiece, Catalog, JewelFilter};
use crate::error::{InputError, Result};
use crate::{Points, SkillId};

/// A single skill requirement: "at least `min_points` of `skill_id`".
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Effect {
    pub skill_id: SkillId,
    pub min_points: Points,
}

/// A fully-specified search request. `armor_filter`/`jewel_filter` are not
/// serializable (they're applied as closures); the JSON query document
/// only ever carries `effects`, `amulets`, `defense`, `max_results` — the
/// filters are attached by the CLI layer from flags like `--rare-max`.
/// Cloneable (the filters are `Rc`-shared) so `explore` can fan one base
/// query out into one trial query per untested skill.
#[derive(Clone)]
pub struct Query {
    pub effects: Vec<Effect>,
    pub armor_filter: ArmorFilter,
    pub jewel_filter: JewelFilter,
    pub amulets: Vec<ArmorPiece>,
    pub min_defense: Option<i32>,
    pub max_results: usize,
}

/// The JSON-serializable subset of a [`Query`], as loaded from a query
/// file or emitted by the CLI before filters/amulets are attached.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct QueryDocument {
    pub effects: Vec<Effect>,
    #[serde(default)]
    pub amulets: Vec<ArmorPiece>,
    #[serde(default)]
    pub min_defense: Option<i32>,
    pub max_results: i64,
}

impl QueryDocument {
    /// Parses a query document from JSON text, validating
    /// `max_results > 0` up front (spec.md §7's `NonPositiveMaxResults`).
    pub fn parse(text: &str) -> Result<Self> {
        let doc: QueryDocument =
            serde_json::from_str(text).map_err(|source| InputError::Json {
                path: std::path::PathBuf::from("<query>"),
                source,
            })?;
        if doc.max_results <= 0 {
            return Err(InputError::NonPositiveMaxResults(doc.max_results).into());
        }
        Ok(doc)
    }

    pub fn into_query(self, armor_filter: ArmorFilter, jewel_filter: JewelFilter) -> Query {
        Query {
            effects: self.effects,
            armor_filter,
            jewel_filter,
            amulets: self.amulets,
            min_defense: self.min_defense,
            max_results: self.max_results as usize,
        }
    }
}

impl Query {
    /// Reorders `effects` ascending by estimated restrictiveness (the
    /// cheapest-to-satisfy effect first), so the foundation stage spends
    /// its two tracked slots on the skills most likely to prune early.
    /// Mirrors `ArmorUp::OptimizeQuery`'s `EffectScore` sort in
    /// `armor_up.h`.
    ///
    /// Restrictiveness is estimated as `min_points / lowest_positive_points`
    /// for the skill: a requirement many multiples of the smallest positive
    /// contribution is harder to satisfy than one met by a single piece.
    pub fn optimize(&mut self, catalog: &Catalog) {
        self.effects.sort_by(|a, b| {
            restrictiveness(catalog, a)
                .partial_cmp(&restrictiveness(catalog, b))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    /// Validates every effect references a known skill and that the query
    /// doesn't ask for more tracked skills than a [`crate::signature::Signature`]
    /// has slots for. Called once, right after parsing, before any
    /// pipeline work begins.
    pub fn validate(&self, catalog: &Catalog) -> Result<()> {
        if self.effects.len() > crate::signature::MAX_TRACKED_SKILLS {
            return Err(InputError::TooManyEffects(
                self.effects.len(),
                crate::signature::MAX_TRACKED_SKILLS,
            )
            .into());
        }
        for effect in &self.effects {
            if catalog.skill(effect.skill_id).is_none() {
                return Err(InputError::UnknownSkill(effect.skill_id).into());
            }
        }
        Ok(())
    }
}

fn restrictiveness(catalog: &Catalog, effect: &Effect) -> f64 {
    let lowest = catalog
        .skill(effect.skill_id)
        .map(|s| s.lowest_positive_points.max(1))
        .unwrap_or(1);
    effect.min_points as f64 / lowest as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SkillSystem;

    fn catalog_with_skills() -> Catalog {
        let dir = tempdir_with_catalog();
        Catalog::load(&dir, 1).unwrap()
    }

    fn tempdir_with_catalog() -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "gearsmith-query-test-{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("skills.json"),
            serde_json::to_string(&vec![
                SkillSystem {
                    id: 1,
                    name: "torso_up".into(),
                    lowest_positive_points: 1,
                },
                SkillSystem {
                    id: 2,
                    name: "easy".into(),
                    lowest_positive_points: 10,
                },
                SkillSystem {
                    id: 3,
                    name: "hard".into(),
                    lowest_positive_points: 1,
                },
            ])
            .unwrap(),
        )
        .unwrap();
        std::fs::write(dir.join("armors.json"), "[]").unwrap();
        std::fs::write(dir.join("jewels.json"), "[]").unwrap();
        dir
    }

    #[test]
    fn optimize_orders_cheapest_effect_first() {
        let catalog = catalog_with_skills();
        let mut query = Query {
            effects: vec![
                Effect {
                    skill_id: 3,
                    min_points: 5,
                },
                Effect {
                    skill_id: 2,
                    min_points: 10,
                },
            ],
            armor_filter: std::rc::Rc::new(|_| true),
            jewel_filter: std::rc::Rc::new(|_| true),
            amulets: Vec::new(),
            min_defense: None,
            max_results: 1,
        };
        query.optimize(&catalog);
        assert_eq!(query.effects[0].skill_id, 2);
        assert_eq!(query.effects[1].skill_id, 3);
    }

    #[test]
    fn parse_rejects_non_positive_max_results() {
        let err = QueryDocument::parse(r#"{"effects":[],"max_results":0}"#);
        assert!(err.is_err());
    }
}
