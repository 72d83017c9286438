use std::collections::HashMap;
use std::path::Path;

use super::armor::ArmorPiece;
use super::jewel::Jewel;
use super::skill::SkillSystem;
use crate::error::{InputError, Result};
use crate::{ArmorId, ArmorPart, SkillId};

/// Predicate over armor pieces, applied while building the foundation.
/// Grounded in `armor_up.h`'s `ArmorFilter` (e.g. "rare <= N", "part in
/// set"); represented here as a shared closure rather than a trait object
/// hierarchy, which is enough for every predicate spec.md's `Query`
/// actually needs. `Rc` rather than `Box` so a [`crate::query::Query`] is
/// cheaply cloneable — the `explore` sweep clones one base query per
/// untested skill (see `crate::search::SearchDriver::explore`).
pub type ArmorFilter = std::rc::Rc<dyn Fn(&ArmorPiece) -> bool>;
/// Predicate over jewels, same role as [`ArmorFilter`] for the jewel pool.
pub type JewelFilter = std::rc::Rc<dyn Fn(&Jewel) -> bool>;

/// Read-only view over every piece, jewel and skill the search can draw
/// on, plus the per-part indices the foundation stage walks.
///
/// Grounded in the `DataSet` used throughout `armor_up.h` (`ArmorIds(part)`,
/// `AddExtraArmor`, `ClearExtraArmor`) — the one piece of genuinely mutable
/// shared state in the whole design, confined here to
/// [`Catalog::amulets_mut`].
#[derive(Debug, Clone)]
pub struct Catalog {
    armors: Vec<ArmorPiece>,
    jewels: Vec<Jewel>,
    skills: Vec<SkillSystem>,
    skill_index: HashMap<SkillId, usize>,
    by_part: HashMap<ArmorPart, Vec<ArmorId>>,
    torso_up_id: SkillId,
    amulets: Vec<ArmorPiece>,
    next_amulet_id: ArmorId,
}

impl Catalog {
    /// Loads `armors.json`, `jewels.json`, `skills.json` from `dir`,
    /// validating that every referenced skill id exists and that
    /// `torso_up_id` names a real skill.
    pub fn load(dir: &Path, torso_up_id: SkillId) -> Result<Self> {
        let armors: Vec<ArmorPiece> = read_json(&dir.join("armors.json"), "armors.json")?;
        let jewels: Vec<Jewel> = read_json(&dir.join("jewels.json"), "jewels.json")?;
        let skills: Vec<SkillSystem> = read_json(&dir.join("skills.json"), "skills.json")?;

        let skill_index: HashMap<SkillId, usize> =
            skills.iter().enumerate().map(|(i, s)| (s.id, i)).collect();

        if !skill_index.contains_key(&torso_up_id) {
            return Err(InputError::UnknownTorsoUp(torso_up_id).into());
        }
        for armor in &armors {
            for effect in &armor.effects {
                if !skill_index.contains_key(&effect.skill_id) {
                    return Err(InputError::UnknownSkill(effect.skill_id).into());
                }
            }
        }
        for jewel in &jewels {
            for effect in &jewel.effects {
                if !skill_index.contains_key(&effect.skill_id) {
                    return Err(InputError::UnknownSkill(effect.skill_id).into());
                }
            }
        }

        let mut by_part: HashMap<ArmorPart, Vec<ArmorId>> = HashMap::new();
        for armor in &armors {
            by_part.entry(armor.part).or_default().push(armor.id);
        }

        let next_amulet_id = armors.iter().map(|a| a.id).max().unwrap_or(0) + 1;

        Ok(Self {
            armors,
            jewels,
            skills,
            skill_index,
            by_part,
            torso_up_id,
            amulets: Vec::new(),
            next_amulet_id,
        })
    }

    pub fn torso_up_id(&self) -> SkillId {
        self.torso_up_id
    }

    pub fn skill(&self, id: SkillId) -> Option<&SkillSystem> {
        self.skill_index.get(&id).map(|&i| &self.skills[i])
    }

    pub fn skills(&self) -> &[SkillSystem] {
        &self.skills
    }

    pub fn jewels(&self) -> &[Jewel] {
        &self.jewels
    }

    /// Number of armor pieces loaded from the catalog (excludes amulets).
    pub fn armor_count(&self) -> usize {
        self.armors.len()
    }

    pub fn armor(&self, id: ArmorId) -> Option<&ArmorPiece> {
        self.armors
            .iter()
            .chain(self.amulets.iter())
            .find(|a| a.id == id)
    }

    /// Ids of every piece in `part`, filtered by `filter`. For
    /// [`ArmorPart::Amulet`] this draws from [`Self::amulets_mut`]'s
    /// contents (always including the implicit "no amulet" alternative),
    /// never from the on-disk catalog.
    pub fn ids_in_part(&self, part: ArmorPart, filter: &ArmorFilter) -> Vec<ArmorId> {
        if part.is_amulet() {
            return self
                .amulets
                .iter()
                .filter(|a| filter(a))
                .map(|a| a.id)
                .collect();
        }
        self.by_part
            .get(&part)
            .into_iter()
            .flatten()
            .filter(|&&id| {
                self.armors
                    .iter()
                    .find(|a| a.id == id)
                    .map(filter)
                    .unwrap_or(false)
            })
            .copied()
            .collect()
    }

    /// Splices `query.amulets` into the amulet slot for the duration of
    /// one query, always prepending the implicit "no amulet" piece so the
    /// amulet forest is never vacuous. Mirrors `DataSet::AddExtraArmor` /
    /// `ClearExtraArmor` in `armor_up.h`: the one place this engine
    /// mutates catalog state, and only ever for the lifetime of a single
    /// search call. The none-amulet is given a reserved id out of
    /// `next_amulet_id` rather than `0`, since `0` can collide with a real
    /// armor piece and `armor()` searches `armors` before `amulets`.
    pub fn amulets_mut(&mut self) -> &mut Vec<ArmorPiece> {
        self.amulets.clear();
        let none_id = self.next_amulet_id;
        self.next_amulet_id += 1;
        self.amulets.push(ArmorPiece::none(none_id));
        &mut self.amulets
    }

    /// Registers `amulet` under a fresh id and appends it to the current
    /// amulet slot contents.
    pub fn push_amulet(&mut self, mut amulet: ArmorPiece) -> ArmorId {
        amulet.id = self.next_amulet_id;
        amulet.part = ArmorPart::Amulet;
        self.next_amulet_id += 1;
        let id = amulet.id;
        self.amulets.push(amulet);
        id
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path, _name: &'static str) -> Result<Vec<T>> {
    let text = std::fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let rows = serde_json::from_str(&text).map_err(|source| InputError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(rows)
}
