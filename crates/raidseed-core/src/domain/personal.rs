//! Species/form metadata consumed by the candidate generator
//!
//! The search engine does not own species data; callers hand it a read-only
//! lookup keyed by `(species, form)`.

use crate::domain::types::Nature;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Natures a species can roll, indexed by `next_int(len)`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NatureTable {
    #[default]
    All,
    /// Toxtricity, Amped form
    Amped,
    /// Toxtricity, Low Key form
    LowKey,
}

const AMPED_NATURES: [Nature; 13] = [
    Nature::Adamant,
    Nature::Naughty,
    Nature::Brave,
    Nature::Impish,
    Nature::Lax,
    Nature::Rash,
    Nature::Sassy,
    Nature::Hasty,
    Nature::Jolly,
    Nature::Naive,
    Nature::Hardy,
    Nature::Docile,
    Nature::Quirky,
];

const LOW_KEY_NATURES: [Nature; 12] = [
    Nature::Lonely,
    Nature::Bold,
    Nature::Relaxed,
    Nature::Timid,
    Nature::Serious,
    Nature::Modest,
    Nature::Mild,
    Nature::Quiet,
    Nature::Bashful,
    Nature::Calm,
    Nature::Gentle,
    Nature::Careful,
];

impl NatureTable {
    /// Natures in draw order
    pub fn natures(self) -> &'static [Nature] {
        match self {
            NatureTable::All => &Nature::ALL,
            NatureTable::Amped => &AMPED_NATURES,
            NatureTable::LowKey => &LOW_KEY_NATURES,
        }
    }
}

/// Per species/form data needed for generation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesInfo {
    /// Gender ratio (0 = male only, 254 = female only, 255 = genderless)
    pub gender_ratio: u8,
    /// Ability ids for the first, second and hidden slots
    #[serde(default)]
    pub abilities: [u16; 3],
    #[serde(default)]
    pub natures: NatureTable,
}

impl SpeciesInfo {
    pub fn new(gender_ratio: u8, abilities: [u16; 3]) -> Self {
        Self {
            gender_ratio,
            abilities,
            natures: NatureTable::All,
        }
    }

    pub fn with_natures(mut self, natures: NatureTable) -> Self {
        self.natures = natures;
        self
    }
}

/// Read-only species/form lookup
pub trait SpeciesLookup: Sync {
    fn species_info(&self, species: u16, form: u8) -> Option<SpeciesInfo>;
}

/// In-memory species table
#[derive(Clone, Debug, Default)]
pub struct PersonalTable {
    entries: FxHashMap<(u16, u8), SpeciesInfo>,
}

impl PersonalTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry
    pub fn insert(&mut self, species: u16, form: u8, info: SpeciesInfo) {
        self.entries.insert((species, form), info);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SpeciesLookup for PersonalTable {
    fn species_info(&self, species: u16, form: u8) -> Option<SpeciesInfo> {
        // Forms without their own entry share the base form's data
        self.entries
            .get(&(species, form))
            .or_else(|| self.entries.get(&(species, 0)))
            .copied()
    }
}

impl FromIterator<(u16, u8, SpeciesInfo)> for PersonalTable {
    fn from_iter<I: IntoIterator<Item = (u16, u8, SpeciesInfo)>>(iter: I) -> Self {
        let mut table = PersonalTable::new();
        for (species, form, info) in iter {
            table.insert(species, form, info);
        }
        table
    }
}
