//! Search criteria and the candidate filter
//!
//! Every predicate here is pure and allocation free; the same per-stage checks
//! are used by [`matches`] and by the early-exit derivation in the generator.

use crate::constants::{IV_COUNT, IV_MAX};
use crate::domain::generator::Candidate;
use crate::domain::types::{AbilityPermission, AbilitySlot, Gender, Nature, Shininess, ShinyRule};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Inclusive IV range
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IvRange {
    pub min: u8,
    pub max: u8,
}

impl IvRange {
    pub const ANY: IvRange = IvRange { min: 0, max: IV_MAX };

    pub const fn new(min: u8, max: u8) -> Self {
        Self { min, max }
    }

    /// Range accepting a single value
    pub const fn exact(value: u8) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    #[inline]
    pub fn contains(self, iv: u8) -> bool {
        self.min <= iv && iv <= self.max
    }
}

impl Default for IvRange {
    fn default() -> Self {
        Self::ANY
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CriteriaError {
    #[error("IV range for stat {stat} is inverted ({min} > {max})")]
    InvertedIvRange { stat: usize, min: u8, max: u8 },

    #[error("IV bound {value} for stat {stat} exceeds 31")]
    IvOutOfRange { stat: usize, value: u8 },
}

/// User search filter
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCriteria {
    /// HP, Atk, Def, SpA, SpD, Spe
    #[serde(default = "any_ivs")]
    pub ivs: [IvRange; IV_COUNT],
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub nature: Option<Nature>,
    #[serde(default)]
    pub ability: AbilityPermission,
    #[serde(default)]
    pub shiny: ShinyRule,
    /// Desired form; templates with a different fixed form are rejected
    #[serde(default)]
    pub form: Option<u8>,
}

fn any_ivs() -> [IvRange; IV_COUNT] {
    [IvRange::ANY; IV_COUNT]
}

impl SearchCriteria {
    /// Criteria accepting every candidate
    pub fn any() -> Self {
        Self::default()
    }

    pub fn with_iv(mut self, stat: usize, range: IvRange) -> Self {
        self.ivs[stat] = range;
        self
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    pub fn with_nature(mut self, nature: Nature) -> Self {
        self.nature = Some(nature);
        self
    }

    pub fn with_ability(mut self, ability: AbilityPermission) -> Self {
        self.ability = ability;
        self
    }

    pub fn with_shiny(mut self, shiny: ShinyRule) -> Self {
        self.shiny = shiny;
        self
    }

    pub fn with_form(mut self, form: u8) -> Self {
        self.form = Some(form);
        self
    }

    pub fn validate(&self) -> Result<(), CriteriaError> {
        for (stat, range) in self.ivs.iter().enumerate() {
            if range.max > IV_MAX {
                return Err(CriteriaError::IvOutOfRange {
                    stat,
                    value: range.max,
                });
            }
            if range.min > range.max {
                return Err(CriteriaError::InvertedIvRange {
                    stat,
                    min: range.min,
                    max: range.max,
                });
            }
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Per-stage predicates
    // -------------------------------------------------------------------------

    #[inline]
    pub fn accepts_shininess(&self, shininess: Shininess) -> bool {
        match self.shiny {
            ShinyRule::Random => true,
            ShinyRule::Never => !shininess.is_shiny(),
            ShinyRule::Always => shininess.is_shiny(),
            ShinyRule::AlwaysSquare => shininess == Shininess::Square,
            ShinyRule::AlwaysStar => shininess == Shininess::Star,
        }
    }

    #[inline]
    pub fn accepts_ivs(&self, ivs: &[u8; IV_COUNT]) -> bool {
        self.ivs
            .iter()
            .zip(ivs)
            .all(|(range, &iv)| range.contains(iv))
    }

    /// `slot` must be reachable under the encounter's permission and the requested one
    #[inline]
    pub fn accepts_ability(&self, slot: AbilitySlot, rolled_under: AbilityPermission) -> bool {
        rolled_under.allows(slot) && self.ability.allows(slot)
    }

    #[inline]
    pub fn accepts_gender(&self, gender: Gender) -> bool {
        self.gender.is_none_or(|wanted| wanted == gender)
    }

    #[inline]
    pub fn accepts_nature(&self, nature: Nature) -> bool {
        self.nature.is_none_or(|wanted| wanted == nature)
    }
}

/// Check a derived candidate against the criteria (cheap checks first)
pub fn matches(candidate: &Candidate, criteria: &SearchCriteria) -> bool {
    criteria.accepts_shininess(candidate.shininess)
        && criteria.accepts_ivs(&candidate.ivs)
        && criteria.accepts_ability(candidate.ability_slot, candidate.ability_permission)
        && criteria.accepts_gender(candidate.gender)
        && criteria.accepts_nature(candidate.nature)
}
