//! Encounter templates
//!
//! A template is the static description of a raid encounter: which species it
//! yields and which attributes the game fixes instead of rolling. The concrete
//! encounter kinds only differ in their discriminant; all generation inputs
//! live in the shared field set.

use crate::constants::{FORM_DYNAMIC, IV_COUNT, IV_MAX, STAR_ROLL_RANGE, TERA_TYPE_COUNT};
use crate::domain::types::{AbilityPermission, Gender, Generation, Nature, ShinyRule};
use crate::domain::xoroshiro::Xoroshiro128Plus;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Fixed IV vector: `Some(v)` fixes a slot, `None` leaves it random
pub type FixedIvs = [Option<u8>; IV_COUNT];

/// Raid encounter kinds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EncounterKind {
    /// Gen 8 regular Max Raid den
    Den { stars: u8 },
    /// Gen 8 Crystal den
    Crystal,
    /// Gen 8 distribution (event) den
    Distribution { index: u16 },
    /// Gen 8 Dynamax Adventure (never shiny)
    MaxLair,
    /// Gen 9 base Tera raid
    Tera { stars: u8 },
    /// Gen 9 distribution Tera raid
    TeraDistribution { index: u16 },
    /// Gen 9 7-star "Mightiest" raid
    Might { stars: u8 },
}

impl EncounterKind {
    pub fn generation(self) -> Generation {
        match self {
            EncounterKind::Den { .. }
            | EncounterKind::Crystal
            | EncounterKind::Distribution { .. }
            | EncounterKind::MaxLair => Generation::Gen8,
            EncounterKind::Tera { .. }
            | EncounterKind::TeraDistribution { .. }
            | EncounterKind::Might { .. } => Generation::Gen9,
        }
    }
}

impl fmt::Display for EncounterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncounterKind::Den { stars } => write!(f, "Normal Den - {}★", stars),
            EncounterKind::Crystal => f.write_str("Crystal Den"),
            EncounterKind::Distribution { index } => write!(f, "Event #{}", index),
            EncounterKind::MaxLair => f.write_str("Max Lair"),
            EncounterKind::Tera { stars } => write!(f, "Tera Raid - {}★", stars),
            EncounterKind::TeraDistribution { index } => write!(f, "Tera Event #{}", index),
            EncounterKind::Might { stars } => write!(f, "Mightiest - {}★", stars),
        }
    }
}

/// Gen 9 size scalar rule
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleRule {
    #[default]
    Random,
    Xs,
    S,
    M,
    L,
    Xl,
    Fixed(u8),
}

/// Gen 9 Tera type rule
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeraTypeRule {
    #[default]
    Random,
    Fixed(u8),
}

/// Gen 9 encounter rate window
///
/// A seed selects the encounter when its rate roll `next_int(total)` lands in
/// `min..min + rate`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EncounterRate {
    pub total: u16,
    pub min: u16,
    pub rate: u16,
}

/// Static description of a raid encounter
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterTemplate {
    pub kind: EncounterKind,
    pub species: u16,
    /// Fixed form, or [`FORM_DYNAMIC`] and above for a form chosen at encounter time
    #[serde(default)]
    pub form: u8,
    /// Number of IVs forced to 31 (0-6)
    #[serde(default)]
    pub flawless_ivs: u8,
    /// Fixed IV vector; exclusive with `flawless_ivs`
    #[serde(default)]
    pub fixed_ivs: Option<FixedIvs>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub nature: Option<Nature>,
    #[serde(default)]
    pub ability: AbilityPermission,
    #[serde(default)]
    pub shiny: ShinyRule,
    #[serde(default)]
    pub scale: ScaleRule,
    #[serde(default)]
    pub tera_type: TeraTypeRule,
    /// Gen 9 only; `None` means every seed yields this encounter
    #[serde(default)]
    pub rate: Option<EncounterRate>,
    #[serde(default)]
    pub can_gigantamax: bool,
}

/// Structural template errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("flawless IV count {0} exceeds 6")]
    TooManyFlawless(u8),

    #[error("fixed IVs and {0} flawless IVs are mutually exclusive")]
    FixedAndFlawless(u8),

    #[error("fixed IV {value} in slot {slot} exceeds 31")]
    FixedIvOutOfRange { slot: usize, value: u8 },

    #[error("Tera type {0} is out of range")]
    TeraTypeOutOfRange(u8),

    #[error("encounter rate window {min}+{rate} does not fit in total {total}")]
    InvalidRate { total: u16, min: u16, rate: u16 },

    #[error("encounter rates only apply to Gen 9 templates")]
    RateOnGen8,
}

impl EncounterTemplate {
    /// Template with every attribute random and no flawless IVs
    pub fn new(kind: EncounterKind, species: u16, form: u8) -> Self {
        Self {
            kind,
            species,
            form,
            flawless_ivs: 0,
            fixed_ivs: None,
            gender: None,
            nature: None,
            ability: AbilityPermission::Any12H,
            shiny: ShinyRule::Random,
            scale: ScaleRule::Random,
            tera_type: TeraTypeRule::Random,
            rate: None,
            can_gigantamax: false,
        }
    }

    pub fn with_flawless_ivs(mut self, count: u8) -> Self {
        self.flawless_ivs = count;
        self
    }

    pub fn with_fixed_ivs(mut self, ivs: FixedIvs) -> Self {
        self.fixed_ivs = Some(ivs);
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

    pub fn with_scale(mut self, scale: ScaleRule) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_tera_type(mut self, tera_type: TeraTypeRule) -> Self {
        self.tera_type = tera_type;
        self
    }

    pub fn with_rate(mut self, total: u16, min: u16, rate: u16) -> Self {
        self.rate = Some(EncounterRate { total, min, rate });
        self
    }

    pub fn with_gigantamax(mut self) -> Self {
        self.can_gigantamax = true;
        self
    }

    pub fn generation(&self) -> Generation {
        self.kind.generation()
    }

    /// Whether the form is picked at encounter time instead of fixed
    pub fn has_dynamic_form(&self) -> bool {
        self.form >= FORM_DYNAMIC
    }

    /// Whether `seed` spawns this encounter at all
    ///
    /// Replays the rate roll on its own stream. Every star count except 6
    /// draws the star roll first.
    pub fn can_be_encountered(&self, seed: u64) -> bool {
        let Some(rate) = self.rate else {
            return true;
        };

        let mut rng = Xoroshiro128Plus::new(seed);
        if !matches!(self.kind, EncounterKind::Tera { stars: 6 }) {
            rng.next_int(STAR_ROLL_RANGE);
        }
        let roll = rng.next_int(rate.total as u64);
        roll.wrapping_sub(rate.min as u64) < rate.rate as u64
    }

    /// Shiny rule actually applied during generation
    pub fn effective_shiny(&self) -> ShinyRule {
        match self.kind {
            EncounterKind::MaxLair => ShinyRule::Never,
            _ => self.shiny,
        }
    }

    /// Check the template invariants
    pub fn validate(&self) -> Result<(), TemplateError> {
        if self.flawless_ivs as usize > IV_COUNT {
            return Err(TemplateError::TooManyFlawless(self.flawless_ivs));
        }

        if let Some(ivs) = &self.fixed_ivs {
            if self.flawless_ivs != 0 {
                return Err(TemplateError::FixedAndFlawless(self.flawless_ivs));
            }
            let out_of_range = ivs
                .iter()
                .enumerate()
                .find_map(|(slot, value)| value.filter(|&v| v > IV_MAX).map(|v| (slot, v)));
            if let Some((slot, value)) = out_of_range {
                return Err(TemplateError::FixedIvOutOfRange { slot, value });
            }
        }

        match self.tera_type {
            TeraTypeRule::Fixed(t) if t as u64 >= TERA_TYPE_COUNT => {
                return Err(TemplateError::TeraTypeOutOfRange(t));
            }
            _ => {}
        }

        match self.rate {
            Some(_) if self.generation() == Generation::Gen8 => Err(TemplateError::RateOnGen8),
            Some(EncounterRate { total, min, rate })
                if total == 0 || min as u32 + rate as u32 > total as u32 =>
            {
                Err(TemplateError::InvalidRate { total, min, rate })
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn den() -> EncounterTemplate {
        EncounterTemplate::new(EncounterKind::Den { stars: 5 }, 6, 0)
    }

    #[test]
    fn test_validate_default_template() {
        assert_eq!(den().validate(), Ok(()));
        assert_eq!(den().with_flawless_ivs(6).validate(), Ok(()));
    }

    #[test]
    fn test_validate_too_many_flawless() {
        assert_eq!(
            den().with_flawless_ivs(7).validate(),
            Err(TemplateError::TooManyFlawless(7))
        );
    }

    #[test]
    fn test_validate_fixed_and_flawless_exclusive() {
        let template = den()
            .with_flawless_ivs(3)
            .with_fixed_ivs([Some(31), None, None, None, None, None]);
        assert_eq!(template.validate(), Err(TemplateError::FixedAndFlawless(3)));
    }

    #[test]
    fn test_validate_fixed_iv_out_of_range() {
        let template = den().with_fixed_ivs([None, None, Some(32), None, None, None]);
        assert_eq!(
            template.validate(),
            Err(TemplateError::FixedIvOutOfRange { slot: 2, value: 32 })
        );
    }

    #[test]
    fn test_validate_tera_type_out_of_range() {
        let template = EncounterTemplate::new(EncounterKind::Tera { stars: 5 }, 6, 0)
            .with_tera_type(TeraTypeRule::Fixed(18));
        assert_eq!(template.validate(), Err(TemplateError::TeraTypeOutOfRange(18)));
    }

    #[test]
    fn test_max_lair_is_never_shiny() {
        let template =
            EncounterTemplate::new(EncounterKind::MaxLair, 144, 1).with_shiny(ShinyRule::Always);
        assert_eq!(template.effective_shiny(), ShinyRule::Never);
        assert_eq!(den().with_shiny(ShinyRule::Always).effective_shiny(), ShinyRule::Always);
    }

    #[test]
    fn test_generation_by_kind() {
        assert_eq!(den().generation(), Generation::Gen8);
        assert_eq!(EncounterKind::Might { stars: 7 }.generation(), Generation::Gen9);
        assert_eq!(EncounterKind::TeraDistribution { index: 3 }.generation(), Generation::Gen9);
    }

    #[test]
    fn test_template_json() {
        let json = r#"{
            "kind": { "type": "den", "stars": 4 },
            "species": 133,
            "flawless_ivs": 3,
            "ability": "any12",
            "shiny": "always_star"
        }"#;
        let template: EncounterTemplate = serde_json::from_str(json).unwrap();
        assert_eq!(template.kind, EncounterKind::Den { stars: 4 });
        assert_eq!(template.species, 133);
        assert_eq!(template.form, 0);
        assert_eq!(template.flawless_ivs, 3);
        assert_eq!(template.ability, AbilityPermission::Any12);
        assert_eq!(template.shiny, ShinyRule::AlwaysStar);
        assert_eq!(template.fixed_ivs, None);
    }

    #[test]
    fn test_validate_rate() {
        let tera = EncounterTemplate::new(EncounterKind::Tera { stars: 5 }, 6, 0);
        assert_eq!(tera.clone().with_rate(100, 20, 30).validate(), Ok(()));
        assert_eq!(
            tera.clone().with_rate(100, 80, 30).validate(),
            Err(TemplateError::InvalidRate {
                total: 100,
                min: 80,
                rate: 30
            })
        );
        assert!(matches!(
            tera.with_rate(0, 0, 0).validate(),
            Err(TemplateError::InvalidRate { .. })
        ));
        assert_eq!(
            den().with_rate(100, 0, 50).validate(),
            Err(TemplateError::RateOnGen8)
        );
    }

    #[test]
    fn test_can_be_encountered_window() {
        let template =
            EncounterTemplate::new(EncounterKind::Tera { stars: 5 }, 6, 0).with_rate(100, 20, 30);
        let hits: Vec<u64> = (0..100u64).filter(|&s| template.can_be_encountered(s)).collect();
        assert_eq!(hits.len(), 29);
        assert_eq!(&hits[..6], &[0, 8, 12, 19, 37, 38]);

        // Without a window every seed qualifies
        assert!((0..100u64).all(|s| den().can_be_encountered(s)));
    }

    #[test]
    fn test_six_star_skips_star_roll() {
        let template =
            EncounterTemplate::new(EncounterKind::Tera { stars: 6 }, 6, 0).with_rate(100, 20, 30);
        let hits: Vec<u64> = (0..100u64).filter(|&s| template.can_be_encountered(s)).collect();
        assert_eq!(hits.len(), 37);
        assert_eq!(&hits[..6], &[23, 27, 32, 33, 34, 35]);
    }

    #[test]
    fn test_dynamic_form() {
        assert!(!den().has_dynamic_form());
        let random_form = EncounterTemplate::new(EncounterKind::Den { stars: 5 }, 869, 31);
        assert!(random_form.has_dynamic_form());
    }

    #[test]
    fn test_gigantamax_flag_json() {
        let json = r#"{
            "kind": { "type": "den", "stars": 5 },
            "species": 6,
            "can_gigantamax": true
        }"#;
        let template: EncounterTemplate = serde_json::from_str(json).unwrap();
        assert!(template.can_gigantamax);
        assert_eq!(template, den().with_gigantamax());
        assert!(!den().can_gigantamax);
    }
}
