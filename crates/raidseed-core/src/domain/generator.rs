//! Candidate generation
//!
//! Replays the raid RNG for one seed the same way the games do:
//!
//! 1. encryption constant
//! 2. throwaway trainer ID, then PID (shininess)
//! 3. flawless IV slots, then the remaining IVs
//! 4. ability slot
//! 5. gender
//! 6. nature
//! 7. height and weight scalars
//! 8. (Gen 9) scale, then the Tera type from a fresh stream
//!
//! The order is fixed: it decides which draw feeds which attribute.

use crate::constants::{
    IV_COUNT, IV_MAX, RATIO_MAGIC_FEMALE, RATIO_MAGIC_GENDERLESS, RATIO_MAGIC_MALE, TERA_TYPE_COUNT,
};
use crate::domain::criteria::SearchCriteria;
use crate::domain::personal::{SpeciesInfo, SpeciesLookup};
use crate::domain::shiny::{classify, finalize_pid, shiny_xor};
use crate::domain::template::{EncounterTemplate, ScaleRule, TeraTypeRule};
use crate::domain::types::{
    AbilityPermission, AbilitySlot, Gender, Generation, Nature, Shininess, ShinyRule, TrainerId,
};
use crate::domain::xoroshiro::Xoroshiro128Plus;
use serde::Serialize;
use std::convert::Infallible;
use thiserror::Error;

/// Attributes derived from one seed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub seed: u64,
    pub encryption_constant: u32,
    pub pid: u32,
    pub shininess: Shininess,
    /// HP, Atk, Def, SpA, SpD, Spe
    pub ivs: [u8; IV_COUNT],
    /// Bit `i` set when IV slot `i` was forced to 31
    pub flawless_slots: u8,
    pub ability_slot: AbilitySlot,
    /// Permission the slot was rolled under
    pub ability_permission: AbilityPermission,
    /// Ability id from the species table
    pub ability: u16,
    pub gender: Gender,
    pub nature: Nature,
    pub height: u8,
    pub weight: u8,
    /// Gen 9 only
    pub scale: Option<u8>,
    /// Gen 9 only
    pub tera_type: Option<u8>,
    pub form: u8,
}

impl Candidate {
    /// Number of IVs equal to 31
    pub fn perfect_iv_count(&self) -> usize {
        self.ivs.iter().filter(|&&iv| iv == IV_MAX).count()
    }
}

/// The template cannot produce a creature for this seed
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GenerationRejected {
    #[error("species {species} form {form} is missing from the species table")]
    UnknownSpecies { species: u16, form: u8 },

    #[error("encounter form {encounter} does not match requested form {requested}")]
    FormMismatch { encounter: u8, requested: u8 },

    #[error("gender ratio {0:#04X} has no Gen 9 threshold")]
    UnsupportedGenderRatio(u8),

    #[error("seed {seed:#X} exceeds the {generation:?} seed width")]
    SeedOutOfRange { seed: u64, generation: Generation },

    #[error("seed {0:#X} spawns a different encounter")]
    NotEncounterable(u64),
}

/// Gender resolution, decided once per template
#[derive(Clone, Copy, Debug)]
enum GenderRoll {
    Fixed(Gender),
    /// Gen 8: `next_int(253) + 1 < ratio` is female
    Ratio(u8),
    /// Gen 9: `next_int(100) < threshold` is female
    Percent(u64),
    Unsupported(u8),
}

impl GenderRoll {
    fn resolve(generation: Generation, ratio: u8) -> Self {
        match ratio {
            RATIO_MAGIC_GENDERLESS => GenderRoll::Fixed(Gender::Genderless),
            RATIO_MAGIC_FEMALE => GenderRoll::Fixed(Gender::Female),
            RATIO_MAGIC_MALE => GenderRoll::Fixed(Gender::Male),
            _ => match generation {
                Generation::Gen8 => GenderRoll::Ratio(ratio),
                Generation::Gen9 => match gen9_female_threshold(ratio) {
                    Some(threshold) => GenderRoll::Percent(threshold),
                    None => GenderRoll::Unsupported(ratio),
                },
            },
        }
    }
}

fn gen9_female_threshold(ratio: u8) -> Option<u64> {
    match ratio {
        0x1F => Some(12),
        0x3F => Some(25),
        0x7F => Some(50),
        0xBF => Some(75),
        0xE1 => Some(89),
        _ => None,
    }
}

fn fixed_gender_ratio(gender: Gender) -> u8 {
    match gender {
        Gender::Male => RATIO_MAGIC_MALE,
        Gender::Female => RATIO_MAGIC_FEMALE,
        Gender::Genderless => RATIO_MAGIC_GENDERLESS,
    }
}

/// Two raw draws summed, the games' bell-shaped size roll
#[inline]
fn size_roll(rng: &mut Xoroshiro128Plus) -> u8 {
    (rng.next_int(0x81) + rng.next_int(0x80)) as u8
}

fn roll_scale(rule: ScaleRule, rng: &mut Xoroshiro128Plus) -> u8 {
    match rule {
        ScaleRule::Random => size_roll(rng),
        ScaleRule::Xs => rng.next_int(0x10) as u8,
        ScaleRule::S => (rng.next_int(0x20) + 0x10) as u8,
        ScaleRule::M => (rng.next_int(0xA0) + 0x30) as u8,
        ScaleRule::L => (rng.next_int(0x20) + 0xD0) as u8,
        ScaleRule::Xl => (rng.next_int(0x10) + 0xF0) as u8,
        ScaleRule::Fixed(value) => value,
    }
}

// =============================================================================
// Stage filters
// =============================================================================

/// Checks run between derivation stages
///
/// `Miss` is the early-exit signal; the unfiltered run uses `Infallible`.
trait StageFilter {
    type Miss;

    fn shininess(&self, shininess: Shininess) -> Result<(), Self::Miss>;
    fn ivs(&self, ivs: &[u8; IV_COUNT]) -> Result<(), Self::Miss>;
    fn ability(&self, slot: AbilitySlot, rolled_under: AbilityPermission) -> Result<(), Self::Miss>;
    fn gender(&self, gender: Gender) -> Result<(), Self::Miss>;
    fn nature(&self, nature: Nature) -> Result<(), Self::Miss>;
}

struct Unfiltered;

impl StageFilter for Unfiltered {
    type Miss = Infallible;

    fn shininess(&self, _: Shininess) -> Result<(), Infallible> {
        Ok(())
    }
    fn ivs(&self, _: &[u8; IV_COUNT]) -> Result<(), Infallible> {
        Ok(())
    }
    fn ability(&self, _: AbilitySlot, _: AbilityPermission) -> Result<(), Infallible> {
        Ok(())
    }
    fn gender(&self, _: Gender) -> Result<(), Infallible> {
        Ok(())
    }
    fn nature(&self, _: Nature) -> Result<(), Infallible> {
        Ok(())
    }
}

/// Marker for a candidate failing the criteria
struct Miss;

fn check(accepted: bool) -> Result<(), Miss> {
    if accepted { Ok(()) } else { Err(Miss) }
}

impl StageFilter for SearchCriteria {
    type Miss = Miss;

    fn shininess(&self, shininess: Shininess) -> Result<(), Miss> {
        check(self.accepts_shininess(shininess))
    }
    fn ivs(&self, ivs: &[u8; IV_COUNT]) -> Result<(), Miss> {
        check(self.accepts_ivs(ivs))
    }
    fn ability(&self, slot: AbilitySlot, rolled_under: AbilityPermission) -> Result<(), Miss> {
        check(self.accepts_ability(slot, rolled_under))
    }
    fn gender(&self, gender: Gender) -> Result<(), Miss> {
        check(self.accepts_gender(gender))
    }
    fn nature(&self, nature: Nature) -> Result<(), Miss> {
        check(self.accepts_nature(nature))
    }
}

enum Stop<M> {
    Rejected(GenerationRejected),
    Filtered(M),
}

impl<M> From<GenerationRejected> for Stop<M> {
    fn from(rejected: GenerationRejected) -> Self {
        Stop::Rejected(rejected)
    }
}

// =============================================================================
// Generator
// =============================================================================

/// Candidate generator for one template and trainer
///
/// Template fields are resolved once here, so the per-seed path only replays
/// the RNG.
#[derive(Clone, Debug)]
pub struct CandidateGenerator<'t> {
    template: &'t EncounterTemplate,
    trainer: TrainerId,
    generation: Generation,
    shiny: ShinyRule,
    species: Option<SpeciesInfo>,
    gender: GenderRoll,
}

impl<'t> CandidateGenerator<'t> {
    pub fn new(
        template: &'t EncounterTemplate,
        trainer: TrainerId,
        lookup: &dyn SpeciesLookup,
    ) -> Self {
        let generation = template.generation();
        let species = lookup.species_info(template.species, template.form);
        let ratio = match (template.gender, species) {
            (Some(gender), _) => fixed_gender_ratio(gender),
            (None, Some(info)) => info.gender_ratio,
            // Unknown species: every seed is rejected before gender matters
            (None, None) => RATIO_MAGIC_GENDERLESS,
        };

        Self {
            template,
            trainer,
            generation,
            shiny: template.effective_shiny(),
            species,
            gender: GenderRoll::resolve(generation, ratio),
        }
    }

    pub fn template(&self) -> &'t EncounterTemplate {
        self.template
    }

    /// Derive every attribute for `seed`
    ///
    /// A dynamic-form template reports its raw form value; see
    /// [`generate_matching`](Self::generate_matching) to pin the form.
    pub fn generate(&self, seed: u64) -> Result<Candidate, GenerationRejected> {
        self.derive(seed, self.template.form, &Unfiltered).map_err(|stop| match stop {
            Stop::Rejected(rejected) => rejected,
            Stop::Filtered(never) => match never {},
        })
    }

    /// Derive `seed` and stop at the first stage failing `criteria`
    ///
    /// Returns `Ok(None)` for a seed that does not match. A returned candidate
    /// always satisfies [`matches`](crate::domain::criteria::matches).
    pub fn generate_matching(
        &self,
        seed: u64,
        criteria: &SearchCriteria,
    ) -> Result<Option<Candidate>, GenerationRejected> {
        let form = self.resolve_form(criteria.form)?;
        match self.derive(seed, form, criteria) {
            Ok(candidate) => Ok(Some(candidate)),
            Err(Stop::Filtered(Miss)) => Ok(None),
            Err(Stop::Rejected(rejected)) => Err(rejected),
        }
    }

    /// Form of the produced creature for a requested form
    ///
    /// Dynamic-form encounters take whatever form was requested.
    fn resolve_form(&self, requested: Option<u8>) -> Result<u8, GenerationRejected> {
        match requested {
            Some(requested) if self.template.has_dynamic_form() => Ok(requested),
            Some(requested) if requested != self.template.form => {
                Err(GenerationRejected::FormMismatch {
                    encounter: self.template.form,
                    requested,
                })
            }
            _ => Ok(self.template.form),
        }
    }

    fn derive<F: StageFilter>(
        &self,
        seed: u64,
        form: u8,
        filter: &F,
    ) -> Result<Candidate, Stop<F::Miss>> {
        if seed > self.generation.max_seed() {
            return Err(GenerationRejected::SeedOutOfRange {
                seed,
                generation: self.generation,
            }
            .into());
        }
        if !self.template.can_be_encountered(seed) {
            return Err(GenerationRejected::NotEncounterable(seed).into());
        }
        let species = self.species.ok_or(GenerationRejected::UnknownSpecies {
            species: self.template.species,
            form: self.template.form,
        })?;
        if let GenderRoll::Unsupported(ratio) = self.gender {
            return Err(GenerationRejected::UnsupportedGenderRatio(ratio).into());
        }

        let mut rng = Xoroshiro128Plus::new(seed);

        let encryption_constant = rng.next_u32();
        let fake_id = rng.next_u32();
        let rolled_pid = rng.next_u32();
        let pid = finalize_pid(self.shiny, rolled_pid, fake_id, self.trainer);
        let shininess = classify(shiny_xor(pid, self.trainer.id32()));
        filter.shininess(shininess).map_err(Stop::Filtered)?;

        let (ivs, flawless_slots) = self.roll_ivs(&mut rng);
        filter.ivs(&ivs).map_err(Stop::Filtered)?;

        let ability_permission = self.template.ability;
        let ability_slot = ability_permission.roll(|n| rng.next_int(n));
        filter
            .ability(ability_slot, ability_permission)
            .map_err(Stop::Filtered)?;

        let gender = match self.gender {
            GenderRoll::Fixed(gender) => gender,
            GenderRoll::Ratio(ratio) if rng.next_int(253) + 1 < ratio as u64 => Gender::Female,
            GenderRoll::Percent(threshold) if rng.next_int(100) < threshold => Gender::Female,
            _ => Gender::Male,
        };
        filter.gender(gender).map_err(Stop::Filtered)?;

        let nature = match self.template.nature {
            Some(nature) => nature,
            None => {
                let natures = species.natures.natures();
                natures[rng.next_int(natures.len() as u64) as usize]
            }
        };
        filter.nature(nature).map_err(Stop::Filtered)?;

        let height = size_roll(&mut rng);
        let weight = size_roll(&mut rng);

        let (scale, tera_type) = match self.generation {
            Generation::Gen8 => (None, None),
            Generation::Gen9 => {
                let scale = roll_scale(self.template.scale, &mut rng);
                let tera_type = match self.template.tera_type {
                    TeraTypeRule::Random => {
                        Xoroshiro128Plus::new(seed).next_int(TERA_TYPE_COUNT) as u8
                    }
                    TeraTypeRule::Fixed(t) => t,
                };
                (Some(scale), Some(tera_type))
            }
        };

        Ok(Candidate {
            seed,
            encryption_constant,
            pid,
            shininess,
            ivs,
            flawless_slots,
            ability_slot,
            ability_permission,
            ability: species.abilities[ability_slot.index()],
            gender,
            nature,
            height,
            weight,
            scale,
            tera_type,
            form,
        })
    }

    /// Fixed IVs, or `flawless_ivs` distinct slots at 31 and the rest random
    fn roll_ivs(&self, rng: &mut Xoroshiro128Plus) -> ([u8; IV_COUNT], u8) {
        let mut ivs = [0u8; IV_COUNT];

        if let Some(fixed) = &self.template.fixed_ivs {
            for (iv, slot) in ivs.iter_mut().zip(fixed) {
                *iv = match *slot {
                    Some(value) => value,
                    None => rng.next_int(IV_MAX as u64 + 1) as u8,
                };
            }
            return (ivs, 0);
        }

        let mut flawless_slots = 0u8;
        for _ in 0..self.template.flawless_ivs {
            let mut index = rng.next_int(IV_COUNT as u64);
            while flawless_slots & (1 << index) != 0 {
                index = rng.next_int(IV_COUNT as u64);
            }
            flawless_slots |= 1 << index;
        }

        for (i, iv) in ivs.iter_mut().enumerate() {
            *iv = if flawless_slots & (1 << i) != 0 {
                IV_MAX
            } else {
                rng.next_int(IV_MAX as u64 + 1) as u8
            };
        }

        (ivs, flawless_slots)
    }
}
