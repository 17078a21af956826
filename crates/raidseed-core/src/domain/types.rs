//! Value types shared by templates, candidates and search criteria

use crate::constants::{GEN8_MAX_SEED, GEN9_MAX_SEED, NATURE_COUNT};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Game generation, which fixes the seed width and a few derivation details
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Generation {
    /// Sword/Shield Max Raid dens (64-bit seeds)
    Gen8,
    /// Scarlet/Violet Tera raids (32-bit seeds)
    Gen9,
}

impl Generation {
    /// Largest seed valid for this generation
    pub const fn max_seed(self) -> u64 {
        match self {
            Generation::Gen8 => GEN8_MAX_SEED,
            Generation::Gen9 => GEN9_MAX_SEED,
        }
    }
}

/// Trainer identity used for shininess
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainerId {
    pub tid: u16,
    pub sid: u16,
}

impl TrainerId {
    pub fn new(tid: u16, sid: u16) -> Self {
        Self { tid, sid }
    }

    /// Combined 32-bit ID (`sid << 16 | tid`)
    #[inline]
    pub fn id32(self) -> u32 {
        ((self.sid as u32) << 16) | self.tid as u32
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male = 0,
    Female = 1,
    Genderless = 2,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Gender::Male => "M",
            Gender::Female => "F",
            Gender::Genderless => "-",
        };
        f.write_str(symbol)
    }
}

/// The 25 natures, in game index order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Nature {
    Hardy,
    Lonely,
    Brave,
    Adamant,
    Naughty,
    Bold,
    Docile,
    Relaxed,
    Impish,
    Lax,
    Timid,
    Hasty,
    Serious,
    Jolly,
    Naive,
    Modest,
    Mild,
    Quiet,
    Bashful,
    Rash,
    Calm,
    Gentle,
    Sassy,
    Careful,
    Quirky,
}

impl Nature {
    pub const ALL: [Nature; NATURE_COUNT as usize] = [
        Nature::Hardy,
        Nature::Lonely,
        Nature::Brave,
        Nature::Adamant,
        Nature::Naughty,
        Nature::Bold,
        Nature::Docile,
        Nature::Relaxed,
        Nature::Impish,
        Nature::Lax,
        Nature::Timid,
        Nature::Hasty,
        Nature::Serious,
        Nature::Jolly,
        Nature::Naive,
        Nature::Modest,
        Nature::Mild,
        Nature::Quiet,
        Nature::Bashful,
        Nature::Rash,
        Nature::Calm,
        Nature::Gentle,
        Nature::Sassy,
        Nature::Careful,
        Nature::Quirky,
    ];

    /// Nature for a game index (0-24)
    pub fn from_index(index: u64) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn index(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Nature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Concrete ability slot of a generated creature
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbilitySlot {
    First = 0,
    Second = 1,
    Hidden = 2,
}

impl AbilitySlot {
    fn from_draw(value: u64) -> Self {
        match value {
            0 => AbilitySlot::First,
            1 => AbilitySlot::Second,
            _ => AbilitySlot::Hidden,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Which ability slots an encounter may roll, or a user accepts
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbilityPermission {
    /// Any of the three slots
    #[default]
    #[serde(rename = "any12h")]
    Any12H,
    /// First or second slot
    #[serde(rename = "any12")]
    Any12,
    OnlyFirst,
    OnlySecond,
    OnlyHidden,
}

impl AbilityPermission {
    /// Whether `slot` is reachable under this permission
    #[inline]
    pub fn allows(self, slot: AbilitySlot) -> bool {
        matches!(
            (self, slot),
            (AbilityPermission::Any12H, _)
                | (AbilityPermission::Any12, AbilitySlot::First | AbilitySlot::Second)
                | (AbilityPermission::OnlyFirst, AbilitySlot::First)
                | (AbilityPermission::OnlySecond, AbilitySlot::Second)
                | (AbilityPermission::OnlyHidden, AbilitySlot::Hidden)
        )
    }

    /// Roll a slot; `draw(n)` is only called for multi-slot permissions
    pub(crate) fn roll(self, draw: impl FnOnce(u64) -> u64) -> AbilitySlot {
        match self {
            AbilityPermission::Any12H => AbilitySlot::from_draw(draw(3)),
            AbilityPermission::Any12 => AbilitySlot::from_draw(draw(2)),
            AbilityPermission::OnlyFirst => AbilitySlot::First,
            AbilityPermission::OnlySecond => AbilitySlot::Second,
            AbilityPermission::OnlyHidden => AbilitySlot::Hidden,
        }
    }
}

/// Shininess rule of an encounter, or the shininess a user asks for
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShinyRule {
    #[default]
    Random,
    Never,
    Always,
    AlwaysSquare,
    AlwaysStar,
}

/// Derived shininess class
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shininess {
    None,
    /// Shiny with a PID/ID xor in 1..16
    Star,
    /// Shiny with a PID/ID xor of exactly 0
    Square,
}

impl Shininess {
    #[inline]
    pub fn is_shiny(self) -> bool {
        self != Shininess::None
    }

    /// Mark shown next to shiny results
    pub fn mark(self) -> &'static str {
        match self {
            Shininess::None => "",
            Shininess::Star => "★",
            Shininess::Square => "■",
        }
    }
}
