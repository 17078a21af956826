//! Seed search related constants
//!
//! Note: Xoroshiro128+ parameters are defined in domain/xoroshiro.rs due to their independence.

// =============================================================================
// Scheduler parameters
// =============================================================================

/// Seeds evaluated per batch (unit of parallel scheduling and cancellation)
pub const BATCH_SIZE: u64 = 10_000;

/// Minimum number of checked seeds between two progress reports
pub const PROGRESS_INTERVAL: u64 = 50_000;

// =============================================================================
// Seed space
// =============================================================================

/// Largest Gen 8 (Sword/Shield) raid seed
pub const GEN8_MAX_SEED: u64 = u64::MAX;

/// Largest Gen 9 (Scarlet/Violet) Tera raid seed
pub const GEN9_MAX_SEED: u64 = u32::MAX as u64;

// =============================================================================
// Creature generation
// =============================================================================

/// Number of stats carrying an IV
pub const IV_COUNT: usize = 6;

/// Maximum IV value (a "flawless" IV)
pub const IV_MAX: u8 = 31;

/// Number of natures
pub const NATURE_COUNT: u64 = 25;

/// Shiny threshold: shiny when the PID/ID xor is below this value
pub const SHINY_THRESHOLD: u32 = 16;

/// XOR applied to a PID to break accidental shininess
pub const ANTI_SHINY_MASK: u32 = 0x1000_0000;

/// Number of Tera types
pub const TERA_TYPE_COUNT: u64 = 18;

// =============================================================================
// Encounter selection
// =============================================================================

/// Template forms at or above this value are chosen when the encounter is
/// generated (random or location-dependent forms)
pub const FORM_DYNAMIC: u8 = 30;

/// Range of the star-count roll that precedes a Gen 9 encounter rate roll
pub const STAR_ROLL_RANGE: u64 = 100;

// =============================================================================
// Gender ratios
// =============================================================================

/// Gender ratio: always male
pub const RATIO_MAGIC_MALE: u8 = 0;

/// Gender ratio: always female
pub const RATIO_MAGIC_FEMALE: u8 = 254;

/// Gender ratio: genderless
pub const RATIO_MAGIC_GENDERLESS: u8 = 255;
