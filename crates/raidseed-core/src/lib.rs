//! raidseed-core - Seed search engine for Gen 8/9 Pokemon raid encounters
//!
//! This crate provides functionality to:
//! - Replay the Xoroshiro128+ raid generation of Sword/Shield and Scarlet/Violet
//! - Filter derived creatures against IV, gender, nature, ability and shiny criteria
//! - Scan seed ranges in parallel batches with progress reporting and cancellation

pub mod constants;
pub mod domain;
pub mod infra;
pub mod app;

// Re-export commonly used types
pub use app::searcher::{SearchOutcome, SearchStatus, SeedResult, search, search_encounters};
pub use app::session::{
    CancellationToken, Progress, SearchConfig, SearchContext, SearchError, SearchSession,
    SessionState,
};
pub use constants::*;
pub use domain::criteria::{IvRange, SearchCriteria, matches};
pub use domain::generator::{Candidate, CandidateGenerator, GenerationRejected};
pub use domain::personal::{NatureTable, PersonalTable, SpeciesInfo, SpeciesLookup};
pub use domain::template::{
    EncounterKind, EncounterRate, EncounterTemplate, ScaleRule, TeraTypeRule,
};
pub use domain::types::{
    AbilityPermission, AbilitySlot, Gender, Generation, Nature, Shininess, ShinyRule, TrainerId,
};
pub use domain::xoroshiro::Xoroshiro128Plus;
pub use infra::seed_range::{RangeError, SeedRange, parse_seed_range};
