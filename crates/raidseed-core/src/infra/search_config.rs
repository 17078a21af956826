//! Search request files
//!
//! A request bundles everything a search needs in one JSON document:
//!
//! ```json
//! {
//!   "trainer": { "tid": 12345, "sid": 54321 },
//!   "species": [{ "species": 133, "gender_ratio": 31, "abilities": [50, 91, 107] }],
//!   "encounters": [{ "kind": { "type": "den", "stars": 5 }, "species": 133, "flawless_ivs": 4 }],
//!   "criteria": { "shiny": "always" },
//!   "start": "0",
//!   "end": "FFFFFF",
//!   "max_results": 100
//! }
//! ```

use crate::domain::criteria::SearchCriteria;
use crate::domain::personal::{PersonalTable, SpeciesInfo};
use crate::domain::template::EncounterTemplate;
use crate::domain::types::{Generation, TrainerId};
use crate::infra::seed_range::{RangeError, SeedRange, parse_seed_range};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Result cap used when a request omits `max_results`
pub const DEFAULT_MAX_RESULTS: u32 = 1_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid request file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid seed range: {0}")]
    Range(#[from] RangeError),
}

/// One species table row
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesEntry {
    pub species: u16,
    #[serde(default)]
    pub form: u8,
    #[serde(flatten)]
    pub info: SpeciesInfo,
}

/// JSON search request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfigFile {
    pub trainer: TrainerId,
    #[serde(default)]
    pub species: Vec<SpeciesEntry>,
    pub encounters: Vec<EncounterTemplate>,
    #[serde(default)]
    pub criteria: SearchCriteria,
    /// Hexadecimal start seed; empty means 0
    #[serde(default)]
    pub start: String,
    /// Hexadecimal end seed; empty means the largest seed
    #[serde(default)]
    pub end: String,
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    /// Worker thread override
    #[serde(default)]
    pub threads: Option<usize>,
    /// Batch size override
    #[serde(default)]
    pub batch_size: Option<u64>,
}

fn default_max_results() -> u32 {
    DEFAULT_MAX_RESULTS
}

impl SearchConfigFile {
    /// Narrowest generation among the encounters
    ///
    /// Any Gen 9 encounter limits the range to 32-bit seeds.
    pub fn generation(&self) -> Generation {
        if self.encounters.iter().any(|e| e.generation() == Generation::Gen9) {
            Generation::Gen9
        } else {
            Generation::Gen8
        }
    }

    pub fn seed_range(&self) -> Result<SeedRange, RangeError> {
        parse_seed_range(&self.start, &self.end, self.generation())
    }

    pub fn personal_table(&self) -> PersonalTable {
        self.species
            .iter()
            .map(|entry| (entry.species, entry.form, entry.info))
            .collect()
    }
}

/// Load a request file and check that its seed range parses
pub fn load_search_config(path: impl AsRef<Path>) -> Result<SearchConfigFile, ConfigError> {
    let text = fs::read_to_string(path)?;
    let config: SearchConfigFile = serde_json::from_str(&text)?;
    config.seed_range()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::personal::{NatureTable, SpeciesLookup};
    use crate::domain::template::{EncounterKind, EncounterRate};
    use crate::domain::types::ShinyRule;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const REQUEST: &str = r#"{
        "trainer": { "tid": 12345, "sid": 54321 },
        "species": [
            { "species": 133, "gender_ratio": 31, "abilities": [50, 91, 107] }
        ],
        "encounters": [
            { "kind": { "type": "den", "stars": 5 }, "species": 133, "flawless_ivs": 4 }
        ],
        "criteria": { "shiny": "always" },
        "start": "0",
        "end": "FFFF"
    }"#;

    fn write_request(text: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_search_config() {
        let file = write_request(REQUEST);
        let config = load_search_config(file.path()).unwrap();

        assert_eq!(config.trainer, TrainerId::new(12345, 54321));
        assert_eq!(config.encounters.len(), 1);
        assert_eq!(config.encounters[0].kind, EncounterKind::Den { stars: 5 });
        assert_eq!(config.criteria.shiny, ShinyRule::Always);
        assert_eq!(config.max_results, DEFAULT_MAX_RESULTS);
        assert_eq!(config.threads, None);
        assert_eq!(config.seed_range().unwrap(), SeedRange::new(0, 0xFFFF));

        let table = config.personal_table();
        assert_eq!(table.species_info(133, 0).map(|i| i.gender_ratio), Some(31));
    }

    #[test]
    fn test_request_round_trip() {
        let config: SearchConfigFile = serde_json::from_str(REQUEST).unwrap();
        let text = serde_json::to_string_pretty(&config).unwrap();
        let reparsed: SearchConfigFile = serde_json::from_str(&text).unwrap();
        assert_eq!(config, reparsed);
    }

    #[test]
    fn test_gen9_encounter_narrows_range() {
        let mut config: SearchConfigFile = serde_json::from_str(REQUEST).unwrap();
        config
            .encounters
            .push(EncounterTemplate::new(EncounterKind::Tera { stars: 5 }, 133, 0));
        config.end = String::new();

        assert_eq!(config.generation(), Generation::Gen9);
        assert_eq!(
            config.seed_range().unwrap(),
            SeedRange::new(0, u32::MAX as u64)
        );
    }

    #[test]
    fn test_load_rejects_bad_range() {
        let file = write_request(&REQUEST.replace(r#""end": "FFFF""#, r#""end": "zz""#));
        assert!(matches!(
            load_search_config(file.path()),
            Err(ConfigError::Range(RangeError::InvalidHex(_)))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_search_config(dir.path().join("missing.json"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_malformed_json() {
        let file = write_request("{ \"trainer\": ");
        assert!(matches!(
            load_search_config(file.path()),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_load_tera_rate_and_species_natures() {
        let file = write_request(
            r#"{
            "trainer": { "tid": 1, "sid": 2 },
            "species": [
                { "species": 849, "gender_ratio": 127, "natures": "amped" },
                { "species": 849, "form": 1, "gender_ratio": 127, "natures": "low_key" }
            ],
            "encounters": [
                {
                    "kind": { "type": "tera", "stars": 5 },
                    "species": 849,
                    "form": 31,
                    "rate": { "total": 100, "min": 20, "rate": 30 }
                },
                { "kind": { "type": "den", "stars": 5 }, "species": 849, "can_gigantamax": true }
            ]
        }"#,
        );
        let config = load_search_config(file.path()).unwrap();

        let tera = &config.encounters[0];
        assert!(tera.has_dynamic_form());
        assert_eq!(
            tera.rate,
            Some(EncounterRate {
                total: 100,
                min: 20,
                rate: 30
            })
        );
        assert!(config.encounters[1].can_gigantamax);

        let table = config.personal_table();
        assert_eq!(table.species_info(849, 0).map(|i| i.natures), Some(NatureTable::Amped));
        assert_eq!(table.species_info(849, 1).map(|i| i.natures), Some(NatureTable::LowKey));
    }
}
