//! Infrastructure layer - I/O and external dependencies
//!
//! This module handles request files and seed range text.

pub mod search_config;
pub mod seed_range;
