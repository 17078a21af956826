//! Domain layer - Pure computational logic
//!
//! This module contains pure functions and algorithms without I/O dependencies.

pub mod criteria;
pub mod generator;
pub mod personal;
pub mod shiny;
pub mod template;
pub mod types;
pub mod xoroshiro;
