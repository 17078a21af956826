//! Seed range parsing and batching
//!
//! Ranges arrive as hexadecimal text. An empty bound selects the edge of the
//! generation's seed space, so `("", "")` is the full range.

use crate::domain::types::Generation;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RangeError {
    #[error("invalid hexadecimal seed: {0:?}")]
    InvalidHex(String),

    #[error("start seed {start:#X} is greater than end seed {end:#X}")]
    StartAfterEnd { start: u64, end: u64 },

    #[error("seed {seed:#X} exceeds the maximum seed {max:#X}")]
    ExceedsSeedWidth { seed: u64, max: u64 },
}

/// Inclusive seed range `[start, end]`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeedRange {
    pub start: u64,
    pub end: u64,
}

impl SeedRange {
    pub const fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// The whole seed space of a generation
    pub const fn full(generation: Generation) -> Self {
        Self::new(0, generation.max_seed())
    }

    /// Check ordering and that the range fits in `max_seed`
    pub fn validate(&self, max_seed: u64) -> Result<(), RangeError> {
        if self.start > self.end {
            return Err(RangeError::StartAfterEnd {
                start: self.start,
                end: self.end,
            });
        }
        if self.end > max_seed {
            return Err(RangeError::ExceedsSeedWidth {
                seed: self.end,
                max: max_seed,
            });
        }
        Ok(())
    }

    /// Number of seeds in the range
    ///
    /// Saturates at `u64::MAX` for the full 64-bit range, which holds 2^64 seeds.
    pub fn len(&self) -> u64 {
        if self.start > self.end {
            return 0;
        }
        (self.end - self.start).saturating_add(1)
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    pub fn contains(&self, seed: u64) -> bool {
        self.start <= seed && seed <= self.end
    }

    /// Contiguous sub-ranges of at most `size` seeds, in ascending order
    pub fn batches(&self, size: u64) -> Batches {
        Batches {
            next: (!self.is_empty()).then_some(self.start),
            end: self.end,
            size: size.max(1),
        }
    }
}

/// Iterator over the batches of a [`SeedRange`]
#[derive(Clone, Debug)]
pub struct Batches {
    next: Option<u64>,
    end: u64,
    size: u64,
}

impl Iterator for Batches {
    type Item = SeedRange;

    fn next(&mut self) -> Option<SeedRange> {
        let start = self.next?;
        let end = start.saturating_add(self.size - 1).min(self.end);
        // `end + 1` would overflow at u64::MAX
        self.next = if end == self.end { None } else { Some(end + 1) };
        Some(SeedRange::new(start, end))
    }
}

fn parse_hex(text: &str) -> Result<Option<u64>, RangeError> {
    let trimmed = text.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if digits.is_empty() {
        return if trimmed.is_empty() {
            Ok(None)
        } else {
            Err(RangeError::InvalidHex(text.to_string()))
        };
    }

    u64::from_str_radix(digits, 16)
        .map(Some)
        .map_err(|_| RangeError::InvalidHex(text.to_string()))
}

/// Parse a hexadecimal seed range for `generation`
///
/// Accepts an optional `0x` prefix and surrounding whitespace.
pub fn parse_seed_range(
    start_hex: &str,
    end_hex: &str,
    generation: Generation,
) -> Result<SeedRange, RangeError> {
    let max_seed = generation.max_seed();
    let start = parse_hex(start_hex)?.unwrap_or(0);
    let end = parse_hex(end_hex)?.unwrap_or(max_seed);

    if start > max_seed {
        return Err(RangeError::ExceedsSeedWidth {
            seed: start,
            max: max_seed,
        });
    }

    let range = SeedRange::new(start, end);
    range.validate(max_seed)?;
    Ok(range)
}
