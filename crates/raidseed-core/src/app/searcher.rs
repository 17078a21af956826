//! Seed search workflow
//!
//! The range is cut into contiguous batches. Seeds inside a batch are evaluated
//! in parallel with rayon; batches themselves run one after another so that
//! results, progress reports and cancellation all happen in seed order on the
//! calling thread.

use crate::app::session::{
    CancellationToken, Progress, SearchConfig, SearchContext, SearchError, SearchSession,
};
use crate::domain::criteria::SearchCriteria;
use crate::domain::generator::{Candidate, CandidateGenerator, GenerationRejected};
use crate::domain::template::EncounterTemplate;
use crate::infra::seed_range::SeedRange;
use log::{debug, info, warn};
use rayon::ThreadPool;
use rayon::prelude::*;
use serde::Serialize;

/// A matching seed with the encounter that produced it
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SeedResult<'t> {
    pub seed: u64,
    pub template: &'t EncounterTemplate,
    pub candidate: Candidate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchStatus {
    /// Range exhausted or result cap reached
    Completed,
    Cancelled,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchOutcome<'t> {
    /// Strictly increasing by seed
    pub matches: Vec<SeedResult<'t>>,
    pub seeds_checked: u64,
    pub status: SearchStatus,
}

/// Search one encounter with the default scheduler settings
///
/// # Arguments
/// * `range` - Inclusive seed range
/// * `template` - Encounter to replay for every seed
/// * `criteria` - Filter a candidate must pass
/// * `max_results` - Result cap; `0` returns immediately
/// * `context` - Trainer identity and species table
/// * `on_progress` - Called between batches on the calling thread
/// * `cancel` - Checked before every batch
pub fn search<'t, F>(
    range: SeedRange,
    template: &'t EncounterTemplate,
    criteria: &SearchCriteria,
    max_results: u32,
    context: SearchContext<'t>,
    on_progress: F,
    cancel: &CancellationToken,
) -> Result<SearchOutcome<'t>, SearchError>
where
    F: FnMut(&Progress),
{
    search_encounters(
        range,
        std::slice::from_ref(template),
        criteria,
        max_results,
        context,
        on_progress,
        cancel,
    )
}

/// Search several encounters at once
///
/// Each seed tries the templates in order and keeps the first match.
pub fn search_encounters<'t, F>(
    range: SeedRange,
    templates: &'t [EncounterTemplate],
    criteria: &SearchCriteria,
    max_results: u32,
    context: SearchContext<'t>,
    on_progress: F,
    cancel: &CancellationToken,
) -> Result<SearchOutcome<'t>, SearchError>
where
    F: FnMut(&Progress),
{
    SearchSession::new(range, templates, criteria.clone(), max_results, context)
        .with_cancel_token(cancel.clone())
        .run(on_progress)
}

// =============================================================================
// Batch scheduling
// =============================================================================

enum SeedOutcome<'t> {
    Hit(SeedResult<'t>),
    Rejected(GenerationRejected),
}

/// Try every generator on `seed`, first match wins
///
/// A seed only counts as rejected when no template matched and at least one
/// rejected it.
fn evaluate_seed<'t>(
    seed: u64,
    generators: &[CandidateGenerator<'t>],
    criteria: &SearchCriteria,
) -> Option<SeedOutcome<'t>> {
    let mut rejected = None;

    for generator in generators {
        match generator.generate_matching(seed, criteria) {
            Ok(Some(candidate)) => {
                return Some(SeedOutcome::Hit(SeedResult {
                    seed,
                    template: generator.template(),
                    candidate,
                }));
            }
            Ok(None) => {}
            Err(reason) => rejected = Some(reason),
        }
    }

    rejected.map(SeedOutcome::Rejected)
}

/// Evaluate one batch in parallel; hits come back sorted by seed
fn scan_batch<'t>(
    batch: SeedRange,
    generators: &[CandidateGenerator<'t>],
    criteria: &SearchCriteria,
) -> (Vec<SeedResult<'t>>, u64, Option<GenerationRejected>) {
    let outcomes: Vec<SeedOutcome<'t>> = (batch.start..=batch.end)
        .into_par_iter()
        .filter_map(|seed| evaluate_seed(seed, generators, criteria))
        .collect();

    let mut hits = Vec::new();
    let mut rejected = 0u64;
    let mut last_reason = None;
    for outcome in outcomes {
        match outcome {
            SeedOutcome::Hit(result) => hits.push(result),
            SeedOutcome::Rejected(reason) => {
                rejected += 1;
                last_reason = Some(reason);
            }
        }
    }

    hits.sort_unstable_by_key(|r| r.seed);
    (hits, rejected, last_reason)
}

/// Sequential batch loop shared by every search entry point
pub(crate) struct BatchScheduler<'a> {
    pub(crate) config: &'a SearchConfig,
    pub(crate) pool: Option<&'a ThreadPool>,
    pub(crate) cancel: &'a CancellationToken,
}

impl BatchScheduler<'_> {
    pub(crate) fn run<'t, F>(
        &self,
        range: SeedRange,
        generators: &[CandidateGenerator<'t>],
        criteria: &SearchCriteria,
        max_results: u32,
        mut on_progress: F,
    ) -> SearchOutcome<'t>
    where
        F: FnMut(&Progress),
    {
        let total = range.len();
        let cap = max_results as usize;
        let mut matches: Vec<SeedResult<'t>> = Vec::new();
        let mut seeds_checked = 0u64;
        let mut rejected_total = 0u64;
        let mut last_reported: Option<u64> = None;
        let mut status = SearchStatus::Completed;

        info!(
            "Searching {:#X}..={:#X} ({} seeds, {} encounter(s), cap {})",
            range.start,
            range.end,
            total,
            generators.len(),
            max_results
        );

        if max_results > 0 {
            for batch in range.batches(self.config.batch_size) {
                if self.cancel.is_cancelled() {
                    status = SearchStatus::Cancelled;
                    break;
                }

                let (hits, rejected, reason) = match self.pool {
                    Some(pool) => pool.install(|| scan_batch(batch, generators, criteria)),
                    None => scan_batch(batch, generators, criteria),
                };

                let batch_len = batch.len();
                seeds_checked = seeds_checked.saturating_add(batch_len);
                rejected_total += rejected;
                matches.extend(hits);

                debug!(
                    "Batch {:#X}..={:#X}: {} matches so far, {} rejected",
                    batch.start,
                    batch.end,
                    matches.len(),
                    rejected
                );
                match reason {
                    Some(reason) if rejected == batch_len => warn!(
                        "Every seed in {:#X}..={:#X} was rejected: {}",
                        batch.start, batch.end, reason
                    ),
                    _ => {}
                }

                if matches.len() >= cap {
                    matches.truncate(cap);
                    break;
                }

                let since_report = seeds_checked - last_reported.unwrap_or(0);
                if since_report >= self.config.progress_interval && batch.end != range.end {
                    on_progress(&Progress {
                        seeds_checked,
                        total,
                        matches: matches.len() as u32,
                    });
                    last_reported = Some(seeds_checked);
                }
            }
        }

        if last_reported != Some(seeds_checked) {
            on_progress(&Progress {
                seeds_checked,
                total,
                matches: matches.len() as u32,
            });
        }

        info!(
            "Search {:?}: {} seeds checked, {} matches, {} rejected",
            status,
            seeds_checked,
            matches.len(),
            rejected_total
        );

        SearchOutcome {
            matches,
            seeds_checked,
            status,
        }
    }
}
