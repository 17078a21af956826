//! Search session state
//!
//! A [`SearchSession`] owns one search invocation: validation, the optional
//! dedicated thread pool, the cancellation token and the state machine
//! `Idle → Running → Completed | Cancelled | Error`.

use crate::app::searcher::{BatchScheduler, SearchOutcome, SearchStatus};
use crate::constants::{BATCH_SIZE, PROGRESS_INTERVAL};
use crate::domain::criteria::{CriteriaError, SearchCriteria};
use crate::domain::generator::CandidateGenerator;
use crate::domain::personal::SpeciesLookup;
use crate::domain::template::{EncounterTemplate, TemplateError};
use crate::domain::types::TrainerId;
use crate::infra::seed_range::{RangeError, SeedRange};
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// Cooperative cancellation flag, observed at batch boundaries
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
    Completed,
    Cancelled,
    Error,
}

/// Runtime scheduler tuning
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchConfig {
    /// Seeds per batch
    pub batch_size: u64,
    /// Minimum seeds between two progress reports
    pub progress_interval: u64,
    /// Dedicated worker count; `None` uses the global rayon pool
    pub threads: Option<usize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            batch_size: BATCH_SIZE,
            progress_interval: PROGRESS_INTERVAL,
            threads: None,
        }
    }
}

/// Progress snapshot handed to the caller's callback
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    pub seeds_checked: u64,
    pub total: u64,
    pub matches: u32,
}

impl Progress {
    /// Share of the range covered, 0.0 to 100.0
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        self.seeds_checked as f64 * 100.0 / self.total as f64
    }
}

/// Trainer identity and species data the generator consumes
#[derive(Clone, Copy)]
pub struct SearchContext<'a> {
    pub trainer: TrainerId,
    pub lookup: &'a dyn SpeciesLookup,
}

impl<'a> SearchContext<'a> {
    pub fn new(trainer: TrainerId, lookup: &'a dyn SpeciesLookup) -> Self {
        Self { trainer, lookup }
    }
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid seed range: {0}")]
    InvalidRange(#[from] RangeError),

    #[error("invalid encounter template: {0}")]
    InvalidTemplate(#[from] TemplateError),

    #[error("invalid search criteria: {0}")]
    InvalidCriteria(#[from] CriteriaError),

    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] ThreadPoolBuildError),
}

/// One search invocation over a seed range
pub struct SearchSession<'t> {
    range: SeedRange,
    templates: &'t [EncounterTemplate],
    criteria: SearchCriteria,
    max_results: u32,
    context: SearchContext<'t>,
    config: SearchConfig,
    cancel: CancellationToken,
    state: SessionState,
}

impl<'t> SearchSession<'t> {
    pub fn new(
        range: SeedRange,
        templates: &'t [EncounterTemplate],
        criteria: SearchCriteria,
        max_results: u32,
        context: SearchContext<'t>,
    ) -> Self {
        Self {
            range,
            templates,
            criteria,
            max_results,
            context,
            config: SearchConfig::default(),
            cancel: CancellationToken::new(),
            state: SessionState::Idle,
        }
    }

    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    /// Share an existing cancellation token instead of the session's own
    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that cancels this session from another thread or the progress callback
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Validate the request, then scan the range batch by batch
    ///
    /// Validation failures leave the session in `Error` without scanning a
    /// single seed.
    pub fn run<F>(&mut self, on_progress: F) -> Result<SearchOutcome<'t>, SearchError>
    where
        F: FnMut(&Progress),
    {
        self.state = SessionState::Running;

        let prepared = self.prepare();
        let (generators, pool) = match prepared {
            Ok(prepared) => prepared,
            Err(e) => {
                self.state = SessionState::Error;
                return Err(e);
            }
        };

        let scheduler = BatchScheduler {
            config: &self.config,
            pool: pool.as_ref(),
            cancel: &self.cancel,
        };
        let outcome = scheduler.run(
            self.range,
            &generators,
            &self.criteria,
            self.max_results,
            on_progress,
        );

        self.state = match outcome.status {
            SearchStatus::Completed => SessionState::Completed,
            SearchStatus::Cancelled => SessionState::Cancelled,
        };
        Ok(outcome)
    }

    fn prepare(&self) -> Result<(Vec<CandidateGenerator<'t>>, Option<ThreadPool>), SearchError> {
        let max_seed = self
            .templates
            .iter()
            .map(|t| t.generation().max_seed())
            .min()
            .unwrap_or(u64::MAX);
        self.range.validate(max_seed)?;

        for template in self.templates {
            template.validate()?;
        }
        self.criteria.validate()?;

        let pool = match self.config.threads {
            Some(threads) => Some(ThreadPoolBuilder::new().num_threads(threads).build()?),
            None => None,
        };

        let generators = self
            .templates
            .iter()
            .map(|t| CandidateGenerator::new(t, self.context.trainer, self.context.lookup))
            .collect();

        Ok((generators, pool))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::criteria::IvRange;
    use crate::domain::personal::{PersonalTable, SpeciesInfo};
    use crate::domain::template::EncounterKind;

    fn table() -> PersonalTable {
        let info = SpeciesInfo::new(127, [1, 2, 3]);
        [(1, 0, info)].into_iter().collect()
    }

    #[test]
    fn test_cancellation_token_is_shared() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_progress_percent() {
        let progress = Progress {
            seeds_checked: 250,
            total: 1000,
            matches: 0,
        };
        assert!((progress.percent() - 25.0).abs() < f64::EPSILON);

        let empty = Progress {
            seeds_checked: 0,
            total: 0,
            matches: 0,
        };
        assert!((empty.percent() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_session_state_transitions() {
        let templates = [EncounterTemplate::new(EncounterKind::Den { stars: 1 }, 1, 0)];
        let lookup = table();
        let context = SearchContext::new(TrainerId::new(1, 2), &lookup);
        let mut session = SearchSession::new(
            SeedRange::new(0, 999),
            &templates,
            SearchCriteria::any(),
            10,
            context,
        );
        assert_eq!(session.state(), SessionState::Idle);

        let outcome = session.run(|_| {}).unwrap();
        assert_eq!(outcome.status, SearchStatus::Completed);
        assert_eq!(outcome.matches.len(), 10);
        assert_eq!(session.state(), SessionState::Completed);
    }

    #[test]
    fn test_invalid_range_scans_nothing() {
        let templates = [EncounterTemplate::new(EncounterKind::Den { stars: 1 }, 1, 0)];
        let lookup = table();
        let context = SearchContext::new(TrainerId::new(1, 2), &lookup);
        let mut session = SearchSession::new(
            SeedRange::new(10, 5),
            &templates,
            SearchCriteria::any(),
            10,
            context,
        );

        let mut reports = 0;
        let result = session.run(|_| reports += 1);
        assert!(matches!(
            result,
            Err(SearchError::InvalidRange(RangeError::StartAfterEnd { .. }))
        ));
        assert_eq!(reports, 0);
        assert_eq!(session.state(), SessionState::Error);
    }

    #[test]
    fn test_invalid_template_and_criteria() {
        let lookup = table();
        let context = SearchContext::new(TrainerId::new(1, 2), &lookup);

        let bad_template =
            [EncounterTemplate::new(EncounterKind::Den { stars: 1 }, 1, 0).with_flawless_ivs(7)];
        let mut session = SearchSession::new(
            SeedRange::new(0, 10),
            &bad_template,
            SearchCriteria::any(),
            10,
            context,
        );
        assert!(matches!(
            session.run(|_| {}),
            Err(SearchError::InvalidTemplate(TemplateError::TooManyFlawless(7)))
        ));

        let templates = [EncounterTemplate::new(EncounterKind::Den { stars: 1 }, 1, 0)];
        let criteria = SearchCriteria::any().with_iv(0, IvRange::new(31, 0));
        let mut session =
            SearchSession::new(SeedRange::new(0, 10), &templates, criteria, 10, context);
        assert!(matches!(
            session.run(|_| {}),
            Err(SearchError::InvalidCriteria(_))
        ));
    }

    #[test]
    fn test_cancelled_before_start() {
        let templates = [EncounterTemplate::new(EncounterKind::Den { stars: 1 }, 1, 0)];
        let lookup = table();
        let context = SearchContext::new(TrainerId::new(1, 2), &lookup);
        let mut session = SearchSession::new(
            SeedRange::new(0, 99_999),
            &templates,
            SearchCriteria::any(),
            1_000_000,
            context,
        );
        session.cancel();

        let outcome = session.run(|_| {}).unwrap();
        assert_eq!(outcome.status, SearchStatus::Cancelled);
        assert_eq!(outcome.seeds_checked, 0);
        assert!(outcome.matches.is_empty());
        assert_eq!(session.state(), SessionState::Cancelled);
    }
}
