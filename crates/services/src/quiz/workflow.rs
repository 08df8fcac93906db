use std::sync::Arc;

use quiz_core::model::{ProgressRecord, QuizResult, QuizResultId, QuizSettings, SetId};
use quiz_core::question::QuestionBuilder;
use quiz_core::selector::SessionSelector;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use storage::repository::{QuizResultRepository, StatsRepository};

use super::session::{Advance, AnswerOutcome, QuizSession};
use super::state::{QuizState, QuizSummary};
use crate::catalog_service::CatalogService;
use crate::error::QuizError;
use crate::progress_service::ProgressService;

/// Result of answering the current question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizAnswerResult {
    pub outcome: AnswerOutcome,
    /// The stored record, or `None` if persisting it failed.
    pub progress: Option<ProgressRecord>,
}

/// Orchestrates quiz start, persisted answering, and end-of-quiz bookkeeping.
#[derive(Clone)]
pub struct QuizLoopService {
    settings: QuizSettings,
    selector: SessionSelector,
    catalog: Arc<CatalogService>,
    progress: Arc<ProgressService>,
    stats: Arc<dyn StatsRepository>,
    results: Arc<dyn QuizResultRepository>,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(
        catalog: Arc<CatalogService>,
        progress: Arc<ProgressService>,
        stats: Arc<dyn StatsRepository>,
        results: Arc<dyn QuizResultRepository>,
    ) -> Self {
        Self {
            settings: QuizSettings::default(),
            selector: SessionSelector::default(),
            catalog,
            progress,
            stats,
            results,
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: QuizSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn with_selector(mut self, selector: SessionSelector) -> Self {
        self.selector = selector;
        self
    }

    #[must_use]
    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    /// Start a quiz over the sets in `filter` (every set when empty).
    ///
    /// # Errors
    ///
    /// See [`QuizLoopService::start_quiz_with_rng`].
    pub async fn start_quiz(
        &self,
        session: &mut QuizSession,
        filter: &[SetId],
    ) -> Result<(), QuizError> {
        let mut rng = StdRng::from_rng(&mut rand::rng());
        self.start_quiz_with_rng(session, filter, &mut rng).await
    }

    /// Start a quiz using the given random source for selection and options.
    ///
    /// Loads the pool and a progress snapshot, selects items, and builds the
    /// questions. On failure the session falls back to `Idle` and the selector
    /// is never called with partial data.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` if a quiz is already running,
    /// `QuizError::DataUnavailable` if the catalog or progress cannot be
    /// loaded, and `QuizError::EmptyPool` if no items match `filter`.
    pub async fn start_quiz_with_rng<R: Rng + Send + ?Sized>(
        &self,
        session: &mut QuizSession,
        filter: &[SetId],
        rng: &mut R,
    ) -> Result<(), QuizError> {
        session.begin_loading()?;

        let pool = match self.catalog.load_pool(filter).await {
            Ok(pool) => pool,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load quiz pool");
                session.abandon_loading();
                return Err(QuizError::DataUnavailable(e.to_string()));
            }
        };
        if pool.is_empty() {
            tracing::warn!(?filter, "no items found for selected sets");
            session.abandon_loading();
            return Err(QuizError::EmptyPool);
        }

        let snapshot = match self.progress.snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load progress");
                session.abandon_loading();
                return Err(QuizError::DataUnavailable(e.to_string()));
            }
        };

        let now = self.progress.clock().now();
        let selected = self.selector.select_with_rng(
            &pool,
            self.settings.question_limit(),
            &snapshot,
            now,
            rng,
        );
        let questions =
            QuestionBuilder::from_settings(&self.settings).build_all(&selected, &pool, rng);

        tracing::info!(
            pool = pool.len(),
            questions = questions.len(),
            "quiz started"
        );
        session.load(questions)
    }

    /// Evaluate and persist an answer to the current question, then show
    /// feedback.
    ///
    /// A failed progress write is logged and reported through
    /// `QuizAnswerResult::progress`; the quiz carries on.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` unless a question is awaiting an
    /// answer.
    pub async fn submit_answer(
        &self,
        session: &mut QuizSession,
        answer: &str,
    ) -> Result<QuizAnswerResult, QuizError> {
        let question = session.current_question()?;
        let item_id = question.item().id().clone();
        let is_correct = question.is_correct(answer);

        let progress = match self.progress.record_answer(&item_id, is_correct).await {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(item = %item_id, error = %e, "failed to persist progress");
                None
            }
        };

        let outcome = session.answer(answer)?;
        tracing::debug!(item = %outcome.item_id, is_correct, "answer recorded");
        Ok(QuizAnswerResult { outcome, progress })
    }

    /// Leave the feedback screen. After the last question the quiz moves to
    /// its summary and the lifetime stats and history are updated.
    ///
    /// Persistence failures at the end are logged and do not block the
    /// summary; [`QuizLoopService::finalize_summary`] retries them.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` outside the feedback state.
    pub async fn continue_quiz<'s>(
        &self,
        session: &'s mut QuizSession,
    ) -> Result<&'s QuizState, QuizError> {
        let now = self.progress.clock().now();
        if let Advance::Finished(summary) = session.advance(now)? {
            tracing::info!(
                score = summary.score,
                total = summary.total,
                accuracy = summary.accuracy,
                "quiz finished"
            );
            if let Err(e) = self.persist_summary(session, &summary).await {
                tracing::warn!(error = %e, "failed to save quiz stats");
            }
        }
        Ok(session.state())
    }

    /// Retry end-of-quiz persistence for a finished quiz.
    ///
    /// Returns the stored result id; calling it again after success is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` if the quiz is not finished and
    /// `QuizError::Storage` if persistence fails again.
    pub async fn finalize_summary(&self, session: &mut QuizSession) -> Result<QuizResultId, QuizError> {
        if let Some(id) = session.result_id() {
            return Ok(id);
        }
        let summary = *session.state().summary().ok_or(QuizError::InvalidTransition {
            action: "finalize",
            state: session.state().name(),
        })?;
        self.persist_summary(session, &summary).await
    }

    /// Abandon whatever is in progress.
    pub fn reset(&self, session: &mut QuizSession) {
        session.reset();
    }

    async fn persist_summary(
        &self,
        session: &mut QuizSession,
        summary: &QuizSummary,
    ) -> Result<QuizResultId, QuizError> {
        let result = QuizResult::from_counts(summary.total, summary.score, summary.completed_at)?;

        if !session.stats_saved() {
            let mut stats = self.stats.get_stats().await?;
            stats.record_quiz(&result, summary.final_streak);
            self.stats.save_stats(&stats).await?;
            session.mark_stats_saved();
        }

        if let Some(id) = session.result_id() {
            return Ok(id);
        }
        let id = self.results.append_result(&result).await?;
        session.set_result_id(id);
        Ok(id)
    }
}
