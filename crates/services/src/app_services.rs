use std::sync::Arc;

use quiz_core::model::QuizSettings;
use storage::catalog::CatalogProvider;
use storage::repository::Storage;

use crate::Clock;
use crate::catalog_service::CatalogService;
use crate::error::AppServicesError;
use crate::progress_service::ProgressService;
use crate::quiz::QuizLoopService;
use crate::stats_service::StatsService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    catalog: Arc<CatalogService>,
    progress: Arc<ProgressService>,
    quiz_loop: Arc<QuizLoopService>,
    stats: Arc<StatsService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        catalog: Arc<dyn CatalogProvider>,
        clock: Clock,
        settings: QuizSettings,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, catalog, clock, settings))
    }

    /// Wire services over an existing storage aggregate.
    #[must_use]
    pub fn from_storage(
        storage: &Storage,
        catalog: Arc<dyn CatalogProvider>,
        clock: Clock,
        settings: QuizSettings,
    ) -> Self {
        let catalog = Arc::new(CatalogService::new(
            catalog,
            Arc::clone(&storage.items),
            Arc::clone(&storage.sets),
        ));
        let progress = Arc::new(ProgressService::new(clock, Arc::clone(&storage.progress)));
        let quiz_loop = Arc::new(
            QuizLoopService::new(
                Arc::clone(&catalog),
                Arc::clone(&progress),
                Arc::clone(&storage.stats),
                Arc::clone(&storage.results),
            )
            .with_settings(settings),
        );
        let stats = Arc::new(StatsService::new(
            clock,
            Arc::clone(&storage.stats),
            Arc::clone(&storage.progress),
            Arc::clone(&storage.results),
        ));

        Self {
            catalog,
            progress,
            quiz_loop,
            stats,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<CatalogService> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn quiz_loop(&self) -> Arc<QuizLoopService> {
        Arc::clone(&self.quiz_loop)
    }

    #[must_use]
    pub fn stats(&self) -> Arc<StatsService> {
        Arc::clone(&self.stats)
    }
}
