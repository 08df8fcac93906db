#![forbid(unsafe_code)]

pub mod app_services;
pub mod catalog_service;
pub mod error;
pub mod progress_service;
pub mod quiz;
pub mod stats_service;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use catalog_service::CatalogService;
pub use error::{
    AppServicesError, CatalogServiceError, ProgressServiceError, QuizError, StatsServiceError,
};
pub use progress_service::ProgressService;
pub use quiz::{QuizAnswerResult, QuizLoopService, QuizSession, QuizState, QuizSummary};
pub use stats_service::{StatsOverview, StatsService};
