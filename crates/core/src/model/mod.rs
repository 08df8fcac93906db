mod ids;
mod item;
mod progress;
mod settings;
mod stats;

pub use ids::{ItemId, ParseIdError, QuizResultId, SetId};
pub use item::{Example, Item, ItemDraft, ItemError, ItemSet, builtin_sets};
pub use progress::{ProgressRecord, ProgressSnapshot};
pub use settings::{QuizSettings, QuizSettingsError};
pub use stats::{QuizResult, QuizResultError, UserStats};
