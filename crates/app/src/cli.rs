use clap::{Parser, Subcommand};
use quiz_core::model::{ItemId, QuizSettings, SetId};

#[derive(Debug, Parser)]
#[command(name = "app")]
#[command(about = "Spaced-repetition kanji quiz")]
pub struct Cli {
    /// SQLite database URL or path
    #[arg(long = "db", env = "QUIZ_DB_URL", default_value = "sqlite://quiz.sqlite3")]
    pub db_url: String,

    /// Directory holding the shipped `<set>.json` files
    #[arg(long, env = "QUIZ_CATALOG_DIR", default_value = "./kanji")]
    pub catalog: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run an interactive quiz (default)
    Quiz(QuizArgs),
    /// Show lifetime statistics and the most-missed items
    Stats {
        /// How many items to list under "needs review"
        #[arg(long, default_value_t = 5)]
        top: usize,
    },
    /// Show recent quiz results
    History {
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// List static and custom sets
    Sets,
    /// List the items of a set, optionally filtered
    Browse {
        set: SetId,
        query: Option<String>,
    },
    /// Add a custom item
    AddItem {
        #[arg(long)]
        kanji: String,
        /// May be repeated; the first one is quizzed
        #[arg(long = "meaning", required = true)]
        meanings: Vec<String>,
        #[arg(long = "reading")]
        readings: Vec<String>,
        /// Custom set to add to (defaults to the shared custom set)
        #[arg(long)]
        set: Option<SetId>,
    },
    /// Remove a custom item
    RemoveItem { id: ItemId },
    /// Create a custom set from the items of another set
    CreateSet {
        title: String,
        #[arg(long)]
        from: SetId,
        /// Only copy items matching this text
        #[arg(long)]
        query: Option<String>,
    },
    /// Remove a custom set and its items
    RemoveSet { id: SetId },
}

#[derive(Debug, Clone, clap::Args)]
pub struct QuizArgs {
    /// Questions per quiz
    #[arg(long, default_value_t = QuizSettings::DEFAULT_QUESTIONS_PER_QUIZ)]
    pub count: u32,

    /// Choices per question
    #[arg(long, default_value_t = QuizSettings::DEFAULT_OPTION_COUNT)]
    pub options: usize,

    /// Comma-separated set ids; all sets when omitted
    #[arg(long, value_delimiter = ',')]
    pub sets: Vec<SetId>,
}

impl QuizArgs {
    pub fn settings(&self) -> Result<QuizSettings, quiz_core::model::QuizSettingsError> {
        QuizSettings::new(self.count, self.options)
    }
}

impl Command {
    /// Quiz with default settings when no subcommand is given.
    pub fn or_default(command: Option<Self>) -> Self {
        command.unwrap_or_else(|| {
            Self::Quiz(QuizArgs {
                count: QuizSettings::DEFAULT_QUESTIONS_PER_QUIZ,
                options: QuizSettings::DEFAULT_OPTION_COUNT,
                sets: Vec::new(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn quiz_sets_are_comma_separated() {
        let cli = Cli::parse_from(["app", "quiz", "--sets", "n5,n4", "--count", "3"]);
        let Some(Command::Quiz(args)) = cli.command else {
            panic!("expected quiz command");
        };
        assert_eq!(args.count, 3);
        assert_eq!(
            args.sets,
            vec![SetId::new("n5").unwrap(), SetId::new("n4").unwrap()]
        );
        assert_eq!(args.settings().unwrap().question_limit(), 3);
    }

    #[test]
    fn no_subcommand_means_default_quiz() {
        let cli = Cli::parse_from(["app", "--db", "sqlite::memory:"]);
        assert_eq!(cli.db_url, "sqlite::memory:");
        let Command::Quiz(args) = Command::or_default(cli.command) else {
            panic!("expected quiz command");
        };
        assert_eq!(args.settings().unwrap(), QuizSettings::default());
    }

    #[test]
    fn add_item_requires_a_meaning() {
        assert!(Cli::try_parse_from(["app", "add-item", "--kanji", "木"]).is_err());
        let cli = Cli::parse_from([
            "app", "add-item", "--kanji", "木", "--meaning", "tree", "--reading", "き",
        ]);
        assert!(matches!(cli.command, Some(Command::AddItem { .. })));
    }
}
