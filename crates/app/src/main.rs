mod cli;
mod db;
mod terminal;

use std::io::{self, Write};
use std::sync::Arc;

use clap::Parser;
use quiz_core::model::{ItemDraft, ItemId, QuizSettings};
use services::{AppServices, Clock};
use storage::catalog::StaticCatalog;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};
use db::{normalize_sqlite_url, prepare_sqlite_file};

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let command = Command::or_default(cli.command);

    let settings = match &command {
        Command::Quiz(args) => args.settings()?,
        _ => QuizSettings::default(),
    };

    // Open + migrate SQLite at startup; core/services never see URLs or paths.
    let db_url = normalize_sqlite_url(&cli.db_url);
    prepare_sqlite_file(&db_url)?;
    let catalog = Arc::new(StaticCatalog::new(&cli.catalog));
    let services = AppServices::new_sqlite(&db_url, catalog, Clock::system(), settings).await?;
    tracing::debug!(db = %db_url, catalog = %cli.catalog, "services ready");

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match command {
        Command::Quiz(args) => {
            let mut input = io::stdin().lock();
            terminal::run_quiz(&services.quiz_loop(), &args.sets, &mut input, &mut out).await?;
        }
        Command::Stats { top } => {
            let overview = services.stats().overview(top).await?;
            terminal::write_overview(&mut out, &overview)?;
        }
        Command::History { limit } => {
            let rows = services.stats().history(limit).await?;
            terminal::write_history(&mut out, &rows)?;
        }
        Command::Sets => {
            let sets = services.catalog().list_sets().await?;
            terminal::write_sets(&mut out, &sets)?;
        }
        Command::Browse { set, query } => {
            let items = services
                .catalog()
                .browse(&set, query.as_deref().unwrap_or_default())
                .await?;
            terminal::write_items(&mut out, &items)?;
        }
        Command::AddItem {
            kanji,
            meanings,
            readings,
            set,
        } => {
            let item = services
                .catalog()
                .add_item(ItemDraft {
                    id: ItemId::random(),
                    kanji,
                    readings,
                    meanings,
                    set_id: set,
                    examples: Vec::new(),
                })
                .await?;
            writeln!(out, "Added {} to {} ({})", item.kanji(), item.set_id(), item.id())?;
        }
        Command::RemoveItem { id } => {
            services.catalog().remove_item(&id).await?;
            writeln!(out, "Removed {id}")?;
        }
        Command::CreateSet { title, from, query } => {
            let catalog = services.catalog();
            let entries = catalog
                .browse(&from, query.as_deref().unwrap_or_default())
                .await?;
            let set = catalog.create_set(&title, &entries).await?;
            writeln!(
                out,
                "Created {} ({}) with {} items",
                set.title(),
                set.id(),
                entries.len()
            )?;
        }
        Command::RemoveSet { id } => {
            let removed = services.catalog().remove_set(&id).await?;
            writeln!(out, "Removed {id} and {removed} items")?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("app=info,services=info")),
        )
        .with_writer(io::stderr)
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
