//! Line-oriented front end for the quiz loop and the read-only views.

use std::error::Error;
use std::io::{BufRead, Write};

use quiz_core::model::{Item, ItemSet, QuizResultId, SetId};
use services::stats_service::StatsOverview;
use services::{QuizLoopService, QuizSession, QuizState, QuizSummary};
use storage::repository::QuizResultRow;

type CliResult<T = ()> = Result<T, Box<dyn Error>>;

/// Run one quiz against `input`/`out` until the summary or until the user quits.
///
/// Options are picked by number; `q` or end of input abandons the quiz.
pub async fn run_quiz<R: BufRead, W: Write>(
    quiz: &QuizLoopService,
    filter: &[SetId],
    input: &mut R,
    out: &mut W,
) -> CliResult {
    let mut session = QuizSession::new();
    quiz.start_quiz(&mut session, filter).await?;

    loop {
        let (index, total, question) = match session.state() {
            QuizState::Question {
                index,
                total,
                question,
                ..
            } => (*index, *total, question.clone()),
            QuizState::Summary(summary) => {
                let summary = *summary;
                return write_summary(out, &summary, session.result_id());
            }
            _ => return Ok(()),
        };

        writeln!(out)?;
        writeln!(out, "[{}/{}] {}", index + 1, total, question.prompt())?;
        for (n, option) in question.options().iter().enumerate() {
            writeln!(out, "  {}) {option}", n + 1)?;
        }

        let Some(selected) = read_choice(input, out, question.options())? else {
            quiz.reset(&mut session);
            writeln!(out, "Quiz abandoned.")?;
            return Ok(());
        };

        let answered = quiz.submit_answer(&mut session, &selected).await?;
        if answered.outcome.is_correct {
            writeln!(out, "Correct!")?;
        } else {
            writeln!(out, "Wrong. Answer: {}", answered.outcome.correct_answer)?;
        }
        if answered.progress.is_none() {
            writeln!(out, "(progress for this item could not be saved)")?;
        }

        quiz.continue_quiz(&mut session).await?;
    }
}

/// Prompt until a valid option number is entered. `None` means quit.
fn read_choice<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    options: &[String],
) -> CliResult<Option<String>> {
    loop {
        write!(out, "> ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            return Ok(None);
        }

        match line.parse::<usize>() {
            Ok(n) if (1..=options.len()).contains(&n) => return Ok(Some(options[n - 1].clone())),
            _ => writeln!(out, "Enter a number from 1 to {}, or q to quit.", options.len())?,
        }
    }
}

fn write_summary<W: Write>(
    out: &mut W,
    summary: &QuizSummary,
    result_id: Option<QuizResultId>,
) -> CliResult {
    writeln!(out)?;
    writeln!(
        out,
        "Score: {}/{} ({:.0}%)",
        summary.score, summary.total, summary.accuracy
    )?;
    writeln!(out, "Final streak: {}", summary.final_streak)?;
    if result_id.is_none() {
        writeln!(out, "(results could not be saved)")?;
    }
    Ok(())
}

pub fn write_sets<W: Write>(out: &mut W, sets: &[ItemSet]) -> CliResult {
    for set in sets {
        let kind = if set.is_custom() { "custom" } else { "static" };
        writeln!(out, "{:<38} {:<7} {}", set.id(), kind, set.title())?;
    }
    Ok(())
}

pub fn write_items<W: Write>(out: &mut W, items: &[Item]) -> CliResult {
    if items.is_empty() {
        writeln!(out, "No items.")?;
    }
    for item in items {
        writeln!(
            out,
            "{}  [{}]  {}  ({})",
            item.kanji(),
            item.readings().join("、"),
            item.meanings().join(", "),
            item.id()
        )?;
        for example in item.examples() {
            writeln!(out, "    {} / {}", example.japanese, example.translation)?;
        }
    }
    Ok(())
}

pub fn write_overview<W: Write>(out: &mut W, overview: &StatsOverview) -> CliResult {
    let stats = &overview.stats;
    writeln!(out, "Answered:      {}", stats.total_answered)?;
    writeln!(out, "Correct:       {}", stats.correct_answers)?;
    writeln!(out, "Accuracy:      {:.1}%", overview.accuracy)?;
    writeln!(out, "Streak:        {} (best {})", stats.current_streak, stats.best_streak)?;
    writeln!(out, "Items learned: {}", overview.items_seen)?;
    writeln!(out, "Due now:       {}", overview.due_now)?;

    let missed: Vec<_> = overview
        .review_priority
        .iter()
        .filter(|p| p.incorrect_count > 0)
        .collect();
    if !missed.is_empty() {
        writeln!(out, "Needs review:")?;
        for record in missed {
            writeln!(
                out,
                "  {:<20} {} wrong, {} right",
                record.item_id, record.incorrect_count, record.correct_count
            )?;
        }
    }
    Ok(())
}

pub fn write_history<W: Write>(out: &mut W, rows: &[QuizResultRow]) -> CliResult {
    if rows.is_empty() {
        writeln!(out, "No quizzes yet.")?;
    }
    for row in rows {
        let result = &row.result;
        writeln!(
            out,
            "#{:<4} {}  {}/{} ({:.0}%)",
            row.id,
            result.completed_at().format("%Y-%m-%d %H:%M"),
            result.correct(),
            result.total(),
            result.accuracy()
        )?;
    }
    Ok(())
}
