//! The `nexuslearn quiz` command, and the interactive loop shared with
//! `explain --practice`.

use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::{Context, Result};

use nexuslearn_core::session::{Advance, Outcome, QuizSession, Selection};

use super::{parse_subject, GlobalArgs};

pub fn execute(global: &GlobalArgs, subject: &str) -> Result<()> {
    let slug = parse_subject(subject)?;
    let config = global.load_config()?;
    let catalog = global.load_catalog()?;
    let quiz = catalog
        .quiz(slug)
        .with_context(|| format!("no quiz for subject '{slug}'"))?;

    let store = Arc::new(global.score_store(&config));
    let mut session = QuizSession::for_quiz(quiz).with_score_store(slug, store);

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let outcome = play(&mut session, stdin.lock(), stdout.lock())?;

    if outcome.saved {
        println!("Score saved.");
    } else {
        eprintln!("Warning: your score could not be saved.");
    }

    Ok(())
}

/// Run `session` to completion, reading 1-based option numbers from `input`.
///
/// Returns an error if `input` ends before the last question is answered.
pub fn play<R: BufRead, W: Write>(
    session: &mut QuizSession,
    mut input: R,
    mut out: W,
) -> Result<Outcome> {
    anyhow::ensure!(!session.is_empty(), "this quiz has no questions");

    writeln!(out, "{}", session.title())?;

    loop {
        let Some(question) = session.current_question().cloned() else {
            anyhow::bail!("quiz ended unexpectedly");
        };
        let progress = session.progress();

        writeln!(out)?;
        writeln!(
            out,
            "Question {} of {}: {}",
            progress.position, progress.total, question.question
        )?;
        for (i, option) in question.options.iter().enumerate() {
            writeln!(out, "  {}. {option}", i + 1)?;
        }

        let choice = loop {
            write!(out, "Your answer (1-{}): ", question.options.len())?;
            out.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                anyhow::bail!(
                    "input ended before question {} was answered",
                    progress.position
                );
            }
            match line.trim().parse::<usize>() {
                Ok(n) if (1..=question.options.len()).contains(&n) => break n - 1,
                _ => writeln!(
                    out,
                    "Please enter a number between 1 and {}.",
                    question.options.len()
                )?,
            }
        };

        match session.select_answer(&question.options[choice]) {
            Selection::Recorded { correct: true } => writeln!(out, "Correct!")?,
            Selection::Recorded { correct: false } => {
                writeln!(out, "Incorrect. The correct answer is: {}", question.answer)?
            }
            other => tracing::debug!(?other, "selection ignored"),
        }
        if let Some(explanation) = &question.explanation {
            writeln!(out, "Explanation: {explanation}")?;
        }

        match session.advance()? {
            Advance::Next { .. } => continue,
            Advance::Finished(outcome) => {
                print_summary(session, &outcome, &mut out)?;
                return Ok(outcome);
            }
        }
    }
}

fn print_summary<W: Write>(session: &QuizSession, outcome: &Outcome, out: &mut W) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "Quiz Complete!")?;
    writeln!(
        out,
        "You scored {} / {}. That's {}%!",
        outcome.score, outcome.total, outcome.percentage
    )?;
    writeln!(out)?;

    for item in session.review() {
        let mark = if item.correct { "[correct]" } else { "[wrong]  " };
        writeln!(out, "{mark} {}", item.question)?;
        writeln!(out, "          Your answer: {}", item.selected_or_placeholder())?;
        writeln!(out, "          Correct answer: {}", item.answer)?;
    }

    Ok(())
}
