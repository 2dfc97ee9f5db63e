//! The `nexuslearn explain` command.

use anyhow::Result;

use nexuslearn_core::explain::explain_concept;

use super::{quiz, GlobalArgs};

const EXPLAIN_FAILED: &str = "Sorry, we couldn't explain that topic. Please try another one.";

pub async fn execute(
    global: &GlobalArgs,
    topic: &str,
    practice: bool,
    provider_name: Option<&str>,
) -> Result<()> {
    let config = global.load_config()?;
    let provider = config.provider(provider_name)?;
    let options = config.flow_options();

    eprintln!("Explaining \"{}\" with {} ({})...", topic.trim(), provider.name(), options.model);

    let explanation = match explain_concept(provider.as_ref(), &options, topic).await {
        Ok(explanation) => explanation,
        Err(e) => {
            tracing::debug!("explanation unavailable: {e}");
            anyhow::bail!(EXPLAIN_FAILED);
        }
    };

    println!("Explanation");
    println!("{}", explanation.explanation);

    if !practice {
        println!();
        println!("Practice Quiz");
        for (i, q) in explanation.quiz.iter().enumerate() {
            println!("{}. {}", i + 1, q.question);
            for option in &q.options {
                println!("   - {option}");
            }
        }
        println!("\nRun again with --practice to take this quiz.");
    }

    println!();
    println!("Further Exploration");
    println!("{}", explanation.further_exploration);

    if practice {
        println!();
        let mut session = explanation.practice_session(topic.trim());
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        quiz::play(&mut session, stdin.lock(), stdout.lock())?;
    }

    Ok(())
}
