//! The `nexuslearn scores` command.

use anyhow::Result;

use nexuslearn_core::scores::ScoreStore;

use super::GlobalArgs;

pub fn execute(global: &GlobalArgs) -> Result<()> {
    let config = global.load_config()?;
    let scores = global.score_store(&config).load();

    if scores.is_empty() {
        println!("No scores stored yet. Take a quiz with `nexuslearn quiz --subject <subject>`.");
        return Ok(());
    }

    for (slug, pct) in &scores {
        println!("{slug}: {pct}%");
    }

    Ok(())
}
