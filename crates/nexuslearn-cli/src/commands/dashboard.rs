//! The `nexuslearn dashboard` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use nexuslearn_core::dashboard::Dashboard;

use super::GlobalArgs;

pub fn execute(global: &GlobalArgs) -> Result<()> {
    let config = global.load_config()?;
    let catalog = global.load_catalog()?;
    let dashboard = Dashboard::from_store(&catalog, &global.score_store(&config));

    let mut table = Table::new();
    table.set_header(vec!["Subject", "Description", "Lessons", "Quiz Score"]);
    for row in &dashboard.rows {
        let subject = catalog.subject(row.slug);
        table.add_row(vec![
            Cell::new(&row.name),
            Cell::new(subject.map(|s| s.description.as_str()).unwrap_or_default()),
            Cell::new(subject.map(|s| s.lessons.len()).unwrap_or(0)),
            Cell::new(format!("{}%", row.score)),
        ]);
    }

    println!("{table}");
    if dashboard.is_demo {
        println!("No quizzes taken yet; showing sample scores.");
    }
    println!("Performance: {}", dashboard.performance_summary());

    Ok(())
}
