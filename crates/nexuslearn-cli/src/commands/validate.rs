//! The `nexuslearn validate` command.

use std::path::Path;

use anyhow::{Context, Result};

use nexuslearn_core::catalog::{parse_catalog, validate_catalog, Catalog};

pub fn execute(catalog_path: Option<&Path>) -> Result<()> {
    let catalog = match catalog_path {
        Some(path) => parse_catalog(path)?,
        None => Catalog::builtin().context("built-in catalog is invalid")?,
    };

    let questions: usize = catalog.quizzes().map(|(_, q)| q.questions.len()).sum();
    println!(
        "Catalog: {} subjects, {} quizzes ({} questions)",
        catalog.subjects().len(),
        catalog.quizzes().count(),
        questions
    );

    let warnings = validate_catalog(&catalog);
    for w in &warnings {
        let prefix = w
            .subject
            .map(|slug| format!("  [{slug}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Catalog valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
