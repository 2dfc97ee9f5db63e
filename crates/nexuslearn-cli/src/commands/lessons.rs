//! The `nexuslearn lessons` command.

use anyhow::{Context, Result};

use super::{parse_subject, GlobalArgs};

pub fn execute(global: &GlobalArgs, subject: &str) -> Result<()> {
    let slug = parse_subject(subject)?;
    let catalog = global.load_catalog()?;
    let subject = catalog
        .subject(slug)
        .with_context(|| format!("subject '{slug}' is not in the catalog"))?;

    println!("{}", subject.name);
    if !subject.description.is_empty() {
        println!("{}", subject.description);
    }
    println!();

    if subject.lessons.is_empty() {
        println!("No lessons yet.");
    }
    for (i, lesson) in subject.lessons.iter().enumerate() {
        println!("{}. {}", i + 1, lesson.title);
        println!("   {}", lesson.content);
    }

    if catalog.quiz(slug).is_some() {
        println!("\nTest yourself: nexuslearn quiz --subject {slug}");
    }

    Ok(())
}
