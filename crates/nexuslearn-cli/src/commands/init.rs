//! The `nexuslearn init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    let path = Path::new("nexuslearn.toml");
    if path.exists() {
        println!("nexuslearn.toml already exists, skipping.");
    } else {
        std::fs::write(path, SAMPLE_CONFIG)?;
        println!("Created nexuslearn.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit nexuslearn.toml with your API keys");
    println!("  2. Run: nexuslearn dashboard");
    println!("  3. Run: nexuslearn explain --topic \"Newton's third law\"");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# nexuslearn configuration

default_provider = "anthropic"
default_model = "claude-sonnet-4-20250514"
temperature = 0.7
max_tokens = 2048
grade_level = 9
# data_dir = "/path/to/nexuslearn-data"

[providers.anthropic]
type = "anthropic"
api_key = "${ANTHROPIC_API_KEY}"

[providers.openai]
type = "openai"
api_key = "${OPENAI_API_KEY}"

[providers.ollama]
type = "ollama"
base_url = "http://localhost:11434"
"#;
