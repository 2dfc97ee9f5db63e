//! The `nexuslearn list-models` command.

use anyhow::Result;

use nexuslearn_core::traits::ModelInfo;
use nexuslearn_providers::config::ProviderConfig;
use nexuslearn_providers::create_provider;
use nexuslearn_providers::ollama::OllamaProvider;

use super::GlobalArgs;

pub async fn execute(global: &GlobalArgs, provider_filter: Option<&str>) -> Result<()> {
    let config = global.load_config()?;

    let mut names: Vec<_> = config.providers.keys().collect();
    names.sort();

    let mut found_any = false;

    for name in names {
        if provider_filter.is_some_and(|filter| filter != name.as_str()) {
            continue;
        }
        let provider_config = &config.providers[name];

        let models: Vec<ModelInfo> = match provider_config {
            ProviderConfig::Ollama { base_url } => {
                match OllamaProvider::new(base_url)?.list_models_async().await {
                    Ok(models) => models,
                    Err(e) => {
                        eprintln!("Provider: {name} ({e})");
                        continue;
                    }
                }
            }
            _ => create_provider(name, provider_config)?.available_models(),
        };

        if !models.is_empty() {
            found_any = true;
            println!("Provider: {name}");
            for model in &models {
                if model.max_context > 0 {
                    println!(
                        "  {} ({}, {}K context)",
                        model.id,
                        model.name,
                        model.max_context / 1000
                    );
                } else {
                    println!("  {} ({})", model.id, model.name);
                }
            }
            println!();
        }
    }

    if !found_any {
        println!("No providers configured. Run `nexuslearn init` to create a config file.");
    }

    Ok(())
}
