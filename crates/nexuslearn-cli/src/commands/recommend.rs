//! The `nexuslearn recommend` command.

use anyhow::Result;

use nexuslearn_core::dashboard::Dashboard;
use nexuslearn_core::recommend::{recommend, RecommendationRequest};

use super::GlobalArgs;

pub async fn execute(global: &GlobalArgs, provider_name: Option<&str>) -> Result<()> {
    let config = global.load_config()?;
    let catalog = global.load_catalog()?;
    let provider = config.provider(provider_name)?;

    let dashboard = Dashboard::from_store(&catalog, &global.score_store(&config));
    let request = RecommendationRequest {
        performance_summary: dashboard.performance_summary(),
        grade_level: config.grade_level,
    };

    println!("Quiz performance: {}", request.performance_summary);
    eprintln!("Generating recommendations with {}...", provider.name());

    let text = recommend(provider.as_ref(), &config.flow_options(), &request).await;
    println!();
    println!("{text}");

    Ok(())
}
