//! The `nexuslearn` command-line study companion.

use std::process;

use clap::{Parser, Subcommand};

mod commands;

use commands::GlobalArgs;

#[derive(Parser)]
#[command(
    name = "nexuslearn",
    version,
    about = "Study companion for 9th-grade Physics, Chemistry and Math"
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show subjects and quiz scores
    Dashboard,

    /// List the lessons of a subject
    Lessons {
        /// Subject slug: physics, chemistry or math
        #[arg(long)]
        subject: String,
    },

    /// Take a subject quiz (answers are read from stdin)
    Quiz {
        /// Subject slug: physics, chemistry or math
        #[arg(long)]
        subject: String,
    },

    /// Print the stored quiz scores
    Scores,

    /// Explain a topic with an AI model
    Explain {
        /// The topic to explain, e.g. "Newton's third law"
        #[arg(long)]
        topic: String,

        /// Play the generated practice quiz
        #[arg(long)]
        practice: bool,

        /// Provider name from the config (default: `default_provider`)
        #[arg(long)]
        provider: Option<String>,
    },

    /// Personalized study recommendations from your scores
    Recommend {
        /// Provider name from the config (default: `default_provider`)
        #[arg(long)]
        provider: Option<String>,
    },

    /// Validate the catalog given by --catalog (default: the built-in one)
    Validate,

    /// List available models
    ListModels {
        /// Filter to specific provider
        #[arg(long)]
        provider: Option<String>,
    },

    /// Create a starter config file
    Init,
}

#[tokio::main]
async fn main() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("nexuslearn=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let global = cli.global;

    let result = match cli.command {
        Commands::Dashboard => commands::dashboard::execute(&global),
        Commands::Lessons { subject } => commands::lessons::execute(&global, &subject),
        Commands::Quiz { subject } => commands::quiz::execute(&global, &subject),
        Commands::Scores => commands::scores::execute(&global),
        Commands::Explain {
            topic,
            practice,
            provider,
        } => commands::explain::execute(&global, &topic, practice, provider.as_deref()).await,
        Commands::Recommend { provider } => {
            commands::recommend::execute(&global, provider.as_deref()).await
        }
        Commands::Validate => commands::validate::execute(global.catalog.as_deref()),
        Commands::ListModels { provider } => {
            commands::list_models::execute(&global, provider.as_deref()).await
        }
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
