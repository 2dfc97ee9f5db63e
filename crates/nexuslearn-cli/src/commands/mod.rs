pub mod dashboard;
pub mod explain;
pub mod init;
pub mod lessons;
pub mod list_models;
pub mod quiz;
pub mod recommend;
pub mod scores;
pub mod validate;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use nexuslearn_core::catalog::{parse_catalog, Catalog};
use nexuslearn_core::model::SubjectSlug;
use nexuslearn_core::scores::{FileKeyValueStore, KvScoreStore};
use nexuslearn_providers::config::{load_config_from, NexusConfig};

/// Flags accepted by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the stored quiz scores (overrides `data_dir`)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Catalog TOML file (default: the built-in catalog)
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,
}

impl GlobalArgs {
    pub fn load_config(&self) -> Result<NexusConfig> {
        let mut config = load_config_from(self.config.as_deref())?;
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        Ok(config)
    }

    pub fn load_catalog(&self) -> Result<Catalog> {
        match &self.catalog {
            Some(path) => parse_catalog(path),
            None => Catalog::builtin().context("built-in catalog is invalid"),
        }
    }

    pub fn score_store(&self, config: &NexusConfig) -> KvScoreStore<FileKeyValueStore> {
        KvScoreStore::open(&config.data_dir)
    }
}

pub fn parse_subject(subject: &str) -> Result<SubjectSlug> {
    subject.parse::<SubjectSlug>().map_err(|e| anyhow::anyhow!(e))
}
