//! Resolve the effective configuration: flags, then env, then file, then defaults.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use serp_flag::{ConfigLoader, FlaggerConfig};

/// Flags shared by every command that talks to the classifier or reads pages.
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigArgs {
    /// Classification endpoint URL.
    #[arg(long, env = "SERP_FLAG_ENDPOINT")]
    pub endpoint: Option<String>,

    /// CSS selector for candidate elements.
    #[arg(long, env = "SERP_FLAG_SELECTOR")]
    pub selector: Option<String>,

    /// Per-request timeout in milliseconds.
    #[arg(long, env = "SERP_FLAG_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,
}

/// Flags that only matter when annotating.
#[derive(Debug, Clone, Default, Args)]
pub struct HighlightArgs {
    /// Class value that triggers the highlight.
    #[arg(long)]
    pub positive_class: Option<i64>,

    /// Highlight color (any CSS color).
    #[arg(long)]
    pub color: Option<String>,

    /// Color for candidates whose classification failed.
    #[arg(long)]
    pub failure_color: Option<String>,

    /// Cancel the whole run after this many milliseconds.
    #[arg(long)]
    pub run_timeout_ms: Option<u64>,

    /// Append one JSON line per candidate to this file.
    #[arg(long)]
    pub audit_log: Option<String>,
}

impl ConfigArgs {
    pub fn apply(&self, config: &mut FlaggerConfig) {
        if let Some(endpoint) = &self.endpoint {
            config.classifier.endpoint = endpoint.clone();
        }
        if let Some(selector) = &self.selector {
            config.page.selector = selector.clone();
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.classifier.timeout_ms = timeout_ms;
        }
    }
}

impl HighlightArgs {
    pub fn apply(&self, config: &mut FlaggerConfig) {
        if let Some(class) = self.positive_class {
            config.highlight.positive_class = class;
        }
        if let Some(color) = &self.color {
            config.highlight.color = color.clone();
        }
        if let Some(color) = &self.failure_color {
            config.highlight.failure_color = Some(color.clone());
        }
        if let Some(timeout_ms) = self.run_timeout_ms {
            config.run.timeout_ms = Some(timeout_ms);
        }
        if let Some(path) = &self.audit_log {
            config.run.audit_log = Some(path.clone());
        }
    }
}

/// Load the file named by `--config`, or the default file if it exists.
pub fn load(config_path: Option<&Path>) -> Result<FlaggerConfig> {
    match config_path {
        Some(path) => ConfigLoader::load(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => ConfigLoader::load_default().context("loading default config"),
    }
}

/// Load and override, then validate.
pub fn resolve(config_path: Option<&Path>, args: &ConfigArgs) -> Result<FlaggerConfig> {
    let mut config = load(config_path)?;
    args.apply(&mut config);
    config.validate().context("invalid configuration")?;
    Ok(config)
}
