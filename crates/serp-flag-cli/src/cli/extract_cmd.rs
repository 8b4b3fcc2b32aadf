//! `serp-flag extract <source>`: list candidate texts without classifying them.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use serp_flag::{HtmlPage, Selector};

use crate::cli::output::{self, Styled};
use crate::cli::settings::{self, ConfigArgs};
use crate::cli::source::PageSource;

#[derive(Debug, Clone, Args)]
pub struct ExtractArgs {
    /// Page to read: a file path, `-` for stdin, or an http(s) URL.
    pub source: String,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Run the extract command.
pub async fn run(args: &ExtractArgs, config_path: Option<&Path>) -> Result<()> {
    let config = settings::resolve(config_path, &args.config)?;
    let source = PageSource::parse(&args.source);
    let html = source.read(config.classifier.timeout_ms).await?;

    let texts = extract_texts(&html, &config.page.selector)?;

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "source": source.describe(),
            "selector": config.page.selector,
            "candidates": texts
                .iter()
                .enumerate()
                .map(|(index, text)| serde_json::json!({"index": index, "text": text}))
                .collect::<Vec<_>>(),
        }));
        return Ok(());
    }

    for (index, text) in texts.iter().enumerate() {
        println!("{index}\t{text}");
    }
    if !output::is_quiet() {
        let s = Styled::new();
        let symbol = if texts.is_empty() { s.warn_sym() } else { s.ok_sym() };
        eprintln!(
            "  {symbol} {} candidates matched {}",
            texts.len(),
            s.dim(&config.page.selector)
        );
        if texts.is_empty() {
            eprintln!("  The page markup may have changed; try another --selector.");
        }
    }

    Ok(())
}

fn extract_texts(html: &str, selector: &str) -> Result<Vec<String>> {
    let selector = Selector::parse(selector)
        .map_err(|e| anyhow::anyhow!("{e}"))
        .with_context(|| format!("parsing selector {selector:?}"))?;
    Ok(HtmlPage::parse(html).texts(&selector))
}
