//! `serp-flag annotate <source>`: classify every result title and highlight matches.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use serp_flag::{Annotator, CancellationToken, HtmlPage};
use tracing::info;

use crate::cli::audit::AuditLogger;
use crate::cli::output::{self, Styled};
use crate::cli::settings::{self, ConfigArgs, HighlightArgs};
use crate::cli::source::PageSource;

#[derive(Debug, Clone, Args)]
pub struct AnnotateArgs {
    /// Page to annotate: a file path, `-` for stdin, or an http(s) URL.
    pub source: String,

    /// Write the annotated HTML here instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(flatten)]
    pub highlight: HighlightArgs,
}

/// Run the annotate command.
pub async fn run(args: &AnnotateArgs, config_path: Option<&Path>) -> Result<()> {
    let mut config = settings::load(config_path)?;
    args.config.apply(&mut config);
    args.highlight.apply(&mut config);

    let annotator = Annotator::from_config(&config).context("invalid configuration")?;

    let source = PageSource::parse(&args.source);
    let html = source.read(config.classifier.timeout_ms).await?;
    let mut page = HtmlPage::parse(&html);

    let cancel = CancellationToken::new();
    spawn_cancel_triggers(&cancel, config.run.timeout_ms);
    // Stops the trigger tasks once this command returns.
    let _stop_triggers = cancel.clone().drop_guard();

    let report = annotator.run_with_cancel(&mut page, &cancel).await;
    info!(
        source = %source.describe(),
        highlighted = report.highlighted,
        "annotated page"
    );

    if let Some(path) = config.audit_log_path() {
        let mut logger = AuditLogger::open(&path)?;
        logger.log_report(&source.describe(), &report)?;
    }

    let annotated = page.html();
    match &args.output {
        Some(path) => std::fs::write(path, &annotated)
            .with_context(|| format!("writing annotated page to {}", path.display()))?,
        // In JSON mode stdout carries the report, so the page needs `-o`.
        None if output::is_json() => {}
        None => println!("{annotated}"),
    }

    if output::is_json() {
        output::print_json(&serde_json::to_value(&report)?);
    } else if !output::is_quiet() {
        let s = Styled::new();
        output::print_report(&s, &report);
        if let Some(path) = &args.output {
            eprintln!("  Annotated page written to {}", path.display());
        }
    }

    Ok(())
}

/// Cancel on Ctrl-C, and after `run_timeout_ms` if set.
fn spawn_cancel_triggers(cancel: &CancellationToken, run_timeout_ms: Option<u64>) {
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = on_signal.cancelled() => {}
            result = tokio::signal::ctrl_c() => {
                if result.is_ok() {
                    info!("received interrupt, cancelling run");
                    on_signal.cancel();
                }
            }
        }
    });

    if let Some(ms) = run_timeout_ms {
        let on_deadline = cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = on_deadline.cancelled() => {}
                _ = tokio::time::sleep(Duration::from_millis(ms)) => {
                    info!("run deadline of {ms}ms reached, cancelling");
                    on_deadline.cancel();
                }
            }
        });
    }
}
