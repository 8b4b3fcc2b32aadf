//! Readiness check: config, selector, and a live probe of the endpoint.
//!
//! Every failure comes with a specific fix instruction.

use std::path::Path;
use std::time::Instant;

use anyhow::{bail, Result};
use serde::Serialize;
use serp_flag::{Classifier, ConfigLoader, FlaggerConfig, HttpClassifier, Selector};

use crate::cli::output::{self, Styled};
use crate::cli::settings::{self, ConfigArgs};

/// Text sent to the endpoint by the reachability probe.
const PROBE_TEXT: &str = "serp-flag doctor probe";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Ok,
    Fail,
}

/// Result of one diagnostic check.
#[derive(Debug, Clone, Serialize)]
pub struct Check {
    pub section: &'static str,
    pub label: &'static str,
    pub status: CheckStatus,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl Check {
    fn new(section: &'static str, label: &'static str, status: CheckStatus, value: String) -> Self {
        Self {
            section,
            label,
            status,
            value,
            hint: None,
        }
    }

    fn hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Run the doctor diagnostic.
pub async fn run(args: &ConfigArgs, config_path: Option<&Path>) -> Result<()> {
    let mut checks = Vec::new();

    let config = match settings::load(config_path) {
        Ok(mut config) => {
            let origin = match config_path {
                Some(path) => path.display().to_string(),
                None => match ConfigLoader::default_path() {
                    Some(path) if path.exists() => path.display().to_string(),
                    _ => "built-in defaults".to_string(),
                },
            };
            checks.push(Check::new("Config", "Config:", CheckStatus::Ok, origin));
            args.apply(&mut config);
            Some(config)
        }
        Err(e) => {
            checks.push(
                Check::new("Config", "Config:", CheckStatus::Fail, format!("{e:#}"))
                    .hint("Fix the file or pass --config with a valid TOML file."),
            );
            None
        }
    };

    if let Some(config) = &config {
        checks.extend(static_checks(config));
        if checks.iter().all(|c| c.status != CheckStatus::Fail) {
            checks.push(probe_endpoint(config).await);
        }
    }

    let ready = checks.iter().all(|c| c.status != CheckStatus::Fail);

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "ready": ready,
            "checks": checks,
        }));
    } else {
        render(&checks, ready);
    }

    if !ready {
        bail!("serp-flag is not ready");
    }
    Ok(())
}

/// Checks that need no network.
pub fn static_checks(config: &FlaggerConfig) -> Vec<Check> {
    let mut checks = Vec::new();

    match Selector::parse(&config.page.selector) {
        Ok(_) => checks.push(Check::new(
            "Page",
            "Selector:",
            CheckStatus::Ok,
            config.page.selector.clone(),
        )),
        Err(e) => checks.push(
            Check::new(
                "Page",
                "Selector:",
                CheckStatus::Fail,
                format!("{:?} does not parse: {e}", config.page.selector),
            )
            .hint("Set [page] selector or pass --selector."),
        ),
    }

    match config.validate() {
        Ok(()) => checks.push(Check::new(
            "Endpoint",
            "URL:",
            CheckStatus::Ok,
            format!(
                "{} (timeout {})",
                config.classifier.endpoint,
                output::format_duration_ms(config.classifier.timeout_ms)
            ),
        )),
        Err(e) => checks.push(
            Check::new("Endpoint", "Settings:", CheckStatus::Fail, e.to_string())
                .hint("Fix the value named above in the config file or flags."),
        ),
    }

    checks
}

async fn probe_endpoint(config: &FlaggerConfig) -> Check {
    let classifier = match HttpClassifier::from_config(&config.classifier) {
        Ok(classifier) => classifier,
        Err(e) => return Check::new("Endpoint", "Probe:", CheckStatus::Fail, e.to_string()),
    };

    let started = Instant::now();
    match classifier.classify(PROBE_TEXT).await {
        Ok(response) => Check::new(
            "Endpoint",
            "Probe:",
            CheckStatus::Ok,
            format!(
                "class {} in {}",
                response.predicted_class,
                output::format_duration_ms(started.elapsed().as_millis() as u64)
            ),
        ),
        Err(e) => {
            let hint = match e.kind() {
                serp_flag::ErrorKind::Transport => {
                    "Is the classification server running? Start it or point --endpoint at it."
                }
                serp_flag::ErrorKind::Http => "The server rejected the probe; check its logs.",
                serp_flag::ErrorKind::Decode => {
                    "The server must answer with JSON containing an integer \"predicted_class\"."
                }
            };
            Check::new("Endpoint", "Probe:", CheckStatus::Fail, e.to_string()).hint(hint)
        }
    }
}

fn render(checks: &[Check], ready: bool) {
    let s = Styled::new();
    output::print_header(&s);

    let mut section = "";
    for check in checks {
        if check.section != section {
            if !section.is_empty() {
                eprintln!();
            }
            output::print_section(&s, check.section);
            section = check.section;
        }
        let symbol = match check.status {
            CheckStatus::Ok => s.ok_sym(),
            CheckStatus::Fail => s.fail_sym(),
        };
        output::print_check(symbol, check.label, &check.value);
        if let Some(hint) = &check.hint {
            output::print_detail(hint);
        }
    }

    if ready {
        output::print_status(&s, &s.green("READY"), "all checks passed");
    } else {
        let failed = checks
            .iter()
            .filter(|c| c.status == CheckStatus::Fail)
            .count();
        output::print_status(&s, &s.red("NOT READY"), &format!("{failed} check(s) failed"));
    }
}
