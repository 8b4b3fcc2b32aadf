//! `serp-flag classify <text>...`: send free text to the endpoint.

use std::path::Path;

use anyhow::{bail, Result};
use clap::Args;
use serp_flag::{ClassMatcher, Classifier, HttpClassifier};

use crate::cli::output::{self, Styled};
use crate::cli::settings::{self, ConfigArgs};

#[derive(Debug, Clone, Args)]
pub struct ClassifyArgs {
    /// Texts to classify, one request each.
    #[arg(required = true)]
    pub texts: Vec<String>,

    /// Class value reported as a match.
    #[arg(long)]
    pub positive_class: Option<i64>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Run the classify command.
pub async fn run(args: &ClassifyArgs, config_path: Option<&Path>) -> Result<()> {
    let config = settings::resolve(config_path, &args.config)?;
    let classifier = HttpClassifier::from_config(&config.classifier)?;
    let matcher =
        ClassMatcher::new(args.positive_class.unwrap_or(config.highlight.positive_class));

    let s = Styled::new();
    let mut results = Vec::new();
    let mut failures = 0usize;

    for text in &args.texts {
        match classifier.classify(text).await {
            Ok(response) => {
                let matched = matcher.matches(&response);
                if !output::is_json() {
                    let verdict = if matched {
                        s.red("match")
                    } else {
                        s.dim("no match")
                    };
                    println!(
                        "{} class {} {verdict}  {}",
                        s.ok_sym(),
                        response.predicted_class,
                        output::truncate(text, 72)
                    );
                }
                results.push(serde_json::json!({
                    "text": text,
                    "predicted_class": response.predicted_class,
                    "matched": matched,
                }));
            }
            Err(err) => {
                failures += 1;
                if !output::is_json() {
                    println!("{} {}  {}", s.fail_sym(), err, output::truncate(text, 72));
                }
                results.push(serde_json::json!({
                    "text": text,
                    "error": err.to_string(),
                    "kind": err.kind(),
                }));
            }
        }
    }

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "endpoint": classifier.endpoint(),
            "results": results,
        }));
    }

    if failures > 0 {
        bail!(
            "{failures} of {} requests to {} failed",
            args.texts.len(),
            classifier.endpoint()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_classify_reports_failures() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        std::fs::write(&config_path, "").unwrap();

        let args = ClassifyArgs {
            texts: vec!["a".to_string(), "b".to_string()],
            positive_class: None,
            config: ConfigArgs {
                endpoint: Some(server.uri()),
                ..Default::default()
            },
        };
        let err = run(&args, Some(&config_path)).await.unwrap_err();
        assert!(err.to_string().contains("2 of 2"));
    }

    #[tokio::test]
    async fn test_classify_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"predicted_class": 1})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        std::fs::write(&config_path, "").unwrap();

        let args = ClassifyArgs {
            texts: vec!["Election night live updates".to_string()],
            positive_class: None,
            config: ConfigArgs {
                endpoint: Some(server.uri()),
                ..Default::default()
            },
        };
        run(&args, Some(&config_path)).await.unwrap();
    }
}
