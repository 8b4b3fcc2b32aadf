//! The annotation pass: select, classify, highlight.
//!
//! Candidates are processed one at a time in document order. Each
//! candidate's request is awaited before the next one starts, and a failure
//! is recorded against that candidate only. A pass never returns an error;
//! everything that happened is in the [`RunReport`].

use std::time::Instant;

use scraper::Selector;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::classifier::{ClassMatcher, Classifier, HttpClassifier};
use crate::config::FlaggerConfig;
use crate::error::FlagError;
use crate::page::{Candidate, Page, StyleOverride};
use crate::report::{CandidateReport, Outcome, RunReport};

/// Extracts candidates from a page, classifies them, and restyles matches.
pub struct Annotator<C> {
    classifier: C,
    selector: Selector,
    selector_source: String,
    matcher: ClassMatcher,
    highlight: StyleOverride,
    failure_style: Option<StyleOverride>,
}

impl Annotator<HttpClassifier> {
    /// Build an HTTP-backed annotator from validated configuration.
    pub fn from_config(config: &FlaggerConfig) -> Result<Self, FlagError> {
        config.validate()?;
        let classifier = HttpClassifier::from_config(&config.classifier)?;

        Ok(Self::new(classifier, &config.page.selector)?
            .with_matcher(ClassMatcher::new(config.highlight.positive_class))
            .with_highlight_color(&config.highlight.color)
            .with_failure_color(config.highlight.failure_color.as_deref()))
    }
}

impl<C: Classifier> Annotator<C> {
    /// Annotator with the default positive class and a red highlight.
    pub fn new(classifier: C, selector: &str) -> Result<Self, FlagError> {
        let parsed = Selector::parse(selector).map_err(|e| FlagError::Selector {
            selector: selector.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            classifier,
            selector: parsed,
            selector_source: selector.to_string(),
            matcher: ClassMatcher::default(),
            highlight: StyleOverride::highlight(crate::config::DEFAULT_HIGHLIGHT_COLOR),
            failure_style: None,
        })
    }

    pub fn with_matcher(mut self, matcher: ClassMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn with_highlight_color(mut self, color: &str) -> Self {
        self.highlight = StyleOverride::highlight(color);
        self
    }

    /// Mark candidates whose classification failed with their own color.
    pub fn with_failure_color(mut self, color: Option<&str>) -> Self {
        self.failure_style = color.map(StyleOverride::highlight);
        self
    }

    pub fn selector(&self) -> &str {
        &self.selector_source
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Run one pass over `page`.
    pub async fn run<P: Page>(&self, page: &mut P) -> RunReport {
        self.run_with_cancel(page, &CancellationToken::new()).await
    }

    /// Run one pass over `page`, stopping early once `cancel` fires.
    ///
    /// A request in flight when the token fires is abandoned; it and every
    /// candidate after it are reported as [`Outcome::Skipped`].
    pub async fn run_with_cancel<P: Page>(
        &self,
        page: &mut P,
        cancel: &CancellationToken,
    ) -> RunReport {
        let started = Instant::now();
        let candidates = page.candidates(&self.selector);
        let mut report = RunReport::new(&self.selector_source, self.classifier.endpoint());

        info!(
            selector = %self.selector_source,
            endpoint = %self.classifier.endpoint(),
            candidates = candidates.len(),
            "starting annotation pass"
        );

        for candidate in candidates {
            if cancel.is_cancelled() {
                report.record(CandidateReport {
                    index: candidate.index,
                    text: candidate.text,
                    outcome: Outcome::Skipped,
                    duration_ms: 0,
                });
                continue;
            }

            report.requests += 1;
            let began = Instant::now();
            let outcome = self.process(page, &candidate, cancel).await;
            report.record(CandidateReport {
                index: candidate.index,
                text: candidate.text,
                outcome,
                duration_ms: began.elapsed().as_millis() as u64,
            });
        }

        report.cancelled = cancel.is_cancelled();
        report.elapsed_ms = started.elapsed().as_millis() as u64;

        info!(
            candidates = report.candidates,
            highlighted = report.highlighted,
            failed = report.failed,
            skipped = report.skipped,
            cancelled = report.cancelled,
            elapsed_ms = report.elapsed_ms,
            "annotation pass finished"
        );

        report
    }

    /// Classify one candidate and apply the resulting style.
    async fn process<P: Page>(
        &self,
        page: &mut P,
        candidate: &Candidate<P::Handle>,
        cancel: &CancellationToken,
    ) -> Outcome {
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(index = candidate.index, "classification abandoned, run cancelled");
                return Outcome::Skipped;
            }
            result = self.classifier.classify(&candidate.text) => result,
        };

        match result {
            Ok(response) if self.matcher.matches(&response) => {
                debug!(index = candidate.index, class = response.predicted_class, "match");
                if !page.apply_style(&candidate.handle, &self.highlight) {
                    warn!(index = candidate.index, "matched element no longer in page");
                }
                Outcome::Highlighted {
                    class: response.predicted_class,
                }
            }
            Ok(response) => Outcome::NotMatched {
                class: response.predicted_class,
            },
            Err(err) => {
                warn!(
                    index = candidate.index,
                    text = %candidate.text,
                    error = %err,
                    "failed to classify candidate"
                );
                if let Some(style) = &self.failure_style {
                    page.apply_style(&candidate.handle, style);
                }
                Outcome::Failed {
                    kind: err.kind(),
                    message: err.to_string(),
                }
            }
        }
    }
}
