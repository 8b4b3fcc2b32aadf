//! Per-run summary returned by an annotation pass.

use serde::Serialize;

use crate::error::ErrorKind;

/// What happened to one candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Classified as the positive class and restyled.
    Highlighted { class: i64 },
    /// Classified as some other class; left untouched.
    NotMatched { class: i64 },
    /// The classification request failed.
    Failed { kind: ErrorKind, message: String },
    /// The run was cancelled before this candidate finished.
    Skipped,
}

impl Outcome {
    pub fn predicted_class(&self) -> Option<i64> {
        match self {
            Self::Highlighted { class } | Self::NotMatched { class } => Some(*class),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Highlighted { .. } => "highlighted",
            Self::NotMatched { .. } => "not_matched",
            Self::Failed { .. } => "failed",
            Self::Skipped => "skipped",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateReport {
    pub index: usize,
    pub text: String,
    pub outcome: Outcome,
    pub duration_ms: u64,
}

/// Result of one [`Annotator::run`](crate::Annotator::run) pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunReport {
    pub selector: String,
    pub endpoint: String,
    pub candidates: usize,
    /// Requests actually sent; lower than `candidates` only when cancelled.
    pub requests: usize,
    pub highlighted: usize,
    pub not_matched: usize,
    pub failed: usize,
    pub skipped: usize,
    pub cancelled: bool,
    pub elapsed_ms: u64,
    pub outcomes: Vec<CandidateReport>,
}

impl RunReport {
    pub fn new(selector: &str, endpoint: &str) -> Self {
        Self {
            selector: selector.to_string(),
            endpoint: endpoint.to_string(),
            ..Default::default()
        }
    }

    pub(crate) fn record(&mut self, entry: CandidateReport) {
        self.candidates += 1;
        match entry.outcome {
            Outcome::Highlighted { .. } => self.highlighted += 1,
            Outcome::NotMatched { .. } => self.not_matched += 1,
            Outcome::Failed { .. } => self.failed += 1,
            Outcome::Skipped => self.skipped += 1,
        }
        self.outcomes.push(entry);
    }

    /// Indices of highlighted candidates.
    pub fn highlighted_indices(&self) -> Vec<usize> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.outcome, Outcome::Highlighted { .. }))
            .map(|o| o.index)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(index: usize, outcome: Outcome) -> CandidateReport {
        CandidateReport {
            index,
            text: format!("title {index}"),
            outcome,
            duration_ms: 3,
        }
    }

    #[test]
    fn test_record_updates_totals() {
        let mut report = RunReport::new("h3", "http://localhost:5000/predict");
        report.record(entry(0, Outcome::Highlighted { class: 1 }));
        report.record(entry(1, Outcome::NotMatched { class: 0 }));
        report.record(entry(
            2,
            Outcome::Failed {
                kind: ErrorKind::Http,
                message: "HTTP 500".to_string(),
            },
        ));
        report.record(entry(3, Outcome::Skipped));

        assert_eq!(report.candidates, 4);
        assert_eq!(report.highlighted, 1);
        assert_eq!(report.not_matched, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.highlighted_indices(), vec![0]);
    }

    #[test]
    fn test_outcome_json_shape() {
        let json = serde_json::to_value(Outcome::Highlighted { class: 1 }).unwrap();
        assert_eq!(json, serde_json::json!({"status": "highlighted", "class": 1}));

        let json = serde_json::to_value(Outcome::Failed {
            kind: ErrorKind::Decode,
            message: "missing field".to_string(),
        })
        .unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["kind"], "decode");
    }

    #[test]
    fn test_predicted_class() {
        assert_eq!(Outcome::NotMatched { class: 3 }.predicted_class(), Some(3));
        assert_eq!(Outcome::Skipped.predicted_class(), None);
        assert_eq!(Outcome::Skipped.label(), "skipped");
    }
}
