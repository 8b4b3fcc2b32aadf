//! JSONL audit log: one appended line per classified candidate.

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use serp_flag::RunReport;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

/// A single audit record.
#[derive(Debug, Clone, Serialize)]
pub struct AuditRecord {
    pub timestamp: String,
    pub source: String,
    pub endpoint: String,
    pub index: usize,
    pub text: String,
    pub status: String,
    pub predicted_class: Option<i64>,
    pub error: Option<String>,
    pub duration_ms: u64,
}

/// Append-only JSONL audit logger.
pub struct AuditLogger {
    file: File,
}

impl AuditLogger {
    /// Open or create the audit log file.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open audit log: {}", path.display()))?;

        Ok(Self { file })
    }

    /// Log an audit record.
    pub fn log(&mut self, record: &AuditRecord) -> Result<()> {
        let json = serde_json::to_string(record)?;
        writeln!(self.file, "{json}")?;
        Ok(())
    }

    /// Log every candidate of a run. Returns the number of lines written.
    pub fn log_report(&mut self, source: &str, report: &RunReport) -> Result<usize> {
        let timestamp = Utc::now().to_rfc3339();
        for entry in &report.outcomes {
            let error = match &entry.outcome {
                serp_flag::Outcome::Failed { message, .. } => Some(message.clone()),
                _ => None,
            };
            self.log(&AuditRecord {
                timestamp: timestamp.clone(),
                source: source.to_string(),
                endpoint: report.endpoint.clone(),
                index: entry.index,
                text: entry.text.clone(),
                status: entry.outcome.label().to_string(),
                predicted_class: entry.outcome.predicted_class(),
                error,
                duration_ms: entry.duration_ms,
            })?;
        }
        Ok(report.outcomes.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serp_flag::{CandidateReport, ErrorKind, Outcome};

    fn sample_report() -> RunReport {
        RunReport {
            selector: "h3".to_string(),
            endpoint: "http://localhost:5000/predict".to_string(),
            candidates: 2,
            requests: 2,
            highlighted: 1,
            failed: 1,
            outcomes: vec![
                CandidateReport {
                    index: 0,
                    text: "Buy now!!!".to_string(),
                    outcome: Outcome::Highlighted { class: 1 },
                    duration_ms: 12,
                },
                CandidateReport {
                    index: 1,
                    text: "Weather forecast for Tuesday".to_string(),
                    outcome: Outcome::Failed {
                        kind: ErrorKind::Transport,
                        message: "request timed out after 100ms".to_string(),
                    },
                    duration_ms: 100,
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_log_report_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("audit.jsonl");

        let mut logger = AuditLogger::open(&path).unwrap();
        assert_eq!(logger.log_report("results.html", &sample_report()).unwrap(), 2);
        drop(logger);

        let mut logger = AuditLogger::open(&path).unwrap();
        logger.log_report("results.html", &sample_report()).unwrap();
        drop(logger);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0]["status"], "highlighted");
        assert_eq!(lines[0]["predicted_class"], 1);
        assert_eq!(lines[0]["source"], "results.html");
        assert_eq!(lines[1]["status"], "failed");
        assert!(lines[1]["predicted_class"].is_null());
        assert!(lines[1]["error"].as_str().unwrap().contains("timed out"));
    }
}
