//! # serp-flag
//!
//! Extracts search-result titles from an HTML page, sends each title to a
//! remote text classifier, and highlights the titles whose predicted class
//! matches a target value.
//!
//! ```no_run
//! use serp_flag::{Annotator, FlaggerConfig, HtmlPage};
//!
//! # async fn demo(html: &str) -> Result<(), serp_flag::FlagError> {
//! let annotator = Annotator::from_config(&FlaggerConfig::default())?;
//! let mut page = HtmlPage::parse(html);
//! let report = annotator.run(&mut page).await;
//! println!("{} highlighted", report.highlighted);
//! let annotated = page.html();
//! # let _ = annotated;
//! # Ok(())
//! # }
//! ```

pub mod annotator;
pub mod classifier;
pub mod config;
pub mod error;
pub mod page;
pub mod report;

pub use annotator::Annotator;
pub use classifier::{
    ClassMatcher, ClassificationRequest, ClassificationResponse, Classifier, HttpClassifier,
    DEFAULT_POSITIVE_CLASS,
};
pub use config::{ConfigLoader, FlaggerConfig};
pub use error::{ClassifyError, ConfigError, ErrorKind, FlagError};
pub use page::{Candidate, HtmlPage, Page, StyleOverride};
pub use report::{CandidateReport, Outcome, RunReport};

pub use scraper::Selector;
pub use tokio_util::sync::CancellationToken;
