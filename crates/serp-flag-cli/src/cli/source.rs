//! Where the page to annotate comes from.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::info;

/// A page given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSource {
    /// `-`
    Stdin,
    File(PathBuf),
    /// `http://` or `https://`, fetched once.
    Url(String),
}

impl PageSource {
    pub fn parse(raw: &str) -> Self {
        if raw == "-" {
            Self::Stdin
        } else if raw.starts_with("http://") || raw.starts_with("https://") {
            Self::Url(raw.to_string())
        } else {
            Self::File(PathBuf::from(raw))
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Stdin => "<stdin>".to_string(),
            Self::File(path) => path.display().to_string(),
            Self::Url(url) => url.clone(),
        }
    }

    /// Read the page body.
    pub async fn read(&self, timeout_ms: u64) -> Result<String> {
        match self {
            Self::Stdin => read_all(tokio::io::stdin())
                .await
                .context("reading page from stdin"),
            Self::File(path) => tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading page from {}", path.display())),
            Self::Url(url) => fetch(url, timeout_ms).await,
        }
    }
}

async fn read_all<R: AsyncRead + Unpin>(mut reader: R) -> std::io::Result<String> {
    let mut html = String::new();
    reader.read_to_string(&mut html).await?;
    Ok(html)
}

async fn fetch(url: &str, timeout_ms: u64) -> Result<String> {
    info!("fetching {url}");
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(timeout_ms))
        .user_agent(concat!("serp-flag/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("building HTTP client")?;

    let body = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("fetching {url}"))?
        .error_for_status()
        .with_context(|| format!("fetching {url}"))?
        .text()
        .await
        .with_context(|| format!("reading body of {url}"))?;

    Ok(body)
}
