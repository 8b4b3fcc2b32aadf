//! Configuration schema and loader.
//!
//! Configuration lives in a TOML file (by default
//! `~/.serp-flag/config.toml`). Every section and field is optional; missing
//! values fall back to the defaults below. `${VAR}` references inside string
//! values are expanded from the environment after parsing, so comments are
//! never expanded and substituted text needs no TOML escaping.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::classifier::DEFAULT_POSITIVE_CLASS;
use crate::error::ConfigError;

/// Default classification endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000/predict";

/// Search-result title nodes on the results page.
pub const DEFAULT_SELECTOR: &str = ".LC20lb.MBeuO.DKV0Md";

pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

pub const DEFAULT_HIGHLIGHT_COLOR: &str = "red";

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlaggerConfig {
    #[serde(default)]
    pub classifier: ClassifierConfig,

    #[serde(default)]
    pub page: PageConfig,

    #[serde(default)]
    pub highlight: HighlightConfig,

    #[serde(default)]
    pub run: RunConfig,
}

/// Where and how classification requests are sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Per-request timeout.
    #[serde(default = "default_request_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// Which elements of the page are candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageConfig {
    #[serde(default = "default_selector")]
    pub selector: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            selector: default_selector(),
        }
    }
}

/// What counts as a match and how matches are shown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightConfig {
    #[serde(default = "default_positive_class")]
    pub positive_class: i64,

    #[serde(default = "default_highlight_color")]
    pub color: String,

    /// When set, candidates whose classification failed get this color.
    #[serde(default)]
    pub failure_color: Option<String>,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            positive_class: default_positive_class(),
            color: default_highlight_color(),
            failure_color: None,
        }
    }
}

/// Whole-run settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Overall deadline for one pass; remaining candidates are skipped.
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// Append-only JSONL log of candidate outcomes.
    #[serde(default)]
    pub audit_log: Option<String>,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

fn default_selector() -> String {
    DEFAULT_SELECTOR.to_string()
}

fn default_positive_class() -> i64 {
    DEFAULT_POSITIVE_CLASS
}

fn default_highlight_color() -> String {
    DEFAULT_HIGHLIGHT_COLOR.to_string()
}

impl FlaggerConfig {
    /// Check every field that would otherwise fail later, mid-run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = url::Url::parse(&self.classifier.endpoint)
            .map_err(|e| invalid("classifier.endpoint", e.to_string()))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(invalid(
                "classifier.endpoint",
                format!("unsupported scheme {:?}", endpoint.scheme()),
            ));
        }

        if self.classifier.timeout_ms == 0 {
            return Err(invalid("classifier.timeout_ms", "must be positive"));
        }
        if self.run.timeout_ms == Some(0) {
            return Err(invalid("run.timeout_ms", "must be positive"));
        }

        if let Err(e) = scraper::Selector::parse(&self.page.selector) {
            return Err(invalid("page.selector", e.to_string()));
        }

        validate_color("highlight.color", &self.highlight.color)?;
        if let Some(color) = &self.highlight.failure_color {
            validate_color("highlight.failure_color", color)?;
        }

        Ok(())
    }

    /// Audit log path with `~` expanded.
    pub fn audit_log_path(&self) -> Option<PathBuf> {
        self.run
            .audit_log
            .as_deref()
            .map(|p| PathBuf::from(ConfigLoader::expand_path(p)))
    }
}

fn validate_color(field: &str, color: &str) -> Result<(), ConfigError> {
    if color.trim().is_empty() {
        return Err(invalid(field, "must not be empty"));
    }
    if color.contains([';', '{', '}', '!']) {
        return Err(invalid(field, format!("{color:?} is not a plain CSS color")));
    }
    Ok(())
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        message: message.into(),
    }
}

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<FlaggerConfig, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<FlaggerConfig, ConfigError> {
        let mut root = toml::Value::Table(content.parse::<toml::Table>()?);
        Self::expand_value(&mut root)?;
        let config: FlaggerConfig = root.try_into()?;
        Ok(config)
    }

    /// Load `~/.serp-flag/config.toml` if present, defaults otherwise.
    pub fn load_default() -> Result<FlaggerConfig, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(FlaggerConfig::default()),
        }
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".serp-flag").join("config.toml"))
    }

    fn expand_value(value: &mut toml::Value) -> Result<(), ConfigError> {
        match value {
            toml::Value::String(text) => *text = Self::expand_env_vars(text)?,
            toml::Value::Array(items) => {
                for item in items {
                    Self::expand_value(item)?;
                }
            }
            toml::Value::Table(table) => {
                for (_, item) in table.iter_mut() {
                    Self::expand_value(item)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Expand environment variables in the format `${VAR}`.
    fn expand_env_vars(text: &str) -> Result<String, ConfigError> {
        static ENV_REF: OnceLock<Regex> = OnceLock::new();
        let re = ENV_REF.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid regex"));

        let mut result = String::with_capacity(text.len());
        let mut last = 0;
        for cap in re.captures_iter(text) {
            let Some(whole) = cap.get(0) else {
                continue;
            };
            let var_name = &cap[1];
            let var_value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotSet(var_name.to_string()))?;
            result.push_str(&text[last..whole.start()]);
            result.push_str(&var_value);
            last = whole.end();
        }
        result.push_str(&text[last..]);

        Ok(result)
    }

    /// Expand shell-style paths (e.g., `~/.serp-flag/audit.jsonl`).
    pub fn expand_path(path: &str) -> String {
        match (path.strip_prefix("~/"), dirs::home_dir()) {
            (Some(rest), Some(home)) => home.join(rest).display().to_string(),
            _ => path.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_empty_config() {
        let config = ConfigLoader::load_str("").unwrap();
        assert_eq!(config, FlaggerConfig::default());
        assert_eq!(config.classifier.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.page.selector, DEFAULT_SELECTOR);
        assert_eq!(config.highlight.positive_class, 1);
        assert_eq!(config.highlight.color, "red");
        assert!(config.highlight.failure_color.is_none());
        assert!(config.run.timeout_ms.is_none());
        config.validate().unwrap();
    }

    #[test]
    fn test_load_full_config() {
        let content = r##"
            [classifier]
            endpoint = "https://classify.internal:8443/v1/predict"
            timeout_ms = 2500

            [page]
            selector = "h3.title"

            [highlight]
            positive_class = 2
            color = "#c00"
            failure_color = "orange"

            [run]
            timeout_ms = 60000
            audit_log = "/var/log/serp-flag.jsonl"
        "##;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(
            config.classifier.endpoint,
            "https://classify.internal:8443/v1/predict"
        );
        assert_eq!(config.classifier.timeout_ms, 2500);
        assert_eq!(config.page.selector, "h3.title");
        assert_eq!(config.highlight.positive_class, 2);
        assert_eq!(config.highlight.color, "#c00");
        assert_eq!(config.highlight.failure_color.as_deref(), Some("orange"));
        assert_eq!(config.run.timeout_ms, Some(60000));
        assert_eq!(
            config.audit_log_path(),
            Some(PathBuf::from("/var/log/serp-flag.jsonl"))
        );
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let config = ConfigLoader::load_str("[classifier]\ntimeout_ms = 500\n").unwrap();
        assert_eq!(config.classifier.timeout_ms, 500);
        assert_eq!(config.classifier.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_env_var_expansion() {
        std::env::set_var("SERP_FLAG_TEST_HOST", "10.0.0.7");
        let config = ConfigLoader::load_str(
            "[classifier]\nendpoint = \"http://${SERP_FLAG_TEST_HOST}:5000/predict\"\n",
        )
        .unwrap();
        assert_eq!(config.classifier.endpoint, "http://10.0.0.7:5000/predict");
    }

    #[test]
    fn test_env_var_not_set() {
        let result = ConfigLoader::load_str(
            "[classifier]\nendpoint = \"${SERP_FLAG_TEST_DEFINITELY_UNSET}\"\n",
        );
        assert!(matches!(result, Err(ConfigError::EnvVarNotSet(name)) if name == "SERP_FLAG_TEST_DEFINITELY_UNSET"));
    }

    #[test]
    fn test_env_var_in_comment_is_ignored() {
        let config = ConfigLoader::load_str(
            "# endpoint = \"${SERP_FLAG_TEST_COMMENTED_OUT}\"\n[page]\nselector = \"h3\"\n",
        )
        .unwrap();
        assert_eq!(config.page.selector, "h3");
        assert_eq!(config.classifier.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_env_var_value_with_quotes() {
        std::env::set_var("SERP_FLAG_TEST_SELECTOR", r#"a[title="News"] > h3"#);
        let config =
            ConfigLoader::load_str("[page]\nselector = \"${SERP_FLAG_TEST_SELECTOR}\"\n").unwrap();
        assert_eq!(config.page.selector, r#"a[title="News"] > h3"#);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[page]").unwrap();
        writeln!(file, "selector = \"a > h3\"").unwrap();

        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.page.selector, "a > h3");
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = ConfigLoader::load(Path::new("/nonexistent/serp-flag/config.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_invalid_toml() {
        let result = ConfigLoader::load_str("[classifier\nendpoint = ");
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn test_validate_rejects_bad_endpoint() {
        let mut config = FlaggerConfig::default();
        config.classifier.endpoint = "localhost:5000/predict".to_string();
        assert!(config.validate().is_err());

        config.classifier.endpoint = "ftp://localhost/predict".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("classifier.endpoint"));
    }

    #[test]
    fn test_validate_rejects_bad_selector() {
        let mut config = FlaggerConfig::default();
        config.page.selector = "h3[".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("page.selector"));
    }

    #[test]
    fn test_validate_rejects_zero_timeouts() {
        let mut config = FlaggerConfig::default();
        config.classifier.timeout_ms = 0;
        assert!(config.validate().is_err());

        let mut config = FlaggerConfig::default();
        config.run.timeout_ms = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_style_injection_in_color() {
        let mut config = FlaggerConfig::default();
        config.highlight.color = "red; display: none".to_string();
        assert!(config.validate().is_err());

        let mut config = FlaggerConfig::default();
        config.highlight.failure_color = Some("orange !important".to_string());
        assert!(config.validate().is_err());

        let mut config = FlaggerConfig::default();
        config.highlight.color = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_expand_path() {
        if dirs::home_dir().is_some() {
            let expanded = ConfigLoader::expand_path("~/.serp-flag/audit.jsonl");
            assert!(!expanded.starts_with('~'));
            assert!(expanded.ends_with("audit.jsonl"));
        }
        assert_eq!(ConfigLoader::expand_path("/tmp/a.jsonl"), "/tmp/a.jsonl");
    }
}
