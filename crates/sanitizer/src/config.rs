//! Sanitizer configuration, loadable from TOML.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_ALLOWED_TAGS: &[&str] = &[
    "a",
    "b",
    "blockquote",
    "br",
    "code",
    "em",
    "figure",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "i",
    "ol",
    "p",
    "q",
    "s",
    "strong",
    "sub",
    "sup",
    "u",
    "ul",
];
pub const DEFAULT_CAPTION_TAGS: &[&str] = &["a", "b", "br", "em", "i", "strong"];
pub const DEFAULT_CITE_TAGS: &[&str] = &["a", "b", "em", "i", "strong"];
pub const DEFAULT_LIST_TAGS: &[&str] = &["a", "b", "em", "i", "li", "ol", "strong", "ul"];
const RAW_TEXT_TAGS: &[&str] = &["script", "style"];

pub const DEFAULT_CLASSES: &[&str] = &["user-center", "user-justify", "user-left", "user-right"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("link prober: {0}")]
    Probe(#[from] net::ProbeError),
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct SanitizerConfig {
    /// Tags legal at the top level; also decides which special validators are reachable.
    pub allowed_tags: BTreeSet<String>,
    pub allow_external_links: bool,
    /// Links and images on this host (or a subdomain) are internal.
    pub internal_hostname: String,
    /// Scheme used to absolutize host-relative references.
    pub scheme: String,
    pub check_link_reachability: bool,
    pub probe_timeout_secs: u64,
    pub caption_whitelist: BTreeSet<String>,
    pub cite_whitelist: BTreeSet<String>,
    pub list_whitelist: BTreeSet<String>,
    pub allowed_classes: BTreeSet<String>,
    /// Directory that host-relative image paths resolve against.
    pub asset_root: Option<PathBuf>,
}

fn owned_set(tags: &[&str]) -> BTreeSet<String> {
    tags.iter().map(|t| t.to_string()).collect()
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            allowed_tags: owned_set(DEFAULT_ALLOWED_TAGS),
            allow_external_links: false,
            internal_hostname: "localhost".to_string(),
            scheme: "https".to_string(),
            check_link_reachability: false,
            probe_timeout_secs: 5,
            caption_whitelist: owned_set(DEFAULT_CAPTION_TAGS),
            cite_whitelist: owned_set(DEFAULT_CITE_TAGS),
            list_whitelist: owned_set(DEFAULT_LIST_TAGS),
            allowed_classes: owned_set(DEFAULT_CLASSES),
            asset_root: None,
        }
    }
}

impl SanitizerConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let mut config: SanitizerConfig = toml::from_str(source)?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn with_internal_hostname(mut self, hostname: &str) -> Self {
        self.internal_hostname = hostname.to_string();
        self.normalize();
        self
    }

    pub fn with_external_links(mut self, allow: bool) -> Self {
        self.allow_external_links = allow;
        self
    }

    pub fn with_allowed_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_tags = tags.into_iter().map(Into::into).collect();
        self.normalize();
        self
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    // Tag names and hosts are compared in lowercase everywhere.
    fn normalize(&mut self) {
        for set in [
            &mut self.allowed_tags,
            &mut self.caption_whitelist,
            &mut self.cite_whitelist,
            &mut self.list_whitelist,
        ] {
            *set = set.iter().map(|t| t.trim().to_ascii_lowercase()).collect();
        }
        self.internal_hostname = self
            .internal_hostname
            .trim()
            .trim_end_matches('.')
            .to_ascii_lowercase();
        self.scheme = self.scheme.trim().to_ascii_lowercase();
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.internal_hostname.is_empty() {
            return Err(ConfigError::Invalid(
                "internal_hostname must not be empty".to_string(),
            ));
        }
        if url::Host::parse(&self.internal_hostname).is_err() {
            return Err(ConfigError::Invalid(format!(
                "internal_hostname {:?} is not a valid host",
                self.internal_hostname
            )));
        }
        if self.scheme != "http" && self.scheme != "https" {
            return Err(ConfigError::Invalid(format!(
                "scheme must be http or https, got {:?}",
                self.scheme
            )));
        }
        if self.probe_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "probe_timeout_secs must be greater than zero".to_string(),
            ));
        }
        for (field, set) in [
            ("allowed_tags", &self.allowed_tags),
            ("caption_whitelist", &self.caption_whitelist),
            ("cite_whitelist", &self.cite_whitelist),
            ("list_whitelist", &self.list_whitelist),
        ] {
            if set.iter().any(|t| t.is_empty()) {
                return Err(ConfigError::Invalid(format!("empty tag name in {field}")));
            }
            // Raw text elements cannot carry escaped text through a re-parse.
            if let Some(tag) = set.iter().find(|t| RAW_TEXT_TAGS.contains(&t.as_str())) {
                return Err(ConfigError::Invalid(format!("{tag} cannot be allowed in {field}")));
            }
        }
        Ok(())
    }
}
