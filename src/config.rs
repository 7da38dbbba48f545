/**
Inspection run configuration

Supplies everything the cluster client needs from the outside world: how to reach
the cluster, which namespace the run is scoped to, and which namespaces to ignore.
*/
use async_trait::async_trait;
use kube::Config;
use kube::config::{KubeConfigOptions, Kubeconfig};
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::k8s::client::ConnectionError;

/// Prefix marking an exclusion entry as a regular expression
pub const REGEX_PREFIX: &str = "rx:";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unable to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid namespace pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// What the cluster client consumes from its configuration.
///
/// Implementations must be immutable for the lifetime of a client.
#[async_trait]
pub trait Configuration: Send + Sync {
    /// Resolve the parameters used to dial the control plane
    ///
    /// # Errors
    ///
    /// Will return `Err` if no usable cluster configuration can be found
    async fn connection_config(&self) -> Result<Config, ConnectionError>;

    /// Namespace the run is scoped to, `None` means all namespaces
    fn active_namespace(&self) -> Option<&str>;

    fn is_excluded(&self, namespace: &str) -> bool;
}

#[derive(Debug, Clone)]
enum Matcher {
    Exact(String),
    Pattern(Regex),
}

impl Matcher {
    fn matches(&self, namespace: &str) -> bool {
        match self {
            Self::Exact(name) => name == namespace,
            Self::Pattern(rx) => rx.is_match(namespace),
        }
    }
}

/// Namespaces a run should never see.
///
/// Plain entries match a namespace name exactly. Entries starting with `rx:` are
/// regular expressions, unanchored unless the pattern anchors itself.
#[derive(Debug, Clone, Default)]
pub struct NamespaceExclusions {
    matchers: Vec<Matcher>,
}

impl NamespaceExclusions {
    /// # Errors
    ///
    /// Will return `Err` if a `rx:` entry is not a valid regular expression
    pub fn parse<I, S>(entries: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let matchers = entries
            .into_iter()
            .map(|entry| {
                let entry = entry.as_ref().trim();
                entry.strip_prefix(REGEX_PREFIX).map_or_else(
                    || Ok(Matcher::Exact(entry.to_string())),
                    |pattern| {
                        Regex::new(pattern)
                            .map(Matcher::Pattern)
                            .map_err(|source| ConfigError::Pattern {
                                pattern: pattern.to_string(),
                                source,
                            })
                    },
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { matchers })
    }

    /// Read the `excludes.namespaces` list from a YAML file
    ///
    /// # Errors
    ///
    /// Will return `Err` if the file can't be read or parsed, or holds a bad pattern
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&raw)
    }

    /// # Errors
    ///
    /// Will return `Err` if `raw` is not valid YAML or holds a bad pattern
    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        let file: FileConfig = serde_yaml::from_str(raw)?;
        Self::parse(file.excludes.namespaces)
    }

    pub fn extend(&mut self, other: Self) {
        self.matchers.extend(other.matchers);
    }

    #[must_use]
    pub fn is_excluded(&self, namespace: &str) -> bool {
        self.matchers.iter().any(|m| m.matches(namespace))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    excludes: Excludes,
}

#[derive(Debug, Default, Deserialize)]
struct Excludes {
    #[serde(default)]
    namespaces: Vec<String>,
}

/// Configuration assembled from command line flags and an optional config file
#[derive(Debug, Clone, Default)]
pub struct InspectConfig {
    kubeconfig: Option<PathBuf>,
    context: Option<String>,
    namespace: Option<String>,
    exclusions: NamespaceExclusions,
}

impl InspectConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_kubeconfig(mut self, path: impl Into<PathBuf>) -> Self {
        self.kubeconfig = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// `all`, `*` or an empty name scope the run to every namespace
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    #[must_use]
    pub fn with_exclusions(mut self, exclusions: NamespaceExclusions) -> Self {
        self.exclusions.extend(exclusions);
        self
    }

    /// Add exclusions from an optional YAML file followed by plain `entries`
    ///
    /// # Errors
    ///
    /// Will return `Err` if the file can't be loaded or an entry is a bad pattern
    pub fn load_exclusions<S: AsRef<str>>(
        self,
        config_file: Option<&Path>,
        entries: &[S],
    ) -> crate::error::Result<Self> {
        let config = match config_file {
            Some(path) => self.with_exclusions(NamespaceExclusions::from_file(path)?),
            None => self,
        };
        Ok(config.with_exclusions(NamespaceExclusions::parse(entries)?))
    }

    #[must_use]
    pub const fn exclusions(&self) -> &NamespaceExclusions {
        &self.exclusions
    }
}

#[async_trait]
impl Configuration for InspectConfig {
    async fn connection_config(&self) -> Result<Config, ConnectionError> {
        if self.kubeconfig.is_none() && self.context.is_none() {
            debug!("inferring cluster configuration from the environment");
            return Ok(Config::infer().await?);
        }

        let kubeconfig = match &self.kubeconfig {
            Some(path) => {
                debug!("reading kubeconfig from {}", path.display());
                Kubeconfig::read_from(path)?
            }
            None => Kubeconfig::read()?,
        };
        let options = KubeConfigOptions {
            context: self.context.clone(),
            ..KubeConfigOptions::default()
        };
        Ok(Config::from_custom_kubeconfig(kubeconfig, &options).await?)
    }

    fn active_namespace(&self) -> Option<&str> {
        self.namespace
            .as_deref()
            .map(str::trim)
            .filter(|ns| !matches!(*ns, "" | "all" | "*"))
    }

    fn is_excluded(&self, namespace: &str) -> bool {
        self.exclusions.is_excluded(namespace)
    }
}
