//! The RON configuration file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use harvester_core::{
    Catalog, CatalogEntry, CodeOverrides, ShortCodeTable, SplitDestination, Testament,
    WorkMapping, WorkPlan,
};
use harvester_engine::{
    EmptyPolicy, Endpoint, FetchSettings, HarvestError, RetryPolicy, SourceKind, WorkerPool,
    BROWSER_USER_AGENT,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub output_root: PathBuf,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    pub catalog: CatalogSource,
    #[serde(default)]
    pub short_codes: ShortCodeTable,
    pub versions: Vec<VersionConfig>,
}

fn default_concurrency() -> usize {
    WorkerPool::DEFAULT_SIZE
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub max_bytes: u64,
    pub user_agent: UserAgent,
}

impl Default for HttpConfig {
    fn default() -> Self {
        let defaults = FetchSettings::default();
        Self {
            connect_timeout_secs: defaults.connect_timeout.as_secs(),
            request_timeout_secs: defaults.request_timeout.as_secs(),
            max_bytes: defaults.max_bytes,
            user_agent: UserAgent::Default,
        }
    }
}

impl HttpConfig {
    /// Settings for one version; its own agent wins over the global one.
    pub fn fetch_settings(&self, agent: Option<&UserAgent>) -> FetchSettings {
        FetchSettings {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            max_bytes: self.max_bytes,
            user_agent: agent.unwrap_or(&self.user_agent).header_value(),
            ..FetchSettings::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserAgent {
    /// Whatever the HTTP client sends by default.
    #[default]
    Default,
    /// A desktop browser string, for sources that turn away plain clients.
    Browser,
    Custom(String),
}

impl UserAgent {
    fn header_value(&self) -> Option<String> {
        match self {
            UserAgent::Default => None,
            UserAgent::Browser => Some(BROWSER_USER_AGENT.to_string()),
            UserAgent::Custom(agent) => Some(agent.clone()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CatalogSource {
    Inline(Vec<CatalogEntry>),
    /// A RON catalog as written by the `catalog` command, relative to the
    /// configuration file.
    File(PathBuf),
    Api(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionConfig {
    /// Directory name under the output root.
    pub code: String,
    /// Identifier the source expects, when it differs from `code`.
    #[serde(default)]
    pub source_version: Option<String>,
    pub source: SourceKind,
    pub endpoint: Endpoint,
    #[serde(default)]
    pub user_agent: Option<UserAgent>,
    #[serde(default)]
    pub retry: RetryPolicy,
    #[serde(default = "default_validate_existing")]
    pub validate_existing: bool,
    #[serde(default)]
    pub empty_policy: EmptyPolicy,
    #[serde(default)]
    pub overrides: CodeOverrides,
    #[serde(default)]
    pub splits: BTreeMap<String, Vec<SplitDestination>>,
    /// Restricts the version to one testament.
    #[serde(default)]
    pub testament: Option<Testament>,
}

fn default_validate_existing() -> bool {
    true
}

impl VersionConfig {
    pub fn source_version(&self) -> &str {
        self.source_version.as_deref().unwrap_or(&self.code)
    }

    /// Work plans in catalog order. An unknown slug is a configuration
    /// defect and fails the whole version.
    pub fn plans(
        &self,
        catalog: &Catalog,
        short_codes: &ShortCodeTable,
    ) -> Result<Vec<WorkPlan>, HarvestError> {
        let mapping = WorkMapping::new(short_codes.clone())
            .with_overrides(self.overrides.clone())
            .with_splits(self.splits.clone());
        let mut plans = Vec::new();
        for entry in catalog.filtered(self.testament) {
            plans.extend(mapping.plan(&self.code, self.source_version(), entry)?);
        }
        Ok(plans)
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading configuration {}", path.display()))?;
        let mut config: AppConfig = ron::from_str(&raw)
            .with_context(|| format!("parsing configuration {}", path.display()))?;
        if let CatalogSource::File(catalog) = &mut config.catalog {
            if catalog.is_relative() {
                if let Some(dir) = path.parent() {
                    *catalog = dir.join(&*catalog);
                }
            }
        }
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.versions.is_empty() {
            bail!("configuration declares no versions");
        }
        let mut seen = std::collections::BTreeSet::new();
        for version in &self.versions {
            if !seen.insert(version.code.as_str()) {
                bail!("version {:?} is declared twice", version.code);
            }
            if version.retry.max_attempts == 0 {
                bail!("version {:?}: max_attempts must be at least 1", version.code);
            }
        }
        Ok(())
    }

    /// The versions named on the command line, or all of them.
    pub fn select_versions(&self, codes: &[String]) -> anyhow::Result<Vec<&VersionConfig>> {
        if codes.is_empty() {
            return Ok(self.versions.iter().collect());
        }
        codes
            .iter()
            .map(|code| {
                self.versions
                    .iter()
                    .find(|version| &version.code == code)
                    .with_context(|| format!("version {code:?} is not configured"))
            })
            .collect()
    }
}

pub fn load_catalog_file(path: &Path) -> anyhow::Result<Catalog> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading catalog {}", path.display()))?;
    ron::from_str(&raw).with_context(|| format!("parsing catalog {}", path.display()))
}
