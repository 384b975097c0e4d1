//! Configuration for the improvement pipeline
//!
//! The whole pipeline is driven by one TOML file: which repositories may be
//! touched, which goals apply, which text-generation backends are enabled,
//! and how file rewrites are performed. Configuration is loaded once at
//! orchestrator construction; a missing or malformed file aborts startup.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read { path: PathBuf, source: std::io::Error },

    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse { path: PathBuf, source: Box<toml::de::Error> },

    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

impl ConfigError {
    /// Create a validation error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid { message: message.into() }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend used when a task does not name one
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Repositories the pipeline may operate on
    #[serde(default)]
    pub repositories: Vec<RepositoryConfig>,

    /// Goal catalog
    #[serde(default)]
    pub goals: GoalsConfig,

    /// Provider backends
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Rewrite and backup behavior
    #[serde(default)]
    pub file_processing: FileProcessingConfig,
}

fn default_provider() -> String {
    "claude".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            repositories: Vec::new(),
            goals: GoalsConfig::default(),
            providers: ProvidersConfig::default(),
            file_processing: FileProcessingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;

        let config: Self = toml::from_str(&content)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source: Box::new(source) })?;

        config.validate()?;
        Ok(config)
    }

    /// Check structural invariants that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.repositories.is_empty() {
            return Err(ConfigError::invalid("no repositories configured"));
        }

        for repo in &self.repositories {
            if repo.name.is_empty() {
                return Err(ConfigError::invalid("repository with empty name"));
            }
            if repo.path.as_os_str().is_empty() {
                return Err(ConfigError::invalid(format!(
                    "repository '{}' has an empty path",
                    repo.name
                )));
            }
        }

        const KNOWN_PROVIDERS: [&str; 4] = ["claude", "openai", "ollama", "huggingface"];
        if !KNOWN_PROVIDERS.contains(&self.default_provider.as_str()) {
            return Err(ConfigError::invalid(format!(
                "unknown default provider '{}'",
                self.default_provider
            )));
        }

        Ok(())
    }

    /// Look up an enabled repository by name
    pub fn repository(&self, name: &str) -> Option<&RepositoryConfig> {
        self.repositories.iter().find(|r| r.name == name && r.enabled)
    }

    /// All enabled repositories, in declaration order
    pub fn enabled_repositories(&self) -> impl Iterator<Item = &RepositoryConfig> {
        self.repositories.iter().filter(|r| r.enabled)
    }
}

/// One repository the pipeline may rewrite files in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Name used to reference the repository in tasks
    pub name: String,

    /// Root directory of the repository
    pub path: PathBuf,

    /// Extensions to include, with leading dot (".rs", ".py")
    #[serde(default)]
    pub file_extensions: Vec<String>,

    /// Exclusion patterns: path segment, glob, or plain substring
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    /// Disabled repositories are invisible to task creation
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

/// Goal catalog: free-text defaults plus named custom goals
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoalsConfig {
    /// Goals applied to every repository by `batch`
    #[serde(default)]
    pub default_goals: Vec<String>,

    /// Named goals, mapping name to description
    #[serde(default)]
    pub custom_goals: BTreeMap<String, String>,
}

impl GoalsConfig {
    /// Resolve a goal string: custom-goal name first, free text otherwise
    pub fn resolve(&self, goal: &str) -> String {
        self.custom_goals.get(goal).cloned().unwrap_or_else(|| goal.to_string())
    }
}

/// Provider backend sections; absent sections are disabled
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidersConfig {
    pub claude: Option<ClaudeConfig>,
    pub openai: Option<OpenAiConfig>,
    pub ollama: Option<OllamaConfig>,
    pub huggingface: Option<HuggingFaceConfig>,
}

/// Anthropic messages API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaudeConfig {
    pub enabled: bool,
    pub api_key_env: String,
    pub model: String,
    pub max_tokens: usize,
    pub temperature: f32,
}

impl Default for ClaudeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            model: "claude-3-5-sonnet-20241022".to_string(),
            max_tokens: 4000,
            temperature: 0.3,
        }
    }
}

/// OpenAI-compatible chat completions API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    pub enabled: bool,
    pub api_key_env: String,
    /// Base URL, overridable for compatible services
    pub base_url: String,
    pub model: String,
    pub max_tokens: usize,
    pub temperature: f32,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key_env: "OPENAI_API_KEY".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: 4000,
            temperature: 0.3,
        }
    }
}

/// Local Ollama endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    pub model: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "http://localhost".to_string(),
            port: 11434,
            model: "codellama".to_string(),
        }
    }
}

/// Hugging Face hosted inference API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HuggingFaceConfig {
    pub enabled: bool,
    pub api_key_env: String,
    pub model: String,
}

impl Default for HuggingFaceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key_env: "HUGGINGFACE_API_KEY".to_string(),
            model: "bigcode/starcoder2-15b".to_string(),
        }
    }
}

/// Rewrite and backup behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileProcessingConfig {
    /// Flat directory receiving timestamped backup copies
    pub backup_directory: PathBuf,

    /// When false, diffs are logged but nothing is written (preview mode)
    pub auto_apply_changes: bool,

    /// When false, files are overwritten without a backup copy
    pub backup_original_files: bool,
}

impl Default for FileProcessingConfig {
    fn default() -> Self {
        Self {
            backup_directory: PathBuf::from("./backups"),
            auto_apply_changes: true,
            backup_original_files: true,
        }
    }
}

/// Example configuration TOML, written by `mend init`
pub const EXAMPLE_CONFIG: &str = r#"
# mend configuration

default_provider = "claude"

[[repositories]]
name = "my-project"
path = "/home/user/my-project"
file_extensions = [".rs", ".py"]
exclude_patterns = ["target", ".git", "*.lock"]
enabled = true

[goals]
default_goals = ["improve readability"]

[goals.custom_goals]
docs = "Add or improve documentation"
tests = "Add comprehensive unit tests"
security = "Fix potential security vulnerabilities"

[providers.claude]
enabled = true
api_key_env = "ANTHROPIC_API_KEY"
model = "claude-3-5-sonnet-20241022"
max_tokens = 4000
temperature = 0.3

[providers.ollama]
enabled = true
host = "http://localhost"
port = 11434
model = "codellama"

[file_processing]
backup_directory = "./backups"
auto_apply_changes = true
backup_original_files = true
"#;
