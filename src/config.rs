//! Configuration module for the local discovery assistant.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file
//! - Environment variable overrides
//! - CLI argument overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `NB_` and use double underscores
//! to separate nested levels:
//! - `NB_DATA_DIR=/srv/nearby/data` sets `data_dir`
//! - `NB_SEMANTIC_SEARCH__TOP_K=5` sets `semantic_search.top_k`
//! - `NB_ASSISTANT__MODE=filter` sets `assistant.mode`
//!
//! The retrieval core never reads configuration itself; callers resolve
//! paths through [`Settings::layout`] and pass them in.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::types::Category;

/// Name of the per-project configuration directory.
pub const CONFIG_DIR: &str = ".nearby";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Directory holding corpus and index files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Workspace root directory (where .nearby is located)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_root: Option<PathBuf>,

    /// Global debug mode
    #[serde(default = "default_false")]
    pub debug: bool,

    /// Corpus file names per category
    #[serde(default)]
    pub corpus: CorpusConfig,

    /// Embedding index location and file names per category
    #[serde(default)]
    pub index: IndexConfig,

    /// Semantic search settings
    #[serde(default)]
    pub semantic_search: SemanticSearchConfig,

    /// Structured filter settings
    #[serde(default)]
    pub filter: FilterConfig,

    /// Conversational layer settings
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct CorpusConfig {
    #[serde(default = "default_restaurants_corpus")]
    pub restaurants: String,

    #[serde(default = "default_dentists_corpus")]
    pub dentists: String,

    #[serde(default = "default_events_corpus")]
    pub events: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct IndexConfig {
    /// Directory for index files (defaults to `data_dir`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    #[serde(default = "default_restaurants_index")]
    pub restaurants: String,

    #[serde(default = "default_dentists_index")]
    pub dentists: String,

    #[serde(default = "default_events_index")]
    pub events: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SemanticSearchConfig {
    /// Model to use for embeddings (index build and queries)
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Number of records returned by semantic search
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Where downloaded models are cached
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,

    /// Show a progress bar while the model downloads
    #[serde(default = "default_true")]
    pub show_download_progress: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FilterConfig {
    /// Maximum records returned by filter-and-rank
    #[serde(default = "default_filter_limit")]
    pub limit: usize,
}

/// Which retrieval strategy the assistant uses for a turn.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalMode {
    /// Embedding similarity; unclassified queries use the restaurant index
    #[default]
    Semantic,
    /// Exact filters and rating sort; unclassified queries find nothing
    Filter,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AssistantConfig {
    #[serde(default)]
    pub mode: RetrievalMode,

    /// First message of every conversation
    #[serde(default = "default_greeting")]
    pub greeting: String,

    /// Locations the keyword intent extractor recognises
    #[serde(default = "default_known_locations")]
    pub known_locations: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default log level when neither flags nor RUST_LOG say otherwise
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions
fn default_version() -> u32 {
    1
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}
fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}
fn default_restaurants_corpus() -> String {
    "restaurants.json".to_string()
}
fn default_dentists_corpus() -> String {
    "dentists.json".to_string()
}
fn default_events_corpus() -> String {
    "events.json".to_string()
}
fn default_restaurants_index() -> String {
    "restaurants_embeddings.idx".to_string()
}
fn default_dentists_index() -> String {
    "dentists_embeddings.idx".to_string()
}
fn default_events_index() -> String {
    "events_embeddings.idx".to_string()
}
fn default_embedding_model() -> String {
    crate::vector::DEFAULT_MODEL_NAME.to_string()
}
fn default_top_k() -> usize {
    3
}
fn default_filter_limit() -> usize {
    crate::filter::DEFAULT_LIMIT
}
fn default_greeting() -> String {
    "Hi! How can I help you discover something nearby today?".to_string()
}
fn default_known_locations() -> Vec<String> {
    [
        "mg road",
        "indiranagar",
        "residency road",
        "brigade road",
        "bengaluru",
        "jaipur",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            data_dir: default_data_dir(),
            workspace_root: None,
            debug: false,
            corpus: CorpusConfig::default(),
            index: IndexConfig::default(),
            semantic_search: SemanticSearchConfig::default(),
            filter: FilterConfig::default(),
            assistant: AssistantConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            restaurants: default_restaurants_corpus(),
            dentists: default_dentists_corpus(),
            events: default_events_corpus(),
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            dir: None,
            restaurants: default_restaurants_index(),
            dentists: default_dentists_index(),
            events: default_events_index(),
        }
    }
}

impl Default for SemanticSearchConfig {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            top_k: default_top_k(),
            cache_dir: None,
            show_download_progress: true,
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            limit: default_filter_limit(),
        }
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            mode: RetrievalMode::default(),
            greeting: default_greeting(),
            known_locations: default_known_locations(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Resolved on-disk locations of every corpus and index file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    data_dir: PathBuf,
    index_dir: PathBuf,
    corpus: CorpusConfig,
    index: IndexConfig,
}

impl DataLayout {
    /// Layout with default file names under a single directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            index_dir: data_dir.clone(),
            data_dir,
            corpus: CorpusConfig::default(),
            index: IndexConfig::default(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn index_dir(&self) -> &Path {
        &self.index_dir
    }

    pub fn corpus_path(&self, category: Category) -> PathBuf {
        let file = match category {
            Category::Restaurant => &self.corpus.restaurants,
            Category::Dentist => &self.corpus.dentists,
            Category::Event => &self.corpus.events,
        };
        self.data_dir.join(file)
    }

    pub fn index_path(&self, category: Category) -> PathBuf {
        let file = match category {
            Category::Restaurant => &self.index.restaurants,
            Category::Dentist => &self.index.dentists,
            Category::Event => &self.index.events,
        };
        self.index_dir.join(file)
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        // Try to find the workspace root by looking for .nearby directory
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join("settings.toml"));

        Self::figment(config_path)
            .extract()
            .map_err(Box::new)
            .map(|mut settings: Settings| {
                if settings.workspace_root.is_none() {
                    settings.workspace_root = Self::workspace_root();
                }
                settings
            })
    }

    /// Load configuration from a specific file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Self::figment(path.as_ref().to_path_buf())
            .extract()
            .map_err(Box::new)
    }

    fn figment(config_path: PathBuf) -> Figment {
        Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Settings::default()))
            // Layer in config file if it exists
            .merge(Toml::file(config_path))
            // Double underscore (__) separates nested levels
            .merge(Env::prefixed("NB_").map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
    }

    /// Find the workspace config by looking for .nearby directory
    /// Searches from current directory up to root
    fn find_workspace_config() -> Option<PathBuf> {
        Self::workspace_root().map(|root| root.join(CONFIG_DIR).join("settings.toml"))
    }

    /// Get the workspace root directory (where .nearby is located)
    pub fn workspace_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        current
            .ancestors()
            .find(|ancestor| ancestor.join(CONFIG_DIR).is_dir())
            .map(Path::to_path_buf)
    }

    /// Resolve a possibly-relative path against the workspace root.
    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.workspace_root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// On-disk locations of corpus and index files.
    pub fn layout(&self) -> DataLayout {
        let data_dir = self.resolve(&self.data_dir);
        let index_dir = self
            .index
            .dir
            .as_deref()
            .map(|dir| self.resolve(dir))
            .unwrap_or_else(|| data_dir.clone());

        DataLayout {
            data_dir,
            index_dir,
            corpus: self.corpus.clone(),
            index: self.index.clone(),
        }
    }

    /// Directory where embedding models are cached.
    pub fn models_dir(&self) -> PathBuf {
        if let Some(dir) = &self.semantic_search.cache_dir {
            return self.resolve(dir);
        }
        dirs::cache_dir()
            .map(|dir| dir.join("nearby").join("models"))
            .unwrap_or_else(|| self.resolve(&PathBuf::from(CONFIG_DIR).join("models")))
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let parent = path.as_ref().parent().ok_or("Invalid path")?;
        std::fs::create_dir_all(parent)?;

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Create a default settings file with helpful comments
    pub fn init_config_file(force: bool) -> Result<PathBuf, Box<dyn std::error::Error>> {
        Self::init_config_file_in(Path::new("."), force)
    }

    /// Create the default settings file under `root/.nearby/`.
    pub fn init_config_file_in(
        root: &Path,
        force: bool,
    ) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_path = root.join(CONFIG_DIR).join("settings.toml");

        if !force && config_path.exists() {
            return Err("Configuration file already exists. Use --force to overwrite".into());
        }

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let template = r#"# nearby configuration file

# Version of the configuration schema
version = 1

# Directory holding corpus (*.json) and embedding index (*.idx) files,
# relative to the workspace root
data_dir = "data"

# Global debug mode
debug = false

[corpus]
restaurants = "restaurants.json"
dentists = "dentists.json"
events = "events.json"

[index]
# Directory for index files (defaults to data_dir)
# dir = "data/index"
restaurants = "restaurants_embeddings.idx"
dentists = "dentists_embeddings.idx"
events = "events_embeddings.idx"

[semantic_search]
# Embedding model; indexes must be rebuilt after changing it
model = "AllMiniLML6V2"

# Number of records returned by semantic search
top_k = 3

# Model cache directory (defaults to the user cache directory)
# cache_dir = ".nearby/models"

show_download_progress = true

[filter]
# Maximum records returned by filter-and-rank
limit = 3

[assistant]
# Retrieval strategy: "semantic" or "filter"
# semantic: unclassified queries search the restaurant index
# filter: unclassified queries return nothing
mode = "semantic"

greeting = "Hi! How can I help you discover something nearby today?"

# Locations recognised by the keyword intent extractor
known_locations = ["mg road", "indiranagar", "residency road", "brigade road", "bengaluru", "jaipur"]

[logging]
# error, warn, info, debug or trace (RUST_LOG and -v/-q take precedence)
level = "warn"
"#;

        std::fs::write(&config_path, template)?;
        Ok(config_path)
    }
}
