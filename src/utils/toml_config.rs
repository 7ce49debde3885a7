//! TOML-based configuration for ragbot
//!
//! Every stage of the pipeline and the server read their settings from a
//! single `ragbot.toml`. All fields have defaults, so an empty file (or no
//! file at all) yields a working configuration.
//!
//! # Hot Reloading
//!
//! While serving, changes to the file are picked up automatically. Use
//! `ConfigManager` for thread-safe access to the current configuration.

use arc_swap::ArcSwap;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "ragbot.toml";

/// Environment variable overriding `ollama.base_url`
pub const OLLAMA_HOST_ENV: &str = "OLLAMA_HOST";

/// Root configuration structure loaded from ragbot.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RagbotConfig {
    pub server: ServerConfig,
    pub ollama: OllamaConfig,
    pub embeddings: EmbeddingsConfig,
    pub paths: PathsConfig,
    pub extraction: ExtractionConfig,
    pub merge: MergeConfig,
    pub chunking: ChunkingConfig,
    pub retrieval: RetrievalConfig,
    pub small_talk: SmallTalkConfig,
}

// ============= Server Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    /// Origins allowed by CORS
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            log_level: "info".to_string(),
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

// ============= Ollama Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub base_url: String,
    /// Generation model
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "mistral".to_string(),
            timeout_secs: 120,
        }
    }
}

// ============= Embeddings Configuration =============

/// Where embeddings are computed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// Ollama `/api/embed`
    #[default]
    Ollama,
    /// In-process ONNX models (requires the `local-embeddings` feature)
    FastEmbed,
}

impl std::fmt::Display for EmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbeddingProvider::Ollama => write!(f, "ollama"),
            EmbeddingProvider::FastEmbed => write!(f, "fastembed"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingsConfig {
    pub provider: EmbeddingProvider,
    pub model: String,
    /// Texts per embedding request
    pub batch_size: usize,
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::Ollama,
            model: "nomic-embed-text".to_string(),
            batch_size: 32,
        }
    }
}

// ============= Paths Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory scanned for `*.pdf`
    pub pdf_dir: PathBuf,
    /// Page records written by `extract`, updated by `merge`
    pub pages_json: PathBuf,
    /// Image captions consumed by `merge`
    pub captions: PathBuf,
    /// Vector index directory
    pub index_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            pdf_dir: PathBuf::from("ccac_docs"),
            pages_json: PathBuf::from("vs_text_table_data.json"),
            captions: PathBuf::from("diagram_summaries.txt"),
            index_dir: PathBuf::from("vectorstore"),
        }
    }
}

// ============= Extraction Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Lines starting with any of these are dropped
    pub skip_line_prefixes: Vec<String>,
    /// Lines whose trimmed form starts with any of these are dropped
    pub skip_trimmed_prefixes: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            skip_line_prefixes: vec![
                "CCAC O&G Methane Partnership".to_string(),
                "CLIMATE & CLEAN AIR COALITION".to_string(),
            ],
            skip_trimmed_prefixes: vec!["Modified:".to_string()],
        }
    }
}

// ============= Merge Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Captions whose summary contains any of these (case-insensitive) are
    /// treated as logos and skipped
    pub logo_keywords: Vec<String>,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            logo_keywords: [
                "climate and clean air coalition",
                "blue and white logo",
                "features a globe",
                "written in white text",
                "logo is designed",
                "commitment to reducing climate pollution",
                "logo features a globe",
                "blue circle in the center",
                "blue and white globe",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

// ============= Chunking Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters
    pub chunk_size: usize,
    /// Characters shared between neighbouring chunks
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 300,
            chunk_overlap: 50,
        }
    }
}

// ============= Retrieval Configuration =============

/// Default "stuff" prompt
pub const DEFAULT_PROMPT_TEMPLATE: &str = "Use the following pieces of context to answer the question at the end. If you don't know the answer, just say that you don't know, don't try to make up an answer.\n\n{context}\n\nQuestion: {question}\nHelpful Answer:";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Chunks fetched to decide whether the dataset covers the question
    pub relevance_k: usize,
    /// Chunks stuffed into the prompt
    pub context_k: usize,
    /// Drop hits scoring below this
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f32>,
    /// Must contain `{context}` and `{question}`
    pub prompt_template: String,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            relevance_k: 2,
            context_k: 4,
            min_score: None,
            prompt_template: DEFAULT_PROMPT_TEMPLATE.to_string(),
        }
    }
}

// ============= Small Talk Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmallTalkConfig {
    /// Normalized question -> canned reply
    pub responses: BTreeMap<String, String>,
}

impl Default for SmallTalkConfig {
    fn default() -> Self {
        let responses = [
            ("hi", "Hi there! How can I help you with the dataset?"),
            ("hello", "Hello! Ask me something from the dataset."),
            ("bye", "Goodbye! Have a great day."),
            ("thank you", "You're welcome!"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self { responses }
    }
}

// ============= Configuration Loading & Validation =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize TOML: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Watch error: {0}")]
    WatchError(#[from] notify::Error),
}

impl RagbotConfig {
    /// Load configuration from a TOML file and apply environment overrides
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let mut config = Self::from_toml(&content)?;
        config.apply_env_overrides(|name| std::env::var(name).ok());
        config.validate()?;

        Ok(config)
    }

    /// Load `path` if it exists, otherwise start from defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::FileNotFound(_)) => {
                let mut config = Self::default();
                config.apply_env_overrides(|name| std::env::var(name).ok());
                config.validate()?;
                Ok(config)
            }
            other => other,
        }
    }

    /// Parse without environment overrides or validation
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Apply overrides from the environment. `lookup` returns the value of a
    /// variable if set.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(OLLAMA_HOST_ENV).filter(|h| !h.trim().is_empty()) {
            let host = host.trim();
            self.ollama.base_url = if host.contains("://") {
                host.to_string()
            } else {
                format!("http://{}", host)
            };
        }
    }

    /// Validate the configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        let chunking = &self.chunking;
        if chunking.chunk_size == 0 {
            return Err(ConfigError::ValidationError(
                "chunking.chunk_size must be greater than 0".to_string(),
            ));
        }
        if chunking.chunk_overlap >= chunking.chunk_size {
            return Err(ConfigError::ValidationError(format!(
                "chunking.chunk_overlap ({}) must be smaller than chunking.chunk_size ({})",
                chunking.chunk_overlap, chunking.chunk_size
            )));
        }

        let retrieval = &self.retrieval;
        if retrieval.relevance_k == 0 || retrieval.context_k == 0 {
            return Err(ConfigError::ValidationError(
                "retrieval.relevance_k and retrieval.context_k must be greater than 0".to_string(),
            ));
        }
        for placeholder in ["{context}", "{question}"] {
            if !retrieval.prompt_template.contains(placeholder) {
                return Err(ConfigError::ValidationError(format!(
                    "retrieval.prompt_template must contain {}",
                    placeholder
                )));
            }
        }

        if self.embeddings.batch_size == 0 {
            return Err(ConfigError::ValidationError(
                "embeddings.batch_size must be greater than 0".to_string(),
            ));
        }
        if self.ollama.model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "ollama.model must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

// ============= Hot Reloading Configuration Manager =============

/// Thread-safe configuration manager with hot reloading support
pub struct ConfigManager {
    config: Arc<ArcSwap<RagbotConfig>>,
    config_path: Option<PathBuf>,
    watcher: RwLock<Option<RecommendedWatcher>>,
}

impl ConfigManager {
    /// Create a configuration manager and load the initial config.
    ///
    /// A missing file falls back to defaults; the manager still watches the
    /// path so the file can be created later.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        // Absolute path for reliable file watching
        let path = path.as_ref();
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(ConfigError::ReadError)?
                .join(path)
        };

        let config = RagbotConfig::load_or_default(&path)?;

        Ok(Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            config_path: Some(path),
            watcher: RwLock::new(None),
        })
    }

    /// Create a manager directly from a config, without a backing file
    pub fn from_config(config: RagbotConfig) -> Self {
        Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            config_path: None,
            watcher: RwLock::new(None),
        }
    }

    /// Get the current configuration (lockless read)
    pub fn config(&self) -> Arc<RagbotConfig> {
        self.config.load_full()
    }

    /// Path of the backing file, if any
    pub fn path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Replace the current configuration
    pub fn store(&self, config: RagbotConfig) {
        self.config.store(Arc::new(config));
    }

    /// Manually reload the configuration from disk
    pub fn reload(&self) -> Result<(), ConfigError> {
        let Some(path) = &self.config_path else {
            return Ok(());
        };
        info!("Reloading configuration from {:?}", path);

        let new_config = RagbotConfig::load(path)?;
        self.config.store(Arc::new(new_config));

        info!("Configuration reloaded successfully");
        Ok(())
    }

    /// Start watching for configuration file changes
    pub fn start_watching(&self) -> Result<(), ConfigError> {
        let Some(config_path) = self.config_path.clone() else {
            return Ok(());
        };

        let (tx, mut rx) = mpsc::unbounded_channel::<()>();
        let config_arc = Arc::clone(&self.config);
        let file_name = config_path.file_name().map(|n| n.to_os_string());

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                Ok(event) => {
                    let relevant = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                    if relevant && (event.kind.is_modify() || event.kind.is_create()) {
                        // Debounced in the receiver
                        let _ = tx.send(());
                    }
                }
                Err(e) => {
                    error!("Config watcher error: {:?}", e);
                }
            }
        })?;

        // Watch the parent directory so editors that replace the file are seen
        if let Some(parent) = config_path.parent() {
            watcher.watch(parent, RecursiveMode::NonRecursive)?;
        }

        *self.watcher.write() = Some(watcher);

        tokio::spawn(async move {
            let debounce = Duration::from_millis(500);
            let mut last_reload: Option<std::time::Instant> = None;

            while rx.recv().await.is_some() {
                if last_reload.is_some_and(|t| t.elapsed() < debounce) {
                    continue;
                }

                // Let the writer finish
                tokio::time::sleep(Duration::from_millis(100)).await;

                match RagbotConfig::load(&config_path) {
                    Ok(new_config) => {
                        config_arc.store(Arc::new(new_config));
                        info!("Configuration hot-reloaded successfully");
                        last_reload = Some(std::time::Instant::now());
                    }
                    Err(e) => {
                        warn!(
                            "Failed to hot-reload config: {}. Keeping previous config.",
                            e
                        );
                    }
                }
            }
        });

        info!("Configuration hot-reload watcher started");
        Ok(())
    }

    /// Stop watching for configuration changes
    pub fn stop_watching(&self) {
        *self.watcher.write() = None;
        info!("Configuration hot-reload watcher stopped");
    }
}

impl Clone for ConfigManager {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            config_path: self.config_path.clone(),
            watcher: RwLock::new(None), // Watcher is not cloned
        }
    }
}
