//! Startup checks run by `ragbot check` and `ragbot start`.
//!
//! Every check runs even if an earlier one fails, so the operator sees all
//! problems at once.

use crate::llm::OllamaClient;
use crate::utils::toml_config::{EmbeddingProvider, RagbotConfig};
use ragbot_vector::{index_files_exist, INDEX_MANIFEST, VECTORS_FILE};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Timeout for the `/api/tags` check
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub message: String,
    /// Command that fixes a failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl CheckResult {
    fn pass(name: &str, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            message: message.into(),
            hint: None,
        }
    }

    fn fail(name: &str, message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            message: message.into(),
            hint: Some(hint.into()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PreflightReport {
    pub checks: Vec<CheckResult>,
}

impl PreflightReport {
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks.iter().filter(|c| !c.passed)
    }
}

/// Whether any installed model name contains `wanted`, ignoring case.
pub fn model_available(installed: &[String], wanted: &str) -> bool {
    let wanted = wanted.to_lowercase();
    installed.iter().any(|name| name.to_lowercase().contains(&wanted))
}

async fn check_model(name: &str, base_url: &str, model: &str) -> CheckResult {
    let client = match OllamaClient::new(base_url, model, PROBE_TIMEOUT) {
        Ok(client) => client,
        Err(e) => return CheckResult::fail(name, e.to_string(), "fix ollama.base_url in ragbot.toml"),
    };

    match client.list_models().await {
        Ok(installed) if model_available(&installed, model) => CheckResult::pass(
            name,
            format!("Ollama is running and {} is available", model),
        ),
        Ok(installed) => {
            debug!(?installed, wanted = model, "Model not installed");
            CheckResult::fail(
                name,
                format!("Ollama is running but {} was not found", model),
                format!("ollama pull {}", model),
            )
        }
        Err(e) => CheckResult::fail(
            name,
            format!("Cannot connect to Ollama at {}: {}", client.base_url(), e),
            "ollama serve",
        ),
    }
}

/// Ollama reachable and the generation model pulled.
pub async fn check_ollama(config: &RagbotConfig) -> CheckResult {
    check_model("ollama", &config.ollama.base_url, &config.ollama.model).await
}

/// Embedding model pulled. `None` when embeddings do not come from Ollama.
pub async fn check_embedding_model(config: &RagbotConfig) -> Option<CheckResult> {
    match config.embeddings.provider {
        EmbeddingProvider::Ollama => Some(
            check_model(
                "embedding model",
                &config.ollama.base_url,
                &config.embeddings.model,
            )
            .await,
        ),
        EmbeddingProvider::FastEmbed => None,
    }
}

/// Both index files present in `index_dir`.
pub fn check_index(index_dir: &Path) -> CheckResult {
    if index_files_exist(index_dir) {
        CheckResult::pass(
            "vector index",
            format!("Vector index found in {}", index_dir.display()),
        )
    } else {
        CheckResult::fail(
            "vector index",
            format!(
                "{} and {} not found in {}",
                INDEX_MANIFEST,
                VECTORS_FILE,
                index_dir.display()
            ),
            "ragbot build-index",
        )
    }
}

pub async fn run_preflight(config: &RagbotConfig) -> PreflightReport {
    let mut checks = vec![check_ollama(config).await];
    checks.extend(check_embedding_model(config).await);
    checks.push(check_index(&config.paths.index_dir));
    PreflightReport { checks }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_model_available_matches_tags() {
        let installed = vec!["Mistral:latest".to_string(), "nomic-embed-text:latest".to_string()];
        assert!(model_available(&installed, "mistral"));
        assert!(model_available(&installed, "nomic-embed-text"));
        assert!(!model_available(&installed, "llama3.2"));
    }

    #[test]
    fn test_check_index() {
        let dir = TempDir::new().unwrap();
        let missing = check_index(dir.path());
        assert!(!missing.passed);
        assert_eq!(missing.hint.as_deref(), Some("ragbot build-index"));

        std::fs::write(dir.path().join(INDEX_MANIFEST), "{}").unwrap();
        std::fs::write(dir.path().join(VECTORS_FILE), "[]").unwrap();
        assert!(check_index(dir.path()).passed);
    }

    #[tokio::test]
    async fn test_fastembed_skips_embedding_check() {
        let mut config = RagbotConfig::default();
        config.embeddings.provider = EmbeddingProvider::FastEmbed;
        assert!(check_embedding_model(&config).await.is_none());
    }

    #[test]
    fn test_report_passed() {
        let mut report = PreflightReport {
            checks: vec![CheckResult::pass("a", "ok")],
        };
        assert!(report.passed());
        report.checks.push(CheckResult::fail("b", "bad", "fix"));
        assert!(!report.passed());
        assert_eq!(report.failures().count(), 1);
    }
}
