//! `ragbot init`: write a starter `ragbot.toml` and friends.

use super::output::Output;
use crate::utils::toml_config::{RagbotConfig, DEFAULT_CONFIG_FILE, OLLAMA_HOST_ENV};
use std::fs;
use std::path::{Path, PathBuf};

/// Result of the init operation
#[derive(Debug, PartialEq, Eq)]
pub enum InitResult {
    Success,
    /// `ragbot.toml` exists and `--force` was not given
    AlreadyExists,
    Error(String),
}

/// Options for the init command
pub struct InitConfig {
    pub path: PathBuf,
    pub force: bool,
    pub model: String,
    pub embedding_model: String,
    pub host: String,
    pub port: u16,
}

pub fn run(config: InitConfig, output: &Output) -> InitResult {
    output.banner();
    output.header("Initializing ragbot project");

    let base_path = &config.path;
    let config_path = base_path.join(DEFAULT_CONFIG_FILE);
    if config_path.exists() && !config.force {
        output.warning(&format!("{} already exists!", DEFAULT_CONFIG_FILE));
        output.hint("Use --force to overwrite existing files");
        return InitResult::AlreadyExists;
    }

    if let Err(e) = fs::create_dir_all(base_path) {
        output.error(&format!("Failed to create {}: {}", base_path.display(), e));
        return InitResult::Error(e.to_string());
    }

    let ragbot_config = starter_config(&config);
    let toml_content = match generate_ragbot_toml(&ragbot_config) {
        Ok(content) => content,
        Err(e) => {
            output.error(&format!("Failed to render configuration: {}", e));
            return InitResult::Error(e);
        }
    };
    if let Err(e) = fs::write(&config_path, toml_content) {
        output.error(&format!("Failed to create {}: {}", DEFAULT_CONFIG_FILE, e));
        return InitResult::Error(e.to_string());
    }
    output.created("config", DEFAULT_CONFIG_FILE);

    let pdf_dir = base_path.join(&ragbot_config.paths.pdf_dir);
    if pdf_dir.exists() {
        output.skipped(&ragbot_config.paths.pdf_dir.display().to_string(), "already exists");
    } else if let Err(e) = fs::create_dir_all(&pdf_dir) {
        output.warning(&format!("Failed to create {}: {}", pdf_dir.display(), e));
    } else {
        output.created("directory", &ragbot_config.paths.pdf_dir.display().to_string());
    }

    for (name, content) in [
        (".env.example", generate_env_example()),
        (".gitignore", generate_gitignore(&ragbot_config)),
    ] {
        let path = base_path.join(name);
        match write_file(&path, &content, config.force) {
            Ok(true) => output.created("file", name),
            Ok(false) => output.skipped(name, "already exists"),
            Err(e) => output.warning(&format!("Failed to create {}: {}", name, e)),
        }
    }

    output.complete("ragbot project initialized");

    output.header("Next Steps");
    output.info(&format!(
        "1. Put your PDFs in {}/",
        ragbot_config.paths.pdf_dir.display()
    ));
    output.info("2. Pull the models:");
    output.command(&format!("ollama pull {}", config.model));
    output.command(&format!("ollama pull {}", config.embedding_model));
    output.info("3. Build the index and start the server:");
    output.command("ragbot extract && ragbot merge && ragbot build-index");
    output.command("ragbot start");

    output.hint(&format!(
        "Server will be available at http://{}:{}",
        config.host, config.port
    ));

    InitResult::Success
}

/// Returns whether the file was written.
fn write_file(path: &Path, content: &str, force: bool) -> std::io::Result<bool> {
    if path.exists() && !force {
        return Ok(false);
    }
    fs::write(path, content)?;
    Ok(true)
}

fn starter_config(init: &InitConfig) -> RagbotConfig {
    let mut config = RagbotConfig::default();
    config.server.host = init.host.clone();
    config.server.port = init.port;
    config.ollama.model = init.model.clone();
    config.embeddings.model = init.embedding_model.clone();
    config
}

fn generate_ragbot_toml(config: &RagbotConfig) -> Result<String, String> {
    let body = config.to_toml().map_err(|e| e.to_string())?;
    Ok(format!(
        "# ragbot configuration\n\
         #\n\
         # Every field is optional; missing ones take the values shown here.\n\
         # {} overrides [ollama].base_url. Changes are picked up while serving.\n\n{}",
        OLLAMA_HOST_ENV, body
    ))
}

fn generate_env_example() -> String {
    format!(
        "# Ollama server (overrides [ollama].base_url)\n\
         {}=http://localhost:11434\n\n\
         # Log filter (overrides [server].log_level)\n\
         RUST_LOG=info\n",
        OLLAMA_HOST_ENV
    )
}

fn generate_gitignore(config: &RagbotConfig) -> String {
    format!(
        "/target\n.env\n/{}/\n",
        config.paths.index_dir.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn init_config(path: &Path, force: bool) -> InitConfig {
        InitConfig {
            path: path.to_path_buf(),
            force,
            model: "llama3.2".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            host: "127.0.0.1".to_string(),
            port: 9000,
        }
    }

    #[test]
    fn test_init_writes_loadable_config() {
        let dir = TempDir::new().unwrap();
        let result = run(init_config(dir.path(), false), &Output::no_color());
        assert_eq!(result, InitResult::Success);

        let loaded = RagbotConfig::load(dir.path().join(DEFAULT_CONFIG_FILE)).unwrap();
        assert_eq!(loaded.ollama.model, "llama3.2");
        assert_eq!(loaded.server.port, 9000);
        assert!(dir.path().join(".env.example").exists());
        assert!(dir.path().join(".gitignore").exists());
        assert!(dir.path().join("ccac_docs").is_dir());
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "# mine\n").unwrap();

        let result = run(init_config(dir.path(), false), &Output::no_color());
        assert_eq!(result, InitResult::AlreadyExists);
        assert_eq!(
            fs::read_to_string(dir.path().join(DEFAULT_CONFIG_FILE)).unwrap(),
            "# mine\n"
        );

        let result = run(init_config(dir.path(), true), &Output::no_color());
        assert_eq!(result, InitResult::Success);
    }
}
