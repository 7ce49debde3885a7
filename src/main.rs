use anyhow::Context;
use ragbot::{
    api::create_router,
    cli::{
        init::{self, InitConfig, InitResult},
        output::Output,
        Cli, Commands,
    },
    extraction::{self, HeaderFilter},
    merge,
    preflight::{self, PreflightReport},
    rag::{build_index, create_embedder, TextChunker},
    AppState, ConfigManager,
};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    match run(cli, &output).await {
        Ok(code) => code,
        Err(e) => {
            output.error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(log_level: &str, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli, output: &Output) -> anyhow::Result<ExitCode> {
    let Cli {
        config: config_path,
        verbose,
        command,
        ..
    } = cli;

    if let Commands::Init {
        path,
        force,
        model,
        embedding_model,
        host,
        port,
    } = command
    {
        let result = init::run(
            InitConfig {
                path,
                force,
                model,
                embedding_model,
                host,
                port,
            },
            output,
        );
        return Ok(match result {
            InitResult::Success => ExitCode::SUCCESS,
            InitResult::AlreadyExists | InitResult::Error(_) => ExitCode::FAILURE,
        });
    }

    let config_manager = Arc::new(
        ConfigManager::new(&config_path)
            .with_context(|| format!("Failed to load {}", config_path.display()))?,
    );
    init_tracing(&config_manager.config().server.log_level, verbose);

    match command {
        Commands::Init { .. } => Ok(ExitCode::SUCCESS),
        Commands::Extract { pdf_dir, output: out } => {
            let config = config_manager.config();
            let pdf_dir = pdf_dir.unwrap_or_else(|| config.paths.pdf_dir.clone());
            let out = out.unwrap_or_else(|| config.paths.pages_json.clone());

            output.step(1, 2, &format!("Extracting PDFs in {}", pdf_dir.display()));
            let filter = HeaderFilter::from_config(&config.extraction);
            let pages = extraction::extract_directory_blocking(pdf_dir, filter).await?;

            output.step(2, 2, &format!("Writing {}", out.display()));
            extraction::write_pages(&out, &pages).await?;
            output.success(&format!("Extracted {} pages", pages.len()));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Merge { pages, captions } => {
            let config = config_manager.config();
            let pages_path = pages.unwrap_or_else(|| config.paths.pages_json.clone());
            let captions_path = captions.unwrap_or_else(|| config.paths.captions.clone());

            let mut pages = extraction::read_pages(&pages_path).await?;
            let catalog = merge::read_captions(&captions_path).await?;
            output.info(&format!(
                "{} pages, {} captions",
                pages.len(),
                catalog.len()
            ));

            let report = merge::merge_captions(&mut pages, &catalog, &config.merge.logo_keywords);
            extraction::write_pages(&pages_path, &pages).await?;

            output.success(&format!(
                "Added {} image summaries to {}",
                report.added,
                pages_path.display()
            ));
            output.kv("skipped logos", &report.skipped_logos.to_string());
            output.kv("empty summaries", &report.empty_summaries.to_string());
            output.kv("duplicates", &report.duplicates.to_string());
            output.kv("pages without captions", &report.pages_without_match.to_string());
            Ok(ExitCode::SUCCESS)
        }
        Commands::BuildIndex { pages, index_dir } => {
            let config = config_manager.config();
            let pages_path = pages.unwrap_or_else(|| config.paths.pages_json.clone());
            let index_dir = index_dir.unwrap_or_else(|| config.paths.index_dir.clone());

            output.step(1, 3, &format!("Loading {}", pages_path.display()));
            let pages = extraction::read_pages(&pages_path).await?;

            output.step(
                2,
                3,
                &format!("Embedding with {} ({})", config.embeddings.model, config.embeddings.provider),
            );
            let chunker =
                TextChunker::new(config.chunking.chunk_size, config.chunking.chunk_overlap)?;
            let embedder = create_embedder(&config.embeddings, &config.ollama)?;
            let store = build_index(
                &pages,
                &chunker,
                embedder.as_ref(),
                config.embeddings.batch_size,
            )
            .await?;

            output.step(3, 3, &format!("Saving to {}", index_dir.display()));
            let manifest = store.save(&index_dir).await?;
            output.success(&format!(
                "Indexed {} chunks ({} dimensions)",
                manifest.count, manifest.dimensions
            ));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Serve { host, port } => {
            serve(config_manager, host, port, output).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check => {
            let report = check(&config_manager, output).await;
            Ok(if report.passed() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Commands::Start { host, port } => {
            let report = check(&config_manager, output).await;
            if !report.passed() {
                return Ok(ExitCode::FAILURE);
            }
            serve(config_manager, host, port, output).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Config { full, validate } => {
            show_config(&config_manager, full, validate, output)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn check(config_manager: &ConfigManager, output: &Output) -> PreflightReport {
    output.header("Preflight");
    let report = preflight::run_preflight(&config_manager.config()).await;
    for check in &report.checks {
        output.check(check);
    }
    if report.passed() {
        output.complete("All checks passed");
    }
    report
}

async fn serve(
    config_manager: Arc<ConfigManager>,
    host: Option<String>,
    port: Option<u16>,
    output: &Output,
) -> anyhow::Result<()> {
    let config = config_manager.config();
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    let state = AppState::load(Arc::clone(&config_manager))
        .await
        .context("Failed to load the vector index")?;

    if let Err(e) = config_manager.start_watching() {
        warn!("Config hot reload disabled: {}", e);
    }

    let app = create_router(state);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    output.banner();
    output.kv("listening", &format!("http://{}", addr));
    output.kv("model", &config.ollama.model);
    output.kv("embeddings", &config.embeddings.model);
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    config_manager.stop_watching();
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

fn show_config(
    config_manager: &ConfigManager,
    full: bool,
    validate: bool,
    output: &Output,
) -> anyhow::Result<()> {
    let config = config_manager.config();
    let source = config_manager
        .path()
        .filter(|p| p.exists())
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "built-in defaults".to_string());

    if validate {
        config.validate()?;
        output.success(&format!("Configuration is valid ({})", source));
        return Ok(());
    }

    if full {
        println!("{}", config.to_toml()?);
        return Ok(());
    }

    output.header("Configuration");
    output.kv("source", &source);
    output.kv("server", &format!("{}:{}", config.server.host, config.server.port));
    output.kv("ollama", &config.ollama.base_url);
    output.kv("model", &config.ollama.model);
    output.kv(
        "embeddings",
        &format!("{} ({})", config.embeddings.model, config.embeddings.provider),
    );
    output.kv(
        "chunking",
        &format!(
            "{} chars, {} overlap",
            config.chunking.chunk_size, config.chunking.chunk_overlap
        ),
    );
    output.kv("pdf_dir", &display(&config.paths.pdf_dir));
    output.kv("pages_json", &display(&config.paths.pages_json));
    output.kv("captions", &display(&config.paths.captions));
    output.kv("index_dir", &display(&config.paths.index_dir));
    Ok(())
}

fn display(path: &Path) -> String {
    path.display().to_string()
}
