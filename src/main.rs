use anyhow::{Context, Result};
use clap::Parser; // for cli
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ideaforge::catalog::Subject;
use ideaforge::config::{AppConfig, CacheAction, Cli, Command, ReportArgs};
use ideaforge::handlers;
use ideaforge::report::{Runner, architecture, ideas};
use ideaforge::state::AppState;

// this is main async function with tokio
#[tokio::main]
async fn main() -> Result<()> {
    // .env may hold OPENAI_API_KEY
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // parse cli arguments
    let cli = Cli::parse();
    let config = cli.config;

    match cli.command {
        Command::Generate(args) => {
            run_catalog(&config, &args).await?;
            run_architecture(&config, &args.idea, &args.output).await?;
        }
        Command::Catalog(args) => run_catalog(&config, &args).await?,
        Command::Architecture { idea, output } => run_architecture(&config, &idea, &output).await?,
        Command::Cache { action } => run_cache(&config, action)?,
        Command::Serve { port } => serve(config, port).await?,
    }
    Ok(())
}

async fn run_catalog(config: &AppConfig, args: &ReportArgs) -> Result<()> {
    let cache = config.response_cache();
    let client = config.client()?;
    let runner = Runner::new(&cache, &client, config.system.clone());

    let subject = Subject::new(args.industry.clone(), args.idea.clone());
    let path = ideas::generate(&runner, &subject, &args.output, &args.stem).await?;
    println!("Business idea catalog written to {}", path.display());
    Ok(())
}

async fn run_architecture(config: &AppConfig, idea: &str, output: &std::path::Path) -> Result<()> {
    let cache = config.response_cache();
    let client = config.client()?;
    let runner = Runner::new(&cache, &client, config.system.clone());

    let path = architecture::generate(&runner, idea, output)
        .await
        .context("failed to generate multi-agent architecture")?;
    println!("Marp Markdown generated in {}", path.display());
    Ok(())
}

fn run_cache(config: &AppConfig, action: CacheAction) -> Result<()> {
    let store = config.store();
    let dir = store.root().display().to_string();
    match action {
        CacheAction::Stats => {
            let count = store
                .count()
                .with_context(|| format!("failed to read cache directory {}", dir))?;
            println!("{} cached responses in {}", count, dir);
        }
        CacheAction::Clear => {
            let removed = store
                .clear()
                .with_context(|| format!("failed to clear cache directory {}", dir))?;
            println!("Removed {} cached responses from {}", removed, dir);
        }
    }
    Ok(())
}

async fn serve(config: AppConfig, port: u16) -> Result<()> {
    // creating shared state
    let state = Arc::new(AppState {
        cache: config.response_cache(),
        completer: Arc::new(config.client()?),
        system: config.system.clone(),
    });

    let app = handlers::router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!(port, "gateway running on http://localhost:{}", port);
    info!(model = %config.model, api_base = %config.api_base, "forwarding misses");
    info!(cache_dir = %config.cache_dir.display(), "serving cached responses");
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
