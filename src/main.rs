use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use caseflow_store::SqliteStore;
use caseflow_workflow::{Workflow, validate};

/// Caseflow - service-request workflow authoring for an accounting practice
#[derive(Parser)]
#[command(name = "caseflow")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the data directory (default: ~/.caseflow)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Run the workflow API server
  Serve {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8640")]
    addr: SocketAddr,
  },

  /// Validate a workflow file offline and print its issues
  Validate {
    /// Path to the workflow file (JSON)
    workflow_file: PathBuf,
  },
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let cli = Cli::parse();

  let data_dir = cli.data_dir.unwrap_or_else(|| {
    dirs::home_dir()
      .expect("could not determine home directory")
      .join(".caseflow")
  });

  match cli.command {
    Some(Commands::Serve { addr }) => {
      run_serve(addr, data_dir)?;
    }
    Some(Commands::Validate { workflow_file }) => {
      run_validate(workflow_file)?;
    }
    None => {
      println!("caseflow - use --help to see available commands");
    }
  }

  Ok(())
}

fn run_serve(addr: SocketAddr, data_dir: PathBuf) -> Result<()> {
  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async { run_serve_async(addr, data_dir).await })
}

async fn run_serve_async(addr: SocketAddr, data_dir: PathBuf) -> Result<()> {
  tokio::fs::create_dir_all(&data_dir)
    .await
    .with_context(|| format!("failed to create data directory: {}", data_dir.display()))?;

  let db_path = data_dir.join("caseflow.db");
  let store = SqliteStore::connect(&db_path)
    .await
    .with_context(|| format!("failed to open database: {}", db_path.display()))?;
  store
    .migrate()
    .await
    .context("failed to run database migrations")?;

  let cancel = CancellationToken::new();
  let shutdown = cancel.clone();
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      shutdown.cancel();
    }
  });

  caseflow_server::serve(store, addr, cancel)
    .await
    .context("server error")?;

  Ok(())
}

fn run_validate(workflow_file: PathBuf) -> Result<()> {
  let content = std::fs::read_to_string(&workflow_file)
    .with_context(|| format!("failed to read workflow file: {}", workflow_file.display()))?;

  let workflow: Workflow = serde_json::from_str(&content)
    .with_context(|| format!("failed to parse workflow file: {}", workflow_file.display()))?;

  eprintln!(
    "Loaded workflow: {} ({} steps, {} transitions)",
    workflow.name,
    workflow.steps.len(),
    workflow.transitions.len()
  );

  let report = validate(&workflow.steps, &workflow.transitions);
  if report.is_valid() {
    println!("Valid");
    return Ok(());
  }

  for message in report.messages() {
    println!("- {}", message);
  }
  bail!("{} issue(s)", report.issues.len());
}
