//! Rollcall CLI
//!
//! Creates, inspects, deletes and waits for the resources listed in a
//! definitions file.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use rollcall_common::definitions_from_yaml;
use rollcall_controller::config::ControllerConfig;
use rollcall_controller::{driver, logging, ClusterApi, K8sClient, MemoryCluster, ResourceDefinition};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file (defaults to ROLLCALL_CONFIG or the standard locations)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Namespace to operate in
    #[arg(short, long, global = true)]
    namespace: Option<String>,

    /// Run against an empty in-memory cluster instead of a real one
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create every resource in the file that does not exist yet
    Create {
        /// Multi-document YAML file of resource definitions
        file: PathBuf,
    },
    /// Print the readiness of every resource in the file
    Status {
        /// Multi-document YAML file of resource definitions
        file: PathBuf,
    },
    /// Delete every resource in the file, last one first
    Delete {
        /// Multi-document YAML file of resource definitions
        file: PathBuf,
    },
    /// Wait for every resource in the file to become ready, in file order
    Wait {
        /// Multi-document YAML file of resource definitions
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = ControllerConfig::load(cli.config.as_deref())?;
    if let Some(namespace) = cli.namespace {
        config.cluster.namespace = namespace;
        config.validate()?;
    }

    let _guard = logging::init(&config.logging).map_err(|e| anyhow!(e))?;

    match cli.command {
        Commands::Create { file } => {
            let definitions = read_definitions(&file)?;
            let cluster = connect(&config, cli.dry_run).await?;
            for key in driver::create_all(&definitions, cluster).await? {
                println!("{} present", key);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Status { file } => {
            let definitions = read_definitions(&file)?;
            let cluster = connect(&config, cli.dry_run).await?;
            let verdicts = driver::status_all(&definitions, cluster).await?;

            let mut all_ready = true;
            for (key, verdict) in &verdicts {
                println!("{}: {}", key, verdict);
                all_ready &= verdict.is_ready();
            }
            Ok(if all_ready {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Commands::Delete { file } => {
            let definitions = read_definitions(&file)?;
            let cluster = connect(&config, cli.dry_run).await?;
            for key in driver::delete_all(&definitions, cluster).await? {
                println!("{} deleted", key);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Wait { file } => {
            let definitions = read_definitions(&file)?;
            let cluster = connect(&config, cli.dry_run).await?;
            driver::wait_all(&definitions, cluster, &config.polling).await?;
            println!("{} resources ready", definitions.len());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn read_definitions(path: &Path) -> Result<Vec<ResourceDefinition>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let definitions = definitions_from_yaml(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    tracing::debug!("Read {} definitions from {}", definitions.len(), path.display());
    Ok(definitions)
}

async fn connect(config: &ControllerConfig, dry_run: bool) -> Result<Arc<dyn ClusterApi>> {
    let namespace = config.cluster.namespace.as_str();

    if dry_run {
        tracing::info!("Dry run: using an empty in-memory cluster");
        return Ok(Arc::new(MemoryCluster::new().with_namespace(namespace)));
    }

    let client = match (&config.cluster.kubeconfig, &config.cluster.context) {
        _ if config.cluster.in_cluster => K8sClient::from_incluster(Some(namespace))?,
        (Some(path), context) => {
            K8sClient::from_kubeconfig(path, context.as_deref(), Some(namespace)).await?
        }
        (None, Some(context)) => K8sClient::from_context(context, Some(namespace)).await?,
        (None, None) => K8sClient::infer(Some(namespace)).await?,
    };

    let version = client.server_version().await?;
    tracing::info!(
        "Connected to {} (Kubernetes {}, namespace {})",
        client.api_server(),
        version,
        client.namespace()
    );
    Ok(Arc::new(client))
}
