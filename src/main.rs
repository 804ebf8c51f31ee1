use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use vaultwire::auth_file::parse_auth_file;
use vaultwire::{factory, DeployConfig, Deployment, ProviderType, ServicePrincipalCredential};

/// Provision a database, a vault and a web app, wire them together, deploy
/// and tear down.
#[derive(Parser, Debug)]
#[command(name = "vaultwire", version, about)]
struct Cli {
    /// Service-principal auth file (JSON or key=value lines).
    #[arg(long, env = "AZURE_AUTH_LOCATION")]
    auth_file: PathBuf,

    /// Provider to deploy with.
    #[arg(long, default_value = "memory")]
    provider: ProviderType,

    /// Region for every resource.
    #[arg(long, default_value = "eastus")]
    region: String,

    /// Prefix for generated resource names.
    #[arg(long, default_value = "vwdemo")]
    prefix: String,

    /// Use this resource group name instead of a generated one.
    #[arg(long)]
    resource_group: Option<String>,

    /// Git repository of the sample application.
    #[arg(long)]
    repository: Option<String>,

    /// Branch to deploy.
    #[arg(long, default_value = "master")]
    branch: String,

    /// Database name stored in the vault.
    #[arg(long, default_value = "tododb")]
    database: String,

    /// Seconds to wait after deployment before tearing down.
    #[arg(long, default_value_t = 30)]
    settle_secs: u64,

    /// Leave the resources in place.
    #[arg(long)]
    keep: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber from RUST_LOG or default to info.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let map = parse_auth_file(&cli.auth_file)?;
    let credential = ServicePrincipalCredential::from_map(&map);
    credential.validate()?;
    info!(
        path = %cli.auth_file.display(),
        client_id = %credential.client_id(),
        "loaded credentials"
    );

    let mut config = DeployConfig::new(cli.provider)
        .with_region(cli.region)
        .with_prefix(cli.prefix)
        .with_settle_delay(Duration::from_secs(cli.settle_secs))
        .with_keep_resources(cli.keep)
        .with_option("database", cli.database);
    if let Some(group) = cli.resource_group {
        config = config.with_resource_group(group);
    }
    if let Some(repository) = cli.repository {
        config = config.with_repository(repository, cli.branch);
    } else {
        config.branch = cli.branch;
    }

    let provider = factory::new_provider(config.clone())?;
    let report = Deployment::new(provider, config, credential).run().await?;

    println!("{}", report.to_json_pretty()?);
    Ok(())
}
