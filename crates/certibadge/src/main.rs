use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::error;

use certibadge::{
    build_http_gateways, build_offline_gateways, build_resolver, export_log, run_issuance,
    Gateways, IssueRequest, IssuerConfig, RootError,
};
use certibadge_issuer::{AuditLedger, BadgeImage, EXPORT_FILENAME};

/// CertiBadge: mint verifiable course badges bound to on-chain identities.
#[derive(Parser, Debug)]
#[command(name = "certibadge", version, about, long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Issue a badge to a recipient
    Issue {
        /// Recipient wallet address or name (e.g. alice.eth)
        #[arg(long)]
        recipient: String,

        /// Course identifier
        #[arg(long)]
        course_id: String,

        /// Issuer name
        #[arg(long)]
        issued_by: String,

        /// Issue date, YYYY-MM-DD
        #[arg(long)]
        issued_date: String,

        /// Path to the badge image
        #[arg(long)]
        image: Option<PathBuf>,

        /// Skip packaging and use this metadata URI directly
        #[arg(long)]
        metadata_uri: Option<String>,

        /// Write the issuance log CSV, optionally to a custom path
        #[arg(long, num_args = 0..=1, default_missing_value = EXPORT_FILENAME)]
        log: Option<PathBuf>,

        /// Do not wait for on-chain confirmation
        #[arg(long)]
        no_wait: bool,

        /// Use deterministic in-memory gateways instead of live services
        #[arg(long)]
        offline: bool,
    },

    /// Resolve a recipient name to its canonical address
    Resolve {
        /// Name to resolve (e.g. alice.eth)
        name: String,

        /// Use the deterministic in-memory resolver
        #[arg(long)]
        offline: bool,
    },

    /// Write the default configuration file
    InitConfig,
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("certibadge=debug,certibadge_issuer=debug,certibadge_rpc=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("certibadge=info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<IssuerConfig, RootError> {
    match path {
        Some(p) => IssuerConfig::load(p),
        None => IssuerConfig::load(&IssuerConfig::default_config_path()),
    }
}

fn build_gateways(config: &IssuerConfig, offline: bool) -> Result<Gateways, RootError> {
    if offline {
        Ok(build_offline_gateways())
    } else {
        build_http_gateways(config)
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), RootError> {
    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Issue {
            recipient,
            course_id,
            issued_by,
            issued_date,
            image,
            metadata_uri,
            log,
            no_wait,
            offline,
        } => {
            cmd_issue(
                &config,
                recipient,
                course_id,
                issued_by,
                issued_date,
                image,
                metadata_uri,
                log,
                no_wait,
                offline,
            )
            .await
        }
        Commands::Resolve { name, offline } => cmd_resolve(&config, &name, offline).await,
        Commands::InitConfig => cmd_init_config(cli.config.as_ref(), &config),
    }
}

#[allow(clippy::too_many_arguments)]
async fn cmd_issue(
    config: &IssuerConfig,
    recipient: String,
    course_id: String,
    issued_by: String,
    issued_date: String,
    image: Option<PathBuf>,
    metadata_uri: Option<String>,
    log: Option<PathBuf>,
    no_wait: bool,
    offline: bool,
) -> Result<(), RootError> {
    let gateways = build_gateways(config, offline)?;
    let ledger = Arc::new(AuditLedger::new());

    let image = match image {
        Some(path) => {
            let bytes = std::fs::read(&path)?;
            let filename = path
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| {
                    RootError::Config(format!("image path has no filename: {}", path.display()))
                })?
                .to_string();
            Some(BadgeImage::new(bytes, filename))
        }
        None => None,
    };

    let outcome = run_issuance(
        &gateways,
        &ledger,
        config,
        IssueRequest {
            recipient,
            course_id,
            issued_by,
            issued_date,
            image,
            metadata_uri,
            wait_for_confirmation: !no_wait,
        },
    )
    .await?;

    println!("Badge issued.");
    println!("  Recipient:    {}", outcome.recipient);
    println!("  Metadata URI: {}", outcome.metadata_uri);
    println!("  Transaction:  {}", outcome.tx_hash);
    println!("  Confirmation: {}", outcome.confirmation);

    if let Some(path) = log {
        let written = export_log(&ledger, &path)?;
        println!("  Log:          {}", written.display());
    }

    Ok(())
}

async fn cmd_resolve(config: &IssuerConfig, name: &str, offline: bool) -> Result<(), RootError> {
    let resolver = build_resolver(config, offline)?;
    match resolver.resolve(name).await? {
        Some(address) => println!("{} -> {}", name, address),
        None => println!("{} is not registered", name),
    }
    Ok(())
}

fn cmd_init_config(path: Option<&PathBuf>, config: &IssuerConfig) -> Result<(), RootError> {
    let save_path = path
        .cloned()
        .unwrap_or_else(IssuerConfig::default_config_path);
    config.save(&save_path)?;
    println!("Configuration written to {}", save_path.display());
    Ok(())
}
