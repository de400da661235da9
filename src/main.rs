use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use compat_config::AppConfig;
use compat_mcp::{McpServer, StdioTransport};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ts-eslint-compat")]
#[command(about = "Check TypeScript / @typescript-eslint compatibility", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ~/.ts-eslint-compat/config.yaml when present)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::SetTrue)]
    verbose: bool,

    /// Log output format (logs always go to stderr)
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the MCP resource and tool over stdio
    Serve,

    /// Print compatibility advice for installed versions
    Check {
        /// Installed TypeScript version, e.g. 5.9.2
        #[arg(short, long)]
        typescript: String,

        /// Installed @typescript-eslint version
        #[arg(short, long)]
        plugin: Option<String>,
    },

    /// Print the resource text for a TypeScript version
    Resource {
        /// TypeScript version, e.g. 5.9.2
        version: String,
    },

    /// List the TypeScript ranges and their support tiers
    Rules,

    /// Print the effective configuration as YAML
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.log_format)?;

    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve => serve(&config).await?,
        Commands::Check { typescript, plugin } => {
            let engine = config.engine()?;
            let recommendation = engine.recommend(&typescript, plugin.as_deref());
            println!("{}", recommendation.text());
        }
        Commands::Resource { version } => {
            let server = McpServer::new(&config)?;
            println!("{}", server.resource().text_for(&version));
        }
        Commands::Rules => list_rules(&config)?,
        Commands::Config => print!("{}", config.to_yaml()?),
    }

    Ok(())
}

async fn serve(config: &AppConfig) -> Result<()> {
    let server = McpServer::new(config)?;
    let mut transport = StdioTransport::stdio();

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    server.run_until(&mut transport, shutdown).await?;
    info!("MCP server stopped");
    Ok(())
}

fn list_rules(config: &AppConfig) -> Result<()> {
    let rules = config.rule_set()?;
    let policy = &config.policy;

    println!("{} ranges and {} support tiers:", policy.primary_name, policy.plugin_name);
    for rule in rules.rules() {
        println!("  {:<22} {}", rule.to_string(), rule.tier);
    }
    println!(
        "\nLegacy plugin line: v{}  Current plugin line: v{} (>= {})",
        policy.legacy_plugin_major, policy.current_plugin_major, policy.recommended_plugin_version
    );
    Ok(())
}

fn init_logging(verbose: bool, format: LogFormat) -> Result<()> {
    let filter = if verbose { "debug" } else { "info" };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));

    // stdout carries the MCP protocol, so logs go to stderr
    match format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()?,
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()?,
    }

    Ok(())
}
