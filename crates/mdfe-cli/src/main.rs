//! MDFe CLI - Command-line tool for the NFHub MDFe API
//!
//! Registers certificates and drives the MDFe lifecycle from the shell.

mod commands;
mod config;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mdfe_client::{ClientConfig, MdfeClient};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{Config, MergedConfig};
use crate::output::{OutputContext, OutputFormat};

#[derive(Parser)]
#[command(name = "mdfe-cli")]
#[command(author, version, about = "NFHub MDFe CLI")]
#[command(propagate_version = true)]
struct Cli {
    /// API URL
    #[arg(short, long, env = "NFHUB_SERVER")]
    server: Option<String>,

    /// Company CNPJ sent with every request
    #[arg(long, env = "NFHUB_CNPJ")]
    cnpj: Option<String>,

    /// Configuration file path
    #[arg(short, long, env = "NFHUB_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    output: Option<OutputFormat>,

    /// Extra request parameter (key=value), may be repeated
    #[arg(short, long = "param", value_name = "KEY=VALUE", global = true)]
    params: Vec<String>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Minimal output (for scripting)
    #[arg(short, long)]
    quiet: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a digital certificate
    RegisterCertificate {
        /// Certificate file (.pfx)
        #[arg(long)]
        file: PathBuf,

        /// Certificate password
        #[arg(long, env = "NFHUB_CERT_PASSWORD")]
        password: String,
    },

    /// Transmit a new MDFe
    Transmit {
        /// JSON document data (`-` for stdin)
        #[arg(long)]
        data: PathBuf,
    },

    /// Show an MDFe
    Query {
        /// MDFe id
        id: u64,
    },

    /// Download the DAMDFE (PDF)
    Print {
        /// MDFe id
        id: u64,

        /// Output file (stdout if omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Download the MDFe XML
    Xml {
        /// MDFe id
        id: u64,

        /// Output file (stdout if omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Close an MDFe
    Close {
        /// MDFe id
        id: u64,

        /// JSON closing data (`-` for stdin)
        #[arg(long)]
        data: PathBuf,
    },

    /// Close an MDFe issued outside the API
    CloseExternal {
        /// JSON closing data (`-` for stdin)
        #[arg(long)]
        data: PathBuf,
    },

    /// Cancel an MDFe
    Cancel {
        /// MDFe id
        id: u64,

        /// JSON cancellation data (`-` for stdin)
        #[arg(long)]
        data: PathBuf,
    },

    /// Add a conductor to an MDFe
    IncludeConductor {
        /// MDFe id
        id: u64,

        /// JSON conductor data (`-` for stdin)
        #[arg(long)]
        data: PathBuf,
    },

    /// Download the cancellation PDF
    PrintCancellation {
        /// MDFe id
        id: u64,

        /// Output file (stdout if omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Render a preview DAMDFE from document data
    PrePrint {
        /// JSON document data (`-` for stdin)
        #[arg(long)]
        data: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Discard an MDFe
    Discard {
        /// MDFe id
        id: u64,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    let no_color = cli.no_color;
    if let Err(err) = run(cli).await {
        let ctx = OutputContext::new(OutputFormat::default(), no_color, false);
        ctx.error(&format!("Error: {:#}", err));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Load config file
    let config = if let Some(config_path) = &cli.config {
        Config::load_from(config_path)?
    } else {
        Config::load().unwrap_or_default()
    };

    // Merge CLI args with config
    let merged = config.merge_with_args(
        cli.server.as_deref(),
        cli.cnpj.as_deref(),
        cli.output.map(|o| o.as_str()),
        cli.no_color,
    );

    let format = OutputFormat::parse(&merged.output).unwrap_or_default();
    let ctx = OutputContext::new(format, merged.no_color, cli.quiet);

    let cnpj = merged
        .cnpj
        .clone()
        .context("Company CNPJ required (--cnpj, NFHUB_CNPJ or config file)")?;
    let params = commands::parse_params(&cli.params)?;
    let client = create_client(&merged)?;

    // Execute command
    match &cli.command {
        Commands::RegisterCertificate { file, password } => {
            commands::register_certificate(&client, &cnpj, file, password, params, &ctx).await?;
        }

        Commands::Transmit { data } => {
            commands::transmit(&client, &cnpj, data, params, &ctx).await?;
        }

        Commands::Query { id } => {
            commands::query(&client, &cnpj, *id, params, &ctx).await?;
        }

        Commands::Print { id, out } => {
            commands::print_damdfe(&client, &cnpj, *id, out.as_deref(), params, &ctx).await?;
        }

        Commands::Xml { id, out } => {
            commands::fetch_xml(&client, &cnpj, *id, out.as_deref(), params, &ctx).await?;
        }

        Commands::Close { id, data } => {
            commands::close(&client, &cnpj, *id, data, params, &ctx).await?;
        }

        Commands::CloseExternal { data } => {
            commands::close_external(&client, &cnpj, data, params, &ctx).await?;
        }

        Commands::Cancel { id, data } => {
            commands::cancel(&client, &cnpj, *id, data, params, &ctx).await?;
        }

        Commands::IncludeConductor { id, data } => {
            commands::include_conductor(&client, &cnpj, *id, data, params, &ctx).await?;
        }

        Commands::PrintCancellation { id, out } => {
            commands::print_cancellation(&client, &cnpj, *id, out.as_deref(), params, &ctx)
                .await?;
        }

        Commands::PrePrint { data, out } => {
            commands::pre_print(&client, &cnpj, data, out.as_deref(), params, &ctx).await?;
        }

        Commands::Discard { id } => {
            commands::discard(&client, &cnpj, *id, params, &ctx).await?;
        }
    }

    Ok(())
}

/// Create an MDFe client for the resolved configuration
fn create_client(merged: &MergedConfig) -> Result<MdfeClient> {
    debug!("Using API at {}", merged.server);
    let mut config = ClientConfig::new(merged.server.clone())
        .user_agent(concat!("mdfe-cli/", env!("CARGO_PKG_VERSION")));
    if let Some(ms) = merged.timeout_ms {
        config = config.request_timeout_ms(ms);
    }

    MdfeClient::from_config(&config).context("Failed to create MDFe client")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_print_with_params() {
        let cli = Cli::try_parse_from([
            "mdfe-cli",
            "--cnpj",
            "12345678000190",
            "print",
            "42",
            "--out",
            "damdfe.pdf",
            "-p",
            "ambiente=2",
        ])
        .unwrap();

        assert_eq!(cli.cnpj.as_deref(), Some("12345678000190"));
        assert_eq!(cli.params, vec!["ambiente=2".to_string()]);
        match cli.command {
            Commands::Print { id, out } => {
                assert_eq!(id, 42);
                assert_eq!(out, Some(PathBuf::from("damdfe.pdf")));
            }
            _ => panic!("expected print command"),
        }
    }

    #[test]
    fn test_create_client() {
        let merged = Config::default().merge_with_args(None, None, None, false);
        assert!(create_client(&merged).is_ok());
    }
}
