//! Engagement Copilot — email engagement metrics, fatigue alerts and the
//! weekly executive brief.
//!
//! Entry point for the dashboard, brief export, example-data and API commands.

mod commands;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use commands::{FormatArg, GenerateArgs, WindowArgs};
use copilot_api::ApiServer;
use copilot_core::config::AppConfig;
use copilot_metrics::synthetic::ensure_example_data;
use copilot_metrics::DataStore;
use std::path::PathBuf;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "engagement-copilot")]
#[command(about = "Email engagement metrics, fatigue alerts and executive briefs")]
#[command(version)]
struct Cli {
    /// Directory holding the daily and rolling CSV files (overrides config)
    #[arg(long, global = true, env = "ENGAGEMENT_COPILOT__DATA__DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the read-only JSON API
    Serve {
        /// Bind address (overrides config)
        #[arg(long, env = "ENGAGEMENT_COPILOT__API__HOST")]
        host: Option<String>,

        /// HTTP port (overrides config)
        #[arg(long, env = "ENGAGEMENT_COPILOT__API__HTTP_PORT")]
        port: Option<u16>,

        /// Do not generate example data when the CSV files are missing
        #[arg(long, default_value_t = false)]
        no_synthetic: bool,
    },
    /// Print the executive dashboard
    Dashboard(WindowArgs),
    /// Print the weekly brief as Markdown
    Brief(WindowArgs),
    /// Write the weekly brief to disk
    Export {
        #[command(flatten)]
        window: WindowArgs,

        #[arg(long, value_enum, default_value_t = FormatArg::All)]
        format: FormatArg,

        /// Output directory
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Generate synthetic example data
    Generate {
        /// Overwrite existing files
        #[arg(long, default_value_t = false)]
        force: bool,

        #[arg(long)]
        seed: Option<u64>,

        /// Number of days to generate
        #[arg(long)]
        days: Option<u32>,

        /// Last generated day (YYYY-MM-DD)
        #[arg(long)]
        anchor: Option<NaiveDate>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so rendered output on stdout stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "engagement_copilot=info,copilot_api=info,copilot_metrics=info,tower_http=info"
                    .into()
            }),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });
    if let Some(dir) = cli.data_dir {
        config.data.dir = dir;
    }

    match cli.command {
        Command::Serve {
            host,
            port,
            no_synthetic,
        } => {
            if let Some(host) = host {
                config.api.host = host;
            }
            if let Some(port) = port {
                config.api.http_port = port;
            }
            if !no_synthetic {
                let store = DataStore::new(config.data.dir.clone());
                ensure_example_data(&store, &commands::synthetic_spec(&config))?;
            }

            info!(
                data_dir = %config.data.dir.display(),
                http_port = config.api.http_port,
                window_days = config.brief.window_days,
                "Configuration loaded"
            );

            let api_server = ApiServer::new(config.clone());
            if let Err(e) = api_server.start_metrics() {
                error!(error = %e, "Failed to start metrics exporter");
            }
            api_server.start_http().await?;
        }
        Command::Dashboard(args) => print!("{}", commands::dashboard(&config, &args)?),
        Command::Brief(args) => print!("{}", commands::brief(&config, &args)?),
        Command::Export {
            window,
            format,
            out,
        } => {
            commands::export(&config, &window, format, &out)?;
        }
        Command::Generate {
            force,
            seed,
            days,
            anchor,
        } => {
            commands::generate(
                &config,
                GenerateArgs {
                    force,
                    seed,
                    days,
                    anchor,
                },
            )?;
        }
    }

    Ok(())
}
