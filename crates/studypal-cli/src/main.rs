mod config;
mod plan_cmd;
mod serve_cmd;
mod test_util;

use anyhow::Result;
use clap::{Parser, Subcommand};

use config::{ConfigFile, ServerConfig};

#[derive(Parser)]
#[command(name = "studypal", about = "Study plan and quiz web backend")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default studypal config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Run the HTTP server
    Serve {
        /// Bind address (overrides STUDYPAL_BIND env var)
        #[arg(long)]
        bind: Option<String>,
        /// Listen port (overrides STUDYPAL_PORT env var)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Generate a study plan without starting the server
    Plan {
        /// Study subject (e.g. math, science, history)
        subject: String,
        /// Study duration in hours
        hours: f64,
        /// Write the schedule CSV to this file
        #[arg(long)]
        output: Option<String>,
    },
    /// List catalog subjects and their quiz coverage
    Subjects,
}

/// Execute the `studypal init` command: write a default config file.
fn cmd_init(force: bool) -> Result<()> {
    let path = config::config_path();
    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    config::save_config(&ConfigFile::default())?;
    println!("Wrote config to {}", path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { force } => {
            cmd_init(force)?;
        }
        Commands::Serve { bind, port } => {
            let resolved = ServerConfig::resolve(bind.as_deref(), port)?;
            serve_cmd::run_serve(&resolved.bind, resolved.port).await?;
        }
        Commands::Plan {
            subject,
            hours,
            output,
        } => {
            plan_cmd::run_plan(&subject, hours, output.as_deref())?;
        }
        Commands::Subjects => {
            plan_cmd::run_subjects()?;
        }
    }

    Ok(())
}
