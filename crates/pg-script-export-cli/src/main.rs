//! pg-script-export CLI - export PostgreSQL objects as Liquibase scripts.

use clap::{Parser, Subcommand};
use pg_script_export::{health_check, Config, ExportError, Orchestrator, RegisteredPaths};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, Level};
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser)]
#[command(name = "pg-script-export")]
#[command(about = "Export PostgreSQL enums, functions, views and triggers as Liquibase SQL scripts")]
#[command(version)]
struct Cli {
    /// Path to JSON or YAML configuration file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export all objects and write the index fragment
    Run {
        /// Override the directory that contains the <database>/ tree
        #[arg(long)]
        output_root: Option<PathBuf>,
    },

    /// Test the database connection
    HealthCheck,

    /// List the script paths the changelog already registers
    Registered {
        /// Override the directory that contains the <database>/ tree
        #[arg(long)]
        output_root: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), ExportError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format);

    let mut config = Config::load(&cli.config)?;
    info!("Loaded configuration from {:?}", cli.config);

    match cli.command {
        Commands::Run { output_root } => {
            if let Some(root) = output_root {
                config.output.root = root;
            }

            // Reads the changelog before connecting so a bad manifest fails fast.
            let orchestrator = Orchestrator::new(config)?;
            let summary = orchestrator.run().await?;

            if cli.output_json {
                println!("{}", summary.to_json()?);
            } else {
                println!("\nExport completed!");
                println!("  Output: {}", summary.database_root);
                println!("  Duration: {:.2}s", summary.duration_seconds);
                for kind in &summary.kinds {
                    println!(
                        "  {}: {} scripts ({} new, {} registered)",
                        kind.kind.section_label(),
                        kind.scripts,
                        kind.announced,
                        kind.already_registered
                    );
                }
                println!(
                    "  New entries: {} (see {})",
                    summary.total_announced(),
                    summary.fragment_path
                );
            }
        }

        Commands::HealthCheck => {
            let result = health_check(&config.db).await;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("Health Check Results:");
                println!(
                    "  PostgreSQL ({}): {} ({}ms)",
                    config.db.connection_string(),
                    if result.connected { "OK" } else { "FAILED" },
                    result.latency_ms
                );
                if let Some(ref err) = result.error {
                    println!("    Error: {}", err);
                }
            }

            if !result.connected {
                return Err(ExportError::connection(
                    result.error.unwrap_or_default(),
                    "health check",
                ));
            }
        }

        Commands::Registered { output_root } => {
            if let Some(root) = output_root {
                config.output.root = root;
            }

            let registered = RegisteredPaths::load(config.manifest_path())?;
            let paths: Vec<&str> = registered.sorted().into_iter().collect();

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&paths)?);
            } else {
                for path in paths {
                    println!("{}", path);
                }
            }
        }
    }

    Ok(())
}

fn setup_logging(verbosity: &str, format: &str) {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Logs go to stderr so --output-json stays parseable.
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(std::io::stderr);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
