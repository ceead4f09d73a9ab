//! Waymark CLI.
//!
//! Checks route manifests, prints the resulting route table in match order
//! and routes sample URLs against it.

use std::path::Path;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use waymark_lib::report::{describe_table, render_table_text, route_url};
use waymark_lib::{load_manifest, ManifestError};
use waymark_router::RouteTable;
use waymark_telemetry::{LogFormat, Telemetry, TelemetryConfig};

#[derive(Parser, Debug)]
#[command(name = "waymark", about = "Route template tooling", version)]
struct Cli {
    /// Log level.
    #[arg(long, global = true, default_value = "warn", env = "WAYMARK_LOG_LEVEL")]
    log_level: String,

    /// Log format (json or pretty).
    #[arg(long, global = true, default_value = "pretty")]
    log_format: String,

    /// Disable colours in pretty log output.
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the route table from a manifest and report errors.
    ///
    /// Reports template syntax errors (E2001), unknown or misused
    /// constraints (E2002, E2003), ambiguous routes (E2004) and manifest
    /// errors (E2010-E2012).
    Check {
        /// Route manifest (YAML).
        #[arg(short, long)]
        routes: String,
    },

    /// Print the route table in match order.
    Table {
        /// Route manifest (YAML).
        #[arg(short, long)]
        routes: String,

        /// Output format (text or json).
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Route one or more URLs and print what matched, as JSON.
    Match {
        /// Route manifest (YAML).
        #[arg(short, long)]
        routes: String,

        /// Request URLs, e.g. /blog/5?page=2.
        #[arg(required = true, num_args = 1..)]
        urls: Vec<String>,
    },
}

fn load_table(routes: &str) -> Result<RouteTable<String>, ManifestError> {
    load_manifest(Path::new(routes))?.build_table()
}

/// Run the check command.
fn run_check(routes: &str) -> ExitCode {
    match load_table(routes) {
        Ok(table) => {
            eprintln!("✓ {} is valid ({} routes)", routes, table.len());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ {}: {}", routes, e);
            ExitCode::from(1)
        }
    }
}

/// Run the table command.
fn run_table(routes: &str, format: &str) -> ExitCode {
    let table = match load_table(routes) {
        Ok(table) => table,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(1);
        }
    };

    let entries = describe_table(&table);
    match format {
        "json" => match serde_json::to_string_pretty(&entries) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("error: failed to serialize table: {}", e);
                return ExitCode::from(1);
            }
        },
        "text" => print!("{}", render_table_text(&entries)),
        other => {
            eprintln!("error: unknown format '{}' (expected text or json)", other);
            return ExitCode::from(1);
        }
    }
    ExitCode::SUCCESS
}

/// Run the match command. Exits with 1 if any URL did not match.
fn run_match(routes: &str, urls: &[String]) -> ExitCode {
    let table = match load_table(routes) {
        Ok(table) => table,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(1);
        }
    };

    let reports: Vec<_> = urls.iter().map(|url| route_url(&table, url)).collect();
    match serde_json::to_string_pretty(&reports) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("error: failed to serialize results: {}", e);
            return ExitCode::from(1);
        }
    }

    if reports.iter().all(|r| r.matched) {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let Some(log_format) = LogFormat::parse(&cli.log_format) else {
        eprintln!(
            "error: unknown log format '{}' (expected json or pretty)",
            cli.log_format
        );
        return ExitCode::from(2);
    };
    let config = TelemetryConfig::new()
        .with_log_level(&cli.log_level)
        .with_log_format(log_format)
        .with_ansi(!cli.no_color);
    if let Err(e) = Telemetry::init(config) {
        eprintln!("error: {}", e);
        return ExitCode::from(1);
    }

    match cli.command {
        Commands::Check { routes } => run_check(&routes),
        Commands::Table { routes, format } => run_table(&routes, &format),
        Commands::Match { routes, urls } => run_match(&routes, &urls),
    }
}
