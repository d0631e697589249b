//! CookieHunter - Cookie Security Analyzer
//!
//! Fetches a URL, inspects every cookie the response sets and reports
//! insecure or malformed attributes, from the command line or a local web form.

mod app;
mod cookies;
mod error;
mod http;
mod reporting;
mod scanner;
mod web;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use tokio::signal;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::app::Config;
use crate::error::{ConfigError, CookieHunterError};
use crate::http::{normalize_url, parse_header_lines, parse_json_body, HttpClient, HttpMethod, Request};
use crate::reporting::{formats, ReportFormat};
use crate::scanner::CookieScanner;

/// Cookie Security Analyzer
#[derive(Parser, Debug)]
#[command(name = "cookiehunter")]
#[command(author, version, about = "Cookie Security Analyzer", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "COOKIEHUNTER_CONFIG")]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn", env = "COOKIEHUNTER_LOG_LEVEL")]
    log_level: String,

    /// Log file path (enables file logging)
    #[arg(long, global = true, env = "COOKIEHUNTER_LOG_FILE")]
    log_file: Option<String>,

    /// Enable JSON structured logging
    #[arg(long, global = true, env = "COOKIEHUNTER_LOG_JSON")]
    log_json: bool,

    /// Generate default configuration and exit
    #[arg(long)]
    generate_config: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze the cookies set by a URL
    Scan(ScanArgs),

    /// Run the local web form
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
struct ScanArgs {
    /// Target URL (https:// is assumed when no scheme is given)
    url: String,

    /// HTTP method
    #[arg(short = 'X', long, value_enum, ignore_case = true, default_value_t = HttpMethod::Get)]
    method: HttpMethod,

    /// JSON body for POST requests
    #[arg(short, long)]
    data: Option<String>,

    /// Custom header as "Key: Value" (repeatable)
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,

    /// Save results to a file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Save results as JSON (with --output)
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Listen address (overrides web.listen_addr)
    #[arg(long)]
    listen: Option<String>,

    /// Listen port (overrides web.port)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle special commands first
    if cli.generate_config {
        return generate_default_config();
    }

    let Some(command) = &cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    // Initialize logging
    init_logging(&cli)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting CookieHunter");

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            let message = match e.downcast::<ConfigError>() {
                Ok(config_err) => CookieHunterError::from(config_err).user_message(),
                Err(other) => format!("Configuration problem: {:#}", other),
            };
            eprintln!("{}", message);
            std::process::exit(1);
        }
    };

    let result = match command {
        Command::Scan(args) => run_scan(&config, args).await,
        Command::Serve(args) => run_serve(config, args).await,
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "Run failed");
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }

    Ok(())
}

/// Initialize the logging system
fn init_logging(cli: &Cli) -> Result<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&cli.log_level)
            .with_context(|| format!("Invalid log level '{}'", cli.log_level))?,
    };

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if let Some(log_path) = &cli.log_file {
        // File-based logging with rotation
        let file_appender = if log_path.contains('/') || log_path.contains('\\') {
            let path = std::path::Path::new(log_path);
            let dir = path.parent().unwrap_or(std::path::Path::new("."));
            let filename = path
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or("cookiehunter.log");
            RollingFileAppender::new(Rotation::DAILY, dir, filename)
        } else {
            // Use default log directory
            let log_dir = Config::data_dir()
                .map(|d| d.join("logs"))
                .unwrap_or_else(|_| PathBuf::from("."));
            std::fs::create_dir_all(&log_dir).ok();
            RollingFileAppender::new(Rotation::DAILY, log_dir, log_path)
        };

        if cli.log_json {
            let file_layer = fmt::layer()
                .json()
                .with_writer(file_appender)
                .with_ansi(false);

            subscriber.with(file_layer).init();
        } else {
            let file_layer = fmt::layer().with_writer(file_appender).with_ansi(false);

            subscriber.with(file_layer).init();
        }
    } else if cli.log_json {
        // stdout carries the report
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

/// Load and validate configuration
fn load_config(cli: &Cli) -> Result<Config> {
    let config = Config::load(cli.config.as_deref())?;
    config.validate()?;
    Ok(config)
}

/// Generate default configuration file
fn generate_default_config() -> Result<()> {
    let config = Config::default();
    let toml = toml::to_string_pretty(&config).context("Failed to serialize configuration")?;

    println!("{}", toml);
    Ok(())
}

/// Fetch one URL, print the analysis and optionally save it
async fn run_scan(config: &Config, args: &ScanArgs) -> Result<(), CookieHunterError> {
    let url = normalize_url(&args.url)?;
    let body = match args.data.as_deref() {
        Some(raw) => parse_json_body(raw)?,
        None => None,
    };
    if body.is_some() && args.method != HttpMethod::Post {
        tracing::warn!(method = args.method.as_str(), "Ignoring --data for non-POST request");
    }

    let request = Request::builder()
        .method(args.method)
        .url(&url)
        .headers(parse_header_lines(&args.headers))
        .json(body)
        .build();

    let client = HttpClient::new(&config.scanner)?;
    let scanner = CookieScanner::from_config(&config.rules);

    let outcome = scanner.analyze(&client, &request).await?;
    if outcome.status != 200 {
        println!("Warning: Status code {}", outcome.status);
    }

    print!("{}", formats::text::console(&outcome.result));

    if let Some(path) = &args.output {
        let format = if args.json {
            ReportFormat::Json
        } else {
            ReportFormat::Text
        };

        // The analysis is complete; a failed save is reported, not fatal
        match outcome.result.save(path, format) {
            Ok(()) => match format {
                ReportFormat::Json => println!("Results saved to JSON file {}", path.display()),
                ReportFormat::Text => println!("Results saved to file {}", path.display()),
            },
            Err(e) => {
                tracing::error!(error = %e, "Failed to save report");
                println!("{}", CookieHunterError::from(e).user_message());
            }
        }
    }

    Ok(())
}

/// Run the web form until Ctrl+C
async fn run_serve(mut config: Config, args: &ServeArgs) -> Result<(), CookieHunterError> {
    if let Some(listen) = &args.listen {
        config.web.listen_addr = listen.clone();
    }
    if let Some(port) = args.port {
        config.web.port = port;
    }
    config.validate()?;

    web::serve(&config, shutdown_signal()).await?;
    Ok(())
}

/// Resolves on Ctrl+C (or SIGTERM on unix)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to register Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to register SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }
}
