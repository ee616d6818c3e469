//! keyward command-line client
//!
//! Checks the locally cached license token and, when needed, obtains a new
//! one from the license server.
//!
//! Usage:
//!   keyward --api-url https://licensing.example.com/api/v1 setup --key ABC-123
//!   keyward check --interval 30
//!
//! Results are printed as JSON. The exit status is non-zero when the license
//! is not usable.

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use keyward_client::{
    ClientConfig, FileTokenStore, Fingerprint, HttpTransport, LicenseClient, LicenseRequest,
    SetupResult,
};
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "keyward")]
#[command(about = "License setup and validation client", version)]
struct Args {
    /// JSON config file; command-line values override it
    #[arg(long, env = "KEYWARD_CONFIG")]
    config: Option<PathBuf>,

    /// Base URL of the license API
    #[arg(long, env = "KEYWARD_API_URL")]
    api_url: Option<String>,

    /// Directory holding the cached token
    #[arg(long, env = "KEYWARD_STORAGE_DIR")]
    storage_dir: Option<PathBuf>,

    /// File name of the cached token
    #[arg(long)]
    token_file: Option<String>,

    /// HTTP timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Return the cached token if fresh, otherwise request a new one
    Setup(LicenseArgs),
    /// Validate the cached token, refreshing it if needed
    Validate(LicenseArgs),
    /// Validate the cached token without contacting the server
    Check {
        /// Days a cached token is trusted (defaults to the configured interval)
        #[arg(long)]
        interval: Option<u32>,
    },
    /// Ask the server whether a domain or IP is licensed
    PublicValidate {
        /// Domain name or IP address
        target: String,
    },
    /// Print the cached token
    Token,
    /// Delete the cached token
    Clear,
}

#[derive(ClapArgs, Debug)]
struct LicenseArgs {
    /// License key
    #[arg(long, env = "KEYWARD_LICENSE_KEY")]
    key: String,

    /// Domain to bind (defaults to the host name)
    #[arg(long)]
    domain: Option<String>,

    /// IP address to bind (defaults to the primary local address)
    #[arg(long)]
    ip: Option<String>,

    /// Installation directory to bind (defaults to the working directory)
    #[arg(long)]
    dir: Option<String>,

    /// Days a cached token is trusted, 7-90 (defaults to the configured interval)
    #[arg(long, env = "KEYWARD_CHECK_INTERVAL")]
    interval: Option<u32>,

    /// Refresh a stale or damaged token from the server
    #[arg(long, conflicts_with = "no_refresh")]
    refresh: bool,

    /// Report a stale or damaged token instead of refreshing it
    #[arg(long)]
    no_refresh: bool,
}

impl LicenseArgs {
    fn request(&self) -> LicenseRequest {
        let detected = Fingerprint::detect();
        LicenseRequest::new(
            self.key.clone(),
            Fingerprint::new(
                self.domain.clone().unwrap_or(detected.domain),
                self.ip.clone().unwrap_or(detected.ip),
                self.dir.clone().unwrap_or(detected.directory),
            ),
        )
    }

    fn interval(&self, config: &ClientConfig) -> u32 {
        self.interval.unwrap_or(config.check_interval_days)
    }

    fn auto_refresh(&self, config: &ClientConfig) -> bool {
        match (self.refresh, self.no_refresh) {
            (true, _) => true,
            (_, true) => false,
            _ => config.auto_refresh,
        }
    }
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = build_config(&args)?;
    debug!("using token file {}", config.token_path().display());

    let transport = HttpTransport::from_config(&config)?;
    let client: LicenseClient<HttpTransport, FileTokenStore> =
        LicenseClient::from_config(&config, transport).context("invalid configuration")?;

    match &args.command {
        Command::Setup(license) => {
            let result = client
                .setup_or_validate(
                    &license.request(),
                    license.interval(&config),
                    license.auto_refresh(&config),
                )
                .context("license setup failed")?;
            print_json(&result)?;
            Ok(exit_code(result.is_success()))
        }
        Command::Validate(license) => {
            let outcome = client
                .validate_with_auto_refresh(
                    &license.request(),
                    license.interval(&config),
                    license.auto_refresh(&config),
                )
                .context("license validation failed")?;
            print_json(&outcome)?;
            Ok(exit_code(outcome.is_valid()))
        }
        Command::Check { interval } => {
            let result =
                client.validate_local(interval.unwrap_or(config.check_interval_days))?;
            print_json(&result)?;
            Ok(exit_code(result.valid))
        }
        Command::PublicValidate { target } => {
            let response = client
                .public_validate(target)
                .context("public validation failed")?;
            let licensed = response.get("status").and_then(|s| s.as_str()) == Some("success");
            print_json(&response)?;
            Ok(exit_code(licensed))
        }
        Command::Token => match client.get_local_token()? {
            Some(token) => {
                println!("{token}");
                Ok(ExitCode::SUCCESS)
            }
            None => {
                print_json(&SetupResult::error("token not found"))?;
                Ok(ExitCode::FAILURE)
            }
        },
        Command::Clear => {
            client.clear_local_token()?;
            print_json(&json!({"status": "success", "message": "local token removed"}))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Defaults, then the config file, then command-line values.
fn build_config(args: &Args) -> Result<ClientConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => ClientConfig::default(),
    };
    if let Some(url) = &args.api_url {
        config.base_url = url.clone();
    }
    if let Some(dir) = &args.storage_dir {
        config.storage_dir = dir.clone();
    }
    if let Some(file) = &args.token_file {
        config.token_file = file.clone();
    }
    if let Some(timeout) = args.timeout {
        config.timeout_secs = timeout;
    }
    Ok(config)
}

/// `RUST_LOG` wins over `--verbose` when set.
fn init_logging(verbose: bool) {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact()
            .init();
        return;
    }

    let log_level = if verbose { Level::DEBUG } else { Level::WARN };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn exit_code(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
