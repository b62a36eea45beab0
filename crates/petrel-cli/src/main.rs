use anyhow::Result;
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use petrel_browser::{ChromeFinder, PortalSession, SessionOptions};
use petrel_core::{ConfigStore, Credentials, PortalConfig};
use petrel_detectors::{flow, LoginOutcome};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

mod prompt;

const EXIT_CHROME_MISSING: u8 = 2;
const EXIT_FIELDS_NOT_FOUND: u8 = 3;
const EXIT_LOGIN_FAILED: u8 = 4;
const EXIT_RUNTIME_ERROR: u8 = 5;

#[derive(Parser)]
#[command(name = "petrel")]
#[command(version)]
#[command(
    about = "Automated campus captive-portal login",
    long_about = "Petrel opens a controlled Chrome instance pointed at the campus captive \
                  portal, detects whether the session is already authenticated, and \
                  otherwise fills in the login form, submits it, and verifies the result.\n\n\
                  Exit codes: 0 = logged in (or already was), 2 = Chrome not found, \
                  3 = portal form fields never appeared, 4 = login was not verified, \
                  5 = unhandled runtime error."
)]
struct Cli {
    /// Run Chrome in headless mode
    #[arg(long)]
    headless: bool,

    /// Portal URL
    #[arg(long, default_value = "http://172.19.0.1/")]
    url: String,

    /// Path to the Chrome/Chromium binary
    #[arg(long, value_name = "PATH")]
    chrome_path: Option<PathBuf>,

    /// Credential file location (default: ~/.petrel/config.json)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Prompt for credentials again even if a config file exists
    #[arg(long)]
    reconfigure: bool,

    /// Seconds to wait for the portal form fields to appear
    #[arg(long, value_name = "SECS")]
    field_timeout: Option<f64>,

    /// Seconds to wait for login to verify after submission
    #[arg(long, value_name = "SECS")]
    verify_timeout: Option<f64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("Unhandled error: {:#}", e);
            eprintln!("{} {:#}", style("Error:").red().bold(), e);
            ExitCode::from(EXIT_RUNTIME_ERROR)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let store = config_store(&cli)?;
    let creds = load_or_prompt(&store, cli.reconfigure)?;
    let portal = portal_config(&cli);

    // Chrome must be located before any session is opened; a missing
    // browser is the one environment failure with its own exit code.
    let chrome_path = match ChromeFinder::new(cli.chrome_path.clone()).find() {
        Ok(path) => path,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            return Ok(ExitCode::from(EXIT_CHROME_MISSING));
        }
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on(login(cli, chrome_path, portal, creds));

    runtime.shutdown_timeout(Duration::from_millis(100));
    result
}

async fn login(
    cli: Cli,
    chrome_path: PathBuf,
    portal: PortalConfig,
    creds: Credentials,
) -> Result<ExitCode> {
    // Built before the session so nothing fallible sits between launch
    // and the close below.
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    spinner.set_message(format!("Logging in at {}", portal.url));

    let session = PortalSession::launch(&SessionOptions {
        chrome_path,
        headless: cli.headless,
    })
    .await?;

    spinner.enable_steady_tick(Duration::from_millis(80));

    let outcome = flow::run(&session, &portal, &creds).await;

    spinner.finish_and_clear();
    // The session is closed on every path, including the error one.
    session.close().await;

    let code = match outcome {
        Ok(LoginOutcome::AlreadyLoggedIn) => {
            println!("{}", style("Already logged in to the campus network").green());
            ExitCode::SUCCESS
        }
        Ok(LoginOutcome::LoggedIn) => {
            println!("{}", style("Login succeeded").green().bold());
            ExitCode::SUCCESS
        }
        Ok(LoginOutcome::FieldsNotFound) => {
            eprintln!(
                "{}",
                style("Portal form fields never appeared; the page may have failed to load")
                    .red()
            );
            ExitCode::from(EXIT_FIELDS_NOT_FOUND)
        }
        Ok(LoginOutcome::LoginFailed) => {
            eprintln!(
                "{}",
                style("Login failed; check account, password, and carrier choice").red()
            );
            ExitCode::from(EXIT_LOGIN_FAILED)
        }
        Err(e) => {
            tracing::error!("Login flow failed: {}", e);
            eprintln!("{} {}", style("Error:").red().bold(), e);
            ExitCode::from(EXIT_RUNTIME_ERROR)
        }
    };

    Ok(code)
}

fn config_store(cli: &Cli) -> Result<ConfigStore> {
    let path = match &cli.config {
        Some(path) => path.clone(),
        None => ConfigStore::default_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?,
    };
    Ok(ConfigStore::new(path))
}

fn load_or_prompt(store: &ConfigStore, reconfigure: bool) -> Result<Credentials> {
    if !reconfigure {
        if let Some(creds) = store.load() {
            return Ok(creds);
        }
    }
    prompt::collect_and_save(store)
}

fn portal_config(cli: &Cli) -> PortalConfig {
    let mut portal = PortalConfig {
        url: cli.url.clone(),
        ..PortalConfig::default()
    };
    if let Some(secs) = cli.field_timeout {
        portal.field_timeout = Duration::from_secs_f64(secs);
    }
    if let Some(secs) = cli.verify_timeout {
        portal.verify_timeout = Duration::from_secs_f64(secs);
    }
    portal
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("petrel=debug,petrel_core=debug,petrel_browser=debug,petrel_detectors=debug")
    } else {
        EnvFilter::new("petrel=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}
