// permsync CLI - catalog ACL reconciliation

mod dump;
mod exit_codes;
mod output;
mod report;
mod update;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use permsync_catalog_client::{normalize_segment, CatalogClient, ClientConfig};
use permsync_engine::{CatalogError, CatalogNode, CatalogSource, PolicyDocument};

// Re-export exit codes from registry (single source of truth)
use exit_codes::{
    catalog_exit_code, EXIT_COMMIT_FAILED, EXIT_CONFIG, EXIT_ERROR, EXIT_NOT_AUTH,
    EXIT_POLICY_FORMAT, EXIT_SUCCESS, EXIT_USAGE,
};

#[derive(Parser)]
#[command(name = "permsync")]
#[command(about = "Reconcile catalog ACLs against a declarative policy file")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Suppress progress on stderr
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
pub struct ConnectionArgs {
    /// Path to a config TOML file (default: <config dir>/permsync/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Catalog server hostname
    #[arg(long, short = 'H', global = true)]
    hostname: Option<String>,

    /// Catalog server port
    #[arg(long, short = 'p', global = true)]
    port: Option<u16>,

    /// Connect over HTTPS
    #[arg(long, global = true)]
    ssl: bool,

    /// Username to log in with (omit to reuse the cached token)
    #[arg(long, global = true)]
    username: Option<String>,

    /// Password for --username
    #[arg(long, global = true)]
    password: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long, global = true)]
    skip_verify: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write ACL changes to the catalog
    #[command(subcommand)]
    Update(update::UpdateCommands),

    /// Report pending ACL changes without writing any
    #[command(subcommand)]
    Report(report::ReportCommands),

    /// Dump current ACLs to a file
    #[command(subcommand)]
    Dump(dump::DumpCommands),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Update(cmd) => update::run(cmd, &cli.connection, cli.quiet),
        Commands::Report(cmd) => report::run(cmd, &cli.connection, cli.quiet),
        Commands::Dump(cmd) => dump::run(cmd, &cli.connection, cli.quiet),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self { code: EXIT_CONFIG, message: msg.into(), hint: None }
    }

    pub fn policy(msg: impl Into<String>) -> Self {
        Self { code: EXIT_POLICY_FORMAT, message: msg.into(), hint: None }
    }

    /// Create error from catalog error with proper exit code.
    pub fn catalog(err: CatalogError) -> Self {
        let code = catalog_exit_code(&err);
        let hint = match &err {
            CatalogError::Unauthorized => Some("check --username and --password".to_string()),
            CatalogError::Transport(_) => {
                Some("check --hostname, --port and --ssl".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    pub fn commit_failed(paths: &[String]) -> Self {
        Self {
            code: EXIT_COMMIT_FAILED,
            message: format!("{} items could not be committed: {}", paths.len(), paths.join(", ")),
            hint: None,
        }
    }
}

// ============================================================================
// Shared command helpers
// ============================================================================

/// Load config, apply flag overrides, connect and authenticate.
pub(crate) fn connect(args: &ConnectionArgs) -> Result<CatalogClient, CliError> {
    let mut config = ClientConfig::load(args.config.as_deref()).map_err(CliError::config)?;
    if let Some(hostname) = &args.hostname {
        config.hostname = hostname.clone();
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if args.ssl {
        config.ssl = true;
    }
    if let Some(username) = &args.username {
        config.username = username.clone();
    }
    if let Some(password) = &args.password {
        config.password = password.clone();
    }
    if args.skip_verify {
        config.verify = false;
    }

    CatalogClient::connect(&config).map_err(|e| match e {
        CatalogError::Unauthorized if config.username.is_empty() => CliError {
            code: EXIT_NOT_AUTH,
            message: "not authenticated".to_string(),
            hint: Some("pass --username and --password once to cache a token".to_string()),
        },
        e => CliError::catalog(e),
    })
}

/// Progress sink honoring --quiet.
pub(crate) fn progress(quiet: bool) -> impl FnMut(&str) {
    move |line: &str| {
        if !quiet {
            eprintln!("{line}");
        }
    }
}

/// Normalize the user-supplied base segments and fetch the object.
pub(crate) fn resolve_base(
    client: &CatalogClient,
    base: &[String],
) -> Result<CatalogNode, CliError> {
    let path: Vec<String> = base.iter().map(|s| normalize_segment(s)).collect();
    client.get_by_path(&path).map_err(CliError::catalog)
}

/// Load the policy file, warning about duplicate keys (the last entry for
/// a key wins during matching).
pub(crate) fn load_policy(path: &Path) -> Result<PolicyDocument, CliError> {
    let policy = PolicyDocument::from_path(path).map_err(|e| CliError::policy(e.to_string()))?;
    for key in policy.duplicate_keys() {
        eprintln!("warning: policy file has multiple entries for {key}; the last one wins");
    }
    Ok(policy)
}
