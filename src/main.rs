//
// rctl_exporter
//
// An exporter for Prometheus, exporting resource usage of processes, users,
// jails and login classes as reported by rctl(8).
//
#![forbid(unsafe_code)]
use rctl_exporter::ExporterError;
use rctl_exporter::Exporter;
use rctl_exporter::httpd::Server;
use rctl_exporter::preflight::{
    is_racct_rctl_available,
    is_running_as_root,
};
use rctl_exporter::rctl::{
    FilterRule,
    RacctQuery,
    RctlError,
    ResourceManager,
    Sources,
    DEFAULT_BUFFER_SIZE,
};
use std::path::PathBuf;
use std::process::exit;
use tracing::{
    debug,
    error,
};
use tracing_subscriber::EnvFilter;
use uzers::UsersCache;

mod cli;

// Sets up the global tracing subscriber, logging at info unless RUST_LOG says
// otherwise.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();
}

async fn run() -> Result<(), ExporterError> {
    // Parse the commandline arguments first so --help and --version work
    // for anyone.
    let matches = cli::parse_args();

    // Root is required to query accounting for other users' processes.
    is_running_as_root(&UsersCache::new())?;

    // Check if RACCT/RCTL is available and if it's not, exit.
    is_racct_rctl_available()?;

    // Required by clap, so always present after parsing.
    let rules = matches.get_one::<Vec<FilterRule>>("RCTL_FILTER")
        .cloned()
        .ok_or(RctlError::EmptyFilter)?;
    debug!("rctl.filter: {} rule(s)", rules.len());

    let passwd = matches.get_one::<PathBuf>("RCTL_PASSWD_FILE")
        .cloned()
        .unwrap_or_default();
    debug!("rctl.passwd-file: {}", passwd.display());

    let login_conf = matches.get_one::<PathBuf>("RCTL_LOGIN_CONF")
        .cloned()
        .unwrap_or_default();
    debug!("rctl.login-conf: {}", login_conf.display());

    let max_matches = matches.get_one::<usize>("RCTL_MAX_MATCHES").copied();
    debug!("rctl.max-matches: {max_matches:?}");

    let buffer_size = matches.get_one::<usize>("RCTL_BUFFER_SIZE")
        .copied()
        .unwrap_or(DEFAULT_BUFFER_SIZE);
    debug!("rctl.buffer-size: {buffer_size}");

    let bind_address = matches.get_one::<String>("WEB_LISTEN_ADDRESS")
        .cloned()
        .unwrap_or_default();
    debug!("web.listen-address: {bind_address}");

    let telemetry_path = matches.get_one::<String>("WEB_TELEMETRY_PATH")
        .cloned()
        .unwrap_or_default();
    debug!("web.telemetry-path: {telemetry_path}");

    let manager = ResourceManager::new(
        rules,
        Sources::system(passwd, login_conf),
        Box::new(RacctQuery::new().buffer_size(buffer_size)),
    )
    .max_matches(max_matches);

    let exporter = Exporter::new(manager);

    Server::new()
        .bind_address(bind_address)
        .telemetry_path(telemetry_path)
        .run(exporter)
        .await?;

    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(e) = run().await {
        error!("{e}");

        exit(1);
    }
}
