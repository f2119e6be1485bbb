//!
//! Command line interface parsing
//!
#![forbid(unsafe_code)]
use clap::{
    crate_description,
    crate_name,
    crate_version,
    value_parser,
    Arg,
    ArgMatches,
    Command,
};
use rctl_exporter::rctl::{
    LOGIN_CONF_PATH,
    PASSWD_PATH,
};
use std::path::PathBuf;
use tracing::debug;

mod validator;

// Create a clap app
fn create_app() -> Command {
    debug!("Creating clap app");

    Command::new(crate_name!())
        .version(crate_version!())
        .about(crate_description!())
        .term_width(80)
        .arg(
            Arg::new("WEB_LISTEN_ADDRESS")
                .env("WEB_LISTEN_ADDRESS")
                .hide_env_values(true)
                .long("web.listen-address")
                .value_name("[ADDR:PORT]")
                .help("Address on which to expose metrics and web interface.")
                .default_value("127.0.0.1:9166")
                .value_parser(validator::is_valid_socket_addr)
        )
        .arg(
            Arg::new("WEB_TELEMETRY_PATH")
                .env("WEB_TELEMETRY_PATH")
                .hide_env_values(true)
                .long("web.telemetry-path")
                .value_name("PATH")
                .help("Path under which to expose metrics.")
                .default_value("/metrics")
                .value_parser(validator::is_valid_telemetry_path)
        )
        .arg(
            Arg::new("RCTL_FILTER")
                .env("RCTL_FILTER")
                .hide_env_values(true)
                .long("rctl.filter")
                .value_name("SUBJECT:REGEX[,...]")
                .help("Comma separated rules selecting the process, user, \
                       jail or loginclass subjects to report on, \
                       e.g. 'process:.*'. Every comma starts a new rule, so \
                       patterns cannot contain commas; write 'a{1,3}' as \
                       '(a|aa|aaa)' or similar.")
                .required(true)
                .value_parser(validator::is_valid_filter)
        )
        .arg(
            Arg::new("RCTL_PASSWD_FILE")
                .env("RCTL_PASSWD_FILE")
                .hide_env_values(true)
                .long("rctl.passwd-file")
                .value_name("FILE")
                .help("Account database enumerated for the user subject.")
                .default_value(PASSWD_PATH)
                .value_parser(value_parser!(PathBuf))
        )
        .arg(
            Arg::new("RCTL_LOGIN_CONF")
                .env("RCTL_LOGIN_CONF")
                .hide_env_values(true)
                .long("rctl.login-conf")
                .value_name("FILE")
                .help("Login class capability database enumerated for the \
                       loginclass subject.")
                .default_value(LOGIN_CONF_PATH)
                .value_parser(value_parser!(PathBuf))
        )
        .arg(
            Arg::new("RCTL_MAX_MATCHES")
                .env("RCTL_MAX_MATCHES")
                .hide_env_values(true)
                .long("rctl.max-matches")
                .value_name("COUNT")
                .help("Fail a refresh when a single rule matches more than \
                       this many entities.")
                .value_parser(validator::is_valid_max_matches)
        )
        .arg(
            Arg::new("RCTL_BUFFER_SIZE")
                .env("RCTL_BUFFER_SIZE")
                .hide_env_values(true)
                .long("rctl.buffer-size")
                .value_name("BYTES")
                .help("Size of the buffer the kernel writes usage into.")
                .default_value("4096")
                .value_parser(validator::is_valid_buffer_size)
        )
}

// Parses the command line arguments and returns the matches.
pub fn parse_args() -> ArgMatches {
    debug!("Parsing command line arguments");

    create_app().get_matches()
}
