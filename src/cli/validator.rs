// Command line interface parsing validators
#![forbid(unsafe_code)]
use rctl_exporter::rctl::{
    FilterRule,
    MIN_BUFFER_SIZE,
};
use std::net::SocketAddr;
use std::str::FromStr;
use tracing::debug;

// Ensures the rctl.buffer-size is large enough for the kernel's output.
pub fn is_valid_buffer_size(s: &str) -> Result<usize, String> {
    debug!("Ensuring that rctl.buffer-size is valid");

    let size = s.parse::<usize>()
        .map_err(|_| format!("Could not parse '{s}' as a buffer size"))?;

    if size < MIN_BUFFER_SIZE {
        return Err(format!("buffer size cannot be less than {MIN_BUFFER_SIZE}"));
    }

    Ok(size)
}

// Parses the rctl.filter into its rules, rejecting bad subjects and patterns
// before anything is served.
pub fn is_valid_filter(s: &str) -> Result<Vec<FilterRule>, String> {
    debug!("Ensuring that rctl.filter is valid");

    FilterRule::parse_list(s).map_err(|e| e.to_string())
}

// Ensures that the rctl.max-matches is a positive number.
pub fn is_valid_max_matches(s: &str) -> Result<usize, String> {
    debug!("Ensuring that rctl.max-matches is valid");

    let limit = match s.parse::<usize>() {
        Ok(limit) => Ok(limit),
        Err(_)    => Err(format!("Could not parse '{s}' as valid limit")),
    }?;

    if limit < 1 {
        return Err("--rctl.max-matches cannot be less than 1".into());
    }

    Ok(limit)
}

// Used as a validator for the argument parsing.
// We validate the parse to SocketAddr here but still continue to return a
// string, the listener is fine with taking a string there.
pub fn is_valid_socket_addr(s: &str) -> Result<String, String> {
    debug!("Ensuring that web.listen-address is valid");

    match SocketAddr::from_str(s) {
        Ok(_)  => Ok(s.to_string()),
        Err(_) => Err(format!("'{s}' is not a valid ADDR:PORT string")),
    }
}

// Checks that the telemetry_path is valid.
// This check is extremely basic, and there may still be invalid paths that
// could be passed.
pub fn is_valid_telemetry_path(s: &str) -> Result<String, String> {
    debug!("Ensuring that web.telemetry-path is valid");

    // Ensure s isn't empty.
    if s.is_empty() {
        return Err("path must not be empty".to_owned());
    }

    // Ensure that s starts with /
    if !s.starts_with('/') {
        return Err("path must start with /".to_owned());
    }

    // Ensure that s isn't literally /
    if s == "/" {
        return Err("path must not be /".to_owned());
    }

    Ok(s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rctl_exporter::rctl::Subject;

    #[test]
    fn is_valid_buffer_size_ok() {
        assert_eq!(is_valid_buffer_size("1024"), Ok(1024));
        assert_eq!(is_valid_buffer_size("8192"), Ok(8192));
    }

    #[test]
    fn is_valid_buffer_size_too_small() {
        let res = is_valid_buffer_size("1023");
        assert!(res.is_err());
    }

    #[test]
    fn is_valid_buffer_size_not_a_number() {
        let res = is_valid_buffer_size("lots");
        assert!(res.is_err());
    }

    #[test]
    fn is_valid_filter_ok() {
        let rules = is_valid_filter("process:.*, user:^root$").unwrap();

        let subjects: Vec<Subject> = rules.iter()
            .map(FilterRule::subject)
            .collect();

        assert_eq!(subjects, vec![Subject::Process, Subject::User]);
    }

    #[test]
    fn is_valid_filter_bad_subject() {
        let res = is_valid_filter("racct:.*");
        assert!(res.is_err());
    }

    #[test]
    fn is_valid_filter_bad_pattern() {
        let res = is_valid_filter("process:(");
        assert!(res.is_err());
    }

    #[test]
    fn is_valid_filter_empty() {
        let res = is_valid_filter(" , ");
        assert!(res.is_err());
    }

    #[test]
    fn is_valid_max_matches_ok() {
        assert_eq!(is_valid_max_matches("50"), Ok(50));
    }

    #[test]
    fn is_valid_max_matches_zero() {
        let res = is_valid_max_matches("0");
        assert!(res.is_err());
    }

    #[test]
    fn is_valid_max_matches_negative() {
        let res = is_valid_max_matches("-1");
        assert!(res.is_err());
    }

    #[test]
    fn is_valid_socket_addr_ipv4_with_port() {
        let res = is_valid_socket_addr("127.0.0.1:9166");
        assert!(res.is_ok());
    }

    #[test]
    fn is_valid_socket_addr_ipv6_with_port() {
        let res = is_valid_socket_addr("[::1]:9166");
        assert!(res.is_ok());
    }

    #[test]
    fn is_valid_socket_addr_ipv4_without_port() {
        let res = is_valid_socket_addr("127.0.0.1");
        assert!(res.is_err());
    }

    #[test]
    fn is_valid_socket_addr_ipv6_without_port() {
        let res = is_valid_socket_addr("[::1]");
        assert!(res.is_err());
    }

    #[test]
    fn is_valid_socket_addr_no_ip() {
        let res = is_valid_socket_addr("random string");
        assert!(res.is_err());
    }

    #[test]
    fn is_valid_telemetry_path_slash() {
        let res = is_valid_telemetry_path("/");
        assert!(res.is_err());
    }

    #[test]
    fn is_valid_telemetry_path_empty() {
        let res = is_valid_telemetry_path("");
        assert!(res.is_err());
    }

    #[test]
    fn is_valid_telemetry_path_relative() {
        let res = is_valid_telemetry_path("metrics");
        assert!(res.is_err());
    }

    #[test]
    fn is_valid_telemetry_path_valid() {
        let res = is_valid_telemetry_path("/metrics");
        assert!(res.is_ok());
    }
}
