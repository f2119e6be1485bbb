// rctl errors
#![forbid(unsafe_code)]
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RctlError {
    /// Returned when the RACCT/RCTL facility exists but isn't usable. Carries
    /// a message telling the operator how to fix it.
    #[error("RACCT/RCTL unavailable: {0}")]
    AccountingDisabled(String),

    /// Returned when a filter expression contains no rules at all.
    #[error("filter expression contains no rules")]
    EmptyFilter,

    /// Returned when a rule has no `subject:` prefix.
    #[error("invalid rule '{0}', expected subject:pattern")]
    InvalidRule(String),

    /// Returned when a rule pattern fails to compile.
    #[error("pattern in rule '{rule}' does not compile: {source}")]
    InvalidPattern {
        rule:   String,
        source: regex::Error,
    },

    /// Returned when a rule matched more candidates than we're allowed to
    /// query.
    #[error("rule '{rule}' matched {matched} candidates, limit is {limit}")]
    MatchLimitExceeded {
        rule:    String,
        matched: usize,
        limit:   usize,
    },

    /// Returned when the entity behind a query has gone away.
    #[error("no such entity for '{0}'")]
    NoSuchEntity(String),

    /// Returned for any other failure of the accounting query.
    #[error("rctl_get_racct failed for '{rule}': {source}")]
    Query {
        rule:   String,
        source: io::Error,
    },

    /// Returned when an enumerator cannot read the table or file it walks.
    #[error("{name} unavailable: {reason}")]
    SourceUnavailable {
        name:   &'static str,
        reason: String,
    },

    /// Returned when a rule names a subject we don't support.
    #[error("subject '{0}' not supported")]
    UnsupportedSubject(String),
}
