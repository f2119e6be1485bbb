//! Resource accounting collection.
//!
//! Enumerates processes, users, jails and login classes, filters them by the
//! configured rules, asks RACCT for the usage of each survivor and parses the
//! answer into [`Resource`] records.
mod errors;
mod manager;
mod query;
mod resource;
mod source;
mod subject;

pub use errors::RctlError;
pub use manager::ResourceManager;
pub use query::{
    check_subject,
    get_racct,
    trim_output,
    AccountingQuery,
    RacctQuery,
    DEFAULT_BUFFER_SIZE,
    MIN_BUFFER_SIZE,
};
pub use resource::{
    Identity,
    Resource,
    Usage,
};
pub use source::{
    AccountDatabase,
    Enumerate,
    JailTable,
    LoginClassConfig,
    ProcessTable,
    Sources,
    LOGIN_CONF_PATH,
    PASSWD_PATH,
};
pub use subject::{
    FilterRule,
    Subject,
};

#[cfg(test)]
pub(crate) use query::CannedQuery;
#[cfg(test)]
pub(crate) use source::StaticSource;
