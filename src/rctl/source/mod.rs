// source: Enumerators producing the candidate entities for each subject.
#![forbid(unsafe_code)]
use super::errors::RctlError;
use super::resource::Identity;
use super::subject::Subject;
use std::fmt;
use std::fs;
use std::path::{
    Path,
    PathBuf,
};
use tracing::debug;

mod jail;
mod loginclass;
mod process;
mod user;

pub use jail::JailTable;
pub use loginclass::LoginClassConfig;
pub use process::ProcessTable;
pub use user::AccountDatabase;

/// Default location of the account database.
pub const PASSWD_PATH: &str = "/etc/passwd";

/// Default location of the login class capability database.
pub const LOGIN_CONF_PATH: &str = "/etc/login.conf";

/// Lists the entities of one subject type that could be queried.
pub trait Enumerate: fmt::Debug + Send {
    fn candidates(&self) -> Result<Vec<Identity>, RctlError>;
}

/// One enumerator per subject.
#[derive(Debug)]
pub struct Sources {
    process:     Box<dyn Enumerate>,
    user:        Box<dyn Enumerate>,
    jail:        Box<dyn Enumerate>,
    login_class: Box<dyn Enumerate>,
}

impl Default for Sources {
    fn default() -> Self {
        Self::system(PASSWD_PATH, LOGIN_CONF_PATH)
    }
}

impl Sources {
    pub fn new(
        process: Box<dyn Enumerate>,
        user: Box<dyn Enumerate>,
        jail: Box<dyn Enumerate>,
        login_class: Box<dyn Enumerate>,
    ) -> Self {
        Self {
            process,
            user,
            jail,
            login_class,
        }
    }

    /// The enumerators backed by the running system.
    pub fn system<P, L>(passwd: P, login_conf: L) -> Self
    where
        P: Into<PathBuf>,
        L: Into<PathBuf>,
    {
        Self::new(
            Box::new(ProcessTable::new()),
            Box::new(AccountDatabase::new(passwd)),
            Box::new(JailTable::new()),
            Box::new(LoginClassConfig::new(login_conf)),
        )
    }

    pub fn get(&self, subject: Subject) -> &dyn Enumerate {
        match subject {
            Subject::Process    => self.process.as_ref(),
            Subject::User       => self.user.as_ref(),
            Subject::Jail       => self.jail.as_ref(),
            Subject::LoginClass => self.login_class.as_ref(),
        }
    }
}

// Reads one of the line oriented databases, mapping failure to
// SourceUnavailable.
fn read_source(name: &'static str, path: &Path) -> Result<String, RctlError> {
    debug!("Reading {name} from {}", path.display());

    fs::read_to_string(path).map_err(|e| {
        RctlError::SourceUnavailable {
            name,
            reason: format!("{}: {e}", path.display()),
        }
    })
}

/// Hands out a fixed set of identities, or fails while unavailable.
#[cfg(test)]
#[derive(Clone, Debug, Default)]
pub struct StaticSource {
    identities: std::sync::Arc<parking_lot::Mutex<Option<Vec<Identity>>>>,
}

#[cfg(test)]
impl StaticSource {
    pub fn new(identities: Vec<Identity>) -> Self {
        let source = Self::default();
        source.set(identities);
        source
    }

    pub fn set(&self, identities: Vec<Identity>) {
        *self.identities.lock() = Some(identities);
    }

    pub fn set_unavailable(&self) {
        *self.identities.lock() = None;
    }
}

#[cfg(test)]
impl Enumerate for StaticSource {
    fn candidates(&self) -> Result<Vec<Identity>, RctlError> {
        self.identities.lock().clone().ok_or(RctlError::SourceUnavailable {
            name:   "static source",
            reason: "marked unavailable".into(),
        })
    }
}
