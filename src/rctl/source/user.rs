// user: Enumerates users from the account database.
#![forbid(unsafe_code)]
use super::{
    read_source,
    Enumerate,
};
use crate::rctl::errors::RctlError;
use crate::rctl::resource::Identity;
use std::path::PathBuf;
use tracing::debug;

/// Reads users out of a passwd(5) style file.
#[derive(Debug)]
pub struct AccountDatabase {
    path: PathBuf,
}

impl AccountDatabase {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
        }
    }
}

impl Enumerate for AccountDatabase {
    fn candidates(&self) -> Result<Vec<Identity>, RctlError> {
        let passwd = read_source("account database", &self.path)?;

        Ok(parse_passwd(&passwd))
    }
}

// name:password:uid:gid:... one user per line
fn parse_passwd(passwd: &str) -> Vec<Identity> {
    passwd
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let fields: Vec<&str> = line.split(':').collect();

            let (Some(name), Some(uid)) = (fields.first(), fields.get(2)) else {
                debug!("Skipping short passwd entry: {line}");
                return None;
            };

            let Ok(uid) = uid.parse::<u32>() else {
                debug!("Skipping passwd entry with bad uid: {line}");
                return None;
            };

            Some(Identity::User {
                uid,
                name: (*name).to_owned(),
            })
        })
        .collect()
}
