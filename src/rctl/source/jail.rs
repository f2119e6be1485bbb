// jail: Enumerates the running jails.
#![forbid(unsafe_code)]
use super::Enumerate;
use crate::rctl::errors::RctlError;
use crate::rctl::resource::Identity;
use tracing::debug;

/// Walks the running jails via jail_get(2), asking for the next jail after
/// the last one seen, starting from 0.
#[derive(Debug, Default)]
pub struct JailTable;

impl JailTable {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(target_os = "freebsd")]
impl Enumerate for JailTable {
    fn candidates(&self) -> Result<Vec<Identity>, RctlError> {
        use jail::RunningJail;

        let mut jails = Vec::new();

        for jail in RunningJail::all() {
            let name = jail.name().map_err(|e| {
                RctlError::SourceUnavailable {
                    name:   "jail table",
                    reason: format!("jid {}: {e}", jail.jid),
                }
            })?;

            debug!("JID: {}, Name: {:?}", jail.jid, name);

            jails.push(Identity::Jail {
                jid: jail.jid,
                name,
            });
        }

        Ok(jails)
    }
}

#[cfg(not(target_os = "freebsd"))]
impl Enumerate for JailTable {
    fn candidates(&self) -> Result<Vec<Identity>, RctlError> {
        debug!("Jails are only available on FreeBSD");

        Err(RctlError::SourceUnavailable {
            name:   "jail table",
            reason: "jails are not supported on this system".into(),
        })
    }
}
