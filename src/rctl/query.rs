// query: Single entity lookups against the RACCT accounting facility.
use super::errors::RctlError;
use super::subject::Subject;
use crate::rctlstate::RctlState;
use std::fmt;
use tracing::debug;

/// rctl_get_racct output never gets a smaller buffer than this.
pub const MIN_BUFFER_SIZE: usize = 1024;

/// Plenty for the ~25 resources the kernel reports per subject.
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Capability to fetch the raw usage of a single accounting subject.
pub trait AccountingQuery: fmt::Debug + Send {
    /// Returns the output buffer filled in for a `subject:id:` rule.
    fn get_racct(&self, rule: &str) -> Result<Vec<u8>, RctlError>;
}

/// Ensures the subject of a `subject:id:` rule is one we support.
pub fn check_subject(rule: &str) -> Result<Subject, RctlError> {
    let subject = rule.split_once(':').map_or(rule, |(subject, _)| subject);

    subject.parse()
}

/// Cuts an output buffer down to the string it holds. That's everything up
/// to the first NUL, or the whole buffer if the kernel filled it.
pub fn trim_output(buf: &[u8]) -> String {
    let len = buf.iter()
        .position(|&byte| byte == 0)
        .unwrap_or(buf.len());

    String::from_utf8_lossy(&buf[..len]).into_owned()
}

/// Queries the raw usage string for a `subject:id:` rule.
pub fn get_racct<Q>(query: &Q, rule: &str) -> Result<String, RctlError>
where
    Q: AccountingQuery + ?Sized,
{
    // Unsupported subjects never make it to the kernel.
    check_subject(rule)?;

    debug!("Getting resource usage for {rule}");

    let buf = query.get_racct(rule)?;

    Ok(trim_output(&buf))
}

/// Queries the kernel via rctl_get_racct(2).
#[derive(Debug)]
pub struct RacctQuery {
    buffer_size: usize,
}

impl Default for RacctQuery {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl RacctQuery {
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the size of the output buffer handed to the kernel.
    pub fn buffer_size(mut self, buffer_size: usize) -> Self {
        debug!("Setting rctl_get_racct buffer size to: {buffer_size}");

        self.buffer_size = buffer_size.max(MIN_BUFFER_SIZE);
        self
    }
}

#[cfg(target_os = "freebsd")]
impl AccountingQuery for RacctQuery {
    fn get_racct(&self, rule: &str) -> Result<Vec<u8>, RctlError> {
        let mut outbuf = vec![0; self.buffer_size];

        match sys::get_racct(rule, &mut outbuf) {
            Ok(())   => Ok(outbuf),
            Err(err) => Err(classify_error(rule, err)),
        }
    }
}

#[cfg(not(target_os = "freebsd"))]
impl AccountingQuery for RacctQuery {
    fn get_racct(&self, _rule: &str) -> Result<Vec<u8>, RctlError> {
        let reason = RctlState::NotPresent.reason().unwrap_or_default();

        Err(RctlError::AccountingDisabled(reason.to_owned()))
    }
}

// Maps rctl_get_racct errno values onto our errors.
#[cfg(target_os = "freebsd")]
fn classify_error(rule: &str, err: std::io::Error) -> RctlError {
    match err.raw_os_error() {
        // The process, user or jail has gone away since we enumerated it.
        Some(libc::ESRCH) => RctlError::NoSuchEntity(rule.to_owned()),

        // kern.racct.enable=0 gets us ENOSYS
        Some(libc::ENOSYS) => {
            let reason = RctlState::check()
                .reason()
                .or(RctlState::Disabled.reason())
                .unwrap_or_default();

            RctlError::AccountingDisabled(reason.to_owned())
        },

        Some(libc::EPERM) => {
            match RctlState::check().reason() {
                Some(reason) => RctlError::AccountingDisabled(reason.into()),
                None         => RctlError::Query {
                    rule:   rule.to_owned(),
                    source: err,
                },
            }
        },

        _ => RctlError::Query {
            rule:   rule.to_owned(),
            source: err,
        },
    }
}

#[cfg(target_os = "freebsd")]
mod sys {
    use std::ffi::CString;
    use std::io;

    extern "C" {
        fn rctl_get_racct(
            inbufp: *const libc::c_char,
            inbuflen: libc::size_t,
            outbufp: *mut libc::c_char,
            outbuflen: libc::size_t,
        ) -> libc::c_int;
    }

    pub(super) fn get_racct(rule: &str, outbuf: &mut [u8]) -> io::Result<()> {
        let filter = CString::new(rule)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let filterlen = filter.as_bytes_with_nul().len();

        // The kernel writes at most outbuf.len() bytes, NUL included.
        let error = unsafe {
            rctl_get_racct(
                filter.as_ptr(),
                filterlen,
                outbuf.as_mut_ptr().cast(),
                outbuf.len(),
            )
        };

        if error == 0 {
            Ok(())
        }
        else {
            Err(io::Error::last_os_error())
        }
    }
}

/// Returns canned output for known rules, records every rule it is asked
/// for.
#[cfg(test)]
#[derive(Clone, Debug, Default)]
pub struct CannedQuery {
    inner: std::sync::Arc<parking_lot::Mutex<Canned>>,
}

#[cfg(test)]
#[derive(Debug, Default)]
struct Canned {
    calls:     Vec<String>,
    disabled:  bool,
    responses: std::collections::HashMap<String, String>,
    vanished:  std::collections::HashSet<String>,
}

#[cfg(test)]
impl CannedQuery {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn respond(&self, rule: &str, raw: &str) -> &Self {
        self.inner.lock().responses.insert(rule.into(), raw.into());
        self
    }

    pub fn set_disabled(&self, disabled: bool) {
        self.inner.lock().disabled = disabled;
    }

    // Answers the rule as if its entity exited after being enumerated.
    pub fn vanish(&self, rule: &str) {
        self.inner.lock().vanished.insert(rule.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().calls.clone()
    }
}

#[cfg(test)]
impl AccountingQuery for CannedQuery {
    fn get_racct(&self, rule: &str) -> Result<Vec<u8>, RctlError> {
        let mut canned = self.inner.lock();
        canned.calls.push(rule.to_owned());

        if canned.disabled {
            let reason = RctlState::Disabled.reason().unwrap_or_default();
            return Err(RctlError::AccountingDisabled(reason.into()));
        }

        if canned.vanished.contains(rule) {
            return Err(RctlError::NoSuchEntity(rule.to_owned()));
        }

        // Asking for a rule nobody set up is a bug in the caller.
        let Some(raw) = canned.responses.get(rule) else {
            return Err(RctlError::Query {
                rule:   rule.to_owned(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "no canned response",
                ),
            });
        };

        // Pad like the kernel's zeroed buffer would be.
        let mut buf = raw.clone().into_bytes();
        buf.resize(buf.len().max(MIN_BUFFER_SIZE), 0);

        Ok(buf)
    }
}
