// rctlstate: Checks whether RACCT/RCTL can be used on this host.
#![forbid(unsafe_code)]
use sysctl::{
    Ctl,
    CtlValue,
    Sysctl,
};
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RctlState {
    Disabled,
    Enabled,
    Jailed,
    NotPresent,
}

const CTL_KERN_RACCT_ENABLE: &str    = "kern.racct.enable";
const CTL_SECURITY_JAIL_JAILED: &str = "security.jail.jailed";

impl RctlState {
    pub fn check() -> Self {
        debug!("Checking RACCT/RCTL state");

        // The facility only exists on FreeBSD.
        if !cfg!(target_os = "freebsd") {
            return Self::NotPresent;
        }

        // rctl_get_racct refuses to run inside a jail
        if Self::jailed() {
            return Self::Jailed;
        }

        // If the tunable is missing, the kernel was built without RACCT
        let Ok(ctl) = Ctl::new(CTL_KERN_RACCT_ENABLE) else {
            return Self::NotPresent;
        };

        match ctl.value() {
            // FreeBSD 13+ returns a U8 as the kernel variable is bool.
            // FreeBSD older than 13 returns a Uint as the kernel variable is
            // an int.
            Ok(CtlValue::U8(1) | CtlValue::Uint(1)) => Self::Enabled,
            _                                       => Self::Disabled,
        }
    }

    // Tells the operator what's wrong and how to fix it. None when there is
    // nothing to fix.
    pub fn reason(&self) -> Option<&'static str> {
        match self {
            Self::Disabled => {
                Some("present, but disabled; enable using \
                      kern.racct.enable=1 tunable")
            },
            Self::Enabled  => None,
            Self::Jailed   => {
                Some("rctl_exporter cannot run within a jail")
            },
            Self::NotPresent => {
                Some("support not present in kernel; see rctl(8) \
                      for details")
            },
        }
    }

    fn jailed() -> bool {
        // If any error occurs, assume we're jailed
        let Ok(ctl) = Ctl::new(CTL_SECURITY_JAIL_JAILED) else {
            return true;
        };

        !matches!(ctl.value(), Ok(CtlValue::Int(0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enabled_has_no_reason() {
        assert!(RctlState::Enabled.reason().is_none());
    }

    #[test]
    fn disabled_reason_mentions_tunable() {
        let reason = RctlState::Disabled.reason().unwrap();
        assert!(reason.contains("kern.racct.enable=1"));
    }

    #[test]
    #[cfg(not(target_os = "freebsd"))]
    fn not_present_off_freebsd() {
        assert_eq!(RctlState::check(), RctlState::NotPresent);
    }
}
