// preflight: Checks run before the exporter starts serving.
#![forbid(unsafe_code)]
use crate::errors::ExporterError;
use crate::rctlstate::RctlState;
use tracing::debug;
use uzers::Users;

/// Checks that RACCT/RCTL is present, enabled and usable from here.
pub fn is_racct_rctl_available() -> Result<(), ExporterError> {
    debug!("Checking RACCT/RCTL status");

    is_usable(RctlState::check())
}

fn is_usable(state: RctlState) -> Result<(), ExporterError> {
    match state.reason() {
        None         => Ok(()),
        Some(reason) => Err(ExporterError::RctlUnavailable(reason.to_owned())),
    }
}

/// Checks that we're running as root.
pub fn is_running_as_root<U: Users>(users: &U) -> Result<(), ExporterError> {
    debug!("Ensuring that we're running as root");

    match users.get_effective_uid() {
        0 => Ok(()),
        _ => Err(ExporterError::NotRunningAsRoot),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uzers::mock::{
        Group,
        MockUsers,
        User,
    };
    use uzers::os::unix::UserExt;

    #[test]
    fn is_running_as_root_ok() {
        let mut users = MockUsers::with_current_uid(0);
        let user = User::new(0, "root", 0).with_home_dir("/root");
        users.add_user(user);
        users.add_group(Group::new(0, "wheel"));

        let is_root = is_running_as_root(&users);

        assert!(is_root.is_ok());
    }

    #[test]
    fn is_running_as_non_root() {
        let mut users = MockUsers::with_current_uid(1001);
        let user = User::new(1001, "yo", 1001).with_home_dir("/home/yo");
        users.add_user(user);
        users.add_group(Group::new(1001, "yo"));

        let is_root = is_running_as_root(&users);

        assert!(matches!(is_root, Err(ExporterError::NotRunningAsRoot)));
    }

    #[test]
    fn is_usable_enabled() {
        assert!(is_usable(RctlState::Enabled).is_ok());
    }

    #[test]
    fn is_usable_not_enabled() {
        let states = [
            RctlState::Disabled,
            RctlState::Jailed,
            RctlState::NotPresent,
        ];

        for state in states {
            let res = is_usable(state);

            assert!(matches!(res, Err(ExporterError::RctlUnavailable(_))));
        }
    }

    #[test]
    fn is_usable_disabled_message() {
        let err = is_usable(RctlState::Disabled).unwrap_err();

        assert_eq!(
            err.to_string(),
            "RACCT/RCTL: present, but disabled; enable using \
             kern.racct.enable=1 tunable",
        );
    }
}
