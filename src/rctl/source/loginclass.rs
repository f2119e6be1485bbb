// loginclass: Enumerates login classes from login.conf(5).
#![forbid(unsafe_code)]
use super::{
    read_source,
    Enumerate,
};
use crate::rctl::errors::RctlError;
use crate::rctl::resource::Identity;
use std::path::PathBuf;

/// Reads login class names out of a login.conf(5) style file.
#[derive(Debug)]
pub struct LoginClassConfig {
    path: PathBuf,
}

impl LoginClassConfig {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
        }
    }
}

impl Enumerate for LoginClassConfig {
    fn candidates(&self) -> Result<Vec<Identity>, RctlError> {
        let login_conf = read_source("login class database", &self.path)?;

        Ok(parse_login_conf(&login_conf))
    }
}

// Each class starts on an unindented line as `name|alias|...:cap:...`.
// Indented lines continue the capabilities of the class above.
fn parse_login_conf(login_conf: &str) -> Vec<Identity> {
    login_conf
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter(|line| !line.starts_with('#'))
        .filter(|line| !line.starts_with(char::is_whitespace))
        .filter_map(|line| {
            let names = line.split(':').next()?;
            let name = names.split('|').next()?;

            Some(Identity::LoginClass {
                name: name.to_owned(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    const LOGIN_CONF: &str = indoc!(
        r#"
        # login.conf - login class capabilities database.
        #
        default:\
        	:passwd_format=sha512:\
        	:copyright=/etc/COPYRIGHT:\
        	:umask=022:

        #
        # A collection of common class names
        #
        standard:\
        	:tc=default:
        xuser:\
        	:tc=default:
        staff:\
        	:tc=default:
        daemon:\
          :memorylocked=128M:\
          :tc=default:
        russian|Russian Users Accounts:\
        	:charset=UTF-8:\
        	:lang=ru_RU.UTF-8:\
        	:tc=default:
        "#
    );

    fn names(classes: &[Identity]) -> Vec<&str> {
        classes.iter().map(Identity::match_name).collect()
    }

    #[test]
    fn parse_login_conf_ok() {
        let classes = parse_login_conf(LOGIN_CONF);

        assert_eq!(names(&classes), vec![
            "default",
            "standard",
            "xuser",
            "staff",
            "daemon",
            "russian",
        ]);
    }

    #[test]
    fn parse_login_conf_without_capabilities() {
        let classes = parse_login_conf("minimal\nother|alias\n");

        assert_eq!(names(&classes), vec!["minimal", "other"]);
    }

    #[test]
    fn candidates_missing_file() {
        let res = LoginClassConfig::new("/nonexistent/login.conf")
            .candidates();

        assert!(matches!(res, Err(RctlError::SourceUnavailable { .. })));
    }
}
