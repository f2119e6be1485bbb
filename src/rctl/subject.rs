// subject: Accounting subjects and the filter rules that select them.
#![forbid(unsafe_code)]
use super::errors::RctlError;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// The accounting scopes that RACCT tracks usage for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Subject {
    Process,
    User,
    Jail,
    LoginClass,
}

impl Subject {
    pub const ALL: [Self; 4] = [
        Self::Process,
        Self::User,
        Self::Jail,
        Self::LoginClass,
    ];

    /// The subject token as understood by rctl(8).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Process    => "process",
            Self::User       => "user",
            Self::Jail       => "jail",
            Self::LoginClass => "loginclass",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Subject {
    type Err = RctlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|subject| subject.as_str() == s)
            .ok_or_else(|| RctlError::UnsupportedSubject(s.to_owned()))
    }
}

/// A single `subject:pattern` rule with its pattern already compiled.
#[derive(Clone, Debug)]
pub struct FilterRule {
    subject: Subject,
    pattern: Regex,
}

impl FilterRule {
    pub fn subject(&self) -> Subject {
        self.subject
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Unanchored search of the pattern within `name`.
    pub fn is_match(&self, name: &str) -> bool {
        self.pattern.is_match(name)
    }

    /// Parses a comma separated list of rules, as given on the command line.
    pub fn parse_list(expression: &str) -> Result<Vec<Self>, RctlError> {
        debug!("Parsing filter expression: {expression}");

        let rules = expression
            .split(',')
            .map(str::trim)
            .filter(|rule| !rule.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<Self>, RctlError>>()?;

        if rules.is_empty() {
            return Err(RctlError::EmptyFilter);
        }

        Ok(rules)
    }
}

impl fmt::Display for FilterRule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.subject, self.pattern)
    }
}

impl FromStr for FilterRule {
    type Err = RctlError;

    // Only the first colon separates the subject, the pattern may contain
    // more of them.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((subject, pattern)) = s.split_once(':') else {
            return Err(RctlError::InvalidRule(s.to_owned()));
        };

        let subject = subject.parse::<Subject>()?;
        let pattern = Regex::new(pattern).map_err(|source| {
            RctlError::InvalidPattern {
                rule: s.to_owned(),
                source,
            }
        })?;

        Ok(Self {
            subject,
            pattern,
        })
    }
}
