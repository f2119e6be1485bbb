// manager: Drives enumeration, filtering, querying and parsing for every
//          configured rule, and holds the resulting snapshot.
#![forbid(unsafe_code)]
use super::errors::RctlError;
use super::query::{
    self,
    AccountingQuery,
};
use super::resource::{
    Identity,
    Resource,
};
use super::source::Sources;
use super::subject::FilterRule;
use tracing::{
    debug,
    debug_span,
    dispatcher,
    Dispatch,
};

/// Owns the filter rules and the latest successfully collected snapshot.
///
/// Not synchronised internally, callers that share a manager between
/// threads must hold a lock across `refresh` and reading `resources`.
#[derive(Debug)]
pub struct ResourceManager {
    rules:       Vec<FilterRule>,
    sources:     Sources,
    query:       Box<dyn AccountingQuery>,
    dispatch:    Dispatch,
    max_matches: Option<usize>,
    resources:   Vec<Resource>,
}

impl ResourceManager {
    /// Returns a new manager with an empty snapshot.
    ///
    /// Logging goes to whichever dispatcher is the default at the time of
    /// construction, unless another is given via `dispatch`.
    pub fn new(
        rules: Vec<FilterRule>,
        sources: Sources,
        query: Box<dyn AccountingQuery>,
    ) -> Self {
        Self {
            rules,
            sources,
            query,
            dispatch:    dispatcher::get_default(Dispatch::clone),
            max_matches: None,
            resources:   Vec::new(),
        }
    }

    /// Sets the dispatcher that every refresh logs through.
    pub fn dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = dispatch;
        self
    }

    /// Caps the number of candidates a single rule may match. A rule going
    /// over the cap fails the refresh before anything is queried for it.
    pub fn max_matches(mut self, max_matches: Option<usize>) -> Self {
        debug!("Setting max matches per rule to: {max_matches:?}");

        self.max_matches = max_matches;
        self
    }

    pub fn rules(&self) -> &[FilterRule] {
        &self.rules
    }

    /// The snapshot built by the last successful refresh.
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Rebuilds the snapshot from scratch.
    ///
    /// On error the previous snapshot is kept and the error returned.
    pub fn refresh(&mut self) -> Result<(), RctlError> {
        let resources = dispatcher::with_default(&self.dispatch, || {
            self.collect()
        })?;

        self.resources = resources;

        Ok(())
    }

    fn collect(&self) -> Result<Vec<Resource>, RctlError> {
        debug!("Collecting resources for {} rules", self.rules.len());

        let mut resources = Vec::new();

        for rule in &self.rules {
            let span = debug_span!("rule", rule = %rule);
            let _enter = span.enter();

            let matched = self.matching_candidates(rule)?;

            for identity in matched {
                resources.push(self.query_resource(identity)?);
            }
        }

        debug!("Collected {} resources", resources.len());

        Ok(resources)
    }

    // Enumerates the rule's subject and keeps the candidates whose name
    // matches the pattern.
    fn matching_candidates(
        &self,
        rule: &FilterRule,
    ) -> Result<Vec<Identity>, RctlError> {
        let candidates = self.sources.get(rule.subject()).candidates()?;
        let total = candidates.len();

        let matched: Vec<Identity> = candidates
            .into_iter()
            .filter(|candidate| rule.is_match(candidate.match_name()))
            .collect();

        debug!("{} of {} candidates matched", matched.len(), total);

        match self.max_matches {
            Some(limit) if matched.len() > limit => {
                Err(RctlError::MatchLimitExceeded {
                    rule:    rule.to_string(),
                    matched: matched.len(),
                    limit,
                })
            },
            _ => Ok(matched),
        }
    }

    // Queries and parses usage for a single entity. Any query failure,
    // including the entity having exited since enumeration, fails the
    // refresh.
    fn query_resource(&self, identity: Identity) -> Result<Resource, RctlError> {
        let rule = identity.rule();

        let raw = query::get_racct(self.query.as_ref(), &rule)?;

        let resource = Resource::new(identity, raw);
        let usage = resource.usage();

        debug!(
            "{}: cputime={} memoryuse={} wallclock={}",
            rule,
            usage.cputime,
            usage.memoryuse,
            usage.wallclock,
        );

        Ok(resource)
    }
}
