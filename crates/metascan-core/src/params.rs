//! Reader initialization parameters.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{ImportError, Result};
use crate::rule::RuleStore;

/// Initialization parameters for an import worker.
///
/// Textual parameters are keyed by name. The rule store rides along as a
/// shared handle rather than a string: it is built once per import run and
/// readers only ever look rules up, so a reference-counted read-only value
/// needs no synchronization.
#[derive(Debug, Clone, Default)]
pub struct ImportParams {
    values: HashMap<String, String>,
    rule_store: Option<Arc<RuleStore>>,
}

impl ImportParams {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a textual parameter, builder style.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Attach the rule store handle, builder style.
    pub fn with_rule_store(mut self, store: Arc<RuleStore>) -> Self {
        self.rule_store = Some(store);
        self
    }

    /// Set a textual parameter.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Remove a textual parameter.
    pub fn remove(&mut self, name: &str) {
        self.values.remove(name);
    }

    /// Look up an optional parameter.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Look up a mandatory parameter.
    pub fn require(&self, name: &str) -> Result<&str> {
        self.get(name)
            .ok_or_else(|| ImportError::ParameterMissing(name.to_string()))
    }

    /// The shared rule store, if one was attached.
    pub fn rule_store(&self) -> Option<Arc<RuleStore>> {
        self.rule_store.clone()
    }

    /// The shared rule store, required.
    pub fn require_rule_store(&self) -> Result<Arc<RuleStore>> {
        self.rule_store
            .clone()
            .ok_or_else(|| ImportError::ParameterMissing("ruleStore".to_string()))
    }
}
