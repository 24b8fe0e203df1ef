//! Import rules: category and name keyed templates for type mapping.
//!
//! A rule translates a raw scanned type into a target system's type
//! notation. Rules are grouped two levels deep: a category (for example
//! `data-type`, `common-type`, `namespace`) and, within it, a rule name
//! (usually the raw type token). Templates may carry placeholders
//! (`%type%`, `%size%`, `%scale%`, `%usage%`, `%prefix%`, `%schema%`) and
//! arithmetic expressions between `[!` and `!]`, evaluated by [`engine`].
//!
//! ```text
//! Category        Name        Rule Specification
//! ------------------------------------------------------
//! "data-type"     "SNUM"      "%type%(%size%,%scale%)"
//! "common-type"   "SNUM"      "DECIMAL([!%size%-%scale%!],%scale%)"
//! "namespace"     "name"      "%prefix%.%schema%"
//! ```
//!
//! A store is populated once per import run and is read-only afterwards.

pub mod engine;

use std::collections::HashMap;

/// Rules of a single category, keyed by rule name.
#[derive(Debug, Clone, Default)]
pub struct RuleMap {
    rules: HashMap<String, String>,
}

impl RuleMap {
    /// Create an empty rule map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule. An existing entry with the same name is overwritten.
    pub fn add_rule(&mut self, name: impl Into<String>, rule: impl Into<String>) {
        self.rules.insert(name.into(), rule.into());
    }

    /// The rule specification registered under `name`.
    pub fn rule(&self, name: &str) -> Option<&str> {
        self.rules.get(name).map(String::as_str)
    }

    /// Number of rules in this map.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True when the map holds no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// All rules of one group, keyed by category.
#[derive(Debug, Clone, Default)]
pub struct RuleStore {
    categories: HashMap<String, RuleMap>,
}

impl RuleStore {
    /// Create an empty rule store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule under the given category and name.
    pub fn add_rule(
        &mut self,
        category: impl Into<String>,
        name: impl Into<String>,
        rule: impl Into<String>,
    ) {
        self.categories
            .entry(category.into())
            .or_default()
            .add_rule(name, rule);
    }

    /// All rules of a category.
    pub fn rules_by_category(&self, category: &str) -> Option<&RuleMap> {
        self.categories.get(category)
    }

    /// The rule specification for the given category and name.
    pub fn rule(&self, category: &str, name: &str) -> Option<&str> {
        self.categories
            .get(category)
            .and_then(|map| map.rule(name))
    }
}
