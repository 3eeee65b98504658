//! Regex compilation for rule sets.
//!
//! Every pattern is compiled before the target file is read, so a typo in a
//! rule file fails the run without touching anything on disk.

use crate::rules::schema::{RuleDefinition, RuleSet, Substitution};
use regex::Regex;
use thiserror::Error;

#[derive(Error, Debug)]
#[error("rule '{rule_id}' has an invalid pattern `{pattern}`: {source}")]
pub struct PatternError {
    pub rule_id: String,
    pub pattern: String,
    #[source]
    pub source: regex::Error,
}

/// A rule whose substitutions are ready to run.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub id: String,
    pub substitutions: Vec<CompiledSubstitution>,
}

#[derive(Debug, Clone)]
pub struct CompiledSubstitution {
    pub regex: Regex,
    pub replacement: String,
}

impl CompiledRule {
    pub fn compile(rule: &RuleDefinition) -> Result<Self, PatternError> {
        let substitutions = rule
            .substitutions
            .iter()
            .map(|sub| CompiledSubstitution::compile(&rule.id, sub))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id: rule.id.clone(),
            substitutions,
        })
    }
}

impl CompiledSubstitution {
    fn compile(rule_id: &str, sub: &Substitution) -> Result<Self, PatternError> {
        let regex = Regex::new(&sub.pattern).map_err(|source| PatternError {
            rule_id: rule_id.to_string(),
            pattern: sub.pattern.clone(),
            source,
        })?;

        Ok(Self {
            regex,
            replacement: sub.replacement.clone(),
        })
    }
}

impl RuleSet {
    /// Compile all rules, preserving their order.
    pub fn compile(&self) -> Result<Vec<CompiledRule>, PatternError> {
        self.rules.iter().map(CompiledRule::compile).collect()
    }
}
