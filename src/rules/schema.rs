use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;

/// Relative path rewritten when neither the CLI nor the rule set names one.
pub const DEFAULT_TARGET: &str = "src/progress.rs";

#[derive(Debug, Deserialize, Default, Clone)]
pub struct RuleSet {
    #[serde(default)]
    pub meta: Metadata,
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
}

impl RuleSet {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();
        let mut seen = HashSet::new();

        if self.rules.is_empty() {
            issues.push(ValidationIssue::EmptyRuleList);
        }

        for rule in &self.rules {
            if rule.id.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    rule_id: None,
                    field: "id",
                });
            } else if !seen.insert(rule.id.as_str()) {
                issues.push(ValidationIssue::DuplicateId {
                    rule_id: rule.id.clone(),
                });
            }

            if rule.substitutions.is_empty() {
                issues.push(ValidationIssue::NoSubstitutions {
                    rule_id: rule.id.clone(),
                });
            }

            for substitution in &rule.substitutions {
                // Replacement may legitimately be empty (deletes the match).
                if substitution.pattern.is_empty() {
                    issues.push(ValidationIssue::MissingField {
                        rule_id: Some(rule.id.clone()),
                        field: "substitutions.pattern",
                    });
                }
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }

    /// Target path from the rule set metadata, falling back to [`DEFAULT_TARGET`].
    pub fn target(&self) -> &str {
        self.meta
            .target
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(DEFAULT_TARGET)
    }

    pub fn find(&self, id: &str) -> Option<&RuleDefinition> {
        self.rules.iter().find(|rule| rule.id == id)
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    /// Line printed on stdout after a successful apply.
    #[serde(default)]
    pub confirmation: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RuleDefinition {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub substitutions: Vec<Substitution>,
}

/// One regex find-and-replace. `replacement` uses `regex` template syntax
/// (`${1}`, `${name}`, `$$` for a literal dollar).
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub pattern: String,
    pub replacement: String,
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    EmptyRuleList,
    MissingField {
        rule_id: Option<String>,
        field: &'static str,
    },
    DuplicateId {
        rule_id: String,
    },
    NoSubstitutions {
        rule_id: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyRuleList => write!(f, "rule set contains no rules"),
            ValidationIssue::MissingField { rule_id, field } => match rule_id {
                Some(id) => write!(f, "rule '{id}' missing required field '{field}'"),
                None => write!(f, "rule missing required field '{field}'"),
            },
            ValidationIssue::DuplicateId { rule_id } => {
                write!(f, "rule id '{rule_id}' is defined more than once")
            }
            ValidationIssue::NoSubstitutions { rule_id } => {
                write!(f, "rule '{rule_id}' has no substitutions")
            }
        }
    }
}
