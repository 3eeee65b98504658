pub mod compile;
pub mod loader;
pub mod schema;

pub use compile::{CompiledRule, CompiledSubstitution, PatternError};
pub use loader::{builtin, load_from_path, load_from_str, RulesError};
pub use schema::{
    Metadata, RuleDefinition, RuleSet, Substitution, ValidationError, ValidationIssue,
    DEFAULT_TARGET,
};
