use crate::rules::schema::{RuleSet, ValidationError};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

const BUILTIN_RULES: &str = include_str!("../../rules/progress.toml");

#[derive(Debug)]
pub enum RulesError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Toml {
        path: Option<PathBuf>,
        source: toml_edit::de::Error,
    },
    Validation {
        path: Option<PathBuf>,
        source: ValidationError,
    },
}

impl RulesError {
    fn with_path(self, path: &Path) -> Self {
        let path = path.to_path_buf();
        match self {
            RulesError::Toml { path: None, source } => RulesError::Toml {
                path: Some(path),
                source,
            },
            RulesError::Validation { path: None, source } => RulesError::Validation {
                path: Some(path),
                source,
            },
            other => other,
        }
    }
}

impl fmt::Display for RulesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RulesError::Io { path, source } => {
                write!(f, "failed to read rule set from {}: {}", path.display(), source)
            }
            RulesError::Toml { path, source } => match path {
                Some(path) => write!(
                    f,
                    "failed to parse rule set TOML ({}): {}",
                    path.display(),
                    source
                ),
                None => write!(f, "failed to parse rule set TOML: {}", source),
            },
            RulesError::Validation { path, source } => match path {
                Some(path) => write!(f, "invalid rule set ({}): {}", path.display(), source),
                None => write!(f, "invalid rule set: {}", source),
            },
        }
    }
}

impl std::error::Error for RulesError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RulesError::Io { source, .. } => Some(source),
            RulesError::Toml { source, .. } => Some(source),
            RulesError::Validation { source, .. } => Some(source),
        }
    }
}

pub fn load_from_str(input: &str) -> Result<RuleSet, RulesError> {
    let rules: RuleSet = toml_edit::de::from_str(input)
        .map_err(|source| RulesError::Toml { path: None, source })?;
    rules
        .validate()
        .map_err(|source| RulesError::Validation { path: None, source })?;
    Ok(rules)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<RuleSet, RulesError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| RulesError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&contents).map_err(|error| error.with_path(path))
}

/// The progress tracker migration shipped with the binary.
pub fn builtin() -> Result<RuleSet, RulesError> {
    load_from_str(BUILTIN_RULES)
}
