//! Load, rewrite, store.
//!
//! [`TextPatcher`] folds an ordered list of compiled rules over the whole
//! contents of one file. Each substitution sees the output of the previous
//! one; a rule that matches nothing leaves the text untouched.

use crate::rules::{CompiledRule, PatternError, RuleSet};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum PatchError {
    #[error("failed to read {}: {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {}", .path.display(), .source)]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Match counts for one rule, summed over its substitutions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome {
    pub id: String,
    pub matches: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[must_use = "PatchReport should be checked to see whether anything changed"]
pub struct PatchReport {
    pub rules: Vec<RuleOutcome>,
    pub changed: bool,
}

impl PatchReport {
    pub fn total_matches(&self) -> usize {
        self.rules.iter().map(|r| r.matches).sum()
    }

    /// Ids of rules that matched at least once.
    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.rules
            .iter()
            .filter(|r| r.matches > 0)
            .map(|r| r.id.as_str())
    }
}

/// Result of patching a single file.
#[derive(Debug, Clone)]
pub struct FilePatch {
    pub path: PathBuf,
    pub original: String,
    pub patched: String,
    pub report: PatchReport,
}

/// Whether [`TextPatcher::patch_file`] writes its result back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Overwrite,
    DryRun,
}

#[derive(Debug, Clone)]
pub struct TextPatcher {
    rules: Vec<CompiledRule>,
}

impl TextPatcher {
    pub fn new(rules: Vec<CompiledRule>) -> Self {
        Self { rules }
    }

    pub fn from_rule_set(rules: &RuleSet) -> Result<Self, PatternError> {
        Ok(Self::new(rules.compile()?))
    }

    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    /// Apply every rule to `text`, returning the rewritten text and per-rule counts.
    pub fn patch_text(&self, text: &str) -> (String, PatchReport) {
        let (patched, rules) = fold_rules(text.to_string(), &self.rules);
        let changed = patched != text;
        (patched, PatchReport { rules, changed })
    }

    /// Load `path`, rewrite it, and (unless dry-running) overwrite it in place.
    ///
    /// The file is rewritten even when no rule matched; the content is then
    /// identical to what was read.
    pub fn patch_file(&self, path: &Path, mode: WriteMode) -> Result<FilePatch, PatchError> {
        let original = load(path)?;
        let (patched, report) = self.patch_text(&original);

        debug!(
            path = %path.display(),
            matches = report.total_matches(),
            changed = report.changed,
            "rewrote source text"
        );

        if mode == WriteMode::Overwrite {
            store(path, &patched)?;
            info!(path = %path.display(), "wrote patched file");
        }

        Ok(FilePatch {
            path: path.to_path_buf(),
            original,
            patched,
            report,
        })
    }
}

/// Read the whole file as UTF-8.
pub fn load(path: impl AsRef<Path>) -> Result<String, PatchError> {
    let path = path.as_ref();
    fs::read_to_string(path).map_err(|source| PatchError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Apply `rules` in order; each rule rewrites the output of the one before it.
pub fn apply_rules(text: String, rules: &[CompiledRule]) -> String {
    fold_rules(text, rules).0
}

fn fold_rules(mut text: String, rules: &[CompiledRule]) -> (String, Vec<RuleOutcome>) {
    let mut outcomes = Vec::with_capacity(rules.len());

    for rule in rules {
        let mut matches = 0;
        for sub in &rule.substitutions {
            let count = sub.regex.find_iter(&text).count();
            if count == 0 {
                continue;
            }
            matches += count;
            text = sub
                .regex
                .replace_all(&text, sub.replacement.as_str())
                .into_owned();
        }

        debug!(rule = %rule.id, matches, "applied rule");
        outcomes.push(RuleOutcome {
            id: rule.id.clone(),
            matches,
        });
    }

    (text, outcomes)
}

/// Overwrite `path` with `text`. No backup of the previous content is kept.
///
/// Symlinks are written through to the file they point at. A read-only target
/// is a write error even when its directory is writable.
pub fn store(path: impl AsRef<Path>, text: &str) -> Result<(), PatchError> {
    let path = path.as_ref();
    write_target(path, text.as_bytes()).map_err(|source| PatchError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn write_target(path: &Path, content: &[u8]) -> io::Result<()> {
    let target = match fs::canonicalize(path) {
        Ok(resolved) => resolved,
        Err(err) if err.kind() == io::ErrorKind::NotFound => path.to_path_buf(),
        Err(err) => return Err(err),
    };

    let metadata = match fs::metadata(&target) {
        Ok(metadata) => Some(metadata),
        Err(err) if err.kind() == io::ErrorKind::NotFound => None,
        Err(err) => return Err(err),
    };

    if let Some(metadata) = &metadata {
        if metadata.permissions().readonly() {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "target file is read-only",
            ));
        }
        // Renaming over a hard-linked file would detach it from its other names.
        if link_count(metadata) > 1 {
            debug!(path = %target.display(), "hard-linked target, writing in place");
            return fs::write(&target, content);
        }
    }

    atomic_write(&target, content, metadata.as_ref())
}

#[cfg(unix)]
fn link_count(metadata: &fs::Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;
    metadata.nlink()
}

#[cfg(not(unix))]
fn link_count(_metadata: &fs::Metadata) -> u64 {
    1
}

/// Tempfile in the same directory, fsync, rename over the target.
///
/// A failed write leaves the previous file intact instead of truncated.
fn atomic_write(path: &Path, content: &[u8], existing: Option<&fs::Metadata>) -> io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;

    // NamedTempFile is created 0600; keep the target's mode.
    if let Some(metadata) = existing {
        fs::set_permissions(temp.path(), metadata.permissions())?;
    }

    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
