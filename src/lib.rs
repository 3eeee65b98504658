//! Progress Patcher: one-shot regex migration for a progress tracker
//!
//! Rewrites a `ProgressTracker` whose methods take `&mut self` and whose bars
//! are plain `Option<ProgressBar>` fields into one with `&self` methods and
//! `RefCell<Option<ProgressBar>>` fields.
//!
//! # Pipeline
//!
//! load → apply rules in order → store. Every rule rewrites the output of the
//! rule before it, so order matters. A rule that matches nothing is a no-op.
//! The result is not re-parsed; this is text substitution, not refactoring.
//!
//! # Example
//!
//! ```
//! use progress_patcher::{rules, TextPatcher};
//!
//! let patcher = TextPatcher::from_rule_set(&rules::builtin().unwrap()).unwrap();
//! let (out, report) = patcher.patch_text("if let Some(pb) = &self.rename_bar {");
//!
//! assert_eq!(out, "if let Some(pb) = self.rename_bar.borrow().as_ref() {");
//! assert!(report.changed);
//! ```

pub mod logging;
pub mod patcher;
pub mod rules;
pub mod workspace;

// Re-exports
pub use patcher::{
    apply_rules, load, store, FilePatch, PatchError, PatchReport, RuleOutcome, TextPatcher,
    WriteMode,
};
pub use rules::{
    builtin, load_from_path, load_from_str, CompiledRule, PatternError, RuleSet, RulesError,
};
pub use workspace::{resolve_target, resolve_workspace};
