use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use progress_patcher::rules::{self, RuleSet};
use progress_patcher::workspace::{resolve_target, resolve_workspace};
use progress_patcher::{load, TextPatcher, WriteMode};
use similar::{ChangeTag, TextDiff};
use std::path::{Path, PathBuf};

const DEFAULT_CONFIRMATION: &str = "Fixed progress.rs methods";

#[derive(Parser)]
#[command(name = "progress-patcher")]
#[command(
    about = "Rewrite progress tracker methods from &mut self to RefCell-backed &self",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// Path to workspace root (defaults to the current directory)
    #[arg(short, long, global = true)]
    workspace: Option<PathBuf>,

    /// File to patch, relative to the workspace (defaults to the rule set target)
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    /// Rule set TOML to use instead of the built-in progress migration
    #[arg(short, long, global = true)]
    rules: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply the rules to the target file (default)
    Apply {
        /// Dry run - show what would be changed without modifying the file
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,
    },

    /// Report per-rule match counts without modifying the file
    Status,

    /// Fail if any rule still matches the target file
    Verify,

    /// List the rules in application order
    List,
}

fn main() -> Result<()> {
    progress_patcher::logging::init();

    let cli = Cli::parse();
    let rule_set = load_rules(cli.rules.as_deref())?;

    let command = cli.command.unwrap_or(Commands::Apply {
        dry_run: false,
        diff: false,
    });

    match command {
        Commands::Apply { dry_run, diff } => {
            let (patcher, target) = prepare(cli.workspace, cli.file, &rule_set)?;
            cmd_apply(&patcher, &rule_set, &target, dry_run, diff)
        }
        Commands::Status => {
            let (patcher, target) = prepare(cli.workspace, cli.file, &rule_set)?;
            cmd_status(&patcher, &target)
        }
        Commands::Verify => {
            let (patcher, target) = prepare(cli.workspace, cli.file, &rule_set)?;
            cmd_verify(&patcher, &target)
        }
        Commands::List => cmd_list(&rule_set),
    }
}

fn load_rules(path: Option<&Path>) -> Result<RuleSet> {
    let rule_set = match path {
        Some(path) => rules::load_from_path(path)?,
        None => rules::builtin().context("built-in rule set is invalid")?,
    };
    Ok(rule_set)
}

/// Helper: compile the rules and resolve `--file` (or the rule set target)
/// against the workspace.
fn prepare(
    workspace: Option<PathBuf>,
    file: Option<PathBuf>,
    rule_set: &RuleSet,
) -> Result<(TextPatcher, PathBuf)> {
    let patcher = TextPatcher::from_rule_set(rule_set)?;

    let workspace = resolve_workspace(workspace.clone()).with_context(|| match &workspace {
        Some(path) => format!("could not resolve workspace {}", path.display()),
        None => "could not determine workspace".to_string(),
    })?;

    let file = file.unwrap_or_else(|| PathBuf::from(rule_set.target()));
    Ok((patcher, resolve_target(&workspace, &file)))
}

/// Helper: Show unified diff between original and modified content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (patched)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
}

fn cmd_apply(
    patcher: &TextPatcher,
    rule_set: &RuleSet,
    target: &Path,
    dry_run: bool,
    show_diff: bool,
) -> Result<()> {
    let mode = if dry_run {
        WriteMode::DryRun
    } else {
        WriteMode::Overwrite
    };

    let result = patcher.patch_file(target, mode)?;

    if show_diff && result.report.changed {
        display_diff(&result.path, &result.original, &result.patched);
    }

    if dry_run {
        println!(
            "{} Would rewrite {} ({} matches, nothing written)",
            "[DRY RUN]".cyan(),
            result.path.display(),
            result.report.total_matches()
        );
    } else {
        println!(
            "{}",
            rule_set
                .meta
                .confirmation
                .as_deref()
                .unwrap_or(DEFAULT_CONFIRMATION)
        );
    }

    Ok(())
}

fn cmd_status(patcher: &TextPatcher, target: &Path) -> Result<()> {
    let text = load(target)?;
    let (_, report) = patcher.patch_text(&text);

    println!("{}", "Rule Status Report".bold());
    println!("File: {}", target.display());
    println!();

    for outcome in &report.rules {
        if outcome.matches > 0 {
            println!(
                "{} {}: {} matches",
                "⊙".yellow(),
                outcome.id,
                outcome.matches
            );
        } else {
            println!("{} {}: no matches", "✓".green(), outcome.id);
        }
    }

    println!();
    if report.changed {
        println!("{}", "File would change on apply".yellow());
    } else {
        println!("{}", "File is unchanged by the rules".green());
    }

    Ok(())
}

fn cmd_verify(patcher: &TextPatcher, target: &Path) -> Result<()> {
    let text = load(target)?;
    let (_, report) = patcher.patch_text(&text);

    println!("{}", "Verifying rules...".bold());
    println!("File: {}", target.display());
    println!();

    let pending: Vec<&str> = report.pending().collect();
    for outcome in &report.rules {
        if outcome.matches > 0 {
            eprintln!("{} {}: MISMATCH", "✗".red(), outcome.id);
            eprintln!("  Still matches {} location(s)", outcome.matches);
        } else {
            println!("{} {}: Verified", "✓".green(), outcome.id);
        }
    }

    println!();
    println!("{}", "Summary:".bold());
    println!(
        "  {} verified",
        format!("{}", report.rules.len() - pending.len()).green()
    );
    println!("  {} mismatch", format!("{}", pending.len()).red());

    if !pending.is_empty() {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_list(rule_set: &RuleSet) -> Result<()> {
    let name = if rule_set.meta.name.is_empty() {
        "(unnamed)"
    } else {
        rule_set.meta.name.as_str()
    };
    println!("{} {}", "Rule set:".bold(), name);
    if let Some(description) = &rule_set.meta.description {
        println!("{}", description.dimmed());
    }
    println!("Target: {}", rule_set.target());
    println!();

    for (idx, rule) in rule_set.rules.iter().enumerate() {
        match &rule.description {
            Some(description) => println!("{}. {} - {}", idx + 1, rule.id.bold(), description),
            None => println!("{}. {}", idx + 1, rule.id.bold()),
        }
        for sub in &rule.substitutions {
            println!(
                "     {} {} {}",
                sub.pattern.dimmed(),
                "=>".cyan(),
                sub.replacement.dimmed()
            );
        }
    }

    Ok(())
}
