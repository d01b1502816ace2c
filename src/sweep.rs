//! One sweep run: scanning, sizing, confirmation, deletion.
//!
//! The run never talks to the terminal itself. Everything interactive goes
//! through [`Interaction`], and the caller turns the returned [`Outcome`]
//! into output and an exit status.

use crate::cleaner::{self, ReclamationResult, SizedMatch};
use crate::error::SweepError;
use crate::scanner;
use std::io;
use std::path::{Path, PathBuf};

pub const DEFAULT_TARGET: &str = "node_modules";

#[derive(Debug, Clone)]
pub struct SweepConfig {
    pub root: PathBuf,
    pub name: String,
    pub force: bool,
    pub dry_run: bool,
}

impl SweepConfig {
    pub fn new(root: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            name: name.into(),
            force: false,
            dry_run: false,
        }
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Sized, non-nested matches under a resolved root.
#[derive(Debug, Clone)]
pub struct Plan {
    pub root: PathBuf,
    pub name: String,
    pub matches: Vec<SizedMatch>,
}

impl Plan {
    pub fn total_size(&self) -> u64 {
        self.matches.iter().map(|m| m.size_bytes).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }
}

#[derive(Debug)]
pub enum Outcome {
    NothingFound(Plan),
    DryRun(Plan),
    Aborted(Plan),
    Completed {
        plan: Plan,
        result: ReclamationResult,
    },
}

/// Hooks into the caller's UI. Only `confirm` is required.
pub trait Interaction {
    /// Called once matches are sized, before any confirmation.
    fn planned(&mut self, _plan: &Plan) {}

    /// Never called when the config forces deletion.
    fn confirm(&mut self, plan: &Plan) -> io::Result<bool>;

    fn deleting(&mut self, _plan: &Plan) {}

    fn item_done(&mut self, _item: &SizedMatch, _outcome: Result<(), &io::Error>) {}
}

/// Absolute, symlink-free form of the scan root.
pub fn resolve_root(root: &Path) -> Result<PathBuf, SweepError> {
    root.canonicalize().map_err(|e| SweepError::io(root, e))
}

/// Resolves the root, finds matches, drops nested ones and sizes the rest.
pub fn scan(config: &SweepConfig) -> Result<Plan, SweepError> {
    scanner::validate_name(&config.name)?;
    let root = resolve_root(&config.root)?;

    tracing::info!(root = %root.display(), name = %config.name, "scanning");
    let candidates = scanner::find_matches(&root, &config.name)?;
    let found = candidates.len();
    let paths = scanner::remove_nested(candidates);
    if paths.len() != found {
        tracing::warn!(dropped = found - paths.len(), "nested matches removed");
    }

    tracing::info!(matches = paths.len(), "sizing");
    let matches = paths.into_iter().map(SizedMatch::measure).collect();

    Ok(Plan {
        root,
        name: config.name.clone(),
        matches,
    })
}

pub fn run(config: &SweepConfig, ui: &mut impl Interaction) -> Result<Outcome, SweepError> {
    let plan = scan(config)?;

    if plan.is_empty() {
        return Ok(Outcome::NothingFound(plan));
    }
    ui.planned(&plan);
    if config.dry_run {
        return Ok(Outcome::DryRun(plan));
    }

    let confirmed = config.force
        || ui.confirm(&plan).unwrap_or_else(|error| {
            tracing::warn!(%error, "could not read confirmation, treating as no");
            false
        });
    if !confirmed {
        tracing::info!("deletion declined");
        return Ok(Outcome::Aborted(plan));
    }

    tracing::info!(matches = plan.matches.len(), "deleting");
    ui.deleting(&plan);
    let result = cleaner::reclaim_with(&plan.matches, true, cleaner::remove_match, |item, outcome| {
        ui.item_done(item, outcome)
    });
    tracing::info!(
        deleted = result.deleted,
        failed = result.failed,
        bytes_freed = result.bytes_freed,
        "done"
    );

    Ok(Outcome::Completed { plan, result })
}
