/*!
 * File operation records and their application
 */

use std::fs;
use std::path::{Component, Path, PathBuf};

use strum::{Display, EnumString};

use crate::error::Result;
use crate::ensure;

/// Kind of a file operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OpKind {
    Create,
    Update,
    Delete,
}

/// A parsed file operation record
#[derive(Debug, Clone)]
pub struct FileOperation {
    /// What to do
    pub kind: OpKind,
    /// Target path, relative to the apply root
    pub path: String,
    /// Language tag carried by the record
    pub language: Option<String>,
    /// Human-readable change summary
    pub change_summary: Option<String>,
    /// New file content (absent for delete records)
    pub content: Option<String>,
}

/// Result of applying a single record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpOutcome {
    Created,
    Updated,
    Deleted,
    /// Create hit an existing file and left it alone
    SkippedExisting,
}

/// Aggregate counts over an apply run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplySummary {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl ApplySummary {
    /// Total number of records processed
    pub fn total(&self) -> usize {
        self.created + self.updated + self.deleted + self.skipped + self.failed
    }

    fn record(&mut self, outcome: OpOutcome) {
        match outcome {
            OpOutcome::Created => self.created += 1,
            OpOutcome::Updated => self.updated += 1,
            OpOutcome::Deleted => self.deleted += 1,
            OpOutcome::SkippedExisting => self.skipped += 1,
        }
    }
}

/// Applies operation records under a root directory
pub struct Applier {
    root: PathBuf,
    dry_run: bool,
}

impl Applier {
    /// Create a new applier
    pub fn new(root: impl Into<PathBuf>, dry_run: bool) -> Self {
        Self {
            root: root.into(),
            dry_run,
        }
    }

    /// Apply all records in document order
    ///
    /// Per-record failures are reported and do not stop the run.
    pub fn apply_all(&self, operations: &[FileOperation]) -> ApplySummary {
        let mut summary = ApplySummary::default();
        let prefix = if self.dry_run { "[dry-run] " } else { "" };

        for op in operations {
            match self.apply(op) {
                Ok(outcome) => {
                    summary.record(outcome);
                    println!("{}{}", prefix, describe(op, outcome));
                }
                Err(e) => {
                    summary.failed += 1;
                    eprintln!("{}{} {}: {}", prefix, op.kind, op.path, e);
                }
            }
        }

        summary
    }

    /// Apply a single record
    pub fn apply(&self, op: &FileOperation) -> Result<OpOutcome> {
        let target = self.resolve(&op.path)?;

        match op.kind {
            OpKind::Create => {
                if target.exists() {
                    return Ok(OpOutcome::SkippedExisting);
                }
                if !self.dry_run {
                    if let Some(parent) = target.parent() {
                        fs::create_dir_all(parent)?;
                    }
                    fs::write(&target, op.content.as_deref().unwrap_or(""))?;
                }
                Ok(OpOutcome::Created)
            }
            OpKind::Update => {
                ensure!(
                    target.is_file(),
                    Operation,
                    "cannot update missing file: {}",
                    op.path
                );
                if !self.dry_run {
                    fs::write(&target, op.content.as_deref().unwrap_or(""))?;
                }
                Ok(OpOutcome::Updated)
            }
            OpKind::Delete => {
                ensure!(
                    target.is_file(),
                    Operation,
                    "cannot delete missing file: {}",
                    op.path
                );
                if !self.dry_run {
                    fs::remove_file(&target)?;
                }
                Ok(OpOutcome::Deleted)
            }
        }
    }

    /// Resolve a record path against the root, rejecting escapes
    ///
    /// Payloads are untrusted input: absolute targets and `..` components
    /// are refused.
    fn resolve(&self, raw: &str) -> Result<PathBuf> {
        let rel = Path::new(raw);
        ensure!(!rel.is_absolute(), Operation, "absolute path rejected: {}", raw);
        ensure!(
            rel.components()
                .all(|c| !matches!(c, Component::ParentDir)),
            Operation,
            "path escapes the apply root: {}",
            raw
        );
        Ok(self.root.join(rel))
    }
}

fn describe(op: &FileOperation, outcome: OpOutcome) -> String {
    match outcome {
        OpOutcome::Created => format!("create {}: written", op.path),
        OpOutcome::Updated => format!("update {}: written", op.path),
        OpOutcome::Deleted => format!("delete {}: removed", op.path),
        OpOutcome::SkippedExisting => {
            format!("create {}: already exists, skipped", op.path)
        }
    }
}
