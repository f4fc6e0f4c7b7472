use crate::rules::RuleSet;
use crate::transform::TransformEngine;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Per-file result of a preview or execute pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// The file was renamed (or, in preview, would be).
    Renamed,
    /// The computed name equals the original; nothing to do.
    Unchanged,
    /// The target name is already taken; the source file is left untouched.
    SkippedCollision,
    /// The rename syscall failed, or the computed name is not usable as a
    /// file name.
    Failed,
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Renamed => "renamed",
            Self::Unchanged => "unchanged",
            Self::SkippedCollision => "skipped (collision)",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameOutcome {
    pub old_name: String,
    pub new_name: String,
    pub status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// The full ordered outcome list for one batch, plus the success count.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenameReport {
    pub outcomes: Vec<RenameOutcome>,
    pub renamed: usize,
}

impl RenameReport {
    fn push(
        &mut self,
        old_name: &str,
        new_name: String,
        status: OutcomeStatus,
        detail: Option<String>,
    ) {
        if status == OutcomeStatus::Renamed {
            self.renamed += 1;
        }
        self.outcomes.push(RenameOutcome {
            old_name: old_name.to_string(),
            new_name,
            status,
            detail,
        });
    }

    pub fn count(&self, status: OutcomeStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }
}

/// Applies a `RuleSet` across every regular file directly inside one
/// directory, either as a dry run (`preview`) or a real mutation
/// (`execute`).
///
/// Single-threaded and synchronous: a call runs the whole batch to
/// completion on the calling thread. The executor assumes single-writer
/// access to the directory namespace; callers must not run two `execute`
/// calls against the same directory at once.
#[derive(Debug)]
pub struct RenameExecutor {
    dir: PathBuf,
    files: Vec<String>,
}

impl RenameExecutor {
    /// Open a directory for batch renaming. Fails fast if the path is
    /// missing or not a directory; no per-file outcomes are produced in
    /// that case.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        let meta = fs::metadata(&dir)
            .with_context(|| format!("cannot access directory '{}'", dir.display()))?;
        if !meta.is_dir() {
            bail!("'{}' is not a directory", dir.display());
        }
        let mut executor = Self {
            dir,
            files: Vec::new(),
        };
        executor.refresh()?;
        Ok(executor)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The cached file listing the next batch will run over.
    pub fn files(&self) -> &[String] {
        &self.files
    }

    /// Re-enumerate the directory: regular files only, no recursion, names
    /// sorted so enumeration order is deterministic across platforms.
    /// Entries whose names are not valid UTF-8 are skipped.
    pub fn refresh(&mut self) -> Result<()> {
        let mut files = Vec::new();
        let entries = fs::read_dir(&self.dir)
            .with_context(|| format!("cannot read directory '{}'", self.dir.display()))?;
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                if let Ok(name) = entry.file_name().into_string() {
                    files.push(name);
                }
            }
        }
        files.sort();
        self.files = files;
        Ok(())
    }

    /// Compute outcomes without touching the filesystem. Collision checks
    /// simulate the directory namespace as the batch would mutate it, so
    /// the preview matches what `execute` would do.
    pub fn preview(&self, rules: &RuleSet) -> Result<RenameReport> {
        self.run(rules, false)
    }

    /// Rename the files. One file's failure never aborts the batch; the
    /// report carries a `Failed` outcome for it and processing continues.
    /// The directory is re-enumerated afterwards so subsequent calls see
    /// the post-rename state.
    pub fn execute(&mut self, rules: &RuleSet) -> Result<RenameReport> {
        let report = self.run(rules, true)?;
        self.refresh()?;
        Ok(report)
    }

    fn run(&self, rules: &RuleSet, mutate: bool) -> Result<RenameReport> {
        let engine = TransformEngine::compile(rules)?;

        // Names currently occupying the directory, regular files or not. A
        // target may collide with a subdirectory just as well as a file.
        let mut occupied: HashSet<String> = HashSet::new();
        let entries = fs::read_dir(&self.dir)
            .with_context(|| format!("cannot read directory '{}'", self.dir.display()))?;
        for entry in entries {
            occupied.insert(entry?.file_name().to_string_lossy().into_owned());
        }

        let mut report = RenameReport::default();

        for old_name in &self.files {
            let new_name = engine.apply(old_name);

            if new_name == *old_name {
                report.push(old_name, new_name, OutcomeStatus::Unchanged, None);
                continue;
            }

            if new_name.is_empty() || new_name.contains(std::path::is_separator) {
                report.push(
                    old_name,
                    new_name,
                    OutcomeStatus::Failed,
                    Some("rules produce an invalid file name".to_string()),
                );
                continue;
            }

            if occupied.contains(&new_name) {
                let detail = format!("target '{}' already exists", new_name);
                report.push(old_name, new_name, OutcomeStatus::SkippedCollision, Some(detail));
                continue;
            }

            if mutate {
                let from = self.dir.join(old_name);
                let to = self.dir.join(&new_name);
                match fs::rename(&from, &to) {
                    Ok(()) => {
                        occupied.remove(old_name);
                        occupied.insert(new_name.clone());
                        report.push(old_name, new_name, OutcomeStatus::Renamed, None);
                    },
                    Err(e) => {
                        report.push(old_name, new_name, OutcomeStatus::Failed, Some(e.to_string()));
                    },
                }
            } else {
                occupied.remove(old_name);
                occupied.insert(new_name.clone());
                report.push(old_name, new_name, OutcomeStatus::Renamed, None);
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{DuplicatePolicy, MappingRule, MatchMode, RuleSet};
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"contents").unwrap();
    }

    fn literal_rules(pattern: &str, replacement: &str) -> RuleSet {
        let mut rules = RuleSet::new();
        rules
            .add_rule(
                MappingRule::literal(pattern, replacement),
                DuplicatePolicy::Reject,
            )
            .unwrap();
        rules
    }

    #[test]
    fn test_missing_directory_fails_fast() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");
        assert!(RenameExecutor::new(&missing).is_err());
    }

    #[test]
    fn test_file_path_is_not_a_directory() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "a.txt");
        assert!(RenameExecutor::new(temp.path().join("a.txt")).is_err());
    }

    #[test]
    fn test_enumeration_is_sorted_and_files_only() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "b.txt");
        touch(temp.path(), "a.txt");
        fs::create_dir(temp.path().join("subdir")).unwrap();

        let executor = RenameExecutor::new(temp.path()).unwrap();
        assert_eq!(executor.files(), &["a.txt".to_string(), "b.txt".to_string()]);
    }

    #[test]
    fn test_preview_does_not_touch_filesystem() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "old.txt");

        let executor = RenameExecutor::new(temp.path()).unwrap();
        let report = executor.preview(&literal_rules("old", "new")).unwrap();

        assert_eq!(report.renamed, 1);
        assert_eq!(report.outcomes[0].status, OutcomeStatus::Renamed);
        assert_eq!(report.outcomes[0].new_name, "new.txt");
        assert!(temp.path().join("old.txt").exists());
        assert!(!temp.path().join("new.txt").exists());
    }

    #[test]
    fn test_execute_renames_and_refreshes() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "old.txt");

        let mut executor = RenameExecutor::new(temp.path()).unwrap();
        let report = executor.execute(&literal_rules("old", "new")).unwrap();

        assert_eq!(report.renamed, 1);
        assert!(!temp.path().join("old.txt").exists());
        assert!(temp.path().join("new.txt").exists());
        // Post-rename state is visible without reconstructing the executor
        assert_eq!(executor.files(), &["new.txt".to_string()]);
    }

    #[test]
    fn test_unchanged_files_reported_not_touched() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "keep.txt");

        let mut executor = RenameExecutor::new(temp.path()).unwrap();
        let report = executor.execute(&literal_rules("zzz", "x")).unwrap();

        assert_eq!(report.renamed, 0);
        assert_eq!(report.outcomes[0].status, OutcomeStatus::Unchanged);
        assert!(temp.path().join("keep.txt").exists());
    }

    #[test]
    fn test_collision_with_existing_file() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "old.txt");
        touch(temp.path(), "new.txt");

        let mut executor = RenameExecutor::new(temp.path()).unwrap();
        let report = executor.execute(&literal_rules("old", "new")).unwrap();

        let outcome = report
            .outcomes
            .iter()
            .find(|o| o.old_name == "old.txt")
            .unwrap();
        assert_eq!(outcome.status, OutcomeStatus::SkippedCollision);
        // The source is left untouched
        assert!(temp.path().join("old.txt").exists());
        assert!(temp.path().join("new.txt").exists());
    }

    #[test]
    fn test_collision_with_directory() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "old");
        fs::create_dir(temp.path().join("new")).unwrap();

        let executor = RenameExecutor::new(temp.path()).unwrap();
        let report = executor.preview(&literal_rules("old", "new")).unwrap();
        assert_eq!(report.outcomes[0].status, OutcomeStatus::SkippedCollision);
    }

    #[test]
    fn test_two_sources_one_target_first_wins() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "A.txt");
        touch(temp.path(), "a.txt");

        let mut rules = RuleSet::new();
        rules
            .add_rule(
                MappingRule::new("a", "x", MatchMode::Literal, false).unwrap(),
                DuplicatePolicy::Reject,
            )
            .unwrap();

        let mut executor = RenameExecutor::new(temp.path()).unwrap();
        let preview = executor.preview(&rules).unwrap();
        let report = executor.execute(&rules).unwrap();

        // Enumeration order winner: "A.txt" sorts first
        assert_eq!(report.outcomes[0].old_name, "A.txt");
        assert_eq!(report.outcomes[0].status, OutcomeStatus::Renamed);
        assert_eq!(report.outcomes[1].old_name, "a.txt");
        assert_eq!(report.outcomes[1].status, OutcomeStatus::SkippedCollision);
        assert!(temp.path().join("x.txt").exists());
        assert!(temp.path().join("a.txt").exists());

        // Preview predicted the same outcomes
        for (p, e) in preview.outcomes.iter().zip(report.outcomes.iter()) {
            assert_eq!(p.status, e.status);
            assert_eq!(p.new_name, e.new_name);
        }
    }

    #[test]
    fn test_rename_into_name_vacated_earlier_in_batch() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "1.txt");
        touch(temp.path(), "2.txt");

        // 1 -> 2 collides while 2 is still there; 2 -> 3 succeeds. Preview
        // and execute must agree on that.
        let mut rules = RuleSet::new();
        rules
            .add_rule(MappingRule::literal("2", "3"), DuplicatePolicy::Reject)
            .unwrap();
        rules
            .add_rule(MappingRule::literal("1", "2"), DuplicatePolicy::Reject)
            .unwrap();

        let mut executor = RenameExecutor::new(temp.path()).unwrap();
        let preview = executor.preview(&rules).unwrap();
        let report = executor.execute(&rules).unwrap();

        assert_eq!(preview.outcomes[0].status, report.outcomes[0].status);
        assert_eq!(preview.outcomes[1].status, report.outcomes[1].status);
    }

    #[test]
    fn test_invalid_target_name_reported_as_failed() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "old.txt");

        let executor = RenameExecutor::new(temp.path()).unwrap();
        let report = executor.preview(&literal_rules("old.txt", "")).unwrap();
        assert_eq!(report.outcomes[0].status, OutcomeStatus::Failed);
    }

    #[test]
    fn test_per_file_failure_does_not_abort_batch() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "a_one.txt");
        touch(temp.path(), "b_two.txt");

        let mut executor = RenameExecutor::new(temp.path()).unwrap();

        // Pull a file out from under the cached listing so its rename
        // syscall fails while the rest of the batch proceeds
        fs::remove_file(temp.path().join("a_one.txt")).unwrap();

        let report = executor.execute(&literal_rules("_", "-")).unwrap();

        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(report.outcomes[0].old_name, "a_one.txt");
        assert_eq!(report.outcomes[0].status, OutcomeStatus::Failed);
        assert!(report.outcomes[0].detail.is_some());
        assert_eq!(report.outcomes[1].status, OutcomeStatus::Renamed);
        assert!(temp.path().join("b-two.txt").exists());
    }

    #[test]
    fn test_rerun_with_prefix_rules_is_noop() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "photo.jpg");

        let mut rules = RuleSet::new();
        rules.prefix = "IMG_".to_string();

        let mut executor = RenameExecutor::new(temp.path()).unwrap();
        let first = executor.execute(&rules).unwrap();
        assert_eq!(first.renamed, 1);

        let second = executor.execute(&rules).unwrap();
        assert_eq!(second.renamed, 0);
        assert_eq!(second.outcomes[0].status, OutcomeStatus::Unchanged);
        assert!(temp.path().join("IMG_photo.jpg").exists());
    }
}
