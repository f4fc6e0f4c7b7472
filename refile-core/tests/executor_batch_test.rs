use refile_core::{
    DuplicatePolicy, MappingRule, MatchMode, OutcomeStatus, RenameExecutor, RuleSet,
};
use std::fs;
use tempfile::TempDir;

fn touch(dir: &std::path::Path, name: &str) {
    fs::write(dir.join(name), name.as_bytes()).unwrap();
}

#[test]
fn batch_preview_then_execute_agree() {
    let temp = TempDir::new().unwrap();
    for name in ["IMG_001.jpg", "IMG_002.jpg", "notes.txt", "photo_001.jpg"] {
        touch(temp.path(), name);
    }

    let mut rules = RuleSet::new();
    rules
        .add_rule(MappingRule::literal("IMG_", "photo_"), DuplicatePolicy::Reject)
        .unwrap();

    let mut executor = RenameExecutor::new(temp.path()).unwrap();
    let preview = executor.preview(&rules).unwrap();
    let applied = executor.execute(&rules).unwrap();

    assert_eq!(preview.outcomes.len(), applied.outcomes.len());
    for (p, a) in preview.outcomes.iter().zip(applied.outcomes.iter()) {
        assert_eq!(p.old_name, a.old_name);
        assert_eq!(p.new_name, a.new_name);
        assert_eq!(p.status, a.status);
    }

    // IMG_001 collides with the existing photo_001; IMG_002 renames
    assert_eq!(applied.renamed, 1);
    assert_eq!(applied.count(OutcomeStatus::SkippedCollision), 1);
    assert_eq!(applied.count(OutcomeStatus::Unchanged), 2);
    assert!(temp.path().join("IMG_001.jpg").exists());
    assert!(temp.path().join("photo_002.jpg").exists());
}

#[test]
fn collision_loses_no_data() {
    let temp = TempDir::new().unwrap();
    touch(temp.path(), "a.txt");
    touch(temp.path(), "A.txt");

    let mut rules = RuleSet::new();
    rules
        .add_rule(
            MappingRule::new("a", "x", MatchMode::Literal, false).unwrap(),
            DuplicatePolicy::Reject,
        )
        .unwrap();

    let mut executor = RenameExecutor::new(temp.path()).unwrap();
    let report = executor.execute(&rules).unwrap();

    assert_eq!(report.renamed, 1);
    assert_eq!(report.count(OutcomeStatus::SkippedCollision), 1);

    // Both files still exist, one under its new name
    let mut names: Vec<_> = fs::read_dir(temp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    assert_eq!(names, vec!["a.txt".to_string(), "x.txt".to_string()]);

    // The contents of the skipped file were never touched
    assert_eq!(fs::read(temp.path().join("a.txt")).unwrap(), b"a.txt");
}

#[test]
fn executor_sees_post_rename_state() {
    let temp = TempDir::new().unwrap();
    touch(temp.path(), "one.txt");
    touch(temp.path(), "two.txt");

    let mut first_pass = RuleSet::new();
    first_pass
        .add_rule(MappingRule::literal("one", "uno"), DuplicatePolicy::Reject)
        .unwrap();

    let mut executor = RenameExecutor::new(temp.path()).unwrap();
    executor.execute(&first_pass).unwrap();
    assert_eq!(
        executor.files(),
        &["two.txt".to_string(), "uno.txt".to_string()]
    );

    let mut second_pass = RuleSet::new();
    second_pass
        .add_rule(MappingRule::literal("uno", "ein"), DuplicatePolicy::Reject)
        .unwrap();
    let report = executor.execute(&second_pass).unwrap();
    assert_eq!(report.renamed, 1);
    assert!(temp.path().join("ein.txt").exists());
}

#[test]
fn subdirectories_are_not_enumerated() {
    let temp = TempDir::new().unwrap();
    touch(temp.path(), "top.txt");
    fs::create_dir(temp.path().join("nested")).unwrap();
    touch(&temp.path().join("nested"), "inner.txt");

    let mut rules = RuleSet::new();
    rules.prefix = "x_".to_string();

    let mut executor = RenameExecutor::new(temp.path()).unwrap();
    let report = executor.execute(&rules).unwrap();

    assert_eq!(report.total(), 1);
    assert!(temp.path().join("x_top.txt").exists());
    // The directory itself and its contents are untouched
    assert!(temp.path().join("nested/inner.txt").exists());
}

#[test]
fn empty_directory_gives_empty_report() {
    let temp = TempDir::new().unwrap();
    let executor = RenameExecutor::new(temp.path()).unwrap();

    let mut rules = RuleSet::new();
    rules.prefix = "p".to_string();

    let report = executor.preview(&rules).unwrap();
    assert!(report.outcomes.is_empty());
    assert_eq!(report.renamed, 0);
}
