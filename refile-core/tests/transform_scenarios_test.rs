use refile_core::{DuplicatePolicy, MappingRule, MatchMode, RuleSet, TransformEngine};

fn engine(rules: &RuleSet) -> TransformEngine {
    TransformEngine::compile(rules).unwrap()
}

#[test]
fn scenario_literal_mapping_with_unicode_replacement() {
    let mut rules = RuleSet::new();
    rules
        .add_rule(MappingRule::literal("IMG_", "照片_"), DuplicatePolicy::Reject)
        .unwrap();

    assert_eq!(engine(&rules).apply("IMG_20231201.jpg"), "照片_20231201.jpg");
}

#[test]
fn scenario_prefix_already_present_is_unchanged() {
    let mut rules = RuleSet::new();
    rules.prefix = "IMG_".to_string();

    assert_eq!(engine(&rules).apply("IMG_photo.jpg"), "IMG_photo.jpg");
}

#[test]
fn scenario_delete_patterns_run_sequentially() {
    let mut rules = RuleSet::new();
    rules.set_delete_patterns("a,b");

    // Literal segment deletion, pattern by pattern, not a character class
    assert_eq!(engine(&rules).apply("cabbage"), "cge");
}

#[test]
fn scenario_regex_capture_groups() {
    let mut rules = RuleSet::new();
    rules
        .add_rule(
            MappingRule::new(r"\d{4}(\d{2})(\d{2})", r"\1月\2日", MatchMode::Regex, true).unwrap(),
            DuplicatePolicy::Reject,
        )
        .unwrap();

    assert_eq!(engine(&rules).apply("20231201"), "12月01日");
}

#[test]
fn chained_rules_see_earlier_output() {
    // The documented cascading behavior: rules run against the
    // progressively mutated string, not the original
    let mut rules = RuleSet::new();
    rules
        .add_rule(MappingRule::literal("report", "draft"), DuplicatePolicy::Reject)
        .unwrap();
    rules
        .add_rule(MappingRule::literal("draft", "final"), DuplicatePolicy::Reject)
        .unwrap();

    assert_eq!(engine(&rules).apply("report.doc"), "final.doc");
}

#[test]
fn full_pipeline_mapping_then_delete_then_affixes() {
    let mut rules = RuleSet::new();
    rules
        .add_rule(MappingRule::literal("DSC", "IMG"), DuplicatePolicy::Reject)
        .unwrap();
    rules.set_delete_patterns("_tmp, copy");
    rules.prefix = "2023_".to_string();
    rules.suffix = "_web".to_string();

    let engine = engine(&rules);
    assert_eq!(engine.apply("DSC_tmp1234copy.jpg"), "2023_IMG1234_web.jpg");
    // A second pass over the result is a no-op
    assert_eq!(engine.apply("2023_IMG1234_web.jpg"), "2023_IMG1234_web.jpg");
}

#[test]
fn case_insensitive_literal_discards_match_casing() {
    let mut rules = RuleSet::new();
    rules
        .add_rule(
            MappingRule::new("vacation", "trip", MatchMode::Literal, false).unwrap(),
            DuplicatePolicy::Reject,
        )
        .unwrap();

    let engine = engine(&rules);
    assert_eq!(engine.apply("VACATION_01.jpg"), "trip_01.jpg");
    assert_eq!(engine.apply("Vacation_02.jpg"), "trip_02.jpg");
}

#[test]
fn no_rules_means_no_change() {
    let rules = RuleSet::new();
    assert_eq!(engine(&rules).apply("anything.txt"), "anything.txt");
}
