use anyhow::{bail, Context, Result};
use refile_core::{Config, DuplicatePolicy, MappingRule, MatchMode, RuleDocument, RuleSet};
use std::fs;
use std::path::Path;

use crate::cli::RuleArgs;

/// Build a `RuleSet` from the CLI flags, optionally seeded from a rule
/// document. The document (when given) is returned too so `save` can write
/// it back without losing its metadata or unknown fields.
pub fn build_rule_set(args: &RuleArgs, config: &Config) -> Result<(RuleSet, Option<RuleDocument>)> {
    let policy = if config.defaults.overwrite_duplicates {
        DuplicatePolicy::Overwrite
    } else {
        DuplicatePolicy::Reject
    };

    let mut document = None;
    let mut rules = if let Some(path) = &args.rules {
        let doc = RuleDocument::load(path)?;
        let rules = doc.to_rule_set()?;
        document = Some(doc);
        rules
    } else {
        RuleSet::new()
    };

    if let Some(path) = &args.import {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read rule file '{}'", path.display()))?;
        rules.import_rules(&text, policy);
    }

    for entry in &args.map {
        let Some((pattern, replacement)) = entry.split_once('=') else {
            bail!("--map expects PATTERN=REPLACEMENT, got '{entry}'");
        };
        let mode = if args.regex {
            MatchMode::Regex
        } else {
            MatchMode::Literal
        };
        let rule = MappingRule::new(pattern, replacement, mode, !args.ignore_case)?;
        rules.add_rule(rule, policy)?;
    }

    if let Some(input) = &args.delete {
        rules.set_delete_patterns(input);
    }
    if let Some(prefix) = &args.prefix {
        rules.prefix = prefix.clone();
    }
    if let Some(suffix) = &args.suffix {
        rules.suffix = suffix.clone();
    }

    Ok((rules, document))
}

pub fn handle_save(
    file: &Path,
    rule_args: &RuleArgs,
    name: Option<String>,
    description: Option<String>,
    work_path: Option<String>,
    config: &Config,
) -> Result<i32> {
    let (rules, document) = build_rule_set(rule_args, config)?;

    let mut doc = match document {
        // Seeded from an existing document: keep its metadata and any
        // unknown fields, replace the rule fields
        Some(mut doc) => {
            doc.set_rules(&rules);
            doc
        },
        None => RuleDocument::from_rule_set(&rules),
    };

    if let Some(name) = name {
        doc.name = name;
    }
    if let Some(description) = description {
        doc.description = description;
    }
    if let Some(work_path) = work_path {
        doc.work_path = work_path;
    }

    doc.save(file)?;
    println!("Saved rule document '{}'", file.display());
    Ok(0)
}

pub fn handle_show(file: &Path) -> Result<i32> {
    let doc = RuleDocument::load(file)?;
    let rules = doc.to_rule_set()?;

    println!("Rule document: {}", file.display());
    if !doc.name.is_empty() {
        println!("  name:         {}", doc.name);
    }
    if !doc.description.is_empty() {
        println!("  description:  {}", doc.description);
    }
    if !doc.work_path.is_empty() {
        println!("  work path:    {}", doc.work_path);
    }
    println!("  version:      {}", doc.version);
    if !doc.updated_at.is_empty() {
        println!("  updated:      {}", doc.updated_at);
    }
    println!("  prefix:       '{}'", doc.prefix);
    println!("  suffix:       '{}'", doc.suffix);
    println!("  delete:       '{}'", doc.delete_chars);
    println!("  rules:        {}", rules.rules().len());
    for rule in rules.rules() {
        let mode = match rule.mode {
            MatchMode::Literal => "literal",
            MatchMode::Regex => "regex",
        };
        let case = if rule.case_sensitive { "" } else { ", ignore case" };
        println!(
            "    '{}' -> '{}' ({mode}{case})",
            rule.pattern, rule.replacement
        );
    }
    if !doc.extra.is_empty() {
        let keys: Vec<_> = doc.extra.keys().map(String::as_str).collect();
        println!("  other fields: {}", keys.join(", "));
    }
    Ok(0)
}

pub fn handle_export(file: &Path, out: Option<&Path>) -> Result<i32> {
    let doc = RuleDocument::load(file)?;
    let text = doc.to_rule_set()?.export_rules();
    match out {
        Some(path) => {
            fs::write(path, text)
                .with_context(|| format!("failed to write '{}'", path.display()))?;
            println!("Exported rules to '{}'", path.display());
        },
        None => print!("{text}"),
    }
    Ok(0)
}
