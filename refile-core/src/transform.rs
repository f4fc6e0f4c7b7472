use crate::rules::{MatchMode, RuleSet};
use anyhow::{Context, Result};
use regex::{NoExpand, Regex, RegexBuilder};

/// A `RuleSet` compiled for repeated application.
///
/// The engine is pure: `apply` takes a filename and returns the transformed
/// name, with no I/O and no interior state, so one engine can be shared
/// across the files of a batch.
///
/// The pipeline is fixed: mapping substitution in rule order, then segment
/// deletion, then the idempotent prefix/suffix step on the stem.
#[derive(Debug)]
pub struct TransformEngine {
    steps: Vec<CompiledRule>,
    delete_patterns: Vec<String>,
    prefix: String,
    suffix: String,
}

#[derive(Debug)]
struct CompiledRule {
    matcher: Matcher,
    replacement: String,
}

#[derive(Debug)]
enum Matcher {
    /// Case-sensitive literal, plain substring replacement.
    Literal(String),
    /// Case-insensitive literal: an escaped, case-insensitive regex whose
    /// replacement is inserted verbatim.
    LiteralFolded(Regex),
    /// User regex; the replacement is a capture-group template.
    Pattern(Regex),
}

impl TransformEngine {
    /// Compile every rule in the set. Rules are validated when they enter a
    /// `RuleSet`, so a compile failure here means the caller constructed
    /// rules without validation; it is surfaced as an error rather than a
    /// per-file condition.
    pub fn compile(rules: &RuleSet) -> Result<Self> {
        let mut steps = Vec::with_capacity(rules.rules().len());
        for rule in rules.rules() {
            let step = match rule.mode {
                MatchMode::Literal if rule.case_sensitive => CompiledRule {
                    matcher: Matcher::Literal(rule.pattern.clone()),
                    replacement: rule.replacement.clone(),
                },
                MatchMode::Literal => {
                    let regex = RegexBuilder::new(&regex::escape(&rule.pattern))
                        .case_insensitive(true)
                        .build()
                        .with_context(|| {
                            format!("failed to compile literal pattern '{}'", rule.pattern)
                        })?;
                    CompiledRule {
                        matcher: Matcher::LiteralFolded(regex),
                        replacement: rule.replacement.clone(),
                    }
                },
                MatchMode::Regex => {
                    let regex = RegexBuilder::new(&rule.pattern)
                        .case_insensitive(!rule.case_sensitive)
                        .build()
                        .with_context(|| {
                            format!(
                                "unvalidated rule reached the engine: pattern '{}' does not compile",
                                rule.pattern
                            )
                        })?;
                    CompiledRule {
                        matcher: Matcher::Pattern(regex),
                        replacement: normalize_template(&rule.replacement),
                    }
                },
            };
            steps.push(step);
        }

        Ok(Self {
            steps,
            delete_patterns: rules.delete_patterns.clone(),
            prefix: rules.prefix.clone(),
            suffix: rules.suffix.clone(),
        })
    }

    /// Compute the new name for one original filename.
    ///
    /// Substitutions chain: each rule transforms the output of the previous
    /// one, so later rules may match text introduced by earlier rules. This
    /// is intentional and must not be replaced with independent matching
    /// against the original name.
    pub fn apply(&self, name: &str) -> String {
        let mut current = name.to_string();

        for step in &self.steps {
            current = match &step.matcher {
                Matcher::Literal(pattern) => current.replace(pattern.as_str(), &step.replacement),
                Matcher::LiteralFolded(regex) => regex
                    .replace_all(&current, NoExpand(&step.replacement))
                    .into_owned(),
                Matcher::Pattern(regex) => regex
                    .replace_all(&current, step.replacement.as_str())
                    .into_owned(),
            };
        }

        // Two-pass segment deletion: each pattern is removed everywhere
        // before the next one is considered.
        for pattern in &self.delete_patterns {
            if !pattern.is_empty() {
                current = current.replace(pattern.as_str(), "");
            }
        }

        self.apply_prefix_suffix(current)
    }

    /// Prepend/append prefix and suffix to the stem, skipping either when
    /// the stem already carries it. Re-running the engine over an already
    /// transformed name is a no-op for this step.
    fn apply_prefix_suffix(&self, name: String) -> String {
        if self.prefix.is_empty() && self.suffix.is_empty() {
            return name;
        }

        let (stem, ext) = split_stem(&name);
        let mut stem = stem.to_string();

        if !self.prefix.is_empty() && !stem.starts_with(&self.prefix) {
            stem.insert_str(0, &self.prefix);
        }
        if !self.suffix.is_empty() && !stem.ends_with(&self.suffix) {
            stem.push_str(&self.suffix);
        }

        stem.push_str(ext);
        stem
    }
}

/// Split a filename into stem and extension. The extension runs from the
/// last `.` to the end; a leading dot (dotfiles) does not start an
/// extension, and a name without a dot is all stem.
pub fn split_stem(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    }
}

/// Translate backslash capture references (`\1`) in a replacement template
/// to the `${1}` form the regex crate expands. `$1`/`${name}` pass through
/// untouched; `\\` escapes a literal backslash.
fn normalize_template(replacement: &str) -> String {
    let mut out = String::with_capacity(replacement.len());
    let mut chars = replacement.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some(d) if d.is_ascii_digit() => {
                out.push_str("${");
                while let Some(&d) = chars.peek() {
                    if !d.is_ascii_digit() {
                        break;
                    }
                    out.push(d);
                    chars.next();
                }
                out.push('}');
            },
            Some('\\') => {
                chars.next();
                out.push('\\');
            },
            _ => out.push(c),
        }
    }
    out
}
