use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while building or editing a `RuleSet`.
///
/// These are the only hard failures in the rule layer: everything that can
/// go wrong per-file during a rename is reported through outcome statuses
/// instead (see `executor`).
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: Box<regex::Error>,
    },

    #[error("pattern must not be empty")]
    EmptyPattern,

    #[error("a rule for pattern '{pattern}' already exists")]
    DuplicatePattern { pattern: String },
}

/// How a mapping rule's pattern is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    #[default]
    Literal,
    Regex,
}

/// One pattern -> replacement substitution.
///
/// Regex-mode rules are validated when they enter a `RuleSet`; an invalid
/// pattern is rejected there and never stored, so downstream code can treat
/// every stored rule as compilable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRule {
    pub pattern: String,
    pub replacement: String,
    #[serde(default)]
    pub mode: MatchMode,
    #[serde(default = "default_true")]
    pub case_sensitive: bool,
}

fn default_true() -> bool {
    true
}

impl MappingRule {
    /// Create a validated rule.
    pub fn new(
        pattern: impl Into<String>,
        replacement: impl Into<String>,
        mode: MatchMode,
        case_sensitive: bool,
    ) -> Result<Self, RuleError> {
        let rule = Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
            mode,
            case_sensitive,
        };
        rule.validate()?;
        Ok(rule)
    }

    /// Case-sensitive literal rule, the most common kind.
    pub fn literal(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
            mode: MatchMode::Literal,
            case_sensitive: true,
        }
    }

    /// Check that the pattern is non-empty and, for regex rules, compiles
    /// under the rule's case-sensitivity flag.
    pub fn validate(&self) -> Result<(), RuleError> {
        if self.pattern.is_empty() {
            return Err(RuleError::EmptyPattern);
        }
        if self.mode == MatchMode::Regex {
            RegexBuilder::new(&self.pattern)
                .case_insensitive(!self.case_sensitive)
                .build()
                .map_err(|e| RuleError::InvalidPattern {
                    pattern: self.pattern.clone(),
                    source: Box::new(e),
                })?;
        }
        Ok(())
    }
}

/// What to do when a rule is added for a pattern that already has one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    #[default]
    Reject,
    /// Replace the existing rule, keeping its position in the order.
    Overwrite,
}

/// The full ordered configuration for one rename operation: mapping rules,
/// delete patterns, and a prefix/suffix pair applied to the filename stem.
///
/// Rule order is insertion order and is semantically load-bearing: the
/// transform engine chains substitutions, feeding each rule's output into
/// the next. Patterns are unique within a set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    rules: Vec<MappingRule>,
    pub delete_patterns: Vec<String>,
    pub prefix: String,
    pub suffix: String,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rules(&self) -> &[MappingRule] {
        &self.rules
    }

    pub fn rule(&self, pattern: &str) -> Option<&MappingRule> {
        self.rules.iter().find(|r| r.pattern == pattern)
    }

    /// True when the set specifies no transformation at all.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
            && self.delete_patterns.is_empty()
            && self.prefix.is_empty()
            && self.suffix.is_empty()
    }

    /// Add a rule, validating its pattern first. An existing rule with the
    /// same pattern is handled according to `policy`.
    pub fn add_rule(&mut self, rule: MappingRule, policy: DuplicatePolicy) -> Result<(), RuleError> {
        rule.validate()?;
        if let Some(existing) = self.rules.iter_mut().find(|r| r.pattern == rule.pattern) {
            match policy {
                DuplicatePolicy::Reject => {
                    return Err(RuleError::DuplicatePattern {
                        pattern: rule.pattern,
                    })
                },
                DuplicatePolicy::Overwrite => *existing = rule,
            }
        } else {
            self.rules.push(rule);
        }
        Ok(())
    }

    /// Remove the rule for `pattern`. Returns whether a rule was removed.
    pub fn remove_rule(&mut self, pattern: &str) -> bool {
        let before = self.rules.len();
        self.rules.retain(|r| r.pattern != pattern);
        self.rules.len() != before
    }

    pub fn clear_rules(&mut self) {
        self.rules.clear();
    }

    /// Set the delete patterns from a single input string. A comma splits
    /// the input into multiple whole-segment patterns; without one the
    /// entire input is a single pattern. Segments are trimmed and empty
    /// segments dropped.
    pub fn set_delete_patterns(&mut self, input: &str) {
        self.delete_patterns = split_delete_input(input);
    }

    /// Import rules from the plain-text form, one `pattern=replacement` per
    /// line. Blank lines and lines without `=` are ignored; the split is on
    /// the first `=` so replacements may contain one. Imported rules are
    /// case-sensitive literals. With `DuplicatePolicy::Reject`, lines whose
    /// pattern is already present are skipped rather than failing the whole
    /// import. Returns the number of rules added or overwritten.
    pub fn import_rules(&mut self, text: &str, policy: DuplicatePolicy) -> usize {
        let mut added = 0;
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let Some((pattern, replacement)) = line.split_once('=') else {
                continue;
            };
            if pattern.is_empty() {
                continue;
            }
            let rule = MappingRule::literal(pattern, replacement);
            match self.add_rule(rule, policy) {
                Ok(()) => added += 1,
                Err(RuleError::DuplicatePattern { .. }) => {},
                // Literal rules with a non-empty pattern always validate
                Err(_) => {},
            }
        }
        added
    }

    /// Export the mapping rules in the plain-text form understood by
    /// `import_rules`. Mode and case-sensitivity are not representable
    /// there; only pattern and replacement survive.
    pub fn export_rules(&self) -> String {
        let mut out = String::new();
        for rule in &self.rules {
            out.push_str(&rule.pattern);
            out.push('=');
            out.push_str(&rule.replacement);
            out.push('\n');
        }
        out
    }
}

/// Split a delete-pattern input string on commas into whole-segment
/// patterns, trimming whitespace and dropping empty segments.
pub fn split_delete_input(input: &str) -> Vec<String> {
    if input.trim().is_empty() {
        return Vec::new();
    }
    if input.contains(',') {
        input
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    } else {
        vec![input.to_string()]
    }
}
