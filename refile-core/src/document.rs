use crate::rules::{
    split_delete_input, DuplicatePolicy, MappingRule, MatchMode, RuleError, RuleSet,
};
use anyhow::{Context, Result};
use chrono::Local;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

pub const DOCUMENT_VERSION: &str = "1.0";

/// One entry in a document's `mappings` object. The simple form is a bare
/// replacement string; the extended form carries mode and case-sensitivity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MappingEntry {
    Simple(String),
    Extended {
        value: String,
        #[serde(default)]
        use_regex: bool,
        #[serde(default = "default_true")]
        case_sensitive: bool,
    },
}

fn default_true() -> bool {
    true
}

/// A persisted rule document.
///
/// Forward compatibility: unknown top-level fields survive a load -> save
/// round trip untouched (they land in `extra`), and missing known fields
/// take defaults. `mappings` always normalizes to a map, even when the
/// document stores `null`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDocument {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub work_path: String,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub suffix: String,
    #[serde(default)]
    pub delete_chars: String,
    /// Pattern -> entry, in rule order. Values stay as raw JSON so a
    /// simple-form entry is written back in simple form.
    #[serde(default, deserialize_with = "map_or_empty")]
    pub mappings: Map<String, Value>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    /// Unknown top-level fields, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_version() -> String {
    DOCUMENT_VERSION.to_string()
}

fn map_or_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Map<String, Value>>::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}

impl Default for RuleDocument {
    fn default() -> Self {
        Self {
            version: default_version(),
            name: String::new(),
            description: String::new(),
            work_path: String::new(),
            prefix: String::new(),
            suffix: String::new(),
            delete_chars: String::new(),
            mappings: Map::new(),
            created_at: String::new(),
            updated_at: String::new(),
            extra: Map::new(),
        }
    }
}

impl RuleDocument {
    /// Build a fresh document from a rule set. Rules that are plain
    /// case-sensitive literals are written in the simple form; anything
    /// else uses the extended form.
    pub fn from_rule_set(rules: &RuleSet) -> Self {
        let mut doc = Self {
            created_at: Local::now().to_rfc3339(),
            updated_at: Local::now().to_rfc3339(),
            ..Self::default()
        };
        doc.set_rules(rules);
        doc
    }

    /// Overwrite this document's rule fields from a rule set, keeping
    /// name, description, timestamps, and any unknown fields.
    pub fn set_rules(&mut self, rules: &RuleSet) {
        self.prefix = rules.prefix.clone();
        self.suffix = rules.suffix.clone();
        self.delete_chars = rules.delete_patterns.join(",");
        self.mappings = rules
            .rules()
            .iter()
            .map(|rule| (rule.pattern.clone(), entry_value(rule)))
            .collect();
    }

    /// Convert the document's rule fields into a validated `RuleSet`.
    /// Entries whose value is neither a string nor an extended-form object
    /// are skipped, matching the tolerant loading of older documents; an
    /// invalid regex pattern is still a hard error.
    pub fn to_rule_set(&self) -> Result<RuleSet, RuleError> {
        let mut rules = RuleSet::new();
        for (pattern, value) in &self.mappings {
            if pattern.is_empty() {
                continue;
            }
            let Ok(entry) = serde_json::from_value::<MappingEntry>(value.clone()) else {
                continue;
            };
            let rule = match entry {
                MappingEntry::Simple(replacement) => MappingRule::literal(pattern, replacement),
                MappingEntry::Extended {
                    value,
                    use_regex,
                    case_sensitive,
                } => MappingRule {
                    pattern: pattern.clone(),
                    replacement: value,
                    mode: if use_regex {
                        MatchMode::Regex
                    } else {
                        MatchMode::Literal
                    },
                    case_sensitive,
                },
            };
            rules.add_rule(rule, DuplicatePolicy::Overwrite)?;
        }
        rules.delete_patterns = split_delete_input(&self.delete_chars);
        rules.prefix = self.prefix.clone();
        rules.suffix = self.suffix.clone();
        Ok(rules)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read rule document '{}'", path.display()))?;
        let doc: Self = serde_json::from_str(&content)
            .with_context(|| format!("'{}' is not a valid rule document", path.display()))?;
        Ok(doc)
    }

    /// Write the document, refreshing `updated_at` (and `created_at` on
    /// first save). Parent directories are created as needed.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        let now = Local::now().to_rfc3339();
        if self.created_at.is_empty() {
            self.created_at = now.clone();
        }
        self.updated_at = now;
        if self.version.is_empty() {
            self.version = default_version();
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create '{}'", parent.display()))?;
            }
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
            .with_context(|| format!("failed to write rule document '{}'", path.display()))?;
        Ok(())
    }
}

fn entry_value(rule: &MappingRule) -> Value {
    if rule.mode == MatchMode::Literal && rule.case_sensitive {
        Value::String(rule.replacement.clone())
    } else {
        serde_json::to_value(MappingEntry::Extended {
            value: rule.replacement.clone(),
            use_regex: rule.mode == MatchMode::Regex,
            case_sensitive: rule.case_sensitive,
        })
        .unwrap_or(Value::Null)
    }
}
