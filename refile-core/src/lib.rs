#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::uninlined_format_args)]

pub mod config;
pub mod document;
pub mod executor;
pub mod output;
pub mod rules;
pub mod transform;

pub use config::Config;
pub use document::{MappingEntry, RuleDocument, DOCUMENT_VERSION};
pub use executor::{OutcomeStatus, RenameExecutor, RenameOutcome, RenameReport};
pub use output::{ApplyResult, OutputFormat, OutputFormatter, PreviewResult};
pub use rules::{split_delete_input, DuplicatePolicy, MappingRule, MatchMode, RuleError, RuleSet};
pub use transform::{split_stem, TransformEngine};
